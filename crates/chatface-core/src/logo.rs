//! Boot logo sequence.

use crate::{Error, FrameSet, ImageHandle, Result};

/// Result of advancing the logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoStep {
    /// Show this frame next.
    Frame(ImageHandle),
    /// The last frame has been shown; tear the logo down.
    Finished,
    /// Already finished. Nothing to do.
    Done,
}

/// Plays the boot logo exactly once.
///
/// Frame 0 is shown at construction; each tick advances by one. The tick
/// after the last frame yields [`LogoStep::Finished`] once, and every tick
/// after that yields [`LogoStep::Done`].
#[derive(Debug, Clone)]
pub struct LogoSequence {
    frames: FrameSet,
    index: usize,
    finished: bool,
}

impl LogoSequence {
    pub fn new(frames: FrameSet) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::EmptyLogo);
        }
        Ok(Self {
            frames,
            index: 0,
            finished: false,
        })
    }

    /// The frame shown when the logo appears.
    pub fn first_frame(&self) -> &ImageHandle {
        // Non-empty by construction.
        &self.frames.as_slice()[0]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true when the current frame is the last one.
    pub fn is_last_frame(&self) -> bool {
        self.index + 1 >= self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances one tick.
    pub fn advance(&mut self) -> LogoStep {
        if self.finished {
            return LogoStep::Done;
        }
        if self.is_last_frame() {
            self.finished = true;
            return LogoStep::Finished;
        }
        self.index += 1;
        match self.frames.get(self.index) {
            Some(frame) => LogoStep::Frame(frame.clone()),
            None => {
                self.finished = true;
                LogoStep::Finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logo(n: usize) -> LogoSequence {
        LogoSequence::new((1..=n).map(|i| format!("bootlogo{}", i)).collect()).unwrap()
    }

    #[test]
    fn test_plays_every_frame_once() {
        let mut logo = logo(21);
        assert_eq!(logo.first_frame().as_str(), "bootlogo1");

        let mut shown = vec![logo.index()];
        loop {
            match logo.advance() {
                LogoStep::Frame(_) => shown.push(logo.index()),
                LogoStep::Finished => break,
                LogoStep::Done => panic!("done before finished"),
            }
        }
        assert_eq!(shown, (0..21).collect::<Vec<_>>());
        assert!(logo.is_finished());

        for _ in 0..5 {
            assert_eq!(logo.advance(), LogoStep::Done);
        }
        assert_eq!(logo.index(), 20);
    }

    #[test]
    fn test_last_frame_flag() {
        let mut logo = logo(3);
        assert!(!logo.is_last_frame());
        logo.advance();
        assert!(!logo.is_last_frame());
        assert_eq!(
            logo.advance(),
            LogoStep::Frame(ImageHandle::new("bootlogo3"))
        );
        assert!(logo.is_last_frame());
        assert_eq!(logo.advance(), LogoStep::Finished);
    }

    #[test]
    fn test_single_frame_logo() {
        let mut logo = logo(1);
        assert!(logo.is_last_frame());
        assert_eq!(logo.advance(), LogoStep::Finished);
        assert_eq!(logo.advance(), LogoStep::Done);
    }

    #[test]
    fn test_empty_logo_rejected() {
        assert!(matches!(
            LogoSequence::new(FrameSet::blank()),
            Err(Error::EmptyLogo)
        ));
    }
}
