//! Face animation state machine.
//!
//! Pure state: which emotion is showing, which frame of it, and how fast.
//! [`ChatDisplay`](crate::ChatDisplay) owns one of these behind the scene
//! lock and binds whatever [`FaceAnimator::advance`] returns.

use crate::{AssetTable, Cadence, Emotion, EmotionResolver, ImageHandle};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What happens after the last frame of an emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// Start the same emotion again.
    #[default]
    Loop,
    /// Go back to the default emotion.
    Revert,
}

/// Snapshot of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationState {
    pub emotion: Emotion,
    pub frame_index: usize,
    pub frame_count: usize,
    pub cadence: Cadence,
}

/// Advances through the frames of the current emotion.
#[derive(Debug, Clone)]
pub struct FaceAnimator {
    resolver: EmotionResolver,
    wrap: WrapPolicy,
    emotion: Emotion,
    frame_index: usize,
    frame_count: usize,
    cadence: Cadence,
}

impl FaceAnimator {
    /// Starts on the resolver's default emotion, frame 0.
    pub fn new(resolver: EmotionResolver, wrap: WrapPolicy) -> Self {
        Self {
            resolver,
            wrap,
            emotion: resolver.default_emotion(),
            frame_index: 0,
            frame_count: 0,
            cadence: Cadence::Active,
        }
    }

    pub fn default_emotion(&self) -> Emotion {
        self.resolver.default_emotion()
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn set_cadence(&mut self, cadence: Cadence) {
        self.cadence = cadence;
    }

    pub fn state(&self) -> AnimationState {
        AnimationState {
            emotion: self.emotion,
            frame_index: self.frame_index,
            frame_count: self.frame_count,
            cadence: self.cadence,
        }
    }

    /// Switches emotion by name and rewinds to frame 0.
    ///
    /// Nothing is drawn here; the next [`advance`](Self::advance) picks up
    /// the new emotion.
    pub fn set_emotion(&mut self, name: &str) -> Emotion {
        self.emotion = self.resolver.resolve(name);
        self.frame_index = 0;
        self.emotion
    }

    /// Moves to the next frame and returns the image to bind.
    ///
    /// The frame count is read from `table` on every call. A blank frame set
    /// keeps the index at 0 and returns `None`.
    pub fn advance<'a>(&mut self, table: &'a AssetTable) -> Option<&'a ImageHandle> {
        self.frame_count = table.frame_count(self.emotion);
        if self.frame_count == 0 {
            self.frame_index = 0;
            return None;
        }

        if self.frame_index + 1 < self.frame_count {
            self.frame_index += 1;
        } else {
            self.frame_index = 0;
            let default = self.resolver.default_emotion();
            if self.wrap == WrapPolicy::Revert && self.emotion != default {
                debug!("{} finished, reverting to {}", self.emotion, default);
                self.emotion = default;
                self.frame_count = table.frame_count(default);
            }
        }

        table.image(self.emotion, self.frame_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameSet;

    fn set(prefix: &str, n: usize) -> FrameSet {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn table() -> AssetTable {
        let mut table = AssetTable::new(set("neutral", 10));
        table.bind(&[Emotion::Happy], set("happy", 6));
        table.bind(&[Emotion::Crying], FrameSet::blank());
        table.bind(&[Emotion::Sleepy], set("sleepy", 1));
        table
    }

    fn animator() -> FaceAnimator {
        FaceAnimator::new(EmotionResolver::default(), WrapPolicy::Loop)
    }

    #[test]
    fn test_happy_wraps_after_six() {
        let table = table();
        let mut face = animator();
        face.set_emotion("happy");

        let indices: Vec<usize> = (0..6)
            .map(|_| {
                face.advance(&table);
                face.frame_index()
            })
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 0]);
        assert_eq!(face.emotion(), Emotion::Happy);
    }

    #[test]
    fn test_cycle_covers_every_frame() {
        let table = table();
        let mut face = animator();
        let names: Vec<String> = (0..20)
            .filter_map(|_| face.advance(&table).map(|h| h.to_string()))
            .collect();
        assert_eq!(names[0], "neutral2");
        assert_eq!(names[8], "neutral10");
        assert_eq!(names[9], "neutral1");
        assert_eq!(names[19], "neutral1");
    }

    #[test]
    fn test_set_emotion_rewinds() {
        let table = table();
        let mut face = animator();
        for _ in 0..4 {
            face.advance(&table);
        }
        assert_eq!(face.frame_index(), 4);
        assert_eq!(face.set_emotion("sad"), Emotion::Sad);
        assert_eq!(face.frame_index(), 0);
    }

    #[test]
    fn test_unknown_emotion_ticks() {
        let table = table();
        let mut face = animator();
        assert_eq!(face.set_emotion("bogus_name"), Emotion::Neutral);
        assert!(face.advance(&table).is_some());
        assert_eq!(face.state().frame_count, 10);
    }

    #[test]
    fn test_blank_emotion_renders_nothing() {
        let table = table();
        let mut face = animator();
        face.set_emotion("crying");
        for _ in 0..3 {
            assert_eq!(face.advance(&table), None);
            assert_eq!(face.frame_index(), 0);
        }
        assert_eq!(face.state().frame_count, 0);
    }

    #[test]
    fn test_single_frame_stays_at_zero() {
        let table = table();
        let mut face = animator();
        face.set_emotion("sleepy");
        for _ in 0..3 {
            assert_eq!(face.advance(&table).map(|h| h.as_str()), Some("sleepy1"));
            assert_eq!(face.frame_index(), 0);
        }
    }

    #[test]
    fn test_table_shrink_does_not_overflow() {
        let mut face = animator();
        for _ in 0..8 {
            face.advance(&table());
        }
        assert_eq!(face.frame_index(), 8);

        let small = AssetTable::new(set("neutral", 3));
        assert_eq!(face.advance(&small).map(|h| h.as_str()), Some("neutral1"));
        assert_eq!(face.frame_index(), 0);
    }

    #[test]
    fn test_revert_policy() {
        let table = table();
        let mut face = FaceAnimator::new(EmotionResolver::default(), WrapPolicy::Revert);
        face.set_emotion("happy");
        for _ in 0..5 {
            face.advance(&table);
        }
        assert_eq!(face.emotion(), Emotion::Happy);
        assert_eq!(face.frame_index(), 5);

        assert_eq!(face.advance(&table).map(|h| h.as_str()), Some("neutral1"));
        assert_eq!(face.emotion(), Emotion::Neutral);
        assert_eq!(face.state().frame_count, 10);

        // The default emotion itself loops.
        for _ in 0..10 {
            face.advance(&table);
        }
        assert_eq!(face.emotion(), Emotion::Neutral);
        assert_eq!(face.frame_index(), 0);
    }
}
