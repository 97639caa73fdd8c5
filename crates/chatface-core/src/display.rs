//! The chat display render context.
//!
//! [`ChatDisplay`] owns the scene behind a single lock. Every mutation, from
//! timer ticks and from application callbacks alike, runs inside a scoped
//! guard of that lock. Timers are created through the host's
//! [`TimerDriver`] and call back through a weak reference, so dropping the
//! last display handle tears everything down even while timers are armed.
//!
//! The logo timer handle sits behind its own small lock, taken after the
//! scene lock. A logo tick that cannot get the scene still re-arms the
//! pending one-shot, so the last logo frame is never lost.

use crate::{
    AnimationState, AnimationTimer, AssetTable, BoardVariant, Cadence, CadenceConfig,
    DisplaySurface, Emotion, EmotionResolver, Error, FaceAnimator, LogoSequence, LogoStep, Result,
    TimerDriver, TimerKind, TimerMode,
};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Display lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Boot logo playing.
    Booting,
    /// Face UI built and animating.
    Ready,
}

/// Result of one face tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Lock not acquired in time, or no face UI yet. State unchanged.
    Skipped,
    /// The animation moved on.
    Advanced {
        emotion: Emotion,
        frame_index: usize,
        /// The face timer was re-armed with a new period.
        reprogrammed: bool,
    },
}

/// Snapshot of the whole display.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayStatus {
    pub phase: Phase,
    pub logo_frame: usize,
    pub logo_finished: bool,
    #[serde(flatten)]
    pub animation: AnimationState,
    pub status_hidden: bool,
    pub period_ms: u64,
}

struct Scene<S: DisplaySurface> {
    surface: S,
    phase: Phase,
    logo: LogoSequence,
    face: FaceAnimator,
    frames: AssetTable,
    cadence: CadenceConfig,
    logo_period: Duration,
    face_timer: Option<Box<dyn AnimationTimer>>,
    torn_down: bool,
}

impl<S: DisplaySurface> Scene<S> {
    /// Releases scene objects and the face timer. Returns false if this
    /// already happened.
    fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;

        self.surface.release_content();
        self.surface.release_containers();
        self.surface.release_display();

        if let Some(mut timer) = self.face_timer.take() {
            if let Err(e) = timer.stop() {
                warn!("Failed to stop {}: {}", TimerKind::Face.name(), e);
            }
        }
        true
    }

    /// Re-arms the face timer when the wanted period differs from the armed
    /// one.
    fn update_cadence(&mut self) -> Result<bool> {
        if !self.cadence.is_adaptive() {
            return Ok(false);
        }
        let wanted = self.cadence.cadence_for(self.surface.status_hidden());
        let period = self.cadence.period(wanted);
        self.face.set_cadence(wanted);

        let Some(timer) = self.face_timer.as_mut() else {
            return Ok(false);
        };
        if timer.armed().map(|(_, armed)| armed) == Some(period) {
            return Ok(false);
        }

        timer.stop()?;
        timer.start(TimerMode::Periodic, period)?;
        debug!("Face timer reprogrammed to {:?} ({:?})", period, wanted);
        Ok(true)
    }
}

#[derive(Default)]
struct LogoTimer {
    timer: Option<Box<dyn AnimationTimer>>,
    /// Period of the final tick once the last frame is showing.
    one_shot: Option<Duration>,
}

impl LogoTimer {
    fn arm(&mut self, mode: TimerMode, period: Duration) -> Result<()> {
        if let Some(timer) = self.timer.as_mut() {
            timer.start(mode, period)?;
            self.one_shot = (mode == TimerMode::OneShot).then_some(period);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.one_shot = None;
        match self.timer.take() {
            Some(mut timer) => timer.stop(),
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop {}: {}", TimerKind::Logo.name(), e);
        }
    }
}

struct Shared<S: DisplaySurface + 'static> {
    scene: Mutex<Scene<S>>,
    logo_timer: Mutex<LogoTimer>,
    timers: Arc<dyn TimerDriver>,
    lock_timeout: Duration,
}

impl<S: DisplaySurface + 'static> Shared<S> {
    fn try_scene(&self) -> Option<MutexGuard<'_, Scene<S>>> {
        self.scene.try_lock_for(self.lock_timeout)
    }

    fn callback(
        self: &Arc<Self>,
        tick: fn(&Arc<Self>) -> Result<()>,
    ) -> crate::TimerCallback {
        let weak: Weak<Self> = Arc::downgrade(self);
        Box::new(move || match weak.upgrade() {
            Some(shared) => tick(&shared),
            None => Ok(()),
        })
    }

    fn tick_logo(self: &Arc<Self>) -> Result<Option<LogoStep>> {
        let Some(mut guard) = self.try_scene() else {
            warn!("Logo tick skipped, display lock busy");
            // A fired one-shot stays disarmed unless the final tick is retried.
            let mut logo = self.logo_timer.lock();
            if let Some(period) = logo.one_shot {
                logo.arm(TimerMode::OneShot, period)?;
                debug!("Final logo tick re-armed");
            }
            return Ok(None);
        };
        let scene = &mut *guard;
        if scene.torn_down {
            return Ok(None);
        }

        let step = scene.logo.advance();
        match &step {
            LogoStep::Frame(frame) => {
                scene.surface.set_logo_image(frame);
                if scene.logo.is_last_frame() {
                    self.logo_timer
                        .lock()
                        .arm(TimerMode::OneShot, scene.logo_period)?;
                }
            }
            LogoStep::Finished => {
                scene.surface.delete_logo();
                self.logo_timer.lock().stop()?;
                scene.phase = Phase::Ready;
                info!("Boot logo finished after {} frames", scene.logo.frame_count());
                self.setup_ui(scene)?;
            }
            LogoStep::Done => {}
        }
        Ok(Some(step))
    }

    fn setup_ui(self: &Arc<Self>, scene: &mut Scene<S>) -> Result<()> {
        let initial = scene
            .frames
            .image(scene.face.default_emotion(), 0)
            .cloned();
        scene.surface.setup_ui(initial.as_ref())?;

        let cadence = scene.cadence.cadence_for(scene.surface.status_hidden());
        let period = scene.cadence.period(cadence);
        scene.face.set_cadence(cadence);

        let mut timer = self.timers.create(
            TimerKind::Face,
            self.callback(|shared| shared.tick_face().map(|_| ())),
        )?;
        timer.start(TimerMode::Periodic, period)?;
        scene.face_timer = Some(timer);
        info!("Face UI ready, animating every {:?}", period);
        Ok(())
    }

    fn tick_face(&self) -> Result<TickOutcome> {
        let Some(mut guard) = self.try_scene() else {
            warn!("Face tick skipped, display lock busy");
            return Ok(TickOutcome::Skipped);
        };
        let scene = &mut *guard;
        if scene.torn_down || scene.phase != Phase::Ready {
            return Ok(TickOutcome::Skipped);
        }

        if let Some(frame) = scene.face.advance(&scene.frames) {
            if !scene.surface.set_face_image(frame) {
                debug!("No face object, frame {} dropped", frame);
            }
        }
        let reprogrammed = scene.update_cadence()?;

        let state = scene.face.state();
        debug!(
            "Face tick: {} frame {}/{}",
            state.emotion, state.frame_index, state.frame_count
        );
        Ok(TickOutcome::Advanced {
            emotion: state.emotion,
            frame_index: state.frame_index,
            reprogrammed,
        })
    }

    fn teardown(&self) {
        let mut scene = self.scene.lock();
        if scene.teardown() {
            self.logo_timer.lock().release();
            debug!("Display torn down");
        }
    }
}

impl<S: DisplaySurface + 'static> Drop for Shared<S> {
    fn drop(&mut self) {
        if self.scene.get_mut().teardown() {
            self.logo_timer.get_mut().release();
            debug!("Display torn down");
        }
    }
}

/// Lock-owning render context for one board.
pub struct ChatDisplay<S: DisplaySurface + 'static> {
    shared: Arc<Shared<S>>,
}

impl<S: DisplaySurface + 'static> Clone for ChatDisplay<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: DisplaySurface + 'static> ChatDisplay<S> {
    /// Shows the first logo frame and arms the logo timer.
    ///
    /// Any failure is returned and whatever was created is torn down.
    pub fn new(
        surface: S,
        variant: BoardVariant,
        timers: Arc<dyn TimerDriver>,
        lock_timeout: Duration,
    ) -> Result<Self> {
        let logo = LogoSequence::new(variant.logo)?;
        let scene = Scene {
            surface,
            phase: Phase::Booting,
            logo,
            face: FaceAnimator::new(EmotionResolver::new(variant.default_emotion), variant.wrap),
            frames: variant.frames,
            cadence: variant.cadence,
            logo_period: variant.logo_period,
            face_timer: None,
            torn_down: false,
        };
        let shared = Arc::new(Shared {
            scene: Mutex::new(scene),
            logo_timer: Mutex::new(LogoTimer::default()),
            timers,
            lock_timeout,
        });

        {
            let mut guard = shared.scene.lock();
            let scene = &mut *guard;
            scene.surface.show_logo(scene.logo.first_frame())?;

            let mut timer = shared.timers.create(
                TimerKind::Logo,
                shared.callback(|shared| shared.tick_logo().map(|_| ())),
            )?;
            let mode = if scene.logo.is_last_frame() {
                TimerMode::OneShot
            } else {
                TimerMode::Periodic
            };
            let mut logo = LogoTimer {
                timer: Some(timer),
                one_shot: None,
            };
            logo.arm(mode, scene.logo_period)?;
            *shared.logo_timer.lock() = logo;
        }

        info!(
            "Display '{}' booting ({:?} per logo frame)",
            variant.name, variant.logo_period
        );
        Ok(Self { shared })
    }

    fn scene(&self) -> Result<MutexGuard<'_, Scene<S>>> {
        self.shared
            .try_scene()
            .ok_or(Error::LockTimeout(self.shared.lock_timeout))
    }

    /// Switches the face to an emotion by name. Unknown names show the
    /// default emotion. Takes effect on the next face tick.
    pub fn set_face(&self, name: &str) -> Result<Emotion> {
        let mut scene = self.scene()?;
        let emotion = scene.face.set_emotion(name);
        debug!("Face set to {}", emotion);
        Ok(emotion)
    }

    /// Shows or hides the status area.
    pub fn set_status_hidden(&self, hidden: bool) -> Result<()> {
        self.scene()?.surface.set_status_hidden(hidden);
        Ok(())
    }

    /// Returns true once the boot logo has finished.
    pub fn logo_finished(&self) -> Result<bool> {
        Ok(self.scene()?.logo.is_finished())
    }

    pub fn state(&self) -> Result<DisplayStatus> {
        let scene = self.scene()?;
        let animation = scene.face.state();
        let period = scene.cadence.period(animation.cadence);
        Ok(DisplayStatus {
            phase: scene.phase,
            logo_frame: scene.logo.index(),
            logo_finished: scene.logo.is_finished(),
            animation,
            status_hidden: scene.surface.status_hidden(),
            period_ms: period.as_millis() as u64,
        })
    }

    /// Runs `f` on the surface under the scene lock.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R> {
        Ok(f(&mut self.scene()?.surface))
    }

    /// Runs one logo tick. `None` means the tick was skipped.
    pub fn tick_logo(&self) -> Result<Option<LogoStep>> {
        self.shared.tick_logo()
    }

    /// Runs one face tick.
    pub fn tick_face(&self) -> Result<TickOutcome> {
        self.shared.tick_face()
    }

    /// Releases the scene and stops all timers. Later calls are no-ops.
    pub fn teardown(&self) {
        self.shared.teardown();
    }

    /// Current face cadence.
    pub fn cadence(&self) -> Result<Cadence> {
        Ok(self.scene()?.face.cadence())
    }
}
