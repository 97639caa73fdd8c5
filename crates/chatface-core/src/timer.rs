//! Timer abstraction.
//!
//! The display owns two timers: the logo timer, which runs once at boot, and
//! the face timer, which drives the animation forever after. Hosts supply a
//! [`TimerDriver`] that creates them.

use crate::Result;
use std::time::Duration;

/// Face animation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Active,
    Idle,
}

/// Face timer periods for one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceConfig {
    /// Period while the status area is shown.
    pub active: Duration,
    /// Period while the status area is hidden. `None` disables switching.
    pub idle: Option<Duration>,
}

impl CadenceConfig {
    /// A fixed cadence.
    pub fn fixed(active: Duration) -> Self {
        Self { active, idle: None }
    }

    /// A cadence that slows down while the status area is hidden.
    pub fn adaptive(active: Duration, idle: Duration) -> Self {
        Self {
            active,
            idle: Some(idle),
        }
    }

    /// Returns true if the period depends on the status area.
    pub fn is_adaptive(&self) -> bool {
        self.idle.is_some()
    }

    /// Period for a cadence.
    pub fn period(&self, cadence: Cadence) -> Duration {
        match (cadence, self.idle) {
            (Cadence::Idle, Some(idle)) => idle,
            _ => self.active,
        }
    }

    /// Cadence wanted for the given status-area visibility.
    pub fn cadence_for(&self, status_hidden: bool) -> Cadence {
        if status_hidden && self.is_adaptive() {
            Cadence::Idle
        } else {
            Cadence::Active
        }
    }
}

/// How a timer fires once armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Fire once after the period, then disarm.
    OneShot,
    /// Fire every period until stopped.
    Periodic,
}

/// Which of the display's timers is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Logo,
    Face,
}

impl TimerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TimerKind::Logo => "logo_timer",
            TimerKind::Face => "face_timer",
        }
    }
}

/// Timer callback. An error is fatal for the host.
pub type TimerCallback = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// One armed-or-idle timer handle.
pub trait AnimationTimer: Send {
    /// Arms the timer, replacing any previous arming.
    fn start(&mut self, mode: TimerMode, period: Duration) -> Result<()>;

    /// Disarms the timer. Stopping an idle timer is fine.
    fn stop(&mut self) -> Result<()>;

    /// Current arming, if any.
    fn armed(&self) -> Option<(TimerMode, Duration)>;
}

/// Creates timers whose callbacks run in the host's timer context.
pub trait TimerDriver: Send + Sync {
    fn create(&self, kind: TimerKind, callback: TimerCallback) -> Result<Box<dyn AnimationTimer>>;
}
