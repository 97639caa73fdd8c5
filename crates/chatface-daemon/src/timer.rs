//! Tokio-backed animation timers.
//!
//! Each timer is a task waiting on a watch channel that carries its current
//! arming. Callbacks block on the display lock, so they run on the blocking
//! pool while the task waits for them. A callback error is reported on the
//! fatal channel and ends that timer.

use chatface_core::{AnimationTimer, TimerCallback, TimerDriver, TimerKind, TimerMode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

type Arming = Option<(TimerMode, Duration)>;

/// A timer callback failure.
#[derive(Debug)]
pub struct TimerFailure {
    pub timer: &'static str,
    pub error: chatface_core::Error,
}

/// Creates timers as tokio tasks on the current runtime.
pub struct TokioTimerDriver {
    fatal: mpsc::UnboundedSender<TimerFailure>,
}

impl TokioTimerDriver {
    pub fn new(fatal: mpsc::UnboundedSender<TimerFailure>) -> Self {
        Self { fatal }
    }
}

impl TimerDriver for TokioTimerDriver {
    fn create(
        &self,
        kind: TimerKind,
        callback: TimerCallback,
    ) -> chatface_core::Result<Box<dyn AnimationTimer>> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|e| chatface_core::Error::Timer {
                name: kind.name(),
                reason: e.to_string(),
            })?;

        let (tx, rx) = watch::channel(None);
        handle.spawn(run_timer(kind, rx, callback, self.fatal.clone()));
        debug!("Created {}", kind.name());
        Ok(Box::new(TokioTimer { kind, tx }))
    }
}

/// Handle to a timer task. Dropping it ends the task.
struct TokioTimer {
    kind: TimerKind,
    tx: watch::Sender<Arming>,
}

impl TokioTimer {
    fn send(&self, arming: Arming) -> chatface_core::Result<()> {
        self.tx
            .send(arming)
            .map_err(|_| chatface_core::Error::Timer {
                name: self.kind.name(),
                reason: "timer task has exited".into(),
            })
    }
}

impl AnimationTimer for TokioTimer {
    fn start(&mut self, mode: TimerMode, period: Duration) -> chatface_core::Result<()> {
        if period.is_zero() {
            return Err(chatface_core::Error::Timer {
                name: self.kind.name(),
                reason: "period must be greater than zero".into(),
            });
        }
        self.send(Some((mode, period)))
    }

    fn stop(&mut self) -> chatface_core::Result<()> {
        // A task that already exited is as stopped as it gets.
        let _ = self.tx.send(None);
        Ok(())
    }

    /// Last arming requested. A one-shot that already fired still reports
    /// its arming until the next start or stop.
    fn armed(&self) -> Option<(TimerMode, Duration)> {
        *self.tx.borrow()
    }
}

async fn run_timer(
    kind: TimerKind,
    mut rx: watch::Receiver<Arming>,
    callback: TimerCallback,
    fatal: mpsc::UnboundedSender<TimerFailure>,
) {
    let callback: Arc<dyn Fn() -> chatface_core::Result<()> + Send + Sync> = Arc::from(callback);
    loop {
        let arming = *rx.borrow_and_update();
        let Some((mode, period)) = arming else {
            if rx.changed().await.is_err() {
                break;
            }
            continue;
        };

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::time::sleep(period) => {
                let tick = Arc::clone(&callback);
                let result = match tokio::task::spawn_blocking(move || tick()).await {
                    Ok(result) => result,
                    Err(e) => Err(chatface_core::Error::Timer {
                        name: kind.name(),
                        reason: format!("callback did not complete: {}", e),
                    }),
                };
                if let Err(e) = result {
                    error!("{} callback failed: {}", kind.name(), e);
                    let _ = fatal.send(TimerFailure { timer: kind.name(), error: e });
                    break;
                }
                // A one-shot waits for the next arming, which the callback
                // itself may already have sent.
                if mode == TimerMode::OneShot && rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }
    debug!("{} task finished", kind.name());
}
