//! Periodic timer capability used to drive sampling.
//!
//! The timer is a free-running clock: its only coupling to the capture
//! state machine is `start` and `cancel`.

use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Work run on every timer tick
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// A periodic timer that can be started and cancelled.
pub trait PeriodicTimer: Send {
    /// Start firing `on_tick` every `interval` until cancelled
    fn start(&mut self, interval: Duration, on_tick: TickCallback);

    /// Stop firing. No tick runs after this returns.
    fn cancel(&mut self);
}

impl<T: PeriodicTimer + ?Sized> PeriodicTimer for Box<T> {
    fn start(&mut self, interval: Duration, on_tick: TickCallback) {
        (**self).start(interval, on_tick);
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }
}

/// Timer backed by a dedicated OS thread
#[derive(Default)]
pub struct ThreadTimer {
    running: Option<(Arc<AtomicBool>, JoinHandle<()>)>,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl PeriodicTimer for ThreadTimer {
    fn start(&mut self, interval: Duration, on_tick: TickCallback) {
        self.cancel();

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let spawned = std::thread::Builder::new()
            .name("flamecafe-timer".to_string())
            .spawn(move || {
                let mut deadline = Instant::now() + interval;
                loop {
                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }
                    on_tick();
                    deadline = next_deadline(deadline, interval, Instant::now());
                }
            });

        match spawned {
            Ok(handle) => {
                debug!("Timer thread started ({:?} period)", interval);
                self.running = Some((stop, handle));
            }
            Err(err) => warn!("Failed to spawn timer thread: {}", err),
        }
    }

    fn cancel(&mut self) {
        if let Some((stop, handle)) = self.running.take() {
            stop.store(true, Ordering::Release);
            if handle.join().is_err() {
                warn!("Timer thread panicked");
            }
            debug!("Timer thread stopped");
        }
    }
}

/// Deadline of the tick after the one due at `deadline`.
///
/// Ticks missed by an overrun are dropped, not fired back to back.
fn next_deadline(deadline: Instant, interval: Duration, now: Instant) -> Instant {
    let next = deadline + interval;
    if next < now {
        now + interval
    } else {
        next
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
