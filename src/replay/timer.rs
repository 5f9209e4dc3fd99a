//! Hand-driven timer and thread stand-ins for deterministic replays.

use crate::capture::host::{PeriodicTimer, TickCallback};
use crate::sampler::walker::ExecutionSnapshot;
use crate::sampler::ThreadAccessor;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct ManualTimerState {
    on_tick: Option<TickCallback>,
    interval: Option<Duration>,
    starts: usize,
    cancels: usize,
}

/// Timer that only ticks when [`ManualTimer::fire`] is called.
///
/// Clones share state, so a test can keep one handle while the controller
/// owns another.
#[derive(Clone, Default)]
pub struct ManualTimer {
    state: Arc<Mutex<ManualTimerState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick if the timer is started; returns whether it ran
    pub fn fire(&self) -> bool {
        // release the lock before running the callback
        let on_tick = self.state.lock().on_tick.clone();
        match on_tick {
            Some(on_tick) => {
                on_tick();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().on_tick.is_some()
    }

    /// Interval of the most recent start
    pub fn interval(&self) -> Option<Duration> {
        self.state.lock().interval
    }

    pub fn starts(&self) -> usize {
        self.state.lock().starts
    }

    pub fn cancels(&self) -> usize {
        self.state.lock().cancels
    }
}

impl PeriodicTimer for ManualTimer {
    fn start(&mut self, interval: Duration, on_tick: TickCallback) {
        let mut state = self.state.lock();
        state.on_tick = Some(on_tick);
        state.interval = Some(interval);
        state.starts += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.state.lock();
        state.on_tick = None;
        state.cancels += 1;
    }
}

/// Sampled thread whose stack pointer is set by the script
#[derive(Debug, Default)]
pub struct ScriptedThread {
    stack_pointer: Mutex<Option<u32>>,
}

impl ScriptedThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack pointer for the next ticks; `None` makes the thread unavailable
    pub fn set_stack_pointer(&self, stack_pointer: Option<u32>) {
        *self.stack_pointer.lock() = stack_pointer;
    }
}

impl ThreadAccessor for ScriptedThread {
    fn snapshot(&self) -> Option<ExecutionSnapshot> {
        self.stack_pointer.lock().map(ExecutionSnapshot::new)
    }
}
