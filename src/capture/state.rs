//! Capture-window state and its frame-boundary transitions.
//!
//! The transitions here are pure bookkeeping; starting or cancelling the
//! timer and exporting are done by the controller according to the
//! returned [`Transition`].

/// Where the controller is in the capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing pending, timer stopped
    Idle,
    /// Frames pending but the timer has not been started yet
    Armed,
    /// Timer running
    Capturing,
}

/// What a frame boundary asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do
    None,
    /// Start the periodic timer
    Start { interval_micros: u32 },
    /// One pending frame consumed, window stays open
    Countdown { remaining: u32 },
    /// Cancel the timer and export the window
    Close,
}

/// Mutable state of the current capture window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureWindow {
    pub is_capturing: bool,
    pub pending_frames: u32,
    pub interval_micros: u32,
}

impl CaptureWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        match (self.is_capturing, self.pending_frames) {
            (true, _) => CaptureState::Capturing,
            (false, 0) => CaptureState::Idle,
            (false, _) => CaptureState::Armed,
        }
    }

    /// Reset the countdown to `frames`.
    ///
    /// Arming an open window extends it; it never adds to the remaining
    /// count or opens a second window.
    pub fn arm(&mut self, frames: u32) {
        self.pending_frames = frames;
    }

    /// Advance the window by one frame boundary
    pub fn on_frame_boundary(&mut self, interval_micros: u32) -> Transition {
        match (self.is_capturing, self.pending_frames) {
            (true, 0) => {
                self.is_capturing = false;
                Transition::Close
            }
            (false, pending) if pending != 0 => {
                self.is_capturing = true;
                self.interval_micros = interval_micros;
                Transition::Start { interval_micros }
            }
            (true, pending) => {
                self.pending_frames = pending - 1;
                Transition::Countdown {
                    remaining: self.pending_frames,
                }
            }
            (false, _) => Transition::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_boundary_does_nothing() {
        let mut window = CaptureWindow::new();
        assert_eq!(window.state(), CaptureState::Idle);
        assert_eq!(window.on_frame_boundary(50), Transition::None);
        assert_eq!(window.state(), CaptureState::Idle);
    }

    #[test]
    fn test_full_cycle() {
        let mut window = CaptureWindow::new();
        window.arm(2);
        assert_eq!(window.state(), CaptureState::Armed);

        assert_eq!(
            window.on_frame_boundary(80),
            Transition::Start { interval_micros: 80 }
        );
        assert_eq!(window.state(), CaptureState::Capturing);
        assert_eq!(window.interval_micros, 80);

        assert_eq!(window.on_frame_boundary(80), Transition::Countdown { remaining: 1 });
        assert_eq!(window.on_frame_boundary(80), Transition::Countdown { remaining: 0 });
        assert_eq!(window.on_frame_boundary(80), Transition::Close);
        assert_eq!(window.state(), CaptureState::Idle);
        assert_eq!(window.on_frame_boundary(80), Transition::None);
    }

    #[test]
    fn test_rearm_resets_instead_of_adding() {
        let mut window = CaptureWindow::new();
        window.arm(3);
        window.on_frame_boundary(50);
        window.on_frame_boundary(50);
        assert_eq!(window.pending_frames, 2);

        window.arm(3);
        assert_eq!(window.pending_frames, 3);
        assert_eq!(window.state(), CaptureState::Capturing);
        assert_eq!(window.on_frame_boundary(50), Transition::Countdown { remaining: 2 });
    }
}
