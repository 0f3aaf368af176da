/// Frame timing snapshot handed to scene updates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds between the two most recent frame boundaries.
    pub dt: f64,

    /// Monotonic counter of completed frames before this one.
    pub frame_index: u64,
}

/// Frame clock driven by externally supplied monotonic timestamps (seconds).
///
/// The clock does not read time itself; the loop passes the platform's `now()`
/// so tests can script timestamps. A frame's delta is measured at the end of the
/// previous iteration, which means the first iteration has no delta at all.
#[derive(Debug, Clone)]
pub struct FrameClock {
    begin: f64,
    dt: Option<f64>,
    frame_index: u64,
    dt_max: Option<f64>,
}

impl FrameClock {
    /// Creates a clock whose baseline is `now`.
    pub fn new(now: f64) -> Self {
        Self {
            begin: now,
            dt: None,
            frame_index: 0,
            dt_max: None,
        }
    }

    /// Creates a clock that clamps delta time to at most `dt_max` seconds.
    ///
    /// Useful after debugger pauses or window drags that stall the loop.
    pub fn with_max_dt(now: f64, dt_max: f64) -> Self {
        debug_assert!(dt_max >= 0.0);
        Self {
            dt_max: Some(dt_max),
            ..Self::new(now)
        }
    }

    /// Resets the baseline and forgets the pending delta.
    pub fn reset(&mut self, now: f64) {
        self.begin = now;
        self.dt = None;
    }

    /// Returns the timing for the current iteration, or `None` before the first
    /// frame boundary has been recorded.
    pub fn current(&self) -> Option<FrameTime> {
        self.dt.map(|dt| FrameTime {
            dt,
            frame_index: self.frame_index,
        })
    }

    /// Records the end of an iteration at `now`.
    ///
    /// The next iteration's delta is `now - previous`, never negative.
    pub fn end_frame(&mut self, now: f64) {
        let mut dt = (now - self.begin).max(0.0);
        if let Some(max) = self.dt_max {
            dt = dt.min(max);
        }

        self.dt = Some(dt);
        self.begin = now;
        self.frame_index = self.frame_index.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delta_before_first_boundary() {
        let clock = FrameClock::new(10.0);
        assert_eq!(clock.current(), None);
    }

    #[test]
    fn delta_is_difference_of_boundaries() {
        let mut clock = FrameClock::new(1.0);
        clock.end_frame(1.25);
        assert_eq!(clock.current(), Some(FrameTime { dt: 0.25, frame_index: 1 }));

        clock.end_frame(2.0);
        assert_eq!(clock.current(), Some(FrameTime { dt: 0.75, frame_index: 2 }));
    }

    #[test]
    fn backwards_time_yields_zero() {
        let mut clock = FrameClock::new(5.0);
        clock.end_frame(4.0);
        assert_eq!(clock.current().map(|t| t.dt), Some(0.0));
    }

    #[test]
    fn max_dt_clamps() {
        let mut clock = FrameClock::with_max_dt(0.0, 0.1);
        clock.end_frame(3.0);
        assert_eq!(clock.current().map(|t| t.dt), Some(0.1));
    }

    #[test]
    fn reset_drops_pending_delta() {
        let mut clock = FrameClock::new(0.0);
        clock.end_frame(0.5);
        clock.reset(9.0);
        assert_eq!(clock.current(), None);
        clock.end_frame(9.5);
        assert_eq!(clock.current().map(|t| t.dt), Some(0.5));
    }
}
