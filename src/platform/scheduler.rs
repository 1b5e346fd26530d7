//! Loop scheduling helpers
//!
//! [`LoopHandle`] guards frame callbacks against firing after the loop that
//! scheduled them was cancelled. [`FixedInterval`] turns host frame deltas into
//! a whole number of fixed-period ticks.

use crate::consts::MAX_SUBSTEPS;

/// Token carried by a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopToken(u64);

/// Generation counter for one frame loop
///
/// Starting a loop invalidates every token issued before it, so at most one
/// loop is ever live.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    generation: u64,
    running: bool,
}

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new loop, superseding any previous one
    pub fn start(&mut self) -> LoopToken {
        self.generation += 1;
        self.running = true;
        log::debug!("Loop started (generation {})", self.generation);
        LoopToken(self.generation)
    }

    /// Stop the current loop; outstanding callbacks become no-ops
    pub fn cancel(&mut self) {
        if self.running {
            log::debug!("Loop cancelled (generation {})", self.generation);
        }
        self.generation += 1;
        self.running = false;
    }

    /// Whether a callback holding `token` may still run
    pub fn is_live(&self, token: LoopToken) -> bool {
        self.running && token.0 == self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Fixed-period tick accumulator
#[derive(Debug, Clone, PartialEq)]
pub struct FixedInterval {
    period_ms: f64,
    accumulated: f64,
}

impl FixedInterval {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms: period_ms.max(1.0),
            accumulated: 0.0,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Change the period; pending time is discarded so old and new periods never overlap
    pub fn set_period(&mut self, period_ms: f64) {
        let period_ms = period_ms.max(1.0);
        if period_ms != self.period_ms {
            self.period_ms = period_ms;
            self.accumulated = 0.0;
        }
    }

    /// Add elapsed wall-clock time and return how many ticks are due
    ///
    /// At most `MAX_SUBSTEPS` ticks are returned per call; backlog beyond that
    /// (a stalled tab, a debugger break) is dropped.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0;
        }
        let cap = self.period_ms * MAX_SUBSTEPS as f64;
        self.accumulated = (self.accumulated + elapsed_ms).min(cap);

        let mut due = 0;
        while self.accumulated >= self.period_ms && due < MAX_SUBSTEPS {
            self.accumulated -= self.period_ms;
            due += 1;
        }
        due
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_invalidates_outstanding_tokens() {
        let mut handle = LoopHandle::new();
        let token = handle.start();
        assert!(handle.is_live(token));

        handle.cancel();
        assert!(!handle.is_live(token));
        assert!(!handle.is_running());
    }

    #[test]
    fn test_restart_supersedes_previous_loop() {
        let mut handle = LoopHandle::new();
        let first = handle.start();
        let second = handle.start();
        assert!(!handle.is_live(first));
        assert!(handle.is_live(second));
    }

    #[test]
    fn test_token_from_cancelled_loop_stays_dead_after_restart() {
        let mut handle = LoopHandle::new();
        let old = handle.start();
        handle.cancel();
        let _new = handle.start();
        assert!(!handle.is_live(old));
    }

    #[test]
    fn test_hidden_page_stops_loop_until_shown_again() {
        let mut handle = LoopHandle::new();
        let before = handle.start();

        // pagehide
        handle.cancel();
        assert!(!handle.is_running());

        // pageshow only restarts a stopped loop
        let after = handle.start();
        assert!(handle.is_running());
        assert!(handle.is_live(after));
        assert!(!handle.is_live(before));
    }

    #[test]
    fn test_interval_accumulates_partial_frames() {
        let mut timer = FixedInterval::new(150.0);
        assert_eq!(timer.advance(100.0), 0);
        assert_eq!(timer.advance(60.0), 1);
        assert_eq!(timer.advance(140.0), 1);
        assert_eq!(timer.advance(10.0), 0);
    }

    #[test]
    fn test_interval_caps_backlog() {
        let mut timer = FixedInterval::new(10.0);
        assert_eq!(timer.advance(10_000.0), MAX_SUBSTEPS);
        assert_eq!(timer.advance(0.0), 0);
    }

    #[test]
    fn test_set_period_clears_pending_time() {
        let mut timer = FixedInterval::new(150.0);
        assert_eq!(timer.advance(140.0), 0);
        timer.set_period(140.0);
        assert_eq!(timer.advance(20.0), 0);

        // Same period keeps the accumulator
        timer.set_period(140.0);
        assert_eq!(timer.advance(120.0), 1);
    }

    #[test]
    fn test_ignores_bad_deltas() {
        let mut timer = FixedInterval::new(16.0);
        assert_eq!(timer.advance(-5.0), 0);
        assert_eq!(timer.advance(f64::NAN), 0);
        assert_eq!(timer.advance(16.0), 1);
    }
}
