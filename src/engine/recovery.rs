//! Session failure-recovery state machine.
//!
//! Tracks consecutive navigation failures as an explicit enumerated state
//! rather than nested error handling, so the escalation threshold is
//! independently testable. One bad browser context (stale session, blocked
//! page) degrades the session; the fifth consecutive failure demands a
//! session restart instead of terminating the run.

use log::{debug, warn};

/// Consecutive navigation failures tolerated before the session is restarted
pub const RESTART_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Normal operation
    Healthy,
    /// n consecutive navigation failures without a success
    Degraded(u32),
    /// Threshold reached, browser session must be torn down and relaunched
    Restarting,
}

#[derive(Debug)]
pub struct SessionHealth {
    state: SessionState,
    threshold: u32,
}

impl SessionHealth {
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            state: SessionState::Healthy,
            threshold,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        match self.state {
            SessionState::Healthy => 0,
            SessionState::Degraded(n) => n,
            SessionState::Restarting => self.threshold,
        }
    }

    /// Any successful navigation returns the session to `Healthy`
    pub fn record_success(&mut self) {
        if self.state != SessionState::Healthy {
            debug!(
                "session recovered after {} consecutive failures",
                self.consecutive_failures()
            );
        }
        self.state = SessionState::Healthy;
    }

    /// Record a navigation failure. Returns true when the threshold was
    /// reached and the caller must restart the browser session.
    pub fn record_failure(&mut self) -> bool {
        let failures = match self.state {
            SessionState::Degraded(n) => n + 1,
            _ => 1,
        };
        if failures >= self.threshold {
            warn!("session degraded beyond threshold ({failures} consecutive navigation failures)");
            self.state = SessionState::Restarting;
            true
        } else {
            debug!("navigation failure {failures}/{}", self.threshold);
            self.state = SessionState::Degraded(failures);
            false
        }
    }

    /// Reset after the browser session was relaunched
    pub fn mark_restarted(&mut self) {
        self.state = SessionState::Healthy;
    }
}

impl Default for SessionHealth {
    fn default() -> Self {
        Self::new(RESTART_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_escalate_to_restart_at_threshold() {
        let mut health = SessionHealth::default();
        for expected in 1..RESTART_THRESHOLD {
            assert!(!health.record_failure());
            assert_eq!(health.state(), SessionState::Degraded(expected));
        }
        assert!(health.record_failure());
        assert_eq!(health.state(), SessionState::Restarting);
    }

    #[test]
    fn success_resets_the_counter() {
        let mut health = SessionHealth::default();
        health.record_failure();
        health.record_failure();
        health.record_success();
        assert_eq!(health.state(), SessionState::Healthy);

        // Counter starts over: four more failures do not trigger a restart.
        for _ in 0..RESTART_THRESHOLD - 1 {
            assert!(!health.record_failure());
        }
        assert!(health.record_failure());
    }

    #[test]
    fn restart_returns_to_healthy() {
        let mut health = SessionHealth::new(2);
        health.record_failure();
        assert!(health.record_failure());
        health.mark_restarted();
        assert_eq!(health.state(), SessionState::Healthy);
        assert_eq!(health.consecutive_failures(), 0);
    }
}
