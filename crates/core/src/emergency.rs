//! Global kill-switch. Two states, running and stopped; stopped is terminal
//! until an explicit reset from the main loop.

/// Owned and mutated exclusively by the loop thread (single-writer rule),
/// so no interior locking is needed.
#[derive(Debug, Default)]
pub struct EmergencyController {
    stopped: bool,
}

impl EmergencyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// `running -> stopped`. Halts all further dispatch without terminating
    /// the process.
    pub fn trigger(&mut self) {
        if !self.stopped {
            tracing::warn!("emergency stop engaged");
        }
        self.stopped = true;
    }

    /// `stopped -> running`, only ever driven by an explicit `reset` command.
    /// Calling while already running is a no-op.
    pub fn reset(&mut self) {
        if self.stopped {
            tracing::info!("emergency stop cleared");
        }
        self.stopped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        let ctl = EmergencyController::new();
        assert!(!ctl.is_stopped());
    }

    #[test]
    fn test_trigger_then_reset() {
        let mut ctl = EmergencyController::new();
        ctl.trigger();
        assert!(ctl.is_stopped());
        ctl.reset();
        assert!(!ctl.is_stopped());
    }

    #[test]
    fn test_reset_while_running_is_noop() {
        let mut ctl = EmergencyController::new();
        ctl.reset();
        assert!(!ctl.is_stopped());
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let mut ctl = EmergencyController::new();
        ctl.trigger();
        ctl.trigger();
        assert!(ctl.is_stopped());
    }
}
