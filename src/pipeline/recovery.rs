//! Fault classification and recovery escalation
//!
//! [`RecoveryState`] is a pure state machine: it is told about faults and
//! successes and answers with the [`RecoveryAction`] to take. The runner
//! performs the action against its collaborators and reports back.
//!
//! ```text
//! Inconsistent / Timeout   same-kind count >= 3 and cooldown elapsed -> Refresh
//! StructureMissing         crash += 1                               -> ResetBaseline
//! anything else            crash += 1, crash >= 5                    -> Refresh
//!                          Refresh failed and crash >= 7             -> Reload
//! successful cycle         both counters cleared
//! ```

use std::time::{Duration, Instant};

use super::sources::SourceError;

/// Same-kind transient faults tolerated before a refresh
pub const TRANSIENT_THRESHOLD: u32 = 3;

/// Minimum time between a recovery and a transient-triggered refresh
pub const RECOVERY_COOLDOWN: Duration = Duration::from_secs(30);

/// Crash count at which a refresh is attempted
pub const CRASH_THRESHOLD: u32 = 5;

/// Crash count at which a failed refresh escalates to a reload
pub const HARD_RECOVERY_THRESHOLD: u32 = CRASH_THRESHOLD + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Inconsistent,
    Timeout,
}

/// Classification of a failed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The source briefly returned something unusable
    Transient(TransientKind),
    /// The structure the source reads from is gone
    Structural,
    Unknown,
}

impl FaultKind {
    pub fn classify(error: &SourceError) -> Self {
        match error {
            SourceError::Inconsistent(_) => FaultKind::Transient(TransientKind::Inconsistent),
            SourceError::Timeout(_) => FaultKind::Transient(TransientKind::Timeout),
            SourceError::StructureMissing(_) => FaultKind::Structural,
            SourceError::Other(_) => FaultKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    None,
    /// Forget the previous snapshot
    ResetBaseline,
    /// Ask the source to refresh its view
    Refresh(FaultKind),
    /// Fully reload the source
    Reload,
}

#[derive(Debug, Clone)]
pub struct RecoveryState {
    consecutive_fault_kind: Option<TransientKind>,
    consecutive_fault_count: u32,
    total_crash_count: u32,
    last_recovery: Instant,
}

impl RecoveryState {
    /// `now` counts as the last recovery, so the cooldown starts immediately
    pub fn new(now: Instant) -> Self {
        Self {
            consecutive_fault_kind: None,
            consecutive_fault_count: 0,
            total_crash_count: 0,
            last_recovery: now,
        }
    }

    pub fn consecutive_fault_kind(&self) -> Option<TransientKind> {
        self.consecutive_fault_kind
    }

    pub fn consecutive_fault_count(&self) -> u32 {
        self.consecutive_fault_count
    }

    pub fn total_crash_count(&self) -> u32 {
        self.total_crash_count
    }

    pub fn last_recovery(&self) -> Instant {
        self.last_recovery
    }

    /// A cycle completed without a fault
    pub fn record_success(&mut self) {
        self.clear_counters();
    }

    /// Count a fault and decide what to do about it
    pub fn record_fault(&mut self, kind: FaultKind, now: Instant) -> RecoveryAction {
        match kind {
            FaultKind::Transient(transient) => {
                if self.consecutive_fault_kind == Some(transient) {
                    self.consecutive_fault_count += 1;
                } else {
                    self.consecutive_fault_kind = Some(transient);
                    self.consecutive_fault_count = 1;
                }
                let cooled_down = now.saturating_duration_since(self.last_recovery) >= RECOVERY_COOLDOWN;
                if self.consecutive_fault_count >= TRANSIENT_THRESHOLD && cooled_down {
                    RecoveryAction::Refresh(kind)
                } else {
                    RecoveryAction::None
                }
            }
            FaultKind::Structural => {
                self.total_crash_count += 1;
                RecoveryAction::ResetBaseline
            }
            FaultKind::Unknown => {
                self.total_crash_count += 1;
                if self.total_crash_count >= CRASH_THRESHOLD {
                    RecoveryAction::Refresh(kind)
                } else {
                    RecoveryAction::None
                }
            }
        }
    }

    /// The runner carried out `action` successfully
    pub fn recovery_succeeded(&mut self, action: RecoveryAction, now: Instant) {
        match action {
            RecoveryAction::None | RecoveryAction::ResetBaseline => return,
            RecoveryAction::Refresh(FaultKind::Transient(_)) => {
                self.consecutive_fault_kind = None;
                self.consecutive_fault_count = 0;
            }
            RecoveryAction::Refresh(_) | RecoveryAction::Reload => self.clear_counters(),
        }
        self.last_recovery = now;
    }

    /// The runner failed to carry out `action`; returns the escalation, if any
    pub fn recovery_failed(&mut self, action: RecoveryAction) -> RecoveryAction {
        match action {
            RecoveryAction::Refresh(FaultKind::Unknown) if self.total_crash_count >= HARD_RECOVERY_THRESHOLD => {
                RecoveryAction::Reload
            }
            _ => RecoveryAction::None,
        }
    }

    fn clear_counters(&mut self) {
        self.consecutive_fault_kind = None;
        self.consecutive_fault_count = 0;
        self.total_crash_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCONSISTENT: FaultKind = FaultKind::Transient(TransientKind::Inconsistent);
    const TIMEOUT: FaultKind = FaultKind::Transient(TransientKind::Timeout);

    #[test]
    fn test_transient_faults_wait_for_cooldown() {
        //! Three inconsistent reads right after start do nothing; after the
        //! cooldown the next one triggers a refresh
        let start = Instant::now();
        let mut state = RecoveryState::new(start);
        for _ in 0..3 {
            assert_eq!(state.record_fault(INCONSISTENT, start), RecoveryAction::None);
        }
        assert_eq!(state.consecutive_fault_count(), 3);

        let later = start + RECOVERY_COOLDOWN;
        assert_eq!(state.record_fault(INCONSISTENT, later), RecoveryAction::Refresh(INCONSISTENT));
        state.recovery_succeeded(RecoveryAction::Refresh(INCONSISTENT), later);
        assert_eq!(state.consecutive_fault_count(), 0);
        assert_eq!(state.last_recovery(), later);
    }

    #[test]
    fn test_different_transient_kind_restarts_count() {
        let start = Instant::now();
        let mut state = RecoveryState::new(start);
        let later = start + RECOVERY_COOLDOWN;
        state.record_fault(INCONSISTENT, later);
        state.record_fault(INCONSISTENT, later);
        assert_eq!(state.record_fault(TIMEOUT, later), RecoveryAction::None);
        assert_eq!(state.consecutive_fault_kind(), Some(TransientKind::Timeout));
        assert_eq!(state.consecutive_fault_count(), 1);
        state.record_fault(TIMEOUT, later);
        assert_eq!(state.record_fault(TIMEOUT, later), RecoveryAction::Refresh(TIMEOUT));
    }

    #[test]
    fn test_transient_faults_do_not_touch_crash_count() {
        let mut state = RecoveryState::new(Instant::now());
        state.record_fault(TIMEOUT, Instant::now());
        assert_eq!(state.total_crash_count(), 0);
    }

    #[test]
    fn test_structural_fault_resets_baseline_and_counts() {
        let now = Instant::now();
        let mut state = RecoveryState::new(now);
        assert_eq!(state.record_fault(FaultKind::Structural, now), RecoveryAction::ResetBaseline);
        assert_eq!(state.total_crash_count(), 1);
    }

    #[test]
    fn test_fifth_unknown_fault_refreshes_and_clears_counters() {
        //! Five consecutive unknown faults produce exactly one recovery, after
        //! which both counters are zero
        let now = Instant::now();
        let mut state = RecoveryState::new(now);
        let actions: Vec<_> = (0..5).map(|_| state.record_fault(FaultKind::Unknown, now)).collect();
        let recoveries: Vec<_> = actions.iter().filter(|a| **a != RecoveryAction::None).collect();
        assert_eq!(recoveries, vec![&RecoveryAction::Refresh(FaultKind::Unknown)]);

        state.recovery_succeeded(RecoveryAction::Refresh(FaultKind::Unknown), now);
        assert_eq!(state.total_crash_count(), 0);
        assert_eq!(state.consecutive_fault_count(), 0);
    }

    #[test]
    fn test_failed_refreshes_escalate_to_reload_at_seventh_fault() {
        let now = Instant::now();
        let mut state = RecoveryState::new(now);
        let mut reloads = 0;
        for _ in 0..7 {
            let action = state.record_fault(FaultKind::Unknown, now);
            if let RecoveryAction::Refresh(_) = action {
                if state.recovery_failed(action) == RecoveryAction::Reload {
                    reloads += 1;
                    state.recovery_succeeded(RecoveryAction::Reload, now);
                }
            }
        }
        assert_eq!(reloads, 1);
        assert_eq!(state.total_crash_count(), 0);
    }

    #[test]
    fn test_success_clears_everything() {
        let now = Instant::now();
        let mut state = RecoveryState::new(now);
        state.record_fault(FaultKind::Unknown, now);
        state.record_fault(INCONSISTENT, now);
        state.record_success();
        assert_eq!(state.total_crash_count(), 0);
        assert_eq!(state.consecutive_fault_count(), 0);
        assert_eq!(state.consecutive_fault_kind(), None);
    }
}
