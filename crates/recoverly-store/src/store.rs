//! Session object: the current snapshot plus its undo slot.

use std::collections::HashSet;

use recoverly_core::{CaseStatus, Completeness, Evidence};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{HoldMode, StoreConfig, TransitionPolicy};
use crate::set::CaseSet;
use crate::transition::is_allowed;
use crate::undo::{UndoSlot, UndoState, UndoWindow};
use crate::StoreError;

/// Owns the live [`CaseSet`] and applies mutations with an undo window.
///
/// Every user-facing mutation is applied eagerly. The snapshot from just before
/// it is parked in the undo slot, replacing any window still pending.
pub struct CaseStore {
    current: CaseSet,
    undo: UndoSlot,
    config: StoreConfig,
    clock: Box<dyn Clock>,
}

impl CaseStore {
    pub fn new(cases: CaseSet, config: StoreConfig) -> Self {
        Self::with_clock(cases, config, SystemClock)
    }

    pub fn with_clock(cases: CaseSet, config: StoreConfig, clock: impl Clock + 'static) -> Self {
        Self {
            current: cases,
            undo: UndoSlot::default(),
            config,
            clock: Box::new(clock),
        }
    }

    /// A store over the built-in demo cases.
    pub fn demo(config: StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(CaseSet::demo()?, config))
    }

    pub fn cases(&self) -> &CaseSet {
        &self.current
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn pending_undo(&self) -> Option<&UndoWindow> {
        self.undo.current()
    }

    pub fn last_closed_undo(&self) -> Option<UndoState> {
        self.undo.last_closed()
    }

    /// Evidence completeness of a case against the configured lane table.
    pub fn completeness(&self, id: &str) -> Option<Completeness> {
        let case = self.current.get(id)?;
        Some(self.config.expected_evidence.completeness(case))
    }

    // ── Mutations ──

    /// Approve and submit one case.
    ///
    /// Returns `Ok(false)` for an unknown id. Errors only under
    /// [`TransitionPolicy::Enforced`].
    pub fn approve(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.current.contains(id) {
            debug!(id, "approve: no such case");
            return Ok(false);
        }
        self.check_approval(id)?;

        let before = self.current.clone();
        self.current = self.current.approve(id, self.clock.now());
        info!(id, "case approved");
        self.arm(format!("Case {id} approved and submitted."), before);
        Ok(true)
    }

    /// Approve several cases under a single undo window.
    ///
    /// Unknown and repeated ids are skipped. Under the enforced policy every
    /// case is checked before any is changed. Returns the number approved.
    pub fn approve_many(&mut self, ids: &[&str]) -> Result<usize, StoreError> {
        let mut seen = HashSet::new();
        let known: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| self.current.contains(id) && seen.insert(*id))
            .collect();
        if known.is_empty() {
            debug!(requested = ids.len(), "approve_many: no known cases");
            return Ok(0);
        }
        for id in &known {
            self.check_approval(id)?;
        }

        let before = self.current.clone();
        let now = self.clock.now();
        let total = before.sum_amounts(&known);
        self.current = known
            .iter()
            .fold(self.current.clone(), |set, id| set.approve(id, now));
        info!(count = known.len(), %total, "cases approved");
        self.arm(
            format!("{} case(s) approved ({}).", known.len(), total),
            before,
        );
        Ok(known.len())
    }

    /// Place a case on hold according to the configured [`HoldMode`].
    pub fn hold(&mut self, id: &str) -> bool {
        if !self.current.contains(id) {
            debug!(id, "hold: no such case");
            return false;
        }
        let mode = self.config.hold_mode;
        let before = self.current.clone();
        self.current = self.current.hold(id, mode, self.clock.now());
        if mode == HoldMode::Persist {
            info!(id, "case held");
        }
        self.arm(format!("Case {id} placed on hold."), before);
        true
    }

    pub fn record_evidence_received(&mut self, id: &str, evidence: Evidence) -> bool {
        if !self.current.contains(id) {
            debug!(id, "record_evidence_received: no such case");
            return false;
        }
        let before = self.current.clone();
        let kind = evidence.kind;
        self.current = self
            .current
            .record_evidence_received(id, evidence, self.clock.now());
        info!(id, %kind, "evidence recorded");
        self.arm(format!("Case {id} updated with new evidence."), before);
        true
    }

    /// Log an evidence request. Not undoable.
    pub fn record_evidence_requested(&mut self, id: &str) -> bool {
        if !self.current.contains(id) {
            debug!(id, "record_evidence_requested: no such case");
            return false;
        }
        self.current = self.current.record_evidence_requested(id, self.clock.now());
        info!(id, "evidence requested");
        true
    }

    // ── Undo ──

    /// Restore the snapshot captured before the pending mutation.
    pub fn undo(&mut self) -> Result<(), StoreError> {
        let message = self.undo.current().map(|w| w.message().to_string());
        let snapshot = self.undo.undo().ok_or(StoreError::NothingToUndo)?;
        self.current = snapshot;
        info!(message = message.as_deref().unwrap_or_default(), "mutation undone");
        Ok(())
    }

    pub fn dismiss_undo(&mut self) -> bool {
        self.undo.dismiss()
    }

    /// Advance the pending undo window by one tick.
    pub fn tick_undo(&mut self) -> Option<UndoState> {
        self.undo.tick()
    }

    fn arm(&mut self, message: String, before: CaseSet) {
        let window = UndoWindow::new(message, before, self.config.undo_window());
        self.undo.arm(window);
    }

    fn check_approval(&self, id: &str) -> Result<(), StoreError> {
        let Some(case) = self.current.get(id) else {
            return Ok(());
        };
        let to = CaseStatus::Submitted;
        if !is_allowed(case.status, to) {
            match self.config.transition_policy {
                TransitionPolicy::Enforced => {
                    return Err(StoreError::IllegalTransition {
                        id: id.to_string(),
                        from: case.status,
                        to,
                    });
                }
                TransitionPolicy::Unchecked => {
                    warn!(id, from = %case.status, %to, "applying illegal transition");
                }
            }
        }
        if self.config.transition_policy == TransitionPolicy::Enforced {
            let completeness = self.config.expected_evidence.completeness(case);
            if !completeness.is_complete() {
                return Err(StoreError::IncompleteEvidence {
                    id: id.to_string(),
                    missing: completeness.missing,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use recoverly_core::{EvidenceSource, EvidenceType, Money};
    use std::time::Duration;

    fn store(config: StoreConfig) -> CaseStore {
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap();
        CaseStore::with_clock(CaseSet::demo().unwrap(), config, FixedClock(now))
    }

    fn enforced() -> StoreConfig {
        StoreConfig {
            transition_policy: TransitionPolicy::Enforced,
            ..StoreConfig::default()
        }
    }

    fn photos() -> Evidence {
        Evidence {
            kind: EvidenceType::Photos,
            source: EvidenceSource::Upload,
            file_ref: None,
            summary: "Photos of the crushed box.".into(),
        }
    }

    #[test]
    fn approve_arms_undo_window() {
        let mut s = store(StoreConfig::default());
        assert!(s.approve("RC-1002").unwrap());
        assert_eq!(s.cases().get("RC-1002").unwrap().status, CaseStatus::Submitted);
        let window = s.pending_undo().unwrap();
        assert_eq!(window.message(), "Case RC-1002 approved and submitted.");
        assert_eq!(window.remaining(), Duration::from_secs(30));
    }

    #[test]
    fn undo_restores_status_and_evidence_exactly() {
        let mut s = store(StoreConfig::default());
        let original = s.cases().get("RC-1003").unwrap().clone();

        assert!(s.record_evidence_received("RC-1003", photos()));
        assert_eq!(s.cases().get("RC-1003").unwrap().status, CaseStatus::Ready);
        s.tick_undo();
        s.undo().unwrap();

        let restored = s.cases().get("RC-1003").unwrap();
        assert_eq!(restored.status, original.status);
        assert_eq!(restored.evidence, original.evidence);
        assert_eq!(restored, &original);
        assert!(s.pending_undo().is_none());
        assert_eq!(s.last_closed_undo(), Some(UndoState::Undone));
    }

    #[test]
    fn approve_then_undo_restores_whole_case() {
        let mut s = store(StoreConfig::default());
        let original = s.cases().get("RC-1002").unwrap().clone();

        assert!(s.approve("RC-1002").unwrap());
        let approved = s.cases().get("RC-1002").unwrap();
        assert_eq!(approved.status, CaseStatus::Submitted);
        assert_eq!(approved.timeline.len(), original.timeline.len() + 1);
        assert_eq!(approved.timeline.last().unwrap().event, "Claim submitted");

        s.tick_undo();
        s.undo().unwrap();
        let restored = s.cases().get("RC-1002").unwrap();
        assert_eq!(restored.timeline, original.timeline);
        assert_eq!(restored, &original);
        assert_eq!(s.last_closed_undo(), Some(UndoState::Undone));
    }

    #[test]
    fn undo_after_expiry_is_refused() {
        let config = StoreConfig {
            undo_window_ms: 200,
            ..StoreConfig::default()
        };
        let mut s = store(config);
        s.approve("RC-1006").unwrap();
        s.tick_undo();
        assert_eq!(s.tick_undo(), Some(UndoState::Expired));
        assert!(matches!(s.undo(), Err(StoreError::NothingToUndo)));
        assert_eq!(s.cases().get("RC-1006").unwrap().status, CaseStatus::Submitted);
    }

    #[test]
    fn second_mutation_swallows_first_undo() {
        let mut s = store(StoreConfig::default());
        s.approve("RC-1002").unwrap();
        s.approve("RC-1008").unwrap();
        assert_eq!(
            s.pending_undo().unwrap().message(),
            "Case RC-1008 approved and submitted."
        );
        s.undo().unwrap();
        // Only the second approval is reverted.
        assert_eq!(s.cases().get("RC-1008").unwrap().status, CaseStatus::Ready);
        assert_eq!(s.cases().get("RC-1002").unwrap().status, CaseStatus::Submitted);
        assert!(matches!(s.undo(), Err(StoreError::NothingToUndo)));
    }

    #[test]
    fn unknown_id_is_noop_without_undo() {
        let mut s = store(StoreConfig::default());
        let before = s.cases().clone();
        assert!(!s.approve("RC-9999").unwrap());
        assert!(!s.hold("RC-9999"));
        assert!(!s.record_evidence_received("RC-9999", photos()));
        assert!(s.cases().shares_storage(&before));
        assert!(s.pending_undo().is_none());
    }

    #[test]
    fn unchecked_policy_approves_paid_case() {
        let mut s = store(StoreConfig::default());
        assert!(s.approve("RC-1001").unwrap());
        assert_eq!(s.cases().get("RC-1001").unwrap().status, CaseStatus::Submitted);
    }

    #[test]
    fn enforced_policy_rejects_illegal_transition() {
        let mut s = store(enforced());
        let err = s.approve("RC-1001").unwrap_err();
        assert!(matches!(
            err,
            StoreError::IllegalTransition {
                from: CaseStatus::Paid,
                to: CaseStatus::Submitted,
                ..
            }
        ));
        assert_eq!(s.cases().get("RC-1001").unwrap().status, CaseStatus::Paid);
        assert!(s.pending_undo().is_none());
    }

    #[test]
    fn enforced_policy_rejects_incomplete_evidence() {
        let mut s = store(enforced());
        let err = s.approve("RC-1010").unwrap_err();
        match err {
            StoreError::IncompleteEvidence { id, missing } => {
                assert_eq!(id, "RC-1010");
                assert_eq!(missing, vec![EvidenceType::ShipstationLabel]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn enforced_policy_accepts_ready_case_with_full_evidence() {
        let mut s = store(enforced());
        assert!(s.approve("RC-1002").unwrap());
        assert_eq!(s.cases().get("RC-1002").unwrap().status, CaseStatus::Submitted);
    }

    #[test]
    fn enforced_approve_many_is_all_or_nothing() {
        let mut s = store(enforced());
        let before = s.cases().clone();
        assert!(s.approve_many(&["RC-1002", "RC-1001"]).is_err());
        assert!(s.cases().shares_storage(&before));
    }

    #[test]
    fn approve_many_single_window_with_total() {
        let mut s = store(StoreConfig::default());
        let n = s.approve_many(&["RC-1002", "RC-1008", "RC-1002", "RC-9999"]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            s.pending_undo().unwrap().message(),
            format!("2 case(s) approved ({}).", Money::from_cents(8520))
        );
        s.undo().unwrap();
        assert_eq!(s.cases().ready_cases().len(), 4);
    }

    #[test]
    fn approve_many_nothing_known() {
        let mut s = store(StoreConfig::default());
        assert_eq!(s.approve_many(&["RC-9999"]).unwrap(), 0);
        assert!(s.pending_undo().is_none());
    }

    #[test]
    fn toast_hold_arms_window_without_change() {
        let mut s = store(StoreConfig::default());
        let before = s.cases().clone();
        assert!(s.hold("RC-1002"));
        assert!(s.cases().shares_storage(&before));
        assert_eq!(s.pending_undo().unwrap().message(), "Case RC-1002 placed on hold.");
    }

    #[test]
    fn persist_hold_marks_case() {
        let config = StoreConfig {
            hold_mode: HoldMode::Persist,
            ..StoreConfig::default()
        };
        let mut s = store(config);
        assert!(s.hold("RC-1002"));
        assert!(s.cases().get("RC-1002").unwrap().held);
        s.undo().unwrap();
        assert!(!s.cases().get("RC-1002").unwrap().held);
    }

    #[test]
    fn dismiss_keeps_mutation() {
        let mut s = store(StoreConfig::default());
        s.approve("RC-1006").unwrap();
        assert!(s.dismiss_undo());
        assert_eq!(s.cases().get("RC-1006").unwrap().status, CaseStatus::Submitted);
        assert_eq!(s.last_closed_undo(), Some(UndoState::Dismissed));
    }

    #[test]
    fn completeness_uses_configured_table() {
        let s = store(StoreConfig::default());
        let c = s.completeness("RC-1003").unwrap();
        assert_eq!(c.missing, vec![EvidenceType::Photos]);
        assert!(s.completeness("RC-9999").is_none());
    }

    #[test]
    fn evidence_request_is_logged_but_not_undoable() {
        let mut s = store(StoreConfig::default());
        assert!(s.record_evidence_requested("RC-1003"));
        assert!(s.pending_undo().is_none());
        assert_eq!(
            s.cases().get("RC-1003").unwrap().timeline.last().unwrap().event,
            "Customer evidence requested"
        );
    }
}
