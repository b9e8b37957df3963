//! Copy-on-write mutations on a [`CaseSet`].
//!
//! Each operation returns a new snapshot. An unknown id is a no-op: the
//! returned snapshot shares storage with the input.

use chrono::{DateTime, Utc};
use recoverly_core::{Case, CaseStatus, ConfidenceLabel, Evidence, TimelineActor, TimelineEvent};

use crate::config::HoldMode;
use crate::set::CaseSet;

/// Channel named in the submission timeline entry.
pub const SUBMISSION_CHANNEL: &str = "claim flow";

/// Confidence reason set when received evidence moves a case to READY.
pub const EVIDENCE_RECEIVED_REASON: &str =
    "Medium: customer evidence received, core evidence now present.";

fn push_event(case: &mut Case, now: DateTime<Utc>, event: &str, note: String, actor: TimelineActor) {
    case.timeline.push(TimelineEvent {
        ts: now,
        event: event.to_string(),
        note,
        actor,
        branch: None,
    });
}

fn push_submission(case: &mut Case, now: DateTime<Utc>) {
    push_event(
        case,
        now,
        "Claim submitted",
        format!("Filed via {}.", SUBMISSION_CHANNEL),
        TimelineActor::Agent,
    );
}

impl CaseSet {
    /// Set status to SUBMITTED and log the submission.
    ///
    /// No status or evidence check happens here; see `CaseStore::approve` for
    /// the policy-aware entry point.
    pub fn approve(&self, id: &str, now: DateTime<Utc>) -> CaseSet {
        self.update(id, |case| {
            case.status = CaseStatus::Submitted;
            push_submission(case, now);
        })
    }

    /// Append the submission timeline entry without touching status.
    pub fn record_approval_submission(&self, id: &str, now: DateTime<Utc>) -> CaseSet {
        self.update(id, |case| push_submission(case, now))
    }

    /// Attach evidence. A NEEDS_EVIDENCE case becomes READY with MEDIUM confidence;
    /// any other status is left as it is.
    pub fn record_evidence_received(
        &self,
        id: &str,
        evidence: Evidence,
        now: DateTime<Utc>,
    ) -> CaseSet {
        self.update(id, |case| {
            let note = format!("Received {}: {}", evidence.kind.label(), evidence.summary);
            case.evidence.push(evidence);
            push_event(case, now, "Evidence received", note, TimelineActor::User);

            if case.status == CaseStatus::NeedsEvidence {
                case.status = CaseStatus::Ready;
                case.confidence_label = ConfidenceLabel::Medium;
                case.confidence_reason = EVIDENCE_RECEIVED_REASON.to_string();
                push_event(
                    case,
                    now,
                    "Case ready",
                    "All evidence now present. Ready for filing.".to_string(),
                    TimelineActor::Agent,
                );
            }
        })
    }

    /// Log that the customer was asked for evidence.
    pub fn record_evidence_requested(&self, id: &str, now: DateTime<Utc>) -> CaseSet {
        self.update(id, |case| {
            push_event(
                case,
                now,
                "Customer evidence requested",
                "Photo request sent to customer.".to_string(),
                TimelineActor::Agent,
            )
        })
    }

    /// Hold a case. In [`HoldMode::Toast`] nothing changes and `self` is returned.
    pub fn hold(&self, id: &str, mode: HoldMode, now: DateTime<Utc>) -> CaseSet {
        match mode {
            HoldMode::Toast => self.clone(),
            HoldMode::Persist => self.update(id, |case| {
                case.held = true;
                push_event(
                    case,
                    now,
                    "Placed on hold",
                    "User paused filing.".to_string(),
                    TimelineActor::User,
                );
            }),
        }
    }
}
