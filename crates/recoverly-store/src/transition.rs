//! Intended case lifecycle.
//!
//! Only consulted under [`TransitionPolicy::Enforced`](crate::TransitionPolicy);
//! in the default policy an illegal move is applied anyway and logged.

use recoverly_core::CaseStatus;

/// Statuses a case may move to from `from`.
pub fn allowed_next(from: CaseStatus) -> &'static [CaseStatus] {
    use CaseStatus::*;
    match from {
        Found => &[NeedsEvidence, Ready, Submitted],
        NeedsEvidence => &[Ready],
        Ready => &[Submitted],
        Submitted => &[UnderReview],
        UnderReview => &[Approved, Denied],
        Denied => &[Appealed],
        Appealed => &[UnderReview, Approved, Denied],
        Approved => &[Paid],
        Paid => &[],
    }
}

pub fn is_allowed(from: CaseStatus, to: CaseStatus) -> bool {
    allowed_next(from).contains(&to)
}
