//! Immutable case snapshots and the views derived from them.

use std::collections::HashSet;
use std::sync::Arc;

use recoverly_core::{
    Carrier, Case, CaseLane, CaseStatus, Claim, Completeness, ConfidenceLabel, EvidenceType,
    Money, evidence_completeness,
};

use crate::StoreError;

/// An immutable snapshot of the case collection.
///
/// Cloning is cheap: records live behind an `Arc<[Case]>`. Mutations build a
/// new snapshot and leave this one untouched, so any snapshot handed out (to a
/// view, or to an undo window) stays valid forever.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSet {
    cases: Arc<[Case]>,
}

/// Optional constraints combined with AND. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub lane: Option<CaseLane>,
    pub carrier: Option<Carrier>,
    pub confidence: Option<ConfidenceLabel>,
    pub status: Option<CaseStatus>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.lane.is_none_or(|l| l == case.lane)
            && self.carrier.is_none_or(|c| c == case.carrier)
            && self.confidence.is_none_or(|c| c == case.confidence_label)
            && self.status.is_none_or(|s| s == case.status)
    }

    /// Number of constraints set.
    pub fn active(&self) -> usize {
        [
            self.lane.is_some(),
            self.carrier.is_some(),
            self.confidence.is_some(),
            self.status.is_some(),
        ]
        .into_iter()
        .filter(|&b| b)
        .count()
    }
}

/// Per-carrier amounts for the recovery report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierTotals {
    pub carrier: Carrier,
    pub total: Money,
    pub approved: Money,
    pub denied: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialReason {
    pub id: String,
    pub reason: String,
    pub amount: Money,
}

impl From<Vec<Case>> for CaseSet {
    fn from(cases: Vec<Case>) -> Self {
        Self::new(cases)
    }
}

impl CaseSet {
    pub fn new(cases: Vec<Case>) -> Self {
        Self {
            cases: cases.into(),
        }
    }

    /// A fresh copy of the built-in demo cases.
    pub fn demo() -> Result<Self, StoreError> {
        Ok(Self::new(recoverly_core::demo_cases()?))
    }

    pub fn as_slice(&self) -> &[Case] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// True when both snapshots are backed by the same allocation.
    pub fn shares_storage(&self, other: &CaseSet) -> bool {
        Arc::ptr_eq(&self.cases, &other.cases)
    }

    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    // ── Filtered views ──

    fn select(&self, pred: impl Fn(&Case) -> bool) -> Vec<&Case> {
        self.cases.iter().filter(|c| pred(c)).collect()
    }

    pub fn by_status(&self, status: CaseStatus) -> Vec<&Case> {
        self.select(|c| c.status == status)
    }

    pub fn by_lane(&self, lane: CaseLane) -> Vec<&Case> {
        self.select(|c| c.lane == lane)
    }

    pub fn by_carrier(&self, carrier: Carrier) -> Vec<&Case> {
        self.select(|c| c.carrier == carrier)
    }

    /// Cases awaiting the user's approval: FOUND or READY.
    pub fn ready_cases(&self) -> Vec<&Case> {
        self.select(|c| matches!(c.status, CaseStatus::Found | CaseStatus::Ready))
    }

    /// NEEDS_EVIDENCE or DENIED.
    pub fn needs_attention(&self) -> Vec<&Case> {
        self.select(|c| matches!(c.status, CaseStatus::NeedsEvidence | CaseStatus::Denied))
    }

    /// FOUND, READY or NEEDS_EVIDENCE.
    pub fn actionable(&self) -> Vec<&Case> {
        self.select(|c| {
            matches!(
                c.status,
                CaseStatus::Found | CaseStatus::Ready | CaseStatus::NeedsEvidence
            )
        })
    }

    pub fn held_cases(&self) -> Vec<&Case> {
        self.select(|c| c.held)
    }

    pub fn filter(&self, filter: &CaseFilter) -> Vec<&Case> {
        self.select(|c| filter.matches(c))
    }

    /// Case-insensitive match on tracking number, order number, or customer name.
    pub fn search(&self, query: &str) -> Vec<&Case> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.cases.iter().collect();
        }
        self.select(|c| {
            c.tracking_number.to_lowercase().contains(&q)
                || c.shopify_order.order_number.to_lowercase().contains(&q)
                || c.shopify_order.customer_name.to_lowercase().contains(&q)
        })
    }

    // ── Aggregates ──

    /// Sum over APPROVED and PAID cases.
    pub fn total_recovered(&self) -> Money {
        self.sum_where(|c| c.status.is_recovered())
    }

    /// Sum over every case not yet PAID.
    pub fn pipeline_total(&self) -> Money {
        self.sum_where(|c| c.status != CaseStatus::Paid)
    }

    pub fn total_denied(&self) -> Money {
        self.sum_where(|c| c.status == CaseStatus::Denied)
    }

    /// Sum of the amounts of the listed cases. Unknown ids contribute nothing.
    pub fn sum_amounts(&self, ids: &[&str]) -> Money {
        let wanted: HashSet<&str> = ids.iter().copied().collect();
        self.sum_where(|c| wanted.contains(c.id.as_str()))
    }

    fn sum_where(&self, pred: impl Fn(&Case) -> bool) -> Money {
        self.cases.iter().filter(|c| pred(c)).map(|c| c.amount).sum()
    }

    /// Totals per carrier, in order of first appearance.
    pub fn carrier_breakdown(&self) -> Vec<CarrierTotals> {
        let mut out: Vec<CarrierTotals> = Vec::new();
        for case in self.cases.iter() {
            let idx = match out.iter().position(|t| t.carrier == case.carrier) {
                Some(i) => i,
                None => {
                    out.push(CarrierTotals {
                        carrier: case.carrier,
                        total: Money::ZERO,
                        approved: Money::ZERO,
                        denied: Money::ZERO,
                    });
                    out.len() - 1
                }
            };
            let entry = &mut out[idx];
            entry.total += case.amount;
            if case.status.is_recovered() {
                entry.approved += case.amount;
            }
            if case.status == CaseStatus::Denied {
                entry.denied += case.amount;
            }
        }
        out
    }

    pub fn denial_reasons(&self) -> Vec<DenialReason> {
        self.by_status(CaseStatus::Denied)
            .into_iter()
            .map(|c| DenialReason {
                id: c.id.clone(),
                reason: c
                    .denial_note()
                    .unwrap_or("No reason provided")
                    .to_string(),
                amount: c.amount,
            })
            .collect()
    }

    pub fn evidence_completeness(&self, id: &str, expected: &[EvidenceType]) -> Option<Completeness> {
        self.get(id).map(|c| evidence_completeness(c, expected))
    }

    /// Every case seen through the legacy claims-table adapter.
    pub fn claims(&self) -> Vec<Claim> {
        self.cases.iter().map(Claim::from).collect()
    }

    // ── Copy-on-write ──

    /// Apply `f` to a copy of the case with `id`, returning the new snapshot.
    ///
    /// When no case matches, returns a clone of `self` (same storage).
    pub(crate) fn update(&self, id: &str, f: impl FnOnce(&mut Case)) -> CaseSet {
        let Some(idx) = self.cases.iter().position(|c| c.id == id) else {
            return self.clone();
        };
        let mut cases = self.cases.to_vec();
        f(&mut cases[idx]);
        CaseSet::new(cases)
    }
}

impl Default for CaseSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<'a> IntoIterator for &'a CaseSet {
    type Item = &'a Case;
    type IntoIter = std::slice::Iter<'a, Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}
