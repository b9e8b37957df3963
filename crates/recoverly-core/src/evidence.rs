//! Expected evidence per lane and completeness against it.
//!
//! The table is configuration, not schema: callers may load their own from
//! JSON (keys are lane tokens, values are ordered evidence-type lists).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::case::{Case, CaseLane, EvidenceType};

/// Ordered list of evidence types each lane needs before filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedEvidence(BTreeMap<CaseLane, Vec<EvidenceType>>);

impl Default for ExpectedEvidence {
    fn default() -> Self {
        use EvidenceType::*;
        let mut table = BTreeMap::new();
        table.insert(
            CaseLane::Overcharge,
            vec![
                ShipstationLabel,
                ShipstationShipment,
                CarrierInvoiceLine,
                AdjustmentLine,
            ],
        );
        table.insert(
            CaseLane::LateDelivery,
            vec![
                ShipstationShipment,
                TrackingEvents,
                PromisedDeliverySource,
                ShipstationLabel,
            ],
        );
        table.insert(
            CaseLane::Lost,
            vec![ShipstationShipment, TrackingEvents, ShipstationLabel],
        );
        table.insert(
            CaseLane::Damage,
            vec![ShipstationShipment, TrackingEvents, Photos, ShipstationLabel],
        );
        Self(table)
    }
}

impl ExpectedEvidence {
    /// Expected types for a lane. A lane missing from the table expects nothing.
    pub fn for_lane(&self, lane: CaseLane) -> &[EvidenceType] {
        self.0.get(&lane).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, lane: CaseLane, expected: Vec<EvidenceType>) {
        self.0.insert(lane, expected);
    }

    /// Completeness of a case against its own lane's entry.
    pub fn completeness(&self, case: &Case) -> Completeness {
        evidence_completeness(case, self.for_lane(case.lane))
    }
}

/// How many expected evidence types a case carries, and which are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completeness {
    pub present: usize,
    pub missing: Vec<EvidenceType>,
}

impl Completeness {
    pub fn expected(&self) -> usize {
        self.present + self.missing.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Set difference between `expected` and the evidence types on `case`.
///
/// `missing` keeps the order of `expected`. Duplicate entries in `expected`
/// are counted each time they appear.
pub fn evidence_completeness(case: &Case, expected: &[EvidenceType]) -> Completeness {
    let present_types: HashSet<EvidenceType> = case.evidence.iter().map(|e| e.kind).collect();
    let missing: Vec<EvidenceType> = expected
        .iter()
        .copied()
        .filter(|t| !present_types.contains(t))
        .collect();
    Completeness {
        present: expected.len() - missing.len(),
        missing,
    }
}
