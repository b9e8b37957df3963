//! Case records and the enumerations they are built from.
//!
//! Enum variants serialise as SCREAMING_SNAKE_CASE tokens (`NEEDS_EVIDENCE`,
//! `LATE_DELIVERY`, ...) to match the fixture format. `FromStr` accepts the
//! same tokens case-insensitively, with `-` or a space in place of `_`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ParseTokenError;
use crate::money::Money;

// ── Enumerations ──

/// Category of recoverable issue. Fixed when the case is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseLane {
    Overcharge,
    LateDelivery,
    Lost,
    Damage,
}

impl CaseLane {
    pub const ALL: [CaseLane; 4] = [
        CaseLane::Overcharge,
        CaseLane::LateDelivery,
        CaseLane::Lost,
        CaseLane::Damage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CaseLane::Overcharge => "Overcharge",
            CaseLane::LateDelivery => "Late Delivery",
            CaseLane::Lost => "Lost in Transit",
            CaseLane::Damage => "Damage",
        }
    }

    /// One-line basis for the claim, as shown on the case receipt.
    pub fn basis(self) -> &'static str {
        match self {
            CaseLane::Overcharge => "Billed dims exceed label dims",
            CaseLane::LateDelivery => "Delivered after promised date (Service Guarantee)",
            CaseLane::Lost => "Tracking stalled 14+ days, no scan updates",
            CaseLane::Damage => "Item arrived damaged in transit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Carrier {
    Ups,
    Fedex,
    Usps,
    Other,
}

impl Carrier {
    pub fn label(self) -> &'static str {
        match self {
            Carrier::Ups => "UPS",
            Carrier::Fedex => "FedEx",
            Carrier::Usps => "USPS",
            Carrier::Other => "Other",
        }
    }
}

/// Case lifecycle status, in lifecycle order.
///
/// The allowed-transition table lives in `recoverly-store`; nothing here
/// prevents a record from carrying any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Found,
    NeedsEvidence,
    Ready,
    Submitted,
    UnderReview,
    Approved,
    Denied,
    Appealed,
    Paid,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 9] = [
        CaseStatus::Found,
        CaseStatus::NeedsEvidence,
        CaseStatus::Ready,
        CaseStatus::Submitted,
        CaseStatus::UnderReview,
        CaseStatus::Approved,
        CaseStatus::Denied,
        CaseStatus::Appealed,
        CaseStatus::Paid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CaseStatus::Found => "Found",
            CaseStatus::NeedsEvidence => "Needs Evidence",
            CaseStatus::Ready => "Ready",
            CaseStatus::Submitted => "Submitted",
            CaseStatus::UnderReview => "Under Review",
            CaseStatus::Approved => "Approved",
            CaseStatus::Denied => "Denied",
            CaseStatus::Appealed => "Appealed",
            CaseStatus::Paid => "Paid",
        }
    }

    /// Money has been (or is about to be) returned.
    pub fn is_recovered(self) -> bool {
        matches!(self, CaseStatus::Approved | CaseStatus::Paid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineActor {
    Agent,
    User,
    Carrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineBranch {
    Denial,
    Appeal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceType {
    ShipstationLabel,
    ShipstationShipment,
    TrackingEvents,
    CarrierInvoiceLine,
    UploadedPdf,
    Photos,
    AdjustmentLine,
    PromisedDeliverySource,
}

impl EvidenceType {
    pub fn label(self) -> &'static str {
        match self {
            EvidenceType::ShipstationLabel => "Shipping Label",
            EvidenceType::ShipstationShipment => "Shipment Record",
            EvidenceType::TrackingEvents => "Tracking Events",
            EvidenceType::CarrierInvoiceLine => "Invoice Line Item",
            EvidenceType::UploadedPdf => "Uploaded Document",
            EvidenceType::Photos => "Photos",
            EvidenceType::AdjustmentLine => "Adjustment Record",
            EvidenceType::PromisedDeliverySource => "Delivery Guarantee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceSource {
    Shipstation,
    CarrierInvoice,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionRoute {
    #[default]
    ShipstationClaimFlow,
}

// ── Token parsing and display ──

fn parse_token<T: DeserializeOwned>(kind: &'static str, s: &str) -> Result<T, ParseTokenError> {
    let token = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    serde_json::from_value(serde_json::Value::String(token)).map_err(|_| ParseTokenError {
        kind,
        value: s.to_string(),
    })
}

/// The wire token of an enum value, e.g. `NEEDS_EVIDENCE`.
pub fn token<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

impl FromStr for CaseLane {
    type Err = ParseTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("lane", s)
    }
}

impl FromStr for Carrier {
    type Err = ParseTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("carrier", s)
    }
}

impl FromStr for CaseStatus {
    type Err = ParseTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("status", s)
    }
}

impl FromStr for ConfidenceLabel {
    type Err = ParseTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("confidence label", s)
    }
}

impl FromStr for EvidenceType {
    type Err = ParseTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("evidence type", s)
    }
}

impl FromStr for EvidenceSource {
    type Err = ParseTokenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("evidence source", s)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&token(self))
    }
}

impl fmt::Display for CaseLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&token(self))
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&token(self))
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&token(self))
    }
}

// ── Records ──

/// One supporting artifact attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub kind: EvidenceType,
    pub source: EvidenceSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ref: Option<String>,
    pub summary: String,
}

/// Display-only log entry. Never consulted by store logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub ts: DateTime<Utc>,
    pub event: String,
    pub note: String,
    pub actor: TimelineActor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<TimelineBranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
    pub price: Money,
}

/// Snapshot of the originating storefront order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopifyOrder {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub total: Money,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

/// Package dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub l: u32,
    pub w: u32,
    pub h: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.l, self.w, self.h)
    }
}

/// Snapshot of the shipment as recorded by the shipping platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipStationShipment {
    pub shipment_id: String,
    pub order_number: String,
    pub carrier: String,
    pub service: String,
    pub tracking_number: String,
    pub ship_date: NaiveDate,
    pub weight_oz: u32,
    pub dimensions: Dimensions,
    pub shipping_cost: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_weight_oz: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_dimensions: Option<Dimensions>,
}

/// One detected shipping-cost recovery opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub lane: CaseLane,
    pub carrier: Carrier,
    pub service: String,
    pub amount: Money,
    pub deadline: NaiveDate,
    pub status: CaseStatus,
    pub confidence_label: ConfidenceLabel,
    pub confidence_reason: String,
    #[serde(default)]
    pub submission_route: SubmissionRoute,
    pub tracking_number: String,
    pub shopify_order: ShopifyOrder,
    pub shipstation_shipment: ShipStationShipment,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Set only by the persisting hold mode.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub held: bool,
}

impl Case {
    pub fn has_evidence(&self, kind: EvidenceType) -> bool {
        self.evidence.iter().any(|e| e.kind == kind)
    }

    /// Where the evidence came from, e.g. `ShipStation #SH-2847 | 1 uploaded file`.
    pub fn source_summary(&self) -> String {
        let has = |src: EvidenceSource| self.evidence.iter().any(|e| e.source == src);
        let mut parts = Vec::new();
        if has(EvidenceSource::Shipstation) {
            parts.push(format!(
                "ShipStation #{}",
                self.shipstation_shipment.shipment_id
            ));
        }
        if has(EvidenceSource::CarrierInvoice) {
            parts.push("Carrier invoice line present".to_string());
        }
        let uploads = self
            .evidence
            .iter()
            .filter(|e| e.source == EvidenceSource::Upload)
            .count();
        if uploads > 0 {
            let noun = if uploads == 1 { "file" } else { "files" };
            parts.push(format!("{uploads} uploaded {noun}"));
        }
        parts.join(" | ")
    }

    /// Note of the first timeline event on the denial branch.
    pub fn denial_note(&self) -> Option<&str> {
        self.timeline
            .iter()
            .find(|e| e.branch == Some(TimelineBranch::Denial))
            .map(|e| e.note.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tokens_roundtrip_through_from_str() {
        for status in CaseStatus::ALL {
            let parsed: CaseStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn from_str_is_lenient_about_case_and_separators() {
        assert_eq!(
            "needs-evidence".parse::<CaseStatus>().unwrap(),
            CaseStatus::NeedsEvidence
        );
        assert_eq!(
            "late delivery".parse::<CaseLane>().unwrap(),
            CaseLane::LateDelivery
        );
        assert_eq!("fedex".parse::<Carrier>().unwrap(), Carrier::Fedex);
        assert_eq!(
            "carrier_invoice_line".parse::<EvidenceType>().unwrap(),
            EvidenceType::CarrierInvoiceLine
        );
    }

    #[test]
    fn unknown_token_names_the_kind() {
        let err = "UNRECOVERABLE".parse::<CaseStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status 'UNRECOVERABLE'");
    }

    #[test]
    fn evidence_type_field_is_renamed() {
        let json = r#"{"type":"PHOTOS","source":"UPLOAD","summary":"3 photos"}"#;
        let ev: Evidence = serde_json::from_str(json).unwrap();
        assert_eq!(ev.kind, EvidenceType::Photos);
        assert!(ev.file_ref.is_none());
        let back = serde_json::to_string(&ev).unwrap();
        assert!(back.contains(r#""type":"PHOTOS""#));
        assert!(!back.contains("file_ref"));
    }

    #[test]
    fn labels_match_display_names() {
        assert_eq!(CaseLane::Lost.label(), "Lost in Transit");
        assert_eq!(Carrier::Fedex.label(), "FedEx");
        assert_eq!(CaseStatus::UnderReview.label(), "Under Review");
        assert_eq!(EvidenceType::PromisedDeliverySource.label(), "Delivery Guarantee");
    }

    #[test]
    fn recovered_statuses() {
        let recovered: Vec<CaseStatus> = CaseStatus::ALL
            .into_iter()
            .filter(|s| s.is_recovered())
            .collect();
        assert_eq!(recovered, vec![CaseStatus::Approved, CaseStatus::Paid]);
    }
}
