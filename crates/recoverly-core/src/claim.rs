//! Legacy claims-list view.
//!
//! A `Claim` is no longer stored anywhere: it is computed from a [`Case`] so
//! the claims table and the case feed can never disagree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::case::{Carrier, Case, CaseStatus};
use crate::money::Money;

pub const CLAIMS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Detected,
    Filed,
    Approved,
    Denied,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 4] = [
        ClaimStatus::Detected,
        ClaimStatus::Filed,
        ClaimStatus::Approved,
        ClaimStatus::Denied,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClaimStatus::Detected => "Detected",
            ClaimStatus::Filed => "Filed",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Denied => "Denied",
        }
    }
}

impl From<CaseStatus> for ClaimStatus {
    fn from(status: CaseStatus) -> Self {
        match status {
            CaseStatus::Found | CaseStatus::NeedsEvidence | CaseStatus::Ready => {
                ClaimStatus::Detected
            }
            CaseStatus::Submitted | CaseStatus::UnderReview | CaseStatus::Appealed => {
                ClaimStatus::Filed
            }
            CaseStatus::Approved | CaseStatus::Paid => ClaimStatus::Approved,
            CaseStatus::Denied => ClaimStatus::Denied,
        }
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = crate::error::ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detected" => Ok(ClaimStatus::Detected),
            "filed" => Ok(ClaimStatus::Filed),
            "approved" => Ok(ClaimStatus::Approved),
            "denied" => Ok(ClaimStatus::Denied),
            _ => Err(crate::error::ParseTokenError {
                kind: "claim status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub tracking: String,
    pub carrier: Carrier,
    pub issue: String,
    pub amount: Money,
    pub status: ClaimStatus,
    pub date: NaiveDate,
}

impl From<&Case> for Claim {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id.clone(),
            tracking: case.tracking_number.clone(),
            carrier: case.carrier,
            issue: case.lane.label().to_string(),
            amount: case.amount,
            status: case.status.into(),
            date: case.deadline,
        }
    }
}

/// Filters for the claims table. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct ClaimQuery {
    pub status: Option<ClaimStatus>,
    pub carrier: Option<Carrier>,
    /// Case-insensitive substring over tracking number and issue.
    pub search: Option<String>,
}

impl ClaimQuery {
    pub fn matches(&self, claim: &Claim) -> bool {
        if self.status.is_some_and(|s| s != claim.status) {
            return false;
        }
        if self.carrier.is_some_and(|c| c != claim.carrier) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                claim.tracking.to_lowercase().contains(&q) || claim.issue.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }

    /// Filter `claims`, then cut out 1-based `page`.
    ///
    /// Pages past the end come back empty; page 0 is treated as page 1.
    pub fn page(&self, claims: &[Claim], page: usize) -> ClaimPage {
        let filtered: Vec<&Claim> = claims.iter().filter(|c| self.matches(c)).collect();
        let total_matches = filtered.len();
        let total_pages = total_matches.div_ceil(CLAIMS_PER_PAGE);
        let page = page.max(1);
        let items = filtered
            .into_iter()
            .skip((page - 1) * CLAIMS_PER_PAGE)
            .take(CLAIMS_PER_PAGE)
            .cloned()
            .collect();
        ClaimPage {
            items,
            page,
            total_pages,
            total_matches,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClaimPage {
    pub items: Vec<Claim>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Sum of approved claim amounts.
pub fn total_approved(claims: &[Claim]) -> Money {
    claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Approved)
        .map(|c| c.amount)
        .sum()
}

pub fn count_by_status(claims: &[Claim], status: ClaimStatus) -> usize {
    claims.iter().filter(|c| c.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_cases;

    fn demo_claims() -> Vec<Claim> {
        demo_cases().unwrap().iter().map(Claim::from).collect()
    }

    #[test]
    fn status_mapping_covers_lifecycle() {
        assert_eq!(ClaimStatus::from(CaseStatus::NeedsEvidence), ClaimStatus::Detected);
        assert_eq!(ClaimStatus::from(CaseStatus::Appealed), ClaimStatus::Filed);
        assert_eq!(ClaimStatus::from(CaseStatus::Paid), ClaimStatus::Approved);
        assert_eq!(ClaimStatus::from(CaseStatus::Denied), ClaimStatus::Denied);
    }

    #[test]
    fn claim_adapts_case_fields() {
        let claims = demo_claims();
        let c = claims.iter().find(|c| c.id == "RC-1005").unwrap();
        assert_eq!(c.tracking, "794644790245");
        assert_eq!(c.issue, "Lost in Transit");
        assert_eq!(c.status, ClaimStatus::Filed);
        assert_eq!(c.amount, Money::from_cents(15600));
    }

    #[test]
    fn filter_by_status_and_carrier() {
        let claims = demo_claims();
        let query = ClaimQuery {
            status: Some(ClaimStatus::Detected),
            carrier: Some(Carrier::Ups),
            search: None,
        };
        let page = query.page(&claims, 1);
        let ids: Vec<&str> = page.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["RC-1008", "RC-1010"]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn search_matches_issue_case_insensitively() {
        let claims = demo_claims();
        let query = ClaimQuery {
            search: Some("LATE".into()),
            ..Default::default()
        };
        assert_eq!(query.page(&claims, 1).total_matches, 3);
    }

    #[test]
    fn pagination_past_end_is_empty() {
        let claims = demo_claims();
        let query = ClaimQuery::default();
        let first = query.page(&claims, 0);
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 1);
        assert!(query.page(&claims, 2).items.is_empty());
    }

    #[test]
    fn approved_total_and_counts() {
        let claims = demo_claims();
        assert_eq!(total_approved(&claims), Money::from_cents(5110));
        assert_eq!(count_by_status(&claims, ClaimStatus::Detected), 5);
        assert_eq!(count_by_status(&claims, ClaimStatus::Filed), 2);
        assert_eq!(count_by_status(&claims, ClaimStatus::Denied), 1);
    }

    #[test]
    fn claim_status_parses_lowercase_tokens() {
        assert_eq!("Filed".parse::<ClaimStatus>().unwrap(), ClaimStatus::Filed);
        assert!("submitted".parse::<ClaimStatus>().is_err());
    }
}
