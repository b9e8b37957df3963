pub mod case;
pub mod claim;
pub mod deadline;
pub mod error;
pub mod evidence;
pub mod fixtures;
pub mod money;
pub mod schema;

pub use case::{
    Carrier, Case, CaseLane, CaseStatus, ConfidenceLabel, Dimensions, Evidence, EvidenceSource,
    EvidenceType, OrderItem, ShipStationShipment, ShopifyOrder, SubmissionRoute, TimelineActor,
    TimelineBranch, TimelineEvent,
};
pub use claim::{Claim, ClaimPage, ClaimQuery, ClaimStatus};
pub use deadline::{DeadlineState, deadline_state};
pub use error::{FixtureError, ParseTokenError};
pub use evidence::{Completeness, ExpectedEvidence, evidence_completeness};
pub use fixtures::{demo_cases, load_cases, parse_cases};
pub use money::Money;
pub use schema::cases;
