//! Case store: immutable snapshots, derived views, copy-on-write mutations, undo.

mod clock;
mod config;
mod countdown;
mod error;
mod mutate;
mod set;
mod store;
mod transition;
mod undo;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{HoldMode, StoreConfig, TransitionPolicy};
pub use countdown::run_undo_countdown;
pub use error::StoreError;
pub use mutate::{EVIDENCE_RECEIVED_REASON, SUBMISSION_CHANNEL};
pub use set::{CarrierTotals, CaseFilter, CaseSet, DenialReason};
pub use store::CaseStore;
pub use transition::{allowed_next, is_allowed};
pub use undo::{DEFAULT_UNDO_WINDOW, UNDO_TICK, UndoSlot, UndoState, UndoWindow};
