//! `tally-recon`: two-source keyed record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded collections, returns discrepancies.
//! No filesystem or database dependencies.

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod load;
pub mod model;
pub mod range;
pub mod reconcile;
pub mod schedule;
pub mod sink;
pub mod snapshot;

pub use config::{ReconConfig, ReconOptions};
pub use engine::run;
pub use error::ReconError;
pub use model::{
    Discrepancy, DiscrepancyKind, FieldValue, KindCount, ReconInput, ReconResult, Record,
    RecordSet, Side,
};
pub use range::KeyRange;
pub use reconcile::reconcile;
pub use schedule::ProcessingDecision;
pub use sink::{DiscrepancySink, MemorySink};
