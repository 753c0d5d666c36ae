//! Pipeline Services
//!
//! The acquisition stages, leaves first, plus the pipeline that chains
//! them and the cron-mode history tracker that wraps a whole run.

pub mod assembler;
pub mod auth;
pub mod consumption;
pub mod endpoint;
pub mod history;
pub mod pipeline;
pub mod region;
pub mod synthetic;

pub use assembler::{records_from_raw, Provenance, ResultAssembler};
pub use auth::AuthNegotiator;
pub use consumption::{ConsumptionFetcher, FetchWindow, FetchedData};
pub use endpoint::{EndpointNegotiator, ReachabilityPolicy};
pub use history::{count_consecutive_failures, RunHistoryTracker, RunOutcome, RunPhase};
pub use pipeline::AcquisitionPipeline;
pub use region::{PrefixRule, RegionResolver, RegionTable};
pub use synthetic::{FixedJitter, RandomJitter, SyntheticDataGenerator};
