//! EVN Daily Library
//!
//! Daily electricity-consumption acquisition for EVN customer portals,
//! with a synthetic fallback so every run produces a result document.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): entities, value objects and errors
//!   - `entities/`: Credential, ConsumptionRecord, CustomerInfo, ResultDocument
//!   - `value_objects/`: Region, DataSource, RunStatus
//!   - `errors/`: PipelineError
//!
//! - **Ports** (`ports/`): HttpTransport, JitterSource, PipelineRunner
//!
//! - **Services** (`services/`): the acquisition stages, the pipeline that
//!   chains them, and the cron-mode run history tracker
//!
//! - **Adapters** (`adapters/`): reqwest transport, JSON output store,
//!   run log and subprocess runner
//!
//! - `catalog`: ordered candidate lists the negotiators search
//! - `config`: settings for a run
//!
//! # Usage
//!
//! ```rust,ignore
//! use evn_daily::{AcquisitionPipeline, RandomJitter, ReqwestTransport, Settings};
//!
//! let transport = Arc::new(ReqwestTransport::new(&settings.network.user_agent)?);
//! let mut pipeline = AcquisitionPipeline::new(&settings, transport, Box::new(RandomJitter::from_entropy()));
//! let document = pipeline.run(Local::now().date_naive()).await?;
//! ```

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use adapters::{JsonOutputStore, ReqwestTransport, RunLog, SubprocessRunner};
pub use catalog::{CandidateCatalog, PayloadShape, RegionProfile};
pub use config::{
    AccountConfig, HistoryConfig, HouseholdConfig, NetworkConfig, PricingConfig, Settings,
};
pub use domain::{
    ConsumptionRecord, Credential, CustomerInfo, DataSource, PipelineError, Region,
    ResultDocument, RunStatus, Summary,
};
pub use ports::{HttpTransport, JitterSource, PipelineRunner, RunnerExit};
pub use services::{
    AcquisitionPipeline, FixedJitter, RandomJitter, RegionResolver, RegionTable,
    RunHistoryTracker, RunOutcome,
};
