//! Adapters
//!
//! Concrete implementations of the ports plus the files cron mode keeps.

mod output;
mod reqwest_transport;
mod run_log;
mod subprocess;

pub use output::JsonOutputStore;
pub use reqwest_transport::ReqwestTransport;
pub use run_log::RunLog;
pub use subprocess::SubprocessRunner;
