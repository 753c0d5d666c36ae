//! Ports (Interfaces)
//!
//! Abstract interfaces the pipeline uses to reach the outside world.
//! Implementations live in `adapters/`; tests substitute mocks.

mod http;
mod jitter;
mod runner;

pub use http::*;
pub use jitter::*;
pub use runner::*;
