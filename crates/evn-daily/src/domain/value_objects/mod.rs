//! Value Objects
//!
//! Immutable value types used throughout the domain.

mod data_source;
mod region;

pub use data_source::*;
pub use region::*;
