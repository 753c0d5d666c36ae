//! Domain Entities
//!
//! Core domain models for the acquisition pipeline.

mod consumption;
mod credential;
mod customer;
mod document;

pub use consumption::*;
pub use credential::*;
pub use customer::*;
pub use document::*;
