//! EcoDeli domain core.
//!
//! Pure types, validation, and decision logic for the document verification
//! and role activation workflow. Nothing in this crate performs I/O; the
//! `ecodeli-db` and `ecodeli-api` crates feed it rows and act on its answers.

#[macro_use]
mod lookup;

pub mod aggregation;
pub mod documents;
pub mod error;
pub mod pagination;
pub mod profile;
pub mod requirements;
pub mod roles;
pub mod status;
pub mod types;
pub mod upload;
