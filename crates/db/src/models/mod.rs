//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches, validated with `validator`
//!   where they come straight from a request body

pub mod audit;
pub mod document;
pub mod event;
pub mod notification;
pub mod profile;
pub mod user;
pub mod verification;
pub mod verification_history;
