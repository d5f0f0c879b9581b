//! EcoDeli verification API server library.
//!
//! Exposes config, state, error handling, the verification workflow and
//! routes so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod verification;
