//! Authentication primitives.
//!
//! Tokens are issued by the account service; this server only validates
//! them. [`jwt::generate_access_token`] exists for operators and tests.

pub mod jwt;
