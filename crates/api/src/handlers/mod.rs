pub mod admin;
pub mod documents;
pub mod notification;
pub mod profile;
pub mod verification;
