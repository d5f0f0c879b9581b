//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads take any `PgExecutor` so they can run on the pool or inside a
//! caller's transaction; writes that must be atomic with other writes take
//! `&mut PgConnection`.

pub mod audit_repo;
pub mod document_repo;
pub mod event_repo;
pub mod notification_repo;
pub mod profile_repo;
pub mod user_repo;
pub mod verification_history_repo;
pub mod verification_repo;

pub use audit_repo::AuditLogRepo;
pub use document_repo::DocumentRepo;
pub use event_repo::EventRepo;
pub use notification_repo::NotificationRepo;
pub use profile_repo::ProfileRepo;
pub use user_repo::UserRepo;
pub use verification_history_repo::VerificationHistoryRepo;
pub use verification_repo::VerificationRepo;
