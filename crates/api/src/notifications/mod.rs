//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and turns
//! verification events into in-app notifications and, when SMTP is
//! configured, emails to the document owner.

pub mod router;

pub use router::NotificationRouter;
