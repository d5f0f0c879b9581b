//! EcoDeli event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`EventPersistence`]: background service that writes every event to
//!   the `events` table.
//! - [`NotificationText`]: user-facing wording for verification events.
//! - [`delivery`]: external delivery channels (email).

pub mod bus;
pub mod delivery;
pub mod messages;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use messages::NotificationText;
pub use persistence::EventPersistence;
