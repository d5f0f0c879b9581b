//! Event-to-notification routing.

use std::sync::Arc;

use ecodeli_core::types::DbId;
use ecodeli_db::models::notification::{CreateNotification, CHANNEL_EMAIL, CHANNEL_IN_APP};
use ecodeli_db::repositories::{NotificationRepo, UserRepo};
use ecodeli_db::DbPool;
use ecodeli_events::{EmailDelivery, NotificationText, PlatformEvent};
use tokio::sync::broadcast;

/// Routes platform events to the user they concern.
///
/// Every notifiable event produces one in-app notification. With an
/// [`EmailDelivery`] configured the same text is also emailed; email
/// failures are logged and never retried.
pub struct NotificationRouter {
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, email: Option<Arc<EmailDelivery>>) -> Self {
        Self { pool, email }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](ecodeli_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver notifications for a single event.
    pub async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let Some(text) = NotificationText::for_event(event) else {
            return Ok(());
        };
        let Some(user_id) = event.recipient_id() else {
            tracing::warn!(event_type = %event.event_type, "Event has no recipient, skipping");
            return Ok(());
        };

        let notification = NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                user_id,
                channel: CHANNEL_IN_APP,
                kind: text.kind.clone(),
                title: text.title.clone(),
                message: text.message.clone(),
                data: Some(event.payload.clone()),
            },
        )
        .await?;
        NotificationRepo::mark_delivered(&self.pool, notification.id).await?;

        tracing::debug!(
            user_id,
            notification_id = notification.id,
            kind = %text.kind,
            "In-app notification created"
        );

        if let Some(email) = &self.email {
            self.deliver_email(email, user_id, event, &text).await?;
        }

        Ok(())
    }

    async fn deliver_email(
        &self,
        email: &EmailDelivery,
        user_id: DbId,
        event: &PlatformEvent,
        text: &NotificationText,
    ) -> Result<(), sqlx::Error> {
        let Some(user) = UserRepo::find_by_id(&self.pool, user_id).await? else {
            tracing::warn!(user_id, "Notification recipient no longer exists");
            return Ok(());
        };

        let record = NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                user_id,
                channel: CHANNEL_EMAIL,
                kind: text.kind.clone(),
                title: text.title.clone(),
                message: text.message.clone(),
                data: Some(event.payload.clone()),
            },
        )
        .await?;

        match email.deliver(&user.email, text).await {
            Ok(()) => NotificationRepo::mark_delivered(&self.pool, record.id).await?,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id,
                    kind = %text.kind,
                    "Notification email failed"
                );
            }
        }

        Ok(())
    }
}
