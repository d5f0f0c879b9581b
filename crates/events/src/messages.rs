//! User-facing wording for verification events.
//!
//! The same text backs in-app notifications and email bodies.

use crate::bus::{event_types, PlatformEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationText {
    /// Notification kind, equal to the event type name.
    pub kind: String,
    pub title: String,
    pub message: String,
}

fn payload_str<'a>(event: &'a PlatformEvent, key: &str) -> Option<&'a str> {
    event.payload.get(key).and_then(|v| v.as_str())
}

fn humanize(document_type: &str) -> String {
    document_type.replace('_', " ").to_lowercase()
}

impl NotificationText {
    /// Render the text for `event`. Event types users are not notified about yield `None`.
    pub fn for_event(event: &PlatformEvent) -> Option<Self> {
        let document = payload_str(event, "document_type")
            .map(humanize)
            .unwrap_or_else(|| "document".to_string());

        let (title, message) = match event.event_type.as_str() {
            event_types::DOCUMENT_UPLOADED => (
                "Document received".to_string(),
                format!("Your {document} was received and is awaiting review."),
            ),
            event_types::DOCUMENT_REVIEWED => match payload_str(event, "status") {
                Some("APPROVED") => (
                    "Document approved".to_string(),
                    format!("Your {document} has been approved."),
                ),
                Some("REJECTED") => {
                    let message = match payload_str(event, "reason") {
                        Some(reason) if !reason.trim().is_empty() => {
                            format!("Your {document} was rejected: {reason}. Please upload a new one.")
                        }
                        _ => format!("Your {document} was rejected. Please upload a new one."),
                    };
                    ("Document rejected".to_string(), message)
                }
                _ => return None,
            },
            event_types::DOCUMENT_EXPIRED => (
                "Document expired".to_string(),
                format!("Your {document} has expired. Please upload a valid replacement."),
            ),
            event_types::ROLE_ACTIVATED => {
                let role = payload_str(event, "role").unwrap_or("EcoDeli").to_lowercase();
                (
                    "Account verified".to_string(),
                    format!("All required documents are approved. Your {role} account is now active."),
                )
            }
            event_types::DOCUMENTS_MISSING => {
                let missing: Vec<String> = event
                    .payload
                    .get("missing_types")
                    .and_then(|v| v.as_array())
                    .map(|types| {
                        types
                            .iter()
                            .filter_map(|t| t.as_str())
                            .map(humanize)
                            .collect()
                    })
                    .unwrap_or_default();
                if missing.is_empty() {
                    return None;
                }
                let role = payload_str(event, "role").unwrap_or("EcoDeli").to_lowercase();
                (
                    "Documents missing".to_string(),
                    format!(
                        "Your {role} account is not active yet. Still needed: {}.",
                        missing.join(", ")
                    ),
                )
            }
            _ => return None,
        };

        Some(Self {
            kind: event.event_type.clone(),
            title,
            message,
        })
    }
}
