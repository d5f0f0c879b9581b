//! Document types and derived document status.
//!
//! [`DocumentType`] is the single canonical enumeration of identity and
//! qualification documents. Older clients send `DRIVER_LICENSE` and
//! `PROFESSIONAL_CERTIFICATION`; both are accepted as input aliases and
//! normalised, but only the canonical names are ever stored or emitted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::ReviewStatus;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentType {
    IdCard,
    DrivingLicense,
    VehicleRegistration,
    Insurance,
    BusinessRegistration,
    ProofOfAddress,
    QualificationCertificate,
    CriminalRecord,
    Selfie,
    Other,
}

impl DocumentType {
    pub const ALL: &'static [DocumentType] = &[
        DocumentType::IdCard,
        DocumentType::DrivingLicense,
        DocumentType::VehicleRegistration,
        DocumentType::Insurance,
        DocumentType::BusinessRegistration,
        DocumentType::ProofOfAddress,
        DocumentType::QualificationCertificate,
        DocumentType::CriminalRecord,
        DocumentType::Selfie,
        DocumentType::Other,
    ];

    /// Canonical storage and wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::IdCard => "ID_CARD",
            DocumentType::DrivingLicense => "DRIVING_LICENSE",
            DocumentType::VehicleRegistration => "VEHICLE_REGISTRATION",
            DocumentType::Insurance => "INSURANCE",
            DocumentType::BusinessRegistration => "BUSINESS_REGISTRATION",
            DocumentType::ProofOfAddress => "PROOF_OF_ADDRESS",
            DocumentType::QualificationCertificate => "QUALIFICATION_CERTIFICATE",
            DocumentType::CriminalRecord => "CRIMINAL_RECORD",
            DocumentType::Selfie => "SELFIE",
            DocumentType::Other => "OTHER",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase();
        match normalised.as_str() {
            "DRIVER_LICENSE" => return Ok(DocumentType::DrivingLicense),
            "PROFESSIONAL_CERTIFICATION" => return Ok(DocumentType::QualificationCertificate),
            _ => {}
        }
        DocumentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalised)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid document type '{s}'. Must be one of: {}",
                    DocumentType::ALL
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl Serialize for DocumentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Review status adjusted for document expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectiveStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl EffectiveStatus {
    /// Compute the effective status of a document at `now`.
    ///
    /// An approved document whose expiry date has passed is EXPIRED.
    /// Pending and rejected documents keep their stored status; expiry only
    /// matters once something has been approved.
    pub fn of(status: ReviewStatus, expires_at: Option<Timestamp>, now: Timestamp) -> Self {
        match status {
            ReviewStatus::Pending => EffectiveStatus::Pending,
            ReviewStatus::Rejected => EffectiveStatus::Rejected,
            ReviewStatus::Approved => match expires_at {
                Some(expiry) if expiry < now => EffectiveStatus::Expired,
                _ => EffectiveStatus::Approved,
            },
        }
    }

    /// Whether the owner should upload a replacement.
    pub fn can_resubmit(self) -> bool {
        matches!(self, EffectiveStatus::Rejected | EffectiveStatus::Expired)
    }
}

pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 365;

/// Look-ahead for the "expiring soon" listing. Defaults to 30 days.
pub fn expiry_window(days: Option<i64>) -> Result<chrono::Duration, CoreError> {
    let days = days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "days must be between 0 and {MAX_EXPIRY_WINDOW_DAYS}, got {days}"
        )));
    }
    Ok(chrono::Duration::days(days))
}
