//! Role requirement catalog.
//!
//! A [`RequirementCatalog`] answers two questions for a role: which document
//! types must be approved before the role is activated, and which profile
//! record activation should flip. It is an immutable value built once at
//! startup and shared through application state; tests build their own with
//! [`RequirementCatalog::new`].

use std::collections::HashMap;

use serde::Serialize;

use crate::documents::DocumentType;
use crate::roles::UserRole;

/// Role-specific profile record that carries verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileKind {
    Deliverer,
    Merchant,
    Provider,
}

impl ProfileKind {
    /// Backing table for this profile kind.
    pub fn table(self) -> &'static str {
        match self {
            ProfileKind::Deliverer => "deliverer_profiles",
            ProfileKind::Merchant => "merchant_profiles",
            ProfileKind::Provider => "provider_profiles",
        }
    }
}

/// What a single role needs in order to be activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRequirement {
    pub required_types: Vec<DocumentType>,
    pub profile: Option<ProfileKind>,
}

impl RoleRequirement {
    pub fn new(required_types: Vec<DocumentType>, profile: Option<ProfileKind>) -> Self {
        Self {
            required_types,
            profile,
        }
    }

    /// A role with no document requirements and no profile to activate.
    pub fn none() -> Self {
        Self::new(Vec::new(), None)
    }
}

/// Immutable role → requirement lookup table.
#[derive(Debug, Clone)]
pub struct RequirementCatalog {
    entries: HashMap<UserRole, RoleRequirement>,
}

impl RequirementCatalog {
    /// Build a catalog from explicit entries. Roles left out have no requirements.
    pub fn new(entries: impl IntoIterator<Item = (UserRole, RoleRequirement)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Required document types for `role`, in catalog order.
    ///
    /// Never fails: a role without an entry requires nothing.
    pub fn required_types(&self, role: UserRole) -> &[DocumentType] {
        self.entries
            .get(&role)
            .map(|r| r.required_types.as_slice())
            .unwrap_or(&[])
    }

    /// Profile kind activated for `role`, if any.
    pub fn profile_kind(&self, role: UserRole) -> Option<ProfileKind> {
        self.entries.get(&role).and_then(|r| r.profile)
    }

    /// Whether `role` may upload a document of type `document_type`.
    pub fn accepts(&self, role: UserRole, document_type: DocumentType) -> bool {
        self.required_types(role).contains(&document_type)
    }
}

impl Default for RequirementCatalog {
    /// The production requirement table.
    fn default() -> Self {
        use DocumentType::*;

        Self::new([
            (
                UserRole::Deliverer,
                RoleRequirement::new(
                    vec![IdCard, DrivingLicense, VehicleRegistration, Insurance],
                    Some(ProfileKind::Deliverer),
                ),
            ),
            (
                UserRole::Provider,
                RoleRequirement::new(
                    vec![IdCard, QualificationCertificate, Insurance, ProofOfAddress],
                    Some(ProfileKind::Provider),
                ),
            ),
            (
                UserRole::Merchant,
                RoleRequirement::new(
                    vec![IdCard, BusinessRegistration, ProofOfAddress],
                    Some(ProfileKind::Merchant),
                ),
            ),
            (UserRole::Client, RoleRequirement::none()),
            (UserRole::Admin, RoleRequirement::none()),
        ])
    }
}
