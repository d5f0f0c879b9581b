//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each variant's discriminant matches the seed data order (1-based) in the
//! corresponding `*_statuses` table.

use crate::error::CoreError;

define_lookup_enum! {
    /// Review state shared by documents and their verification requests.
    ReviewStatus {
        Pending = 1 => "PENDING",
        Approved = 2 => "APPROVED",
        Rejected = 3 => "REJECTED",
    }
}

define_lookup_enum! {
    /// Account status on the base user record.
    UserStatus {
        Active = 1 => "ACTIVE",
        Inactive = 2 => "INACTIVE",
        Suspended = 3 => "SUSPENDED",
        PendingVerification = 4 => "PENDING_VERIFICATION",
    }
}

define_lookup_enum! {
    /// Verification state on a deliverer, merchant or provider profile.
    ProfileVerificationStatus {
        Pending = 1 => "PENDING",
        Verified = 2 => "VERIFIED",
        Rejected = 3 => "REJECTED",
    }
}

impl ReviewStatus {
    /// Whether this status ends a review (APPROVED or REJECTED).
    pub fn is_decision(self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }

    /// Whether a reviewer may move a record from `self` to `next`.
    ///
    /// Only PENDING records can be decided. Resubmission (REJECTED back to
    /// PENDING) is not a review transition; see [`ensure_resubmittable`].
    pub fn can_transition_to(self, next: ReviewStatus) -> bool {
        self == ReviewStatus::Pending && next.is_decision()
    }
}

/// Validate that a reviewer-supplied status is a decision.
pub fn validate_decision(status: ReviewStatus) -> Result<(), CoreError> {
    if status.is_decision() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid review decision '{status}'. Must be one of: APPROVED, REJECTED"
        )))
    }
}

/// Validate a review transition from `current` to `next`.
pub fn ensure_reviewable(current: ReviewStatus, next: ReviewStatus) -> Result<(), CoreError> {
    validate_decision(next)?;
    if !current.can_transition_to(next) {
        return Err(CoreError::Validation(format!(
            "Cannot change status from {current} to {next}; only PENDING items can be reviewed"
        )));
    }
    Ok(())
}

/// Validate that a record in `current` may be resubmitted for review.
///
/// APPROVED records are final; resubmitting them would silently revoke an
/// approval.
pub fn ensure_resubmittable(current: ReviewStatus) -> Result<(), CoreError> {
    if current == ReviewStatus::Approved {
        return Err(CoreError::Validation(
            "Document is already approved and cannot be resubmitted".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_decided() {
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Approved));
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Rejected));
    }

    #[test]
    fn decided_states_are_terminal_for_review() {
        for from in [ReviewStatus::Approved, ReviewStatus::Rejected] {
            for to in ReviewStatus::ALL {
                assert!(!from.can_transition_to(*to), "{from} -> {to} must be refused");
            }
        }
    }

    #[test]
    fn pending_is_not_a_decision() {
        assert!(validate_decision(ReviewStatus::Pending).is_err());
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::Pending));
    }

    #[test]
    fn ensure_reviewable_reports_current_state() {
        let err = ensure_reviewable(ReviewStatus::Approved, ReviewStatus::Rejected).unwrap_err();
        assert!(err.to_string().contains("from APPROVED to REJECTED"));
    }

    #[test]
    fn rejected_can_be_resubmitted_but_approved_cannot() {
        assert!(ensure_resubmittable(ReviewStatus::Rejected).is_ok());
        assert!(ensure_resubmittable(ReviewStatus::Pending).is_ok());
        assert!(ensure_resubmittable(ReviewStatus::Approved).is_err());
    }

    #[test]
    fn seed_ids_are_stable() {
        assert_eq!(ReviewStatus::Pending.id(), 1);
        assert_eq!(UserStatus::PendingVerification.id(), 4);
        assert_eq!(ProfileVerificationStatus::Verified.id(), 2);
        assert_eq!(UserStatus::from_id(1), Some(UserStatus::Active));
    }

    #[test]
    fn multi_word_status_uses_snake_case_name() {
        assert_eq!(UserStatus::PendingVerification.as_str(), "PENDING_VERIFICATION");
        assert_eq!(
            "PENDING_VERIFICATION".parse::<UserStatus>().unwrap(),
            UserStatus::PendingVerification
        );
    }
}
