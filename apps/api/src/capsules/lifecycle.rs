//! Capsule state machine: draft --seal--> sealed --release--> released.
//!
//! Transitions are pure: they take the current capsule and a clock reading and
//! return the next version, which the caller persists with a status guard.
//! Release is on demand only; nothing here schedules it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::dates::medium_date;
use crate::errors::AppError;
use crate::models::capsule::{Capsule, CapsuleStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Only {required} capsules can be {action}; this capsule is {current}")]
    WrongStatus {
        current: CapsuleStatus,
        required: CapsuleStatus,
        action: &'static str,
    },

    #[error("Sealed until {}", medium_date(.until))]
    NotYetReleasable { until: DateTime<Utc> },
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::InvalidTransition(e.to_string())
    }
}

fn require(
    capsule: &Capsule,
    required: CapsuleStatus,
    action: &'static str,
) -> Result<(), TransitionError> {
    if capsule.status != required {
        return Err(TransitionError::WrongStatus {
            current: capsule.status,
            required,
            action,
        });
    }
    Ok(())
}

/// Locks a draft against further edits.
pub fn seal(capsule: &Capsule, now: DateTime<Utc>) -> Result<Capsule, TransitionError> {
    require(capsule, CapsuleStatus::Draft, "sealed")?;
    debug_assert!(CapsuleStatus::can_transition(capsule.status, CapsuleStatus::Sealed));

    Ok(Capsule {
        status: CapsuleStatus::Sealed,
        seal_date: Some(now),
        updated_at: now,
        ..capsule.clone()
    })
}

/// Opens a sealed capsule once its release date has passed.
pub fn release(capsule: &Capsule, now: DateTime<Utc>) -> Result<Capsule, TransitionError> {
    require(capsule, CapsuleStatus::Sealed, "released")?;
    if now < capsule.release_date {
        return Err(TransitionError::NotYetReleasable {
            until: capsule.release_date,
        });
    }
    debug_assert!(CapsuleStatus::can_transition(capsule.status, CapsuleStatus::Released));

    Ok(Capsule {
        status: CapsuleStatus::Released,
        updated_at: now,
        ..capsule.clone()
    })
}

/// Title, description, release date and contents only change while drafting.
pub fn ensure_editable(capsule: &Capsule) -> Result<(), TransitionError> {
    require(capsule, CapsuleStatus::Draft, "edited")
}

/// Contents are only readable after release.
pub fn ensure_readable(capsule: &Capsule) -> Result<(), TransitionError> {
    match capsule.status {
        CapsuleStatus::Released => Ok(()),
        CapsuleStatus::Sealed => Err(TransitionError::NotYetReleasable {
            until: capsule.release_date,
        }),
        CapsuleStatus::Draft => Err(TransitionError::WrongStatus {
            current: CapsuleStatus::Draft,
            required: CapsuleStatus::Released,
            action: "opened",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn draft(release_date: DateTime<Utc>) -> Capsule {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Capsule {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            title: "Letters".to_string(),
            description: None,
            seal_date: None,
            release_date,
            encryption_key_hash: "temporary_hash".to_string(),
            status: CapsuleStatus::Draft,
            created_at: created,
            updated_at: created,
        }
    }

    fn release_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_seal_sets_status_and_seal_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let sealed = seal(&draft(release_date()), now).unwrap();
        assert_eq!(sealed.status, CapsuleStatus::Sealed);
        assert_eq!(sealed.seal_date, Some(now));
        assert_eq!(sealed.updated_at, now);
    }

    #[test]
    fn test_seal_twice_rejected() {
        let now = Utc::now();
        let sealed = seal(&draft(release_date()), now).unwrap();
        assert!(matches!(
            seal(&sealed, now),
            Err(TransitionError::WrongStatus { current: CapsuleStatus::Sealed, .. })
        ));
    }

    #[test]
    fn test_release_before_date_rejected() {
        let sealed = seal(&draft(release_date()), Utc::now()).unwrap();
        let early = release_date() - Duration::seconds(1);
        let err = release(&sealed, early).unwrap_err();
        assert_eq!(err, TransitionError::NotYetReleasable { until: release_date() });
        assert_eq!(err.to_string(), "Sealed until Jan 1, 2030");
    }

    #[test]
    fn test_release_on_date_succeeds() {
        let sealed = seal(&draft(release_date()), Utc::now()).unwrap();
        let released = release(&sealed, release_date()).unwrap();
        assert_eq!(released.status, CapsuleStatus::Released);
        assert_eq!(released.seal_date, sealed.seal_date);
    }

    #[test]
    fn test_release_of_draft_rejected() {
        let d = draft(release_date());
        assert!(matches!(
            release(&d, release_date() + Duration::days(1)),
            Err(TransitionError::WrongStatus { current: CapsuleStatus::Draft, .. })
        ));
    }

    #[test]
    fn test_only_drafts_editable() {
        let d = draft(release_date());
        assert!(ensure_editable(&d).is_ok());
        let sealed = seal(&d, Utc::now()).unwrap();
        assert!(ensure_editable(&sealed).is_err());
    }

    #[test]
    fn test_contents_hidden_until_release() {
        let d = draft(release_date());
        assert!(ensure_readable(&d).is_err());
        let sealed = seal(&d, Utc::now()).unwrap();
        assert!(ensure_readable(&sealed).is_err());
        let released = release(&sealed, release_date()).unwrap();
        assert!(ensure_readable(&released).is_ok());
    }
}
