use serde::Serialize;
use uuid::Uuid;

use crate::capsules::filter::StatusFilter;
use crate::dates::{long_date, medium_date};
use crate::models::capsule::{Capsule, CapsuleStatus};

/// What the card offers for its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapsuleAction {
    Edit,
    Seal,
    SealedUntil { label: String, disabled: bool },
    ViewContents,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapsuleCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: CapsuleStatus,
    pub created: String,
    pub release_date: String,
    pub sealed_on: Option<String>,
    pub actions: Vec<CapsuleAction>,
}

impl From<&Capsule> for CapsuleCard {
    fn from(c: &Capsule) -> Self {
        let actions = match c.status {
            CapsuleStatus::Draft => vec![CapsuleAction::Edit, CapsuleAction::Seal],
            CapsuleStatus::Sealed => vec![CapsuleAction::SealedUntil {
                label: format!("Sealed until {}", medium_date(&c.release_date)),
                disabled: true,
            }],
            CapsuleStatus::Released => vec![CapsuleAction::ViewContents],
        };

        CapsuleCard {
            id: c.id,
            title: c.title.clone(),
            description: c.description.clone(),
            status: c.status,
            created: long_date(&c.created_at),
            release_date: long_date(&c.release_date),
            sealed_on: c.seal_date.as_ref().map(long_date),
            actions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CapsuleListView {
    pub filter: StatusFilter,
    /// Size of the fetched list before filtering.
    pub total: usize,
    pub capsules: Vec<CapsuleCard>,
    pub empty_message: Option<String>,
}

impl CapsuleListView {
    pub fn build(fetched: &[Capsule], filter: StatusFilter) -> Self {
        let capsules: Vec<CapsuleCard> = filter
            .apply(fetched)
            .into_iter()
            .map(CapsuleCard::from)
            .collect();
        let empty_message = capsules.is_empty().then(|| filter.empty_message());

        CapsuleListView {
            filter,
            total: fetched.len(),
            capsules,
            empty_message,
        }
    }
}
