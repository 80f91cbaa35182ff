use serde::{Deserialize, Serialize};

use crate::models::capsule::{Capsule, CapsuleStatus};

/// Listing filter. Applied in memory to the already-fetched list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Sealed,
    Released,
}

impl StatusFilter {
    pub fn matches(&self, status: CapsuleStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Draft => status == CapsuleStatus::Draft,
            StatusFilter::Sealed => status == CapsuleStatus::Sealed,
            StatusFilter::Released => status == CapsuleStatus::Released,
        }
    }

    /// Keeps the fetched order.
    pub fn apply<'a>(&self, capsules: &'a [Capsule]) -> Vec<&'a Capsule> {
        capsules.iter().filter(|c| self.matches(c.status)).collect()
    }

    pub fn empty_message(&self) -> String {
        match self {
            StatusFilter::All => "No capsules found".to_string(),
            StatusFilter::Draft => "No draft capsules found".to_string(),
            StatusFilter::Sealed => "No sealed capsules found".to_string(),
            StatusFilter::Released => "No released capsules found".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn capsules(statuses: &[CapsuleStatus]) -> Vec<Capsule> {
        let creator_id = Uuid::new_v4();
        let now = Utc::now();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Capsule {
                id: Uuid::new_v4(),
                creator_id,
                title: format!("capsule {i}"),
                description: None,
                seal_date: None,
                release_date: now + Duration::days(365),
                encryption_key_hash: "temporary_hash".to_string(),
                status: *status,
                created_at: now - Duration::minutes(i as i64),
                updated_at: now,
            })
            .collect()
    }

    #[test]
    fn test_filter_is_exact_subset_in_fetched_order() {
        use CapsuleStatus::*;
        let fetched = capsules(&[Draft, Sealed, Draft, Released, Sealed, Draft]);

        for (filter, status) in [
            (StatusFilter::Draft, Draft),
            (StatusFilter::Sealed, Sealed),
            (StatusFilter::Released, Released),
        ] {
            let expected: Vec<&Capsule> = fetched.iter().filter(|c| c.status == status).collect();
            assert_eq!(filter.apply(&fetched), expected);
        }
    }

    #[test]
    fn test_all_returns_everything() {
        use CapsuleStatus::*;
        let fetched = capsules(&[Released, Draft, Sealed]);
        let titles: Vec<&str> = StatusFilter::All
            .apply(&fetched)
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["capsule 0", "capsule 1", "capsule 2"]);
    }

    #[test]
    fn test_empty_list_filters_to_empty() {
        assert!(StatusFilter::Sealed.apply(&[]).is_empty());
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(StatusFilter::All.empty_message(), "No capsules found");
        assert_eq!(StatusFilter::Sealed.empty_message(), "No sealed capsules found");
    }

    #[test]
    fn test_filter_from_query_value() {
        let f: StatusFilter = serde_json::from_str("\"released\"").unwrap();
        assert_eq!(f, StatusFilter::Released);
        assert_eq!(StatusFilter::default(), StatusFilter::All);
    }
}
