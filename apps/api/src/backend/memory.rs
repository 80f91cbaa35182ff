use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::{Backend, BackendError};
use crate::models::capsule::{
    Capsule, CapsuleContent, CapsuleStatus, NewCapsule, NewCapsuleContent,
};
use crate::models::profile::{Profile, ProfileUpsert};
use crate::models::rewards::Rewards;

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    capsules: Vec<Capsule>,
    contents: Vec<CapsuleContent>,
    rewards: Vec<Rewards>,
}

/// In-process store with the same semantics as the Postgres tables.
/// Rows live in insertion order.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails the way an unreachable pool does.
    #[cfg(test)]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Rewards have no write path in the API; tests seed them directly.
    #[cfg(test)]
    pub async fn put_rewards(&self, rewards: Rewards) {
        let mut tables = self.tables.write().await;
        tables.rewards.retain(|r| r.user_id != rewards.user_id);
        tables.rewards.push(rewards);
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_capsules(&self, creator_id: Uuid) -> Result<Vec<Capsule>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        // Newest first; equal timestamps fall back to reverse insertion order.
        let mut capsules: Vec<Capsule> = tables
            .capsules
            .iter()
            .rev()
            .filter(|c| c.creator_id == creator_id)
            .cloned()
            .collect();
        capsules.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(capsules)
    }

    async fn find_capsule(
        &self,
        creator_id: Uuid,
        capsule_id: Uuid,
    ) -> Result<Option<Capsule>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .capsules
            .iter()
            .find(|c| c.id == capsule_id && c.creator_id == creator_id)
            .cloned())
    }

    async fn insert_capsule(&self, capsule: NewCapsule) -> Result<Capsule, BackendError> {
        self.check_online()?;
        let now = Utc::now();
        let row = Capsule {
            id: Uuid::new_v4(),
            creator_id: capsule.creator_id,
            title: capsule.title,
            description: capsule.description,
            seal_date: None,
            release_date: capsule.release_date,
            encryption_key_hash: capsule.encryption_key_hash,
            status: capsule.status,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.capsules.push(row.clone());
        Ok(row)
    }

    async fn update_capsule(
        &self,
        capsule: &Capsule,
        expected: CapsuleStatus,
    ) -> Result<Option<Capsule>, BackendError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.capsules.iter_mut().find(|c| {
            c.id == capsule.id && c.creator_id == capsule.creator_id && c.status == expected
        }) else {
            return Ok(None);
        };

        stored.title = capsule.title.clone();
        stored.description = capsule.description.clone();
        stored.seal_date = capsule.seal_date;
        stored.release_date = capsule.release_date;
        stored.status = capsule.status;
        stored.updated_at = capsule.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn list_contents(&self, capsule_id: Uuid) -> Result<Vec<CapsuleContent>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .contents
            .iter()
            .filter(|c| c.capsule_id == capsule_id)
            .cloned()
            .collect())
    }

    async fn insert_content(
        &self,
        content: NewCapsuleContent,
    ) -> Result<Option<CapsuleContent>, BackendError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if !tables
            .capsules
            .iter()
            .any(|c| c.id == content.capsule_id && c.status == CapsuleStatus::Draft)
        {
            return Ok(None);
        }

        let now = Utc::now();
        let row = CapsuleContent {
            id: Uuid::new_v4(),
            capsule_id: content.capsule_id,
            content_type: content.content_type,
            title: content.title,
            description: content.description,
            encrypted_content: content.encrypted_content,
            metadata: content.metadata,
            created_at: now,
            updated_at: now,
        };
        tables.contents.push(row.clone());
        Ok(Some(row))
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn upsert_profile(&self, profile: ProfileUpsert) -> Result<Profile, BackendError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        match tables.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                existing.display_name = profile.display_name;
                existing.avatar_url = profile.avatar_url;
                existing.bio = profile.bio;
                existing.updated_at = profile.updated_at;
                Ok(existing.clone())
            }
            None => {
                let row = Profile {
                    id: profile.id,
                    display_name: profile.display_name,
                    avatar_url: profile.avatar_url,
                    bio: profile.bio,
                    created_at: profile.updated_at,
                    updated_at: profile.updated_at,
                };
                tables.profiles.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn get_rewards(&self, user_id: Uuid) -> Result<Option<Rewards>, BackendError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.rewards.iter().find(|r| r.user_id == user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_capsule(creator_id: Uuid, title: &str) -> NewCapsule {
        NewCapsule {
            creator_id,
            title: title.to_string(),
            description: None,
            release_date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            encryption_key_hash: "temporary_hash".to_string(),
            status: CapsuleStatus::Draft,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped_to_creator() {
        let backend = MemoryBackend::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        backend.insert_capsule(new_capsule(me, "first")).await.unwrap();
        backend.insert_capsule(new_capsule(other, "theirs")).await.unwrap();
        backend.insert_capsule(new_capsule(me, "second")).await.unwrap();

        let titles: Vec<String> = backend
            .list_capsules(me)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_update_guard_rejects_stale_status() {
        let backend = MemoryBackend::new();
        let me = Uuid::new_v4();
        let mut capsule = backend.insert_capsule(new_capsule(me, "t")).await.unwrap();

        capsule.status = CapsuleStatus::Sealed;
        capsule.updated_at = capsule.updated_at + Duration::seconds(1);
        assert!(backend
            .update_capsule(&capsule, CapsuleStatus::Sealed)
            .await
            .unwrap()
            .is_none());
        let saved = backend
            .update_capsule(&capsule, CapsuleStatus::Draft)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.status, CapsuleStatus::Sealed);
    }

    #[tokio::test]
    async fn test_find_capsule_hides_other_users_rows() {
        let backend = MemoryBackend::new();
        let me = Uuid::new_v4();
        let capsule = backend.insert_capsule(new_capsule(me, "t")).await.unwrap();
        assert!(backend
            .find_capsule(Uuid::new_v4(), capsule.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        assert!(matches!(
            backend.get_profile(Uuid::new_v4()).await,
            Err(BackendError::Database(_))
        ));
    }

    fn photo(capsule_id: Uuid) -> NewCapsuleContent {
        NewCapsuleContent {
            capsule_id,
            content_type: "image/png".to_string(),
            title: "photo".to_string(),
            description: None,
            encrypted_content: "opaque".to_string(),
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_content_requires_existing_capsule() {
        let backend = MemoryBackend::new();
        assert!(backend
            .insert_content(photo(Uuid::new_v4()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_content_rejected_once_capsule_sealed() {
        let backend = MemoryBackend::new();
        let me = Uuid::new_v4();
        let mut capsule = backend.insert_capsule(new_capsule(me, "t")).await.unwrap();
        assert!(backend
            .insert_content(photo(capsule.id))
            .await
            .unwrap()
            .is_some());

        // Sealed between the handler's draft check and the insert.
        capsule.status = CapsuleStatus::Sealed;
        backend
            .update_capsule(&capsule, CapsuleStatus::Draft)
            .await
            .unwrap()
            .unwrap();

        assert!(backend
            .insert_content(photo(capsule.id))
            .await
            .unwrap()
            .is_none());
        assert_eq!(backend.list_contents(capsule.id).await.unwrap().len(), 1);
    }
}
