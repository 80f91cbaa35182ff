//! Binding to the hosted relational store.
//!
//! Every page-level operation goes through the `Backend` trait: equality-filtered
//! selects, inserts, upserts and guarded updates on the four tables
//! (`profiles`, `capsules`, `capsule_contents`, `rewards`).
//!
//! `AppState` holds an `Arc<dyn Backend>`; `PgBackend` in production,
//! `MemoryBackend` for local runs and tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::capsule::{
    Capsule, CapsuleContent, CapsuleStatus, NewCapsule, NewCapsuleContent, UnknownStatus,
};
use crate::models::profile::{Profile, ProfileUpsert};
use crate::models::rewards::Rewards;

pub mod memory;
pub mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(#[from] UnknownStatus),
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// All capsules created by `creator_id`, newest first.
    async fn list_capsules(&self, creator_id: Uuid) -> Result<Vec<Capsule>, BackendError>;

    /// A single capsule, only if it belongs to `creator_id`.
    async fn find_capsule(
        &self,
        creator_id: Uuid,
        capsule_id: Uuid,
    ) -> Result<Option<Capsule>, BackendError>;

    async fn insert_capsule(&self, capsule: NewCapsule) -> Result<Capsule, BackendError>;

    /// Writes the mutable columns of `capsule` if the stored status still equals
    /// `expected`. Returns `None` when the guard fails.
    async fn update_capsule(
        &self,
        capsule: &Capsule,
        expected: CapsuleStatus,
    ) -> Result<Option<Capsule>, BackendError>;

    /// Contents of one capsule in insertion order.
    async fn list_contents(&self, capsule_id: Uuid) -> Result<Vec<CapsuleContent>, BackendError>;

    /// Attaches content only while the capsule is still a draft. Returns `None`
    /// when the capsule is gone or has left the draft state.
    async fn insert_content(
        &self,
        content: NewCapsuleContent,
    ) -> Result<Option<CapsuleContent>, BackendError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError>;

    async fn upsert_profile(&self, profile: ProfileUpsert) -> Result<Profile, BackendError>;

    async fn get_rewards(&self, user_id: Uuid) -> Result<Option<Rewards>, BackendError>;
}
