use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Placeholder stored in `encryption_key_hash` until capsules carry real keys.
pub const PLACEHOLDER_KEY_HASH: &str = "temporary_hash";

/// Lifecycle status of a capsule: draft → sealed → released, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapsuleStatus {
    Draft,
    Sealed,
    Released,
}

impl CapsuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapsuleStatus::Draft => "draft",
            CapsuleStatus::Sealed => "sealed",
            CapsuleStatus::Released => "released",
        }
    }

    /// The only legal edges are draft → sealed and sealed → released.
    pub fn can_transition(from: CapsuleStatus, to: CapsuleStatus) -> bool {
        matches!(
            (from, to),
            (CapsuleStatus::Draft, CapsuleStatus::Sealed)
                | (CapsuleStatus::Sealed, CapsuleStatus::Released)
        )
    }
}

impl fmt::Display for CapsuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capsule status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for CapsuleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CapsuleStatus::Draft),
            "sealed" => Ok(CapsuleStatus::Sealed),
            "released" => Ok(CapsuleStatus::Released),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Raw `capsules` row as stored; status is free text in the table.
#[derive(Debug, Clone, FromRow)]
pub struct CapsuleRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub seal_date: Option<DateTime<Utc>>,
    pub release_date: DateTime<Utc>,
    pub encryption_key_hash: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub seal_date: Option<DateTime<Utc>>,
    pub release_date: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub encryption_key_hash: String,
    pub status: CapsuleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CapsuleRow> for Capsule {
    type Error = UnknownStatus;

    fn try_from(row: CapsuleRow) -> Result<Self, Self::Error> {
        Ok(Capsule {
            status: row.status.parse()?,
            id: row.id,
            creator_id: row.creator_id,
            title: row.title,
            description: row.description,
            seal_date: row.seal_date,
            release_date: row.release_date,
            encryption_key_hash: row.encryption_key_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert payload for the `capsules` table.
#[derive(Debug, Clone)]
pub struct NewCapsule {
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub release_date: DateTime<Utc>,
    pub encryption_key_hash: String,
    pub status: CapsuleStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CapsuleContent {
    pub id: Uuid,
    pub capsule_id: Uuid,
    pub content_type: String,
    pub title: String,
    pub description: Option<String>,
    pub encrypted_content: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCapsuleContent {
    pub capsule_id: Uuid,
    pub content_type: String,
    pub title: String,
    pub description: Option<String>,
    pub encrypted_content: String,
    pub metadata: Value,
}
