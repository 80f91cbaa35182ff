use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::ordered_map::OrderedMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Stored as free text; usually an ISO-8601 timestamp.
    #[serde(default)]
    pub date_earned: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RewardsRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_balance: i32,
    pub lifetime_tokens: i32,
    pub achievements: Json<OrderedMap<Achievement>>,
    pub unlocked_features: Json<OrderedMap<bool>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_balance: i32,
    pub lifetime_tokens: i32,
    pub achievements: OrderedMap<Achievement>,
    pub unlocked_features: OrderedMap<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RewardsRow> for Rewards {
    fn from(row: RewardsRow) -> Self {
        Rewards {
            id: row.id,
            user_id: row.user_id,
            token_balance: row.token_balance,
            lifetime_tokens: row.lifetime_tokens,
            achievements: row.achievements.0,
            unlocked_features: row.unlocked_features.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
