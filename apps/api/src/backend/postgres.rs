use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::{Backend, BackendError};
use crate::models::capsule::{
    Capsule, CapsuleContent, CapsuleRow, CapsuleStatus, NewCapsule, NewCapsuleContent,
};
use crate::models::profile::{Profile, ProfileUpsert};
use crate::models::rewards::{Rewards, RewardsRow};

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn list_capsules(&self, creator_id: Uuid) -> Result<Vec<Capsule>, BackendError> {
        let rows = sqlx::query_as::<_, CapsuleRow>(
            "SELECT * FROM capsules WHERE creator_id = $1 ORDER BY created_at DESC",
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Capsule::try_from(row).map_err(BackendError::from))
            .collect()
    }

    async fn find_capsule(
        &self,
        creator_id: Uuid,
        capsule_id: Uuid,
    ) -> Result<Option<Capsule>, BackendError> {
        let row = sqlx::query_as::<_, CapsuleRow>(
            "SELECT * FROM capsules WHERE id = $1 AND creator_id = $2",
        )
        .bind(capsule_id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Capsule::try_from).transpose()?)
    }

    async fn insert_capsule(&self, capsule: NewCapsule) -> Result<Capsule, BackendError> {
        let row = sqlx::query_as::<_, CapsuleRow>(
            r#"
            INSERT INTO capsules
                (creator_id, title, description, release_date, encryption_key_hash, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(capsule.creator_id)
        .bind(&capsule.title)
        .bind(&capsule.description)
        .bind(capsule.release_date)
        .bind(&capsule.encryption_key_hash)
        .bind(capsule.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Capsule::try_from(row)?)
    }

    async fn update_capsule(
        &self,
        capsule: &Capsule,
        expected: CapsuleStatus,
    ) -> Result<Option<Capsule>, BackendError> {
        let row = sqlx::query_as::<_, CapsuleRow>(
            r#"
            UPDATE capsules
            SET title = $1, description = $2, seal_date = $3, release_date = $4,
                status = $5, updated_at = $6
            WHERE id = $7 AND creator_id = $8 AND status = $9
            RETURNING *
            "#,
        )
        .bind(&capsule.title)
        .bind(&capsule.description)
        .bind(capsule.seal_date)
        .bind(capsule.release_date)
        .bind(capsule.status.as_str())
        .bind(capsule.updated_at)
        .bind(capsule.id)
        .bind(capsule.creator_id)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Capsule::try_from).transpose()?)
    }

    async fn list_contents(&self, capsule_id: Uuid) -> Result<Vec<CapsuleContent>, BackendError> {
        Ok(sqlx::query_as::<_, CapsuleContent>(
            "SELECT * FROM capsule_contents WHERE capsule_id = $1 ORDER BY created_at ASC",
        )
        .bind(capsule_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_content(
        &self,
        content: NewCapsuleContent,
    ) -> Result<Option<CapsuleContent>, BackendError> {
        Ok(sqlx::query_as::<_, CapsuleContent>(
            r#"
            INSERT INTO capsule_contents
                (capsule_id, content_type, title, description, encrypted_content, metadata)
            SELECT $1::uuid, $2::text, $3::text, $4::text, $5::text, $6::jsonb
            WHERE EXISTS (
                SELECT 1 FROM capsules WHERE id = $1::uuid AND status = $7
            )
            RETURNING *
            "#,
        )
        .bind(content.capsule_id)
        .bind(&content.content_type)
        .bind(&content.title)
        .bind(&content.description)
        .bind(&content.encrypted_content)
        .bind(&content.metadata)
        .bind(CapsuleStatus::Draft.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_profile(&self, profile: ProfileUpsert) -> Result<Profile, BackendError> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, display_name, avatar_url, bio, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                avatar_url = EXCLUDED.avatar_url,
                bio = EXCLUDED.bio,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(&profile.bio)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_rewards(&self, user_id: Uuid) -> Result<Option<Rewards>, BackendError> {
        let row = sqlx::query_as::<_, RewardsRow>("SELECT * FROM rewards WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rewards::from))
    }
}
