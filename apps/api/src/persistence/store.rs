//! Resume storage: a single document per user, upserted wholesale.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::builder::model::ResumeState;
use crate::models::resume::ResumeRow;
use crate::models::user::UserId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored resume is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Remote resume storage keyed by user. `get` returns `Ok(None)` when nothing is stored.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn get(&self, user: UserId) -> Result<Option<ResumeState>, StoreError>;

    /// Inserts or replaces the user's resume and returns what was stored.
    async fn put(&self, user: UserId, state: &ResumeState) -> Result<ResumeState, StoreError>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn get(&self, user: UserId) -> Result<Option<ResumeState>, StoreError> {
        let row: Option<ResumeRow> = sqlx::query_as(
            "SELECT user_id, data, style, updated_at FROM resumes WHERE user_id = $1",
        )
        .bind(user.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResumeRow::into_state).transpose()?)
    }

    async fn put(&self, user: UserId, state: &ResumeState) -> Result<ResumeState, StoreError> {
        let row: ResumeRow = sqlx::query_as(
            r#"
            INSERT INTO resumes (user_id, data, style, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id) DO UPDATE
                SET data = EXCLUDED.data,
                    style = EXCLUDED.style,
                    updated_at = now()
            RETURNING user_id, data, style, updated_at
            "#,
        )
        .bind(user.0)
        .bind(Json(&state.data))
        .bind(Json(&state.style))
        .fetch_one(&self.pool)
        .await?;

        debug!("Upserted resume for user {user} at {}", row.updated_at);
        Ok(row.into_state()?)
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryResumeStore;
    use super::*;
    use crate::builder::catalog::Catalog;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_missing_resume_is_none_not_error() {
        let store = MemoryResumeStore::default();
        let found = store.get(UserId(Uuid::new_v4())).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let store = MemoryResumeStore::default();
        let user = UserId(Uuid::new_v4());
        let catalog = Catalog::bundled().unwrap();
        let mut state = catalog.default_state(None);

        store.put(user, &state).await.unwrap();
        state.data.summary = "Updated".into();
        store.put(user, &state).await.unwrap();

        assert_eq!(store.get(user).await.unwrap(), Some(state));
        assert_eq!(store.put_count(), 2);
    }

    #[test]
    fn test_row_decodes_legacy_client_json() {
        let row = ResumeRow {
            user_id: Uuid::new_v4(),
            data: serde_json::json!({
                "personal": {"fullName": "Ada", "email": "ada@example.com"},
                "summary": "",
                "experience": [],
                "education": [],
                "skills": [{"id": "1700000000000", "name": "Rust"}],
                "customSections": []
            }),
            style: serde_json::json!({
                "templateId": 2, "color": "bg-red-800", "fontFamily": "font-mono", "fontSize": 0.9
            }),
            updated_at: chrono::Utc::now(),
        };
        let state = row.into_state().unwrap();
        assert_eq!(state.data.personal.full_name, "Ada");
        assert_eq!(state.data.skills[0].name, "Rust");
        assert_eq!(state.style.template_id.number(), 2);
    }
}
