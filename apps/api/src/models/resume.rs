use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::builder::model::ResumeState;

/// One row per user; `data` and `style` hold the JSON forms of `ResumeDocument` / `StyleConfig`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub user_id: Uuid,
    pub data: Value,
    pub style: Value,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    pub fn into_state(self) -> Result<ResumeState, serde_json::Error> {
        Ok(ResumeState {
            data: serde_json::from_value(self.data)?,
            style: serde_json::from_value(self.style)?,
        })
    }
}
