use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Marks that one professional declined one request. The request row itself
/// is never touched by a rejection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RejectedRequest {
    pub request_id: i64,
    pub professional_id: i64,
    pub created_at: DateTime<Utc>,
}
