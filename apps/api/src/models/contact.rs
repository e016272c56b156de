use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted "Get in Touch" submission. Rows are insert-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContactSubmissionRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message_type: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

/// A validated submission, ready to insert. `id` and `submitted_at` are
/// assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub message_type: String,
    pub message: String,
}
