//! Contact persistence: pluggable insert-only store for contact submissions.
//!
//! Backends:
//! - `SupabaseContactStore`: the hosted REST interface (`SUPABASE_URL` + `SUPABASE_KEY`)
//! - `PgContactStore`: direct Postgres connection (`DATABASE_URL`)
//!
//! `AppState` holds an `Option<Arc<dyn ContactStore>>`, chosen at startup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::models::contact::{ContactSubmissionRow, NewContactSubmission};

const TABLE: &str = "contact_submissions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("insert rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("insert returned no row")]
    NoRow,
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Inserts one submission and returns the stored row with its
    /// database-assigned `id` and `submitted_at`.
    async fn insert(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmissionRow, StoreError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmissionRow, StoreError> {
        let row = sqlx::query_as::<_, ContactSubmissionRow>(
            r#"
            INSERT INTO contact_submissions (name, email, message_type, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, message_type, message, submitted_at
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.message_type)
        .bind(&submission.message)
        .fetch_one(&self.pool)
        .await?;

        debug!("Stored contact submission {} via postgres", row.id);
        Ok(row)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Supabase REST
// ────────────────────────────────────────────────────────────────────────────

pub struct SupabaseContactStore {
    client: Client,
    url: String,
    key: String,
}

impl SupabaseContactStore {
    pub fn new(url: &str, key: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.url)
    }
}

#[async_trait]
impl ContactStore for SupabaseContactStore {
    async fn insert(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmissionRow, StoreError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let row = response
            .json::<Vec<ContactSubmissionRow>>()
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NoRow)?;

        debug!("Stored contact submission {} via supabase", row.id);
        Ok(row)
    }

    fn backend(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    /// Serial-id store that mimics the table defaults.
    #[derive(Default)]
    pub(crate) struct MemoryContactStore {
        pub(crate) rows: Mutex<Vec<ContactSubmissionRow>>,
    }

    #[async_trait]
    impl ContactStore for MemoryContactStore {
        async fn insert(
            &self,
            submission: &NewContactSubmission,
        ) -> Result<ContactSubmissionRow, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let now = Utc::now();
            let submitted_at = rows
                .last()
                .map(|r| r.submitted_at.max(now))
                .unwrap_or(now);
            let row = ContactSubmissionRow {
                id: rows.len() as i64 + 1,
                name: submission.name.clone(),
                email: submission.email.clone(),
                message_type: submission.message_type.clone(),
                message: submission.message.clone(),
                submitted_at,
            };
            rows.push(row.clone());
            Ok(row)
        }

        fn backend(&self) -> &'static str {
            "memory"
        }
    }

    /// Always fails, like an unreachable database.
    pub(crate) struct UnreachableStore;

    #[async_trait]
    impl ContactStore for UnreachableStore {
        async fn insert(
            &self,
            _submission: &NewContactSubmission,
        ) -> Result<ContactSubmissionRow, StoreError> {
            Err(StoreError::Rejected {
                status: 503,
                message: "connection refused".to_string(),
            })
        }

        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    fn submission(name: &str) -> NewContactSubmission {
        NewContactSubmission {
            name: name.to_string(),
            email: "a@b.com".to_string(),
            message_type: "bug".to_string(),
            message: "test".to_string(),
        }
    }

    #[test]
    fn test_supabase_endpoint_strips_trailing_slash() {
        let store = SupabaseContactStore::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(
            store.endpoint(),
            "https://abc.supabase.co/rest/v1/contact_submissions"
        );
        assert_eq!(store.backend(), "supabase");
    }

    #[test]
    fn test_supabase_row_deserializes_timestamptz() {
        let body = r#"[{"id": 7, "name": "Ana", "email": "a@b.com", "message_type": "bug",
            "message": "test", "submitted_at": "2024-06-01T12:30:00.123456+00:00"}]"#;
        let rows: Vec<ContactSubmissionRow> = serde_json::from_str(body).unwrap();
        assert_eq!(rows[0].id, 7);
        assert_eq!(rows[0].submitted_at.timestamp(), 1717245000);
    }

    #[test]
    fn test_new_submission_serializes_only_user_fields() {
        let value = serde_json::to_value(submission("Ana")).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert!(value.get("id").is_none());
        assert!(value.get("submitted_at").is_none());
    }

    #[tokio::test]
    async fn test_sequential_inserts_have_increasing_ids_and_ordered_timestamps() {
        let store = MemoryContactStore::default();
        let first = store.insert(&submission("Ana")).await.unwrap();
        let second = store.insert(&submission("Ben")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.submitted_at >= first.submitted_at);
    }

    #[tokio::test]
    async fn test_unreachable_store_errors() {
        let err = UnreachableStore.insert(&submission("Ana")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 503, .. }));
    }
}
