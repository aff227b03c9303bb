//! Postgres-backed verdict store
//!
//! One row per policy in `policy_verdict_cache`; writes are a single
//! `INSERT .. ON CONFLICT DO UPDATE` so concurrent writers for the same key
//! resolve to whichever statement commits last.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use super::{CacheEntry, VerdictStore};
use crate::config::mask_database_url;
use crate::error::StoreError;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS policy_verdict_cache (
        policy_id  TEXT PRIMARY KEY,
        payload    TEXT NOT NULL,
        written_at TIMESTAMPTZ NOT NULL
    )
"#;

pub struct PgVerdictStore {
    pool: PgPool,
}

impl PgVerdictStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small pool and make sure the cache table exists
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!(
            "Connecting verdict store: {}",
            mask_database_url(database_url)
        );
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VerdictStore for PgVerdictStore {
    async fn get(&self, policy_id: &str) -> Result<Option<CacheEntry>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT policy_id, payload, written_at
            FROM policy_verdict_cache
            WHERE policy_id = $1
            "#,
        )
        .bind(policy_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| -> Result<CacheEntry, StoreError> {
            Ok(CacheEntry {
                policy_id: r.try_get("policy_id")?,
                payload: r.try_get("payload")?,
                written_at: r.try_get::<DateTime<Utc>, _>("written_at")?,
            })
        })
        .transpose()
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO policy_verdict_cache (policy_id, payload, written_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (policy_id)
            DO UPDATE SET payload = EXCLUDED.payload, written_at = EXCLUDED.written_at
            "#,
        )
        .bind(&entry.policy_id)
        .bind(&entry.payload)
        .bind(entry.written_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
