//! This module is responsible for reading, writing and managing the SQLite database that holds the
//! month documents.

mod migrations;

use crate::model::Month;
use crate::store::Store;
use crate::{migrate, utils, Result};
use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// A `Store` backed by a SQLite file. Each account has one current month document and any number
/// of archived (closed) months.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if utils::exists(path).await? {
            bail!("A database already exists at '{}'", path.display());
        }
        Self::open(path, true).await
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the database schema with migrations if it is out-of-date
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !utils::exists(path).await? {
            bail!("The database is missing '{}'", path.display());
        }
        Self::open(path, false).await
    }

    async fn open(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .context("Failed to parse SQLite connection string")?
            .create_if_missing(create);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open SQLite database at {}", path.display()))?;

        let current = schema_version(&pool).await?;
        migrations::run(&pool, current, migrations::CURRENT_VERSION).await?;
        debug!("Opened {} at schema version {}", path.display(), migrations::CURRENT_VERSION);
        Ok(Self { pool })
    }

    /// The ids of all accounts that have a stored month.
    pub async fn accounts(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT account_id FROM documents ORDER BY account_id")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list accounts")?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

/// Reads the schema version, creating the `schema_version` table at version 0 for a new file.
async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    match row.0 {
        Some(v) => Ok(v),
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                .execute(pool)
                .await
                .context("Failed to insert initial schema version")?;
            Ok(0)
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn load(&self, account_id: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE account_id = ?")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to load the month of '{account_id}'"))?;
        trace!("Loaded document for '{account_id}': {}", row.is_some());
        Ok(row.map(|r| r.0))
    }

    async fn save(&self, account_id: &str, month: &Month) -> Result<()> {
        let body = migrate::serialize(month)?.to_string();
        sqlx::query(
            "INSERT INTO documents (account_id, body, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(account_id) DO UPDATE SET body = excluded.body, \
             updated_at = excluded.updated_at",
        )
        .bind(account_id)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save the month of '{account_id}'"))?;
        Ok(())
    }

    async fn archive(&self, account_id: &str, month: &Month) -> Result<()> {
        let body = migrate::serialize(month)?.to_string();
        sqlx::query(
            "INSERT OR REPLACE INTO archived_months \
             (account_id, year, month_index, body, closed_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(account_id)
        .bind(month.year)
        .bind(month.month_index)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to archive {} for '{account_id}'",
                month.period_label()
            )
        })?;
        Ok(())
    }

    async fn load_archived(
        &self,
        account_id: &str,
        month_index: u32,
        year: i32,
    ) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT body FROM archived_months \
             WHERE account_id = ? AND year = ? AND month_index = ?",
        )
        .bind(account_id)
        .bind(year)
        .bind(month_index)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load an archived month")?;
        Ok(row.map(|r| r.0))
    }
}
