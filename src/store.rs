//! The persistence boundary. A `Store` keeps raw month documents; everything read from one goes
//! through the migrator before the rest of the crate sees it.

use crate::migrate;
use crate::model::Month;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Persists month documents per account. Writes are last-writer-wins.
#[async_trait]
pub trait Store: Send + Sync {
    /// The raw JSON text of the account's current month, if one was ever saved.
    async fn load(&self, account_id: &str) -> Result<Option<String>>;

    async fn save(&self, account_id: &str, month: &Month) -> Result<()>;

    /// Keeps a copy of a month that is being closed, replacing any earlier copy of the same period.
    async fn archive(&self, account_id: &str, month: &Month) -> Result<()>;

    async fn load_archived(
        &self,
        account_id: &str,
        month_index: u32,
        year: i32,
    ) -> Result<Option<String>>;
}

/// Loads and migrates the account's current month. An account with nothing stored gets a fresh
/// month for the period containing `today`.
pub async fn open_month(store: &dyn Store, account_id: &str, today: NaiveDate) -> Result<Month> {
    match store.load(account_id).await? {
        Some(raw) => Ok(migrate::migrate_str(&raw, today)),
        None => {
            debug!("No month stored for '{account_id}'");
            Ok(Month::new(today))
        }
    }
}

/// Loads and migrates a closed month, if it was archived.
pub async fn open_archived_month(
    store: &dyn Store,
    account_id: &str,
    month_index: u32,
    year: i32,
    today: NaiveDate,
) -> Result<Option<Month>> {
    Ok(store
        .load_archived(account_id, month_index, year)
        .await?
        .map(|raw| migrate::migrate_str(&raw, today)))
}

/// An in-memory `Store`. Documents are stored as JSON text, as a real store would, so that reads
/// go through the migrator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    current: Mutex<HashMap<String, String>>,
    archived: Mutex<HashMap<(String, u32, i32), String>>,
}

impl MemoryStore {
    /// A store that already holds `raw` as the current document of `account_id`.
    pub fn with_document(account_id: &str, raw: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut current) = store.current.lock() {
            current.insert(account_id.to_string(), raw.into());
        }
        store
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow::anyhow!("The in-memory store lock is poisoned")
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, account_id: &str) -> Result<Option<String>> {
        Ok(self.current.lock().map_err(poisoned)?.get(account_id).cloned())
    }

    async fn save(&self, account_id: &str, month: &Month) -> Result<()> {
        let body = migrate::serialize(month)?.to_string();
        self.current
            .lock()
            .map_err(poisoned)?
            .insert(account_id.to_string(), body);
        Ok(())
    }

    async fn archive(&self, account_id: &str, month: &Month) -> Result<()> {
        let body = migrate::serialize(month)?.to_string();
        self.archived.lock().map_err(poisoned)?.insert(
            (account_id.to_string(), month.month_index, month.year),
            body,
        );
        Ok(())
    }

    async fn load_archived(
        &self,
        account_id: &str,
        month_index: u32,
        year: i32,
    ) -> Result<Option<String>> {
        Ok(self
            .archived
            .lock()
            .map_err(poisoned)?
            .get(&(account_id.to_string(), month_index, year))
            .cloned())
    }
}
