//! Configuration file handling for the cashbook.
//!
//! The configuration file is stored at `$CASHBOOK_HOME/config.json` and holds the shop's
//! identity, the profit rule, backup settings and the operators allowed to record entries.

use crate::access::{AccessList, Operator};
use crate::backup::Backup;
use crate::calc::SupplierSpend;
use crate::db::SqliteStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "cashbook";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const CASHBOOK_SQLITE: &str = "cashbook.sqlite";
const DEFAULT_ACCOUNT: &str = "main";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CASHBOOK_HOME` and from there it loads `$CASHBOOK_HOME/config.json`. It provides
/// paths to other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: SqliteStore,
}

impl Config {
    /// Creates the data directory, its subdirectories, an initial `config.json` and an empty
    /// database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/cashbook`
    /// - `shop_name` - Printed on reports and used in export file names.
    /// - `account_id` - The key of the shop's document in the store. Defaults to `main`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if a config already exists.
    pub async fn create(
        dir: impl Into<PathBuf>,
        shop_name: &str,
        account_id: Option<&str>,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the cashbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if utils::exists(&config_path).await? {
            bail!(
                "A cashbook already exists at '{}'",
                config_path.display()
            );
        }

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_file = ConfigFile {
            shop_name: shop_name.to_string(),
            account_id: account_id.unwrap_or(DEFAULT_ACCOUNT).to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(CASHBOOK_SQLITE);
        let store = SqliteStore::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            backups: backups_dir,
            config_path,
            config_file,
            store,
        })
    }

    /// This will
    /// - validate that `cashbook_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - open the database, upgrading its schema if needed
    pub async fn load(cashbook_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = cashbook_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The cashbook home is missing, run 'cashbook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let sqlite_path = root.join(CASHBOOK_SQLITE);
        let store = SqliteStore::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            store,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn shop_name(&self) -> &str {
        &self.config_file.shop_name
    }

    pub fn account_id(&self) -> &str {
        &self.config_file.account_id
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn supplier_spend(&self) -> SupplierSpend {
        self.config_file.supplier_spend
    }

    pub fn access_list(&self) -> AccessList {
        AccessList::new(self.config_file.operators.clone())
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cashbook",
///   "config_version": 1,
///   "shop_name": "Districauchos",
///   "account_id": "main",
///   "backup_copies": 5,
///   "supplier_spend": "investment",
///   "operators": [
///     { "name": "Carlos", "pin": "4821", "role": "admin" },
///     { "name": "Ana", "pin": "1397", "role": "employee" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cashbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    shop_name: String,

    /// Key of this shop's month document in the store
    #[serde(default = "default_account")]
    account_id: String,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Whether supplier spend is deducted from net profit
    #[serde(default)]
    supplier_spend: SupplierSpend,

    /// Operators allowed to record entries. Empty means no access control.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    operators: Vec<Operator>,
}

fn default_account() -> String {
    DEFAULT_ACCOUNT.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            shop_name: String::new(),
            account_id: default_account(),
            backup_copies: BACKUP_COPIES,
            supplier_spend: SupplierSpend::default(),
            operators: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
