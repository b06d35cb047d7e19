//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::{utils, Config};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

/// Test environment that sets up a cashbook home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database. No operators are
    /// configured, so every command is allowed without credentials.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("cashbook");
        let config = Config::create(&root, "Districauchos", None).await.unwrap();
        Self { temp_dir, config }
    }

    /// Like `new`, with two operators: `Carlos` (PIN 1234, admin) and `Ana` (PIN 0000,
    /// employee).
    pub async fn with_operators() -> Self {
        let env = Self::new().await;
        let path = env.config.config_path().to_path_buf();
        let mut file: Value = utils::deserialize(&path).await.unwrap();
        file["operators"] = json!([
            { "name": "Carlos", "pin": "1234", "role": "admin" },
            { "name": "Ana", "pin": "0000", "role": "employee" }
        ]);
        utils::write(&path, file.to_string()).await.unwrap();

        let config = Config::load(env.config.root()).await.unwrap();
        Self {
            temp_dir: env.temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory outside the cashbook home.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The date every test treats as today.
    pub fn today(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }
}
