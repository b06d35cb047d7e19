//! Command handlers for the cashbook CLI.
//!
//! Every handler that touches the ledger receives the loaded `Config`, the credentials presented
//! on the command line and today's date. Nothing below reads the clock.

mod close;
mod day;
mod export;
mod fixed;
mod import;
mod init;
mod summary;

use crate::access::{Credentials, Permission};
use crate::model::Month;
use crate::store::{open_archived_month, open_month, Store};
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use close::close;
pub use day::{add_transaction, remove_transaction, set_day_float, show_day, DayView};
pub use export::export;
pub use fixed::{add_fixed_item, remove_fixed_item, set_default_float, set_fixed_amount};
pub use fixed::{FixedAmount, NewFixedItem};
pub use import::import;
pub use init::init;
pub use summary::summary;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Checks the credentials against the configured operators and returns the attribution to record.
fn authorize(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    permission: Permission,
) -> Result<Option<String>> {
    Ok(config.access_list().authorize(credentials, permission)?)
}

async fn load_month(config: &Config, today: NaiveDate) -> Result<Month> {
    open_month(config.store(), config.account_id(), today)
        .await
        .context("Unable to open the current month")
}

async fn save_month(config: &Config, month: &Month) -> Result<()> {
    config.store().save(config.account_id(), month).await
}

/// The current month, or the closed month `(month_index, year)` when one is given.
async fn load_period(
    config: &Config,
    archived: Option<(u32, i32)>,
    today: NaiveDate,
) -> Result<Month> {
    let Some((month_index, year)) = archived else {
        return load_month(config, today).await;
    };
    open_archived_month(config.store(), config.account_id(), month_index, year, today)
        .await?
        .ok_or_else(|| anyhow!("No closed month {}/{year} was found", month_index + 1))
}

/// Rejects day numbers that do not exist in `month`.
fn check_day(month: &Month, day: u8) -> Result<()> {
    if !month.contains_day_number(day) {
        anyhow::bail!(
            "{} has no day {day}, expected 1 to {}",
            month.period_label(),
            month.days_in_month()
        );
    }
    Ok(())
}
