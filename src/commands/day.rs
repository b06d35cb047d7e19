//! Day command handlers.

use crate::access::{Credentials, Permission};
use crate::args::{AddTransactionArgs, DayFloatArgs, RemoveTransactionArgs};
use crate::calc::{daily_totals, DailyTotals};
use crate::commands::{authorize, check_day, load_month, save_month, Out};
use crate::model::{Transaction, TransactionKind};
use crate::{Config, Result};
use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A day's entries together with its reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub day_number: u8,
    pub period: String,
    pub transactions: Vec<Transaction>,
    pub totals: DailyTotals,
}

impl DayView {
    fn render(&self) -> String {
        let mut s = format!("Day {} of {}\n", self.day_number, self.period);
        if self.transactions.is_empty() {
            s.push_str("  no transactions\n");
        }
        for t in &self.transactions {
            let _ = writeln!(
                s,
                "  {:<22} {:>14}  {}{}  [{}]",
                t.category.label(),
                t.amount.to_string(),
                t.description,
                t.created_by
                    .as_deref()
                    .map(|c| format!(" ({c})"))
                    .unwrap_or_default(),
                t.id
            );
        }
        let totals = &self.totals;
        let _ = write!(
            s,
            "Opening float {}, cash sales {}, transfer sales {}, returns {}, expenses {}, \
             merchandise purchases {}\nPhysical cash expected: {}\nTotal profit: {}",
            totals.opening_float,
            totals.cash_sales,
            totals.transfer_sales,
            totals.returns,
            totals.expenses,
            totals.merchandise_purchases,
            totals.physical_cash_expected,
            totals.total_profit
        );
        s
    }
}

/// Shows a day's transactions and what the drawer should hold. Days without entries are shown
/// too, with the month's default opening float.
pub async fn show_day(config: &Config, today: NaiveDate, day: u8) -> Result<Out<DayView>> {
    let month = load_month(config, today).await?;
    check_day(&month, day)?;
    let recorded = month.day(day);
    let view = DayView {
        day_number: day,
        period: month.period_label(),
        transactions: recorded.map(|d| d.transactions.clone()).unwrap_or_default(),
        totals: daily_totals(recorded, month.default_opening_float),
    };
    Ok(Out::new(view.render(), view))
}

/// Records a transaction, attributed to the authenticated operator.
pub async fn add_transaction(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    args: &AddTransactionArgs,
) -> Result<Out<Transaction>> {
    let created_by = authorize(config, credentials, Permission::Record)?;
    let mut month = load_month(config, today).await?;
    check_day(&month, args.day)?;

    let transaction = Transaction::new(
        args.description.trim(),
        args.amount,
        args.kind,
        created_by,
    );
    month.add_transaction(args.day, transaction.clone());
    save_month(config, &month).await?;

    let totals = daily_totals(month.day(args.day), month.default_opening_float);
    let message = format!(
        "Recorded {} of {} on day {}, drawer should now hold {}",
        label(args.kind),
        args.amount,
        args.day,
        totals.physical_cash_expected
    );
    Ok(Out::new(message, transaction))
}

/// Removes a transaction from a day.
pub async fn remove_transaction(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    args: &RemoveTransactionArgs,
) -> Result<Out<String>> {
    authorize(config, credentials, Permission::Record)?;
    let mut month = load_month(config, today).await?;
    check_day(&month, args.day)?;
    if !month.remove_transaction(args.day, &args.id) {
        bail!("Day {} has no transaction with id '{}'", args.day, args.id);
    }
    save_month(config, &month).await?;
    Ok(Out::new(
        format!("Removed transaction {} from day {}", args.id, args.day),
        args.id.clone(),
    ))
}

/// Overrides the opening float of a day, or clears the override.
pub async fn set_day_float(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    args: &DayFloatArgs,
) -> Result<Out<()>> {
    authorize(config, credentials, Permission::Record)?;
    let mut month = load_month(config, today).await?;
    check_day(&month, args.day)?;
    month.set_opening_float(args.day, args.amount);
    save_month(config, &month).await?;
    let message = match args.amount {
        Some(amount) => format!("Day {} opens with {amount}", args.day),
        None => format!(
            "Day {} uses the default opening float of {}",
            args.day, month.default_opening_float
        ),
    };
    Ok(message.into())
}

fn label(kind: TransactionKind) -> String {
    kind.label().to_lowercase()
}
