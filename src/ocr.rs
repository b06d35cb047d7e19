//! Turning photographed notebook pages into draft transactions.
//!
//! The character recognition itself happens outside this crate, behind the `Ocr` trait. This
//! module only adapts what such a tool returns into domain values.

use crate::model::{Amount, Day, Month, Transaction, TransactionKind};
use crate::utils;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// One line the OCR tool read from a page.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedItem {
    #[serde(default)]
    pub description: String,
    /// Kept loose: tools return numbers, numeric strings or nothing at all.
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(default, alias = "type", alias = "category")]
    pub category_guess: Option<String>,
}

/// What an OCR tool returns for a batch of pages.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
    /// The day of the month the tool believes the pages belong to.
    #[serde(default)]
    pub day_estimate: Option<f64>,
}

pub enum OcrError {
    /// The tool ran but nothing usable came out of it.
    NoUsableData,
    /// The tool itself failed. No retry is attempted.
    Collaborator(anyhow::Error),
}

impl Debug for OcrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OcrError::NoUsableData => f.write_str("NoUsableData"),
            OcrError::Collaborator(e) => write!(f, "Collaborator({e:?})"),
        }
    }
}

impl Display for OcrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OcrError::NoUsableData => f.write_str("no usable data was extracted"),
            OcrError::Collaborator(e) => write!(f, "the OCR tool failed: {e:#}"),
        }
    }
}

impl std::error::Error for OcrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OcrError::NoUsableData => None,
            OcrError::Collaborator(e) => Some(&**e),
        }
    }
}

impl From<anyhow::Error> for OcrError {
    fn from(e: anyhow::Error) -> Self {
        OcrError::Collaborator(e)
    }
}

/// Something that can read transactions off page images.
#[async_trait]
pub trait Ocr: Send + Sync {
    async fn extract(&self, images: &[PathBuf]) -> Result<Extraction, OcrError>;
}

/// An `Ocr` whose "images" are JSON files already produced by an external OCR tool. Items from
/// all files are concatenated in order; the first day estimate found wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileOcr;

#[async_trait]
impl Ocr for JsonFileOcr {
    async fn extract(&self, images: &[PathBuf]) -> Result<Extraction, OcrError> {
        let mut merged = Extraction::default();
        for path in images {
            let extraction: Extraction = utils::deserialize(path)
                .await
                .with_context(|| format!("Unable to read extraction {}", path.display()))?;
            debug!(
                "Read {} items from {}",
                extraction.items.len(),
                path.display()
            );
            merged.items.extend(extraction.items);
            merged.day_estimate = merged.day_estimate.or(extraction.day_estimate);
        }
        Ok(merged)
    }
}

/// Converts extracted items into transactions with fresh ids, attributed to `attributed_to`.
///
/// - Amounts that are not numbers become zero.
/// - Items with a negative amount are skipped.
/// - An unknown or missing category guess becomes a cash sale.
pub fn to_transactions(items: &[ExtractedItem], attributed_to: Option<&str>) -> Vec<Transaction> {
    items
        .iter()
        .filter_map(|item| {
            let amount = Amount::coerce(&item.amount);
            if amount.is_negative() {
                warn!(
                    "Skipping extracted item '{}' with negative amount {amount}",
                    item.description
                );
                return None;
            }
            let guess = item.category_guess.as_deref().unwrap_or_default();
            let category = TransactionKind::from_str(guess.trim()).unwrap_or_else(|_| {
                warn!(
                    "Unknown category '{guess}' for '{}', recording a cash sale",
                    item.description
                );
                TransactionKind::CashSale
            });
            Some(Transaction::new(
                item.description.trim(),
                amount,
                category,
                attributed_to.map(str::to_string),
            ))
        })
        .collect()
}

/// Builds a draft of the day that `extraction` belongs to. The draft holds only the extracted
/// transactions and keeps the opening float override of the existing day, if any.
///
/// The target day is `selected_day` when it exists in `month`, otherwise the tool's estimate when
/// that exists in `month`, otherwise today's day of the month (capped at the month's last day).
pub fn draft_day(
    month: &Month,
    extraction: &Extraction,
    selected_day: Option<u8>,
    today: NaiveDate,
    attributed_to: Option<&str>,
) -> Result<Day, OcrError> {
    let transactions = to_transactions(&extraction.items, attributed_to);
    if transactions.is_empty() {
        return Err(OcrError::NoUsableData);
    }

    let in_month = |n: u8| month.contains_day_number(n);
    let estimate = extraction
        .day_estimate
        .filter(|n| n.fract() == 0.0 && (1.0..=31.0).contains(n))
        .map(|n| n as u8)
        .filter(|n| in_month(*n));
    let fallback = u8::try_from(today.day())
        .unwrap_or(1)
        .min(month.days_in_month());
    let day_number = selected_day
        .filter(|n| in_month(*n))
        .or(estimate)
        .unwrap_or(fallback);
    debug!("Drafting day {day_number} with {} transactions", transactions.len());

    Ok(Day {
        day_number,
        transactions,
        opening_float: month.day(day_number).and_then(|d| d.opening_float),
        has_data: true,
    })
}
