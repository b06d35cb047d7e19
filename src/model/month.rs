use crate::model::{is_valid_day_number, Amount, Day, FixedExpenses, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The aggregate record of one accounting period (a calendar month) of a single shop.
///
/// `days` is sparse: a missing key means nothing was recorded that day.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Month {
    /// Zero-based calendar month, 0 = January.
    pub month_index: u32,
    pub year: i32,
    #[serde(default)]
    pub days: BTreeMap<u8, Day>,
    #[serde(default)]
    pub fixed_expenses: FixedExpenses,
    #[serde(default)]
    pub default_opening_float: Amount,
}

impl Month {
    /// An empty month for the period containing `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::for_period(today.month0(), today.year())
    }

    /// An empty month for the given period.
    pub fn for_period(month_index: u32, year: i32) -> Self {
        Self {
            month_index,
            year,
            days: BTreeMap::new(),
            fixed_expenses: FixedExpenses::default(),
            default_opening_float: Amount::ZERO,
        }
    }

    /// The number of days in this calendar month, accounting for leap years.
    pub fn days_in_month(&self) -> u8 {
        let next = if self.month_index >= 11 {
            self.year.checked_add(1).map(|year| (year, 1))
        } else {
            Some((self.year, self.month_index + 2))
        };
        next.and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
            .and_then(|first_of_next| first_of_next.pred_opt())
            .map(|last| last.day() as u8)
            .unwrap_or(31)
    }

    /// The English name of the month, e.g. `October`.
    pub fn month_name(&self) -> &'static str {
        self.month_index
            .checked_add(1)
            .and_then(|m| u8::try_from(m).ok())
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// e.g. `OCTOBER 2026`
    pub fn period_label(&self) -> String {
        format!("{} {}", self.month_name().to_uppercase(), self.year)
    }

    pub fn day(&self, day_number: u8) -> Option<&Day> {
        self.days.get(&day_number)
    }

    /// Number of days that have an entry.
    pub fn recorded_day_count(&self) -> usize {
        self.days.len()
    }

    /// Stores `day` under its own number, replacing any previous entry. A blank day removes the
    /// entry instead, so that an absent key stays the only representation of "no data".
    pub fn upsert_day(&mut self, day: Day) {
        if day.is_blank() {
            self.days.remove(&day.day_number);
        } else {
            self.days.insert(day.day_number, day);
        }
    }

    /// Appends `transaction` to the given day, creating the day on first use.
    pub fn add_transaction(&mut self, day_number: u8, transaction: Transaction) {
        let day = self
            .days
            .entry(day_number)
            .or_insert_with(|| Day::new(day_number));
        day.has_data = true;
        day.transactions.push(transaction);
    }

    /// Removes the transaction with `id` from the given day. Returns whether anything was removed.
    pub fn remove_transaction(&mut self, day_number: u8, id: &str) -> bool {
        let Some(day) = self.days.get_mut(&day_number) else {
            return false;
        };
        let before = day.transactions.len();
        day.transactions.retain(|t| t.id != id);
        before != day.transactions.len()
    }

    /// Sets or clears (with `None`) the opening float override of a day.
    pub fn set_opening_float(&mut self, day_number: u8, float: Option<Amount>) {
        let mut day = self
            .days
            .remove(&day_number)
            .unwrap_or_else(|| Day::new(day_number));
        day.opening_float = float;
        self.upsert_day(day);
    }

    /// Whether `day_number` exists in this month.
    pub fn contains_day_number(&self, day_number: u8) -> bool {
        is_valid_day_number(day_number) && day_number <= self.days_in_month()
    }

    /// Produces the empty month that replaces this one when the month is closed. The new month
    /// belongs to the period containing `today`. Days are always cleared; the fixed-expense lists
    /// are carried over when `keep_fixed` is set.
    pub fn closed(&self, today: NaiveDate, keep_fixed: bool) -> Month {
        let mut next = Month::new(today);
        if keep_fixed {
            next.fixed_expenses = self.fixed_expenses.clone();
        }
        next
    }
}
