use crate::model::{Amount, Transaction};
use serde::{Deserialize, Serialize};

/// The first and last valid day numbers of any month.
pub const FIRST_DAY: u8 = 1;
pub const LAST_DAY: u8 = 31;

/// Represents one recorded day of the month.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day_number: u8,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Overrides the month's default opening float for this day. `None` means "use the month
    /// default", not zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_float: Option<Amount>,
    #[serde(default)]
    pub has_data: bool,
}

impl Day {
    pub fn new(day_number: u8) -> Self {
        Self {
            day_number,
            transactions: Vec::new(),
            opening_float: None,
            has_data: false,
        }
    }

    /// The float the till started with: this day's override or `default_float`.
    pub fn resolved_opening_float(&self, default_float: Amount) -> Amount {
        self.opening_float.unwrap_or(default_float)
    }

    /// True when the day carries nothing worth storing. Such days are represented by an absent
    /// key in `Month::days`.
    pub fn is_blank(&self) -> bool {
        self.transactions.is_empty() && !self.has_data && self.opening_float.is_none()
    }
}

/// Whether `n` can be the number of a day in some month.
pub fn is_valid_day_number(n: u8) -> bool {
    (FIRST_DAY..=LAST_DAY).contains(&n)
}
