//! Reconciliation arithmetic. Everything here is a pure function of a `Month` (or one of its
//! days) and cannot fail.
mod daily;
mod monthly;

pub use daily::{daily_totals, DailyTotals};
pub use monthly::{monthly_totals, MonthlyTotals, SupplierSpend};
