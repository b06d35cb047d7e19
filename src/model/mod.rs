//! Types that represent the core data model, such as `Month`, `Day` and `Transaction`.
mod amount;
mod day;
mod fixed;
mod month;
mod transaction;

pub use amount::{Amount, AmountError};
pub use day::{is_valid_day_number, Day, FIRST_DAY, LAST_DAY};
pub use fixed::{
    BankObligation, DatedExpense, FixedCategory, FixedExpenses, FormalSupplierInvoice, LineItem,
    OccasionalSupplierPurchase, PayrollEntry, UtilityItem,
};
pub use month::Month;
pub use transaction::{Transaction, TransactionKind};
