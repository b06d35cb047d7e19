//! These structs provide the CLI interface for the cashbook CLI.

use crate::access::Credentials;
use crate::model::{Amount, AmountError, FixedCategory, TransactionKind};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// cashbook: daily cash reconciliation and monthly accounts for a small shop.
///
/// Record each day's sales, returns, expenses and merchandise purchases, enter the month's fixed
/// costs, and get the cash that should be in the drawer, the month's profit, and a spreadsheet
/// ready export. Pages photographed from a paper ledger can be imported from the JSON output of
/// an OCR tool.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// This is the first command you should run. Operators and their PINs can be added to
    /// config.json afterwards; until then anyone may record entries.
    Init(InitArgs),
    /// Show or change the entries of one day.
    #[command(subcommand)]
    Day(DaySubcommand),
    /// Enter the month's fixed expenses.
    #[command(subcommand)]
    Fixed(FixedSubcommand),
    /// Set the opening float used by days that do not override it.
    DefaultFloat(AmountArgs),
    /// Show the month's totals and profit.
    Summary(PeriodArgs),
    /// Write the month's report as CSV files.
    Export(ExportArgs),
    /// Import transactions from OCR extraction files.
    Import(ImportArgs),
    /// Close the month and start the one containing today.
    Close(CloseArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where cashbook data and configuration is held. Defaults to ~/cashbook
    #[arg(long, env = "CASHBOOK_HOME", default_value_t = default_cashbook_home())]
    cashbook_home: DisplayPath,

    /// The operator recording entries. Required when operators are configured.
    #[arg(long, env = "CASHBOOK_OPERATOR")]
    operator: Option<String>,

    /// The operator's PIN.
    #[arg(long, env = "CASHBOOK_PIN", hide_env_values = true)]
    pin: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, cashbook_home: PathBuf) -> Self {
        Self {
            log_level,
            cashbook_home: cashbook_home.into(),
            operator: None,
            pin: None,
        }
    }

    pub fn with_operator(mut self, name: impl Into<String>, pin: impl Into<String>) -> Self {
        self.operator = Some(name.into());
        self.pin = Some(pin.into());
        self
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn cashbook_home(&self) -> &DisplayPath {
        &self.cashbook_home
    }

    /// The presented credentials. A name without a PIN is treated as an empty PIN.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        self.operator.as_deref().map(|name| Credentials {
            name,
            pin: self.pin.as_deref().unwrap_or_default(),
        })
    }
}

/// Args for the `cashbook init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The shop's name, printed on reports and used in export file names.
    #[arg(long)]
    shop_name: String,

    /// The key of the shop's document in the store.
    #[arg(long)]
    account_id: Option<String>,
}

impl InitArgs {
    pub fn new(shop_name: impl Into<String>, account_id: Option<String>) -> Self {
        Self {
            shop_name: shop_name.into(),
            account_id,
        }
    }

    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DaySubcommand {
    /// Show a day's transactions and its reconciliation.
    Show(DayArgs),
    /// Record a transaction.
    Add(AddTransactionArgs),
    /// Remove a transaction by id.
    Remove(RemoveTransactionArgs),
    /// Override the opening float of a day, or clear the override.
    Float(DayFloatArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct DayArgs {
    /// Day of the month, 1-31.
    pub day: u8,
}

#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    /// Day of the month, 1-31.
    pub day: u8,

    /// One of: cash_sale, transfer_sale, return, expense, merchandise_purchase
    #[arg(long)]
    pub kind: TransactionKind,

    #[arg(long, value_parser = parse_amount)]
    pub amount: Amount,

    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Parser, Clone)]
pub struct RemoveTransactionArgs {
    pub day: u8,
    pub id: String,
}

#[derive(Debug, Parser, Clone)]
pub struct DayFloatArgs {
    pub day: u8,

    /// The float the till started with. Omit to go back to the month default.
    #[arg(value_parser = parse_amount)]
    pub amount: Option<Amount>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum FixedSubcommand {
    /// Add a utility bill.
    Utility(UtilityArgs),
    /// Add an employee's pay for the month. Needs an admin.
    Payroll(PayrollArgs),
    /// Add a bank obligation (loan installment, fees).
    Bank(DatedExpenseArgs),
    /// Add an occasional supplier purchase.
    Occasional(DatedExpenseArgs),
    /// Add a formal supplier invoice.
    Formal(FormalInvoiceArgs),
    /// Set the month's rent.
    Rent(AmountArgs),
    /// Set the month's other expenses.
    Other(AmountArgs),
    /// Remove a line item by id.
    Remove(RemoveItemArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AmountArgs {
    #[arg(value_parser = parse_amount)]
    pub amount: Amount,
}

#[derive(Debug, Parser, Clone)]
pub struct UtilityArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, value_parser = parse_amount)]
    pub amount: Amount,
}

#[derive(Debug, Parser, Clone)]
pub struct PayrollArgs {
    #[arg(long)]
    pub employee: String,

    /// Pay for the first half of the month.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub first_half: Amount,

    /// Pay for the second half of the month.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub second_half: Amount,
}

#[derive(Debug, Parser, Clone)]
pub struct DatedExpenseArgs {
    /// Free-form date, e.g. 2026-10-05
    #[arg(long, default_value = "")]
    pub date: String,

    #[arg(long)]
    pub description: String,

    #[arg(long, value_parser = parse_amount)]
    pub amount: Amount,
}

#[derive(Debug, Parser, Clone)]
pub struct FormalInvoiceArgs {
    #[arg(long, default_value = "")]
    pub date: String,

    #[arg(long)]
    pub supplier: String,

    #[arg(long, default_value = "")]
    pub invoice: String,

    #[arg(long, value_parser = parse_amount)]
    pub amount: Amount,
}

#[derive(Debug, Parser, Clone)]
pub struct RemoveItemArgs {
    /// One of: payroll, utilities, bank_transactions, occasional_suppliers, formal_suppliers
    pub category: FixedCategory,
    pub id: String,
}

/// Selects a closed month instead of the current one.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Month number of a closed month, 1-12. Requires --year.
    #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    #[arg(long, requires = "month")]
    pub year: Option<i32>,
}

impl PeriodArgs {
    /// The zero-based month index and year of the selected closed month.
    pub fn archived(&self) -> Option<(u32, i32)> {
        Some((self.month? - 1, self.year?))
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The directory to write into. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    #[clap(flatten)]
    pub period: PeriodArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// Extraction JSON files written by the OCR tool.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// The day to import into. Defaults to the day the OCR tool detected, then today.
    #[arg(long)]
    pub day: Option<u8>,

    /// Replace the day's transactions instead of appending to them.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct CloseArgs {
    /// Start the new month with empty fixed-expense lists instead of carrying them over.
    #[arg(long)]
    pub clear_fixed: bool,

    /// Overwrite the archived copy when this period was already closed once.
    #[arg(long)]
    pub replace_archive: bool,
}

fn parse_amount(s: &str) -> Result<Amount, AmountError> {
    Amount::parse_input(s)
}

fn default_cashbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("cashbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --cashbook-home or CASHBOOK_HOME instead of relying on the \
                default cashbook home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("cashbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
