//! Turns a `Month` into an ordered set of named tables: one per calendar day, then a monthly
//! summary. The tables carry typed cells and know nothing about the file format they end up in;
//! see `render` for the renderer.
mod render;

pub use render::CsvRenderer;

use crate::calc::{daily_totals, monthly_totals, DailyTotals, MonthlyTotals, SupplierSpend};
use crate::model::{Amount, Day, FixedCategory, Month, TransactionKind};

/// Rows before the first transaction of a day table: title, period, opening float and column
/// headers.
pub const DAY_HEADER_ROWS: usize = 4;

/// Rows after the last transaction of a day table: five subtotals, the expected drawer and the
/// day's profit.
pub const DAY_FOOTER_ROWS: usize = 7;

pub const DAY_COLUMNS: [&str; 6] = [
    "Description",
    "Category",
    "Cash in",
    "Transfer in",
    "Cash out",
    "Entered by",
];

pub const SUMMARY_COLUMNS: [&str; 3] = ["Concept", "Amount", "Entered by"];

pub const NO_ENTRIES: &str = "(no entries)";

pub const SUMMARY_TABLE: &str = "Summary";

/// A single value. Amounts stay numeric so that a spreadsheet can sum them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Cell {
    Text(String),
    Amount(Amount),
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn attribution(created_by: Option<&str>) -> Self {
        created_by.map(Cell::text).unwrap_or(Cell::Empty)
    }
}

/// What a row means, for renderers that want to style it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RowKind {
    Title,
    Header,
    Entry,
    Subtotal,
    Total,
    Note,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(kind: RowKind, cells: Vec<Cell>) -> Self {
        Self { kind, cells }
    }

    fn labeled(kind: RowKind, label: &str, amount: Amount) -> Self {
        Self::new(kind, vec![Cell::text(label), Cell::Amount(amount)])
    }

    fn header(columns: &[&str]) -> Self {
        Self::new(
            RowKind::Header,
            columns.iter().map(|c| Cell::text(*c)).collect(),
        )
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

/// The full export of one month.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Report {
    /// e.g. `Accounting_Districauchos_October_2026`. Renderers add their own extension.
    pub file_stem: String,
    pub tables: Vec<Table>,
}

impl Report {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Builds the report for `month`: a table for every day 1..=N of the calendar month, recorded or
/// not, followed by the summary table.
pub fn build_report(month: &Month, shop_name: &str, policy: SupplierSpend) -> Report {
    let mut tables: Vec<Table> = (1..=month.days_in_month())
        .map(|n| day_table(month, shop_name, n))
        .collect();
    tables.push(summary_table(
        month,
        shop_name,
        &monthly_totals(month, policy),
    ));
    Report {
        file_stem: file_stem(shop_name, month),
        tables,
    }
}

pub fn day_table_name(day_number: u8) -> String {
    format!("Day {day_number:02}")
}

fn file_stem(shop_name: &str, month: &Month) -> String {
    let shop: String = shop_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("Accounting_{shop}_{}_{}", month.month_name(), month.year)
}

fn day_table(month: &Month, shop_name: &str, day_number: u8) -> Table {
    let day: Option<&Day> = month.day(day_number);
    let totals: DailyTotals = daily_totals(day, month.default_opening_float);

    let mut rows = vec![
        Row::new(
            RowKind::Title,
            vec![Cell::text(shop_name), Cell::text("Daily report")],
        ),
        Row::new(
            RowKind::Title,
            vec![
                Cell::text("Date"),
                Cell::text(format!("Day {day_number} of {}", month.period_label())),
            ],
        ),
        Row::labeled(RowKind::Subtotal, "Opening float", totals.opening_float),
        Row::header(&DAY_COLUMNS),
    ];

    for txn in day.iter().flat_map(|d| d.transactions.iter()) {
        let amount = Cell::Amount(txn.amount);
        let (cash_in, transfer_in, cash_out) = match txn.category {
            TransactionKind::CashSale => (amount, Cell::Empty, Cell::Empty),
            TransactionKind::TransferSale => (Cell::Empty, amount, Cell::Empty),
            TransactionKind::Return
            | TransactionKind::Expense
            | TransactionKind::MerchandisePurchase => (Cell::Empty, Cell::Empty, amount),
        };
        rows.push(Row::new(
            RowKind::Entry,
            vec![
                Cell::text(txn.description.as_str()),
                Cell::text(txn.category.label()),
                cash_in,
                transfer_in,
                cash_out,
                Cell::attribution(txn.created_by.as_deref()),
            ],
        ));
    }

    rows.extend([
        Row::labeled(RowKind::Subtotal, "Cash sales", totals.cash_sales),
        Row::labeled(RowKind::Subtotal, "Transfer sales", totals.transfer_sales),
        Row::labeled(RowKind::Subtotal, "Returns", totals.returns),
        Row::labeled(RowKind::Subtotal, "Expenses", totals.expenses),
        Row::labeled(
            RowKind::Subtotal,
            "Merchandise purchases",
            totals.merchandise_purchases,
        ),
        Row::labeled(
            RowKind::Total,
            "Physical cash expected",
            totals.physical_cash_expected,
        ),
        Row::labeled(RowKind::Total, "Total profit", totals.total_profit),
    ]);

    Table {
        name: day_table_name(day_number),
        rows,
    }
}

fn summary_table(month: &Month, shop_name: &str, t: &MonthlyTotals) -> Table {
    let mut rows = vec![
        Row::new(
            RowKind::Title,
            vec![Cell::text(shop_name), Cell::text("Monthly summary")],
        ),
        Row::new(
            RowKind::Title,
            vec![Cell::text("Period"), Cell::text(month.period_label())],
        ),
        Row::header(&SUMMARY_COLUMNS),
        // Sales
        Row::labeled(RowKind::Entry, "Cash sales", t.cash_sales),
        Row::labeled(RowKind::Entry, "Transfer sales", t.transfer_sales),
        Row::labeled(RowKind::Subtotal, "Gross sales", t.gross_sales),
        // Operating deductions
        Row::labeled(RowKind::Entry, "Returns", t.returns),
        Row::labeled(RowKind::Entry, "Daily expenses", t.expenses),
        Row::labeled(RowKind::Subtotal, "Cash profit", t.cash_profit),
        // Tracked, not deducted
        Row::labeled(RowKind::Entry, "Merchandise purchases", t.merchandise_purchases),
        Row::labeled(RowKind::Subtotal, "Investment outflow", t.investment_outflow),
        Row::labeled(RowKind::Subtotal, "Net cash flow", t.net_cash_flow),
    ];

    for category in FixedCategory::ALL {
        rows.push(Row::labeled(
            RowKind::Subtotal,
            category.label(),
            t.category_total(category),
        ));
        let items = month.fixed_expenses.items(category);
        if items.is_empty() {
            rows.push(Row::new(RowKind::Note, vec![Cell::text(NO_ENTRIES)]));
        }
        for item in items {
            rows.push(Row::new(
                RowKind::Entry,
                vec![
                    Cell::text(item.label()),
                    Cell::Amount(item.total()),
                    Cell::attribution(item.created_by()),
                ],
            ));
        }
    }

    let net_note = match t.supplier_spend {
        SupplierSpend::Investment => "Supplier spend and merchandise purchases not deducted",
        SupplierSpend::Expense => "Supplier spend deducted, merchandise purchases not deducted",
    };
    rows.extend([
        Row::labeled(RowKind::Subtotal, "Rent", t.rent),
        Row::labeled(RowKind::Subtotal, "Other expenses", t.other_expenses),
        Row::labeled(RowKind::Total, "Total fixed expenses", t.total_fixed_expenses),
        Row::new(
            RowKind::Total,
            vec![
                Cell::text("Net profit"),
                Cell::Amount(t.net_profit),
                Cell::text(net_note),
            ],
        ),
    ]);

    Table {
        name: SUMMARY_TABLE.to_string(),
        rows,
    }
}
