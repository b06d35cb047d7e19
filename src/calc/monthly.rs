use crate::calc::daily_totals;
use crate::model::{Amount, FixedCategory, Month};
use serde::{Deserialize, Serialize};

/// How supplier spend (occasional purchases and formal invoices) is treated in net profit.
///
/// Supplier spend always counts toward `total_fixed_expenses`. Under `Investment` it is excluded
/// from net profit, like daily merchandise purchases, and reported as investment outflow. Under
/// `Expense` it is deducted.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierSpend {
    #[default]
    Investment,
    Expense,
}

serde_plain::derive_display_from_serialize!(SupplierSpend);
serde_plain::derive_fromstr_from_deserialize!(SupplierSpend);

/// The reconciliation of a whole month.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub cash_sales: Amount,
    pub transfer_sales: Amount,
    pub returns: Amount,
    pub expenses: Amount,
    pub merchandise_purchases: Amount,

    pub total_payroll: Amount,
    pub total_utilities: Amount,
    pub total_bank_obligations: Amount,
    pub total_occasional_supplier: Amount,
    pub total_formal_supplier: Amount,
    pub total_supplier_spend: Amount,
    pub rent: Amount,
    pub other_expenses: Amount,
    pub total_fixed_expenses: Amount,
    /// Fixed expenses without supplier spend.
    pub operating_fixed_expenses: Amount,

    pub gross_sales: Amount,
    pub cash_profit: Amount,
    pub net_profit: Amount,
    /// Merchandise purchases plus supplier spend. Never deducted from profit under the default
    /// policy.
    pub investment_outflow: Amount,
    /// Sales minus everything that left the business: returns, daily expenses, every fixed
    /// expense and merchandise purchases. Independent of the supplier spend policy.
    pub net_cash_flow: Amount,
    pub supplier_spend: SupplierSpend,
}

impl MonthlyTotals {
    /// The total of one list category.
    pub fn category_total(&self, category: FixedCategory) -> Amount {
        match category {
            FixedCategory::Payroll => self.total_payroll,
            FixedCategory::Utilities => self.total_utilities,
            FixedCategory::BankTransactions => self.total_bank_obligations,
            FixedCategory::OccasionalSuppliers => self.total_occasional_supplier,
            FixedCategory::FormalSuppliers => self.total_formal_supplier,
        }
    }

    /// The fixed expenses that `net_profit` deducts.
    pub fn deducted_fixed_expenses(&self) -> Amount {
        match self.supplier_spend {
            SupplierSpend::Investment => self.operating_fixed_expenses,
            SupplierSpend::Expense => self.total_fixed_expenses,
        }
    }
}

/// Aggregates every recorded day and every fixed-expense category of `month`. Days missing from
/// `month.days` contribute nothing.
pub fn monthly_totals(month: &Month, policy: SupplierSpend) -> MonthlyTotals {
    let mut t = MonthlyTotals {
        supplier_spend: policy,
        ..MonthlyTotals::default()
    };

    for day in month.days.values() {
        let d = daily_totals(Some(day), month.default_opening_float);
        t.cash_sales += d.cash_sales;
        t.transfer_sales += d.transfer_sales;
        t.returns += d.returns;
        t.expenses += d.expenses;
        t.merchandise_purchases += d.merchandise_purchases;
    }

    let fixed = &month.fixed_expenses;
    t.total_payroll = fixed.category_total(FixedCategory::Payroll);
    t.total_utilities = fixed.category_total(FixedCategory::Utilities);
    t.total_bank_obligations = fixed.category_total(FixedCategory::BankTransactions);
    t.total_occasional_supplier = fixed.category_total(FixedCategory::OccasionalSuppliers);
    t.total_formal_supplier = fixed.category_total(FixedCategory::FormalSuppliers);
    t.total_supplier_spend = t.total_occasional_supplier + t.total_formal_supplier;
    t.rent = fixed.rent;
    t.other_expenses = fixed.other_expenses;
    t.total_fixed_expenses = t.total_utilities
        + t.total_payroll
        + t.total_bank_obligations
        + t.total_supplier_spend
        + t.rent
        + t.other_expenses;
    t.operating_fixed_expenses = t.total_fixed_expenses - t.total_supplier_spend;

    t.gross_sales = t.cash_sales + t.transfer_sales;
    t.cash_profit = t.cash_sales - t.returns - t.expenses;
    t.net_profit = t.gross_sales - t.returns - t.expenses - t.deducted_fixed_expenses();
    t.investment_outflow = t.merchandise_purchases + t.total_supplier_spend;
    t.net_cash_flow = t.gross_sales
        - t.returns
        - t.expenses
        - t.total_fixed_expenses
        - t.merchandise_purchases;
    t
}
