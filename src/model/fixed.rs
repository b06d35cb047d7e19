//! Monthly fixed-expense categories. Each list category holds line items in the order the user
//! entered them.

use crate::model::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Behavior shared by the line items of every fixed-expense list.
pub trait LineItem {
    fn id(&self) -> &str;

    /// The amount this item contributes to its category total.
    fn total(&self) -> Amount;

    /// A one-line description suitable for a report row.
    fn label(&self) -> String;

    /// Who entered the item, when known.
    fn created_by(&self) -> Option<&str>;
}

/// A utility bill (power, water, internet, ...).
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilityItem {
    pub id: String,
    pub name: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub other_fields: BTreeMap<String, serde_json::Value>,
}

/// Payroll for one employee, paid in two halves. Payroll is entered by an administrator only, so
/// it carries no attribution.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntry {
    pub id: String,
    pub employee_name: String,
    pub first_half_pay: Amount,
    pub second_half_pay: Amount,
    #[serde(flatten)]
    pub other_fields: BTreeMap<String, serde_json::Value>,
}

/// A dated expense with a free-text description. Used for bank obligations and for occasional
/// supplier purchases.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedExpense {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub other_fields: BTreeMap<String, serde_json::Value>,
}

pub type BankObligation = DatedExpense;
pub type OccasionalSupplierPurchase = DatedExpense;

/// An invoice from a formal supplier.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormalSupplierInvoice {
    pub id: String,
    pub date: String,
    pub supplier_name: String,
    pub invoice_number: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub other_fields: BTreeMap<String, serde_json::Value>,
}

/// All of a month's fixed costs. Every list is always present, possibly empty.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedExpenses {
    pub utilities: Vec<UtilityItem>,
    pub payroll: Vec<PayrollEntry>,
    pub bank_transactions: Vec<BankObligation>,
    pub occasional_suppliers: Vec<OccasionalSupplierPurchase>,
    pub formal_suppliers: Vec<FormalSupplierInvoice>,
    pub rent: Amount,
    pub other_expenses: Amount,
}

/// The list-typed fixed-expense categories, in report order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedCategory {
    Payroll,
    Utilities,
    BankTransactions,
    OccasionalSuppliers,
    FormalSuppliers,
}

serde_plain::derive_display_from_serialize!(FixedCategory);
serde_plain::derive_fromstr_from_deserialize!(FixedCategory);

impl FixedCategory {
    pub const ALL: [FixedCategory; 5] = [
        FixedCategory::Payroll,
        FixedCategory::Utilities,
        FixedCategory::BankTransactions,
        FixedCategory::OccasionalSuppliers,
        FixedCategory::FormalSuppliers,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FixedCategory::Payroll => "Payroll",
            FixedCategory::Utilities => "Utilities",
            FixedCategory::BankTransactions => "Bank obligations",
            FixedCategory::OccasionalSuppliers => "Occasional supplier purchases",
            FixedCategory::FormalSuppliers => "Formal supplier invoices",
        }
    }
}

impl FixedExpenses {
    /// The items of `category` as trait objects, in insertion order.
    pub fn items(&self, category: FixedCategory) -> Vec<&dyn LineItem> {
        fn erase<T: LineItem>(items: &[T]) -> Vec<&dyn LineItem> {
            items.iter().map(|i| i as &dyn LineItem).collect()
        }
        match category {
            FixedCategory::Payroll => erase(&self.payroll),
            FixedCategory::Utilities => erase(&self.utilities),
            FixedCategory::BankTransactions => erase(&self.bank_transactions),
            FixedCategory::OccasionalSuppliers => erase(&self.occasional_suppliers),
            FixedCategory::FormalSuppliers => erase(&self.formal_suppliers),
        }
    }

    /// Sum of the item totals of `category`. Zero for an empty list.
    pub fn category_total(&self, category: FixedCategory) -> Amount {
        self.items(category).iter().map(|i| i.total()).sum()
    }

    /// Removes the item with `id` from `category`. Returns whether anything was removed.
    pub fn remove(&mut self, category: FixedCategory, id: &str) -> bool {
        fn remove_from<T: LineItem>(items: &mut Vec<T>, id: &str) -> bool {
            let before = items.len();
            items.retain(|i| i.id() != id);
            before != items.len()
        }
        match category {
            FixedCategory::Payroll => remove_from(&mut self.payroll, id),
            FixedCategory::Utilities => remove_from(&mut self.utilities, id),
            FixedCategory::BankTransactions => remove_from(&mut self.bank_transactions, id),
            FixedCategory::OccasionalSuppliers => remove_from(&mut self.occasional_suppliers, id),
            FixedCategory::FormalSuppliers => remove_from(&mut self.formal_suppliers, id),
        }
    }
}

impl LineItem for UtilityItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn total(&self) -> Amount {
        self.amount
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

impl LineItem for PayrollEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn total(&self) -> Amount {
        self.first_half_pay + self.second_half_pay
    }

    fn label(&self) -> String {
        format!(
            "{} (1st half {} / 2nd half {})",
            self.employee_name, self.first_half_pay, self.second_half_pay
        )
    }

    fn created_by(&self) -> Option<&str> {
        None
    }
}

impl LineItem for DatedExpense {
    fn id(&self) -> &str {
        &self.id
    }

    fn total(&self) -> Amount {
        self.amount
    }

    fn label(&self) -> String {
        join_date(&self.date, &self.description)
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

impl LineItem for FormalSupplierInvoice {
    fn id(&self) -> &str {
        &self.id
    }

    fn total(&self) -> Amount {
        self.amount
    }

    fn label(&self) -> String {
        let supplier = if self.invoice_number.is_empty() {
            self.supplier_name.clone()
        } else {
            format!("{} #{}", self.supplier_name, self.invoice_number)
        };
        join_date(&self.date, &supplier)
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

fn join_date(date: &str, text: &str) -> String {
    if date.is_empty() {
        text.to_string()
    } else {
        format!("{date} {text}")
    }
}
