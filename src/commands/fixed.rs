//! Fixed-expense command handlers.

use crate::access::{Credentials, Permission};
use crate::args::{DatedExpenseArgs, FormalInvoiceArgs, PayrollArgs, UtilityArgs};
use crate::commands::{authorize, load_month, save_month, Out};
use crate::model::{
    Amount, DatedExpense, FixedCategory, FormalSupplierInvoice, LineItem, PayrollEntry,
    UtilityItem,
};
use crate::{Config, Result};
use anyhow::bail;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A line item to append to one of the fixed-expense lists.
#[derive(Debug, Clone)]
pub enum NewFixedItem {
    Utility(UtilityArgs),
    Payroll(PayrollArgs),
    Bank(DatedExpenseArgs),
    Occasional(DatedExpenseArgs),
    Formal(FormalInvoiceArgs),
}

impl NewFixedItem {
    pub fn category(&self) -> FixedCategory {
        match self {
            NewFixedItem::Utility(_) => FixedCategory::Utilities,
            NewFixedItem::Payroll(_) => FixedCategory::Payroll,
            NewFixedItem::Bank(_) => FixedCategory::BankTransactions,
            NewFixedItem::Occasional(_) => FixedCategory::OccasionalSuppliers,
            NewFixedItem::Formal(_) => FixedCategory::FormalSuppliers,
        }
    }
}

/// The scalar fixed expenses.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FixedAmount {
    Rent,
    Other,
}

fn permission_for(category: FixedCategory) -> Permission {
    match category {
        FixedCategory::Payroll => Permission::Administer,
        _ => Permission::Record,
    }
}

fn dated(args: &DatedExpenseArgs, id: String, created_by: Option<String>) -> DatedExpense {
    DatedExpense {
        id,
        date: args.date.trim().to_string(),
        description: args.description.trim().to_string(),
        amount: args.amount,
        created_by,
        other_fields: BTreeMap::new(),
    }
}

/// Appends a line item to its category. Payroll needs an admin; the other lists take any operator,
/// whose name is recorded on the item. Returns the new item's id.
pub async fn add_fixed_item(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    item: &NewFixedItem,
) -> Result<Out<String>> {
    let category = item.category();
    let created_by = authorize(config, credentials, permission_for(category))?;
    let mut month = load_month(config, today).await?;
    let id = Uuid::new_v4().to_string();
    let fixed = &mut month.fixed_expenses;

    let label = match item {
        NewFixedItem::Utility(args) => {
            let entry = UtilityItem {
                id: id.clone(),
                name: args.name.trim().to_string(),
                amount: args.amount,
                created_by,
                other_fields: BTreeMap::new(),
            };
            let label = entry.label();
            fixed.utilities.push(entry);
            label
        }
        NewFixedItem::Payroll(args) => {
            let entry = PayrollEntry {
                id: id.clone(),
                employee_name: args.employee.trim().to_string(),
                first_half_pay: args.first_half,
                second_half_pay: args.second_half,
                other_fields: BTreeMap::new(),
            };
            let label = entry.label();
            fixed.payroll.push(entry);
            label
        }
        NewFixedItem::Bank(args) => {
            let entry = dated(args, id.clone(), created_by);
            let label = entry.label();
            fixed.bank_transactions.push(entry);
            label
        }
        NewFixedItem::Occasional(args) => {
            let entry = dated(args, id.clone(), created_by);
            let label = entry.label();
            fixed.occasional_suppliers.push(entry);
            label
        }
        NewFixedItem::Formal(args) => {
            let entry = FormalSupplierInvoice {
                id: id.clone(),
                date: args.date.trim().to_string(),
                supplier_name: args.supplier.trim().to_string(),
                invoice_number: args.invoice.trim().to_string(),
                amount: args.amount,
                created_by,
                other_fields: BTreeMap::new(),
            };
            let label = entry.label();
            fixed.formal_suppliers.push(entry);
            label
        }
    };

    let total = fixed.category_total(category);
    save_month(config, &month).await?;
    let message = format!(
        "Added '{label}' to {}, category total is now {total}",
        category.label().to_lowercase()
    );
    Ok(Out::new(message, id))
}

/// Removes a line item from its category.
pub async fn remove_fixed_item(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    category: FixedCategory,
    id: &str,
) -> Result<Out<()>> {
    authorize(config, credentials, permission_for(category))?;
    let mut month = load_month(config, today).await?;
    if !month.fixed_expenses.remove(category, id) {
        bail!("{} has no item with id '{id}'", category.label());
    }
    save_month(config, &month).await?;
    Ok(format!("Removed {id} from {}", category.label().to_lowercase()).into())
}

/// Sets the month's rent or other expenses.
pub async fn set_fixed_amount(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    which: FixedAmount,
    amount: Amount,
) -> Result<Out<Amount>> {
    authorize(config, credentials, Permission::Record)?;
    let mut month = load_month(config, today).await?;
    let (field, name) = match which {
        FixedAmount::Rent => (&mut month.fixed_expenses.rent, "Rent"),
        FixedAmount::Other => (&mut month.fixed_expenses.other_expenses, "Other expenses"),
    };
    *field = amount;
    save_month(config, &month).await?;
    Ok(Out::new(format!("{name} set to {amount}"), amount))
}

/// Sets the opening float used by every day that has no override of its own. Needs an admin.
pub async fn set_default_float(
    config: &Config,
    credentials: Option<Credentials<'_>>,
    today: NaiveDate,
    amount: Amount,
) -> Result<Out<Amount>> {
    authorize(config, credentials, Permission::Administer)?;
    let mut month = load_month(config, today).await?;
    month.default_opening_float = amount;
    save_month(config, &month).await?;
    Ok(Out::new(
        format!("Days without their own float now open with {amount}"),
        amount,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_month;
    use crate::test::TestEnv;

    fn utility(name: &str, amount: i64) -> NewFixedItem {
        NewFixedItem::Utility(UtilityArgs {
            name: name.to_string(),
            amount: Amount::from(amount),
        })
    }

    fn payroll() -> NewFixedItem {
        NewFixedItem::Payroll(PayrollArgs {
            employee: "Luis".to_string(),
            first_half: Amount::from(600000),
            second_half: Amount::from(650000),
        })
    }

    #[tokio::test]
    async fn test_add_and_remove_items() {
        let env = TestEnv::new().await;
        let config = env.config();
        let today = env.today();

        let water = add_fixed_item(&config, None, today, &utility("water", 50000))
            .await
            .unwrap();
        add_fixed_item(&config, None, today, &utility("power", 120000))
            .await
            .unwrap();
        add_fixed_item(&config, None, today, &payroll()).await.unwrap();

        let month = load_month(&config, today).await.unwrap();
        assert_eq!(month.fixed_expenses.utilities[0].name, "water");
        assert_eq!(
            month.fixed_expenses.category_total(FixedCategory::Payroll),
            Amount::from(1250000)
        );

        let id = water.structure().unwrap();
        remove_fixed_item(&config, None, today, FixedCategory::Utilities, id)
            .await
            .unwrap();
        let month = load_month(&config, today).await.unwrap();
        assert_eq!(month.fixed_expenses.utilities.len(), 1);
        assert!(
            remove_fixed_item(&config, None, today, FixedCategory::Utilities, id)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_payroll_needs_admin() {
        let env = TestEnv::with_operators().await;
        let config = env.config();
        let today = env.today();
        let employee = Some(Credentials {
            name: "Ana",
            pin: "0000",
        });
        let admin = Some(Credentials {
            name: "Carlos",
            pin: "1234",
        });

        assert!(add_fixed_item(&config, employee, today, &payroll())
            .await
            .is_err());
        assert!(add_fixed_item(&config, admin, today, &payroll())
            .await
            .is_ok());

        let out = add_fixed_item(&config, employee, today, &utility("water", 1))
            .await
            .unwrap();
        assert!(out.message().contains("water"));
        let month = load_month(&config, today).await.unwrap();
        assert_eq!(
            month.fixed_expenses.utilities[0].created_by.as_deref(),
            Some("Ana")
        );

        assert!(set_default_float(&config, employee, today, Amount::from(1))
            .await
            .is_err());
        assert!(set_default_float(&config, admin, today, Amount::from(1))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_set_scalars() {
        let env = TestEnv::new().await;
        let config = env.config();
        let today = env.today();
        set_fixed_amount(&config, None, today, FixedAmount::Rent, Amount::from(900000))
            .await
            .unwrap();
        set_fixed_amount(&config, None, today, FixedAmount::Other, Amount::from(25000))
            .await
            .unwrap();
        let month = load_month(&config, today).await.unwrap();
        assert_eq!(month.fixed_expenses.rent, Amount::from(900000));
        assert_eq!(month.fixed_expenses.other_expenses, Amount::from(25000));
    }
}
