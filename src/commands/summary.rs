use crate::args::PeriodArgs;
use crate::calc::{monthly_totals, MonthlyTotals, SupplierSpend};
use crate::commands::{load_period, Out};
use crate::model::{FixedCategory, Month};
use crate::{Config, Result};
use chrono::NaiveDate;
use std::fmt::Write;

/// Aggregates the current month, or a closed one, and reports its totals and profit.
pub async fn summary(
    config: &Config,
    today: NaiveDate,
    args: &PeriodArgs,
) -> Result<Out<MonthlyTotals>> {
    let month = load_period(config, args.archived(), today).await?;
    let totals = monthly_totals(&month, config.supplier_spend());
    Ok(Out::new(render(&month, &totals), totals))
}

fn render(month: &Month, t: &MonthlyTotals) -> String {
    let mut s = format!(
        "{} ({} of {} days recorded)\n",
        month.period_label(),
        month.recorded_day_count(),
        month.days_in_month()
    );
    let mut line = |label: &str, value: String| {
        let _ = writeln!(s, "  {label:<28}{value:>16}");
    };

    line("Cash sales", t.cash_sales.to_string());
    line("Transfer sales", t.transfer_sales.to_string());
    line("Returns", t.returns.to_string());
    line("Expenses", t.expenses.to_string());
    line("Merchandise purchases", t.merchandise_purchases.to_string());
    for category in FixedCategory::ALL {
        line(category.label(), t.category_total(category).to_string());
    }
    line("Rent", t.rent.to_string());
    line("Other expenses", t.other_expenses.to_string());
    line("Total fixed expenses", t.total_fixed_expenses.to_string());
    line("Gross sales", t.gross_sales.to_string());
    line("Cash profit", t.cash_profit.to_string());
    line("Net profit", t.net_profit.to_string());
    line("Investment outflow", t.investment_outflow.to_string());
    line("Net cash flow", t.net_cash_flow.to_string());

    let _ = match t.supplier_spend {
        SupplierSpend::Investment => write!(
            s,
            "Supplier spend of {} is counted as investment, not deducted from net profit",
            t.total_supplier_spend
        ),
        SupplierSpend::Expense => write!(
            s,
            "Supplier spend of {} is deducted from net profit",
            t.total_supplier_spend
        ),
    };
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{AddTransactionArgs, CloseArgs};
    use crate::commands::{add_transaction, close};
    use crate::model::{Amount, TransactionKind};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_summary_of_current_month() {
        let env = TestEnv::new().await;
        let config = env.config();
        let today = env.today();
        for (day, kind, amount) in [
            (1, TransactionKind::CashSale, 100000),
            (2, TransactionKind::TransferSale, 40000),
            (2, TransactionKind::Expense, 15000),
        ] {
            let args = AddTransactionArgs {
                day,
                kind,
                amount: Amount::from(amount),
                description: String::new(),
            };
            add_transaction(&config, None, today, &args).await.unwrap();
        }

        let out = summary(&config, today, &PeriodArgs::default()).await.unwrap();
        let totals = out.structure().unwrap();
        assert_eq!(totals.gross_sales, Amount::from(140000));
        assert_eq!(totals.net_profit, Amount::from(125000));
        assert!(out.message().starts_with("OCTOBER 2026 (2 of 31 days recorded)"));
        assert!(out.message().contains("counted as investment"));
        assert_eq!(totals.net_cash_flow, Amount::from(125000));
        let cash_flow = out
            .message()
            .lines()
            .find(|l| l.trim_start().starts_with("Net cash flow"))
            .unwrap();
        assert!(cash_flow.ends_with("125,000.00"));
    }

    #[tokio::test]
    async fn test_summary_of_closed_month() {
        let env = TestEnv::new().await;
        let config = env.config();
        let today = env.today();
        let args = AddTransactionArgs {
            day: 3,
            kind: TransactionKind::CashSale,
            amount: Amount::from(70000),
            description: String::new(),
        };
        add_transaction(&config, None, today, &args).await.unwrap();
        close(&config, None, today, &CloseArgs::default())
            .await
            .unwrap();

        let current = summary(&config, today, &PeriodArgs::default()).await.unwrap();
        assert_eq!(current.structure().unwrap().cash_sales, Amount::ZERO);

        let period = PeriodArgs {
            month: Some(10),
            year: Some(2026),
        };
        let closed = summary(&config, today, &period).await.unwrap();
        assert_eq!(closed.structure().unwrap().cash_sales, Amount::from(70000));

        let missing = PeriodArgs {
            month: Some(3),
            year: Some(2019),
        };
        assert!(summary(&config, today, &missing).await.is_err());
    }
}
