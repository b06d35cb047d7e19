//! Drives a legacy month document through migration, aggregation, reporting and archiving using
//! only the public API.

use cashbook::calc::{monthly_totals, SupplierSpend};
use cashbook::model::{Amount, TransactionKind};
use cashbook::report::{build_report, CsvRenderer, SUMMARY_TABLE};
use cashbook::store::{open_archived_month, open_month, MemoryStore, Store};
use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

const ACCOUNT: &str = "main";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn legacy_document() -> String {
    json!({
        "currentMonth": 8,
        "currentYear": 2025,
        "defaultInitialCash": 30000,
        "days": {
            "3": {
                "day": 3,
                "hasData": true,
                "transactions": [
                    {"id": "t1", "description": "rin 14", "amount": 45000,
                     "type": "Venta Efectivo"},
                    {"id": "t2", "description": "almuerzo", "amount": "12000",
                     "type": "Gasto Diario", "createdBy": "Ana"}
                ]
            }
        },
        "fixedExpenses": {
            "utilities": 150000,
            "payroll": 2400000,
            "bankLoans": 300000,
            "suppliers": 800000,
            "rent": 900000,
            "others": 25000
        }
    })
    .to_string()
}

#[tokio::test]
async fn legacy_month_is_migrated_aggregated_and_exported() {
    let store = MemoryStore::with_document(ACCOUNT, legacy_document());
    let month = open_month(&store, ACCOUNT, today()).await.unwrap();
    assert_eq!(month.period_label(), "SEPTEMBER 2025");
    assert_eq!(
        month.day(3).unwrap().transactions[1].category,
        TransactionKind::Expense
    );

    let investment = monthly_totals(&month, SupplierSpend::Investment);
    assert_eq!(investment.total_fixed_expenses, Amount::from(4575000));
    assert_eq!(investment.total_supplier_spend, Amount::from(800000));
    assert_eq!(investment.net_profit, Amount::from(-3742000));
    let expense = monthly_totals(&month, SupplierSpend::Expense);
    assert_eq!(expense.net_profit, Amount::from(-4542000));

    // Saving writes the current shape, which migrates to the same month.
    store.save(ACCOUNT, &month).await.unwrap();
    let reopened = open_month(&store, ACCOUNT, today()).await.unwrap();
    assert_eq!(reopened, month);

    let report = build_report(&month, "Districauchos", SupplierSpend::Investment);
    assert_eq!(report.tables.len(), 31);
    assert!(report.table(SUMMARY_TABLE).is_some());

    let out = TempDir::new().unwrap();
    let dir = CsvRenderer::new(out.path()).render(&report).await.unwrap();
    assert!(dir.ends_with("Accounting_Districauchos_September_2025"));
    assert!(dir.join("03-day-03.csv").is_file());
    assert!(dir.join("31-summary.csv").is_file());
}

#[tokio::test]
async fn closed_month_stays_readable() {
    let store = MemoryStore::with_document(ACCOUNT, legacy_document());
    let month = open_month(&store, ACCOUNT, today()).await.unwrap();

    store.archive(ACCOUNT, &month).await.unwrap();
    store
        .save(ACCOUNT, &month.closed(today(), true))
        .await
        .unwrap();

    let current = open_month(&store, ACCOUNT, today()).await.unwrap();
    assert_eq!(current.period_label(), "OCTOBER 2026");
    assert!(current.days.is_empty());
    assert_eq!(current.fixed_expenses, month.fixed_expenses);

    let archived = open_archived_month(&store, ACCOUNT, 8, 2025, today())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(archived, month);
    assert!(open_archived_month(&store, ACCOUNT, 7, 2025, today())
        .await
        .unwrap()
        .is_none());
}
