//! Normalizes a persisted month document from any earlier schema revision into the current
//! `Month` shape.
//!
//! Migration is total: every input, from a missing document to garbage, produces a valid `Month`.
//! Each rule below is independent and idempotent, so `migrate(serialize(migrate(x)))` equals
//! `migrate(x)`.
//!
//! - List categories stored as a single number become a one-item list (zero becomes empty).
//! - Category fields that are absent, `null` or of the wrong type become empty lists.
//! - Scalars fall back to zero, and the period falls back to the one containing `today`.
//! - Legacy key names are read as aliases of the current ones.
//! - Keys that this version does not recognize are kept on the items that carried them.

use crate::model::{
    is_valid_day_number, Amount, DatedExpense, Day, FixedCategory, FixedExpenses,
    FormalSupplierInvoice, Month, PayrollEntry, Transaction, TransactionKind, UtilityItem,
};
use crate::Result;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Name given to the single item created from a legacy scalar category total.
pub const MIGRATED_PLACEHOLDER: &str = "General (migrated)";

type Object = Map<String, Value>;

/// Parses `raw` as JSON and migrates it. Malformed JSON is treated as "no prior document".
pub fn migrate_str(raw: &str, today: NaiveDate) -> Month {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => migrate(Some(&value), today),
        Err(e) => {
            warn!("Stored month document is not valid JSON, starting a fresh month: {e}");
            Month::new(today)
        }
    }
}

/// Produces a current-shape `Month` from a loosely-typed document. `None` and non-object
/// documents yield a fresh month for the period containing `today`.
pub fn migrate(raw: Option<&Value>, today: NaiveDate) -> Month {
    let doc = match raw {
        Some(Value::Object(doc)) => doc,
        Some(Value::Null) | None => {
            debug!("No stored month document, starting a fresh month");
            return Month::new(today);
        }
        Some(_) => {
            warn!("Stored month document is not an object, starting a fresh month");
            return Month::new(today);
        }
    };

    let month_index = first(doc, &["monthIndex", "currentMonth"])
        .and_then(as_i64)
        .and_then(|m| u32::try_from(m).ok())
        .filter(|m| *m < 12)
        .unwrap_or_else(|| today.month0());
    let year = first(doc, &["year", "currentYear"])
        .and_then(as_i64)
        .and_then(|y| i32::try_from(y).ok())
        .filter(|y| is_calendar_year(*y))
        .unwrap_or_else(|| today.year());
    let default_opening_float = first(doc, &["defaultOpeningFloat", "defaultInitialCash"])
        .map(Amount::coerce)
        .unwrap_or_default();

    Month {
        month_index,
        year,
        days: migrate_days(doc.get("days")),
        fixed_expenses: migrate_fixed(doc.get("fixedExpenses")),
        default_opening_float,
    }
}

/// Converts `month` into the document form that the persistence store keeps.
pub fn serialize(month: &Month) -> Result<Value> {
    serde_json::to_value(month).context("Failed to serialize the month document")
}

fn migrate_days(value: Option<&Value>) -> BTreeMap<u8, Day> {
    let mut days = BTreeMap::new();
    let entries: Vec<(Option<u8>, &Object)> = match value {
        None | Some(Value::Null) => return days,
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, v)| match v.as_object() {
                Some(obj) => Some((key.trim().parse::<u8>().ok(), obj)),
                None => {
                    warn!("Dropping day '{key}' because it is not an object");
                    None
                }
            })
            .collect(),
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                let n = first(obj, &["dayNumber", "day"])
                    .and_then(as_i64)
                    .and_then(|n| u8::try_from(n).ok());
                (n, obj)
            })
            .collect(),
        Some(_) => {
            warn!("Ignoring 'days' because it is neither a map nor a list");
            return days;
        }
    };

    for (number, obj) in entries {
        let Some(number) = number.filter(|n| is_valid_day_number(*n)) else {
            warn!("Dropping a stored day with an invalid day number");
            continue;
        };
        let day = migrate_day(number, obj);
        if day.is_blank() {
            trace!("Dropping blank day {number}");
            continue;
        }
        days.insert(number, day);
    }
    days
}

fn migrate_day(number: u8, obj: &Object) -> Day {
    let transactions: Vec<Transaction> = match obj.get("transactions") {
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(Value::as_object)
            .enumerate()
            .map(|(ix, t)| migrate_transaction(t, number, ix))
            .collect(),
        _ => Vec::new(),
    };
    let opening_float = first(obj, &["openingFloat", "initialCash"]).map(Amount::coerce);
    let has_data = obj
        .get("hasData")
        .and_then(Value::as_bool)
        .unwrap_or(!transactions.is_empty());
    Day {
        day_number: number,
        transactions,
        opening_float,
        has_data,
    }
}

fn migrate_transaction(obj: &Object, day: u8, ix: usize) -> Transaction {
    let mut other_fields = extras(
        obj,
        &["id", "description", "amount", "category", "type", "createdBy"],
    );
    let raw_kind = text(first(obj, &["category", "type"]));
    let category = match TransactionKind::from_str(&raw_kind) {
        Ok(kind) => kind,
        Err(_) => {
            warn!("Unknown transaction category '{raw_kind}' on day {day}, using cash sale");
            if !raw_kind.is_empty() {
                other_fields.insert("legacyCategory".to_string(), Value::String(raw_kind));
            }
            TransactionKind::CashSale
        }
    };
    Transaction {
        id: id_or(obj, || format!("migrated-day{day}-{ix}")),
        description: text(obj.get("description")),
        amount: obj.get("amount").map(Amount::coerce).unwrap_or_default(),
        category,
        created_by: created_by(obj),
        other_fields,
    }
}

/// A category as found in a stored document.
enum Source<'a> {
    List(&'a [Value]),
    Scalar(Amount),
}

/// Looks up `key` in `fixed`. Absent, `null` and non-list non-numeric values yield `None`.
fn source<'a>(fixed: &'a Object, key: &str) -> Option<Source<'a>> {
    match fixed.get(key)? {
        Value::Array(list) => Some(Source::List(list)),
        v @ (Value::Number(_) | Value::String(_)) => Some(Source::Scalar(Amount::coerce(v))),
        Value::Null => None,
        _ => {
            warn!("Ignoring fixed expense field '{key}' because it is not a list");
            None
        }
    }
}

fn migrate_fixed(value: Option<&Value>) -> FixedExpenses {
    let empty = Object::new();
    let fixed = match value {
        Some(Value::Object(map)) => map,
        _ => &empty,
    };

    let payroll = collect(
        source(fixed, "payroll"),
        FixedCategory::Payroll,
        payroll_entry,
        |id, amount| PayrollEntry {
            id,
            employee_name: MIGRATED_PLACEHOLDER.to_string(),
            first_half_pay: amount,
            second_half_pay: Amount::ZERO,
            other_fields: BTreeMap::new(),
        },
    );
    let utilities = collect(
        source(fixed, "utilities"),
        FixedCategory::Utilities,
        utility_item,
        |id, amount| UtilityItem {
            id,
            name: MIGRATED_PLACEHOLDER.to_string(),
            amount,
            created_by: None,
            other_fields: BTreeMap::new(),
        },
    );
    let bank_transactions = collect(
        source(fixed, "bankTransactions").or_else(|| source(fixed, "bankLoans")),
        FixedCategory::BankTransactions,
        dated_expense,
        dated_placeholder,
    );

    let occasional = source(fixed, "occasionalSuppliers")
        .or_else(|| source(fixed, "providersOccasional"));
    let formal = source(fixed, "formalSuppliers").or_else(|| source(fixed, "providersFormal"));
    let (occasional_suppliers, formal_suppliers) = match (occasional, formal) {
        (None, None) => split_legacy_suppliers(source(fixed, "suppliers")),
        (occasional, formal) => (
            collect(
                occasional,
                FixedCategory::OccasionalSuppliers,
                dated_expense,
                dated_placeholder,
            ),
            collect(
                formal,
                FixedCategory::FormalSuppliers,
                formal_invoice,
                |id, amount| FormalSupplierInvoice {
                    id,
                    supplier_name: MIGRATED_PLACEHOLDER.to_string(),
                    amount,
                    ..FormalSupplierInvoice::default()
                },
            ),
        ),
    };

    FixedExpenses {
        utilities,
        payroll,
        bank_transactions,
        occasional_suppliers,
        formal_suppliers,
        rent: first(fixed, &["rent"]).map(Amount::coerce).unwrap_or_default(),
        other_expenses: first(fixed, &["otherExpenses", "others"])
            .map(Amount::coerce)
            .unwrap_or_default(),
    }
}

/// Builds the items of one category. A list is parsed item by item, a non-zero scalar becomes a
/// single placeholder item, and everything else becomes an empty list.
fn collect<T>(
    source: Option<Source<'_>>,
    category: FixedCategory,
    parse: fn(&Object, String) -> T,
    placeholder: fn(String, Amount) -> T,
) -> Vec<T> {
    match source {
        Some(Source::List(list)) => list
            .iter()
            .enumerate()
            .filter_map(|(ix, v)| match v.as_object() {
                Some(obj) => Some(parse(obj, id_or(obj, || migrated_id(category, ix)))),
                None => {
                    warn!("Dropping a {category} entry that is not an object");
                    None
                }
            })
            .collect(),
        Some(Source::Scalar(amount)) if !amount.is_zero() => {
            debug!("Migrating scalar {category} total {amount} into a single item");
            vec![placeholder(migrated_id(category, 0), amount)]
        }
        _ => Vec::new(),
    }
}

/// The oldest documents had a single `suppliers` field, first as a number and later as a list.
/// List entries that look like invoices become formal supplier invoices, the rest become
/// occasional purchases.
fn split_legacy_suppliers(
    source: Option<Source<'_>>,
) -> (Vec<DatedExpense>, Vec<FormalSupplierInvoice>) {
    let mut occasional = Vec::new();
    let mut formal = Vec::new();
    match source {
        Some(Source::List(list)) => {
            for (ix, obj) in list.iter().filter_map(Value::as_object).enumerate() {
                if obj.contains_key("invoiceNumber") || obj.contains_key("company") {
                    let id = id_or(obj, || migrated_id(FixedCategory::FormalSuppliers, ix));
                    formal.push(formal_invoice(obj, id));
                } else {
                    let id = id_or(obj, || migrated_id(FixedCategory::OccasionalSuppliers, ix));
                    occasional.push(dated_expense(obj, id));
                }
            }
        }
        Some(Source::Scalar(amount)) if !amount.is_zero() => {
            occasional.push(dated_placeholder(
                migrated_id(FixedCategory::OccasionalSuppliers, 0),
                amount,
            ));
        }
        _ => {}
    }
    (occasional, formal)
}

fn payroll_entry(obj: &Object, id: String) -> PayrollEntry {
    PayrollEntry {
        id,
        employee_name: text(first(obj, &["employeeName", "name"])),
        first_half_pay: first(obj, &["firstHalfPay", "paymentQ1"])
            .map(Amount::coerce)
            .unwrap_or_default(),
        second_half_pay: first(obj, &["secondHalfPay", "paymentQ2"])
            .map(Amount::coerce)
            .unwrap_or_default(),
        other_fields: extras(
            obj,
            &[
                "id",
                "employeeName",
                "name",
                "firstHalfPay",
                "paymentQ1",
                "secondHalfPay",
                "paymentQ2",
            ],
        ),
    }
}

fn utility_item(obj: &Object, id: String) -> UtilityItem {
    UtilityItem {
        id,
        name: text(first(obj, &["name", "description"])),
        amount: obj.get("amount").map(Amount::coerce).unwrap_or_default(),
        created_by: created_by(obj),
        other_fields: extras(obj, &["id", "name", "description", "amount", "createdBy"]),
    }
}

fn dated_expense(obj: &Object, id: String) -> DatedExpense {
    DatedExpense {
        id,
        date: text(obj.get("date")),
        description: text(obj.get("description")),
        amount: obj.get("amount").map(Amount::coerce).unwrap_or_default(),
        created_by: created_by(obj),
        other_fields: extras(obj, &["id", "date", "description", "amount", "createdBy"]),
    }
}

fn dated_placeholder(id: String, amount: Amount) -> DatedExpense {
    DatedExpense {
        id,
        description: MIGRATED_PLACEHOLDER.to_string(),
        amount,
        ..DatedExpense::default()
    }
}

fn formal_invoice(obj: &Object, id: String) -> FormalSupplierInvoice {
    FormalSupplierInvoice {
        id,
        date: text(obj.get("date")),
        supplier_name: text(first(obj, &["supplierName", "company", "description"])),
        invoice_number: text(obj.get("invoiceNumber")),
        amount: obj.get("amount").map(Amount::coerce).unwrap_or_default(),
        created_by: created_by(obj),
        other_fields: extras(
            obj,
            &[
                "id",
                "date",
                "supplierName",
                "company",
                "description",
                "invoiceNumber",
                "amount",
                "createdBy",
            ],
        ),
    }
}

fn migrated_id(category: FixedCategory, ix: usize) -> String {
    format!("migrated-{category}-{ix}")
}

/// The value of the first of `keys` that is present and not `null`.
fn first<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Whether every day of `year`, and the first day of the next one, is a valid date.
fn is_calendar_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 1, 1).is_some()
        && year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
            .is_some()
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn id_or(obj: &Object, generate: impl FnOnce() -> String) -> String {
    let id = text(obj.get("id"));
    if id.is_empty() {
        generate()
    } else {
        id
    }
}

fn created_by(obj: &Object) -> Option<String> {
    obj.get("createdBy")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extras(obj: &Object, known: &[&str]) -> BTreeMap<String, Value> {
    obj.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn assert_lists_present(month: &Month) {
        // Typed lists cannot be null; check that they survive a round trip as JSON arrays.
        let doc = serialize(month).unwrap();
        for key in [
            "utilities",
            "payroll",
            "bankTransactions",
            "occasionalSuppliers",
            "formalSuppliers",
        ] {
            assert!(
                doc["fixedExpenses"][key].is_array(),
                "{key} should serialize as an array"
            );
        }
    }

    fn assert_idempotent(doc: &Value) {
        let once = migrate(Some(doc), today());
        let twice = migrate(Some(&serialize(&once).unwrap()), today());
        assert_eq!(once, twice);
    }

    fn legacy_shapes() -> Vec<Value> {
        vec![
            json!({}),
            json!({
                "currentMonth": 8,
                "currentYear": 2025,
                "defaultInitialCash": 30000,
                "days": {
                    "3": {
                        "day": 3,
                        "hasData": true,
                        "initialCash": 50000,
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
            }),
            json!({
                "currentMonth": 9,
                "currentYear": 2025,
                "days": {"1": {"day": 1, "transactions": []}},
                "fixedExpenses": {
                    "utilities": [{"id": "u1", "name": "Energía", "amount": 98000,
                                   "createdBy": "Carlos"}],
                    "payroll": [{"id": "e1", "name": "Luis", "paymentQ1": 600000,
                                 "paymentQ2": 650000}],
                    "bankTransactions": [{"id": "b1", "date": "2025-10-05",
                                          "description": "cuota", "amount": 250000}],
                    "providersOccasional": [{"id": "o1", "date": "2025-10-02",
                                             "description": "tornillos", "amount": 40000}],
                    "providersFormal": [{"id": "f1", "date": "2025-10-07",
                                         "company": "Llantas SA", "invoiceNumber": "F-118",
                                         "amount": 1200000, "createdBy": "Carlos"}],
                    "rent": 900000,
                    "others": 0,
                    "bankLoans": 0,
                    "suppliers": 0
                }
            }),
            json!({
                "fixedExpenses": {
                    "bankLoans": [{"date": "2025-06-01", "description": "cuota", "amount": 1}],
                    "suppliers": [
                        {"date": "2025-06-02", "description": "varios", "amount": 2},
                        {"date": "2025-06-03", "company": "Empaques", "invoiceNumber": "77",
                         "amount": 3}
                    ]
                }
            }),
            json!({
                "defaultOpeningFloat": "0.1234567890123456789",
                "days": {"2": {"transactions": [
                    {"id": "p1", "description": "precise", "amount": "1234.123456789012345678",
                     "category": "cash_sale"}
                ]}},
                "fixedExpenses": {"rent": "987654.000000000000000001"}
            }),
        ]
    }

    #[test]
    fn test_missing_document_gives_fresh_month() {
        let month = migrate(None, today());
        assert_eq!(month, Month::new(today()));
        assert_lists_present(&month);
    }

    #[test]
    fn test_non_object_documents_give_fresh_month() {
        for doc in [json!(null), json!(42), json!("hello"), json!([1, 2, 3])] {
            assert_eq!(migrate(Some(&doc), today()), Month::new(today()));
        }
    }

    #[test]
    fn test_malformed_json_gives_fresh_month() {
        assert_eq!(migrate_str("{not json", today()), Month::new(today()));
        assert_eq!(migrate_str("", today()), Month::new(today()));
    }

    #[test]
    fn test_empty_object_defaults() {
        let month = migrate(Some(&json!({})), today());
        assert_eq!(month.month_index, 9);
        assert_eq!(month.year, 2026);
        assert_eq!(month.default_opening_float, Amount::ZERO);
        assert!(month.days.is_empty());
        assert_lists_present(&month);
    }

    #[test]
    fn test_every_shape_is_total_and_idempotent() {
        for doc in legacy_shapes() {
            let month = migrate(Some(&doc), today());
            assert_lists_present(&month);
            assert_idempotent(&doc);
        }
    }

    #[test]
    fn test_high_precision_amounts_survive() {
        let month = migrate(Some(&legacy_shapes()[4]), today());
        assert_eq!(
            month.default_opening_float,
            Amount::from_str("0.1234567890123456789").unwrap()
        );
        assert_eq!(
            month.day(2).unwrap().transactions[0].amount,
            Amount::from_str("1234.123456789012345678").unwrap()
        );
        let text = serialize(&month).unwrap().to_string();
        assert_eq!(migrate_str(&text, today()), month);
    }

    #[test]
    fn test_out_of_range_year_falls_back_to_today() {
        for year in [json!(2147483647), json!(-2147483648), json!(400000)] {
            let month = migrate(Some(&json!({"monthIndex": 11, "year": year})), today());
            assert_eq!(month.year, 2026);
            assert_eq!(month.days_in_month(), 31);
        }
        let month = migrate(Some(&json!({"monthIndex": 11, "year": 1999})), today());
        assert_eq!(month.year, 1999);
    }

    #[test]
    fn test_scalar_categories_become_single_items() {
        let month = migrate(Some(&legacy_shapes()[1]), today());
        let fixed = &month.fixed_expenses;
        assert_eq!(fixed.payroll.len(), 1);
        assert_eq!(fixed.payroll[0].employee_name, MIGRATED_PLACEHOLDER);
        assert_eq!(fixed.payroll[0].first_half_pay, Amount::from(2400000));
        assert_eq!(fixed.utilities[0].amount, Amount::from(150000));
        assert_eq!(fixed.bank_transactions[0].amount, Amount::from(300000));
        assert_eq!(fixed.occasional_suppliers[0].amount, Amount::from(800000));
        assert!(fixed.formal_suppliers.is_empty());
        assert_eq!(fixed.rent, Amount::from(900000));
        assert_eq!(fixed.other_expenses, Amount::from(25000));
        assert_eq!(fixed.payroll[0].id, "migrated-payroll-0");
    }

    #[test]
    fn test_zero_scalars_become_empty_lists() {
        let doc = json!({"fixedExpenses": {"payroll": 0, "utilities": "0", "bankLoans": 0}});
        let month = migrate(Some(&doc), today());
        assert!(month.fixed_expenses.payroll.is_empty());
        assert!(month.fixed_expenses.utilities.is_empty());
        assert!(month.fixed_expenses.bank_transactions.is_empty());
    }

    #[test]
    fn test_wrong_types_become_empty_lists() {
        let doc = json!({"fixedExpenses": {
            "payroll": null,
            "utilities": {"oops": true},
            "bankTransactions": true,
            "occasionalSuppliers": "n/a",
            "formalSuppliers": [1, "x", {"supplierName": "ok", "amount": 5}]
        }});
        let month = migrate(Some(&doc), today());
        let fixed = &month.fixed_expenses;
        assert!(fixed.payroll.is_empty());
        assert!(fixed.utilities.is_empty());
        assert!(fixed.bank_transactions.is_empty());
        assert!(fixed.occasional_suppliers.is_empty());
        assert_eq!(fixed.formal_suppliers.len(), 1);
        assert_eq!(fixed.formal_suppliers[0].id, "migrated-formal_suppliers-2");
    }

    #[test]
    fn test_legacy_lists_and_names() {
        let month = migrate(Some(&legacy_shapes()[2]), today());
        assert_eq!(month.month_index, 9);
        assert_eq!(month.year, 2025);
        let fixed = &month.fixed_expenses;
        assert_eq!(fixed.payroll[0].employee_name, "Luis");
        assert_eq!(fixed.payroll[0].second_half_pay, Amount::from(650000));
        assert_eq!(fixed.occasional_suppliers[0].description, "tornillos");
        assert_eq!(fixed.formal_suppliers[0].supplier_name, "Llantas SA");
        assert_eq!(fixed.formal_suppliers[0].invoice_number, "F-118");
        assert_eq!(
            fixed.formal_suppliers[0].created_by.as_deref(),
            Some("Carlos")
        );
        assert_eq!(fixed.utilities[0].created_by.as_deref(), Some("Carlos"));
    }

    #[test]
    fn test_legacy_supplier_list_is_split() {
        let month = migrate(Some(&legacy_shapes()[3]), today());
        let fixed = &month.fixed_expenses;
        assert_eq!(fixed.bank_transactions.len(), 1);
        assert_eq!(fixed.occasional_suppliers.len(), 1);
        assert_eq!(fixed.formal_suppliers.len(), 1);
        assert_eq!(fixed.formal_suppliers[0].supplier_name, "Empaques");
    }

    #[test]
    fn test_legacy_days() {
        let month = migrate(Some(&legacy_shapes()[1]), today());
        assert_eq!(month.default_opening_float, Amount::from(30000));
        let day = month.day(3).unwrap();
        assert_eq!(day.opening_float, Some(Amount::from(50000)));
        assert_eq!(day.transactions[0].category, TransactionKind::CashSale);
        assert_eq!(day.transactions[1].category, TransactionKind::Expense);
        assert_eq!(day.transactions[1].amount, Amount::from(12000));
        assert_eq!(day.transactions[1].created_by.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_blank_and_invalid_days_are_dropped() {
        let doc = json!({"days": {
            "1": {"day": 1, "transactions": [], "hasData": false},
            "0": {"hasData": true},
            "45": {"hasData": true},
            "abc": {"hasData": true},
            "7": "not a day",
            "9": {"hasData": true}
        }});
        let month = migrate(Some(&doc), today());
        assert_eq!(month.days.keys().copied().collect::<Vec<u8>>(), vec![9]);
        assert!(month.day(9).unwrap().transactions.is_empty());
    }

    #[test]
    fn test_day_without_transactions_list() {
        let doc = json!({"days": {"12": {"dayNumber": 12, "hasData": true,
                                        "transactions": "corrupt"}}});
        let month = migrate(Some(&doc), today());
        assert!(month.day(12).unwrap().transactions.is_empty());
    }

    #[test]
    fn test_days_as_list() {
        let doc = json!({"days": [
            {"dayNumber": 2, "transactions": [{"id": "x", "description": "a", "amount": 1,
                                               "category": "transfer_sale"}]}
        ]});
        let month = migrate(Some(&doc), today());
        let day = month.day(2).unwrap();
        assert!(day.has_data);
        assert_eq!(day.transactions[0].category, TransactionKind::TransferSale);
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let doc = json!({"days": {"4": {"transactions": [
            {"id": "t", "description": "d", "amount": 1, "category": "expense",
             "createdBy": "Ana", "photo": "p1.jpg"}
        ]}}, "fixedExpenses": {"payroll": [
            {"id": "e", "employeeName": "Sara", "firstHalfPay": 1, "secondHalfPay": 2,
             "bonusNote": "december"}
        ]}});
        let month = migrate(Some(&doc), today());
        let txn = &month.day(4).unwrap().transactions[0];
        assert_eq!(txn.other_fields["photo"], "p1.jpg");
        assert_eq!(month.fixed_expenses.payroll[0].other_fields["bonusNote"], "december");
        let back = serialize(&month).unwrap();
        assert_eq!(back["days"]["4"]["transactions"][0]["photo"], "p1.jpg");
        assert_eq!(back["days"]["4"]["transactions"][0]["createdBy"], "Ana");
    }

    #[test]
    fn test_unknown_category_is_kept_for_audit() {
        let doc = json!({"days": {"4": {"transactions": [
            {"id": "t", "description": "d", "amount": 1, "type": "Fiado"}
        ]}}});
        let month = migrate(Some(&doc), today());
        let txn = &month.day(4).unwrap().transactions[0];
        assert_eq!(txn.category, TransactionKind::CashSale);
        assert_eq!(txn.other_fields["legacyCategory"], "Fiado");
        assert_idempotent(&doc);
    }

    #[test]
    fn test_missing_ids_are_deterministic() {
        let doc = json!({"days": {"4": {"transactions": [
            {"description": "d", "amount": 1, "category": "expense"}
        ]}}});
        let a = migrate(Some(&doc), today());
        let b = migrate(Some(&doc), today());
        assert_eq!(a, b);
        assert_eq!(a.day(4).unwrap().transactions[0].id, "migrated-day4-0");
    }

    #[test]
    fn test_current_shape_round_trips() {
        let mut month = Month::for_period(9, 2026);
        month.default_opening_float = Amount::from(30000);
        month.add_transaction(
            5,
            Transaction::new("sale", Amount::from(50000), TransactionKind::CashSale, None),
        );
        month.fixed_expenses.rent = Amount::from(500000);
        let doc = serialize(&month).unwrap();
        assert_eq!(migrate(Some(&doc), today()), month);
    }
}
