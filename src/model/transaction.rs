use crate::model::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Represents a single entry in a day's ledger.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: Amount,
    pub category: TransactionKind,
    /// The operator who entered this transaction, for audit purposes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Keys found in a stored document that this version does not know about.
    #[serde(flatten)]
    pub other_fields: BTreeMap<String, serde_json::Value>,
}

impl Transaction {
    /// Creates a transaction with a fresh unique id.
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        category: TransactionKind,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            category,
            created_by,
            other_fields: BTreeMap::new(),
        }
    }
}

/// The kind of a daily transaction. The legacy aliases are the display labels that older
/// documents stored in place of the kind.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[default]
    #[serde(alias = "Venta Efectivo")]
    CashSale,
    #[serde(alias = "Venta Nequi", alias = "Venta Transferencia")]
    TransferSale,
    #[serde(alias = "Devolución", alias = "Devolucion")]
    Return,
    #[serde(alias = "Gasto Diario")]
    Expense,
    #[serde(alias = "Compra Mercancía", alias = "Compra Diaria")]
    MerchandisePurchase,
}

serde_plain::derive_display_from_serialize!(TransactionKind);
serde_plain::derive_fromstr_from_deserialize!(TransactionKind);

impl TransactionKind {
    pub const ALL: [TransactionKind; 5] = [
        TransactionKind::CashSale,
        TransactionKind::TransferSale,
        TransactionKind::Return,
        TransactionKind::Expense,
        TransactionKind::MerchandisePurchase,
    ];

    /// A human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::CashSale => "Cash sale",
            TransactionKind::TransferSale => "Transfer sale",
            TransactionKind::Return => "Return",
            TransactionKind::Expense => "Expense",
            TransactionKind::MerchandisePurchase => "Merchandise purchase",
        }
    }
}
