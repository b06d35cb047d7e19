use crate::model::{Amount, Day, TransactionKind};
use serde::{Deserialize, Serialize};

/// The reconciliation of a single day.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub cash_sales: Amount,
    pub transfer_sales: Amount,
    pub returns: Amount,
    pub expenses: Amount,
    pub merchandise_purchases: Amount,
    /// The day's override, or the month default.
    pub opening_float: Amount,
    /// What a till count should find at the end of the day. Transfer sales never reach the drawer.
    pub physical_cash_expected: Amount,
    /// Sales less returns and expenses. Merchandise purchases convert cash into stock and are not
    /// deducted here, although they do leave the drawer.
    pub total_profit: Amount,
}

impl DailyTotals {
    pub fn gross_sales(&self) -> Amount {
        self.cash_sales + self.transfer_sales
    }

    fn add(&mut self, kind: TransactionKind, amount: Amount) {
        match kind {
            TransactionKind::CashSale => self.cash_sales += amount,
            TransactionKind::TransferSale => self.transfer_sales += amount,
            TransactionKind::Return => self.returns += amount,
            TransactionKind::Expense => self.expenses += amount,
            TransactionKind::MerchandisePurchase => self.merchandise_purchases += amount,
        }
    }

    fn derive(mut self) -> Self {
        self.physical_cash_expected = self.opening_float + self.cash_sales
            - self.returns
            - self.expenses
            - self.merchandise_purchases;
        self.total_profit = self.gross_sales() - self.returns - self.expenses;
        self
    }
}

/// Reconciles `day`. When no day was recorded every sum is zero, but the opening float still
/// resolves to `default_float` so that the expected drawer can be previewed.
///
/// Amounts are summed as stored. Negative amounts are not clamped.
///
/// # Example
///
/// ```
/// use cashbook::calc::daily_totals;
/// use cashbook::model::Amount;
///
/// let totals = daily_totals(None, Amount::from(30000));
/// assert_eq!(totals.physical_cash_expected, Amount::from(30000));
/// assert_eq!(totals.total_profit, Amount::ZERO);
/// ```
pub fn daily_totals(day: Option<&Day>, default_float: Amount) -> DailyTotals {
    let mut totals = DailyTotals {
        opening_float: day
            .map(|d| d.resolved_opening_float(default_float))
            .unwrap_or(default_float),
        ..DailyTotals::default()
    };
    for txn in day.iter().flat_map(|d| d.transactions.iter()) {
        totals.add(txn.category, txn.amount);
    }
    totals.derive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transaction;

    fn day_with(entries: &[(TransactionKind, i64)]) -> Day {
        let mut day = Day::new(1);
        day.has_data = true;
        for (kind, amount) in entries {
            day.transactions
                .push(Transaction::new("x", Amount::from(*amount), *kind, None));
        }
        day
    }

    #[test]
    fn test_reconciliation_invariant() {
        let mut day = day_with(&[
            (TransactionKind::CashSale, 60000),
            (TransactionKind::CashSale, 40000),
            (TransactionKind::TransferSale, 50000),
            (TransactionKind::Return, 10000),
            (TransactionKind::Expense, 20000),
            (TransactionKind::MerchandisePurchase, 15000),
        ]);
        day.opening_float = Some(Amount::from(30000));
        let totals = daily_totals(Some(&day), Amount::from(99999));
        assert_eq!(totals.cash_sales, Amount::from(100000));
        assert_eq!(totals.opening_float, Amount::from(30000));
        assert_eq!(totals.physical_cash_expected, Amount::from(85000));
        assert_eq!(totals.total_profit, Amount::from(120000));
    }

    #[test]
    fn test_transfers_never_reach_the_drawer() {
        let day = day_with(&[(TransactionKind::TransferSale, 70000)]);
        let totals = daily_totals(Some(&day), Amount::from(10000));
        assert_eq!(totals.physical_cash_expected, Amount::from(10000));
        assert_eq!(totals.total_profit, Amount::from(70000));
    }

    #[test]
    fn test_purchases_reduce_cash_but_not_profit() {
        let day = day_with(&[
            (TransactionKind::CashSale, 50000),
            (TransactionKind::MerchandisePurchase, 30000),
        ]);
        let totals = daily_totals(Some(&day), Amount::ZERO);
        assert_eq!(totals.physical_cash_expected, Amount::from(20000));
        assert_eq!(totals.total_profit, Amount::from(50000));
    }

    #[test]
    fn test_no_day_uses_default_float() {
        let totals = daily_totals(None, Amount::from(25000));
        assert_eq!(totals.opening_float, Amount::from(25000));
        assert_eq!(totals.physical_cash_expected, Amount::from(25000));
        assert_eq!(totals.cash_sales, Amount::ZERO);
        assert_eq!(totals.total_profit, Amount::ZERO);
    }

    #[test]
    fn test_override_of_zero_is_not_the_default() {
        let mut day = Day::new(2);
        day.opening_float = Some(Amount::ZERO);
        let totals = daily_totals(Some(&day), Amount::from(25000));
        assert_eq!(totals.physical_cash_expected, Amount::ZERO);
    }

    #[test]
    fn test_negative_amounts_are_summed_as_is() {
        let day = day_with(&[
            (TransactionKind::CashSale, 10000),
            (TransactionKind::CashSale, -4000),
        ]);
        let totals = daily_totals(Some(&day), Amount::ZERO);
        assert_eq!(totals.cash_sales, Amount::from(6000));
    }
}
