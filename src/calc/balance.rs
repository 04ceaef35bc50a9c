use rust_decimal::Decimal;
use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::error::{ensure_non_negative, CalcError};
use crate::model::{AssetTransaction, HoldingHistoryEntry, MonthRange, TransactionKind, YearMonth};

/// Purchases and sales totals over a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransactionBalance {
    pub purchases: Decimal,
    pub sales: Decimal,
    pub purchase_count: usize,
    pub sale_count: usize,
}

impl TransactionBalance {
    /// Aggregate every transaction given
    pub fn from_transactions<'a, I>(transactions: I) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = &'a AssetTransaction>,
    {
        let mut balance = Self::default();
        for tx in transactions {
            balance.record(tx)?;
        }
        Ok(balance)
    }

    /// Aggregate the transactions dated inside `month`
    pub fn for_month<'a, I>(transactions: I, month: YearMonth) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = &'a AssetTransaction>,
    {
        Self::from_transactions(transactions.into_iter().filter(|tx| month.contains(tx.date)))
    }

    /// Aggregate the transactions dated inside `range`
    pub fn for_range<'a, I>(transactions: I, range: &MonthRange) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = &'a AssetTransaction>,
    {
        Self::from_transactions(transactions.into_iter().filter(|tx| range.contains(tx.date)))
    }

    /// Transactions of `current`'s holding that moved money since the `previous` snapshot.
    ///
    /// Covers the months after `previous` up to the end of `current`'s month, or
    /// everything up to `current` when there is no previous snapshot.
    pub fn between_snapshots<'a, I>(
        previous: Option<&HoldingHistoryEntry>,
        current: &HoldingHistoryEntry,
        transactions: I,
    ) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = &'a AssetTransaction>,
    {
        let after = previous.map(|entry| entry.reference.last_day());
        let until = current.reference.last_day();

        Self::from_transactions(transactions.into_iter().filter(|tx| {
            tx.holding_id == current.holding_id
                && tx.date <= until
                && after.map_or(true, |after| tx.date > after)
        }))
    }

    fn record(&mut self, tx: &AssetTransaction) -> Result<(), CalcError> {
        ensure_non_negative("transaction quantity", tx.quantity)?;
        ensure_non_negative("transaction unit price", tx.unit_price)?;
        ensure_non_negative("transaction fees", tx.fees)?;

        match tx.kind {
            TransactionKind::Purchase => {
                self.purchases += tx.total_value();
                self.purchase_count += 1;
            }
            TransactionKind::Sale => {
                // Fees larger than the proceeds leave nothing to withdraw
                self.sales += tx.total_value().max(Decimal::ZERO);
                self.sale_count += 1;
            }
        }
        Ok(())
    }

    /// Money put in minus money taken out
    pub fn net(&self) -> Decimal {
        self.purchases - self.sales
    }

    pub fn count(&self) -> usize {
        self.purchase_count + self.sale_count
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl Add for TransactionBalance {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for TransactionBalance {
    fn add_assign(&mut self, rhs: Self) {
        self.purchases += rhs.purchases;
        self.sales += rhs.sales;
        self.purchase_count += rhs.purchase_count;
        self.sale_count += rhs.sale_count;
    }
}

impl Sum for TransactionBalance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
