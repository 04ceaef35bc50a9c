use rust_decimal::Decimal;
use serde::Serialize;

use super::balance::TransactionBalance;
use crate::error::{ensure_non_negative, CalcError};
use crate::model::{AssetTransaction, HoldingHistoryEntry};

/// Absolute change in value between two observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Growth {
    pub previous: Decimal,
    pub current: Decimal,
    pub value: Decimal,
}

impl Growth {
    pub fn between(previous: Decimal, current: Decimal) -> Result<Self, CalcError> {
        ensure_non_negative("previous value", previous)?;
        ensure_non_negative("current value", current)?;
        Ok(Self {
            previous,
            current,
            value: current - previous,
        })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Change relative to the previous value, in percent
    pub fn percentage(&self) -> Option<Decimal> {
        if self.previous > Decimal::ZERO {
            Some(self.value / self.previous * Decimal::ONE_HUNDRED)
        } else {
            None
        }
    }
}

/// Change in value not explained by purchases or sales.
///
/// A holding worth 1,000 that receives a 500 purchase and ends the month at
/// 1,530 appreciated 30, not 530.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Appreciation {
    pub value: Decimal,
    /// Relative to the capital exposed during the period (previous value plus purchases)
    pub percentage: Option<Decimal>,
}

impl Appreciation {
    pub fn calculate(
        previous_value: Decimal,
        current_value: Decimal,
        balance: &TransactionBalance,
    ) -> Result<Self, CalcError> {
        let growth = Growth::between(previous_value, current_value)?;
        let value = growth.value - balance.net();

        let base = previous_value + balance.purchases;
        let percentage = if base > Decimal::ZERO {
            Some(value / base * Decimal::ONE_HUNDRED)
        } else {
            None
        };

        Ok(Self { value, percentage })
    }

    /// Appreciation of a holding between two snapshots.
    ///
    /// Transactions dated after the previous snapshot's month, up to and
    /// including the current month, count toward the balance. Without a
    /// previous snapshot the holding starts from zero and every transaction up
    /// to the current month counts.
    pub fn from_history<'a, I>(
        previous: Option<&HoldingHistoryEntry>,
        current: &HoldingHistoryEntry,
        transactions: I,
    ) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = &'a AssetTransaction>,
    {
        let previous_value = previous
            .map(|entry| entry.end_of_month_value)
            .unwrap_or(Decimal::ZERO);
        let balance = TransactionBalance::between_snapshots(previous, current, transactions)?;
        Self::calculate(previous_value, current.end_of_month_value, &balance)
    }
}
