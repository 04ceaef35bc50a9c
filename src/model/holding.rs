use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::period::YearMonth;

/// Ownership of an asset by an owner at a brokerage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetHolding {
    pub id: i64,
    pub asset_id: i64,
    pub owner_id: i64,
    pub brokerage_id: i64,
    /// Goal this holding contributes to, if any
    #[serde(default)]
    pub goal_id: Option<i64>,
}

/// Month-end snapshot of a holding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingHistoryEntry {
    pub holding_id: i64,
    pub reference: YearMonth,
    pub end_of_month_value: Decimal,
    pub end_of_month_quantity: Decimal,
    pub end_of_month_average_cost: Decimal,
}

impl HoldingHistoryEntry {
    /// Amount paid for the units held at month end
    pub fn cost_basis(&self) -> Decimal {
        self.end_of_month_quantity * self.end_of_month_average_cost
    }

    pub fn unrealized_gain(&self) -> Decimal {
        self.end_of_month_value - self.cost_basis()
    }
}

/// Transaction kind (purchase or sale)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Purchase,
    Sale,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "PURCHASE",
            TransactionKind::Sale => "SALE",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PURCHASE" | "BUY" | "COMPRA" | "C" => Ok(TransactionKind::Purchase),
            "SALE" | "SELL" | "VENDA" | "V" => Ok(TransactionKind::Sale),
            _ => Err(()),
        }
    }
}

/// Purchase or sale of units of a holding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetTransaction {
    pub id: i64,
    pub holding_id: i64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub observations: Option<String>,
}

impl AssetTransaction {
    pub fn gross_value(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Cash moved by the transaction: fees add to purchases and reduce sale proceeds
    pub fn total_value(&self) -> Decimal {
        match self.kind {
            TransactionKind::Purchase => self.gross_value() + self.fees,
            TransactionKind::Sale => self.gross_value() - self.fees,
        }
    }

    pub fn reference(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}
