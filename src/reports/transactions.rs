use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::calc::TransactionBalance;
use crate::error::PortfolioError;
use crate::model::{AssetTransaction, MonthRange, Portfolio, YearMonth};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBalance {
    pub reference: YearMonth,
    pub balance: TransactionBalance,
}

/// Purchases and sales grouped by month
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSummary {
    /// `None` when the summary covers every holding
    pub holding_id: Option<i64>,
    pub range: Option<MonthRange>,
    pub months: Vec<MonthlyBalance>,
    pub total: TransactionBalance,
}

pub fn transaction_summary(
    portfolio: &Portfolio,
    holding_id: Option<i64>,
    range: Option<MonthRange>,
) -> Result<TransactionSummary> {
    let selected: Vec<&AssetTransaction> = match holding_id {
        Some(id) => {
            if portfolio.holding(id).is_none() {
                return Err(PortfolioError::NotFound {
                    entity: "holding",
                    id,
                }
                .into());
            }
            portfolio.transactions_for(id)
        }
        None => portfolio.transactions.iter().collect(),
    };

    let mut by_month: BTreeMap<YearMonth, Vec<&AssetTransaction>> = BTreeMap::new();
    for tx in selected {
        if range.is_some_and(|r| !r.contains(tx.date)) {
            continue;
        }
        by_month.entry(tx.reference()).or_default().push(tx);
    }

    let months = by_month
        .into_iter()
        .map(|(reference, txs)| {
            TransactionBalance::from_transactions(txs)
                .map(|balance| MonthlyBalance { reference, balance })
                .map_err(PortfolioError::from)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let total: TransactionBalance = months.iter().map(|m| m.balance).sum();

    Ok(TransactionSummary {
        holding_id,
        range,
        months,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetHolding, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx(
        id: i64,
        holding_id: i64,
        date: (i32, u32, u32),
        kind: TransactionKind,
        value: Decimal,
    ) -> AssetTransaction {
        AssetTransaction {
            id,
            holding_id,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            kind,
            quantity: dec!(2),
            unit_price: value / dec!(2),
            fees: Decimal::ZERO,
            observations: None,
        }
    }

    fn sample() -> Portfolio {
        let holding = |id| AssetHolding {
            id,
            asset_id: 1,
            owner_id: 1,
            brokerage_id: 1,
            goal_id: None,
        };
        Portfolio {
            holdings: vec![holding(1), holding(2)],
            transactions: vec![
                tx(1, 1, (2024, 1, 10), TransactionKind::Purchase, dec!(1000)),
                tx(2, 1, (2024, 1, 25), TransactionKind::Sale, dec!(200)),
                tx(3, 2, (2024, 2, 3), TransactionKind::Purchase, dec!(600)),
                tx(4, 1, (2024, 3, 15), TransactionKind::Purchase, dec!(400)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_groups_by_month() {
        let summary = transaction_summary(&sample(), None, None).unwrap();
        assert_eq!(summary.months.len(), 3);
        assert_eq!(summary.months[0].reference.to_string(), "2024-01");
        assert_eq!(summary.months[0].balance.net(), dec!(800));
        assert_eq!(summary.total.purchases, dec!(2000));
        assert_eq!(summary.total.sales, dec!(200));
        assert_eq!(summary.total.count(), 4);
    }

    #[test]
    fn test_summary_for_one_holding_and_range() {
        let range = MonthRange::new("2024-01".parse().unwrap(), "2024-02".parse().unwrap()).unwrap();
        let summary = transaction_summary(&sample(), Some(1), Some(range)).unwrap();
        assert_eq!(summary.months.len(), 1);
        assert_eq!(summary.total.purchases, dec!(1000));
        assert_eq!(summary.total.sale_count, 1);
    }

    #[test]
    fn test_summary_unknown_holding() {
        assert!(transaction_summary(&sample(), Some(7), None).is_err());
    }

    #[test]
    fn test_summary_without_transactions_is_empty() {
        let summary = transaction_summary(&Portfolio::default(), None, None).unwrap();
        assert!(summary.months.is_empty());
        assert!(summary.total.is_empty());
    }
}
