// Domain model - assets, holdings, monthly history, transactions and goals

pub mod asset;
pub mod goal;
pub mod holding;
pub mod period;

use serde::{Deserialize, Serialize};

pub use asset::{
    Asset, AssetCategory, AssetKind, Brokerage, FixedIncomeType, FundType, Issuer, Liquidity,
    Owner, VariableIncomeType, YieldType,
};
pub use goal::{FinancialGoal, GoalInvestmentPlan, RateAssumption, RatePeriod};
pub use holding::{AssetHolding, AssetTransaction, HoldingHistoryEntry, TransactionKind};
pub use period::{MonthRange, YearMonth};

/// The portfolio document: every entity the tracker knows about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub issuers: Vec<Issuer>,
    #[serde(default)]
    pub owners: Vec<Owner>,
    #[serde(default)]
    pub brokerages: Vec<Brokerage>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub holdings: Vec<AssetHolding>,
    #[serde(default)]
    pub history: Vec<HoldingHistoryEntry>,
    #[serde(default)]
    pub transactions: Vec<AssetTransaction>,
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,
}

impl Portfolio {
    pub fn asset(&self, id: i64) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn issuer(&self, id: i64) -> Option<&Issuer> {
        self.issuers.iter().find(|i| i.id == id)
    }

    pub fn owner(&self, id: i64) -> Option<&Owner> {
        self.owners.iter().find(|o| o.id == id)
    }

    pub fn brokerage(&self, id: i64) -> Option<&Brokerage> {
        self.brokerages.iter().find(|b| b.id == id)
    }

    pub fn holding(&self, id: i64) -> Option<&AssetHolding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    pub fn goal(&self, id: i64) -> Option<&FinancialGoal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Asset held by a holding
    pub fn holding_asset(&self, holding: &AssetHolding) -> Option<&Asset> {
        self.asset(holding.asset_id)
    }

    /// History entries of a holding, oldest first
    pub fn history_for(&self, holding_id: i64) -> Vec<&HoldingHistoryEntry> {
        let mut entries: Vec<&HoldingHistoryEntry> = self
            .history
            .iter()
            .filter(|e| e.holding_id == holding_id)
            .collect();
        entries.sort_by_key(|e| e.reference);
        entries
    }

    /// Transactions of a holding, oldest first
    pub fn transactions_for(&self, holding_id: i64) -> Vec<&AssetTransaction> {
        let mut txs: Vec<&AssetTransaction> = self
            .transactions
            .iter()
            .filter(|t| t.holding_id == holding_id)
            .collect();
        txs.sort_by_key(|t| (t.date, t.id));
        txs
    }

    pub fn holdings_for_goal(&self, goal_id: i64) -> Vec<&AssetHolding> {
        self.holdings
            .iter()
            .filter(|h| h.goal_id == Some(goal_id))
            .collect()
    }

    /// Most recent snapshot of a holding
    pub fn latest_entry(&self, holding_id: i64) -> Option<&HoldingHistoryEntry> {
        self.history
            .iter()
            .filter(|e| e.holding_id == holding_id)
            .max_by_key(|e| e.reference)
    }

    /// Earliest and latest month with any history
    pub fn history_span(&self) -> Option<MonthRange> {
        let first = self.history.iter().map(|e| e.reference).min()?;
        let last = self.history.iter().map(|e| e.reference).max()?;
        MonthRange::new(first, last).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(holding_id: i64, month: &str, value: rust_decimal::Decimal) -> HoldingHistoryEntry {
        HoldingHistoryEntry {
            holding_id,
            reference: month.parse().unwrap(),
            end_of_month_value: value,
            end_of_month_quantity: dec!(1),
            end_of_month_average_cost: dec!(100),
        }
    }

    fn sample() -> Portfolio {
        Portfolio {
            holdings: vec![
                AssetHolding {
                    id: 1,
                    asset_id: 10,
                    owner_id: 1,
                    brokerage_id: 1,
                    goal_id: Some(5),
                },
                AssetHolding {
                    id: 2,
                    asset_id: 11,
                    owner_id: 1,
                    brokerage_id: 1,
                    goal_id: None,
                },
            ],
            history: vec![
                entry(1, "2024-03", dec!(130)),
                entry(1, "2024-01", dec!(110)),
                entry(2, "2023-12", dec!(50)),
                entry(1, "2024-02", dec!(120)),
            ],
            transactions: vec![
                AssetTransaction {
                    id: 2,
                    holding_id: 1,
                    date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    kind: TransactionKind::Purchase,
                    quantity: dec!(1),
                    unit_price: dec!(10),
                    fees: dec!(0),
                    observations: None,
                },
                AssetTransaction {
                    id: 1,
                    holding_id: 1,
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    kind: TransactionKind::Purchase,
                    quantity: dec!(1),
                    unit_price: dec!(100),
                    fees: dec!(0),
                    observations: None,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_history_for_is_sorted() {
        let portfolio = sample();
        let months: Vec<String> = portfolio
            .history_for(1)
            .iter()
            .map(|e| e.reference.to_string())
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn test_latest_entry_and_span() {
        let portfolio = sample();
        assert_eq!(portfolio.latest_entry(1).unwrap().end_of_month_value, dec!(130));
        assert!(portfolio.latest_entry(99).is_none());

        let span = portfolio.history_span().unwrap();
        assert_eq!(span.start().to_string(), "2023-12");
        assert_eq!(span.end().to_string(), "2024-03");
    }

    #[test]
    fn test_transactions_for_sorted_by_date() {
        let portfolio = sample();
        let ids: Vec<i64> = portfolio.transactions_for(1).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_holdings_for_goal() {
        let portfolio = sample();
        let holdings = portfolio.holdings_for_goal(5);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].id, 1);
        assert!(portfolio.holdings_for_goal(6).is_empty());
    }

    #[test]
    fn test_empty_document_parses() {
        let portfolio: Portfolio = serde_json::from_str("{}").unwrap();
        assert!(portfolio.assets.is_empty());
        assert!(portfolio.history_span().is_none());
    }
}
