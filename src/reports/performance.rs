use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::calc::{Appreciation, Growth, GrowthRate, TransactionBalance};
use crate::error::PortfolioError;
use crate::model::{MonthRange, Portfolio, YearMonth};

/// One month of a performance report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub reference: YearMonth,
    /// Value at the previous snapshot (0 for the first one)
    pub previous_value: Decimal,
    pub value: Decimal,
    pub growth: Decimal,
    pub growth_pct: Option<Decimal>,
    pub balance: TransactionBalance,
    pub appreciation: Decimal,
    pub appreciation_pct: Option<Decimal>,
    pub unrealized_gain: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub label: String,
    pub rows: Vec<PerformanceRow>,
    pub start_value: Decimal,
    pub end_value: Decimal,
    pub total_balance: TransactionBalance,
    pub total_appreciation: Decimal,
    /// Monthly appreciation percentages chained together
    pub time_weighted_return: Option<Decimal>,
    /// Compound monthly growth of value between the first and last rows
    pub monthly_growth_rate: Option<Decimal>,
    pub annualized_growth_rate: Option<Decimal>,
}

impl PerformanceReport {
    fn from_rows(label: String, rows: Vec<PerformanceRow>) -> Result<Self> {
        let start_value = rows.first().map(|r| r.previous_value).unwrap_or_default();
        let end_value = rows.last().map(|r| r.value).unwrap_or_default();
        let total_balance: TransactionBalance = rows.iter().map(|r| r.balance).sum();
        let total_appreciation: Decimal = rows.iter().map(|r| r.appreciation).sum();

        let time_weighted_return = chain_returns(&rows);

        let (monthly_growth_rate, annualized_growth_rate) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) if first.value > Decimal::ZERO => {
                let months = first.reference.months_until(last.reference);
                if months > 0 {
                    let monthly = GrowthRate::compound(first.value, last.value, months as u32)?;
                    let annual = GrowthRate::monthly_to_annual(monthly).ok();
                    (Some(monthly), annual)
                } else {
                    (None, None)
                }
            }
            _ => (None, None),
        };

        Ok(Self {
            label,
            rows,
            start_value,
            end_value,
            total_balance,
            total_appreciation,
            time_weighted_return,
            monthly_growth_rate,
            annualized_growth_rate,
        })
    }
}

/// Chain monthly appreciation percentages: `prod(1 + p) - 1`.
/// Months without a computable percentage contribute nothing.
fn chain_returns(rows: &[PerformanceRow]) -> Option<Decimal> {
    let mut factor = Decimal::ONE;
    let mut any = false;
    for pct in rows.iter().filter_map(|r| r.appreciation_pct) {
        factor = factor.checked_mul(Decimal::ONE + pct / Decimal::ONE_HUNDRED)?;
        any = true;
    }
    any.then(|| (factor - Decimal::ONE) * Decimal::ONE_HUNDRED)
}

/// Month-by-month performance of a single holding
pub fn holding_performance(
    portfolio: &Portfolio,
    holding_id: i64,
    range: Option<MonthRange>,
) -> Result<PerformanceReport> {
    let holding = portfolio.holding(holding_id).ok_or(PortfolioError::NotFound {
        entity: "holding",
        id: holding_id,
    })?;
    let label = portfolio
        .holding_asset(holding)
        .map(|a| a.display_name().to_string())
        .unwrap_or_else(|| format!("holding {}", holding_id));

    let rows = holding_rows(portfolio, holding_id, range)?;
    debug!("Holding {} performance: {} month(s)", holding_id, rows.len());
    PerformanceReport::from_rows(label, rows)
}

fn holding_rows(
    portfolio: &Portfolio,
    holding_id: i64,
    range: Option<MonthRange>,
) -> Result<Vec<PerformanceRow>> {
    let history = portfolio.history_for(holding_id);
    let transactions = portfolio.transactions_for(holding_id);
    let mut rows = Vec::new();

    for (index, current) in history.iter().enumerate() {
        if range.is_some_and(|r| !r.includes(current.reference)) {
            continue;
        }
        // Previous snapshot comes from the full history so the first row in range has context
        let previous = index.checked_sub(1).map(|i| history[i]);
        let previous_value = previous
            .map(|e| e.end_of_month_value)
            .unwrap_or(Decimal::ZERO);

        let growth = Growth::between(previous_value, current.end_of_month_value)
            .map_err(PortfolioError::from)?;
        let balance =
            TransactionBalance::between_snapshots(previous, current, transactions.iter().copied())
                .map_err(PortfolioError::from)?;
        let appreciation =
            Appreciation::calculate(previous_value, current.end_of_month_value, &balance)
                .map_err(PortfolioError::from)?;

        rows.push(PerformanceRow {
            reference: current.reference,
            previous_value,
            value: current.end_of_month_value,
            growth: growth.value(),
            growth_pct: growth.percentage(),
            balance,
            appreciation: appreciation.value,
            appreciation_pct: appreciation.percentage,
            unrealized_gain: current.unrealized_gain(),
        });
    }

    Ok(rows)
}

/// Month-by-month performance of every holding combined.
///
/// A holding without a snapshot in some month counts at its last known value
/// there; the money it moved in the meantime lands on its next snapshot month.
pub fn portfolio_performance(
    portfolio: &Portfolio,
    range: Option<MonthRange>,
) -> Result<PerformanceReport> {
    let mut by_month: BTreeMap<YearMonth, Vec<(i64, PerformanceRow)>> = BTreeMap::new();
    for holding in &portfolio.holdings {
        for row in holding_rows(portfolio, holding.id, None)? {
            by_month.entry(row.reference).or_default().push((holding.id, row));
        }
    }

    // Latest (value, unrealized gain) of each holding seen so far
    let mut carried: BTreeMap<i64, (Decimal, Decimal)> = BTreeMap::new();
    let mut rows = Vec::with_capacity(by_month.len());
    for (reference, month_rows) in by_month {
        let previous_value: Decimal = carried.values().map(|(value, _)| *value).sum();
        let mut balance = TransactionBalance::default();
        for (holding_id, row) in &month_rows {
            balance += row.balance;
            carried.insert(*holding_id, (row.value, row.unrealized_gain));
        }
        if range.is_some_and(|r| !r.includes(reference)) {
            continue;
        }

        let value: Decimal = carried.values().map(|(value, _)| *value).sum();
        let unrealized_gain: Decimal = carried.values().map(|(_, gain)| *gain).sum();

        let growth = Growth::between(previous_value, value).map_err(PortfolioError::from)?;
        let appreciation = Appreciation::calculate(previous_value, value, &balance)
            .map_err(PortfolioError::from)?;

        rows.push(PerformanceRow {
            reference,
            previous_value,
            value,
            growth: growth.value(),
            growth_pct: growth.percentage(),
            balance,
            appreciation: appreciation.value,
            appreciation_pct: appreciation.percentage,
            unrealized_gain,
        });
    }

    PerformanceReport::from_rows("Portfolio".to_string(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetHolding, AssetTransaction, HoldingHistoryEntry, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(holding_id: i64, month: &str, value: Decimal) -> HoldingHistoryEntry {
        HoldingHistoryEntry {
            holding_id,
            reference: month.parse().unwrap(),
            end_of_month_value: value,
            end_of_month_quantity: dec!(10),
            end_of_month_average_cost: dec!(100),
        }
    }

    fn purchase(id: i64, holding_id: i64, date: (i32, u32, u32), value: Decimal) -> AssetTransaction {
        AssetTransaction {
            id,
            holding_id,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            kind: TransactionKind::Purchase,
            quantity: dec!(1),
            unit_price: value,
            fees: Decimal::ZERO,
            observations: None,
        }
    }

    fn holding(id: i64) -> AssetHolding {
        AssetHolding {
            id,
            asset_id: id,
            owner_id: 1,
            brokerage_id: 1,
            goal_id: None,
        }
    }

    fn sample() -> Portfolio {
        Portfolio {
            holdings: vec![holding(1), holding(2)],
            history: vec![
                entry(1, "2024-01", dec!(1000)),
                entry(1, "2024-02", dec!(1530)),
                entry(1, "2024-03", dec!(1560.60)),
                entry(2, "2024-02", dec!(2020)),
                entry(2, "2024-03", dec!(2000)),
            ],
            transactions: vec![
                purchase(1, 1, (2024, 1, 5), dec!(1000)),
                purchase(2, 1, (2024, 2, 10), dec!(500)),
                purchase(3, 2, (2024, 2, 1), dec!(2000)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_holding_performance_rows() {
        let report = holding_performance(&sample(), 1, None).unwrap();
        assert_eq!(report.label, "holding 1");
        assert_eq!(report.rows.len(), 3);

        let jan = &report.rows[0];
        assert_eq!(jan.previous_value, dec!(0));
        assert_eq!(jan.appreciation, dec!(0));
        assert_eq!(jan.appreciation_pct, Some(dec!(0)));
        assert_eq!(jan.growth_pct, None);

        let feb = &report.rows[1];
        assert_eq!(feb.growth, dec!(530));
        assert_eq!(feb.balance.purchases, dec!(500));
        assert_eq!(feb.appreciation, dec!(30));
        assert_eq!(feb.appreciation_pct, Some(dec!(2)));

        let mar = &report.rows[2];
        assert_eq!(mar.appreciation, dec!(30.60));
        assert_eq!(mar.appreciation_pct, Some(dec!(2)));

        assert_eq!(report.start_value, dec!(0));
        assert_eq!(report.end_value, dec!(1560.60));
        assert_eq!(report.total_appreciation, dec!(60.60));
        assert_eq!(report.total_balance.purchases, dec!(1500));
        // 1.00 * 1.02 * 1.02
        assert_eq!(report.time_weighted_return, Some(dec!(4.04)));
        assert!(report.monthly_growth_rate.is_some());
        assert!(report.annualized_growth_rate.is_some());
    }

    #[test]
    fn test_range_keeps_previous_month_context() {
        let range = MonthRange::new("2024-02".parse().unwrap(), "2024-03".parse().unwrap()).unwrap();
        let report = holding_performance(&sample(), 1, Some(range)).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].previous_value, dec!(1000));
        assert_eq!(report.start_value, dec!(1000));
        assert_eq!(report.rows[0].appreciation, dec!(30));
    }

    #[test]
    fn test_unknown_holding_is_an_error() {
        let err = holding_performance(&sample(), 99, None).unwrap_err();
        assert!(err.to_string().contains("holding 99 not found"));
    }

    #[test]
    fn test_portfolio_performance_aggregates_months() {
        let report = portfolio_performance(&sample(), None).unwrap();
        assert_eq!(report.rows.len(), 3);

        let feb = &report.rows[1];
        assert_eq!(feb.previous_value, dec!(1000));
        assert_eq!(feb.value, dec!(3550));
        assert_eq!(feb.balance.purchases, dec!(2500));
        // 30 from holding 1 plus 20 from holding 2
        assert_eq!(feb.appreciation, dec!(50));

        let mar = &report.rows[2];
        assert_eq!(mar.value, dec!(3560.60));
        assert_eq!(mar.appreciation, dec!(10.60));
        assert_eq!(report.total_appreciation, dec!(60.60));
    }

    #[test]
    fn test_portfolio_performance_carries_values_over_gaps() {
        let portfolio = Portfolio {
            holdings: vec![holding(1), holding(2)],
            history: vec![
                entry(1, "2024-01", dec!(1000)),
                entry(1, "2024-03", dec!(1300)),
                entry(2, "2024-01", dec!(500)),
                entry(2, "2024-02", dec!(500)),
                entry(2, "2024-03", dec!(500)),
            ],
            transactions: vec![
                purchase(1, 1, (2024, 1, 2), dec!(1000)),
                purchase(2, 2, (2024, 1, 2), dec!(500)),
                purchase(3, 1, (2024, 2, 15), dec!(250)),
            ],
            ..Default::default()
        };
        let report = portfolio_performance(&portfolio, None).unwrap();
        assert_eq!(report.rows.len(), 3);

        let feb = &report.rows[1];
        assert_eq!(feb.previous_value, dec!(1500));
        assert_eq!(feb.value, dec!(1500));
        assert!(feb.balance.is_empty());
        assert_eq!(feb.appreciation, dec!(0));

        // Holding 1's February purchase shows up with its March snapshot
        let mar = &report.rows[2];
        assert_eq!(mar.previous_value, dec!(1500));
        assert_eq!(mar.value, dec!(1800));
        assert_eq!(mar.balance.purchases, dec!(250));
        assert_eq!(mar.appreciation, dec!(50));
        assert_eq!(report.total_appreciation, dec!(50));

        let range = MonthRange::single("2024-02".parse().unwrap());
        let feb_only = portfolio_performance(&portfolio, Some(range)).unwrap();
        assert_eq!(feb_only.rows.len(), 1);
        assert_eq!(feb_only.rows[0].value, dec!(1500));
    }

    #[test]
    fn test_empty_history_gives_empty_report() {
        let portfolio = Portfolio {
            holdings: vec![holding(1)],
            ..Default::default()
        };
        let report = holding_performance(&portfolio, 1, None).unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.time_weighted_return, None);
        assert_eq!(report.monthly_growth_rate, None);
    }
}
