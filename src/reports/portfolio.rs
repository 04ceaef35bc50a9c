use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::PortfolioError;
use crate::model::{AssetCategory, Portfolio, YearMonth};

/// Latest known state of a single holding
#[derive(Debug, Clone, Serialize)]
pub struct HoldingOverview {
    pub holding_id: i64,
    pub asset_id: i64,
    pub name: String,
    pub category: AssetCategory,
    pub subtype: &'static str,
    pub issuer: Option<String>,
    pub owner: Option<String>,
    pub brokerage: Option<String>,
    pub goal: Option<String>,
    pub liquidity: String,
    /// Month of the latest snapshot, `None` when the holding has no history
    pub reference: Option<YearMonth>,
    pub value: Decimal,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub cost_basis: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAllocation {
    pub category: AssetCategory,
    pub value: Decimal,
    /// Percent of the total portfolio value
    pub share: Decimal,
}

/// Every holding plus totals and allocation by category
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioOverview {
    pub holdings: Vec<HoldingOverview>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_unrealized_gain: Decimal,
    pub allocation: Vec<CategoryAllocation>,
}

/// Build the overview from each holding's latest snapshot
pub fn portfolio_overview(portfolio: &Portfolio) -> Result<PortfolioOverview> {
    let mut holdings = Vec::with_capacity(portfolio.holdings.len());

    for holding in &portfolio.holdings {
        let asset = portfolio
            .holding_asset(holding)
            .ok_or(PortfolioError::NotFound {
                entity: "asset",
                id: holding.asset_id,
            })?;

        let latest = portfolio.latest_entry(holding.id);
        if latest.is_none() {
            warn!("Holding {} ({}) has no history", holding.id, asset.display_name());
        }

        let value = latest.map(|e| e.end_of_month_value).unwrap_or_default();
        let cost_basis = latest.map(|e| e.cost_basis()).unwrap_or_default();
        let unrealized_gain = value - cost_basis;
        let unrealized_gain_pct = if cost_basis > Decimal::ZERO {
            Some(unrealized_gain / cost_basis * Decimal::ONE_HUNDRED)
        } else {
            None
        };

        holdings.push(HoldingOverview {
            holding_id: holding.id,
            asset_id: asset.id,
            name: asset.display_name().to_string(),
            category: asset.category(),
            subtype: asset.kind.subtype_str(),
            issuer: portfolio.issuer(asset.issuer_id).map(|i| i.name.clone()),
            owner: portfolio.owner(holding.owner_id).map(|o| o.name.clone()),
            brokerage: portfolio.brokerage(holding.brokerage_id).map(|b| b.name.clone()),
            goal: holding
                .goal_id
                .and_then(|id| portfolio.goal(id))
                .map(|g| g.name.clone()),
            liquidity: asset.liquidity.describe(),
            reference: latest.map(|e| e.reference),
            value,
            quantity: latest.map(|e| e.end_of_month_quantity).unwrap_or_default(),
            average_cost: latest.map(|e| e.end_of_month_average_cost).unwrap_or_default(),
            cost_basis,
            unrealized_gain,
            unrealized_gain_pct,
        });
    }

    holdings.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| b.value.cmp(&a.value))
            .then_with(|| a.holding_id.cmp(&b.holding_id))
    });

    let total_value: Decimal = holdings.iter().map(|h| h.value).sum();
    let total_cost: Decimal = holdings.iter().map(|h| h.cost_basis).sum();

    let mut by_category: BTreeMap<AssetCategory, Decimal> = BTreeMap::new();
    for h in &holdings {
        *by_category.entry(h.category).or_default() += h.value;
    }
    let allocation = by_category
        .into_iter()
        .map(|(category, value)| CategoryAllocation {
            category,
            value,
            share: if total_value > Decimal::ZERO {
                value / total_value * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
        })
        .collect();

    Ok(PortfolioOverview {
        holdings,
        total_value,
        total_cost,
        total_unrealized_gain: total_value - total_cost,
        allocation,
    })
}
