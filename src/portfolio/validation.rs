//! Portfolio validation module
//!
//! Checks a loaded portfolio for dangling references, duplicate ids and
//! impossible values, collecting every issue instead of failing on the first.

use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

use crate::model::{AssetKind, Portfolio};

/// A validation issue found in the portfolio document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Kind of entity with the issue (e.g., "holding", "transaction")
    pub entity: &'static str,
    /// Id of the entity, when it has one
    pub id: Option<i64>,
    /// Field name that has the issue
    pub field: String,
    /// Description of why this is an issue
    pub reason: String,
    /// Suggestion for fixing the issue (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        entity: &'static str,
        id: Option<i64>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            id,
            field: field.into(),
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Every issue found in one pass over the portfolio
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Count issues by entity for summary reporting
    pub fn issue_summary(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for issue in &self.issues {
            *summary.entry(issue.entity).or_insert(0) += 1;
        }
        summary
    }

    fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}

/// Validate references, ids and values of a portfolio
pub fn validate_portfolio(portfolio: &Portfolio) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_duplicate_ids(&mut report, "issuer", portfolio.issuers.iter().map(|i| i.id));
    check_duplicate_ids(&mut report, "owner", portfolio.owners.iter().map(|o| o.id));
    check_duplicate_ids(&mut report, "brokerage", portfolio.brokerages.iter().map(|b| b.id));
    check_duplicate_ids(&mut report, "asset", portfolio.assets.iter().map(|a| a.id));
    check_duplicate_ids(&mut report, "holding", portfolio.holdings.iter().map(|h| h.id));
    check_duplicate_ids(
        &mut report,
        "transaction",
        portfolio.transactions.iter().map(|t| t.id),
    );
    check_duplicate_ids(&mut report, "goal", portfolio.goals.iter().map(|g| g.id));

    validate_assets(&mut report, portfolio);
    validate_holdings(&mut report, portfolio);
    validate_history(&mut report, portfolio);
    validate_transactions(&mut report, portfolio);
    validate_goals(&mut report, portfolio);

    if report.has_issues() {
        warn!("Portfolio validation found {} issue(s)", report.issues.len());
    }
    report
}

fn check_duplicate_ids(
    report: &mut ValidationReport,
    entity: &'static str,
    ids: impl Iterator<Item = i64>,
) {
    for id in ids.duplicates() {
        report.push(
            ValidationIssue::new(entity, Some(id), "id", format!("Duplicate {} id {}", entity, id))
                .with_suggestion("Give every entry a unique id"),
        );
    }
}

fn validate_assets(report: &mut ValidationReport, portfolio: &Portfolio) {
    for asset in &portfolio.assets {
        if portfolio.issuer(asset.issuer_id).is_none() {
            report.push(ValidationIssue::new(
                "asset",
                Some(asset.id),
                "issuer_id",
                format!("Unknown issuer {}", asset.issuer_id),
            ));
        }

        match &asset.kind {
            AssetKind::VariableIncome { ticker, .. } if ticker.trim().is_empty() => {
                report.push(ValidationIssue::new(
                    "asset",
                    Some(asset.id),
                    "ticker",
                    "Variable income asset without ticker",
                ));
            }
            AssetKind::FixedIncome {
                contracted_yield,
                cdi_relative_yield,
                ..
            } => {
                if *contracted_yield < Decimal::ZERO {
                    report.push(ValidationIssue::new(
                        "asset",
                        Some(asset.id),
                        "contracted_yield",
                        format!("Negative contracted yield {}", contracted_yield),
                    ));
                }
                if cdi_relative_yield.is_some_and(|y| y <= Decimal::ZERO) {
                    report.push(ValidationIssue::new(
                        "asset",
                        Some(asset.id),
                        "cdi_relative_yield",
                        "Percentage of CDI must be positive",
                    ));
                }
            }
            _ => {}
        }
    }
}

fn validate_holdings(report: &mut ValidationReport, portfolio: &Portfolio) {
    for holding in &portfolio.holdings {
        let id = Some(holding.id);
        if portfolio.asset(holding.asset_id).is_none() {
            report.push(ValidationIssue::new(
                "holding",
                id,
                "asset_id",
                format!("Unknown asset {}", holding.asset_id),
            ));
        }
        if portfolio.owner(holding.owner_id).is_none() {
            report.push(ValidationIssue::new(
                "holding",
                id,
                "owner_id",
                format!("Unknown owner {}", holding.owner_id),
            ));
        }
        if portfolio.brokerage(holding.brokerage_id).is_none() {
            report.push(ValidationIssue::new(
                "holding",
                id,
                "brokerage_id",
                format!("Unknown brokerage {}", holding.brokerage_id),
            ));
        }
        if let Some(goal_id) = holding.goal_id {
            if portfolio.goal(goal_id).is_none() {
                report.push(
                    ValidationIssue::new(
                        "holding",
                        id,
                        "goal_id",
                        format!("Unknown goal {}", goal_id),
                    )
                    .with_suggestion("Remove goal_id or add the goal"),
                );
            }
        }
    }
}

fn validate_history(report: &mut ValidationReport, portfolio: &Portfolio) {
    let mut seen = HashSet::new();

    for entry in &portfolio.history {
        let holding = Some(entry.holding_id);
        if portfolio.holding(entry.holding_id).is_none() {
            report.push(ValidationIssue::new(
                "history",
                holding,
                "holding_id",
                format!("Snapshot {} references unknown holding", entry.reference),
            ));
        }
        if !seen.insert((entry.holding_id, entry.reference)) {
            report.push(
                ValidationIssue::new(
                    "history",
                    holding,
                    "reference",
                    format!("More than one snapshot for {}", entry.reference),
                )
                .with_suggestion("Keep a single month-end snapshot per holding"),
            );
        }

        for (field, value) in [
            ("end_of_month_value", entry.end_of_month_value),
            ("end_of_month_quantity", entry.end_of_month_quantity),
            ("end_of_month_average_cost", entry.end_of_month_average_cost),
        ] {
            if value < Decimal::ZERO {
                report.push(ValidationIssue::new(
                    "history",
                    holding,
                    field,
                    format!("Negative value {} in {}", value, entry.reference),
                ));
            }
        }
    }
}

fn validate_transactions(report: &mut ValidationReport, portfolio: &Portfolio) {
    for tx in &portfolio.transactions {
        let id = Some(tx.id);
        if portfolio.holding(tx.holding_id).is_none() {
            report.push(ValidationIssue::new(
                "transaction",
                id,
                "holding_id",
                format!("Unknown holding {}", tx.holding_id),
            ));
        }
        if tx.quantity <= Decimal::ZERO {
            report.push(ValidationIssue::new(
                "transaction",
                id,
                "quantity",
                format!("Quantity must be positive (got {})", tx.quantity),
            ));
        }
        if tx.unit_price <= Decimal::ZERO {
            report.push(ValidationIssue::new(
                "transaction",
                id,
                "unit_price",
                format!("Unit price must be positive (got {})", tx.unit_price),
            ));
        }
        if tx.fees < Decimal::ZERO {
            report.push(ValidationIssue::new(
                "transaction",
                id,
                "fees",
                format!("Fees cannot be negative (got {})", tx.fees),
            ));
        }
    }
}

fn validate_goals(report: &mut ValidationReport, portfolio: &Portfolio) {
    for goal in &portfolio.goals {
        let id = Some(goal.id);
        if goal.target_value <= Decimal::ZERO {
            report.push(ValidationIssue::new(
                "goal",
                id,
                "target_value",
                format!("Target must be positive (got {})", goal.target_value),
            ));
        }

        let Some(plan) = &goal.plan else {
            continue;
        };
        if plan.initial_value < Decimal::ZERO {
            report.push(ValidationIssue::new(
                "goal",
                id,
                "plan.initial_value",
                format!("Initial value cannot be negative (got {})", plan.initial_value),
            ));
        }
        if plan.monthly_contribution < Decimal::ZERO {
            report.push(ValidationIssue::new(
                "goal",
                id,
                "plan.monthly_contribution",
                format!(
                    "Monthly contribution cannot be negative (got {})",
                    plan.monthly_contribution
                ),
            ));
        }
        if let Err(e) = plan.expected_return.monthly_rate() {
            report.push(ValidationIssue::new(
                "goal",
                id,
                "plan.expected_return",
                e.to_string(),
            ));
        }
        if let Some(target_date) = goal.target_date {
            if target_date <= plan.start {
                report.push(
                    ValidationIssue::new(
                        "goal",
                        id,
                        "target_date",
                        format!("Target date {} is not after plan start {}", target_date, plan.start),
                    )
                    .with_suggestion("Move the target date forward or the plan start back"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Asset, AssetHolding, AssetTransaction, Brokerage, FinancialGoal, GoalInvestmentPlan,
        HoldingHistoryEntry, Issuer, Liquidity, Owner, RateAssumption, TransactionKind,
        VariableIncomeType,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn valid_portfolio() -> Portfolio {
        Portfolio {
            issuers: vec![Issuer {
                id: 1,
                name: "Petrobras".to_string(),
            }],
            owners: vec![Owner {
                id: 1,
                name: "Ana".to_string(),
            }],
            brokerages: vec![Brokerage {
                id: 1,
                name: "XP".to_string(),
            }],
            assets: vec![Asset {
                id: 1,
                name: "Petrobras PN".to_string(),
                issuer_id: 1,
                kind: AssetKind::VariableIncome {
                    subtype: VariableIncomeType::NationalStock,
                    ticker: "PETR4".to_string(),
                },
                liquidity: Liquidity::DaysAfterSale(2),
                observations: None,
            }],
            holdings: vec![AssetHolding {
                id: 1,
                asset_id: 1,
                owner_id: 1,
                brokerage_id: 1,
                goal_id: Some(1),
            }],
            history: vec![HoldingHistoryEntry {
                holding_id: 1,
                reference: "2024-01".parse().unwrap(),
                end_of_month_value: dec!(3800),
                end_of_month_quantity: dec!(100),
                end_of_month_average_cost: dec!(36.5),
            }],
            transactions: vec![AssetTransaction {
                id: 1,
                holding_id: 1,
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                kind: TransactionKind::Purchase,
                quantity: dec!(100),
                unit_price: dec!(36.5),
                fees: dec!(0),
                observations: None,
            }],
            goals: vec![FinancialGoal {
                id: 1,
                name: "Aposentadoria".to_string(),
                target_value: dec!(1000000),
                target_date: Some("2044-01".parse().unwrap()),
                plan: Some(GoalInvestmentPlan {
                    start: "2024-01".parse().unwrap(),
                    initial_value: dec!(3650),
                    monthly_contribution: dec!(1500),
                    expected_return: RateAssumption::annual(dec!(10)),
                }),
            }],
        }
    }

    #[test]
    fn test_valid_portfolio_has_no_issues() {
        let report = validate_portfolio(&valid_portfolio());
        assert!(!report.has_issues(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn test_dangling_references_are_reported() {
        let mut portfolio = valid_portfolio();
        portfolio.holdings[0].asset_id = 42;
        portfolio.holdings[0].goal_id = Some(7);
        portfolio.transactions[0].holding_id = 9;

        let report = validate_portfolio(&portfolio);
        let fields: Vec<&str> = report.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"asset_id"));
        assert!(fields.contains(&"goal_id"));
        assert!(fields.contains(&"holding_id"));

        let goal_issue = report.issues.iter().find(|i| i.field == "goal_id").unwrap();
        assert!(goal_issue.suggestion.is_some());
    }

    #[test]
    fn test_duplicates_are_reported() {
        let mut portfolio = valid_portfolio();
        let tx = portfolio.transactions[0].clone();
        portfolio.transactions.push(tx);
        let entry = portfolio.history[0].clone();
        portfolio.history.push(entry);

        let report = validate_portfolio(&portfolio);
        let summary = report.issue_summary();
        assert_eq!(summary.get("transaction"), Some(&1));
        assert_eq!(summary.get("history"), Some(&1));
    }

    #[test]
    fn test_bad_values_are_collected() {
        let mut portfolio = valid_portfolio();
        portfolio.transactions[0].quantity = dec!(0);
        portfolio.transactions[0].unit_price = dec!(-1);
        portfolio.history[0].end_of_month_value = dec!(-10);
        portfolio.goals[0].target_value = dec!(0);
        if let Some(plan) = portfolio.goals[0].plan.as_mut() {
            plan.expected_return = RateAssumption::monthly(dec!(-100));
        }

        let report = validate_portfolio(&portfolio);
        assert_eq!(report.issues.len(), 5, "issues: {:?}", report.issues);
    }

    #[test]
    fn test_target_date_before_plan_start() {
        let mut portfolio = valid_portfolio();
        portfolio.goals[0].target_date = Some("2023-06".parse().unwrap());

        let report = validate_portfolio(&portfolio);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field, "target_date");
    }
}
