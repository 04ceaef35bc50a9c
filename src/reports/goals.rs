use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calc::{GoalProjections, ProjectedGoal, MAX_PROJECTION_MONTHS};
use crate::error::{CalcError, PortfolioError};
use crate::model::{FinancialGoal, HoldingHistoryEntry, Portfolio, YearMonth};

/// Where a goal stands and where its plan takes it
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub goal_id: i64,
    pub name: String,
    pub target_value: Decimal,
    pub target_date: Option<YearMonth>,
    pub as_of: YearMonth,
    /// Latest snapshot values of the holdings linked to the goal
    pub current_value: Decimal,
    pub holdings: usize,
    /// Percent of the target already reached
    pub progress: Decimal,
    pub remaining: Decimal,
    pub outlook: Option<PlanOutlook>,
}

/// Result of running the goal's investment plan forward
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutlook {
    pub start: YearMonth,
    pub starting_value: Decimal,
    pub monthly_contribution: Decimal,
    pub monthly_rate: Decimal,
    pub months_to_target: Option<u32>,
    pub expected_completion: Option<YearMonth>,
    /// Contribution needed to reach the target by `target_date`
    pub required_monthly_contribution: Option<Decimal>,
    /// Whether the plan reaches the target by `target_date`
    pub on_track: Option<bool>,
    pub projection: Vec<ProjectedGoal>,
}

/// Progress of one goal as of `as_of`, projecting `horizon` months ahead
pub fn goal_progress(
    portfolio: &Portfolio,
    goal_id: i64,
    as_of: YearMonth,
    horizon: u32,
) -> Result<GoalProgress> {
    let goal = portfolio.goal(goal_id).ok_or(PortfolioError::NotFound {
        entity: "goal",
        id: goal_id,
    })?;
    build_progress(portfolio, goal, as_of, horizon)
}

/// Progress of every goal, without projection series.
///
/// A goal whose target or plan cannot be evaluated is still listed, with
/// no outlook, so one bad entry does not hide the others.
pub fn all_goal_progress(
    portfolio: &Portfolio,
    as_of: YearMonth,
    horizon: u32,
) -> Result<Vec<GoalProgress>> {
    if horizon == 0 || horizon > MAX_PROJECTION_MONTHS {
        return Err(PortfolioError::from(CalcError::InvalidPeriod(format!(
            "projection horizon must be between 1 and {} months (got {})",
            MAX_PROJECTION_MONTHS, horizon
        )))
        .into());
    }

    let goals = portfolio
        .goals
        .iter()
        .map(|goal| match build_progress(portfolio, goal, as_of, horizon) {
            Ok(mut progress) => {
                if let Some(outlook) = progress.outlook.as_mut() {
                    outlook.projection.clear();
                }
                progress
            }
            Err(e) => {
                warn!("Goal {} listed without outlook: {:#}", goal.id, e);
                unplanned_progress(portfolio, goal, as_of)
            }
        })
        .collect();
    Ok(goals)
}

/// Projection of a plan that is not tied to any portfolio goal
#[derive(Debug, Clone, Serialize)]
pub struct GoalSimulation {
    pub start: YearMonth,
    pub initial_value: Decimal,
    pub monthly_contribution: Decimal,
    pub monthly_rate: Decimal,
    pub target_value: Decimal,
    pub months_to_target: Option<u32>,
    pub expected_completion: Option<YearMonth>,
    /// Value at the end of the horizon
    pub final_value: Decimal,
    pub projection: Vec<ProjectedGoal>,
}

pub fn simulate_plan(projections: &GoalProjections, horizon: u32) -> Result<GoalSimulation> {
    let projection = projections.project(horizon).map_err(PortfolioError::from)?;
    let months_to_target = projections
        .months_to_target(horizon)
        .map_err(PortfolioError::from)?;
    let final_value = projection
        .last()
        .map(|p| p.value)
        .unwrap_or(projections.initial_value());

    Ok(GoalSimulation {
        start: projections.start(),
        initial_value: projections.initial_value(),
        monthly_contribution: projections.monthly_contribution(),
        monthly_rate: projections.monthly_rate(),
        target_value: projections.target_value(),
        months_to_target,
        expected_completion: months_to_target.map(|m| projections.start().plus_months(m as i64)),
        final_value,
        projection,
    })
}

fn build_progress(
    portfolio: &Portfolio,
    goal: &FinancialGoal,
    as_of: YearMonth,
    horizon: u32,
) -> Result<GoalProgress> {
    if goal.target_value <= Decimal::ZERO {
        return Err(PortfolioError::ValidationError(format!(
            "goal {} has a non-positive target",
            goal.id
        ))
        .into());
    }

    let (holdings, snapshots) = goal_snapshots(portfolio, goal, as_of);
    let current_value: Decimal = snapshots.iter().map(|e| e.end_of_month_value).sum();

    let progress = percent_of(current_value, goal.target_value).map_err(PortfolioError::from)?;
    let remaining = (goal.target_value - current_value).max(Decimal::ZERO);

    let outlook = match &goal.plan {
        Some(plan) => {
            let projections = GoalProjections::new(plan, goal.target_value)
                .map_err(PortfolioError::from)?;
            // Once holdings have snapshots, the plan continues from what is actually there
            let projections = if !snapshots.is_empty() && as_of >= plan.start {
                projections
                    .rebased(as_of, current_value)
                    .map_err(PortfolioError::from)?
            } else {
                projections
            };
            Some(build_outlook(&projections, goal.target_date, horizon)?)
        }
        None => None,
    };

    debug!(
        "Goal {} progress: {} of {} ({} holding(s))",
        goal.id, current_value, goal.target_value, holdings
    );

    Ok(GoalProgress {
        goal_id: goal.id,
        name: goal.name.clone(),
        target_value: goal.target_value,
        target_date: goal.target_date,
        as_of,
        current_value,
        holdings,
        progress,
        remaining,
        outlook,
    })
}

/// Latest snapshot at or before `as_of` of each holding linked to the goal
fn goal_snapshots<'a>(
    portfolio: &'a Portfolio,
    goal: &FinancialGoal,
    as_of: YearMonth,
) -> (usize, Vec<&'a HoldingHistoryEntry>) {
    let holdings = portfolio.holdings_for_goal(goal.id);
    let snapshots = holdings
        .iter()
        .filter_map(|h| {
            portfolio
                .history_for(h.id)
                .into_iter()
                .rev()
                .find(|e| e.reference <= as_of)
        })
        .collect();
    (holdings.len(), snapshots)
}

fn percent_of(value: Decimal, target: Decimal) -> Result<Decimal, CalcError> {
    value
        .checked_div(target)
        .and_then(|p| p.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(CalcError::Overflow("goal progress"))
}

/// Current value only, for goals whose outlook cannot be built
fn unplanned_progress(
    portfolio: &Portfolio,
    goal: &FinancialGoal,
    as_of: YearMonth,
) -> GoalProgress {
    let (holdings, snapshots) = goal_snapshots(portfolio, goal, as_of);
    let current_value: Decimal = snapshots.iter().map(|e| e.end_of_month_value).sum();
    let progress = if goal.target_value > Decimal::ZERO {
        percent_of(current_value, goal.target_value).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    GoalProgress {
        goal_id: goal.id,
        name: goal.name.clone(),
        target_value: goal.target_value,
        target_date: goal.target_date,
        as_of,
        current_value,
        holdings,
        progress,
        remaining: (goal.target_value - current_value).max(Decimal::ZERO),
        outlook: None,
    }
}

fn build_outlook(
    projections: &GoalProjections,
    target_date: Option<YearMonth>,
    horizon: u32,
) -> Result<PlanOutlook> {
    let months_to_target = projections
        .months_to_target(horizon)
        .map_err(PortfolioError::from)?;
    let expected_completion =
        months_to_target.map(|m| projections.start().plus_months(m as i64));

    let (required_monthly_contribution, on_track) = match target_date {
        Some(date) => {
            let months = projections.start().months_until(date);
            if months <= 0 {
                // Deadline already here: only the current value counts
                (
                    None,
                    Some(projections.initial_value() >= projections.target_value()),
                )
            } else if months > i64::from(MAX_PROJECTION_MONTHS) {
                debug!(
                    "Deadline {} is {} months away, beyond the {} month limit",
                    date, months, MAX_PROJECTION_MONTHS
                );
                (None, None)
            } else {
                let months = months as u32;
                let required = projections
                    .required_monthly_contribution(months)
                    .map_err(PortfolioError::from)?;
                let reached = projections
                    .months_to_target(months)
                    .map_err(PortfolioError::from)?
                    .is_some();
                (Some(required), Some(reached))
            }
        }
        None => (None, None),
    };

    let projection = projections.project(horizon).map_err(PortfolioError::from)?;

    Ok(PlanOutlook {
        start: projections.start(),
        starting_value: projections.initial_value(),
        monthly_contribution: projections.monthly_contribution(),
        monthly_rate: projections.monthly_rate(),
        months_to_target,
        expected_completion,
        required_monthly_contribution,
        on_track,
        projection,
    })
}
