//! Goals command dispatcher: progress of portfolio goals and ad-hoc simulations

use chrono::Local;
use tracing::info;

use super::{Context, Outcome};
use crate::cli::{formatters, GoalsCommands};
use carteira::calc::GoalProjections;
use carteira::model::{Portfolio, RateAssumption, YearMonth};
use carteira::reports;

fn current_month() -> YearMonth {
    YearMonth::from_date(Local::now().date_naive())
}

/// Latest month with history, so progress matches the newest snapshots
fn default_as_of(portfolio: &Portfolio) -> YearMonth {
    portfolio
        .history_span()
        .map(|span| span.end())
        .unwrap_or_else(current_month)
}

pub fn dispatch_goals(action: GoalsCommands, ctx: &Context) -> Outcome {
    match action {
        GoalsCommands::List { as_of } => {
            let portfolio = ctx.portfolio()?;
            let as_of = as_of.unwrap_or_else(|| default_as_of(&portfolio));
            let goals =
                reports::all_goal_progress(&portfolio, as_of, ctx.config.projection_months)?;

            ctx.emit(&goals, |g| formatters::format_goals_table(g))?;
            Ok(None)
        }
        GoalsCommands::Progress { id, months, as_of } => {
            let portfolio = ctx.portfolio()?;
            let as_of = as_of.unwrap_or_else(|| default_as_of(&portfolio));
            let horizon = months.unwrap_or(ctx.config.projection_months);
            info!("Goal {} progress as of {} over {} months", id, as_of, horizon);

            let progress = reports::goal_progress(&portfolio, id, as_of, horizon)?;
            ctx.emit(&progress, formatters::format_goal_progress)?;
            Ok(None)
        }
        GoalsCommands::Simulate {
            initial,
            monthly,
            rate,
            period,
            target,
            months,
            start,
        } => {
            let assumption = RateAssumption { rate, period };
            let projections = GoalProjections::from_parts(
                start.unwrap_or_else(current_month),
                initial,
                monthly,
                assumption.monthly_rate()?,
                target,
            )?;
            let horizon = months.unwrap_or(ctx.config.projection_months);

            let simulation = reports::simulate_plan(&projections, horizon)?;
            ctx.emit(&simulation, formatters::format_simulation)?;
            Ok(None)
        }
    }
}
