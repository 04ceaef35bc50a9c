//! Performance command dispatcher implementation

use tracing::info;

use super::{month_range, Context, Outcome};
use crate::cli::{formatters, PerformanceCommands};
use carteira::reports;

pub fn dispatch_performance(action: PerformanceCommands, ctx: &Context) -> Outcome {
    match action {
        PerformanceCommands::Show { holding, from, to } => {
            let portfolio = ctx.portfolio()?;
            let range = month_range(from, to, portfolio.history_span())?;

            let report = match holding {
                Some(id) => {
                    info!("Computing performance for holding {}", id);
                    reports::holding_performance(&portfolio, id, range)?
                }
                None => {
                    info!("Computing portfolio performance");
                    reports::portfolio_performance(&portfolio, range)?
                }
            };

            ctx.emit(&report, formatters::format_performance_table)?;
            Ok(None)
        }
    }
}
