//! Holdings command dispatcher

use anyhow::anyhow;
use carteira::model::AssetCategory;
use carteira::reports;

use super::{Context, Outcome};
use crate::cli::{formatters, HoldingsCommands};

pub fn dispatch_holdings(action: HoldingsCommands, ctx: &Context) -> Outcome {
    match action {
        HoldingsCommands::List { category } => {
            let category = category
                .map(|c| {
                    c.parse::<AssetCategory>().map_err(|_| {
                        anyhow!(
                            "Invalid category '{}'. Use FIXED_INCOME, VARIABLE_INCOME or INVESTMENT_FUND",
                            c
                        )
                    })
                })
                .transpose()?;

            let portfolio = ctx.portfolio()?;
            let mut overview = reports::portfolio_overview(&portfolio)?;
            if let Some(category) = category {
                // Totals and allocation stay portfolio-wide
                overview.holdings.retain(|h| h.category == category);
            }

            ctx.emit(&overview, formatters::format_holdings_table)?;
            Ok(None)
        }
    }
}
