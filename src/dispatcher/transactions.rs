//! Transaction balance command dispatcher

use anyhow::Result;

use super::{month_range, Context, Outcome};
use crate::cli::{formatters, TransactionsCommands};
use carteira::model::{MonthRange, Portfolio, YearMonth};
use carteira::reports;

pub fn dispatch_transactions(action: TransactionsCommands, ctx: &Context) -> Outcome {
    match action {
        TransactionsCommands::Balance { holding, from, to } => {
            let portfolio = ctx.portfolio()?;
            let range = month_range(from, to, transaction_span(&portfolio)?)?;
            let summary = reports::transaction_summary(&portfolio, holding, range)?;

            ctx.emit(&summary, formatters::format_transaction_summary)?;
            Ok(None)
        }
    }
}

/// Months between the first and last transaction
fn transaction_span(portfolio: &Portfolio) -> Result<Option<MonthRange>> {
    let months = || portfolio.transactions.iter().map(|t| YearMonth::from_date(t.date));
    match (months().min(), months().max()) {
        (Some(first), Some(last)) => Ok(Some(MonthRange::new(first, last)?)),
        _ => Ok(None),
    }
}
