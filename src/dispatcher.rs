//! Command dispatcher that routes parsed clap commands to their handlers.
//!
//! Handlers load the portfolio lazily so commands that do not need a file
//! (`goals simulate`, `rates convert`) work without one.

mod goals;
mod holdings;
mod performance;
mod transactions;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

use crate::cli::{formatters, Cli, Commands, RatesCommands};
use carteira::calc::GrowthRate;
use carteira::config::{Config, PORTFOLIO_ENV_VAR};
use carteira::model::{MonthRange, Portfolio, RatePeriod, YearMonth};
use carteira::portfolio::{load_portfolio, validate_portfolio};

/// Settings shared by every handler
pub struct Context {
    pub json: bool,
    pub config: Config,
    file: Option<PathBuf>,
}

impl Context {
    pub fn new(json: bool, config: Config, file: Option<PathBuf>) -> Self {
        Self { json, config, file }
    }

    /// Load the portfolio file resolved from flag, env var or config
    pub fn portfolio(&self) -> Result<Portfolio> {
        let path = self.config.resolve_portfolio_path(self.file.as_deref())?;
        if !path.exists() {
            bail!(
                "Portfolio file not found at {:?}\nPass --file <PATH>, set {} or add portfolio_file to the config file",
                path,
                PORTFOLIO_ENV_VAR
            );
        }
        load_portfolio(&path)
    }

    /// Print a report as JSON or through its table formatter
    pub fn emit<T: serde::Serialize>(&self, report: &T, table: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", formatters::to_json(report)?);
        } else {
            print!("{}", table(report));
        }
        Ok(())
    }
}

/// Route a parsed command line to its handler
pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    debug!("Using config: {:?}", config);
    let ctx = Context::new(cli.json, config, cli.file);

    let outcome = match cli.command {
        Commands::Validate => dispatch_validate(&ctx),
        Commands::Holdings { action } => holdings::dispatch_holdings(action, &ctx),
        Commands::Performance { action } => performance::dispatch_performance(action, &ctx),
        Commands::Goals { action } => goals::dispatch_goals(action, &ctx),
        Commands::Transactions { action } => transactions::dispatch_transactions(action, &ctx),
        Commands::Rates { action } => dispatch_rates(action, &ctx),
    };
    outcome.map(|code| code.unwrap_or(ExitCode::SUCCESS))
}

/// `Ok(None)` is a normal exit; `Ok(Some(code))` carries a non-error failure
pub type Outcome = Result<Option<ExitCode>>;

fn dispatch_validate(ctx: &Context) -> Outcome {
    let portfolio = ctx.portfolio()?;
    let report = validate_portfolio(&portfolio);
    info!("Validation finished with {} issue(s)", report.issues.len());

    ctx.emit(&report, formatters::format_validation_report)?;
    Ok(report.has_issues().then_some(ExitCode::FAILURE))
}

fn dispatch_rates(action: RatesCommands, ctx: &Context) -> Outcome {
    match action {
        RatesCommands::Convert { rate, from } => {
            let converted = match from {
                RatePeriod::Monthly => GrowthRate::monthly_to_annual(rate)?,
                RatePeriod::Annual => GrowthRate::annual_to_monthly(rate)?,
            };

            if ctx.json {
                let to = match from {
                    RatePeriod::Monthly => RatePeriod::Annual,
                    RatePeriod::Annual => RatePeriod::Monthly,
                };
                let payload = serde_json::json!({
                    "rate": rate,
                    "from": from,
                    "to": to,
                    "converted": converted,
                });
                println!("{}", formatters::to_json(&payload)?);
            } else {
                print!("{}", formatters::format_rate_conversion(rate, from, converted));
            }
            Ok(None)
        }
    }
}

/// Build an inclusive month range from optional bounds.
///
/// A missing bound falls back to `span` (the months that have data) so
/// `--from` alone means "from this month on".
pub fn month_range(
    from: Option<YearMonth>,
    to: Option<YearMonth>,
    span: Option<MonthRange>,
) -> Result<Option<MonthRange>> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }
    let end = to.or_else(|| span.map(|s| s.end().max(from.unwrap_or(s.end()))));
    let start = from.or_else(|| span.map(|s| s.start().min(to.unwrap_or(s.start()))));

    match (start.or(end), end.or(start)) {
        (Some(start), Some(end)) => Ok(Some(MonthRange::new(start, end)?)),
        _ => Ok(None),
    }
}
