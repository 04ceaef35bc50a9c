use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use carteira::model::{RatePeriod, YearMonth};

pub mod formatters;

#[derive(Parser)]
#[command(name = "carteira")]
#[command(version, about = "Personal investment portfolio tracker")]
#[command(
    long_about = "Track fixed income, variable income and fund holdings from a JSON portfolio file: monthly performance, appreciation net of purchases and sales, and compound projections for savings goals."
)]
pub struct Cli {
    /// Portfolio file (overrides CARTEIRA_PORTFOLIO and the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Config file (defaults to $XDG_CONFIG_HOME/carteira/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the portfolio file for broken references and impossible values
    Validate,

    /// Holdings and their latest snapshot
    Holdings {
        #[command(subcommand)]
        action: HoldingsCommands,
    },

    /// Month-by-month growth and appreciation
    Performance {
        #[command(subcommand)]
        action: PerformanceCommands,
    },

    /// Financial goals, progress and projections
    Goals {
        #[command(subcommand)]
        action: GoalsCommands,
    },

    /// Purchase and sale balances
    Transactions {
        #[command(subcommand)]
        action: TransactionsCommands,
    },

    /// Rate conversions
    Rates {
        #[command(subcommand)]
        action: RatesCommands,
    },
}

#[derive(Subcommand)]
pub enum HoldingsCommands {
    /// List holdings with value, cost basis and allocation
    List {
        /// Filter by category (FIXED_INCOME, VARIABLE_INCOME, INVESTMENT_FUND)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PerformanceCommands {
    /// Show performance for one holding or the whole portfolio
    Show {
        /// Holding id (omit for the whole portfolio)
        #[arg(long)]
        holding: Option<i64>,

        /// First month (YYYY-MM)
        #[arg(long)]
        from: Option<YearMonth>,

        /// Last month (YYYY-MM)
        #[arg(long)]
        to: Option<YearMonth>,
    },
}

#[derive(Subcommand)]
pub enum GoalsCommands {
    /// List goals with their progress
    List {
        /// Evaluate as of this month (YYYY-MM, defaults to the latest history month)
        #[arg(long)]
        as_of: Option<YearMonth>,
    },

    /// Show progress and projection for a goal
    Progress {
        /// Goal id
        id: i64,

        /// Projection horizon in months (defaults to projection_months from config)
        #[arg(short, long)]
        months: Option<u32>,

        /// Evaluate as of this month (YYYY-MM, defaults to the latest history month)
        #[arg(long)]
        as_of: Option<YearMonth>,
    },

    /// Project a plan without a portfolio file
    Simulate {
        /// Starting value
        #[arg(long, default_value = "0")]
        initial: Decimal,

        /// Monthly contribution
        #[arg(long)]
        monthly: Decimal,

        /// Expected return in percent
        #[arg(long, allow_negative_numbers = true)]
        rate: Decimal,

        /// Period the rate applies to (monthly or annual)
        #[arg(long, default_value = "monthly", value_parser = parse_rate_period)]
        period: RatePeriod,

        /// Target value
        #[arg(long)]
        target: Decimal,

        /// Projection horizon in months (defaults to projection_months from config)
        #[arg(short, long)]
        months: Option<u32>,

        /// First month of the plan (YYYY-MM, defaults to the current month)
        #[arg(long)]
        start: Option<YearMonth>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// Show purchases and sales per month
    Balance {
        /// Holding id (omit for every holding)
        #[arg(long)]
        holding: Option<i64>,

        /// First month (YYYY-MM)
        #[arg(long)]
        from: Option<YearMonth>,

        /// Last month (YYYY-MM)
        #[arg(long)]
        to: Option<YearMonth>,
    },
}

#[derive(Subcommand)]
pub enum RatesCommands {
    /// Convert a rate between monthly and annual
    Convert {
        /// Rate in percent (e.g., 1 for 1%)
        #[arg(allow_negative_numbers = true)]
        rate: Decimal,

        /// Period the given rate applies to (monthly or annual)
        #[arg(long, value_parser = parse_rate_period)]
        from: RatePeriod,
    },
}

fn parse_rate_period(s: &str) -> Result<RatePeriod, String> {
    s.parse()
        .map_err(|_| format!("invalid period '{}' (use monthly or annual)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_performance_range() {
        let cli = Cli::try_parse_from([
            "carteira",
            "performance",
            "show",
            "--holding",
            "3",
            "--from",
            "2024-01",
            "--to",
            "2024-06",
        ])
        .unwrap();
        match cli.command {
            Commands::Performance {
                action: PerformanceCommands::Show { holding, from, to },
            } => {
                assert_eq!(holding, Some(3));
                assert_eq!(from.map(|m| m.to_string()).as_deref(), Some("2024-01"));
                assert_eq!(to.map(|m| m.to_string()).as_deref(), Some("2024-06"));
            }
            _ => panic!("expected performance show"),
        }
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let result = Cli::try_parse_from(["carteira", "performance", "show", "--from", "2024-13"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rates_convert_with_negative_rate() {
        let cli =
            Cli::try_parse_from(["carteira", "rates", "convert", "-0.5", "--from", "annual"])
                .unwrap();
        match cli.command {
            Commands::Rates {
                action: RatesCommands::Convert { rate, from },
            } => {
                assert_eq!(rate, Decimal::new(-5, 1));
                assert_eq!(from, RatePeriod::Annual);
            }
            _ => panic!("expected rates convert"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["carteira", "validate", "--json", "--file", "p.json"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.file, Some(PathBuf::from("p.json")));
    }
}
