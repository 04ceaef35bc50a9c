// Portfolio module - loading the portfolio document and checking its integrity

pub mod validation;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::Portfolio;

pub use validation::{validate_portfolio, ValidationIssue, ValidationReport};

/// Get the default portfolio path (~/.carteira/portfolio.json)
pub fn get_default_portfolio_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".carteira").join("portfolio.json"))
}

/// Read and parse a portfolio JSON document
pub fn load_portfolio(path: &Path) -> Result<Portfolio> {
    info!("Loading portfolio from: {:?}", path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read portfolio file at {:?}", path))?;
    let portfolio = parse_portfolio(&content)
        .with_context(|| format!("Failed to parse portfolio file at {:?}", path))?;

    debug!(
        assets = portfolio.assets.len(),
        holdings = portfolio.holdings.len(),
        history = portfolio.history.len(),
        transactions = portfolio.transactions.len(),
        goals = portfolio.goals.len(),
        "Portfolio loaded"
    );
    Ok(portfolio)
}

/// Parse a portfolio JSON document from text
pub fn parse_portfolio(content: &str) -> Result<Portfolio> {
    let portfolio: Portfolio = serde_json::from_str(content)?;
    Ok(portfolio)
}
