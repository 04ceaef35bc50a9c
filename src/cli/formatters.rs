//! Output formatting module for CLI display
//!
//! Reports are computed by the library; this module only turns them into
//! terminal tables or JSON.

use anyhow::Result;
use carteira::calc::ProjectedGoal;
use carteira::model::{RatePeriod, YearMonth};
use carteira::portfolio::ValidationReport;
use carteira::reports::{
    GoalProgress, GoalSimulation, PerformanceReport, PortfolioOverview, TransactionSummary,
};
use carteira::utils::{format_currency, format_decimal_br, format_optional_percent, format_percent};
use colored::{ColoredString, Colorize};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Pretty JSON for any report; decimals serialize as strings
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn signed(value: Decimal, text: String) -> ColoredString {
    if value >= Decimal::ZERO {
        text.green()
    } else {
        text.red()
    }
}

fn signed_currency(value: Decimal) -> String {
    signed(value, format_currency(value)).to_string()
}

fn signed_percent(value: Option<Decimal>) -> String {
    match value {
        Some(pct) => signed(pct, format_percent(pct)).to_string(),
        None => "N/A".dimmed().to_string(),
    }
}

fn month_or_dash(month: Option<YearMonth>) -> String {
    month
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_holdings_table(overview: &PortfolioOverview) -> String {
    if overview.holdings.is_empty() {
        return format!("{} No holdings found\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Asset")]
        name: String,
        #[tabled(rename = "Type")]
        subtype: String,
        #[tabled(rename = "Brokerage")]
        brokerage: String,
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Cost")]
        cost: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Gain")]
        gain: String,
        #[tabled(rename = "Gain %")]
        gain_pct: String,
    }

    let rows: Vec<HoldingRow> = overview
        .holdings
        .iter()
        .map(|h| HoldingRow {
            id: h.holding_id,
            name: h.name.clone(),
            subtype: h.subtype.to_string(),
            brokerage: h.brokerage.clone().unwrap_or_else(|| "-".to_string()),
            month: month_or_dash(h.reference),
            quantity: format_decimal_br(h.quantity, 2),
            cost: format_currency(h.cost_basis),
            value: format_currency(h.value),
            gain: signed_currency(h.unrealized_gain),
            gain_pct: signed_percent(h.unrealized_gain_pct),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(5..), Alignment::right());

    let mut output = format!("\n{} Holdings\n\n{}\n", "📊".cyan().bold(), table);

    output.push_str(&format!("\n{}", "Allocation".bold()));
    for slice in &overview.allocation {
        output.push_str(&format!(
            "\n  {:<16} {:>18}  {:>8}",
            slice.category.as_str(),
            format_currency(slice.value),
            format_percent(slice.share)
        ));
    }

    output.push_str(&format!(
        "\n\n{:<20} {}",
        "Total Cost:".bold(),
        format_currency(overview.total_cost)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Total Value:".bold(),
        format_currency(overview.total_value).cyan()
    ));
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Unrealized Gain:".bold(),
        signed_currency(overview.total_unrealized_gain)
    ));
    output
}

pub fn format_performance_table(report: &PerformanceReport) -> String {
    if report.rows.is_empty() {
        return format!(
            "{} No history for {} in the selected months\n",
            "ℹ".blue().bold(),
            report.label
        );
    }

    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Growth")]
        growth: String,
        #[tabled(rename = "Purchases")]
        purchases: String,
        #[tabled(rename = "Sales")]
        sales: String,
        #[tabled(rename = "Appreciation")]
        appreciation: String,
        #[tabled(rename = "Apprec. %")]
        appreciation_pct: String,
    }

    let rows: Vec<MonthRow> = report
        .rows
        .iter()
        .map(|r| MonthRow {
            month: r.reference.to_string(),
            value: format_currency(r.value),
            growth: signed_currency(r.growth),
            purchases: format_currency(r.balance.purchases),
            sales: format_currency(r.balance.sales),
            appreciation: signed_currency(r.appreciation),
            appreciation_pct: signed_percent(r.appreciation_pct),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    let mut output = format!(
        "\n{} Performance - {}\n\n{}\n",
        "📈".cyan().bold(),
        report.label,
        table
    );
    output.push_str(&format!(
        "\n  Start Value:       {}",
        format_currency(report.start_value).cyan()
    ));
    output.push_str(&format!(
        "\n  End Value:         {}",
        format_currency(report.end_value).cyan()
    ));
    output.push_str(&format!(
        "\n  Net Contributions: {}",
        format_currency(report.total_balance.net())
    ));
    output.push_str(&format!(
        "\n  Appreciation:      {}",
        signed_currency(report.total_appreciation)
    ));
    output.push_str(&format!(
        "\n  Time-weighted:     {}",
        signed_percent(report.time_weighted_return)
    ));
    output.push_str(&format!(
        "\n  Growth (annual):   {}\n",
        signed_percent(report.annualized_growth_rate)
    ));
    output
}

pub fn format_goals_table(goals: &[GoalProgress]) -> String {
    if goals.is_empty() {
        return format!("{} No goals found\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct GoalRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Goal")]
        name: String,
        #[tabled(rename = "Target")]
        target: String,
        #[tabled(rename = "Deadline")]
        deadline: String,
        #[tabled(rename = "Current")]
        current: String,
        #[tabled(rename = "Progress")]
        progress: String,
        #[tabled(rename = "Reached In")]
        reached_in: String,
        #[tabled(rename = "On Track")]
        on_track: String,
    }

    let rows: Vec<GoalRow> = goals
        .iter()
        .map(|g| {
            let outlook = g.outlook.as_ref();
            GoalRow {
                id: g.goal_id,
                name: g.name.clone(),
                target: format_currency(g.target_value),
                deadline: month_or_dash(g.target_date),
                current: format_currency(g.current_value),
                progress: format_percent(g.progress),
                reached_in: month_or_dash(outlook.and_then(|o| o.expected_completion)),
                on_track: match outlook.and_then(|o| o.on_track) {
                    Some(true) => "yes".green().to_string(),
                    Some(false) => "no".red().to_string(),
                    None => "-".to_string(),
                },
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(2..), Alignment::right());

    format!(
        "\n{} Goals (as of {})\n\n{}\n",
        "🎯".cyan().bold(),
        goals[0].as_of,
        table
    )
}

pub fn format_goal_progress(progress: &GoalProgress) -> String {
    let mut output = format!("\n{} {}\n", "🎯".cyan().bold(), progress.name.bold());
    output.push_str(&format!("\n  As of:     {}", progress.as_of));
    output.push_str(&format!(
        "\n  Target:    {}",
        format_currency(progress.target_value)
    ));
    if let Some(date) = progress.target_date {
        output.push_str(&format!("\n  Deadline:  {}", date));
    }
    output.push_str(&format!(
        "\n  Current:   {} ({} holding(s))",
        format_currency(progress.current_value).cyan(),
        progress.holdings
    ));
    output.push_str(&format!(
        "\n  Progress:  {}",
        format_percent(progress.progress)
    ));
    output.push_str(&format!(
        "\n  Remaining: {}\n",
        format_currency(progress.remaining)
    ));

    let Some(outlook) = &progress.outlook else {
        output.push_str(&format!("\n{} Goal has no investment plan\n", "ℹ".blue().bold()));
        return output;
    };

    output.push_str(&format!("\n{}", "Plan".bold()));
    output.push_str(&format!(
        "\n  From {} with {} plus {}/month at {}/month",
        outlook.start,
        format_currency(outlook.starting_value),
        format_currency(outlook.monthly_contribution),
        format_percent(outlook.monthly_rate)
    ));
    match (outlook.months_to_target, outlook.expected_completion) {
        (Some(months), Some(month)) => output.push_str(&format!(
            "\n  Target reached in {} month(s), {}",
            months,
            month.to_string().green()
        )),
        _ => output.push_str(&format!(
            "\n  {}",
            "Target not reached within the projection horizon".yellow()
        )),
    }
    if let Some(required) = outlook.required_monthly_contribution {
        output.push_str(&format!(
            "\n  Required contribution for the deadline: {}/month",
            format_currency(required)
        ));
    }
    match outlook.on_track {
        Some(true) => output.push_str(&format!("\n  {}", "On track".green().bold())),
        Some(false) => output.push_str(&format!("\n  {}", "Off track".red().bold())),
        None => {}
    }
    output.push('\n');

    if !outlook.projection.is_empty() {
        output.push_str(&format_projection_table(&outlook.projection));
    }
    output
}

pub fn format_simulation(simulation: &GoalSimulation) -> String {
    let mut output = format!("\n{} Plan simulation\n", "🧮".cyan().bold());
    output.push_str(&format!(
        "\n  From {} with {} plus {}/month at {}/month",
        simulation.start,
        format_currency(simulation.initial_value),
        format_currency(simulation.monthly_contribution),
        format_percent(simulation.monthly_rate)
    ));
    output.push_str(&format!(
        "\n  Target:      {}",
        format_currency(simulation.target_value)
    ));
    output.push_str(&format!(
        "\n  Final value: {} after {} month(s)",
        format_currency(simulation.final_value).cyan(),
        simulation.projection.len()
    ));
    match (simulation.months_to_target, simulation.expected_completion) {
        (Some(months), Some(month)) => output.push_str(&format!(
            "\n  Target reached in {} month(s), {}\n",
            months,
            month.to_string().green()
        )),
        _ => output.push_str(&format!(
            "\n  {}\n",
            "Target not reached within the projection horizon".yellow()
        )),
    }
    output.push_str(&format_projection_table(&simulation.projection));
    output
}

/// Yearly milestones of a projection, plus its last month
pub fn format_projection_table(series: &[ProjectedGoal]) -> String {
    #[derive(Tabled)]
    struct ProjectionRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "#")]
        index: u32,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Contributed")]
        contributed: String,
        #[tabled(rename = "Return")]
        total_return: String,
        #[tabled(rename = "Progress")]
        progress: String,
    }

    let last_index = series.last().map(|p| p.month_index).unwrap_or_default();
    let rows: Vec<ProjectionRow> = series
        .iter()
        .filter(|p| p.month_index % 12 == 0 || p.month_index == last_index)
        .map(|p| ProjectionRow {
            month: p.reference.to_string(),
            index: p.month_index,
            value: format_currency(p.value),
            contributed: format_currency(p.total_contributed),
            total_return: signed_currency(p.total_return),
            progress: if p.reached() {
                format_percent(p.progress).green().to_string()
            } else {
                format_percent(p.progress)
            },
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    format!("\n{}\n", table)
}

pub fn format_transaction_summary(summary: &TransactionSummary) -> String {
    if summary.months.is_empty() {
        return format!("{} No transactions found\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct BalanceRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Purchases")]
        purchases: String,
        #[tabled(rename = "#")]
        purchase_count: usize,
        #[tabled(rename = "Sales")]
        sales: String,
        #[tabled(rename = "#")]
        sale_count: usize,
        #[tabled(rename = "Net")]
        net: String,
    }

    let rows: Vec<BalanceRow> = summary
        .months
        .iter()
        .map(|m| BalanceRow {
            month: m.reference.to_string(),
            purchases: format_currency(m.balance.purchases),
            purchase_count: m.balance.purchase_count,
            sales: format_currency(m.balance.sales),
            sale_count: m.balance.sale_count,
            net: signed_currency(m.balance.net()),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    let scope = match summary.holding_id {
        Some(id) => format!("holding {}", id),
        None => "all holdings".to_string(),
    };
    let mut output = format!(
        "\n{} Transactions - {}\n\n{}\n",
        "💰".cyan().bold(),
        scope,
        table
    );
    output.push_str(&format!(
        "\n  Purchases: {} ({})",
        format_currency(summary.total.purchases).green(),
        summary.total.purchase_count
    ));
    output.push_str(&format!(
        "\n  Sales:     {} ({})",
        format_currency(summary.total.sales).red(),
        summary.total.sale_count
    ));
    output.push_str(&format!(
        "\n  Net:       {}\n",
        format_currency(summary.total.net()).cyan()
    ));
    output
}

pub fn format_validation_report(report: &ValidationReport) -> String {
    if !report.has_issues() {
        return format!("{} Portfolio is consistent\n", "✓".green().bold());
    }

    let mut output = format!(
        "{} Found {} issue(s)\n",
        "⚠".yellow().bold(),
        report.issues.len()
    );
    for issue in &report.issues {
        let id = issue
            .id
            .map(|id| format!(" {}", id))
            .unwrap_or_default();
        output.push_str(&format!(
            "\n  {}{} {}: {}",
            issue.entity.bold(),
            id,
            issue.field.cyan(),
            issue.reason
        ));
        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!("\n      {}", suggestion.dimmed()));
        }
    }

    output.push_str(&format!("\n\n{}", "By entity".bold()));
    for (entity, count) in report.issue_summary() {
        output.push_str(&format!("\n  {:<14} {}", entity, count));
    }
    output.push('\n');
    output
}

pub fn format_rate_conversion(rate: Decimal, from: RatePeriod, converted: Decimal) -> String {
    let (from_label, to_label) = match from {
        RatePeriod::Monthly => ("monthly", "annual"),
        RatePeriod::Annual => ("annual", "monthly"),
    };
    format!(
        "{} {} = {} {}\n",
        format_percent(rate),
        from_label,
        format_optional_percent(Some(converted)).cyan(),
        to_label
    )
}
