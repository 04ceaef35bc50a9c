// Reports module - performance, goal progress, transaction balances and holdings overview

pub mod goals;
pub mod performance;
pub mod portfolio;
pub mod transactions;

pub use goals::{
    all_goal_progress, goal_progress, simulate_plan, GoalProgress, GoalSimulation, PlanOutlook,
};
pub use performance::{holding_performance, portfolio_performance, PerformanceReport, PerformanceRow};
pub use portfolio::{portfolio_overview, CategoryAllocation, HoldingOverview, PortfolioOverview};
pub use transactions::{transaction_summary, MonthlyBalance, TransactionSummary};
