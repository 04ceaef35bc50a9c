// Calculation module - goal projections, growth, appreciation and balances
//
// Everything here is pure: inputs are validated and returned as CalcError,
// nothing touches files or the clock.

pub mod balance;
pub mod growth;
pub mod projection;
pub mod rate;

pub use balance::TransactionBalance;
pub use growth::{Appreciation, Growth};
pub use projection::{
    GoalProjections, ProjectedGoal, DEFAULT_PROJECTION_MONTHS, MAX_PROJECTION_MONTHS,
};
pub use rate::GrowthRate;
