//! Carteira - personal investment portfolio tracker
//!
//! Reads a JSON portfolio document (assets, holdings, monthly history,
//! transactions and savings goals) and computes growth, appreciation,
//! transaction balances and compound goal projections with exact decimal
//! arithmetic.

pub mod calc;
pub mod config;
pub mod error;
pub mod model;
pub mod portfolio;
pub mod reports;
pub mod utils;
