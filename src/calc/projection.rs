use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

use super::rate::GrowthRate;
use crate::error::{ensure_non_negative, CalcError};
use crate::model::{GoalInvestmentPlan, YearMonth};

/// Default projection horizon (10 years)
pub const DEFAULT_PROJECTION_MONTHS: u32 = 120;

/// Longest horizon accepted by a projection (50 years)
pub const MAX_PROJECTION_MONTHS: u32 = 600;

/// Projected state of a goal at the end of one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedGoal {
    /// 1 for the first projected month
    pub month_index: u32,
    pub reference: YearMonth,
    pub value: Decimal,
    pub total_contributed: Decimal,
    /// Value earned on top of contributions
    pub total_return: Decimal,
    /// Value as a percentage of the target
    pub progress: Decimal,
}

impl ProjectedGoal {
    pub fn reached(&self) -> bool {
        self.progress >= Decimal::ONE_HUNDRED
    }
}

/// Compound monthly projection of a goal.
///
/// Each month the accumulated value earns the monthly rate and the monthly
/// contribution is added at month end:
/// `value(n) = value(n - 1) * (1 + r) + contribution`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalProjections {
    start: YearMonth,
    initial_value: Decimal,
    monthly_contribution: Decimal,
    /// Percent per month
    monthly_rate: Decimal,
    target_value: Decimal,
}

impl GoalProjections {
    pub fn new(plan: &GoalInvestmentPlan, target_value: Decimal) -> Result<Self, CalcError> {
        let monthly_rate = plan.expected_return.monthly_rate()?;
        Self::from_parts(
            plan.start,
            plan.initial_value,
            plan.monthly_contribution,
            monthly_rate,
            target_value,
        )
    }

    pub fn from_parts(
        start: YearMonth,
        initial_value: Decimal,
        monthly_contribution: Decimal,
        monthly_rate: Decimal,
        target_value: Decimal,
    ) -> Result<Self, CalcError> {
        ensure_non_negative("initial value", initial_value)?;
        ensure_non_negative("monthly contribution", monthly_contribution)?;
        GrowthRate::ensure_valid_rate(monthly_rate)?;
        if target_value <= Decimal::ZERO {
            return Err(CalcError::ZeroBase {
                field: "target value",
                value: target_value,
            });
        }

        Ok(Self {
            start,
            initial_value,
            monthly_contribution,
            monthly_rate,
            target_value,
        })
    }

    /// Same plan, restarted from a different month and value
    pub fn rebased(&self, start: YearMonth, initial_value: Decimal) -> Result<Self, CalcError> {
        Self::from_parts(
            start,
            initial_value,
            self.monthly_contribution,
            self.monthly_rate,
            self.target_value,
        )
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn initial_value(&self) -> Decimal {
        self.initial_value
    }

    pub fn monthly_contribution(&self) -> Decimal {
        self.monthly_contribution
    }

    pub fn monthly_rate(&self) -> Decimal {
        self.monthly_rate
    }

    pub fn target_value(&self) -> Decimal {
        self.target_value
    }

    fn factor(&self) -> Decimal {
        Decimal::ONE + self.monthly_rate / Decimal::ONE_HUNDRED
    }

    fn progress_of(&self, value: Decimal) -> Result<Decimal, CalcError> {
        value
            .checked_div(self.target_value)
            .and_then(|p| p.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(CalcError::Overflow("goal progress"))
    }

    /// Month-by-month series over `months` months
    pub fn project(&self, months: u32) -> Result<Vec<ProjectedGoal>, CalcError> {
        check_horizon(months)?;

        let factor = self.factor();
        let mut value = self.initial_value;
        let mut contributed = self.initial_value;
        let mut series = Vec::with_capacity(months as usize);

        for month_index in 1..=months {
            value = value
                .checked_mul(factor)
                .and_then(|v| v.checked_add(self.monthly_contribution))
                .ok_or(CalcError::Overflow("goal projection"))?;
            contributed = contributed
                .checked_add(self.monthly_contribution)
                .ok_or(CalcError::Overflow("goal contributions"))?;
            let total_return = value
                .checked_sub(contributed)
                .ok_or(CalcError::Overflow("goal return"))?;

            series.push(ProjectedGoal {
                month_index,
                reference: self.start.plus_months(month_index as i64),
                value,
                total_contributed: contributed,
                total_return,
                progress: self.progress_of(value)?,
            });
        }

        Ok(series)
    }

    /// First month the projected value reaches the target, within `limit` months.
    ///
    /// `Some(0)` when the initial value already meets the target.
    pub fn months_to_target(&self, limit: u32) -> Result<Option<u32>, CalcError> {
        check_horizon(limit)?;
        if self.initial_value >= self.target_value {
            return Ok(Some(0));
        }
        // Nothing is added and nothing grows
        if self.monthly_contribution.is_zero() && self.monthly_rate <= Decimal::ZERO {
            return Ok(None);
        }

        let factor = self.factor();
        let mut value = self.initial_value;
        for month_index in 1..=limit {
            value = value
                .checked_mul(factor)
                .and_then(|v| v.checked_add(self.monthly_contribution))
                .ok_or(CalcError::Overflow("goal projection"))?;
            if value >= self.target_value {
                return Ok(Some(month_index));
            }
        }
        Ok(None)
    }

    /// Closed-form value after `months` months
    pub fn final_value(&self, months: u32) -> Result<Decimal, CalcError> {
        if months == 0 {
            return Ok(self.initial_value);
        }
        check_horizon(months)?;

        let rate = self.monthly_rate / Decimal::ONE_HUNDRED;
        if rate.is_zero() {
            return self
                .monthly_contribution
                .checked_mul(Decimal::from(months))
                .and_then(|c| c.checked_add(self.initial_value))
                .ok_or(CalcError::Overflow("final value"));
        }

        let growth = self.compounded(months)?;
        let from_initial = self
            .initial_value
            .checked_mul(growth)
            .ok_or(CalcError::Overflow("final value"))?;
        let from_contributions = self
            .monthly_contribution
            .checked_mul((growth - Decimal::ONE) / rate)
            .ok_or(CalcError::Overflow("final value"))?;
        from_initial
            .checked_add(from_contributions)
            .ok_or(CalcError::Overflow("final value"))
    }

    /// Monthly contribution needed to reach the target in exactly `months` months.
    ///
    /// Zero when the initial value alone gets there.
    pub fn required_monthly_contribution(&self, months: u32) -> Result<Decimal, CalcError> {
        check_horizon(months)?;

        let rate = self.monthly_rate / Decimal::ONE_HUNDRED;
        let required = if rate.is_zero() {
            (self.target_value - self.initial_value) / Decimal::from(months)
        } else {
            let growth = self.compounded(months)?;
            let shortfall = self.target_value
                - self
                    .initial_value
                    .checked_mul(growth)
                    .ok_or(CalcError::Overflow("required contribution"))?;
            shortfall
                .checked_mul(rate)
                .and_then(|s| s.checked_div(growth - Decimal::ONE))
                .ok_or(CalcError::Overflow("required contribution"))?
        };

        Ok(required.max(Decimal::ZERO))
    }

    fn compounded(&self, months: u32) -> Result<Decimal, CalcError> {
        self.factor()
            .checked_powi(months as i64)
            .ok_or(CalcError::Overflow("compound factor"))
    }
}

fn check_horizon(months: u32) -> Result<(), CalcError> {
    if months == 0 || months > MAX_PROJECTION_MONTHS {
        return Err(CalcError::InvalidPeriod(format!(
            "projection horizon must be between 1 and {} months (got {})",
            MAX_PROJECTION_MONTHS, months
        )));
    }
    Ok(())
}
