use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::period::YearMonth;
use crate::calc::GrowthRate;
use crate::error::CalcError;

/// Period a rate applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatePeriod {
    #[default]
    Monthly,
    Annual,
}

impl RatePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatePeriod::Monthly => "MONTHLY",
            RatePeriod::Annual => "ANNUAL",
        }
    }
}

impl FromStr for RatePeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" | "MONTH" | "M" | "MENSAL" => Ok(RatePeriod::Monthly),
            "ANNUAL" | "YEARLY" | "YEAR" | "Y" | "A" | "ANUAL" => Ok(RatePeriod::Annual),
            _ => Err(()),
        }
    }
}

/// Expected return rate in percent, for a given period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateAssumption {
    pub rate: Decimal,
    #[serde(default)]
    pub period: RatePeriod,
}

impl RateAssumption {
    pub fn monthly(rate: Decimal) -> Self {
        Self {
            rate,
            period: RatePeriod::Monthly,
        }
    }

    pub fn annual(rate: Decimal) -> Self {
        Self {
            rate,
            period: RatePeriod::Annual,
        }
    }

    /// Equivalent compound monthly rate in percent
    pub fn monthly_rate(&self) -> Result<Decimal, CalcError> {
        match self.period {
            RatePeriod::Monthly => {
                GrowthRate::ensure_valid_rate(self.rate)?;
                Ok(self.rate)
            }
            RatePeriod::Annual => GrowthRate::annual_to_monthly(self.rate),
        }
    }
}

/// Planned contributions toward a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalInvestmentPlan {
    /// Month the plan starts counting from
    pub start: YearMonth,
    pub initial_value: Decimal,
    pub monthly_contribution: Decimal,
    pub expected_return: RateAssumption,
}

/// A savings target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialGoal {
    pub id: i64,
    pub name: String,
    pub target_value: Decimal,
    #[serde(default)]
    pub target_date: Option<YearMonth>,
    #[serde(default)]
    pub plan: Option<GoalInvestmentPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_assumption_passes_through() {
        assert_eq!(RateAssumption::monthly(dec!(0.8)).monthly_rate(), Ok(dec!(0.8)));
    }

    #[test]
    fn test_monthly_assumption_rejects_total_loss() {
        assert!(RateAssumption::monthly(dec!(-100)).monthly_rate().is_err());
    }

    #[test]
    fn test_annual_assumption_converts_to_monthly() {
        let monthly = RateAssumption::annual(dec!(12.682503013196972)).monthly_rate().unwrap();
        assert!((monthly - dec!(1)).abs() < dec!(0.0001), "got {}", monthly);
    }

    #[test]
    fn test_goal_from_json_with_defaults() {
        let json = r#"{
            "id": 1,
            "name": "Reserva de emergência",
            "target_value": "30000",
            "plan": {
                "start": "2024-01",
                "initial_value": "5000",
                "monthly_contribution": "1000",
                "expected_return": {"rate": "0.9"}
            }
        }"#;
        let goal: FinancialGoal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.target_date, None);
        let plan = goal.plan.unwrap();
        assert_eq!(plan.expected_return.period, RatePeriod::Monthly);
        assert_eq!(plan.monthly_contribution, dec!(1000));
    }

    #[test]
    fn test_rate_period_from_str() {
        assert_eq!("annual".parse::<RatePeriod>(), Ok(RatePeriod::Annual));
        assert_eq!("mensal".parse::<RatePeriod>(), Ok(RatePeriod::Monthly));
        assert!("weekly".parse::<RatePeriod>().is_err());
    }
}
