use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{ensure_non_negative, CalcError};

/// Rate conversions between compounding periods.
///
/// All rates are in percent units: `1` means 1%.
pub struct GrowthRate;

impl GrowthRate {
    /// A rate at or below -100% would wipe out (or invert) the principal
    pub fn ensure_valid_rate(rate: Decimal) -> Result<(), CalcError> {
        if rate <= -Decimal::ONE_HUNDRED {
            return Err(CalcError::RateOutOfRange(rate));
        }
        Ok(())
    }

    /// Multiplicative growth factor of a percent rate: `1 + rate / 100`
    pub fn factor(rate: Decimal) -> Result<Decimal, CalcError> {
        Self::ensure_valid_rate(rate)?;
        Ok(Decimal::ONE + rate / Decimal::ONE_HUNDRED)
    }

    /// Annual rate equivalent to compounding `monthly` for 12 months
    ///
    /// # Examples
    /// ```
    /// use carteira::calc::GrowthRate;
    /// use rust_decimal_macros::dec;
    ///
    /// let annual = GrowthRate::monthly_to_annual(dec!(1)).unwrap();
    /// assert_eq!(annual.round_dp(4), dec!(12.6825));
    /// ```
    pub fn monthly_to_annual(monthly: Decimal) -> Result<Decimal, CalcError> {
        Self::compound_periods(monthly, 12)
    }

    /// Monthly rate that compounds to `annual` over 12 months
    pub fn annual_to_monthly(annual: Decimal) -> Result<Decimal, CalcError> {
        let factor = Self::factor(annual)?;
        let monthly_factor = nth_root(factor, 12)?;
        Ok((monthly_factor - Decimal::ONE) * Decimal::ONE_HUNDRED)
    }

    /// Rate accumulated by compounding `rate` over `periods` periods
    pub fn compound_periods(rate: Decimal, periods: u32) -> Result<Decimal, CalcError> {
        let factor = Self::factor(rate)?;
        let total = factor
            .checked_powi(periods as i64)
            .ok_or(CalcError::Overflow("compound rate"))?;
        Ok((total - Decimal::ONE) * Decimal::ONE_HUNDRED)
    }

    /// Per-period compound growth rate (CAGR) taking `start` to `end` in `periods` steps
    pub fn compound(start: Decimal, end: Decimal, periods: u32) -> Result<Decimal, CalcError> {
        if start <= Decimal::ZERO {
            return Err(CalcError::ZeroBase {
                field: "start value",
                value: start,
            });
        }
        ensure_non_negative("end value", end)?;
        if periods == 0 {
            return Err(CalcError::InvalidPeriod(
                "compound growth needs at least one period".to_string(),
            ));
        }
        if end.is_zero() {
            return Ok(-Decimal::ONE_HUNDRED);
        }

        let ratio = end / start;
        let per_period = nth_root(ratio, periods)?;
        Ok((per_period - Decimal::ONE) * Decimal::ONE_HUNDRED)
    }

    /// Plain percentage change from `start` to `end`
    pub fn simple(start: Decimal, end: Decimal) -> Result<Decimal, CalcError> {
        if start <= Decimal::ZERO {
            return Err(CalcError::ZeroBase {
                field: "start value",
                value: start,
            });
        }
        ensure_non_negative("end value", end)?;
        Ok((end - start) / start * Decimal::ONE_HUNDRED)
    }
}

fn nth_root(value: Decimal, n: u32) -> Result<Decimal, CalcError> {
    if n == 1 || value == Decimal::ONE {
        return Ok(value);
    }
    value
        .checked_powd(Decimal::ONE / Decimal::from(n))
        .ok_or(CalcError::Overflow("root"))
}
