//! Rate conversions between nominal (TNA), periodic and effective annual rates
//!
//! Two annualization strategies are kept distinct:
//! - **Total cost over term**: `(multiplier)^(1/years) - 1`, used for the CFT
//!   of refinancing, express and mortgage simulations
//! - **Monthly compounded**: `(1 + monthly)^12 - 1`, used for the CFTEA of
//!   personal loans where the cost is first reduced to a monthly rate
//!
//! All percentages returned here are in percentage points (25.0 = 25%).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Months in a year for monthly-paid loans
pub const MONTHS_PER_YEAR: u32 = 12;

/// Day-count basis used by Argentine banks for TNA
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Strategy used to turn a cost into an annual percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnualizationStrategy {
    /// `(total cost / principal)^(1/years) - 1`
    TotalCostOverTerm,
    /// `(1 + monthly cost rate)^12 - 1`
    MonthlyCompounded,
}

/// Periodic rate as a simple division of the nominal annual rate.
///
/// `periodic_rate(0.25, 12.0)` is the monthly rate of a 25% TNA loan.
pub fn periodic_rate(nominal_annual_rate: f64, periods_per_year: f64) -> f64 {
    nominal_annual_rate / periods_per_year
}

/// Periodic rate for a single period of `days` days (period factor `days/365`)
pub fn periodic_rate_for_days(nominal_annual_rate: f64, days: u32) -> f64 {
    nominal_annual_rate * days as f64 / DAYS_PER_YEAR
}

/// Annualize a total-cost multiplier over a term in years, as a percentage.
///
/// Rejects a non-positive term and a non-positive multiplier, both of which
/// would otherwise leak NaN or infinity into the result.
pub fn annualize(total_cost_multiplier: f64, term_years: f64) -> Result<f64> {
    if !(term_years.is_finite() && term_years > 0.0) {
        return Err(SimulationError::degenerate(
            "annualize",
            format!("term must be positive, got {} years", term_years),
        ));
    }
    if !(total_cost_multiplier.is_finite() && total_cost_multiplier > 0.0) {
        return Err(SimulationError::degenerate(
            "annualize",
            format!("cost multiplier must be positive, got {}", total_cost_multiplier),
        ));
    }

    finite_percentage("annualize", total_cost_multiplier.powf(1.0 / term_years) - 1.0)
}

/// Compound a monthly cost rate to an annual percentage (CFTEA)
pub fn annualize_from_monthly_rate(monthly_cost_rate: f64) -> Result<f64> {
    if !(monthly_cost_rate.is_finite() && monthly_cost_rate > -1.0) {
        return Err(SimulationError::degenerate(
            "annualize_from_monthly_rate",
            format!("monthly rate must be above -100%, got {}", monthly_cost_rate),
        ));
    }

    finite_percentage(
        "annualize_from_monthly_rate",
        (1.0 + monthly_cost_rate).powi(MONTHS_PER_YEAR as i32) - 1.0,
    )
}

/// Equivalent monthly rate of a total-cost multiplier spread over `months`
pub fn monthly_cost_rate(total_cost_multiplier: f64, months: u32) -> Result<f64> {
    if months == 0 {
        return Err(SimulationError::degenerate("monthly_cost_rate", "term has zero months"));
    }
    if !(total_cost_multiplier.is_finite() && total_cost_multiplier > 0.0) {
        return Err(SimulationError::degenerate(
            "monthly_cost_rate",
            format!("cost multiplier must be positive, got {}", total_cost_multiplier),
        ));
    }

    Ok(total_cost_multiplier.powf(1.0 / months as f64) - 1.0)
}

/// Apply the named strategy.
///
/// For `MonthlyCompounded` the multiplier is first reduced to a monthly rate
/// over `months`; for `TotalCostOverTerm` it is annualized over `months / 12`.
pub fn annualize_with(strategy: AnnualizationStrategy, total_cost_multiplier: f64, months: f64) -> Result<f64> {
    match strategy {
        AnnualizationStrategy::TotalCostOverTerm => {
            annualize(total_cost_multiplier, months / MONTHS_PER_YEAR as f64)
        }
        AnnualizationStrategy::MonthlyCompounded => {
            if !(months.is_finite() && months >= 1.0) || months.fract() != 0.0 {
                return Err(SimulationError::degenerate(
                    "annualize_with",
                    format!("monthly compounding needs a whole number of months, got {}", months),
                ));
            }
            let monthly = monthly_cost_rate(total_cost_multiplier, months as u32)?;
            annualize_from_monthly_rate(monthly)
        }
    }
}

fn finite_percentage(operation: &str, fraction: f64) -> Result<f64> {
    let pct = fraction * 100.0;
    if pct.is_finite() {
        Ok(pct)
    } else {
        Err(SimulationError::degenerate(operation, "result is not a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_periodic_rate() {
        assert_relative_eq!(periodic_rate(0.25, 12.0), 0.0208333, epsilon = 1e-6);
        assert_relative_eq!(periodic_rate_for_days(0.365, 45), 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_annualize_total_cost() {
        // Doubling over one year is 100%
        assert_relative_eq!(annualize(2.0, 1.0).unwrap(), 100.0, epsilon = 1e-9);
        // 1.21 over two years is 10% a year
        assert_relative_eq!(annualize(1.21, 2.0).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annualize_rejects_degenerate_inputs() {
        assert!(annualize(1.5, 0.0).is_err());
        assert!(annualize(1.5, -1.0).is_err());
        assert!(annualize(0.0, 1.0).is_err());
        assert!(annualize(-1.2, 0.5).is_err());
        assert!(annualize(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_annualize_from_monthly_rate() {
        let expected = (1.02_f64.powi(12) - 1.0) * 100.0;
        assert_relative_eq!(annualize_from_monthly_rate(0.02).unwrap(), expected, epsilon = 1e-9);
        assert!(annualize_from_monthly_rate(-1.0).is_err());
    }

    #[test]
    fn test_strategies_answer_different_questions() {
        // Same multiplier over 12 months: both give the same figure
        let a = annualize_with(AnnualizationStrategy::TotalCostOverTerm, 1.3, 12.0).unwrap();
        let b = annualize_with(AnnualizationStrategy::MonthlyCompounded, 1.3, 12.0).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-9);

        // Fractional months only make sense over the term
        assert!(annualize_with(AnnualizationStrategy::TotalCostOverTerm, 1.3, 1.5).is_ok());
        assert!(annualize_with(AnnualizationStrategy::MonthlyCompounded, 1.3, 1.5).is_err());
    }
}
