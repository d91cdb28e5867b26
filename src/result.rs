//! Loan parameters and simulation result records

use log::warn;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationRow;
use crate::conversion::{AnnualizationStrategy, DAYS_PER_YEAR, MONTHS_PER_YEAR};
use crate::error::{require_non_negative, require_positive, Result, SimulationError};
use crate::tables::Product;
use crate::taxes::TaxBreakdown;

/// Loan term in the unit the product is quoted in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Months(u32),
    /// May be fractional as long as it is a whole number of months
    Years(f64),
    Days(u32),
}

impl Term {
    /// Term in years
    pub fn years(&self) -> f64 {
        match *self {
            Term::Months(m) => m as f64 / MONTHS_PER_YEAR as f64,
            Term::Years(y) => y,
            Term::Days(d) => d as f64 / DAYS_PER_YEAR,
        }
    }

    /// Term as a whole number of monthly periods
    pub fn months(&self) -> Result<u32> {
        match *self {
            Term::Months(m) if m > 0 => Ok(m),
            Term::Years(y) if y.is_finite() && y > 0.0 => {
                let months = y * MONTHS_PER_YEAR as f64;
                let rounded = months.round();
                if (months - rounded).abs() > 1e-9 || rounded < 1.0 {
                    return Err(SimulationError::invalid(
                        "term",
                        format!("{} years is not a whole number of months", y),
                    ));
                }
                Ok(rounded as u32)
            }
            Term::Days(_) => Err(SimulationError::invalid("term", "a term in days has no monthly periods")),
            _ => Err(SimulationError::invalid("term", "must be greater than zero")),
        }
    }

    /// Term in months, fractional when the years do not divide evenly
    pub fn fractional_months(&self) -> Result<f64> {
        match *self {
            Term::Months(m) if m > 0 => Ok(m as f64),
            Term::Years(y) if y.is_finite() && y > 0.0 => Ok(y * MONTHS_PER_YEAR as f64),
            Term::Days(_) => Err(SimulationError::invalid("term", "a term in days has no monthly periods")),
            _ => Err(SimulationError::invalid("term", "must be greater than zero")),
        }
    }

    pub fn is_positive(&self) -> bool {
        match *self {
            Term::Months(m) => m > 0,
            Term::Years(y) => y.is_finite() && y > 0.0,
            Term::Days(d) => d > 0,
        }
    }
}

/// Principal, nominal annual rate (fraction) and term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: f64,
    /// TNA as a fraction (0.25 = 25%)
    pub nominal_annual_rate: f64,
    pub term: Term,
}

impl LoanParameters {
    pub fn new(principal: f64, nominal_annual_rate: f64, term: Term) -> Self {
        Self {
            principal,
            nominal_annual_rate,
            term,
        }
    }

    /// Check principal > 0, rate ≥ 0, term > 0
    pub fn validate(&self) -> Result<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("nominal annual rate", self.nominal_annual_rate)?;
        if !self.term.is_positive() {
            return Err(SimulationError::invalid("term", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Derived scalars of one loan scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    /// Constant installment (or the single repayment of a balloon loan)
    pub installment: f64,
    pub total_interest: f64,
    /// Sum of installments, before taxes
    pub total_paid: f64,
    pub total_taxes: f64,
    /// Installments plus taxes
    pub total_cost: f64,
    /// CFT or CFTEA in percentage points, depending on `strategy`
    pub cost_rate_pct: f64,
    pub strategy: AnnualizationStrategy,
    /// IRR of the borrower's cashflows, annualized, in percentage points
    #[serde(default)]
    pub effective_cft_pct: Option<f64>,
}

impl LoanSummary {
    fn zeroed(strategy: AnnualizationStrategy) -> Self {
        Self {
            installment: 0.0,
            total_interest: 0.0,
            total_paid: 0.0,
            total_taxes: 0.0,
            total_cost: 0.0,
            cost_rate_pct: 0.0,
            strategy,
            effective_cft_pct: None,
        }
    }
}

/// Outcome of one loan simulation.
///
/// Created fresh on every run. Invalid results carry the error and zeroed
/// scalars so callers never format NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub product: Product,
    pub params: LoanParameters,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SimulationError>,
    pub schedule: Vec<AmortizationRow>,
    pub taxes: TaxBreakdown,
    pub summary: LoanSummary,
}

impl SimulationResult {
    pub fn valid(
        product: Product,
        params: LoanParameters,
        schedule: Vec<AmortizationRow>,
        taxes: TaxBreakdown,
        summary: LoanSummary,
    ) -> Self {
        Self {
            product,
            params,
            is_valid: true,
            error: None,
            schedule,
            taxes,
            summary,
        }
    }

    pub fn invalid(
        product: Product,
        params: LoanParameters,
        strategy: AnnualizationStrategy,
        error: SimulationError,
    ) -> Self {
        warn!("{} simulation rejected: {}", product.name(), error);
        Self {
            product,
            params,
            is_valid: false,
            error: Some(error),
            schedule: Vec::new(),
            taxes: TaxBreakdown::default(),
            summary: LoanSummary::zeroed(strategy),
        }
    }

    /// Fold a fallible computation into a result record
    pub fn from_outcome(
        product: Product,
        params: LoanParameters,
        strategy: AnnualizationStrategy,
        outcome: Result<SimulationResult>,
    ) -> Self {
        outcome.unwrap_or_else(|err| Self::invalid(product, params, strategy, err))
    }

    /// User-facing message for an invalid result
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(|err| {
            if err.is_over_limit() {
                err.to_string()
            } else {
                "invalid data".to_string()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_conversions() {
        assert_eq!(Term::Years(5.0).months().unwrap(), 60);
        assert_eq!(Term::Years(2.5).months().unwrap(), 30);
        assert!(Term::Years(1.01).months().is_err());
        assert_eq!(Term::Years(2.5).fractional_months().unwrap(), 30.0);
        assert!((Term::Years(1.3).fractional_months().unwrap() - 15.6).abs() < 1e-12);
        assert!(Term::Years(-1.0).fractional_months().is_err());
        assert!(Term::Months(0).months().is_err());
        assert!(Term::Days(45).months().is_err());
        assert!((Term::Days(365).years() - 1.0).abs() < 1e-12);
        assert!((Term::Months(18).years() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(LoanParameters::new(1_000.0, 0.0, Term::Months(12)).validate().is_ok());
        assert!(LoanParameters::new(0.0, 0.1, Term::Months(12)).validate().is_err());
        assert!(LoanParameters::new(1_000.0, -0.1, Term::Months(12)).validate().is_err());
        assert!(LoanParameters::new(1_000.0, 0.1, Term::Years(0.0)).validate().is_err());
    }

    #[test]
    fn test_invalid_result_messages() {
        let params = LoanParameters::new(2_000_000.0, 0.5, Term::Days(45));
        let over = SimulationResult::invalid(
            Product::Express,
            params,
            AnnualizationStrategy::TotalCostOverTerm,
            SimulationError::over_limit("express", 1_000_000.0),
        );
        assert!(!over.is_valid);
        assert!(over.message().unwrap().starts_with("maximum amount is"));
        assert_eq!(over.summary.cost_rate_pct, 0.0);

        let bad = SimulationResult::invalid(
            Product::Express,
            params,
            AnnualizationStrategy::TotalCostOverTerm,
            SimulationError::invalid("principal", "must be greater than zero"),
        );
        assert_eq!(bad.message().as_deref(), Some("invalid data"));
    }
}
