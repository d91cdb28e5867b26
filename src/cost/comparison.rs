//! Savings between two independently simulated scenarios

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::result::SimulationResult;

/// Deltas of the current scenario minus the new one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Current total cost − new total cost
    pub total_savings: f64,
    /// Total savings spread over the term
    pub monthly_savings: f64,
    /// Current interest − new interest
    pub interest_savings: f64,
    /// Current tax total − new tax total
    pub tax_savings: f64,
    /// Interest savings as a share of current interest, in percentage points
    pub interest_savings_pct: f64,
    /// Share of the current CFT explained by taxes and compounding
    pub current_tax_impact_pct: f64,
    /// Share of the new CFT explained by taxes and compounding
    pub new_tax_impact_pct: f64,
}

/// `(CFT − TNA) / CFT`, both in percentage points; zero when CFT is zero
pub fn tax_impact_pct(cft_pct: f64, tna_pct: f64) -> f64 {
    if cft_pct == 0.0 {
        0.0
    } else {
        (cft_pct - tna_pct) / cft_pct * 100.0
    }
}

/// Compare two valid results over the same term, which may be a fractional
/// number of months
pub fn compare(current: &SimulationResult, new: &SimulationResult, term_months: f64) -> Result<ScenarioComparison> {
    for (label, result) in [("current scenario", current), ("new scenario", new)] {
        if !result.is_valid {
            return Err(SimulationError::invalid(label, "cannot compare an invalid simulation"));
        }
    }
    if !(term_months.is_finite() && term_months > 0.0) {
        return Err(SimulationError::invalid("term", "must be greater than zero"));
    }

    let total_savings = current.summary.total_cost - new.summary.total_cost;
    let interest_savings = current.summary.total_interest - new.summary.total_interest;
    let interest_savings_pct = if current.summary.total_interest > 0.0 {
        interest_savings / current.summary.total_interest * 100.0
    } else {
        0.0
    };

    Ok(ScenarioComparison {
        total_savings,
        monthly_savings: total_savings / term_months,
        interest_savings,
        tax_savings: current.taxes.total - new.taxes.total,
        interest_savings_pct,
        current_tax_impact_pct: tax_impact_pct(
            current.summary.cost_rate_pct,
            current.params.nominal_annual_rate * 100.0,
        ),
        new_tax_impact_pct: tax_impact_pct(
            new.summary.cost_rate_pct,
            new.params.nominal_annual_rate * 100.0,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::AnnualizationStrategy;
    use crate::result::{LoanParameters, LoanSummary, Term};
    use crate::tables::Product;
    use crate::taxes::TaxBreakdown;
    use approx::assert_relative_eq;

    fn result(rate: f64, total_cost: f64, interest: f64, taxes: f64) -> SimulationResult {
        SimulationResult::valid(
            Product::DebtRefinancing,
            LoanParameters::new(1_000.0, rate, Term::Months(12)),
            Vec::new(),
            TaxBreakdown { total: taxes, ..Default::default() },
            LoanSummary {
                installment: 0.0,
                total_interest: interest,
                total_paid: total_cost - taxes,
                total_taxes: taxes,
                total_cost,
                cost_rate_pct: (total_cost / 1_000.0 - 1.0) * 100.0,
                strategy: AnnualizationStrategy::TotalCostOverTerm,
                effective_cft_pct: None,
            },
        )
    }

    #[test]
    fn test_savings() {
        let current = result(0.5, 1_500.0, 400.0, 100.0);
        let new = result(0.1, 1_140.0, 100.0, 40.0);
        let cmp = compare(&current, &new, 12.0).unwrap();

        assert_relative_eq!(cmp.total_savings, 360.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.monthly_savings, 30.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.interest_savings, 300.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.tax_savings, 60.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.interest_savings_pct, 75.0, epsilon = 1e-9);
        assert_relative_eq!(cmp.current_tax_impact_pct, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tax_impact_zero_cft() {
        assert_eq!(tax_impact_pct(0.0, 10.0), 0.0);
        assert_relative_eq!(tax_impact_pct(40.0, 30.0), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_invalid_scenarios() {
        let current = result(0.5, 1_500.0, 400.0, 100.0);
        let invalid = SimulationResult::invalid(
            Product::DebtRefinancing,
            current.params,
            AnnualizationStrategy::TotalCostOverTerm,
            SimulationError::invalid("principal", "must be greater than zero"),
        );
        assert!(compare(&current, &invalid, 12.0).is_err());
        assert!(compare(&current, &current, 0.0).is_err());
    }
}
