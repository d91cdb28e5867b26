//! Total financial cost (CFT / CFTEA) of a loan

use serde::{Deserialize, Serialize};

use crate::conversion::{annualize, annualize_with, AnnualizationStrategy};
use crate::error::{require_non_negative, require_positive, Result};
use crate::taxes::TaxBreakdown;

/// Total cost and its annualized rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostOfCredit {
    /// Installments plus taxes
    pub total_cost: f64,
    /// Annualized cost in percentage points
    pub rate_pct: f64,
    pub strategy: AnnualizationStrategy,
}

/// CFT over the whole term: `(total cost / principal)^(1/years) - 1`
pub fn build_cft(
    total_installment_payments: f64,
    taxes: &TaxBreakdown,
    principal: f64,
    term_years: f64,
) -> Result<CostOfCredit> {
    require_positive("principal", principal)?;
    require_non_negative("total installment payments", total_installment_payments)?;

    let total_cost = total_installment_payments + taxes.total;
    let rate_pct = annualize(total_cost / principal, term_years)?;

    Ok(CostOfCredit {
        total_cost,
        rate_pct,
        strategy: AnnualizationStrategy::TotalCostOverTerm,
    })
}

/// CFTEA from a total cost spread over `months` and compounded monthly
pub fn build_cftea(total_cost: f64, principal: f64, months: u32) -> Result<CostOfCredit> {
    require_positive("principal", principal)?;
    require_non_negative("total cost", total_cost)?;

    let rate_pct = annualize_with(
        AnnualizationStrategy::MonthlyCompounded,
        total_cost / principal,
        months as f64,
    )?;

    Ok(CostOfCredit {
        total_cost,
        rate_pct,
        strategy: AnnualizationStrategy::MonthlyCompounded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::level_installment;
    use crate::tables::RateTables;
    use crate::taxes::{TaxEngine, TaxSelection};
    use approx::assert_relative_eq;

    #[test]
    fn test_cft_reference_loan() {
        let principal = 100_000.0;
        let installment = level_installment(principal, 0.25 / 12.0, 60).unwrap();
        let total_paid = installment * 60.0;

        let tables = RateTables::default_argentina();
        let taxes = TaxEngine::new(&tables)
            .debt_refinancing(principal, total_paid - principal, None, &TaxSelection::all())
            .unwrap();

        let cft = build_cft(total_paid, &taxes, principal, 5.0).unwrap();
        assert_relative_eq!(cft.total_cost, total_paid + taxes.total, epsilon = 1e-9);
        assert!(cft.rate_pct > 0.0);

        // Taxes only add cost
        let bare = build_cft(total_paid, &TaxBreakdown::default(), principal, 5.0).unwrap();
        assert!(cft.rate_pct > bare.rate_pct);
    }

    #[test]
    fn test_cft_rejects_invalid_inputs() {
        let none = TaxBreakdown::default();
        assert!(build_cft(1_000.0, &none, 0.0, 1.0).is_err());
        assert!(build_cft(1_000.0, &none, 1_000.0, 0.0).is_err());
        assert!(build_cft(0.0, &none, 1_000.0, 1.0).is_err());
    }

    #[test]
    fn test_cftea_monthly_compounding() {
        // 1.02^12 over 12 months is exactly 2% a month
        let total = 1_000.0 * 1.02_f64.powi(12);
        let cftea = build_cftea(total, 1_000.0, 12).unwrap();
        assert_relative_eq!(cftea.rate_pct, (1.02_f64.powi(12) - 1.0) * 100.0, epsilon = 1e-9);
        assert_eq!(cftea.strategy, AnnualizationStrategy::MonthlyCompounded);
    }
}
