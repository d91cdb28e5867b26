//! Personal loan: monthly installments with VAT per row and upfront stamp tax

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEngine, RowTaxes, ScheduleConfig};
use crate::conversion::{periodic_rate, AnnualizationStrategy, MONTHS_PER_YEAR};
use crate::cost::{build_cftea, effective_cft_pct};
use crate::error::{Result, SimulationError};
use crate::result::{LoanParameters, LoanSummary, SimulationResult, Term};
use crate::tables::{Product, RateTables};
use crate::taxes::TaxEngine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalRequest {
    pub amount: f64,
    /// TNA as a fraction
    pub nominal_annual_rate: f64,
    pub term_months: u32,
}

pub fn simulate(tables: &RateTables, request: &PersonalRequest) -> SimulationResult {
    let params = LoanParameters::new(
        request.amount,
        request.nominal_annual_rate,
        Term::Months(request.term_months),
    );
    SimulationResult::from_outcome(
        Product::Personal,
        params,
        AnnualizationStrategy::MonthlyCompounded,
        run(tables, params, request.term_months),
    )
}

fn run(tables: &RateTables, params: LoanParameters, months: u32) -> Result<SimulationResult> {
    params.validate()?;
    let limits = &tables.limits.personal;
    if params.principal > limits.max_amount {
        return Err(SimulationError::over_limit(Product::Personal.name(), limits.max_amount));
    }
    if !limits.allows_term(months) {
        return Err(SimulationError::invalid(
            "term",
            format!(
                "{} months is outside {}..={} in steps of {}",
                months, limits.min_term_months, limits.max_term_months, limits.term_step_months
            ),
        ));
    }

    let tax_engine = TaxEngine::new(tables);
    let row_taxes = RowTaxes {
        vat_rate: tax_engine.vat_on_interest_rate(Product::Personal),
        upfront_stamp_tax: params.principal * tax_engine.stamp_tax_rate(Product::Personal),
    };
    let engine = AmortizationEngine::new(ScheduleConfig::full().with_row_taxes(row_taxes));
    let rate = periodic_rate(params.nominal_annual_rate, MONTHS_PER_YEAR as f64);
    let schedule = engine.generate(params.principal, rate, months)?;
    let totals = schedule.summary();

    let taxes = tax_engine.personal(params.principal, totals.total_interest)?;
    let cftea = build_cftea(totals.total_installments + taxes.total, params.principal, months)?;

    debug!(
        "Personal {:.2} over {} months: installment {:.2}, CFTEA {:.2}%",
        params.principal, months, schedule.installment, cftea.rate_pct
    );

    let summary = LoanSummary {
        installment: schedule.installment,
        total_interest: totals.total_interest,
        total_paid: totals.total_installments,
        total_taxes: taxes.total,
        total_cost: cftea.total_cost,
        cost_rate_pct: cftea.rate_pct,
        strategy: cftea.strategy,
        // rows already carry VAT and stamp tax
        effective_cft_pct: effective_cft_pct(params.principal, &schedule.rows, 0.0),
    };

    Ok(SimulationResult::valid(
        Product::Personal,
        params,
        schedule.rows,
        taxes,
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TaxKind;
    use approx::assert_relative_eq;

    fn run_personal(amount: f64, rate: f64, term_months: u32) -> SimulationResult {
        simulate(
            &RateTables::default_argentina(),
            &PersonalRequest {
                amount,
                nominal_annual_rate: rate,
                term_months,
            },
        )
    }

    #[test]
    fn test_row_taxes_match_totals() {
        let result = run_personal(500_000.0, 0.90, 24);
        assert!(result.is_valid);
        assert_eq!(result.schedule.len(), 24);

        let row_vat: f64 = result.schedule.iter().map(|r| r.vat_on_interest).sum();
        assert_relative_eq!(row_vat, result.taxes.get(TaxKind::VatOnInterest), epsilon = 1e-6);
        assert_relative_eq!(result.schedule[0].stamp_tax, 6_000.0, epsilon = 1e-9);
        assert!(result.schedule[1..].iter().all(|r| r.stamp_tax == 0.0));

        let total_due: f64 = result.schedule.iter().map(|r| r.total_due).sum();
        assert_relative_eq!(total_due, result.summary.total_cost, epsilon = 1e-6);
    }

    #[test]
    fn test_cftea_is_monthly_compounded() {
        let result = run_personal(500_000.0, 0.90, 24);
        let multiplier = result.summary.total_cost / 500_000.0;
        let monthly = multiplier.powf(1.0 / 24.0) - 1.0;
        let expected = ((1.0 + monthly).powi(12) - 1.0) * 100.0;

        assert_eq!(result.summary.strategy, AnnualizationStrategy::MonthlyCompounded);
        assert_relative_eq!(result.summary.cost_rate_pct, expected, epsilon = 1e-6);
        assert!(result.summary.effective_cft_pct.unwrap() > 90.0);
    }

    #[test]
    fn test_term_and_amount_limits() {
        assert!(run_personal(100_000.0, 0.5, 6).is_valid);
        assert!(run_personal(100_000.0, 0.5, 72).is_valid);
        assert!(!run_personal(100_000.0, 0.5, 3).is_valid);
        assert!(!run_personal(100_000.0, 0.5, 13).is_valid);
        assert!(!run_personal(100_000.0, 0.5, 78).is_valid);

        let over = run_personal(100_000_001.0, 0.5, 12);
        assert!(over.error.unwrap().is_over_limit());
        assert!(!run_personal(-5.0, 0.5, 12).is_valid);
    }

    #[test]
    fn test_zero_rate_personal() {
        let result = run_personal(120_000.0, 0.0, 12);
        assert!(result.is_valid);
        assert_relative_eq!(result.summary.installment, 10_000.0, epsilon = 1e-9);
        assert_eq!(result.taxes.get(TaxKind::VatOnInterest), 0.0);
        assert_relative_eq!(result.taxes.total, 1_440.0, epsilon = 1e-9);
    }
}
