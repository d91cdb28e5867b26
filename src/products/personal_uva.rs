//! UVA-indexed personal loan
//!
//! The loan is converted to UVA at the index value supplied by the caller,
//! amortized in UVA and shown in pesos at that same value. Later index moves
//! change the peso installment but not the UVA one.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEngine, RowTaxes, ScheduleConfig, UvaSchedule};
use crate::conversion::{periodic_rate, AnnualizationStrategy, MONTHS_PER_YEAR};
use crate::cost::{build_cftea, effective_cft_pct};
use crate::error::{require_positive, Result, SimulationError};
use crate::result::{LoanParameters, LoanSummary, SimulationResult, Term};
use crate::tables::{Product, RateTables};
use crate::taxes::TaxEngine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvaRequest {
    /// Amount in pesos
    pub amount: f64,
    /// Pesos per UVA today
    pub index_value: f64,
    pub term_months: u32,
    /// Overrides the product TNA
    #[serde(default)]
    pub nominal_annual_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvaResult {
    /// Schedule, taxes and summary in pesos
    pub simulation: SimulationResult,
    /// The same loan in UVA units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uva: Option<UvaSchedule>,
}

impl UvaResult {
    pub fn is_valid(&self) -> bool {
        self.simulation.is_valid
    }

    pub fn installment_uva(&self) -> f64 {
        self.uva.as_ref().map_or(0.0, UvaSchedule::installment_uva)
    }
}

pub fn simulate(tables: &RateTables, request: &UvaRequest) -> UvaResult {
    let rate = request
        .nominal_annual_rate
        .unwrap_or(tables.limits.uva.nominal_annual_rate);
    let params = LoanParameters::new(request.amount, rate, Term::Months(request.term_months));

    match run(tables, params, request) {
        Ok((simulation, uva)) => UvaResult {
            simulation,
            uva: Some(uva),
        },
        Err(err) => UvaResult {
            simulation: SimulationResult::invalid(
                Product::PersonalUva,
                params,
                AnnualizationStrategy::MonthlyCompounded,
                err,
            ),
            uva: None,
        },
    }
}

fn run(tables: &RateTables, params: LoanParameters, request: &UvaRequest) -> Result<(SimulationResult, UvaSchedule)> {
    params.validate()?;
    require_positive("UVA index value", request.index_value)?;

    let limits = &tables.limits.uva;
    if params.principal > limits.max_amount {
        return Err(SimulationError::over_limit(Product::PersonalUva.name(), limits.max_amount));
    }
    let months = request.term_months;
    if !limits.term_options.contains(&months) {
        return Err(SimulationError::invalid(
            "term",
            format!("{} months is not one of {:?}", months, limits.term_options),
        ));
    }

    let tax_engine = TaxEngine::new(tables);
    let row_taxes = RowTaxes {
        vat_rate: tax_engine.vat_on_interest_rate(Product::PersonalUva),
        upfront_stamp_tax: 0.0,
    };
    let engine = AmortizationEngine::new(ScheduleConfig::full().with_row_taxes(row_taxes));
    let rate = periodic_rate(params.nominal_annual_rate, MONTHS_PER_YEAR as f64);
    let uva = UvaSchedule::generate(&engine, params.principal, request.index_value, rate, months)?;

    // Cost ratios are the same in UVA and in pesos
    let totals_uva = uva.schedule.summary();
    let taxes_uva = tax_engine.personal_uva(uva.loan_uva, totals_uva.total_interest)?;
    let cftea = build_cftea(totals_uva.total_installments + taxes_uva.total, uva.loan_uva, months)?;

    let schedule = uva.to_currency();
    let totals = schedule.summary();
    let taxes = tax_engine.personal_uva(params.principal, totals.total_interest)?;

    debug!(
        "UVA {:.2} ({:.4} UVA) over {} months: {:.4} UVA per installment, CFTEA {:.2}%",
        params.principal,
        uva.loan_uva,
        months,
        uva.installment_uva(),
        cftea.rate_pct
    );

    let summary = LoanSummary {
        installment: schedule.installment,
        total_interest: totals.total_interest,
        total_paid: totals.total_installments,
        total_taxes: taxes.total,
        total_cost: totals.total_installments + taxes.total,
        cost_rate_pct: cftea.rate_pct,
        strategy: cftea.strategy,
        effective_cft_pct: effective_cft_pct(params.principal, &schedule.rows, 0.0),
    };

    let simulation = SimulationResult::valid(Product::PersonalUva, params, schedule.rows, taxes, summary);
    Ok((simulation, uva))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TaxKind;
    use approx::assert_relative_eq;

    fn request(amount: f64, term_months: u32) -> UvaRequest {
        UvaRequest {
            amount,
            index_value: 1_000.0,
            term_months,
            nominal_annual_rate: None,
        }
    }

    #[test]
    fn test_uva_units_and_pesos() {
        let result = simulate(&RateTables::default_argentina(), &request(1_000_000.0, 12));
        assert!(result.is_valid());

        let uva = result.uva.as_ref().unwrap();
        assert_relative_eq!(uva.loan_uva, 1_000.0, epsilon = 1e-9);
        assert_relative_eq!(
            result.simulation.summary.installment,
            result.installment_uva() * 1_000.0,
            epsilon = 1e-6
        );
        for (pesos, units) in result.simulation.schedule.iter().zip(&uva.schedule.rows) {
            assert_relative_eq!(pesos.interest, units.interest * 1_000.0, epsilon = 1e-6);
            assert_relative_eq!(pesos.balance, units.balance * 1_000.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_uva_cost_uses_vat_only() {
        let result = simulate(&RateTables::default_argentina(), &request(1_000_000.0, 24));
        let sim = &result.simulation;
        assert_eq!(sim.taxes.get(TaxKind::StampTax), 0.0);
        assert_relative_eq!(sim.taxes.total, sim.summary.total_interest * 0.21, epsilon = 1e-6);

        let multiplier = sim.summary.total_cost / 1_000_000.0;
        let expected = ((multiplier.powf(1.0 / 24.0)).powi(12) - 1.0) * 100.0;
        assert_relative_eq!(sim.summary.cost_rate_pct, expected, epsilon = 1e-6);
        let untaxed = ((sim.summary.total_paid / 1_000_000.0).powf(0.5) - 1.0) * 100.0;
        assert!(sim.summary.cost_rate_pct > untaxed);
    }

    #[test]
    fn test_uva_limits() {
        let tables = RateTables::default_argentina();
        assert!(!simulate(&tables, &request(1_000_000.0, 36)).is_valid());
        assert!(simulate(&tables, &request(1_000_000.0, 18)).is_valid());

        let over = simulate(&tables, &request(10_000_001.0, 12));
        assert!(over.simulation.error.unwrap().is_over_limit());
        assert!(over.uva.is_none());

        let mut bad_index = request(1_000_000.0, 12);
        bad_index.index_value = 0.0;
        assert!(!simulate(&tables, &bad_index).is_valid());
    }

    #[test]
    fn test_rate_override() {
        let tables = RateTables::default_argentina();
        let mut cheaper = request(1_000_000.0, 12);
        cheaper.nominal_annual_rate = Some(0.10);
        let base = simulate(&tables, &request(1_000_000.0, 12));
        let cheaper = simulate(&tables, &cheaper);
        assert!(cheaper.simulation.summary.installment < base.simulation.summary.installment);
    }
}
