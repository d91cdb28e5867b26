//! Mortgage loan in dollars or pesos, with closing costs

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationEngine;
use crate::conversion::{periodic_rate, AnnualizationStrategy, MONTHS_PER_YEAR};
use crate::cost::{build_cft, effective_cft_pct};
use crate::error::{require_non_negative, require_positive, Result, SimulationError};
use crate::result::{LoanParameters, LoanSummary, SimulationResult, Term};
use crate::tables::{Product, RateTables};
use crate::taxes::{TaxEngine, TaxSelection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Ars,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Ars => write!(f, "ARS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageRequest {
    pub property_value: f64,
    pub down_payment: f64,
    pub currency: Currency,
    /// TNA for dollar loans, as a fraction
    pub usd_rate: f64,
    /// TNA for peso loans, as a fraction
    pub ars_rate: f64,
    pub term_years: u32,
    #[serde(default)]
    pub closing_costs: TaxSelection,
}

impl MortgageRequest {
    pub fn rate(&self) -> f64 {
        match self.currency {
            Currency::Usd => self.usd_rate,
            Currency::Ars => self.ars_rate,
        }
    }

    pub fn loan_amount(&self) -> f64 {
        self.property_value - self.down_payment
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub simulation: SimulationResult,
    pub currency: Currency,
    pub property_value: f64,
    pub down_payment: f64,
    /// Loan plus total interest
    pub total_payment: f64,
}

impl MortgageResult {
    pub fn is_valid(&self) -> bool {
        self.simulation.is_valid
    }

    /// Down payment as a share of the property value, in percentage points
    pub fn down_payment_pct(&self) -> f64 {
        if self.property_value > 0.0 {
            self.down_payment / self.property_value * 100.0
        } else {
            0.0
        }
    }
}

pub fn simulate(tables: &RateTables, request: &MortgageRequest) -> MortgageResult {
    let params = LoanParameters::new(
        request.loan_amount(),
        request.rate(),
        Term::Years(request.term_years as f64),
    );
    let simulation = SimulationResult::from_outcome(
        Product::Mortgage,
        params,
        AnnualizationStrategy::TotalCostOverTerm,
        run(tables, params, request),
    );
    let total_payment = if simulation.is_valid {
        simulation.summary.total_paid
    } else {
        0.0
    };

    MortgageResult {
        simulation,
        currency: request.currency,
        property_value: request.property_value,
        down_payment: request.down_payment,
        total_payment,
    }
}

fn run(tables: &RateTables, params: LoanParameters, request: &MortgageRequest) -> Result<SimulationResult> {
    require_positive("property value", request.property_value)?;
    require_non_negative("down payment", request.down_payment)?;
    if request.down_payment >= request.property_value {
        return Err(SimulationError::invalid(
            "down payment",
            "must be less than the property value",
        ));
    }
    params.validate()?;
    tables.limits.loan_term.check(params.term.years())?;
    let months = params.term.months()?;

    let rate = periodic_rate(params.nominal_annual_rate, MONTHS_PER_YEAR as f64);
    let schedule = AmortizationEngine::default().generate(params.principal, rate, months)?;
    let totals = schedule.summary();
    let total_payment = params.principal + totals.total_interest;

    let closing = TaxEngine::new(tables).mortgage_closing(
        params.principal,
        request.property_value,
        &request.closing_costs,
    )?;
    let cft = build_cft(total_payment, &closing, params.principal, params.term.years())?;

    debug!(
        "Mortgage {} {:.2} over {} years: installment {:.2}, closing costs {:.2}",
        request.currency, params.principal, request.term_years, schedule.installment, closing.total
    );

    let summary = LoanSummary {
        installment: schedule.installment,
        total_interest: totals.total_interest,
        total_paid: total_payment,
        total_taxes: closing.total,
        total_cost: cft.total_cost,
        cost_rate_pct: cft.rate_pct,
        strategy: cft.strategy,
        effective_cft_pct: effective_cft_pct(params.principal, &schedule.rows, closing.total),
    };

    Ok(SimulationResult::valid(
        Product::Mortgage,
        params,
        schedule.rows,
        closing,
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TaxKind;
    use approx::assert_relative_eq;

    fn request(currency: Currency) -> MortgageRequest {
        MortgageRequest {
            property_value: 100_000.0,
            down_payment: 30_000.0,
            currency,
            usd_rate: 0.045,
            ars_rate: 0.12,
            term_years: 20,
            closing_costs: TaxSelection::all(),
        }
    }

    #[test]
    fn test_mortgage_amounts() {
        let result = simulate(&RateTables::default_argentina(), &request(Currency::Usd));
        assert!(result.is_valid());

        let sim = &result.simulation;
        assert_relative_eq!(sim.params.principal, 70_000.0, epsilon = 1e-9);
        assert_eq!(sim.schedule.len(), 240);
        assert_relative_eq!(
            result.total_payment,
            70_000.0 + sim.summary.total_interest,
            epsilon = 1e-6
        );
        assert_relative_eq!(sim.taxes.get(TaxKind::StampTax), 700.0, epsilon = 1e-9);
        assert_relative_eq!(sim.taxes.get(TaxKind::NotaryFees), 2_000.0, epsilon = 1e-9);
        assert_relative_eq!(sim.taxes.get(TaxKind::Appraisal), 500.0, epsilon = 1e-9);
        assert_relative_eq!(result.down_payment_pct(), 30.0, epsilon = 1e-9);
        assert!(sim.schedule.last().unwrap().balance < 1e-6);
    }

    #[test]
    fn test_currency_selects_rate() {
        let tables = RateTables::default_argentina();
        let usd = simulate(&tables, &request(Currency::Usd));
        let ars = simulate(&tables, &request(Currency::Ars));
        assert_eq!(usd.simulation.params.nominal_annual_rate, 0.045);
        assert_eq!(ars.simulation.params.nominal_annual_rate, 0.12);
        assert!(ars.simulation.summary.installment > usd.simulation.summary.installment);
        assert!(ars.simulation.summary.cost_rate_pct > usd.simulation.summary.cost_rate_pct);
    }

    #[test]
    fn test_down_payment_must_leave_a_loan() {
        let tables = RateTables::default_argentina();
        let mut bad = request(Currency::Usd);
        bad.down_payment = 100_000.0;
        let result = simulate(&tables, &bad);
        assert!(!result.is_valid());
        assert_eq!(result.total_payment, 0.0);

        bad.down_payment = -1.0;
        assert!(!simulate(&tables, &bad).is_valid());

        let mut no_term = request(Currency::Usd);
        no_term.term_years = 0;
        assert!(!simulate(&tables, &no_term).is_valid());

        let mut too_long = request(Currency::Usd);
        too_long.term_years = 50_000;
        let result = simulate(&tables, &too_long);
        assert!(!result.is_valid());
        assert!(result.simulation.schedule.is_empty());
    }

    #[test]
    fn test_closing_costs_can_be_excluded() {
        let tables = RateTables::default_argentina();
        let mut req = request(Currency::Usd);
        req.closing_costs = TaxSelection::all().with(TaxKind::NotaryFees, false);
        let result = simulate(&tables, &req);
        assert_eq!(result.simulation.taxes.get(TaxKind::NotaryFees), 0.0);
        assert_relative_eq!(result.simulation.taxes.total, 1_200.0, epsilon = 1e-9);
    }
}
