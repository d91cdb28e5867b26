//! Express loan: a single repayment after a fixed number of days

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationRow;
use crate::conversion::{periodic_rate_for_days, AnnualizationStrategy, DAYS_PER_YEAR};
use crate::cost::build_cft;
use crate::error::{Result, SimulationError};
use crate::result::{LoanParameters, LoanSummary, SimulationResult, Term};
use crate::tables::{Product, RateTables, TaxKind};
use crate::taxes::TaxEngine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpressRequest {
    pub amount: f64,
    /// TNA as a fraction
    pub nominal_annual_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressResult {
    pub simulation: SimulationResult,
    pub term_days: u32,
    /// Amount + interest + VAT + stamp tax
    pub total_to_pay: f64,
    /// Linear annual cost, `(total − amount) / amount × 365 / days`
    pub nominal_cft_pct: f64,
}

impl ExpressResult {
    pub fn is_valid(&self) -> bool {
        self.simulation.is_valid
    }
}

pub fn simulate(tables: &RateTables, request: &ExpressRequest) -> ExpressResult {
    let term_days = tables.limits.express.term_days;
    let params = LoanParameters::new(
        request.amount,
        request.nominal_annual_rate,
        Term::Days(term_days),
    );

    match run(tables, params, term_days) {
        Ok((simulation, total_to_pay, nominal_cft_pct)) => ExpressResult {
            simulation,
            term_days,
            total_to_pay,
            nominal_cft_pct,
        },
        Err(err) => ExpressResult {
            simulation: SimulationResult::invalid(
                Product::Express,
                params,
                AnnualizationStrategy::TotalCostOverTerm,
                err,
            ),
            term_days,
            total_to_pay: 0.0,
            nominal_cft_pct: 0.0,
        },
    }
}

fn run(tables: &RateTables, params: LoanParameters, term_days: u32) -> Result<(SimulationResult, f64, f64)> {
    params.validate()?;
    let limit = tables.limits.express.max_amount;
    if params.principal > limit {
        return Err(SimulationError::over_limit(Product::Express.name(), limit));
    }

    let amount = params.principal;
    let interest = amount * periodic_rate_for_days(params.nominal_annual_rate, term_days);
    let taxes = TaxEngine::new(tables).express(amount, interest)?;

    let repayment = amount + interest;
    let total_to_pay = repayment + taxes.total;
    let term_years = term_days as f64 / DAYS_PER_YEAR;
    let cftea = build_cft(repayment, &taxes, amount, term_years)?;
    let nominal_cft_pct = (total_to_pay - amount) / amount * DAYS_PER_YEAR / term_days as f64 * 100.0;

    let mut row = AmortizationRow::new(1);
    row.installment = repayment;
    row.interest = interest;
    row.principal = amount;
    row.vat_on_interest = taxes.get(TaxKind::VatOnInterest);
    row.stamp_tax = taxes.get(TaxKind::StampTax);
    row.total_due = total_to_pay;

    debug!(
        "Express {:.2} over {} days: pays {:.2}, CFTEA {:.2}%",
        amount, term_days, total_to_pay, cftea.rate_pct
    );

    let summary = LoanSummary {
        installment: repayment,
        total_interest: interest,
        total_paid: repayment,
        total_taxes: taxes.total,
        total_cost: cftea.total_cost,
        cost_rate_pct: cftea.rate_pct,
        strategy: cftea.strategy,
        // a single repayment has no monthly IRR
        effective_cft_pct: None,
    };

    let simulation = SimulationResult::valid(Product::Express, params, vec![row], taxes, summary);
    Ok((simulation, total_to_pay, nominal_cft_pct))
}
