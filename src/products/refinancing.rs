//! Debt refinancing: current debt vs. a refinanced loan over the same term

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::{annuity_installment, AmortizationEngine, AmortizationRow};
use crate::conversion::{periodic_rate, AnnualizationStrategy, MONTHS_PER_YEAR};
use crate::cost::{build_cft, compare, effective_cft_pct, ScenarioComparison};
use crate::error::{Result, SimulationError};
use crate::result::{LoanParameters, LoanSummary, SimulationResult, Term};
use crate::tables::{Product, RateTables};
use crate::taxes::{TaxEngine, TaxSelection};

/// Periods shown in the schedule preview
pub const PREVIEW_PERIODS: usize = 12;

/// Input for a refinancing comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinancingRequest {
    pub principal: f64,
    /// Current TNA as a fraction
    pub current_rate: f64,
    /// Offered TNA as a fraction
    pub new_rate: f64,
    pub term_years: f64,
    /// IIBB rate; takes precedence over `province`
    #[serde(default)]
    pub gross_receipts_rate: Option<f64>,
    /// Province whose IIBB rate applies; 6% when neither is given
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub taxes: TaxSelection,
}

/// Both scenarios and the savings between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinancingResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SimulationError>,
    /// Term in months; fractional when the years do not divide evenly
    pub term_months: f64,
    pub current: SimulationResult,
    pub refinanced: SimulationResult,
    pub comparison: ScenarioComparison,
}

impl RefinancingRequest {
    /// IIBB rate from the explicit rate or the province table
    pub fn resolve_gross_receipts_rate(&self, tables: &RateTables) -> Result<Option<f64>> {
        match (self.gross_receipts_rate, self.province.as_deref()) {
            (Some(rate), _) => Ok(Some(rate)),
            (None, Some(province)) => tables
                .gross_receipts
                .rate_for(province)
                .map(Some)
                .ok_or_else(|| SimulationError::invalid("province", format!("unknown province {}", province))),
            (None, None) => Ok(None),
        }
    }
}

impl RefinancingResult {
    /// First periods of each schedule
    pub fn preview(&self) -> (&[AmortizationRow], &[AmortizationRow]) {
        let head = |rows: &[AmortizationRow]| rows.len().min(PREVIEW_PERIODS);
        (
            &self.current.schedule[..head(&self.current.schedule)],
            &self.refinanced.schedule[..head(&self.refinanced.schedule)],
        )
    }
}

/// Simulate one scenario of the comparison
pub fn simulate_scenario(
    tables: &RateTables,
    principal: f64,
    nominal_annual_rate: f64,
    term_years: f64,
    gross_receipts_rate: Option<f64>,
    selection: &TaxSelection,
) -> SimulationResult {
    let params = LoanParameters::new(principal, nominal_annual_rate, Term::Years(term_years));
    SimulationResult::from_outcome(
        Product::DebtRefinancing,
        params,
        AnnualizationStrategy::TotalCostOverTerm,
        run_scenario(tables, params, gross_receipts_rate, selection),
    )
}

fn run_scenario(
    tables: &RateTables,
    params: LoanParameters,
    gross_receipts_rate: Option<f64>,
    selection: &TaxSelection,
) -> Result<SimulationResult> {
    params.validate()?;
    tables.limits.loan_term.check(params.term.years())?;
    let months = params.term.fractional_months()?;

    // A fractional term is paid over whole rows; the last one clears the balance
    let rate = periodic_rate(params.nominal_annual_rate, MONTHS_PER_YEAR as f64);
    let installment = annuity_installment(params.principal, rate, months)?;
    let schedule = AmortizationEngine::default().generate_with_installment(
        params.principal,
        rate,
        months.ceil() as u32,
        installment,
    )?;

    let total_paid = installment * months;
    let total_interest = total_paid - params.principal;

    let taxes = TaxEngine::new(tables).debt_refinancing(
        params.principal,
        total_interest,
        gross_receipts_rate,
        selection,
    )?;
    let cft = build_cft(total_paid, &taxes, params.principal, params.term.years())?;

    let summary = LoanSummary {
        installment,
        total_interest,
        total_paid,
        total_taxes: taxes.total,
        total_cost: cft.total_cost,
        cost_rate_pct: cft.rate_pct,
        strategy: cft.strategy,
        effective_cft_pct: effective_cft_pct(params.principal, &schedule.rows, taxes.total),
    };

    Ok(SimulationResult::valid(
        Product::DebtRefinancing,
        params,
        schedule.rows,
        taxes,
        summary,
    ))
}

/// Compare the current debt against the refinanced offer
pub fn simulate(tables: &RateTables, request: &RefinancingRequest) -> RefinancingResult {
    let gross_receipts_rate = match request.resolve_gross_receipts_rate(tables) {
        Ok(rate) => rate,
        Err(err) => return rejected(request, err),
    };
    let scenario = |rate: f64| {
        simulate_scenario(
            tables,
            request.principal,
            rate,
            request.term_years,
            gross_receipts_rate,
            &request.taxes,
        )
    };

    let current = scenario(request.current_rate);
    let refinanced = scenario(request.new_rate);
    let term_months = current.params.term.fractional_months().unwrap_or(0.0);

    match compare(&current, &refinanced, term_months) {
        Ok(comparison) => {
            debug!(
                "Refinancing {:.2}: CFT {:.2}% -> {:.2}%, saves {:.2}",
                request.principal,
                current.summary.cost_rate_pct,
                refinanced.summary.cost_rate_pct,
                comparison.total_savings
            );
            RefinancingResult {
                is_valid: true,
                error: None,
                term_months,
                current,
                refinanced,
                comparison,
            }
        }
        Err(err) => {
            // Surface the scenario's own reason when there is one
            let error = current
                .error
                .clone()
                .or_else(|| refinanced.error.clone())
                .unwrap_or(err);
            RefinancingResult {
                is_valid: false,
                error: Some(error),
                term_months: 0.0,
                current,
                refinanced,
                comparison: ScenarioComparison::default(),
            }
        }
    }
}

fn rejected(request: &RefinancingRequest, error: SimulationError) -> RefinancingResult {
    let invalid = |rate: f64| {
        SimulationResult::invalid(
            Product::DebtRefinancing,
            LoanParameters::new(request.principal, rate, Term::Years(request.term_years)),
            AnnualizationStrategy::TotalCostOverTerm,
            error.clone(),
        )
    };
    RefinancingResult {
        is_valid: false,
        error: Some(error.clone()),
        term_months: 0.0,
        current: invalid(request.current_rate),
        refinanced: invalid(request.new_rate),
        comparison: ScenarioComparison::default(),
    }
}
