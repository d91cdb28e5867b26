//! Simple-interest yield of fixed-term deposits ("frascos")

use chrono::{Days, NaiveDate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::conversion::DAYS_PER_YEAR;
use crate::error::{require_non_negative, require_positive, Result, SimulationError};
use crate::tables::{DepositLimits, RateTables};
use super::policy::{withdrawal_rule, WithdrawalOutcome, EARLY_WITHDRAWAL_EXPLANATION};

/// Inputs of one deposit simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentParameters {
    pub amount: f64,
    pub term_days: u32,
    /// TNA in percentage points; the term's default when absent
    #[serde(default)]
    pub tna_pct: Option<f64>,
    /// When set, the result carries the maturity date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl InvestmentParameters {
    pub fn new(amount: f64, term_days: u32) -> Self {
        Self {
            amount,
            term_days,
            tna_pct: None,
            start_date: None,
        }
    }

    pub fn with_rate(mut self, tna_pct: f64) -> Self {
        self.tna_pct = Some(tna_pct);
        self
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub amount: f64,
    pub term_days: u32,
    pub tna_pct: f64,
    pub final_amount: f64,
    pub earnings: f64,
    pub daily_earnings: f64,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SimulationError>,
    pub early_withdrawal_forfeits_earnings: bool,
    pub early_withdrawal_explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
}

impl InvestmentResult {
    fn invalid(params: &InvestmentParameters, tna_pct: f64, error: SimulationError) -> Self {
        warn!("deposit simulation rejected: {}", error);
        Self {
            amount: params.amount,
            term_days: params.term_days,
            tna_pct,
            final_amount: 0.0,
            earnings: 0.0,
            daily_earnings: 0.0,
            is_valid: false,
            error: Some(error),
            early_withdrawal_forfeits_earnings: true,
            early_withdrawal_explanation: EARLY_WITHDRAWAL_EXPLANATION.to_string(),
            maturity_date: None,
        }
    }

    /// Outcome of withdrawing after `days_elapsed`
    pub fn withdrawal(&self, days_elapsed: u32) -> WithdrawalOutcome {
        withdrawal_rule(days_elapsed, self.term_days)
    }
}

/// Deposit yield calculator over the offered terms
#[derive(Debug, Clone, Default)]
pub struct YieldEngine {
    deposits: DepositLimits,
}

impl YieldEngine {
    pub fn new(deposits: DepositLimits) -> Self {
        Self { deposits }
    }

    pub fn from_tables(tables: &RateTables) -> Self {
        Self::new(tables.limits.deposits.clone())
    }

    /// Offered terms in days, longest first
    pub fn terms(&self) -> Vec<u32> {
        self.deposits.terms.iter().map(|t| t.days).collect()
    }

    /// Simulate a deposit at an explicit TNA (percentage points)
    pub fn simulate(&self, amount: f64, term_days: u32, tna_pct: f64) -> InvestmentResult {
        self.simulate_params(&InvestmentParameters::new(amount, term_days).with_rate(tna_pct))
    }

    pub fn simulate_params(&self, params: &InvestmentParameters) -> InvestmentResult {
        let tna_pct = params
            .tna_pct
            .or_else(|| self.deposits.default_tna_pct(params.term_days))
            .unwrap_or(0.0);

        match self.compute(params, tna_pct) {
            Ok(result) => result,
            Err(err) => InvestmentResult::invalid(params, tna_pct, err),
        }
    }

    fn compute(&self, params: &InvestmentParameters, tna_pct: f64) -> Result<InvestmentResult> {
        require_positive("amount", params.amount)?;
        require_non_negative("TNA", tna_pct)?;
        if !self.deposits.allows_term(params.term_days) {
            return Err(SimulationError::invalid(
                "term",
                format!("{} days is not one of {:?}", params.term_days, self.terms()),
            ));
        }

        // TNA is in percentage points: /100/365
        let daily_rate = tna_pct / (DAYS_PER_YEAR * 100.0);
        let earnings = params.amount * daily_rate * params.term_days as f64;
        let daily_earnings = earnings / params.term_days as f64;

        let maturity_date = match params.start_date {
            Some(start) => Some(
                start
                    .checked_add_days(Days::new(params.term_days as u64))
                    .ok_or_else(|| SimulationError::invalid("start date", "maturity is out of range"))?,
            ),
            None => None,
        };

        debug!(
            "Deposit {:.2} for {} days at {:.2}%: earns {:.2}",
            params.amount, params.term_days, tna_pct, earnings
        );

        Ok(InvestmentResult {
            amount: params.amount,
            term_days: params.term_days,
            tna_pct,
            final_amount: params.amount + earnings,
            earnings,
            daily_earnings,
            is_valid: true,
            error: None,
            early_withdrawal_forfeits_earnings: !withdrawal_rule(0, params.term_days).keeps_earnings(),
            early_withdrawal_explanation: EARLY_WITHDRAWAL_EXPLANATION.to_string(),
            maturity_date,
        })
    }
}
