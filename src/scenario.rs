//! Scenario runner for batches of simulations
//!
//! Loads the rate tables once, then runs any number of simulations against
//! them. Batches and rate sweeps run in parallel; simulations share nothing
//! but the read-only tables.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::installments::{InstallmentConverter, InstallmentPlan, Purchase};
use crate::investment::{InvestmentParameters, InvestmentResult, YieldEngine};
use crate::products::{
    express, mortgage, personal, personal_uva, refinancing, ExpressRequest, ExpressResult,
    MortgageRequest, MortgageResult, PersonalRequest, RefinancingRequest, RefinancingResult,
    UvaRequest, UvaResult,
};
use crate::result::SimulationResult;
use crate::tables::RateTables;
use crate::taxes::TaxSelection;

/// Purchases and the installment count to convert them into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRequest {
    pub purchases: Vec<Purchase>,
    pub installments: u32,
    #[serde(default)]
    pub taxes: TaxSelection,
}

/// Any simulation, tagged by product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "product", rename_all = "snake_case")]
pub enum SimulationRequest {
    Refinancing(RefinancingRequest),
    Express(ExpressRequest),
    Personal(PersonalRequest),
    PersonalUva(UvaRequest),
    Mortgage(MortgageRequest),
    #[serde(alias = "frasco")]
    Deposit(InvestmentParameters),
    Installments(InstallmentRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationOutcome {
    Refinancing(RefinancingResult),
    Express(ExpressResult),
    Personal(SimulationResult),
    PersonalUva(UvaResult),
    Mortgage(MortgageResult),
    Deposit(InvestmentResult),
    Installments(InstallmentPlan),
}

impl SimulationOutcome {
    pub fn is_valid(&self) -> bool {
        match self {
            SimulationOutcome::Refinancing(r) => r.is_valid,
            SimulationOutcome::Express(r) => r.is_valid(),
            SimulationOutcome::Personal(r) => r.is_valid,
            SimulationOutcome::PersonalUva(r) => r.is_valid(),
            SimulationOutcome::Mortgage(r) => r.is_valid(),
            SimulationOutcome::Deposit(r) => r.is_valid,
            SimulationOutcome::Installments(r) => r.is_valid,
        }
    }
}

/// Pre-loaded runner for single and batch simulations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
/// let results = runner.rate_sweep(&request, &[0.40, 0.35, 0.30]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    tables: RateTables,
}

impl ScenarioRunner {
    /// Runner over the default Argentine tables
    pub fn new() -> Self {
        Self {
            tables: RateTables::default_argentina(),
        }
    }

    /// Load tables from the default CSV directory
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            tables: RateTables::from_csv()?,
        })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            tables: RateTables::from_csv_path(path)?,
        })
    }

    pub fn with_tables(tables: RateTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &RateTables {
        &self.tables
    }

    /// Mutable tables, for overriding a rate before a run
    pub fn tables_mut(&mut self) -> &mut RateTables {
        &mut self.tables
    }

    pub fn refinance(&self, request: &RefinancingRequest) -> RefinancingResult {
        refinancing::simulate(&self.tables, request)
    }

    pub fn express(&self, request: &ExpressRequest) -> ExpressResult {
        express::simulate(&self.tables, request)
    }

    pub fn personal(&self, request: &PersonalRequest) -> SimulationResult {
        personal::simulate(&self.tables, request)
    }

    pub fn personal_uva(&self, request: &UvaRequest) -> UvaResult {
        personal_uva::simulate(&self.tables, request)
    }

    pub fn mortgage(&self, request: &MortgageRequest) -> MortgageResult {
        mortgage::simulate(&self.tables, request)
    }

    pub fn deposit(&self, params: &InvestmentParameters) -> InvestmentResult {
        YieldEngine::from_tables(&self.tables).simulate_params(params)
    }

    pub fn installments(&self, request: &InstallmentRequest) -> InstallmentPlan {
        InstallmentConverter::new(&self.tables).plan(&request.purchases, request.installments, &request.taxes)
    }

    /// Run one simulation of any product
    pub fn run(&self, request: &SimulationRequest) -> SimulationOutcome {
        match request {
            SimulationRequest::Refinancing(r) => SimulationOutcome::Refinancing(self.refinance(r)),
            SimulationRequest::Express(r) => SimulationOutcome::Express(self.express(r)),
            SimulationRequest::Personal(r) => SimulationOutcome::Personal(self.personal(r)),
            SimulationRequest::PersonalUva(r) => SimulationOutcome::PersonalUva(self.personal_uva(r)),
            SimulationRequest::Mortgage(r) => SimulationOutcome::Mortgage(self.mortgage(r)),
            SimulationRequest::Deposit(p) => SimulationOutcome::Deposit(self.deposit(p)),
            SimulationRequest::Installments(r) => SimulationOutcome::Installments(self.installments(r)),
        }
    }

    /// Run many simulations in parallel, preserving input order
    pub fn run_batch(&self, requests: &[SimulationRequest]) -> Vec<SimulationOutcome> {
        requests.par_iter().map(|r| self.run(r)).collect()
    }

    /// Refinancing comparisons for a range of offered rates
    pub fn rate_sweep(&self, base: &RefinancingRequest, new_rates: &[f64]) -> Vec<RefinancingResult> {
        new_rates
            .par_iter()
            .map(|&new_rate| {
                let request = RefinancingRequest {
                    new_rate,
                    ..base.clone()
                };
                self.refinance(&request)
            })
            .collect()
    }
}
