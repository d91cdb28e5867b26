//! Loan Simulator - Argentine loan and investment calculators
//!
//! This library provides:
//! - French-system amortization schedules, including UVA-indexed loans
//! - Table-driven Argentine tax overlays (VAT, IIBB, stamp tax, import surcharges)
//! - CFT/CFTEA annualization and refinancing comparisons
//! - Time-deposit yields and card purchase installment plans
//! - A batch runner over shared, pre-loaded rate tables

pub mod error;
pub mod conversion;
pub mod tables;
pub mod taxes;
pub mod amortization;
pub mod result;
pub mod cost;
pub mod products;
pub mod investment;
pub mod installments;
pub mod scenario;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use conversion::AnnualizationStrategy;
pub use tables::{Product, RateTables, TaxKind};
pub use taxes::{TaxBreakdown, TaxEngine, TaxSelection};
pub use amortization::{AmortizationEngine, AmortizationRow, Schedule, ScheduleConfig};
pub use result::{LoanParameters, LoanSummary, SimulationResult, Term};
pub use investment::{InvestmentParameters, InvestmentResult, YieldEngine};
pub use installments::{InstallmentConverter, InstallmentPlan, Purchase};
pub use scenario::{InstallmentRequest, ScenarioRunner, SimulationOutcome, SimulationRequest};
