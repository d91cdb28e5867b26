//! Time-deposit ("frasco") yield simulation

mod engine;
mod policy;

pub use engine::{InvestmentParameters, InvestmentResult, YieldEngine};
pub use policy::{withdrawal_rule, WithdrawalOutcome, EARLY_WITHDRAWAL_EXPLANATION};
