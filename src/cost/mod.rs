//! Cost aggregation: CFT/CFTEA, effective IRR-based CFT and scenario savings

mod cft;
mod comparison;
mod irr;

pub use cft::{build_cft, build_cftea, CostOfCredit};
pub use comparison::{compare, tax_impact_pct, ScenarioComparison};
pub use irr::{effective_cft_pct, BorrowerCashflows};
