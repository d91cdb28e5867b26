//! Argentine tax overlay: IVA, impuesto al cheque, IIBB, sellos, municipal
//! levies, import surcharges and mortgage closing costs

mod selection;
mod breakdown;
mod engine;

pub use selection::{TaxSelection, TaxChoice};
pub use breakdown::{TaxBreakdown, TaxBases};
pub use engine::{TaxEngine, compute_taxes};
