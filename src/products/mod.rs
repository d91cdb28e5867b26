//! Loan product simulators
//!
//! Each simulator validates its request, builds the schedule, applies the
//! product's tax rules and folds any failure into an invalid result.

pub mod express;
pub mod mortgage;
pub mod personal;
pub mod personal_uva;
pub mod refinancing;

pub use express::{ExpressRequest, ExpressResult};
pub use mortgage::{Currency, MortgageRequest, MortgageResult};
pub use personal::PersonalRequest;
pub use personal_uva::{UvaRequest, UvaResult};
pub use refinancing::{RefinancingRequest, RefinancingResult, PREVIEW_PERIODS};
