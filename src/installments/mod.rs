//! Installment plans for foreign-currency card purchases

mod plan;
mod purchase;

pub use plan::{installment_options, InstallmentConverter, InstallmentPlan};
pub use purchase::{selected_total, Purchase};
