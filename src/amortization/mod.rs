//! Constant-installment (French system) schedules, in pesos or UVA

mod row;
mod engine;
mod uva;

pub use row::{AmortizationRow, Schedule, ScheduleSummary};
pub use engine::{AmortizationEngine, ScheduleConfig, RowTaxes, annuity_installment, level_installment};
pub use uva::UvaSchedule;
