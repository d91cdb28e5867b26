//! UVA-indexed schedules
//!
//! Principal and balances are tracked in UVA units. Interest and principal
//! math runs at the UVA level; converting to pesos is a separate
//! multiply-by-index step applied to each row.

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, Result};
use super::engine::AmortizationEngine;
use super::row::Schedule;

/// Schedule denominated in UVA plus the index value used for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvaSchedule {
    /// Pesos per UVA
    pub index_value: f64,
    /// Loan amount in UVA
    pub loan_uva: f64,
    /// Schedule in UVA units
    pub schedule: Schedule,
}

impl UvaSchedule {
    /// Build the UVA schedule for a peso amount at the given index value
    pub fn generate(
        engine: &AmortizationEngine,
        amount: f64,
        index_value: f64,
        periodic_rate: f64,
        periods: u32,
    ) -> Result<Self> {
        require_positive("amount", amount)?;
        require_positive("UVA index value", index_value)?;

        let loan_uva = amount / index_value;
        let schedule = engine.generate(loan_uva, periodic_rate, periods)?;

        Ok(Self {
            index_value,
            loan_uva,
            schedule,
        })
    }

    /// Installment in UVA
    pub fn installment_uva(&self) -> f64 {
        self.schedule.installment
    }

    /// Installment in pesos at the current index value
    pub fn installment_currency(&self) -> f64 {
        self.schedule.installment * self.index_value
    }

    /// Rows converted to pesos at the current index value
    pub fn to_currency(&self) -> Schedule {
        self.schedule.scaled(self.index_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{RowTaxes, ScheduleConfig};
    use approx::assert_relative_eq;

    #[test]
    fn test_uva_conversion() {
        let engine = AmortizationEngine::default();
        let uva = UvaSchedule::generate(&engine, 500_000.0, 1_250.0, 0.02, 24).unwrap();

        assert_relative_eq!(uva.loan_uva, 400.0, epsilon = 1e-9);
        assert_relative_eq!(
            uva.installment_currency(),
            uva.installment_uva() * 1_250.0,
            epsilon = 1e-9
        );

        let pesos = uva.to_currency();
        assert_eq!(pesos.rows.len(), 24);
        for (u, p) in uva.schedule.rows.iter().zip(&pesos.rows) {
            assert_relative_eq!(p.interest, u.interest * 1_250.0, epsilon = 1e-9);
            assert_relative_eq!(p.balance, u.balance * 1_250.0, epsilon = 1e-9);
        }
        assert_relative_eq!(pesos.summary().total_principal, 500_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_schedule_math_runs_in_uva() {
        // A different index value changes pesos, not the UVA schedule
        let engine = AmortizationEngine::new(ScheduleConfig::full().with_row_taxes(RowTaxes {
            vat_rate: 0.21,
            upfront_stamp_tax: 0.0,
        }));
        let uva = UvaSchedule::generate(&engine, 100_000.0, 1_000.0, 0.02, 12).unwrap();
        let later = uva.schedule.scaled(1_100.0);
        assert_relative_eq!(later.rows[0].installment, uva.schedule.rows[0].installment * 1_100.0, epsilon = 1e-9);
        assert_relative_eq!(uva.schedule.rows[0].vat_on_interest, 100.0 * 0.02 * 0.21, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_zero_index() {
        let engine = AmortizationEngine::default();
        assert!(UvaSchedule::generate(&engine, 100_000.0, 0.0, 0.02, 12).is_err());
    }
}
