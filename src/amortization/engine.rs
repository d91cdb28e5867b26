//! French (constant installment) amortization engine

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, Result, SimulationError};
use super::row::{AmortizationRow, Schedule};

/// Taxes charged on each installment rather than on the loan as a whole
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RowTaxes {
    /// VAT rate applied to each row's interest
    pub vat_rate: f64,
    /// Stamp tax amount charged with the first installment
    pub upfront_stamp_tax: f64,
}

/// Configuration for schedule generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Per-row tax overlay
    pub row_taxes: Option<RowTaxes>,
}

impl ScheduleConfig {
    /// No per-row taxes
    pub fn full() -> Self {
        Self::default()
    }

    pub fn with_row_taxes(mut self, row_taxes: RowTaxes) -> Self {
        self.row_taxes = Some(row_taxes);
        self
    }
}

/// Constant installment from the annuity formula.
///
/// `principal * r * (1+r)^n / ((1+r)^n - 1)`, or `principal / n` when r = 0.
pub fn level_installment(principal: f64, periodic_rate: f64, periods: u32) -> Result<f64> {
    if periods == 0 {
        return Err(SimulationError::invalid("term", "must have at least one period"));
    }
    annuity_installment(principal, periodic_rate, periods as f64)
}

/// Annuity installment over a possibly fractional number of periods
/// (a 1.3-year loan runs 15.6 months)
pub fn annuity_installment(principal: f64, periodic_rate: f64, periods: f64) -> Result<f64> {
    require_positive("principal", principal)?;
    require_non_negative("periodic rate", periodic_rate)?;
    require_positive("term periods", periods)?;

    if periodic_rate == 0.0 {
        return Ok(principal / periods);
    }

    let growth = (1.0 + periodic_rate).powf(periods);
    let installment = principal * periodic_rate * growth / (growth - 1.0);
    if installment.is_finite() {
        Ok(installment)
    } else {
        Err(SimulationError::degenerate(
            "annuity_installment",
            format!("annuity factor overflowed for rate {} over {} periods", periodic_rate, periods),
        ))
    }
}

/// Main amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: ScheduleConfig,
}

impl AmortizationEngine {
    /// Create a new engine with given config
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// Generate a constant-installment schedule
    pub fn generate(&self, principal: f64, periodic_rate: f64, periods: u32) -> Result<Schedule> {
        let installment = level_installment(principal, periodic_rate, periods)?;
        self.generate_with_installment(principal, periodic_rate, periods, installment)
    }

    /// Generate a schedule for a given installment.
    ///
    /// Stops early, omitting the remaining periods, once the balance reaches
    /// zero before `periods`.
    pub fn generate_with_installment(
        &self,
        principal: f64,
        periodic_rate: f64,
        periods: u32,
        installment: f64,
    ) -> Result<Schedule> {
        require_positive("principal", principal)?;
        require_non_negative("periodic rate", periodic_rate)?;
        require_positive("installment", installment)?;
        if periods == 0 {
            return Err(SimulationError::invalid("term", "must have at least one period"));
        }

        let mut schedule = Schedule::new(principal, periodic_rate, periods, installment);
        let mut balance = principal;

        for period in 1..=periods {
            let mut row = AmortizationRow::new(period);
            row.installment = installment;
            row.interest = balance * periodic_rate;
            row.principal = installment - row.interest;

            balance -= row.principal;
            row.balance = balance.max(0.0);

            self.apply_row_taxes(&mut row);
            schedule.add_row(row);

            if balance <= 0.0 {
                break;
            }
        }

        debug!(
            "Generated {} of {} periods: installment {:.2}, rate {:.6}",
            schedule.rows.len(),
            periods,
            installment,
            periodic_rate
        );

        Ok(schedule)
    }

    fn apply_row_taxes(&self, row: &mut AmortizationRow) {
        if let Some(taxes) = self.config.row_taxes {
            row.vat_on_interest = row.interest * taxes.vat_rate;
            if row.period == 1 {
                row.stamp_tax = taxes.upfront_stamp_tax;
            }
        }
        row.total_due = row.installment + row.vat_on_interest + row.stamp_tax;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn full(principal: f64, rate: f64, periods: u32) -> Schedule {
        AmortizationEngine::default().generate(principal, rate, periods).unwrap()
    }

    #[test]
    fn test_reference_installment() {
        // 100000 at 25% TNA over 60 months
        let installment = level_installment(100_000.0, 0.25 / 12.0, 60).unwrap();
        assert_abs_diff_eq!(installment, 2935.0, epsilon = 10.0);
    }

    #[test]
    fn test_constant_installment_and_full_amortization() {
        let schedule = full(100_000.0, 0.25 / 12.0, 60);
        assert_eq!(schedule.rows.len(), 60);

        let first = schedule.rows[0].installment;
        assert!(schedule.rows.iter().all(|r| (r.installment - first).abs() < 1e-9));

        let summary = schedule.summary();
        assert_relative_eq!(summary.total_principal, 100_000.0, epsilon = 1e-6);
        assert!(summary.final_balance <= 1e-6);
        assert!(summary.total_interest > 0.0);
    }

    #[test]
    fn test_interest_falls_principal_rises() {
        let schedule = full(50_000.0, 0.01, 24);
        for pair in schedule.rows.windows(2) {
            assert!(pair[1].interest < pair[0].interest);
            assert!(pair[1].principal > pair[0].principal);
            assert!(pair[1].balance <= pair[0].balance);
        }
        assert_relative_eq!(schedule.rows[0].interest, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_rate() {
        let schedule = full(12_000.0, 0.0, 12);
        assert_eq!(schedule.installment, 1_000.0);
        assert!(schedule.rows.iter().all(|r| r.interest == 0.0));
        assert!(schedule.rows.iter().all(|r| r.principal == 1_000.0));
        assert_eq!(schedule.rows.len(), 12);
    }

    #[test]
    fn test_stops_when_balance_reaches_zero_early() {
        // Paying half the principal per period clears the loan in 2 of 5 periods
        let schedule = AmortizationEngine::default()
            .generate_with_installment(10_000.0, 0.0, 5, 5_000.0)
            .unwrap();
        assert_eq!(schedule.rows.len(), 2);
        assert_eq!(schedule.rows[1].balance, 0.0);

        // Overpayment never shows a negative balance
        let schedule = AmortizationEngine::default()
            .generate_with_installment(10_000.0, 0.0, 5, 6_000.0)
            .unwrap();
        assert_eq!(schedule.rows.len(), 2);
        assert_eq!(schedule.rows[1].balance, 0.0);
        assert!(schedule.rows.iter().all(|r| r.balance >= 0.0));
    }

    #[test]
    fn test_fractional_term_installment() {
        // 15.6 periods pays more per period than 16 and less than 15
        let fractional = annuity_installment(100_000.0, 0.02, 15.6).unwrap();
        let sixteen = level_installment(100_000.0, 0.02, 16).unwrap();
        let fifteen = level_installment(100_000.0, 0.02, 15).unwrap();
        assert!(fractional > sixteen && fractional < fifteen);
        assert_relative_eq!(annuity_installment(1_560.0, 0.0, 15.6).unwrap(), 100.0, epsilon = 1e-9);

        // The last of 16 rows clears the balance
        let schedule = AmortizationEngine::default()
            .generate_with_installment(100_000.0, 0.02, 16, fractional)
            .unwrap();
        assert_eq!(schedule.rows.len(), 16);
        assert_eq!(schedule.rows[15].balance, 0.0);
        assert!(schedule.rows[14].balance > 0.0);
        assert!(annuity_installment(1_000.0, 0.01, 0.0).is_err());
    }

    #[test]
    fn test_row_taxes() {
        let config = ScheduleConfig::full().with_row_taxes(RowTaxes {
            vat_rate: 0.21,
            upfront_stamp_tax: 120.0,
        });
        let schedule = AmortizationEngine::new(config).generate(10_000.0, 0.05, 6).unwrap();

        let first = schedule.rows[0];
        assert_relative_eq!(first.vat_on_interest, 500.0 * 0.21, epsilon = 1e-9);
        assert_eq!(first.stamp_tax, 120.0);
        assert_relative_eq!(first.total_due, first.installment + 105.0 + 120.0, epsilon = 1e-9);
        assert!(schedule.rows[1..].iter().all(|r| r.stamp_tax == 0.0));
    }

    #[test]
    fn test_invalid_inputs() {
        let engine = AmortizationEngine::default();
        assert!(engine.generate(0.0, 0.01, 12).is_err());
        assert!(engine.generate(-5.0, 0.01, 12).is_err());
        assert!(engine.generate(1_000.0, -0.01, 12).is_err());
        assert!(engine.generate(1_000.0, 0.01, 0).is_err());
    }
}
