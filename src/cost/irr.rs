//! Effective CFT from the borrower's cashflows
//!
//! The monthly rate at which every installment and tax the borrower pays is
//! worth exactly the principal disbursed, annualized by compounding.

use crate::amortization::AmortizationRow;

const NEWTON_STEPS: usize = 50;
const BISECTION_STEPS: usize = 200;
const TOLERANCE: f64 = 1e-12;

/// Principal received and the monthly payments that repay it
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowerCashflows {
    pub disbursed: f64,
    /// Payment at the end of each month, first month first
    pub payments: Vec<f64>,
}

impl BorrowerCashflows {
    /// Each row's total due plus an even share of the loan-level taxes not
    /// already charged per row
    pub fn from_rows(principal: f64, rows: &[AmortizationRow], loan_level_taxes: f64) -> Self {
        let share = if rows.is_empty() { 0.0 } else { loan_level_taxes / rows.len() as f64 };
        Self {
            disbursed: principal,
            payments: rows.iter().map(|row| row.total_due + share).collect(),
        }
    }

    /// Discounted payments minus the disbursement, and its slope in the rate
    fn excess_value(&self, monthly_rate: f64) -> (f64, f64) {
        let discount = 1.0 / (1.0 + monthly_rate);
        let mut factor = discount;
        let mut value = -self.disbursed;
        let mut slope = 0.0;

        for (month, payment) in (1..).zip(&self.payments) {
            value += payment * factor;
            slope -= month as f64 * payment * factor * discount;
            factor *= discount;
        }
        (value, slope)
    }

    /// Monthly rate equating the payments with the disbursement.
    ///
    /// None when there is nothing to discount or a payment is negative.
    /// Payments below the disbursement give a negative rate.
    pub fn monthly_rate(&self) -> Option<f64> {
        if !(self.disbursed > 0.0) || self.payments.is_empty() {
            return None;
        }
        if self.payments.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return None;
        }
        let total: f64 = self.payments.iter().sum();
        if total <= 0.0 {
            return None;
        }

        // Flat rate of the total multiplier is close for level payments
        let mut rate = (total / self.disbursed).powf(1.0 / self.payments.len() as f64) - 1.0;
        for _ in 0..NEWTON_STEPS {
            let (value, slope) = self.excess_value(rate);
            if value.abs() < TOLERANCE * self.disbursed {
                return Some(rate);
            }
            if slope == 0.0 || !slope.is_finite() {
                break;
            }
            let next = rate - value / slope;
            if !next.is_finite() || next <= -1.0 {
                break;
            }
            rate = next;
        }

        self.bisect()
    }

    /// Excess value falls as the rate rises, so the root is bracketed
    /// between a rate near -100% and one found by doubling.
    fn bisect(&self) -> Option<f64> {
        let (mut low, mut high) = if self.excess_value(0.0).0 > 0.0 {
            let mut high = 1.0;
            while self.excess_value(high).0 > 0.0 {
                high *= 2.0;
                if high > 1e6 {
                    return None;
                }
            }
            (0.0, high)
        } else {
            (-0.999_999, 0.0)
        };

        for _ in 0..BISECTION_STEPS {
            let mid = (low + high) / 2.0;
            if self.excess_value(mid).0 > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
            if high - low < TOLERANCE {
                break;
            }
        }
        Some((low + high) / 2.0)
    }
}

/// Effective annual CFT of monthly loan cashflows, in percentage points
pub fn effective_cft_pct(principal: f64, rows: &[AmortizationRow], loan_level_taxes: f64) -> Option<f64> {
    BorrowerCashflows::from_rows(principal, rows, loan_level_taxes)
        .monthly_rate()
        .map(|monthly| ((1.0 + monthly).powi(12) - 1.0) * 100.0)
        .filter(|pct| pct.is_finite())
}
