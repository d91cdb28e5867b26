//! Amortization schedule rows and schedule summaries

use serde::{Deserialize, Serialize};

/// A single period of a French-system schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period index
    pub period: u32,
    /// Constant installment (interest + principal)
    pub installment: f64,
    /// Previous balance × periodic rate
    pub interest: f64,
    /// Installment − interest
    pub principal: f64,
    /// Remaining balance, never negative
    pub balance: f64,

    // Per-row tax overlay (zero unless the product charges it per installment)
    pub vat_on_interest: f64,
    pub stamp_tax: f64,
    /// Installment + VAT + stamp tax
    pub total_due: f64,
}

impl AmortizationRow {
    pub fn new(period: u32) -> Self {
        Self {
            period,
            installment: 0.0,
            interest: 0.0,
            principal: 0.0,
            balance: 0.0,
            vat_on_interest: 0.0,
            stamp_tax: 0.0,
            total_due: 0.0,
        }
    }

    /// Every monetary field multiplied by `factor` (UVA → currency)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            period: self.period,
            installment: self.installment * factor,
            interest: self.interest * factor,
            principal: self.principal * factor,
            balance: self.balance * factor,
            vat_on_interest: self.vat_on_interest * factor,
            stamp_tax: self.stamp_tax * factor,
            total_due: self.total_due * factor,
        }
    }
}

/// Generated schedule with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub principal: f64,
    pub periodic_rate: f64,
    /// Number of periods requested (rows may be fewer)
    pub term_periods: u32,
    pub installment: f64,
    pub rows: Vec<AmortizationRow>,
}

impl Schedule {
    pub fn new(principal: f64, periodic_rate: f64, term_periods: u32, installment: f64) -> Self {
        Self {
            principal,
            periodic_rate,
            term_periods,
            installment,
            rows: Vec::with_capacity(term_periods as usize),
        }
    }

    /// Add a row
    pub fn add_row(&mut self, row: AmortizationRow) {
        self.rows.push(row);
    }

    /// Same schedule with every row scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            principal: self.principal * factor,
            periodic_rate: self.periodic_rate,
            term_periods: self.term_periods,
            installment: self.installment * factor,
            rows: self.rows.iter().map(|r| r.scaled(factor)).collect(),
        }
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let total_installments: f64 = self.rows.iter().map(|r| r.installment).sum();
        let total_interest: f64 = self.rows.iter().map(|r| r.interest).sum();
        let total_principal: f64 = self.rows.iter().map(|r| r.principal).sum();
        let total_vat: f64 = self.rows.iter().map(|r| r.vat_on_interest).sum();
        let total_stamp_tax: f64 = self.rows.iter().map(|r| r.stamp_tax).sum();
        let total_due: f64 = self.rows.iter().map(|r| r.total_due).sum();

        let final_balance = self.rows.last().map(|r| r.balance).unwrap_or(self.principal);

        ScheduleSummary {
            periods: self.rows.len() as u32,
            total_installments,
            total_interest,
            total_principal,
            total_vat,
            total_stamp_tax,
            total_due,
            final_balance,
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub total_installments: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_vat: f64,
    pub total_stamp_tax: f64,
    pub total_due: f64,
    pub final_balance: f64,
}
