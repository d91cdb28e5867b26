//! Product limits: ceilings, allowed terms, installment tiers and default rates

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Express loan: single repayment after a fixed number of days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressLimits {
    pub max_amount: f64,
    pub term_days: u32,
}

impl Default for ExpressLimits {
    fn default() -> Self {
        Self {
            max_amount: 1_000_000.0,
            term_days: 45,
        }
    }
}

/// Personal loan in pesos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalLimits {
    pub max_amount: f64,
    pub min_term_months: u32,
    pub max_term_months: u32,
    /// Terms are offered in multiples of this step
    pub term_step_months: u32,
}

impl Default for PersonalLimits {
    fn default() -> Self {
        Self {
            max_amount: 100_000_000.0,
            min_term_months: 6,
            max_term_months: 72,
            term_step_months: 6,
        }
    }
}

impl PersonalLimits {
    /// Terms offered to the user (6, 12, ... 72)
    pub fn term_options(&self) -> Vec<u32> {
        let step = self.term_step_months.max(1) as usize;
        (self.min_term_months..=self.max_term_months).step_by(step).collect()
    }

    pub fn allows_term(&self, months: u32) -> bool {
        let step = self.term_step_months.max(1);
        (self.min_term_months..=self.max_term_months).contains(&months)
            && (months - self.min_term_months) % step == 0
    }
}

/// UVA-indexed personal loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvaLimits {
    pub max_amount: f64,
    pub term_options: Vec<u32>,
    /// TNA applied over UVA balances
    pub nominal_annual_rate: f64,
}

impl Default for UvaLimits {
    fn default() -> Self {
        Self {
            max_amount: 10_000_000.0,
            term_options: vec![12, 18, 24],
            nominal_annual_rate: 0.24,
        }
    }
}

/// Installment plans for foreign-currency card purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentLimits {
    pub max_total: f64,
    /// Totals at or below this get the short tier
    pub tier_threshold: f64,
    pub short_tier: Vec<u32>,
    pub long_tier: Vec<u32>,
}

impl Default for InstallmentLimits {
    fn default() -> Self {
        Self {
            max_total: 300_000.0,
            tier_threshold: 150_000.0,
            short_tier: vec![1, 2, 3],
            long_tier: vec![1, 2, 3, 4, 5, 6],
        }
    }
}

/// Time deposit ("frasco") terms with their default TNA in percentage points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositLimits {
    pub terms: Vec<DepositTerm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositTerm {
    pub days: u32,
    pub default_tna_pct: f64,
}

impl Default for DepositLimits {
    fn default() -> Self {
        Self {
            terms: vec![
                DepositTerm { days: 28, default_tna_pct: 50.0 },
                DepositTerm { days: 14, default_tna_pct: 46.0 },
                DepositTerm { days: 7, default_tna_pct: 43.0 },
            ],
        }
    }
}

impl DepositLimits {
    pub fn default_tna_pct(&self, days: u32) -> Option<f64> {
        self.terms.iter().find(|t| t.days == days).map(|t| t.default_tna_pct)
    }

    pub fn allows_term(&self, days: u32) -> bool {
        self.terms.iter().any(|t| t.days == days)
    }
}

/// Longest term accepted for refinancing and mortgage loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTermLimits {
    pub max_term_years: f64,
}

impl Default for LoanTermLimits {
    fn default() -> Self {
        Self { max_term_years: 50.0 }
    }
}

impl LoanTermLimits {
    pub fn check(&self, term_years: f64) -> Result<()> {
        if term_years > self.max_term_years {
            return Err(SimulationError::invalid(
                "term",
                format!("must be at most {} years, got {}", self.max_term_years, term_years),
            ));
        }
        Ok(())
    }
}

/// All product limits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductLimits {
    pub express: ExpressLimits,
    pub personal: PersonalLimits,
    pub uva: UvaLimits,
    pub installments: InstallmentLimits,
    pub deposits: DepositLimits,
    #[serde(default)]
    pub loan_term: LoanTermLimits,
}
