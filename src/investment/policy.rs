//! Early-withdrawal rule for time deposits

use serde::{Deserialize, Serialize};

/// Shown with every deposit simulation
pub const EARLY_WITHDRAWAL_EXPLANATION: &str =
    "Cancelling the deposit before its term ends forfeits the yield: only the principal is returned.";

/// What the depositor gets back when withdrawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalOutcome {
    /// Principal plus earnings
    KeepsEarnings,
    /// Principal only
    ForfeitsEarnings,
}

impl WithdrawalOutcome {
    pub fn keeps_earnings(&self) -> bool {
        matches!(self, WithdrawalOutcome::KeepsEarnings)
    }
}

/// Earnings are kept only once the full term has elapsed
pub fn withdrawal_rule(days_elapsed: u32, term_days: u32) -> WithdrawalOutcome {
    if days_elapsed >= term_days {
        WithdrawalOutcome::KeepsEarnings
    } else {
        WithdrawalOutcome::ForfeitsEarnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdrawal_rule() {
        assert_eq!(withdrawal_rule(0, 28), WithdrawalOutcome::ForfeitsEarnings);
        assert_eq!(withdrawal_rule(27, 28), WithdrawalOutcome::ForfeitsEarnings);
        assert!(withdrawal_rule(28, 28).keeps_earnings());
        assert!(withdrawal_rule(40, 7).keeps_earnings());
    }
}
