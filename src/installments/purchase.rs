//! Card purchases eligible for an installment plan

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    /// Only selected purchases go into the plan
    #[serde(default)]
    pub selected: bool,
}

impl Purchase {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            amount,
            selected: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// Sum of the selected purchases; every selected amount must be positive
pub fn selected_total(purchases: &[Purchase]) -> Result<f64> {
    purchases
        .iter()
        .filter(|p| p.selected)
        .map(|p| require_positive("purchase amount", p.amount))
        .sum()
}
