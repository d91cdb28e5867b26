//! Caller choice of which taxes to include

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tables::TaxKind;

/// Inclusion flag and optional rate override for one tax
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxChoice {
    pub included: bool,
    /// Overrides the table rate (used for the provincial IIBB rate)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// Which taxes to include in the cost, keyed by tax kind.
///
/// Kinds without an explicit choice are included at their table rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxSelection {
    #[serde(default)]
    choices: BTreeMap<TaxKind, TaxChoice>,
}

impl TaxSelection {
    /// Every tax included at its table rate
    pub fn all() -> Self {
        Self::default()
    }

    /// Every tax excluded
    pub fn none() -> Self {
        let choices = TaxKind::ALL
            .iter()
            .map(|&kind| (kind, TaxChoice { included: false, rate: None }))
            .collect();
        Self { choices }
    }

    /// Builder-style toggle
    pub fn with(mut self, kind: TaxKind, included: bool) -> Self {
        self.set_included(kind, included);
        self
    }

    /// Builder-style rate override (also marks the tax as included)
    pub fn with_rate(mut self, kind: TaxKind, rate: f64) -> Self {
        self.choices.insert(kind, TaxChoice { included: true, rate: Some(rate) });
        self
    }

    pub fn set_included(&mut self, kind: TaxKind, included: bool) {
        let rate = self.choices.get(&kind).and_then(|c| c.rate);
        self.choices.insert(kind, TaxChoice { included, rate });
    }

    pub fn is_included(&self, kind: TaxKind) -> bool {
        self.choices.get(&kind).map(|c| c.included).unwrap_or(true)
    }

    pub fn rate_override(&self, kind: TaxKind) -> Option<f64> {
        self.choices.get(&kind).and_then(|c| c.rate)
    }
}
