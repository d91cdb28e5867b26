//! Computed tax line items

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tables::TaxKind;

/// Amounts a product's tax rules are applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBases {
    pub principal: f64,
    pub interest: f64,
    pub purchase_amount: f64,
    pub property_value: f64,
}

impl TaxBases {
    /// Bases for a loan: principal and total interest
    pub fn loan(principal: f64, interest: f64) -> Self {
        Self {
            principal,
            interest,
            ..Default::default()
        }
    }

    pub fn purchase(amount: f64) -> Self {
        Self {
            purchase_amount: amount,
            ..Default::default()
        }
    }

    pub fn property(loan: f64, property_value: f64) -> Self {
        Self {
            principal: loan,
            property_value,
            ..Default::default()
        }
    }
}

/// Tax line items for one scenario.
///
/// Every rule of the product appears in `items`; excluded taxes are zero.
/// Always built from scratch by the tax engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub items: BTreeMap<TaxKind, f64>,
    pub total: f64,
}

impl TaxBreakdown {
    pub(crate) fn from_items(items: BTreeMap<TaxKind, f64>) -> Self {
        let total = items.values().sum();
        Self { items, total }
    }

    /// Amount of one line item (zero when the product does not charge it)
    pub fn get(&self, kind: TaxKind) -> f64 {
        self.items.get(&kind).copied().unwrap_or(0.0)
    }

    /// Line items that are non-zero, in a stable order
    pub fn charged(&self) -> impl Iterator<Item = (TaxKind, f64)> + '_ {
        self.items
            .iter()
            .filter(|(_, &amount)| amount != 0.0)
            .map(|(&kind, &amount)| (kind, amount))
    }
}
