//! Installment conversion of foreign-currency purchases ("cuotificación")
//!
//! The selected total is grossed up with the import surcharges and split
//! into equal installments. The installment counts on offer depend on the
//! purchase total.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, Result, SimulationError};
use crate::tables::{InstallmentLimits, Product, RateTables};
use crate::taxes::{TaxBreakdown, TaxEngine, TaxSelection};
use super::purchase::{selected_total, Purchase};

/// Installment counts allowed for a purchase total
pub fn installment_options(total: f64, limits: &InstallmentLimits) -> &[u32] {
    if total <= limits.tier_threshold {
        &limits.short_tier
    } else {
        &limits.long_tier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub purchases: Vec<Purchase>,
    /// Selected purchases before surcharges
    pub subtotal: f64,
    pub taxes: TaxBreakdown,
    /// Subtotal plus surcharges
    pub total: f64,
    pub installments: u32,
    pub per_installment: f64,
    /// Counts the subtotal qualifies for
    pub options: Vec<u32>,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SimulationError>,
}

impl InstallmentPlan {
    fn invalid(purchases: Vec<Purchase>, installments: u32, error: SimulationError) -> Self {
        warn!("installment plan rejected: {}", error);
        Self {
            purchases,
            subtotal: 0.0,
            taxes: TaxBreakdown::default(),
            total: 0.0,
            installments,
            per_installment: 0.0,
            options: Vec::new(),
            is_valid: false,
            error: Some(error),
        }
    }
}

/// Builds installment plans from the rate tables' surcharges and tiers
pub struct InstallmentConverter<'a> {
    tables: &'a RateTables,
}

impl<'a> InstallmentConverter<'a> {
    pub fn new(tables: &'a RateTables) -> Self {
        Self { tables }
    }

    pub fn limits(&self) -> &InstallmentLimits {
        &self.tables.limits.installments
    }

    /// Plan for the selected purchases
    pub fn plan(&self, purchases: &[Purchase], installments: u32, selection: &TaxSelection) -> InstallmentPlan {
        let selected: Vec<Purchase> = purchases.iter().filter(|p| p.selected).cloned().collect();
        match self.build(purchases, installments, selection) {
            Ok((subtotal, taxes, per_installment)) => {
                let total = subtotal + taxes.total;
                InstallmentPlan {
                    purchases: selected,
                    subtotal,
                    total,
                    taxes,
                    installments,
                    per_installment,
                    options: installment_options(subtotal, self.limits()).to_vec(),
                    is_valid: true,
                    error: None,
                }
            }
            Err(err) => InstallmentPlan::invalid(selected, installments, err),
        }
    }

    /// Plan for a single amount with every surcharge applied
    pub fn plan_amount(&self, amount: f64, installments: u32) -> InstallmentPlan {
        let purchase = Purchase::new("purchase", amount).selected();
        self.plan(&[purchase], installments, &TaxSelection::all())
    }

    fn build(
        &self,
        purchases: &[Purchase],
        installments: u32,
        selection: &TaxSelection,
    ) -> Result<(f64, TaxBreakdown, f64)> {
        let subtotal = require_positive("selected total", selected_total(purchases)?)?;
        let limits = self.limits();
        if subtotal > limits.max_total {
            return Err(SimulationError::over_limit(
                Product::ForeignPurchase.name(),
                limits.max_total,
            ));
        }

        let options = installment_options(subtotal, limits);
        if !options.contains(&installments) {
            return Err(SimulationError::invalid(
                "installments",
                format!("{} is not one of {:?} for {:.2}", installments, options, subtotal),
            ));
        }

        let taxes = TaxEngine::new(self.tables).foreign_purchase(subtotal, selection)?;
        let per_installment = (subtotal + taxes.total) / installments as f64;

        debug!(
            "Installments for {:.2}: {} x {:.2} (surcharges {:.2})",
            subtotal, installments, per_installment, taxes.total
        );

        Ok((subtotal, taxes, per_installment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TaxKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_plan() {
        let tables = RateTables::default_argentina();
        let plan = InstallmentConverter::new(&tables).plan_amount(100_000.0, 3);

        assert!(plan.is_valid);
        assert_relative_eq!(plan.taxes.get(TaxKind::CountryTax), 30_000.0, epsilon = 1e-9);
        assert_relative_eq!(plan.taxes.get(TaxKind::WithholdingRg), 45_000.0, epsilon = 1e-9);
        assert_relative_eq!(plan.taxes.get(TaxKind::VatOnImportTaxes), 15_750.0, epsilon = 1e-9);
        assert_relative_eq!(plan.total, 190_750.0, epsilon = 1e-9);
        assert_relative_eq!(plan.per_installment, 63_583.33, epsilon = 0.01);
    }

    #[test]
    fn test_tiers() {
        let limits = InstallmentLimits::default();
        assert_eq!(installment_options(150_000.0, &limits), &[1, 2, 3]);
        assert_eq!(installment_options(150_000.01, &limits), &[1, 2, 3, 4, 5, 6]);

        let tables = RateTables::default_argentina();
        let converter = InstallmentConverter::new(&tables);
        assert!(!converter.plan_amount(150_000.0, 6).is_valid);
        let plan = converter.plan_amount(200_000.0, 6);
        assert!(plan.is_valid);
        assert_eq!(plan.options.len(), 6);
    }

    #[test]
    fn test_over_limit() {
        let tables = RateTables::default_argentina();
        let plan = InstallmentConverter::new(&tables).plan_amount(300_001.0, 3);
        assert!(!plan.is_valid);
        assert!(plan.error.unwrap().is_over_limit());
    }

    #[test]
    fn test_selected_purchases_only() {
        let tables = RateTables::default_argentina();
        let purchases = vec![
            Purchase::new("Course", 40_000.0).selected(),
            Purchase::new("Hotel", 500_000.0),
            Purchase::new("Software", 20_000.0).selected(),
        ];
        let plan = InstallmentConverter::new(&tables).plan(&purchases, 2, &TaxSelection::all());
        assert!(plan.is_valid);
        assert_eq!(plan.purchases.len(), 2);
        assert_relative_eq!(plan.subtotal, 60_000.0, epsilon = 1e-9);
        assert_relative_eq!(plan.total, 60_000.0 * 1.9075, epsilon = 1e-6);

        let nothing = InstallmentConverter::new(&tables).plan(&purchases[1..2], 1, &TaxSelection::all());
        assert!(!nothing.is_valid);
    }

    #[test]
    fn test_excluded_surcharges() {
        let tables = RateTables::default_argentina();
        let selection = TaxSelection::all().with(TaxKind::WithholdingRg, false);
        let purchases = vec![Purchase::new("Game", 10_000.0).selected()];
        let plan = InstallmentConverter::new(&tables).plan(&purchases, 1, &selection);
        // VAT falls on the country tax alone
        assert_relative_eq!(plan.taxes.get(TaxKind::VatOnImportTaxes), 630.0, epsilon = 1e-9);
        assert_relative_eq!(plan.total, 13_630.0, epsilon = 1e-9);
    }
}
