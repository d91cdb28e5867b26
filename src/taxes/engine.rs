//! Tax engine: applies a product's ordered tax rules to its bases

use std::collections::BTreeMap;

use log::debug;

use crate::error::{require_non_negative, Result, SimulationError};
use crate::tables::{
    is_valid_gross_receipts_rate, Product, RateTables, TaxBase, TaxKind, TaxRuleSet,
    DEFAULT_GROSS_RECEIPTS_RATE,
};
use super::breakdown::{TaxBases, TaxBreakdown};
use super::selection::TaxSelection;

/// Apply `rules` in order.
///
/// Excluded taxes contribute zero. The `ImportTaxes` base is the running sum
/// of the country-tax and withholding items computed before it.
pub fn compute_taxes(rules: &TaxRuleSet, bases: &TaxBases, selection: &TaxSelection) -> Result<TaxBreakdown> {
    require_non_negative("principal", bases.principal)?;
    require_non_negative("interest", bases.interest)?;
    require_non_negative("purchase amount", bases.purchase_amount)?;
    require_non_negative("property value", bases.property_value)?;

    let mut items = BTreeMap::new();
    let mut import_taxes = 0.0;

    for rule in &rules.rules {
        let rate = selection.rate_override(rule.kind).unwrap_or(rule.rate);
        if !(0.0..=1.0).contains(&rate) {
            return Err(SimulationError::invalid(
                "tax rate",
                format!("{:?} rate must be between 0 and 1, got {}", rule.kind, rate),
            ));
        }

        let base = match rule.base {
            TaxBase::Interest => bases.interest,
            TaxBase::Principal => bases.principal,
            TaxBase::PurchaseAmount => bases.purchase_amount,
            TaxBase::ImportTaxes => import_taxes,
            TaxBase::PropertyValue => bases.property_value,
        };

        let amount = if selection.is_included(rule.kind) { base * rate } else { 0.0 };

        if matches!(rule.kind, TaxKind::CountryTax | TaxKind::WithholdingRg) {
            import_taxes += amount;
        }
        items.insert(rule.kind, amount);
    }

    let breakdown = TaxBreakdown::from_items(items);
    debug!("{:?} taxes: total {:.2}", rules.product, breakdown.total);
    Ok(breakdown)
}

/// Per-product tax calculations over a set of rate tables
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    tables: &'a RateTables,
}

impl<'a> TaxEngine<'a> {
    pub fn new(tables: &'a RateTables) -> Self {
        Self { tables }
    }

    /// Refinancing taxes: VAT and IIBB on total interest; check tax, stamp
    /// tax and municipal levies on principal.
    ///
    /// `gross_receipts_rate` defaults to 6% and must lie within 3%–9%.
    pub fn debt_refinancing(
        &self,
        principal: f64,
        total_interest: f64,
        gross_receipts_rate: Option<f64>,
        selection: &TaxSelection,
    ) -> Result<TaxBreakdown> {
        let iibb = gross_receipts_rate
            .or_else(|| selection.rate_override(TaxKind::GrossReceipts))
            .unwrap_or(DEFAULT_GROSS_RECEIPTS_RATE);
        if !is_valid_gross_receipts_rate(iibb) {
            return Err(SimulationError::invalid(
                "gross receipts rate",
                format!("must be between 3% and 9%, got {:.2}%", iibb * 100.0),
            ));
        }

        let mut selection = selection.clone();
        let included = selection.is_included(TaxKind::GrossReceipts);
        selection = selection.with_rate(TaxKind::GrossReceipts, iibb);
        selection.set_included(TaxKind::GrossReceipts, included);

        compute_taxes(
            &self.tables.rules_for(Product::DebtRefinancing),
            &TaxBases::loan(principal, total_interest),
            &selection,
        )
    }

    /// Express loan: VAT on interest plus sellado on principal
    pub fn express(&self, principal: f64, interest: f64) -> Result<TaxBreakdown> {
        compute_taxes(
            &self.tables.rules_for(Product::Express),
            &TaxBases::loan(principal, interest),
            &TaxSelection::all(),
        )
    }

    /// Personal loan: VAT on total interest plus sellado on principal
    pub fn personal(&self, principal: f64, total_interest: f64) -> Result<TaxBreakdown> {
        compute_taxes(
            &self.tables.rules_for(Product::Personal),
            &TaxBases::loan(principal, total_interest),
            &TaxSelection::all(),
        )
    }

    /// UVA loan: VAT on interest only (bases may be in UVA or pesos)
    pub fn personal_uva(&self, principal: f64, total_interest: f64) -> Result<TaxBreakdown> {
        compute_taxes(
            &self.tables.rules_for(Product::PersonalUva),
            &TaxBases::loan(principal, total_interest),
            &TaxSelection::all(),
        )
    }

    /// Foreign-currency purchase surcharges
    pub fn foreign_purchase(&self, amount: f64, selection: &TaxSelection) -> Result<TaxBreakdown> {
        compute_taxes(
            &self.tables.rules_for(Product::ForeignPurchase),
            &TaxBases::purchase(amount),
            selection,
        )
    }

    /// Mortgage closing costs on the loan and the property value
    pub fn mortgage_closing(&self, loan: f64, property_value: f64, selection: &TaxSelection) -> Result<TaxBreakdown> {
        compute_taxes(
            &self.tables.rules_for(Product::Mortgage),
            &TaxBases::property(loan, property_value),
            selection,
        )
    }

    /// VAT rate a product charges on interest (zero when it charges none)
    pub fn vat_on_interest_rate(&self, product: Product) -> f64 {
        self.tables
            .rules_for(product)
            .rate_of(TaxKind::VatOnInterest)
            .unwrap_or(0.0)
    }

    /// Stamp tax rate a product charges on principal
    pub fn stamp_tax_rate(&self, product: Product) -> f64 {
        self.tables
            .rules_for(product)
            .rate_of(TaxKind::StampTax)
            .unwrap_or(0.0)
    }
}
