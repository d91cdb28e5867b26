//! Per-product tax rules: which taxes apply, on which base, at which rate

use serde::{Deserialize, Serialize};

use super::Product;

/// Tax line items known to the simulators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    /// IVA on interest
    VatOnInterest,
    /// Impuesto al cheque (debits and credits tax)
    CheckTax,
    /// Ingresos Brutos, provincial
    GrossReceipts,
    /// Sellos
    StampTax,
    /// Municipal levies
    Municipal,
    /// Impuesto PAIS on foreign-currency purchases
    CountryTax,
    /// RG 4815 income-tax withholding on foreign-currency purchases
    WithholdingRg,
    /// IVA charged on top of the two import taxes
    VatOnImportTaxes,
    /// Escribano / deed fees on a mortgage
    NotaryFees,
    /// Tasación of the property
    Appraisal,
}

impl TaxKind {
    pub const ALL: [TaxKind; 10] = [
        TaxKind::VatOnInterest,
        TaxKind::CheckTax,
        TaxKind::GrossReceipts,
        TaxKind::StampTax,
        TaxKind::Municipal,
        TaxKind::CountryTax,
        TaxKind::WithholdingRg,
        TaxKind::VatOnImportTaxes,
        TaxKind::NotaryFees,
        TaxKind::Appraisal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaxKind::VatOnInterest => "IVA sobre intereses",
            TaxKind::CheckTax => "Impuesto al cheque",
            TaxKind::GrossReceipts => "Ingresos Brutos",
            TaxKind::StampTax => "Sellos",
            TaxKind::Municipal => "Tasa municipal",
            TaxKind::CountryTax => "Impuesto PAIS",
            TaxKind::WithholdingRg => "Percepción RG 4815",
            TaxKind::VatOnImportTaxes => "IVA sobre impuestos",
            TaxKind::NotaryFees => "Gastos de escrituración",
            TaxKind::Appraisal => "Tasación",
        }
    }
}

/// Amount a tax rate is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// Total interest of the loan (or of the row, for per-row VAT)
    Interest,
    /// Loan principal
    Principal,
    /// Purchase subtotal before taxes
    PurchaseAmount,
    /// Sum of the country tax and withholding line items computed before it
    ImportTaxes,
    /// Appraised property value
    PropertyValue,
}

/// One line of a product's tax table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    pub kind: TaxKind,
    pub base: TaxBase,
    pub rate: f64,
}

impl TaxRule {
    pub const fn new(kind: TaxKind, base: TaxBase, rate: f64) -> Self {
        Self { kind, base, rate }
    }
}

/// Ordered tax rules for one product.
///
/// Rules are evaluated in order, so a rule on `TaxBase::ImportTaxes` must
/// come after the rules it depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRuleSet {
    pub product: Product,
    pub rules: Vec<TaxRule>,
}

impl TaxRuleSet {
    /// Default rules for a product
    pub fn default_for(product: Product) -> Self {
        use TaxBase::*;
        use TaxKind::*;

        let rules = match product {
            Product::DebtRefinancing => vec![
                TaxRule::new(VatOnInterest, Interest, 0.21),
                TaxRule::new(CheckTax, Principal, 0.006),
                TaxRule::new(GrossReceipts, Interest, 0.06),
                TaxRule::new(StampTax, Principal, 0.01),
                TaxRule::new(Municipal, Principal, 0.02),
            ],
            Product::Express => vec![
                TaxRule::new(VatOnInterest, Interest, 0.21),
                TaxRule::new(StampTax, Principal, 0.01),
            ],
            Product::Personal => vec![
                TaxRule::new(VatOnInterest, Interest, 0.21),
                TaxRule::new(StampTax, Principal, 0.012),
            ],
            Product::PersonalUva => vec![TaxRule::new(VatOnInterest, Interest, 0.21)],
            Product::ForeignPurchase => vec![
                TaxRule::new(CountryTax, PurchaseAmount, 0.30),
                TaxRule::new(WithholdingRg, PurchaseAmount, 0.45),
                TaxRule::new(VatOnImportTaxes, ImportTaxes, 0.21),
            ],
            Product::Mortgage => vec![
                TaxRule::new(StampTax, Principal, 0.01),
                TaxRule::new(NotaryFees, PropertyValue, 0.02),
                TaxRule::new(Appraisal, PropertyValue, 0.005),
            ],
        };

        Self { product, rules }
    }

    /// Rate configured for a tax kind, if the product charges it
    pub fn rate_of(&self, kind: TaxKind) -> Option<f64> {
        self.rules.iter().find(|r| r.kind == kind).map(|r| r.rate)
    }

    /// Check that every `ImportTaxes` rule follows both import-tax rules
    pub fn is_ordered(&self) -> bool {
        let mut seen_country = false;
        let mut seen_withholding = false;
        for rule in &self.rules {
            match rule.kind {
                TaxKind::CountryTax => seen_country = true,
                TaxKind::WithholdingRg => seen_withholding = true,
                _ => {}
            }
            if rule.base == TaxBase::ImportTaxes && !(seen_country && seen_withholding) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let debt = TaxRuleSet::default_for(Product::DebtRefinancing);
        assert_eq!(debt.rate_of(TaxKind::VatOnInterest), Some(0.21));
        assert_eq!(debt.rate_of(TaxKind::CheckTax), Some(0.006));
        assert_eq!(debt.rate_of(TaxKind::StampTax), Some(0.01));
        assert_eq!(debt.rate_of(TaxKind::Municipal), Some(0.02));
        assert_eq!(debt.rate_of(TaxKind::CountryTax), None);

        // Personal loans use a heavier sellado than express loans
        let personal = TaxRuleSet::default_for(Product::Personal);
        let express = TaxRuleSet::default_for(Product::Express);
        assert_eq!(personal.rate_of(TaxKind::StampTax), Some(0.012));
        assert_eq!(express.rate_of(TaxKind::StampTax), Some(0.01));
    }

    #[test]
    fn test_import_tax_ordering() {
        let purchase = TaxRuleSet::default_for(Product::ForeignPurchase);
        assert!(purchase.is_ordered());

        let mut reversed = purchase.clone();
        reversed.rules.reverse();
        assert!(!reversed.is_ordered());
    }
}
