//! Rate tables: tax rules per product, provincial IIBB rates and product limits
//!
//! Every hardcoded percentage used by the simulators lives here.

mod taxes;
mod provinces;
mod limits;
pub mod loader;

pub use taxes::{TaxKind, TaxBase, TaxRule, TaxRuleSet};
pub use provinces::{
    GrossReceiptsTable, ProvinceRate, is_valid_gross_receipts_rate,
    DEFAULT_GROSS_RECEIPTS_RATE, MIN_GROSS_RECEIPTS_RATE, MAX_GROSS_RECEIPTS_RATE,
};
pub use limits::{
    ProductLimits, ExpressLimits, PersonalLimits, UvaLimits, InstallmentLimits,
    DepositLimits, DepositTerm, LoanTermLimits,
};

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Simulated products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    DebtRefinancing,
    Express,
    Personal,
    PersonalUva,
    ForeignPurchase,
    Mortgage,
}

impl Product {
    pub const ALL: [Product; 6] = [
        Product::DebtRefinancing,
        Product::Express,
        Product::Personal,
        Product::PersonalUva,
        Product::ForeignPurchase,
        Product::Mortgage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Product::DebtRefinancing => "debt_refinancing",
            Product::Express => "express",
            Product::Personal => "personal",
            Product::PersonalUva => "personal_uva",
            Product::ForeignPurchase => "foreign_purchase",
            Product::Mortgage => "mortgage",
        }
    }
}

/// Container for all rate tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTables {
    pub tax_rules: Vec<TaxRuleSet>,
    pub gross_receipts: GrossReceiptsTable,
    pub limits: ProductLimits,
}

impl RateTables {
    /// Create tables with the default Argentine rates
    pub fn default_argentina() -> Self {
        Self {
            tax_rules: Product::ALL.iter().map(|&p| TaxRuleSet::default_for(p)).collect(),
            gross_receipts: GrossReceiptsTable::default_argentina(),
            limits: ProductLimits::default(),
        }
    }

    /// Load tables from CSV files in the default location (data/rates/)
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_RATES_PATH))
    }

    /// Load tables from CSV files in a specific directory.
    ///
    /// Products missing from `tax_rules.csv` keep their default rules.
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut tables = Self::default_argentina();

        for loaded in loader::load_tax_rules(path)? {
            match tables.tax_rules.iter_mut().find(|s| s.product == loaded.product) {
                Some(existing) => *existing = loaded,
                None => tables.tax_rules.push(loaded),
            }
        }
        tables.gross_receipts = GrossReceiptsTable::from_loaded(loader::load_provinces(path)?);

        Ok(tables)
    }

    /// Tax rules for a product, falling back to the defaults
    pub fn rules_for(&self, product: Product) -> TaxRuleSet {
        self.tax_rules
            .iter()
            .find(|s| s.product == product)
            .cloned()
            .unwrap_or_else(|| TaxRuleSet::default_for(product))
    }
}

impl Default for RateTables {
    fn default() -> Self {
        Self::default_argentina()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_every_product() {
        let tables = RateTables::default_argentina();
        for product in Product::ALL {
            assert_eq!(tables.rules_for(product).product, product);
            assert!(tables.rules_for(product).is_ordered());
        }
    }

    #[test]
    fn test_csv_tables_match_defaults() {
        let loaded = RateTables::from_csv().expect("Failed to load rate tables");
        let defaults = RateTables::default_argentina();
        for product in Product::ALL {
            assert_eq!(loaded.rules_for(product), defaults.rules_for(product));
        }
        assert_eq!(loaded.gross_receipts, defaults.gross_receipts);
    }
}
