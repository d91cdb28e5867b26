//! CSV-based rate table loader
//!
//! Loads tax rules and provincial IIBB rates from CSV files in data/rates/

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::provinces::ProvinceRate;
use super::taxes::{TaxBase, TaxKind, TaxRule, TaxRuleSet};
use super::Product;

/// Default path to the rate tables directory
pub const DEFAULT_RATES_PATH: &str = "data/rates";

/// Raw row of tax_rules.csv
#[derive(Debug, serde::Deserialize)]
struct TaxRuleRow {
    product: Product,
    kind: TaxKind,
    base: TaxBase,
    rate: f64,
}

/// Load tax rules grouped by product, preserving file order within a product
pub fn load_tax_rules_from_reader<R: Read>(reader: R) -> Result<Vec<TaxRuleSet>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut grouped: HashMap<Product, Vec<TaxRule>> = HashMap::new();
    let mut order = Vec::new();

    for result in csv_reader.deserialize() {
        let row: TaxRuleRow = result?;
        if !(0.0..=1.0).contains(&row.rate) {
            return Err(format!("Rate out of range for {:?}/{:?}: {}", row.product, row.kind, row.rate).into());
        }
        if !grouped.contains_key(&row.product) {
            order.push(row.product);
        }
        grouped
            .entry(row.product)
            .or_default()
            .push(TaxRule::new(row.kind, row.base, row.rate));
    }

    let mut sets = Vec::with_capacity(order.len());
    for product in order {
        let rules = grouped.remove(&product).unwrap_or_default();
        let set = TaxRuleSet { product, rules };
        if !set.is_ordered() {
            return Err(format!("Import-tax VAT listed before its base taxes for {:?}", product).into());
        }
        sets.push(set);
    }

    Ok(sets)
}

/// Load tax rules from `tax_rules.csv` in a directory
pub fn load_tax_rules(path: &Path) -> Result<Vec<TaxRuleSet>, Box<dyn Error>> {
    let file = File::open(path.join("tax_rules.csv"))?;
    load_tax_rules_from_reader(file)
}

/// Load provincial IIBB rates from any reader
pub fn load_provinces_from_reader<R: Read>(reader: R) -> Result<Vec<ProvinceRate>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rates = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let province = record[0].trim().to_string();
        let rate: f64 = record[1].trim().parse()?;
        rates.push(ProvinceRate { province, rate });
    }

    Ok(rates)
}

/// Load provincial IIBB rates from `iibb_provinces.csv` in a directory
pub fn load_provinces(path: &Path) -> Result<Vec<ProvinceRate>, Box<dyn Error>> {
    let file = File::open(path.join("iibb_provinces.csv"))?;
    load_provinces_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_tax_rules_from_reader() {
        let data = "product,kind,base,rate\n\
                    foreign_purchase,country_tax,purchase_amount,0.30\n\
                    foreign_purchase,withholding_rg,purchase_amount,0.45\n\
                    foreign_purchase,vat_on_import_taxes,import_taxes,0.21\n\
                    express,vat_on_interest,interest,0.21\n";

        let sets = load_tax_rules_from_reader(data.as_bytes()).expect("valid csv");
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].product, Product::ForeignPurchase);
        assert_eq!(sets[0].rules.len(), 3);
        assert_eq!(sets[0].rules[2].kind, TaxKind::VatOnImportTaxes);
        assert_eq!(sets[1].rate_of(TaxKind::VatOnInterest), Some(0.21));
    }

    #[test]
    fn test_rejects_misordered_import_vat() {
        let data = "product,kind,base,rate\n\
                    foreign_purchase,vat_on_import_taxes,import_taxes,0.21\n\
                    foreign_purchase,country_tax,purchase_amount,0.30\n\
                    foreign_purchase,withholding_rg,purchase_amount,0.45\n";

        assert!(load_tax_rules_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_bad_rate() {
        let data = "product,kind,base,rate\nexpress,stamp_tax,principal,1.5\n";
        assert!(load_tax_rules_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_provinces() {
        let data = "province,rate\nsalta,0.05\njujuy , 0.045\n";
        let rates = load_provinces_from_reader(data.as_bytes()).expect("valid csv");
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1].province, "jujuy");
        assert!((rates[1].rate - 0.045).abs() < 1e-12);
    }

    #[test]
    fn test_load_shipped_tables() {
        let path = Path::new(DEFAULT_RATES_PATH);
        let sets = load_tax_rules(path).expect("Failed to load tax rules");
        assert_eq!(sets.len(), 6);
        let provinces = load_provinces(path).expect("Failed to load provinces");
        assert!(!provinces.is_empty());
    }
}
