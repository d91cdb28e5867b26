//! Provincial gross-receipts (Ingresos Brutos) rates

use serde::{Deserialize, Serialize};

/// Lowest IIBB rate accepted for financial services
pub const MIN_GROSS_RECEIPTS_RATE: f64 = 0.03;

/// Highest IIBB rate accepted for financial services
pub const MAX_GROSS_RECEIPTS_RATE: f64 = 0.09;

/// Rate used when the caller does not pick a province
pub const DEFAULT_GROSS_RECEIPTS_RATE: f64 = 0.06;

/// IIBB rate for one jurisdiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRate {
    pub province: String,
    pub rate: f64,
}

/// Lookup of IIBB rates by province
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossReceiptsTable {
    rates: Vec<ProvinceRate>,
}

impl GrossReceiptsTable {
    pub fn from_loaded(rates: Vec<ProvinceRate>) -> Self {
        Self { rates }
    }

    /// Indicative rates for the main jurisdictions
    pub fn default_argentina() -> Self {
        let rates = [
            ("caba", 0.08),
            ("buenos_aires", 0.09),
            ("cordoba", 0.07),
            ("santa_fe", 0.06),
            ("mendoza", 0.05),
            ("tucuman", 0.06),
            ("neuquen", 0.04),
            ("tierra_del_fuego", 0.03),
        ]
        .into_iter()
        .map(|(province, rate)| ProvinceRate {
            province: province.to_string(),
            rate,
        })
        .collect();

        Self { rates }
    }

    /// Rate for a province (case-insensitive)
    pub fn rate_for(&self, province: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|p| p.province.eq_ignore_ascii_case(province))
            .map(|p| p.rate)
    }

    pub fn provinces(&self) -> impl Iterator<Item = &ProvinceRate> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Whether a rate lies in the accepted 3%–9% band
pub fn is_valid_gross_receipts_rate(rate: f64) -> bool {
    (MIN_GROSS_RECEIPTS_RATE..=MAX_GROSS_RECEIPTS_RATE).contains(&rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = GrossReceiptsTable::default_argentina();
        assert_eq!(table.rate_for("santa_fe"), Some(0.06));
        assert_eq!(table.rate_for("CABA"), Some(0.08));
        assert_eq!(table.rate_for("atlantis"), None);
    }

    #[test]
    fn test_defaults_within_band() {
        let table = GrossReceiptsTable::default_argentina();
        assert!(table.provinces().all(|p| is_valid_gross_receipts_rate(p.rate)));
        assert!(is_valid_gross_receipts_rate(DEFAULT_GROSS_RECEIPTS_RATE));
        assert!(!is_valid_gross_receipts_rate(0.10));
    }
}
