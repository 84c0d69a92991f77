//! Load quota catalogs from CSV
//!
//! Expected columns: `product_key` (optional), `credit_value`, `installment_value`.
//! Rows without a key only appear in the unfiltered full list.

use super::{QuotaProduct, StaticCatalogProvider};
use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bundled sample catalog
pub const DEFAULT_CATALOG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/quota_catalog.csv");

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(default)]
    product_key: Option<String>,
    credit_value: f64,
    installment_value: f64,
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<(Option<String>, QuotaProduct)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in rdr.deserialize::<CatalogRow>().enumerate() {
        let row = record?;
        let product = QuotaProduct {
            credit_value: row.credit_value,
            installment_value: row.installment_value,
        };
        if !product.is_valid() {
            return Err(EngineError::InvalidProduct {
                index,
                credit_value: row.credit_value,
                installment_value: row.installment_value,
            });
        }
        let key = row.product_key.filter(|k| !k.is_empty());
        rows.push((key, product));
    }
    Ok(rows)
}

/// Load every product from a CSV reader, ignoring keys
pub fn load_catalog_from_reader<R: Read>(reader: R) -> Result<Vec<QuotaProduct>> {
    Ok(read_rows(reader)?.into_iter().map(|(_, p)| p).collect())
}

/// Load every product from a CSV file, ignoring keys
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<QuotaProduct>> {
    load_catalog_from_reader(File::open(path)?)
}

/// Load the bundled sample catalog
pub fn load_default_catalog() -> Result<Vec<QuotaProduct>> {
    load_catalog(DEFAULT_CATALOG_PATH)
}

/// Build a keyed provider from a CSV reader
///
/// Row order is preserved both in each keyed list and in the full list.
pub fn load_provider_from_reader<R: Read>(reader: R) -> Result<StaticCatalogProvider> {
    let rows = read_rows(reader)?;
    let mut by_key: HashMap<String, Vec<QuotaProduct>> = HashMap::new();
    let mut all = Vec::with_capacity(rows.len());

    for (key, product) in rows {
        if let Some(key) = key {
            by_key.entry(key).or_default().push(product);
        }
        all.push(product);
    }

    log::debug!("Loaded {} quota products under {} keys", all.len(), by_key.len());
    Ok(StaticCatalogProvider::new(by_key, all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogProvider;

    const SAMPLE: &str = "\
product_key,credit_value,installment_value
AUTO-60,100000,500
AUTO-60,50000,300
HOME-180,380000,3007.30
,25000,180
";

    #[test]
    fn test_load_from_reader() {
        let catalog = load_catalog_from_reader(SAMPLE.as_bytes()).expect("Failed to load");
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog[2].credit_value, 380_000.0);
        assert_eq!(catalog[2].installment_value, 3007.30);
    }

    #[test]
    fn test_load_without_key_column() {
        let csv = "credit_value,installment_value\n100000,500\n";
        let catalog = load_catalog_from_reader(csv.as_bytes()).expect("Failed to load");
        assert_eq!(catalog, vec![QuotaProduct { credit_value: 100_000.0, installment_value: 500.0 }]);
    }

    #[test]
    fn test_rejects_invalid_row() {
        let csv = "credit_value,installment_value\n100000,500\n50000,0\n";
        match load_catalog_from_reader(csv.as_bytes()) {
            Err(EngineError::InvalidProduct { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_number() {
        let csv = "credit_value,installment_value\nabc,500\n";
        assert!(matches!(load_catalog_from_reader(csv.as_bytes()), Err(EngineError::Csv(_))));
    }

    #[test]
    fn test_provider_groups_by_key() {
        let provider = load_provider_from_reader(SAMPLE.as_bytes()).expect("Failed to load");
        assert_eq!(provider.catalog("AUTO-60").unwrap().len(), 2);
        assert_eq!(provider.catalog("HOME-180").unwrap().len(), 1);
        // Unknown key falls back to the full list
        assert_eq!(provider.catalog("MOTO-36").unwrap().len(), 4);
    }

    #[test]
    fn test_default_catalog_loads() {
        let catalog = load_default_catalog().expect("Failed to load bundled catalog");
        assert!(!catalog.is_empty());
        assert!(catalog.iter().all(|p| p.is_valid()));
    }
}
