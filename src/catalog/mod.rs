//! Quota catalog data structures, CSV loading and keyed lookup

mod data;
pub mod loader;
pub mod provider;

pub use data::{validate_catalog, QuotaProduct};
pub use loader::{load_catalog, load_catalog_from_reader, load_default_catalog, load_provider_from_reader};
pub use provider::{CatalogProvider, StaticCatalogProvider};
