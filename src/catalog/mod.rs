// Catalog module: the price table and everything that builds or holds it.

pub mod loader;
pub mod price_catalog;
pub mod shared;

pub use loader::{load, reload};
pub use price_catalog::PriceCatalog;
pub use shared::SharedCatalog;
