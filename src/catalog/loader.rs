use crate::catalog::{PriceCatalog, SharedCatalog};
use crate::model::LoadError;
use crate::parser::parse_price_list;
use crate::source::PriceSource;
use tracing::{info, warn};

/// Fetches and parses the price list, propagating any failure.
pub async fn try_load(source: &dyn PriceSource) -> Result<PriceCatalog, LoadError> {
    let text = source.fetch().await?;
    let entries = parse_price_list(&text)?;
    info!("Loaded {} price entries from {}", entries.len(), source.describe());
    Ok(PriceCatalog::new(entries))
}

/// Loads the catalog, degrading to an empty one when the source is
/// unreadable or malformed.
pub async fn load(source: &dyn PriceSource) -> PriceCatalog {
    match try_load(source).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Error loading price list from {}: {}", source.describe(), e);
            PriceCatalog::empty()
        }
    }
}

/// Swaps a freshly loaded catalog in. On failure the current one stays.
pub async fn reload(source: &dyn PriceSource, catalog: &SharedCatalog) -> Result<usize, LoadError> {
    let fresh = try_load(source).await?;
    let entries = fresh.len();
    catalog.replace(fresh).await;
    Ok(entries)
}
