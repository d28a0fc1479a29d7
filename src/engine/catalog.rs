//! Product and provider maintenance

use tracing::info;

use super::{expect_rows, EngineError, EngineResult};
use crate::core::identity::{ProductId, ProviderId};
use crate::core::store::{CatalogStore, Page, PageRequest};
use crate::entities::product::{NewProduct, Product, ProductPatch};
use crate::entities::provider::{NewProvider, Provider, ProviderPatch, RUC_MAX_LEN};

pub fn load_product<S: CatalogStore>(store: &S, id: ProductId) -> EngineResult<Product> {
    store
        .get_product(id)?
        .ok_or_else(|| EngineError::not_found("Product", id))
}

pub fn load_provider<S: CatalogStore>(store: &S, id: ProviderId) -> EngineResult<Provider> {
    store
        .get_provider(id)?
        .ok_or_else(|| EngineError::not_found("Provider", id))
}

fn require_name(name: Option<&str>, what: &str) -> EngineResult<()> {
    match name {
        Some(n) if n.trim().is_empty() => {
            Err(EngineError::Validation(format!("{} name cannot be empty", what)))
        }
        _ => Ok(()),
    }
}

/// Check ruc length and that no other provider already uses it
fn check_ruc<S: CatalogStore>(
    store: &S,
    ruc: Option<&str>,
    exclude: Option<ProviderId>,
) -> EngineResult<()> {
    let Some(ruc) = ruc else {
        return Ok(());
    };
    if ruc.trim().is_empty() || ruc.len() > RUC_MAX_LEN {
        return Err(EngineError::Validation(format!(
            "RUC must be 1 to {} characters, got '{}'",
            RUC_MAX_LEN, ruc
        )));
    }
    if let Some(existing) = store.provider_by_ruc(ruc)? {
        if Some(existing.id) != exclude {
            return Err(EngineError::IntegrityViolation(format!(
                "RUC {} is already registered to {} ({})",
                ruc, existing.id, existing.name
            )));
        }
    }
    Ok(())
}

pub fn create_product<S: CatalogStore>(store: &S, new: &NewProduct) -> EngineResult<Product> {
    require_name(Some(&new.name), "Product")?;
    let id = store.create_product(new)?;
    info!(product = %id, name = %new.name, "created product");
    load_product(store, id)
}

pub fn update_product<S: CatalogStore>(
    store: &S,
    id: ProductId,
    patch: &ProductPatch,
) -> EngineResult<Product> {
    require_name(patch.name.as_deref(), "Product")?;
    load_product(store, id)?;
    expect_rows(store.update_product(id, patch)?, "product", id)?;
    load_product(store, id)
}

pub fn list_products<S: CatalogStore>(store: &S, page: &PageRequest) -> EngineResult<Page<Product>> {
    Ok(store.list_products(page)?)
}

pub fn create_provider<S: CatalogStore>(store: &S, new: &NewProvider) -> EngineResult<Provider> {
    require_name(Some(&new.name), "Provider")?;
    check_ruc(store, new.ruc.as_deref(), None)?;
    let id = store.create_provider(new)?;
    info!(provider = %id, name = %new.name, "created provider");
    load_provider(store, id)
}

pub fn update_provider<S: CatalogStore>(
    store: &S,
    id: ProviderId,
    patch: &ProviderPatch,
) -> EngineResult<Provider> {
    require_name(patch.name.as_deref(), "Provider")?;
    load_provider(store, id)?;
    check_ruc(store, patch.ruc.as_deref(), Some(id))?;
    expect_rows(store.update_provider(id, patch)?, "provider", id)?;
    load_provider(store, id)
}

pub fn list_providers<S: CatalogStore>(
    store: &S,
    page: &PageRequest,
) -> EngineResult<Page<Provider>> {
    Ok(store.list_providers(page)?)
}
