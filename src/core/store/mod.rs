//! Persistent store - requirements, quotations and catalog records in SQLite
//!
//! The store is split into repository traits by concern. `SqliteStore`
//! implements all of them over a borrowed connection, so the same code runs
//! against a plain connection for reads and against an open transaction for
//! writes (a `rusqlite::Transaction` derefs to its `Connection`).
//!
//! Store methods report raw outcomes: `Option` for lookups and affected-row
//! counts for updates. Turning those into domain errors is the engine's job.

mod schema;
mod serialize;
mod sqlite;


use serde::Serialize;

use crate::core::identity::{DetailId, LineId, ProductId, ProviderId, QuotationId, RequirementId};
use crate::core::lifecycle::RequirementState;
use crate::entities::product::{NewProduct, Product, ProductPatch};
use crate::entities::provider::{NewProvider, Provider, ProviderPatch};
use crate::entities::quotation::{NewQuotation, Quotation, QuotationDetail, QuotationPatch};
use crate::entities::requirement::{
    LinePatch, NewRequirement, NewRequirementLine, Requirement, RequirementLine, RequirementPatch,
};

pub use schema::SCHEMA_VERSION;
pub use sqlite::{Database, SqliteStore};

pub type StoreResult<T> = Result<T, rusqlite::Error>;

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Paging and free-text search for list queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Case-insensitive substring filter
    pub search: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(search: Option<String>, page: u32, limit: u32) -> Self {
        Self {
            search: search.filter(|s| !s.trim().is_empty()),
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Row offset of the first item on this page
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit as i64
    }

    /// `LIKE` pattern for the search term, `%` when absent
    pub fn like_pattern(&self) -> String {
        match &self.search {
            Some(s) => format!("%{}%", s.trim().to_lowercase()),
            None => "%".to_string(),
        }
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> u32 {
        if self.total <= 0 {
            return 0;
        }
        ((self.total + self.limit as i64 - 1) / self.limit as i64) as u32
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// A name with an occurrence count, for statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedName {
    pub name: String,
    pub count: i64,
}

/// Requirements and their lines
pub trait RequirementStore {
    /// Insert the header and every line; returns the new id
    ///
    /// Fails with a constraint violation when `new` has no lines.
    fn create_requirement(&self, new: &NewRequirement) -> StoreResult<RequirementId>;

    /// Fetch a requirement with its lines
    fn get_requirement(&self, id: RequirementId) -> StoreResult<Option<Requirement>>;

    fn update_requirement(&self, id: RequirementId, patch: &RequirementPatch)
        -> StoreResult<usize>;

    /// Returns affected rows
    fn set_state(&self, id: RequirementId, state: RequirementState) -> StoreResult<usize>;

    /// Lines in creation order
    fn lines(&self, id: RequirementId) -> StoreResult<Vec<RequirementLine>>;

    fn get_line(&self, id: LineId) -> StoreResult<Option<RequirementLine>>;

    fn add_line(&self, requirement: RequirementId, line: &NewRequirementLine)
        -> StoreResult<LineId>;

    fn update_line(&self, id: LineId, patch: &LinePatch) -> StoreResult<usize>;

    fn delete_line(&self, id: LineId) -> StoreResult<usize>;

    /// Delete the header and its lines
    fn delete_requirement(&self, id: RequirementId) -> StoreResult<usize>;

    /// Newest first, filtered by state (empty slice means any state) and by
    /// name, destination or claimant
    fn list_requirements(
        &self,
        states: &[RequirementState],
        page: &PageRequest,
    ) -> StoreResult<Page<Requirement>>;

    /// Count of requirements per state, in state order, including zeros
    fn count_by_state(&self) -> StoreResult<Vec<(RequirementState, i64)>>;
}

/// Quotation headers and their details
pub trait QuotationStore {
    /// Insert the header (level 0, not winner) and every detail
    fn create_quotation(&self, new: &NewQuotation) -> StoreResult<QuotationId>;

    /// Fetch a quotation with its details
    fn get_quotation(&self, id: QuotationId) -> StoreResult<Option<Quotation>>;

    /// Headers of a requirement's quotations, in creation order
    fn list_by_requirement(&self, requirement: RequirementId) -> StoreResult<Vec<Quotation>>;

    fn count_by_requirement(&self, requirement: RequirementId) -> StoreResult<i64>;

    /// Details of one quotation, in line order
    fn details(&self, quotation: QuotationId) -> StoreResult<Vec<QuotationDetail>>;

    /// Details of every quotation of a requirement, by quotation then line
    fn details_by_requirement(
        &self,
        requirement: RequirementId,
    ) -> StoreResult<Vec<QuotationDetail>>;

    fn get_detail(&self, id: DetailId) -> StoreResult<Option<QuotationDetail>>;

    fn update_detail_price(&self, id: DetailId, unit_price: f64) -> StoreResult<usize>;

    fn update_quotation(&self, id: QuotationId, patch: &QuotationPatch) -> StoreResult<usize>;

    /// Clear the winner flag on every quotation of a requirement
    fn clear_winners(&self, requirement: RequirementId) -> StoreResult<usize>;

    fn set_winner(&self, id: QuotationId, winner: bool) -> StoreResult<usize>;

    fn set_winner_level(&self, id: QuotationId, level: u32) -> StoreResult<usize>;

    /// Delete the details then the header
    fn delete_quotation(&self, id: QuotationId) -> StoreResult<usize>;

    /// Number of details pointing at a line
    fn detail_references(&self, line: LineId) -> StoreResult<i64>;

    /// The winning quotation of a requirement, with details
    fn winner_of(&self, requirement: RequirementId) -> StoreResult<Option<Quotation>>;
}

/// Products and providers
pub trait CatalogStore {
    fn create_product(&self, new: &NewProduct) -> StoreResult<ProductId>;

    fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    fn update_product(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<usize>;

    /// Newest first, filtered by name
    fn list_products(&self, page: &PageRequest) -> StoreResult<Page<Product>>;

    fn create_provider(&self, new: &NewProvider) -> StoreResult<ProviderId>;

    fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>>;

    fn provider_by_ruc(&self, ruc: &str) -> StoreResult<Option<Provider>>;

    fn update_provider(&self, id: ProviderId, patch: &ProviderPatch) -> StoreResult<usize>;

    /// Newest first, filtered by name or ruc
    fn list_providers(&self, page: &PageRequest) -> StoreResult<Page<Provider>>;
}

/// Aggregate queries for the dashboard report
pub trait StatisticsStore {
    /// Providers with the most won quotations
    fn top_winning_providers(&self, limit: u32) -> StoreResult<Vec<RankedName>>;

    /// Products appearing on the most requirement lines
    fn top_requested_products(&self, limit: u32) -> StoreResult<Vec<RankedName>>;

    /// Authors who recorded the most requirements
    fn top_requesting_authors(&self, limit: u32) -> StoreResult<Vec<RankedName>>;
}

/// Everything the engine needs from a store
pub trait Store: RequirementStore + QuotationStore + CatalogStore + StatisticsStore {}

impl<T> Store for T where T: RequirementStore + QuotationStore + CatalogStore + StatisticsStore {}
