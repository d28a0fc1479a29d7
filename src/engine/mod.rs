//! Quotation evaluation and ranking engine
//!
//! The free functions in the submodules take a store handle explicitly and
//! are generic over the store traits, so tests can drive them against any
//! store. [`Engine`] is the facade used by the CLI: it owns the database and
//! runs every mutating operation inside one immediate transaction.

pub mod aggregate;
pub mod catalog;
pub mod quotations;
pub mod rank;
pub mod report;
pub mod requirements;
pub mod table;
pub mod winner;

use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::identity::{DetailId, LineId, ProductId, ProviderId, QuotationId, RequirementId};
use crate::core::lifecycle::{RequirementState, TransitionError};
use crate::core::project::Project;
use crate::core::store::{Database, Page, PageRequest, QuotationStore, RequirementStore};
use crate::entities::product::{NewProduct, Product, ProductPatch};
use crate::entities::provider::{NewProvider, Provider, ProviderPatch};
use crate::entities::quotation::{NewQuotation, Quotation, QuotationPatch};
use crate::entities::requirement::{
    LinePatch, NewRequirement, NewRequirementLine, Requirement, RequirementLine, RequirementPatch,
    RequirementSummary,
};

pub use aggregate::QuotationTotal;
pub use quotations::QuotationSummary;
pub use rank::Ranking;
pub use report::{PurchaseOrder, Statistics};
pub use table::ComparativeTable;
pub use winner::{SelectionMode, WinnerChoice, WinnerOutcome};

/// Errors from engine operations
///
/// Every variant carries the id involved. No variant leaves a partial write
/// behind: the surrounding transaction is rolled back.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Requirement {requirement} already has the maximum of {max} quotations")]
    LimitExceeded {
        requirement: RequirementId,
        max: u32,
    },

    #[error("Update of {what} {id} affected no rows")]
    ZeroEffect { what: &'static str, id: String },

    #[error("Requirement {id}: {source}")]
    InvalidTransition {
        id: RequirementId,
        #[source]
        source: TransitionError,
    },

    #[error("Requirement {0} has no lines")]
    EmptyRequirement(RequirementId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn zero_effect(what: &'static str, id: impl Display) -> Self {
        EngineError::ZeroEffect {
            what,
            id: id.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Fail with `ZeroEffect` when an update touched nothing
pub(crate) fn expect_rows(rows: usize, what: &'static str, id: impl Display) -> EngineResult<()> {
    if rows == 0 {
        Err(EngineError::zero_effect(what, id))
    } else {
        Ok(())
    }
}

pub(crate) fn load_requirement<S: RequirementStore>(
    store: &S,
    id: RequirementId,
) -> EngineResult<Requirement> {
    store
        .get_requirement(id)?
        .ok_or_else(|| EngineError::not_found("Requirement", id))
}

pub(crate) fn load_quotation<S: QuotationStore>(
    store: &S,
    id: QuotationId,
) -> EngineResult<Quotation> {
    store
        .get_quotation(id)?
        .ok_or_else(|| EngineError::not_found("Quotation", id))
}

/// Engine settings taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Maximum quotations accepted per requirement
    pub max_quotations: u32,
    /// Printed on purchase orders
    pub company: Option<String>,
    pub city: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_quotations: config.max_quotations,
            company: config.company.clone(),
            city: config.city.clone(),
        }
    }
}

/// Facade over the database and the engine operations
pub struct Engine {
    db: Database,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(db: Database, settings: EngineSettings) -> Self {
        Self { db, settings }
    }

    /// Open the project's database with settings from `config`
    pub fn open(project: &Project, config: &Config) -> EngineResult<Self> {
        let db = Database::open(
            &project.database_path(),
            Duration::from_millis(config.busy_timeout_ms),
        )?;
        Ok(Self::new(db, EngineSettings::from(config)))
    }

    pub fn open_in_memory(settings: EngineSettings) -> EngineResult<Self> {
        Ok(Self::new(Database::open_in_memory()?, settings))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // =====================================================================
    // Catalog
    // =====================================================================

    pub fn create_product(&mut self, new: &NewProduct) -> EngineResult<Product> {
        self.db.write(|store| catalog::create_product(store, new))
    }

    pub fn update_product(&mut self, id: ProductId, patch: &ProductPatch) -> EngineResult<Product> {
        self.db
            .write(|store| catalog::update_product(store, id, patch))
    }

    pub fn product(&self, id: ProductId) -> EngineResult<Product> {
        catalog::load_product(&self.db.read(), id)
    }

    pub fn list_products(&self, page: &PageRequest) -> EngineResult<Page<Product>> {
        catalog::list_products(&self.db.read(), page)
    }

    pub fn create_provider(&mut self, new: &NewProvider) -> EngineResult<Provider> {
        self.db.write(|store| catalog::create_provider(store, new))
    }

    pub fn update_provider(
        &mut self,
        id: ProviderId,
        patch: &ProviderPatch,
    ) -> EngineResult<Provider> {
        self.db
            .write(|store| catalog::update_provider(store, id, patch))
    }

    pub fn provider(&self, id: ProviderId) -> EngineResult<Provider> {
        catalog::load_provider(&self.db.read(), id)
    }

    pub fn list_providers(&self, page: &PageRequest) -> EngineResult<Page<Provider>> {
        catalog::list_providers(&self.db.read(), page)
    }

    // =====================================================================
    // Requirements
    // =====================================================================

    pub fn create_requirement(&mut self, new: &NewRequirement) -> EngineResult<Requirement> {
        self.db
            .write(|store| requirements::create_requirement(store, new))
    }

    pub fn requirement(&self, id: RequirementId) -> EngineResult<Requirement> {
        self.db.snapshot(|store| load_requirement(store, id))
    }

    pub fn list_requirements(
        &self,
        states: &[RequirementState],
        page: &PageRequest,
    ) -> EngineResult<Page<Requirement>> {
        self.db
            .snapshot(|store| requirements::list_requirements(store, states, page))
    }

    pub fn list_requirement_summaries(
        &self,
        states: &[RequirementState],
        page: &PageRequest,
    ) -> EngineResult<Page<RequirementSummary>> {
        Ok(self.list_requirements(states, page)?.map(|r| r.summary()))
    }

    pub fn update_requirement(
        &mut self,
        id: RequirementId,
        patch: &RequirementPatch,
    ) -> EngineResult<Requirement> {
        self.db
            .write(|store| requirements::update_requirement(store, id, patch))
    }

    pub fn reject_requirement(&mut self, id: RequirementId) -> EngineResult<Requirement> {
        self.db
            .write(|store| requirements::reject_requirement(store, id))
    }

    pub fn close_requirement(&mut self, id: RequirementId) -> EngineResult<Requirement> {
        self.db
            .write(|store| requirements::close_requirement(store, id))
    }

    pub fn add_line(
        &mut self,
        requirement: RequirementId,
        line: &NewRequirementLine,
    ) -> EngineResult<RequirementLine> {
        self.db
            .write(|store| requirements::add_line(store, requirement, line))
    }

    pub fn update_line(&mut self, id: LineId, patch: &LinePatch) -> EngineResult<RequirementLine> {
        self.db
            .write(|store| requirements::update_line(store, id, patch))
    }

    pub fn delete_line(&mut self, id: LineId) -> EngineResult<()> {
        self.db.write(|store| requirements::delete_line(store, id))
    }

    pub fn delete_requirement(&mut self, id: RequirementId) -> EngineResult<()> {
        self.db
            .write(|store| requirements::delete_requirement(store, id))
    }

    // =====================================================================
    // Quotations
    // =====================================================================

    pub fn create_quotation(&mut self, new: &NewQuotation) -> EngineResult<Quotation> {
        let max = self.settings.max_quotations;
        self.db
            .write(|store| quotations::create_quotation(store, new, max))
    }

    pub fn quotation(&self, id: QuotationId) -> EngineResult<Quotation> {
        self.db.snapshot(|store| load_quotation(store, id))
    }

    /// Quotations of a requirement with provider names and totals, by rank
    pub fn quotations(&self, requirement: RequirementId) -> EngineResult<Vec<QuotationSummary>> {
        self.db
            .snapshot(|store| quotations::quotation_overview(store, requirement))
    }

    pub fn update_detail_price(&mut self, id: DetailId, unit_price: f64) -> EngineResult<Quotation> {
        self.db
            .write(|store| quotations::update_detail_price(store, id, unit_price))
    }

    pub fn update_quotation(
        &mut self,
        id: QuotationId,
        patch: &QuotationPatch,
    ) -> EngineResult<Quotation> {
        self.db
            .write(|store| quotations::update_quotation(store, id, patch))
    }

    pub fn delete_quotation(&mut self, id: QuotationId) -> EngineResult<()> {
        self.db
            .write(|store| quotations::delete_quotation(store, id))
    }

    // =====================================================================
    // Evaluation
    // =====================================================================

    pub fn summations(&self, requirement: RequirementId) -> EngineResult<Vec<QuotationTotal>> {
        self.db
            .snapshot(|store| aggregate::summations(store, requirement))
    }

    pub fn rerank(&mut self, requirement: RequirementId) -> EngineResult<Vec<Ranking>> {
        self.db.write(|store| rank::rerank(store, requirement))
    }

    pub fn select_winner(
        &mut self,
        requirement: RequirementId,
        choice: WinnerChoice,
    ) -> EngineResult<WinnerOutcome> {
        self.db
            .write(|store| winner::select_winner(store, requirement, choice))
    }

    pub fn comparative_table(&self, requirement: RequirementId) -> EngineResult<ComparativeTable> {
        self.db
            .snapshot(|store| table::build_comparative_table(store, requirement))
    }

    pub fn purchase_order(&self, requirement: RequirementId) -> EngineResult<PurchaseOrder> {
        self.db
            .snapshot(|store| report::purchase_order(store, requirement, &self.settings))
    }

    pub fn statistics(&self) -> EngineResult<Statistics> {
        self.db.snapshot(|store| report::statistics(store))
    }
}
