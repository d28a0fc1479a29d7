//! SQLite implementation of the store traits

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::schema;
use super::{
    CatalogStore, Page, PageRequest, QuotationStore, RankedName, RequirementStore,
    StatisticsStore, StoreResult,
};
use crate::core::identity::{DetailId, LineId, ProductId, ProviderId, QuotationId, RequirementId};
use crate::core::lifecycle::RequirementState;
use crate::entities::product::{NewProduct, Product, ProductPatch};
use crate::entities::provider::{NewProvider, Provider, ProviderPatch};
use crate::entities::quotation::{NewQuotation, Quotation, QuotationDetail, QuotationPatch};
use crate::entities::requirement::{
    LinePatch, NewRequirement, NewRequirementLine, Requirement, RequirementLine, RequirementPatch,
};

/// Owned database connection
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database file and apply the schema
    pub fn open(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        schema::apply(&conn)?;
        debug!(path = %path.display(), "opened store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply(&conn)?;
        Ok(Self { conn })
    }

    /// Store view for read-only work outside a transaction
    pub fn read(&self) -> SqliteStore<'_> {
        SqliteStore::new(&self.conn)
    }

    /// Run `f` inside an immediate transaction
    ///
    /// The write lock is taken before `f` runs. The transaction commits when
    /// `f` returns `Ok` and rolls back on drop otherwise.
    pub fn write<T, E>(&mut self, f: impl FnOnce(&SqliteStore<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&SqliteStore::new(&tx))?;
        tx.commit()?;
        Ok(out)
    }

    /// Run several reads against one snapshot
    ///
    /// A deferred transaction keeps writers from committing between the
    /// queries `f` issues.
    pub fn snapshot<T, E>(&self, f: impl FnOnce(&SqliteStore<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(&SqliteStore::new(&tx))?;
        tx.commit()?;
        Ok(out)
    }
}

/// Error for a write that would break a data invariant the schema cannot
/// express
fn constraint_violation(message: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_CHECK),
        Some(message.to_string()),
    )
}

/// Store operations over a borrowed connection or transaction
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn count(&self, sql: &str, pattern: &str) -> StoreResult<i64> {
        self.conn.query_row(sql, params![pattern], |row| row.get(0))
    }
}

// =========================================================================
// Row mapping
// =========================================================================

const REQUIREMENT_COLUMNS: &str = "id, name, place, destination, emission_date, expiration_date, \
     claimant, author, state, created";

fn requirement_from_row(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    Ok(Requirement {
        id: row.get("id")?,
        name: row.get("name")?,
        place: row.get("place")?,
        destination: row.get("destination")?,
        emission_date: row.get("emission_date")?,
        expiration_date: row.get("expiration_date")?,
        claimant: row.get("claimant")?,
        author: row.get("author")?,
        state: row.get("state")?,
        created: row.get("created")?,
        lines: Vec::new(),
    })
}

const LINE_SELECT: &str = "SELECT r.id AS id, r.requirement_id AS requirement_id, \
     r.product_id AS product_id, COALESCE(p.name, '') AS product_name, r.amount AS amount, \
     r.unit_measure AS unit_measure, r.suggested_price AS suggested_price, \
     r.observation AS observation \
     FROM requires r LEFT JOIN products p ON p.id = r.product_id";

fn line_from_row(row: &Row<'_>) -> rusqlite::Result<RequirementLine> {
    Ok(RequirementLine {
        id: row.get("id")?,
        requirement_id: row.get("requirement_id")?,
        product_id: row.get("product_id")?,
        product_name: row.get("product_name")?,
        amount: row.get("amount")?,
        unit_measure: row.get("unit_measure")?,
        suggested_price: row.get("suggested_price")?,
        observation: row.get("observation")?,
    })
}

const QUOTATION_COLUMNS: &str = "id, requirement_id, provider_id, author, emission_date, \
     deliver_date, observation, suggest_winner, winner, winner_level, created";

fn quotation_from_row(row: &Row<'_>) -> rusqlite::Result<Quotation> {
    Ok(Quotation {
        id: row.get("id")?,
        requirement_id: row.get("requirement_id")?,
        provider_id: row.get("provider_id")?,
        author: row.get("author")?,
        emission_date: row.get("emission_date")?,
        deliver_date: row.get("deliver_date")?,
        observation: row.get("observation")?,
        suggest_winner: row.get("suggest_winner")?,
        winner: row.get("winner")?,
        winner_level: row.get("winner_level")?,
        created: row.get("created")?,
        details: Vec::new(),
    })
}

const DETAIL_COLUMNS: &str = "d.id AS id, d.quotation_id AS quotation_id, \
     d.require_id AS require_id, d.unit_price AS unit_price, \
     d.winner_level_provider AS winner_level_provider, \
     d.winner_provider_id AS winner_provider_id";

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<QuotationDetail> {
    Ok(QuotationDetail {
        id: row.get("id")?,
        quotation_id: row.get("quotation_id")?,
        line_id: row.get("require_id")?,
        unit_price: row.get("unit_price")?,
        winner_level_provider: row.get("winner_level_provider")?,
        winner_provider_id: row.get("winner_provider_id")?,
    })
}

const PRODUCT_COLUMNS: &str = "id, name, description, product_type, active, created";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        product_type: row.get("product_type")?,
        active: row.get("active")?,
        created: row.get("created")?,
    })
}

const PROVIDER_COLUMNS: &str =
    "id, name, ruc, manager, email, phone, address, observation, active, created";

fn provider_from_row(row: &Row<'_>) -> rusqlite::Result<Provider> {
    Ok(Provider {
        id: row.get("id")?,
        name: row.get("name")?,
        ruc: row.get("ruc")?,
        manager: row.get("manager")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        observation: row.get("observation")?,
        active: row.get("active")?,
        created: row.get("created")?,
    })
}

fn ranked_from_row(row: &Row<'_>) -> rusqlite::Result<RankedName> {
    Ok(RankedName {
        name: row.get(0)?,
        count: row.get(1)?,
    })
}

// =========================================================================
// RequirementStore
// =========================================================================

impl RequirementStore for SqliteStore<'_> {
    fn create_requirement(&self, new: &NewRequirement) -> StoreResult<RequirementId> {
        if new.lines.is_empty() {
            return Err(constraint_violation("a requirement needs at least one line"));
        }

        self.conn.execute(
            "INSERT INTO requirements (name, place, destination, emission_date, expiration_date, \
             claimant, author, state, created) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.name,
                new.place,
                new.destination,
                new.emission_date,
                new.expiration_date,
                new.claimant,
                new.author,
                RequirementState::Draft,
                Utc::now(),
            ],
        )?;
        let id = RequirementId(self.conn.last_insert_rowid());

        for line in &new.lines {
            self.add_line(id, line)?;
        }

        Ok(id)
    }

    fn get_requirement(&self, id: RequirementId) -> StoreResult<Option<Requirement>> {
        let sql = format!("SELECT {} FROM requirements WHERE id = ?1", REQUIREMENT_COLUMNS);
        let requirement = self
            .conn
            .query_row(&sql, params![id], requirement_from_row)
            .optional()?;

        match requirement {
            Some(mut requirement) => {
                requirement.lines = self.lines(id)?;
                Ok(Some(requirement))
            }
            None => Ok(None),
        }
    }

    fn update_requirement(
        &self,
        id: RequirementId,
        patch: &RequirementPatch,
    ) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE requirements SET \
             name = COALESCE(?2, name), \
             place = COALESCE(?3, place), \
             destination = COALESCE(?4, destination), \
             emission_date = COALESCE(?5, emission_date), \
             expiration_date = COALESCE(?6, expiration_date), \
             claimant = COALESCE(?7, claimant) \
             WHERE id = ?1",
            params![
                id,
                patch.name,
                patch.place,
                patch.destination,
                patch.emission_date,
                patch.expiration_date,
                patch.claimant,
            ],
        )
    }

    fn set_state(&self, id: RequirementId, state: RequirementState) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE requirements SET state = ?2 WHERE id = ?1",
            params![id, state],
        )
    }

    fn lines(&self, id: RequirementId) -> StoreResult<Vec<RequirementLine>> {
        let sql = format!("{} WHERE r.requirement_id = ?1 ORDER BY r.id", LINE_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id], line_from_row)?;
        rows.collect()
    }

    fn get_line(&self, id: LineId) -> StoreResult<Option<RequirementLine>> {
        let sql = format!("{} WHERE r.id = ?1", LINE_SELECT);
        self.conn
            .query_row(&sql, params![id], line_from_row)
            .optional()
    }

    fn add_line(
        &self,
        requirement: RequirementId,
        line: &NewRequirementLine,
    ) -> StoreResult<LineId> {
        self.conn.execute(
            "INSERT INTO requires (requirement_id, product_id, amount, unit_measure, \
             suggested_price, observation) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                requirement,
                line.product_id,
                line.amount,
                line.unit_measure,
                line.suggested_price,
                line.observation,
            ],
        )?;
        Ok(LineId(self.conn.last_insert_rowid()))
    }

    fn update_line(&self, id: LineId, patch: &LinePatch) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE requires SET \
             amount = COALESCE(?2, amount), \
             unit_measure = COALESCE(?3, unit_measure), \
             suggested_price = COALESCE(?4, suggested_price), \
             observation = COALESCE(?5, observation) \
             WHERE id = ?1",
            params![
                id,
                patch.amount,
                patch.unit_measure,
                patch.suggested_price,
                patch.observation,
            ],
        )
    }

    fn delete_line(&self, id: LineId) -> StoreResult<usize> {
        self.conn
            .execute("DELETE FROM requires WHERE id = ?1", params![id])
    }

    fn delete_requirement(&self, id: RequirementId) -> StoreResult<usize> {
        self.conn.execute(
            "DELETE FROM requires WHERE requirement_id = ?1",
            params![id],
        )?;
        self.conn
            .execute("DELETE FROM requirements WHERE id = ?1", params![id])
    }

    fn list_requirements(
        &self,
        states: &[RequirementState],
        page: &PageRequest,
    ) -> StoreResult<Page<Requirement>> {
        // State codes are fixed single digits, safe to inline
        let state_filter = if states.is_empty() {
            String::new()
        } else {
            let codes: Vec<String> = states.iter().map(|s| format!("'{}'", s.code())).collect();
            format!(" AND state IN ({})", codes.join(", "))
        };
        let where_clause = format!(
            "WHERE (lower(name) LIKE ?1 OR lower(COALESCE(destination, '')) LIKE ?1 \
             OR lower(COALESCE(claimant, '')) LIKE ?1){}",
            state_filter
        );
        let pattern = page.like_pattern();

        let total = self.count(
            &format!("SELECT COUNT(*) FROM requirements {}", where_clause),
            &pattern,
        )?;

        let sql = format!(
            "SELECT {} FROM requirements {} ORDER BY id DESC LIMIT ?2 OFFSET ?3",
            REQUIREMENT_COLUMNS, where_clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(
                params![pattern, page.limit, page.offset()],
                requirement_from_row,
            )?
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    fn count_by_state(&self) -> StoreResult<Vec<(RequirementState, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT state, COUNT(*) FROM requirements GROUP BY state")?;
        let counted = stmt
            .query_map([], |row| {
                Ok((row.get::<_, RequirementState>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(RequirementState::all()
            .iter()
            .map(|&state| {
                let count = counted
                    .iter()
                    .find(|(s, _)| *s == state)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (state, count)
            })
            .collect())
    }
}

// =========================================================================
// QuotationStore
// =========================================================================

impl QuotationStore for SqliteStore<'_> {
    fn create_quotation(&self, new: &NewQuotation) -> StoreResult<QuotationId> {
        self.conn.execute(
            "INSERT INTO quotations (requirement_id, provider_id, author, emission_date, \
             deliver_date, observation, suggest_winner, winner, winner_level, created) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8)",
            params![
                new.requirement_id,
                new.provider_id,
                new.author,
                new.emission_date,
                new.deliver_date,
                new.observation,
                new.suggest_winner,
                Utc::now(),
            ],
        )?;
        let id = QuotationId(self.conn.last_insert_rowid());

        let mut stmt = self.conn.prepare(
            "INSERT INTO quotation_details (quotation_id, require_id, unit_price) \
             VALUES (?1, ?2, ?3)",
        )?;
        for detail in &new.details {
            stmt.execute(params![id, detail.line_id, detail.unit_price])?;
        }

        Ok(id)
    }

    fn get_quotation(&self, id: QuotationId) -> StoreResult<Option<Quotation>> {
        let sql = format!("SELECT {} FROM quotations WHERE id = ?1", QUOTATION_COLUMNS);
        let quotation = self
            .conn
            .query_row(&sql, params![id], quotation_from_row)
            .optional()?;

        match quotation {
            Some(mut quotation) => {
                quotation.details = self.details(id)?;
                Ok(Some(quotation))
            }
            None => Ok(None),
        }
    }

    fn list_by_requirement(&self, requirement: RequirementId) -> StoreResult<Vec<Quotation>> {
        let sql = format!(
            "SELECT {} FROM quotations WHERE requirement_id = ?1 ORDER BY id",
            QUOTATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![requirement], quotation_from_row)?;
        rows.collect()
    }

    fn count_by_requirement(&self, requirement: RequirementId) -> StoreResult<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM quotations WHERE requirement_id = ?1",
            params![requirement],
            |row| row.get(0),
        )
    }

    fn details(&self, quotation: QuotationId) -> StoreResult<Vec<QuotationDetail>> {
        let sql = format!(
            "SELECT {} FROM quotation_details d WHERE d.quotation_id = ?1 ORDER BY d.require_id",
            DETAIL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![quotation], detail_from_row)?;
        rows.collect()
    }

    fn details_by_requirement(
        &self,
        requirement: RequirementId,
    ) -> StoreResult<Vec<QuotationDetail>> {
        let sql = format!(
            "SELECT {} FROM quotation_details d \
             JOIN quotations q ON q.id = d.quotation_id \
             WHERE q.requirement_id = ?1 \
             ORDER BY d.quotation_id, d.require_id",
            DETAIL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![requirement], detail_from_row)?;
        rows.collect()
    }

    fn get_detail(&self, id: DetailId) -> StoreResult<Option<QuotationDetail>> {
        let sql = format!(
            "SELECT {} FROM quotation_details d WHERE d.id = ?1",
            DETAIL_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id], detail_from_row)
            .optional()
    }

    fn update_detail_price(&self, id: DetailId, unit_price: f64) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE quotation_details SET unit_price = ?2 WHERE id = ?1",
            params![id, unit_price],
        )
    }

    fn update_quotation(&self, id: QuotationId, patch: &QuotationPatch) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE quotations SET \
             emission_date = COALESCE(?2, emission_date), \
             deliver_date = COALESCE(?3, deliver_date), \
             observation = COALESCE(?4, observation), \
             suggest_winner = COALESCE(?5, suggest_winner) \
             WHERE id = ?1",
            params![
                id,
                patch.emission_date,
                patch.deliver_date,
                patch.observation,
                patch.suggest_winner,
            ],
        )
    }

    fn clear_winners(&self, requirement: RequirementId) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE quotations SET winner = 0 WHERE requirement_id = ?1",
            params![requirement],
        )
    }

    fn set_winner(&self, id: QuotationId, winner: bool) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE quotations SET winner = ?2 WHERE id = ?1",
            params![id, winner],
        )
    }

    fn set_winner_level(&self, id: QuotationId, level: u32) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE quotations SET winner_level = ?2 WHERE id = ?1",
            params![id, level],
        )
    }

    fn delete_quotation(&self, id: QuotationId) -> StoreResult<usize> {
        self.conn.execute(
            "DELETE FROM quotation_details WHERE quotation_id = ?1",
            params![id],
        )?;
        self.conn
            .execute("DELETE FROM quotations WHERE id = ?1", params![id])
    }

    fn detail_references(&self, line: LineId) -> StoreResult<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM quotation_details WHERE require_id = ?1",
            params![line],
            |row| row.get(0),
        )
    }

    fn winner_of(&self, requirement: RequirementId) -> StoreResult<Option<Quotation>> {
        let id: Option<QuotationId> = self
            .conn
            .query_row(
                "SELECT id FROM quotations WHERE requirement_id = ?1 AND winner = 1 \
                 ORDER BY id LIMIT 1",
                params![requirement],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => self.get_quotation(id),
            None => Ok(None),
        }
    }
}

// =========================================================================
// CatalogStore
// =========================================================================

impl CatalogStore for SqliteStore<'_> {
    fn create_product(&self, new: &NewProduct) -> StoreResult<ProductId> {
        self.conn.execute(
            "INSERT INTO products (name, description, product_type, active, created) \
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![new.name, new.description, new.product_type, Utc::now()],
        )?;
        Ok(ProductId(self.conn.last_insert_rowid()))
    }

    fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        self.conn
            .query_row(&sql, params![id], product_from_row)
            .optional()
    }

    fn update_product(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE products SET \
             name = COALESCE(?2, name), \
             description = COALESCE(?3, description), \
             product_type = COALESCE(?4, product_type), \
             active = COALESCE(?5, active) \
             WHERE id = ?1",
            params![
                id,
                patch.name,
                patch.description,
                patch.product_type,
                patch.active,
            ],
        )
    }

    fn list_products(&self, page: &PageRequest) -> StoreResult<Page<Product>> {
        let pattern = page.like_pattern();
        let total = self.count(
            "SELECT COUNT(*) FROM products WHERE lower(name) LIKE ?1",
            &pattern,
        )?;

        let sql = format!(
            "SELECT {} FROM products WHERE lower(name) LIKE ?1 \
             ORDER BY id DESC LIMIT ?2 OFFSET ?3",
            PRODUCT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![pattern, page.limit, page.offset()], product_from_row)?
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    fn create_provider(&self, new: &NewProvider) -> StoreResult<ProviderId> {
        self.conn.execute(
            "INSERT INTO providers (name, ruc, manager, email, phone, address, observation, \
             active, created) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
            params![
                new.name,
                new.ruc,
                new.manager,
                new.email,
                new.phone,
                new.address,
                new.observation,
                Utc::now(),
            ],
        )?;
        Ok(ProviderId(self.conn.last_insert_rowid()))
    }

    fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>> {
        let sql = format!("SELECT {} FROM providers WHERE id = ?1", PROVIDER_COLUMNS);
        self.conn
            .query_row(&sql, params![id], provider_from_row)
            .optional()
    }

    fn provider_by_ruc(&self, ruc: &str) -> StoreResult<Option<Provider>> {
        let sql = format!("SELECT {} FROM providers WHERE ruc = ?1", PROVIDER_COLUMNS);
        self.conn
            .query_row(&sql, params![ruc], provider_from_row)
            .optional()
    }

    fn update_provider(&self, id: ProviderId, patch: &ProviderPatch) -> StoreResult<usize> {
        self.conn.execute(
            "UPDATE providers SET \
             name = COALESCE(?2, name), \
             ruc = COALESCE(?3, ruc), \
             manager = COALESCE(?4, manager), \
             email = COALESCE(?5, email), \
             phone = COALESCE(?6, phone), \
             address = COALESCE(?7, address), \
             observation = COALESCE(?8, observation), \
             active = COALESCE(?9, active) \
             WHERE id = ?1",
            params![
                id,
                patch.name,
                patch.ruc,
                patch.manager,
                patch.email,
                patch.phone,
                patch.address,
                patch.observation,
                patch.active,
            ],
        )
    }

    fn list_providers(&self, page: &PageRequest) -> StoreResult<Page<Provider>> {
        let where_clause = "WHERE lower(name) LIKE ?1 OR lower(COALESCE(ruc, '')) LIKE ?1";
        let pattern = page.like_pattern();
        let total = self.count(
            &format!("SELECT COUNT(*) FROM providers {}", where_clause),
            &pattern,
        )?;

        let sql = format!(
            "SELECT {} FROM providers {} ORDER BY id DESC LIMIT ?2 OFFSET ?3",
            PROVIDER_COLUMNS, where_clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![pattern, page.limit, page.offset()], provider_from_row)?
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }
}

// =========================================================================
// StatisticsStore
// =========================================================================

impl StatisticsStore for SqliteStore<'_> {
    fn top_winning_providers(&self, limit: u32) -> StoreResult<Vec<RankedName>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, COUNT(q.id) AS wins FROM quotations q \
             JOIN providers p ON p.id = q.provider_id \
             WHERE q.winner = 1 \
             GROUP BY p.id ORDER BY wins DESC, p.name LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], ranked_from_row)?;
        rows.collect()
    }

    fn top_requested_products(&self, limit: u32) -> StoreResult<Vec<RankedName>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, COUNT(r.id) AS uses FROM requires r \
             JOIN products p ON p.id = r.product_id \
             GROUP BY p.id ORDER BY uses DESC, p.name LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], ranked_from_row)?;
        rows.collect()
    }

    fn top_requesting_authors(&self, limit: u32) -> StoreResult<Vec<RankedName>> {
        let mut stmt = self.conn.prepare(
            "SELECT author, COUNT(id) AS total FROM requirements \
             GROUP BY author ORDER BY total DESC, author LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], ranked_from_row)?;
        rows.collect()
    }
}
