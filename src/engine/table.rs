//! Comparative pricing table
//!
//! Reshapes a requirement's lines and ranked quotations for side-by-side
//! review. Provider columns and the flattened price list are both ordered by
//! winner level, so the cheapest provider comes first.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::aggregate::summations;
use super::{load_requirement, EngineError, EngineResult};
use crate::core::identity::{LineId, ProviderId, QuotationId, RequirementId};
use crate::core::store::{CatalogStore, QuotationStore, RequirementStore};

/// One requirement line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRow {
    pub line_id: LineId,
    pub product_name: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_measure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

/// One priced detail, tagged with its provider group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEntry {
    pub quotation_id: QuotationId,
    pub line_id: LineId,
    pub unit_price: f64,
    /// 1-based provider group
    pub sequence: u32,
}

/// One provider's quotation header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderColumn {
    pub quotation_id: QuotationId,
    pub provider_id: ProviderId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliver_date: Option<NaiveDate>,
    pub summation: f64,
    pub winner_level: u32,
    pub winner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeTable {
    pub requirement_id: RequirementId,
    pub lines: Vec<LineRow>,
    pub prices: Vec<PriceEntry>,
    pub providers: Vec<ProviderColumn>,
}

/// A line with one price cell per provider column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub line: LineRow,
    /// `None` where the provider did not price the line
    pub prices: Vec<Option<f64>>,
    /// Column index of the lowest price
    pub best: Option<usize>,
}

/// Line-by-provider view of the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub columns: Vec<ProviderColumn>,
    pub rows: Vec<GridRow>,
}

impl Grid {
    pub fn totals(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.summation).collect()
    }
}

/// Tag entries with their provider group, `line_count` entries per group
///
/// The threshold grows to `line_count * sequence` each time it is crossed,
/// so complete quotations map one-to-one onto groups.
pub fn assign_sequences(entries: &mut [PriceEntry], line_count: usize) {
    let mut sequence: u32 = 1;
    let mut separate = line_count;
    for (i, entry) in entries.iter_mut().enumerate() {
        if i >= separate {
            sequence += 1;
            separate = line_count * sequence as usize;
        }
        entry.sequence = sequence;
    }
}

impl ComparativeTable {
    /// All provider columns
    pub fn grid(&self) -> Grid {
        self.grid_for(&self.providers)
    }

    /// Number of pages when showing `columns` providers per page
    pub fn page_count(&self, columns: usize) -> usize {
        let columns = columns.max(1);
        self.providers.len().div_ceil(columns).max(1)
    }

    /// Provider columns of one 1-based page; `None` past the last page
    pub fn page(&self, columns: usize, page: usize) -> Option<Grid> {
        let columns = columns.max(1);
        if page == 0 || page > self.page_count(columns) {
            return None;
        }
        let start = ((page - 1) * columns).min(self.providers.len());
        let end = (start + columns).min(self.providers.len());
        Some(self.grid_for(&self.providers[start..end]))
    }

    fn grid_for(&self, columns: &[ProviderColumn]) -> Grid {
        let prices: HashMap<(QuotationId, LineId), f64> = self
            .prices
            .iter()
            .map(|p| ((p.quotation_id, p.line_id), p.unit_price))
            .collect();

        let rows = self
            .lines
            .iter()
            .map(|line| {
                let cells: Vec<Option<f64>> = columns
                    .iter()
                    .map(|c| prices.get(&(c.quotation_id, line.line_id)).copied())
                    .collect();
                let best = cells
                    .iter()
                    .enumerate()
                    .filter_map(|(i, p)| p.map(|p| (i, p)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(i, _)| i);
                GridRow {
                    line: line.clone(),
                    prices: cells,
                    best,
                }
            })
            .collect();

        Grid {
            columns: columns.to_vec(),
            rows,
        }
    }
}

/// Assemble the table for a requirement
///
/// A requirement without lines is rejected with `EmptyRequirement`.
pub fn build_comparative_table<S>(
    store: &S,
    requirement: RequirementId,
) -> EngineResult<ComparativeTable>
where
    S: RequirementStore + QuotationStore + CatalogStore,
{
    let req = load_requirement(store, requirement)?;
    if req.lines.is_empty() {
        return Err(EngineError::EmptyRequirement(requirement));
    }

    let totals: HashMap<QuotationId, f64> = summations(store, requirement)?
        .into_iter()
        .map(|t| (t.quotation_id, t.summation))
        .collect();

    let mut quotations = store.list_by_requirement(requirement)?;
    quotations.sort_by_key(|q| (q.winner_level, q.id));

    let mut details_by_quotation: HashMap<QuotationId, Vec<_>> = HashMap::new();
    for detail in store.details_by_requirement(requirement)? {
        details_by_quotation
            .entry(detail.quotation_id)
            .or_default()
            .push(detail);
    }

    let line_order: HashMap<LineId, usize> = req
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| (l.id, i))
        .collect();

    let mut prices = Vec::new();
    let mut providers = Vec::with_capacity(quotations.len());
    for q in &quotations {
        if let Some(details) = details_by_quotation.get_mut(&q.id) {
            details.sort_by_key(|d| line_order.get(&d.line_id).copied().unwrap_or(usize::MAX));
            prices.extend(details.iter().map(|d| PriceEntry {
                quotation_id: q.id,
                line_id: d.line_id,
                unit_price: d.unit_price,
                sequence: 0,
            }));
        }

        let provider = store.get_provider(q.provider_id)?;
        providers.push(ProviderColumn {
            quotation_id: q.id,
            provider_id: q.provider_id,
            name: provider.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            manager: provider.and_then(|p| p.manager),
            deliver_date: q.deliver_date,
            summation: totals.get(&q.id).copied().unwrap_or(0.0),
            winner_level: q.winner_level,
            winner: q.winner,
        });
    }

    assign_sequences(&mut prices, req.lines.len());

    let lines = req
        .lines
        .into_iter()
        .map(|l| LineRow {
            line_id: l.id,
            product_name: l.product_name,
            amount: l.amount,
            unit_measure: l.unit_measure,
            observation: l.observation,
        })
        .collect();

    Ok(ComparativeTable {
        requirement_id: requirement,
        lines,
        prices,
        providers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::Database;
    use crate::engine::quotations::create_quotation;
    use crate::engine::requirements::create_requirement;
    use crate::entities::product::NewProduct;
    use crate::entities::provider::NewProvider;
    use crate::entities::quotation::{NewQuotation, NewQuotationDetail};
    use crate::entities::requirement::{NewRequirement, NewRequirementLine};

    fn entries(n: usize) -> Vec<PriceEntry> {
        (0..n)
            .map(|i| PriceEntry {
                quotation_id: QuotationId(i as i64 + 1),
                line_id: LineId(1),
                unit_price: 1.0,
                sequence: 0,
            })
            .collect()
    }

    fn sequences(entries: &[PriceEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.sequence).collect()
    }

    #[test]
    fn test_sequences_group_by_line_count() {
        let mut e = entries(6);
        assign_sequences(&mut e, 2);
        assert_eq!(sequences(&e), vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_sequences_single_line() {
        let mut e = entries(3);
        assign_sequences(&mut e, 1);
        assert_eq!(sequences(&e), vec![1, 2, 3]);
    }

    #[test]
    fn test_sequences_partial_last_group() {
        let mut e = entries(5);
        assign_sequences(&mut e, 3);
        assert_eq!(sequences(&e), vec![1, 1, 1, 2, 2]);
    }

    /// Three lines, three providers; returns (db, requirement)
    fn priced_requirement() -> (Database, RequirementId) {
        let mut db = Database::open_in_memory().unwrap();
        let req = db
            .write(|store| -> EngineResult<_> {
                let product = store.create_product(&NewProduct::new("Paper"))?;
                let req = create_requirement(
                    store,
                    &NewRequirement {
                        name: "Paper".to_string(),
                        author: "test".to_string(),
                        lines: vec![
                            NewRequirementLine::new(product, 1.0),
                            NewRequirementLine::new(product, 2.0),
                            NewRequirementLine::new(product, 3.0),
                        ],
                        ..NewRequirement::default()
                    },
                )?;

                for (name, prices) in [
                    ("Acme", [5.0, 5.0, 5.0]),
                    ("Globex", [1.0, 1.0, 1.0]),
                    ("Initech", [2.0, 9.0, 1.0]),
                ] {
                    let provider = store.create_provider(&NewProvider::new(name))?;
                    let details = req
                        .lines
                        .iter()
                        .zip(prices)
                        .map(|(l, unit_price)| NewQuotationDetail {
                            line_id: l.id,
                            unit_price,
                        })
                        .collect();
                    create_quotation(
                        store,
                        &NewQuotation::new(req.id, provider, "test", details),
                        5,
                    )?;
                }
                Ok(req.id)
            })
            .unwrap();
        (db, req)
    }

    #[test]
    fn test_table_orders_by_rank_and_groups_prices() {
        let (db, req) = priced_requirement();
        let table = build_comparative_table(&db.read(), req).unwrap();

        // Globex 6, Initech 23, Acme 30
        let names: Vec<_> = table.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Initech", "Acme"]);
        assert_eq!(table.providers[0].summation, 6.0);
        assert_eq!(table.providers[0].winner_level, 1);

        assert_eq!(table.lines.len(), 3);
        assert_eq!(table.prices.len(), 9);
        for (i, entry) in table.prices.iter().enumerate() {
            let group = i / 3;
            assert_eq!(entry.sequence, group as u32 + 1);
            assert_eq!(entry.quotation_id, table.providers[group].quotation_id);
            assert_eq!(entry.line_id, table.lines[i % 3].line_id);
        }
    }

    #[test]
    fn test_grid_marks_best_price() {
        let (db, req) = priced_requirement();
        let grid = build_comparative_table(&db.read(), req).unwrap().grid();

        assert_eq!(grid.columns.len(), 3);
        assert_eq!(grid.rows[0].prices, vec![Some(1.0), Some(2.0), Some(5.0)]);
        assert_eq!(grid.rows[0].best, Some(0));
        // Globex and Initech tie at 1.0 on line 3; first column wins
        assert_eq!(grid.rows[2].best, Some(0));
        assert_eq!(grid.totals(), vec![6.0, 23.0, 30.0]);
    }

    #[test]
    fn test_paging_columns() {
        let (db, req) = priced_requirement();
        let table = build_comparative_table(&db.read(), req).unwrap();

        assert_eq!(table.page_count(2), 2);
        let second = table.page(2, 2).unwrap();
        assert_eq!(second.columns.len(), 1);
        assert_eq!(second.columns[0].name, "Acme");
        assert_eq!(second.rows[1].prices, vec![Some(5.0)]);
        assert!(table.page(2, 3).is_none());
        assert!(table.page(2, 0).is_none());
    }

    #[test]
    fn test_table_without_quotations() {
        let mut db = Database::open_in_memory().unwrap();
        let req = db
            .write(|store| -> EngineResult<_> {
                let product = store.create_product(&NewProduct::new("Paper"))?;
                create_requirement(
                    store,
                    &NewRequirement {
                        name: "Paper".to_string(),
                        author: "test".to_string(),
                        lines: vec![NewRequirementLine::new(product, 1.0)],
                        ..NewRequirement::default()
                    },
                )
            })
            .unwrap();

        let table = build_comparative_table(&db.read(), req.id).unwrap();
        assert!(table.providers.is_empty());
        assert!(table.prices.is_empty());
        assert_eq!(table.page_count(3), 1);
        assert!(table.grid().rows[0].prices.is_empty());
    }

    #[test]
    fn test_table_for_missing_requirement() {
        let db = Database::open_in_memory().unwrap();
        let result = build_comparative_table(&db.read(), RequirementId(5));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_table_for_requirement_without_lines() {
        let mut db = Database::open_in_memory().unwrap();
        // The store refuses a line-less requirement, so empty one after creation
        let req = db
            .write(|store| -> EngineResult<_> {
                let product = store.create_product(&NewProduct::new("Paper"))?;
                let req = store.create_requirement(&NewRequirement {
                    name: "Paper".to_string(),
                    author: "test".to_string(),
                    lines: vec![NewRequirementLine::new(product, 1.0)],
                    ..NewRequirement::default()
                })?;
                for line in store.lines(req)? {
                    store.delete_line(line.id)?;
                }
                Ok(req)
            })
            .unwrap();

        let result = build_comparative_table(&db.read(), req);
        assert!(matches!(result, Err(EngineError::EmptyRequirement(id)) if id == req));
    }
}
