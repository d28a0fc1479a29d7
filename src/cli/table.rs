//! Tabular output for list commands
//!
//! Rows are built from typed cells and rendered as a boxed table (`tabled`),
//! TSV, CSV (`csv`) or a bare id list.

use chrono::NaiveDate;
use miette::{IntoDiagnostic, Result};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::output::{money, quantity};
use crate::cli::OutputFormat;
use crate::core::lifecycle::RequirementState;

/// A column of a list table
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str) -> Self {
        Self { key, header }
    }
}

/// A typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    OptText(Option<String>),
    Money(f64),
    Quantity(f64),
    Int(i64),
    Flag(bool),
    Date(Option<NaiveDate>),
    State(RequirementState),
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::OptText(s) => s.clone().unwrap_or_else(|| "-".to_string()),
            CellValue::Money(v) => money(*v),
            CellValue::Quantity(v) => quantity(*v),
            CellValue::Int(v) => v.to_string(),
            CellValue::Flag(true) => "yes".to_string(),
            CellValue::Flag(false) => "-".to_string(),
            CellValue::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            CellValue::Date(None) => "-".to_string(),
            CellValue::State(s) => s.to_string(),
        }
    }
}

/// One row: the record id plus its cells by column key
#[derive(Debug, Clone)]
pub struct TableRow {
    id: String,
    cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    fn get(&self, key: &str) -> String {
        if key == "id" {
            return self.id.clone();
        }
        self.cells
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.display())
            .unwrap_or_default()
    }
}

/// Renders rows for a fixed set of columns
pub struct TableFormatter {
    columns: &'static [ColumnDef],
    name_plural: &'static str,
}

impl TableFormatter {
    pub fn new(columns: &'static [ColumnDef], name_plural: &'static str) -> Self {
        Self {
            columns,
            name_plural,
        }
    }

    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> Result<String> {
        if format == OutputFormat::Id {
            return Ok(rows.iter().map(|r| format!("{}\n", r.id)).collect());
        }
        if rows.is_empty() && format != OutputFormat::Csv {
            return Ok(format!("No {} found.\n", self.name_plural));
        }

        let headers: Vec<String> = self.columns.iter().map(|c| c.header.to_string()).collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| self.columns.iter().map(|c| row.get(c.key)).collect())
            .collect();
        render_grid(&headers, &cells, format)
    }

    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        print!("{}", self.render(rows, format)?);
        Ok(())
    }
}

/// Render headers and string cells in a tabular format
///
/// `Table` draws a rounded box, `Csv` quotes per RFC 4180, anything else is
/// tab-separated with tabs and newlines in cells flattened to spaces.
pub fn render_grid(headers: &[String], rows: &[Vec<String>], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(headers.iter().cloned());
            for row in rows {
                builder.push_record(row.iter().cloned());
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            Ok(format!("{}\n", table))
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(headers).into_diagnostic()?;
            for row in rows {
                wtr.write_record(row).into_diagnostic()?;
            }
            let data = wtr
                .into_inner()
                .map_err(|e| miette::miette!("CSV writer error: {}", e))?;
            String::from_utf8(data).into_diagnostic()
        }
        _ => {
            let mut out = headers.join("\t");
            out.push('\n');
            for row in rows {
                let cleaned: Vec<String> = row
                    .iter()
                    .map(|c| c.replace(['\t', '\n'], " "))
                    .collect();
                out.push_str(&cleaned.join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
    }
}
