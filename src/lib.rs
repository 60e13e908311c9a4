//! # Chart Data Builder
//!
//! A library for turning messy delimited text (inconsistent headers, optional
//! metadata rows, long or wide metric columns) into a normalized set of
//! records suitable for filtering and aggregation.
//!
//! ## Core Concepts
//!
//! - **Parsed table**: raw text split into named columns and rows, after
//!   delimiter detection, header-row detection, and header repair
//! - **Column roles**: a heuristic guess at which column is the product,
//!   branch, area, item, or metric, with no schema declaration from the caller
//! - **Long format**: one metric value per row, product named by a label column
//! - **Wide format**: several metric columns per row, each column itself
//!   naming a product category; one wide row expands into N records
//! - **Synthetic product**: an invented single product label used when no
//!   product dimension could be inferred at all
//! - **Session**: the current `(records, roles, filters)` triple, replaced
//!   atomically on each ingestion and serializable for persistence
//!
//! ## Example
//!
//! ```rust,ignore
//! use chart_data_builder::*;
//!
//! let mut session = Session::new();
//! session.ingest_text("Branch,Backribs,Spareribs\nEast,10,5\nWest,3,7\n")?;
//!
//! for group in session.aggregate() {
//!     println!("{}: {}", group.label, group.total);
//! }
//! ```

pub mod aggregate;
pub mod error;
pub mod records;
pub mod schema;
pub mod session;
pub mod tokenizer;
pub mod utils;

pub use aggregate::{
    aggregate, distinct_values, passes_filters, FilterSpec, GroupDimension, GroupTotal,
    UNSPECIFIED_LABEL,
};
pub use error::{ChartDataError, Result};
pub use records::{expand_records, NormalizedRecord};
pub use schema::{infer_roles, ColumnRoles};
pub use session::Session;
pub use tokenizer::{parse_table, ParsedTable};
pub use utils::*;

use log::info;

/// Result of one successful ingestion: the parsed table, the inferred column
/// roles, and the expanded record list.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub table: ParsedTable,
    pub roles: ColumnRoles,
    pub records: Vec<NormalizedRecord>,
}

/// Runs the full pipeline over one text buffer.
///
/// Fails with [`ChartDataError::NoDataRows`] when the input has no data rows
/// at all, and with [`ChartDataError::InsufficientSchema`] when neither a
/// metric column nor product columns could be inferred. Soft defects
/// (unparsable numbers, missing role columns, duplicate headers) are absorbed
/// by defaulting instead of reported.
pub fn ingest(text: &str) -> Result<Ingestion> {
    let table = parse_table(text);
    if table.is_empty() {
        return Err(ChartDataError::NoDataRows);
    }

    let roles = infer_roles(&table);
    if !roles.is_sufficient() {
        return Err(ChartDataError::InsufficientSchema);
    }

    let records = expand_records(&table, &roles);
    info!(
        "ingested {} data rows into {} records across {} columns",
        table.rows.len(),
        records.len(),
        table.headers.len()
    );

    Ok(Ingestion {
        table,
        roles,
        records,
    })
}
