use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::ColumnRoles;
use crate::tokenizer::ParsedTable;
use crate::utils::metric_value;

/// Atomic unit consumed by filtering and aggregation.
///
/// Dimension fields are trimmed strings, empty when the corresponding role is
/// absent from the schema. Records are immutable once expanded; a session
/// replaces the whole set on re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub product: String,
    pub item: String,
    pub branch: String,
    pub area: String,
    /// Always finite, never NaN; unparsable cells coerce to 0.
    pub metric: f64,
}

/// Converts raw rows into normalized records.
///
/// Wide format (non-empty `product_columns`) expands each row into one record
/// per product column, so the record count is rows x columns. Long format
/// emits exactly one record per row, using the synthetic product label when no
/// product column exists.
pub fn expand_records(table: &ParsedTable, roles: &ColumnRoles) -> Vec<NormalizedRecord> {
    let mut records = Vec::new();

    for row in &table.rows {
        if roles.product_columns.is_empty() {
            records.push(expand_long(row, roles));
        } else {
            expand_wide(row, roles, &mut records);
        }
    }

    debug!(
        "expanded {} rows into {} records",
        table.rows.len(),
        records.len()
    );
    records
}

fn expand_wide(
    row: &BTreeMap<String, String>,
    roles: &ColumnRoles,
    records: &mut Vec<NormalizedRecord>,
) {
    for column in &roles.product_columns {
        records.push(NormalizedRecord {
            product: column.clone(),
            item: role_value(row, &roles.item_key),
            branch: role_value(row, &roles.branch_key),
            area: role_value(row, &roles.area_key),
            metric: row.get(column).map(|cell| metric_value(cell)).unwrap_or(0.0),
        });
    }
}

fn expand_long(row: &BTreeMap<String, String>, roles: &ColumnRoles) -> NormalizedRecord {
    let product = if roles.product_key.is_some() {
        role_value(row, &roles.product_key)
    } else {
        roles.synthetic_product_label.clone()
    };

    NormalizedRecord {
        product,
        item: role_value(row, &roles.item_key),
        branch: role_value(row, &roles.branch_key),
        area: role_value(row, &roles.area_key),
        metric: roles
            .metric_key
            .as_ref()
            .and_then(|key| row.get(key))
            .map(|cell| metric_value(cell))
            .unwrap_or(0.0),
    }
}

fn role_value(row: &BTreeMap<String, String>, key: &Option<String>) -> String {
    key.as_ref()
        .and_then(|key| row.get(key))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::infer_roles;
    use crate::tokenizer::parse_table;

    fn wide_roles() -> ColumnRoles {
        ColumnRoles {
            branch_key: Some("Branch".to_string()),
            product_columns: vec!["Backribs".to_string(), "Spareribs".to_string()],
            ..ColumnRoles::default()
        }
    }

    #[test]
    fn test_wide_row_expands_per_product_column() {
        let table = parse_table("Branch,Backribs,Spareribs\nEast,10,5\n");
        let records = expand_records(&table, &wide_roles());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product, "Backribs");
        assert_eq!(records[0].branch, "East");
        assert_eq!(records[0].metric, 10.0);
        assert_eq!(records[1].product, "Spareribs");
        assert_eq!(records[1].metric, 5.0);
    }

    #[test]
    fn test_wide_record_count_is_rows_times_columns() {
        let table = parse_table("Branch,Backribs,Spareribs\nEast,10,5\nWest,3,7\nNorth,1,2\n");
        let records = expand_records(&table, &wide_roles());

        assert_eq!(records.len(), 6);
    }

    #[test]
    fn test_wide_unparsable_cells_coerce_to_zero() {
        let table = parse_table("Branch,Backribs,Spareribs\nEast,n/a,\"1,234.5%\"\n");
        let records = expand_records(&table, &wide_roles());

        assert_eq!(records[0].metric, 0.0);
        assert_eq!(records[1].metric, 1234.5);
    }

    #[test]
    fn test_long_row_uses_resolved_keys() {
        let table = parse_table("Region,Store,Product,Qty\nNorth , Main ,Widgets, 12 \n");
        let roles = infer_roles(&table);
        let records = expand_records(&table, &roles);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, "Widgets");
        assert_eq!(records[0].branch, "Main");
        assert_eq!(records[0].area, "North");
        assert_eq!(records[0].item, "");
        assert_eq!(records[0].metric, 12.0);
    }

    #[test]
    fn test_long_row_without_product_key_uses_synthetic_label() {
        let roles = ColumnRoles {
            metric_key: Some("Output".to_string()),
            synthetic_product: true,
            synthetic_product_label: "Output".to_string(),
            ..ColumnRoles::default()
        };
        let table = parse_table("Branch,Output\nEast,10\n");
        let records = expand_records(&table, &roles);

        assert_eq!(records[0].product, "Output");
        assert_eq!(records[0].metric, 10.0);
        // Branch key was never resolved, so the field stays empty.
        assert_eq!(records[0].branch, "");
    }

    #[test]
    fn test_long_row_without_metric_key_yields_zero() {
        let roles = ColumnRoles {
            product_key: Some("Product".to_string()),
            ..ColumnRoles::default()
        };
        let table = parse_table("Product,Notes\nWidgets,fine\n");
        let records = expand_records(&table, &roles);

        assert_eq!(records[0].metric, 0.0);
    }
}
