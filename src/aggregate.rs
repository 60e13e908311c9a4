use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::records::NormalizedRecord;
use crate::schema::ColumnRoles;

/// Label used for records whose grouping value is empty.
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupDimension {
    #[default]
    Product,
    Branch,
    Area,
}

/// Equality constraints over the record dimensions plus the dimension to
/// group totals by. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub product: Option<String>,
    pub branch: Option<String>,
    pub area: Option<String>,
    pub group_by: GroupDimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub label: String,
    pub total: f64,
}

fn dimension_value(record: &NormalizedRecord, dimension: GroupDimension) -> &str {
    match dimension {
        GroupDimension::Product => &record.product,
        GroupDimension::Branch => &record.branch,
        GroupDimension::Area => &record.area,
    }
}

/// Whether a record survives the filters under the given schema.
///
/// The product constraint always applies, since every record carries a
/// product value (real or synthetic). Branch and area constraints only apply
/// when the schema resolved that role; a dimension the schema never had can
/// not reject a record, regardless of the filter value. Comparison is exact
/// and case-sensitive.
pub fn passes_filters(
    record: &NormalizedRecord,
    roles: &ColumnRoles,
    filters: &FilterSpec,
) -> bool {
    if let Some(product) = &filters.product {
        if record.product != *product {
            return false;
        }
    }
    if roles.branch_key.is_some() {
        if let Some(branch) = &filters.branch {
            if record.branch != *branch {
                return false;
            }
        }
    }
    if roles.area_key.is_some() {
        if let Some(area) = &filters.area {
            if record.area != *area {
                return false;
            }
        }
    }

    true
}

/// Computes group totals for the records surviving the filters, sorted by
/// total descending. Ties keep the order in which labels were first
/// encountered. An empty result means no record survived, which callers
/// render as an empty state rather than a zero-value group.
pub fn aggregate(
    records: &[NormalizedRecord],
    roles: &ColumnRoles,
    filters: &FilterSpec,
) -> Vec<GroupTotal> {
    let mut totals: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records
        .iter()
        .filter(|record| passes_filters(record, roles, filters))
    {
        let value = dimension_value(record, filters.group_by);
        let label = if value.is_empty() {
            UNSPECIFIED_LABEL
        } else {
            value
        };

        match index.get(label) {
            Some(&position) => totals[position].total += record.metric,
            None => {
                index.insert(label.to_string(), totals.len());
                totals.push(GroupTotal {
                    label: label.to_string(),
                    total: record.metric,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    totals
}

/// Unique non-empty values of a dimension, sorted lexicographically
/// ascending. Callers pass a pre-filtered slice to scope the options, e.g.
/// branches within the currently selected area.
pub fn distinct_values(records: &[NormalizedRecord], dimension: GroupDimension) -> Vec<String> {
    let mut values: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        let value = dimension_value(record, dimension);
        if !value.is_empty() {
            values.insert(value);
        }
    }

    values.into_iter().map(str::to_string).collect()
}
