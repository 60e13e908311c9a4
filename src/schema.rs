use log::debug;
use serde::{Deserialize, Serialize};

use crate::tokenizer::ParsedTable;
use crate::utils::is_numeric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Product,
    Branch,
    Area,
    Item,
    Metric,
}

/// Prioritized keyword table for role inference. Matching is a case-insensitive
/// exact comparison of a header name against a role's keyword list; the first
/// header in declared order wins. New roles or keywords extend this table
/// without touching the inference control flow.
const ROLE_KEYWORDS: &[(Role, &[&str])] = &[
    (
        Role::Product,
        &["product", "products", "prod", "sku", "category", "line"],
    ),
    (Role::Branch, &["branch", "store", "location", "office"]),
    (Role::Area, &["area", "region", "zone", "territory", "district"]),
    (Role::Item, &["item", "description", "desc", "name"]),
    (
        Role::Metric,
        &[
            "alloc",
            "allocation",
            "average",
            "avg",
            "value",
            "amount",
            "metric",
            "qty",
            "quantity",
            "total",
            "sales",
            "volume",
            "sum",
            "count",
        ],
    ),
];

/// Closed vocabulary for the fixed-position override. Known sheet layouts put
/// their per-product quantity columns in positions 3-7, and these are the
/// product names those layouts use.
const PRODUCT_NAME_VOCABULARY: &[&str] = &[
    "backribs",
    "spareribs",
    "loin",
    "shoulder",
    "belly",
    "ham",
    "tenderloin",
    "riblets",
];

/// Headers whose lowercased text contains any of these substrings are skipped
/// when choosing a synthetic product label.
const BANNED_LABEL_SUBSTRINGS: &[&str] = &[
    "sum",
    "avg",
    "average",
    "alloc",
    "allocation",
    "conversion",
    "target",
    "total",
    "uom",
    "branch",
    "area",
    "metric",
    "value",
    "amount",
    "qty",
    "quantity",
    "sales",
    "volume",
    "%",
    "kg",
];

const DEFAULT_PRODUCT_LABEL: &str = "All Products";

/// Semantic role assignment for the columns of a [`ParsedTable`].
///
/// `product_key` and a non-empty `product_columns` can both be computed, since
/// detection is independent; the row expander prefers `product_columns` when
/// non-empty, so wide format wins over a stray product label column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub product_key: Option<String>,
    pub branch_key: Option<String>,
    pub area_key: Option<String>,
    pub item_key: Option<String>,
    pub metric_key: Option<String>,
    /// Wide-format product category columns; empty for long format.
    pub product_columns: Vec<String>,
    /// True when no product column and no product-column set could be found,
    /// so every record is tagged with one invented product label.
    pub synthetic_product: bool,
    pub synthetic_product_label: String,
}

impl ColumnRoles {
    /// A schema can drive aggregation only when some metric source exists:
    /// either a metric column or a set of wide product columns.
    pub fn is_sufficient(&self) -> bool {
        self.metric_key.is_some() || !self.product_columns.is_empty()
    }
}

/// Guesses the semantic role of each column. Never fails: the worst case is
/// every role unset and a synthetic product with the default label. Callers
/// decide whether the result is sufficient via [`ColumnRoles::is_sufficient`].
pub fn infer_roles(table: &ParsedTable) -> ColumnRoles {
    let mut roles = ColumnRoles::default();

    for (role, keywords) in ROLE_KEYWORDS {
        let matched = table
            .headers
            .iter()
            .find(|header| keywords.contains(&header.to_lowercase().as_str()))
            .cloned();

        match role {
            Role::Product => roles.product_key = matched,
            Role::Branch => roles.branch_key = matched,
            Role::Area => roles.area_key = matched,
            Role::Item => roles.item_key = matched,
            Role::Metric => roles.metric_key = matched,
        }
    }

    apply_area_fallback(table, &mut roles);

    roles.product_columns = detect_product_columns(table, &roles);

    // A lone surviving numeric column is a metric, not a product category:
    // the table is single-metric long format.
    if roles.product_columns.len() == 1 {
        let single = roles.product_columns.remove(0);
        if roles.metric_key.is_none() {
            roles.metric_key = Some(single);
        }
    }

    if roles.product_key.is_none() && roles.product_columns.is_empty() {
        roles.synthetic_product = true;
        roles.synthetic_product_label = synthetic_label(table, &roles);
    }

    debug!("inferred column roles: {:?}", roles);
    roles
}

/// A common layout puts an unlabeled region column first. When no area header
/// matched but a branch did, and the first column holds more than 3 non-empty
/// values that are not all numeric, the first column is the area.
fn apply_area_fallback(table: &ParsedTable, roles: &mut ColumnRoles) {
    if roles.area_key.is_some() {
        return;
    }
    let branch_key = match &roles.branch_key {
        Some(key) => key,
        None => return,
    };
    let first = match table.headers.first() {
        Some(header) => header,
        None => return,
    };
    if first == branch_key {
        return;
    }

    let values: Vec<&str> = table
        .rows
        .iter()
        .filter_map(|row| row.get(first))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if values.len() > 3 && !values.iter().all(|value| is_numeric(value)) {
        roles.area_key = Some(first.clone());
    }
}

fn detect_product_columns(table: &ParsedTable, roles: &ColumnRoles) -> Vec<String> {
    let claimed: Vec<&String> = [
        &roles.product_key,
        &roles.branch_key,
        &roles.area_key,
        &roles.item_key,
    ]
    .into_iter()
    .flatten()
    .collect();

    let computed: Vec<String> = table
        .headers
        .iter()
        .filter(|header| !claimed.contains(header))
        .filter(|header| {
            table
                .rows
                .iter()
                .any(|row| row.get(*header).map_or(false, |value| is_numeric(value)))
        })
        .cloned()
        .collect();

    if let Some(band) = fixed_band_override(table) {
        debug!("fixed-position product band override: {:?}", band);
        return band;
    }

    if computed.is_empty() && table.headers.len() >= 3 {
        return band_fallback(table);
    }

    computed
}

/// Fixed-position special case: when any header in positions 3-7 (1-indexed)
/// matches the closed product vocabulary, that band subset replaces whatever
/// the numeric scan computed. This encodes prior knowledge about one family of
/// input layouts and is deliberately not generalized.
fn fixed_band_override(table: &ParsedTable) -> Option<Vec<String>> {
    let matches: Vec<String> = table
        .headers
        .iter()
        .skip(2)
        .take(5)
        .filter(|header| PRODUCT_NAME_VOCABULARY.contains(&header.to_lowercase().as_str()))
        .cloned()
        .collect();

    if matches.is_empty() {
        None
    } else {
        Some(matches)
    }
}

/// Last-resort wide guess: all headers in positions 3-7 whose original label
/// was non-empty.
fn band_fallback(table: &ParsedTable) -> Vec<String> {
    table
        .headers
        .iter()
        .zip(table.raw_headers.iter())
        .skip(2)
        .take(5)
        .filter(|(_, raw)| !raw.trim().is_empty())
        .map(|(header, _)| header.clone())
        .collect()
}

/// Picks the invented product label: the first raw header that survives the
/// denylist, then the resolved metric key, then the literal default.
fn synthetic_label(table: &ParsedTable, roles: &ColumnRoles) -> String {
    table
        .raw_headers
        .iter()
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .find(|raw| {
            let lowered = raw.to_lowercase();
            !BANNED_LABEL_SUBSTRINGS
                .iter()
                .any(|banned| lowered.contains(banned))
        })
        .map(str::to_string)
        .or_else(|| roles.metric_key.clone())
        .unwrap_or_else(|| DEFAULT_PRODUCT_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::parse_table;

    #[test]
    fn test_long_format_roles() {
        let table = parse_table(
            "Region,Store,Product,Item,Qty\nNorth,Main,Widgets,W-1,10\nSouth,Side,Gadgets,G-2,5\n",
        );
        let roles = infer_roles(&table);

        assert_eq!(roles.area_key.as_deref(), Some("Region"));
        assert_eq!(roles.branch_key.as_deref(), Some("Store"));
        assert_eq!(roles.product_key.as_deref(), Some("Product"));
        assert_eq!(roles.item_key.as_deref(), Some("Item"));
        assert_eq!(roles.metric_key.as_deref(), Some("Qty"));
        assert!(roles.product_columns.is_empty());
        assert!(!roles.synthetic_product);
        assert!(roles.is_sufficient());
    }

    #[test]
    fn test_first_matching_header_wins() {
        let table = parse_table("Branch,Store,Value\nEast,Main,1\n");
        let roles = infer_roles(&table);

        assert_eq!(roles.branch_key.as_deref(), Some("Branch"));
    }

    #[test]
    fn test_area_fallback_claims_leading_text_column() {
        let table = parse_table(
            "City,Branch,Product,Value\n\
             Lyon,Main,Widgets,1\nOslo,Main,Widgets,2\n\
             Kyiv,Side,Gadgets,3\nLima,Side,Gadgets,4\n",
        );
        let roles = infer_roles(&table);

        assert_eq!(roles.area_key.as_deref(), Some("City"));
        assert_eq!(roles.metric_key.as_deref(), Some("Value"));
        assert!(roles.product_columns.is_empty());
    }

    #[test]
    fn test_area_fallback_skips_numeric_first_column() {
        let table = parse_table(
            "Code,Branch,Product,Value\n1,Main,Widgets,1\n2,Main,Widgets,2\n3,Side,Gadgets,3\n4,Side,Gadgets,4\n",
        );
        let roles = infer_roles(&table);

        assert_eq!(roles.area_key, None);
    }

    #[test]
    fn test_wide_numeric_columns_detected() {
        let table = parse_table("Branch,Widgets,Gadgets\nEast,10,5\nWest,3,7\n");
        let roles = infer_roles(&table);

        assert_eq!(roles.product_columns, vec!["Widgets", "Gadgets"]);
        assert_eq!(roles.metric_key, None);
        assert!(!roles.synthetic_product);
        assert!(roles.is_sufficient());
    }

    #[test]
    fn test_fixed_band_override_replaces_numeric_scan() {
        let table =
            parse_table("Region,Branch,Backribs,Spareribs,Margin\nNorth,Main,10,5,0.4\n");
        let roles = infer_roles(&table);

        assert_eq!(roles.product_columns, vec!["Backribs", "Spareribs"]);
    }

    #[test]
    fn test_band_fallback_without_numeric_cells() {
        let table = parse_table("Day,Branch,Alpha,Beta\nMon,Main,x,y\nTue,Side,z,w\n");
        let roles = infer_roles(&table);

        assert_eq!(roles.product_columns, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_single_numeric_column_doubles_as_metric() {
        let table = parse_table("Branch,Output\nEast,10\nWest,4\n");
        let roles = infer_roles(&table);

        assert_eq!(roles.metric_key.as_deref(), Some("Output"));
        assert!(roles.product_columns.is_empty());
        assert!(roles.synthetic_product);
        assert_eq!(roles.synthetic_product_label, "Output");
    }

    #[test]
    fn test_synthetic_label_falls_back_to_metric_key() {
        let table = parse_table("Branch,Total\nMain,100\nSide,50\n");
        let roles = infer_roles(&table);

        assert!(roles.synthetic_product);
        assert_eq!(roles.synthetic_product_label, "Total");
    }

    #[test]
    fn test_synthetic_label_default() {
        let table = parse_table("Area,Branch\nNorth,Main\nSouth,Side\n");
        let roles = infer_roles(&table);

        assert!(roles.synthetic_product);
        assert_eq!(roles.synthetic_product_label, "All Products");
        assert!(!roles.is_sufficient());
    }

    #[test]
    fn test_text_only_table_is_insufficient() {
        let table = parse_table("Notes,Comments\nhello,world\nfoo,bar\n");
        let roles = infer_roles(&table);

        assert!(!roles.is_sufficient());
        assert!(roles.synthetic_product);
    }
}
