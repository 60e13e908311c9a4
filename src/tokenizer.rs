use log::debug;
use std::collections::{BTreeMap, HashSet};

/// Tabular text split into named columns and rows of raw cell text.
///
/// `headers` are unique (case-insensitively) and non-empty; `raw_headers`
/// keeps the trimmed pre-repair labels at the same positions for the role
/// inference heuristics that need to see the original text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub raw_headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl ParsedTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Tab,
}

/// Splits a raw text blob into a [`ParsedTable`].
///
/// The delimiter is chosen once from the first non-blank line and applied to
/// every line; the header row is the first row that looks textual rather than
/// numeric, falling back to the widest row when nothing qualifies. Input with
/// no non-blank lines yields an empty table.
pub fn parse_table(text: &str) -> ParsedTable {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return ParsedTable::default();
    }

    let delimiter = detect_delimiter(lines[0]);
    debug!(
        "delimiter detected as {:?} from first line {:?}",
        delimiter, lines[0]
    );

    let cell_rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| split_cells(line, delimiter))
        .collect();
    let widest = cell_rows.iter().map(Vec::len).max().unwrap_or(0);

    let header_idx = find_header_row(&cell_rows);
    debug!("header row chosen at line index {}", header_idx);

    let mut header_cells = cell_rows[header_idx].clone();
    repair_headers(&mut header_cells, cell_rows.get(header_idx + 1), widest);
    let (headers, raw_headers) = sanitize_headers(&header_cells);

    let rows = cell_rows
        .iter()
        .skip(header_idx + 1)
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(pos, header)| {
                    (header.clone(), cells.get(pos).cloned().unwrap_or_default())
                })
                .collect::<BTreeMap<String, String>>()
        })
        .collect();

    ParsedTable {
        headers,
        raw_headers,
        rows,
    }
}

fn detect_delimiter(first_line: &str) -> Delimiter {
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if tabs > commas {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

fn split_cells(line: &str, delimiter: Delimiter) -> Vec<String> {
    match delimiter {
        // Tab-separated input has no quoting convention.
        Delimiter::Tab => line.split('\t').map(str::to_string).collect(),
        Delimiter::Comma => split_quoted(line),
    }
}

/// Quote-aware comma splitting: a `"` toggles the in-quotes state, a doubled
/// `""` inside quotes emits one literal quote, and commas only separate cells
/// outside quotes.
fn split_quoted(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells
}

/// A row qualifies as the header when enough of its cells contain alphabetic
/// text: at least max(2, ceil(0.3 x cell count)). The first qualifying row
/// wins; if none qualifies the widest row seen is the best-effort header.
fn find_header_row(cell_rows: &[Vec<String>]) -> usize {
    let mut widest = 0;
    let mut widest_idx = 0;

    for (idx, cells) in cell_rows.iter().enumerate() {
        if looks_like_header(cells) {
            return idx;
        }
        if cells.len() > widest {
            widest = cells.len();
            widest_idx = idx;
        }
    }

    widest_idx
}

fn looks_like_header(cells: &[String]) -> bool {
    let texty = cells
        .iter()
        .filter(|cell| cell.chars().any(char::is_alphabetic))
        .count();
    let needed = ((cells.len() as f64) * 0.3).ceil() as usize;

    texty >= needed.max(2)
}

/// Two common defects are patched before sanitization: a leading area-label
/// column with no header of its own (detectable when the header starts with a
/// "branch" column but data rows carry one extra cell), and headers shorter
/// than the widest row.
fn repair_headers(
    header_cells: &mut Vec<String>,
    first_data_row: Option<&Vec<String>>,
    widest: usize,
) {
    if let Some(first) = header_cells.first() {
        let data_width = first_data_row.map(Vec::len);
        if first.to_lowercase().contains("branch") && data_width == Some(header_cells.len() + 1) {
            header_cells.insert(0, "Area".to_string());
        }
    }

    while header_cells.len() < widest {
        header_cells.push(format!("col{}", header_cells.len() + 1));
    }
}

/// Trims each header cell, replaces empty names with `col<position>`, and
/// resolves case-insensitive collisions with `_1`, `_2`, ... suffixes.
/// Returns `(headers, raw_headers)` with positional correspondence.
fn sanitize_headers(cells: &[String]) -> (Vec<String>, Vec<String>) {
    let mut headers = Vec::with_capacity(cells.len());
    let mut raw_headers = Vec::with_capacity(cells.len());
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, cell) in cells.iter().enumerate() {
        let trimmed = cell.trim().to_string();
        raw_headers.push(trimmed.clone());

        let mut name = if trimmed.is_empty() {
            format!("col{}", idx + 1)
        } else {
            trimmed
        };

        if seen.contains(&name.to_lowercase()) {
            let base = name.clone();
            let mut suffix = 1;
            name = loop {
                let candidate = format!("{}_{}", base, suffix);
                if !seen.contains(&candidate.to_lowercase()) {
                    break candidate;
                }
                suffix += 1;
            };
        }

        seen.insert(name.to_lowercase());
        headers.push(name);
    }

    (headers, raw_headers)
}
