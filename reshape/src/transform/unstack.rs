//! Pivot the sub-key level of an [`IndexedTable`] into columns.
//!
//! ```text
//! key sub value           value
//! A   x   1               sub  x  y
//! A   y   2        →      key
//! B   x   3               A    1  2
//!                         B    3  -
//! ```
//!
//! Row keys and sub keys are sorted: numerically when every label of the
//! level is a number other than NaN, lexicographically otherwise.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::config::DuplicatePolicy;
use crate::error::{TransformError, TransformResult};
use crate::models::{Cell, ColumnLabel, Frame, IndexedTable};

/// Unstack the sub key into columns.
///
/// The result has one row per distinct row key and one column per
/// (data column, sub key) pair, data-column-major. Pairs absent from the
/// input are `None`.
pub fn unstack(table: IndexedTable, policy: DuplicatePolicy) -> TransformResult<Frame<String, ColumnLabel>> {
    let row_keys = sorted_labels(table.rows.iter().map(|r| r.row_key.as_str()));
    let sub_keys = sorted_labels(table.rows.iter().map(|r| r.sub_key.as_str()));

    let row_pos: HashMap<&str, usize> = row_keys.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect();
    let sub_pos: HashMap<&str, usize> = sub_keys.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect();

    let n_sub = sub_keys.len();
    let n_cols = table.value_columns.len() * n_sub;
    let mut cells: Vec<Vec<Cell>> = vec![vec![None; n_cols]; row_keys.len()];
    let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(table.rows.len());

    for row in &table.rows {
        let r = row_pos[row.row_key.as_str()];
        let s = sub_pos[row.sub_key.as_str()];

        if !seen.insert((r, s)) && policy == DuplicatePolicy::Reject {
            return Err(TransformError::DuplicateKey {
                row_key: row.row_key.clone(),
                sub_key: row.sub_key.clone(),
            });
        }

        for (v, value) in row.values.iter().enumerate() {
            cells[r][v * n_sub + s] = value.clone();
        }
    }

    let columns: Vec<ColumnLabel> = table
        .value_columns
        .iter()
        .flat_map(|v| sub_keys.iter().map(move |s| ColumnLabel::new(v.clone(), s.clone())))
        .collect();

    Ok(Frame::from_cells(
        vec![table.row_key_name],
        vec![String::new(), table.sub_key_name],
        row_keys,
        columns,
        cells,
    ))
}

/// Distinct labels in index order.
pub fn sorted_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique: Vec<&str> = labels.filter(|l| seen.insert(*l)).collect();

    let numeric: Option<Vec<(f64, &str)>> = unique.iter().map(|l| numeric_label(l).map(|n| (n, *l))).collect();

    match numeric {
        Some(mut keyed) => {
            keyed.sort_by(|a, b| compare_numeric(*a, *b));
            keyed.into_iter().map(|(_, l)| l.to_string()).collect()
        }
        None => {
            unique.sort_unstable();
            unique.into_iter().map(String::from).collect()
        }
    }
}

fn numeric_label(label: &str) -> Option<f64> {
    label.parse::<f64>().ok().filter(|n| !n.is_nan())
}

// Equal values written differently ("1", "1.0") fall back to the text.
fn compare_numeric((x, a): (f64, &str), (y, b): (f64, &str)) -> Ordering {
    x.total_cmp(&y).then_with(|| a.cmp(b))
}
