//! Relational merge of two tables on a key column.

use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use serde_json::Value;

use crate::{error::TableError, table::Table};

/// Which unmatched rows survive a [`join`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum JoinType {
    /// Only rows with a match on both sides.
    #[default]
    Inner,
    /// Every left row; unmatched ones get null right columns.
    Left,
    /// Every right row; unmatched ones get null left columns.
    Right,
    /// Every row from both sides.
    Outer,
}

/// Merges `left` and `right` where `left[left_on]` equals `right[right_on]`.
///
/// The result has all left columns followed by all right columns. When both
/// key columns share a name the key appears once; any other name present on
/// both sides gets an `_x` (left) or `_y` (right) suffix. Duplicate keys
/// produce every matching pair, and null keys never match.
///
/// Rows come out in left order for inner and left joins, in right order for
/// right joins, and in left order followed by the unmatched right rows for
/// outer joins.
pub fn join(
    left: &Table,
    right: &Table,
    left_on: &str,
    right_on: &str,
    how: JoinType,
) -> Result<Table, TableError> {
    let left_key = left.column_index(left_on)?;
    let right_key = right.column_index(right_on)?;
    let shared_key = left_on == right_on;

    let right_kept: Vec<usize> = (0..right.columns().len())
        .filter(|&j| !(shared_key && j == right_key))
        .collect();

    let columns = output_columns(left, right, &right_kept, shared_key.then_some(left_key));

    let left_index = index_by_key(left, left_key);
    let right_index = index_by_key(right, right_key);

    let merged = |l: Option<&Vec<Value>>, r: Option<&Vec<Value>>| -> Vec<Value> {
        let mut row = match l {
            Some(l) => l.clone(),
            None => {
                let mut nulls = vec![Value::Null; left.columns().len()];
                if let (true, Some(r)) = (shared_key, r) {
                    nulls[left_key] = r[right_key].clone();
                }
                nulls
            }
        };
        row.extend(
            right_kept
                .iter()
                .map(|&j| r.map(|r| r[j].clone()).unwrap_or(Value::Null)),
        );
        row
    };

    let mut rows = Vec::new();
    match how {
        JoinType::Inner | JoinType::Left | JoinType::Outer => {
            let mut matched_right = HashSet::new();
            for l in left.rows() {
                let matches = key_of(&l[left_key]).and_then(|k| right_index.get(&k));
                match matches {
                    Some(matches) => {
                        for &j in matches {
                            matched_right.insert(j);
                            rows.push(merged(Some(l), Some(&right.rows()[j])));
                        }
                    }
                    None if how != JoinType::Inner => rows.push(merged(Some(l), None)),
                    None => {}
                }
            }
            if how == JoinType::Outer {
                for (j, r) in right.rows().iter().enumerate() {
                    if !matched_right.contains(&j) {
                        rows.push(merged(None, Some(r)));
                    }
                }
            }
        }
        JoinType::Right => {
            for r in right.rows() {
                match key_of(&r[right_key]).and_then(|k| left_index.get(&k)) {
                    Some(matches) => {
                        for &i in matches {
                            rows.push(merged(Some(&left.rows()[i]), Some(r)));
                        }
                    }
                    None => rows.push(merged(None, Some(r))),
                }
            }
        }
    }

    Table::from_rows(columns, rows)
}

fn output_columns(
    left: &Table,
    right: &Table,
    right_kept: &[usize],
    shared_key: Option<usize>,
) -> Vec<String> {
    let left_names: Vec<&String> = left
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != shared_key)
        .map(|(_, n)| n)
        .collect();
    let right_names: Vec<&String> = right_kept.iter().map(|&j| &right.columns()[j]).collect();

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if Some(i) != shared_key && right_names.contains(&name) {
                format!("{}_x", name)
            } else {
                name.clone()
            }
        })
        .collect();

    columns.extend(right_names.iter().map(|name| {
        if left_names.contains(name) {
            format!("{}_y", name)
        } else {
            (*name).clone()
        }
    }));
    columns
}

fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn index_by_key(table: &Table, key: usize) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        if let Some(k) = key_of(&row[key]) {
            index.entry(k).or_default().push(i);
        }
    }
    index
}
