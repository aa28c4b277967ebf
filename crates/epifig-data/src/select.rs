//! Row selection and aggregation: range filters, sorting, truncation and
//! grouped sums.
//!
//! Every transform takes its input by value and returns a new [`Dataset`],
//! so stages compose without sharing mutable state.

use crate::dataset::Dataset;
use crate::value::Value;
use epifig_common::{EpiFigError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::RangeBounds;
use tracing::{debug, instrument};

/// Keep rows whose integer value in `column` lies in `range`.
///
/// Bounds are explicit: `1..=16` keeps ids 1 through 16, `17..` keeps 17 and
/// above. Nulls and non-integral values never match.
#[instrument(skip(dataset, range), fields(rows = dataset.len()))]
pub fn filter_by_range<R>(dataset: Dataset, column: &str, range: R) -> Result<Dataset>
where
    R: RangeBounds<i64>,
{
    let idx = dataset.column_index(column)?;
    let (columns, rows) = dataset.into_parts();
    let rows: Vec<Vec<Value>> = rows
        .into_iter()
        .filter(|row| row[idx].as_i64().is_some_and(|v| range.contains(&v)))
        .collect();
    debug!(kept = rows.len(), "filtered by range");
    Ok(Dataset::from_parts(columns, rows))
}

/// Stable sort on one column. Nulls go last in both directions.
pub fn sort_by(dataset: Dataset, column: &str, descending: bool) -> Result<Dataset> {
    let idx = dataset.column_index(column)?;
    let (columns, mut rows) = dataset.into_parts();
    rows.sort_by(|a, b| compare(&a[idx], &b[idx], descending));
    Ok(Dataset::from_parts(columns, rows))
}

fn compare(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.cmp_non_null(b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// First `n` rows. Shorter datasets come back whole.
pub fn top_n(dataset: Dataset, n: usize) -> Dataset {
    let (columns, mut rows) = dataset.into_parts();
    rows.truncate(n);
    Dataset::from_parts(columns, rows)
}

/// Per-group totals of one or more value columns, in first-seen group order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSums {
    value_columns: Vec<String>,
    groups: Vec<(String, Vec<f64>)>,
}

impl GroupedSums {
    /// Group labels in first-seen order.
    pub fn labels(&self) -> Vec<String> {
        self.groups.iter().map(|(label, _)| label.clone()).collect()
    }

    /// Summed columns, in the order requested.
    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Totals of one value column, aligned with [`labels`](Self::labels).
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.value_columns.iter().position(|c| c == name)?;
        Some(self.groups.iter().map(|(_, sums)| sums[idx]).collect())
    }

    /// Elementwise sum of all value columns per group.
    ///
    /// For columns that split one quantity by sub-category (male/female
    /// cases) this is the per-group total of that quantity.
    pub fn combined(&self) -> Vec<f64> {
        self.groups
            .iter()
            .map(|(_, sums)| sums.iter().sum())
            .collect()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Label and per-column totals of each group.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.groups
            .iter()
            .map(|(label, sums)| (label.as_str(), sums.as_slice()))
    }
}

/// Group rows by `group_column` and sum each of `value_columns`.
///
/// Rows with a null group key are skipped; null values count as zero.
#[instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn group_sum(
    dataset: &Dataset,
    group_column: &str,
    value_columns: &[&str],
) -> Result<GroupedSums> {
    let group_idx = dataset.column_index(group_column)?;
    let value_idx = value_columns
        .iter()
        .map(|c| dataset.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

    for (row_index, row) in dataset.rows().iter().enumerate() {
        if row[group_idx].is_null() {
            continue;
        }
        let label = row[group_idx].to_string();
        let slot = *positions.entry(label.clone()).or_insert_with(|| {
            groups.push((label, vec![0.0; value_idx.len()]));
            groups.len() - 1
        });

        for (k, &col) in value_idx.iter().enumerate() {
            groups[slot].1[k] += summand(&row[col], value_columns[k], row_index)?;
        }
    }

    debug!(groups = groups.len(), "grouped sums");
    Ok(GroupedSums {
        value_columns: value_columns.iter().map(|c| (*c).to_string()).collect(),
        groups,
    })
}

/// Sum of one column over the whole dataset. Nulls count as zero.
pub fn scalar_sum(dataset: &Dataset, column: &str) -> Result<f64> {
    dataset
        .column(column)?
        .enumerate()
        .try_fold(0.0, |acc, (row_index, value)| -> Result<f64> {
            Ok(acc + summand(value, column, row_index)?)
        })
}

fn summand(value: &Value, column: &str, row_index: usize) -> Result<f64> {
    match value {
        Value::Null => Ok(0.0),
        other => other.as_f64().ok_or_else(|| {
            EpiFigError::schema_column(
                format!(
                    "cannot sum {} value in column '{column}' at row {row_index}",
                    other.type_name()
                ),
                column,
            )
        }),
    }
}
