//! Row-major tabular dataset with a fixed column set.

use crate::value::Value;
use epifig_common::{EpiFigError, Result};
use std::collections::HashSet;

/// Ordered rows sharing one ordered column set.
///
/// Every row holds exactly one value per column; the constructor enforces it,
/// so transforms can index rows by column position without checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create a dataset, rejecting duplicate column names and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(EpiFigError::schema_column(
                format!("duplicate column '{dup}'"),
                dup.clone(),
            ));
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(EpiFigError::schema(format!(
                "row {index} has {} values but the dataset has {} columns",
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Rows already known to match `columns`.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Split into columns and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column named `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of a column, or a schema error naming it.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns.iter().position(|c| c == name).ok_or_else(|| {
            EpiFigError::schema_column(format!("dataset has no column '{name}'"), name)
        })
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Value at a row and named column.
    pub fn value(&self, row: usize, name: &str) -> Result<Option<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.get(row).map(|r| &r[idx]))
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Dataset> {
        let indices = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>>>()?;
        let columns = names.iter().map(|n| (*n).to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Dataset::new(columns, rows)
    }

    /// Column rendered as labels. Nulls are a schema error.
    pub fn text_column(&self, name: &str) -> Result<Vec<String>> {
        self.column(name)?
            .enumerate()
            .map(|(row, value)| match value {
                Value::Null => Err(EpiFigError::schema_column(
                    format!("null label in column '{name}' at row {row}"),
                    name,
                )),
                other => Ok(other.to_string()),
            })
            .collect()
    }

    /// Column as numbers. Anything other than an int or float is a schema error.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .enumerate()
            .map(|(row, value)| {
                value.as_f64().ok_or_else(|| {
                    EpiFigError::schema_column(
                        format!(
                            "expected a number in column '{name}' at row {row}, found {}",
                            value.type_name()
                        ),
                        name,
                    )
                })
            })
            .collect()
    }
}
