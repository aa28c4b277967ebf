//! Reference joins against the administrative unit mapping.

use crate::dataset::Dataset;
use crate::fields;
use crate::value::{JoinKey, Value};
use epifig_common::{AdmUnitId, EpiFigError, Result};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Unit id to display name, built once per run and shared by every join.
#[derive(Debug, Clone)]
pub struct AdminUnitMapping {
    dataset: Dataset,
    names: HashMap<i64, usize>,
}

impl AdminUnitMapping {
    /// Project a normalized mapping dataset to `AdmUnitId` and `Name`.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Self::from_columns(dataset, fields::ADM_UNIT_ID, fields::NAME)
    }

    /// Project arbitrary id/name columns. Ids must be integral and unique,
    /// names must be text.
    pub fn from_columns(dataset: &Dataset, id_column: &str, name_column: &str) -> Result<Self> {
        let projected = dataset.select(&[id_column, name_column])?;
        let mut names = HashMap::with_capacity(projected.len());

        for (row_index, row) in projected.rows().iter().enumerate() {
            let id = row[0].as_i64().ok_or_else(|| {
                EpiFigError::schema_column(
                    format!(
                        "row {row_index}: unit id must be an integer, found {}",
                        row[0].type_name()
                    ),
                    id_column,
                )
            })?;
            if row[1].as_str().is_none() {
                return Err(EpiFigError::schema_column(
                    format!(
                        "row {row_index}: unit name must be text, found {}",
                        row[1].type_name()
                    ),
                    name_column,
                ));
            }
            if names.insert(id, row_index).is_some() {
                return Err(EpiFigError::schema_column(
                    format!("unit id {id} appears more than once"),
                    id_column,
                ));
            }
        }

        debug!(units = names.len(), "built administrative unit mapping");
        Ok(Self {
            dataset: projected,
            names,
        })
    }

    /// The projected id/name dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Name of the id column the mapping joins on.
    pub fn key_column(&self) -> &str {
        &self.dataset.columns()[0]
    }

    /// Display name for a unit id.
    pub fn name_of(&self, id: AdmUnitId) -> Option<&str> {
        self.names
            .get(&id.0)
            .and_then(|&row| self.dataset.rows()[row][1].as_str())
    }

    /// Whether `id` has a name.
    pub fn contains(&self, id: AdmUnitId) -> bool {
        self.names.contains_key(&id.0)
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the mapping has no units.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Inner join of `left` with `right` on `on`.
///
/// Left row order is preserved and every matching left row yields exactly one
/// output row. Right keys are expected to be unique; if they are not, the
/// first occurrence wins. Output columns are the left columns followed by the
/// right columns other than the key.
#[instrument(skip(left, right), fields(left_rows = left.len(), right_rows = right.len()))]
pub fn join(left: Dataset, right: &Dataset, on: &str) -> Result<Dataset> {
    let left_key = left
        .column_index(on)
        .map_err(|_| EpiFigError::join_key(on, "left"))?;
    let right_key = right
        .column_index(on)
        .map_err(|_| EpiFigError::join_key(on, "right"))?;

    let right_extra: Vec<usize> = (0..right.columns().len())
        .filter(|&i| i != right_key)
        .collect();
    if let Some(clash) = right_extra
        .iter()
        .map(|&i| &right.columns()[i])
        .find(|name| left.has_column(name))
    {
        return Err(EpiFigError::schema_column(
            format!("column '{clash}' exists on both sides of the join on '{on}'"),
            clash.clone(),
        ));
    }

    let mut index: HashMap<JoinKey, usize> = HashMap::with_capacity(right.len());
    for (row_index, row) in right.rows().iter().enumerate() {
        if let Some(key) = row[right_key].join_key() {
            if index.contains_key(&key) {
                warn!(key = %row[right_key], "duplicate key on right side of join, keeping first");
                continue;
            }
            index.insert(key, row_index);
        }
    }

    let (mut columns, left_rows) = left.into_parts();
    let input_rows = left_rows.len();
    columns.extend(right_extra.iter().map(|&i| right.columns()[i].clone()));

    let rows: Vec<Vec<Value>> = left_rows
        .into_iter()
        .filter_map(|mut row| {
            let matched = row[left_key].join_key().and_then(|key| index.get(&key))?;
            let right_row = &right.rows()[*matched];
            row.extend(right_extra.iter().map(|&i| right_row[i].clone()));
            Some(row)
        })
        .collect();

    if rows.len() < input_rows {
        debug!(
            dropped = input_rows - rows.len(),
            "inner join dropped rows without a match"
        );
    }
    Ok(Dataset::from_parts(columns, rows))
}

/// Attach unit names to `left` through the shared mapping.
pub fn join_names(left: Dataset, mapping: &AdminUnitMapping) -> Result<Dataset> {
    join(left, mapping.dataset(), mapping.key_column())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> AdminUnitMapping {
        let ds = Dataset::new(
            vec!["AdmUnitId".into(), "Name".into(), "ObjectId".into()],
            vec![
                vec![Value::Int(1), "A".into(), Value::Int(10)],
                vec![Value::Int(2), "B".into(), Value::Int(11)],
            ],
        )
        .unwrap();
        AdminUnitMapping::from_dataset(&ds).unwrap()
    }

    fn key_data(ids: &[i64]) -> Dataset {
        Dataset::new(
            vec!["AdmUnitId".into(), "Inz7T".into()],
            ids.iter()
                .map(|&id| vec![Value::Int(id), Value::Float(id as f64 * 10.0)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_mapping_projection() {
        let mapping = mapping();
        assert_eq!(mapping.dataset().columns(), ["AdmUnitId", "Name"]);
        assert_eq!(mapping.name_of(AdmUnitId(2)), Some("B"));
        assert_eq!(mapping.name_of(AdmUnitId(3)), None);
        assert!(mapping.contains(AdmUnitId(1)));
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.key_column(), "AdmUnitId");
    }

    #[test]
    fn test_mapping_rejects_duplicate_ids() {
        let ds = Dataset::new(
            vec!["AdmUnitId".into(), "Name".into()],
            vec![
                vec![Value::Int(1), "A".into()],
                vec![Value::Float(1.0), "A again".into()],
            ],
        )
        .unwrap();
        assert!(AdminUnitMapping::from_dataset(&ds).is_err());
    }

    #[test]
    fn test_mapping_requires_columns() {
        let ds = Dataset::new(vec!["Id".into()], vec![]).unwrap();
        assert!(matches!(
            AdminUnitMapping::from_dataset(&ds),
            Err(EpiFigError::Schema { .. })
        ));
    }

    #[test]
    fn test_inner_join_drops_unmatched_and_keeps_order() {
        let joined = join_names(key_data(&[2, 7, 1, 2]), &mapping()).unwrap();
        assert_eq!(joined.columns(), ["AdmUnitId", "Inz7T", "Name"]);
        assert_eq!(joined.text_column("Name").unwrap(), vec!["B", "A", "B"]);
    }

    #[test]
    fn test_float_keys_match_int_keys() {
        let left = Dataset::new(
            vec!["AdmUnitId".into()],
            vec![vec![Value::Float(1.0)], vec![Value::Null]],
        )
        .unwrap();
        let joined = join_names(left, &mapping()).unwrap();
        assert_eq!(joined.len(), 1);
    }

    #[test]
    fn test_missing_key_is_join_key_error() {
        let left = Dataset::new(vec!["Id".into()], vec![]).unwrap();
        match join(left, mapping().dataset(), "AdmUnitId") {
            Err(EpiFigError::JoinKey { column, side }) => {
                assert_eq!(column, "AdmUnitId");
                assert_eq!(side, "left");
            }
            other => panic!("expected join key error, got {other:?}"),
        }

        let right = key_data(&[1]).select(&["Inz7T"]).unwrap();
        match join(key_data(&[1]), &right, "AdmUnitId") {
            Err(EpiFigError::JoinKey { side, .. }) => assert_eq!(side, "right"),
            other => panic!("expected join key error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_key_collision_is_schema_error() {
        let left = Dataset::new(
            vec!["AdmUnitId".into(), "Name".into()],
            vec![vec![Value::Int(1), "x".into()]],
        )
        .unwrap();
        assert!(matches!(
            join_names(left, &mapping()),
            Err(EpiFigError::Schema { .. })
        ));
    }

    #[test]
    fn test_duplicate_right_keys_do_not_multiply_rows() {
        let right = Dataset::new(
            vec!["AdmUnitId".into(), "Name".into()],
            vec![
                vec![Value::Int(1), "first".into()],
                vec![Value::Int(1), "second".into()],
            ],
        )
        .unwrap();
        let joined = join(key_data(&[1, 1]), &right, "AdmUnitId").unwrap();
        assert_eq!(joined.text_column("Name").unwrap(), vec!["first", "first"]);
    }
}
