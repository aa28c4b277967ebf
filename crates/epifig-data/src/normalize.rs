//! Record normalization: raw feature attributes to a [`Dataset`].

use crate::dataset::Dataset;
use crate::value::{RawRecord, Value};
use chrono::DateTime;
use epifig_common::{EpiFigError, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{debug, instrument};

/// Default calendar date format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-column value conversion applied during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldDecoder {
    /// Keep the value as returned.
    #[default]
    Identity,
    /// Epoch milliseconds to a UTC calendar date rendered with a chrono format.
    EpochMillisToDate {
        /// chrono `strftime` pattern.
        format: String,
    },
}

impl FieldDecoder {
    /// Epoch milliseconds rendered as `YYYY-MM-DD`.
    pub fn epoch_millis_date() -> Self {
        Self::EpochMillisToDate {
            format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Convert one value. Nulls pass through every decoder.
    pub fn decode(&self, value: Value) -> Result<Value> {
        match self {
            FieldDecoder::Identity => Ok(value),
            FieldDecoder::EpochMillisToDate { .. } if value.is_null() => Ok(value),
            FieldDecoder::EpochMillisToDate { format } => {
                let millis = value.as_i64().ok_or_else(|| {
                    EpiFigError::schema(format!(
                        "expected epoch milliseconds, found {} '{value}'",
                        value.type_name()
                    ))
                })?;
                convert_millisecond_date(millis, format).map(Value::Text)
            }
        }
    }
}

/// Decoders keyed by column; columns without one pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct FieldDecoders {
    decoders: BTreeMap<String, FieldDecoder>,
}

impl FieldDecoders {
    /// No decoders; every column passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoder for `column`, replacing any earlier one.
    pub fn with(mut self, column: impl Into<String>, decoder: FieldDecoder) -> Self {
        self.decoders.insert(column.into(), decoder);
        self
    }

    /// Decoder for `column`, [`FieldDecoder::Identity`] when none is set.
    pub fn get(&self, column: &str) -> &FieldDecoder {
        static IDENTITY: FieldDecoder = FieldDecoder::Identity;
        self.decoders.get(column).unwrap_or(&IDENTITY)
    }

    /// Whether no column has a decoder.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

/// Format epoch milliseconds as a UTC date.
///
/// The value is floored to whole seconds before formatting.
pub fn convert_millisecond_date(millis: i64, format: &str) -> Result<String> {
    let secs = millis.div_euclid(1000);
    let timestamp = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| EpiFigError::schema(format!("timestamp {millis}ms is out of range")))?;

    let mut out = String::new();
    write!(out, "{}", timestamp.format(format))
        .map_err(|_| EpiFigError::schema(format!("invalid date format '{format}'")))?;
    Ok(out)
}

/// Apply one decoder to a column of an existing dataset.
///
/// For columns whose raw values are needed first, such as dates that must be
/// ordered on their timestamps before they are rendered.
pub fn decode_column(dataset: Dataset, column: &str, decoder: &FieldDecoder) -> Result<Dataset> {
    let index = dataset.column_index(column)?;
    let (columns, mut rows) = dataset.into_parts();
    for row in &mut rows {
        let raw = std::mem::replace(&mut row[index], Value::Null);
        row[index] = decoder.decode(raw)?;
    }
    Ok(Dataset::from_parts(columns, rows))
}

/// Turn a batch of records into a dataset.
///
/// The first record's keys (sorted) define the columns. Any later record
/// with a different key set is rejected rather than padded or trimmed.
#[instrument(skip(records, decoders), fields(records = records.len()))]
pub fn normalize(records: Vec<RawRecord>, decoders: &FieldDecoders) -> Result<Dataset> {
    let Some(first) = records.first() else {
        debug!("no records to normalize");
        return Ok(Dataset::default());
    };
    let columns: Vec<String> = first.keys().cloned().collect();

    for column in decoders.decoders.keys() {
        if !first.contains_key(column) {
            return Err(EpiFigError::schema_column(
                format!("decoder configured for missing column '{column}'"),
                column.clone(),
            ));
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if record.len() != columns.len() || !record.keys().eq(columns.iter()) {
            let missing: Vec<&str> = columns
                .iter()
                .filter(|c| !record.contains_key(*c))
                .map(String::as_str)
                .collect();
            let extra: Vec<&str> = record
                .keys()
                .filter(|k| !columns.contains(k))
                .map(String::as_str)
                .collect();
            return Err(EpiFigError::schema(format!(
                "record {index} has a different field set (missing: {missing:?}, unexpected: {extra:?})"
            )));
        }

        let row = record
            .into_iter()
            .map(|(column, value)| decoders.get(&column).decode(value))
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    debug!(rows = rows.len(), columns = columns.len(), "normalized records");
    Ok(Dataset::from_parts(columns, rows))
}
