//! # EpiFig Data
//!
//! Retrieval of feature-service records and the tabular transforms the
//! chart builders run on them.
//!
//! Data flows one way: a [`Fetcher`] returns flat records, [`normalize`]
//! turns them into a [`Dataset`], and the join and selection functions
//! derive new datasets from it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod arcgis;
pub mod dataset;
pub mod fetcher;
pub mod fields;
pub mod join;
pub mod normalize;
pub mod query;
pub mod select;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use arcgis::{parse_feature_set, ArcGisClient};
pub use dataset::Dataset;
pub use fetcher::Fetcher;
pub use join::{join, join_names, AdminUnitMapping};
pub use normalize::{
    convert_millisecond_date, decode_column, normalize, FieldDecoder, FieldDecoders,
};
pub use query::{build_filtered_query, build_query, QueryParams, ResponseFormat};
pub use select::{filter_by_range, group_sum, scalar_sum, sort_by, top_n, GroupedSums};
pub use value::{JoinKey, RawRecord, Value};
