//! Integration tests for epifig-data.
//!
//! These run the frozen feature-service payloads through parsing,
//! normalization, joins and selection the same way the chart builders do.

use epifig_common::test_utils::{init_test_logging, payloads};
use epifig_common::EpiFigError;
use epifig_data::{
    fields, filter_by_range, group_sum, join_names, normalize, parse_feature_set, scalar_sum,
    sort_by, top_n, AdminUnitMapping, Dataset, FieldDecoder, FieldDecoders, Value,
};
use std::ops::Bound;

fn dataset(body: &str) -> Dataset {
    normalize(parse_feature_set(body).unwrap(), &FieldDecoders::new()).unwrap()
}

fn mapping() -> AdminUnitMapping {
    AdminUnitMapping::from_dataset(&dataset(payloads::ADMIN_UNITS)).unwrap()
}

#[test]
fn test_state_ranking_from_fixtures() {
    init_test_logging();

    let states = filter_by_range(dataset(payloads::KEY_DATA), fields::ADM_UNIT_ID, 1..=16).unwrap();
    let ranked = sort_by(states, fields::INZ_7T, true).unwrap();
    let named = join_names(ranked, &mapping()).unwrap();

    assert_eq!(
        named.text_column(fields::NAME).unwrap(),
        vec!["Hamburg", "Bayern", "Schleswig-Holstein", "Thüringen"]
    );
    assert_eq!(
        named.numeric_column(fields::INZ_7T).unwrap(),
        vec![300.0, 210.25, 120.0, 80.0]
    );
}

#[test]
fn test_county_ranking_truncates_before_join() {
    let counties = filter_by_range(
        dataset(payloads::KEY_DATA),
        fields::ADM_UNIT_ID,
        (Bound::Excluded(16), Bound::Unbounded),
    )
    .unwrap();
    let ranked = top_n(sort_by(counties, fields::INZ_7T, true).unwrap(), 3);
    assert_eq!(ranked.len(), 3);

    // 5315 ranks third but has no name, so the join leaves two rows
    let named = join_names(ranked, &mapping()).unwrap();
    assert_eq!(
        named.text_column(fields::NAME).unwrap(),
        vec!["LK Altenburger Land", "SK München"]
    );
}

#[test]
fn test_history_dates_and_order() {
    let decoders = FieldDecoders::new().with(fields::DATUM, FieldDecoder::epoch_millis_date());
    let history = normalize(parse_feature_set(payloads::HISTORY).unwrap(), &decoders).unwrap();
    let national = filter_by_range(history, fields::BUNDESLAND_ID, 0..=0).unwrap();
    let ordered = sort_by(national, fields::DATUM, false).unwrap();

    assert_eq!(
        ordered.text_column(fields::DATUM).unwrap(),
        vec!["2021-01-01", "2021-01-02", "2021-01-03"]
    );
    assert_eq!(
        ordered.numeric_column(fields::ANZ_FALL_MELDUNG).unwrap(),
        vec![100.0, 200.0, 300.0]
    );
}

#[test]
fn test_age_and_sex_totals() {
    let ages = dataset(payloads::AGE_GROUPS);
    let value_columns = [fields::ANZ_FALL_M, fields::ANZ_FALL_W];
    let sums = group_sum(&ages, fields::ALTERSGRUPPE, &value_columns).unwrap();

    assert_eq!(sums.labels()[0], "A00-A04");
    assert_eq!(sums.labels()[6], "unbekannt");
    assert_eq!(
        sums.combined(),
        vec![18.0, 38.0, 105.0, 125.0, 65.0, 30.0, 1.0]
    );
    assert_eq!(scalar_sum(&ages, fields::ANZ_FALL_W).unwrap(), 201.0);
    assert_eq!(scalar_sum(&ages, fields::ANZ_FALL_M).unwrap(), 181.0);
}

#[test]
fn test_mapping_has_every_fixture_unit() {
    let mapping = mapping();
    assert_eq!(mapping.len(), 8);
    assert_eq!(
        mapping.name_of(epifig_common::AdmUnitId(9162)),
        Some("SK München")
    );
}

#[test]
fn test_empty_feature_set_fails_downstream() {
    let empty = dataset(r#"{"features": []}"#);
    assert!(empty.is_empty());
    let err = filter_by_range(empty, fields::ADM_UNIT_ID, 1..=16).unwrap_err();
    assert!(matches!(err, EpiFigError::Schema { .. }));
}

#[test]
fn test_values_keep_wire_types() {
    let key_data = dataset(payloads::KEY_DATA);
    assert_eq!(
        key_data.value(0, "AnzFall").unwrap(),
        Some(&Value::Int(1000))
    );
    assert_eq!(
        key_data.value(0, fields::INZ_7T).unwrap(),
        Some(&Value::Float(150.5))
    );
}
