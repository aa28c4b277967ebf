//! Integration tests for epifig-charts.
//!
//! The full pipeline runs against frozen feature-service payloads.

use chrono::NaiveDate;
use epifig_charts::{figures_to_json, ChartSpec, FigurePipeline, SeriesSpec};
use epifig_common::test_utils::{init_test_logging, payloads};
use epifig_common::{Endpoint, EpiFigError};
use epifig_config::{ChartsConfig, BLUES};
use epifig_data::testing::StaticFetcher;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
}

async fn figures(fetcher: StaticFetcher) -> Result<Vec<ChartSpec>, EpiFigError> {
    FigurePipeline::new(fetcher, ChartsConfig::default())
        .with_reference_date(reference_date())
        .return_figures()
        .await
}

#[tokio::test]
async fn test_five_figures_from_fixtures() {
    init_test_logging();

    let figures = figures(StaticFetcher::with_fixtures()).await.unwrap();
    assert_eq!(figures.len(), 5);

    let history = &figures[0].data[0];
    assert!(matches!(history, SeriesSpec::Line(_)));
    assert_eq!(history.labels(), ["2021-01-01", "2021-01-02", "2021-01-03"]);
    assert_eq!(history.values(), [100.0, 200.0, 300.0]);
    assert_eq!(
        figures[0].layout.title.text,
        "Evolution of COVID-19 cases <br> (60 day period)"
    );

    let states = &figures[1].data[0];
    assert_eq!(
        states.labels(),
        ["Hamburg", "Bayern", "Schleswig-Holstein", "Thüringen"]
    );
    assert_eq!(states.values(), [300.0, 210.25, 120.0, 80.0]);

    let counties = &figures[2].data[0];
    assert_eq!(
        counties.labels(),
        ["LK Altenburger Land", "SK München", "SK Flensburg"]
    );
    assert_eq!(counties.values(), [512.75, 410.0, 95.5]);

    let ages = &figures[3].data[0];
    assert_eq!(ages.values(), [18.0, 38.0, 105.0, 125.0, 65.0, 30.0, 1.0]);
    assert_eq!(figures[3].layout.legend.map(|l| (l.x, l.y)), Some((1.0, -0.2)));

    let SeriesSpec::Pie(sexes) = &figures[4].data[0] else {
        panic!("expected pie");
    };
    assert_eq!(sexes.labels(), ["Female", "Male"]);
    assert_eq!(sexes.values(), [201.0, 181.0]);
    assert_eq!(sexes.colors(), [BLUES[4], BLUES[8]]);
    assert_eq!(sexes.color_slots(), [4, 8]);
}

#[tokio::test]
async fn test_pipeline_is_idempotent() {
    let first = figures_to_json(&figures(StaticFetcher::with_fixtures()).await.unwrap()).unwrap();
    let second = figures_to_json(&figures(StaticFetcher::with_fixtures()).await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_plotly_json_shape() {
    let json = figures_to_json(&figures(StaticFetcher::with_fixtures()).await.unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["data"][0]["type"], "scatter");
    assert_eq!(value[0]["data"][0]["mode"], "lines");
    assert_eq!(value[1]["data"][0]["type"], "bar");
    assert_eq!(value[1]["layout"]["xaxis"]["automargin"], true);
    assert_eq!(value[3]["data"][0]["sort"], false);
    assert!(value[4]["layout"]["title"].get("y").is_none());
}

#[tokio::test]
async fn test_service_error_aborts_run() {
    let fetcher = StaticFetcher::with_fixtures()
        .with_body(Endpoint::KeyData, payloads::SERVICE_ERROR);
    match figures(fetcher).await {
        Err(EpiFigError::Retrieval { status_code, .. }) => assert_eq!(status_code, Some(400)),
        other => panic!("expected retrieval error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_aborts_run() {
    let fetcher = StaticFetcher::with_fixtures()
        .failing_on(Endpoint::AgeGroups);
    assert!(matches!(
        figures(fetcher).await,
        Err(EpiFigError::Retrieval { .. })
    ));
}

#[tokio::test]
async fn test_empty_age_groups_is_schema_error() {
    let empty = r#"{"features": []}"#;
    let fetcher = StaticFetcher::with_fixtures()
        .with_body(Endpoint::AgeGroups, empty);
    assert!(matches!(
        figures(fetcher).await,
        Err(EpiFigError::Schema { .. })
    ));
}

#[tokio::test]
async fn test_top_n_from_config() {
    let config = ChartsConfig {
        top_n: 1,
        ..ChartsConfig::default()
    };
    let figures = FigurePipeline::new(StaticFetcher::with_fixtures(), config)
        .with_reference_date(reference_date())
        .return_figures()
        .await
        .unwrap();
    assert_eq!(figures[2].data[0].labels(), ["LK Altenburger Land"]);
}
