//! One run of the dashboard: fetch, normalize, join, assemble.

use crate::assembler::ChartAssembler;
use crate::chart::ChartSpec;
use chrono::{Days, NaiveDate, Utc};
use epifig_common::{Endpoint, EpiFigError, Result};
use epifig_config::ChartsConfig;
use epifig_data::query::{history_clause, national_clause};
use epifig_data::{
    build_filtered_query, build_query, normalize, AdminUnitMapping, Dataset, FieldDecoders,
    Fetcher, QueryParams,
};
use tracing::{debug, info, instrument};

/// Produces the five dashboard charts from a [`Fetcher`].
#[derive(Debug)]
pub struct FigurePipeline<F: Fetcher> {
    fetcher: F,
    assembler: ChartAssembler,
    reference_date: Option<NaiveDate>,
}

impl<F: Fetcher> FigurePipeline<F> {
    /// Pipeline over `fetcher`, charting with `config`.
    pub fn new(fetcher: F, config: ChartsConfig) -> Self {
        Self {
            fetcher,
            assembler: ChartAssembler::new(config),
            reference_date: None,
        }
    }

    /// Pin the day the history window ends on. Defaults to today (UTC).
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// The record source.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The chart builder.
    pub fn assembler(&self) -> &ChartAssembler {
        &self.assembler
    }

    /// First day excluded from the history query.
    pub fn history_start(&self) -> Result<NaiveDate> {
        let end = self.reference_date.unwrap_or_else(|| Utc::now().date_naive());
        let days = self.assembler.config().history_days;
        let window = Days::new(u64::from(days));
        end.checked_sub_days(window).ok_or_else(|| {
            EpiFigError::config(format!("history window of {days} days is out of range"))
        })
    }

    /// Fetch everything and build the charts, in dashboard order: time
    /// series, state ranking, county ranking, age distribution, sex
    /// distribution.
    ///
    /// Any failure aborts the run; no partial figure list is returned.
    #[instrument(skip(self))]
    pub async fn return_figures(&self) -> Result<Vec<ChartSpec>> {
        let mapping = AdminUnitMapping::from_dataset(
            &self.load(Endpoint::AdminUnits, build_query()).await?,
        )?;
        debug!(units = mapping.len(), "loaded administrative units");

        let national_id = self.assembler.config().national_id;
        let history_query =
            build_filtered_query(history_clause(self.history_start()?, national_id));
        let age_query = build_filtered_query(national_clause(national_id));

        let (history, key_data, age_sex) = futures::try_join!(
            self.load(Endpoint::History, history_query),
            self.load(Endpoint::KeyData, build_query()),
            self.load(Endpoint::AgeGroups, age_query),
        )?;

        let figures = vec![
            self.assembler.time_series(history)?,
            self.assembler.state_ranking(key_data.clone(), &mapping)?,
            self.assembler.county_ranking(key_data, &mapping)?,
            self.assembler.age_distribution(&age_sex)?,
            self.assembler.sex_distribution(&age_sex)?,
        ];

        info!(figures = figures.len(), "assembled figures");
        Ok(figures)
    }

    /// Every column is kept raw; `time_series` decodes dates itself after
    /// ordering on the timestamps.
    async fn load(&self, endpoint: Endpoint, query: QueryParams) -> Result<Dataset> {
        let records = self.fetcher.fetch(endpoint, &query).await?;
        normalize(records, &FieldDecoders::new())
    }
}
