//! The five dashboard charts, built from normalized datasets.

use crate::chart::{ChartSpec, LayoutMeta, SeriesSpec};
use epifig_common::{EpiFigError, Result};
use epifig_config::ChartsConfig;
use epifig_data::{
    decode_column, fields, filter_by_range, group_sum, join_names, scalar_sum, sort_by, top_n,
    AdminUnitMapping, Dataset, FieldDecoder,
};
use tracing::{info, instrument};

const TITLE_Y: f64 = 0.95;

/// Builds chart specifications. Holds no data between calls.
#[derive(Debug, Clone)]
pub struct ChartAssembler {
    config: ChartsConfig,
}

impl ChartAssembler {
    /// Assembler using `config` for titles, ranges and colors.
    pub fn new(config: ChartsConfig) -> Self {
        Self { config }
    }

    /// Chart settings in use.
    pub fn config(&self) -> &ChartsConfig {
        &self.config
    }

    /// Daily reported cases for the nation over the history window.
    ///
    /// `history` must carry `Datum` as raw epoch milliseconds. Dates are
    /// decoded here rather than during normalization because rows are ordered
    /// on the timestamps, so the order is chronological whatever the display
    /// format. A null date is a `Schema` error.
    #[instrument(skip_all, fields(rows = history.len()))]
    pub fn time_series(&self, history: Dataset) -> Result<ChartSpec> {
        let national_id = self.config.national_id;
        let national = filter_by_range(history, fields::BUNDESLAND_ID, national_id..=national_id)?;
        let ordered = sort_by(national, fields::DATUM, false)?;

        let decoder = FieldDecoder::EpochMillisToDate {
            format: self.config.date_format.clone(),
        };
        let decoded = decode_column(ordered, fields::DATUM, &decoder)?;
        let dates = decoded.text_column(fields::DATUM)?;
        let cases = decoded.numeric_column(fields::ANZ_FALL_MELDUNG)?;

        info!(points = dates.len(), "built time series chart");
        Ok(ChartSpec::new(
            SeriesSpec::line(dates, cases)?,
            LayoutMeta::titled(format!(
                "Evolution of COVID-19 cases <br> ({} day period)",
                self.config.history_days
            ))
            .with_title_y(TITLE_Y)
            .with_x_axis("Date")
            .with_y_axis("COVID-19 cases"),
        ))
    }

    /// Every state, highest 7-day incidence first.
    #[instrument(skip_all, fields(rows = key_data.len()))]
    pub fn state_ranking(
        &self,
        key_data: Dataset,
        mapping: &AdminUnitMapping,
    ) -> Result<ChartSpec> {
        let range = self.config.states.as_range();
        let states = filter_by_range(key_data, fields::ADM_UNIT_ID, range)?;
        let ranked = sort_by(states, fields::INZ_7T, true)?;
        let named = join_names(ranked, mapping)?;

        info!(bars = named.len(), "built state ranking chart");
        Ok(ChartSpec::new(
            SeriesSpec::bar(
                named.text_column(fields::NAME)?,
                named.numeric_column(fields::INZ_7T)?,
            )?,
            LayoutMeta::titled("7-day incidence by state <br> (nationwide)")
                .with_title_y(TITLE_Y)
                .with_x_axis("State")
                .with_y_axis("7-day incidence"),
        ))
    }

    /// The `top_n` counties by 7-day incidence.
    ///
    /// Counties are truncated before names are joined, so a top county
    /// missing from the mapping shortens the chart instead of letting the
    /// next one in. Counties are the ids after the state range; a state
    /// range ending at `i64::MAX` leaves none and is a `Config` error.
    #[instrument(skip_all, fields(rows = key_data.len()))]
    pub fn county_ranking(
        &self,
        key_data: Dataset,
        mapping: &AdminUnitMapping,
    ) -> Result<ChartSpec> {
        let first_county = self.config.states.next_after().ok_or_else(|| {
            EpiFigError::config("state id range leaves no room for county ids")
        })?;
        let counties = filter_by_range(key_data, fields::ADM_UNIT_ID, first_county..)?;
        let ranked = top_n(sort_by(counties, fields::INZ_7T, true)?, self.config.top_n);
        let named = join_names(ranked, mapping)?;

        info!(bars = named.len(), "built county ranking chart");
        Ok(ChartSpec::new(
            SeriesSpec::bar(
                named.text_column(fields::NAME)?,
                named.numeric_column(fields::INZ_7T)?,
            )?,
            LayoutMeta::titled("Counties with highest 7-day incidence <br> (nationwide)")
                .with_title_y(TITLE_Y)
                .with_x_axis("County")
                .with_y_axis("Local 7-day incidence"),
        ))
    }

    /// Cases per age bracket, male and female combined.
    #[instrument(skip_all, fields(rows = age_sex.len()))]
    pub fn age_distribution(&self, age_sex: &Dataset) -> Result<ChartSpec> {
        let sums = group_sum(
            age_sex,
            fields::ALTERSGRUPPE,
            &[fields::ANZ_FALL_M, fields::ANZ_FALL_W],
        )?;

        info!(slices = sums.len(), "built age distribution chart");
        Ok(ChartSpec::new(
            SeriesSpec::pie(
                sums.labels(),
                sums.combined(),
                &self.config.age_color_slots,
                &self.config.palette,
            )?,
            LayoutMeta::titled("COVID-19 cases by age group <br> (all time)")
                .with_title_y(TITLE_Y)
                .with_legend(1.0, -0.2),
        ))
    }

    /// Total female and male cases.
    #[instrument(skip_all, fields(rows = age_sex.len()))]
    pub fn sex_distribution(&self, age_sex: &Dataset) -> Result<ChartSpec> {
        let values = vec![
            scalar_sum(age_sex, fields::ANZ_FALL_W)?,
            scalar_sum(age_sex, fields::ANZ_FALL_M)?,
        ];

        info!("built sex distribution chart");
        Ok(ChartSpec::new(
            SeriesSpec::pie(
                vec!["Female".to_string(), "Male".to_string()],
                values,
                &self.config.sex_color_slots,
                &self.config.palette,
            )?,
            LayoutMeta::titled("COVID-19 cases by sex <br> (all time)"),
        ))
    }
}
