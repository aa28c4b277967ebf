//! Chart specification types, serialized as plotly figure JSON.

use epifig_common::{EpiFigError, Result};
use serde::{Deserialize, Serialize};

/// One figure: its traces and its layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Traces drawn in the figure.
    pub data: Vec<SeriesSpec>,
    /// Title, axes and legend.
    pub layout: LayoutMeta,
}

impl ChartSpec {
    /// A figure with a single trace.
    pub fn new(series: SeriesSpec, layout: LayoutMeta) -> Self {
        Self {
            data: vec![series],
            layout,
        }
    }
}

/// A single trace.
///
/// Series payloads can only be built through the checked constructors or
/// through deserialization, which runs the same checks, so a value of this
/// type always renders one point or slice per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeriesSpec {
    /// Line chart, plotly's `scatter` trace in `lines` mode.
    #[serde(rename = "scatter")]
    Line(LineSeries),
    /// Vertical bars.
    Bar(BarSeries),
    /// Pie with one slice per label.
    Pie(PieSeries),
}

/// Points joined by a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineSeriesData")]
pub struct LineSeries {
    x: Vec<String>,
    y: Vec<f64>,
    mode: String,
}

/// One bar per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BarSeriesData")]
pub struct BarSeries {
    x: Vec<String>,
    y: Vec<f64>,
}

/// Slices with colors resolved from palette slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PieSeriesData")]
pub struct PieSeries {
    labels: Vec<String>,
    values: Vec<f64>,
    marker: PieMarker,
    color_slots: Vec<usize>,
    showlegend: bool,
    sort: bool,
    textinfo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PieMarker {
    colors: Vec<String>,
}

#[derive(Deserialize)]
struct LineSeriesData {
    x: Vec<String>,
    y: Vec<f64>,
    mode: String,
}

#[derive(Deserialize)]
struct BarSeriesData {
    x: Vec<String>,
    y: Vec<f64>,
}

#[derive(Deserialize)]
struct PieSeriesData {
    labels: Vec<String>,
    values: Vec<f64>,
    marker: PieMarker,
    color_slots: Vec<usize>,
    showlegend: bool,
    sort: bool,
    textinfo: String,
}

fn check_lengths(what: &str, labels: usize, values: usize) -> Result<()> {
    if labels == values {
        Ok(())
    } else {
        Err(EpiFigError::schema(format!(
            "{what} has {labels} labels but {values} values"
        )))
    }
}

impl TryFrom<LineSeriesData> for LineSeries {
    type Error = EpiFigError;

    fn try_from(data: LineSeriesData) -> Result<Self> {
        check_lengths("line series", data.x.len(), data.y.len())?;
        Ok(Self {
            x: data.x,
            y: data.y,
            mode: data.mode,
        })
    }
}

impl TryFrom<BarSeriesData> for BarSeries {
    type Error = EpiFigError;

    fn try_from(data: BarSeriesData) -> Result<Self> {
        check_lengths("bar series", data.x.len(), data.y.len())?;
        Ok(Self {
            x: data.x,
            y: data.y,
        })
    }
}

impl TryFrom<PieSeriesData> for PieSeries {
    type Error = EpiFigError;

    fn try_from(data: PieSeriesData) -> Result<Self> {
        let slices = data.labels.len();
        check_lengths("pie series", slices, data.values.len())?;
        check_lengths("pie colors", slices, data.marker.colors.len())?;
        check_lengths("pie color slots", slices, data.color_slots.len())?;
        Ok(Self {
            labels: data.labels,
            values: data.values,
            marker: data.marker,
            color_slots: data.color_slots,
            showlegend: data.showlegend,
            sort: data.sort,
            textinfo: data.textinfo,
        })
    }
}

impl LineSeries {
    /// Category labels along the x axis.
    pub fn x(&self) -> &[String] {
        &self.x
    }

    /// Values, one per label.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Plotly drawing mode, always `lines` for built series.
    pub fn mode(&self) -> &str {
        &self.mode
    }
}

impl BarSeries {
    /// Category labels along the x axis.
    pub fn x(&self) -> &[String] {
        &self.x
    }

    /// Bar heights, one per label.
    pub fn y(&self) -> &[f64] {
        &self.y
    }
}

impl PieSeries {
    /// Slice labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Slice values, one per label.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Resolved slice colors, one per label.
    pub fn colors(&self) -> &[String] {
        &self.marker.colors
    }

    /// Palette index behind each entry of [`colors`](Self::colors).
    pub fn color_slots(&self) -> &[usize] {
        &self.color_slots
    }

    /// Whether the legend is shown.
    pub fn showlegend(&self) -> bool {
        self.showlegend
    }

    /// Whether the renderer may reorder slices by value.
    pub fn sort(&self) -> bool {
        self.sort
    }

    /// Plotly slice text template.
    pub fn textinfo(&self) -> &str {
        &self.textinfo
    }
}

impl SeriesSpec {
    /// Line series; `x` and `y` must have the same length.
    pub fn line(x: Vec<String>, y: Vec<f64>) -> Result<Self> {
        LineSeriesData {
            x,
            y,
            mode: "lines".to_string(),
        }
        .try_into()
        .map(SeriesSpec::Line)
    }

    /// Bar series; `x` and `y` must have the same length.
    pub fn bar(x: Vec<String>, y: Vec<f64>) -> Result<Self> {
        BarSeriesData { x, y }.try_into().map(SeriesSpec::Bar)
    }

    /// Pie with colors picked from `palette` by ordinal slot.
    ///
    /// Slots repeat from the start when there are more slices than slots.
    /// An empty slot list or a slot past the end of the palette is a
    /// `Schema` error.
    pub fn pie(
        labels: Vec<String>,
        values: Vec<f64>,
        slots: &[usize],
        palette: &[String],
    ) -> Result<Self> {
        if slots.is_empty() && !labels.is_empty() {
            return Err(EpiFigError::schema(
                "pie series needs at least one color slot",
            ));
        }

        let color_slots: Vec<usize> = slots.iter().copied().cycle().take(labels.len()).collect();
        let colors = color_slots
            .iter()
            .map(|&slot| {
                palette.get(slot).cloned().ok_or_else(|| {
                    EpiFigError::schema(format!(
                        "color slot {slot} is outside the {}-color palette",
                        palette.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        PieSeriesData {
            labels,
            values,
            marker: PieMarker { colors },
            color_slots,
            showlegend: true,
            sort: false,
            textinfo: "label+percent".to_string(),
        }
        .try_into()
        .map(SeriesSpec::Pie)
    }

    /// Number of points or slices.
    pub fn len(&self) -> usize {
        self.labels().len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// X values or slice labels.
    pub fn labels(&self) -> &[String] {
        match self {
            SeriesSpec::Line(s) => s.x(),
            SeriesSpec::Bar(s) => s.x(),
            SeriesSpec::Pie(s) => s.labels(),
        }
    }

    /// Y values or slice values.
    pub fn values(&self) -> &[f64] {
        match self {
            SeriesSpec::Line(s) => s.y(),
            SeriesSpec::Bar(s) => s.y(),
            SeriesSpec::Pie(s) => s.values(),
        }
    }
}

/// Figure layout: title, axis titles and legend placement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutMeta {
    /// Figure title.
    pub title: Title,
    /// X axis, omitted for pies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    /// Y axis, omitted for pies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    /// Legend position in paper coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

/// Figure title.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Title {
    /// Title text; `<br>` breaks lines.
    pub text: String,
    /// Vertical position in paper coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Axis title settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis title.
    pub title: String,
    /// Grow the margin to fit tick labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automargin: Option<bool>,
}

/// Legend anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl LayoutMeta {
    /// Layout with only a title.
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title {
                text: text.into(),
                y: None,
            },
            ..Self::default()
        }
    }

    /// Set the title's vertical position.
    pub fn with_title_y(mut self, y: f64) -> Self {
        self.title.y = Some(y);
        self
    }

    /// X axis title; the axis grows its margin to fit long category labels.
    pub fn with_x_axis(mut self, title: impl Into<String>) -> Self {
        self.xaxis = Some(Axis {
            title: title.into(),
            automargin: Some(true),
        });
        self
    }

    /// Y axis title.
    pub fn with_y_axis(mut self, title: impl Into<String>) -> Self {
        self.yaxis = Some(Axis {
            title: title.into(),
            automargin: None,
        });
        self
    }

    /// Anchor the legend at `(x, y)`.
    pub fn with_legend(mut self, x: f64, y: f64) -> Self {
        self.legend = Some(Legend { x, y });
        self
    }
}

/// Serialize figures as a JSON array.
pub fn figures_to_json(figures: &[ChartSpec]) -> Result<String> {
    Ok(serde_json::to_string_pretty(figures)?)
}
