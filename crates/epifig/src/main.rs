//! EpiFig - builds the COVID-19 dashboard figures and writes them as JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use epifig_charts::{figures_to_json, FigurePipeline};
use epifig_common::init_logging;
use epifig_config::ConfigLoader;
use epifig_data::ArcGisClient;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to write the figures; stdout when omitted
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    /// Last day of the history window (YYYY-MM-DD); defaults to today
    #[arg(long)]
    reference_date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging)?;
    info!("Starting EpiFig");

    let client = ArcGisClient::new(config.api.clone())?;
    let mut pipeline = FigurePipeline::new(client, config.charts.clone());
    if let Some(date) = args.reference_date {
        pipeline = pipeline.with_reference_date(date);
    }

    let figures = pipeline
        .return_figures()
        .await
        .context("Failed to build figures")?;
    let json = figures_to_json(&figures)?;
    write_output(args.output.as_deref(), &json)?;

    info!(figures = figures.len(), "Done");
    Ok(())
}

fn write_output(path: Option<&Path>, json: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote figures");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "epifig",
            "figures.json",
            "--config",
            "epifig.yaml",
            "--reference-date",
            "2021-03-01",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("figures.json")));
        assert_eq!(args.config, Some(PathBuf::from("epifig.yaml")));
        assert_eq!(args.reference_date, NaiveDate::from_ymd_opt(2021, 3, 1));
        assert_eq!(args.log_level, None);
    }

    #[test]
    fn test_args_default_to_stdout() {
        let args = Args::try_parse_from(["epifig"]).unwrap();
        assert!(args.output.is_none());
    }

    #[test]
    fn test_args_reject_bad_date() {
        assert!(Args::try_parse_from(["epifig", "--reference-date", "yesterday"]).is_err());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures.json");
        write_output(Some(&path), "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_write_output_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("figures.json");
        assert!(write_output(Some(&path), "[]").is_err());
    }
}
