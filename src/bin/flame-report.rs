//! Headless batch report: well-formedness and auto-integration success rate
//! for a folder of measurement files or a single file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use encoding_rs::Encoding;
use flame_analysis::config::AnalysisConfig;
use flame_analysis::data::analysis::analyze_success;
use flame_analysis::data::export::{write_records_csv, write_success_csv};
use flame_analysis::data::loader::{load_directory, load_paths};
use flame_analysis::data::model::MeasurementSet;
use flame_analysis::data::validate::check_well_formed;

#[derive(Parser)]
#[command(
    name = "flame-report",
    version,
    about = "Check spectrometer measurement files and score auto-integration changes"
)]
struct Cli {
    /// Measurement folder or single measurement file.
    #[arg(value_name = "PATH", default_value = ".")]
    input: PathBuf,

    /// JSON file with the analysis constants.
    #[arg(long, value_name = "PATH", env = "FLAME_CONFIG")]
    config: PathBuf,

    /// Override the expected number of samples per file.
    #[arg(long)]
    nr_pixels: Option<usize>,

    /// Override the integration time cap (µs).
    #[arg(long)]
    integration_time_limit: Option<i64>,

    /// Override the inclusive lower bound of the target range.
    #[arg(long)]
    lower_boundary: Option<i32>,

    /// Override the exclusive upper bound of the target range.
    #[arg(long)]
    upper_boundary: Option<i32>,

    /// Print the per-file success verdicts.
    #[arg(long)]
    details: bool,

    /// Write one CSV row per file.
    #[arg(long, value_name = "PATH")]
    records_csv: Option<PathBuf>,

    /// Write the per-file success verdicts as CSV.
    #[arg(long, value_name = "PATH")]
    success_csv: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::load(&self.config)?;
        if let Some(v) = self.nr_pixels {
            config.nr_pixels = v;
        }
        if let Some(v) = self.integration_time_limit {
            config.integration_time_limit = v;
        }
        if let Some(v) = self.lower_boundary {
            config.lower_boundary = v;
        }
        if let Some(v) = self.upper_boundary {
            config.upper_boundary = v;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = cli.analysis_config()?;
    let encoding = config.text_encoding()?;
    let set = load_input(&cli.input, encoding)?;

    let wf = check_well_formed(&set.records, config.nr_pixels);
    if wf.erroneous_count() > 0 {
        println!("{} erroneous files:", wf.erroneous_count());
    }
    for record in &wf.erroneous {
        println!("{record}");
    }
    println!("\n{}/{} files are well-formed.", wf.well_formed, wf.total);

    let report = analyze_success(&set.records, &config);
    if cli.details {
        println!();
        for row in &report.rows {
            let max = row.max_value.map_or_else(|| "-".to_string(), |v| v.to_string());
            println!("{}\t{max}\t{}", row.filename, row.status);
        }
    }
    if report.evaluated > 0 {
        println!(
            "Success rate: {} ({}/{})",
            report.rate(),
            report.successes,
            report.evaluated
        );
    } else {
        println!("Success rate: {}", report.rate());
    }

    if let Some(path) = &cli.records_csv {
        write_records_csv(&set.records, create(path)?)?;
        println!("Saved {}", path.display());
    }
    if let Some(path) = &cli.success_csv {
        write_success_csv(&report, create(path)?)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

/// A folder is scanned; anything else is parsed as one measurement file.
fn load_input(input: &Path, encoding: &'static Encoding) -> Result<MeasurementSet> {
    if input.is_dir() {
        load_directory(input, encoding)
    } else {
        Ok(load_paths(&[input.to_path_buf()], encoding))
    }
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("creating {}", path.display()))
}
