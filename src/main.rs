use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use mobility_panel::config::PipelineConfig;
use mobility_panel::data::filter::FilterCriteria;
use mobility_panel::data::loader::load_file;
use mobility_panel::data::normalize::parse_date;
use mobility_panel::error::PipelineError;
use mobility_panel::pipeline::Pipeline;
use mobility_panel::render;
use mobility_panel::state::ViewState;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

/// Mobility-test results with pass/fail per threshold.
#[derive(Debug, Parser)]
#[command(name = "mobility-panel", version, about)]
struct Cli {
    /// Export to read (.csv, .json or .parquet)
    file: PathBuf,

    /// TOML file with aliases and metric thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV delimiter (sniffed from the header when omitted)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Show only these subjects (repeatable)
    #[arg(long = "subject")]
    subjects: Vec<String>,

    /// Show only these categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Show only these dates, dd/mm/yyyy (repeatable)
    #[arg(long = "date")]
    dates: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Print detected headers and how they were resolved, then exit
    #[arg(long)]
    list_columns: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if cli.delimiter.is_some() {
        config.delimiter = cli.delimiter;
    }

    let table = load_file(&cli.file, config.delimiter)?;
    let pipeline = Pipeline::new(config);

    if cli.list_columns {
        println!("Detected columns: {}", table.headers.join(", "));
        match pipeline.resolve(&table.headers) {
            Ok(res) => {
                for (field, header) in &res.fields {
                    println!("  {field:<12} <- {header}");
                }
                for metric in &pipeline.config().metrics {
                    let header = res.metrics.get(&metric.name).map_or("(absent)", String::as_str);
                    println!("  {:<12} <- {header}", metric.name);
                }
            }
            Err(e) => return Ok(report_missing(&e)),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let dataset = match pipeline.run(&table) {
        Ok(ds) => ds,
        Err(e) => return Ok(report_missing(&e)),
    };

    let mut criteria = FilterCriteria {
        subjects: cli.subjects.into_iter().collect(),
        categories: cli.categories.into_iter().collect(),
        ..Default::default()
    };
    for raw in &cli.dates {
        let date = parse_date(raw).with_context(|| format!("--date {raw}"))?;
        criteria.dates.insert(date);
    }

    let mut state = ViewState::default();
    state.set_dataset(Arc::new(dataset));
    state.set_criteria(criteria);

    let visible = state.visible_records();
    let metric_names = state
        .dataset
        .as_ref()
        .map(|ds| ds.metric_names.clone())
        .unwrap_or_default();

    match cli.format {
        Format::Table => {
            print!("{}", render::table(&visible, &metric_names));
            let (shown, total) = state.summary();
            println!();
            println!("{}", render::footer(shown, total));
            println!(
                "Generated: {}",
                chrono::Local::now().format("%d/%m/%Y %H:%M")
            );
        }
        Format::Json => println!("{}", render::json(&visible)?),
    }

    Ok(ExitCode::SUCCESS)
}

/// Surface a batch failure to the operator.
fn report_missing(err: &PipelineError) -> ExitCode {
    log::error!("{err}");
    let PipelineError::MissingColumns { missing, present } = err;
    eprintln!("Cannot build the view: required columns not found.");
    for field in missing {
        eprintln!("  missing: {field}");
    }
    eprintln!("Columns present: {}", present.join(", "));
    ExitCode::from(2)
}
