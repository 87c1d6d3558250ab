// Report Engine - Main executable
// Author: Gabriel Demetrios Lafis

use std::process;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::{error, info, LevelFilter};

use report_engine::{
    utils::{init_logging, parse_level, Config},
    Report, ReportGenerator,
};

fn main() {
    if let Err(err) = run() {
        // The logger is only installed once the configuration has loaded
        if log::max_level() >= LevelFilter::Error {
            error!("{:#}", err);
        } else {
            eprintln!("\x1B[31mError: {:#}\x1B[0m", err);
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("Report Engine")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Transforms CSV rows into a report through a configured pipeline")
        .arg(
            Arg::new("csv")
                .value_name("CSV")
                .help("Path of the input CSV file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("report")
                .value_name("REPORT")
                .help("Path of the report definition (JSON or YAML)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT_DIR")
                .help("Directory the report is written to")
                .index(3),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Overrides the configured log level")
                .takes_value(true),
        )
        .arg(
            Arg::new("delimiter")
                .short('d')
                .long("delimiter")
                .value_name("CHAR")
                .help("Field delimiter of the input CSV")
                .takes_value(true),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Error loading config file {}", path))?,
        None => Config::default(),
    };

    if let Some(level) = matches.value_of("log-level") {
        config.logging.level = level.to_string();
    }
    if let Some(delimiter) = matches.value_of("delimiter") {
        let mut chars = delimiter.chars();
        config.input.delimiter = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => anyhow::bail!("Delimiter must be a single character, got '{}'", delimiter),
        };
    }
    if let Some(output) = matches.value_of("output") {
        config.output.directory = output.to_string();
    }

    // Initialize logging
    if let Err(err) = init_logging(parse_level(&config.logging.level)) {
        eprintln!("Error initializing logger: {}", err);
    }

    let csv_path = matches.value_of("csv").context("missing CSV path")?;
    let report_path = matches.value_of("report").context("missing report path")?;

    let report = Report::from_file(report_path)
        .with_context(|| format!("Parsing of the report definition {} failed", report_path))?;

    info!("Generating report '{}'", report.report_name);

    let output_dir = config.output.directory.clone();
    let summary = ReportGenerator::new(report, config)
        .run(csv_path, &output_dir)
        .with_context(|| format!("Report generation from {} failed", csv_path))?;

    info!(
        "Finished transforming data! {} rows written to {}",
        summary.rows_written,
        summary.output_path.display()
    );
    println!("Skipped lines: {}", summary.skipped_lines);

    Ok(())
}
