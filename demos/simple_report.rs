// Simple report example
// Author: Gabriel Demetrios Lafis

use std::fs;

use log::LevelFilter;
use report_engine::{
    processing::{Aggregator, DateTimeFormatter, MathOperation, OrderBy, StringFormatter},
    report::{Column, ColumnType, Report},
    storage::FileFormat,
    utils::{init_logging, Config},
    ReportGenerator,
};

const ORDERS: &str = "\
date,region,revenue,cost
2024-03-01T09:15:00Z,north,120.50,80
2024-03-01,south,99.90,40.25
2024-03-02T17:40:12Z,north,75,30
2024-03-02,south,12
2024-03-02,south,55.10,20
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LevelFilter::Info)?;

    let work_dir = std::env::temp_dir().join("report-engine-demo");
    fs::create_dir_all(&work_dir)?;
    let csv_path = work_dir.join("orders.csv");
    fs::write(&csv_path, ORDERS)?;

    // Daily margin per day, newest first
    let report = Report::new("daily_margin", FileFormat::Jsonl)
        .column(Column::typed("date", ColumnType::Date))
        .column(Column::new("region"))
        .column(Column::typed("revenue", ColumnType::Double))
        .column(Column::typed("cost", ColumnType::Double))
        .column(Column::new("day"))
        .column(Column::new("revenue_total"))
        .column(Column::new("cost_total"))
        .column(Column::new("margin"))
        .column(Column::new("summary"))
        .transformer(DateTimeFormatter::new("date", "yyyy-MM-dd", "day"))
        .transformer(
            Aggregator::new("day")
                .sum("revenue", "revenue_total")
                .sum("cost", "cost_total"),
        )
        .transformer(MathOperation::subtract(&["revenue_total", "cost_total"], "margin"))
        .transformer(OrderBy::desc("day"))
        .transformer(StringFormatter::new(
            &["day", "margin"],
            "%s margin %,.2f",
            "summary",
        ))
        .output("day")
        .output("margin")
        .output("summary");

    println!("Report definition:\n{}", serde_json::to_string_pretty(&report)?);

    let summary = ReportGenerator::new(report, Config::default()).run(&csv_path, &work_dir)?;

    println!(
        "\n{} rows written to {} ({} lines skipped):",
        summary.rows_written,
        summary.output_path.display(),
        summary.skipped_lines
    );
    print!("{}", fs::read_to_string(&summary.output_path)?);

    Ok(())
}
