// End-to-end report generation
// Author: Gabriel Demetrios Lafis

use std::path::{Path, PathBuf};

use log::info;

use crate::data::{CsvSource, DataSet, DataSource};
use crate::processing::Pipeline;
use crate::report::Report;
use crate::storage::{DataStorage, FileStorage};
use crate::utils::{AppResult, Config};

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub rows_written: usize,
    pub skipped_lines: usize,
}

/// Reads a CSV file, runs a report's pipeline over it and writes the result
pub struct ReportGenerator {
    report: Report,
    config: Config,
}

impl ReportGenerator {
    pub fn new(report: Report, config: Config) -> Self {
        ReportGenerator { report, config }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Validate the report and run its pipeline over an already loaded row set
    pub fn transform(&self, rows: &mut DataSet) -> AppResult<()> {
        self.report.validate()?;
        Pipeline::from_report(&self.report).execute(rows)?;
        Ok(())
    }

    /// Run the whole report. Nothing is written unless every stage succeeds.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        csv_path: P,
        output_dir: Q,
    ) -> AppResult<RunSummary> {
        self.report.validate()?;

        let source = CsvSource::new(csv_path, self.config.input.delimiter);
        let mut rows = source.read()?;
        let skipped_lines = rows.metadata.skipped_lines;

        info!(
            "Loaded {} rows from {} ({} lines skipped)",
            rows.len(),
            source.name(),
            skipped_lines
        );

        Pipeline::from_report(&self.report).execute(&mut rows)?;

        let storage = FileStorage::new(output_dir, self.report.output_format)?
            .with_delimiter(self.config.output.delimiter);
        let output_path =
            storage.store(&self.report.report_name, &rows, &self.report.output_columns())?;

        Ok(RunSummary {
            output_path,
            rows_written: rows.len(),
            skipped_lines,
        })
    }
}
