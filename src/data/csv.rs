// CSV row source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::ByteRecord;
use log::{debug, warn};

use super::{DataError, DataSet, DataSink, DataSource, Row, Value};

/// CSV row source.
///
/// The first line is the header. Every other line becomes one row whose values
/// all start out as text. Lines with the wrong number of fields (blank lines
/// included) and lines that are not valid UTF-8 are skipped and counted in
/// [`Metadata::skipped_lines`](super::Metadata).
pub struct CsvSource {
    path: String,
    delimiter: char,
}

impl CsvSource {
    /// Create a new CSV row source
    pub fn new<P: AsRef<Path>>(path: P, delimiter: char) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }

    /// Read rows from any reader instead of the configured path
    pub fn read_from<R: Read>(&self, mut reader: R) -> Result<DataSet, DataError> {
        let delimiter = ascii_delimiter(self.delimiter)?;

        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(input.as_slice());

        let mut record = ByteRecord::new();
        if !csv_reader.read_byte_record(&mut record)? {
            return Err(DataError::EmptySource(self.path.clone()));
        }

        let fields: Vec<&[u8]> = record.iter().collect();
        let headers = decode_fields(&fields)
            .map_err(|err| DataError::ParseError(format!("header of '{}': {}", self.path, err)))?
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut dataset = DataSet::new(headers);

        loop {
            // The csv reader drops blank lines, so find them in the raw input.
            let position = csv_reader.position();
            let gap = blank_lines_at(&input, position.byte() as usize);
            let mut line = position.line() + gap.continued;

            for _ in 0..gap.blank {
                self.accept(&mut dataset, line, &[&b""[..]]);
                line += 1;
            }

            if !csv_reader.read_byte_record(&mut record)? {
                break;
            }

            let fields: Vec<&[u8]> = record.iter().collect();
            self.accept(&mut dataset, line, &fields);
        }

        debug!(
            "Read {} rows from '{}' ({} skipped)",
            dataset.len(),
            self.path,
            dataset.metadata.skipped_lines
        );

        dataset.metadata.add("source".to_string(), "csv".to_string());
        dataset.metadata.add("path".to_string(), self.path.clone());

        Ok(dataset)
    }

    fn accept(&self, dataset: &mut DataSet, line: u64, fields: &[&[u8]]) {
        if fields.len() != dataset.columns.len() {
            warn!(
                "Skipping line {}: Incorrect column count ({} instead of {})",
                line,
                fields.len(),
                dataset.columns.len()
            );
            dataset.metadata.skipped_lines += 1;
            return;
        }

        let values = match decode_fields(fields) {
            Ok(values) => values,
            Err(err) => {
                warn!("Skipping line {}: {}", line, err);
                dataset.metadata.skipped_lines += 1;
                return;
            }
        };

        let row = Row::from_pairs(
            dataset
                .columns
                .iter()
                .cloned()
                .zip(values.into_iter().map(Value::text)),
        );
        dataset.add_row(row);
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path)?;
        self.read_from(BufReader::new(file))
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Blank lines sitting in front of the next record
struct LineGap {
    /// 1 when the reader stopped between the `\r` and `\n` of a terminator
    continued: u64,
    blank: usize,
}

fn blank_lines_at(input: &[u8], start: usize) -> LineGap {
    let mut i = start;
    let mut continued = 0;

    if i > 0 && input.get(i - 1) == Some(&b'\r') && input.get(i) == Some(&b'\n') {
        continued = 1;
        i += 1;
    }

    let mut blank = 0;
    loop {
        match input.get(i) {
            Some(b'\n') => i += 1,
            Some(b'\r') if input.get(i + 1) == Some(&b'\n') => i += 2,
            Some(b'\r') => i += 1,
            _ => break,
        }
        blank += 1;
    }

    LineGap { continued, blank }
}

fn decode_fields<'a>(fields: &[&'a [u8]]) -> Result<Vec<&'a str>, std::str::Utf8Error> {
    fields.iter().map(|field| std::str::from_utf8(field)).collect()
}

/// The csv crate splits on a single byte
fn ascii_delimiter(delimiter: char) -> Result<u8, DataError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(DataError::InvalidDelimiter(delimiter))
}

/// CSV row sink
pub struct CsvSink {
    path: String,
    delimiter: char,
}

impl CsvSink {
    /// Create a new CSV row sink
    pub fn new<P: AsRef<Path>>(path: P, delimiter: char) -> Self {
        CsvSink {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }

    /// Write rows to any writer instead of the configured path
    pub fn write_to<W: Write>(
        &self,
        writer: W,
        data: &DataSet,
        columns: &[String],
    ) -> Result<(), DataError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(ascii_delimiter(self.delimiter)?)
            .from_writer(writer);

        csv_writer.write_record(columns)?;

        for row in &data.data {
            let record: Vec<String> = columns
                .iter()
                .map(|column| row.get(column).map(Value::to_string).unwrap_or_default())
                .collect();

            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;

        Ok(())
    }
}

impl DataSink for CsvSink {
    fn write(&self, data: &DataSet, columns: &[String]) -> Result<(), DataError> {
        ascii_delimiter(self.delimiter)?;
        let file = File::create(&self.path)?;
        self.write_to(BufWriter::new(file), data, columns)
    }

    fn name(&self) -> &str {
        &self.path
    }
}
