//! Per-file ingestion: rows → nested records → mapped users → sink + report.
//!
//! A run reads its file once from start to finish. Rows that fail to decode or
//! map are dropped and recorded in [`IngestOutcome::failures`]; they never
//! abort the run. The sink is called once with the full batch, or not at all
//! when nothing mapped. The age report is computed after the sink step.

use std::{io::Read, path::Path};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::{ConvertArgs, OutputFormat},
    distribution::{AgeDistribution, distribution},
    error::{IngestError, RowError, RowFailure},
    io_utils,
    mapping::map_record,
    nested::RecordBuilder,
    response::ConversionResponse,
    rows::{ReadOptions, RowReader, SkipCounts},
    sink::{TableFileSink, UserSink},
    table,
};

#[derive(Debug)]
pub struct IngestOutcome {
    pub distribution: AgeDistribution,
    /// Records mapped successfully and handed to the sink.
    pub mapped: usize,
    /// Records the sink reported as stored.
    pub inserted: usize,
    pub skipped: SkipCounts,
    pub failures: Vec<RowFailure>,
}

/// Ingests the CSV file at `path` into `sink`.
pub fn run(
    path: &Path,
    options: &ReadOptions,
    sink: &mut dyn UserSink,
) -> Result<IngestOutcome, IngestError> {
    let rows = RowReader::open(path, options)?;
    ingest(rows, sink)
}

/// Ingests every row of an already opened reader into `sink`.
pub fn ingest<R: Read>(
    mut rows: RowReader<R>,
    sink: &mut dyn UserSink,
) -> Result<IngestOutcome, IngestError> {
    let origin = rows.origin().to_path_buf();
    let builder = RecordBuilder::new(rows.headers());
    let mut users = Vec::new();
    let mut failures = Vec::new();

    for item in rows.by_ref() {
        let row = match item {
            Ok(row) => row,
            Err(RowFailure {
                error: RowError::Read(source),
                ..
            }) if source.is_io_error() => {
                return Err(IngestError::Read {
                    path: origin,
                    source,
                });
            }
            Err(failure) => {
                warn!("Error processing row {}: {}", failure.row_number, failure.error);
                failures.push(failure);
                continue;
            }
        };
        let record = builder.build(&row.fields[..]);
        match map_record(&record) {
            Ok(user) => users.push(user),
            Err(err) => {
                let failure = RowFailure {
                    row_number: row.row_number,
                    error: err.into(),
                };
                warn!("Error processing row {}: {}", failure.row_number, failure.error);
                failures.push(failure);
            }
        }
    }

    let skipped = rows.skipped();
    let inserted = if users.is_empty() {
        info!("No valid records found to upload.");
        0
    } else {
        let stored = sink
            .insert_batch(&users)
            .map_err(|source| IngestError::Persistence {
                records: users.len(),
                source,
            })?;
        info!("Successfully inserted {stored} records.");
        stored
    };

    let ages = users.iter().map(|user| user.age).collect::<Vec<_>>();
    Ok(IngestOutcome {
        distribution: distribution(&ages),
        mapped: users.len(),
        inserted,
        skipped,
        failures,
    })
}

pub fn execute(args: &ConvertArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Converting '{}' into table {:?} (delimiter '{}')",
        args.input.display(),
        args.table,
        crate::printable_delimiter(delimiter)
    );
    let mut sink = TableFileSink::new(&args.table);
    let result = run(
        &args.input,
        &ReadOptions {
            delimiter,
            encoding,
        },
        &mut sink,
    );

    let response = ConversionResponse::from_result(&result);
    if args.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Serializing response")?
        );
    }

    let outcome = result.with_context(|| format!("Converting {:?}", args.input))?;
    for (group, percent) in outcome.distribution.iter() {
        info!("{group:<10}\t{percent}");
    }
    if !outcome.failures.is_empty() || outcome.skipped.total() > 0 {
        info!(
            "Dropped {} failing row(s); skipped {} blank and {} misaligned row(s)",
            outcome.failures.len(),
            outcome.skipped.blank,
            outcome.skipped.misaligned
        );
    }
    if args.format == OutputFormat::Table {
        table::print_distribution(&outcome.distribution);
    }
    Ok(())
}
