use std::io::{self, Write};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::NestArgs,
    io_utils,
    mapping::map_record,
    nested::RecordBuilder,
    rows::{ReadOptions, RowReader},
};

pub fn execute(args: &NestArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let rows = RowReader::open(
        &args.input,
        &ReadOptions {
            delimiter,
            encoding,
        },
    )
    .with_context(|| format!("Opening {:?}", args.input))?;
    let builder = RecordBuilder::new(rows.headers());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted = 0usize;
    for item in rows {
        if args.limit.is_some_and(|limit| emitted >= limit) {
            break;
        }
        let row = match item {
            Ok(row) => row,
            Err(failure) => {
                warn!("Skipping {failure}");
                continue;
            }
        };
        let record = builder.build(&row.fields[..]);
        let serialized = if args.mapped {
            match map_record(&record) {
                Ok(user) => serde_json::to_string(&user),
                Err(err) => {
                    warn!("Skipping row {}: {err}", row.row_number);
                    continue;
                }
            }
        } else {
            serde_json::to_string(&record)
        };
        let line = serialized.with_context(|| format!("Serializing row {}", row.row_number))?;
        writeln!(out, "{line}").context("Writing to stdout")?;
        emitted += 1;
    }
    out.flush().context("Flushing stdout")?;
    info!("Emitted {emitted} record(s) from {:?}", args.input);
    Ok(())
}
