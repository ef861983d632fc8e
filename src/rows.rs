//! Row parsing for dotted-header CSV input.
//!
//! [`RowReader`] reads the header row eagerly and then yields data rows lazily.
//! Rows that cannot line up with the headers are dropped here:
//!
//! - rows whose field count differs from the header count (`misaligned`),
//! - rows whose fields are all empty or whitespace (`blank`).
//!
//! Both are counted in [`SkipCounts`] but are not failures. A row that cannot
//! be read or decoded is yielded as a [`RowFailure`].

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use log::debug;
use serde::Serialize;

use crate::{
    error::{IngestError, RowError, RowFailure},
    io_utils,
};

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

/// A data row whose width matches the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line position, counting the header row.
    pub row_number: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub blank: usize,
    pub misaligned: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.blank + self.misaligned
    }
}

pub struct RowReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    encoding: &'static Encoding,
    origin: PathBuf,
    record: csv::ByteRecord,
    rows_seen: usize,
    skipped: SkipCounts,
}

impl RowReader<BufReader<File>> {
    pub fn open(path: &Path, options: &ReadOptions) -> Result<Self, IngestError> {
        if !path.exists() {
            return Err(IngestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), options, path)
    }
}

impl<R: Read> RowReader<R> {
    /// Wraps `reader`; `origin` only labels errors.
    pub fn from_reader(
        reader: R,
        options: &ReadOptions,
        origin: &Path,
    ) -> Result<Self, IngestError> {
        let mut reader = io_utils::open_csv_reader(reader, options.delimiter);
        let raw_headers = reader
            .byte_headers()
            .map_err(|source| IngestError::Read {
                path: origin.to_path_buf(),
                source,
            })?
            .clone();
        if raw_headers.is_empty() {
            return Err(IngestError::EmptyInput {
                path: origin.to_path_buf(),
            });
        }
        let headers = io_utils::decode_record(&raw_headers, options.encoding).map_err(|_| {
            IngestError::HeaderDecode {
                path: origin.to_path_buf(),
                encoding: options.encoding.name(),
            }
        })?;
        Ok(Self {
            reader,
            headers,
            encoding: options.encoding,
            origin: origin.to_path_buf(),
            record: csv::ByteRecord::new(),
            rows_seen: 0,
            skipped: SkipCounts::default(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Rows dropped so far by the alignment and blank filters.
    pub fn skipped(&self) -> SkipCounts {
        self.skipped
    }

    fn next_row(&mut self) -> Option<Result<RawRow, RowFailure>> {
        loop {
            self.rows_seen += 1;
            let fallback = self.rows_seen + 1;
            match self.reader.read_byte_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(err) => {
                    let row_number = err
                        .position()
                        .map_or(fallback, |pos| pos.line() as usize);
                    return Some(Err(RowFailure {
                        row_number,
                        error: RowError::Read(err),
                    }));
                }
            }
            let row_number = self
                .record
                .position()
                .map_or(fallback, |pos| pos.line() as usize);
            let fields = match io_utils::decode_record(&self.record, self.encoding) {
                Ok(fields) => fields,
                Err(error) => return Some(Err(RowFailure { row_number, error })),
            };
            if fields.iter().all(|field| field.trim().is_empty()) {
                debug!("Skipping blank row {row_number}");
                self.skipped.blank += 1;
                continue;
            }
            if fields.len() != self.headers.len() {
                debug!(
                    "Skipping row {row_number}: {} field(s) for {} header(s)",
                    fields.len(),
                    self.headers.len()
                );
                self.skipped.misaligned += 1;
                continue;
            }
            return Some(Ok(RawRow { row_number, fields }));
        }
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<RawRow, RowFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> RowReader<&[u8]> {
        RowReader::from_reader(
            text.as_bytes(),
            &ReadOptions::default(),
            Path::new("mem.csv"),
        )
        .expect("headers")
    }

    #[test]
    fn yields_aligned_rows_and_counts_skips() {
        let mut rows = reader("a,b\n1,2\n3\n , \n4,5,6\n7,8\n");
        assert_eq!(rows.headers(), &["a".to_string(), "b".to_string()]);
        let collected = rows
            .by_ref()
            .map(|row| row.expect("row").fields)
            .collect::<Vec<_>>();
        assert_eq!(
            collected,
            vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["7".to_string(), "8".to_string()],
            ]
        );
        assert_eq!(
            rows.skipped(),
            SkipCounts {
                blank: 1,
                misaligned: 2
            }
        );
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let mut rows =
            reader("name.firstName,address.street\n\"Lee, Ann\",\"1 \"\"Main\"\" St\"\n");
        let row = rows.next().expect("one row").expect("ok");
        assert_eq!(row.row_number, 2);
        assert_eq!(row.fields, vec!["Lee, Ann", "1 \"Main\" St"]);
        assert!(rows.next().is_none());
    }

    #[test]
    fn empty_input_has_no_header() {
        let result =
            RowReader::from_reader(&b""[..], &ReadOptions::default(), Path::new("empty.csv"));
        assert!(matches!(result, Err(IngestError::EmptyInput { .. })));
    }

    #[test]
    fn undecodable_row_is_a_row_failure() {
        let mut rows = RowReader::from_reader(
            &b"a,b\n\xff,1\n2,3\n"[..],
            &ReadOptions::default(),
            Path::new("bad.csv"),
        )
        .expect("headers");
        let failure = rows.next().expect("item").expect_err("decode failure");
        assert_eq!(failure.row_number, 2);
        assert!(matches!(failure.error, RowError::Decode { field: 1, .. }));
        let next = rows.next().expect("item").expect("row");
        assert_eq!(next.row_number, 3);
    }
}
