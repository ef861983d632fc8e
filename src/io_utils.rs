//! CSV reader construction, encoding and delimiter resolution.
//!
//! Input is read through `csv::ReaderBuilder` with double-quote escaping and
//! flexible record lengths, so rows that disagree with the header width reach
//! the row parser instead of surfacing as reader errors. Fields are kept as raw
//! bytes until [`decode_record`] converts them with the configured
//! `encoding_rs` encoding (UTF-8 by default).

use std::{io::Read, path::Path};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{IngestError, RowError};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, IngestError> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| IngestError::UnknownEncoding(value.to_string()))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Decodes every field of `record`, reporting the first field that fails.
pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, RowError> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            decode_bytes(field, encoding).ok_or(RowError::Decode {
                field: idx + 1,
                encoding: encoding.name(),
            })
        })
        .collect()
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(&PathBuf::from("users.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("users.csv"), None), b',');
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("users.tsv"), Some(b';')),
            b';'
        );
    }

    #[test]
    fn resolves_known_and_rejects_unknown_encodings() {
        assert_eq!(resolve_encoding(None).expect("default"), UTF_8);
        assert_eq!(
            resolve_encoding(Some(" latin1 ")).expect("latin1").name(),
            "windows-1252"
        );
        assert!(matches!(
            resolve_encoding(Some("klingon")),
            Err(IngestError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn decode_record_reports_offending_field() {
        let record = csv::ByteRecord::from(vec![&b"ok"[..], &b"\xff"[..]]);
        match decode_record(&record, UTF_8) {
            Err(RowError::Decode { field, encoding }) => {
                assert_eq!(field, 2);
                assert_eq!(encoding, "UTF-8");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
