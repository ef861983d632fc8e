//! Storage sinks for mapped users.
//!
//! A sink receives the whole batch of a run in one call and either stores all
//! of it or none of it. Each [`MappedUser`] becomes a [`UserRow`] shaped like
//! the `users` table: `name` and `age` as scalars, `address` and
//! `additional_info` as JSON documents.

use std::{
    error::Error,
    fs,
    io,
    path::{Path, PathBuf},
};

use csv::QuoteStyle;
use log::debug;
use tempfile::NamedTempFile;

use crate::mapping::MappedUser;

pub type SinkError = Box<dyn Error + Send + Sync + 'static>;

/// Column order of the `users` table.
pub const USERS_COLUMNS: [&str; 4] = ["name", "age", "address", "additional_info"];

pub trait UserSink {
    /// Stores every record or none, returning the number stored.
    fn insert_batch(&mut self, records: &[MappedUser]) -> Result<usize, SinkError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub name: String,
    pub age: i64,
    pub address: String,
    pub additional_info: String,
}

impl UserRow {
    pub fn from_user(user: &MappedUser) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: user.name.clone(),
            age: user.age,
            address: serde_json::to_string(&user.address)?,
            additional_info: serde_json::to_string(&user.additional_info)?,
        })
    }

    fn to_fields(&self) -> [String; 4] {
        [
            self.name.clone(),
            self.age.to_string(),
            self.address.clone(),
            self.additional_info.clone(),
        ]
    }
}

fn to_rows(records: &[MappedUser]) -> Result<Vec<UserRow>, SinkError> {
    records
        .iter()
        .map(|user| UserRow::from_user(user).map_err(SinkError::from))
        .collect()
}

/// Keeps inserted rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<UserRow>,
    calls: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[UserRow] {
        &self.rows
    }

    /// Number of `insert_batch` calls received.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl UserSink for MemorySink {
    fn insert_batch(&mut self, records: &[MappedUser]) -> Result<usize, SinkError> {
        self.calls += 1;
        let rows = to_rows(records)?;
        self.rows.extend(rows);
        Ok(records.len())
    }
}

/// A `users` table kept as a CSV file.
///
/// Every batch is staged in a temporary file next to the table, with the
/// existing rows rewritten first, and then renamed over the table. The table is
/// untouched unless the whole batch was written.
#[derive(Debug, Clone)]
pub struct TableFileSink {
    path: PathBuf,
}

impl TableFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored row back.
    pub fn read_rows(&self) -> Result<Vec<UserRow>, SinkError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        check_header(reader.headers()?.iter(), &self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
            rows.push(UserRow {
                name: field(0),
                age: field(1).parse()?,
                address: field(2),
                additional_info: field(3),
            });
        }
        Ok(rows)
    }

    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Reads the rows already stored in the table, if any.
    fn existing_records(&self) -> Result<Vec<csv::ByteRecord>, SinkError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if metadata.len() == 0 {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        check_header(reader.headers()?.iter(), &self.path)?;
        let mut records = Vec::new();
        for record in reader.byte_records() {
            records.push(record?);
        }
        Ok(records)
    }
}

fn check_header<'a>(
    headers: impl Iterator<Item = &'a str>,
    path: &Path,
) -> Result<(), SinkError> {
    let found = headers.collect::<Vec<_>>();
    if found != USERS_COLUMNS {
        return Err(format!(
            "Header mismatch in {path:?}: expected {USERS_COLUMNS:?}, found {found:?}"
        )
        .into());
    }
    Ok(())
}

impl UserSink for TableFileSink {
    fn insert_batch(&mut self, records: &[MappedUser]) -> Result<usize, SinkError> {
        let rows = to_rows(records)?;
        let existing = self.existing_records()?;
        let mut staged = NamedTempFile::new_in(self.staging_dir())?;
        {
            let mut writer = csv::WriterBuilder::new()
                .quote_style(QuoteStyle::Always)
                .double_quote(true)
                .from_writer(&mut staged);
            writer.write_record(USERS_COLUMNS)?;
            for record in &existing {
                writer.write_byte_record(record)?;
            }
            for row in &rows {
                writer.write_record(row.to_fields())?;
            }
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path)?;
        debug!(
            "Wrote {} row(s) to {:?} after {} existing row(s)",
            rows.len(),
            self.path,
            existing.len()
        );
        Ok(rows.len())
    }
}
