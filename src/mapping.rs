//! Mapping of nested records onto the `users` table shape.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::nested::{Record, Value};

/// A row ready for the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedUser {
    pub name: String,
    pub age: i64,
    pub address: Value,
    pub additional_info: Record,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("expected '{field}' to be {expected}, found {found}")]
    UnexpectedShape {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl MappingError {
    fn shape(field: &'static str, expected: &'static str, found: &Value) -> Self {
        Self::UnexpectedShape {
            field,
            expected,
            found: found.kind(),
        }
    }
}

/// Maps a nested record onto a [`MappedUser`] without touching the input.
///
/// `name.firstName` and `name.lastName` are joined into `name`, `age` is
/// coerced to a non-negative integer (falling back to 0), `address` is carried
/// as-is and every other top-level key lands in `additional_info`.
pub fn map_record(record: &Record) -> Result<MappedUser, MappingError> {
    let mut working = record.clone();

    let (first_name, last_name) = match working.remove("name") {
        None => (String::new(), String::new()),
        Some(Value::Map(mut parts)) => (
            take_text(&mut parts, "firstName", "name.firstName")?,
            take_text(&mut parts, "lastName", "name.lastName")?,
        ),
        Some(other) => return Err(MappingError::shape("name", "a mapping", &other)),
    };
    let name = format!("{first_name} {last_name}").trim().to_string();

    let age = match working.remove("age") {
        None => 0,
        Some(Value::Text(raw)) => coerce_age(&raw),
        Some(other) => return Err(MappingError::shape("age", "text", &other)),
    };

    let address = working
        .remove("address")
        .unwrap_or_else(|| Value::Map(Record::new()));

    Ok(MappedUser {
        name,
        age,
        address,
        additional_info: working,
    })
}

/// Parses an age, yielding 0 for anything that is not a non-negative integer.
pub fn coerce_age(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(age) if age >= 0 => age,
        Ok(age) => {
            debug!("Negative age {age} coerced to 0");
            0
        }
        Err(err) => {
            debug!("Age '{raw}' coerced to 0: {err}");
            0
        }
    }
}

fn take_text(
    parts: &mut Record,
    key: &str,
    field: &'static str,
) -> Result<String, MappingError> {
    match parts.remove(key) {
        None => Ok(String::new()),
        Some(Value::Text(text)) => Ok(text),
        Some(other) => Err(MappingError::shape(field, "text", &other)),
    }
}
