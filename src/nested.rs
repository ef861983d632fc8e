//! Nested record reconstruction from dotted CSV headers.
//!
//! A header such as `address.city` names a location inside a tree. Each CSV row
//! is folded into a fresh [`Record`] by walking the header's segments,
//! creating intermediate maps as needed and assigning the cell text at the
//! final segment.
//!
//! Collisions are resolved by position: a later column always wins. When a
//! path needs to descend through a node that already holds text (`a` = `1`
//! followed by `a.b` = `2`), the text is replaced by a new empty map and the
//! earlier value is lost. No merge is attempted and no error is raised.

use log::debug;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A node in a nested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Map(Record),
    List(Vec<Value>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(record) => Some(record),
            _ => None,
        }
    }

    /// Short name of the variant, used in shape errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Map(_) => "mapping",
            Value::List(_) => "list",
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Map(record)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Text(text) => serializer.serialize_str(text),
            Value::Map(record) => record.serialize(serializer),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Insertion-ordered mapping from key to [`Value`].
///
/// Replacing an existing key keeps its original position, matching how the
/// columns of the source row were first encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Follows `path` through nested maps.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.get(segment)?.as_map()?;
        }
        current.get(last)
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Stores `value` at `path`, creating intermediate maps as needed.
    ///
    /// A non-map value found where the path must descend is discarded and
    /// replaced by an empty map, keeping its position among its siblings.
    pub fn insert_path<S: AsRef<str>>(&mut self, path: &[S], value: Value) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        let key = head.as_ref();
        if rest.is_empty() {
            self.insert(key, value);
            return;
        }
        let slot = self.slot_mut(key);
        let mut child = match std::mem::replace(slot, Value::Map(Record::new())) {
            Value::Map(child) => child,
            other => {
                debug!("Replacing {} at '{key}' with a nested mapping", other.kind());
                Record::new()
            }
        };
        child.insert_path(rest, value);
        *slot = Value::Map(child);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    fn slot_mut(&mut self, key: &str) -> &mut Value {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.entries
                    .push((key.to_string(), Value::Map(Record::new())));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A dotted column header split into its non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPath {
    segments: Vec<String>,
}

impl HeaderPath {
    /// Parses a header, returning `None` when it has no usable segment.
    ///
    /// Surrounding whitespace is trimmed first. Empty segments created by
    /// leading, trailing or doubled dots are dropped.
    pub fn parse(header: &str) -> Option<Self> {
        let segments = header
            .trim()
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Stores `value` at this path inside `record`.
    pub fn assign(&self, record: &mut Record, value: &str) {
        record.insert_path(&self.segments, Value::text(value));
    }
}

/// Folds rows into nested records using header paths parsed once up front.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    paths: Vec<Option<HeaderPath>>,
}

impl RecordBuilder {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let paths = headers
            .iter()
            .map(|header| {
                let parsed = HeaderPath::parse(header.as_ref());
                if parsed.is_none() {
                    debug!(
                        "Ignoring column with unusable header '{}'",
                        header.as_ref()
                    );
                }
                parsed
            })
            .collect();
        Self { paths }
    }

    pub fn build<S: AsRef<str>>(&self, values: &[S]) -> Record {
        let mut record = Record::new();
        for (path, value) in self.paths.iter().zip(values) {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            if let Some(path) = path {
                path.assign(&mut record, value);
            }
        }
        record
    }
}

/// Builds the nested record for a single row.
pub fn build_nested<H, V>(headers: &[H], values: &[V]) -> Record
where
    H: AsRef<str>,
    V: AsRef<str>,
{
    RecordBuilder::new(headers).build(values)
}
