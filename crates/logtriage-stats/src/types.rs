use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while aggregating log records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Malformed timestamp '{0}'")]
    MalformedTimestamp(String),

    #[error("Bucket interval must be greater than zero")]
    InvalidInterval,

    #[error("Timestamp '{0}' is too far from the first record to bucket")]
    OutOfRange(String),
}

/// Severity level of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Warn and Error records are the only ones considered as issue evidence
    pub fn is_elevated(&self) -> bool {
        matches!(self, Level::Warn | Level::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Warn => "Warn",
            Level::Error => "Error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per severity level, serialized as `{"Debug": .., "Info": .., "Warn": .., "Error": ..}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerLevel<T> {
    #[serde(rename = "Debug")]
    pub debug: T,
    #[serde(rename = "Info")]
    pub info: T,
    #[serde(rename = "Warn")]
    pub warn: T,
    #[serde(rename = "Error")]
    pub error: T,
}

impl<T> PerLevel<T> {
    pub fn get(&self, level: Level) -> &T {
        match level {
            Level::Debug => &self.debug,
            Level::Info => &self.info,
            Level::Warn => &self.warn,
            Level::Error => &self.error,
        }
    }

    pub fn get_mut(&mut self, level: Level) -> &mut T {
        match level {
            Level::Debug => &mut self.debug,
            Level::Info => &mut self.info,
            Level::Warn => &mut self.warn,
            Level::Error => &mut self.error,
        }
    }

    /// Iterate in fixed level order: Debug, Info, Warn, Error
    pub fn iter(&self) -> impl Iterator<Item = (Level, &T)> {
        Level::ALL.into_iter().map(move |level| (level, self.get(level)))
    }
}

/// Count of records per level; all four levels are always present
pub type LevelCounts = PerLevel<u64>;

impl LevelCounts {
    pub fn increment(&mut self, level: Level) {
        *self.get_mut(level) += 1;
    }

    pub fn total(&self) -> u64 {
        self.debug + self.info + self.warn + self.error
    }
}

/// A structured log entry as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 instant; a trailing `Z` means UTC
    pub timestamp: String,
    pub level: Level,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl LogRecord {
    pub fn new(timestamp: impl Into<String>, level: Level, messages: Vec<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            level,
            messages,
        }
    }

    /// True if any message contains `needle` as a substring
    pub fn mentions(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

/// String-keyed map that keeps the caller's key order.
///
/// JSON objects from the caller (issue catalogs, keyword groups) are iterated in the
/// order they were written. A repeated key replaces the earlier value in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A pre-catalogued failure pattern supplied with each request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownIssue {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: String,
    /// Category name to keywords, in caller order
    #[serde(default)]
    pub keywords: OrderedMap<Vec<String>>,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub resolution: String,
    /// Any other caller-provided fields, passed through to prompts untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
