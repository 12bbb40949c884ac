//! Seed service configuration.
//!
//! The configuration is a structured key/value table. Common keys:
//!
//!   policy          : "autoIncrement"  // required, see PolicyKind
//!   verbosity       : 0                // optional
//!   endOfJobSummary : false            // optional
//!
//! Every other key belongs to the selected policy and is read by it
//! from the same table. Unknown keys are ignored.

use crate::error::{SeedError, SeedResult};
use serde_json::{Map, Value};

/// A table of configuration parameters with typed, key-naming accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamTable {
    entries: Map<String, Value>,
}

impl ParamTable {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> SeedResult<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(SeedError::config(
                "<root>",
                format!("expected a table of parameters, found {other}"),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether `key` holds a nested table.
    pub fn is_table(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Value::Object(_)))
    }

    /// Whether `key` holds a single value (not a table or a sequence).
    pub fn is_atom(&self, key: &str) -> bool {
        matches!(
            self.entries.get(key),
            Some(Value::Bool(_) | Value::Number(_) | Value::String(_))
        )
    }

    pub fn get_u64(&self, key: &str) -> SeedResult<Option<u64>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| SeedError::config(key, format!("expected a non-negative integer, found {value}"))),
        }
    }

    pub fn require_u64(&self, key: &str) -> SeedResult<u64> {
        self.get_u64(key)?
            .ok_or_else(|| SeedError::config(key, "required parameter missing"))
    }

    pub fn get_i64(&self, key: &str) -> SeedResult<Option<i64>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| SeedError::config(key, format!("expected an integer, found {value}"))),
        }
    }

    pub fn get_bool(&self, key: &str) -> SeedResult<Option<bool>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| SeedError::config(key, format!("expected a boolean, found {value}"))),
        }
    }

    pub fn get_str(&self, key: &str) -> SeedResult<Option<&str>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| SeedError::config(key, format!("expected a string, found {value}"))),
        }
    }

    pub fn get_table(&self, key: &str) -> SeedResult<Option<ParamTable>> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(entries)) => Ok(Some(Self::new(entries.clone()))),
            Some(value) => Err(SeedError::config(key, format!("expected a table, found {value}"))),
        }
    }

    pub fn to_compact_string(&self) -> String {
        Value::Object(self.entries.clone()).to_string()
    }
}

/// Top-level configuration of the seed service.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedServiceConfig {
    pub policy:             String,
    pub verbosity:          i64,
    pub end_of_job_summary: bool,
    /// The full table, policy parameters included.
    pub params:             ParamTable,
}

impl SeedServiceConfig {
    pub fn from_table(params: ParamTable) -> SeedResult<Self> {
        let policy = params
            .get_str("policy")?
            .ok_or_else(|| SeedError::config("policy", "required parameter missing"))?
            .to_string();
        Ok(Self {
            policy,
            verbosity:          params.get_i64("verbosity")?.unwrap_or(0),
            end_of_job_summary: params.get_bool("endOfJobSummary")?.unwrap_or(false),
            params,
        })
    }

    pub fn from_value(value: Value) -> SeedResult<Self> {
        Self::from_table(ParamTable::from_value(value)?)
    }

    pub fn from_json_str(json: &str) -> SeedResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load the configuration from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_json_str(&content)?)
    }
}
