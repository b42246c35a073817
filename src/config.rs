//! Engine configuration.
//!
//! Everything the validators consult (size bounds, reserved names, the type
//! grammar table) lives in an explicit [EngineConfig] that is handed to each
//! component at construction time.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::error::ConfigError;

/// Tunables shared by schema validation and row coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest accepted column size.
    pub min_size: usize,
    /// Largest accepted column size.
    pub max_size: usize,
    /// Column names that cannot be used, compared case-insensitively.
    pub reserved_names: Vec<String>,
    /// Grammar each raw value must match before it is converted.
    pub type_patterns: TypePatterns,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 65_535,
            reserved_names: [
                "and", "or", "not", "true", "false", "null", "asc", "desc", "first", "last",
                "count", "keys", "order", "where", "limit", "method",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            type_patterns: TypePatterns::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the size bounds are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size == 0 || self.min_size > self.max_size {
            return Err(ConfigError::InvalidSizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
    }
}

/// Regular expressions for the non-text types. `text` accepts anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypePatterns {
    pub number: String,
    pub integer: String,
    pub boolean: String,
    pub time: String,
    pub date: String,
}

impl Default for TypePatterns {
    fn default() -> Self {
        Self {
            number: r"^\d+(\.\d+)?$".into(),
            integer: r"^\d+$".into(),
            boolean: r"^(true|false)$".into(),
            time: r"^([01]?\d|2[0-3]):[0-5]\d(:[0-5]\d)?$".into(),
            date: r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$".into(),
        }
    }
}

/// Compiled form of [TypePatterns].
#[derive(Debug, Clone)]
pub struct TypeGrammar {
    number: Regex,
    integer: Regex,
    boolean: Regex,
    time: Regex,
    date: Regex,
}

impl TypeGrammar {
    pub fn compile(patterns: &TypePatterns) -> Result<Self, ConfigError> {
        let build = |data_type: DataType, pattern: &str| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { data_type, source })
        };
        Ok(Self {
            number: build(DataType::Number, &patterns.number)?,
            integer: build(DataType::Integer, &patterns.integer)?,
            boolean: build(DataType::Boolean, &patterns.boolean)?,
            time: build(DataType::Time, &patterns.time)?,
            date: build(DataType::Date, &patterns.date)?,
        })
    }

    /// Returns `true` if `raw` is a well-formed value of `data_type`.
    pub fn accepts(&self, data_type: DataType, raw: &str) -> bool {
        match data_type {
            DataType::Text => true,
            DataType::Number => self.number.is_match(raw),
            DataType::Integer => self.integer.is_match(raw),
            DataType::Boolean => self.boolean.is_match(raw),
            DataType::Time => self.time.is_match(raw),
            DataType::Date => self.date.is_match(raw),
        }
    }
}
