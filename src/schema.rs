//! Column definitions and the validator that gates table creation.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::Value as Json;

use crate::config::EngineConfig;
use crate::data_type::{Attribute, DataType};
use crate::error::SchemaError;

/// Column definition in the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    /// Maximum length of the value's string form.
    pub size: usize,
    pub unique: bool,
    pub required: bool,
    pub attributes: BTreeSet<Attribute>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType, size: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            size,
            unique: false,
            required: false,
            attributes: BTreeSet::new(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.attributes.insert(Attribute::Autoincrement);
        self
    }

    pub fn is_autoincrement(&self) -> bool {
        self.attributes.contains(&Attribute::Autoincrement)
    }
}

/// An immutable, validated, ordered set of columns.
///
/// Only [SchemaValidator] builds one, so every schema in circulation has at
/// least one column and unique, well-formed names.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnDef>,
    index: HashMap<String, usize>,
}

impl Schema {
    fn new(columns: Vec<ColumnDef>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self { columns, index }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    /// Column names in schema order.
    pub fn keys(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Validates column definitions against an [EngineConfig].
pub struct SchemaValidator<'a> {
    config: &'a EngineConfig,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Validates a JSON column set and builds the [Schema].
    ///
    /// Columns are checked in order and the first failing rule wins.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use tabula::{EngineConfig, SchemaValidator};
    ///
    /// let config = EngineConfig::default();
    /// let schema = SchemaValidator::new(&config)
    ///     .validate(&json!([
    ///         { "name": "id", "type": "integer", "size": 6, "unique": true },
    ///         { "name": "name", "type": "text", "size": 32 },
    ///     ]))
    ///     .unwrap();
    /// assert_eq!(schema.keys(), vec!["id", "name"]);
    /// ```
    pub fn validate(&self, columns: &Json) -> Result<Schema, SchemaError> {
        let definitions = columns.as_array().ok_or(SchemaError::NotAList)?;
        if definitions.is_empty() {
            return Err(SchemaError::NoColumns);
        }

        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            let fields = definition
                .as_object()
                .ok_or(SchemaError::InvalidDefinition { index })?;

            let name = match fields.get("name") {
                Some(Json::String(name)) => name.clone(),
                other => {
                    return Err(SchemaError::InvalidName {
                        index,
                        name: other.map(Json::to_string).unwrap_or_default(),
                    });
                }
            };
            self.check_name(index, &name, &mut seen)?;

            let data_type = match fields.get("type") {
                None | Some(Json::Null) => {
                    return Err(SchemaError::MissingType { column: name });
                }
                Some(raw) => raw.as_str().and_then(DataType::parse).ok_or_else(|| {
                    SchemaError::UnknownType {
                        column: name.clone(),
                        type_name: raw.as_str().map_or_else(|| raw.to_string(), String::from),
                    }
                })?,
            };

            let size = fields
                .get("size")
                .and_then(Json::as_u64)
                .ok_or_else(|| SchemaError::InvalidSize {
                    column: name.clone(),
                })?;
            let size = self.check_size(&name, size)?;

            let attributes = match fields.get("attributes") {
                None | Some(Json::Null) => BTreeSet::new(),
                Some(Json::Array(items)) => {
                    let mut attributes = BTreeSet::new();
                    for item in items {
                        let label = item.as_str().ok_or_else(|| SchemaError::InvalidAttributes {
                            column: name.clone(),
                        })?;
                        let attribute =
                            Attribute::parse(label).ok_or_else(|| SchemaError::UnknownAttribute {
                                column: name.clone(),
                                attribute: label.to_string(),
                            })?;
                        attributes.insert(attribute);
                    }
                    attributes
                }
                Some(_) => {
                    return Err(SchemaError::InvalidAttributes { column: name });
                }
            };

            let column = ColumnDef {
                unique: fields.get("unique").is_some_and(truthy),
                required: fields.get("required").is_some_and(truthy),
                name,
                data_type,
                size,
                attributes,
            };
            check_attributes(&column)?;
            validated.push(column);
        }

        tracing::trace!(columns = validated.len(), "validated column set");
        Ok(Schema::new(validated))
    }

    /// Validates column definitions built in code.
    pub fn validate_defs(&self, columns: Vec<ColumnDef>) -> Result<Schema, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }
        let mut seen = HashSet::new();
        for (index, column) in columns.iter().enumerate() {
            self.check_name(index, &column.name, &mut seen)?;
            self.check_size(&column.name, column.size as u64)?;
            check_attributes(column)?;
        }
        Ok(Schema::new(columns))
    }

    fn check_name(
        &self,
        index: usize,
        name: &str,
        seen: &mut HashSet<String>,
    ) -> Result<(), SchemaError> {
        if !is_identifier(name) {
            return Err(SchemaError::InvalidName {
                index,
                name: name.to_string(),
            });
        }
        if self.config.is_reserved(name) {
            return Err(SchemaError::ReservedName {
                name: name.to_string(),
            });
        }
        if !seen.insert(name.to_string()) {
            return Err(SchemaError::DuplicateColumnName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn check_size(&self, column: &str, size: u64) -> Result<usize, SchemaError> {
        let (min, max) = (self.config.min_size, self.config.max_size);
        match usize::try_from(size) {
            Ok(size) if (min..=max).contains(&size) => Ok(size),
            _ => Err(SchemaError::SizeOutOfRange {
                column: column.to_string(),
                size,
                min,
                max,
            }),
        }
    }
}

fn check_attributes(column: &ColumnDef) -> Result<(), SchemaError> {
    if column.is_autoincrement() && !column.data_type.is_numeric() {
        return Err(SchemaError::AutoincrementRequiresNumeric {
            column: column.name.clone(),
            data_type: column.data_type,
        });
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(_) | Json::Object(_) => true,
    }
}
