//! Error types for every stage of the engine.
//!
//! Each component returns its own error enum; [Error] wraps them all for the
//! [Database](crate::Database) entry points.

use thiserror::Error;

use crate::data_type::DataType;

pub type Result<T> = std::result::Result<T, Error>;

/// Rejections raised while validating a column set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("column definitions must be a list")]
    NotAList,

    #[error("a table needs at least one column")]
    NoColumns,

    #[error("column definition #{index} must be an object")]
    InvalidDefinition { index: usize },

    #[error("column #{index} has an invalid name {name:?}")]
    InvalidName { index: usize, name: String },

    #[error("column name {name:?} is reserved")]
    ReservedName { name: String },

    #[error("column name {name:?} is used more than once")]
    DuplicateColumnName { name: String },

    #[error("column {column:?} has no type")]
    MissingType { column: String },

    #[error("column {column:?} has unknown type {type_name:?}")]
    UnknownType { column: String, type_name: String },

    #[error("column {column:?} must have a non-negative integer size")]
    InvalidSize { column: String },

    #[error("column {column:?} size {size} is outside [{min}, {max}]")]
    SizeOutOfRange {
        column: String,
        size: u64,
        min: usize,
        max: usize,
    },

    #[error("column {column:?} attributes must be a list of names")]
    InvalidAttributes { column: String },

    #[error("column {column:?} has unknown attribute {attribute:?}")]
    UnknownAttribute { column: String, attribute: String },

    #[error("column {column:?} is autoincrement but has type {data_type}")]
    AutoincrementRequiresNumeric { column: String, data_type: DataType },
}

/// Rejections raised while validating and coercing a row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsertError {
    #[error("unknown column {key:?}")]
    UnknownKey { key: String },

    #[error("got {got} values for {expected} columns")]
    TooManyValues { expected: usize, got: usize },

    #[error("column {column:?} requires a value")]
    MissingRequiredValue { column: String },

    #[error("column {column:?} only accepts strings, numbers or booleans")]
    InvalidPrimitiveKind { column: String },

    #[error("value for column {column:?} is {len} characters, limit is {size}")]
    ValueTooLong {
        column: String,
        size: usize,
        len: usize,
    },

    #[error("value {value:?} is not a valid {data_type} for column {column:?}")]
    TypeMismatch {
        column: String,
        data_type: DataType,
        value: String,
    },

    #[error("column {column:?} already holds the value {value:?}")]
    DuplicateValue { column: String, value: String },

    #[error("autoincrement column {column:?} cannot go past {last}")]
    AutoincrementOverflow { column: String, last: String },
}

/// Rejections raised while compiling a `where` clause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("condition references unknown column {key:?}")]
    UnknownKey { key: String },

    #[error("unknown comparator {comparator:?}")]
    UnknownComparator { comparator: String },

    #[error("invalid literal {literal:?}")]
    InvalidLiteral { literal: String },

    #[error("operator {operator} has no condition to join")]
    DanglingOperator { operator: String },

    #[error("malformed condition {condition:?}")]
    MalformedCondition { condition: String },
}

/// Rejections raised while validating or running a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("{argument} must be {expected}")]
    InvalidArgumentShape {
        argument: &'static str,
        expected: &'static str,
    },

    #[error("unknown column {key:?}")]
    UnknownKey { key: String },

    #[error("column {key:?} is projected more than once")]
    DuplicateProjectionKey { key: String },

    #[error("invalid order entry {entry:?}, expected name[:ASC|:DESC]")]
    InvalidOrderDirection { entry: String },

    #[error("limit must be a non-negative integer, got {limit}")]
    InvalidLimit { limit: String },

    #[error("unknown method {method:?}")]
    UnknownMethod { method: String },

    #[error("count cannot be combined with order")]
    IncompatibleMethodAndOrder,

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

/// Rejections raised while building an engine from its configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid size range [{min}, {max}]")]
    InvalidSizeRange { min: usize, max: usize },

    #[error("invalid {data_type} pattern: {source}")]
    InvalidPattern {
        data_type: DataType,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the [Database](crate::Database) registry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("table {0:?} already exists")]
    TableExists(String),

    #[error("table {0:?} does not exist")]
    TableNotFound(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Insert(#[from] InsertError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
