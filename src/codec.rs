//! Validation and coercion of incoming rows.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::column::Column;
use crate::config::TypeGrammar;
use crate::data_type::DataType;
use crate::error::InsertError;
use crate::schema::{ColumnDef, Schema};
use crate::value::{Value, parse_date, parse_time};

/// The shapes a row can be supplied in.
///
/// `null` entries count as absent, exactly like missing trailing values.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertInput {
    /// Column name to raw value.
    Map(Map<String, Json>),
    /// Raw values in schema order.
    Positional(Vec<Json>),
}

impl From<Json> for InsertInput {
    fn from(value: Json) -> Self {
        match value {
            Json::Object(map) => Self::Map(map),
            Json::Array(values) => Self::Positional(values),
            scalar => Self::Positional(vec![scalar]),
        }
    }
}

impl From<Map<String, Json>> for InsertInput {
    fn from(map: Map<String, Json>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<Json>> for InsertInput {
    fn from(values: Vec<Json>) -> Self {
        Self::Positional(values)
    }
}

impl<const N: usize> From<[Json; N]> for InsertInput {
    fn from(values: [Json; N]) -> Self {
        Self::Positional(values.into())
    }
}

/// Builds a positional [InsertInput] from a list of values.
///
/// ```
/// let input = tabula::row![1, "a", true];
/// assert_eq!(
///     input,
///     tabula::InsertInput::Positional(vec![1.into(), "a".into(), true.into()])
/// );
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::InsertInput::Positional(::std::vec::Vec::new())
    };
    ($($value:tt)+) => {
        $crate::InsertInput::from(::serde_json::json!([$($value)+]))
    };
}

/// Turns raw input into a typed row ready to append.
#[derive(Debug, Clone)]
pub struct RowCodec {
    grammar: Arc<TypeGrammar>,
}

impl RowCodec {
    pub fn new(grammar: Arc<TypeGrammar>) -> Self {
        Self { grammar }
    }

    /// Validates `input` against `schema` and the rows already stored in
    /// `columns`, returning one [Value] per column.
    ///
    /// Nothing is written; the caller appends the returned row.
    pub fn encode(
        &self,
        schema: &Schema,
        columns: &[Column],
        input: &InsertInput,
    ) -> Result<Vec<Value>, InsertError> {
        let supplied = normalize(schema, input)?;

        let mut row = Vec::with_capacity(schema.len());
        for ((def, column), raw) in schema.columns().iter().zip(columns).zip(supplied) {
            let value = match raw {
                None if def.required => {
                    return Err(InsertError::MissingRequiredValue {
                        column: def.name.clone(),
                    });
                }
                None if def.is_autoincrement() => next_increment(def, column)?,
                None => Value::Null,
                Some(raw) => self.coerce(def, raw)?,
            };

            if def.unique && column.contains(&value) {
                return Err(InsertError::DuplicateValue {
                    column: def.name.clone(),
                    value: value.to_string(),
                });
            }
            row.push(value);
        }
        Ok(row)
    }

    fn coerce(&self, def: &ColumnDef, raw: &Json) -> Result<Value, InsertError> {
        let text = match raw {
            Json::String(s) => s.clone(),
            Json::Number(n) => n.to_string(),
            Json::Bool(b) => b.to_string(),
            Json::Null | Json::Array(_) | Json::Object(_) => {
                return Err(InsertError::InvalidPrimitiveKind {
                    column: def.name.clone(),
                });
            }
        };

        let len = text.chars().count();
        if len > def.size {
            return Err(InsertError::ValueTooLong {
                column: def.name.clone(),
                size: def.size,
                len,
            });
        }

        let mismatch = || InsertError::TypeMismatch {
            column: def.name.clone(),
            data_type: def.data_type,
            value: text.clone(),
        };
        if !self.grammar.accepts(def.data_type, &text) {
            return Err(mismatch());
        }

        let value = match def.data_type {
            DataType::Text => Value::Text(Arc::from(text.as_str())),
            DataType::Time => {
                parse_time(&text).ok_or_else(mismatch)?;
                Value::Time(Arc::from(text.as_str()))
            }
            DataType::Date => {
                parse_date(&text).ok_or_else(mismatch)?;
                Value::Date(Arc::from(text.as_str()))
            }
            DataType::Number => Value::Number(text.parse().map_err(|_| mismatch())?),
            DataType::Integer => Value::Integer(text.parse().map_err(|_| mismatch())?),
            DataType::Boolean => Value::Boolean(text.parse().map_err(|_| mismatch())?),
        };
        Ok(value)
    }
}

/// One optional raw value per schema column.
fn normalize<'a>(
    schema: &Schema,
    input: &'a InsertInput,
) -> Result<Vec<Option<&'a Json>>, InsertError> {
    let mut supplied = vec![None; schema.len()];
    match input {
        InsertInput::Map(map) => {
            for (key, raw) in map {
                let idx = schema
                    .position(key)
                    .ok_or_else(|| InsertError::UnknownKey { key: key.clone() })?;
                supplied[idx] = Some(raw);
            }
        }
        InsertInput::Positional(values) => {
            if values.len() > schema.len() {
                return Err(InsertError::TooManyValues {
                    expected: schema.len(),
                    got: values.len(),
                });
            }
            for (slot, raw) in supplied.iter_mut().zip(values) {
                *slot = Some(raw);
            }
        }
    }
    Ok(supplied
        .into_iter()
        .map(|raw| raw.filter(|v| !v.is_null()))
        .collect())
}

fn next_increment(def: &ColumnDef, column: &Column) -> Result<Value, InsertError> {
    let overflow = |last: String| InsertError::AutoincrementOverflow {
        column: def.name.clone(),
        last,
    };
    let value = match (def.data_type, column.last()) {
        (DataType::Number, Some(Value::Number(n))) => {
            let next = n + 1.0;
            // past 2^53 adding one no longer changes the value
            if !next.is_finite() || next == n {
                return Err(overflow(n.to_string()));
            }
            Value::Number(next)
        }
        (DataType::Number, _) => Value::Number(1.0),
        (_, Some(Value::Integer(i))) => {
            Value::Integer(i.checked_add(1).ok_or_else(|| overflow(i.to_string()))?)
        }
        _ => Value::Integer(1),
    };
    Ok(value)
}
