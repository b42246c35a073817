use std::sync::Arc;

use crate::data_type::DataType;
use crate::error::InsertError;
use crate::value::Value;
use bitvec::prelude::*;

/// Physical storage for column data.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Vector of 64-bit integers.
    Integer(Vec<i64>),
    /// Vector of 64-bit floats.
    Number(Vec<f64>),
    /// Vector of reference-counted strings, shared by text, time and date columns.
    Text(Vec<Arc<str>>),
    /// Compact bit-vector for boolean values.
    Boolean(BitVec),
}

/// Stored values of one schema column.
/// It combines the logical type with the actual data and a nullability tracker.
#[derive(Debug, Clone)]
pub struct Column {
    /// The name of the column.
    pub name: String,
    /// The logical data type of the column.
    pub data_type: DataType,
    /// The actual values stored in the column.
    pub data: ColumnData,
    /// A bitmap where a `true` bit indicates that the value at that index is `NULL`.
    pub null_bitmap: BitVec,
}

impl Column {
    /// Creates a new, empty column with the specified name and data type.
    /// The underlying data storage is initialized according to the data type.
    pub fn new(name: String, data_type: DataType) -> Self {
        let data = match data_type {
            DataType::Integer => ColumnData::Integer(vec![]),
            DataType::Number => ColumnData::Number(vec![]),
            DataType::Boolean => ColumnData::Boolean(bitvec!()),
            DataType::Text | DataType::Time | DataType::Date => ColumnData::Text(vec![]),
        };
        Self {
            name,
            data_type,
            data,
            null_bitmap: bitvec!(),
        }
    }

    /// Returns `true` if `value` can be stored in this column as is.
    pub fn accepts(&self, value: &Value) -> bool {
        value.data_type().is_none_or(|t| t == self.data_type)
    }

    /// Appends a new value to the end of the column.
    ///
    /// # Errors
    /// Returns [InsertError::TypeMismatch] if the value's type does not match
    /// the column's data type. Nothing is appended in that case.
    ///
    /// # Behavior
    /// - If the value is `Null`, a default "dummy" value is pushed to the data vector
    ///   to maintain index alignment with the `null_bitmap`.
    /// - If the value is not `Null`, it is added to the data vector and the bitmap is updated.
    ///
    /// # Example
    /// ```
    /// # use tabula::column::Column;
    /// # use tabula::data_type::DataType;
    /// # use tabula::value::Value;
    /// let mut col = Column::new("age".into(), DataType::Integer);
    /// col.push(Value::Integer(30)).unwrap();
    /// col.push(Value::Null).unwrap();
    ///
    /// assert_eq!(col.len(), 2);
    /// assert!(col.get(1).unwrap().is_null());
    /// ```
    pub fn push(&mut self, value: Value) -> Result<(), InsertError> {
        if value.is_null() {
            self.null_bitmap.push(true);
            // Add default value to keep alignment between the data vector and the bitmap
            match &mut self.data {
                ColumnData::Integer(v) => v.push(0),
                ColumnData::Number(v) => v.push(0.0),
                ColumnData::Text(v) => v.push(Arc::from("")),
                ColumnData::Boolean(v) => v.push(false),
            }
            return Ok(());
        }

        let mismatch = |value: &Value| InsertError::TypeMismatch {
            column: self.name.clone(),
            data_type: self.data_type,
            value: value.to_string(),
        };

        if !self.accepts(&value) {
            return Err(mismatch(&value));
        }

        match (&mut self.data, value) {
            (ColumnData::Integer(col), Value::Integer(v)) => col.push(v),
            (ColumnData::Number(col), Value::Number(v)) => col.push(v),
            (ColumnData::Text(col), Value::Text(v) | Value::Time(v) | Value::Date(v)) => {
                col.push(v)
            }
            (ColumnData::Boolean(col), Value::Boolean(v)) => col.push(v),
            (_, other) => return Err(mismatch(&other)),
        }
        self.null_bitmap.push(false);

        Ok(())
    }

    /// Returns the number of rows currently stored in the column.
    pub fn len(&self) -> usize {
        self.null_bitmap.len()
    }

    /// Returns true if there is no row in the column, else false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieves the value at the specified row index.
    ///
    /// Returns `Some(Value)` if the index is valid, or `None` if it is out of bounds.
    /// If the `null_bitmap` indicates a null at the index, `Some(Value::Null)` is returned.
    pub fn get(&self, row_idx: usize) -> Option<Value> {
        if row_idx >= self.len() {
            return None;
        }
        if self.null_bitmap[row_idx] {
            return Some(Value::Null);
        }
        let value = match &self.data {
            ColumnData::Integer(col) => Value::Integer(col[row_idx]),
            ColumnData::Number(col) => Value::Number(col[row_idx]),
            ColumnData::Boolean(col) => Value::Boolean(col[row_idx]),
            ColumnData::Text(col) => {
                let text = Arc::clone(&col[row_idx]);
                match self.data_type {
                    DataType::Time => Value::Time(text),
                    DataType::Date => Value::Date(text),
                    _ => Value::Text(text),
                }
            }
        };
        Some(value)
    }

    /// The most recently appended value, `None` for an empty column.
    pub fn last(&self) -> Option<Value> {
        self.len().checked_sub(1).and_then(|idx| self.get(idx))
    }

    /// Returns `true` if a non-null slot holds a value equal to `value`.
    pub fn contains(&self, value: &Value) -> bool {
        let present = |idx: usize| !self.null_bitmap[idx];
        match (&self.data, value) {
            (_, Value::Null) => false,
            (ColumnData::Integer(col), Value::Integer(v)) => {
                col.iter().enumerate().any(|(i, x)| x == v && present(i))
            }
            (ColumnData::Number(col), Value::Number(v)) => {
                col.iter().enumerate().any(|(i, x)| x == v && present(i))
            }
            (ColumnData::Text(col), Value::Text(v) | Value::Time(v) | Value::Date(v)) => {
                col.iter().enumerate().any(|(i, x)| x == v && present(i))
            }
            (ColumnData::Boolean(col), Value::Boolean(v)) => {
                col.iter().enumerate().any(|(i, x)| *x == *v && present(i))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Storage layout per type
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_storage_follows_data_type() {
        let layout = |data_type| Column::new("c".into(), data_type).data;

        assert!(matches!(layout(DataType::Integer), ColumnData::Integer(_)));
        assert!(matches!(layout(DataType::Number), ColumnData::Number(_)));
        assert!(matches!(layout(DataType::Boolean), ColumnData::Boolean(_)));
        for data_type in [DataType::Text, DataType::Time, DataType::Date] {
            assert!(matches!(layout(data_type), ColumnData::Text(_)));
        }
    }

    // ─────────────────────────────────────────────────────────────
    // NULL slots keep the data vector aligned
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_null_handling() {
        let mut col = Column::new("nullable".into(), DataType::Number);

        col.push(Value::Number(1.5)).unwrap();
        col.push(Value::Null).unwrap();

        assert_eq!(col.get(1), Some(Value::Null));
        assert!(col.null_bitmap[1]);
        assert!(matches!(&col.data, ColumnData::Number(v) if v.len() == 2));
        // the autoincrement source sees the empty slot, not the placeholder
        assert_eq!(col.last(), Some(Value::Null));
    }

    // ─────────────────────────────────────────────────────────────
    // Only the column's own variant (or Null) is accepted
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_accepts_and_type_mismatch() {
        let mut col = Column::new("n".into(), DataType::Integer);

        assert!(col.accepts(&Value::Null));
        assert!(!col.accepts(&Value::Number(1.0)));
        assert_eq!(
            col.push(Value::Text("hello".into())).unwrap_err(),
            InsertError::TypeMismatch {
                column: "n".into(),
                data_type: DataType::Integer,
                value: "hello".into()
            }
        );
        assert!(col.is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // string-shaped types share storage but keep their variant
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_time_and_date_columns() {
        let mut time = Column::new("at".into(), DataType::Time);
        time.push(Value::Time("08:30".into())).unwrap();
        assert_eq!(time.get(0), Some(Value::Time("08:30".into())));
        assert!(time.push(Value::Text("08:30".into())).is_err());

        let mut date = Column::new("on".into(), DataType::Date);
        date.push(Value::Date("2024-01-31".into())).unwrap();
        assert_eq!(date.last(), Some(Value::Date("2024-01-31".into())));
        assert!(date.contains(&Value::Date("2024-01-31".into())));
    }

    // ─────────────────────────────────────────────────────────────
    // contains skips null slots
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_contains() {
        let mut col = Column::new("n".into(), DataType::Integer);
        col.push(Value::Integer(5)).unwrap();
        col.push(Value::Null).unwrap();

        assert!(col.contains(&Value::Integer(5)));
        // the dummy 0 behind the null slot must not count
        assert!(!col.contains(&Value::Integer(0)));
        assert!(!col.contains(&Value::Null));
        assert!(!col.contains(&Value::Number(5.0)));

        let mut flags = Column::new("flag".into(), DataType::Boolean);
        flags.push(Value::Boolean(true)).unwrap();
        assert!(flags.contains(&Value::Boolean(true)));
        assert!(!flags.contains(&Value::Boolean(false)));
    }
}
