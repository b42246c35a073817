use serde_json::Value as Json;

use crate::codec::{InsertInput, RowCodec};
use crate::column::Column;
use crate::error::{InsertError, QueryError};
use crate::query::{QueryExecutor, QueryResult, QuerySpec};
use crate::schema::Schema;
use crate::value::Value;

/// A validated schema plus its rows, stored column by column.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    schema: Schema,
    columns: Vec<Column>,
    row_count: usize,
    codec: RowCodec,
}

impl Table {
    pub fn new(name: String, schema: Schema, codec: RowCodec) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|column| Column::new(column.name.clone(), column.data_type))
            .collect();
        Self {
            name,
            schema,
            columns,
            row_count: 0,
            codec,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Copy of the column names in schema order.
    pub fn keys(&self) -> Vec<String> {
        self.schema.keys()
    }

    /// Validates, coerces and appends one row.
    ///
    /// Accepts a name → value object, a positional array, or [row!](crate::row).
    /// The table is left untouched when any column is rejected.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use tabula::{row, Database, EngineConfig, Value};
    ///
    /// let mut db = Database::new(EngineConfig::default()).unwrap();
    /// db.create_table("users", &json!([
    ///     { "name": "id", "type": "integer", "size": 6 },
    ///     { "name": "name", "type": "text", "size": 32 },
    /// ])).unwrap();
    ///
    /// let users = db.get_table_mut("users").unwrap();
    /// users.insert(json!({ "id": 1, "name": "Alice" })).unwrap();
    /// users.insert(json!([2, "Bob"])).unwrap();
    /// users.insert(row![3, "Carol"]).unwrap();
    ///
    /// assert_eq!(users.row_count(), 3);
    /// assert_eq!(users.get_row(1), Some(vec![Value::Integer(2), Value::Text("Bob".into())]));
    /// ```
    pub fn insert(&mut self, input: impl Into<InsertInput>) -> Result<(), InsertError> {
        let input = input.into();
        let row = self.codec.encode(&self.schema, &self.columns, &input)?;

        // check every value fits before touching storage
        if let Some((column, value)) = self
            .columns
            .iter()
            .zip(&row)
            .find(|(column, value)| !column.accepts(value))
        {
            return Err(InsertError::TypeMismatch {
                column: column.name.clone(),
                data_type: column.data_type,
                value: value.to_string(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value)?;
        }
        self.row_count += 1;
        tracing::trace!(table = %self.name, rows = self.row_count, "row inserted");
        Ok(())
    }

    /// Runs a query over the stored rows.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use tabula::{Database, EngineConfig, QuerySpec, Value};
    ///
    /// let mut db = Database::new(EngineConfig::default()).unwrap();
    /// db.create_table("t", &json!([
    ///     { "name": "id", "type": "integer", "size": 6, "unique": true },
    ///     { "name": "name", "type": "text", "size": 32 },
    /// ])).unwrap();
    /// let t = db.get_table_mut("t").unwrap();
    /// for row in [json!([1, "a"]), json!([2, "b"]), json!([3, "c"])] {
    ///     t.insert(row).unwrap();
    /// }
    ///
    /// let result = t.get(&QuerySpec::new().filter(["id>1"]).order(["id:DESC"])).unwrap();
    /// assert_eq!(result.into_rows(), vec![
    ///     vec![Value::Integer(3), Value::Text("c".into())],
    ///     vec![Value::Integer(2), Value::Text("b".into())],
    /// ]);
    /// ```
    pub fn get(&self, spec: &QuerySpec) -> Result<QueryResult, QueryError> {
        let result = QueryExecutor::new(&self.schema).execute(self.rows(), spec)?;
        tracing::debug!(table = %self.name, ?spec, "query executed");
        Ok(result)
    }

    /// [Table::get] with the spec given as JSON.
    pub fn get_json(&self, spec: &Json) -> Result<QueryResult, QueryError> {
        self.get(&QuerySpec::from_json(spec)?)
    }

    /// Copy of the row at `row_idx`, `None` if out of bounds.
    pub fn get_row(&self, row_idx: usize) -> Option<Vec<Value>> {
        if self.row_count <= row_idx {
            return None;
        }
        self.columns
            .iter()
            .map(|col| col.get(row_idx)) // -> Option<Value>
            .collect()
    }

    /// Copies of every row, in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count).filter_map(|idx| self.get_row(idx))
    }

    pub fn get_col(&self, name: &str) -> Option<&Column> {
        self.schema.position(name).map(|idx| &self.columns[idx])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{EngineConfig, TypeGrammar};
    use crate::row;
    use crate::schema::SchemaValidator;
    use serde_json::json;

    fn table(columns: Json) -> Table {
        let config = EngineConfig::default();
        let schema = SchemaValidator::new(&config).validate(&columns).unwrap();
        let grammar = TypeGrammar::compile(&config.type_patterns).unwrap();
        Table::new("test".into(), schema, RowCodec::new(Arc::new(grammar)))
    }

    fn people() -> Table {
        table(json!([
            { "name": "id", "type": "integer", "size": 6, "unique": true, "attributes": ["autoincrement"] },
            { "name": "name", "type": "text", "size": 16, "required": true },
            { "name": "age", "type": "integer", "size": 3 },
        ]))
    }

    #[test]
    fn test_table_creation() {
        let table = people();
        assert_eq!(table.keys(), vec!["id", "name", "age"]);
        assert_eq!(table.row_count(), 0);
        assert!(table.get_col("id").is_some());
        assert!(table.get_col("email").is_none());
    }

    #[test]
    fn test_insert_then_get_returns_rows_in_order() {
        let mut table = people();
        table.insert(row![null, "Alice", 30]).unwrap();
        table.insert(json!({ "name": "Bob" })).unwrap();
        table.insert(json!([null, "Carol", "41"])).unwrap();

        let rows = table.get(&QuerySpec::new()).unwrap().into_rows();
        assert_eq!(
            rows,
            vec![
                vec![Value::Integer(1), Value::Text("Alice".into()), Value::Integer(30)],
                vec![Value::Integer(2), Value::Text("Bob".into()), Value::Null],
                vec![Value::Integer(3), Value::Text("Carol".into()), Value::Integer(41)],
            ]
        );
    }

    #[test]
    fn test_failed_insert_leaves_table_unchanged() {
        let mut table = people();
        table.insert(row![1, "Alice", 30]).unwrap();

        // the duplicate id is detected before anything is written
        assert!(matches!(
            table.insert(row![1, "Bob", 20]),
            Err(InsertError::DuplicateValue { .. })
        ));
        // the last column fails after the first two passed
        assert!(matches!(
            table.insert(row![2, "Bob", "old"]),
            Err(InsertError::TypeMismatch { .. })
        ));
        assert!(matches!(
            table.insert(row![2]),
            Err(InsertError::MissingRequiredValue { .. })
        ));

        assert_eq!(table.row_count(), 1);
        for column in ["id", "name", "age"] {
            assert_eq!(table.get_col(column).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_unique_ignores_other_columns() {
        let mut table = people();
        table.insert(row![7, "Alice", 30]).unwrap();
        assert_eq!(
            table.insert(row![7, "Someone else", 99]).unwrap_err(),
            InsertError::DuplicateValue {
                column: "id".into(),
                value: "7".into()
            }
        );
    }

    #[test]
    fn test_returned_rows_are_copies() {
        let mut table = people();
        table.insert(row![1, "Alice", 30]).unwrap();

        let mut rows = table.get(&QuerySpec::new()).unwrap().into_rows();
        rows[0][1] = Value::Text("Mallory".into());

        assert_eq!(table.get_row(0).unwrap()[1], Value::Text("Alice".into()));
        assert_eq!(table.get_row(1), None);
    }

    #[test]
    fn test_get_json() {
        let mut table = people();
        for (name, age) in [("a", 30), ("b", 20), ("c", 30)] {
            table.insert(json!({ "name": name, "age": age })).unwrap();
        }
        let result = table
            .get_json(&json!({ "keys": ["name"], "where": ["age==30"], "order": "name:DESC" }))
            .unwrap();
        assert_eq!(
            result.into_rows(),
            vec![vec![Value::Text("c".into())], vec![Value::Text("a".into())]]
        );

        assert!(matches!(
            table.get_json(&json!({ "order": 1 })),
            Err(QueryError::InvalidArgumentShape { argument: "order", .. })
        ));
    }
}
