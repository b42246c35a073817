use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::codec::{InsertInput, RowCodec};
use crate::config::{EngineConfig, TypeGrammar};
use crate::error::{Error, Result};
use crate::query::{QueryResult, QuerySpec};
use crate::schema::{ColumnDef, Schema, SchemaValidator};
use crate::table::Table;

/// The main entry point for the in-memory engine.
/// It owns the configuration and a collection of named tables.
#[derive(Debug)]
pub struct Database {
    config: EngineConfig,
    grammar: Arc<TypeGrammar>,
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

impl Database {
    /// Creates a new, empty database.
    ///
    /// # Errors
    /// Returns [ConfigError](crate::ConfigError) if the size bounds are
    /// unusable or a type pattern does not compile.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let grammar = Arc::new(TypeGrammar::compile(&config.type_patterns)?);
        Ok(Self {
            config,
            grammar,
            tables: HashMap::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a JSON column set and creates a table from it.
    ///
    /// # Errors
    /// Returns an error if a table with the same name already exists or the
    /// columns are rejected by the [SchemaValidator].
    pub fn create_table(&mut self, name: &str, columns: &Json) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::TableExists(name.to_string()));
        }
        let schema = SchemaValidator::new(&self.config).validate(columns)?;
        self.add_table(name, schema);
        Ok(())
    }

    /// Same as [Database::create_table] for definitions built in code.
    pub fn create_table_with(&mut self, name: &str, columns: Vec<ColumnDef>) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::TableExists(name.to_string()));
        }
        let schema = SchemaValidator::new(&self.config).validate_defs(columns)?;
        self.add_table(name, schema);
        Ok(())
    }

    fn add_table(&mut self, name: &str, schema: Schema) {
        tracing::debug!(table = name, columns = schema.len(), "table created");
        let table = Table::new(
            name.to_string(),
            schema,
            RowCodec::new(Arc::clone(&self.grammar)),
        );
        self.tables.insert(name.to_string(), table);
    }

    /// Removes a table from the database by its name.
    ///
    /// # Errors
    /// Returns an error if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.tables.remove(name) {
            Some(_) => {
                tracing::debug!(table = name, "table dropped");
                Ok(())
            }
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Retrieves a reference to a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Retrieves a mutable reference to a table by name.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Returns a list of all table names currently stored in the database.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Inserts one row into the named table.
    pub fn insert(&mut self, table: &str, input: impl Into<InsertInput>) -> Result<()> {
        let target = self
            .get_table_mut(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        target.insert(input)?;
        Ok(())
    }

    /// Queries the named table.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use tabula::{Database, EngineConfig, QuerySpec};
    ///
    /// let mut db = Database::new(EngineConfig::default()).unwrap();
    /// db.create_table("products", &json!([
    ///     { "name": "name", "type": "text", "size": 16 },
    ///     { "name": "price", "type": "number", "size": 8 },
    /// ])).unwrap();
    /// db.insert("products", json!(["Laptop", 1200])).unwrap();
    /// db.insert("products", json!(["Mouse", 25.5])).unwrap();
    ///
    /// let count = db.get("products", &QuerySpec::new().filter(["price<100"]).method("count")).unwrap();
    /// assert_eq!(count.count(), Some(1));
    /// ```
    pub fn get(&self, table: &str, spec: &QuerySpec) -> Result<QueryResult> {
        let target = self
            .get_table(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        Ok(target.get(spec)?)
    }
}
