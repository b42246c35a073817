//! An embeddable in-memory table engine.
//!
//! Tables are created from a JSON column description, rows are inserted as
//! name → value objects or positional arrays, and queries select, filter,
//! sort and limit rows with a small string condition language.
//!
//! ```
//! use serde_json::json;
//! use tabula::{row, Database, EngineConfig, QuerySpec, Value};
//!
//! let mut db = Database::new(EngineConfig::default()).unwrap();
//! db.create_table("t", &json!([
//!     { "name": "id", "type": "integer", "size": 6, "unique": true },
//!     { "name": "name", "type": "text", "size": 32 },
//! ])).unwrap();
//! db.insert("t", row![1, "a"]).unwrap();
//! db.insert("t", row![2, "b"]).unwrap();
//!
//! let rows = db.get("t", &QuerySpec::new().keys(["name"]).filter(["id>=2"])).unwrap();
//! assert_eq!(rows.into_rows(), vec![vec![Value::Text("b".into())]]);
//! ```

pub mod codec;
pub mod column;
pub mod condition;
pub mod config;
pub mod data_type;
pub mod database;
pub mod error;
pub mod parser;
pub mod query;
pub mod schema;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use codec::{InsertInput, RowCodec};
pub use column::Column;
pub use condition::{Comparator, Condition, ConditionTree, Literal};
pub use config::{EngineConfig, TypeGrammar, TypePatterns};
pub use data_type::{Attribute, DataType};
pub use database::Database;
pub use error::{ConditionError, ConfigError, Error, InsertError, QueryError, Result, SchemaError};
pub use parser::{ConditionCompiler, match_row};
pub use query::{Method, QueryExecutor, QueryResult, QuerySpec, SortDirection};
pub use schema::{ColumnDef, Schema, SchemaValidator};
pub use table::Table;
pub use value::Value;
