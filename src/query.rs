//! Query specifications and the full-scan executor.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::Value as Json;

use crate::condition::ConditionTree;
use crate::error::QueryError;
use crate::parser::ConditionCompiler;
use crate::schema::Schema;
use crate::value::Value;

/// What a caller asks of [Table::get](crate::Table::get).
///
/// Fields hold the caller's raw text; [QueryExecutor] validates them against
/// the schema on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Columns to project, in output order. `None` or empty returns all columns.
    pub keys: Option<Vec<String>>,
    /// Entries of the form `name`, `name:ASC` or `name:DESC`.
    pub order: Vec<String>,
    /// Condition strings and `AND`/`OR`/`NOT` join tokens.
    pub filter: Vec<String>,
    pub limit: Option<i64>,
    /// `first`, `last` or `count`.
    pub method: Option<String>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `where` clause.
    pub fn filter<I, S>(mut self, filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = filter.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Reads `{ keys?, order?, where?, limit?, method? }`.
    ///
    /// `order` and `where` accept a single string or a list of strings.
    ///
    /// # Errors
    /// [QueryError::InvalidArgumentShape] for values of the wrong JSON kind,
    /// [QueryError::InvalidLimit] for a limit that is not an integer.
    pub fn from_json(spec: &Json) -> Result<Self, QueryError> {
        let fields = match spec {
            Json::Null => return Ok(Self::default()),
            Json::Object(fields) => fields,
            _ => {
                return Err(QueryError::InvalidArgumentShape {
                    argument: "query",
                    expected: "an object",
                });
            }
        };

        let mut query = Self::default();
        for (name, value) in fields {
            match name.as_str() {
                "keys" => {
                    query.keys = match value {
                        Json::Null => None,
                        Json::Array(_) => Some(string_list(value).ok_or(
                            QueryError::InvalidArgumentShape {
                                argument: "keys",
                                expected: "a list of column names",
                            },
                        )?),
                        _ => {
                            return Err(QueryError::InvalidArgumentShape {
                                argument: "keys",
                                expected: "a list of column names",
                            });
                        }
                    }
                }
                "order" => {
                    query.order = string_list(value).ok_or(QueryError::InvalidArgumentShape {
                        argument: "order",
                        expected: "a string or a list of strings",
                    })?
                }
                "where" => {
                    query.filter = string_list(value).ok_or(QueryError::InvalidArgumentShape {
                        argument: "where",
                        expected: "a string or a list of strings",
                    })?
                }
                "limit" => {
                    query.limit = match value {
                        Json::Null => None,
                        Json::Number(n) => Some(n.as_i64().ok_or_else(|| QueryError::InvalidLimit {
                            limit: n.to_string(),
                        })?),
                        other => {
                            return Err(QueryError::InvalidLimit {
                                limit: other.to_string(),
                            });
                        }
                    }
                }
                "method" => {
                    query.method = match value {
                        Json::Null => None,
                        Json::String(method) => Some(method.clone()),
                        _ => {
                            return Err(QueryError::InvalidArgumentShape {
                                argument: "method",
                                expected: "a string",
                            });
                        }
                    }
                }
                _ => {
                    return Err(QueryError::InvalidArgumentShape {
                        argument: "query",
                        expected: "an object with keys, order, where, limit or method",
                    });
                }
            }
        }
        Ok(query)
    }
}

/// `null` → empty, a string → one entry, a list of strings → the list.
fn string_list(value: &Json) -> Option<Vec<String>> {
    match value {
        Json::Null => Some(vec![]),
        Json::String(s) => Some(vec![s.clone()]),
        Json::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(String::from))
            .collect(),
        _ => None,
    }
}

/// Post-filter selector applied to the matched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    First,
    Last,
    Count,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "count" => Some(Self::Count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A validated [QuerySpec], with every column name resolved to its position.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub projection: Option<Vec<usize>>,
    pub order: Vec<(usize, SortDirection)>,
    pub filter: ConditionTree,
    pub limit: Option<usize>,
    pub method: Option<Method>,
}

/// Represents the result of a successful query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Matched rows, each projected to `columns`.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// The outcome of `first` or `last`; `None` when nothing matched.
    Row {
        columns: Vec<String>,
        row: Option<Vec<Value>>,
    },
    /// The outcome of `count`.
    Count(usize),
}

impl QueryResult {
    /// Names of the returned columns; empty for a count.
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Rows { columns, .. } | Self::Row { columns, .. } => columns,
            Self::Count(_) => &[],
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Returned rows: zero or one for `first`/`last`, none for a count.
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        match self {
            Self::Rows { rows, .. } => rows,
            Self::Row { row, .. } => row.into_iter().collect(),
            Self::Count(_) => vec![],
        }
    }
}

/// Runs queries over the rows of one schema.
pub struct QueryExecutor<'a> {
    schema: &'a Schema,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates `spec` against the schema.
    ///
    /// Checks run in the order keys, order, where, limit, method, and the
    /// first failure is returned.
    pub fn plan(&self, spec: &QuerySpec) -> Result<QueryPlan, QueryError> {
        let projection = match spec.keys.as_deref() {
            None | Some([]) => None,
            Some(keys) => {
                let mut seen = HashSet::new();
                let mut positions = Vec::with_capacity(keys.len());
                for key in keys {
                    let idx = self.resolve(key)?;
                    if !seen.insert(idx) {
                        return Err(QueryError::DuplicateProjectionKey { key: key.clone() });
                    }
                    positions.push(idx);
                }
                Some(positions)
            }
        };

        let order = spec
            .order
            .iter()
            .map(|entry| self.parse_order_entry(entry))
            .collect::<Result<Vec<_>, _>>()?;

        let filter = ConditionCompiler::new(self.schema).compile(spec.filter.as_slice())?;

        let limit = spec
            .limit
            .map(|limit| {
                usize::try_from(limit).map_err(|_| QueryError::InvalidLimit {
                    limit: limit.to_string(),
                })
            })
            .transpose()?;

        let method = spec
            .method
            .as_deref()
            .map(|name| {
                Method::parse(name).ok_or_else(|| QueryError::UnknownMethod {
                    method: name.to_string(),
                })
            })
            .transpose()?;
        if method == Some(Method::Count) && !order.is_empty() {
            return Err(QueryError::IncompatibleMethodAndOrder);
        }

        Ok(QueryPlan {
            projection,
            order,
            filter,
            limit,
            method,
        })
    }

    /// Validates `spec` and runs it over `rows`, which must be in storage order.
    ///
    /// The query lifecycle:
    /// 1. **Scans** rows, keeping those the `where` tree accepts, and stops
    ///    once `limit` rows were kept.
    /// 2. **Reduces** with the method: `first`/`last` keep one row, `count`
    ///    returns the number of kept rows and skips the remaining steps.
    /// 3. **Sorts** by the `order` entries.
    /// 4. **Projects** the requested columns.
    pub fn execute<I>(&self, rows: I, spec: &QuerySpec) -> Result<QueryResult, QueryError>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let plan = self.plan(spec)?;
        Ok(self.run(&plan, rows))
    }

    /// Runs an already validated plan.
    pub fn run<I>(&self, plan: &QueryPlan, rows: I) -> QueryResult
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let limit = plan.limit.unwrap_or(usize::MAX);
        let mut matched = Vec::new();
        let mut scanned = 0usize;
        for row in rows {
            if matched.len() >= limit {
                break;
            }
            scanned += 1;
            if plan.filter.matches(&row) {
                matched.push(row);
            }
        }
        tracing::debug!(scanned, matched = matched.len(), "scanned table");

        let columns = match &plan.projection {
            Some(positions) => positions
                .iter()
                .map(|&idx| self.schema.columns()[idx].name.clone())
                .collect(),
            None => self.schema.keys(),
        };

        match plan.method {
            Some(Method::Count) => QueryResult::Count(matched.len()),
            Some(Method::First) => QueryResult::Row {
                columns,
                row: matched.into_iter().next().map(|row| self.project(plan, row)),
            },
            Some(Method::Last) => QueryResult::Row {
                columns,
                row: matched.pop().map(|row| self.project(plan, row)),
            },
            None => {
                sort(&mut matched, &plan.order);
                QueryResult::Rows {
                    columns,
                    rows: matched
                        .into_iter()
                        .map(|row| self.project(plan, row))
                        .collect(),
                }
            }
        }
    }

    fn resolve(&self, key: &str) -> Result<usize, QueryError> {
        self.schema
            .position(key)
            .ok_or_else(|| QueryError::UnknownKey {
                key: key.to_string(),
            })
    }

    /// `name`, `name:ASC` or `name:DESC`; the direction is case-insensitive.
    fn parse_order_entry(&self, entry: &str) -> Result<(usize, SortDirection), QueryError> {
        let (name, direction) = match entry.split_once(':') {
            None => (entry, SortDirection::Asc),
            Some((name, direction)) => {
                let direction = match direction.trim().to_ascii_uppercase().as_str() {
                    "ASC" => SortDirection::Asc,
                    "DESC" => SortDirection::Desc,
                    _ => {
                        return Err(QueryError::InvalidOrderDirection {
                            entry: entry.to_string(),
                        });
                    }
                };
                (name, direction)
            }
        };
        Ok((self.resolve(name.trim())?, direction))
    }

    fn project(&self, plan: &QueryPlan, row: Vec<Value>) -> Vec<Value> {
        match &plan.projection {
            Some(positions) => positions.iter().map(|&idx| row[idx].clone()).collect(),
            None => row,
        }
    }
}

/// Sorts rows in-place by several columns.
///
/// For each row comparison it walks the order entries: if the first column
/// compares equal, it moves to the next one, and so on.
fn sort(rows: &mut [Vec<Value>], order: &[(usize, SortDirection)]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for (idx, direction) in order {
            let mut ord = a[*idx].natural_cmp(&b[*idx]);

            if *direction == SortDirection::Desc {
                ord = ord.reverse();
            }
            // if it's not equal no need to compare more
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::ConditionError;
    use crate::schema::SchemaValidator;
    use serde_json::json;

    fn schema() -> Schema {
        SchemaValidator::new(&EngineConfig::default())
            .validate(&json!([
                { "name": "id", "type": "integer", "size": 6 },
                { "name": "name", "type": "text", "size": 32 },
                { "name": "age", "type": "integer", "size": 3 },
            ]))
            .unwrap()
    }

    fn rows() -> Vec<Vec<Value>> {
        [(1, "carol", 30), (2, "alice", 25), (3, "bob", 30), (4, "dave", 25)]
            .into_iter()
            .map(|(id, name, age)| vec![Value::Integer(id), Value::Text(name.into()), Value::Integer(age)])
            .collect()
    }

    fn get(spec: QuerySpec) -> Result<QueryResult, QueryError> {
        let schema = schema();
        QueryExecutor::new(&schema).execute(rows(), &spec)
    }

    fn ids(result: QueryResult) -> Vec<i64> {
        result
            .into_rows()
            .iter()
            .map(|row| row[0].as_integer().unwrap())
            .collect()
    }

    #[test]
    fn test_empty_spec_returns_everything_in_order() {
        let result = get(QuerySpec::new()).unwrap();
        assert_eq!(result.columns(), ["id", "name", "age"]);
        assert_eq!(result.into_rows(), rows());
    }

    #[test]
    fn test_where_and_or() {
        let spec = QuerySpec::new().filter(["age==30", "AND", "id>1"]);
        assert_eq!(ids(get(spec).unwrap()), vec![3]);

        let spec = QuerySpec::new().filter(["name=='alice'", "OR", "id==4"]);
        assert_eq!(ids(get(spec).unwrap()), vec![2, 4]);

        let spec = QuerySpec::new().filter(["NOT", "age==30"]);
        assert_eq!(ids(get(spec).unwrap()), vec![2, 4]);
    }

    #[test]
    fn test_multi_key_order() {
        let spec = QuerySpec::new().order(["age:ASC", "name:DESC"]);
        assert_eq!(ids(get(spec).unwrap()), vec![4, 2, 1, 3]);

        let spec = QuerySpec::new().order(["age:desc", "name"]);
        assert_eq!(ids(get(spec).unwrap()), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_limit_applies_before_sort() {
        let spec = QuerySpec::new().limit(2).order(["id:DESC"]);
        assert_eq!(ids(get(spec).unwrap()), vec![2, 1]);

        let spec = QuerySpec::new().limit(0);
        assert!(get(spec).unwrap().into_rows().is_empty());

        let spec = QuerySpec::new().limit(10);
        assert_eq!(ids(get(spec).unwrap()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_methods() {
        let result = get(QuerySpec::new().filter(["age==25"]).method("first")).unwrap();
        assert_eq!(ids(result), vec![2]);

        let result = get(QuerySpec::new().filter(["age==25"]).method("LAST")).unwrap();
        assert_eq!(ids(result), vec![4]);

        let result = get(QuerySpec::new().filter(["age>100"]).method("first")).unwrap();
        assert_eq!(
            result,
            QueryResult::Row {
                columns: vec!["id".into(), "name".into(), "age".into()],
                row: None
            }
        );

        let result = get(QuerySpec::new().filter(["age==30"]).method("count")).unwrap();
        assert_eq!(result.count(), Some(2));
        assert!(result.columns().is_empty());

        let result = get(QuerySpec::new().limit(3).method("count")).unwrap();
        assert_eq!(result, QueryResult::Count(3));
    }

    #[test]
    fn test_projection() {
        let result = get(QuerySpec::new().keys(["age", "id"]).filter(["id==1"])).unwrap();
        assert_eq!(result.columns(), ["age", "id"]);
        assert_eq!(result.into_rows(), vec![vec![Value::Integer(30), Value::Integer(1)]]);

        // order by a column that is not projected
        let result = get(QuerySpec::new().keys(["name"]).order(["age", "id:DESC"])).unwrap();
        assert_eq!(
            result.into_rows(),
            vec![
                vec![Value::Text("dave".into())],
                vec![Value::Text("alice".into())],
                vec![Value::Text("bob".into())],
                vec![Value::Text("carol".into())],
            ]
        );

        let empty: [&str; 0] = [];
        let result = get(QuerySpec::new().keys(empty)).unwrap();
        assert_eq!(result.columns().len(), 3);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            get(QuerySpec::new().keys(["nope"])).unwrap_err(),
            QueryError::UnknownKey { key: "nope".into() }
        );
        assert_eq!(
            get(QuerySpec::new().keys(["id", "id"])).unwrap_err(),
            QueryError::DuplicateProjectionKey { key: "id".into() }
        );
        assert_eq!(
            get(QuerySpec::new().order(["id:UP"])).unwrap_err(),
            QueryError::InvalidOrderDirection {
                entry: "id:UP".into()
            }
        );
        assert_eq!(
            get(QuerySpec::new().order(["ghost:ASC"])).unwrap_err(),
            QueryError::UnknownKey {
                key: "ghost".into()
            }
        );
        assert_eq!(
            get(QuerySpec::new().limit(-1)).unwrap_err(),
            QueryError::InvalidLimit { limit: "-1".into() }
        );
        assert_eq!(
            get(QuerySpec::new().method("median")).unwrap_err(),
            QueryError::UnknownMethod {
                method: "median".into()
            }
        );
        assert_eq!(
            get(QuerySpec::new().filter(["id==1"]).method("count").order(["id"])).unwrap_err(),
            QueryError::IncompatibleMethodAndOrder
        );
        assert_eq!(
            get(QuerySpec::new().filter(["id=="])).unwrap_err(),
            QueryError::Condition(ConditionError::InvalidLiteral {
                literal: String::new()
            })
        );
    }

    #[test]
    fn test_keys_are_checked_before_order() {
        assert!(matches!(
            get(QuerySpec::new().keys(["nope"]).order(["id:SIDEWAYS"])),
            Err(QueryError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let spec = QuerySpec::from_json(&json!({
            "keys": ["id"],
            "order": "age:DESC",
            "where": "id>1",
            "limit": 5,
            "method": "first",
        }))
        .unwrap();
        assert_eq!(
            spec,
            QuerySpec::new()
                .keys(["id"])
                .order(["age:DESC"])
                .filter(["id>1"])
                .limit(5)
                .method("first")
        );

        assert_eq!(QuerySpec::from_json(&json!(null)).unwrap(), QuerySpec::new());
        assert_eq!(QuerySpec::from_json(&json!({})).unwrap(), QuerySpec::new());
    }

    #[test]
    fn test_from_json_shape_errors() {
        for spec in [
            json!([]),
            json!({ "keys": "id" }),
            json!({ "keys": [1] }),
            json!({ "order": 3 }),
            json!({ "where": [true] }),
            json!({ "method": 1 }),
            json!({ "select": ["id"] }),
        ] {
            assert!(
                matches!(
                    QuerySpec::from_json(&spec),
                    Err(QueryError::InvalidArgumentShape { .. })
                ),
                "{spec}"
            );
        }
        assert_eq!(
            QuerySpec::from_json(&json!({ "limit": 1.5 })).unwrap_err(),
            QueryError::InvalidLimit { limit: "1.5".into() }
        );
        assert!(matches!(
            QuerySpec::from_json(&json!({ "limit": "3" })),
            Err(QueryError::InvalidLimit { .. })
        ));
    }
}
