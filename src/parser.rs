use crate::condition::{Condition, ConditionTree};
use crate::error::ConditionError;
use crate::schema::Schema;
use crate::tokenizer::Tokenizer;
use crate::value::Value;

/// Boolean join tokens accepted between condition strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    And,
    Or,
    Not,
}

impl Join {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

/// Where the most recently compiled clause was placed.
#[derive(Debug, Clone, Copy)]
enum Slot {
    And,
    Not,
    Or(usize),
}

/// Compiles `where` sources into a [ConditionTree] for one schema.
pub struct ConditionCompiler<'a> {
    schema: &'a Schema,
}

impl<'a> ConditionCompiler<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Compiles a flat sequence of condition strings and `AND`/`OR`/`NOT`
    /// join tokens. Two conditions with no join between them are ANDed.
    ///
    /// `OR` pulls the clause placed just before it out of its bucket and opens
    /// a new `or` group with it and the clause that follows; further `OR`s
    /// extend that group until an `AND` or `NOT` closes it.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use tabula::{ConditionCompiler, EngineConfig, SchemaValidator};
    ///
    /// let config = EngineConfig::default();
    /// let schema = SchemaValidator::new(&config)
    ///     .validate(&json!([
    ///         { "name": "a", "type": "integer", "size": 4 },
    ///         { "name": "b", "type": "integer", "size": 4 },
    ///         { "name": "c", "type": "integer", "size": 4 },
    ///     ]))
    ///     .unwrap();
    ///
    /// let tree = ConditionCompiler::new(&schema)
    ///     .compile(&["a==1", "AND", "b==2", "OR", "c==3"])
    ///     .unwrap();
    /// assert_eq!(tree.and.len(), 1);
    /// assert_eq!(tree.or[0].len(), 2);
    /// ```
    pub fn compile<S: AsRef<str>>(&self, source: &[S]) -> Result<ConditionTree, ConditionError> {
        let mut tree = ConditionTree::default();
        let mut pending: Option<Join> = None;
        let mut last: Option<Slot> = None;

        for item in source {
            let text = item.as_ref().trim();

            if let Some(join) = Join::parse(text) {
                pending = match (pending, join) {
                    (None, Join::Not) | (Some(Join::And), Join::Not) => Some(Join::Not),
                    (None, join) if last.is_some() => Some(join),
                    (None, join) => {
                        return Err(ConditionError::DanglingOperator {
                            operator: join.symbol().to_string(),
                        });
                    }
                    (Some(_), _) => {
                        return Err(ConditionError::MalformedCondition {
                            condition: text.to_string(),
                        });
                    }
                };
                continue;
            }

            let condition = self.compile_condition(text)?;
            let slot = match pending.take().unwrap_or(Join::And) {
                Join::And => {
                    tree.and.push(condition);
                    Slot::And
                }
                Join::Not => {
                    tree.not.push(condition);
                    Slot::Not
                }
                Join::Or => match last {
                    Some(Slot::Or(group)) => {
                        tree.or[group].push(condition);
                        Slot::Or(group)
                    }
                    Some(previous) => {
                        let moved = match previous {
                            Slot::Not => tree.not.pop(),
                            _ => tree.and.pop(),
                        }
                        .ok_or_else(|| ConditionError::DanglingOperator {
                            operator: Join::Or.symbol().to_string(),
                        })?;
                        tree.or.push(vec![moved, condition]);
                        Slot::Or(tree.or.len() - 1)
                    }
                    None => {
                        return Err(ConditionError::DanglingOperator {
                            operator: Join::Or.symbol().to_string(),
                        });
                    }
                },
            };
            last = Some(slot);
        }

        if let Some(join) = pending {
            return Err(ConditionError::DanglingOperator {
                operator: join.symbol().to_string(),
            });
        }

        tracing::trace!(
            and = tree.and.len(),
            or = tree.or.len(),
            not = tree.not.len(),
            "compiled where clause"
        );
        Ok(tree)
    }

    /// Compiles a single condition string and resolves its column.
    pub fn compile_condition(&self, text: &str) -> Result<Condition, ConditionError> {
        let parts = Tokenizer::new(text).tokenize()?;
        let column = self
            .schema
            .position(&parts.key)
            .ok_or_else(|| ConditionError::UnknownKey {
                key: parts.key.clone(),
            })?;
        Ok(Condition {
            key: parts.key,
            column,
            comparator: parts.comparator,
            literal: parts.literal,
        })
    }
}

/// Evaluates one condition string against a row laid out by `schema`.
pub fn match_row(schema: &Schema, row: &[Value], condition: &str) -> Result<bool, ConditionError> {
    let condition = ConditionCompiler::new(schema).compile_condition(condition)?;
    Ok(condition.matches(row))
}
