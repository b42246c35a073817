//! Compiled predicates and their evaluation against stored rows.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::error::ConditionError;
use crate::value::{Value, parse_date, parse_time};

/// The fixed comparator set of the condition grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `^=`
    StartsWith,
    /// `==`
    Equal,
    /// `~=`
    Contains,
    /// `$=`
    EndsWith,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
}

impl Comparator {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "^=" => Some(Self::StartsWith),
            "==" => Some(Self::Equal),
            "~=" => Some(Self::Contains),
            "$=" => Some(Self::EndsWith),
            "!=" => Some(Self::NotEqual),
            ">" => Some(Self::Greater),
            "<" => Some(Self::Less),
            ">=" => Some(Self::GreaterOrEqual),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::StartsWith => "^=",
            Self::Equal => "==",
            Self::Contains => "~=",
            Self::EndsWith => "$=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A single- or double-quoted string, quotes removed.
    Text(String),
    /// A numeric literal; `text` keeps the spelling for the string comparators.
    Number { value: f64, text: String },
    /// `true` or `false`.
    Boolean(bool),
}

impl Literal {
    /// Parses a literal: `'...'`, `"..."`, `-?\d+(\.\d+)?`, `true` or `false`.
    pub fn parse(raw: &str) -> Result<Self, ConditionError> {
        let invalid = || ConditionError::InvalidLiteral {
            literal: raw.to_string(),
        };

        for quote in ['\'', '"'] {
            if raw.starts_with(quote) {
                if raw.len() < 2 || !raw.ends_with(quote) {
                    return Err(invalid());
                }
                return Ok(Self::Text(raw[1..raw.len() - 1].to_string()));
            }
        }

        match raw {
            "true" => return Ok(Self::Boolean(true)),
            "false" => return Ok(Self::Boolean(false)),
            _ => {}
        }

        if is_numeric_literal(raw) {
            let value = raw.parse().map_err(|_| invalid())?;
            return Ok(Self::Number {
                value,
                text: raw.to_string(),
            });
        }

        Err(invalid())
    }

    /// The literal as the string comparators see it.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Number { text, .. } => Cow::Borrowed(text),
            Self::Boolean(b) => Cow::Owned(b.to_string()),
        }
    }
}

/// `-?\d+(\.\d+)?`
fn is_numeric_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && fraction.is_none_or(digits)
}

/// A single comparison with its column already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub key: String,
    /// Position of `key` in the schema.
    pub column: usize,
    pub comparator: Comparator,
    pub literal: Literal,
}

impl Condition {
    /// Evaluates the condition against a full row in schema order.
    ///
    /// Empty slots never match. `!=` is true for every non-empty value the
    /// literal does not equal, including values it cannot be compared with.
    pub fn matches(&self, row: &[Value]) -> bool {
        let value = match row.get(self.column) {
            Some(value) if !value.is_null() => value,
            _ => return false,
        };

        match self.comparator {
            Comparator::StartsWith => value.to_string().starts_with(self.literal.text().as_ref()),
            Comparator::Contains => value.to_string().contains(self.literal.text().as_ref()),
            Comparator::EndsWith => value.to_string().ends_with(self.literal.text().as_ref()),
            Comparator::Equal => self.compare(value) == Some(Ordering::Equal),
            Comparator::NotEqual => self.compare(value) != Some(Ordering::Equal),
            Comparator::Greater => self.compare(value) == Some(Ordering::Greater),
            Comparator::Less => self.compare(value) == Some(Ordering::Less),
            Comparator::GreaterOrEqual => matches!(
                self.compare(value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparator::LessOrEqual => {
                matches!(self.compare(value), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }

    /// Orders the stored value relative to the literal, in the column's domain.
    /// `None` when the literal has no meaning there.
    fn compare(&self, value: &Value) -> Option<Ordering> {
        match value {
            Value::Null => None,
            Value::Integer(_) | Value::Number(_) => {
                let rhs = match &self.literal {
                    Literal::Number { value, .. } => *value,
                    Literal::Text(s) => s.trim().parse().ok()?,
                    Literal::Boolean(_) => return None,
                };
                value.as_f64()?.partial_cmp(&rhs)
            }
            Value::Boolean(b) => {
                let rhs = match &self.literal {
                    Literal::Boolean(l) => *l,
                    Literal::Text(s) => s.parse().ok()?,
                    Literal::Number { .. } => return None,
                };
                Some(b.cmp(&rhs))
            }
            Value::Time(t) => Some(parse_time(t)?.cmp(&parse_time(&self.literal.text())?)),
            Value::Date(d) => Some(parse_date(d)?.cmp(&parse_date(&self.literal.text())?)),
            Value::Text(t) => Some(t.as_ref().cmp(self.literal.text().as_ref())),
        }
    }
}

/// A compiled `where` clause.
///
/// A row matches when every `and` condition matches, every `or` group has at
/// least one match and no `not` condition matches. The empty tree matches
/// every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionTree {
    pub and: Vec<Condition>,
    pub or: Vec<Vec<Condition>>,
    pub not: Vec<Condition>,
}

impl ConditionTree {
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty() && self.not.is_empty()
    }

    pub fn matches(&self, row: &[Value]) -> bool {
        self.and.iter().all(|c| c.matches(row))
            && !self.not.iter().any(|c| c.matches(row))
            && self.or.iter().all(|group| group.iter().any(|c| c.matches(row)))
    }
}
