use std::fmt;

/// Represents the supported data types in a table schema.
/// These types define the grammar a raw value must satisfy on insert and the
/// native [Value](crate::Value) it is stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Any UTF-8 string.
    Text,
    /// A non-negative decimal, stored as a 64-bit float.
    Number,
    /// A non-negative whole number, stored as a 64-bit signed integer.
    Integer,
    /// The literal `true` or `false`.
    Boolean,
    /// A time of day such as `08:30` or `23:59:59`.
    Time,
    /// A calendar date such as `2024-01-31`, month and day may be one digit.
    Date,
}

impl DataType {
    /// Resolves a type name as written in a column definition.
    /// Matching is case-insensitive; returns `None` for unsupported names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "time" => Some(Self::Time),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    /// The canonical lowercase name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Time => "time",
            Self::Date => "date",
        }
    }

    /// Returns `true` for the types holding numeric values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extra behaviours a column can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    /// Missing values are filled with the previous row's value plus one.
    Autoincrement,
}

impl Attribute {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "autoincrement" => Some(Self::Autoincrement),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(DataType::parse("integer"), Some(DataType::Integer));
        assert_eq!(DataType::parse("TEXT"), Some(DataType::Text));
        assert_eq!(DataType::parse("Date"), Some(DataType::Date));
        assert_eq!(DataType::parse("varchar"), None);
        assert_eq!(DataType::parse(""), None);
    }

    #[test]
    fn test_name_round_trips_through_parse() {
        for dt in [
            DataType::Text,
            DataType::Number,
            DataType::Integer,
            DataType::Boolean,
            DataType::Time,
            DataType::Date,
        ] {
            assert_eq!(DataType::parse(dt.name()), Some(dt));
        }
    }

    #[test]
    fn test_attribute_parse() {
        assert_eq!(
            Attribute::parse("AutoIncrement"),
            Some(Attribute::Autoincrement)
        );
        assert_eq!(Attribute::parse("primary"), None);
    }
}
