use crate::condition::{Comparator, Literal};
use crate::error::ConditionError;

/// Characters that may appear in a comparator.
const OPERATOR_CHARS: &str = "=<>!^~$";

/// The three parts of a single condition string such as `age>=18`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionParts {
    pub key: String,
    pub comparator: Comparator,
    pub literal: Literal,
}

/// A lexical scanner that splits a condition string into
/// `<identifier><comparator><literal>`.
pub struct Tokenizer {
    /// The original text, kept for error messages.
    source: String,
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given condition string.
    pub fn new(input: &str) -> Self {
        Self {
            source: input.to_string(),
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Scans the whole condition.
    ///
    /// Whitespace is allowed around the comparator.
    ///
    /// # Errors
    /// - [ConditionError::MalformedCondition] when there is no identifier or no comparator.
    /// - [ConditionError::UnknownComparator] when the operator text is not a known comparator.
    /// - [ConditionError::InvalidLiteral] when the right-hand side is not a literal.
    ///
    /// # Example
    /// ```
    /// # use tabula::tokenizer::Tokenizer;
    /// # use tabula::condition::{Comparator, Literal};
    /// let parts = Tokenizer::new("name ^= 'Al'").tokenize().unwrap();
    /// assert_eq!(parts.key, "name");
    /// assert_eq!(parts.comparator, Comparator::StartsWith);
    /// assert_eq!(parts.literal, Literal::Text("Al".into()));
    /// ```
    pub fn tokenize(&mut self) -> Result<ConditionParts, ConditionError> {
        self.skip_whitespace();
        let key = self.read_identifier()?;

        self.skip_whitespace();
        let symbol = self.read_operator();
        if symbol.is_empty() {
            return Err(self.malformed());
        }
        let comparator = Comparator::parse(&symbol)
            .ok_or(ConditionError::UnknownComparator { comparator: symbol })?;

        self.skip_whitespace();
        let rest: String = self.input[self.position..].iter().collect();
        let literal = Literal::parse(rest.trim_end())?;

        Ok(ConditionParts {
            key,
            comparator,
            literal,
        })
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads `[A-Za-z_][A-Za-z0-9_]*`.
    fn read_identifier(&mut self) -> Result<String, ConditionError> {
        if self.is_at_end()
            || !(self.current_char().is_ascii_alphabetic() || self.current_char() == '_')
        {
            return Err(self.malformed());
        }

        let mut ident = String::new();
        while !self.is_at_end()
            && (self.current_char().is_ascii_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }
        Ok(ident)
    }

    /// Reads the run of operator characters following the identifier.
    fn read_operator(&mut self) -> String {
        let mut symbol = String::new();
        while !self.is_at_end() && OPERATOR_CHARS.contains(self.current_char()) {
            symbol.push(self.current_char());
            self.advance();
        }
        symbol
    }

    fn malformed(&self) -> ConditionError {
        ConditionError::MalformedCondition {
            condition: self.source.clone(),
        }
    }
}
