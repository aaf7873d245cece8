use std::fmt;

pub type TagExprResult<T> = std::result::Result<T, TagExprError>;

/// What the parser was looking for when it gave up.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Expected {
    /// Input should have ended, but more characters followed.
    EndOfExpression,
    /// A group was opened and never closed.
    CloseParenthesis,
    /// An operand was required but the input ran out.
    Term,
    /// An operand was required but a reserved character or an empty word was found.
    Value,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EndOfExpression => "end of expression",
            Self::CloseParenthesis => ")",
            Self::Term => "term",
            Self::Value => "value",
        })
    }
}

/// What the parser actually saw at the error position.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Found {
    Char(char),
    Eof,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Eof => f.write_str("EOF"),
        }
    }
}

impl From<Option<char>> for Found {
    fn from(value: Option<char>) -> Self {
        value.map_or(Self::Eof, Self::Char)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expression is empty")]
    Empty,
    #[error("Expected \"{expected}\" but found \"{found}\"")]
    Unexpected { expected: Expected, found: Found },
    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("Expression longer than {limit} characters")]
    TooLong { limit: usize },
}

impl ParseErrorKind {
    /// `found` is the offending character, or `None` at end of input.
    pub fn unexpected(expected: Expected, found: Option<char>) -> Self {
        Self::Unexpected {
            expected,
            found: found.into(),
        }
    }
}

/// A syntax error, positioned at a zero-based character offset into the
/// expression.
///
/// Displays as `<position>: <message>`, e.g. `4: Expected "value" but found "."`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{position}: {kind}")]
pub struct ParseError {
    pub position: usize,
    #[source]
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub const fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }

    /// The human readable part of the error, without the position prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TagExprError {
    #[error("Plugin already registered: {plugin_name}")]
    DuplicatePlugin { plugin_name: String },
    #[error("Plugin not found: {plugin_name}")]
    MissingPlugin { plugin_name: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
