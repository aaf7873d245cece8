use std::{fmt, str::FromStr};

use crate::ast::Node;
use crate::error::{TagExprError, TagExprResult};
use crate::parser::{ParseOptions, parse_with};

/// An Expression is a parsed tag expression kept together with its source.
///
/// The source is parsed once into a tree of [`Node`]s, which is then evaluated
/// against as many tag lists as needed.
///
/// # Example
///
/// ```rust
/// use tagexpr::{Expression, TagList};
///
/// let expression = Expression::new("PL.DOCTOR.!(DENTIST,physio).(VIP,PLUS)").unwrap();
///
/// let tags = TagList::from_delimited("PL,Doctor,VIP", ',');
/// assert!(expression.matches(tags.as_slice()));
///
/// let tags = TagList::from_delimited("PL,Doctor,VIP,Physio", ',');
/// assert!(!expression.matches(tags.as_slice()));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    source: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    root: Node,
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct ExpressionHelper {
            source: String,
        }

        let helper = ExpressionHelper::deserialize(deserializer)?;

        // Only the source is stored, so the tree is rebuilt here.
        Self::new(helper.source)
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse expression: {e}")))
    }
}

impl Expression {
    /// Parses `source` with the default [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// Returns a `TagExprError::Parse` error if the expression is malformed.
    pub fn new<T: Into<String>>(source: T) -> TagExprResult<Self> {
        Self::with_options(source, &ParseOptions::default())
    }

    /// Parses `source`, enforcing the limits in `options`.
    ///
    /// # Errors
    ///
    /// Returns a `TagExprError::Parse` error if the expression is malformed or
    /// exceeds one of the limits.
    pub fn with_options<T: Into<String>>(source: T, options: &ParseOptions) -> TagExprResult<Self> {
        let source = source.into();
        let root = parse_with(source.as_str(), options).into_result()?;
        Ok(Self { source, root })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Whether the given tags satisfy this expression.
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.root.evaluate(tags)
    }

    /// Same as [`Expression::matches`], treating a missing tag list as an
    /// empty one.
    pub fn matches_opt<S: AsRef<str>>(&self, tags: Option<&[S]>) -> bool {
        self.root.evaluate_opt(tags)
    }
}

impl FromStr for Expression {
    type Err = TagExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
