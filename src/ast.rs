use std::fmt;

/// A node of a parsed tag expression.
///
/// The tree is built bottom-up by the parser and never changes afterwards.
/// Every node owns its children exclusively, so a whole tree can be shared
/// freely between threads and evaluated concurrently against different tag
/// lists.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawNode"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Matches everybody (`*`).
    True,
    /// Membership test for a single tag, compared case-insensitively. The
    /// value is never empty.
    Word { value: String },
    /// Logical NOT of a single term.
    Negation { inner: Box<Node> },
    /// Conditional AND
    And { left: Box<Node>, right: Box<Node> },
    /// Conditional OR
    Or { left: Box<Node>, right: Box<Node> },
}

/// Mirror of [`Node`] used to reject empty words while deserializing.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "Node")]
enum RawNode {
    True,
    Word { value: String },
    Negation { inner: Box<Node> },
    And { left: Box<Node>, right: Box<Node> },
    Or { left: Box<Node>, right: Box<Node> },
}

#[cfg(feature = "serde")]
impl TryFrom<RawNode> for Node {
    type Error = &'static str;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawNode::True => Self::True,
            RawNode::Word { value } if value.is_empty() => return Err(EMPTY_WORD),
            RawNode::Word { value } => Self::Word { value },
            RawNode::Negation { inner } => Self::Negation { inner },
            RawNode::And { left, right } => Self::And { left, right },
            RawNode::Or { left, right } => Self::Or { left, right },
        })
    }
}

const EMPTY_WORD: &str = "a word must not be empty";

impl Node {
    /// Builds a [`Node::Word`].
    ///
    /// # Panics
    ///
    /// If `value` is empty; the parser never produces an empty word.
    #[must_use]
    #[track_caller]
    pub fn word<T: Into<String>>(value: T) -> Self {
        let value = value.into();
        assert!(!value.is_empty(), "{EMPTY_WORD}");
        Self::Word { value }
    }

    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Negation {
            inner: Box::new(inner),
        }
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The tree `~` parses to: nobody matches.
    #[must_use]
    pub fn nobody() -> Self {
        Self::negate(Self::True)
    }

    /// Evaluates this node against a list of tags.
    ///
    /// A [`Node::Word`] is satisfied when any tag equals its value ignoring
    /// case. The comparison folds both sides with Unicode lowercase mapping
    /// and does not depend on any locale, so `"ä"` matches `"Ä"` just like
    /// `"a"` matches `"A"`.
    ///
    /// An empty tag list makes every word evaluate to `false`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tagexpr::Node;
    ///
    /// let node = Node::and(Node::word("PL"), Node::negate(Node::word("VIP")));
    /// assert!(node.evaluate(&["pl", "doctor"]));
    /// assert!(!node.evaluate(&["PL", "Vip"]));
    /// ```
    pub fn evaluate<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        match self {
            Self::True => true,
            Self::Word { value } => tags.iter().any(|tag| eq_ignore_case(tag.as_ref(), value)),
            Self::Negation { inner } => !inner.evaluate(tags),
            Self::And { left, right } => left.evaluate(tags) && right.evaluate(tags),
            Self::Or { left, right } => left.evaluate(tags) || right.evaluate(tags),
        }
    }

    /// Same as [`Node::evaluate`], treating a missing tag list as an empty one.
    pub fn evaluate_opt<S: AsRef<str>>(&self, tags: Option<&[S]>) -> bool {
        self.evaluate(tags.unwrap_or_default())
    }
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Renders the tree with every operand parenthesized, e.g. `(A) and (!(B))`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "1"),
            Self::Word { value } => write!(f, "{value}"),
            Self::Negation { inner } => write!(f, "!({inner})"),
            Self::And { left, right } => write!(f, "({left}) and ({right})"),
            Self::Or { left, right } => write!(f, "({left}) or ({right})"),
        }
    }
}
