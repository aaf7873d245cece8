use crate::{
    ast::Node,
    error::{Expected, ParseError, ParseErrorKind},
};

type ParseResult<T> = Result<T, ParseError>;

const OR: char = ',';
const AND: char = '.';
const NOT: char = '!';
const EVERYBODY: char = '*';
const NOBODY: char = '~';
const OPEN_PAREN: char = '(';
const CLOSE_PAREN: char = ')';

#[inline]
const fn is_ignored(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

#[inline]
const fn is_word_char(c: char) -> bool {
    !is_ignored(c)
        && !matches!(
            c,
            OR | AND | NOT | EVERYBODY | NOBODY | OPEN_PAREN | CLOSE_PAREN
        )
}

/// Limits applied while parsing, for hosts that accept expressions from
/// untrusted sources.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Deepest nesting the parser accepts. Every group and every negation
    /// counts as one level; operands chained with `,` or `.` do not.
    pub max_depth: usize,
    /// Longest accepted expression, in characters.
    pub max_length: Option<usize>,
}

impl ParseOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_length: None,
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of parsing an expression.
///
/// A failed parse carries no tree, so only a successful outcome can ever be
/// evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ParseOutcome {
    Success(Node),
    Failure(ParseError),
}

impl ParseOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn root(&self) -> Option<&Node> {
        match self {
            Self::Success(node) => Some(node),
            Self::Failure(_) => None,
        }
    }

    /// Errors recorded by the parser: empty on success, exactly one on failure.
    pub const fn errors(&self) -> &[ParseError] {
        match self {
            Self::Success(_) => &[],
            Self::Failure(error) => std::slice::from_ref(error),
        }
    }

    pub fn into_result(self) -> Result<Node, ParseError> {
        self.into()
    }

    /// Returns the parsed tree.
    ///
    /// # Panics
    ///
    /// If the parse failed. Check [`ParseOutcome::is_success`] first, or use
    /// [`ParseOutcome::into_result`].
    #[track_caller]
    pub fn unwrap_root(self) -> Node {
        match self {
            Self::Success(node) => node,
            Self::Failure(error) => {
                panic!("cannot evaluate an expression that failed to parse: {error}")
            }
        }
    }
}

impl From<Result<Node, ParseError>> for ParseOutcome {
    fn from(result: Result<Node, ParseError>) -> Self {
        match result {
            Ok(node) => Self::Success(node),
            Err(error) => Self::Failure(error),
        }
    }
}

impl From<ParseOutcome> for Result<Node, ParseError> {
    fn from(outcome: ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Success(node) => Ok(node),
            ParseOutcome::Failure(error) => Err(error),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    /// Byte offset of the cursor into `input`.
    pos: usize,
    /// Character offset of the cursor, reported in errors.
    char_pos: usize,
    depth: usize,
    options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        Parser {
            input,
            pos: 0,
            char_pos: 0,
            depth: 0,
            options,
        }
    }

    #[inline]
    fn make_error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.char_pos, kind)
    }

    /// Error for the character under the cursor, or EOF.
    #[inline]
    fn unexpected(&self, expected: Expected) -> ParseError {
        self.make_error(ParseErrorKind::unexpected(expected, self.peek()))
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn advance(&mut self, current_char: char) {
        self.pos = self.pos.saturating_add(current_char.len_utf8());
        self.char_pos = self.char_pos.saturating_add(1);
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume `c` if it is the next character.
    fn consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance(c);
            true
        } else {
            false
        }
    }

    fn consume_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| is_ignored(*c)) {
            self.advance(c);
        }
    }

    /// Runs `f` one level deeper into the tree, enforcing the depth limit.
    fn nested<T>(&mut self, f: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.options.max_depth {
            return Err(self.make_error(ParseErrorKind::NestingTooDeep {
                limit: self.options.max_depth,
            }));
        }
        self.depth = self.depth.saturating_add(1);
        let result = f(self)?;
        self.depth = self.depth.saturating_sub(1);
        Ok(result)
    }

    fn parse_expression(&mut self) -> ParseResult<Node> {
        if let Some(limit) = self.options.max_length {
            if self.input.chars().count() > limit {
                return Err(ParseError::new(limit, ParseErrorKind::TooLong { limit }));
            }
        }

        let node = self.parse_or()?;
        self.consume_whitespace();
        if !self.eof() {
            return Err(self.unexpected(Expected::EndOfExpression));
        }
        Ok(node)
    }

    // Precedence: OR -> AND -> Term (group, negation, wildcards, word).
    // Chains are read in a loop and folded from the right, so `A,B,C` becomes
    // `Or(A, Or(B, C))` and a long flat chain never counts toward the depth.

    fn parse_or(&mut self) -> ParseResult<Node> {
        let first = self.parse_and()?;
        let mut rest = Vec::new();
        loop {
            self.consume_whitespace();
            if !self.consume(OR) {
                break;
            }
            rest.push(self.parse_and()?);
        }
        Ok(fold_right(first, rest, Node::or))
    }

    fn parse_and(&mut self) -> ParseResult<Node> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        loop {
            self.consume_whitespace();
            if !self.consume(AND) {
                break;
            }
            rest.push(self.parse_term()?);
        }
        Ok(fold_right(first, rest, Node::and))
    }

    fn parse_term(&mut self) -> ParseResult<Node> {
        self.consume_whitespace();
        match self.peek() {
            None => Err(self.unexpected(Expected::Term)),
            Some(OPEN_PAREN) => self.parse_parenthesis(),
            Some(NOT) => self.parse_negation(),
            Some(NOBODY) => {
                self.advance(NOBODY);
                Ok(Node::nobody())
            }
            Some(EVERYBODY) => {
                self.advance(EVERYBODY);
                Ok(Node::True)
            }
            Some(_) => self.parse_word(),
        }
    }

    fn parse_parenthesis(&mut self) -> ParseResult<Node> {
        self.advance(OPEN_PAREN);
        let node = self.nested(Self::parse_or)?;
        self.consume_whitespace();
        if !self.consume(CLOSE_PAREN) {
            return Err(self.unexpected(Expected::CloseParenthesis));
        }
        Ok(node)
    }

    // `!` applies to the single term that follows, never to a whole chain.
    fn parse_negation(&mut self) -> ParseResult<Node> {
        self.advance(NOT);
        let inner = self.nested(Self::parse_term)?;
        Ok(Node::negate(inner))
    }

    fn parse_word(&mut self) -> ParseResult<Node> {
        self.consume_whitespace();
        let mut value = String::new();
        while let Some(c) = self.peek().filter(|c| is_word_char(*c)) {
            value.push(c);
            self.advance(c);
        }
        if value.is_empty() {
            return Err(self.unexpected(Expected::Value));
        }
        Ok(Node::Word { value })
    }
}

/// Joins `first` and `rest` into a right-leaning chain: `[A, B, C]` gives
/// `combine(A, combine(B, C))`.
fn fold_right(first: Node, rest: Vec<Node>, combine: fn(Node, Node) -> Node) -> Node {
    let mut operands = rest.into_iter().rev();
    let Some(last) = operands.next() else {
        return first;
    };
    let right = operands.fold(last, |right, left| combine(left, right));
    combine(first, right)
}

/// Parses a tag expression with the default [`ParseOptions`].
///
/// Accepts either a `&str` or an `Option<&str>`; a missing expression fails
/// the same way an empty one does, with a single error at position 0.
///
/// # Example
///
/// ```rust
/// use tagexpr::parse;
///
/// let outcome = parse("PL.DOCTOR.!(DENTIST,physio).(VIP,PLUS)");
/// let root = outcome.root().unwrap();
/// assert!(root.evaluate(&["pl", "doctor", "plus"]));
/// assert!(!root.evaluate(&["pl", "doctor", "dentist", "plus"]));
///
/// let outcome = parse("ABC.");
/// assert_eq!(outcome.errors()[0].to_string(), r#"4: Expected "term" but found "EOF""#);
/// ```
pub fn parse<'a, E: Into<Option<&'a str>>>(expression: E) -> ParseOutcome {
    parse_with(expression, &ParseOptions::default())
}

/// Parses a tag expression, enforcing the limits in `options`.
pub fn parse_with<'a, E: Into<Option<&'a str>>>(
    expression: E,
    options: &ParseOptions,
) -> ParseOutcome {
    let expression: Option<&str> = expression.into();
    let expression = expression.unwrap_or_default();
    if expression.is_empty() {
        log::debug!("Rejected empty tag expression");
        return ParseOutcome::Failure(ParseError::new(0, ParseErrorKind::Empty));
    }

    let result = Parser::new(expression, options).parse_expression();
    if let Err(error) = &result {
        log::debug!("Failed to parse tag expression {expression:?}: {error}");
    }
    result.into()
}


/// Tests for the parser module via `parse`.
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // Helper macros for quick AST node creation in tests
    macro_rules! word {
        ($value:expr) => {
            Node::word($value)
        };
    }
    macro_rules! not {
        ($inner:expr) => {
            Node::negate($inner)
        };
    }
    macro_rules! and {
        ($left:expr, $right:expr) => {
            Node::and($left, $right)
        };
    }
    macro_rules! or {
        ($left:expr, $right:expr) => {
            Node::or($left, $right)
        };
    }

    fn parse_err(input: &str) -> ParseError {
        match parse(input) {
            ParseOutcome::Failure(error) => error,
            ParseOutcome::Success(node) => panic!("expected {input:?} to fail, parsed {node}"),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_everybody() {
        assert_eq!(parse("*"), ParseOutcome::Success(Node::True));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_nobody() {
        assert_eq!(parse("~"), ParseOutcome::Success(Node::nobody()));
        assert_eq!(parse("~").unwrap_root().to_string(), "!(1)");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_word_keeps_unreserved_punctuation() {
        let input = "Hello$World-gGuys@hello";
        assert_eq!(parse(input).unwrap_root(), word!(input));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_or_chain_leans_right() {
        assert_eq!(
            parse("A,B,C").unwrap_root(),
            or!(word!("A"), or!(word!("B"), word!("C")))
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_and_chain_leans_right() {
        assert_eq!(
            parse("A.B.C").unwrap_root(),
            and!(word!("A"), and!(word!("B"), word!("C")))
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            parse("A.B,C.D.E").unwrap_root(),
            or!(
                and!(word!("A"), word!("B")),
                and!(word!("C"), and!(word!("D"), word!("E")))
            )
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_negation_binds_to_one_term() {
        assert_eq!(
            parse("!A.B").unwrap_root(),
            and!(not!(word!("A")), word!("B"))
        );
        assert_eq!(
            parse("!(A.B)").unwrap_root(),
            not!(and!(word!("A"), word!("B")))
        );
        assert_eq!(parse("!!A").unwrap_root(), not!(not!(word!("A"))));
        assert_eq!(parse("! A").unwrap_root(), not!(word!("A")));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_parenthesis_override_precedence() {
        assert_eq!(
            parse("A.(B,C)").unwrap_root(),
            and!(word!("A"), or!(word!("B"), word!("C")))
        );
        assert_eq!(parse("((A))").unwrap_root(), word!("A"));
    }

    #[rstest]
    #[case("*,~")]
    #[case("  *  ,  ~   ")]
    #[case("  *  \n \r,  ~   \n \r \t")]
    #[ntest::timeout(100)]
    fn test_whitespace_is_insignificant(#[case] input: &str) {
        assert_eq!(parse(input).unwrap_root(), or!(Node::True, Node::nobody()));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_empty_and_missing_expression() {
        for outcome in [parse(""), parse(None::<&str>)] {
            assert!(!outcome.is_success());
            assert!(outcome.root().is_none());
            assert_eq!(outcome.errors(), &[ParseError::new(0, ParseErrorKind::Empty)]);
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_whitespace_only_expression() {
        let err = parse_err(" \t ");
        assert_eq!(err.position, 3);
        assert_eq!(
            err.kind,
            ParseErrorKind::unexpected(Expected::Term, None)
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unclosed_parenthesis() {
        let err = parse_err("ABC.(EFG");
        assert_eq!(err.position, 8);
        assert_eq!(
            err.kind,
            ParseErrorKind::unexpected(Expected::CloseParenthesis, None)
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unopened_parenthesis() {
        let err = parse_err("ABC.EFG)");
        assert_eq!(err.position, 7);
        assert_eq!(
            err.kind,
            ParseErrorKind::unexpected(Expected::EndOfExpression, Some(')'))
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_dangling_operator() {
        let err = parse_err("ABC.");
        assert_eq!(err.to_string(), r#"4: Expected "term" but found "EOF""#);

        let err = parse_err(".ABC");
        assert_eq!(err.to_string(), r#"0: Expected "value" but found ".""#);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_position_counts_characters() {
        let err = parse_err("ÄÖÜ.");
        assert_eq!(err.position, 4);
        let err = parse_err("日本 語");
        assert_eq!(err.position, 3);
        assert_eq!(
            err.kind,
            ParseErrorKind::unexpected(Expected::EndOfExpression, Some('語'))
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_depth_limit() {
        let options = ParseOptions::default().with_max_depth(3);
        assert!(parse_with("((A))", &options).is_success());

        let outcome = parse_with("((((A))))", &options);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.position, 4);
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { limit: 3 });

        assert!(parse_with("!!!A", &options).is_success());
        assert_eq!(
            parse_with("!!!!A", &options).errors(),
            &[ParseError::new(4, ParseErrorKind::NestingTooDeep { limit: 3 })]
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_flat_chains_ignore_depth_limit() {
        let options = ParseOptions::default().with_max_depth(1);
        assert_eq!(
            parse_with("A,B,C,D,E", &options).unwrap_root(),
            or!(
                word!("A"),
                or!(word!("B"), or!(word!("C"), or!(word!("D"), word!("E"))))
            )
        );
        assert_eq!(
            parse_with("A.B.C.D", &options).unwrap_root(),
            and!(word!("A"), and!(word!("B"), and!(word!("C"), word!("D"))))
        );
    }

    #[test]
    #[ntest::timeout(1000)]
    fn test_long_chains_with_default_options() {
        let words: Vec<String> = (0..1000).map(|i| format!("T{i}")).collect();

        let any = parse(words.join(",").as_str()).unwrap_root();
        assert!(any.evaluate(&["t999"]));
        assert!(any.evaluate(&["T0"]));
        assert!(!any.evaluate(&["T1000"]));

        let all = parse(words.join(" . ").as_str()).unwrap_root();
        assert!(all.evaluate(&words));
        assert!(!all.evaluate(words.get(1..).unwrap()));
    }

    #[test]
    #[ntest::timeout(1000)]
    fn test_default_depth_limit_rejects_deep_nesting() {
        let input = format!("{}A{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse(input.as_str()).into_result().unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::NestingTooDeep {
                limit: ParseOptions::DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_length_limit() {
        let options = ParseOptions::default().with_max_length(5);
        assert!(parse_with("A.B.C", &options).is_success());
        assert_eq!(
            parse_with("A.B.CD", &options).errors(),
            &[ParseError::new(5, ParseErrorKind::TooLong { limit: 5 })]
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_reparse_is_identical() {
        for input in ["PL.DOCTOR.!(DENTIST,physio).(VIP,PLUS)", "ABC.(E)).FG"] {
            assert_eq!(parse(input), parse(input));
        }
    }

    #[test]
    #[should_panic(expected = "cannot evaluate an expression that failed to parse")]
    fn test_unwrap_root_of_failure_panics() {
        let _ = parse("ABC.").unwrap_root();
    }
}
