mod ast;
mod error;
mod expression;
mod interface;
mod parser;
mod registry;

// Public exports.
pub use ast::Node;
pub use error::{Expected, Found, ParseError, ParseErrorKind, TagExprError, TagExprResult};
pub use expression::Expression;
pub use interface::{PluginGate, TagList};
pub use parser::{ParseOptions, ParseOutcome, parse, parse_with};
pub use registry::PluginRegistry;
