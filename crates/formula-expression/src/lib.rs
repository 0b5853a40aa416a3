//! S-expression values for Formula.
//!
//! This crate defines the expression model shared by the binder, the
//! evaluator, and the compiler:
//!
//! - [`Symbol`] and [`Namespace`]: namespaced identifiers
//! - [`List`]: an immutable sequence of expressions
//! - [`Expression`]: a closed union over scalars, symbols, and lists
//! - the wire form ([`WireExpression`]) used to persist expressions
//! - the reader that turns text into [`Form`]s, and the conversion from
//!   forms into expressions
//!
//! Example:
//! ```
//! use rhizome_formula_expression::parse_sexpr;
//!
//! let expr = parse_sexpr("(+ 4 (* 2.5 -3e5))").unwrap();
//! assert_eq!(expr.expression_string(), "(+ 4 (* 2.5 -300000))");
//! ```

mod parse;
pub mod reader;
mod sexpr;
mod symbol;
pub mod wire;

pub use parse::{expression_from_form, must_parse, parse_sexpr, parse_sexprs, ParseError};
pub use reader::{read_form, read_forms, Form, FormKind, NumberClass, ReadError};
pub use sexpr::{Expression, List, Value};
pub use symbol::{parse_symbol, Namespace, Symbol};
pub use wire::{SourceContext, WireError, WireExpression, WireList, WireSymbol, WireValue};

#[cfg(test)]
mod tests;
