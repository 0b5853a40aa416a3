//! Conversion from forms to expressions.

use std::str::FromStr;

use thiserror::Error;
use tracing::trace;

use crate::reader::{read_form, read_forms, Form, FormKind, NumberClass, ReadError};
use crate::sexpr::{Expression, List};
use crate::symbol::parse_symbol;
use crate::wire::SourceContext;

/// Errors that can occur while parsing S-expression text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("error reading S-expression: {0}")]
    Read(#[from] ReadError),

    #[error("bad symbol {literal:?}: {reason}")]
    BadSymbol {
        literal: String,
        reason: &'static str,
    },

    #[error("{at}: unsupported number value: {literal}")]
    UnsupportedNumber { literal: String, at: SourceContext },

    #[error("{at}: error parsing form[{index}]: {source}")]
    ListElement {
        index: usize,
        at: SourceContext,
        #[source]
        source: Box<ParseError>,
    },
}

/// Converts a form produced by the reader into an expression.
pub fn expression_from_form(form: &Form) -> Result<Expression, ParseError> {
    let expr = match &form.kind {
        FormKind::String(s) => Expression::from_string(s.as_str()),
        FormKind::Number { literal, class } => number_expression(literal, *class, &form.position)?,
        FormKind::Symbol(literal) => Expression::from_symbol(parse_symbol(literal)?),
        FormKind::List(subforms) => {
            let elems = subforms
                .iter()
                .enumerate()
                .map(|(index, subform)| {
                    expression_from_form(subform).map_err(|err| ParseError::ListElement {
                        index,
                        at: subform.position.clone(),
                        source: Box::new(err),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Expression::from_list(List::new(elems))
        }
    };
    Ok(expr.with_source_context(form.position.clone()))
}

fn number_expression(
    literal: &str,
    class: NumberClass,
    at: &SourceContext,
) -> Result<Expression, ParseError> {
    let unsupported = || ParseError::UnsupportedNumber {
        literal: literal.to_string(),
        at: at.clone(),
    };
    match class {
        NumberClass::Integer => literal
            .parse::<i64>()
            .map(Expression::from_int)
            .map_err(|_| unsupported()),
        NumberClass::Float => literal
            .parse::<f64>()
            .map(Expression::from_f64)
            .map_err(|_| unsupported()),
    }
}

/// Parses a single S-expression.
pub fn parse_sexpr(text: &str) -> Result<Expression, ParseError> {
    expression_from_form(&read_form(text)?)
}

/// Parses every S-expression in `text`.
pub fn parse_sexprs(text: &str) -> Result<Vec<Expression>, ParseError> {
    let forms = read_forms(text)?;
    trace!(count = forms.len(), "read forms");
    forms.iter().map(expression_from_form).collect()
}

/// Parses an S-expression or panics.
///
/// Only for trusted literals in tests and bootstrapping code.
pub fn must_parse(text: &str) -> Expression {
    match parse_sexpr(text) {
        Ok(expr) => expr,
        Err(err) => panic!("failed to parse {text:?}: {err}"),
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sexpr(s)
    }
}
