//! Tree-walking evaluator.

use std::fmt;

use rhizome_formula_expression::{Expression, SourceContext, Value};
use thiserror::Error;
use tracing::trace;

use crate::env::{default_environment, LexicalEnvironment};

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("{}unsupported form: empty list", Location(.at))]
    EmptyList { at: Option<SourceContext> },

    #[error("{}first element of a list must be a symbol, got {operator}", Location(.at))]
    OperatorNotSymbol {
        operator: String,
        at: Option<SourceContext>,
    },

    #[error("{}failed to resolve function {operator}", Location(.at))]
    UnresolvedFunction {
        operator: String,
        at: Option<SourceContext>,
    },

    #[error("{}unsupported expression: {expression}", Location(.at))]
    UnsupportedExpression {
        expression: String,
        at: Option<SourceContext>,
    },

    #[error("{}invalid type for argument to {function}: {value} ({value_type})", Location(.at))]
    InvalidArgument {
        function: String,
        value: String,
        value_type: &'static str,
        at: Option<SourceContext>,
    },

    #[error("{}integer overflow in {function}", Location(.at))]
    IntegerOverflow {
        function: String,
        at: Option<SourceContext>,
    },

    #[error("error evaluating argument {index} of {operator}: {source}")]
    Argument {
        operator: String,
        index: usize,
        #[source]
        source: Box<EvalError>,
    },

    #[error("{0}")]
    Custom(String),
}

/// Prefixes an error message with its source location, if known.
pub(crate) struct Location<'a>(pub(crate) &'a Option<SourceContext>);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(at) => write!(f, "{at}: "),
            None => Ok(()),
        }
    }
}

/// State passed to functions during evaluation.
#[derive(Debug, Clone)]
pub struct EvalContext {
    env: LexicalEnvironment,
    /// Location of the form being evaluated.
    source_location: Option<SourceContext>,
}

impl EvalContext {
    pub fn new(env: LexicalEnvironment) -> Self {
        EvalContext {
            env,
            source_location: None,
        }
    }

    pub fn environment(&self) -> &LexicalEnvironment {
        &self.env
    }

    pub fn source_location(&self) -> Option<&SourceContext> {
        self.source_location.as_ref()
    }

    fn at(&self, form: &Expression) -> EvalContext {
        EvalContext {
            env: self.env.clone(),
            source_location: form
                .source_context()
                .cloned()
                .or_else(|| self.source_location.clone()),
        }
    }

    /// Builds an [`EvalError::InvalidArgument`] at the current location.
    pub fn invalid_argument(&self, function: &str, value: &Value) -> EvalError {
        EvalError::InvalidArgument {
            function: function.to_string(),
            value: value.to_string(),
            value_type: value.type_name(),
            at: self.source_location.clone(),
        }
    }

    /// Builds an [`EvalError::IntegerOverflow`] at the current location.
    pub fn integer_overflow(&self, function: &str) -> EvalError {
        EvalError::IntegerOverflow {
            function: function.to_string(),
            at: self.source_location.clone(),
        }
    }

    /// Evaluates `expr` in this context's environment.
    pub fn eval(&self, expr: &Expression) -> Result<Value, EvalError> {
        let ctx = self.at(expr);
        match expr.value() {
            Value::Int(_)
            | Value::Double(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Bytes(_) => Ok(expr.value().clone()),
            Value::List(list) => {
                let Some((head, args)) = list.as_slice().split_first() else {
                    return Err(EvalError::EmptyList {
                        at: ctx.source_location,
                    });
                };
                let Some(operator) = head.symbol() else {
                    return Err(EvalError::OperatorNotSymbol {
                        operator: head.expression_string(),
                        at: ctx.source_location,
                    });
                };
                let Some(function) = ctx.env.resolve_function(operator) else {
                    return Err(EvalError::UnresolvedFunction {
                        operator: operator.expression_string(),
                        at: ctx.source_location,
                    });
                };
                trace!(operator = %operator, args = args.len(), "calling function");

                let values = args
                    .iter()
                    .enumerate()
                    .map(|(index, arg)| {
                        ctx.eval(arg).map_err(|err| EvalError::Argument {
                            operator: operator.expression_string(),
                            index,
                            source: Box::new(err),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                function.call(&ctx, &values)
            }
            Value::Bool(_) | Value::Symbol(_) => Err(EvalError::UnsupportedExpression {
                expression: expr.expression_string(),
                at: ctx.source_location,
            }),
        }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new(default_environment())
    }
}

/// Evaluates `expr` in the default environment.
pub fn eval(expr: &Expression) -> Result<Value, EvalError> {
    EvalContext::default().eval(expr)
}

/// Evaluates `expr` in `env`.
pub fn eval_in(env: &LexicalEnvironment, expr: &Expression) -> Result<Value, EvalError> {
    EvalContext::new(env.clone()).eval(expr)
}
