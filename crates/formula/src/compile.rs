//! Compiler from expressions to [`AstNode`] trees.

use std::fmt;

use rhizome_formula_bind::BindError;
use rhizome_formula_expression::{Expression, List, SourceContext, Symbol, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::AstNode;
use crate::env::{default_environment, Definition, LexicalEnvironment};
use crate::eval::Location;

/// Errors that can occur during compilation.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("{}unsupported form: empty list", Location(.at))]
    EmptyList { at: Option<SourceContext> },

    #[error("{}first element of a list must be a symbol, got {operator}", Location(.at))]
    OperatorNotSymbol {
        operator: String,
        at: Option<SourceContext>,
    },

    #[error("{}unsupported operator {operator} in form {form}", Location(.at))]
    UnresolvedOperator {
        operator: String,
        form: String,
        at: Option<SourceContext>,
    },

    #[error("{}unsupported literal of type {value_type}: {form}", Location(.at))]
    UnsupportedLiteral {
        value_type: &'static str,
        form: String,
        at: Option<SourceContext>,
    },

    #[error("error compiling funcall argument {index}: {source}")]
    FunctionArgument {
        index: usize,
        #[source]
        source: Box<CompileError>,
    },

    #[error("{}error parsing {form}: {source}", Location(.at))]
    BadSyntax {
        form: &'static str,
        at: Option<SourceContext>,
        #[source]
        source: BindError,
    },

    #[error("{}error parsing {form}: {message}", Location(.at))]
    Arity {
        form: &'static str,
        message: &'static str,
        at: Option<SourceContext>,
    },

    #[error("error parsing {form} {clause} clause: {source}")]
    Clause {
        form: &'static str,
        clause: &'static str,
        #[source]
        source: Box<CompileError>,
    },
}

/// State threaded through compilation; it changes as the tree is traversed.
#[derive(Debug, Clone)]
pub struct CompileContext {
    env: LexicalEnvironment,
    source_location: Option<SourceContext>,
}

impl CompileContext {
    pub fn new(env: LexicalEnvironment) -> Self {
        CompileContext {
            env,
            source_location: None,
        }
    }

    pub fn environment(&self) -> &LexicalEnvironment {
        &self.env
    }

    /// Location of the form being compiled.
    pub fn source_location(&self) -> Option<&SourceContext> {
        self.source_location.as_ref()
    }

    fn at(&self, form: &Expression) -> CompileContext {
        CompileContext {
            env: self.env.clone(),
            source_location: form
                .source_context()
                .cloned()
                .or_else(|| self.source_location.clone()),
        }
    }

    /// Builds a node carrying the source context of `form`.
    pub fn node(&self, form: &Expression, node: AstNode) -> AstNode {
        node.with_source_context(form.source_context().cloned())
    }

    /// Compiles `form` into a fresh tree.
    pub fn compile(&self, form: &Expression) -> Result<AstNode, CompileError> {
        let ctx = self.at(form);
        match form.value() {
            Value::Int(_)
            | Value::Double(_)
            | Value::Float(_)
            | Value::String(_) => ctx.compile_constant(form),
            Value::Bool(_) | Value::Bytes(_) => Err(CompileError::UnsupportedLiteral {
                value_type: form.value().type_name(),
                form: form.expression_string(),
                at: ctx.source_location,
            }),
            Value::Symbol(sym) => Ok(ctx.variable_ref(form, sym)),
            Value::List(list) => ctx.compile_list(form, list),
        }
    }

    fn compile_list(&self, form: &Expression, list: &List) -> Result<AstNode, CompileError> {
        let Some((head, args)) = list.as_slice().split_first() else {
            return Err(CompileError::EmptyList {
                at: self.source_location.clone(),
            });
        };
        let Some(operator) = head.symbol() else {
            return Err(CompileError::OperatorNotSymbol {
                operator: head.expression_string(),
                at: self.source_location.clone(),
            });
        };

        match self.env.resolve_operator(operator) {
            Some(Definition::SpecialForm(def)) => {
                trace!(operator = %operator, "compiling special form");
                def.compile(self, form)
            }
            Some(Definition::Function(_)) => {
                let function = self.variable_ref(head, operator);
                self.compile_funcall(form, function, args)
            }
            None => Err(CompileError::UnresolvedOperator {
                operator: operator.expression_string(),
                form: form.expression_string(),
                at: self.source_location.clone(),
            }),
        }
    }

    fn compile_funcall(
        &self,
        form: &Expression,
        function: AstNode,
        args: &[Expression],
    ) -> Result<AstNode, CompileError> {
        let positional_args = args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                self.compile(arg).map_err(|err| CompileError::FunctionArgument {
                    index,
                    source: Box::new(err),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.node(form, AstNode::funcall(function, positional_args)))
    }

    fn variable_ref(&self, form: &Expression, sym: &Symbol) -> AstNode {
        self.node(form, AstNode::variable(sym.clone()))
    }

    /// Wraps a freshly constructed copy of the literal, without the source
    /// context of the original.
    fn compile_constant(&self, form: &Expression) -> Result<AstNode, CompileError> {
        let value = match form.value() {
            Value::Int(i) => Expression::from_int(*i),
            Value::Double(d) => Expression::from_f64(*d),
            Value::Float(f) => Expression::from_f32(*f),
            Value::String(s) => Expression::from_string(s.as_str()),
            other => {
                return Err(CompileError::UnsupportedLiteral {
                    value_type: other.type_name(),
                    form: form.expression_string(),
                    at: self.source_location.clone(),
                });
            }
        };
        Ok(self.node(form, AstNode::constant(value)))
    }
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new(default_environment())
    }
}

/// The result of compiling one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    root: AstNode,
}

impl CompiledExpression {
    pub fn root(&self) -> &AstNode {
        &self.root
    }

    pub fn into_root(self) -> AstNode {
        self.root
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.root)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.root)
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json_pretty().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Compiles `expr` in the default environment.
pub fn compile(expr: &Expression) -> Result<CompiledExpression, CompileError> {
    compile_in(&default_environment(), expr)
}

/// Compiles `expr` in `env`.
pub fn compile_in(env: &LexicalEnvironment, expr: &Expression) -> Result<CompiledExpression, CompileError> {
    debug!(form = %expr, "compiling");
    let root = CompileContext::new(env.clone()).compile(expr)?;
    Ok(CompiledExpression { root })
}
