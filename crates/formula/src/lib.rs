//! Formula: a small expression language over S-expressions.
//!
//! Expressions can be evaluated directly with [`eval`] or lowered to an
//! [`AstNode`] tree with [`compile`] for downstream code generation. Both
//! resolve operators through a [`LexicalEnvironment`]; the default one holds
//! the builtin functions (`+`, `-`) and the `if` special form.
//!
//! ```
//! use rhizome_formula::{compile, eval};
//! use rhizome_formula_expression::{must_parse, Value};
//!
//! assert_eq!(eval(&must_parse("(+ 1 (- 5 2))")).unwrap(), Value::Int(4));
//!
//! let compiled = compile(&must_parse("(if x (+ 1 2) 0)")).unwrap();
//! assert!(compiled.to_json().unwrap().contains("if_else"));
//! ```

mod ast;
mod builtins;
mod compile;
mod env;
mod eval;
mod special_forms;

pub use ast::{AstKind, AstNode};
pub use builtins::{builtin_functions, normalize_number, Normalized, Number};
pub use compile::{compile, compile_in, CompileContext, CompileError, CompiledExpression};
pub use env::{
    default_environment, normalize_symbol, BindingKind, Definition, FunctionDef, FunctionImpl,
    LexicalEnvironment, SpecialFormCompiler, SpecialFormDef, NAMESPACE,
};
pub use eval::{eval, eval_in, EvalContext, EvalError};
pub use special_forms::special_forms;
