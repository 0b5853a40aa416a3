//! Implementations of the CLI subcommands.
//!
//! Each command takes S-expression source text and returns the text to
//! print, one line (or JSON document) per expression in the input.

use std::fs;
use std::io::Read;

use rhizome_formula::{compile, eval, CompileError, EvalError};
use rhizome_formula_expression::{parse_sexprs, Expression, ParseError, Value};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, OutputFormat};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("{value} has no JSON wire form")]
    NonFinite { value: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolves an input argument: `-` reads stdin, `@path` reads a file, and
/// anything else is the source text itself.
pub fn read_input(arg: &str) -> Result<String, CliError> {
    if arg == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    if let Some(path) = arg.strip_prefix('@') {
        return fs::read_to_string(path).map_err(|source| CliError::ReadInput {
            path: path.to_string(),
            source,
        });
    }
    Ok(arg.to_string())
}

fn parse_all(source: &str) -> Result<Vec<Expression>, CliError> {
    let exprs = parse_sexprs(source)?;
    debug!(count = exprs.len(), "parsed input");
    Ok(exprs)
}

fn to_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Text | OutputFormat::PrettyJson => serde_json::to_string_pretty(value)?,
    })
}

/// `formula print`: canonical re-print.
pub fn print(source: &str, format: OutputFormat) -> Result<String, CliError> {
    let exprs = parse_all(source)?;
    let lines = exprs
        .iter()
        .map(|expr| match format {
            OutputFormat::Text => Ok(expr.expression_string()),
            _ => to_json(&expr.expression_string(), format),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// `formula eval`: evaluate each expression in the default environment.
pub fn evaluate(source: &str, format: OutputFormat) -> Result<String, CliError> {
    let exprs = parse_all(source)?;
    let lines = exprs
        .iter()
        .map(|expr| {
            let value = Expression::new(eval(expr)?);
            match format {
                OutputFormat::Text => Ok(value.expression_string()),
                _ if !is_finite(value.value()) => Err(CliError::NonFinite {
                    value: value.expression_string(),
                }),
                _ => to_json(&value, format),
            }
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    Ok(lines.join("\n"))
}

/// JSON has no encoding for infinities or NaN; serde_json writes `null`.
fn is_finite(value: &Value) -> bool {
    match value {
        Value::Double(d) => d.is_finite(),
        Value::Float(x) => x.is_finite(),
        Value::List(list) => list.iter().all(|expr| is_finite(expr.value())),
        _ => true,
    }
}

/// `formula compile`: the AST of each expression as JSON.
pub fn compile_ast(source: &str, format: OutputFormat) -> Result<String, CliError> {
    let exprs = parse_all(source)?;
    let docs = exprs
        .iter()
        .map(|expr| to_json(compile(expr)?.root(), format))
        .collect::<Result<Vec<_>, CliError>>()?;
    Ok(docs.join("\n"))
}

/// `formula wire`: the wire form of each expression as JSON.
pub fn wire(source: &str, format: OutputFormat) -> Result<String, CliError> {
    let exprs = parse_all(source)?;
    let docs = exprs
        .iter()
        .map(|expr| to_json(&expr.to_wire(), format))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(docs.join("\n"))
}
