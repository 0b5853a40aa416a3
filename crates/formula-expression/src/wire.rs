//! Wire form of expressions.
//!
//! The wire types mirror a structured message: an expression holds exactly
//! one value variant and an optional source context. Integer variants keep
//! the width and encoding they were written with; decoding collapses them
//! all into the one logical integer of [`Value`].
//!
//! ```json
//! {"value": {"list": {"elements": [
//!   {"value": {"symbol": {"name": "+"}}},
//!   {"value": {"int64": 1}}
//! ]}}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sexpr::{Expression, List, Value};
use crate::symbol::Symbol;

/// Errors that can occur while converting a wire expression.
#[derive(Debug, Clone, Error)]
pub enum WireError {
    #[error("unsupported wire expression: no value variant is set")]
    MissingValue,

    #[error("unsigned wire integer {value} does not fit in a signed 64-bit integer")]
    IntegerOutOfRange { value: u64 },

    #[error("error parsing list[{index}]: {source}")]
    ListElement {
        index: usize,
        #[source]
        source: Box<WireError>,
    },
}

/// Location in source text that an expression or AST node came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl SourceContext {
    pub fn new(line: u32, column: u32) -> Self {
        SourceContext {
            file: None,
            line,
            column,
        }
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// Wire form of an expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WireValue>,
}

/// The value variants of the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Sint32(i32),
    Sint64(i64),
    Fixed32(u32),
    Fixed64(u64),
    Sfixed32(i32),
    Sfixed64(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    Symbol(WireSymbol),
    List(WireList),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireSymbol {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireList {
    #[serde(default)]
    pub elements: Vec<WireExpression>,
}

impl Expression {
    /// Returns the wire form of this expression.
    pub fn to_wire(&self) -> WireExpression {
        WireExpression {
            source_context: self.source_context().cloned(),
            value: Some(wire_value(self.value())),
        }
    }

    /// Builds an expression from its wire form.
    pub fn from_wire(wire: WireExpression) -> Result<Expression, WireError> {
        let value = native_value(wire.value.ok_or(WireError::MissingValue)?)?;
        let expr = Expression::new(value);
        Ok(match wire.source_context {
            Some(ctx) => expr.with_source_context(ctx),
            None => expr,
        })
    }
}

impl Symbol {
    pub fn to_wire(&self) -> WireSymbol {
        WireSymbol {
            name: self.name().to_string(),
            namespace: self.namespace().as_str().to_string(),
        }
    }
}

impl From<WireSymbol> for Symbol {
    fn from(wire: WireSymbol) -> Self {
        Symbol::new(wire.name, wire.namespace)
    }
}

impl From<Symbol> for WireSymbol {
    fn from(sym: Symbol) -> Self {
        sym.to_wire()
    }
}

impl From<Expression> for WireExpression {
    fn from(expr: Expression) -> Self {
        expr.to_wire()
    }
}

impl TryFrom<WireExpression> for Expression {
    type Error = WireError;

    fn try_from(wire: WireExpression) -> Result<Self, Self::Error> {
        Expression::from_wire(wire)
    }
}

fn wire_value(value: &Value) -> WireValue {
    match value {
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Int(i) => WireValue::Int64(*i),
        Value::Double(d) => WireValue::Double(*d),
        Value::Float(x) => WireValue::Float(*x),
        Value::Bytes(bytes) => WireValue::Bytes(bytes.clone()),
        Value::String(s) => WireValue::String(s.clone()),
        Value::Symbol(sym) => WireValue::Symbol(sym.to_wire()),
        Value::List(list) => WireValue::List(WireList {
            elements: list.iter().map(Expression::to_wire).collect(),
        }),
    }
}

fn native_value(value: WireValue) -> Result<Value, WireError> {
    Ok(match value {
        WireValue::Bool(b) => Value::Bool(b),
        WireValue::Int32(i) | WireValue::Sint32(i) | WireValue::Sfixed32(i) => {
            Value::Int(i64::from(i))
        }
        WireValue::Int64(i) | WireValue::Sint64(i) | WireValue::Sfixed64(i) => Value::Int(i),
        WireValue::Uint32(u) | WireValue::Fixed32(u) => Value::Int(i64::from(u)),
        WireValue::Uint64(u) | WireValue::Fixed64(u) => Value::Int(
            i64::try_from(u).map_err(|_| WireError::IntegerOutOfRange { value: u })?,
        ),
        WireValue::Float(x) => Value::Float(x),
        WireValue::Double(d) => Value::Double(d),
        WireValue::Bytes(bytes) => Value::Bytes(bytes),
        WireValue::String(s) => Value::String(s),
        WireValue::Symbol(sym) => Value::Symbol(sym.into()),
        WireValue::List(list) => {
            let elems = list
                .elements
                .into_iter()
                .enumerate()
                .map(|(index, elem)| {
                    Expression::from_wire(elem).map_err(|err| WireError::ListElement {
                        index,
                        source: Box::new(err),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Value::List(List::new(elems))
        }
    })
}
