//! Expression values.

use std::fmt;
use std::num::TryFromIntError;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;
use crate::wire::{SourceContext, WireExpression};

/// The native value held by an [`Expression`].
///
/// Every integer width read from the wire form collapses into
/// [`Value::Int`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    Float(f32),
    Bytes(Vec<u8>),
    String(String),
    Symbol(Symbol),
    List(List),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int64",
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
        }
    }

    /// Returns true for the integer and floating point variants.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) if use_exponent(d.abs()) => write!(f, "{d:e}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Float(x) if use_exponent(f64::from(x.abs())) => write!(f, "{x:e}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bytes(bytes) => {
                f.write_str("[")?;
                for (idx, byte) in bytes.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{byte}")?;
                }
                f.write_str("]")
            }
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(sym) => write!(f, "{sym}"),
            Value::List(list) => write!(f, "{list}"),
        }
    }
}

/// Very large and very small magnitudes print in exponent form, so that
/// they read back as floats.
fn use_exponent(magnitude: f64) -> bool {
    magnitude.is_finite() && (magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-4))
}

/// An ordered, immutable sequence of expressions.
///
/// Cloning a list shares its elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    elems: Arc<[Expression]>,
}

impl List {
    pub fn new(elems: Vec<Expression>) -> Self {
        List {
            elems: elems.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Returns the element at offset `n`.
    pub fn nth(&self, n: usize) -> Option<&Expression> {
        self.elems.get(n)
    }

    pub fn as_slice(&self) -> &[Expression] {
        &self.elems
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expression> {
        self.elems.iter()
    }

    /// Returns a fresh list holding the elements from offset `start` to the end.
    pub fn tail(&self, start: usize) -> List {
        let start = start.min(self.elems.len());
        List::new(self.elems[start..].to_vec())
    }

    pub fn expression_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (idx, elem) in self.elems.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{elem}")?;
        }
        f.write_str(")")
    }
}

impl FromIterator<Expression> for List {
    fn from_iter<I: IntoIterator<Item = Expression>>(iter: I) -> Self {
        List::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Expression;
    type IntoIter = std::slice::Iter<'a, Expression>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

/// A parsed expression: a native [`Value`] plus the source location it
/// was read from, if any.
///
/// Equality is structural and ignores source locations. The wire form is
/// regenerated on demand by [`Expression::to_wire`], so the two never
/// disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "WireExpression", try_from = "WireExpression")]
pub struct Expression {
    value: Value,
    source: Option<SourceContext>,
}

impl Expression {
    pub fn new(value: Value) -> Self {
        Expression {
            value,
            source: None,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Self::new(Value::Bool(value))
    }

    pub fn from_int(value: i64) -> Self {
        Self::new(Value::Int(value))
    }

    pub fn from_f64(value: f64) -> Self {
        Self::new(Value::Double(value))
    }

    pub fn from_f32(value: f32) -> Self {
        Self::new(Value::Float(value))
    }

    pub fn from_bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::new(Value::Bytes(value.into()))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self::new(Value::String(value.into()))
    }

    pub fn from_symbol(value: Symbol) -> Self {
        Self::new(Value::Symbol(value))
    }

    pub fn from_list(value: List) -> Self {
        Self::new(Value::List(value))
    }

    /// Attaches the location this expression was read from.
    pub fn with_source_context(mut self, source: SourceContext) -> Self {
        self.source = Some(source);
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn source_context(&self) -> Option<&SourceContext> {
        self.source.as_ref()
    }

    /// Returns the symbol if this expression is a symbol.
    pub fn symbol(&self) -> Option<&Symbol> {
        match &self.value {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// Returns the list if this expression is a list.
    pub fn as_list(&self) -> Option<&List> {
        match &self.value {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the expression as text that the reader accepts.
    pub fn expression_string(&self) -> String {
        self.value.to_string()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// The empty list.
impl Default for Expression {
    fn default() -> Self {
        Self::from_list(List::default())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::new(value)
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::from_bool(value)
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Expression::from_int(i64::from(value))
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::from_int(value)
    }
}

impl From<u32> for Expression {
    fn from(value: u32) -> Self {
        Expression::from_int(i64::from(value))
    }
}

impl TryFrom<u64> for Expression {
    type Error = TryFromIntError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Expression::from_int)
    }
}

impl From<f32> for Expression {
    fn from(value: f32) -> Self {
        Expression::from_f32(value)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::from_f64(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::from_string(value)
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::from_string(value)
    }
}

impl From<Symbol> for Expression {
    fn from(value: Symbol) -> Self {
        Expression::from_symbol(value)
    }
}

impl From<List> for Expression {
    fn from(value: List) -> Self {
        Expression::from_list(value)
    }
}

impl From<Vec<Expression>> for Expression {
    fn from(value: Vec<Expression>) -> Self {
        Expression::from_list(List::new(value))
    }
}
