//! Symbols and namespaces.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parse::ParseError;
use crate::wire::WireSymbol;

/// Partition of the symbol name space.
///
/// The empty namespace is the default for unqualified symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Namespace(Cow<'static, str>);

impl Namespace {
    /// Namespace of symbols written with a bare leading colon, as in
    /// Common Lisp keywords.
    pub const KEYWORD: Namespace = Namespace(Cow::Borrowed("keyword"));

    /// The empty namespace.
    pub const EMPTY: Namespace = Namespace(Cow::Borrowed(""));

    pub fn new(name: impl Into<String>) -> Self {
        Namespace(Cow::Owned(name.into()))
    }

    /// Creates a namespace from a static name without allocating.
    pub const fn from_static(name: &'static str) -> Self {
        Namespace(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_keyword(&self) -> bool {
        *self == Self::KEYWORD
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(value: &str) -> Self {
        Namespace::new(value)
    }
}

impl From<String> for Namespace {
    fn from(value: String) -> Self {
        Namespace(Cow::Owned(value))
    }
}

/// A namespaced identifier. Equality is structural over name and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "WireSymbol", from = "WireSymbol")]
pub struct Symbol {
    name: String,
    namespace: Namespace,
}

impl Symbol {
    pub fn new(name: impl Into<String>, namespace: impl Into<Namespace>) -> Self {
        Symbol {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Creates a symbol in the empty namespace.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            namespace: Namespace::EMPTY,
        }
    }

    /// Creates a symbol in the keyword namespace.
    pub fn keyword(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            namespace: Namespace::KEYWORD,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns this symbol moved into `namespace` if it is unqualified.
    pub fn qualified_or(&self, namespace: &Namespace) -> Symbol {
        if self.namespace.is_empty() {
            Symbol::new(self.name.clone(), namespace.clone())
        } else {
            self.clone()
        }
    }

    /// Returns the symbol as text that parses back into an equal symbol.
    pub fn expression_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else if self.namespace.is_keyword() {
            write!(f, ":{}", self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_symbol(s)
    }
}

/// Parses a symbol literal of the form `name`, `:name`, `ns:name` or
/// `ns::name`.
///
/// A literal starting with two colons is rejected; `::` only exists to
/// separate an explicit namespace from the name.
pub fn parse_symbol(literal: &str) -> Result<Symbol, ParseError> {
    let Some(colon) = literal.find(':') else {
        return Ok(Symbol::unqualified(literal));
    };

    let namespace = &literal[..colon];
    let rest = &literal[colon + 1..];
    let (double, name) = match rest.strip_prefix(':') {
        Some(name) => (true, name),
        None => (false, rest),
    };

    if namespace.is_empty() {
        if double {
            return Err(ParseError::BadSymbol {
                literal: literal.to_string(),
                reason: "symbol begins with two colons",
            });
        }
        return Ok(Symbol::keyword(name));
    }

    Ok(Symbol::new(name, namespace))
}
