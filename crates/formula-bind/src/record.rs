//! Positional record binders.
//!
//! A [`RecordBinder`] is compiled once per record type from its field
//! declarations and reused for every bind against that type. The
//! [`bind_record!`](crate::bind_record) macro declares a struct and caches
//! its binder in a `OnceLock`.

use rhizome_formula_expression::{parse_sexpr, Expression, Symbol, Value};
use tracing::debug;

use crate::binder::{BindError, Binder};

/// Field-level annotation marking the field that collects trailing elements.
pub const REST_MARKER: &str = "&rest";

/// Where a field's value comes from in the source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub position: usize,
    /// Collect every element from `position` to the end of the list.
    pub rest: bool,
}

impl FieldSpec {
    /// Derives the spec for the field declared at offset `declared`.
    ///
    /// An absent or empty annotation uses the declaration order. Otherwise the
    /// annotation is read as an S-expression that must be a non-negative
    /// integer (explicit position) or the symbol `&rest`.
    pub fn from_annotation(
        field: &'static str,
        declared: usize,
        annotation: Option<&str>,
    ) -> Result<FieldSpec, BindError> {
        let annotation = match annotation.map(str::trim) {
            None | Some("") => {
                return Ok(FieldSpec {
                    position: declared,
                    rest: false,
                });
            }
            Some(text) => text,
        };
        let parsed = parse_sexpr(annotation)
            .map_err(|source| BindError::BadAnnotation { field, source })?;
        let invalid = || BindError::InvalidAnnotation {
            field,
            annotation: annotation.to_string(),
        };

        match parsed.value() {
            Value::Int(position) => Ok(FieldSpec {
                position: usize::try_from(*position).map_err(|_| invalid())?,
                rest: false,
            }),
            Value::Symbol(sym) if *sym == Symbol::unqualified(REST_MARKER) => Ok(FieldSpec {
                position: declared,
                rest: true,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Sets one field of `T` from an expression.
pub type FieldSetter<T> = fn(&Expression, &mut T, &Binder) -> Result<(), BindError>;

/// A field as declared on a record type.
pub struct FieldDecl<T> {
    pub name: &'static str,
    pub annotation: Option<&'static str>,
    pub setter: FieldSetter<T>,
}

struct FieldBinder<T> {
    name: &'static str,
    spec: FieldSpec,
    setter: FieldSetter<T>,
}

/// Compiled positional binder for a record type.
pub struct RecordBinder<T> {
    record: &'static str,
    fields: Vec<FieldBinder<T>>,
    min_len: usize,
    max_len: Option<usize>,
}

impl<T> RecordBinder<T> {
    /// Compiles the binder for `record` from its fields in declaration order.
    pub fn compile(record: &'static str, decls: Vec<FieldDecl<T>>) -> Result<Self, BindError> {
        let mut fields = Vec::with_capacity(decls.len());
        let mut min_len = 0;
        let mut has_rest = false;

        for (declared, decl) in decls.into_iter().enumerate() {
            let spec = FieldSpec::from_annotation(decl.name, declared, decl.annotation)?;
            let needed = if spec.rest {
                if has_rest {
                    return Err(BindError::DuplicateRest {
                        record,
                        field: decl.name,
                    });
                }
                has_rest = true;
                spec.position
            } else {
                spec.position + 1
            };
            min_len = min_len.max(needed);
            fields.push(FieldBinder {
                name: decl.name,
                spec,
                setter: decl.setter,
            });
        }

        let max_len = (!has_rest).then_some(min_len);
        debug!(record, min_len, ?max_len, "compiled record binder");
        Ok(RecordBinder {
            record,
            fields,
            min_len,
            max_len,
        })
    }

    pub fn record_name(&self) -> &'static str {
        self.record
    }

    /// Smallest list length this record accepts.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Largest list length this record accepts, or `None` with a `&rest` field.
    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    /// Field names and specs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldSpec)> + '_ {
        self.fields.iter().map(|field| (field.name, field.spec))
    }

    /// Binds the list `expr` into `dst` field by field.
    pub fn bind(&self, expr: &Expression, dst: &mut T, binder: &Binder) -> Result<(), BindError> {
        let Some(list) = expr.as_list() else {
            return Err(BindError::NotAList {
                destination: self.record,
                expression: expr.expression_string(),
            });
        };

        let got = list.len();
        if got < self.min_len {
            return Err(BindError::TooShort {
                record: self.record,
                got,
                min: self.min_len,
                expression: expr.expression_string(),
            });
        }
        if let Some(max) = self.max_len {
            if got > max {
                return Err(BindError::TooLong {
                    record: self.record,
                    got,
                    max,
                    expression: expr.expression_string(),
                });
            }
        }

        for field in &self.fields {
            let index = field.spec.position;
            let result = if field.spec.rest {
                let rest = Expression::from_list(list.tail(index));
                (field.setter)(&rest, dst, binder)
            } else {
                let Some(elem) = list.nth(index) else {
                    return Err(BindError::IndexOutOfBounds {
                        record: self.record,
                        field: field.name,
                        index,
                        expression: expr.expression_string(),
                    });
                };
                (field.setter)(elem, dst, binder)
            };
            result.map_err(|err| BindError::Field {
                record: self.record,
                field: field.name,
                index,
                source: Box::new(err),
            })?;
        }
        Ok(())
    }
}

/// Declares a struct whose fields bind positionally from a list expression.
///
/// Each field binds from the list element at its declaration index unless an
/// annotation follows its type with `as`: an integer literal gives an
/// explicit position and `"&rest"` collects the remaining elements.
///
/// ```
/// use rhizome_formula_bind::{bind_new, bind_record};
/// use rhizome_formula_expression::must_parse;
///
/// bind_record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Pair {
///         pub first: String,
///         pub third: String as "2",
///     }
/// }
///
/// let pair: Pair = bind_new(&must_parse(r#"("a" "b" "c")"#)).unwrap();
/// assert_eq!(pair, Pair { first: "a".into(), third: "c".into() });
/// ```
#[macro_export]
macro_rules! bind_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(as $annotation:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Bindable for $name {
            fn bind_composite(
                expr: &$crate::Expression,
                dst: &mut Self,
                binder: &$crate::Binder,
            ) -> ::std::option::Option<::std::result::Result<(), $crate::BindError>> {
                static SHAPE: ::std::sync::OnceLock<
                    ::std::result::Result<$crate::RecordBinder<$name>, $crate::BindError>,
                > = ::std::sync::OnceLock::new();

                let shape = SHAPE.get_or_init(|| {
                    $crate::RecordBinder::compile(
                        ::std::stringify!($name),
                        ::std::vec![
                            $(
                                $crate::FieldDecl::<$name> {
                                    name: ::std::stringify!($field),
                                    annotation: $crate::bind_record!(@annotation $($annotation)?),
                                    setter: |expr, dst, binder| binder.bind(expr, &mut dst.$field),
                                },
                            )*
                        ],
                    )
                });
                ::std::option::Option::Some(match shape {
                    ::std::result::Result::Ok(shape) => shape.bind(expr, dst, binder),
                    ::std::result::Result::Err(err) => ::std::result::Result::Err(err.clone()),
                })
            }
        }
    };

    (@annotation) => {
        ::std::option::Option::None
    };
    (@annotation $annotation:literal) => {
        ::std::option::Option::Some($annotation)
    };
}
