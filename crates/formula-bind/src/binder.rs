//! Binder registry and the binding rules.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use rhizome_formula_expression::{Expression, List, ParseError, Symbol, Value};
use thiserror::Error;

/// Errors that can occur while binding an expression.
#[derive(Debug, Clone, Error)]
pub enum BindError {
    #[error(
        "destination type {destination} cannot be bound by expression {expression} (with value type {value_type})"
    )]
    NotSupported {
        destination: &'static str,
        value_type: &'static str,
        expression: String,
    },

    #[error("cannot bind {destination} from a non-list expression, got {expression}")]
    NotAList {
        destination: &'static str,
        expression: String,
    },

    #[error("cannot destructure expression into {record}: got length {got}, want >={min}: {expression}")]
    TooShort {
        record: &'static str,
        got: usize,
        min: usize,
        expression: String,
    },

    #[error("cannot destructure expression into {record}: got length {got}, want <={max}: {expression}")]
    TooLong {
        record: &'static str,
        got: usize,
        max: usize,
        expression: String,
    },

    #[error("cannot set field {field:?} of {record}; index {index} out of bounds for expression {expression}")]
    IndexOutOfBounds {
        record: &'static str,
        field: &'static str,
        index: usize,
        expression: String,
    },

    #[error("field {field:?} of {record} cannot be &rest; there is already a &rest field")]
    DuplicateRest {
        record: &'static str,
        field: &'static str,
    },

    #[error("bad binding annotation for field {field:?}: {source}")]
    BadAnnotation {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("binding annotation {annotation:?} for field {field:?} must be a non-negative integer or &rest")]
    InvalidAnnotation {
        field: &'static str,
        annotation: String,
    },

    #[error("cannot set field {field:?} of {record} from value[{index}] of list: {source}")]
    Field {
        record: &'static str,
        field: &'static str,
        index: usize,
        #[source]
        source: Box<BindError>,
    },

    #[error("failed to bind element [{index}] of {destination}: {source}")]
    Element {
        destination: &'static str,
        index: usize,
        #[source]
        source: Box<BindError>,
    },

    #[error("association list length must be even, got {len}: {expression}")]
    OddAssociationList { len: usize, expression: String },

    #[error("{0}")]
    Custom(String),
}

/// A destination type the binder can fill.
///
/// Scalar destinations only need an empty impl; the binder assigns them
/// directly when the expression's value has the same type. Types with
/// structure override [`Bindable::bind_composite`].
pub trait Bindable: Any {
    /// Binds `expr` into `dst` when direct assignment does not apply.
    ///
    /// Returns `None` when the type has no structured binding.
    fn bind_composite(
        expr: &Expression,
        dst: &mut Self,
        binder: &Binder,
    ) -> Option<Result<(), BindError>> {
        let _ = (expr, dst, binder);
        None
    }
}

macro_rules! impl_bindable_scalar {
    ($($ty:ty),* $(,)?) => {
        $(impl Bindable for $ty {})*
    };
}

impl_bindable_scalar!(bool, i64, f64, f32, u8, String, Symbol, List, Expression);

impl<T: Bindable + Default> Bindable for Vec<T> {
    fn bind_composite(
        expr: &Expression,
        dst: &mut Self,
        binder: &Binder,
    ) -> Option<Result<(), BindError>> {
        Some(bind_sequence(expr, dst, binder))
    }
}

impl<T: Bindable + Default> Bindable for Option<T> {
    fn bind_composite(
        expr: &Expression,
        dst: &mut Self,
        binder: &Binder,
    ) -> Option<Result<(), BindError>> {
        let mut pointee = T::default();
        Some(binder.bind(expr, &mut pointee).map(|()| {
            *dst = Some(pointee);
        }))
    }
}

impl<T: Bindable + Default> Bindable for Box<T> {
    fn bind_composite(
        expr: &Expression,
        dst: &mut Self,
        binder: &Binder,
    ) -> Option<Result<(), BindError>> {
        let mut pointee = T::default();
        Some(binder.bind(expr, &mut pointee).map(|()| {
            *dst = Box::new(pointee);
        }))
    }
}

fn bind_sequence<T: Bindable + Default>(
    expr: &Expression,
    dst: &mut Vec<T>,
    binder: &Binder,
) -> Result<(), BindError> {
    let Some(list) = expr.as_list() else {
        return Err(BindError::NotAList {
            destination: type_name::<Vec<T>>(),
            expression: expr.expression_string(),
        });
    };
    let mut out = Vec::with_capacity(list.len());
    for (index, elem) in list.iter().enumerate() {
        let mut slot = T::default();
        binder
            .bind(elem, &mut slot)
            .map_err(|err| BindError::Element {
                destination: type_name::<Vec<T>>(),
                index,
                source: Box::new(err),
            })?;
        out.push(slot);
    }
    *dst = out;
    Ok(())
}

type CustomBinder = Box<dyn Fn(&Expression, &mut dyn Any) -> Result<(), BindError> + Send + Sync>;

/// Registry of custom binders plus the binding rules.
///
/// [`Binder::new`] registers the opaque expression binders, which store the
/// expression itself for `Expression`, `Box<Expression>` and
/// `Option<Box<Expression>>` destinations.
pub struct Binder {
    custom: HashMap<TypeId, (&'static str, CustomBinder)>,
}

impl Binder {
    pub fn new() -> Self {
        let mut binder = Self::empty();
        binder.register::<Expression, _>(|expr, dst| {
            *dst = expr.clone();
            Ok(())
        });
        binder.register::<Box<Expression>, _>(|expr, dst| {
            *dst = Box::new(expr.clone());
            Ok(())
        });
        binder.register::<Option<Box<Expression>>, _>(|expr, dst| {
            *dst = Some(Box::new(expr.clone()));
            Ok(())
        });
        binder
    }

    /// Creates a binder with no custom binders.
    pub fn empty() -> Self {
        Binder {
            custom: HashMap::new(),
        }
    }

    /// Registers a custom binder for destinations of type `T`, replacing any
    /// previous one.
    pub fn register<T, F>(&mut self, bind: F)
    where
        T: Any,
        F: Fn(&Expression, &mut T) -> Result<(), BindError> + Send + Sync + 'static,
    {
        let erased: CustomBinder = Box::new(move |expr: &Expression, dst: &mut dyn Any| match dst.downcast_mut::<T>() {
            Some(dst) => bind(expr, dst),
            None => Err(BindError::Custom(format!(
                "custom binder for {} received a different destination type",
                type_name::<T>()
            ))),
        });
        self.custom
            .insert(TypeId::of::<T>(), (type_name::<T>(), erased));
    }

    /// Returns true if a custom binder is registered for `T`.
    pub fn has_custom<T: Any>(&self) -> bool {
        self.custom.contains_key(&TypeId::of::<T>())
    }

    /// Binds `expr` into `dst`.
    pub fn bind<T: Bindable>(&self, expr: &Expression, dst: &mut T) -> Result<(), BindError> {
        if let Some((_, custom)) = self.custom.get(&TypeId::of::<T>()) {
            return custom(expr, dst as &mut dyn Any);
        }
        if assign_native(expr.value(), &mut *dst) {
            return Ok(());
        }
        match T::bind_composite(expr, dst, self) {
            Some(result) => result,
            None => Err(BindError::NotSupported {
                destination: type_name::<T>(),
                value_type: expr.value().type_name(),
                expression: expr.expression_string(),
            }),
        }
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.custom.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("Binder").field("custom", &names).finish()
    }
}

/// Assigns the native value to `dst` if `dst` has exactly its type.
fn assign_native(value: &Value, dst: &mut dyn Any) -> bool {
    match value {
        Value::Bool(b) => assign(dst, b),
        Value::Int(i) => assign(dst, i),
        Value::Double(d) => assign(dst, d),
        Value::Float(x) => assign(dst, x),
        Value::Bytes(bytes) => assign(dst, bytes),
        Value::String(s) => assign(dst, s),
        Value::Symbol(sym) => assign(dst, sym),
        Value::List(list) => assign(dst, list),
    }
}

fn assign<V: Any + Clone>(dst: &mut dyn Any, value: &V) -> bool {
    match dst.downcast_mut::<V>() {
        Some(slot) => {
            *slot = value.clone();
            true
        }
        None => false,
    }
}

fn default_binder() -> &'static Binder {
    static DEFAULT: OnceLock<Binder> = OnceLock::new();
    DEFAULT.get_or_init(Binder::new)
}

/// Binds `expr` into `dst` using the default registry.
pub fn bind<T: Bindable>(expr: &Expression, dst: &mut T) -> Result<(), BindError> {
    default_binder().bind(expr, dst)
}

/// Binds `expr` into a freshly defaulted `T` using the default registry.
pub fn bind_new<T: Bindable + Default>(expr: &Expression) -> Result<T, BindError> {
    let mut dst = T::default();
    bind(expr, &mut dst)?;
    Ok(dst)
}
