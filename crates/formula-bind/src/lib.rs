//! Destructuring of expressions into typed records.
//!
//! [`Binder::bind`] projects an [`Expression`] onto a destination value by
//! the following rules, in order:
//!
//! 1. a custom binder registered for the destination type
//! 2. direct assignment when the expression's native value has the
//!    destination's type (`bool`, `i64`, `f64`, `f32`, `Vec<u8>`,
//!    `String`, [`Symbol`], [`List`])
//! 3. indirection (`Option<T>`, `Box<T>`): allocate a fresh pointee and bind
//!    into it
//! 4. records declared with [`bind_record!`] bind list elements by position;
//!    `Vec<T>` binds each element of a list
//!
//! Anything else is [`BindError::NotSupported`].
//!
//! ```
//! use rhizome_formula_bind::{bind_new, bind_record};
//! use rhizome_formula_expression::{must_parse, Expression, Symbol};
//!
//! bind_record! {
//!     #[derive(Debug, Default)]
//!     struct Call {
//!         op: Symbol,
//!         args: Vec<Expression> as "&rest",
//!     }
//! }
//!
//! let call: Call = bind_new(&must_parse("(f 1 2)")).unwrap();
//! assert_eq!(call.op.name(), "f");
//! assert_eq!(call.args.len(), 2);
//! ```

mod alist;
mod binder;
mod record;

pub use alist::AssociationList;
pub use binder::{bind, bind_new, BindError, Bindable, Binder};
pub use record::{FieldDecl, FieldSetter, FieldSpec, RecordBinder};

// Re-exported for `bind_record!` expansions.
pub use rhizome_formula_expression::{Expression, List, Symbol};
