//! Lexical environment: function and special-form bindings.
//!
//! An environment is a chain of immutable frames, each holding one binding
//! and a link to its parent. Extending an environment allocates one frame and
//! leaves the original untouched, so environments sharing a prefix can be
//! used from several threads at once.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rhizome_formula_expression::{Expression, Namespace, Symbol, Value};
use tracing::debug;

use crate::ast::AstNode;
use crate::builtins::builtin_functions;
use crate::compile::{CompileContext, CompileError};
use crate::eval::{EvalContext, EvalError};
use crate::special_forms::special_forms;

/// Namespace given to unqualified symbols during resolution.
pub const NAMESPACE: Namespace = Namespace::from_static("formula");

/// Returns `sym` in the formula namespace if it is unqualified.
pub fn normalize_symbol(sym: &Symbol) -> Symbol {
    sym.qualified_or(&NAMESPACE)
}

/// Signature of a function implementation. Arguments arrive evaluated.
pub type FunctionImpl = dyn Fn(&EvalContext, &[Value]) -> Result<Value, EvalError> + Send + Sync;

/// Compile routine of a special form. It receives the whole form, operator
/// included.
pub type SpecialFormCompiler = fn(&CompileContext, &Expression) -> Result<AstNode, CompileError>;

/// A function binding.
#[derive(Clone)]
pub struct FunctionDef {
    name: Symbol,
    implementation: Arc<FunctionImpl>,
}

impl FunctionDef {
    pub fn new<F>(name: Symbol, implementation: F) -> Self
    where
        F: Fn(&EvalContext, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        FunctionDef {
            name: normalize_symbol(&name),
            implementation: Arc::new(implementation),
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn call(&self, ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
        (self.implementation)(ctx, args)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A special-form binding.
#[derive(Clone)]
pub struct SpecialFormDef {
    name: Symbol,
    compile: SpecialFormCompiler,
}

impl SpecialFormDef {
    pub fn new(name: Symbol, compile: SpecialFormCompiler) -> Self {
        SpecialFormDef {
            name: normalize_symbol(&name),
            compile,
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn compile(&self, ctx: &CompileContext, form: &Expression) -> Result<AstNode, CompileError> {
        (self.compile)(ctx, form)
    }
}

impl fmt::Debug for SpecialFormDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialFormDef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Kind of binding, used to select among same-named bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Function,
    SpecialForm,
}

/// The payload of a binding.
#[derive(Debug, Clone)]
pub enum Definition {
    Function(FunctionDef),
    SpecialForm(SpecialFormDef),
}

impl Definition {
    pub fn kind(&self) -> BindingKind {
        match self {
            Definition::Function(_) => BindingKind::Function,
            Definition::SpecialForm(_) => BindingKind::SpecialForm,
        }
    }

    pub fn name(&self) -> &Symbol {
        match self {
            Definition::Function(def) => def.name(),
            Definition::SpecialForm(def) => def.name(),
        }
    }
}

#[derive(Debug)]
struct Frame {
    definition: Definition,
    parent: Option<Arc<Frame>>,
}

/// Persistent environment of bindings; newest binding wins.
#[derive(Debug, Clone, Default)]
pub struct LexicalEnvironment {
    head: Option<Arc<Frame>>,
}

impl LexicalEnvironment {
    /// Creates an environment with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new environment with `definition` bound on top of this one.
    pub fn with_binding(&self, definition: Definition) -> Self {
        LexicalEnvironment {
            head: Some(Arc::new(Frame {
                definition,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn with_function_def(&self, def: FunctionDef) -> Self {
        self.with_binding(Definition::Function(def))
    }

    pub fn with_special_form(&self, def: SpecialFormDef) -> Self {
        self.with_binding(Definition::SpecialForm(def))
    }

    /// Bindings from newest to oldest.
    pub fn bindings(&self) -> impl Iterator<Item = &Definition> + '_ {
        let mut frame = self.head.as_deref();
        std::iter::from_fn(move || {
            let current = frame?;
            frame = current.parent.as_deref();
            Some(&current.definition)
        })
    }

    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Finds the newest binding of `kind` for `sym`.
    pub fn resolve(&self, sym: &Symbol, kind: BindingKind) -> Option<&Definition> {
        let sym = normalize_symbol(sym);
        self.bindings()
            .find(|def| def.kind() == kind && *def.name() == sym)
    }

    pub fn resolve_function(&self, sym: &Symbol) -> Option<&FunctionDef> {
        match self.resolve(sym, BindingKind::Function)? {
            Definition::Function(def) => Some(def),
            Definition::SpecialForm(_) => None,
        }
    }

    /// Finds the newest binding for `sym` of either kind, as the compiler
    /// does for operators.
    pub fn resolve_operator(&self, sym: &Symbol) -> Option<&Definition> {
        let sym = normalize_symbol(sym);
        self.bindings().find(|def| *def.name() == sym)
    }
}

/// The builtin functions followed by the special forms.
///
/// Built once; clones share the frames.
pub fn default_environment() -> LexicalEnvironment {
    static DEFAULT: OnceLock<LexicalEnvironment> = OnceLock::new();
    DEFAULT
        .get_or_init(|| {
            let env = builtin_functions()
                .into_iter()
                .fold(LexicalEnvironment::new(), |env, def| env.with_function_def(def));
            let env = special_forms()
                .into_iter()
                .fold(env, |env, def| env.with_special_form(def));
            debug!(bindings = env.len(), "built default environment");
            env
        })
        .clone()
}
