//! Special forms: operators compiled by their own routine.

use rhizome_formula_bind::{bind_new, bind_record};
use rhizome_formula_expression::{Expression, Symbol};
use tracing::trace;

use crate::ast::AstNode;
use crate::compile::{CompileContext, CompileError};
use crate::env::{SpecialFormDef, NAMESPACE};

bind_record! {
    /// `(if TEST THEN [ELSE])`
    #[derive(Debug, Default)]
    struct IfElseForm {
        op: Symbol,
        test: Expression,
        rest: Vec<Expression> as "&rest",
    }
}

fn compile_if_else(ctx: &CompileContext, form: &Expression) -> Result<AstNode, CompileError> {
    const FORM: &str = "if/else";
    let at = || form.source_context().cloned();

    let parsed: IfElseForm = bind_new(form).map_err(|source| CompileError::BadSyntax {
        form: FORM,
        at: at(),
        source,
    })?;
    trace!(operator = %parsed.op, branches = parsed.rest.len(), "parsed if/else");
    let (then_form, else_form) = match parsed.rest.as_slice() {
        [] => {
            return Err(CompileError::Arity {
                form: FORM,
                message: "must have a THEN form",
                at: at(),
            });
        }
        [then_form] => (then_form, None),
        [then_form, else_form] => (then_form, Some(else_form)),
        _ => {
            return Err(CompileError::Arity {
                form: FORM,
                message: "must have only a THEN and ELSE form",
                at: at(),
            });
        }
    };

    let clause = |clause: &'static str, expr: &Expression| {
        ctx.compile(expr).map_err(|err| CompileError::Clause {
            form: FORM,
            clause,
            source: Box::new(err),
        })
    };
    let test = clause("TEST", &parsed.test)?;
    let then_expression = clause("THEN", then_form)?;
    let else_expression = else_form
        .map(|else_form| clause("ELSE", else_form))
        .transpose()?;

    Ok(ctx.node(form, AstNode::if_else(test, then_expression, else_expression)))
}

/// The special forms, in registration order.
pub fn special_forms() -> Vec<SpecialFormDef> {
    vec![SpecialFormDef::new(Symbol::new("if", NAMESPACE), compile_if_else)]
}
