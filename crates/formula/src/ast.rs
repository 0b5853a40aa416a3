//! Abstract syntax tree produced by the compiler.
//!
//! The tree serializes as a tagged union keyed by `constant`, `variable`,
//! `funcall` or `if_else`, next to an optional `source_context`. Code
//! generators consume this form.

use rhizome_formula_expression::{Expression, SourceContext, Symbol};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
    #[serde(flatten)]
    pub kind: AstKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AstKind {
    Constant {
        value: Expression,
    },
    Variable {
        symbol: Symbol,
    },
    #[serde(rename = "funcall")]
    FunctionCall {
        function: Box<AstNode>,
        #[serde(default)]
        positional_args: Vec<AstNode>,
    },
    IfElse {
        test: Box<AstNode>,
        then_expression: Box<AstNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_expression: Option<Box<AstNode>>,
    },
}

impl AstNode {
    pub fn new(kind: AstKind) -> Self {
        AstNode {
            source_context: None,
            kind,
        }
    }

    pub fn constant(value: Expression) -> Self {
        Self::new(AstKind::Constant { value })
    }

    pub fn variable(symbol: Symbol) -> Self {
        Self::new(AstKind::Variable { symbol })
    }

    pub fn funcall(function: AstNode, positional_args: Vec<AstNode>) -> Self {
        Self::new(AstKind::FunctionCall {
            function: Box::new(function),
            positional_args,
        })
    }

    pub fn if_else(test: AstNode, then_expression: AstNode, else_expression: Option<AstNode>) -> Self {
        Self::new(AstKind::IfElse {
            test: Box::new(test),
            then_expression: Box::new(then_expression),
            else_expression: else_expression.map(Box::new),
        })
    }

    pub fn with_source_context(mut self, source_context: Option<SourceContext>) -> Self {
        self.source_context = source_context;
        self
    }

    /// Returns the tree with every source context removed.
    pub fn without_source_contexts(self) -> Self {
        let kind = match self.kind {
            AstKind::Constant { value } => AstKind::Constant { value },
            AstKind::Variable { symbol } => AstKind::Variable { symbol },
            AstKind::FunctionCall {
                function,
                positional_args,
            } => AstKind::FunctionCall {
                function: Box::new(function.without_source_contexts()),
                positional_args: positional_args
                    .into_iter()
                    .map(AstNode::without_source_contexts)
                    .collect(),
            },
            AstKind::IfElse {
                test,
                then_expression,
                else_expression,
            } => AstKind::IfElse {
                test: Box::new(test.without_source_contexts()),
                then_expression: Box::new(then_expression.without_source_contexts()),
                else_expression: else_expression
                    .map(|node| Box::new(node.without_source_contexts())),
            },
        };
        AstNode::new(kind)
    }
}
