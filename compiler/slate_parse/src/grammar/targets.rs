//! Assignment target parsing and validation.

use slate_ir::{ExprId, ExprKind};
use slate_lexer::TokenKind;

use crate::{ParseError, Parser};

/// Where a target appears; decides which shapes are legal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TargetContext {
    /// `=`, `for`, comprehension and `with ... as` targets.
    Assign,
    /// `op=` targets: a single name, attribute or subscript.
    AugAssign,
    Delete,
}

impl Parser<'_> {
    /// `target (, target)* [,]` as used by `for` and comprehensions.
    ///
    /// Operands stop short of comparisons so `in` is left for the caller.
    pub(crate) fn parse_target_list(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let first = self.parse_target_operand()?;
        if !self.check(&TokenKind::Comma) {
            self.validate_target(first, TargetContext::Assign)?;
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::In) || self.check(&TokenKind::Eq) {
                break;
            }
            items.push(self.parse_target_operand()?);
        }
        let tuple = self.alloc_expr(ExprKind::Tuple(items), self.span_from(start));
        self.validate_target(tuple, TargetContext::Assign)?;
        Ok(tuple)
    }

    /// One element of a target list.
    pub(crate) fn parse_target_operand(&mut self) -> Result<ExprId, ParseError> {
        self.parse_bitor()
    }

    /// Reject expressions that cannot be bound to, such as literals, calls and operators.
    pub(crate) fn validate_target(&self, id: ExprId, ctx: TargetContext) -> Result<(), ParseError> {
        let expr = self.arena.expr(id);
        match &expr.kind {
            ExprKind::Ident(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
            ExprKind::Tuple(items) | ExprKind::List(items) if ctx != TargetContext::AugAssign => {
                items
                    .iter()
                    .try_for_each(|&item| self.validate_target(item, ctx))
            }
            other => {
                let what = describe(other);
                let message = match ctx {
                    TargetContext::Assign => format!("cannot assign to {what}"),
                    TargetContext::Delete => format!("cannot delete {what}"),
                    TargetContext::AugAssign => {
                        format!("{what} is an illegal expression for augmented assignment")
                    }
                };
                Err(ParseError::new(message, expr.span))
            }
        }
    }
}

fn describe(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::None
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_) => "literal",
        ExprKind::Call { .. } => "function call",
        ExprKind::Binary { .. } | ExprKind::Unary { .. } | ExprKind::BoolOp { .. } => "operator",
        ExprKind::Compare { .. } => "comparison",
        ExprKind::Lambda { .. } => "lambda",
        ExprKind::IfExp { .. } => "conditional expression",
        ExprKind::ListComp { .. } => "list comprehension",
        ExprKind::Dict(_) => "dict display",
        ExprKind::Tuple(_) => "tuple",
        ExprKind::List(_) => "list",
        _ => "expression",
    }
}
