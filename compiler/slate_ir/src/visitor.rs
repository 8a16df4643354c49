//! Syntax tree visitor.
//!
//! Provides generic read-only traversal of the arena-allocated tree. The
//! visitor may mutate its own state during traversal; the tree itself is
//! never modified.
//!
//! Default implementations call `walk_*` functions that traverse children.
//! Override `visit_*` methods to add behavior at specific nodes, and call
//! the matching `walk_*` function to keep descending.
//!
//! # Example
//!
//! ```text
//! struct CountCalls {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for CountCalls {
//!     fn visit_expr(&mut self, id: ExprId, arena: &'ast ExprArena) {
//!         if matches!(arena.expr(id).kind, ExprKind::Call { .. }) {
//!             self.count += 1;
//!         }
//!         walk_expr(self, id, arena);
//!     }
//! }
//! ```

use super::ast::{
    CallArg, Comprehension, ExprArena, ExprId, ExprKind, Params, Program, StmtId, StmtKind,
};

/// Syntax tree visitor trait.
pub trait Visitor<'ast> {
    /// Visit every top-level statement of a program.
    fn visit_program(&mut self, program: &'ast Program) {
        for &stmt in &program.body {
            self.visit_stmt(stmt, &program.arena);
        }
    }

    /// Visit a statement.
    fn visit_stmt(&mut self, id: StmtId, arena: &'ast ExprArena) {
        walk_stmt(self, id, arena);
    }

    /// Visit an expression in load context.
    fn visit_expr(&mut self, id: ExprId, arena: &'ast ExprArena) {
        walk_expr(self, id, arena);
    }

    /// Visit an assignment, `for`, comprehension or `del` target.
    ///
    /// The default descends with [`walk_target`], which treats bare
    /// identifiers as bindings and everything nested in subscripts or
    /// attribute bases as loads.
    fn visit_target(&mut self, id: ExprId, arena: &'ast ExprArena) {
        walk_target(self, id, arena);
    }

    /// Visit a parameter list (default values are loads).
    fn visit_params(&mut self, params: &'ast Params, arena: &'ast ExprArena) {
        for param in &params.positional {
            if let Some(default) = param.default {
                self.visit_expr(default, arena);
            }
        }
    }

    /// Visit a call argument.
    fn visit_call_arg(&mut self, arg: &'ast CallArg, arena: &'ast ExprArena) {
        self.visit_expr(arg.value, arena);
    }

    /// Visit a comprehension clause.
    fn visit_comprehension(&mut self, clause: &'ast Comprehension, arena: &'ast ExprArena) {
        self.visit_expr(clause.iter, arena);
        self.visit_target(clause.target, arena);
        for &cond in &clause.ifs {
            self.visit_expr(cond, arena);
        }
    }
}

/// Walk the children of a statement.
pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: StmtId,
    arena: &'ast ExprArena,
) {
    match &arena.stmt(id).kind {
        StmtKind::Expr(expr) => visitor.visit_expr(*expr, arena),
        StmtKind::Assign { targets, value } => {
            visitor.visit_expr(*value, arena);
            for &target in targets {
                visitor.visit_target(target, arena);
            }
        }
        StmtKind::AugAssign { target, value, .. } => {
            visitor.visit_expr(*value, arena);
            visitor.visit_target(*target, arena);
        }
        StmtKind::Delete(targets) => {
            for &target in targets {
                visitor.visit_target(target, arena);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(*value, arena);
            }
        }
        StmtKind::Print { values, .. } => {
            for &value in values {
                visitor.visit_expr(value, arena);
            }
        }
        StmtKind::If { test, body, orelse } | StmtKind::While { test, body, orelse } => {
            visitor.visit_expr(*test, arena);
            walk_block(visitor, body, arena);
            walk_block(visitor, orelse, arena);
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => {
            visitor.visit_expr(*iter, arena);
            visitor.visit_target(*target, arena);
            walk_block(visitor, body, arena);
            walk_block(visitor, orelse, arena);
        }
        StmtKind::FunctionDef(def) => {
            visitor.visit_params(&def.params, arena);
            walk_block(visitor, &def.body, arena);
        }
        StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Global(_)
        | StmtKind::Unsupported { .. } => {}
    }
}

/// Walk a block of statements in order.
pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    block: &'ast [StmtId],
    arena: &'ast ExprArena,
) {
    for &stmt in block {
        visitor.visit_stmt(stmt, arena);
    }
}

/// Walk the children of an expression in load context.
pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    arena: &'ast ExprArena,
) {
    match &arena.expr(id).kind {
        ExprKind::None
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Ident(_)
        | ExprKind::Unsupported { .. } => {}
        ExprKind::List(items) | ExprKind::Tuple(items) => {
            for &item in items {
                visitor.visit_expr(item, arena);
            }
        }
        ExprKind::Dict(entries) => {
            for &(key, value) in entries {
                visitor.visit_expr(key, arena);
                visitor.visit_expr(value, arena);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(*left, arena);
            visitor.visit_expr(*right, arena);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(*operand, arena),
        ExprKind::BoolOp { values, .. } => {
            for &value in values {
                visitor.visit_expr(value, arena);
            }
        }
        ExprKind::Compare { left, comparisons } => {
            visitor.visit_expr(*left, arena);
            for &(_, right) in comparisons {
                visitor.visit_expr(right, arena);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            visitor.visit_expr(*test, arena);
            visitor.visit_expr(*body, arena);
            visitor.visit_expr(*orelse, arena);
        }
        ExprKind::Attribute { value, .. } => visitor.visit_expr(*value, arena),
        ExprKind::Subscript { value, index } => {
            visitor.visit_expr(*value, arena);
            visitor.visit_expr(*index, arena);
        }
        ExprKind::Slice { lower, upper, step } => {
            for part in [lower, upper, step].into_iter().flatten() {
                visitor.visit_expr(*part, arena);
            }
        }
        ExprKind::Call { func, args } => {
            visitor.visit_expr(*func, arena);
            for arg in args {
                visitor.visit_call_arg(arg, arena);
            }
        }
        ExprKind::Lambda { params, body } => {
            visitor.visit_params(params, arena);
            visitor.visit_expr(*body, arena);
        }
        ExprKind::ListComp { elt, generators } => {
            for clause in generators {
                visitor.visit_comprehension(clause, arena);
            }
            visitor.visit_expr(*elt, arena);
        }
    }
}

/// Walk a binding target.
///
/// A bare identifier is a binding and produces no visit. Tuple and list
/// targets recurse as targets; subscript and attribute targets visit their
/// container and index expressions as loads.
pub fn walk_target<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    arena: &'ast ExprArena,
) {
    match &arena.expr(id).kind {
        ExprKind::Ident(_) => {}
        ExprKind::Tuple(items) | ExprKind::List(items) => {
            for &item in items {
                visitor.visit_target(item, arena);
            }
        }
        _ => visitor.visit_expr(id, arena),
    }
}
