//! Slate IR - syntax tree and shared primitives for the Slate evaluator.
//!
//! This crate holds everything the parser produces and the evaluator
//! consumes:
//! - `Span` / `LineIndex`: byte ranges and line/column lookup
//! - `Name` / `StringInterner`: interned identifiers
//! - `ExprArena`, `ExprId`, `StmtId`, `Program`: the arena-allocated tree
//! - `Visitor`: read-only traversal with overridable `visit_*` hooks

mod ast;
mod interner;
mod name;
mod span;
pub mod visitor;

pub use ast::{
    ArgKind, BinaryOp, BoolOp, CallArg, CmpOp, Comprehension, Expr, ExprArena, ExprId, ExprKind,
    FunctionDef, Param, Params, Program, SharedArena, Stmt, StmtId, StmtKind, UnaryOp,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::{LineIndex, SourceLocation, Span};
pub use visitor::Visitor;
