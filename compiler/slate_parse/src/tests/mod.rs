//! Parser tests.

mod error_tests;
mod expr_tests;
mod stmt_tests;

use slate_ir::{Expr, ExprId, ExprKind, Program, Stmt, StmtKind, StringInterner};

use crate::{parse, ParseError};

/// Parsed program plus the interner that owns its names.
pub(crate) struct Parsed {
    pub program: Program,
    pub interner: StringInterner,
}

impl Parsed {
    pub fn stmt(&self, index: usize) -> &Stmt {
        self.program.arena.stmt(self.program.body[index])
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        self.program.arena.expr(id)
    }

    /// Expression of the `index`th statement, which must be an expression statement.
    pub fn expr_stmt(&self, index: usize) -> &Expr {
        match self.stmt(index).kind {
            StmtKind::Expr(id) => self.expr(id),
            ref other => panic!("expected expression statement, got {other:?}"),
        }
    }

    pub fn name_of(&self, id: ExprId) -> String {
        match self.expr(id).kind {
            ExprKind::Ident(name) => self.interner.lookup(name).to_string(),
            ref other => panic!("expected identifier, got {other:?}"),
        }
    }
}

pub(crate) fn parse_ok(source: &str) -> Parsed {
    let interner = StringInterner::new();
    let program = parse(source, &interner).unwrap_or_else(|err| panic!("{source:?}: {err}"));
    Parsed { program, interner }
}

pub(crate) fn parse_err(source: &str) -> ParseError {
    let interner = StringInterner::new();
    match parse(source, &interner) {
        Ok(_) => panic!("{source:?} should not parse"),
        Err(err) => err,
    }
}
