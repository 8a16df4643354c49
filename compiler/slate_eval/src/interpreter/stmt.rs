//! Statement execution.

use std::rc::Rc;
use std::sync::Arc;

use slate_ir::{ExprId, FunctionDef, StmtId, StmtKind};
use slate_stack::ensure_sufficient_stack;
use tracing::trace;

use super::Interpreter;
use crate::errors::{not_implemented, ControlAction, EvalResult};
use crate::value::{iterate, ProcedureBody, Value};

impl Interpreter {
    /// Execute a statement of the current arena.
    ///
    /// An expression statement yields its value; every other statement
    /// yields `None`.
    pub(crate) fn exec(&mut self, id: StmtId) -> EvalResult {
        let arena = Arc::clone(&self.arena);
        let stmt = arena.stmt(id);
        trace!(span = %stmt.span, "exec");
        ensure_sufficient_stack(|| self.exec_kind(&stmt.kind))
            .map_err(|action| action.at(stmt.span, &self.source))
    }

    pub(crate) fn exec_block(&mut self, body: &[StmtId]) -> EvalResult {
        for &stmt in body {
            self.exec(stmt)?;
        }
        Ok(Value::None)
    }

    fn exec_kind(&mut self, kind: &StmtKind) -> EvalResult {
        match kind {
            StmtKind::Expr(expr) => self.eval(*expr),
            StmtKind::Assign { targets, value } => {
                let value = self.eval(*value)?;
                for &target in targets {
                    self.assign_target(target, value.clone())?;
                }
                Ok(Value::None)
            }
            StmtKind::AugAssign { target, op, value } => {
                self.aug_assign(*target, *op, *value)?;
                Ok(Value::None)
            }
            StmtKind::Delete(targets) => {
                for &target in targets {
                    self.delete_target(target)?;
                }
                Ok(Value::None)
            }
            StmtKind::Pass => Ok(Value::None),
            StmtKind::Break => Err(ControlAction::Break),
            StmtKind::Continue => Err(ControlAction::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(*value)?,
                    None => Value::None,
                };
                Err(ControlAction::Return(value))
            }
            StmtKind::Global(names) => {
                for &name in names {
                    self.env.declare_global(name);
                }
                Ok(Value::None)
            }
            StmtKind::Print { values, newline } => self.exec_print(values, *newline),
            StmtKind::If { test, body, orelse } => {
                if self.eval(*test)?.is_truthy()? {
                    self.exec_block(body)
                } else {
                    self.exec_block(orelse)
                }
            }
            StmtKind::While { test, body, orelse } => self.exec_while(*test, body, orelse),
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => self.exec_for(*target, *iter, body, orelse),
            StmtKind::FunctionDef(def) => self.define_function(def),
            StmtKind::Unsupported { construct } => Err(not_implemented(construct).into()),
        }
    }

    /// `print a, b`: `str()` of each value separated by spaces. A trailing
    /// comma ends the output with a space instead of a newline.
    fn exec_print(&mut self, values: &[ExprId], newline: bool) -> EvalResult {
        let mut parts = Vec::with_capacity(values.len());
        for &value in values {
            parts.push(self.eval(value)?.try_str()?);
        }
        let line = parts.join(" ");
        if newline {
            self.print_handler.println(&line);
        } else {
            self.print_handler.print(&line);
            self.print_handler.print(" ");
        }
        Ok(Value::None)
    }

    fn exec_while(&mut self, test: ExprId, body: &[StmtId], orelse: &[StmtId]) -> EvalResult {
        let mut iterations = 0;
        while self.eval(test)?.is_truthy()? {
            self.tick(&mut iterations)?;
            match self.exec_block(body) {
                Ok(_) | Err(ControlAction::Continue) => {}
                Err(ControlAction::Break) => return Ok(Value::None),
                Err(other) => return Err(other),
            }
        }
        self.exec_block(orelse)
    }

    /// `for target in iter`. The items are taken before the first
    /// iteration, so the body may mutate the sequence it loops over.
    fn exec_for(&mut self, target: ExprId, iter: ExprId, body: &[StmtId], orelse: &[StmtId]) -> EvalResult {
        let items = iterate(&self.eval(iter)?)?;
        let mut iterations = 0;
        for item in items {
            self.tick(&mut iterations)?;
            self.assign_target(target, item)?;
            match self.exec_block(body) {
                Ok(_) | Err(ControlAction::Continue) => {}
                Err(ControlAction::Break) => return Ok(Value::None),
                Err(other) => return Err(other),
            }
        }
        self.exec_block(orelse)
    }

    fn define_function(&mut self, def: &FunctionDef) -> EvalResult {
        let name = self.interner.lookup(def.name);
        let doc = def.doc.as_deref().map(Rc::from);
        let procedure = self.make_procedure(name, &def.params, ProcedureBody::Block(def.body.clone()), doc)?;
        self.env.assign(def.name, Value::Procedure(Rc::new(procedure)));
        Ok(Value::None)
    }
}
