//! Assignment, augmented assignment and deletion targets.

use std::sync::Arc;

use slate_ir::{BinaryOp, ExprArena, ExprId, ExprKind};

use super::Interpreter;
use crate::errors::{
    attribute_deletion, unbound_local, undefined_name, unpack_mismatch, ControlAction, ErrorKind,
    EvalError,
};
use crate::index::{del_item, get_item, set_item};
use crate::methods::{get_attribute, set_attribute};
use crate::operators::evaluate_binary;
use crate::value::{iterate, read, write, Value};

impl Interpreter {
    /// Bind `value` to an assignment, `for` or comprehension target.
    pub(crate) fn assign_target(&mut self, target: ExprId, value: Value) -> Result<(), ControlAction> {
        let arena = Arc::clone(&self.arena);
        let expr = arena.expr(target);
        self.assign_kind(&expr.kind, value, &arena)
            .map_err(|action| action.at(expr.span, &self.source))
    }

    fn assign_kind(&mut self, kind: &ExprKind, value: Value, arena: &ExprArena) -> Result<(), ControlAction> {
        match kind {
            ExprKind::Ident(name) => {
                self.env.assign(*name, value);
                Ok(())
            }
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                let values = iterate(&value)?;
                if values.len() != items.len() {
                    return Err(unpack_mismatch(items.len(), values.len()).into());
                }
                for (&item, value) in items.iter().zip(values) {
                    self.assign_target(item, value)?;
                }
                Ok(())
            }
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                let container = self.eval(*container)?;
                let subscript = self.eval_subscript(*index, arena)?;
                Ok(set_item(&container, &subscript, &value)?)
            }
            ExprKind::Attribute { value: object, attr } => {
                let object = self.eval(*object)?;
                Ok(set_attribute(&object, &self.interner.lookup(*attr), &value)?)
            }
            _ => Err(EvalError::new(ErrorKind::SyntaxError, "cannot assign to expression").into()),
        }
    }

    /// `target op= value`: the target is read once, combined with the
    /// value, and written back to the same place. Inside a procedure a bare
    /// name must already be bound locally, since the write would create a
    /// local.
    pub(crate) fn aug_assign(&mut self, target: ExprId, op: BinaryOp, value: ExprId) -> Result<(), ControlAction> {
        let arena = Arc::clone(&self.arena);
        let expr = arena.expr(target);
        match &expr.kind {
            ExprKind::Ident(name) => {
                let current = if self.env.writes_locally(*name) {
                    self.env
                        .local(*name)
                        .ok_or_else(|| unbound_local(&self.interner.lookup(*name)))?
                } else {
                    self.lookup(*name)?
                };
                let operand = self.eval(value)?;
                let result = in_place(op, &current, &operand)?;
                self.env.assign(*name, result);
            }
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                let container = self.eval(*container)?;
                let subscript = self.eval_subscript(*index, &arena)?;
                let current = get_item(&container, &subscript)?;
                let operand = self.eval(value)?;
                let result = in_place(op, &current, &operand)?;
                set_item(&container, &subscript, &result)?;
            }
            ExprKind::Attribute { value: object, attr } => {
                let object = self.eval(*object)?;
                let attr = self.interner.lookup(*attr);
                let current = get_attribute(&object, &attr)?;
                let operand = self.eval(value)?;
                let result = in_place(op, &current, &operand)?;
                set_attribute(&object, &attr, &result)?;
            }
            _ => {
                return Err(EvalError::new(
                    ErrorKind::SyntaxError,
                    "illegal expression for augmented assignment",
                )
                .into())
            }
        }
        Ok(())
    }

    /// Remove a `del` target.
    pub(crate) fn delete_target(&mut self, target: ExprId) -> Result<(), ControlAction> {
        let arena = Arc::clone(&self.arena);
        let expr = arena.expr(target);
        self.delete_kind(&expr.kind, &arena)
            .map_err(|action| action.at(expr.span, &self.source))
    }

    fn delete_kind(&mut self, kind: &ExprKind, arena: &ExprArena) -> Result<(), ControlAction> {
        match kind {
            ExprKind::Ident(name) => match self.env.delete(*name) {
                Some(_) => Ok(()),
                None => Err(undefined_name(&self.interner.lookup(*name)).into()),
            },
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for &item in items {
                    self.delete_target(item)?;
                }
                Ok(())
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(*value)?;
                let subscript = self.eval_subscript(*index, arena)?;
                Ok(del_item(&container, &subscript)?)
            }
            ExprKind::Attribute { value, attr } => {
                let object = self.eval(*value)?;
                Err(attribute_deletion(object.type_name(), &self.interner.lookup(*attr)).into())
            }
            _ => Err(EvalError::new(ErrorKind::SyntaxError, "cannot delete expression").into()),
        }
    }
}

/// `current op= operand`. Lists extend in place, and arrays are updated
/// in place when the result keeps their shape and dtype, so every alias
/// sees the change. Everything else rebinds.
fn in_place(op: BinaryOp, current: &Value, operand: &Value) -> Result<Value, EvalError> {
    match (op, current) {
        (BinaryOp::Add, Value::List(items)) => {
            let extra = iterate(operand)?;
            write(items, "list")?.extend(extra);
            Ok(current.clone())
        }
        (_, Value::Array(array)) => {
            let result = evaluate_binary(op, current, operand)?;
            if let Value::Array(updated) = &result {
                let (new, old) = (read(updated, "ndarray")?, read(array, "ndarray")?);
                let fits = new.shape() == old.shape()
                    && new.get_attr("dtype")?.equals(&old.get_attr("dtype")?)?;
                drop((new, old));
                if fits {
                    write(array, "ndarray")?.set_item(&[], &result)?;
                    return Ok(current.clone());
                }
            }
            Ok(result)
        }
        _ => evaluate_binary(op, current, operand),
    }
}
