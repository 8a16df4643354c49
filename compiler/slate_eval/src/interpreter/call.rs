//! Calling values and binding arguments to parameters.

use std::rc::Rc;

use slate_ir::Name;

use super::Interpreter;
use crate::errors::{
    duplicate_argument, missing_arguments, not_callable, recursion_limit, too_many_positional,
    unexpected_keyword, ControlAction, EvalError, EvalResult,
};
use crate::methods::call_method;
use crate::value::{Dict, Kwargs, Procedure, ProcedureBody, Value};

impl Interpreter {
    /// Call `callee` with already evaluated arguments.
    pub(crate) fn call_value(&mut self, callee: &Value, args: &[Value], kwargs: &Kwargs) -> EvalResult {
        match callee {
            Value::Procedure(procedure) => self.call_procedure(procedure, args, kwargs),
            Value::Builtin(builtin) => Ok((builtin.func)(args, kwargs)?),
            Value::BoundMethod(method) => Ok(call_method(&method.receiver, method.name, args, kwargs)?),
            other => Err(not_callable(other.type_name()).into()),
        }
    }

    /// Run `procedure` in a fresh frame on top of its closure.
    ///
    /// The result is the value of `return`, or `None` when a `def` body
    /// runs off its end. `break`/`continue` never leave the call.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %procedure.name))]
    pub(crate) fn call_procedure(
        &mut self,
        procedure: &Rc<Procedure>,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> EvalResult {
        if self.call_depth >= self.limits.max_recursion_depth {
            return Err(recursion_limit(self.limits.max_recursion_depth).into());
        }
        let bindings = bind_arguments(procedure, args, kwargs)?;
        let mut scoped = self.call_frame(procedure);
        for (name, value) in bindings {
            scoped.env.define(name, value);
        }
        match &procedure.body {
            ProcedureBody::Block(body) => match scoped.exec_block(body) {
                Ok(_) => Ok(Value::None),
                Err(ControlAction::Return(value)) => Ok(value),
                Err(action @ (ControlAction::Break | ControlAction::Continue)) => {
                    Err(action.into_error().into())
                }
                Err(other) => Err(other),
            },
            ProcedureBody::Lambda(body) => scoped.eval(*body),
        }
    }
}

/// Match call arguments to `procedure`'s parameters.
///
/// Positional arguments fill parameters left to right; extras go to
/// `*args` or are an error. Keywords then fill parameters by name; unknown
/// ones go to `**kwargs` or are an error. Remaining parameters take their
/// defaults, and any still unfilled are reported together.
pub(crate) fn bind_arguments(
    procedure: &Procedure,
    args: &[Value],
    kwargs: &Kwargs,
) -> Result<Vec<(Name, Value)>, EvalError> {
    let params = &procedure.params;
    let name = &*procedure.name;
    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    let (fixed, extra) = args.split_at(args.len().min(params.len()));
    for (slot, value) in slots.iter_mut().zip(fixed) {
        *slot = Some(value.clone());
    }

    let mut bindings = Vec::with_capacity(params.len() + 2);
    match &procedure.vararg {
        Some((vararg, _)) => bindings.push((*vararg, Value::tuple(extra.to_vec()))),
        None if !extra.is_empty() => {
            return Err(too_many_positional(name, params.len(), args.len()));
        }
        None => {}
    }

    let mut extra_keywords = Dict::new();
    for (key, value) in kwargs {
        let position = params.iter().position(|param| *param.label == **key);
        match position.and_then(|i| slots.get_mut(i)) {
            Some(Some(_)) => return Err(duplicate_argument(name, key)),
            Some(slot) => *slot = Some(value.clone()),
            None if procedure.kwarg.is_some() => {
                extra_keywords.insert(Value::Str(Rc::clone(key)), value.clone())?;
            }
            None => return Err(unexpected_keyword(name, key)),
        }
    }
    if let Some((kwarg, _)) = &procedure.kwarg {
        bindings.push((*kwarg, Value::dict(extra_keywords)));
    }

    let mut missing = Vec::new();
    for (param, slot) in params.iter().zip(slots) {
        match slot.or_else(|| param.default.clone()) {
            Some(value) => bindings.push((param.name, value)),
            None => missing.push(&*param.label),
        }
    }
    if !missing.is_empty() {
        return Err(missing_arguments(name, &missing));
    }
    Ok(bindings)
}
