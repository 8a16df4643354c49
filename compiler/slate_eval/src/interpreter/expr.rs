//! Expression evaluation.

use std::rc::Rc;
use std::sync::Arc;

use slate_ir::{
    ArgKind, BoolOp, CallArg, CmpOp, Comprehension, ExprArena, ExprId, ExprKind, Name, Params,
};
use slate_stack::ensure_sufficient_stack;
use tracing::debug;

use super::Interpreter;
use crate::array::SliceSpec;
use crate::errors::{
    aborted_by_host, ambiguous_array_truth, duplicate_argument, loop_limit, not_implemented,
    type_error, undefined_name, ControlAction, EvalResult,
};
use crate::index::{get_item, Selector, Subscript};
use crate::methods::get_attribute;
use crate::operators::{evaluate_binary, evaluate_compare};
use crate::unary_operators::evaluate_unary;
use crate::value::{
    check_len, iterate, read, Dict, Procedure, ProcedureBody, ProcedureParam, Value,
};

impl Interpreter {
    /// Evaluate an expression of the current arena.
    ///
    /// Errors leaving this node are tagged with its span unless a nested
    /// node already claimed them.
    pub(crate) fn eval(&mut self, id: ExprId) -> EvalResult {
        let arena = Arc::clone(&self.arena);
        let expr = arena.expr(id);
        ensure_sufficient_stack(|| self.eval_kind(&expr.kind, &arena))
            .map_err(|action| action.at(expr.span, &self.source))
    }

    fn eval_kind(&mut self, kind: &ExprKind, arena: &ExprArena) -> EvalResult {
        match kind {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(s) => Ok(Value::str(s)),
            ExprKind::Ident(name) => self.lookup(*name),
            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::Dict(entries) => {
                let mut dict = Dict::new();
                for &(key, value) in entries {
                    let key = self.eval(key)?;
                    let value = self.eval(value)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(*left)?;
                let right = self.eval(*right)?;
                Ok(evaluate_binary(*op, &left, &right)?)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(*operand)?;
                Ok(evaluate_unary(*op, &operand)?)
            }
            ExprKind::BoolOp { op, values } => self.eval_bool_op(*op, values),
            ExprKind::Compare { left, comparisons } => self.eval_compare(*left, comparisons),
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval(*test)?.is_truthy()? {
                    self.eval(*body)
                } else {
                    self.eval(*orelse)
                }
            }
            ExprKind::Attribute { value, attr } => {
                let value = self.eval(*value)?;
                Ok(get_attribute(&value, &self.interner.lookup(*attr))?)
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(*value)?;
                let subscript = self.eval_subscript(*index, arena)?;
                Ok(get_item(&container, &subscript)?)
            }
            ExprKind::Slice { .. } => Err(not_implemented("slice outside a subscript").into()),
            ExprKind::Call { func, args } => self.eval_call(*func, args),
            ExprKind::Lambda { params, body } => {
                let procedure =
                    self.make_procedure(Rc::from("<lambda>"), params, ProcedureBody::Lambda(*body), None)?;
                Ok(Value::Procedure(Rc::new(procedure)))
            }
            ExprKind::ListComp { elt, generators } => self.eval_list_comp(*elt, generators),
            ExprKind::Unsupported { construct } => Err(not_implemented(construct).into()),
        }
    }

    pub(crate) fn lookup(&self, name: Name) -> EvalResult {
        self.env
            .lookup(name)
            .ok_or_else(|| undefined_name(&self.interner.lookup(name)).into())
    }

    fn eval_all(&mut self, items: &[ExprId]) -> Result<Vec<Value>, ControlAction> {
        let mut values = Vec::with_capacity(items.len());
        for &item in items {
            values.push(self.eval(item)?);
        }
        Ok(values)
    }

    /// `a and b and c` / `a or b`: the first operand that decides the
    /// result, or the last one. Later operands are not evaluated.
    fn eval_bool_op(&mut self, op: BoolOp, values: &[ExprId]) -> EvalResult {
        let mut result = Value::None;
        for (i, &value) in values.iter().enumerate() {
            result = self.eval(value)?;
            if i + 1 < values.len() && result.is_truthy()? == (op == BoolOp::Or) {
                break;
            }
        }
        Ok(result)
    }

    /// `a < b < c`: each operand is evaluated once, and the chain stops at
    /// the first false link. A link other than the last one must not be an
    /// elementwise array result, since it has no single truth value.
    fn eval_compare(&mut self, left: ExprId, comparisons: &[(CmpOp, ExprId)]) -> EvalResult {
        let mut current = self.eval(left)?;
        let mut result = Value::Bool(true);
        for (i, &(op, right)) in comparisons.iter().enumerate() {
            let right = self.eval(right)?;
            result = evaluate_compare(op, &current, &right)?;
            if i + 1 < comparisons.len() {
                if matches!(result, Value::Array(_)) {
                    return Err(ambiguous_array_truth().into());
                }
                if !result.is_truthy()? {
                    return Ok(result);
                }
            }
            current = right;
        }
        Ok(result)
    }

    /// Evaluate the inside of `[...]`.
    pub(crate) fn eval_subscript(&mut self, index: ExprId, arena: &ExprArena) -> Result<Subscript, ControlAction> {
        match &arena.expr(index).kind {
            ExprKind::Tuple(items)
                if items
                    .iter()
                    .any(|&item| matches!(arena.expr(item).kind, ExprKind::Slice { .. })) =>
            {
                let mut selectors = Vec::with_capacity(items.len());
                for &item in items {
                    selectors.push(self.eval_selector(item, arena)?);
                }
                Ok(Subscript::Multi(selectors))
            }
            _ => Ok(Subscript::Single(self.eval_selector(index, arena)?)),
        }
    }

    fn eval_selector(&mut self, id: ExprId, arena: &ExprArena) -> Result<Selector, ControlAction> {
        let expr = arena.expr(id);
        let ExprKind::Slice { lower, upper, step } = expr.kind else {
            return Ok(Selector::Item(self.eval(id)?));
        };
        let spec = SliceSpec {
            start: self.slice_bound(lower)?,
            stop: self.slice_bound(upper)?,
            step: self.slice_bound(step)?,
        };
        Ok(Selector::Slice(spec))
    }

    fn slice_bound(&mut self, bound: Option<ExprId>) -> Result<Option<i64>, ControlAction> {
        let Some(id) = bound else {
            return Ok(None);
        };
        match self.eval(id)? {
            Value::None => Ok(None),
            Value::Int(n) => Ok(Some(n)),
            Value::Bool(b) => Ok(Some(i64::from(b))),
            other => Err(type_error(format!(
                "slice indices must be integers or None, not {}",
                other.type_name()
            ))
            .into()),
        }
    }

    /// `func(args)`: evaluate the callee, then every argument left to
    /// right, expanding `*seq` and `**mapping`.
    fn eval_call(&mut self, func: ExprId, args: &[CallArg]) -> EvalResult {
        let callee = self.eval(func)?;
        let mut positional = Vec::with_capacity(args.len());
        let mut keywords: Vec<(Rc<str>, Value)> = Vec::new();
        for arg in args {
            let value = self.eval(arg.value)?;
            match arg.kind {
                ArgKind::Positional => positional.push(value),
                ArgKind::Starred => positional.extend(iterate(&value)?),
                ArgKind::Keyword(name) => {
                    push_keyword(&mut keywords, self.interner.lookup(name), value)?;
                }
                ArgKind::DoubleStarred => {
                    let Value::Dict(dict) = &value else {
                        return Err(type_error(format!(
                            "argument after ** must be a mapping, not {}",
                            value.type_name()
                        ))
                        .into());
                    };
                    let entries: Vec<(Value, Value)> = read(dict, "dict")?
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect();
                    for (key, value) in entries {
                        let Value::Str(key) = &key else {
                            return Err(type_error("keywords must be strings").into());
                        };
                        push_keyword(&mut keywords, Rc::clone(key), value)?;
                    }
                }
            }
        }
        self.call_value(&callee, &positional, &keywords)
    }

    /// Make a procedure from `params`, evaluating the defaults now in the
    /// current scope, and capture the current scope as its closure.
    pub(crate) fn make_procedure(
        &mut self,
        name: Rc<str>,
        params: &Params,
        body: ProcedureBody,
        doc: Option<Rc<str>>,
    ) -> Result<Procedure, ControlAction> {
        let mut formal = Vec::with_capacity(params.positional.len());
        for param in &params.positional {
            let default = match param.default {
                Some(default) => Some(self.eval(default)?),
                None => None,
            };
            formal.push(ProcedureParam {
                name: param.name,
                label: self.interner.lookup(param.name),
                default,
            });
        }
        let closure = self.env.capture_current();
        Ok(Procedure {
            name,
            params: formal,
            vararg: params.vararg.map(|name| (name, self.interner.lookup(name))),
            kwarg: params.kwarg.map(|name| (name, self.interner.lookup(name))),
            body,
            arena: Arc::clone(&self.arena),
            source: Arc::clone(&self.source),
            closure,
            doc,
        })
    }

    /// `[elt for ...]`, run in its own frame so loop variables do not leak.
    fn eval_list_comp(&mut self, elt: ExprId, generators: &[Comprehension]) -> EvalResult {
        let mut out = Vec::new();
        let mut iterations = 0;
        self.scoped()
            .comprehension(elt, generators, &mut out, &mut iterations)?;
        Ok(Value::list(out))
    }

    fn comprehension(
        &mut self,
        elt: ExprId,
        generators: &[Comprehension],
        out: &mut Vec<Value>,
        iterations: &mut u64,
    ) -> Result<(), ControlAction> {
        let Some((clause, rest)) = generators.split_first() else {
            let value = self.eval(elt)?;
            check_len(out.len() + 1)?;
            out.push(value);
            return Ok(());
        };
        let iterable = self.eval(clause.iter)?;
        'items: for item in iterate(&iterable)? {
            self.tick(iterations)?;
            self.assign_target(clause.target, item)?;
            for &condition in &clause.ifs {
                if !self.eval(condition)?.is_truthy()? {
                    continue 'items;
                }
            }
            self.comprehension(elt, rest, out, iterations)?;
        }
        Ok(())
    }

    /// Count one loop iteration against the per-loop limit and the step
    /// hook. Either one stopping evaluation is an abort.
    pub(crate) fn tick(&mut self, iterations: &mut u64) -> Result<(), ControlAction> {
        *iterations += 1;
        if let Some(limit) = self.limits.max_loop_iterations {
            if *iterations > limit {
                return Err(ControlAction::Abort(loop_limit(limit)));
            }
        }
        self.steps += 1;
        if let Some(hook) = self.step_hook.as_mut() {
            if let Err(reason) = hook(self.steps) {
                debug!(steps = self.steps, %reason, "step hook stopped evaluation");
                return Err(ControlAction::Abort(aborted_by_host(&reason)));
            }
        }
        Ok(())
    }
}

fn push_keyword(
    keywords: &mut Vec<(Rc<str>, Value)>,
    key: Rc<str>,
    value: Value,
) -> Result<(), ControlAction> {
    if keywords.iter().any(|(existing, _)| *existing == key) {
        return Err(duplicate_argument("call", &key).into());
    }
    keywords.push((key, value));
    Ok(())
}
