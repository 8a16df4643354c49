//! Runtime values.
//!
//! `Value` is a closed enum: every operator, builtin and method matches on
//! it exhaustively, so adding a kind forces a review of each of them.
//!
//! Containers are shared by reference (`Rc<RefCell<..>>`): mutating a list
//! through one binding is visible through every other binding of it. The
//! numeric array kind is only reachable through the [`ArrayCapability`]
//! trait.
//!
//! [`ArrayCapability`]: crate::array::ArrayCapability

mod dict;
mod format;
mod procedure;
mod string_format;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

pub use dict::{Dict, HashKey};
pub use format::{format_float, quote_str};
pub use procedure::{BoundMethod, Procedure, ProcedureBody, ProcedureParam};
pub use string_format::{format_method, percent_format};

use crate::array::ArrayCapability;
use crate::errors::{container_busy, nesting_too_deep, not_iterable, sequence_too_long, EvalError};

/// Longest list, tuple, string or array a script may build in one step.
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

/// Container nesting beyond which comparison, hashing and `repr` give up
/// with a `RuntimeError`.
pub const MAX_NESTING_DEPTH: usize = 256;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<Dict>>;
pub type ArrayRef = Rc<RefCell<dyn ArrayCapability>>;

/// Keyword arguments as passed to builtins and methods.
pub type Kwargs = [(Rc<str>, Value)];

/// Native implementation of a builtin function.
pub type BuiltinFn = fn(&[Value], &Kwargs) -> Result<Value, EvalError>;

/// A host-provided function visible to scripts.
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// A script value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(ListRef),
    Tuple(Rc<[Value]>),
    Dict(DictRef),
    Array(ArrayRef),
    Procedure(Rc<Procedure>),
    Builtin(&'static Builtin),
    BoundMethod(Rc<BoundMethod>),
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::from(items))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn array(array: impl ArrayCapability + 'static) -> Value {
        let shared: ArrayRef = Rc::new(RefCell::new(array));
        Value::Array(shared)
    }

    /// Type name as shown in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Array(array) => array.try_borrow().map_or("ndarray", |a| a.type_name()),
            Value::Procedure(_) => "procedure",
            Value::Builtin(_) => "builtin_function",
            Value::BoundMethod(_) => "method",
        }
    }

    /// Truthiness coercion used by conditions and boolean operators.
    pub fn is_truthy(&self) -> Result<bool, EvalError> {
        Ok(match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !read(items, "list")?.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !read(dict, "dict")?.is_empty(),
            Value::Array(array) => read(array, "ndarray")?.truthy(),
            Value::Procedure(_) | Value::Builtin(_) | Value::BoundMethod(_) => true,
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Integer view of `int` and `bool` values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Float view of any real number.
    #[expect(
        clippy::cast_precision_loss,
        reason = "int to float promotion follows the scripting language"
    )]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }

    /// Structural equality (`==` for everything but arrays, which compare
    /// elementwise in the `==` operator).
    ///
    /// Fails only when the values nest deeper than [`MAX_NESTING_DEPTH`].
    pub fn equals(&self, other: &Value) -> Result<bool, EvalError> {
        self.equals_at(other, 0)
    }

    fn equals_at(&self, other: &Value, depth: usize) -> Result<bool, EvalError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(nesting_too_deep("in comparison"));
        }
        Ok(match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                match (a.try_borrow(), b.try_borrow()) {
                    (Ok(a), Ok(b)) => return sequences_equal(&a, &b, depth),
                    _ => false,
                }
            }
            (Value::Tuple(a), Value::Tuple(b)) => return sequences_equal(a, b, depth),
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                match (a.try_borrow(), b.try_borrow()) {
                    (Ok(a), Ok(b)) => return dicts_equal(&a, &b, depth),
                    _ => false,
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                match (a.try_borrow(), b.try_borrow()) {
                    (Ok(a), Ok(b)) => a.equals(&*b),
                    _ => false,
                }
            }
            (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => {
                a.name == b.name && a.receiver.is_same(&b.receiver)
            }
            (a, b) if a.is_number() && b.is_number() => numbers_equal(a, b),
            _ => false,
        })
    }

    /// Identity (`is`): scalars by value, containers and callables by
    /// reference.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `repr()` text, with containers nested too deep cut short as `...`.
    pub fn repr(&self) -> String {
        format::render(self, true)
    }

    /// `repr()` as a script sees it: nesting too deep to print fails.
    pub fn try_repr(&self) -> Result<String, EvalError> {
        format::try_render(self, true)
    }

    /// `str()` as a script sees it.
    pub fn try_str(&self) -> Result<String, EvalError> {
        format::try_render(self, false)
    }
}

fn sequences_equal(a: &[Value], b: &[Value], depth: usize) -> Result<bool, EvalError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !x.equals_at(y, depth + 1)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn dicts_equal(a: &Dict, b: &Dict, depth: usize) -> Result<bool, EvalError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (key, value) in a.iter() {
        let Ok(Some(other)) = b.get(key) else {
            return Ok(false);
        };
        if !value.equals_at(&other, depth + 1)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// `str()` text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::render(self, false))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.equals(other), Ok(true))
    }
}

/// Containers are taken apart with a worklist, so dropping a list nested
/// many thousands of levels deep stays within the stack.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(self, &mut pending);
        while let Some(mut value) = pending.pop() {
            take_children(&mut value, &mut pending);
        }
    }
}

/// Move the elements of `value` into `out` if `value` holds the last
/// reference to its container.
fn take_children(value: &mut Value, out: &mut Vec<Value>) {
    match value {
        Value::List(items) => {
            if let Some(items) = Rc::get_mut(items) {
                out.append(items.get_mut());
            }
        }
        Value::Tuple(items) => {
            if let Some(items) = Rc::get_mut(items) {
                out.extend(items.iter_mut().map(|item| std::mem::replace(item, Value::None)));
            }
        }
        Value::Dict(dict) => {
            if let Some(dict) = Rc::get_mut(dict) {
                dict.get_mut().drain_into(out);
            }
        }
        Value::Procedure(procedure) => {
            if let Some(procedure) = Rc::get_mut(procedure) {
                out.extend(procedure.params.iter_mut().filter_map(|param| param.default.take()));
            }
        }
        Value::BoundMethod(method) => {
            if let Some(method) = Rc::get_mut(method) {
                out.push(std::mem::replace(&mut method.receiver, Value::None));
            }
        }
        _ => {}
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

/// The items a `for` loop, unpacking or a sequence builtin sees.
///
/// Lists are snapshotted, so mutating a list while looping over it never
/// invalidates the loop.
pub fn iterate(value: &Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(read(items, "list")?.clone()),
        Value::Tuple(items) => Ok(items.to_vec()),
        Value::Str(s) => Ok(s
            .chars()
            .map(|c| Value::Str(Rc::from(c.to_string())))
            .collect()),
        Value::Dict(dict) => Ok(read(dict, "dict")?.keys().cloned().collect()),
        Value::Array(array) => Ok(read(array, "ndarray")?.rows()),
        other => Err(not_iterable(other.type_name())),
    }
}

/// Fail when a sequence about to be built would exceed [`MAX_SEQUENCE_LEN`].
pub fn check_len(len: usize) -> Result<(), EvalError> {
    if len > MAX_SEQUENCE_LEN {
        Err(sequence_too_long(len, MAX_SEQUENCE_LEN))
    } else {
        Ok(())
    }
}

/// Borrow a container for reading, reporting re-entrant use as an error.
pub(crate) fn read<'a, T: ?Sized>(
    cell: &'a RefCell<T>,
    type_name: &str,
) -> Result<Ref<'a, T>, EvalError> {
    cell.try_borrow().map_err(|_| container_busy(type_name))
}

/// Borrow a container for writing, reporting re-entrant use as an error.
pub(crate) fn write<'a, T: ?Sized>(
    cell: &'a RefCell<T>,
    type_name: &str,
) -> Result<RefMut<'a, T>, EvalError> {
    cell.try_borrow_mut().map_err(|_| container_busy(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;

    fn nested(depth: usize, wrap: fn(Value) -> Value) -> Value {
        (0..depth).fold(Value::list(Vec::new()), |inner, _| wrap(inner))
    }

    #[test]
    fn deep_containers_drop_iteratively() {
        drop(nested(200_000, |inner| Value::list(vec![inner])));
        drop(nested(200_000, |inner| Value::tuple(vec![inner, Value::Int(1)])));
    }

    #[test]
    fn equality_refuses_runaway_nesting() {
        let left = nested(MAX_NESTING_DEPTH + 10, |inner| Value::list(vec![inner]));
        let right = nested(MAX_NESTING_DEPTH + 10, |inner| Value::list(vec![inner]));
        let err = left.equals(&right).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RuntimeError);
        assert!(left != right);

        let shallow = nested(8, |inner| Value::list(vec![inner]));
        assert_eq!(shallow.equals(&nested(8, |inner| Value::list(vec![inner]))), Ok(true));
    }

    #[test]
    fn shared_children_survive_their_parent() {
        let shared = Value::list(vec![Value::Int(7)]);
        drop(Value::list(vec![shared.clone(), shared.clone()]));
        assert_eq!(shared.repr(), "[7]");
    }
}
