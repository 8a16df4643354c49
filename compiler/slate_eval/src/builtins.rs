//! Builtin functions and constants visible to scripts.
//!
//! Each builtin is a plain `fn(&[Value], &Kwargs)` in a static table; the
//! session binds the tables into the global scope when it is built. Only
//! the names listed here exist: there is no `open`, `eval`, `exec`,
//! `getattr` or `import` to reach.

use std::cmp::Ordering;
use std::f64::consts;

use slate_ir::BinaryOp;

use crate::array::DType;
use crate::errors::{
    integer_overflow, math_domain_error, no_keyword_arguments, type_error, unexpected_keyword,
    value_error, wrong_arg_count, ErrorKind, EvalError,
};
use crate::numeric::{shape_from_value, DenseArray};
use crate::operators::{evaluate_binary, order, sort_values};
use crate::value::{check_len, iterate, read, Builtin, Dict, Kwargs, Value};

/// Type constructors and general functions.
static CORE: &[Builtin] = &[
    Builtin { name: "abs", func: abs },
    Builtin { name: "all", func: all },
    Builtin { name: "any", func: any },
    Builtin { name: "bool", func: to_bool },
    Builtin { name: "dict", func: to_dict },
    Builtin { name: "enumerate", func: enumerate },
    Builtin { name: "float", func: to_float },
    Builtin { name: "int", func: to_int },
    Builtin { name: "isinstance", func: isinstance },
    Builtin { name: "len", func: len },
    Builtin { name: "list", func: to_list },
    Builtin { name: "max", func: max },
    Builtin { name: "min", func: min },
    Builtin { name: "range", func: range },
    Builtin { name: "repr", func: repr },
    Builtin { name: "reversed", func: reversed },
    Builtin { name: "round", func: round },
    Builtin { name: "sorted", func: sorted },
    Builtin { name: "str", func: to_str },
    Builtin { name: "sum", func: sum },
    Builtin { name: "tuple", func: to_tuple },
    Builtin { name: "zip", func: zip },
];

/// Math functions; the unary ones map elementwise over arrays.
static MATH: &[Builtin] = &[
    Builtin { name: "sqrt", func: sqrt },
    Builtin { name: "sin", func: sin },
    Builtin { name: "cos", func: cos },
    Builtin { name: "tan", func: tan },
    Builtin { name: "asin", func: asin },
    Builtin { name: "acos", func: acos },
    Builtin { name: "atan", func: atan },
    Builtin { name: "atan2", func: atan2 },
    Builtin { name: "exp", func: exp },
    Builtin { name: "log", func: log },
    Builtin { name: "log10", func: log10 },
    Builtin { name: "log2", func: log2 },
    Builtin { name: "floor", func: floor },
    Builtin { name: "ceil", func: ceil },
    Builtin { name: "fabs", func: fabs },
    Builtin { name: "pow", func: pow },
    Builtin { name: "hypot", func: hypot },
    Builtin { name: "degrees", func: degrees },
    Builtin { name: "radians", func: radians },
];

/// Array constructors.
static NUMERIC: &[Builtin] = &[
    Builtin { name: "array", func: array },
    Builtin { name: "arange", func: arange },
    Builtin { name: "zeros", func: zeros },
    Builtin { name: "ones", func: ones },
    Builtin { name: "linspace", func: linspace },
    Builtin { name: "ndarray", func: ndarray },
];

const CONSTANTS: &[(&str, f64)] = &[
    ("pi", consts::PI),
    ("e", consts::E),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

/// Builtin functions, math functions and constants.
pub fn core_builtins() -> impl Iterator<Item = (&'static str, Value)> {
    CORE.iter()
        .chain(MATH)
        .map(|builtin| (builtin.name, Value::Builtin(builtin)))
        .chain(CONSTANTS.iter().map(|&(name, x)| (name, Value::Float(x))))
}

/// Array constructors and the `ndarray` type.
pub fn numeric_builtins() -> impl Iterator<Item = (&'static str, Value)> {
    NUMERIC
        .iter()
        .map(|builtin| (builtin.name, Value::Builtin(builtin)))
}

// Argument helpers

fn arity<'a>(name: &str, args: &'a [Value], min: usize, max: usize) -> Result<&'a [Value], EvalError> {
    if (min..=max).contains(&args.len()) {
        return Ok(args);
    }
    let expected = match (min, max) {
        (0, 0) => "no arguments".to_string(),
        (min, max) if min == max => format!("exactly {min} argument{}", if min == 1 { "" } else { "s" }),
        (min, usize::MAX) => format!("at least {min} argument{}", if min == 1 { "" } else { "s" }),
        (min, max) => format!("from {min} to {max} arguments"),
    };
    Err(wrong_arg_count(name, &expected, args.len()))
}

fn no_kwargs(name: &str, kwargs: &Kwargs) -> Result<(), EvalError> {
    if kwargs.is_empty() {
        Ok(())
    } else {
        Err(no_keyword_arguments(name))
    }
}

/// The keyword arguments named in `allowed`, in that order.
fn keywords<const N: usize>(
    name: &str,
    kwargs: &Kwargs,
    allowed: [&str; N],
) -> Result<[Option<Value>; N], EvalError> {
    let mut found: [Option<Value>; N] = std::array::from_fn(|_| None);
    for (key, value) in kwargs {
        let slot = allowed
            .iter()
            .position(|allowed| **allowed == **key)
            .and_then(|i| found.get_mut(i))
            .ok_or_else(|| unexpected_keyword(name, key))?;
        *slot = Some(value.clone());
    }
    Ok(found)
}

fn float_arg(name: &str, value: &Value) -> Result<f64, EvalError> {
    value.as_float().ok_or_else(|| {
        type_error(format!(
            "{name}() argument must be a real number, not {}",
            value.type_name()
        ))
    })
}

fn int_arg(name: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or(0)),
        other => Err(type_error(format!(
            "{name}() argument must be an integer, not {}",
            other.type_name()
        ))),
    }
}

fn count_value(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Truncate a float to an integer, refusing NaN and out-of-range values.
pub(crate) fn float_to_int(x: f64) -> Result<i64, EvalError> {
    // 2^63 is exactly representable; every float below it truncates into
    // range.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_nan() {
        return Err(value_error("cannot convert float NaN to integer"));
    }
    let t = x.trunc();
    if t.is_infinite() || t >= LIMIT || t < -LIMIT {
        return Err(EvalError::new(
            ErrorKind::OverflowError,
            "cannot convert float to integer: value out of range",
        ));
    }
    #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
    let n = t as i64;
    Ok(n)
}

// Core

fn abs(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("abs", kwargs)?;
    match arity("abs", args, 1, 1)? {
        [Value::Int(n)] => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("abs")),
        [Value::Bool(b)] => Ok(Value::Int(i64::from(*b))),
        [Value::Float(x)] => Ok(Value::Float(x.abs())),
        [Value::Array(array)] => Ok(read(array, "ndarray")?.map_float(&f64::abs)),
        [other] => Err(type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
        _ => Ok(Value::None),
    }
}

fn all(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("all", kwargs)?;
    let [iterable] = arity("all", args, 1, 1)? else {
        return Ok(Value::None);
    };
    for item in iterate(iterable)? {
        if !item.is_truthy()? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn any(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("any", kwargs)?;
    let [iterable] = arity("any", args, 1, 1)? else {
        return Ok(Value::None);
    };
    for item in iterate(iterable)? {
        if item.is_truthy()? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn to_bool(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("bool", kwargs)?;
    match arity("bool", args, 0, 1)? {
        [value] => Ok(Value::Bool(value.is_truthy()?)),
        _ => Ok(Value::Bool(false)),
    }
}

fn to_dict(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let mut dict = Dict::new();
    if let [source] = arity("dict", args, 0, 1)? {
        dict.update_from(source)?;
    }
    for (key, value) in kwargs {
        dict.insert(Value::Str(key.clone()), value.clone())?;
    }
    Ok(Value::dict(dict))
}

fn enumerate(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [start_kw] = keywords("enumerate", kwargs, ["start"])?;
    let args = arity("enumerate", args, 1, 2)?;
    let start = match args.get(1).or(start_kw.as_ref()) {
        Some(start) => int_arg("enumerate", start)?,
        None => 0,
    };
    let items = iterate(&args[0])?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let index = i64::try_from(i)
            .ok()
            .and_then(|i| start.checked_add(i))
            .ok_or_else(|| integer_overflow("enumerate"))?;
        out.push(Value::tuple(vec![Value::Int(index), item]));
    }
    Ok(Value::list(out))
}

fn to_float(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("float", kwargs)?;
    match arity("float", args, 0, 1)? {
        [] => Ok(Value::Float(0.0)),
        [Value::Str(s)] => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| value_error(format!("could not convert string to float: {}", Value::Str(s.clone()).repr()))),
        [value] => Ok(Value::Float(float_arg("float", value)?)),
        _ => Ok(Value::None),
    }
}

fn to_int(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [base_kw] = keywords("int", kwargs, ["base"])?;
    let args = arity("int", args, 0, 2)?;
    let base = args.get(1).or(base_kw.as_ref());
    match (args.first(), base) {
        (None, _) => Ok(Value::Int(0)),
        (Some(Value::Str(s)), base) => {
            let radix = match base {
                Some(base) => int_arg("int", base)?,
                None => 10,
            };
            let radix = u32::try_from(radix)
                .ok()
                .filter(|r| (2..=36).contains(r))
                .ok_or_else(|| value_error("int() base must be >= 2 and <= 36"))?;
            let digits: String = s.trim().chars().filter(|&c| c != '_').collect();
            i64::from_str_radix(&digits, radix).map(Value::Int).map_err(|_| {
                value_error(format!(
                    "invalid literal for int() with base {radix}: {}",
                    Value::Str(s.clone()).repr()
                ))
            })
        }
        (Some(_), Some(_)) => Err(type_error("int() can't convert non-string with explicit base")),
        (Some(value @ (Value::Int(_) | Value::Bool(_))), None) => Ok(Value::Int(value.as_int().unwrap_or(0))),
        (Some(Value::Float(x)), None) => Ok(Value::Int(float_to_int(*x)?)),
        (Some(other), None) => Err(type_error(format!(
            "int() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Whether `value` is an instance of the type builtin `ty`.
fn instance_of(value: &Value, ty: &Value) -> Result<bool, EvalError> {
    let Value::Builtin(builtin) = ty else {
        return Err(type_error(
            "isinstance() arg 2 must be a type or tuple of types",
        ));
    };
    Ok(match builtin.name {
        "int" => matches!(value, Value::Int(_) | Value::Bool(_)),
        "float" => matches!(value, Value::Float(_)),
        "bool" => matches!(value, Value::Bool(_)),
        "str" => matches!(value, Value::Str(_)),
        "list" => matches!(value, Value::List(_)),
        "tuple" => matches!(value, Value::Tuple(_)),
        "dict" => matches!(value, Value::Dict(_)),
        "ndarray" => matches!(value, Value::Array(_)),
        _ => {
            return Err(type_error(
                "isinstance() arg 2 must be a type or tuple of types",
            ))
        }
    })
}

fn isinstance(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("isinstance", kwargs)?;
    let [value, types] = arity("isinstance", args, 2, 2)? else {
        return Ok(Value::None);
    };
    if let Value::Tuple(types) = types {
        for ty in types.iter() {
            if instance_of(value, ty)? {
                return Ok(Value::Bool(true));
            }
        }
        return Ok(Value::Bool(false));
    }
    Ok(Value::Bool(instance_of(value, types)?))
}

fn len(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("len", kwargs)?;
    let n = match arity("len", args, 1, 1)? {
        [Value::Str(s)] => s.chars().count(),
        [Value::List(items)] => read(items, "list")?.len(),
        [Value::Tuple(items)] => items.len(),
        [Value::Dict(dict)] => read(dict, "dict")?.len(),
        [Value::Array(array)] => read(array, "ndarray")?.len(),
        [other] => {
            return Err(type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
        _ => 0,
    };
    Ok(count_value(n))
}

fn to_list(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("list", kwargs)?;
    match arity("list", args, 0, 1)? {
        [iterable] => Ok(Value::list(iterate(iterable)?)),
        _ => Ok(Value::list(Vec::new())),
    }
}

fn to_tuple(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("tuple", kwargs)?;
    match arity("tuple", args, 0, 1)? {
        [Value::Tuple(items)] => Ok(Value::Tuple(items.clone())),
        [iterable] => Ok(Value::tuple(iterate(iterable)?)),
        _ => Ok(Value::tuple(Vec::new())),
    }
}

/// `max`/`min`: the item that orders `want` against every other.
fn extreme(name: &str, args: &[Value], kwargs: &Kwargs, want: Ordering) -> Result<Value, EvalError> {
    let [default] = keywords(name, kwargs, ["default"])?;
    let items = match arity(name, args, 1, usize::MAX)? {
        [single] => iterate(single)?,
        many => many.to_vec(),
    };
    let mut best: Option<Value> = None;
    for item in items {
        let replace = match &best {
            None => true,
            Some(current) => order(&item, current)? == Some(want),
        };
        if replace {
            best = Some(item);
        }
    }
    best.or(default)
        .ok_or_else(|| value_error(format!("{name}() arg is an empty sequence")))
}

fn max(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    extreme("max", args, kwargs, Ordering::Greater)
}

fn min(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    extreme("min", args, kwargs, Ordering::Less)
}

/// `range(stop)`, `range(start, stop[, step])`, materialized as a list.
fn range(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("range", kwargs)?;
    let args = arity("range", args, 1, 3)?;
    let ints = args
        .iter()
        .map(|arg| int_arg("range", arg))
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => (0, 0, 1),
    };
    if step == 0 {
        return Err(value_error("range() arg 3 must not be zero"));
    }
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let count = if step > 0 && start < stop {
        (stop - start - 1) / step + 1
    } else if step < 0 && start > stop {
        (start - stop - 1) / -step + 1
    } else {
        0
    };
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    check_len(count)?;
    let items = (0..count)
        .map(|k| {
            let k = i128::try_from(k).unwrap_or(0);
            Value::Int(i64::try_from(start + k * step).unwrap_or(0))
        })
        .collect();
    Ok(Value::list(items))
}

fn repr(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("repr", kwargs)?;
    let [value] = arity("repr", args, 1, 1)? else {
        return Ok(Value::None);
    };
    Ok(Value::str(&value.try_repr()?))
}

fn reversed(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("reversed", kwargs)?;
    let [sequence] = arity("reversed", args, 1, 1)? else {
        return Ok(Value::None);
    };
    let mut items = iterate(sequence)?;
    items.reverse();
    Ok(Value::list(items))
}

/// Round half to even, like the scripting language's `round`.
fn round(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [ndigits_kw] = keywords("round", kwargs, ["ndigits"])?;
    let args = arity("round", args, 1, 2)?;
    let ndigits = match args.get(1).or(ndigits_kw.as_ref()) {
        None | Some(Value::None) => None,
        Some(n) => Some(int_arg("round", n)?),
    };
    let ndigits = ndigits.map(|n| i32::try_from(n.clamp(-400, 400)).unwrap_or(0));
    let round_to = move |x: f64| match ndigits {
        None => x.round_ties_even(),
        Some(n) => {
            let factor = 10f64.powi(n);
            let rounded = (x * factor).round_ties_even() / factor;
            if rounded.is_finite() {
                rounded
            } else {
                x
            }
        }
    };
    match (&args[0], ndigits) {
        (Value::Int(_) | Value::Bool(_), None) => Ok(Value::Int(args[0].as_int().unwrap_or(0))),
        (Value::Int(n), Some(digits)) if digits >= 0 => Ok(Value::Int(*n)),
        #[expect(clippy::cast_precision_loss, reason = "negative ndigits round through float")]
        (Value::Int(n), Some(_)) => Ok(Value::Int(float_to_int(round_to(*n as f64))?)),
        (Value::Float(x), None) => Ok(Value::Int(float_to_int(round_to(*x))?)),
        (Value::Float(x), Some(_)) => Ok(Value::Float(round_to(*x))),
        (Value::Array(array), _) => Ok(read(array, "ndarray")?.map_float(&round_to)),
        (other, _) => Err(type_error(format!(
            "type {} doesn't define __round__ method",
            other.type_name()
        ))),
    }
}

fn sorted(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [reverse] = keywords("sorted", kwargs, ["reverse"])?;
    let [iterable] = arity("sorted", args, 1, 1)? else {
        return Ok(Value::None);
    };
    let reverse = match reverse {
        Some(flag) => flag.is_truthy()?,
        None => false,
    };
    Ok(Value::list(sort_values(iterate(iterable)?, reverse)?))
}

fn to_str(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("str", kwargs)?;
    match arity("str", args, 0, 1)? {
        [Value::Str(s)] => Ok(Value::Str(s.clone())),
        [value] => Ok(Value::str(&value.try_str()?)),
        _ => Ok(Value::str("")),
    }
}

fn sum(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [start_kw] = keywords("sum", kwargs, ["start"])?;
    let args = arity("sum", args, 1, 2)?;
    let mut total = args
        .get(1)
        .or(start_kw.as_ref())
        .cloned()
        .unwrap_or(Value::Int(0));
    if matches!(total, Value::Str(_)) {
        return Err(type_error("sum() can't sum strings [use ''.join(seq) instead]"));
    }
    for item in iterate(&args[0])? {
        total = evaluate_binary(BinaryOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn zip(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("zip", kwargs)?;
    let columns = args.iter().map(iterate).collect::<Result<Vec<_>, _>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let items = (0..rows)
        .map(|i| Value::tuple(columns.iter().filter_map(|c| c.get(i).cloned()).collect()))
        .collect();
    Ok(Value::list(items))
}

// Math

/// Apply `op` to one number, or elementwise to an array. Scalars outside
/// `domain` are a `ValueError`; finite inputs with infinite results are an
/// `OverflowError`.
fn unary_math(
    name: &str,
    args: &[Value],
    kwargs: &Kwargs,
    op: fn(f64) -> f64,
    domain: fn(f64) -> bool,
) -> Result<Value, EvalError> {
    no_kwargs(name, kwargs)?;
    let [x] = arity(name, args, 1, 1)? else {
        return Ok(Value::None);
    };
    if let Value::Array(array) = x {
        return Ok(read(array, "ndarray")?.map_float(&op));
    }
    let x = float_arg(name, x)?;
    if !x.is_nan() && !domain(x) {
        return Err(math_domain_error());
    }
    let result = op(x);
    if result.is_infinite() && x.is_finite() {
        return Err(EvalError::new(ErrorKind::OverflowError, "math range error"));
    }
    Ok(Value::Float(result))
}

macro_rules! math_functions {
    ($($name:ident => $op:expr, $domain:expr;)*) => {
        $(
            fn $name(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
                unary_math(stringify!($name), args, kwargs, $op, $domain)
            }
        )*
    };
}

math_functions! {
    sqrt => f64::sqrt, |x| x >= 0.0;
    sin => f64::sin, f64::is_finite;
    cos => f64::cos, f64::is_finite;
    tan => f64::tan, f64::is_finite;
    asin => f64::asin, |x| (-1.0..=1.0).contains(&x);
    acos => f64::acos, |x| (-1.0..=1.0).contains(&x);
    atan => f64::atan, |_| true;
    exp => f64::exp, |_| true;
    log10 => f64::log10, |x| x > 0.0;
    log2 => f64::log2, |x| x > 0.0;
    fabs => f64::abs, |_| true;
    degrees => f64::to_degrees, |_| true;
    radians => f64::to_radians, |_| true;
}

/// `floor`/`ceil`: integers for scalars, float arrays for arrays.
fn integral(name: &str, args: &[Value], kwargs: &Kwargs, op: fn(f64) -> f64) -> Result<Value, EvalError> {
    no_kwargs(name, kwargs)?;
    match arity(name, args, 1, 1)? {
        [value @ (Value::Int(_) | Value::Bool(_))] => Ok(Value::Int(value.as_int().unwrap_or(0))),
        [Value::Array(array)] => Ok(read(array, "ndarray")?.map_float(&op)),
        [value] => Ok(Value::Int(float_to_int(op(float_arg(name, value)?))?)),
        _ => Ok(Value::None),
    }
}

fn floor(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    integral("floor", args, kwargs, f64::floor)
}

fn ceil(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    integral("ceil", args, kwargs, f64::ceil)
}

/// `log(x[, base])`
fn log(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("log", kwargs)?;
    let args = arity("log", args, 1, 2)?;
    let base = match args.get(1) {
        Some(base) => {
            let base = float_arg("log", base)?;
            if base <= 0.0 {
                return Err(math_domain_error());
            }
            if base == 1.0 {
                return Err(EvalError::new(ErrorKind::ZeroDivisionError, "float division by zero"));
            }
            Some(base)
        }
        None => None,
    };
    let ln = move |x: f64| match base {
        Some(base) => x.ln() / base.ln(),
        None => x.ln(),
    };
    if let Value::Array(array) = &args[0] {
        return Ok(read(array, "ndarray")?.map_float(&ln));
    }
    let x = float_arg("log", &args[0])?;
    if x <= 0.0 {
        return Err(math_domain_error());
    }
    Ok(Value::Float(ln(x)))
}

/// Two-argument float function; either side may be an array when the
/// other is a number.
fn binary_math(name: &str, args: &[Value], kwargs: &Kwargs, op: fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    no_kwargs(name, kwargs)?;
    let [a, b] = arity(name, args, 2, 2)? else {
        return Ok(Value::None);
    };
    match (a, b) {
        (Value::Array(_), Value::Array(_)) => Err(type_error(format!(
            "{name}() takes at most one array argument"
        ))),
        (Value::Array(array), other) => {
            let y = float_arg(name, other)?;
            Ok(read(array, "ndarray")?.map_float(&|x| op(x, y)))
        }
        (other, Value::Array(array)) => {
            let x = float_arg(name, other)?;
            Ok(read(array, "ndarray")?.map_float(&|y| op(x, y)))
        }
        (a, b) => Ok(Value::Float(op(float_arg(name, a)?, float_arg(name, b)?))),
    }
}

fn atan2(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    binary_math("atan2", args, kwargs, f64::atan2)
}

fn hypot(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    binary_math("hypot", args, kwargs, f64::hypot)
}

/// `pow(x, y)` follows the `**` operator.
fn pow(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    no_kwargs("pow", kwargs)?;
    let [base, exponent] = arity("pow", args, 2, 2)? else {
        return Ok(Value::None);
    };
    evaluate_binary(BinaryOp::Pow, base, exponent)
}

// Numeric arrays

/// `dtype=` argument: a type builtin or a dtype name.
fn dtype_arg(value: Option<&Value>) -> Result<Option<DType>, EvalError> {
    let name: &str = match value {
        None | Some(Value::None) => return Ok(None),
        Some(Value::Builtin(builtin)) => builtin.name,
        Some(Value::Str(s)) => s,
        Some(other) => {
            return Err(type_error(format!(
                "data type not understood: {}",
                other.repr()
            )))
        }
    };
    match name {
        "bool" => Ok(Some(DType::Bool)),
        "int" | "int64" => Ok(Some(DType::Int)),
        "float" | "float64" => Ok(Some(DType::Float)),
        other => Err(type_error(format!("data type '{other}' not understood"))),
    }
}

fn array(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [dtype_kw] = keywords("array", kwargs, ["dtype"])?;
    let args = arity("array", args, 1, 2)?;
    let array = DenseArray::from_value(&args[0])?;
    Ok(match dtype_arg(args.get(1).or(dtype_kw.as_ref()))? {
        Some(dtype) => Value::array(array.astype(dtype)),
        None => Value::array(array),
    })
}

fn arange(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [dtype_kw] = keywords("arange", kwargs, ["dtype"])?;
    let args = arity("arange", args, 1, 3)?;
    let numbers = args
        .iter()
        .map(|arg| float_arg("arange", arg))
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0.0, *stop, 1.0),
        [start, stop] => (*start, *stop, 1.0),
        [start, stop, step] => (*start, *stop, *step),
        _ => (0.0, 0.0, 1.0),
    };
    let all_ints = args.iter().all(|arg| matches!(arg, Value::Int(_) | Value::Bool(_)));
    let dtype = dtype_arg(dtype_kw.as_ref())?.unwrap_or(if all_ints { DType::Int } else { DType::Float });
    Ok(Value::array(DenseArray::arange(start, stop, step, dtype)?))
}

fn filled(name: &str, args: &[Value], kwargs: &Kwargs, fill: f64) -> Result<Value, EvalError> {
    let [dtype_kw] = keywords(name, kwargs, ["dtype"])?;
    let args = arity(name, args, 1, 2)?;
    let shape = shape_from_value(&args[0], None)?;
    let dtype = dtype_arg(args.get(1).or(dtype_kw.as_ref()))?.unwrap_or(DType::Float);
    Ok(Value::array(DenseArray::filled(shape, fill, dtype)?))
}

fn zeros(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    filled("zeros", args, kwargs, 0.0)
}

fn ones(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    filled("ones", args, kwargs, 1.0)
}

/// `ndarray(shape)`: a zero-filled float array.
fn ndarray(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    filled("ndarray", args, kwargs, 0.0)
}

fn linspace(args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let [num_kw] = keywords("linspace", kwargs, ["num"])?;
    let args = arity("linspace", args, 2, 3)?;
    let start = float_arg("linspace", &args[0])?;
    let stop = float_arg("linspace", &args[1])?;
    let num = match args.get(2).or(num_kw.as_ref()) {
        Some(num) => int_arg("linspace", num)?,
        None => 50,
    };
    let num = usize::try_from(num)
        .map_err(|_| value_error(format!("number of samples, {num}, must be non-negative")))?;
    Ok(Value::array(DenseArray::linspace(start, stop, num)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let (_, value) = core_builtins()
            .chain(numeric_builtins())
            .find(|(builtin, _)| *builtin == name)
            .unwrap();
        let Value::Builtin(builtin) = value else {
            panic!("{name} is not a function");
        };
        (builtin.func)(args, &[])
    }

    #[test]
    fn round_half_to_even() {
        assert_eq!(call("round", &[Value::Float(2.5)]).unwrap(), Value::Int(2));
        assert_eq!(call("round", &[Value::Float(3.5)]).unwrap(), Value::Int(4));
        assert_eq!(call("round", &[Value::Float(-0.5)]).unwrap(), Value::Int(0));
        assert_eq!(
            call("round", &[Value::Float(1.25), Value::Int(1)]).unwrap(),
            Value::Float(1.2)
        );
    }

    #[test]
    fn range_materializes_a_list() {
        assert_eq!(call("range", &[Value::Int(3)]).unwrap().repr(), "[0, 1, 2]");
        assert_eq!(
            call("range", &[Value::Int(10), Value::Int(0), Value::Int(-3)]).unwrap().repr(),
            "[10, 7, 4, 1]"
        );
        let err = call("range", &[Value::Int(0), Value::Int(1), Value::Int(0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = call("range", &[Value::Int(i64::MAX)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RuntimeError);
    }

    #[test]
    fn conversions() {
        assert_eq!(call("int", &["  42 ".into()]).unwrap(), Value::Int(42));
        assert_eq!(call("int", &["ff".into(), Value::Int(16)]).unwrap(), Value::Int(255));
        assert_eq!(call("int", &[Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        assert_eq!(call("float", &["1e3".into()]).unwrap(), Value::Float(1000.0));
        assert_eq!(call("str", &[Value::Float(1.0)]).unwrap(), Value::str("1.0"));
        let err = call("int", &["x".into()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = call("int", &[Value::Float(f64::NAN)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn isinstance_accepts_tuples_of_types() {
        let (_, int_type) = core_builtins().find(|(name, _)| *name == "int").unwrap();
        let (_, str_type) = core_builtins().find(|(name, _)| *name == "str").unwrap();
        assert_eq!(call("isinstance", &[Value::Bool(true), int_type.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(
            call("isinstance", &[Value::Float(1.0), Value::tuple(vec![int_type, str_type])]).unwrap(),
            Value::Bool(false)
        );
        let err = call("isinstance", &[Value::Int(1), Value::Int(1)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn max_min_and_sum() {
        let items = Value::list(vec![Value::Int(3), Value::Float(7.5), Value::Int(-1)]);
        assert_eq!(call("max", &[items.clone()]).unwrap(), Value::Float(7.5));
        assert_eq!(call("min", &[Value::Int(4), Value::Int(2)]).unwrap(), Value::Int(2));
        assert_eq!(call("sum", &[items]).unwrap(), Value::Float(9.5));
        let err = call("max", &[Value::list(vec![])]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn zip_stops_at_the_shortest() {
        let zipped = call("zip", &[
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            "ab".into(),
        ])
        .unwrap();
        assert_eq!(zipped.repr(), "[(1, 'a'), (2, 'b')]");
    }

    #[test]
    fn math_domain_and_arrays() {
        assert_eq!(call("sqrt", &[Value::Int(16)]).unwrap(), Value::Float(4.0));
        let err = call("sqrt", &[Value::Int(-1)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = call("log", &[Value::Int(0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        assert_eq!(call("floor", &[Value::Float(-1.5)]).unwrap(), Value::Int(-2));
        assert_eq!(call("log", &[Value::Int(8), Value::Int(2)]).unwrap(), Value::Float(3.0));

        let array = call("array", &[Value::list(vec![Value::Int(1), Value::Int(4)])]).unwrap();
        assert_eq!(call("sqrt", &[array]).unwrap().repr(), "array([1.0, 2.0])");
    }

    #[test]
    fn array_constructors() {
        assert_eq!(call("arange", &[Value::Int(3)]).unwrap().repr(), "array([0, 1, 2])");
        assert_eq!(
            call("zeros", &[Value::tuple(vec![Value::Int(2), Value::Int(2)])]).unwrap().repr(),
            "array([[0.0, 0.0], [0.0, 0.0]])"
        );
        assert_eq!(
            call("linspace", &[Value::Int(0), Value::Int(1), Value::Int(3)]).unwrap().repr(),
            "array([0.0, 0.5, 1.0])"
        );
        let err = call("array", &[Value::Int(3)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }
}
