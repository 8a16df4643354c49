//! Binary operator and comparison implementations for the evaluator.
//!
//! Direct enum-based dispatch: the value kinds are a closed set, so each
//! operator is a match over operand kinds. An array on either side hands
//! the whole operation to its [`ArrayCapability`](crate::array::ArrayCapability).

use std::cmp::Ordering;
use std::rc::Rc;

use slate_ir::{BinaryOp, CmpOp};

use crate::errors::{
    division_by_zero, integer_overflow, modulo_by_zero, nesting_too_deep, not_comparable,
    type_error, unsupported_operands, value_error, ErrorKind, EvalError,
};
use crate::value::{check_len, percent_format, read, Value, MAX_NESTING_DEPTH};

// Helper functions for repetitive checked arithmetic patterns

/// Checked integer arithmetic where the only failure is overflow.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> Result<Value, EvalError> {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Repetition count of `n * seq`; only ints and bools repeat.
fn repeat_count(value: &Value) -> Option<i64> {
    match value {
        Value::Int(_) | Value::Bool(_) => value.as_int(),
        _ => None,
    }
}

/// Total length of `count` copies of `len` items, checked against the
/// sequence limit.
fn repeated_len(len: usize, count: i64) -> Result<usize, EvalError> {
    let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
    let total = len.checked_mul(count).unwrap_or(usize::MAX);
    check_len(total)?;
    Ok(total)
}

fn repeat_items(items: &[Value], count: i64) -> Result<Vec<Value>, EvalError> {
    let total = repeated_len(items.len(), count)?;
    let mut out = Vec::with_capacity(total);
    while out.len() < total {
        out.extend_from_slice(items);
    }
    Ok(out)
}

// Direct Dispatch Function

/// Evaluate `left op right`.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Array(array), _) => read(array, "ndarray")?.binary_op(op, right, false),
        (_, Value::Array(array)) => read(array, "ndarray")?.binary_op(op, left, true),
        (Value::Bool(a), Value::Bool(b))
            if matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) =>
        {
            Ok(Value::Bool(match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            }))
        }
        (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
            let (a, b) = (left.as_int().unwrap_or(0), right.as_int().unwrap_or(0));
            eval_int_binary(a, b, op)
        }
        (Value::Int(_) | Value::Bool(_) | Value::Float(_), Value::Int(_) | Value::Bool(_) | Value::Float(_)) => {
            let (a, b) = (left.as_float().unwrap_or(0.0), right.as_float().unwrap_or(0.0));
            eval_float_binary(a, b, op, left, right)
        }
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            check_len(a.len() + b.len())?;
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::str(&joined))
        }
        (Value::Str(s), n) | (n, Value::Str(s))
            if op == BinaryOp::Mul && repeat_count(n).is_some() =>
        {
            let count = repeat_count(n).unwrap_or(0);
            repeated_len(s.len(), count)?;
            Ok(Value::str(&s.repeat(usize::try_from(count).unwrap_or(0))))
        }
        (Value::Str(format), args) if op == BinaryOp::Mod => {
            Ok(Value::str(&percent_format(format, args)?))
        }
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => {
            let mut items = read(a, "list")?.clone();
            items.extend(read(b, "list")?.iter().cloned());
            check_len(items.len())?;
            Ok(Value::list(items))
        }
        (Value::List(items), n) | (n, Value::List(items))
            if op == BinaryOp::Mul && repeat_count(n).is_some() =>
        {
            let items = read(items, "list")?.clone();
            Ok(Value::list(repeat_items(&items, repeat_count(n).unwrap_or(0))?))
        }
        (Value::Tuple(a), Value::Tuple(b)) if op == BinaryOp::Add => {
            check_len(a.len() + b.len())?;
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Tuple(items), n) | (n, Value::Tuple(items))
            if op == BinaryOp::Mul && repeat_count(n).is_some() =>
        {
            Ok(Value::tuple(repeat_items(items, repeat_count(n).unwrap_or(0))?))
        }
        _ => Err(unsupported_operands(
            op.as_symbol(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// Integer arithmetic with overflow detection and floor semantics for
/// `//` and `%`.
fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            #[expect(
                clippy::cast_precision_loss,
                reason = "true division promotes to float"
            )]
            let quotient = a as f64 / b as f64;
            Ok(Value::Float(quotient))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            let quotient = a
                .checked_div(b)
                .ok_or_else(|| integer_overflow("floor division"))?;
            let adjust = a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0));
            Ok(Value::Int(if adjust { quotient - 1 } else { quotient }))
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            let r = a.wrapping_rem(b);
            Ok(Value::Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }))
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(EvalError::new(
                        ErrorKind::ZeroDivisionError,
                        "0.0 cannot be raised to a negative power",
                    ));
                }
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "negative exponents promote to float"
                )]
                let result = (a as f64).powf(b as f64);
                return Ok(Value::Float(result));
            }
            let exp = u32::try_from(b).map_err(|_| integer_overflow("exponentiation"))?;
            checked_arith(a.checked_pow(exp), "exponentiation")
        }
        BinaryOp::LShift => {
            if b < 0 {
                return Err(value_error("negative shift count"));
            }
            if a == 0 {
                return Ok(Value::Int(0));
            }
            let shift = u32::try_from(b)
                .ok()
                .filter(|&s| s < 64)
                .ok_or_else(|| integer_overflow("left shift"))?;
            let shifted = a << shift;
            if shifted >> shift == a {
                Ok(Value::Int(shifted))
            } else {
                Err(integer_overflow("left shift"))
            }
        }
        BinaryOp::RShift => {
            if b < 0 {
                return Err(value_error("negative shift count"));
            }
            let shift = u32::try_from(b).unwrap_or(u32::MAX).min(63);
            Ok(Value::Int(a >> shift))
        }
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
    }
}

/// Float arithmetic; at least one operand was a float.
fn eval_float_binary(
    a: f64,
    b: f64,
    op: BinaryOp,
    left: &Value,
    right: &Value,
) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(EvalError::new(
                    ErrorKind::ZeroDivisionError,
                    "float floor division by zero",
                ));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::new(ErrorKind::ZeroDivisionError, "float modulo"));
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(EvalError::new(
                    ErrorKind::ZeroDivisionError,
                    "0.0 cannot be raised to a negative power",
                ));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(value_error(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            let result = a.powf(b);
            if result.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(EvalError::new(
                    ErrorKind::OverflowError,
                    "numerical result out of range",
                ));
            }
            result
        }
        BinaryOp::LShift
        | BinaryOp::RShift
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor => {
            return Err(unsupported_operands(
                op.as_symbol(),
                left.type_name(),
                right.type_name(),
            ))
        }
    };
    Ok(Value::Float(result))
}

// Comparisons

/// Evaluate one link of a comparison chain.
///
/// Arrays compare elementwise and produce arrays; everything else produces
/// a bool.
pub fn evaluate_compare(op: CmpOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        CmpOp::Is => return Ok(Value::Bool(left.is_same(right))),
        CmpOp::IsNot => return Ok(Value::Bool(!left.is_same(right))),
        CmpOp::In => return Ok(Value::Bool(contains(right, left)?)),
        CmpOp::NotIn => return Ok(Value::Bool(!contains(right, left)?)),
        _ => {}
    }
    if let Value::Array(array) = left {
        return read(array, "ndarray")?.compare(op, right, false);
    }
    if let Value::Array(array) = right {
        return read(array, "ndarray")?.compare(op, left, true);
    }
    let result = match op {
        CmpOp::Eq => left.equals(right)?,
        CmpOp::NotEq => !left.equals(right)?,
        _ => {
            let ordering = order(left, right).map_err(|err| match err.kind {
                ErrorKind::TypeError => {
                    not_comparable(op.as_symbol(), left.type_name(), right.type_name())
                }
                _ => err,
            })?;
            match (op, ordering) {
                (_, None) => false,
                (CmpOp::Lt, Some(o)) => o == Ordering::Less,
                (CmpOp::LtE, Some(o)) => o != Ordering::Greater,
                (CmpOp::Gt, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            }
        }
    };
    Ok(Value::Bool(result))
}

/// `item in container`.
pub fn contains(container: &Value, item: &Value) -> Result<bool, EvalError> {
    match container {
        Value::List(items) => any_equal(&read(items, "list")?, item),
        Value::Tuple(items) => any_equal(items, item),
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            other => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Dict(dict) => read(dict, "dict")?.contains_key(item),
        Value::Array(array) => Ok(read(array, "ndarray")?.contains(item)),
        other => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

fn any_equal(items: &[Value], item: &Value) -> Result<bool, EvalError> {
    for x in items {
        if x.equals(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Ordering used by `<`, `sorted`, `min` and `max`.
///
/// `Ok(None)` when the values are comparable but unordered (NaN);
/// `TypeError` when the kinds cannot be ordered at all.
pub fn order(left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    order_at(left, right, 0)
}

fn order_at(left: &Value, right: &Value, depth: usize) -> Result<Option<Ordering>, EvalError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(nesting_too_deep("in comparison"));
    }
    match (left, right) {
        (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
            Ok(left.as_int().zip(right.as_int()).map(|(a, b)| a.cmp(&b)))
        }
        (a, b) if a.is_number() && b.is_number() => Ok(a
            .as_float()
            .zip(b.as_float())
            .and_then(|(x, y)| x.partial_cmp(&y))),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            let a: Rc<[Value]> = Rc::from(read(a, "list")?.as_slice());
            let b: Rc<[Value]> = Rc::from(read(b, "list")?.as_slice());
            order_sequences(&a, &b, depth)
        }
        (Value::Tuple(a), Value::Tuple(b)) => order_sequences(a, b, depth),
        _ => Err(not_comparable("<", left.type_name(), right.type_name())),
    }
}

fn order_sequences(a: &[Value], b: &[Value], depth: usize) -> Result<Option<Ordering>, EvalError> {
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y)? {
            return order_at(x, y, depth + 1);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// Stable merge sort with a fallible comparison.
///
/// Unordered pairs (NaN) keep their input order.
pub fn sort_values(items: Vec<Value>, reverse: bool) -> Result<Vec<Value>, EvalError> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut right = items;
    let left: Vec<Value> = right.drain(..right.len() / 2).collect();
    let left = sort_values(left, reverse)?;
    let right = sort_values(right, reverse)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let ordering = if reverse { order(l, r)? } else { order(r, l)? };
        // Take from the right run only when it is strictly first.
        let take_right = ordering == Some(Ordering::Less);
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
        evaluate_binary(op, &left, &right)
    }

    #[test]
    fn floor_division_rounds_toward_negative_infinity() {
        assert_eq!(binary(BinaryOp::FloorDiv, Value::Int(-7), Value::Int(2)).unwrap(), Value::Int(-4));
        assert_eq!(binary(BinaryOp::Mod, Value::Int(-7), Value::Int(2)).unwrap(), Value::Int(1));
        assert_eq!(binary(BinaryOp::Mod, Value::Int(7), Value::Int(-2)).unwrap(), Value::Int(-1));
        assert_eq!(
            binary(BinaryOp::FloorDiv, Value::Float(-7.0), Value::Int(2)).unwrap(),
            Value::Float(-4.0)
        );
    }

    #[test]
    fn integer_overflow_is_reported() {
        let err = binary(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OverflowError);
        let err = binary(BinaryOp::Pow, Value::Int(10), Value::Int(40)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OverflowError);
        let err = binary(BinaryOp::LShift, Value::Int(1), Value::Int(64)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OverflowError);
    }

    #[test]
    fn division_by_zero_kinds() {
        for op in [BinaryOp::Div, BinaryOp::FloorDiv, BinaryOp::Mod] {
            let err = binary(op, Value::Int(1), Value::Int(0)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::ZeroDivisionError);
            let err = binary(op, Value::Float(1.0), Value::Float(0.0)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::ZeroDivisionError);
        }
    }

    #[test]
    fn true_division_and_negative_powers_give_floats() {
        assert_eq!(binary(BinaryOp::Div, Value::Int(7), Value::Int(2)).unwrap(), Value::Float(3.5));
        assert_eq!(binary(BinaryOp::Pow, Value::Int(2), Value::Int(-1)).unwrap(), Value::Float(0.5));
    }

    #[test]
    fn sequence_operators() {
        assert_eq!(binary(BinaryOp::Add, "ab".into(), "cd".into()).unwrap(), Value::str("abcd"));
        assert_eq!(binary(BinaryOp::Mul, "ab".into(), Value::Int(3)).unwrap(), Value::str("ababab"));
        assert_eq!(binary(BinaryOp::Mul, Value::Int(2), "x".into()).unwrap(), Value::str("xx"));
        let list = Value::list(vec![Value::Int(1)]);
        assert_eq!(
            binary(BinaryOp::Mul, list, Value::Int(3)).unwrap(),
            Value::list(vec![Value::Int(1), Value::Int(1), Value::Int(1)])
        );
        let tuple = Value::tuple(vec![Value::str("a"), Value::str("b"), Value::Int(123)]);
        let err = binary(BinaryOp::Mul, "a string".into(), tuple).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn repetition_is_capped() {
        let err = binary(BinaryOp::Mul, Value::list(vec![Value::Int(1)]), Value::Int(i64::MAX)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RuntimeError);
    }

    #[test]
    fn mixed_kinds_are_type_errors() {
        let err = binary(BinaryOp::Add, Value::Int(0), "a string".into()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        let err = binary(BinaryOp::BitAnd, Value::Float(1.0), Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn bool_bitwise_stays_bool() {
        assert_eq!(binary(BinaryOp::BitAnd, Value::Bool(true), Value::Bool(false)).unwrap(), Value::Bool(false));
        assert_eq!(binary(BinaryOp::Add, Value::Bool(true), Value::Bool(true)).unwrap(), Value::Int(2));
    }

    #[test]
    fn ordering_rules() {
        let cmp = |op, l: Value, r: Value| evaluate_compare(op, &l, &r).unwrap();
        assert_eq!(cmp(CmpOp::Lt, Value::Int(1), Value::Float(1.5)), Value::Bool(true));
        assert_eq!(cmp(CmpOp::Lt, "abc".into(), "abd".into()), Value::Bool(true));
        assert_eq!(
            cmp(
                CmpOp::Lt,
                Value::tuple(vec![Value::Int(1), Value::Int(2)]),
                Value::tuple(vec![Value::Int(1), Value::Int(3)])
            ),
            Value::Bool(true)
        );
        assert_eq!(cmp(CmpOp::GtE, Value::Float(f64::NAN), Value::Int(0)), Value::Bool(false));
        let err = evaluate_compare(CmpOp::Lt, &Value::Int(1), &Value::str("a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn membership() {
        let list = Value::list(vec![Value::Int(1), Value::str("a")]);
        assert!(contains(&list, &Value::Float(1.0)).unwrap());
        assert!(contains(&Value::str("haystack"), &Value::str("st")).unwrap());
        assert!(contains(&Value::str("abc"), &Value::Int(1)).is_err());
        assert!(contains(&Value::Int(3), &Value::Int(1)).is_err());
    }

    #[test]
    fn sort_is_stable_and_reversible() {
        let items = vec![Value::Int(3), Value::Float(1.0), Value::Int(2), Value::Int(1)];
        let sorted = sort_values(items.clone(), false).unwrap();
        assert_eq!(
            sorted.iter().map(Value::repr).collect::<Vec<_>>(),
            ["1.0", "1", "2", "3"]
        );
        let reversed = sort_values(items, true).unwrap();
        assert_eq!(
            reversed.iter().map(Value::repr).collect::<Vec<_>>(),
            ["3", "2", "1.0", "1"]
        );
        assert!(sort_values(vec![Value::Int(1), Value::str("a")], false).is_err());
    }
}
