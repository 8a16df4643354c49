//! Unary operator implementations for the evaluator.

use slate_ir::UnaryOp;

use crate::errors::{bad_unary_operand, integer_overflow, EvalError};
use crate::value::{read, Value};

/// Evaluate `op operand`.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    if op == UnaryOp::Not {
        return Ok(Value::Bool(!operand.is_truthy()?));
    }
    match operand {
        Value::Array(array) => read(array, "ndarray")?.unary_op(op),
        Value::Int(n) => eval_int_unary(*n, op),
        Value::Bool(b) => eval_int_unary(i64::from(*b), op),
        Value::Float(x) => match op {
            UnaryOp::Neg => Ok(Value::Float(-x)),
            UnaryOp::Pos => Ok(Value::Float(*x)),
            _ => Err(bad_unary_operand(op.as_symbol(), "float")),
        },
        other => Err(bad_unary_operand(op.as_symbol(), other.type_name())),
    }
}

fn eval_int_unary(n: i64, op: UnaryOp) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        UnaryOp::Invert => Ok(Value::Int(!n)),
        UnaryOp::Pos | UnaryOp::Not => Ok(Value::Int(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_uses_truthiness() {
        assert_eq!(evaluate_unary(UnaryOp::Not, &Value::list(vec![])).unwrap(), Value::Bool(true));
        assert_eq!(evaluate_unary(UnaryOp::Not, &Value::str("x")).unwrap(), Value::Bool(false));
        assert_eq!(evaluate_unary(UnaryOp::Not, &Value::None).unwrap(), Value::Bool(true));
    }

    #[test]
    fn numeric_unary() {
        assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::Int(3)).unwrap(), Value::Int(-3));
        assert_eq!(evaluate_unary(UnaryOp::Invert, &Value::Int(5)).unwrap(), Value::Int(-6));
        assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::Bool(true)).unwrap(), Value::Int(-1));
        assert_eq!(evaluate_unary(UnaryOp::Pos, &Value::Float(2.5)).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn negating_min_overflows() {
        let err = evaluate_unary(UnaryOp::Neg, &Value::Int(i64::MIN)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OverflowError);
    }

    #[test]
    fn unsupported_operands_are_type_errors() {
        let err = evaluate_unary(UnaryOp::Neg, &Value::str("a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        let err = evaluate_unary(UnaryOp::Invert, &Value::Float(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }
}
