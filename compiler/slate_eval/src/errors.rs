//! Error types for evaluation.
//!
//! Every failure the evaluator can report is an [`EvalError`]: a kind from
//! the fixed [`ErrorKind`] taxonomy, a message, and the source position of
//! the innermost node that failed. Factory functions build the common
//! errors so messages stay uniform across the evaluator.
//!
//! Non-local control flow (`break`, `continue`, `return`, host aborts)
//! travels in the `Err` arm of [`EvalResult`] as a [`ControlAction`]. An
//! `EvalError` converts into `ControlAction::Error`, so `?` works on both.

use std::fmt;

use slate_ir::{LineIndex, SourceLocation, Span};

use crate::value::Value;

/// Result of evaluating an expression or statement.
pub type EvalResult = Result<Value, ControlAction>;

/// Error taxonomy.
///
/// Only the kind is part of the stable contract; messages are advisory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SyntaxError,
    NameError,
    TypeError,
    ZeroDivisionError,
    AttributeError,
    IndexError,
    NotImplementedError,
    KeyError,
    ValueError,
    OverflowError,
    RuntimeError,
}

impl ErrorKind {
    /// Name of the kind as reported to hosts (`"TypeError"`).
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::NameError => "NameError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ZeroDivisionError => "ZeroDivisionError",
            ErrorKind::AttributeError => "AttributeError",
            ErrorKind::IndexError => "IndexError",
            ErrorKind::NotImplementedError => "NotImplementedError",
            ErrorKind::KeyError => "KeyError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::OverflowError => "OverflowError",
            ErrorKind::RuntimeError => "RuntimeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Innermost node that failed, once known.
    pub span: Option<Span>,
    /// Line and column of `span` in the source it was evaluated from.
    pub location: Option<SourceLocation>,
    /// Text of the source line containing `span`.
    pub source_line: Option<String>,
}

impl EvalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            span: None,
            location: None,
            source_line: None,
        }
    }

    /// Attach the failing node's position, unless one is already set.
    ///
    /// Errors are raised deep inside operators with no position; each
    /// enclosing node offers its span on the way out and only the innermost
    /// one sticks.
    #[must_use]
    pub fn at(mut self, span: Span, source: &str) -> Self {
        if self.span.is_none() {
            let index = LineIndex::new(source);
            let location = index.locate(source, span.start);
            self.source_line = index
                .line_text(source, location.line)
                .map(|line| line.trim().to_string());
            self.location = Some(location);
            self.span = Some(span);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for EvalError {}

/// Non-local exits carried through the `Err` arm of [`EvalResult`].
#[derive(Clone, Debug)]
pub enum ControlAction {
    /// A recoverable failure; abandons the current top-level statement.
    Error(EvalError),
    /// `break` out of the innermost loop.
    Break,
    /// `continue` with the innermost loop's next iteration.
    Continue,
    /// `return` from the innermost procedure.
    Return(Value),
    /// The host stopped evaluation (step hook or loop limit); ends the
    /// whole `interp` call.
    Abort(EvalError),
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(err)
    }
}

impl ControlAction {
    /// Convert a control signal that escaped its construct into an error.
    pub fn into_error(self) -> EvalError {
        match self {
            ControlAction::Error(err) | ControlAction::Abort(err) => err,
            ControlAction::Break => runtime_error("'break' outside loop"),
            ControlAction::Continue => runtime_error("'continue' not properly in loop"),
            ControlAction::Return(_) => runtime_error("'return' outside function"),
        }
    }

    /// Attach `span` to a carried error; control signals pass through.
    #[must_use]
    pub fn at(self, span: Span, source: &str) -> Self {
        match self {
            ControlAction::Error(err) => ControlAction::Error(err.at(span, source)),
            ControlAction::Abort(err) => ControlAction::Abort(err.at(span, source)),
            other => other,
        }
    }
}

// Names and scopes

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalError::new(ErrorKind::NameError, format!("name '{name}' is not defined"))
}

#[cold]
pub fn unbound_local(name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::NameError,
        format!("cannot access local variable '{name}' where it is not associated with a value"),
    )
}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(ErrorKind::ZeroDivisionError, "division by zero")
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::new(ErrorKind::ZeroDivisionError, "integer division or modulo by zero")
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::new(
        ErrorKind::OverflowError,
        format!("integer overflow in {operation}"),
    )
}

#[cold]
pub fn math_domain_error() -> EvalError {
    EvalError::new(ErrorKind::ValueError, "math domain error")
}

// Operators

#[cold]
pub fn unsupported_operands(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("unsupported operand type(s) for {op}: '{left}' and '{right}'"),
    )
}

#[cold]
pub fn bad_unary_operand(op: &str, type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("bad operand type for unary {op}: '{type_name}'"),
    )
}

#[cold]
pub fn not_comparable(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("'{op}' not supported between instances of '{left}' and '{right}'"),
    )
}

// Containers

#[cold]
pub fn index_out_of_range(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::IndexError,
        format!("{type_name} index out of range"),
    )
}

#[cold]
pub fn invalid_index_type(container: &str, index: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("{container} indices must be integers or slices, not {index}"),
    )
}

#[cold]
pub fn not_subscriptable(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("'{type_name}' object is not subscriptable"),
    )
}

#[cold]
pub fn item_assignment_unsupported(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("'{type_name}' object does not support item assignment"),
    )
}

#[cold]
pub fn item_deletion_unsupported(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("'{type_name}' object does not support item deletion"),
    )
}

#[cold]
pub fn key_not_found(key_repr: &str) -> EvalError {
    EvalError::new(ErrorKind::KeyError, key_repr)
}

#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("unhashable type: '{type_name}'"),
    )
}

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("'{type_name}' object is not iterable"),
    )
}

#[cold]
pub fn zero_slice_step() -> EvalError {
    EvalError::new(ErrorKind::ValueError, "slice step cannot be zero")
}

#[cold]
pub fn unpack_mismatch(expected: usize, got: usize) -> EvalError {
    let message = if got > expected {
        format!("too many values to unpack (expected {expected})")
    } else {
        format!("not enough values to unpack (expected {expected}, got {got})")
    };
    EvalError::new(ErrorKind::ValueError, message)
}

#[cold]
pub fn sequence_too_long(len: usize, limit: usize) -> EvalError {
    EvalError::new(
        ErrorKind::RuntimeError,
        format!("sequence of length {len} exceeds the limit of {limit}"),
    )
}

#[cold]
pub fn nesting_too_deep(operation: &str) -> EvalError {
    EvalError::new(
        ErrorKind::RuntimeError,
        format!("maximum recursion depth exceeded {operation}"),
    )
}

#[cold]
pub fn ambiguous_array_truth() -> EvalError {
    EvalError::new(
        ErrorKind::ValueError,
        "the truth value of an array in a comparison chain is ambiguous; use a.any() or a.all()",
    )
}

#[cold]
pub fn format_field_too_large(field: &str, value: usize, limit: usize) -> EvalError {
    EvalError::new(
        ErrorKind::ValueError,
        format!("format {field} {value} exceeds the limit of {limit}"),
    )
}

#[cold]
pub fn container_busy(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::RuntimeError,
        format!("{type_name} changed while it was in use"),
    )
}

// Attributes

#[cold]
pub fn no_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ErrorKind::AttributeError,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

#[cold]
pub fn read_only_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ErrorKind::AttributeError,
        format!("attribute '{attr}' of '{type_name}' objects is not writable"),
    )
}

#[cold]
pub fn attribute_deletion(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ErrorKind::AttributeError,
        format!("cannot delete attribute '{attr}' of '{type_name}' object"),
    )
}

#[cold]
pub fn dunder_attribute(attr: &str) -> EvalError {
    EvalError::new(
        ErrorKind::AttributeError,
        format!("access to attribute '{attr}' is not allowed"),
    )
}

// Calls

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("'{type_name}' object is not callable"),
    )
}

#[cold]
pub fn missing_arguments(func: &str, names: &[&str]) -> EvalError {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    let noun = if names.len() == 1 {
        "argument"
    } else {
        "arguments"
    };
    EvalError::new(
        ErrorKind::TypeError,
        format!(
            "{func}() missing {} required {noun}: {}",
            names.len(),
            quoted.join(", ")
        ),
    )
}

#[cold]
pub fn too_many_positional(func: &str, expected: usize, got: usize) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("{func}() takes {expected} positional arguments but {got} were given"),
    )
}

#[cold]
pub fn unexpected_keyword(func: &str, keyword: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("{func}() got an unexpected keyword argument '{keyword}'"),
    )
}

#[cold]
pub fn duplicate_argument(func: &str, name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("{func}() got multiple values for argument '{name}'"),
    )
}

#[cold]
pub fn wrong_arg_count(func: &str, expected: &str, got: usize) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("{func}() takes {expected} ({got} given)"),
    )
}

#[cold]
pub fn no_keyword_arguments(func: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeError,
        format!("{func}() takes no keyword arguments"),
    )
}

#[cold]
pub fn recursion_limit(depth: usize) -> EvalError {
    EvalError::new(
        ErrorKind::RuntimeError,
        format!("maximum recursion depth exceeded (limit: {depth})"),
    )
}

// Host limits

#[cold]
pub fn loop_limit(limit: u64) -> EvalError {
    EvalError::new(
        ErrorKind::RuntimeError,
        format!("loop iteration limit of {limit} exceeded"),
    )
}

#[cold]
pub fn aborted_by_host(reason: &str) -> EvalError {
    EvalError::new(
        ErrorKind::RuntimeError,
        format!("evaluation aborted: {reason}"),
    )
}

// Generic

#[cold]
pub fn not_implemented(construct: &str) -> EvalError {
    EvalError::new(
        ErrorKind::NotImplementedError,
        format!("'{construct}' is not supported"),
    )
}

#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::TypeError, message)
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::ValueError, message)
}

#[cold]
pub fn runtime_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::RuntimeError, message)
}
