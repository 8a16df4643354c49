//! Numeric array capability.
//!
//! The evaluator never inspects array internals. Everything it does with an
//! array value (indexing, attributes, methods, operators, iteration) goes
//! through [`ArrayCapability`], a fixed interface with no reflection. The
//! bundled adapter is [`DenseArray`](crate::numeric::DenseArray); hosts may
//! inject their own.

use slate_ir::{BinaryOp, CmpOp, UnaryOp};

use crate::errors::{zero_slice_step, EvalError};
use crate::value::{Kwargs, Value};

/// Element type of an array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DType {
    Bool,
    Int,
    Float,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int => "int64",
            DType::Float => "float64",
        }
    }
}

/// Row-major copy of an array's contents.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayData {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
    pub dtype: DType,
}

/// `start:stop:step` with omitted parts left as `None`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

/// A slice resolved against a concrete length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSlice {
    pub start: i64,
    pub step: i64,
    pub count: usize,
}

impl ResolvedSlice {
    /// Selected positions, in slice order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..self.count).filter_map(move |k| {
            let k = i64::try_from(k).ok()?;
            let offset = k.checked_mul(self.step)?;
            usize::try_from(self.start.checked_add(offset)?).ok()
        })
    }

    /// End of a contiguous (`step == 1`) selection.
    pub fn end(self) -> usize {
        usize::try_from(self.start).unwrap_or(0) + self.count
    }
}

impl SliceSpec {
    /// Clamp the bounds to `len` the way sequence slicing does.
    pub fn resolve(self, len: usize) -> Result<ResolvedSlice, EvalError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(zero_slice_step());
        }
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let clamp = |bound: Option<i64>, default: i64, low: i64, high: i64| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(low),
            Some(b) => b.min(high),
        };
        let (start, stop) = if step > 0 {
            (clamp(self.start, 0, 0, len), clamp(self.stop, len, 0, len))
        } else {
            (
                clamp(self.start, len - 1, -1, len - 1),
                clamp(self.stop, -1, -1, len - 1),
            )
        };
        let count = if step > 0 && stop > start {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / step.saturating_neg() + 1
        } else {
            0
        };
        Ok(ResolvedSlice {
            start,
            step,
            count: usize::try_from(count).unwrap_or(0),
        })
    }
}

/// Index along one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexSpec {
    /// A single position; the axis is dropped from the result.
    Index(i64),
    /// A range of positions; the axis is kept.
    Slice(SliceSpec),
}

/// Operations the evaluator may perform on an array value.
pub trait ArrayCapability {
    /// Type name for messages and `isinstance`.
    fn type_name(&self) -> &'static str {
        "ndarray"
    }

    fn shape(&self) -> Vec<usize>;

    /// Length of the first axis (`len(a)`).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a data attribute (`shape`, `ndim`, ...).
    fn get_attr(&self, name: &str) -> Result<Value, EvalError>;

    /// Write a data attribute; read-only and unknown names fail with
    /// `AttributeError`.
    fn set_attr(&mut self, name: &str, value: &Value) -> Result<(), EvalError>;

    /// Static name of method `name`, if the array has one.
    fn method_name(&self, name: &str) -> Option<&'static str>;

    fn call_method(&self, name: &str, args: &[Value], kwargs: &Kwargs)
        -> Result<Value, EvalError>;

    /// One spec per leading axis. Scalar selections return scalars, any
    /// slice returns a new array.
    fn get_item(&self, index: &[IndexSpec]) -> Result<Value, EvalError>;

    fn set_item(&mut self, index: &[IndexSpec], value: &Value) -> Result<(), EvalError>;

    /// `self op other`, or `other op self` when `reflected`.
    fn binary_op(&self, op: BinaryOp, other: &Value, reflected: bool)
        -> Result<Value, EvalError>;

    fn unary_op(&self, op: UnaryOp) -> Result<Value, EvalError>;

    /// Elementwise comparison producing a boolean array.
    fn compare(&self, op: CmpOp, other: &Value, reflected: bool) -> Result<Value, EvalError>;

    /// Non-empty with every element non-zero.
    fn truthy(&self) -> bool;

    /// Items seen by iteration: scalars for 1-D arrays, sub-arrays
    /// otherwise.
    fn rows(&self) -> Vec<Value>;

    fn contains(&self, item: &Value) -> bool;

    /// Same shape and same elements.
    fn equals(&self, other: &dyn ArrayCapability) -> bool;

    /// Apply `f` to every element, producing a float array.
    fn map_float(&self, f: &dyn Fn(f64) -> f64) -> Value;

    fn snapshot(&self) -> ArrayData;

    fn repr(&self) -> String;

    /// `str()` text; defaults to the repr.
    fn display(&self) -> String {
        self.repr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn picked(spec: SliceSpec, len: usize) -> Vec<usize> {
        spec.resolve(len).unwrap().indices().collect()
    }

    fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> SliceSpec {
        SliceSpec { start, stop, step }
    }

    #[test]
    fn forward_slices() {
        assert_eq!(picked(slice(Some(1), Some(3), None), 5), [1, 2]);
        assert_eq!(picked(slice(None, None, None), 3), [0, 1, 2]);
        assert_eq!(picked(slice(Some(-2), None, None), 5), [3, 4]);
        assert_eq!(picked(slice(None, Some(100), Some(2)), 5), [0, 2, 4]);
        assert_eq!(picked(slice(Some(4), Some(1), None), 5), Vec::<usize>::new());
    }

    #[test]
    fn backward_slices() {
        assert_eq!(picked(slice(None, None, Some(-1)), 4), [3, 2, 1, 0]);
        assert_eq!(picked(slice(Some(3), Some(0), Some(-2)), 5), [3, 1]);
        assert_eq!(picked(slice(Some(-1), Some(-10), Some(-3)), 5), [4, 1]);
        assert_eq!(picked(slice(None, None, Some(-1)), 0), Vec::<usize>::new());
    }

    #[test]
    fn extreme_steps_keep_their_direction() {
        assert_eq!(picked(slice(None, None, Some(i64::MIN)), 3), [2]);
        assert_eq!(picked(slice(None, None, Some(-10)), 3), [2]);
        assert_eq!(picked(slice(None, None, Some(i64::MAX)), 3), [0]);
        assert_eq!(picked(slice(Some(1), None, Some(i64::MIN)), 3), [1]);
    }

    #[test]
    fn zero_step_is_an_error() {
        let err = slice(None, None, Some(0)).resolve(3).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::ValueError);
    }
}
