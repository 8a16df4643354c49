//! `DenseArray`: the bundled numeric array adapter.
//!
//! Stores row-major `f64` data with a logical element type. Integer and
//! boolean arrays keep integral values in the `f64` slots, so every
//! elementwise kernel is one float loop followed by a cast back to the
//! result type.

use std::fmt::Write as _;

use slate_ir::{BinaryOp, CmpOp, UnaryOp};

use crate::array::{ArrayCapability, ArrayData, DType, IndexSpec};
use crate::errors::{
    bad_unary_operand, no_attribute, no_keyword_arguments, read_only_attribute, type_error,
    unexpected_keyword, unsupported_operands, value_error, wrong_arg_count, ErrorKind, EvalError,
};
use crate::value::{check_len, format_float, iterate, read, Kwargs, Value};

/// Methods callable on an array value.
const METHODS: &[&str] = &[
    "reshape", "sum", "mean", "min", "max", "copy", "tolist", "flatten", "transpose", "all",
    "any",
];

/// Data attributes; only `shape` is writable.
const ATTRIBUTES: &[&str] = &["shape", "ndim", "size", "dtype", "T"];

/// N-dimensional array of numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseArray {
    shape: Vec<usize>,
    data: Vec<f64>,
    dtype: DType,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Reduction {
    Sum,
    Mean,
    Min,
    Max,
    All,
    Any,
}

impl DenseArray {
    /// Build an array; `data` must hold exactly `shape.product()` items.
    pub fn new(shape: Vec<usize>, data: Vec<f64>, dtype: DType) -> Result<Self, EvalError> {
        if shape.is_empty() {
            return Err(value_error("arrays need at least one dimension"));
        }
        let size = checked_size(&shape)?;
        if size != data.len() {
            return Err(value_error(format!(
                "cannot build an array of shape {} from {} values",
                shape_text(&shape),
                data.len()
            )));
        }
        let data = data.into_iter().map(|x| cast(dtype, x)).collect();
        Ok(DenseArray { shape, data, dtype })
    }

    /// 1-D array.
    pub fn vector(data: Vec<f64>, dtype: DType) -> Self {
        let data: Vec<f64> = data.into_iter().map(|x| cast(dtype, x)).collect();
        DenseArray {
            shape: vec![data.len()],
            data,
            dtype,
        }
    }

    /// Convert nested lists/tuples of numbers (or an array) to an array.
    pub fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Array(array) => {
                let data = read(array, "ndarray")?.snapshot();
                DenseArray::new(data.shape, data.data, data.dtype)
            }
            Value::List(_) | Value::Tuple(_) => {
                let shape = nested_shape(value)?;
                let mut data = Vec::new();
                let mut dtype = DType::Bool;
                flatten_into(value, &shape, 0, &mut data, &mut dtype)?;
                if data.is_empty() {
                    dtype = DType::Float;
                }
                DenseArray::new(shape, data, dtype)
            }
            other => Err(type_error(format!(
                "array() argument must be a sequence, not {}",
                other.type_name()
            ))),
        }
    }

    /// `arange(start, stop, step)`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "element count is checked against the sequence limit first"
    )]
    pub fn arange(start: f64, stop: f64, step: f64, dtype: DType) -> Result<Self, EvalError> {
        if step == 0.0 {
            return Err(value_error("arange() step must not be zero"));
        }
        let span = ((stop - start) / step).ceil();
        if !span.is_finite() {
            return Err(value_error("arange() bounds must be finite"));
        }
        let count = if span > 0.0 { span } else { 0.0 };
        if count > crate::value::MAX_SEQUENCE_LEN as f64 {
            return Err(crate::errors::sequence_too_long(
                usize::MAX,
                crate::value::MAX_SEQUENCE_LEN,
            ));
        }
        let count = count as usize;
        let data = (0..count).map(|i| start + i as f64 * step).collect();
        Ok(DenseArray::vector(data, dtype))
    }

    /// Array of `shape` with every element `fill`.
    pub fn filled(shape: Vec<usize>, fill: f64, dtype: DType) -> Result<Self, EvalError> {
        let size = checked_size(&shape)?;
        DenseArray::new(shape, vec![fill; size], dtype)
    }

    /// `num` evenly spaced floats from `start` to `stop` inclusive.
    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts are far below 2^53"
    )]
    pub fn linspace(start: f64, stop: f64, num: usize) -> Result<Self, EvalError> {
        check_len(num)?;
        let data = match num {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (num - 1) as f64;
                (0..num)
                    .map(|i| if i + 1 == num { stop } else { start + i as f64 * step })
                    .collect()
            }
        };
        Ok(DenseArray::vector(data, DType::Float))
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Copy converted to another element type.
    #[must_use]
    pub fn astype(&self, dtype: DType) -> Self {
        DenseArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| cast(dtype, x)).collect(),
            dtype,
        }
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn ndim(&self) -> usize {
        self.shape.len()
    }

    fn at(&self, offset: usize) -> f64 {
        self.data.get(offset).copied().unwrap_or(f64::NAN)
    }

    fn scalar(&self, x: f64) -> Value {
        scalar_value(self.dtype, x)
    }

    /// Flat offsets selected by `index` (row-major) and the shape of the
    /// kept axes.
    fn selection(&self, index: &[IndexSpec]) -> Result<(Vec<usize>, Vec<usize>), EvalError> {
        if index.len() > self.ndim() {
            return Err(EvalError::new(
                ErrorKind::IndexError,
                format!(
                    "too many indices for array: array is {}-dimensional, but {} were indexed",
                    self.ndim(),
                    index.len()
                ),
            ));
        }
        let strides = strides(&self.shape);
        let mut offsets = vec![0usize];
        let mut kept = Vec::new();
        for (axis, (&dim, &stride)) in self.shape.iter().zip(&strides).enumerate() {
            let positions: Vec<usize> = match index.get(axis) {
                Some(IndexSpec::Index(i)) => vec![normalize_index(*i, dim, axis)?],
                Some(IndexSpec::Slice(slice)) => {
                    let positions: Vec<usize> = slice.resolve(dim)?.indices().collect();
                    kept.push(positions.len());
                    positions
                }
                None => {
                    kept.push(dim);
                    (0..dim).collect()
                }
            };
            offsets = offsets
                .iter()
                .flat_map(|&base| positions.iter().map(move |&p| base + p * stride))
                .collect();
        }
        Ok((offsets, kept))
    }

    fn reshaped(&self, shape: Vec<usize>) -> Result<Self, EvalError> {
        DenseArray::new(shape, self.data.clone(), self.dtype)
    }

    /// Reverse the axis order.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let shape: Vec<usize> = self.shape.iter().rev().copied().collect();
        let source_strides = strides(&self.shape);
        let mut data = Vec::with_capacity(self.size());
        let mut position = vec![0usize; shape.len()];
        for _ in 0..self.size() {
            // `position` indexes the transposed array; its reverse indexes
            // the source.
            let offset: usize = position
                .iter()
                .rev()
                .zip(&source_strides)
                .map(|(p, s)| p * s)
                .sum();
            data.push(self.at(offset));
            for axis in (0..shape.len()).rev() {
                position[axis] += 1;
                if position[axis] < shape[axis] {
                    break;
                }
                position[axis] = 0;
            }
        }
        DenseArray {
            shape,
            data,
            dtype: self.dtype,
        }
    }

    fn to_list(&self) -> Value {
        self.nested_list(0, 0, &strides(&self.shape))
    }

    fn nested_list(&self, axis: usize, offset: usize, strides: &[usize]) -> Value {
        let dim = self.shape.get(axis).copied().unwrap_or(0);
        let stride = strides.get(axis).copied().unwrap_or(1);
        let items = (0..dim)
            .map(|i| {
                if axis + 1 == self.ndim() {
                    self.scalar(self.at(offset + i))
                } else {
                    self.nested_list(axis + 1, offset + i * stride, strides)
                }
            })
            .collect();
        Value::list(items)
    }

    fn reduce(&self, kind: Reduction, axis: Option<usize>) -> Result<Value, EvalError> {
        let dtype = match kind {
            Reduction::Sum => self.dtype.max(DType::Int),
            Reduction::Mean => DType::Float,
            Reduction::Min | Reduction::Max => self.dtype,
            Reduction::All | Reduction::Any => DType::Bool,
        };
        let Some(axis) = axis else {
            let result = fold(kind, &self.data)?;
            return Ok(scalar_value(dtype, result));
        };
        let dim = self.shape.get(axis).copied().unwrap_or(1);
        let outer: usize = self.shape[..axis].iter().product();
        let inner: usize = self.shape[axis + 1..].iter().product();
        let mut data = Vec::with_capacity(outer * inner);
        let mut lane = Vec::with_capacity(dim);
        for o in 0..outer {
            for i in 0..inner {
                lane.clear();
                lane.extend((0..dim).map(|j| self.at((o * dim + j) * inner + i)));
                data.push(fold(kind, &lane)?);
            }
        }
        let mut shape = self.shape.clone();
        shape.remove(axis);
        if shape.is_empty() {
            return Ok(scalar_value(dtype, data.first().copied().unwrap_or(0.0)));
        }
        Ok(Value::array(DenseArray::new(shape, data, dtype)?))
    }

    fn axis_argument(&self, method: &str, args: &[Value], kwargs: &Kwargs) -> Result<Option<usize>, EvalError> {
        if args.len() > 1 {
            return Err(wrong_arg_count(method, "at most 1 argument", args.len()));
        }
        let mut axis = args.first().cloned();
        for (key, value) in kwargs {
            if &**key == "axis" && axis.is_none() {
                axis = Some(value.clone());
            } else {
                return Err(unexpected_keyword(method, key));
            }
        }
        match axis {
            None | Some(Value::None) => Ok(None),
            Some(value) => {
                let ndim = i64::try_from(self.ndim()).unwrap_or(i64::MAX);
                let raw = value
                    .as_int()
                    .ok_or_else(|| type_error("axis must be an integer"))?;
                let axis = if raw < 0 { raw + ndim } else { raw };
                if (0..ndim).contains(&axis) {
                    Ok(usize::try_from(axis).ok())
                } else {
                    Err(value_error(format!(
                        "axis {raw} is out of bounds for array of dimension {ndim}"
                    )))
                }
            }
        }
    }

    fn write_nested(&self, out: &mut String, axis: usize, offset: usize, strides: &[usize], repr: bool) {
        out.push('[');
        let dim = self.shape.get(axis).copied().unwrap_or(0);
        let stride = strides.get(axis).copied().unwrap_or(1);
        let innermost = axis + 1 == self.ndim();
        for i in 0..dim {
            if i > 0 {
                match (repr, innermost) {
                    (true, _) => out.push_str(", "),
                    (false, true) => out.push(' '),
                    (false, false) => {
                        out.push('\n');
                        out.push_str(&" ".repeat(axis + 1));
                    }
                }
            }
            if innermost {
                out.push_str(&self.element_text(self.at(offset + i)));
            } else {
                self.write_nested(out, axis + 1, offset + i * stride, strides, repr);
            }
        }
        out.push(']');
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "integer arrays only hold integral values"
    )]
    fn element_text(&self, x: f64) -> String {
        match self.dtype {
            DType::Bool => if x != 0.0 { "True" } else { "False" }.to_string(),
            DType::Int => format!("{}", x as i64),
            DType::Float => format_float(x),
        }
    }
}

impl ArrayCapability for DenseArray {
    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    fn get_attr(&self, name: &str) -> Result<Value, EvalError> {
        match name {
            "shape" => Ok(shape_tuple(&self.shape)),
            "ndim" => Ok(Value::Int(i64::try_from(self.ndim()).unwrap_or(i64::MAX))),
            "size" => Ok(Value::Int(i64::try_from(self.size()).unwrap_or(i64::MAX))),
            "dtype" => Ok(Value::str(self.dtype.name())),
            "T" => Ok(Value::array(self.transposed())),
            _ => Err(no_attribute("ndarray", name)),
        }
    }

    fn set_attr(&mut self, name: &str, value: &Value) -> Result<(), EvalError> {
        match name {
            "shape" => {
                let shape = shape_from_value(value, Some(self.size()))?;
                if checked_size(&shape)? != self.size() || shape.is_empty() {
                    return Err(reshape_error(self.size(), &shape));
                }
                self.shape = shape;
                Ok(())
            }
            _ if ATTRIBUTES.contains(&name) || METHODS.contains(&name) => {
                Err(read_only_attribute("ndarray", name))
            }
            _ => Err(no_attribute("ndarray", name)),
        }
    }

    fn method_name(&self, name: &str) -> Option<&'static str> {
        METHODS.iter().find(|method| **method == name).copied()
    }

    fn call_method(&self, name: &str, args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
        let reduction = match name {
            "sum" => Some(Reduction::Sum),
            "mean" => Some(Reduction::Mean),
            "min" => Some(Reduction::Min),
            "max" => Some(Reduction::Max),
            "all" => Some(Reduction::All),
            "any" => Some(Reduction::Any),
            _ => None,
        };
        if let Some(kind) = reduction {
            let axis = self.axis_argument(name, args, kwargs)?;
            return self.reduce(kind, axis);
        }
        if !kwargs.is_empty() {
            return Err(no_keyword_arguments(name));
        }
        match name {
            "reshape" => {
                let shape = match args {
                    [single @ (Value::Tuple(_) | Value::List(_))] => {
                        shape_from_value(single, Some(self.size()))?
                    }
                    dims => shape_from_value(&Value::tuple(dims.to_vec()), Some(self.size()))?,
                };
                if shape.is_empty() || checked_size(&shape)? != self.size() {
                    return Err(reshape_error(self.size(), &shape));
                }
                Ok(Value::array(self.reshaped(shape)?))
            }
            "copy" | "flatten" | "tolist" | "transpose" if !args.is_empty() => {
                Err(wrong_arg_count(name, "no arguments", args.len()))
            }
            "copy" => Ok(Value::array(self.clone())),
            "flatten" => Ok(Value::array(DenseArray::vector(self.data.clone(), self.dtype))),
            "tolist" => Ok(self.to_list()),
            "transpose" => Ok(Value::array(self.transposed())),
            _ => Err(no_attribute("ndarray", name)),
        }
    }

    fn get_item(&self, index: &[IndexSpec]) -> Result<Value, EvalError> {
        let (offsets, kept) = self.selection(index)?;
        if kept.is_empty() {
            let offset = offsets.first().copied().unwrap_or(0);
            return Ok(self.scalar(self.at(offset)));
        }
        let data = offsets.iter().map(|&o| self.at(o)).collect();
        Ok(Value::array(DenseArray::new(kept, data, self.dtype)?))
    }

    fn set_item(&mut self, index: &[IndexSpec], value: &Value) -> Result<(), EvalError> {
        let (offsets, kept) = self.selection(index)?;
        let source = operand(value)?.ok_or_else(|| {
            type_error(format!(
                "cannot assign {} to array elements",
                value.type_name()
            ))
        })?;
        let fill = match source.data.as_slice() {
            [single] => Some(*single),
            values if values.len() == offsets.len() => None,
            _ => {
                return Err(value_error(format!(
                    "could not broadcast input array from shape {} into shape {}",
                    shape_text(&source.shape),
                    shape_text(&kept)
                )))
            }
        };
        for (k, &offset) in offsets.iter().enumerate() {
            let x = fill.unwrap_or_else(|| source.data.get(k).copied().unwrap_or(f64::NAN));
            if let Some(slot) = self.data.get_mut(offset) {
                *slot = cast(self.dtype, x);
            }
        }
        Ok(())
    }

    fn binary_op(&self, op: BinaryOp, other: &Value, reflected: bool) -> Result<Value, EvalError> {
        let Some(other_data) = operand(other)? else {
            let (left, right) = if reflected {
                (other.type_name(), "ndarray")
            } else {
                ("ndarray", other.type_name())
            };
            return Err(unsupported_operands(op.as_symbol(), left, right));
        };
        let this = self.snapshot();
        let (left, right) = if reflected {
            (&other_data, &this)
        } else {
            (&this, &other_data)
        };
        let dtype = result_dtype(op, left.dtype, right.dtype)?;
        if op == BinaryOp::Pow && dtype == DType::Int && right.data.iter().any(|&x| x < 0.0) {
            return Err(value_error(
                "integers to negative integer powers are not allowed",
            ));
        }
        let (shape, pairs) = broadcast(left, right)?;
        let data = pairs
            .map(|(a, b)| apply(op, a, b, dtype))
            .collect();
        Ok(Value::array(DenseArray::new(shape, data, dtype)?))
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "integer arrays only hold integral values"
    )]
    fn unary_op(&self, op: UnaryOp) -> Result<Value, EvalError> {
        let dtype = self.dtype.max(DType::Int);
        let (data, dtype): (Vec<f64>, DType) = match op {
            UnaryOp::Neg => (self.data.iter().map(|x| -x).collect(), dtype),
            UnaryOp::Pos => (self.data.clone(), dtype),
            UnaryOp::Invert => match self.dtype {
                DType::Bool => (self.data.iter().map(|&x| f64::from(u8::from(x == 0.0))).collect(), DType::Bool),
                DType::Int => (self.data.iter().map(|&x| !(x as i64) as f64).collect(), DType::Int),
                DType::Float => return Err(bad_unary_operand("~", "ndarray")),
            },
            UnaryOp::Not => return Ok(Value::Bool(!self.truthy())),
        };
        Ok(Value::array(DenseArray::new(self.shape.clone(), data, dtype)?))
    }

    fn compare(&self, op: CmpOp, other: &Value, reflected: bool) -> Result<Value, EvalError> {
        let Some(other_data) = operand(other)? else {
            return match op {
                CmpOp::Eq => Ok(Value::Bool(false)),
                CmpOp::NotEq => Ok(Value::Bool(true)),
                _ => Err(crate::errors::not_comparable(
                    op.as_symbol(),
                    "ndarray",
                    other.type_name(),
                )),
            };
        };
        let this = self.snapshot();
        let (left, right) = if reflected {
            (&other_data, &this)
        } else {
            (&this, &other_data)
        };
        let test: fn(f64, f64) -> bool = match op {
            CmpOp::Eq => |a, b| a == b,
            CmpOp::NotEq => |a, b| a != b,
            CmpOp::Lt => |a, b| a < b,
            CmpOp::LtE => |a, b| a <= b,
            CmpOp::Gt => |a, b| a > b,
            CmpOp::GtE => |a, b| a >= b,
            CmpOp::In | CmpOp::NotIn | CmpOp::Is | CmpOp::IsNot => {
                return Err(type_error(format!(
                    "'{}' is not an elementwise comparison",
                    op.as_symbol()
                )))
            }
        };
        let (shape, pairs) = broadcast(left, right)?;
        let data = pairs.map(|(a, b)| f64::from(u8::from(test(a, b)))).collect();
        Ok(Value::array(DenseArray::new(shape, data, DType::Bool)?))
    }

    fn truthy(&self) -> bool {
        !self.data.is_empty() && self.data.iter().all(|&x| x != 0.0)
    }

    fn rows(&self) -> Vec<Value> {
        if self.ndim() <= 1 {
            return self.data.iter().map(|&x| self.scalar(x)).collect();
        }
        let count = self.len();
        let row_shape = self.shape[1..].to_vec();
        let row_len: usize = row_shape.iter().product();
        (0..count)
            .map(|i| {
                let data = self.data[i * row_len..(i + 1) * row_len].to_vec();
                Value::array(DenseArray {
                    shape: row_shape.clone(),
                    data,
                    dtype: self.dtype,
                })
            })
            .collect()
    }

    fn contains(&self, item: &Value) -> bool {
        item.as_float()
            .is_some_and(|x| self.data.iter().any(|&y| y == x))
    }

    fn equals(&self, other: &dyn ArrayCapability) -> bool {
        let other = other.snapshot();
        self.shape == other.shape && self.data == other.data
    }

    fn map_float(&self, f: &dyn Fn(f64) -> f64) -> Value {
        Value::array(DenseArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
            dtype: DType::Float,
        })
    }

    fn snapshot(&self) -> ArrayData {
        ArrayData {
            shape: self.shape.clone(),
            data: self.data.clone(),
            dtype: self.dtype,
        }
    }

    fn repr(&self) -> String {
        let mut out = String::from("array(");
        self.write_nested(&mut out, 0, 0, &strides(&self.shape), true);
        out.push(')');
        out
    }

    fn display(&self) -> String {
        let mut out = String::new();
        self.write_nested(&mut out, 0, 0, &strides(&self.shape), false);
        out
    }
}

// Helpers

/// Store `x` the way an element of `dtype` holds it.
fn cast(dtype: DType, x: f64) -> f64 {
    match dtype {
        DType::Float => x,
        DType::Int => x.trunc(),
        DType::Bool => f64::from(u8::from(x != 0.0)),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "integer elements are integral and in range"
)]
fn scalar_value(dtype: DType, x: f64) -> Value {
    match dtype {
        DType::Bool => Value::Bool(x != 0.0),
        DType::Int => Value::Int(x as i64),
        DType::Float => Value::Float(x),
    }
}

fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

fn checked_size(shape: &[usize]) -> Result<usize, EvalError> {
    let size = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .unwrap_or(usize::MAX);
    check_len(size)?;
    Ok(size)
}

fn normalize_index(index: i64, dim: usize, axis: usize) -> Result<usize, EvalError> {
    let len = i64::try_from(dim).unwrap_or(i64::MAX);
    let position = if index < 0 { index + len } else { index };
    if (0..len).contains(&position) {
        usize::try_from(position).map_err(|_| out_of_bounds(index, axis, dim))
    } else {
        Err(out_of_bounds(index, axis, dim))
    }
}

#[cold]
fn out_of_bounds(index: i64, axis: usize, dim: usize) -> EvalError {
    EvalError::new(
        ErrorKind::IndexError,
        format!("index {index} is out of bounds for axis {axis} with size {dim}"),
    )
}

#[cold]
fn reshape_error(size: usize, shape: &[usize]) -> EvalError {
    value_error(format!(
        "cannot reshape array of size {size} into shape {}",
        shape_text(shape)
    ))
}

fn shape_text(shape: &[usize]) -> String {
    let mut text = String::from("(");
    for (i, dim) in shape.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        let _ = write!(text, "{dim}");
    }
    if shape.len() == 1 {
        text.push(',');
    }
    text.push(')');
    text
}

fn shape_tuple(shape: &[usize]) -> Value {
    Value::tuple(
        shape
            .iter()
            .map(|&dim| Value::Int(i64::try_from(dim).unwrap_or(i64::MAX)))
            .collect(),
    )
}

/// Parse an int or a sequence of ints as a shape. With `size`, a single
/// `-1` entry is inferred from it.
pub(crate) fn shape_from_value(value: &Value, size: Option<usize>) -> Result<Vec<usize>, EvalError> {
    let dims = match value {
        Value::Int(_) | Value::Bool(_) => vec![value.clone()],
        Value::Tuple(_) | Value::List(_) => iterate(value)?,
        other => {
            return Err(type_error(format!(
                "shape must be an int or a tuple of ints, not {}",
                other.type_name()
            )))
        }
    };
    let mut shape = Vec::with_capacity(dims.len());
    let mut inferred = None;
    for (axis, dim) in dims.iter().enumerate() {
        let dim = dim
            .as_int()
            .ok_or_else(|| type_error("shape entries must be integers"))?;
        match (dim, size) {
            (-1, Some(_)) if inferred.is_none() => {
                inferred = Some(axis);
                shape.push(1);
            }
            (dim, _) if dim < 0 => return Err(value_error("negative dimensions are not allowed")),
            (dim, _) => shape.push(usize::try_from(dim).unwrap_or(usize::MAX)),
        }
    }
    if let (Some(axis), Some(size)) = (inferred, size) {
        let known: usize = shape.iter().product();
        if known == 0 || size % known != 0 {
            return Err(reshape_error(size, &shape));
        }
        if let Some(slot) = shape.get_mut(axis) {
            *slot = size / known;
        }
    }
    Ok(shape)
}

/// Shape of nested sequences, following first elements.
fn nested_shape(value: &Value) -> Result<Vec<usize>, EvalError> {
    let mut shape = Vec::new();
    let mut current = value.clone();
    loop {
        match &current {
            Value::List(_) | Value::Tuple(_) => {
                let items = iterate(&current)?;
                shape.push(items.len());
                match items.into_iter().next() {
                    Some(first) => current = first,
                    None => return Ok(shape),
                }
            }
            Value::Array(array) => {
                shape.extend(read(array, "ndarray")?.shape());
                return Ok(shape);
            }
            _ => return Ok(shape),
        }
    }
}

fn flatten_into(
    value: &Value,
    shape: &[usize],
    depth: usize,
    data: &mut Vec<f64>,
    dtype: &mut DType,
) -> Result<(), EvalError> {
    let inhomogeneous = || {
        value_error("setting an array element with a sequence: the nested sequences have inhomogeneous shape")
    };
    match value {
        Value::List(_) | Value::Tuple(_) => {
            let items = iterate(value)?;
            if shape.get(depth) != Some(&items.len()) {
                return Err(inhomogeneous());
            }
            for item in &items {
                flatten_into(item, shape, depth + 1, data, dtype)?;
            }
            check_len(data.len())
        }
        Value::Array(array) => {
            let inner = read(array, "ndarray")?.snapshot();
            if shape.get(depth..) != Some(inner.shape.as_slice()) {
                return Err(inhomogeneous());
            }
            *dtype = (*dtype).max(inner.dtype);
            data.extend(inner.data);
            Ok(())
        }
        scalar => {
            if depth != shape.len() {
                return Err(inhomogeneous());
            }
            let (x, kind) = match scalar {
                Value::Bool(b) => (f64::from(u8::from(*b)), DType::Bool),
                Value::Int(_) => (scalar.as_float().unwrap_or(0.0), DType::Int),
                Value::Float(x) => (*x, DType::Float),
                other => {
                    return Err(value_error(format!(
                        "could not convert {} to a number",
                        other.repr()
                    )))
                }
            };
            *dtype = (*dtype).max(kind);
            data.push(x);
            Ok(())
        }
    }
}

/// Array view of an operand: arrays, numbers, and nested sequences.
/// `None` for values that cannot take part in array arithmetic.
fn operand(value: &Value) -> Result<Option<ArrayData>, EvalError> {
    let scalar = |x: f64, dtype: DType| ArrayData {
        shape: Vec::new(),
        data: vec![x],
        dtype,
    };
    Ok(match value {
        Value::Array(array) => Some(read(array, "ndarray")?.snapshot()),
        Value::Bool(b) => Some(scalar(f64::from(u8::from(*b)), DType::Bool)),
        Value::Int(_) => Some(scalar(value.as_float().unwrap_or(0.0), DType::Int)),
        Value::Float(x) => Some(scalar(*x, DType::Float)),
        Value::List(_) | Value::Tuple(_) => Some(DenseArray::from_value(value)?.snapshot()),
        _ => None,
    })
}

/// Pair up elements of equal shapes, or broadcast a one-element side.
fn broadcast<'a>(
    left: &'a ArrayData,
    right: &'a ArrayData,
) -> Result<(Vec<usize>, impl Iterator<Item = (f64, f64)> + 'a), EvalError> {
    let shape = if left.shape == right.shape {
        left.shape.clone()
    } else if right.data.len() == 1 && !left.shape.is_empty() {
        left.shape.clone()
    } else if left.data.len() == 1 && !right.shape.is_empty() {
        right.shape.clone()
    } else if left.data.len() == 1 && right.data.len() == 1 {
        vec![1]
    } else {
        return Err(value_error(format!(
            "operands could not be broadcast together with shapes {} {}",
            shape_text(&left.shape),
            shape_text(&right.shape)
        )));
    };
    let size = left.data.len().max(right.data.len());
    let pick = |side: &ArrayData, i: usize| {
        if side.data.len() == 1 {
            side.data.first().copied().unwrap_or(f64::NAN)
        } else {
            side.data.get(i).copied().unwrap_or(f64::NAN)
        }
    };
    Ok((shape, (0..size).map(move |i| (pick(left, i), pick(right, i)))))
}

fn result_dtype(op: BinaryOp, left: DType, right: DType) -> Result<DType, EvalError> {
    let widest = left.max(right);
    Ok(match op {
        BinaryOp::Div => DType::Float,
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::LShift | BinaryOp::RShift => {
            if widest == DType::Float {
                return Err(type_error(format!(
                    "operator {} is not supported for float arrays",
                    op.as_symbol()
                )));
            }
            if widest == DType::Bool && !matches!(op, BinaryOp::LShift | BinaryOp::RShift) {
                DType::Bool
            } else {
                DType::Int
            }
        }
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::FloorDiv
        | BinaryOp::Mod
        | BinaryOp::Pow => widest.max(DType::Int),
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "integer kernels run on integral values stored as f64"
)]
fn apply(op: BinaryOp, a: f64, b: f64, dtype: DType) -> f64 {
    let integral = dtype != DType::Float;
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => {
            if integral && b == 0.0 {
                0.0
            } else {
                (a / b).floor()
            }
        }
        BinaryOp::Mod => {
            if integral && b == 0.0 {
                return 0.0;
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => a.powf(b),
        BinaryOp::LShift => ((a as i64).wrapping_shl(b as u32)) as f64,
        BinaryOp::RShift => ((a as i64).wrapping_shr(b as u32)) as f64,
        BinaryOp::BitAnd => ((a as i64) & (b as i64)) as f64,
        BinaryOp::BitOr => ((a as i64) | (b as i64)) as f64,
        BinaryOp::BitXor => ((a as i64) ^ (b as i64)) as f64,
    }
}

/// Fold a lane of values for a reduction.
fn fold(kind: Reduction, values: &[f64]) -> Result<f64, EvalError> {
    let empty = |name: &str| {
        value_error(format!(
            "zero-size array to reduction operation {name} which has no identity"
        ))
    };
    Ok(match kind {
        Reduction::Sum => values.iter().sum(),
        Reduction::Mean => {
            #[expect(clippy::cast_precision_loss, reason = "lane lengths are far below 2^53")]
            let count = values.len() as f64;
            values.iter().sum::<f64>() / count
        }
        Reduction::Min => values
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or_else(|| empty("minimum"))?,
        Reduction::Max => values
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| empty("maximum"))?,
        Reduction::All => f64::from(u8::from(values.iter().all(|&x| x != 0.0))),
        Reduction::Any => f64::from(u8::from(values.iter().any(|&x| x != 0.0))),
    })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::array::SliceSpec;
    use pretty_assertions::assert_eq;

    /// `[[0, 1, 2], [3, 4, 5]]`
    fn grid() -> DenseArray {
        let flat = DenseArray::arange(0.0, 6.0, 1.0, DType::Int).unwrap();
        flat.reshaped(vec![2, 3]).unwrap()
    }

    fn all() -> IndexSpec {
        IndexSpec::Slice(SliceSpec::default())
    }

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().map(|&n| Value::Int(n)).collect())
    }

    #[test]
    fn reshape_infers_one_dimension() {
        let flat = DenseArray::arange(0.0, 6.0, 1.0, DType::Int).unwrap();
        let shaped = flat
            .call_method("reshape", &[Value::Int(2), Value::Int(-1)], &[])
            .unwrap();
        assert_eq!(shaped.repr(), "array([[0, 1, 2], [3, 4, 5]])");
        let err = flat
            .call_method("reshape", &[Value::Int(4), Value::Int(-1)], &[])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn indexing_drops_axes_and_slicing_keeps_them() {
        let a = grid();
        assert_eq!(a.get_item(&[IndexSpec::Index(1)]).unwrap().repr(), "array([3, 4, 5])");
        assert_eq!(a.get_item(&[all(), IndexSpec::Index(1)]).unwrap().repr(), "array([1, 4])");
        assert_eq!(a.get_item(&[IndexSpec::Index(-1), IndexSpec::Index(2)]).unwrap(), Value::Int(5));

        let err = a.get_item(&[IndexSpec::Index(2)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexError);
        let err = a
            .get_item(&[IndexSpec::Index(0), IndexSpec::Index(0), IndexSpec::Index(0)])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexError);
    }

    #[test]
    fn assignment_broadcasts_scalars_and_matches_lengths() {
        let mut a = grid();
        a.set_item(&[IndexSpec::Index(0)], &Value::Int(9)).unwrap();
        a.set_item(&[all(), IndexSpec::Index(0)], &ints(&[7, 8])).unwrap();
        assert_eq!(a.to_list().repr(), "[[7, 9, 9], [8, 4, 5]]");
        let err = a.set_item(&[IndexSpec::Index(1)], &ints(&[1, 2])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn arithmetic_promotes_and_broadcasts() {
        let a = grid();
        assert_eq!(
            a.binary_op(BinaryOp::Add, &Value::Float(0.5), false).unwrap().repr(),
            "array([[0.5, 1.5, 2.5], [3.5, 4.5, 5.5]])"
        );
        let v = DenseArray::vector(vec![1.0, 2.0], DType::Int);
        assert_eq!(v.binary_op(BinaryOp::Sub, &Value::Int(10), true).unwrap().repr(), "array([9, 8])");
        assert_eq!(v.binary_op(BinaryOp::Div, &Value::Int(2), false).unwrap().repr(), "array([0.5, 1.0])");

        let err = v.binary_op(BinaryOp::Add, &ints(&[1, 2, 3]), false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = v.binary_op(BinaryOp::Pow, &Value::Int(-1), false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = v.binary_op(BinaryOp::Add, &Value::str("x"), false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn comparisons_are_elementwise() {
        let v = DenseArray::vector(vec![1.0, 2.0, 3.0], DType::Int);
        assert_eq!(
            v.compare(CmpOp::Gt, &Value::Int(1), false).unwrap().repr(),
            "array([False, True, True])"
        );
        assert_eq!(v.compare(CmpOp::Eq, &Value::None, false).unwrap(), Value::Bool(false));
    }

    #[test]
    fn reductions_over_all_or_one_axis() {
        let a = grid();
        assert_eq!(a.call_method("sum", &[], &[]).unwrap(), Value::Int(15));
        let axis0: [(Rc<str>, Value); 1] = [(Rc::from("axis"), Value::Int(0))];
        assert_eq!(a.call_method("sum", &[], &axis0).unwrap().repr(), "array([3, 5, 7])");
        assert_eq!(
            a.call_method("mean", &[Value::Int(-1)], &[]).unwrap().repr(),
            "array([1.0, 4.0])"
        );
        assert_eq!(a.call_method("max", &[], &[]).unwrap(), Value::Int(5));

        let empty = DenseArray::vector(Vec::new(), DType::Float);
        let err = empty.call_method("min", &[], &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = a.call_method("sum", &[Value::Int(2)], &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn transpose_and_display() {
        let a = grid();
        assert_eq!(a.transposed().to_list().repr(), "[[0, 3], [1, 4], [2, 5]]");
        assert_eq!(a.display(), "[[0 1 2]\n [3 4 5]]");
        assert_eq!(a.get_attr("shape").unwrap().repr(), "(2, 3)");
        assert_eq!(a.get_attr("dtype").unwrap(), Value::str("int64"));
    }

    #[test]
    fn shape_is_the_only_writable_attribute() {
        let mut a = grid();
        a.set_attr("shape", &Value::tuple(vec![Value::Int(3), Value::Int(2)])).unwrap();
        assert_eq!(a.shape(), [3, 2]);
        let err = a
            .set_attr("shape", &Value::tuple(vec![Value::Int(4), Value::Int(2)]))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        let err = a.set_attr("ndim", &Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeError);
    }

    #[test]
    fn nested_sequences_pick_the_widest_type() {
        let mixed = Value::list(vec![
            Value::list(vec![Value::Int(1), Value::Float(2.5)]),
            Value::list(vec![Value::Bool(true), Value::Int(0)]),
        ]);
        let array = DenseArray::from_value(&mixed).unwrap();
        assert_eq!(array.dtype(), DType::Float);
        assert_eq!(array.shape(), [2, 2]);

        let ragged = Value::list(vec![ints(&[1, 2]), ints(&[3])]);
        let err = DenseArray::from_value(&ragged).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn arange_counts_float_steps() {
        let a = DenseArray::arange(0.0, 1.0, 0.25, DType::Float).unwrap();
        assert_eq!(a.data(), [0.0, 0.25, 0.5, 0.75]);
        let err = DenseArray::arange(0.0, 1.0, 0.0, DType::Float).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }
}
