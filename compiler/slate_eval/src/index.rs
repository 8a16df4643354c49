//! Subscript reads, writes and deletions.
//!
//! The evaluator turns the expression inside `[...]` into a [`Subscript`];
//! everything here is independent of the syntax tree.

use std::rc::Rc;

use crate::array::{IndexSpec, SliceSpec};
use crate::errors::{
    index_out_of_range, invalid_index_type, item_assignment_unsupported,
    item_deletion_unsupported, key_not_found, not_subscriptable, unhashable, value_error,
    ErrorKind, EvalError,
};
use crate::numeric::DenseArray;
use crate::value::{check_len, iterate, read, write, Value};

/// One axis of a subscript.
#[derive(Clone, Debug)]
pub enum Selector {
    /// `x[i]`, or a tuple key `x[i, j]` when no axis is sliced.
    Item(Value),
    /// `x[a:b:c]`
    Slice(SliceSpec),
}

/// The evaluated contents of `[...]`.
#[derive(Clone, Debug)]
pub enum Subscript {
    Single(Selector),
    /// Several comma-separated axes, at least one of them a slice.
    Multi(Vec<Selector>),
}

/// Result of selecting from a flat sequence.
enum Picked<T> {
    One(T),
    Many(Vec<T>),
}

/// `container[subscript]`
pub fn get_item(container: &Value, subscript: &Subscript) -> Result<Value, EvalError> {
    match container {
        Value::List(items) => Ok(match pick(read(items, "list")?.as_slice(), subscript, "list")? {
            Picked::One(item) => item,
            Picked::Many(items) => Value::list(items),
        }),
        Value::Tuple(items) => Ok(match pick(&**items, subscript, "tuple")? {
            Picked::One(item) => item,
            Picked::Many(items) => Value::tuple(items),
        }),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(match pick(&chars, subscript, "string")? {
                Picked::One(c) => Value::str(c.encode_utf8(&mut [0; 4])),
                Picked::Many(chars) => Value::str(&chars.into_iter().collect::<String>()),
            })
        }
        Value::Dict(dict) => {
            let key = dict_key(subscript)?;
            read(dict, "dict")?
                .get(key)?
                .ok_or_else(|| key_not_found(&key.repr()))
        }
        Value::Array(array) => {
            let specs = array_specs(subscript)?;
            read(array, "ndarray")?.get_item(&specs)
        }
        other => Err(not_subscriptable(other.type_name())),
    }
}

/// `container[subscript] = value`
pub fn set_item(container: &Value, subscript: &Subscript, value: &Value) -> Result<(), EvalError> {
    match container {
        Value::List(items) => match subscript {
            Subscript::Single(Selector::Item(index)) => {
                let mut items = write(items, "list")?;
                let position = position(index, items.len(), "list")?;
                if let Some(slot) = items.get_mut(position) {
                    *slot = value.clone();
                }
                Ok(())
            }
            Subscript::Single(Selector::Slice(spec)) => {
                // Collect first: `a[:] = a` reads the list being written.
                let replacement = iterate(value)?;
                let mut items = write(items, "list")?;
                assign_slice(&mut items, *spec, replacement)
            }
            Subscript::Multi(_) => Err(invalid_index_type("list", "tuple")),
        },
        Value::Dict(dict) => {
            let key = dict_key(subscript)?;
            write(dict, "dict")?.insert(key.clone(), value.clone())
        }
        Value::Array(array) => {
            let specs = array_specs(subscript)?;
            let value = match value {
                Value::Array(source) if Rc::ptr_eq(array, source) => {
                    Value::array(DenseArray::from_value(value)?)
                }
                _ => value.clone(),
            };
            write(array, "ndarray")?.set_item(&specs, &value)
        }
        other => Err(item_assignment_unsupported(other.type_name())),
    }
}

/// `del container[subscript]`
pub fn del_item(container: &Value, subscript: &Subscript) -> Result<(), EvalError> {
    match container {
        Value::List(items) => {
            let mut items = write(items, "list")?;
            match subscript {
                Subscript::Single(Selector::Item(index)) => {
                    let position = position(index, items.len(), "list")?;
                    items.remove(position);
                    Ok(())
                }
                Subscript::Single(Selector::Slice(spec)) => {
                    let mut doomed = vec![false; items.len()];
                    for i in spec.resolve(items.len())?.indices() {
                        if let Some(flag) = doomed.get_mut(i) {
                            *flag = true;
                        }
                    }
                    let mut k = 0;
                    items.retain(|_| {
                        let keep = doomed.get(k) != Some(&true);
                        k += 1;
                        keep
                    });
                    Ok(())
                }
                Subscript::Multi(_) => Err(invalid_index_type("list", "tuple")),
            }
        }
        Value::Dict(dict) => {
            let key = dict_key(subscript)?;
            write(dict, "dict")?
                .remove(key)?
                .map(|_| ())
                .ok_or_else(|| key_not_found(&key.repr()))
        }
        other => Err(item_deletion_unsupported(other.type_name())),
    }
}

/// Resolve a scalar index against `len`, counting negatives from the end.
fn position(index: &Value, len: usize, type_name: &str) -> Result<usize, EvalError> {
    let raw = index
        .as_int()
        .ok_or_else(|| invalid_index_type(type_name, index.type_name()))?;
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let position = if raw < 0 { raw + len } else { raw };
    if (0..len).contains(&position) {
        usize::try_from(position).map_err(|_| index_out_of_range(type_name))
    } else {
        Err(index_out_of_range(type_name))
    }
}

fn pick<T: Clone>(items: &[T], subscript: &Subscript, type_name: &str) -> Result<Picked<T>, EvalError> {
    match subscript {
        Subscript::Single(Selector::Item(index)) => {
            let position = position(index, items.len(), type_name)?;
            items
                .get(position)
                .cloned()
                .map(Picked::One)
                .ok_or_else(|| index_out_of_range(type_name))
        }
        Subscript::Single(Selector::Slice(spec)) => {
            let resolved = spec.resolve(items.len())?;
            Ok(Picked::Many(
                resolved
                    .indices()
                    .filter_map(|i| items.get(i).cloned())
                    .collect(),
            ))
        }
        Subscript::Multi(_) => Err(invalid_index_type(type_name, "tuple")),
    }
}

/// Splice for step 1, element-wise replacement for extended slices.
fn assign_slice(items: &mut Vec<Value>, spec: SliceSpec, replacement: Vec<Value>) -> Result<(), EvalError> {
    let resolved = spec.resolve(items.len())?;
    if resolved.step == 1 {
        let start = usize::try_from(resolved.start).unwrap_or(0).min(items.len());
        let end = resolved.end().min(items.len()).max(start);
        check_len(items.len() - (end - start) + replacement.len())?;
        items.splice(start..end, replacement);
        return Ok(());
    }
    if replacement.len() != resolved.count {
        return Err(value_error(format!(
            "attempt to assign sequence of size {} to extended slice of size {}",
            replacement.len(),
            resolved.count
        )));
    }
    for (i, value) in resolved.indices().zip(replacement) {
        if let Some(slot) = items.get_mut(i) {
            *slot = value;
        }
    }
    Ok(())
}

/// Key of a mapping subscript; slices cannot be keys.
fn dict_key(subscript: &Subscript) -> Result<&Value, EvalError> {
    match subscript {
        Subscript::Single(Selector::Item(key)) => Ok(key),
        _ => Err(unhashable("slice")),
    }
}

fn array_specs(subscript: &Subscript) -> Result<Vec<IndexSpec>, EvalError> {
    match subscript {
        Subscript::Single(Selector::Item(Value::Tuple(items))) => {
            items.iter().map(|item| selector_spec(&Selector::Item(item.clone()))).collect()
        }
        Subscript::Single(selector) => Ok(vec![selector_spec(selector)?]),
        Subscript::Multi(selectors) => selectors.iter().map(selector_spec).collect(),
    }
}

fn selector_spec(selector: &Selector) -> Result<IndexSpec, EvalError> {
    match selector {
        Selector::Slice(spec) => Ok(IndexSpec::Slice(*spec)),
        Selector::Item(value @ (Value::Int(_) | Value::Bool(_))) => {
            Ok(IndexSpec::Index(value.as_int().unwrap_or(0)))
        }
        Selector::Item(other) => Err(EvalError::new(
            ErrorKind::IndexError,
            format!(
                "only integers and slices are valid array indices, not {}",
                other.type_name()
            ),
        )),
    }
}
