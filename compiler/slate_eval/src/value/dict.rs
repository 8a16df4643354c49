//! Insertion-ordered mapping.

use rustc_hash::FxHashMap;

use super::{read, Value, MAX_NESTING_DEPTH};
use crate::errors::{nesting_too_deep, unhashable, EvalError};

/// Hashable projection of a key value.
///
/// Numbers are normalized so `1`, `1.0` and `True` are one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Int(i64),
    Float(u64),
    Str(Box<str>),
    Tuple(Vec<HashKey>),
    /// Procedures, builtins and methods hash by identity.
    Identity(usize),
}

impl HashKey {
    pub fn from_value(value: &Value) -> Result<HashKey, EvalError> {
        HashKey::from_value_at(value, 0)
    }

    fn from_value_at(value: &Value, depth: usize) -> Result<HashKey, EvalError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(nesting_too_deep("while hashing"));
        }
        Ok(match value {
            Value::None => HashKey::None,
            Value::Bool(b) => HashKey::Int(i64::from(*b)),
            Value::Int(n) => HashKey::Int(*n),
            Value::Float(x) => float_key(*x),
            Value::Str(s) => HashKey::Str(Box::from(&**s)),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(|item| HashKey::from_value_at(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Procedure(procedure) => {
                HashKey::Identity(std::rc::Rc::as_ptr(procedure) as usize)
            }
            Value::Builtin(builtin) => HashKey::Identity(std::ptr::from_ref(*builtin) as usize),
            Value::BoundMethod(method) => HashKey::Identity(std::rc::Rc::as_ptr(method) as usize),
            Value::List(_) | Value::Dict(_) | Value::Array(_) => {
                return Err(unhashable(value.type_name()))
            }
        })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "integral floats inside the i64 range convert exactly"
)]
fn float_key(x: f64) -> HashKey {
    if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        HashKey::Int(x as i64)
    } else {
        HashKey::Float(x.to_bits())
    }
}

/// Mapping that remembers insertion order.
#[derive(Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        let hash = HashKey::from_value(key)?;
        Ok(self
            .index
            .get(&hash)
            .and_then(|&slot| self.entries.get(slot))
            .map(|(_, value)| value.clone()))
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool, EvalError> {
        Ok(self.index.contains_key(&HashKey::from_value(key)?))
    }

    /// Insert or overwrite. Overwriting keeps the original key and position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), EvalError> {
        let hash = HashKey::from_value(&key)?;
        match self.index.get(&hash).copied() {
            Some(slot) => {
                if let Some(entry) = self.entries.get_mut(slot) {
                    entry.1 = value;
                }
            }
            None => {
                self.index.insert(hash, self.entries.len());
                self.entries.push((key, value));
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> Result<Option<Value>, EvalError> {
        let hash = HashKey::from_value(key)?;
        let Some(slot) = self.index.remove(&hash) else {
            return Ok(None);
        };
        if slot >= self.entries.len() {
            return Ok(None);
        }
        let (_, value) = self.entries.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Ok(Some(value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Empty the mapping, moving every key and value into `out`.
    pub(super) fn drain_into(&mut self, out: &mut Vec<Value>) {
        self.index.clear();
        for (key, value) in self.entries.drain(..) {
            out.push(key);
            out.push(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Build from `(key, value)` pairs, later pairs overwriting earlier ones.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Dict, EvalError> {
        let mut dict = Dict::new();
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    /// Copy every entry of `other` into `self`.
    pub fn update_from(&mut self, other: &Value) -> Result<(), EvalError> {
        let entries: Vec<(Value, Value)> = match other {
            Value::Dict(dict) => read(dict, "dict")?
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            other => super::iterate(other)?
                .iter()
                .map(pair_of)
                .collect::<Result<_, _>>()?,
        };
        for (key, value) in entries {
            self.insert(key, value)?;
        }
        Ok(())
    }
}

/// Split a two-item sequence used as a dictionary update element.
fn pair_of(item: &Value) -> Result<(Value, Value), EvalError> {
    match super::iterate(item)?.as_slice() {
        [key, value] => Ok((key.clone(), value.clone())),
        items => Err(crate::errors::value_error(format!(
            "dictionary update sequence element has length {}; 2 is required",
            items.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_keys_are_normalized() {
        let mut dict = Dict::new();
        dict.insert(Value::Int(1), Value::str("int")).unwrap();
        dict.insert(Value::Float(1.0), Value::str("float")).unwrap();
        dict.insert(Value::Bool(true), Value::str("bool")).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get(&Value::Int(1)).unwrap(), Some(Value::str("bool")));
        assert_eq!(dict.keys().next(), Some(&Value::Int(1)));
    }

    #[test]
    fn removal_keeps_order() {
        let mut dict = Dict::new();
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            dict.insert(Value::str(key), Value::Int(i64::try_from(i).unwrap()))
                .unwrap();
        }
        assert_eq!(dict.remove(&Value::str("a")).unwrap(), Some(Value::Int(0)));
        assert_eq!(dict.remove(&Value::str("a")).unwrap(), None);
        dict.insert(Value::str("d"), Value::Int(3)).unwrap();
        let keys: Vec<String> = dict.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["b", "c", "d"]);
        assert_eq!(dict.get(&Value::str("c")).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn lists_are_unhashable() {
        let mut dict = Dict::new();
        let err = dict.insert(Value::list(vec![]), Value::None).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::TypeError);
    }

    #[test]
    fn tuples_hash_structurally() {
        let mut dict = Dict::new();
        let key = Value::tuple(vec![Value::Int(1), Value::str("x")]);
        dict.insert(key, Value::Int(9)).unwrap();
        let lookup = Value::tuple(vec![Value::Float(1.0), Value::str("x")]);
        assert_eq!(dict.get(&lookup).unwrap(), Some(Value::Int(9)));
    }

    #[test]
    fn deeply_nested_tuple_keys_are_refused() {
        let mut key = Value::Int(0);
        for _ in 0..=MAX_NESTING_DEPTH + 1 {
            key = Value::tuple(vec![key]);
        }
        let err = Dict::new().insert(key, Value::None).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::RuntimeError);
    }
}
