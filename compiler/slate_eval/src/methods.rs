//! Attribute access and built-in methods.
//!
//! The attribute surface is a fixed table per value kind. Nothing here
//! looks names up dynamically: an attribute is either in a table below,
//! provided by the array capability, or an `AttributeError`.

use std::rc::Rc;

use crate::errors::{
    dunder_attribute, index_out_of_range, key_not_found, no_attribute, no_keyword_arguments,
    read_only_attribute, type_error, unexpected_keyword, value_error, wrong_arg_count, ErrorKind,
    EvalError,
};
use crate::numeric::DenseArray;
use crate::operators::sort_values;
use crate::value::{
    check_len, format_method, iterate, read, write, BoundMethod, Dict, DictRef, Kwargs, ListRef,
    Value,
};

const STR_METHODS: &[&str] = &[
    "upper", "lower", "strip", "lstrip", "rstrip", "split", "join", "replace", "startswith",
    "endswith", "find", "index", "count", "format",
];

const LIST_METHODS: &[&str] = &[
    "append", "extend", "insert", "pop", "remove", "index", "count", "reverse", "sort", "copy",
    "clear",
];

const TUPLE_METHODS: &[&str] = &["index", "count"];

const DICT_METHODS: &[&str] = &[
    "keys", "values", "items", "get", "update", "setdefault", "pop", "copy", "clear",
];

/// Data attributes of procedures.
const PROCEDURE_ATTRIBUTES: &[&str] = &["name", "doc"];

/// `__name__`-style names are never reachable from scripts.
fn is_dunder(attr: &str) -> bool {
    attr.len() > 4 && attr.starts_with("__") && attr.ends_with("__")
}

fn method_table(value: &Value) -> &'static [&'static str] {
    match value {
        Value::Str(_) => STR_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Tuple(_) => TUPLE_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::Procedure(_) => PROCEDURE_ATTRIBUTES,
        _ => &[],
    }
}

fn bound(receiver: &Value, name: &'static str) -> Value {
    Value::BoundMethod(Rc::new(BoundMethod {
        receiver: receiver.clone(),
        name,
    }))
}

/// `value.attr`
pub fn get_attribute(value: &Value, attr: &str) -> Result<Value, EvalError> {
    if is_dunder(attr) {
        return Err(dunder_attribute(attr));
    }
    match value {
        Value::Array(array) => {
            let array = read(array, "ndarray")?;
            match array.method_name(attr) {
                Some(name) => Ok(bound(value, name)),
                None => array.get_attr(attr),
            }
        }
        Value::Procedure(procedure) => match attr {
            "name" => Ok(Value::Str(Rc::clone(&procedure.name))),
            "doc" => Ok(procedure.doc.clone().map_or(Value::None, Value::Str)),
            _ => Err(no_attribute("procedure", attr)),
        },
        other => method_table(other)
            .iter()
            .find(|name| **name == attr)
            .map(|name| bound(other, name))
            .ok_or_else(|| no_attribute(other.type_name(), attr)),
    }
}

/// `target.attr = value`
pub fn set_attribute(target: &Value, attr: &str, value: &Value) -> Result<(), EvalError> {
    if is_dunder(attr) {
        return Err(dunder_attribute(attr));
    }
    match target {
        Value::Array(array) => {
            let value = match value {
                Value::Array(source) if Rc::ptr_eq(array, source) => {
                    Value::array(DenseArray::from_value(value)?)
                }
                _ => value.clone(),
            };
            write(array, "ndarray")?.set_attr(attr, &value)
        }
        other if method_table(other).contains(&attr) => {
            Err(read_only_attribute(other.type_name(), attr))
        }
        other => Err(no_attribute(other.type_name(), attr)),
    }
}

/// Call method `name` on `receiver`.
pub fn call_method(
    receiver: &Value,
    name: &str,
    args: &[Value],
    kwargs: &Kwargs,
) -> Result<Value, EvalError> {
    match receiver {
        Value::Str(s) => call_str_method(s, name, args, kwargs),
        Value::List(items) => call_list_method(items, name, args, kwargs),
        Value::Tuple(items) => {
            reject_kwargs(name, kwargs)?;
            let [item] = exact::<1>(name, args)?;
            match name {
                "index" => index_of(items, item, "tuple.index(x): x not in tuple"),
                "count" => count_of(items, item),
                _ => Err(no_attribute("tuple", name)),
            }
        }
        Value::Dict(dict) => call_dict_method(receiver, dict, name, args, kwargs),
        Value::Array(array) => read(array, "ndarray")?.call_method(name, args, kwargs),
        other => Err(no_attribute(other.type_name(), name)),
    }
}

// Argument helpers

fn reject_kwargs(method: &str, kwargs: &Kwargs) -> Result<(), EvalError> {
    if kwargs.is_empty() {
        Ok(())
    } else {
        Err(no_keyword_arguments(method))
    }
}

/// Exactly `N` positional arguments.
fn exact<'a, const N: usize>(method: &str, args: &'a [Value]) -> Result<&'a [Value; N], EvalError> {
    args.try_into().map_err(|_| {
        let expected = match N {
            0 => "no arguments".to_string(),
            1 => "exactly one argument".to_string(),
            n => format!("exactly {n} arguments"),
        };
        wrong_arg_count(method, &expected, args.len())
    })
}

/// Between `min` and `max` positional arguments.
fn between<'a>(method: &str, args: &'a [Value], min: usize, max: usize) -> Result<&'a [Value], EvalError> {
    if (min..=max).contains(&args.len()) {
        Ok(args)
    } else {
        Err(wrong_arg_count(
            method,
            &format!("from {min} to {max} arguments"),
            args.len(),
        ))
    }
}

fn str_arg<'a>(method: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(type_error(format!(
            "{method}() argument must be str, not {}",
            other.type_name()
        ))),
    }
}

fn int_arg(method: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or(0)),
        other => Err(type_error(format!(
            "{method}() argument must be int, not {}",
            other.type_name()
        ))),
    }
}

fn position_of(items: &[Value], item: &Value) -> Result<Option<usize>, EvalError> {
    for (i, x) in items.iter().enumerate() {
        if x.equals(item)? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

fn index_of(items: &[Value], item: &Value, missing: &str) -> Result<Value, EvalError> {
    position_of(items, item)?
        .map(|i| Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
        .ok_or_else(|| value_error(missing))
}

fn count_of(items: &[Value], item: &Value) -> Result<Value, EvalError> {
    let mut count = 0usize;
    for x in items {
        if x.equals(item)? {
            count += 1;
        }
    }
    Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
}

fn int_value(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

// str

fn call_str_method(s: &Rc<str>, name: &str, args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    if name == "format" {
        return Ok(Value::str(&format_method(s, args, kwargs)?));
    }
    if name == "split" {
        return split(s, args, kwargs);
    }
    reject_kwargs(name, kwargs)?;
    match name {
        "upper" => {
            exact::<0>(name, args)?;
            Ok(Value::str(&s.to_uppercase()))
        }
        "lower" => {
            exact::<0>(name, args)?;
            Ok(Value::str(&s.to_lowercase()))
        }
        "strip" | "lstrip" | "rstrip" => {
            let chars = match between(name, args, 0, 1)? {
                [] | [Value::None] => None,
                [chars] => Some(str_arg(name, chars)?),
                _ => None,
            };
            let is_stripped = |c: char| chars.map_or(c.is_whitespace(), |set| set.contains(c));
            let stripped = match name {
                "strip" => s.trim_matches(is_stripped),
                "lstrip" => s.trim_start_matches(is_stripped),
                _ => s.trim_end_matches(is_stripped),
            };
            Ok(Value::str(stripped))
        }
        "join" => {
            let [iterable] = exact::<1>(name, args)?;
            let mut joined = String::new();
            for (i, item) in iterate(iterable)?.iter().enumerate() {
                let Value::Str(part) = item else {
                    return Err(type_error(format!(
                        "sequence item {i}: expected str instance, {} found",
                        item.type_name()
                    )));
                };
                if i > 0 {
                    joined.push_str(s);
                }
                joined.push_str(part);
                check_len(joined.len())?;
            }
            Ok(Value::str(&joined))
        }
        "replace" => {
            let args = between(name, args, 2, 3)?;
            let old = str_arg(name, &args[0])?;
            let new = str_arg(name, &args[1])?;
            let count = args.get(2).map(|c| int_arg(name, c)).transpose()?.unwrap_or(-1);
            let replaced = match usize::try_from(count) {
                Ok(count) => s.replacen(old, new, count),
                Err(_) => s.replace(old, new),
            };
            check_len(replaced.len())?;
            Ok(Value::str(&replaced))
        }
        "startswith" | "endswith" => {
            let [affix] = exact::<1>(name, args)?;
            let candidates = match affix {
                Value::Tuple(items) => items.to_vec(),
                other => vec![other.clone()],
            };
            for candidate in &candidates {
                let candidate = str_arg(name, candidate)?;
                let hit = if name == "startswith" {
                    s.starts_with(candidate)
                } else {
                    s.ends_with(candidate)
                };
                if hit {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        "find" | "index" => {
            let [needle] = exact::<1>(name, args)?;
            let needle = str_arg(name, needle)?;
            match s.find(needle) {
                Some(byte) => Ok(int_value(s[..byte].chars().count())),
                None if name == "find" => Ok(Value::Int(-1)),
                None => Err(value_error("substring not found")),
            }
        }
        "count" => {
            let [needle] = exact::<1>(name, args)?;
            let needle = str_arg(name, needle)?;
            if needle.is_empty() {
                return Ok(int_value(s.chars().count() + 1));
            }
            Ok(int_value(s.matches(needle).count()))
        }
        _ => Err(no_attribute("str", name)),
    }
}

/// `str.split(sep=None, maxsplit=-1)`
fn split(s: &str, args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    let args = between("split", args, 0, 2)?;
    let mut sep = args.first().cloned().unwrap_or(Value::None);
    let mut maxsplit = args.get(1).cloned().unwrap_or(Value::Int(-1));
    for (key, value) in kwargs {
        match &**key {
            "sep" => sep = value.clone(),
            "maxsplit" => maxsplit = value.clone(),
            other => return Err(unexpected_keyword("split", other)),
        }
    }
    let maxsplit = usize::try_from(int_arg("split", &maxsplit)?).ok();
    let parts: Vec<&str> = match &sep {
        Value::None => split_whitespace(s, maxsplit),
        sep => {
            let sep = str_arg("split", sep)?;
            if sep.is_empty() {
                return Err(value_error("empty separator"));
            }
            match maxsplit {
                Some(n) => s.splitn(n.saturating_add(1), sep).collect(),
                None => s.split(sep).collect(),
            }
        }
    };
    Ok(Value::list(parts.into_iter().map(Value::str).collect()))
}

/// Whitespace splitting; the unsplit remainder keeps trailing whitespace.
fn split_whitespace(s: &str, maxsplit: Option<usize>) -> Vec<&str> {
    let Some(limit) = maxsplit else {
        return s.split_whitespace().collect();
    };
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() && parts.len() < limit {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest);
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        parts.push(rest);
    }
    parts
}

// list

fn call_list_method(list: &ListRef, name: &str, args: &[Value], kwargs: &Kwargs) -> Result<Value, EvalError> {
    if name == "sort" {
        exact::<0>(name, args)?;
        let mut reverse = false;
        for (key, value) in kwargs {
            match &**key {
                "reverse" => reverse = value.is_truthy()?,
                other => return Err(unexpected_keyword("sort", other)),
            }
        }
        let items = read(list, "list")?.clone();
        let sorted = sort_values(items, reverse)?;
        *write(list, "list")? = sorted;
        return Ok(Value::None);
    }
    reject_kwargs(name, kwargs)?;
    match name {
        "append" => {
            let [item] = exact::<1>(name, args)?;
            let mut items = write(list, "list")?;
            check_len(items.len() + 1)?;
            items.push(item.clone());
            Ok(Value::None)
        }
        "extend" => {
            let [iterable] = exact::<1>(name, args)?;
            let extra = iterate(iterable)?;
            let mut items = write(list, "list")?;
            check_len(items.len() + extra.len())?;
            items.extend(extra);
            Ok(Value::None)
        }
        "insert" => {
            let [index, item] = exact::<2>(name, args)?;
            let index = int_arg(name, index)?;
            let mut items = write(list, "list")?;
            check_len(items.len() + 1)?;
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let position = if index < 0 { (index + len).max(0) } else { index.min(len) };
            items.insert(usize::try_from(position).unwrap_or(0), item.clone());
            Ok(Value::None)
        }
        "pop" => {
            let args = between(name, args, 0, 1)?;
            let mut items = write(list, "list")?;
            if items.is_empty() {
                return Err(EvalError::new(ErrorKind::IndexError, "pop from empty list"));
            }
            let index = args.first().map(|i| int_arg(name, i)).transpose()?.unwrap_or(-1);
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let position = if index < 0 { index + len } else { index };
            if !(0..len).contains(&position) {
                return Err(index_out_of_range("pop"));
            }
            Ok(items.remove(usize::try_from(position).unwrap_or(0)))
        }
        "remove" => {
            let [item] = exact::<1>(name, args)?;
            let mut items = write(list, "list")?;
            let position = position_of(&items, item)?
                .ok_or_else(|| value_error("list.remove(x): x not in list"))?;
            items.remove(position);
            Ok(Value::None)
        }
        "index" => {
            let [item] = exact::<1>(name, args)?;
            index_of(&read(list, "list")?, item, &format!("{} is not in list", item.repr()))
        }
        "count" => {
            let [item] = exact::<1>(name, args)?;
            count_of(&read(list, "list")?, item)
        }
        "reverse" => {
            exact::<0>(name, args)?;
            write(list, "list")?.reverse();
            Ok(Value::None)
        }
        "copy" => {
            exact::<0>(name, args)?;
            Ok(Value::list(read(list, "list")?.clone()))
        }
        "clear" => {
            exact::<0>(name, args)?;
            write(list, "list")?.clear();
            Ok(Value::None)
        }
        _ => Err(no_attribute("list", name)),
    }
}

// dict

fn call_dict_method(
    receiver: &Value,
    dict: &DictRef,
    name: &str,
    args: &[Value],
    kwargs: &Kwargs,
) -> Result<Value, EvalError> {
    if name == "update" {
        let args = between(name, args, 0, 1)?;
        // Gather first: `d.update(d)` reads the dict being written.
        let mut incoming = Dict::new();
        if let Some(other) = args.first() {
            incoming.update_from(other)?;
        }
        for (key, value) in kwargs {
            incoming.insert(Value::Str(Rc::clone(key)), value.clone())?;
        }
        let mut dict = write(dict, "dict")?;
        for (key, value) in incoming.iter() {
            dict.insert(key.clone(), value.clone())?;
        }
        return Ok(Value::None);
    }
    reject_kwargs(name, kwargs)?;
    match name {
        "keys" => {
            exact::<0>(name, args)?;
            Ok(Value::list(read(dict, "dict")?.keys().cloned().collect()))
        }
        "values" => {
            exact::<0>(name, args)?;
            Ok(Value::list(read(dict, "dict")?.values().cloned().collect()))
        }
        "items" => {
            exact::<0>(name, args)?;
            Ok(Value::list(
                read(dict, "dict")?
                    .iter()
                    .map(|(key, value)| Value::tuple(vec![key.clone(), value.clone()]))
                    .collect(),
            ))
        }
        "get" => {
            let args = between(name, args, 1, 2)?;
            let found = read(dict, "dict")?.get(&args[0])?;
            Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::None)))
        }
        "setdefault" => {
            let args = between(name, args, 1, 2)?;
            let mut dict = write(dict, "dict")?;
            if let Some(existing) = dict.get(&args[0])? {
                return Ok(existing);
            }
            let default = args.get(1).cloned().unwrap_or(Value::None);
            dict.insert(args[0].clone(), default.clone())?;
            Ok(default)
        }
        "pop" => {
            let args = between(name, args, 1, 2)?;
            let removed = write(dict, "dict")?.remove(&args[0])?;
            match (removed, args.get(1)) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(key_not_found(&args[0].repr())),
            }
        }
        "copy" => {
            exact::<0>(name, args)?;
            Ok(Value::dict(read(dict, "dict")?.clone()))
        }
        "clear" => {
            exact::<0>(name, args)?;
            write(dict, "dict")?.clear();
            Ok(Value::None)
        }
        _ => Err(no_attribute(receiver.type_name(), name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(receiver: &Value, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        call_method(receiver, name, args, &[])
    }

    #[test]
    fn dunder_names_are_refused() {
        let err = get_attribute(&Value::list(vec![]), "__class__").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeError);
        let err = get_attribute(&Value::Int(1), "real").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeError);
    }

    #[test]
    fn methods_are_bound_to_their_receiver() {
        let list = Value::list(vec![]);
        let append = get_attribute(&list, "append").unwrap();
        let Value::BoundMethod(method) = &append else {
            panic!("expected a bound method");
        };
        call_method(&method.receiver, method.name, &[Value::Int(1)], &[]).unwrap();
        assert_eq!(list, Value::list(vec![Value::Int(1)]));
    }

    #[test]
    fn builtin_attributes_are_read_only() {
        let err = set_attribute(&Value::list(vec![]), "append", &Value::None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeError);
        let err = set_attribute(&Value::Int(1), "x", &Value::None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeError);
    }

    #[test]
    fn string_methods() {
        let s = Value::str("  a b  c ");
        assert_eq!(
            call(&s, "split", &[]).unwrap(),
            Value::list(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(
            call(&s, "split", &[Value::None, Value::Int(1)]).unwrap(),
            Value::list(vec!["a".into(), "b  c ".into()])
        );
        assert_eq!(call(&s, "strip", &[]).unwrap(), Value::str("a b  c"));
        assert_eq!(
            call(&Value::str("-"), "join", &[Value::list(vec!["x".into(), "y".into()])]).unwrap(),
            Value::str("x-y")
        );
        assert_eq!(call(&Value::str("héllo"), "find", &["l".into()]).unwrap(), Value::Int(2));
        assert_eq!(
            call(&Value::str("a,b,,c"), "split", &[",".into()]).unwrap(),
            Value::list(vec!["a".into(), "b".into(), "".into(), "c".into()])
        );
        assert_eq!(
            call(&Value::str("aaa"), "replace", &["a".into(), "b".into(), Value::Int(2)]).unwrap(),
            Value::str("bba")
        );
    }

    #[test]
    fn list_mutators() {
        let list = Value::list(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        call(&list, "insert", &[Value::Int(-10), Value::Int(0)]).unwrap();
        assert_eq!(call(&list, "pop", &[]).unwrap(), Value::Int(2));
        call_method(&list, "sort", &[], &[(Rc::from("reverse"), Value::Bool(true))]).unwrap();
        assert_eq!(list, Value::list(vec![Value::Int(3), Value::Int(1), Value::Int(0)]));
        let err = call(&list, "remove", &[Value::Int(9)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn dict_methods() {
        let dict = Value::dict(Dict::new());
        assert_eq!(call(&dict, "setdefault", &["a".into(), Value::Int(1)]).unwrap(), Value::Int(1));
        assert_eq!(call(&dict, "get", &["b".into(), Value::Int(0)]).unwrap(), Value::Int(0));
        call(&dict, "update", &[dict.clone()]).unwrap();
        assert_eq!(
            call(&dict, "items", &[]).unwrap(),
            Value::list(vec![Value::tuple(vec!["a".into(), Value::Int(1)])])
        );
        let err = call(&dict, "pop", &["missing".into()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyError);
    }
}
