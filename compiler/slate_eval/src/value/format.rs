//! `str()` and `repr()` text of values.

use std::fmt::Write as _;
use std::rc::Rc;

use super::{Value, MAX_NESTING_DEPTH};
use crate::errors::{nesting_too_deep, EvalError};

/// Render `value`; container elements always use their repr.
pub(super) fn render(value: &Value, repr: bool) -> String {
    let mut writer = Writer::default();
    writer.write_value(value, repr);
    writer.out
}

/// Like [`render`], but containers nested too deep to print are an error.
pub(super) fn try_render(value: &Value, repr: bool) -> Result<String, EvalError> {
    let mut writer = Writer::default();
    writer.write_value(value, repr);
    if writer.truncated {
        return Err(nesting_too_deep("while getting the repr of an object"));
    }
    Ok(writer.out)
}

#[derive(Default)]
struct Writer {
    out: String,
    /// Lists and dicts currently being written, so a list that contains
    /// itself prints as `[...]` instead of recursing forever.
    active: Vec<usize>,
    depth: usize,
    /// Some container sat deeper than [`MAX_NESTING_DEPTH`] and was
    /// written as `...`.
    truncated: bool,
}

impl Writer {
    fn write_value(&mut self, value: &Value, repr: bool) {
        match value {
            Value::None => self.out.push_str("None"),
            Value::Bool(true) => self.out.push_str("True"),
            Value::Bool(false) => self.out.push_str("False"),
            Value::Int(n) => {
                let _ = write!(self.out, "{n}");
            }
            Value::Float(x) => self.out.push_str(&format_float(*x)),
            Value::Str(s) => {
                if repr {
                    self.out.push_str(&quote_str(s));
                } else {
                    self.out.push_str(s);
                }
            }
            Value::List(items) => {
                let id = Rc::as_ptr(items).cast::<()>() as usize;
                let Some(items) = items.try_borrow().ok().filter(|_| !self.active.contains(&id))
                else {
                    self.out.push_str("[...]");
                    return;
                };
                self.nested(id, |writer| {
                    writer.out.push('[');
                    writer.write_items(&items);
                    writer.out.push(']');
                });
            }
            Value::Tuple(items) => {
                self.nested(0, |writer| {
                    writer.out.push('(');
                    writer.write_items(items);
                    if items.len() == 1 {
                        writer.out.push(',');
                    }
                    writer.out.push(')');
                });
            }
            Value::Dict(dict) => {
                let id = Rc::as_ptr(dict).cast::<()>() as usize;
                let Some(dict) = dict.try_borrow().ok().filter(|_| !self.active.contains(&id))
                else {
                    self.out.push_str("{...}");
                    return;
                };
                self.nested(id, |writer| {
                    writer.out.push('{');
                    for (i, (key, item)) in dict.iter().enumerate() {
                        if i > 0 {
                            writer.out.push_str(", ");
                        }
                        writer.write_value(key, true);
                        writer.out.push_str(": ");
                        writer.write_value(item, true);
                    }
                    writer.out.push('}');
                });
            }
            Value::Array(array) => match array.try_borrow() {
                Ok(array) if repr => self.out.push_str(&array.repr()),
                Ok(array) => self.out.push_str(&array.display()),
                Err(_) => self.out.push_str("array(...)"),
            },
            Value::Procedure(procedure) => {
                if repr {
                    self.out.push_str(&procedure.signature());
                } else {
                    let _ = write!(self.out, "{procedure}");
                }
            }
            Value::Builtin(builtin) => {
                let _ = write!(self.out, "<built-in function {}>", builtin.name);
            }
            Value::BoundMethod(method) => {
                let _ = write!(
                    self.out,
                    "<built-in method {} of {} object>",
                    method.name,
                    method.receiver.type_name()
                );
            }
        }
    }

    /// Write one container level. `id` is the container's address, or 0
    /// for immutable containers that cannot contain themselves.
    fn nested(&mut self, id: usize, write: impl FnOnce(&mut Self)) {
        if self.depth >= MAX_NESTING_DEPTH {
            self.truncated = true;
            self.out.push_str("...");
            return;
        }
        self.depth += 1;
        if id != 0 {
            self.active.push(id);
        }
        write(self);
        if id != 0 {
            self.active.pop();
        }
        self.depth -= 1;
    }

    fn write_items(&mut self, items: &[Value]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_value(item, true);
        }
    }
}

/// Shortest round-tripping float text: `1.0`, `0.1`, `1e+20`, `1.5e-05`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return python_exponent(&format!("{x:e}"));
    }
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Rewrite Rust exponent text (`1.5e-5`) in the scripting language's form
/// (`1.5e-05`).
pub(super) fn python_exponent(text: &str) -> String {
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text.to_string();
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent.trim_start_matches('+')),
    };
    if digits.len() < 2 {
        format!("{mantissa}e{sign}0{digits}")
    } else {
        format!("{mantissa}e{sign}{digits}")
    }
}

/// Quote a string the way `repr()` does.
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-3.0), "-3.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(2.5), "2.5");
    }

    #[test]
    fn floats_switch_to_exponent_form() {
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn strings_quote_like_repr() {
        assert_eq!(quote_str("abc"), "'abc'");
        assert_eq!(quote_str("it's"), "\"it's\"");
        assert_eq!(quote_str("a\nb"), "'a\\nb'");
        assert_eq!(quote_str("'\""), "'\\'\"'");
    }

    #[test]
    fn nested_containers() {
        let inner = Value::tuple(vec![Value::Int(1)]);
        let list = Value::list(vec![inner, Value::str("x"), Value::Float(2.0), Value::None]);
        assert_eq!(list.repr(), "[(1,), 'x', 2.0, None]");
        assert_eq!(list.to_string(), "[(1,), 'x', 2.0, None]");
        assert_eq!(Value::str("x").to_string(), "x");
    }

    #[test]
    fn self_containing_list_prints_ellipsis() {
        let list = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        assert_eq!(list.repr(), "[1, [...]]");
    }

    #[test]
    fn deep_nesting_is_cut_short() {
        let mut value = Value::Int(1);
        for _ in 0..MAX_NESTING_DEPTH + 10 {
            value = Value::list(vec![value]);
        }
        assert!(value.repr().ends_with("[...]]]"));
        assert_eq!(value.try_repr().unwrap_err().kind, crate::errors::ErrorKind::RuntimeError);
        assert!(value.try_str().is_err());

        let shallow = Value::list(vec![Value::tuple(vec![Value::Int(1)])]);
        assert_eq!(shallow.try_repr().unwrap(), "[(1,)]");
    }
}
