//! String formatting: the `%` operator and `str.format`.
//!
//! Both front ends parse their directives into a [`Spec`] and share one
//! renderer, so `'%5.2f' % x` and `'{:5.2f}'.format(x)` agree.

use std::iter::Peekable;
use std::str::Chars;

use super::format::python_exponent;
use super::{read, Kwargs, Value, MAX_SEQUENCE_LEN};
use crate::builtins::float_to_int;
use crate::errors::{format_field_too_large, type_error, value_error, EvalError};

/// Largest precision the float renderers accept.
const MAX_PRECISION: usize = u16::MAX as usize;

/// One parsed conversion directive.
#[derive(Clone, Debug, Default)]
struct Spec {
    fill: Option<char>,
    /// `<`, `>` or `^`.
    align: Option<char>,
    /// `+` or ` ` (the default `-` shows nothing for positives).
    sign: Option<char>,
    alternate: bool,
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    /// Conversion character; `None` means "natural text of the value".
    conversion: Option<char>,
}

impl Spec {
    /// Refuse widths and precisions that would allocate unbounded padding
    /// or digits.
    fn checked(self) -> Result<Self, EvalError> {
        if self.width > MAX_SEQUENCE_LEN {
            return Err(format_field_too_large("width", self.width, MAX_SEQUENCE_LEN));
        }
        match self.precision {
            Some(precision) if precision > MAX_PRECISION => Err(format_field_too_large(
                "precision",
                precision,
                MAX_PRECISION,
            )),
            _ => Ok(self),
        }
    }
}

/// Where `%` directives take their arguments from.
enum PercentArgs<'a> {
    Positional(Vec<Value>, usize),
    Mapping(&'a Value),
}

/// `format % args`.
pub fn percent_format(format: &str, args: &Value) -> Result<String, EvalError> {
    let mut source = match args {
        Value::Tuple(items) => PercentArgs::Positional(items.to_vec(), 0),
        Value::Dict(_) => PercentArgs::Mapping(args),
        other => PercentArgs::Positional(vec![other.clone()], 0),
    };
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let key = if chars.peek() == Some(&'(') {
            chars.next();
            let key: String = chars.by_ref().take_while(|&c| c != ')').collect();
            Some(key)
        } else {
            None
        };
        let spec = parse_percent_spec(&mut chars)?;
        let value = match (&mut source, key) {
            (PercentArgs::Mapping(Value::Dict(dict)), Some(key)) => read(dict, "dict")?
                .get(&Value::str(&key))?
                .ok_or_else(|| crate::errors::key_not_found(&super::quote_str(&key)))?,
            (PercentArgs::Mapping(_) | PercentArgs::Positional(..), Some(_)) => {
                return Err(type_error("format requires a mapping"));
            }
            (PercentArgs::Mapping(mapping), None) => (*mapping).clone(),
            (PercentArgs::Positional(items, next), None) => {
                let value = items
                    .get(*next)
                    .cloned()
                    .ok_or_else(|| type_error("not enough arguments for format string"))?;
                *next += 1;
                value
            }
        };
        out.push_str(&render(&value, &spec, true)?);
    }
    if let PercentArgs::Positional(items, used) = &source {
        if *used < items.len() {
            return Err(type_error(
                "not all arguments converted during string formatting",
            ));
        }
    }
    Ok(out)
}

fn parse_percent_spec(chars: &mut Peekable<Chars<'_>>) -> Result<Spec, EvalError> {
    let mut spec = Spec::default();
    while let Some(&flag) = chars.peek() {
        match flag {
            '-' => spec.align = Some('<'),
            '+' => spec.sign = Some('+'),
            ' ' => spec.sign = spec.sign.or(Some(' ')),
            '#' => spec.alternate = true,
            '0' => spec.zero_pad = true,
            _ => break,
        }
        chars.next();
    }
    spec.width = take_number(chars).unwrap_or(0);
    if chars.peek() == Some(&'.') {
        chars.next();
        spec.precision = Some(take_number(chars).unwrap_or(0));
    }
    match chars.next() {
        Some(c @ ('s' | 'r' | 'd' | 'i' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'x' | 'X' | 'o' | 'c')) => {
            spec.conversion = Some(if c == 'i' { 'd' } else { c });
            spec.checked()
        }
        Some(c) => Err(value_error(format!(
            "unsupported format character '{c}' (0x{:x})",
            u32::from(c)
        ))),
        None => Err(value_error("incomplete format")),
    }
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    parse_field(&digits)
}

/// Digits of a width or precision; too many to fit saturate so the limit
/// check reports them.
fn parse_field(digits: &str) -> Option<usize> {
    if digits.is_empty() {
        None
    } else {
        Some(digits.parse().unwrap_or(usize::MAX))
    }
}

/// `template.format(*args, **kwargs)`.
pub fn format_method(template: &str, args: &[Value], kwargs: &Kwargs) -> Result<String, EvalError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut auto_index = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(value_error("single '}' encountered in format string")),
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    field.push(c);
                }
                if !closed {
                    return Err(value_error("expected '}' before end of string"));
                }
                let (name, spec_text) = field.split_once(':').unwrap_or((field.as_str(), ""));
                let (name, bang) = match name.split_once('!') {
                    Some((name, conv)) => (name, conv.chars().next()),
                    None => (name, None),
                };
                let value = if name.is_empty() {
                    let value = args.get(auto_index).cloned();
                    auto_index += 1;
                    value.ok_or_else(|| {
                        EvalError::new(
                            crate::errors::ErrorKind::IndexError,
                            "replacement index out of range for positional args tuple",
                        )
                    })?
                } else if let Ok(position) = name.parse::<usize>() {
                    args.get(position).cloned().ok_or_else(|| {
                        EvalError::new(
                            crate::errors::ErrorKind::IndexError,
                            format!("replacement index {position} out of range"),
                        )
                    })?
                } else {
                    kwargs
                        .iter()
                        .find(|(key, _)| &**key == name)
                        .map(|(_, value)| value.clone())
                        .ok_or_else(|| crate::errors::key_not_found(&super::quote_str(name)))?
                };
                let value = match bang {
                    Some('r') => Value::str(&value.try_repr()?),
                    Some('s') => Value::str(&value.try_str()?),
                    Some(other) => {
                        return Err(value_error(format!(
                            "unknown conversion specifier {other}"
                        )))
                    }
                    None => value,
                };
                let spec = parse_format_spec(spec_text)?;
                out.push_str(&render(&value, &spec, false)?);
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// `[[fill]align][sign][#][0][width][.precision][type]`
fn parse_format_spec(text: &str) -> Result<Spec, EvalError> {
    let mut spec = Spec::default();
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let is_align = |c: char| matches!(c, '<' | '>' | '^');
    match chars.as_slice() {
        [fill, align, ..] if is_align(*align) => {
            spec.fill = Some(*fill);
            spec.align = Some(*align);
            pos = 2;
        }
        [align, ..] if is_align(*align) => {
            spec.align = Some(*align);
            pos = 1;
        }
        _ => {}
    }
    if let Some(&(sign @ ('+' | '-' | ' '))) = chars.get(pos) {
        if sign != '-' {
            spec.sign = Some(sign);
        }
        pos += 1;
    }
    if chars.get(pos) == Some(&'#') {
        spec.alternate = true;
        pos += 1;
    }
    if chars.get(pos) == Some(&'0') {
        spec.zero_pad = true;
        pos += 1;
    }
    let digits: String = chars[pos..].iter().take_while(|c| c.is_ascii_digit()).collect();
    pos += digits.len();
    spec.width = parse_field(&digits).unwrap_or(0);
    if chars.get(pos) == Some(&'.') {
        pos += 1;
        let digits: String = chars[pos..].iter().take_while(|c| c.is_ascii_digit()).collect();
        pos += digits.len();
        spec.precision = Some(parse_field(&digits).unwrap_or(0));
    }
    match &chars[pos..] {
        [] => {}
        [c @ ('s' | 'd' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'x' | 'X' | 'o' | 'c' | '%')] => {
            spec.conversion = Some(*c);
        }
        _ => return Err(value_error(format!("Invalid format specifier '{text}'"))),
    }
    spec.checked()
}

/// Render one value. `percent` selects `%` operator conventions where the
/// two front ends differ (default alignment of text).
fn render(value: &Value, spec: &Spec, percent: bool) -> Result<String, EvalError> {
    let (body, numeric) = match spec.conversion {
        None => match value {
            Value::Int(_) | Value::Float(_) if spec.precision.is_some() || spec.sign.is_some() => {
                let conversion = if matches!(value, Value::Int(_)) { 'd' } else { 'g' };
                (render_number(value, spec, conversion)?, true)
            }
            other => (truncate(other.try_str()?, spec.precision), other.is_number()),
        },
        Some('s') => (truncate(value.try_str()?, spec.precision), false),
        Some('r') => (truncate(value.try_repr()?, spec.precision), false),
        Some('c') => (render_char(value)?, false),
        Some(conversion) => (render_number(value, spec, conversion)?, true),
    };
    Ok(pad(body, spec, numeric, percent))
}

fn truncate(text: String, precision: Option<usize>) -> String {
    match precision {
        Some(limit) => text.chars().take(limit).collect(),
        None => text,
    }
}

fn render_char(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Str(s) if s.chars().count() == 1 => Ok(s.to_string()),
        Value::Int(n) => u32::try_from(*n)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| value_error("%c arg not in range(0x110000)")),
        _ => Err(type_error("%c requires an int or a single character")),
    }
}

fn render_number(value: &Value, spec: &Spec, conversion: char) -> Result<String, EvalError> {
    let integral = |value: &Value| -> Result<i64, EvalError> {
        match value {
            Value::Float(x) => float_to_int(*x),
            other => other.as_int().ok_or_else(|| {
                type_error(format!(
                    "%{conversion} format: a number is required, not {}",
                    other.type_name()
                ))
            }),
        }
    };
    let real = |value: &Value| -> Result<f64, EvalError> {
        value.as_float().ok_or_else(|| {
            type_error(format!(
                "must be real number, not {}",
                value.type_name()
            ))
        })
    };
    let (negative, digits) = match conversion {
        'd' => {
            let n = integral(value)?;
            (n < 0, n.unsigned_abs().to_string())
        }
        'x' | 'X' | 'o' => {
            let n = integral(value)?;
            let magnitude = n.unsigned_abs();
            let text = match (conversion, spec.alternate) {
                ('x', false) => format!("{magnitude:x}"),
                ('x', true) => format!("0x{magnitude:x}"),
                ('X', false) => format!("{magnitude:X}"),
                ('X', true) => format!("0X{magnitude:X}"),
                (_, false) => format!("{magnitude:o}"),
                (_, true) => format!("0o{magnitude:o}"),
            };
            (n < 0, text)
        }
        'f' | 'F' | '%' => {
            let mut x = real(value)?;
            if conversion == '%' {
                x *= 100.0;
            }
            let precision = spec.precision.unwrap_or(6);
            let mut text = fixed(x.abs(), precision);
            if conversion == '%' {
                text.push('%');
            }
            (x.is_sign_negative() && !x.is_nan(), text)
        }
        'e' | 'E' => {
            let x = real(value)?;
            let text = exponent(x.abs(), spec.precision.unwrap_or(6));
            let text = if conversion == 'E' { text.to_uppercase() } else { text };
            (x.is_sign_negative() && !x.is_nan(), text)
        }
        'g' | 'G' => {
            let x = real(value)?;
            let text = general(x.abs(), spec.precision, spec.alternate);
            let text = if conversion == 'G' { text.to_uppercase() } else { text };
            (x.is_sign_negative() && !x.is_nan(), text)
        }
        other => {
            return Err(value_error(format!(
                "unknown format code '{other}' for object of type '{}'",
                value.type_name()
            )))
        }
    };
    let sign = if negative {
        "-"
    } else {
        match spec.sign {
            Some('+') => "+",
            Some(' ') => " ",
            _ => "",
        }
    };
    Ok(format!("{sign}{digits}"))
}

fn non_finite(x: f64) -> Option<String> {
    if x.is_nan() {
        Some("nan".to_string())
    } else if x.is_infinite() {
        Some("inf".to_string())
    } else {
        None
    }
}

fn fixed(x: f64, precision: usize) -> String {
    non_finite(x).unwrap_or_else(|| format!("{x:.precision$}"))
}

fn exponent(x: f64, precision: usize) -> String {
    non_finite(x).unwrap_or_else(|| python_exponent(&format!("{x:.precision$e}")))
}

/// `%g`: fixed or exponent form depending on the decimal exponent, with
/// trailing zeros removed unless `alternate`.
fn general(x: f64, precision: Option<usize>, alternate: bool) -> String {
    if let Some(text) = non_finite(x) {
        return text;
    }
    let precision = precision.unwrap_or(6).max(1);
    let digits = precision - 1;
    let scientific = format!("{x:.digits$e}");
    let exp: i64 = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    let limit = i64::try_from(precision).unwrap_or(i64::MAX);
    let text = if (-4..limit).contains(&exp) {
        let decimals = usize::try_from(limit - 1 - exp).unwrap_or(0);
        format!("{x:.decimals$}")
    } else {
        python_exponent(&scientific)
    };
    if alternate {
        text
    } else {
        strip_trailing_zeros(&text)
    }
}

fn strip_trailing_zeros(text: &str) -> String {
    let (mantissa, exp) = match text.find('e') {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{exp}")
}

fn pad(body: String, spec: &Spec, numeric: bool, percent: bool) -> String {
    let len = body.chars().count();
    if len >= spec.width {
        return body;
    }
    let gap = spec.width - len;
    if spec.zero_pad && numeric && spec.align.is_none() {
        let (sign, digits) = match body.chars().next() {
            Some(c @ ('+' | '-' | ' ')) => (c.to_string(), &body[1..]),
            _ => (String::new(), body.as_str()),
        };
        return format!("{sign}{}{digits}", "0".repeat(gap));
    }
    let fill = spec.fill.unwrap_or(' ').to_string();
    let default_align = if numeric || percent { '>' } else { '<' };
    match spec.align.unwrap_or(default_align) {
        '<' => format!("{body}{}", fill.repeat(gap)),
        '^' => {
            let left = gap / 2;
            format!("{}{body}{}", fill.repeat(left), fill.repeat(gap - left))
        }
        _ => format!("{}{body}", fill.repeat(gap)),
    }
}
