//! String literal cooking: prefix and quote stripping plus escape processing.

use slate_ir::Span;

use crate::lex_error::LexError;

/// Cook the full source text of a string token into its value.
///
/// `text` includes the optional `r`/`u` prefix and the quotes; `span`
/// locates the token for error reporting.
pub(crate) fn cook_string(text: &str, span: Span) -> Result<String, LexError> {
    let prefix_len = text
        .char_indices()
        .find(|&(_, c)| c == '"' || c == '\'')
        .map_or(0, |(i, _)| i);
    let raw = text[..prefix_len].contains(['r', 'R']);
    let quoted = &text[prefix_len..];
    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return Err(LexError::unterminated_string(span));
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];
    if raw || !body.contains('\\') {
        return Ok(body.to_string());
    }
    unescape(body, span)
}

fn unescape(body: &str, span: Span) -> Result<String, LexError> {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            result.push('\\');
            break;
        };
        match esc {
            '\n' => {}
            '\\' => result.push('\\'),
            '\'' => result.push('\''),
            '"' => result.push('"'),
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'a' => result.push('\u{07}'),
            'b' => result.push('\u{08}'),
            'f' => result.push('\u{0C}'),
            'v' => result.push('\u{0B}'),
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                result.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            'x' | 'u' | 'U' => {
                let width = match esc {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => result.push(ch),
                    None => return Err(LexError::invalid_escape(span, &format!("{esc}{digits}"))),
                }
            }
            // Unknown escapes keep their backslash.
            other => {
                result.push('\\');
                result.push(other);
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cook(text: &str) -> String {
        cook_string(text, Span::DUMMY).unwrap()
    }

    #[test]
    fn strips_quotes_and_prefix() {
        assert_eq!(cook("'abc'"), "abc");
        assert_eq!(cook("\"abc\""), "abc");
        assert_eq!(cook("u'abc'"), "abc");
        assert_eq!(cook("\"\"\"a\nb\"\"\""), "a\nb");
        assert_eq!(cook("''"), "");
    }

    #[test]
    fn processes_escapes() {
        assert_eq!(cook(r"'a\nb'"), "a\nb");
        assert_eq!(cook(r"'tab\there'"), "tab\there");
        assert_eq!(cook(r"'q\'s'"), "q's");
        assert_eq!(cook(r"'\x41é'"), "A\u{e9}");
        assert_eq!(cook(r"'\101'"), "A");
        assert_eq!(cook(r"'\q'"), "\\q");
    }

    #[test]
    fn raw_strings_keep_backslashes() {
        assert_eq!(cook(r"r'a\nb'"), "a\\nb");
        assert_eq!(cook(r"R'\d+'"), "\\d+");
    }

    #[test]
    fn truncated_hex_escape_is_an_error() {
        let err = cook_string(r"'\x4'", Span::new(0, 6)).unwrap_err();
        assert_eq!(err.span, Span::new(0, 6));
    }
}
