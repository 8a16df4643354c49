//! Lexer for Slate using logos with string interning.
//!
//! Produces a flat token vector for the parser. Layout is made explicit
//! here: logical line ends become `Newline`, changes in leading
//! indentation become `Indent`/`Dedent`, and line breaks inside brackets
//! are dropped.

mod convert;
mod escape;
mod lex_error;
mod parse_helpers;
mod raw_token;
mod token;

use logos::Logos;
use slate_ir::{Span, StringInterner};

use convert::convert_token;
use raw_token::RawToken;

pub use lex_error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind};

/// Column a tab advances to a multiple of.
const TAB_WIDTH: usize = 8;

/// Tokenize `source`, interning identifiers into `interner`.
///
/// The result always ends with `Newline` (if any tokens precede it), the
/// dedents closing every open block, then `Eof`.
pub fn lex(source: &str, interner: &StringInterner) -> Result<Vec<Token>, LexError> {
    let mut layout = Layout::new(leading_indent(source));
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::Comment | RawToken::LineContinuation) => {}
            Ok(RawToken::Newline) => layout.newline(span, indent_width(&slice[1..])),
            Ok(raw) => {
                let kind = convert_token(raw, slice, span, interner)?;
                layout.push(kind, span)?;
            }
            Err(()) => return Err(classify_error(slice, span)),
        }
    }

    let eof_pos = u32::try_from(source.len()).unwrap_or(u32::MAX);
    Ok(layout.finish(Span::new(eof_pos, eof_pos)))
}

/// Work out why logos rejected `slice`.
fn classify_error(slice: &str, span: Span) -> LexError {
    let body = slice.trim_start_matches(['r', 'R', 'u', 'U']);
    match body.chars().next() {
        Some('"' | '\'') => LexError::unterminated_string(span),
        Some(c) => LexError::invalid_character(span, c),
        None => LexError::invalid_character(span, '\0'),
    }
}

/// Width of a run of spaces and tabs.
fn indent_width(ws: &str) -> usize {
    ws.chars().fold(0, |width, c| match c {
        '\t' => (width / TAB_WIDTH + 1) * TAB_WIDTH,
        _ => width + 1,
    })
}

fn leading_indent(source: &str) -> usize {
    let end = source
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(source.len());
    indent_width(&source[..end])
}

/// Indentation and bracket tracking over the raw token stream.
struct Layout {
    tokens: Vec<Token>,
    /// Open indentation levels; the bottom entry is always 0.
    indents: Vec<usize>,
    /// Nesting of `(`, `[` and `{`.
    brackets: usize,
    /// Indentation of the current line, applied at its first real token.
    pending_indent: Option<usize>,
}

impl Layout {
    fn new(first_line_indent: usize) -> Self {
        Layout {
            tokens: Vec::new(),
            indents: vec![0],
            brackets: 0,
            pending_indent: Some(first_line_indent),
        }
    }

    fn newline(&mut self, span: Span, next_indent: usize) {
        if self.brackets > 0 {
            return;
        }
        if self.pending_indent.is_none() {
            let at = Span::new(span.start, span.start + 1);
            self.tokens.push(Token::new(TokenKind::Newline, at));
        }
        self.pending_indent = Some(next_indent);
    }

    fn push(&mut self, kind: TokenKind, span: Span) -> Result<(), LexError> {
        if let Some(width) = self.pending_indent.take() {
            self.apply_indent(width, span)?;
        }
        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.brackets += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.brackets = self.brackets.saturating_sub(1);
            }
            _ => {}
        }
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    fn apply_indent(&mut self, width: usize, span: Span) -> Result<(), LexError> {
        let at = Span::new(span.start, span.start);
        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.tokens.push(Token::new(TokenKind::Indent, at));
            return Ok(());
        }
        while self.indents.last().is_some_and(|&level| level > width) {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, at));
        }
        if self.indents.last().copied().unwrap_or(0) != width {
            return Err(LexError::inconsistent_dedent(span));
        }
        Ok(())
    }

    fn finish(mut self, eof: Span) -> Vec<Token> {
        if self.pending_indent.is_none() {
            self.tokens.push(Token::new(TokenKind::Newline, eof));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, eof));
        }
        self.tokens.push(Token::new(TokenKind::Eof, eof));
        self.tokens
    }
}
