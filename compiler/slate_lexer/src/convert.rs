//! Raw token to `TokenKind` conversion.

use slate_ir::{Span, StringInterner};

use crate::escape::cook_string;
use crate::lex_error::LexError;
use crate::parse_helpers::{parse_float_skip_underscores, parse_int_skip_underscores};
use crate::raw_token::RawToken;
use crate::token::TokenKind;

/// Convert a non-layout raw token into its cooked kind.
pub(crate) fn convert_token(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<TokenKind, LexError> {
    let kind = match raw {
        // Literals
        RawToken::Int => int_literal(slice, slice, 10, span)?,
        RawToken::HexInt => int_literal(slice, &slice[2..], 16, span)?,
        RawToken::OctInt => int_literal(slice, &slice[2..], 8, span)?,
        RawToken::BinInt => int_literal(slice, &slice[2..], 2, span)?,
        RawToken::Float => match parse_float_skip_underscores(slice) {
            Some(value) => TokenKind::Float(value),
            None => return Err(LexError::invalid_number(span, slice)),
        },
        RawToken::String | RawToken::TripleString => TokenKind::Str(cook_string(slice, span)?),
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        // Keywords
        RawToken::False => TokenKind::False,
        RawToken::None => TokenKind::None,
        RawToken::True => TokenKind::True,
        RawToken::And => TokenKind::And,
        RawToken::As => TokenKind::As,
        RawToken::Assert => TokenKind::Assert,
        RawToken::Async => TokenKind::Async,
        RawToken::Await => TokenKind::Await,
        RawToken::Break => TokenKind::Break,
        RawToken::Class => TokenKind::Class,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Def => TokenKind::Def,
        RawToken::Del => TokenKind::Del,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::Except => TokenKind::Except,
        RawToken::Finally => TokenKind::Finally,
        RawToken::For => TokenKind::For,
        RawToken::From => TokenKind::From,
        RawToken::Global => TokenKind::Global,
        RawToken::If => TokenKind::If,
        RawToken::Import => TokenKind::Import,
        RawToken::In => TokenKind::In,
        RawToken::Is => TokenKind::Is,
        RawToken::Lambda => TokenKind::Lambda,
        RawToken::Nonlocal => TokenKind::Nonlocal,
        RawToken::Not => TokenKind::Not,
        RawToken::Or => TokenKind::Or,
        RawToken::Pass => TokenKind::Pass,
        RawToken::Print => TokenKind::Print,
        RawToken::Raise => TokenKind::Raise,
        RawToken::Return => TokenKind::Return,
        RawToken::Try => TokenKind::Try,
        RawToken::While => TokenKind::While,
        RawToken::With => TokenKind::With,
        RawToken::Yield => TokenKind::Yield,

        // Delimiters
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,

        // Operators
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::DoubleStar => TokenKind::DoubleStar,
        RawToken::Slash => TokenKind::Slash,
        RawToken::DoubleSlash => TokenKind::DoubleSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::LShift => TokenKind::LShift,
        RawToken::RShift => TokenKind::RShift,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Eq => TokenKind::Eq,

        // Augmented assignment
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::DoubleSlashEq => TokenKind::DoubleSlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::DoubleStarEq => TokenKind::DoubleStarEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::LShiftEq => TokenKind::LShiftEq,
        RawToken::RShiftEq => TokenKind::RShiftEq,

        // Layout and trivia are handled by the caller.
        RawToken::Newline | RawToken::Comment | RawToken::LineContinuation => {
            return Err(LexError::invalid_character(span, '\n'));
        }
    };
    Ok(kind)
}

fn int_literal(full: &str, digits: &str, radix: u32, span: Span) -> Result<TokenKind, LexError> {
    parse_int_skip_underscores(digits, radix)
        .map(TokenKind::Int)
        .ok_or_else(|| LexError::int_overflow(span, full))
}
