//! Cooked tokens handed to the parser.

use std::fmt;

use slate_ir::{Name, Span};

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Token kinds after interning, literal cooking and indentation tracking.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,

    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(Name),

    // Keywords
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Print,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semi,
    Dot,
    Arrow,

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LShift,
    RShift,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    Eq,

    // Augmented assignment
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    DoubleSlashEq,
    PercentEq,
    DoubleStarEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LShiftEq,
    RShiftEq,
}

impl TokenKind {
    /// Check if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        self.keyword_str().is_some()
    }

    /// Source spelling of a keyword token.
    pub fn keyword_str(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::False => "False",
            TokenKind::None => "None",
            TokenKind::True => "True",
            TokenKind::And => "and",
            TokenKind::As => "as",
            TokenKind::Assert => "assert",
            TokenKind::Async => "async",
            TokenKind::Await => "await",
            TokenKind::Break => "break",
            TokenKind::Class => "class",
            TokenKind::Continue => "continue",
            TokenKind::Def => "def",
            TokenKind::Del => "del",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::Except => "except",
            TokenKind::Finally => "finally",
            TokenKind::For => "for",
            TokenKind::From => "from",
            TokenKind::Global => "global",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::In => "in",
            TokenKind::Is => "is",
            TokenKind::Lambda => "lambda",
            TokenKind::Nonlocal => "nonlocal",
            TokenKind::Not => "not",
            TokenKind::Or => "or",
            TokenKind::Pass => "pass",
            TokenKind::Print => "print",
            TokenKind::Raise => "raise",
            TokenKind::Return => "return",
            TokenKind::Try => "try",
            TokenKind::While => "while",
            TokenKind::With => "with",
            TokenKind::Yield => "yield",
            _ => return None,
        };
        Some(text)
    }

    /// Source spelling of a punctuation or operator token.
    pub fn punct_str(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::DoubleStar => "**",
            TokenKind::Slash => "/",
            TokenKind::DoubleSlash => "//",
            TokenKind::Percent => "%",
            TokenKind::LShift => "<<",
            TokenKind::RShift => ">>",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::DoubleSlashEq => "//=",
            TokenKind::PercentEq => "%=",
            TokenKind::DoubleStarEq => "**=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::LShiftEq => "<<=",
            TokenKind::RShiftEq => ">>=",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.keyword_str().or_else(|| self.punct_str()) {
            return write!(f, "`{text}`");
        }
        match self {
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Indent => f.write_str("indent"),
            TokenKind::Dedent => f.write_str("dedent"),
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Int(n) => write!(f, "integer `{n}`"),
            TokenKind::Float(x) => write!(f, "float `{x}`"),
            TokenKind::Str(_) => f.write_str("string literal"),
            TokenKind::Ident(_) => f.write_str("identifier"),
            _ => f.write_str("token"),
        }
    }
}
