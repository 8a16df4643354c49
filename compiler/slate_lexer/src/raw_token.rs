//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! string interning, literal cooking and indentation processing.

use logos::Logos;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    #[regex(r"\\\r?\n", logos::skip)]
    LineContinuation,

    /// A line break plus the indentation of the following line.
    #[regex(r"\n[ \t]*")]
    Newline,

    // Keywords
    #[token("False")]
    False,
    #[token("None")]
    None,
    #[token("True")]
    True,
    #[token("and")]
    And,
    #[token("as")]
    As,
    #[token("assert")]
    Assert,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("break")]
    Break,
    #[token("class")]
    Class,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("del")]
    Del,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("except")]
    Except,
    #[token("finally")]
    Finally,
    #[token("for")]
    For,
    #[token("from")]
    From,
    #[token("global")]
    Global,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("lambda")]
    Lambda,
    #[token("nonlocal")]
    Nonlocal,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("pass")]
    Pass,
    #[token("print")]
    Print,
    #[token("raise")]
    Raise,
    #[token("return")]
    Return,
    #[token("try")]
    Try,
    #[token("while")]
    While,
    #[token("with")]
    With,
    #[token("yield")]
    Yield,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("=")]
    Eq,

    // Augmented assignment
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("//=")]
    DoubleSlashEq,
    #[token("%=")]
    PercentEq,
    #[token("**=")]
    DoubleStarEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    LShiftEq,
    #[token(">>=")]
    RShiftEq,

    // Literals
    #[regex(r"0[xX][0-9a-fA-F](_?[0-9a-fA-F])*")]
    HexInt,
    #[regex(r"0[oO][0-7](_?[0-7])*")]
    OctInt,
    #[regex(r"0[bB][01](_?[01])*")]
    BinInt,
    #[regex(r"[0-9](_?[0-9])*")]
    Int,
    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9]+")]
    Float,

    #[regex(r#"[rRuU]?"([^"\\\n]|\\(.|\n))*""#)]
    #[regex(r"[rRuU]?'([^'\\\n]|\\(.|\n))*'")]
    String,

    #[regex(r#"[rRuU]?""""#, lex_triple_quoted)]
    #[regex(r"[rRuU]?'''", lex_triple_quoted)]
    TripleString,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Consume the body of a triple-quoted string up to its closing delimiter.
fn lex_triple_quoted(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let quote = if lex.slice().ends_with("\"\"\"") {
        "\"\"\""
    } else {
        "'''"
    };
    match find_closing_triple(lex.remainder(), quote) {
        Some(consumed) => {
            lex.bump(consumed);
            true
        }
        None => false,
    }
}

/// Byte length of `rest` up to and including the closing `quote`.
pub(crate) fn find_closing_triple(rest: &str, quote: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let first = quote.as_bytes().first().copied()?;
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if byte == b'\\' {
            i += 2;
        } else if byte == first && rest.get(i..).is_some_and(|tail| tail.starts_with(quote)) {
            return Some(i + quote.len());
        } else {
            i += 1;
        }
    }
    None
}
