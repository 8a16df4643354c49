//! Operator Matching Helpers
//!
//! Helper methods for matching binary, unary and comparison operators
//! during parsing.

use slate_ir::{BinaryOp, CmpOp, UnaryOp};
use slate_lexer::TokenKind;

use super::BinaryLevel;
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn match_binary_op(&self, level: BinaryLevel) -> Option<BinaryOp> {
        let op = match (level, self.current_kind()) {
            (BinaryLevel::BitOr, TokenKind::Pipe) => BinaryOp::BitOr,
            (BinaryLevel::BitXor, TokenKind::Caret) => BinaryOp::BitXor,
            (BinaryLevel::BitAnd, TokenKind::Amp) => BinaryOp::BitAnd,
            (BinaryLevel::Shift, TokenKind::LShift) => BinaryOp::LShift,
            (BinaryLevel::Shift, TokenKind::RShift) => BinaryOp::RShift,
            (BinaryLevel::Arith, TokenKind::Plus) => BinaryOp::Add,
            (BinaryLevel::Arith, TokenKind::Minus) => BinaryOp::Sub,
            (BinaryLevel::Term, TokenKind::Star) => BinaryOp::Mul,
            (BinaryLevel::Term, TokenKind::Slash) => BinaryOp::Div,
            (BinaryLevel::Term, TokenKind::DoubleSlash) => BinaryOp::FloorDiv,
            (BinaryLevel::Term, TokenKind::Percent) => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    pub(crate) fn match_unary_op(&self) -> Option<UnaryOp> {
        match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Tilde => Some(UnaryOp::Invert),
            _ => None,
        }
    }

    /// Match a comparison operator, returning it with its width in tokens
    /// (`not in` and `is not` take two).
    pub(crate) fn match_comparison_op(&self) -> Option<(CmpOp, usize)> {
        let matched = match self.current_kind() {
            TokenKind::EqEq => (CmpOp::Eq, 1),
            TokenKind::NotEq => (CmpOp::NotEq, 1),
            TokenKind::Lt => (CmpOp::Lt, 1),
            TokenKind::LtEq => (CmpOp::LtE, 1),
            TokenKind::Gt => (CmpOp::Gt, 1),
            TokenKind::GtEq => (CmpOp::GtE, 1),
            TokenKind::In => (CmpOp::In, 1),
            TokenKind::Is if matches!(self.peek_next_kind(), TokenKind::Not) => (CmpOp::IsNot, 2),
            TokenKind::Is => (CmpOp::Is, 1),
            TokenKind::Not if matches!(self.peek_next_kind(), TokenKind::In) => (CmpOp::NotIn, 2),
            _ => return None,
        };
        Some(matched)
    }

    pub(crate) fn match_augmented_op(&self) -> Option<BinaryOp> {
        let op = match self.current_kind() {
            TokenKind::PlusEq => BinaryOp::Add,
            TokenKind::MinusEq => BinaryOp::Sub,
            TokenKind::StarEq => BinaryOp::Mul,
            TokenKind::SlashEq => BinaryOp::Div,
            TokenKind::DoubleSlashEq => BinaryOp::FloorDiv,
            TokenKind::PercentEq => BinaryOp::Mod,
            TokenKind::DoubleStarEq => BinaryOp::Pow,
            TokenKind::AmpEq => BinaryOp::BitAnd,
            TokenKind::PipeEq => BinaryOp::BitOr,
            TokenKind::CaretEq => BinaryOp::BitXor,
            TokenKind::LShiftEq => BinaryOp::LShift,
            TokenKind::RShiftEq => BinaryOp::RShift,
            _ => return None,
        };
        Some(op)
    }
}
