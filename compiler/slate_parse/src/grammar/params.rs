//! Parameter lists for `def` and `lambda`.

use slate_ir::{Name, Param, Params, Span};
use slate_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse parameters up to (not including) `close`.
    ///
    /// Accepts `name`, `name=default`, one `*args` and a final `**kwargs`.
    /// Defaults are parsed here but evaluated when the definition runs.
    pub(crate) fn parse_params(&mut self, close: &TokenKind) -> Result<Params, ParseError> {
        let mut params = Params::default();
        let mut seen: Vec<Name> = Vec::new();
        let mut seen_default = false;

        while !self.check(close) {
            let start = self.current_span();
            if params.kwarg.is_some() {
                return Err(ParseError::new(
                    "no parameter may follow `**` parameter",
                    start,
                ));
            }

            if self.eat(&TokenKind::DoubleStar) {
                let name = self.expect_ident()?;
                self.check_duplicate_param(&mut seen, name, start)?;
                params.kwarg = Some(name);
            } else if self.eat(&TokenKind::Star) {
                if params.vararg.is_some() || !matches!(self.current_kind(), TokenKind::Ident(_)) {
                    return Err(ParseError::new(
                        "keyword-only parameters are not supported",
                        start,
                    ));
                }
                let name = self.expect_ident()?;
                self.check_duplicate_param(&mut seen, name, start)?;
                params.vararg = Some(name);
            } else {
                if params.vararg.is_some() {
                    return Err(ParseError::new(
                        "keyword-only parameters are not supported",
                        start,
                    ));
                }
                let name = self.expect_ident()?;
                self.check_duplicate_param(&mut seen, name, start)?;
                let default = if self.eat(&TokenKind::Eq) {
                    seen_default = true;
                    Some(self.parse_test()?)
                } else if seen_default {
                    return Err(ParseError::new(
                        "non-default argument follows default argument",
                        start,
                    ));
                } else {
                    None
                };
                params.positional.push(Param {
                    name,
                    default,
                    span: self.span_from(start),
                });
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn check_duplicate_param(
        &self,
        seen: &mut Vec<Name>,
        name: Name,
        span: Span,
    ) -> Result<(), ParseError> {
        if seen.contains(&name) {
            let text = self.interner.lookup(name);
            return Err(ParseError::new(
                format!("duplicate argument '{text}' in function definition"),
                span,
            ));
        }
        seen.push(name);
        Ok(())
    }
}
