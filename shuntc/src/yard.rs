use shuntspan::Spanned;
use shuntvm::Policy;
use shuntvm::rpn::Rpn;
use shuntvm::token::{Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpnErrorKind {
    #[error("mismatched parenthesis")]
    MismatchedParen,
    #[error("expression exceeds the token capacity")]
    TokenOverflow,
}

pub type RpnError = Spanned<RpnErrorKind>;
pub type RpnResult<T> = Result<T, RpnError>;

/// Shunting-yard conversion from infix token order to postfix.
///
/// Numbers go straight to the output; operators wait on a stack until an
/// operator of lower binding strength (or a parenthesis) arrives beneath
/// them. Parentheses only steer the popping and are never emitted.
pub struct Yard {
    policy: Policy,
    output: Rpn,
    stack:  Vec<Token>,
}

impl Yard {
    #[must_use]
    pub const fn new(policy: Policy) -> Self {
        Self {
            policy,
            output: Rpn::with_capacity(policy.capacity),
            stack: Vec::new(),
        }
    }

    pub fn convert(mut self, tokens: &[Token]) -> RpnResult<Rpn> {
        for &tok in tokens {
            match tok.node {
                TokenKind::Number(_) => self.emit(tok)?,
                TokenKind::Operator(cur) => {
                    while let Some(&top) = self.stack.last() {
                        let TokenKind::Operator(tos) = top.node else {
                            break;
                        };
                        let pops = if cur.fixity().is_left() {
                            tos.precedence() >= cur.precedence()
                        } else {
                            tos.precedence() > cur.precedence()
                        };
                        if !pops {
                            break;
                        }
                        self.stack.pop();
                        self.emit(top)?;
                    }
                    self.shelve(tok)?;
                }
                TokenKind::LParen => self.shelve(tok)?,
                TokenKind::RParen => self.close_paren(tok)?,
            }
        }

        self.drain()
    }

    fn emit(&mut self, tok: Token) -> RpnResult<()> {
        self.output
            .push(tok)
            .map_err(|tok| RpnError::new(RpnErrorKind::TokenOverflow, tok.span))
    }

    fn shelve(&mut self, tok: Token) -> RpnResult<()> {
        if self.stack.len() >= self.policy.capacity {
            return Err(RpnError::new(RpnErrorKind::TokenOverflow, tok.span));
        }
        self.stack.push(tok);
        Ok(())
    }

    /// Pops operators to the output until the matching `(` is discarded.
    fn close_paren(&mut self, paren: Token) -> RpnResult<()> {
        while let Some(top) = self.stack.pop() {
            if matches!(top.node, TokenKind::LParen) {
                return Ok(());
            }
            self.emit(top)?;
        }

        if self.policy.mode.is_lenient() {
            Ok(())
        } else {
            Err(RpnError::new(RpnErrorKind::MismatchedParen, paren.span))
        }
    }

    fn drain(mut self) -> RpnResult<Rpn> {
        while let Some(top) = self.stack.pop() {
            if matches!(top.node, TokenKind::LParen) {
                if self.policy.mode.is_lenient() {
                    continue;
                }
                return Err(RpnError::new(RpnErrorKind::MismatchedParen, top.span));
            }
            self.emit(top)?;
        }

        Ok(self.output)
    }
}

#[cfg(test)]
mod test {
    use shuntspan::Span;
    use shuntvm::Mode;

    use super::*;
    use crate::lexer::Lexer;

    fn to_rpn(mode: Mode, input: &str) -> RpnResult<Rpn> {
        let policy = Policy {
            mode,
            ..Policy::default()
        };
        let tokens = Lexer::new(input).lex_all(policy).unwrap();
        Yard::new(policy).convert(&tokens)
    }

    fn postfix(input: &str) -> String {
        to_rpn(Mode::Strict, input).unwrap().to_string()
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(postfix("2 + 3 * 4"), "2 3 4 * +");
    }

    #[test]
    fn pow_chains_right() {
        assert_eq!(postfix("2 ^ 3 ^ 2"), "2 3 2 ^ ^");
    }

    #[test]
    fn left_associative_chains_left() {
        assert_eq!(postfix("8 - 3 - 2"), "8 3 - 2 -");
        assert_eq!(postfix("8 / 4 / 2"), "8 4 / 2 /");
    }

    #[test]
    fn parens_override_precedence() {
        assert_eq!(postfix("(2 + 3) * 4"), "2 3 + 4 *");
    }

    #[test]
    fn pow_outranks_multiplication() {
        assert_eq!(postfix("3 * 4 ^ 2"), "3 4 2 ^ *");
    }

    #[test]
    fn output_has_no_parens() {
        let rpn = to_rpn(Mode::Strict, "((1 + 2))").unwrap();
        assert!(rpn.iter().all(|tok| !matches!(
            tok.node,
            TokenKind::LParen | TokenKind::RParen
        )));
    }

    #[test]
    fn unmatched_right_paren() {
        assert_eq!(
            to_rpn(Mode::Strict, "1 + 2)").map(|_| ()),
            Err(RpnError::new(RpnErrorKind::MismatchedParen, Span::new(5, 6)))
        );
        assert_eq!(to_rpn(Mode::Lenient, "1 + 2)").unwrap().to_string(), "1 2 +");
    }

    #[test]
    fn unmatched_left_paren() {
        assert_eq!(
            to_rpn(Mode::Strict, "(1 + 2").map(|_| ()).map_err(|e| e.node),
            Err(RpnErrorKind::MismatchedParen)
        );
        assert_eq!(to_rpn(Mode::Lenient, "(1 + 2").unwrap().to_string(), "1 2 +");
    }

    #[test]
    fn operator_stack_respects_capacity() {
        let policy = Policy {
            mode: Mode::Strict,
            capacity: 2,
        };
        let tok = |kind| Token::new(kind, Span::default());
        let tokens = [
            tok(TokenKind::LParen),
            tok(TokenKind::LParen),
            tok(TokenKind::LParen),
        ];
        assert_eq!(
            Yard::new(policy).convert(&tokens).map(|_| ()).map_err(|e| e.node),
            Err(RpnErrorKind::TokenOverflow)
        );
    }

    #[test]
    fn output_respects_capacity() {
        let policy = Policy {
            mode: Mode::Strict,
            capacity: 2,
        };
        let tok = |kind| Token::new(kind, Span::default());
        let tokens = [
            tok(TokenKind::Number(1.0)),
            tok(TokenKind::Number(2.0)),
            tok(TokenKind::Number(3.0)),
        ];
        assert_eq!(
            Yard::new(policy).convert(&tokens).map(|_| ()).map_err(|e| e.node),
            Err(RpnErrorKind::TokenOverflow)
        );
    }
}
