use std::str::Chars;

use shuntspan::{Span, Spanned};
use shuntvm::Policy;
use shuntvm::token::{BinOp, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid character '{0}'")]
    InvalidChar(char),
    #[error("expression exceeds the token capacity")]
    TokenOverflow,
}

pub struct Lexer<'a> {
    chars: Chars<'a>,

    /// start byte position of current token
    byte_start: u32,

    /// byte position of cursor
    byte: u32,
}

const EOF: char = '\0';

pub type LexError = Spanned<LexErrorKind>;
pub type LexResult<T> = Result<T, LexError>;

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        assert!(u32::try_from(input.len()).is_ok());

        Self {
            chars: input.chars(),
            byte_start: 0,
            byte: 0,
        }
    }

    /// Collects every token, or every error the policy does not tolerate.
    ///
    /// Lenient mode drops `InvalidChar` errors, skipping the offending
    /// characters. The capacity bound is hard in both modes: lexing stops
    /// at the first overflowing token.
    pub fn lex_all(self, policy: Policy) -> Result<Vec<Token>, Vec<LexError>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for item in self {
            match item {
                Ok(tok) => {
                    if tokens.len() >= policy.capacity {
                        errors.push(LexError::new(LexErrorKind::TokenOverflow, tok.span));
                        break;
                    }
                    tokens.push(tok);
                }
                Err(_) if policy.mode.is_lenient() => {}
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }

    fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    fn bump(&mut self) -> Option<char> {
        #[allow(clippy::cast_possible_truncation)]
        self.chars
            .next()
            .inspect(|c| self.byte += c.len_utf8() as u32)
    }

    const fn make_span(&self) -> Span {
        Span::new(self.byte_start, self.byte)
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.first().is_ascii_whitespace() {
            self.bump();
        }
    }

    /// Legacy digit accumulation: `num = num*10 + d` before the decimal
    /// point, `place *= 0.1; num += d * place` after it. A second decimal
    /// point ends the number; whatever follows lexes as a fresh token.
    fn number(&mut self, first: char) -> Token {
        let mut num = 0.0;
        let mut place = 1.0;
        let mut decimal = false;

        if let Some(digit) = first.to_digit(10) {
            num = f64::from(digit);
        } else {
            decimal = true;
        }

        while !self.is_eof() {
            let c = self.first();
            if c == '.' {
                if decimal {
                    break;
                }
                decimal = true;
            } else if let Some(digit) = c.to_digit(10) {
                let digit = f64::from(digit);
                if decimal {
                    place *= 0.1;
                    num += digit * place;
                } else {
                    num = num * 10.0 + digit;
                }
            } else {
                break;
            }
            self.bump();
        }

        Token::new(TokenKind::Number(num), self.make_span())
    }

    pub fn next_token(&mut self) -> Option<LexResult<Token>> {
        self.skip_whitespace();

        self.byte_start = self.byte;
        let c = self.bump()?;

        let token = match c {
            '(' => Token::new(TokenKind::LParen, self.make_span()),
            ')' => Token::new(TokenKind::RParen, self.make_span()),
            '0'..='9' | '.' => self.number(c),
            c => match BinOp::from_char(c) {
                Some(op) => Token::new(TokenKind::Operator(op), self.make_span()),
                None => {
                    return Some(Err(LexError::new(
                        LexErrorKind::InvalidChar(c),
                        self.make_span(),
                    )));
                }
            },
        };

        Some(Ok(token))
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
