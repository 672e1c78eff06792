pub mod rpn;
pub mod token;

mod arith;

use shuntspan::{Span, Spanned};

use crate::rpn::Rpn;
use crate::token::TokenKind;

/// Default token bound per pipeline stage.
pub const DEFAULT_CAPACITY: usize = 100;

/// How malformed input and numeric edge cases are handled.
///
/// `Lenient` keeps the legacy calculator semantics: unknown characters
/// and mismatched parentheses are tolerated, stack underflow and division
/// by zero yield `0.0`. `Strict` turns each of those into a typed error.
/// Capacity violations are errors in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Strict,
    Lenient,
}

impl Mode {
    #[must_use]
    pub const fn is_lenient(self) -> bool {
        matches!(self, Self::Lenient)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub mode:     Mode,
    pub capacity: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            mode:     Mode::Strict,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("value stack underflow")]
    StackUnderflow,
    #[error("value stack overflow")]
    StackOverflow,
}

pub type EvalError = Spanned<RuntimeError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
pub type EvalResult<T> = Result<T, EvalError>;

/// Single-pass postfix evaluator over a bounded value stack.
pub struct Evaluator {
    stack:  Vec<f64>,
    policy: Policy,
}

impl Evaluator {
    #[must_use]
    pub const fn new(policy: Policy) -> Self {
        Self {
            stack: Vec::new(),
            policy,
        }
    }

    /// Reduces the program to a single value.
    ///
    /// Numbers push, operators pop `b` then `a` and push `a <op> b`. In
    /// lenient mode an operator without two operands ends the whole
    /// evaluation with `0.0`; in strict mode it is a `StackUnderflow` at
    /// that operator. An empty program evaluates to `0.0`.
    pub fn eval(&mut self, rpn: &Rpn) -> EvalResult<f64> {
        self.stack.clear();

        for tok in rpn {
            match tok.node {
                TokenKind::Number(num) => self.push(num, tok.span)?,
                TokenKind::Operator(op) => {
                    let Some((a, b)) = self.pop_operands() else {
                        if self.policy.mode.is_lenient() {
                            return Ok(0.0);
                        }
                        return Err(EvalError::new(RuntimeError::StackUnderflow, tok.span));
                    };
                    let value = arith::apply(op, a, b, self.policy.mode)
                        .map_err(|err| EvalError::new(err, tok.span))?;
                    self.push(value, tok.span)?;
                }
                // parentheses never survive conversion
                TokenKind::LParen | TokenKind::RParen => {}
            }
        }

        Ok(self.stack.first().copied().unwrap_or(0.0))
    }

    fn push(&mut self, value: f64, span: Span) -> EvalResult<()> {
        if self.stack.len() >= self.policy.capacity {
            return Err(EvalError::new(RuntimeError::StackOverflow, span));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop_operands(&mut self) -> Option<(f64, f64)> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        Some((a, b))
    }
}
