use crate::token::BinOp;
use crate::{Mode, RuntimeError, RuntimeResult};

pub(crate) fn apply(op: BinOp, a: f64, b: f64, mode: Mode) -> RuntimeResult<f64> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div => div(a, b, mode),
        BinOp::Pow => Ok(pow(a, b)),
    }
}

/// `a / 0` is `0.0` in lenient mode, never infinity or NaN.
fn div(a: f64, b: f64, mode: Mode) -> RuntimeResult<f64> {
    if b == 0.0 {
        if mode.is_lenient() {
            Ok(0.0)
        } else {
            Err(RuntimeError::DivisionByZero)
        }
    } else {
        Ok(a / b)
    }
}

/// Integer power by repeated multiplication.
///
/// The exponent is truncated toward zero, so fractional exponents lose
/// their fraction: `2 ^ 0.5` is `2 ^ 0` = `1`. Negative exponents invert
/// the accumulated product. Runs in `O(|exponent|)`, which is pathological
/// for very large exponents.
fn pow(a: f64, b: f64) -> f64 {
    #[allow(clippy::cast_possible_truncation)]
    let exp = b as i64;

    let mut result = 1.0;
    for _ in 0..exp.unsigned_abs() {
        result *= a;
    }

    if exp < 0 { 1.0 / result } else { result }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod test {
    use super::*;

    #[test]
    fn division_by_zero_policy() {
        assert_eq!(div(5.0, 0.0, Mode::Lenient), Ok(0.0));
        assert_eq!(div(5.0, 0.0, Mode::Strict), Err(RuntimeError::DivisionByZero));
        assert_eq!(div(5.0, 2.0, Mode::Strict), Ok(2.5));
    }

    #[test]
    fn pow_truncates_exponent() {
        assert_eq!(pow(2.0, 0.5), 1.0);
        assert_eq!(pow(2.0, 3.9), 8.0);
        assert_eq!(pow(2.0, -1.5), 0.5);
    }

    #[test]
    fn pow_negative_exponent() {
        assert_eq!(pow(2.0, -2.0), 0.25);
        assert_eq!(pow(4.0, 0.0), 1.0);
    }

    #[test]
    fn apply_routes_operators() {
        assert_eq!(apply(BinOp::Add, 2.0, 3.0, Mode::Strict), Ok(5.0));
        assert_eq!(apply(BinOp::Sub, 2.0, 3.0, Mode::Strict), Ok(-1.0));
        assert_eq!(apply(BinOp::Mul, 2.0, 3.0, Mode::Strict), Ok(6.0));
        assert_eq!(apply(BinOp::Pow, 3.0, 2.0, Mode::Strict), Ok(9.0));
    }
}
