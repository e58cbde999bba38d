//! Exact trigonometric identities (§4.5): table lookup on the closed set of
//! special angles (multiples of `π/6`, `π/4`, `π/2` in `[0, 2π)`), and the
//! matching reverse lookup for the inverse functions. Anything outside this
//! set is not evaluated here — the kernel retains the call unevaluated.

use crate::value::{BinOp, Expr};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

fn half() -> BigRational {
    BigRational::new(BigInt::one(), BigInt::from(2))
}

fn neg(e: Expr) -> Expr {
    e.negate()
}

/// `n.sqrt() / d` as a retained symbolic value, e.g. `sqrt_over(3, 2)` is
/// `√3/2`.
fn sqrt_over(n: i64, d: i64) -> Expr {
    let root = Expr::Pow(Box::new(Expr::integer(BigInt::from(n))), half());
    Expr::Binary(
        BinOp::Mul,
        Box::new(Expr::Rational(BigRational::new(BigInt::one(), BigInt::from(d)))),
        Box::new(root),
    )
}

/// Reduce `c` (a multiple of π, e.g. `1/3` means `π/3`) into `[0, 2)`.
fn reduce_mod_two(c: &BigRational) -> BigRational {
    let two = BigRational::from_integer(BigInt::from(2));
    let mut c = c.clone();
    while c < BigRational::zero() {
        c += &two;
    }
    while c >= two {
        c -= &two;
    }
    c
}

/// `(sin(cπ), cos(cπ))` for `c` one of the spec's named special-angle
/// fractions; `None` if `c` doesn't land on the known grid.
pub fn sin_cos(c: &BigRational) -> Option<(Expr, Expr)> {
    let c = reduce_mod_two(c);
    let d = c.denom().to_i64()?;
    let n = c.numer().to_i64()?;

    let pair = match d {
        1 => match n {
            0 => (Expr::zero(), Expr::one()),
            1 => (Expr::zero(), neg(Expr::one())),
            _ => return None,
        },
        2 => match n {
            1 => (Expr::one(), Expr::zero()),
            3 => (neg(Expr::one()), Expr::zero()),
            _ => return None,
        },
        3 => match n {
            1 => (sqrt_over(3, 2), Expr::Rational(half())),
            2 => (sqrt_over(3, 2), neg(Expr::Rational(half()))),
            4 => (neg(sqrt_over(3, 2)), neg(Expr::Rational(half()))),
            5 => (neg(sqrt_over(3, 2)), Expr::Rational(half())),
            _ => return None,
        },
        4 => match n {
            1 => (sqrt_over(2, 2), sqrt_over(2, 2)),
            3 => (sqrt_over(2, 2), neg(sqrt_over(2, 2))),
            5 => (neg(sqrt_over(2, 2)), neg(sqrt_over(2, 2))),
            7 => (neg(sqrt_over(2, 2)), sqrt_over(2, 2)),
            _ => return None,
        },
        6 => match n {
            1 => (Expr::Rational(half()), sqrt_over(3, 2)),
            5 => (Expr::Rational(half()), neg(sqrt_over(3, 2))),
            7 => (neg(Expr::Rational(half())), neg(sqrt_over(3, 2))),
            11 => (neg(Expr::Rational(half())), sqrt_over(3, 2)),
            _ => return None,
        },
        _ => return None,
    };
    Some(pair)
}

/// `tan(cπ)`. `None` at the poles (`π/2 + kπ`) as well as off the grid; the
/// caller distinguishes "off grid" from "pole" by calling `sin_cos` itself
/// when it needs to raise `DOMAIN_ERROR` specifically for the pole case.
pub fn tan(c: &BigRational) -> Option<Expr> {
    let (s, co) = sin_cos(c)?;
    if co.is_zero() {
        return None;
    }
    Some(Expr::Binary(BinOp::Div, Box::new(s), Box::new(co)))
}

pub fn cot(c: &BigRational) -> Option<Expr> {
    let (s, co) = sin_cos(c)?;
    if s.is_zero() {
        return None;
    }
    Some(Expr::Binary(BinOp::Div, Box::new(co), Box::new(s)))
}

/// Whether `cπ` is exactly a pole of `tan` (`π/2 + kπ`).
pub fn is_tan_pole(c: &BigRational) -> bool {
    let c = reduce_mod_two(c);
    c == BigRational::new(BigInt::one(), BigInt::from(2))
        || c == BigRational::new(BigInt::from(3), BigInt::from(2))
}

/// Whether `cπ` is exactly a pole of `cot` (`kπ`).
pub fn is_cot_pole(c: &BigRational) -> bool {
    let c = reduce_mod_two(c);
    c.is_zero() || c == BigRational::one()
}

/// Reverse lookup: the principal value (in `[-π/2, π/2]`, as a multiple of
/// π) whose sine is exactly `value`, if `value` is one of the table's
/// constants.
pub fn asin(value: &Expr) -> Option<BigRational> {
    known_sin_value(value)
}

pub fn acos(value: &Expr) -> Option<BigRational> {
    let s = known_sin_value(value)?;
    // cos(x) = sin(π/2 - x); our table is symmetric enough to reuse directly
    // via the complementary angle for the principal range [0, π].
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    Some(half - s)
}

fn known_sin_value(value: &Expr) -> Option<BigRational> {
    let zero = BigRational::new(BigInt::zero(), BigInt::one());
    let sixth = BigRational::new(BigInt::one(), BigInt::from(6));
    let quarter = BigRational::new(BigInt::one(), BigInt::from(4));
    let third = BigRational::new(BigInt::one(), BigInt::from(3));
    let half_turn = BigRational::new(BigInt::one(), BigInt::from(2));

    if value.is_zero() {
        return Some(zero);
    }
    if *value == Expr::one() {
        return Some(half_turn);
    }
    if *value == neg(Expr::one()) {
        return Some(-half_turn);
    }
    if *value == Expr::Rational(half()) {
        return Some(sixth);
    }
    if *value == neg(Expr::Rational(half())) {
        return Some(-sixth);
    }
    if *value == sqrt_over(2, 2) {
        return Some(quarter);
    }
    if *value == neg(sqrt_over(2, 2)) {
        return Some(-quarter);
    }
    if *value == sqrt_over(3, 2) {
        return Some(third);
    }
    if *value == neg(sqrt_over(3, 2)) {
        return Some(-third);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_of_pi_over_six_is_one_half() {
        let c = BigRational::new(BigInt::one(), BigInt::from(6));
        let (s, _) = sin_cos(&c).unwrap();
        assert_eq!(s, Expr::Rational(half()));
    }

    #[test]
    fn cos_of_pi_is_negative_one() {
        let c = BigRational::one();
        let (_, co) = sin_cos(&c).unwrap();
        assert_eq!(co, neg(Expr::one()));
    }

    #[test]
    fn tan_is_none_off_grid() {
        let c = BigRational::new(BigInt::one(), BigInt::from(7));
        assert!(tan(&c).is_none());
    }

    #[test]
    fn tan_pole_detected() {
        let c = BigRational::new(BigInt::one(), BigInt::from(2));
        assert!(is_tan_pole(&c));
        assert!(tan(&c).is_none());
    }

    #[test]
    fn asin_of_one_half_is_pi_over_six() {
        let v = Expr::Rational(half());
        assert_eq!(asin(&v), Some(BigRational::new(BigInt::one(), BigInt::from(6))));
    }
}
