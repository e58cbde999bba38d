//! The arithmetic kernel (§4.5): every operation the evaluator can dispatch
//! to, working purely on the reduced-rational / symbolic-composite shapes of
//! `value::Expr`. Each function either fully reduces or retains the
//! operation unevaluated — it never approximates.

use crate::rational::{exact_nth_root, factorial, rational_gcd, rational_lcm};
use crate::trig;
use crate::value::{Atom, BinOp, Expr, UnOp};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// A kernel-level failure, free of any positional/expression context — the
/// evaluator (which knows which AST node raised it) attaches that context
/// when turning this into a full `CalculationError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    DivideByZero,
    ZeroToThePowerOfZero,
    DomainError(Option<String>),
    UnsupportedFunction(String),
}

type KResult = Result<Expr, KernelError>;

/// Split a value into `(coefficient, atom)` if it is a bare atom or a
/// coefficient-atom pair, for the "same symbolic variable" collection rules.
fn as_coeff_atom(e: &Expr) -> Option<(BigRational, &Atom)> {
    match e {
        Expr::Var(a) => Some((BigRational::one(), a)),
        Expr::Coeff(k, a) => Some((k.clone(), a)),
        _ => None,
    }
}

fn from_coeff_atom(k: BigRational, a: Atom) -> Expr {
    if k.is_zero() {
        Expr::zero()
    } else if k.is_one() {
        Expr::Var(a)
    } else {
        Expr::Coeff(k, a)
    }
}

pub fn add(lhs: Expr, rhs: Expr) -> KResult {
    match (lhs, rhs) {
        (Expr::Rational(a), Expr::Rational(b)) => Ok(Expr::Rational(a + b)),
        (a, b) => {
            if let (Some((k1, a1)), Some((k2, a2))) = (as_coeff_atom(&a), as_coeff_atom(&b)) {
                if a1 == a2 {
                    return Ok(from_coeff_atom(k1 + k2, a1.clone()));
                }
            }
            if a.is_zero() {
                return Ok(b);
            }
            if b.is_zero() {
                return Ok(a);
            }
            Ok(Expr::Binary(BinOp::Add, Box::new(a), Box::new(b)))
        }
    }
}

pub fn sub(lhs: Expr, rhs: Expr) -> KResult {
    if lhs == rhs {
        return Ok(Expr::zero());
    }
    add(lhs, rhs.negate())
}

pub fn mul(lhs: Expr, rhs: Expr) -> KResult {
    if lhs.is_zero() || rhs.is_zero() {
        return Ok(Expr::zero());
    }
    if lhs.is_one() {
        return Ok(rhs);
    }
    if rhs.is_one() {
        return Ok(lhs);
    }
    match (lhs, rhs) {
        (Expr::Rational(a), Expr::Rational(b)) => Ok(Expr::Rational(a * b)),
        (Expr::Rational(k), other) | (other, Expr::Rational(k)) => match other {
            Expr::Var(a) => Ok(from_coeff_atom(k, a)),
            Expr::Coeff(k2, a) => Ok(from_coeff_atom(k * k2, a)),
            other => Ok(Expr::Binary(BinOp::Mul, Box::new(Expr::Rational(k)), Box::new(other))),
        },
        (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if *base1 == *base2 => {
            Ok(Expr::Pow(base1, exp1 + exp2))
        }
        (a, b) => Ok(Expr::Binary(BinOp::Mul, Box::new(a), Box::new(b))),
    }
}

pub fn div(lhs: Expr, rhs: Expr) -> KResult {
    if rhs.is_zero() {
        return Err(KernelError::DivideByZero);
    }
    if lhs.is_zero() {
        return Ok(Expr::zero());
    }
    match (lhs, rhs) {
        (Expr::Rational(a), Expr::Rational(b)) => Ok(Expr::Rational(a / b)),
        (a, Expr::Rational(b)) => mul(a, Expr::Rational(b.recip())),
        (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if *base1 == *base2 => {
            Ok(Expr::Pow(base1, exp1 - exp2))
        }
        (a, b) if a == b => Ok(Expr::one()),
        (a, b) => Ok(Expr::Binary(BinOp::Div, Box::new(a), Box::new(b))),
    }
}

pub fn rem(lhs: Expr, rhs: Expr) -> KResult {
    let (a, b) = (require_integer(&lhs)?, require_integer(&rhs)?);
    if b.is_zero() {
        return Err(KernelError::DivideByZero);
    }
    Ok(Expr::integer(a.mod_floor(&b)))
}

fn require_integer(e: &Expr) -> Result<BigInt, KernelError> {
    e.as_integer()
        .cloned()
        .ok_or_else(|| KernelError::DomainError(None))
}

/// The evaluator's entry point for the `^` operator: `exponent` may be any
/// already-simplified value, not just a rational. `e^(ln x) -> x` (§4.5's
/// `pow` contract row) is checked here since the identity needs the
/// exponent's `Call` shape before it ever reaches `pow`'s rational-only
/// reductions; anything else with a rational exponent defers to `pow`, and a
/// non-rational exponent otherwise is retained unevaluated.
pub fn pow_symbolic(base: Expr, exponent: Expr) -> KResult {
    if matches!(&base, Expr::Var(Atom::E)) {
        if let Expr::Call(name, ref args) = exponent {
            if name == "ln" && args.len() == 1 {
                return Ok(args[0].clone());
            }
        }
    }
    match exponent {
        Expr::Rational(exp) => pow(base, exp),
        other => Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(other))),
    }
}

/// `base ^ exponent` where `exponent` is already a reduced rational (the
/// evaluator lowers any symbolic exponent to `Binary(Pow, ..)` instead of
/// calling this directly).
pub fn pow(base: Expr, exponent: BigRational) -> KResult {
    if exponent.is_zero() {
        if base.is_zero() {
            return Err(KernelError::ZeroToThePowerOfZero);
        }
        return Ok(Expr::one());
    }
    if exponent.is_one() {
        return Ok(base);
    }
    if base.is_zero() {
        return Ok(Expr::zero());
    }
    if base.is_one() {
        return Ok(Expr::one());
    }

    match base {
        Expr::Rational(r) if exponent.is_integer() => {
            let n = exponent.numer();
            Ok(Expr::Rational(pow_rational_int(&r, n)))
        }
        Expr::Rational(r) if r.is_integer() && exponent.denom() != &BigInt::one() => {
            pow_fractional_integer(r.numer().clone(), exponent)
        }
        Expr::Pow(inner_base, inner_exp) => pow(*inner_base, inner_exp * exponent),
        other => Ok(Expr::Pow(Box::new(other), exponent)),
    }
}

fn pow_rational_int(r: &BigRational, n: &BigInt) -> BigRational {
    let n_abs = n.magnitude().clone();
    let exp_u32: u32 = n_abs.try_into().unwrap_or(u32::MAX);
    let raised = BigRational::new(r.numer().pow(exp_u32), r.denom().pow(exp_u32));
    if n.is_negative() {
        raised.recip()
    } else {
        raised
    }
}

/// `integer ^ (p/q)` with `q != 1`: succeeds exactly when `integer` is a
/// perfect `q`-th power (possibly after taking `|integer|^p` first), else
/// retains the call as a `Pow` node.
fn pow_fractional_integer(base: BigInt, exponent: BigRational) -> KResult {
    let p = exponent.numer().clone();
    let q = exponent.denom().clone();
    let q_u32: u32 = q.clone().try_into().unwrap_or(u32::MAX);

    if let Some(root) = exact_nth_root(&base, q_u32) {
        let p_abs_u32: u32 = p.magnitude().clone().try_into().unwrap_or(u32::MAX);
        let value = BigRational::from_integer(root.pow(p_abs_u32));
        let value = if p.is_negative() { value.recip() } else { value };
        return Ok(Expr::Rational(value));
    }
    Ok(Expr::Pow(Box::new(Expr::integer(base)), exponent))
}

pub fn sqrt(x: Expr) -> KResult {
    pow(x, BigRational::new(BigInt::one(), BigInt::from(2)))
}

pub fn sq(x: Expr) -> KResult {
    pow(x, BigRational::from_integer(BigInt::from(2)))
}

pub fn cub(x: Expr) -> KResult {
    pow(x, BigRational::from_integer(BigInt::from(3)))
}

pub fn rec(x: Expr) -> KResult {
    pow(x, BigRational::from_integer(BigInt::from(-1)))
}

pub fn factorial_of(x: Expr) -> KResult {
    let n = require_integer(&x)?;
    if n.is_negative() {
        return Err(KernelError::DomainError(None));
    }
    Ok(Expr::integer(factorial(&n)))
}

pub fn gcd(a: Expr, b: Expr) -> KResult {
    let (a, b) = (require_integer(&a)?, require_integer(&b)?);
    Ok(Expr::Rational(BigRational::from_integer(
        a.gcd(&b).abs(),
    )))
}

pub fn lcm(a: Expr, b: Expr) -> KResult {
    let (a, b) = (require_integer(&a)?, require_integer(&b)?);
    Ok(Expr::Rational(BigRational::from_integer(
        a.lcm(&b).abs(),
    )))
}

/// Kept for parity with the rational-helper module's gcd/lcm entry points
/// used elsewhere in the kernel (degrees reduction, trig angle folding).
#[allow(dead_code)]
fn reduce_via_helpers(a: &BigRational, b: &BigRational) -> (BigInt, BigInt) {
    (rational_gcd(a, b), rational_lcm(a, b))
}

pub fn abs(x: Expr) -> KResult {
    if x.is_negative() {
        Ok(x.negate())
    } else {
        Ok(match x {
            Expr::Unary(UnOp::Abs, inner) => Expr::Unary(UnOp::Abs, inner),
            other => other,
        })
    }
}

pub fn sign(x: Expr) -> KResult {
    match &x {
        Expr::Rational(r) => {
            if r.is_zero() {
                Ok(Expr::zero())
            } else if r.is_negative() {
                Ok(Expr::integer(BigInt::from(-1)))
            } else {
                Ok(Expr::one())
            }
        }
        other => {
            if other.is_negative() {
                Ok(Expr::integer(BigInt::from(-1)))
            } else {
                Ok(Expr::one())
            }
        }
    }
}

/// `d°` → exact radians as a multiple of π, `d·π/180` reduced.
pub fn degrees_to_radians(d: Expr) -> KResult {
    let d = require_integer(&d).map_err(|_| KernelError::DomainError(None))?;
    let coeff = BigRational::new(d, BigInt::from(180)).reduced();
    Ok(from_coeff_atom(coeff, Atom::Pi))
}

/// Extract `(coefficient, true)` if `x` is exactly `coefficient * π`
/// (including the bare `π` and `0` cases), else `None`.
fn as_pi_multiple(x: &Expr) -> Option<BigRational> {
    match x {
        Expr::Var(Atom::Pi) => Some(BigRational::one()),
        Expr::Coeff(k, Atom::Pi) => Some(k.clone()),
        Expr::Rational(r) if r.is_zero() => Some(BigRational::zero()),
        _ => None,
    }
}

pub fn sin(x: Expr) -> KResult {
    if let Some(c) = as_pi_multiple(&x) {
        if let Some((s, _)) = trig::sin_cos(&c) {
            return Ok(s);
        }
    }
    Ok(Expr::Call("sin".to_string(), vec![x]))
}

pub fn cos(x: Expr) -> KResult {
    if let Some(c) = as_pi_multiple(&x) {
        if let Some((_, co)) = trig::sin_cos(&c) {
            return Ok(co);
        }
    }
    Ok(Expr::Call("cos".to_string(), vec![x]))
}

pub fn tan(x: Expr) -> KResult {
    if let Some(c) = as_pi_multiple(&x) {
        if trig::is_tan_pole(&c) {
            return Err(KernelError::DomainError(None));
        }
        if let Some(v) = trig::tan(&c) {
            return Ok(v);
        }
    }
    Ok(Expr::Call("tan".to_string(), vec![x]))
}

pub fn cot(x: Expr) -> KResult {
    if let Some(c) = as_pi_multiple(&x) {
        if trig::is_cot_pole(&c) {
            return Err(KernelError::DomainError(None));
        }
        if let Some(v) = trig::cot(&c) {
            return Ok(v);
        }
    }
    Ok(Expr::Call("cot".to_string(), vec![x]))
}

pub fn asin(x: Expr) -> KResult {
    if let Some(c) = trig::asin(&x) {
        return Ok(from_coeff_atom(c, Atom::Pi));
    }
    Ok(Expr::Call("asin".to_string(), vec![x]))
}

pub fn acos(x: Expr) -> KResult {
    if let Some(c) = trig::acos(&x) {
        return Ok(from_coeff_atom(c, Atom::Pi));
    }
    Ok(Expr::Call("acos".to_string(), vec![x]))
}

pub fn atan(x: Expr) -> KResult {
    Ok(Expr::Call("atan".to_string(), vec![x]))
}

pub fn acot(x: Expr) -> KResult {
    Ok(Expr::Call("acot".to_string(), vec![x]))
}

/// Shared identity table for the three fixed-base logarithms the function
/// table exposes as unary calls (`log` base 10, `ln` base `e`, `lg` base 2):
/// `log_b(1) = 0`, `log_b(b) = 1`, `log_b(x^n) = n * log_b(x)`; otherwise the
/// call is retained unevaluated under `name`.
fn log_fixed_base(name: &'static str, base: &Expr, x: Expr) -> KResult {
    if x.is_one() {
        return Ok(Expr::zero());
    }
    if x == *base {
        return Ok(Expr::one());
    }
    if let Expr::Pow(inner_base, n) = &x {
        if n.is_integer() {
            let inner_log = log_fixed_base(name, base, (**inner_base).clone())?;
            return mul(Expr::Rational(n.clone()), inner_log);
        }
    }
    Ok(Expr::Call(name.to_string(), vec![x]))
}

/// `log(x)`: base-10 logarithm.
pub fn log10(x: Expr) -> KResult {
    log_fixed_base("log", &Expr::integer(BigInt::from(10)), x)
}

/// `ln(x)`: natural logarithm, base `e`.
pub fn ln(x: Expr) -> KResult {
    log_fixed_base("ln", &Expr::Var(Atom::E), x)
}

/// `lg(x)`: base-2 logarithm.
pub fn lg(x: Expr) -> KResult {
    log_fixed_base("lg", &Expr::integer(BigInt::from(2)), x)
}

pub fn exp(x: Expr) -> KResult {
    // `e^(ln x) -> x`.
    if let Expr::Call(name, args) = &x {
        if name == "ln" && args.len() == 1 {
            return Ok(args[0].clone());
        }
    }
    if x.is_zero() {
        return Ok(Expr::one());
    }
    Ok(Expr::Call("exp".to_string(), vec![x]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expr {
        Expr::integer(BigInt::from(n))
    }

    fn frac(n: i64, d: i64) -> Expr {
        Expr::Rational(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    #[test]
    fn add_reduces_rationals() {
        assert_eq!(add(frac(1, 2), frac(1, 3)).unwrap(), frac(5, 6));
    }

    #[test]
    fn mul_collects_like_coefficients() {
        let x = Expr::Var(Atom::Short('x'));
        let two_x = Expr::Coeff(BigRational::from_integer(BigInt::from(2)), Atom::Short('x'));
        assert_eq!(add(x.clone(), x).unwrap(), two_x);
    }

    #[test]
    fn div_by_zero_errors() {
        assert!(div(int(1), int(0)).is_err());
    }

    #[test]
    fn pow_zero_to_zero_errors() {
        assert!(pow(int(0), BigRational::zero()).is_err());
    }

    #[test]
    fn sqrt_of_perfect_square_is_exact() {
        assert_eq!(sqrt(int(144)).unwrap(), int(12));
    }

    #[test]
    fn sqrt_of_non_perfect_square_retains_pow() {
        let result = sqrt(int(2)).unwrap();
        assert!(matches!(result, Expr::Pow(_, _)));
    }

    #[test]
    fn factorial_of_five() {
        assert_eq!(factorial_of(int(5)).unwrap(), int(120));
    }

    #[test]
    fn factorial_of_negative_errors() {
        assert!(factorial_of(int(-1)).is_err());
    }

    #[test]
    fn gcd_of_twelve_and_eighteen() {
        assert_eq!(gcd(int(12), int(18)).unwrap(), int(6));
    }

    #[test]
    fn sin_of_pi_sixth_is_one_half() {
        let angle = from_coeff_atom(BigRational::new(BigInt::one(), BigInt::from(6)), Atom::Pi);
        assert_eq!(sin(angle).unwrap(), frac(1, 2));
    }

    #[test]
    fn tan_at_pole_errors() {
        let angle = from_coeff_atom(BigRational::new(BigInt::one(), BigInt::from(2)), Atom::Pi);
        assert!(tan(angle).is_err());
    }

    #[test]
    fn degrees_sixty_is_pi_over_three() {
        let result = degrees_to_radians(int(60)).unwrap();
        let expected = from_coeff_atom(BigRational::new(BigInt::one(), BigInt::from(3)), Atom::Pi);
        assert_eq!(result, expected);
    }

    #[test]
    fn ln_of_one_is_zero() {
        assert_eq!(ln(int(1)).unwrap(), int(0));
    }

    #[test]
    fn exp_of_ln_cancels() {
        let call = Expr::Call("ln".to_string(), vec![int(5)]);
        assert_eq!(exp(call).unwrap(), int(5));
    }

    #[test]
    fn e_to_the_ln_x_cancels_via_operator_form() {
        let ln_x = Expr::Call("ln".to_string(), vec![int(5)]);
        assert_eq!(pow_symbolic(Expr::Var(Atom::E), ln_x).unwrap(), int(5));
    }

    #[test]
    fn pow_symbolic_defers_rational_exponent_to_pow() {
        assert_eq!(pow_symbolic(int(2), Expr::integer(BigInt::from(3))).unwrap(), int(8));
    }

    #[test]
    fn pow_symbolic_retains_non_rational_non_identity_exponent() {
        let x = Expr::Var(Atom::Short('x'));
        let result = pow_symbolic(int(2), x).unwrap();
        assert!(matches!(result, Expr::Binary(BinOp::Pow, _, _)));
    }
}
