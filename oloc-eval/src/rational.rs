//! Exact-arithmetic helpers the kernel builds on: factorial, integer n-th
//! root extraction (used to decide whether `sqrt`/`cub` collapse to a
//! rational or must retain a `Pow` node), and rational gcd/lcm.

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// `n!` for a non-negative integer `n`. Callers are expected to have already
/// rejected negative/non-integer inputs via the kernel's domain checks.
pub fn factorial(n: &BigInt) -> BigInt {
    let mut acc = BigInt::one();
    let mut i = BigInt::one();
    while &i <= n {
        acc *= &i;
        i += BigInt::one();
    }
    acc
}

/// The exact integer n-th root of `|value|` if `value` is a perfect n-th
/// power, else `None`. Used by `sqrt`/`cub` to decide between a reduced
/// integer result and a retained `Pow` node.
pub fn exact_nth_root(value: &BigInt, n: u32) -> Option<BigInt> {
    if value.is_zero() {
        return Some(BigInt::zero());
    }
    if value.sign() == Sign::Minus && n % 2 == 0 {
        return None;
    }
    let magnitude = value.magnitude().clone();
    let root = nth_root_floor(&magnitude, n);
    if pow_bigint(&root, n) == magnitude {
        Some(BigInt::from_biguint(value.sign(), root))
    } else {
        None
    }
}

fn pow_bigint(base: &num_bigint::BigUint, exp: u32) -> num_bigint::BigUint {
    base.pow(exp)
}

/// Integer floor of the n-th root via binary search on unsigned magnitudes.
fn nth_root_floor(value: &num_bigint::BigUint, n: u32) -> num_bigint::BigUint {
    use num_bigint::BigUint;
    if value.is_zero() || n == 0 {
        return BigUint::zero();
    }
    if n == 1 {
        return value.clone();
    }
    let mut lo = BigUint::zero();
    let mut hi = BigUint::one() << (value.bits() / n as u64 + 1);
    while &lo < &hi {
        let mid = (&lo + &hi + BigUint::one()) >> 1u32;
        if pow_bigint(&mid, n) <= *value {
            lo = mid;
        } else {
            hi = mid - BigUint::one();
        }
    }
    lo
}

/// gcd of two rationals reduced from their integer numerators once both are
/// brought to a common denominator — the kernel only ever calls this with
/// values `selfcheck`/staticcheck have already guaranteed are integers.
pub fn rational_gcd(a: &BigRational, b: &BigRational) -> BigInt {
    a.numer().gcd(b.numer()).abs()
}

pub fn rational_lcm(a: &BigRational, b: &BigRational) -> BigInt {
    a.numer().lcm(b.numer()).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_of_five_is_120() {
        assert_eq!(factorial(&BigInt::from(5)), BigInt::from(120));
    }

    #[test]
    fn exact_square_root_found() {
        assert_eq!(exact_nth_root(&BigInt::from(144), 2), Some(BigInt::from(12)));
    }

    #[test]
    fn non_perfect_square_returns_none() {
        assert_eq!(exact_nth_root(&BigInt::from(10), 2), None);
    }

    #[test]
    fn negative_even_root_is_none() {
        assert_eq!(exact_nth_root(&BigInt::from(-4), 2), None);
    }

    #[test]
    fn negative_odd_root_is_negative() {
        assert_eq!(exact_nth_root(&BigInt::from(-8), 3), Some(BigInt::from(-2)));
    }
}
