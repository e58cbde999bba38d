//! The evaluator's intermediate value shapes (§3 "Exact value form"): a
//! reduced rational, a bare irrational atom, or one of the small tagged
//! composites the spec calls out (`k*x`, `x^k`, an already-simplified
//! function call) — plus a generic retained-unevaluated fallback for the
//! combinations no rule collapses (`π*𝑒`, `x+y` on distinct atoms, …).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// An irrational carrier: the two native constants, or a user-introduced
/// indeterminate (single character or `<name>`-wrapped identifier).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
    Pi,
    E,
    Short(char),
    Long(String),
}

impl Atom {
    /// A stable string key, also used as the canonical rendering.
    pub fn key(&self) -> String {
        match self {
            Atom::Pi => "\u{3c0}".to_string(),
            Atom::E => "\u{1d452}".to_string(),
            Atom::Short(c) => c.to_string(),
            Atom::Long(name) => format!("<{name}>"),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
        }
    }

    /// The binary operator this token spells, if any (§4.3's grammar: `+ - *
    /// / % ^`).
    pub fn from_symbol(s: &str) -> Option<BinOp> {
        match s {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "%" => Some(BinOp::Rem),
            "^" => Some(BinOp::Pow),
            _ => None,
        }
    }

    /// Precedence, higher binds tighter; matches the parser's binding-power
    /// ladder so re-serialization brackets exactly where the grammar would
    /// require them.
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 2,
            BinOp::Pow => 3,
        }
    }

    pub fn is_left_associative(&self) -> bool {
        !matches!(self, BinOp::Pow)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Abs,
}

/// A simplified value produced by the evaluator. Every rewrite rule in the
/// arithmetic kernel either collapses into one of the concrete shapes or
/// falls through to `Binary`/`Unary`, which simply retains the operation
/// unevaluated the way §4.5's tables describe ("otherwise retain
/// unevaluated").
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Rational(BigRational),
    Var(Atom),
    /// `k * atom`, `k` never `0` or `1` (those collapse to `Rational`/`Var`).
    Coeff(BigRational, Atom),
    /// `base ^ exponent`, already reduced as far as the kernel's identities
    /// allow.
    Pow(Box<Expr>, BigRational),
    Call(String, Vec<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnOp, Box<Expr>),
}

impl Expr {
    pub fn integer(n: impl Into<BigInt>) -> Expr {
        Expr::Rational(BigRational::from_integer(n.into()))
    }

    pub fn zero() -> Expr {
        Expr::Rational(BigRational::zero())
    }

    pub fn one() -> Expr {
        Expr::Rational(BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Rational(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Rational(r) if r.is_one())
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Rational(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Expr::Rational(r) if r.is_integer() => Some(r.numer()),
            _ => None,
        }
    }

    pub fn negate(self) -> Expr {
        match self {
            Expr::Rational(r) => Expr::Rational(-r),
            Expr::Var(a) => Expr::Coeff(-BigRational::one(), a),
            Expr::Coeff(k, a) => {
                let k = -k;
                if k.is_one() {
                    Expr::Var(a)
                } else {
                    Expr::Coeff(k, a)
                }
            }
            Expr::Unary(UnOp::Neg, inner) => *inner,
            other => Expr::Unary(UnOp::Neg, Box::new(other)),
        }
    }

    /// Whether this value's top-level sign is unambiguously negative, used
    /// by `abs`/`sign` for the structural dispatch §4.5 calls for.
    pub fn is_negative(&self) -> bool {
        match self {
            Expr::Rational(r) => r.is_negative(),
            Expr::Coeff(k, _) => k.is_negative(),
            Expr::Unary(UnOp::Neg, _) => true,
            _ => false,
        }
    }

    /// This value's outermost precedence, for the bracket-minimizing
    /// re-serialization rule of §4.4: a child renders bracketed only when its
    /// own precedence is lower than what the parent context requires.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Rational(r) if r.is_negative() => 0,
            Expr::Rational(_) | Expr::Var(_) | Expr::Call(_, _) => 100,
            Expr::Coeff(_, _) => BinOp::Mul.precedence(),
            Expr::Pow(_, _) => BinOp::Pow.precedence(),
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Unary(UnOp::Neg, _) => 0,
            Expr::Unary(UnOp::Abs, _) => 100,
        }
    }

    /// Render this value as it would appear as a child of an operator with
    /// precedence `parent_prec`; wraps in `( )` exactly when §4.4 requires
    /// it.
    pub fn render_child(&self, parent_prec: u8) -> String {
        let text = self.to_string();
        if self.precedence() < parent_prec {
            format!("({text})")
        } else {
            text
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Rational(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Expr::Var(a) => write!(f, "{a}"),
            Expr::Coeff(k, a) => {
                if *k == -BigRational::one() {
                    write!(f, "-{a}")
                } else if *a == Atom::Pi {
                    write_pi_multiple(f, k)
                } else {
                    write!(f, "{}*{a}", Expr::Rational(k.clone()).render_child(BinOp::Mul.precedence()))
                }
            }
            Expr::Pow(base, exp) => {
                let base_str = base.render_child(BinOp::Pow.precedence() + 1);
                write!(f, "{base_str}^{}", Expr::Rational(exp.clone()).render_child(BinOp::Pow.precedence()))
            }
            Expr::Call(name, args) => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}({})", rendered.join(","))
            }
            Expr::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                let lhs_str = lhs.render_child(prec);
                let rhs_min_prec = if op.is_left_associative() { prec + 1 } else { prec };
                let rhs_str = rhs.render_child(rhs_min_prec);
                write!(f, "{lhs_str}{}{rhs_str}", op.symbol())
            }
            Expr::Unary(UnOp::Neg, inner) => {
                write!(f, "-{}", inner.render_child(BP_PREFIX_RENDER))
            }
            Expr::Unary(UnOp::Abs, inner) => write!(f, "|{inner}|"),
        }
    }
}

/// Matches the parser's prefix binding power so a negated composite (e.g.
/// `-(a+b)`) brackets exactly where `-a^2` should not (`-` binds looser than
/// `^` there, but here we're rendering an already-simplified `Neg` node, so
/// anything but a bare atom/rational needs its own parens).
const BP_PREFIX_RENDER: u8 = BinOp::Pow.precedence() + 1;

/// `k * π` canonical rendering (§4.5 "d·π/180 then reduced, yielding forms
/// such as `π/6`, `2π/3`"): numerator-times-π over denominator, rather than
/// the generic `k*atom` coefficient form — `π/4`, `2π/3`, `-π/6`, `5π`, never
/// `1/4*π`.
fn write_pi_multiple(f: &mut fmt::Formatter<'_>, k: &BigRational) -> fmt::Result {
    let numer = k.numer();
    let denom = k.denom();
    if denom.is_one() {
        write!(f, "{numer}\u{3c0}")
    } else if *numer == BigInt::one() {
        write!(f, "\u{3c0}/{denom}")
    } else if *numer == -BigInt::one() {
        write!(f, "-\u{3c0}/{denom}")
    } else {
        write!(f, "{numer}\u{3c0}/{denom}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi_coeff(n: i64, d: i64) -> Expr {
        Expr::Coeff(BigRational::new(BigInt::from(n), BigInt::from(d)), Atom::Pi)
    }

    #[test]
    fn pi_fraction_renders_numerator_over_denominator() {
        assert_eq!(pi_coeff(1, 4).to_string(), "\u{3c0}/4");
        assert_eq!(pi_coeff(2, 3).to_string(), "2\u{3c0}/3");
        assert_eq!(pi_coeff(1, 6).to_string(), "\u{3c0}/6");
    }

    #[test]
    fn pi_fraction_with_negative_numerator() {
        assert_eq!(pi_coeff(-1, 6).to_string(), "-\u{3c0}/6");
        assert_eq!(pi_coeff(-5, 6).to_string(), "-5\u{3c0}/6");
    }

    #[test]
    fn pi_whole_multiple_has_no_denominator() {
        assert_eq!(pi_coeff(5, 1).to_string(), "5\u{3c0}");
    }
}
