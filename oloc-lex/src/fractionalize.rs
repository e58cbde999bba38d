//! Fractionalization (§4.2, §4.4 exact formulas): every decimal or
//! percentage token is rewritten, in place, into an exact reduced fraction —
//! either a bare `Integer` token or an `Integer "/" Integer` triple — so the
//! evaluator never has to special-case decimal notation. A literal
//! `Integer "/" Integer` triple already present in the stream (written
//! directly, or left over from a previous rewrite) is reduced the same way.

use crate::token::{renumber, Token, TokenKind};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Pow, Signed, Zero};
use oloc_util::{CalcError, Span};

pub fn fractionalize(tokens: Vec<Token>) -> Result<Vec<Token>, CalcError> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match tok.kind {
            TokenKind::FiniteDecimal => out.extend(finite_decimal_to_fraction(&tok)?),
            TokenKind::Percentage => out.extend(percentage_to_fraction(&tok)?),
            TokenKind::InfiniteRecurringDecimal => out.extend(recurring_to_fraction(&tok)?),
            _ => out.push(tok),
        }
    }
    renumber(&mut out);
    reduce_literal_fractions(out)
}

fn parse_digits(s: &str) -> BigInt {
    if s.is_empty() {
        BigInt::zero()
    } else {
        s.parse().expect("validated by self-check")
    }
}

fn big_pow10(exp: usize) -> BigInt {
    BigInt::from(10u32).pow(exp as u32)
}

fn emit_fraction(n: BigInt, d: BigInt) -> Result<Vec<Token>, CalcError> {
    if d.is_zero() {
        return Err(oloc_util::CalculationError::divide_by_zero("", vec![], None, None).into());
    }
    let (mut n, mut d) = if d.is_negative() { (-n, -d) } else { (n, d) };
    let g = n.gcd(&d);
    if !g.is_zero() && g != BigInt::one() {
        n /= &g;
        d /= &g;
    }
    if d == BigInt::one() {
        Ok(vec![Token::new(TokenKind::Integer, n.to_string(), Span::DUMMY)])
    } else {
        Ok(vec![
            Token::new(TokenKind::Integer, n.to_string(), Span::DUMMY),
            Token::new(TokenKind::Operator, "/", Span::DUMMY),
            Token::new(TokenKind::Integer, d.to_string(), Span::DUMMY),
        ])
    }
}

fn finite_decimal_to_fraction(tok: &Token) -> Result<Vec<Token>, CalcError> {
    let (int_part, frac_part) = tok.value.split_once('.').expect("validated by self-check");
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let n = parse_digits(&format!("{int_part}{frac_part}"));
    let d = big_pow10(frac_part.chars().count());
    emit_fraction(n, d)
}

fn percentage_to_fraction(tok: &Token) -> Result<Vec<Token>, CalcError> {
    let inner = tok.value.strip_suffix('%').expect("validated by self-check");
    let (n, mut d) = if let Some((int_part, frac_part)) = inner.split_once('.') {
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let n = parse_digits(&format!("{int_part}{frac_part}"));
        (n, big_pow10(frac_part.chars().count()))
    } else {
        (parse_digits(inner), BigInt::one())
    };
    d *= BigInt::from(100u32);
    emit_fraction(n, d)
}

fn recurring_to_fraction(tok: &Token) -> Result<Vec<Token>, CalcError> {
    let v = &tok.value;
    let (a, b, r) = if let Some(colon_idx) = v.find(':') {
        let before = &v[..colon_idx];
        let after = &v[colon_idx + 1..];
        let dot_idx = before.find('.').expect("validated by self-check");
        (&before[..dot_idx], &before[dot_idx + 1..], after)
    } else {
        let trimmed = v.trim_end_matches('.');
        let dot_idx = trimmed.find('.').expect("validated by self-check");
        (&trimmed[..dot_idx], "", &trimmed[dot_idx + 1..])
    };

    let a_big = parse_digits(if a.is_empty() { "0" } else { a });
    let b_big = parse_digits(b);
    let r_big = parse_digits(r);

    let d_pow = big_pow10(b.chars().count());
    let nine_pow = BigInt::from(9u32).pow(r.chars().count() as u32);

    let numerator = &a_big * &d_pow + &b_big * &nine_pow + &r_big;
    let denominator = &d_pow * &nine_pow;
    emit_fraction(numerator, denominator)
}

/// Reduce any literal `Integer "/" Integer` triple already present in the
/// stream (whether written directly by the user or produced just above).
fn reduce_literal_fractions(tokens: Vec<Token>) -> Result<Vec<Token>, CalcError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0usize;
    while i < tokens.len() {
        let is_triple = i + 2 < tokens.len()
            && tokens[i].kind == TokenKind::Integer
            && tokens[i + 1].kind == TokenKind::Operator
            && tokens[i + 1].value == "/"
            && tokens[i + 2].kind == TokenKind::Integer;
        if is_triple {
            let n: BigInt = tokens[i].value.parse().expect("validated by self-check");
            let d: BigInt = tokens[i + 2].value.parse().expect("validated by self-check");
            out.extend(emit_fraction(n, d)?);
            i += 3;
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    renumber(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oloc_util::Span;

    fn tok(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, Span::DUMMY)
    }

    #[test]
    fn finite_decimal_reduces() {
        let out = finite_decimal_to_fraction(&tok(TokenKind::FiniteDecimal, "12.5")).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].value, "25");
        assert_eq!(out[2].value, "2");
    }

    #[test]
    fn percentage_reduces_to_eighth() {
        let out = percentage_to_fraction(&tok(TokenKind::Percentage, "12.5%")).unwrap();
        assert_eq!(out[0].value, "1");
        assert_eq!(out[2].value, "8");
    }

    #[test]
    fn recurring_dot_form_reduces_to_one_third() {
        let out = recurring_to_fraction(&tok(TokenKind::InfiniteRecurringDecimal, "0.3...")).unwrap();
        assert_eq!(out[0].value, "1");
        assert_eq!(out[2].value, "3");
    }

    #[test]
    fn exact_finite_decimal_collapses_to_integer() {
        let out = finite_decimal_to_fraction(&tok(TokenKind::FiniteDecimal, "2.0")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, "2");
    }

    #[test]
    fn literal_fraction_is_reduced_in_place() {
        let tokens = vec![
            tok(TokenKind::Integer, "4"),
            tok(TokenKind::Operator, "/"),
            tok(TokenKind::Integer, "8"),
        ];
        let out = reduce_literal_fractions(tokens).unwrap();
        assert_eq!(out[0].value, "1");
        assert_eq!(out[2].value, "2");
    }
}
