//! The output filter (§6 "Configuration surface", §10): renders the
//! evaluator's canonical, always-unambiguous `Expr` rendering into the
//! human-readable string a consumer actually wants, honoring the formatting
//! options a `Config` carries. This is purely cosmetic — it runs after the
//! core has already produced an exact value, and never feeds back into the
//! pipeline.

use crate::config::FormatOptions;
use oloc_eval::Expr;
use std::collections::HashMap;

/// Render `expr`'s canonical form through the output filter.
pub fn render(expr: &Expr, options: &FormatOptions, irrational_params: &HashMap<String, String>) -> String {
    render_str(&expr.to_string(), options, irrational_params)
}

/// Run the same filter chain directly over an already-rendered expression
/// string (a calculation step, say, rather than a fresh `Expr`), so the step
/// list and the final result go through identical cosmetics.
pub fn render_str(s: &str, options: &FormatOptions, irrational_params: &HashMap<String, String>) -> String {
    let mut s = s.to_string();
    if options.omit_multiplication {
        s = omit_redundant_stars(&s);
    } else {
        s = insert_explicit_stars(&s);
    }
    if options.superscript_exponents {
        s = superscript_exponents(&s);
    }
    s = group_digits(&s, options);
    if options.retain_irrational_params {
        s = attach_params(&s, irrational_params);
    }
    if options.ascii_irrationals {
        s = to_ascii_irrationals(&s);
    }
    if options.token_spacing > 0 {
        s = apply_spacing(&s, options.token_spacing);
    }
    s
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Irrational,
    BracketOpen,
    BracketClose,
    Other,
}

fn classify(c: char) -> Class {
    if c.is_ascii_digit() {
        Class::Digit
    } else if c == '(' {
        Class::BracketOpen
    } else if c == ')' {
        Class::BracketClose
    } else if matches!(c, '+' | '-' | '/' | '^' | '*' | '!' | '%' | ',' | '|' | '\u{b0}') {
        Class::Other
    } else {
        Class::Irrational
    }
}

/// The evaluator's `Expr::Display` always emits an explicit `*` between a
/// coefficient and its atom (`2*x`), between two colliding factors (`x*y`),
/// and between a rational and a grouped sum (`2*(a+b)`). Drop the `*`
/// exactly where the lexer's own implicit-multiplication rule (mirrored from
/// `oloc_lex::complement::needs_star`) would have inserted it in the first
/// place, so the shortened rendering still re-lexes to the same meaning.
fn omit_redundant_stars(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] == '*' && i > 0 && i + 1 < chars.len() {
            let before = classify(chars[i - 1]);
            let after = classify(chars[i + 1]);
            let omit = matches!(
                (before, after),
                (Class::Digit, Class::BracketOpen)
                    | (Class::BracketClose, Class::Digit)
                    | (Class::Irrational, Class::Irrational)
                    | (Class::Digit, Class::Irrational)
                    | (Class::Irrational, Class::Digit)
            );
            if omit {
                i += 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// The inverse of `omit_redundant_stars`, for a `Config` that asks for every
/// multiplication to stay explicit — a no-op, since `Expr::Display` already
/// emits the explicit form.
fn insert_explicit_stars(s: &str) -> String {
    s.to_string()
}

const SUPERSCRIPT_DIGITS: [char; 10] =
    ['\u{2070}', '\u{00b9}', '\u{00b2}', '\u{00b3}', '\u{2074}', '\u{2075}', '\u{2076}', '\u{2077}', '\u{2078}', '\u{2079}'];

/// Rewrite `^` followed by a bare (optionally signed) integer exponent into
/// Unicode superscript digits; a parenthesized exponent (`x^(1/2)`) is left
/// alone since there is no superscript form of a fraction.
fn superscript_exponents(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] == '^' {
            let mut j = i + 1;
            let mut run = String::new();
            if j < chars.len() && chars[j] == '-' {
                run.push('-');
                j += 1;
            }
            let digits_start = j;
            while j < chars.len() && chars[j].is_ascii_digit() {
                run.push(chars[j]);
                j += 1;
            }
            if j > digits_start {
                for c in run.chars() {
                    if c == '-' {
                        out.push('\u{207b}');
                    } else {
                        let d = c.to_digit(10).unwrap() as usize;
                        out.push(SUPERSCRIPT_DIGITS[d]);
                    }
                }
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Insert `options.digit_group_interval`-wide grouping separators into every
/// digit run longer than `options.digit_group_threshold` digits; `-1`
/// disables grouping entirely.
fn group_digits(s: &str, options: &FormatOptions) -> String {
    if options.digit_group_threshold == -1 {
        return s.to_string();
    }
    let threshold = options.digit_group_threshold as usize;
    let interval = options.digit_group_interval as usize;
    let sep = if options.underscore_separator { '_' } else { ',' };

    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let run: String = chars[start..i].iter().collect();
            out.push_str(&group_run(&run, threshold, interval, sep));
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn group_run(run: &str, threshold: usize, interval: usize, sep: char) -> String {
    if run.len() <= threshold {
        return run.to_string();
    }
    let digits: Vec<char> = run.chars().collect();
    let mut grouped = Vec::with_capacity(digits.len() + digits.len() / interval);
    for (count_from_end, ch) in digits.iter().rev().enumerate() {
        if count_from_end > 0 && count_from_end % interval == 0 {
            grouped.push(sep);
        }
        grouped.push(*ch);
    }
    grouped.reverse();
    grouped.into_iter().collect()
}

fn to_ascii_irrationals(s: &str) -> String {
    s.replace('\u{3c0}', "pi").replace('\u{1d452}', "e")
}

/// Append each irrational atom's attached `?`-parameter tag (if any) right
/// after its rendered key, matching §6's "retention of irrational
/// parameters" option.
fn attach_params(s: &str, irrational_params: &HashMap<String, String>) -> String {
    let mut out = s.to_string();
    for (key, param) in irrational_params {
        let tagged = format!("{key}{param}");
        out = out.replace(key.as_str(), &tagged);
    }
    out
}

/// Insert `count` spaces around every binary operator character, leaving a
/// leading unary sign and postfix/enclosing operators untouched.
fn apply_spacing(s: &str, count: usize) -> String {
    let pad = " ".repeat(count);
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        let is_binary_site = matches!(c, '+' | '-' | '*' | '/' | '%' | '^')
            && i > 0
            && i + 1 < chars.len()
            && chars[i - 1] != '('
            && !matches!(chars[i - 1], '+' | '-' | '*' | '/' | '%' | '^');
        if is_binary_site {
            out.push_str(&pad);
            out.push(c);
            out.push_str(&pad);
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;
    use oloc_eval::Atom;

    #[test]
    fn omits_star_between_coefficient_and_atom() {
        let expr = Expr::Coeff(BigRational::from_integer(BigInt::from(2)), Atom::Short('x'));
        let options = FormatOptions::default();
        let out = render(&expr, &options, &HashMap::new());
        assert_eq!(out, "2x");
    }

    #[test]
    fn keeps_star_when_omission_disabled() {
        let expr = Expr::Coeff(BigRational::from_integer(BigInt::from(2)), Atom::Short('x'));
        let mut options = FormatOptions::default();
        options.omit_multiplication = false;
        let out = render(&expr, &options, &HashMap::new());
        assert_eq!(out, "2*x");
    }

    #[test]
    fn superscripts_integer_exponent() {
        let expr = Expr::Pow(Box::new(Expr::integer(BigInt::from(3))), BigRational::from_integer(BigInt::from(2)));
        let mut options = FormatOptions::default();
        options.superscript_exponents = true;
        let out = render(&expr, &options, &HashMap::new());
        assert_eq!(out, "3\u{00b2}");
    }

    #[test]
    fn groups_large_integers() {
        let expr = Expr::integer(BigInt::from(1234567));
        let mut options = FormatOptions::default();
        options.digit_group_threshold = 3;
        options.digit_group_interval = 3;
        let out = render(&expr, &options, &HashMap::new());
        assert_eq!(out, "1,234,567");
    }

    #[test]
    fn ascii_irrationals_render_pi_as_pi() {
        let expr = Expr::Var(Atom::Pi);
        let mut options = FormatOptions::default();
        options.ascii_irrationals = true;
        let out = render(&expr, &options, &HashMap::new());
        assert_eq!(out, "pi");
    }
}
