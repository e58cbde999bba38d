//! Pass 1-5 of tokenization: mark every character with a tentative kind,
//! then merge adjacent marks of the same (merge-eligible) kind into tokens.

use crate::alias::AliasTable;
use crate::token::{Token, TokenKind};
use oloc_util::{Span, SyntaxError};

const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '^', '%', '!', '\u{b0}', '|', '\u{221a}'];

pub fn mark(chars: &[char], function_table: &AliasTable) -> Result<Vec<Option<TokenKind>>, SyntaxError> {
    let mut marks: Vec<Option<TokenKind>> = vec![None; chars.len()];
    mark_long_custom(chars, &mut marks)?;
    mark_irrational_params(chars, &mut marks);
    mark_functions(chars, &mut marks, function_table);
    mark_numbers(chars, &mut marks);
    mark_remaining(chars, &mut marks);
    Ok(marks)
}

fn mark_long_custom(chars: &[char], marks: &mut [Option<TokenKind>]) -> Result<(), SyntaxError> {
    let mut stack: Vec<usize> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '<' => stack.push(i),
            '>' => match stack.pop() {
                Some(open) => {
                    for slot in marks.iter_mut().take(i + 1).skip(open) {
                        *slot = Some(TokenKind::LongCustomIrrational);
                    }
                }
                None => {
                    let expr: String = chars.iter().collect();
                    return Err(SyntaxError::irrational_bracket_mismatch(
                        expr,
                        vec![i],
                        None,
                        None,
                    ));
                }
            },
            _ => {}
        }
    }
    if let Some(&open) = stack.first() {
        let expr: String = chars.iter().collect();
        return Err(SyntaxError::irrational_bracket_mismatch(
            expr,
            vec![open],
            None,
            None,
        ));
    }
    Ok(())
}

fn mark_irrational_params(chars: &[char], marks: &mut [Option<TokenKind>]) {
    for i in 0..chars.len() {
        if chars[i] != '?' || marks[i].is_some() {
            continue;
        }
        let mut j = i;
        let mut dot_seen = false;
        while j > 0 {
            let prev = chars[j - 1];
            if marks[j - 1].is_some() {
                break;
            }
            if prev.is_ascii_digit() {
                j -= 1;
            } else if prev == '.' && !dot_seen {
                dot_seen = true;
                j -= 1;
            } else if prev == '+' || prev == '-' {
                j -= 1;
                break;
            } else {
                break;
            }
        }
        for slot in marks.iter_mut().take(i + 1).skip(j) {
            *slot = Some(TokenKind::IrrationalParam);
        }
    }
}

fn mark_functions(chars: &[char], marks: &mut [Option<TokenKind>], function_table: &AliasTable) {
    let text: String = chars.iter().collect();
    let byte_to_char: Vec<usize> = {
        let mut v = vec![0usize; text.len() + 1];
        let mut idx = 0usize;
        for (ci, ch) in text.char_indices() {
            for b in ci..ci + ch.len_utf8() {
                v[b] = idx;
            }
            idx += 1;
        }
        v[text.len()] = idx;
        v
    };

    let mut byte_pos = 0usize;
    while byte_pos < text.len() {
        let char_pos = byte_to_char[byte_pos];
        if marks[char_pos].is_none() {
            if let Some((_, len)) = function_table.longest_match_at(&text, byte_pos) {
                let end_byte = byte_pos + len;
                let end_char = byte_to_char[end_byte];
                for slot in marks.iter_mut().take(end_char).skip(char_pos) {
                    *slot = Some(TokenKind::Function);
                }
                byte_pos = end_byte;
                continue;
            }
        }
        let ch = text[byte_pos..].chars().next().unwrap();
        byte_pos += ch.len_utf8();
    }
}

fn mark_numbers(chars: &[char], marks: &mut [Option<TokenKind>]) {
    let n = chars.len();
    let mut i = 0usize;
    while i < n {
        if marks[i].is_some() || !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && chars[i].is_ascii_digit() && marks[i].is_none() {
            i += 1;
        }
        let mut kind = TokenKind::Integer;

        if i < n && chars[i] == '.' && marks[i].is_none() {
            let dot_run_start = i;
            let mut j = i;
            while j < n && chars[j] == '.' {
                j += 1;
            }
            let dot_count = j - dot_run_start;
            if dot_count == 1 {
                i = dot_run_start + 1;
                while i < n && chars[i].is_ascii_digit() && marks[i].is_none() {
                    i += 1;
                }
                kind = TokenKind::FiniteDecimal;

                let mut k = i;
                let mut trailing_dots = 0;
                while k < n && chars[k] == '.' {
                    trailing_dots += 1;
                    k += 1;
                }
                if (3..=6).contains(&trailing_dots) {
                    i = k;
                    kind = TokenKind::InfiniteRecurringDecimal;
                } else if k < n && chars[k] == ':' && k + 1 < n && chars[k + 1].is_ascii_digit() {
                    i = k + 1;
                    while i < n && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    kind = TokenKind::InfiniteRecurringDecimal;
                }
            }
            // 2 dots, or >6, or 0 (unreachable): leave the dots unmarked so
            // the remaining pass / parser surfaces a syntax error on them.
        }

        if i < n && chars[i] == '%' {
            let next_is_number_start =
                i + 1 < n && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.');
            if !next_is_number_start {
                i += 1;
                kind = TokenKind::Percentage;
            }
        }

        for slot in marks.iter_mut().take(i).skip(start) {
            *slot = Some(kind);
        }
    }
}

fn mark_remaining(chars: &[char], marks: &mut [Option<TokenKind>]) {
    for (i, &c) in chars.iter().enumerate() {
        if marks[i].is_some() {
            continue;
        }
        marks[i] = Some(match c {
            ',' => TokenKind::ParameterSeparator,
            '(' | '[' | '{' => TokenKind::LeftBracket,
            ')' | ']' | '}' => TokenKind::RightBracket,
            '\u{3c0}' | '\u{1d452}' => TokenKind::NativeIrrationalNumber,
            c if c.is_control() => TokenKind::Unknown,
            c if OPERATOR_CHARS.contains(&c) => TokenKind::Operator,
            _ => TokenKind::ShortCustomIrrational,
        });
    }
}

/// Merge adjacent marks of the same merge-eligible kind into tokens.
pub fn merge(chars: &[char], marks: &[Option<TokenKind>]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < chars.len() {
        let kind = marks[i].unwrap_or(TokenKind::Unknown);
        let start = i;
        i += 1;
        if kind.is_merge_eligible() {
            while i < chars.len() && marks[i] == Some(kind) {
                i += 1;
            }
        }
        let value: String = chars[start..i].iter().collect();
        tokens.push(Token::new(kind, value, Span::new(start, i)));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::default_function_table;

    fn tokenize(s: &str) -> Vec<Token> {
        let chars: Vec<char> = s.chars().collect();
        let table = default_function_table();
        let marks = mark(&chars, &table).unwrap();
        merge(&chars, &marks)
    }

    #[test]
    fn marks_integer_as_single_token() {
        let toks = tokenize("123");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Integer);
    }

    #[test]
    fn marks_function_name() {
        let toks = tokenize("sqrt(4)");
        assert_eq!(toks[0].kind, TokenKind::Function);
        assert_eq!(toks[0].value, "sqrt");
    }

    #[test]
    fn marks_finite_decimal() {
        let toks = tokenize("12.5");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::FiniteDecimal);
    }

    #[test]
    fn marks_recurring_decimal_dots() {
        let toks = tokenize("0.3...");
        assert_eq!(toks[0].kind, TokenKind::InfiniteRecurringDecimal);
    }

    #[test]
    fn unmatched_angle_bracket_errors() {
        let chars: Vec<char> = "<abc".chars().collect();
        let table = default_function_table();
        assert!(mark(&chars, &table).is_err());
    }
}
