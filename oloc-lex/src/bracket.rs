//! Bracket harmonization (§4.2): three bracket families nest by a fixed
//! priority, `{ > [ > (`; a closer must match its opener's family exactly.
//! Once validated, every bracket is rewritten to `(` / `)` so the parser only
//! ever has to deal with one bracket family.

use crate::token::{renumber, Token, TokenKind};
use oloc_util::SyntaxError;

fn priority(c: char) -> u8 {
    match c {
        '{' => 3,
        '[' => 2,
        '(' => 1,
        _ => 0,
    }
}

fn matching_close(open: char) -> char {
    match open {
        '{' => '}',
        '[' => ']',
        '(' => ')',
        _ => unreachable!("not a left bracket"),
    }
}

pub fn harmonize_brackets(mut tokens: Vec<Token>) -> Result<Vec<Token>, SyntaxError> {
    let expr: String = tokens.iter().map(|t| t.value.as_str()).collect();
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LeftBracket => {
                let c = tok.value.chars().next().unwrap();
                if let Some(&(top, _)) = stack.last() {
                    if priority(c) > priority(top) {
                        return Err(SyntaxError::bracket_hierarchy_error(
                            expr,
                            vec![tok.span.lo],
                            None,
                            None,
                        ));
                    }
                }
                stack.push((c, i));
            }
            TokenKind::RightBracket => {
                let c = tok.value.chars().next().unwrap();
                match stack.pop() {
                    None => {
                        return Err(SyntaxError::right_bracket_mismatch(
                            expr,
                            vec![tok.span.lo],
                            Some(c.to_string()),
                            None,
                        ));
                    }
                    Some((open_c, _)) => {
                        if matching_close(open_c) != c {
                            return Err(SyntaxError::right_bracket_mismatch(
                                expr,
                                vec![tok.span.lo],
                                Some(c.to_string()),
                                None,
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if let Some((open_c, idx)) = stack.pop() {
        return Err(SyntaxError::left_bracket_mismatch(
            expr,
            vec![tokens[idx].span.lo],
            Some(open_c.to_string()),
            None,
        ));
    }

    for tok in tokens.iter_mut() {
        match tok.kind {
            TokenKind::LeftBracket => tok.value = "(".to_string(),
            TokenKind::RightBracket => tok.value = ")".to_string(),
            _ => {}
        }
    }
    renumber(&mut tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oloc_util::Span;

    fn tok(kind: TokenKind, value: &str, at: usize) -> Token {
        Token::new(kind, value, Span::point(at))
    }

    #[test]
    fn balanced_brackets_rewrite_to_parens() {
        let tokens = vec![
            tok(TokenKind::LeftBracket, "[", 0),
            tok(TokenKind::Integer, "1", 1),
            tok(TokenKind::RightBracket, "]", 2),
        ];
        let out = harmonize_brackets(tokens).unwrap();
        assert_eq!(out[0].value, "(");
        assert_eq!(out[2].value, ")");
    }

    #[test]
    fn out_of_priority_nesting_errors() {
        let tokens = vec![
            tok(TokenKind::LeftBracket, "(", 0),
            tok(TokenKind::LeftBracket, "{", 1),
            tok(TokenKind::RightBracket, "}", 2),
            tok(TokenKind::RightBracket, ")", 3),
        ];
        assert!(harmonize_brackets(tokens).is_err());
    }

    #[test]
    fn mismatched_closer_errors() {
        let tokens = vec![
            tok(TokenKind::LeftBracket, "(", 0),
            tok(TokenKind::RightBracket, "]", 1),
        ];
        assert!(harmonize_brackets(tokens).is_err());
    }

    #[test]
    fn unclosed_opener_errors() {
        let tokens = vec![tok(TokenKind::LeftBracket, "(", 0)];
        assert!(harmonize_brackets(tokens).is_err());
    }
}
