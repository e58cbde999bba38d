//! The lexer (§4.2): turns a preprocessed expression string into a validated,
//! harmonized token stream, ready for the parser.

use crate::alias::AliasTable;
use crate::{bracket, complement, fractionalize, mark, selfcheck};
use crate::token::Token;
use oloc_util::CalcError;

pub struct Lexer<'a> {
    pub function_table: &'a AliasTable,
}

impl<'a> Lexer<'a> {
    pub fn new(function_table: &'a AliasTable) -> Self {
        Self { function_table }
    }

    #[tracing::instrument(skip(self))]
    pub fn tokenize(&self, expression: &str) -> Result<Vec<Token>, CalcError> {
        let chars: Vec<char> = expression.chars().collect();
        let marks = mark::mark(&chars, self.function_table)?;
        let tokens = mark::merge(&chars, &marks);

        selfcheck::check_all(&tokens, self.function_table)?;

        let tokens = complement::formal_complement(tokens);
        let tokens = fractionalize::fractionalize(tokens)?;
        let tokens = bracket::harmonize_brackets(tokens)?;

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::default_function_table;
    use crate::token::{render, TokenKind};

    fn lex(s: &str) -> Vec<Token> {
        let table = default_function_table();
        Lexer::new(&table).tokenize(s).unwrap()
    }

    #[test]
    fn simple_sum_tokenizes() {
        let toks = lex("1+2");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Integer, TokenKind::Operator, TokenKind::Integer]
        );
    }

    #[test]
    fn implicit_multiplication_before_bracket() {
        let toks = lex("2(3+4)");
        assert_eq!(toks[1].kind, TokenKind::Operator);
        assert_eq!(toks[1].value, "*");
    }

    #[test]
    fn brackets_harmonize_to_parens() {
        let toks = lex("[1+2]");
        assert_eq!(toks.first().unwrap().value, "(");
        assert_eq!(toks.last().unwrap().value, ")");
    }

    #[test]
    fn percentage_fractionalizes() {
        let toks = lex("12.5%");
        assert_eq!(toks[0].value, "1");
        assert_eq!(toks[1].value, "/");
        assert_eq!(toks[2].value, "8");
    }

    #[test]
    fn function_call_tokenizes() {
        let toks = lex("sqrt(4)");
        assert_eq!(toks[0].kind, TokenKind::Function);
        assert_eq!(toks[0].value, "sqrt");
    }

    #[test]
    fn unknown_name_is_not_marked_as_function() {
        let table = default_function_table();
        // "frobnicate" has no entry in the function table, so it is scanned as
        // a run of single-char short custom irrationals, not a Function token.
        let toks = Lexer::new(&table).tokenize("frobnicate(4)").unwrap();
        assert!(toks.iter().all(|t| t.kind != TokenKind::Function));
    }

    #[test]
    fn render_round_trips_before_rewrites() {
        let table = default_function_table();
        let chars: Vec<char> = "1+2".chars().collect();
        let marks = mark::mark(&chars, &table).unwrap();
        let toks = mark::merge(&chars, &marks);
        assert_eq!(render(&toks), "1+2");
    }
}
