//! Preprocessing and lexing (§4.1, §4.2): normalizes a raw expression string
//! and turns it into a validated, harmonized stream of [`Token`]s the parser
//! can consume directly.

pub mod alias;
pub mod bracket;
pub mod complement;
pub mod fractionalize;
pub mod lexer;
pub mod mark;
pub mod preprocessor;
pub mod selfcheck;
pub mod token;

pub use alias::{default_function_table, default_symbol_table, function_arity, AliasTable};
pub use lexer::Lexer;
pub use preprocessor::Preprocessor;
pub use token::{render, renumber, Token, TokenKind};
