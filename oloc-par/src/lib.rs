//! The parser (§4.3): a static adjacency pre-check over the token stream,
//! a Pratt-style expression parser building the AST of §3, and a post-build
//! structural check over the finished tree.

pub mod ast;
pub mod parser;
pub mod postcheck;
pub mod staticcheck;

pub use ast::{Ast, Node, NodeId, NodeKind, UnaryPosition};
use oloc_lex::{Token, TokenKind};
use oloc_util::{CalcError, Span};

/// Parse a lexed token stream into an AST. An empty stream is replaced by the
/// literal `0` per §4.3's boundary rule before any checking happens.
pub fn parse(tokens: Vec<Token>) -> Result<Ast, CalcError> {
    let tokens = if tokens.is_empty() {
        vec![Token::new(TokenKind::Integer, "0", Span::new(0, 1))]
    } else {
        tokens
    };

    staticcheck::check(&tokens)?;

    let expression = oloc_lex::render(&tokens);
    let mut p = parser::Parser::new(&tokens);
    let root = p.parse_expr_bp(0)?;
    p.expect_exhausted()?;
    let ast = Ast {
        nodes: p.into_nodes(),
        root,
        expression,
    };

    postcheck::check(&ast)?;
    Ok(ast)
}
