//! The Pratt-style expression parser (§4.3): binding powers encode the five
//! precedence levels of the grammar (`addsub` < `muldiv` < `power`, prefix
//! unary tighter still, postfix tightest of all); `^` is right-associative
//! so its right binding power equals its left one, letting a chain of `^`
//! nest to the right instead of folding left like `+`/`-`/`*`/`/`.

use crate::ast::{Node, NodeId, NodeKind, UnaryPosition};
use oloc_lex::{render, Token, TokenKind};
use oloc_lex::alias::function_arity;
use oloc_util::{CalcError, IndexVec, SyntaxError};

const BP_ADD: (u8, u8) = (10, 11);
const BP_MUL: (u8, u8) = (20, 21);
const BP_POW: (u8, u8) = (30, 30);
const BP_PREFIX: u8 = 35;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    nodes: IndexVec<NodeId, Node>,
    rendered: String,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            nodes: IndexVec::new(),
            rendered: render(tokens),
        }
    }

    pub fn into_nodes(self) -> IndexVec<NodeId, Node> {
        self.nodes
    }

    pub fn expect_exhausted(&self) -> Result<(), CalcError> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            return Err(SyntaxError::unexpected_token_type(
                self.rendered.clone(),
                vec![tok.span.lo],
                Some(tok.value.clone()),
                None,
            )
            .into());
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        self.pos += 1;
        tok
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.push(Node { kind, parent: None });
        self.link_children(id);
        id
    }

    fn link_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = match &self.nodes[id].kind {
            NodeKind::Literal { .. } => vec![],
            NodeKind::Group { child } => vec![*child],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::Unary { child, .. } => vec![*child],
            NodeKind::FunctionCall { args, .. } => args.clone(),
        };
        for child in children {
            self.nodes[child].parent = Some(id);
        }
    }

    fn unexpected(&self) -> CalcError {
        let pos = self
            .peek()
            .map(|t| t.span.lo)
            .unwrap_or(self.rendered.chars().count());
        SyntaxError::unexpected_token_type(self.rendered.clone(), vec![pos], None, None).into()
    }

    fn infix_binding_power(&self) -> Option<(u8, u8)> {
        let tok = self.peek()?;
        if tok.kind != TokenKind::Operator {
            return None;
        }
        match tok.value.as_str() {
            "+" | "-" => Some(BP_ADD),
            "*" | "/" | "%" => Some(BP_MUL),
            "^" => Some(BP_POW),
            _ => None,
        }
    }

    /// The core Pratt loop: parse a prefix term, then fold in infix operators
    /// whose left binding power is at least `min_bp`.
    pub fn parse_expr_bp(&mut self, min_bp: u8) -> Result<NodeId, CalcError> {
        let mut lhs = self.parse_prefix()?;

        while let Some((lbp, rbp)) = self.infix_binding_power() {
            if lbp < min_bp {
                break;
            }
            let op = self.bump();
            let rhs = self.parse_expr_bp(rbp)?;
            lhs = self.push(NodeKind::Binary { op, lhs, rhs });
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<NodeId, CalcError> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Operator && matches!(tok.value.as_str(), "+" | "-" | "\u{221a}") => {
                let op = self.bump();
                let child = self.parse_expr_bp(BP_PREFIX)?;
                Ok(self.push(NodeKind::Unary {
                    op,
                    child,
                    position: UnaryPosition::Prefix,
                }))
            }
            Some(tok) if tok.kind == TokenKind::Operator && tok.value == "|" => {
                let op = self.bump();
                let inner = self.parse_expr_bp(0)?;
                self.expect_bar()?;
                Ok(self.push(NodeKind::Unary {
                    op,
                    child: inner,
                    position: UnaryPosition::Enclosing,
                }))
            }
            _ => self.parse_postfixed_primary(),
        }
    }

    fn expect_bar(&mut self) -> Result<(), CalcError> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Operator && tok.value == "|" => {
                self.bump();
                Ok(())
            }
            _ => Err(SyntaxError::enclosing_operator_misplacement(
                self.rendered.clone(),
                vec![self.tokens.get(self.pos.saturating_sub(1)).map(|t| t.span.lo).unwrap_or(0)],
                Some("|".to_string()),
                None,
            )
            .into()),
        }
    }

    fn parse_postfixed_primary(&mut self) -> Result<NodeId, CalcError> {
        let mut node = self.parse_primary()?;
        while let Some(tok) = self.peek() {
            if tok.kind == TokenKind::Operator && matches!(tok.value.as_str(), "!" | "\u{b0}") {
                let op = self.bump();
                node = self.push(NodeKind::Unary {
                    op,
                    child: node,
                    position: UnaryPosition::Postfix,
                });
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<NodeId, CalcError> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected());
        };

        match tok.kind {
            TokenKind::Function => self.parse_function_call(),
            TokenKind::LeftBracket => self.parse_group(),
            TokenKind::Integer
            | TokenKind::NativeIrrationalNumber
            | TokenKind::ShortCustomIrrational
            | TokenKind::LongCustomIrrational => {
                let value = self.bump();
                let irrational_param = match self.peek() {
                    Some(t) if t.kind == TokenKind::IrrationalParam => Some(self.bump()),
                    _ => None,
                };
                Ok(self.push(NodeKind::Literal {
                    value,
                    irrational_param,
                }))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_group(&mut self) -> Result<NodeId, CalcError> {
        self.bump(); // '('
        if matches!(self.peek(), Some(t) if t.kind == TokenKind::RightBracket) {
            let pos = self.tokens[self.pos].span.lo;
            return Err(
                SyntaxError::group_expression_error(self.rendered.clone(), vec![pos], None, None)
                    .into(),
            );
        }
        let child = self.parse_expr_bp(0)?;
        self.expect_right_bracket()?;
        Ok(self.push(NodeKind::Group { child }))
    }

    fn parse_function_call(&mut self) -> Result<NodeId, CalcError> {
        let name = self.bump();
        if !matches!(self.peek(), Some(t) if t.kind == TokenKind::LeftBracket) {
            return Err(SyntaxError::function_misplacement(
                self.rendered.clone(),
                vec![name.span.lo],
                Some(name.value.clone()),
                None,
            )
            .into());
        }
        self.bump(); // '('

        let mut args = Vec::new();
        if !matches!(self.peek(), Some(t) if t.kind == TokenKind::RightBracket) {
            args.push(self.parse_expr_bp(0)?);
            while matches!(self.peek(), Some(t) if t.kind == TokenKind::ParameterSeparator) {
                self.bump();
                args.push(self.parse_expr_bp(0)?);
            }
        }
        self.expect_right_bracket()?;

        if let Some(expected) = function_arity(&name.value) {
            if args.len() != expected {
                return Err(oloc_util::SyntaxError::function_param_count_error(
                    self.rendered.clone(),
                    vec![name.span.lo],
                    Some(name.value.clone()),
                    Some(expected.to_string()),
                )
                .into());
            }
        }

        Ok(self.push(NodeKind::FunctionCall { name, args }))
    }

    fn expect_right_bracket(&mut self) -> Result<(), CalcError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::RightBracket => {
                self.bump();
                Ok(())
            }
            _ => Err(SyntaxError::group_expression_error(
                self.rendered.clone(),
                vec![self.tokens.get(self.pos.saturating_sub(1)).map(|t| t.span.hi).unwrap_or(0)],
                None,
                None,
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use oloc_lex::{default_function_table, Lexer};

    fn parse(s: &str) -> Ast {
        let table = default_function_table();
        let tokens = Lexer::new(&table).tokenize(s).unwrap();
        crate::parse(tokens).unwrap()
    }

    #[test]
    fn simple_binary_parses() {
        let ast = parse("1+2");
        assert!(matches!(ast.get(ast.root).kind, NodeKind::Binary { .. }));
    }

    #[test]
    fn precedence_groups_multiplication_first() {
        let ast = parse("1+2*3");
        let NodeKind::Binary { op, lhs, .. } = &ast.get(ast.root).kind else {
            panic!("expected binary root");
        };
        assert_eq!(op.value, "+");
        assert!(matches!(ast.get(*lhs).kind, NodeKind::Literal { .. }));
    }

    #[test]
    fn power_is_right_associative() {
        // 2^3^2 should parse as 2^(3^2): the rhs of the outer ^ is itself a
        // Binary(^) node, not the lhs.
        let ast = parse("2^3^2");
        let NodeKind::Binary { op, rhs, .. } = &ast.get(ast.root).kind else {
            panic!("expected binary root");
        };
        assert_eq!(op.value, "^");
        assert!(matches!(ast.get(*rhs).kind, NodeKind::Binary { .. }));
    }

    #[test]
    fn unary_minus_binds_tighter_than_power() {
        // -2^2 parses as (-2)^2: the lhs of ^ is the negated literal.
        let ast = parse("-2^2");
        let NodeKind::Binary { op, lhs, .. } = &ast.get(ast.root).kind else {
            panic!("expected binary root");
        };
        assert_eq!(op.value, "^");
        assert!(matches!(ast.get(*lhs).kind, NodeKind::Unary { .. }));
    }

    #[test]
    fn function_call_parses_args() {
        let ast = parse("gcd(12,18)");
        let NodeKind::FunctionCall { name, args } = &ast.get(ast.root).kind else {
            panic!("expected function call root");
        };
        assert_eq!(name.value, "gcd");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn wrong_arity_errors() {
        let table = default_function_table();
        let tokens = Lexer::new(&table).tokenize("sqrt(1,2)").unwrap();
        assert!(crate::parse(tokens).is_err());
    }

    #[test]
    fn grouped_expression_parses() {
        let ast = parse("(1+2)*3");
        assert!(matches!(ast.get(ast.root).kind, NodeKind::Binary { .. }));
    }

    #[test]
    fn enclosing_bars_parse_as_absolute_value() {
        let ast = parse("|1-5|");
        assert!(matches!(ast.get(ast.root).kind, NodeKind::Unary { .. }));
    }

    #[test]
    fn empty_expression_becomes_zero_literal() {
        let ast = crate::parse(vec![]).unwrap();
        let NodeKind::Literal { value, .. } = &ast.get(ast.root).kind else {
            panic!("expected literal root");
        };
        assert_eq!(value.value, "0");
    }
}
