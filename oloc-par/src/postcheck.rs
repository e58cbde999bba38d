//! Post-build structural check (§4.3): walks the finished tree re-verifying
//! the arities §3 requires. The parser already enforces these as it builds
//! each node; this pass exists so a tree arriving from any other source
//! (a future alternate parser, a hand-built test fixture) is held to the
//! same contract.

use crate::ast::{Ast, NodeId, NodeKind};
use oloc_lex::alias::function_arity;
use oloc_util::SyntaxError;

pub fn check(ast: &Ast) -> Result<(), SyntaxError> {
    walk(ast, ast.root)
}

fn walk(ast: &Ast, id: NodeId) -> Result<(), SyntaxError> {
    let node = ast.get(id);
    match &node.kind {
        NodeKind::Literal { .. } => {}
        NodeKind::Group { child } => {
            walk(ast, *child)?;
        }
        NodeKind::Binary { op, lhs, rhs } => {
            let _ = op;
            walk(ast, *lhs)?;
            walk(ast, *rhs)?;
        }
        NodeKind::Unary { child, .. } => {
            walk(ast, *child)?;
        }
        NodeKind::FunctionCall { name, args } => {
            if let Some(expected) = function_arity(&name.value) {
                if args.len() != expected {
                    return Err(SyntaxError::function_param_count_error(
                        ast.expression.clone(),
                        vec![name.span.lo],
                        Some(name.value.clone()),
                        Some(expected.to_string()),
                    ));
                }
            }
            for arg in args {
                walk(ast, *arg)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oloc_lex::{default_function_table, Lexer};

    #[test]
    fn well_formed_tree_passes() {
        let table = default_function_table();
        let tokens = Lexer::new(&table).tokenize("gcd(12,18)").unwrap();
        let ast = crate::parse(tokens).unwrap();
        assert!(check(&ast).is_ok());
    }
}
