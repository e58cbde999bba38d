//! The evaluator (§4.4): a depth-first rewrite of the AST into the exact
//! value form of §3, recording a re-serialized snapshot of the whole
//! expression after every local rewrite.

use crate::kernel::{self, KernelError};
use crate::steps::{Step, StepManager};
use crate::value::{Atom, BinOp, Expr, UnOp};
use num_bigint::BigInt;
use num_rational::BigRational;
use oloc_par::{Ast, NodeId, NodeKind, UnaryPosition};
use oloc_util::{CalcError, CalculationError, IndexVec};
use std::collections::HashMap;

pub struct EvalOutcome {
    pub value: Expr,
    pub steps: Vec<Step>,
    /// Canonical atom key (`π`, `x`, `<name>`, ...) to the last irrational
    /// parameter tag seen attached to it, for the conversion collaborator.
    pub irrational_params: HashMap<String, String>,
}

/// Run the evaluator over a parsed tree, producing the final exact value
/// plus the ordered, deduplicated list of steps a consumer can show.
pub fn evaluate(ast: &Ast) -> Result<EvalOutcome, CalcError> {
    let mut state = State {
        ast,
        simplified: IndexVec::with_capacity(ast.node_count()),
        params: HashMap::new(),
        steps: StepManager::new(),
    };
    for _ in 0..ast.node_count() {
        state.simplified.push(None);
    }

    let snapshot = state.render(ast.root, 0);
    state.steps.push(snapshot);
    state.walk(ast.root)?;
    let value = state.simplified[ast.root].clone().expect("root always simplified");
    state.steps.force_push(value.to_string());

    Ok(EvalOutcome {
        value,
        steps: state.steps.into_steps(),
        irrational_params: state.params,
    })
}

struct State<'a> {
    ast: &'a Ast,
    simplified: IndexVec<NodeId, Option<Expr>>,
    params: HashMap<String, String>,
    steps: StepManager,
}

impl<'a> State<'a> {
    fn walk(&mut self, id: NodeId) -> Result<(), CalcError> {
        let node = self.ast.get(id).clone();
        match &node.kind {
            NodeKind::Literal { value, irrational_param } => {
                let expr = self.lower_literal(value, irrational_param.as_ref());
                self.simplified[id] = Some(expr);
            }
            NodeKind::Group { child } => {
                self.walk(*child)?;
                self.simplified[id] = self.simplified[*child].clone();
            }
            NodeKind::Binary { op, lhs, rhs } => {
                self.walk(*lhs)?;
                let snapshot = self.render(self.ast.root, 0);
                self.steps.push(snapshot);
                self.walk(*rhs)?;
                let snapshot = self.render(self.ast.root, 0);
                self.steps.push(snapshot);
                let l = self.simplified[*lhs].clone().expect("lhs simplified");
                let r = self.simplified[*rhs].clone().expect("rhs simplified");
                let result = self
                    .dispatch_binary(&op.value, l, r)
                    .map_err(|e| attach(e, &self.ast.expression, op.span.lo, Some(op.value.clone())))?;
                self.simplified[id] = Some(result);
                let snapshot = self.render(self.ast.root, 0);
                self.steps.push(snapshot);
            }
            NodeKind::Unary { op, child, position } => {
                self.walk(*child)?;
                let snapshot = self.render(self.ast.root, 0);
                self.steps.push(snapshot);
                let c = self.simplified[*child].clone().expect("child simplified");
                let result = self
                    .dispatch_unary(&op.value, *position, c)
                    .map_err(|e| attach(e, &self.ast.expression, op.span.lo, Some(op.value.clone())))?;
                self.simplified[id] = Some(result);
                let snapshot = self.render(self.ast.root, 0);
                self.steps.push(snapshot);
            }
            NodeKind::FunctionCall { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    self.walk(*arg)?;
                    let snapshot = self.render(self.ast.root, 0);
                    self.steps.push(snapshot);
                    values.push(self.simplified[*arg].clone().expect("arg simplified"));
                }
                let result = self
                    .dispatch_call(&name.value, values)
                    .map_err(|e| attach(e, &self.ast.expression, name.span.lo, Some(name.value.clone())))?;
                self.simplified[id] = Some(result);
                let snapshot = self.render(self.ast.root, 0);
                self.steps.push(snapshot);
            }
        }
        Ok(())
    }

    fn lower_literal(&mut self, value: &oloc_lex::Token, param: Option<&oloc_lex::Token>) -> Expr {
        use oloc_lex::TokenKind;
        let expr = match value.kind {
            TokenKind::Integer => {
                let n: BigInt = value.value.parse().expect("validated by self-check");
                Expr::Rational(BigRational::from_integer(n))
            }
            TokenKind::NativeIrrationalNumber => {
                if value.value == "\u{3c0}" {
                    Expr::Var(Atom::Pi)
                } else {
                    Expr::Var(Atom::E)
                }
            }
            TokenKind::ShortCustomIrrational => {
                Expr::Var(Atom::Short(value.value.chars().next().unwrap_or('?')))
            }
            TokenKind::LongCustomIrrational => {
                let name = value
                    .value
                    .strip_prefix('<')
                    .and_then(|s| s.strip_suffix('>'))
                    .unwrap_or(&value.value)
                    .to_string();
                Expr::Var(Atom::Long(name))
            }
            _ => unreachable!("literal nodes only hold number/irrational tokens"),
        };
        if let (Expr::Var(atom), Some(p)) = (&expr, param) {
            self.params.insert(atom.key(), p.value.clone());
        }
        expr
    }

    fn dispatch_binary(&self, op: &str, l: Expr, r: Expr) -> Result<Expr, KernelError> {
        match BinOp::from_symbol(op) {
            Some(BinOp::Add) => kernel::add(l, r),
            Some(BinOp::Sub) => kernel::sub(l, r),
            Some(BinOp::Mul) => kernel::mul(l, r),
            Some(BinOp::Div) => kernel::div(l, r),
            Some(BinOp::Rem) => kernel::rem(l, r),
            Some(BinOp::Pow) => kernel::pow_symbolic(l, r),
            None => Err(KernelError::UnsupportedFunction(op.to_string())),
        }
    }

    fn dispatch_unary(&self, op: &str, position: UnaryPosition, child: Expr) -> Result<Expr, KernelError> {
        match (op, position) {
            ("+", UnaryPosition::Prefix) => Ok(child),
            ("-", UnaryPosition::Prefix) => Ok(child.negate()),
            ("\u{221a}", UnaryPosition::Prefix) => kernel::sqrt(child),
            ("|", UnaryPosition::Enclosing) => kernel::abs(child),
            ("!", UnaryPosition::Postfix) => kernel::factorial_of(child),
            ("\u{b0}", UnaryPosition::Postfix) => kernel::degrees_to_radians(child),
            (other, _) => Err(KernelError::UnsupportedFunction(other.to_string())),
        }
    }

    fn dispatch_call(&self, name: &str, mut args: Vec<Expr>) -> Result<Expr, KernelError> {
        if args.len() == 1 {
            let x = args.remove(0);
            return match name {
                "sqrt" => kernel::sqrt(x),
                "sq" => kernel::sq(x),
                "cub" => kernel::cub(x),
                "rec" => kernel::rec(x),
                "fact" => kernel::factorial_of(x),
                "abs" => kernel::abs(x),
                "sign" => kernel::sign(x),
                "log" => kernel::log10(x),
                "ln" => kernel::ln(x),
                "lg" => kernel::lg(x),
                "exp" => kernel::exp(x),
                "sin" => kernel::sin(x),
                "cos" => kernel::cos(x),
                "tan" => kernel::tan(x),
                "cot" => kernel::cot(x),
                "asin" => kernel::asin(x),
                "acos" => kernel::acos(x),
                "atan" => kernel::atan(x),
                "acot" => kernel::acot(x),
                other => Err(KernelError::UnsupportedFunction(other.to_string())),
            };
        }
        if args.len() == 2 {
            let b = args.remove(1);
            let a = args.remove(0);
            return match name {
                "gcd" => kernel::gcd(a, b),
                "lcm" => kernel::lcm(a, b),
                "mod" => kernel::rem(a, b),
                other => Err(KernelError::UnsupportedFunction(other.to_string())),
            };
        }
        Err(KernelError::UnsupportedFunction(name.to_string()))
    }

    /// Re-serialize the whole tree with everything already reduced in
    /// `simplified` shown as its reduced form, and everything else shown in
    /// its original source shape — a snapshot of the pipeline's current
    /// progress through the expression.
    fn render(&self, id: NodeId, parent_prec: u8) -> String {
        if let Some(e) = &self.simplified[id] {
            return e.render_child(parent_prec);
        }
        let node = self.ast.get(id);
        match &node.kind {
            NodeKind::Literal { value, irrational_param } => {
                let mut s = value.value.clone();
                if let Some(p) = irrational_param {
                    s.push_str(&p.value);
                }
                s
            }
            NodeKind::Group { child } => self.render(*child, parent_prec),
            NodeKind::Binary { op, lhs, rhs } => {
                let prec = BinOp::from_symbol(&op.value).map(|b| b.precedence()).unwrap_or(0);
                let left_assoc = BinOp::from_symbol(&op.value)
                    .map(|b| b.is_left_associative())
                    .unwrap_or(true);
                let lhs_str = self.render(*lhs, prec);
                let rhs_prec = if left_assoc { prec + 1 } else { prec };
                let rhs_str = self.render(*rhs, rhs_prec);
                let text = format!("{lhs_str}{}{rhs_str}", op.value);
                wrap_if(text, prec, parent_prec)
            }
            NodeKind::Unary { op, child, position } => match position {
                UnaryPosition::Prefix => {
                    let child_prec = BinOp::Pow.precedence() + 1;
                    let text = format!("{}{}", op.value, self.render(*child, child_prec));
                    wrap_if(text, 0, parent_prec)
                }
                UnaryPosition::Postfix => {
                    let text = format!("{}{}", self.render(*child, 100), op.value);
                    wrap_if(text, 100, parent_prec)
                }
                UnaryPosition::Enclosing => format!("|{}|", self.render(*child, 0)),
            },
            NodeKind::FunctionCall { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| self.render(*a, 0)).collect();
                format!("{}({})", name.value, rendered.join(","))
            }
        }
    }
}

fn wrap_if(text: String, own_prec: u8, parent_prec: u8) -> String {
    if own_prec < parent_prec {
        format!("({text})")
    } else {
        text
    }
}

fn attach(err: KernelError, expression: &str, pos: usize, info: Option<String>) -> CalcError {
    let calc_err: CalculationError = match err {
        KernelError::DivideByZero => {
            CalculationError::divide_by_zero(expression.to_string(), vec![pos], None, None)
        }
        KernelError::ZeroToThePowerOfZero => {
            CalculationError::zero_to_the_power_of_zero(expression.to_string(), vec![pos], None, None)
        }
        KernelError::DomainError(hint) => CalculationError::domain_error(
            expression.to_string(),
            vec![pos],
            hint.or(info),
            None,
        ),
        KernelError::UnsupportedFunction(name) => CalculationError::unsupported_function(
            expression.to_string(),
            vec![pos],
            Some(name),
            None,
        ),
    };
    calc_err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oloc_lex::{default_function_table, Lexer};

    fn eval(s: &str) -> Expr {
        let table = default_function_table();
        let tokens = Lexer::new(&table).tokenize(s).unwrap();
        let ast = oloc_par::parse(tokens).unwrap();
        evaluate(&ast).unwrap().value
    }

    #[test]
    fn simple_addition() {
        assert_eq!(eval("1+2"), Expr::integer(BigInt::from(3)));
    }

    #[test]
    fn precedence_respected() {
        assert_eq!(eval("2+3*4"), Expr::integer(BigInt::from(14)));
    }

    #[test]
    fn fraction_reduces() {
        assert_eq!(eval("4/8"), Expr::Rational(BigRational::new(BigInt::from(1), BigInt::from(2))));
    }

    #[test]
    fn sqrt_of_perfect_square() {
        assert_eq!(eval("sqrt(9)"), Expr::integer(BigInt::from(3)));
    }

    #[test]
    fn gcd_function() {
        assert_eq!(eval("gcd(12,18)"), Expr::integer(BigInt::from(6)));
    }

    #[test]
    fn degrees_to_pi_fraction() {
        let result = eval("90\u{b0}");
        let expected = Expr::Coeff(BigRational::new(BigInt::from(1), BigInt::from(2)), Atom::Pi);
        assert_eq!(result, expected);
    }

    #[test]
    fn steps_are_recorded_and_deduplicated() {
        let table = default_function_table();
        let tokens = Lexer::new(&table).tokenize("1+2*3").unwrap();
        let ast = oloc_par::parse(tokens).unwrap();
        let outcome = evaluate(&ast).unwrap();
        assert!(!outcome.steps.is_empty());
        assert_eq!(outcome.steps.last().unwrap().rendering, outcome.value.to_string());
    }

    #[test]
    fn division_by_zero_errors() {
        let table = default_function_table();
        let tokens = Lexer::new(&table).tokenize("1/0").unwrap();
        let ast = oloc_par::parse(tokens).unwrap();
        assert!(evaluate(&ast).is_err());
    }
}
