//! The abstract syntax tree (§3, §9): a small closed set of node kinds held
//! in an arena indexed by integers, with parent links stored as indices so
//! ascent during re-serialization never needs an owned back-reference.

use oloc_lex::Token;
use oloc_util::{define_idx, IndexVec};

define_idx!(NodeId);

/// Where an operator token sits relative to its single operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryPosition {
    Prefix,
    Postfix,
    /// `|expr|`: the operator token is the opening bar; the closing bar is
    /// consumed by the parser but not retained on the node.
    Enclosing,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Literal {
        value: Token,
        irrational_param: Option<Token>,
    },
    Group {
        child: NodeId,
    },
    Binary {
        op: Token,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: Token,
        child: NodeId,
        position: UnaryPosition,
    },
    FunctionCall {
        name: Token,
        args: Vec<NodeId>,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// The parsed tree: an arena of nodes plus the root's index. Freed wholesale
/// when dropped at the end of a calculation.
#[derive(Clone, Debug)]
pub struct Ast {
    pub nodes: IndexVec<NodeId, Node>,
    pub root: NodeId,
    /// The rendered token stream this tree was parsed from, kept for
    /// diagnostics raised by later passes (e.g. the post-build check).
    pub expression: String,
}

impl Ast {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}
