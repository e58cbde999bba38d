//! The token vocabulary (§6: a closed set of token kinds) and the `Token`
//! value type itself.

use oloc_util::Span;
use std::fmt;

/// The closed set of token kinds that can appear in a stage's token flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    FiniteDecimal,
    InfiniteRecurringDecimal,
    Percentage,
    NativeIrrationalNumber,
    ShortCustomIrrational,
    LongCustomIrrational,
    IrrationalParam,
    Operator,
    LeftBracket,
    RightBracket,
    Function,
    ParameterSeparator,
    Unknown,
}

impl TokenKind {
    pub fn is_irrational(&self) -> bool {
        matches!(
            self,
            TokenKind::NativeIrrationalNumber
                | TokenKind::ShortCustomIrrational
                | TokenKind::LongCustomIrrational
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::FiniteDecimal
                | TokenKind::InfiniteRecurringDecimal
                | TokenKind::Percentage
        )
    }

    /// Kinds whose adjacent same-kind characters merge into one token during
    /// the lexer's mark-then-merge pass.
    pub fn is_merge_eligible(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::FiniteDecimal
                | TokenKind::InfiniteRecurringDecimal
                | TokenKind::Percentage
                | TokenKind::LongCustomIrrational
                | TokenKind::IrrationalParam
                | TokenKind::Function
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Integer => "Integer",
            TokenKind::FiniteDecimal => "FiniteDecimal",
            TokenKind::InfiniteRecurringDecimal => "InfiniteRecurringDecimal",
            TokenKind::Percentage => "Percentage",
            TokenKind::NativeIrrationalNumber => "NativeIrrationalNumber",
            TokenKind::ShortCustomIrrational => "ShortCustomIrrational",
            TokenKind::LongCustomIrrational => "LongCustomIrrational",
            TokenKind::IrrationalParam => "IrrationalParam",
            TokenKind::Operator => "Operator",
            TokenKind::LeftBracket => "LeftBracket",
            TokenKind::RightBracket => "RightBracket",
            TokenKind::Function => "Function",
            TokenKind::ParameterSeparator => "ParameterSeparator",
            TokenKind::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// One lexeme: a kind, the source substring it covers, its range, and a
/// validity flag set by the kind-specific self-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
    pub valid: bool,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
            valid: true,
        }
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Concatenate the token stream's values back into a single string — the
/// lexer invariant that a round trip through tokenization never loses text.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.value.as_str()).collect()
}

/// Recompute monotonically non-decreasing ranges for a freshly rebuilt token
/// stream (used whenever a rewrite changes the expression's length).
pub fn renumber(tokens: &mut [Token]) {
    let mut offset = 0usize;
    for tok in tokens.iter_mut() {
        let len = tok.value.chars().count();
        tok.span = Span::new(offset, offset + len);
        offset += len;
    }
}
