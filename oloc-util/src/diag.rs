//! Diagnostic infrastructure: a small fluent assembler in the spirit of the
//! teacher's `DiagnosticBuilder`, plus the five `thiserror`-derived error
//! families named in the error-handling design (one family per stage
//! concern: syntax, value, calculation, conversion, timeout).
//!
//! Every error carries a canonical message template, a marker-line of `^`
//! over the offending expression, and a hint — matching the reference
//! implementation's exception taxonomy rather than a generic `anyhow`-style
//! string.

use std::fmt;

/// A rendered diagnostic: template already filled in with `primary_info` /
/// `secondary_info`, plus the positions to underline and a hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind_name: &'static str,
    pub expression: String,
    pub positions: Vec<usize>,
    pub hint: &'static str,
    pub primary_info: Option<String>,
    pub secondary_info: Option<String>,
    message: String,
}

impl Diagnostic {
    pub fn new(
        kind_name: &'static str,
        template: &str,
        hint: &'static str,
        expression: impl Into<String>,
        positions: Vec<usize>,
        primary_info: Option<String>,
        secondary_info: Option<String>,
    ) -> Self {
        let expression = expression.into();
        let mut message = template.to_string();
        if let Some(p) = &primary_info {
            message = message.replace("{primary_info}", p);
        }
        if let Some(s) = &secondary_info {
            message = message.replace("{secondary_info}", s);
        }
        Self {
            kind_name,
            expression,
            positions,
            hint,
            primary_info,
            secondary_info,
            message,
        }
    }

    /// A line of spaces with `^` under each recorded position.
    pub fn marker_line(&self) -> String {
        let width = self.expression.chars().count();
        let mut line = vec![' '; width];
        for &p in &self.positions {
            if p < width {
                line[p] = '^';
            }
        }
        line.into_iter().collect()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.expression.is_empty() {
            write!(f, "\n  {}\n  {}", self.expression, self.marker_line())?;
        }
        write!(f, "\nhint: {}", self.hint)
    }
}

macro_rules! error_family {
    ($enum_name:ident { $($variant:ident($ctor:ident, $kind_name:literal, $template:literal, $hint:literal)),* $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $enum_name {
            $(
                #[error("{0}")]
                $variant(Diagnostic),
            )*
        }

        impl $enum_name {
            $(
                pub fn $ctor(
                    expression: impl Into<String>,
                    positions: Vec<usize>,
                    primary_info: Option<String>,
                    secondary_info: Option<String>,
                ) -> Self {
                    $enum_name::$variant(Diagnostic::new(
                        $kind_name, $template, $hint, expression, positions, primary_info, secondary_info,
                    ))
                }
            )*

            /// The stable, programmatic name of this error's kind.
            pub fn kind_name(&self) -> &'static str {
                match self {
                    $($enum_name::$variant(d) => d.kind_name,)*
                }
            }

            pub fn diagnostic(&self) -> &Diagnostic {
                match self {
                    $($enum_name::$variant(d) => d,)*
                }
            }
        }
    };
}

error_family!(SyntaxError {
    CommentMismatch(comment_mismatch, "COMMENT_MISMATCH",
        "unmatched comment delimiter '#'", "remove the stray '#' or add its matching pair"),
    LeftBracketMismatch(left_bracket_mismatch, "LEFT_BRACKET_MISMATCH",
        "unmatched left bracket '{primary_info}'", "add the matching closing bracket"),
    RightBracketMismatch(right_bracket_mismatch, "RIGHT_BRACKET_MISMATCH",
        "unmatched right bracket '{primary_info}'", "add the matching opening bracket"),
    BracketHierarchyError(bracket_hierarchy_error, "BRACKET_HIERARCHY_ERROR",
        "brackets nested out of priority order", "nest brackets as {{ [ ( ) ] }}"),
    IrrationalBracketMismatch(irrational_bracket_mismatch, "IRRATIONAL_BRACKET_MISMATCH",
        "unmatched long-custom-irrational bracket '<' or '>'", "every '<' must be closed by a matching '>'"),
    IrrationalParamError(irrational_param_error, "IRRATIONAL_PARAM_ERROR",
        "malformed irrational parameter", "an irrational parameter must be a numeric tag ending in '?'"),
    NumericSeparatorError(numeric_separator_error, "NUMERIC_SEPARATOR_ERROR",
        "digit separator ',' must sit between two digits", "remove the stray separator"),
    FunctionMisplacement(function_misplacement, "FUNCTION_MISPLACEMENT",
        "function name '{primary_info}' must be followed by '('", "write '{primary_info}(...)'"),
    FunctionSeparatorOutside(function_separator_outside, "FUNCTION_SEPARATOR_OUTSIDE",
        "';' used outside of a function call", "use ',' to separate arguments instead"),
    FunctionParamSeparatorError(function_param_separator_error, "FUNCTION_PARAM_SEPARATOR_ERROR",
        "misplaced parameter separator", "separators must sit between complete arguments"),
    FunctionParamCountError(function_param_count_error, "FUNCTION_PARAM_COUNT_ERROR",
        "function '{primary_info}' expects {secondary_info} argument(s)", "check the function's arity"),
    PrefixOperatorMisplacement(prefix_operator_misplacement, "PREFIX_OPERATOR_MISPLACEMENT",
        "operator '{primary_info}' cannot appear here as a prefix", "a prefix operator must precede an operand"),
    PostfixOperatorMisplacement(postfix_operator_misplacement, "POSTFIX_OPERATOR_MISPLACEMENT",
        "operator '{primary_info}' cannot appear here as a postfix", "a postfix operator must follow an operand"),
    BinaryOperatorMisplacement(binary_operator_misplacement, "BINARY_OPERATOR_MISPLACEMENT",
        "operator '{primary_info}' needs operands on both sides", "add the missing operand"),
    EnclosingOperatorMisplacement(enclosing_operator_misplacement, "ENCLOSING_OPERATOR_MISPLACEMENT",
        "'|' must enclose a complete expression", "close the absolute-value pair with a matching '|'"),
    EqualSignMisplacement(equal_sign_misplacement, "EQUAL_SIGN_MISPLACEMENT",
        "'=' may only trail the whole expression", "remove the extra '='"),
    GroupExpressionError(group_expression_error, "GROUP_EXPRESSION_ERROR",
        "a grouped expression must have exactly one child", "check the parentheses"),
    BinaryExpressionError(binary_expression_error, "BINARY_EXPRESSION_ERROR",
        "a binary expression must have exactly two operands", "check the expression around '{primary_info}'"),
    UnaryExpressionError(unary_expression_error, "UNARY_EXPRESSION_ERROR",
        "a unary expression must have exactly one operand", "check the expression around '{primary_info}'"),
    ReservedWordConflict(reserved_word_conflict, "RESERVED_WORD_CONFLICT",
        "'{primary_info}' conflicts with a reserved word", "choose a different custom irrational name"),
    AbsoluteSymbolMismatch(absolute_symbol_mismatch, "ABSOLUTE_SYMBOL_MISMATCH",
        "unmatched absolute-value bar '|'", "add the matching closing '|'"),
    DotSyntaxError(dot_syntax_error, "DOT_SYNTAX_ERROR",
        "'.' is only valid inside a decimal literal", "remove the stray '.'"),
    ColonSyntaxError(colon_syntax_error, "COLON_SYNTAX_ERROR",
        "':' is only valid after a decimal point in a recurring decimal", "remove the stray ':'"),
    UnexpectedBracket(unexpected_bracket, "UNEXPECTED_BRACKET",
        "unexpected bracket '{primary_info}'", "check bracket balance around this position"),
    UnexpectedOperator(unexpected_operator, "UNEXPECTED_OPERATOR",
        "unexpected operator '{primary_info}'", "check the expression around this position"),
    UnexpectedTokenType(unexpected_token_type, "UNEXPECTED_TOKEN_TYPE",
        "unexpected token type at this position", "check the expression around this position"),
});

error_family!(ValueError {
    InvalidInteger(invalid_integer, "INVALID_INTEGER",
        "'{primary_info}' is not a valid integer", "integers may only contain digits and an optional leading sign"),
    InvalidFiniteDecimal(invalid_finite_decimal, "INVALID_FINITE_DECIMAL",
        "'{primary_info}' is not a valid decimal", "a decimal must have digits on both sides of '.'"),
    InvalidInfiniteDecimal(invalid_infinite_decimal, "INVALID_INFINITE_DECIMAL",
        "'{primary_info}' is not a valid recurring decimal", "a recurring decimal needs a repeating part"),
    InvalidPercentage(invalid_percentage, "INVALID_PERCENTAGE",
        "'{primary_info}' is not a valid percentage", "a percentage must be a number followed by '%'"),
    InvalidNativeIrrational(invalid_native_irrational, "INVALID_NATIVE_IRRATIONAL",
        "'{primary_info}' is not a recognized native irrational", "native irrationals are 'π' and '𝑒'"),
    InvalidShortCustomIrrational(invalid_short_custom_irrational, "INVALID_SHORT_CUSTOM_IRRATIONAL",
        "'{primary_info}' is not a valid short custom irrational", "a short custom irrational is a single non-reserved character"),
    InvalidLongCustomIrrational(invalid_long_custom_irrational, "INVALID_LONG_CUSTOM_IRRATIONAL",
        "'{primary_info}' is not a valid long custom irrational", "a long custom irrational must be wrapped as '<name>'"),
    InvalidOperator(invalid_operator, "INVALID_OPERATOR",
        "'{primary_info}' is not a recognized operator", "check the operator table"),
    InvalidBracket(invalid_bracket, "INVALID_BRACKET",
        "'{primary_info}' is not a recognized bracket", "use '(', '[', '{{' or their matching closers"),
    InvalidFunction(invalid_function, "INVALID_FUNCTION",
        "'{primary_info}' is not a recognized function name", "check the function-alias table"),
    InvalidParamSeparator(invalid_param_separator, "INVALID_PARAM_SEPARATOR",
        "'{primary_info}' is not a valid parameter separator", "use ',' between arguments"),
    InvalidIrrationalParam(invalid_irrational_param, "INVALID_IRRATIONAL_PARAM",
        "'{primary_info}' is not a valid irrational parameter", "an irrational parameter is digits ending in '?'"),
    UnknownToken(unknown_token, "UNKNOWN_TOKEN",
        "'{primary_info}' could not be classified", "remove or replace the unrecognized character"),
    NotInDomain(not_in_domain, "NOT_IN_DOMAIN",
        "'{primary_info}' is not in the domain of this operation", "check the operand's range"),
});

error_family!(CalculationError {
    DivideByZero(divide_by_zero, "DIVIDE_BY_ZERO",
        "division by zero", "ensure the divisor is non-zero"),
    ZeroToThePowerOfZero(zero_to_the_power_of_zero, "ZERO_TO_THE_POWER_OF_ZERO",
        "0^0 is undefined", "ensure the base or exponent is non-zero"),
    DomainError(domain_error, "DOMAIN_ERROR",
        "'{primary_info}' is outside the function's domain", "check the operand's range"),
    UnsupportedOperator(unsupported_operator, "UNSUPPORTED_OPERATOR",
        "operator '{primary_info}' is not supported in evaluation", "check the operator table"),
    UnsupportedFunction(unsupported_function, "UNSUPPORTED_FUNCTION",
        "function '{primary_info}' is not supported in evaluation", "check the function-alias table"),
});

error_family!(ConversionError {
    MissingParam(missing_param, "MISSING_PARAM",
        "custom irrational '{primary_info}' has no attached parameter", "attach a numeric parameter before converting to a float"),
    NativeParam(native_param, "NATIVE_PARAM",
        "native irrational '{primary_info}' cannot carry a parameter", "remove the parameter from the native irrational"),
});

error_family!(TimeoutError {
    Timeout(timeout, "TIMEOUT",
        "calculation exceeded its time limit of {primary_info}ms", "increase the time limit or simplify the expression"),
});

/// The umbrella error returned from the public entry point, matching the
/// teacher's pattern of composing per-crate error enums into one error at
/// the driver boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CalcError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

impl CalcError {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CalcError::Syntax(e) => e.kind_name(),
            CalcError::Value(e) => e.kind_name(),
            CalcError::Calculation(e) => e.kind_name(),
            CalcError::Conversion(e) => e.kind_name(),
            CalcError::Timeout(e) => e.kind_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_line_underlines_positions() {
        let d = Diagnostic::new("X", "oops", "fix it", "1+2", vec![1], None, None);
        assert_eq!(d.marker_line(), " ^ ");
    }

    #[test]
    fn template_substitutes_primary_info() {
        let e = SyntaxError::function_misplacement("sin1+2", vec![0, 1, 2], Some("sin".into()), None);
        assert!(e.to_string().contains("function 'sin' must be followed by '('"));
        assert_eq!(e.kind_name(), "FUNCTION_MISPLACEMENT");
    }

    #[test]
    fn calc_error_from_conversions() {
        let e: CalcError = CalculationError::divide_by_zero("5/0", vec![2], None, None).into();
        assert_eq!(e.kind_name(), "DIVIDE_BY_ZERO");
    }
}
