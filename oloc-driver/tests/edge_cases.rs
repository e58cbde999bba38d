use oloc_driver::calculate;

fn eval(expression: &str) -> String {
    calculate(expression, None)
        .unwrap_or_else(|e| panic!("{expression} failed to evaluate: {e}"))
        .final_result()
        .to_string()
}

fn eval_err(expression: &str) -> String {
    calculate(expression, None)
        .err()
        .unwrap_or_else(|| panic!("{expression} was expected to fail"))
        .kind_name()
        .to_string()
}

#[test]
fn empty_expression_is_zero() {
    assert_eq!(eval(""), "0");
}

#[test]
fn lone_bar_is_absolute_symbol_mismatch() {
    assert_eq!(eval_err("|"), "ABSOLUTE_SYMBOL_MISMATCH");
}

#[test]
fn recurring_decimal_nines_rounds_up() {
    assert_eq!(eval("0.9..."), "1");
}

#[test]
fn percentage_reduces_to_exact_fraction() {
    assert_eq!(eval("100%"), "1");
}

#[test]
fn large_factorial_does_not_overflow() {
    let result = eval("fact(30)");
    assert_eq!(result, "265252859812191058636308480000000");
}

#[test]
fn arithmetic_scenarios() {
    let cases: &[(&str, &str)] = &[
        ("1+2", "3"),
        ("2*3+4", "10"),
        ("2*(3+4)", "14"),
        ("(1+2)*(3-1)", "6"),
        ("-2^2", "4"),
        ("2^3^2", "512"),
        ("1/2+1/3", "5/6"),
        ("10/4", "5/2"),
        ("sqrt(16)", "4"),
        ("sqrt(2)^2", "2"),
        ("gcd(12,18)", "6"),
        ("lcm(4,6)", "12"),
        ("|-5|", "5"),
        ("sign(-3)", "-1"),
        ("45deg", "\u{3c0}/4"),
        ("sin(\u{3c0}/6)", "1/2"),
        ("cos(0)", "1"),
        ("ln(1)", "0"),
        ("exp(ln(7))", "7"),
    ];
    for (input, expected) in cases {
        assert_eq!(&eval(input), expected, "evaluating {input}");
    }
}

#[test]
fn error_scenarios() {
    let cases: &[(&str, &str)] = &[
        ("5/0", "DIVIDE_BY_ZERO"),
        ("0^0", "ZERO_TO_THE_POWER_OF_ZERO"),
        ("(1+2", "LEFT_BRACKET_MISMATCH"),
        ("1+2)", "RIGHT_BRACKET_MISMATCH"),
        ("fact(-1)", "DOMAIN_ERROR"),
        ("sqrt(16,4)", "FUNCTION_PARAM_COUNT_ERROR"),
    ];
    for (input, expected_kind) in cases {
        assert_eq!(&eval_err(input), expected_kind, "evaluating {input}");
    }
}

#[test]
fn step_list_starts_with_input_and_ends_with_final_result() {
    let result = calculate("1+2*3", None).unwrap();
    assert_eq!(result.steps().first().unwrap(), "1+2*3");
    assert_eq!(result.steps().last().unwrap(), result.final_result());
}

#[test]
fn reserved_symbol_detection() {
    assert!(oloc_driver::is_reserved("plus"));
    assert!(oloc_driver::is_reserved("<__reserved_x>"));
    assert!(!oloc_driver::is_reserved("zeta"));
}

#[test]
fn version_matches_cargo_manifest() {
    assert_eq!(oloc_driver::version(), env!("CARGO_PKG_VERSION"));
}
