use pretty_assertions::assert_eq;

use super::parse_err;

#[test]
fn keywords_cannot_be_assigned() {
    for source in ["class = 1", "for = 1", "if = 1", "raise = 1", "def = 2", "print = 3"] {
        parse_err(source);
    }
}

#[test]
fn malformed_numbers_and_names() {
    for source in ["1x = 1", "1.x = 1", "1_x = 1", "x = 1.A", "x = A.2"] {
        parse_err(source);
    }
}

#[test]
fn dangling_operator() {
    let err = parse_err("x = (1/*)");
    assert_eq!(err.message, "invalid syntax: unexpected `*`");
    assert_eq!((err.line, err.column), (1, 8));
}

#[test]
fn error_location_is_one_based() {
    let err = parse_err("a = 1\nb = = 2\n");
    assert_eq!(err.location().line, 2);
    assert_eq!(err.location().column, 5);
    assert!(err.to_string().ends_with("(line 2, column 5)"));
}

#[test]
fn invalid_assignment_targets() {
    assert_eq!(parse_err("1 = x").message, "cannot assign to literal");
    assert_eq!(parse_err("f() = x").message, "cannot assign to function call");
    assert_eq!(parse_err("a + b = x").message, "cannot assign to operator");
    assert_eq!(
        parse_err("(a, b) += 1").message,
        "tuple is an illegal expression for augmented assignment"
    );
    assert_eq!(parse_err("del 3").message, "cannot delete literal");
    assert_eq!(parse_err("for 1 in x: pass").message, "cannot assign to literal");
}

#[test]
fn control_flow_outside_its_context() {
    assert_eq!(parse_err("break").message, "'break' outside loop");
    assert_eq!(parse_err("continue").message, "'continue' not properly in loop");
    assert_eq!(parse_err("return 1").message, "'return' outside function");
    assert_eq!(
        parse_err("for x in y:\n    def f():\n        break\n").message,
        "'break' outside loop"
    );
}

#[test]
fn parameter_list_errors() {
    assert_eq!(
        parse_err("def f(a=1, b): pass").message,
        "non-default argument follows default argument"
    );
    assert_eq!(
        parse_err("def f(a, a): pass").message,
        "duplicate argument 'a' in function definition"
    );
    assert_eq!(
        parse_err("def f(*args, b): pass").message,
        "keyword-only parameters are not supported"
    );
}

#[test]
fn call_argument_order_errors() {
    assert_eq!(
        parse_err("f(a=1, 2)").message,
        "positional argument follows keyword argument"
    );
    assert_eq!(parse_err("f(a=1, a=2)").message, "keyword argument repeated: a");
}

#[test]
fn indentation_errors() {
    assert_eq!(parse_err("  x = 1").message, "unexpected indent");
    assert_eq!(parse_err("if x:\ny = 1\n").message, "expected an indented block");
    assert_eq!(
        parse_err("if x:\n    y = 1\n  z = 2\n").message,
        "unindent does not match any outer indentation level"
    );
}

#[test]
fn lexical_errors_surface_as_parse_errors() {
    assert_eq!(parse_err("s = 'open").message, "unterminated string literal");
    assert_eq!(parse_err("x = 1 $ 2").message, "invalid character `$` in source");
}

#[test]
fn try_requires_a_handler() {
    parse_err("try:\n    x = 1\ny = 2\n");
}

#[test]
fn unclosed_bracket() {
    parse_err("x = [1, 2");
}
