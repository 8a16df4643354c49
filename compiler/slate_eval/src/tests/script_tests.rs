//! End-to-end script tests: small programs run through `interp`, checked
//! through the symbol table, the returned value and captured output.

use super::{global, quiet_session};
use crate::errors::ErrorKind;
use crate::value::Value;

fn run(source: &str) -> Value {
    let mut session = quiet_session();
    match session.interp(source) {
        Ok(value) => value,
        Err(err) => panic!("{source:?} failed: {err}"),
    }
}

fn failure(source: &str) -> ErrorKind {
    let mut session = quiet_session();
    match session.interp(source) {
        Ok(value) => panic!("{source:?} unexpectedly gave {value:?}"),
        Err(err) => err.kind(),
    }
}

const FCN: &str = "\
def fcn(x, scale=2, **kws):
    \"Scaled square root.\"
    if scale > 1:
        return sqrt(x) * scale
    return sqrt(x)
";

mod loop_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn while_counts_up() {
        let mut session = quiet_session();
        session.interp("n = 0\nwhile n < 8:\n    n += 1").unwrap();
        assert_eq!(global(&session, "n"), Value::Int(8));
    }

    #[test]
    fn for_over_range_sums() {
        let mut session = quiet_session();
        session.interp("n = 0\nfor i in range(10):\n    n += i").unwrap();
        assert_eq!(global(&session, "n"), Value::Int(45));
    }

    #[test]
    fn else_runs_only_without_break() {
        let source = "\
found = None
for v in [3, 5, 8, 9]:
    if v % 2 == 0:
        found = v
        break
else:
    found = -1
missing = 0
for v in [1, 3]:
    if v > 5:
        break
else:
    missing = 1
";
        let mut session = quiet_session();
        session.interp(source).unwrap();
        assert_eq!(global(&session, "found"), Value::Int(8));
        assert_eq!(global(&session, "missing"), Value::Int(1));
    }

    #[test]
    fn continue_skips_the_rest_of_the_body() {
        let source = "\
total = 0
i = 0
while i < 6:
    i += 1
    if i % 2:
        continue
    total += i
total
";
        assert_eq!(run(source), Value::Int(12));
    }

    #[test]
    fn tuple_targets_unpack() {
        let source = "\
pairs = {}
for k, v in [('a', 1), ('b', 2)]:
    pairs[k] = v * 10
pairs['b']
";
        assert_eq!(run(source), Value::Int(20));
        assert_eq!(failure("a, b = [1, 2, 3]"), ErrorKind::ValueError);
    }

    #[test]
    fn comprehension_filters_and_does_not_leak() {
        let mut session = quiet_session();
        let value = session.interp("[i * i for i in range(5) if i % 2 == 0]").unwrap();
        assert_eq!(value.repr(), "[0, 4, 16]");
        assert_eq!(session.interp("i").unwrap_err().kind(), ErrorKind::NameError);
        let nested = session
            .interp("[(a, b) for a in range(3) for b in range(a)]")
            .unwrap();
        assert_eq!(nested.repr(), "[(1, 0), (2, 0), (2, 1)]");
    }
}

mod procedure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyword_and_default_arguments() {
        assert_eq!(run(&format!("{FCN}fcn(4, scale=9)")), Value::Float(18.0));
        assert_eq!(run(&format!("{FCN}fcn(9, scale=0)")), Value::Float(3.0));
        assert_eq!(run(&format!("{FCN}fcn(16)")), Value::Float(8.0));
        assert_eq!(run(&format!("{FCN}fcn(4, extra=1, scale=3)")), Value::Float(6.0));
    }

    #[test]
    fn missing_argument_is_a_type_error() {
        assert_eq!(failure(&format!("{FCN}fcn()")), ErrorKind::TypeError);
        assert_eq!(failure(&format!("{FCN}fcn(1, 2, 3)")), ErrorKind::TypeError);
    }

    #[test]
    fn printing_a_procedure_shows_its_signature() {
        let mut session = quiet_session();
        session.interp(&format!("{FCN}print fcn")).unwrap();
        assert_eq!(
            session.output(),
            "<Procedure fcn(x, scale=2, **kws)>\n  Scaled square root.\n"
        );
        assert_eq!(
            session.interp("fcn.doc").unwrap(),
            Value::str("Scaled square root.")
        );
    }

    #[test]
    fn closures_see_their_defining_scope() {
        let source = "\
def make(k):
    def add(v):
        return v + k
    return add
add3 = make(3)
add10 = make(10)
add3(4) + add10(1)
";
        assert_eq!(run(source), Value::Int(18));
    }

    #[test]
    fn global_declaration_writes_the_global_scope() {
        let source = "\
count = 0
def bump():
    global count
    count += 1
bump()
bump()
count
";
        assert_eq!(run(source), Value::Int(2));
    }

    #[test]
    fn augmented_assignment_needs_a_local_binding() {
        assert_eq!(failure("count = 0\ndef bump():\n    count += 1\nbump()"), ErrorKind::NameError);
        assert_eq!(run("def f(n):\n    n += 1\n    return n\nf(4)"), Value::Int(5));
        assert_eq!(run("n = 1\nn += 1\nn"), Value::Int(2));
    }

    #[test]
    fn locals_do_not_escape() {
        let mut session = quiet_session();
        session
            .interp("def f():\n    inner = 1\n    return inner\nf()")
            .unwrap();
        assert!(!session.symtable().contains("inner"));
    }

    #[test]
    fn lambdas_and_collectors() {
        assert_eq!(run("f = lambda x, y=2: x * y\nf(3)"), Value::Int(6));
        let source = "\
def pack(first, *rest, **named):
    return (first, rest, named)
pack(1, 2, 3, flag=True)
";
        assert_eq!(run(source).repr(), "(1, (2, 3), {'flag': True})");
        assert_eq!(run("def f(a, b):\n    return a - b\nf(*[5], **{'b': 2})"), Value::Int(3));
    }

    #[test]
    fn function_without_return_gives_none() {
        assert_eq!(run("def f():\n    x = 1\nf()"), Value::None);
    }

    #[test]
    fn lambda_from_a_comprehension_keeps_its_enclosing_call() {
        let source = "\
def f(a):
    return [lambda: a for i in [1]][0]
g = f(10)
def h(a):
    return g()
h(20)
";
        assert_eq!(run(source), Value::Int(10));
        assert_eq!(run("def f(a):\n    return [lambda: a for i in [1]][0]\ng = f(10)\ng()"), Value::Int(10));
    }

    #[test]
    fn returned_calls_with_recursive_helpers_are_reclaimed() {
        let source = "\
def outer(n):
    def helper(k):
        if k == 0:
            return 0
        return helper(k - 1) + 1
    return helper(n)
total = 0
for i in range(2000):
    total += outer(3)
";
        let mut session = quiet_session();
        session.interp(source).unwrap();
        assert_eq!(global(&session, "total"), Value::Int(6000));
        assert!(session.env.live_frames() < 300, "{} frames live", session.env.live_frames());

        session
            .interp("def f():\n    def g():\n        return 1\n    return g\nfor i in range(5000):\n    f()")
            .unwrap();
        assert!(session.env.live_frames() < 300, "{} frames live", session.env.live_frames());
    }

    #[test]
    fn closures_still_share_state_after_their_call_returns() {
        let source = "\
def counter():
    box = [0]
    def bump():
        box[0] += 1
        return box[0]
    return bump
c = counter()
for i in range(500):
    c()
c()
";
        assert_eq!(run(source), Value::Int(501));
    }
}

mod print_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_are_space_separated() {
        let mut session = quiet_session();
        session.interp("print 1, 'a', [2.5, 'b'], None").unwrap();
        assert_eq!(session.output(), "1 a [2.5, 'b'] None\n");
    }

    #[test]
    fn trailing_comma_continues_the_line() {
        let mut session = quiet_session();
        session.interp("print 'a',\nprint 'b'\nprint").unwrap();
        assert_eq!(session.output(), "a b\n\n");
    }

    #[test]
    fn parenthesized_form() {
        let mut session = quiet_session();
        session.interp("x = 3\nprint('x is', x)").unwrap();
        assert_eq!(session.output(), "x is 3\n");
    }
}

mod error_kind_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arithmetic_and_lookup_errors() {
        assert_eq!(failure("zero = 0\n1 / zero"), ErrorKind::ZeroDivisionError);
        assert_eq!(failure("zero = 0\n5 % zero"), ErrorKind::ZeroDivisionError);
        assert_eq!(failure("zero = 0\nzero + nonexistent_name"), ErrorKind::NameError);
        assert_eq!(failure("zero = 0\nzero + \"a string\""), ErrorKind::TypeError);
        assert_eq!(failure("\"a string\" * (\"a\", \"b\", 123)"), ErrorKind::TypeError);
    }

    #[test]
    fn attribute_errors() {
        assert_eq!(failure("a = arange(4)\na.color = 1"), ErrorKind::AttributeError);
        assert_eq!(failure("a = arange(4)\na.size = 1"), ErrorKind::AttributeError);
        assert_eq!(failure("[1].missing"), ErrorKind::AttributeError);
        assert_eq!(failure("(1).__class__"), ErrorKind::AttributeError);
    }

    #[test]
    fn keywords_are_not_targets() {
        assert_eq!(failure("class = 1"), ErrorKind::SyntaxError);
        assert_eq!(failure("for = 1"), ErrorKind::SyntaxError);
        assert_eq!(failure("if = 1"), ErrorKind::SyntaxError);
    }

    #[test]
    fn index_and_key_errors() {
        assert_eq!(failure("[1, 2][5]"), ErrorKind::IndexError);
        assert_eq!(failure("'ab'[-3]"), ErrorKind::IndexError);
        assert_eq!(failure("[1, 2]['a']"), ErrorKind::TypeError);
        assert_eq!(failure("{'a': 1}['b']"), ErrorKind::KeyError);
        assert_eq!(failure("t = (1, 2)\nt[0] = 5"), ErrorKind::TypeError);
    }

    #[test]
    fn control_flow_outside_its_context() {
        assert_eq!(failure("return 1"), ErrorKind::SyntaxError);
        assert_eq!(failure("break"), ErrorKind::SyntaxError);
    }

    #[test]
    fn oversized_format_fields_are_value_errors() {
        assert_eq!(failure("'{:>99999999999}'.format(1)"), ErrorKind::ValueError);
        assert_eq!(failure("'%099999999999d' % 1"), ErrorKind::ValueError);
        assert_eq!(failure("'{:.70000f}'.format(1.5)"), ErrorKind::ValueError);
        assert_eq!(failure("'%.70000e' % 1.5"), ErrorKind::ValueError);
        assert_eq!(failure("'%d' % 1e300"), ErrorKind::OverflowError);
    }

    #[test]
    fn array_in_a_comparison_chain_is_ambiguous() {
        assert_eq!(failure("1 < arange(5) < 3"), ErrorKind::ValueError);
        assert_eq!(run("(arange(5) < 3).tolist()").repr(), "[True, True, True, False, False]");
        assert_eq!(run("1 < 2 < 3"), Value::Bool(true));
        assert_eq!(run("3 < 2 < arange(5)"), Value::Bool(false));
    }
}

mod delete_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deleting_twice_is_a_name_error() {
        assert_eq!(failure("x = 1\ndel x\ndel x"), ErrorKind::NameError);
        assert_eq!(failure("del never_bound"), ErrorKind::NameError);
    }

    #[test]
    fn reassigning_after_delete() {
        assert_eq!(run("x = 1\ndel x\nx = 'new'\nx"), Value::str("new"));
    }

    #[test]
    fn deleting_items_and_slices() {
        assert_eq!(run("a = [0, 1, 2, 3, 4]\ndel a[1:3]\na").repr(), "[0, 3, 4]");
        assert_eq!(run("a = [0, 1, 2]\ndel a[-1]\na").repr(), "[0, 1]");
        assert_eq!(run("d = {'a': 1, 'b': 2}\ndel d['a']\nlen(d)"), Value::Int(1));
        assert_eq!(failure("d = {}\ndel d['a']"), ErrorKind::KeyError);
    }
}

mod evaluation_order_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRACE: &str = "\
seen = []
def mark(v):
    seen.append(v)
    return v
";

    #[test]
    fn or_and_short_circuit() {
        let mut session = quiet_session();
        session
            .interp(&format!("{TRACE}r1 = 1 or mark(2)\nr2 = 0 and mark(3)\nr3 = 0 or mark(4)"))
            .unwrap();
        assert_eq!(global(&session, "seen").repr(), "[4]");
        assert_eq!(global(&session, "r1"), Value::Int(1));
        assert_eq!(global(&session, "r2"), Value::Int(0));
        assert_eq!(global(&session, "r3"), Value::Int(4));
    }

    #[test]
    fn chained_comparison_evaluates_each_operand_once() {
        let mut session = quiet_session();
        session
            .interp(&format!("{TRACE}a = 1 < mark(5) < 3\nb = 9 < mark(6) < mark(7)"))
            .unwrap();
        assert_eq!(global(&session, "seen").repr(), "[5, 6]");
        assert_eq!(global(&session, "a"), Value::Bool(false));
        assert_eq!(global(&session, "b"), Value::Bool(false));
        assert_eq!(run("1 < 2 <= 2 < 3"), Value::Bool(true));
    }

    #[test]
    fn conditional_expression_evaluates_one_branch() {
        let mut session = quiet_session();
        session
            .interp(&format!("{TRACE}r = mark(1) if True else mark(2)"))
            .unwrap();
        assert_eq!(global(&session, "seen").repr(), "[1]");
    }
}

mod container_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positive_and_negative_indexing() {
        assert_eq!(run("[10, 20, 30][-1]"), Value::Int(30));
        assert_eq!(run("(10, 20, 30)[1]"), Value::Int(20));
        assert_eq!(run("'hello'[-5]"), Value::str("h"));
        assert_eq!(run("{'a': 1, -1: 'neg'}[-1]"), Value::str("neg"));
        assert_eq!(run("'hello'[1:4]"), Value::str("ell"));
        assert_eq!(run("[0, 1, 2, 3, 4, 5][::-2]").repr(), "[5, 3, 1]");
    }

    #[test]
    fn containers_are_shared_by_reference() {
        assert_eq!(run("a = [1]\nb = a\nb.append(2)\nlen(a)"), Value::Int(2));
        assert_eq!(run("a = [1]\nb = a\nb += [3]\na").repr(), "[1, 3]");
        assert_eq!(run("d = {}\ne = d\ne['k'] = 1\nd['k']"), Value::Int(1));
    }

    #[test]
    fn slice_assignment_resizes_lists() {
        assert_eq!(run("a = [0, 1, 2, 3]\na[1:3] = [9, 8, 7]\na").repr(), "[0, 9, 8, 7, 3]");
    }

    #[test]
    fn two_dimensional_array_block() {
        let mut session = quiet_session();
        session
            .interp("a = arange(100).reshape(10, 10)\nb = a[1:3, 5:7]")
            .unwrap();
        assert_eq!(session.interp("b.shape").unwrap().repr(), "(2, 2)");
        assert_eq!(session.interp("b.tolist()").unwrap().repr(), "[[15, 16], [25, 26]]");
        assert_eq!(session.interp("a[2][7]").unwrap(), Value::Int(27));
        assert_eq!(session.interp("a[-1, -1]").unwrap(), Value::Int(99));
    }

    #[test]
    fn array_updates_are_visible_through_aliases() {
        let source = "\
a = zeros(4)
b = a
b += 1
a[1:3] = [5, 6]
a.tolist()
";
        assert_eq!(run(source).repr(), "[1.0, 5.0, 6.0, 1.0]");
    }

    #[test]
    fn string_methods_and_formatting() {
        assert_eq!(run("'a,b'.split(',')").repr(), "['a', 'b']");
        assert_eq!(run("'%d items at %.2f' % (3, 1.5)"), Value::str("3 items at 1.50"));
        assert_eq!(run("'{} + {x}'.format(1, x=2)"), Value::str("1 + 2"));
    }

    #[test]
    fn huge_negative_step_selects_the_last_element() {
        assert_eq!(run("[1, 2, 3][::-9223372036854775807 - 1]").repr(), "[3]");
        assert_eq!(run("[1, 2, 3][::-10]").repr(), "[3]");
        assert_eq!(run("[1, 2, 3][::-1]").repr(), "[3, 2, 1]");
    }

    #[test]
    fn deeply_nested_lists_drop_without_overflow() {
        let mut session = quiet_session();
        session
            .interp("x = []\nfor i in range(100000):\n    x = [x]")
            .unwrap();
        assert_eq!(session.interp("x = None\n1").unwrap(), Value::Int(1));
    }

    #[test]
    fn deep_nesting_limits_repr_and_comparison() {
        let build = "\
x = []
y = []
for i in range(5000):
    x = [x]
    y = [y]
";
        assert_eq!(failure(&format!("{build}repr(x)")), ErrorKind::RuntimeError);
        assert_eq!(failure(&format!("{build}x == y")), ErrorKind::RuntimeError);
        assert_eq!(failure(&format!("{build}str(x)")), ErrorKind::RuntimeError);
        assert_eq!(run(&format!("{build}len(x)")), Value::Int(1));
    }
}
