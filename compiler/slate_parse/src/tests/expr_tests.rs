use pretty_assertions::assert_eq;
use slate_ir::{BinaryOp, BoolOp, CmpOp, ExprKind, UnaryOp};

use super::parse_ok;

#[test]
fn literals() {
    let parsed = parse_ok("None\nTrue\n42\n2.5\n'a' \"b\"\n");
    assert_eq!(parsed.expr_stmt(0).kind, ExprKind::None);
    assert_eq!(parsed.expr_stmt(1).kind, ExprKind::Bool(true));
    assert_eq!(parsed.expr_stmt(2).kind, ExprKind::Int(42));
    assert_eq!(parsed.expr_stmt(3).kind, ExprKind::Float(2.5));
    assert_eq!(parsed.expr_stmt(4).kind, ExprKind::Str("ab".into()));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parsed = parse_ok("1 + 2 * 3");
    let ExprKind::Binary { op, right, .. } = parsed.expr_stmt(0).kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        parsed.expr(right).kind,
        ExprKind::Binary { op: BinaryOp::Mul, .. }
    ));
}

#[test]
fn power_is_right_associative_and_beats_unary_minus() {
    let parsed = parse_ok("-2 ** 3 ** 2");
    let ExprKind::Unary { op, operand } = parsed.expr_stmt(0).kind else {
        panic!("expected unary minus at the root");
    };
    assert_eq!(op, UnaryOp::Neg);
    let ExprKind::Binary { op, right, .. } = parsed.expr(operand).kind else {
        panic!("expected power");
    };
    assert_eq!(op, BinaryOp::Pow);
    assert!(matches!(
        parsed.expr(right).kind,
        ExprKind::Binary { op: BinaryOp::Pow, .. }
    ));
}

#[test]
fn comparison_chain_is_one_node() {
    let parsed = parse_ok("a < b <= c is not d not in e");
    let ExprKind::Compare { comparisons, .. } = &parsed.expr_stmt(0).kind else {
        panic!("expected comparison");
    };
    let ops: Vec<_> = comparisons.iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, vec![CmpOp::Lt, CmpOp::LtE, CmpOp::IsNot, CmpOp::NotIn]);
}

#[test]
fn boolean_operators_flatten() {
    let parsed = parse_ok("a or b or not c and d");
    let ExprKind::BoolOp { op, values } = &parsed.expr_stmt(0).kind else {
        panic!("expected or");
    };
    assert_eq!(*op, BoolOp::Or);
    assert_eq!(values.len(), 3);
    assert!(matches!(
        parsed.expr(values[2]).kind,
        ExprKind::BoolOp { op: BoolOp::And, .. }
    ));
}

#[test]
fn conditional_expression() {
    let parsed = parse_ok("x if c else y");
    assert!(matches!(parsed.expr_stmt(0).kind, ExprKind::IfExp { .. }));
}

#[test]
fn displays() {
    let parsed = parse_ok("[1, 2,]\n(1,)\n()\n(1)\n{'a': 1, 'b': 2}\n{}\n");
    assert!(matches!(parsed.expr_stmt(0).kind, ExprKind::List(ref items) if items.len() == 2));
    assert!(matches!(parsed.expr_stmt(1).kind, ExprKind::Tuple(ref items) if items.len() == 1));
    assert!(matches!(parsed.expr_stmt(2).kind, ExprKind::Tuple(ref items) if items.is_empty()));
    assert_eq!(parsed.expr_stmt(3).kind, ExprKind::Int(1));
    assert!(matches!(parsed.expr_stmt(4).kind, ExprKind::Dict(ref entries) if entries.len() == 2));
    assert!(matches!(parsed.expr_stmt(5).kind, ExprKind::Dict(ref entries) if entries.is_empty()));
}

#[test]
fn set_and_dict_comprehensions_are_unsupported() {
    let parsed = parse_ok("{1, 2}\n{x for x in y}\n{k: v for k, v in items}\n");
    let constructs: Vec<_> = (0..3)
        .map(|i| match parsed.expr_stmt(i).kind {
            ExprKind::Unsupported { construct } => construct,
            ref other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        constructs,
        vec!["set display", "set comprehension", "dict comprehension"]
    );
}

#[test]
fn list_comprehension_with_conditions() {
    let parsed = parse_ok("[x * y for x in a if x for y in b if y > x]");
    let ExprKind::ListComp { generators, .. } = &parsed.expr_stmt(0).kind else {
        panic!("expected list comprehension");
    };
    assert_eq!(generators.len(), 2);
    assert_eq!(generators[0].ifs.len(), 1);
    assert_eq!(generators[1].ifs.len(), 1);
}

#[test]
fn generator_argument_becomes_list_comprehension() {
    let parsed = parse_ok("sum(x for x in xs)");
    let ExprKind::Call { args, .. } = &parsed.expr_stmt(0).kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    assert!(matches!(parsed.expr(args[0].value).kind, ExprKind::ListComp { .. }));
}

#[test]
fn multi_axis_slice_subscript() {
    let parsed = parse_ok("arange(200).reshape(10, 20)[1:3, 5:7]");
    let ExprKind::Subscript { value, index } = parsed.expr_stmt(0).kind else {
        panic!("expected subscript");
    };
    assert!(matches!(parsed.expr(value).kind, ExprKind::Call { .. }));
    let ExprKind::Tuple(items) = &parsed.expr(index).kind else {
        panic!("expected tuple index");
    };
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|&item| matches!(parsed.expr(item).kind, ExprKind::Slice { .. })));
}

#[test]
fn slice_with_step_and_open_bounds() {
    let parsed = parse_ok("a[::-1]");
    let ExprKind::Subscript { index, .. } = parsed.expr_stmt(0).kind else {
        panic!("expected subscript");
    };
    let ExprKind::Slice { lower, upper, step } = parsed.expr(index).kind else {
        panic!("expected slice");
    };
    assert_eq!((lower, upper), (None, None));
    assert!(step.is_some());
}

#[test]
fn attribute_chain() {
    let parsed = parse_ok("a.b.c");
    let ExprKind::Attribute { value, attr } = parsed.expr_stmt(0).kind else {
        panic!("expected attribute");
    };
    assert_eq!(&*parsed.interner.lookup(attr), "c");
    assert!(matches!(parsed.expr(value).kind, ExprKind::Attribute { .. }));
}

#[test]
fn lambda_with_default() {
    let parsed = parse_ok("f = lambda x, y=2: x + y");
    let slate_ir::StmtKind::Assign { value, .. } = &parsed.stmt(0).kind else {
        panic!("expected assignment");
    };
    let ExprKind::Lambda { params, .. } = &parsed.expr(*value).kind else {
        panic!("expected lambda");
    };
    assert_eq!(params.positional.len(), 2);
}

#[test]
fn deeply_nested_parentheses() {
    let depth = 2_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let parsed = parse_ok(&source);
    assert_eq!(parsed.expr_stmt(0).kind, ExprKind::Int(1));
}
