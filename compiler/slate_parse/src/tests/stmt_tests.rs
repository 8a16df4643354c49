use pretty_assertions::assert_eq;
use slate_ir::{ArgKind, BinaryOp, ExprKind, StmtKind};

use super::parse_ok;

#[test]
fn empty_program() {
    let parsed = parse_ok("\n\n# nothing here\n");
    assert!(parsed.program.body.is_empty());
}

#[test]
fn semicolon_separated_statements() {
    let parsed = parse_ok("a = 1; b = 2; a + b");
    assert_eq!(parsed.program.body.len(), 3);
    assert!(matches!(parsed.stmt(2).kind, StmtKind::Expr(_)));
}

#[test]
fn chained_assignment() {
    let parsed = parse_ok("a = b = 3");
    let StmtKind::Assign { targets, value } = &parsed.stmt(0).kind else {
        panic!("expected assignment");
    };
    assert_eq!(targets.len(), 2);
    assert_eq!(parsed.name_of(targets[0]), "a");
    assert_eq!(parsed.name_of(targets[1]), "b");
    assert_eq!(parsed.expr(*value).kind, ExprKind::Int(3));
}

#[test]
fn tuple_unpacking_assignment() {
    let parsed = parse_ok("a, b = b, a");
    let StmtKind::Assign { targets, value } = &parsed.stmt(0).kind else {
        panic!("expected assignment");
    };
    assert!(matches!(parsed.expr(targets[0]).kind, ExprKind::Tuple(ref items) if items.len() == 2));
    assert!(matches!(parsed.expr(*value).kind, ExprKind::Tuple(ref items) if items.len() == 2));
}

#[test]
fn augmented_assignment() {
    let parsed = parse_ok("x[0] //= 2");
    let StmtKind::AugAssign { target, op, .. } = &parsed.stmt(0).kind else {
        panic!("expected augmented assignment");
    };
    assert_eq!(*op, BinaryOp::FloorDiv);
    assert!(matches!(parsed.expr(*target).kind, ExprKind::Subscript { .. }));
}

#[test]
fn slice_assignment_target() {
    let parsed = parse_ok("a[1:5] = 1 + 0.5*arange(4)");
    let StmtKind::Assign { targets, .. } = &parsed.stmt(0).kind else {
        panic!("expected assignment");
    };
    let ExprKind::Subscript { index, .. } = parsed.expr(targets[0]).kind else {
        panic!("expected subscript");
    };
    assert!(matches!(parsed.expr(index).kind, ExprKind::Slice { step: None, .. }));
}

#[test]
fn if_elif_else_nests() {
    let parsed = parse_ok("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
    let StmtKind::If { body, orelse, .. } = &parsed.stmt(0).kind else {
        panic!("expected if");
    };
    assert_eq!(body.len(), 1);
    assert_eq!(orelse.len(), 1);
    let inner = parsed.program.arena.stmt(orelse[0]);
    let StmtKind::If { orelse: last, .. } = &inner.kind else {
        panic!("elif should be a nested if");
    };
    assert_eq!(last.len(), 1);
}

#[test]
fn one_line_suite() {
    let parsed = parse_ok("while n < 10: n = n + 1; m = n");
    let StmtKind::While { body, orelse, .. } = &parsed.stmt(0).kind else {
        panic!("expected while");
    };
    assert_eq!(body.len(), 2);
    assert!(orelse.is_empty());
}

#[test]
fn for_loop_with_tuple_target_and_else() {
    let parsed = parse_ok("for i, v in enumerate(xs):\n    pass\nelse:\n    done = True\n");
    let StmtKind::For { target, orelse, .. } = &parsed.stmt(0).kind else {
        panic!("expected for");
    };
    assert!(matches!(parsed.expr(*target).kind, ExprKind::Tuple(_)));
    assert_eq!(orelse.len(), 1);
}

#[test]
fn break_and_continue_inside_loops() {
    let parsed = parse_ok("for x in y:\n    if x:\n        break\n    continue\n");
    assert_eq!(parsed.program.body.len(), 1);
}

#[test]
fn function_definition_with_doc_and_params() {
    let source = "def fcn(x, scale=2, *args, **kws):\n    \"\"\"test function\"\"\"\n    return x * scale\n";
    let parsed = parse_ok(source);
    let StmtKind::FunctionDef(def) = &parsed.stmt(0).kind else {
        panic!("expected def");
    };
    assert_eq!(&*parsed.interner.lookup(def.name), "fcn");
    assert_eq!(def.doc.as_deref(), Some("test function"));
    assert_eq!(def.params.positional.len(), 2);
    assert!(def.params.positional[0].default.is_none());
    assert!(def.params.positional[1].default.is_some());
    assert_eq!(
        def.params.vararg.map(|n| parsed.interner.lookup(n).to_string()),
        Some("args".to_string())
    );
    assert_eq!(
        def.params.kwarg.map(|n| parsed.interner.lookup(n).to_string()),
        Some("kws".to_string())
    );
    assert_eq!(def.body.len(), 2);
}

#[test]
fn function_without_docstring() {
    let parsed = parse_ok("def f():\n    return\n");
    let StmtKind::FunctionDef(def) = &parsed.stmt(0).kind else {
        panic!("expected def");
    };
    assert_eq!(def.doc, None);
    assert!(matches!(
        parsed.program.arena.stmt(def.body[0]).kind,
        StmtKind::Return(None)
    ));
}

#[test]
fn print_statement_forms() {
    let parsed = parse_ok("print 1\nprint a, b,\nprint(a, b)\nprint\n");
    let forms: Vec<_> = (0..4)
        .map(|i| match &parsed.stmt(i).kind {
            StmtKind::Print { values, newline } => (values.len(), *newline),
            other => panic!("expected print, got {other:?}"),
        })
        .collect();
    assert_eq!(forms, vec![(1, true), (2, false), (2, true), (0, true)]);
}

#[test]
fn del_and_global() {
    let parsed = parse_ok("global a, b\ndel a, b[0], c.d\n");
    assert!(matches!(parsed.stmt(0).kind, StmtKind::Global(ref names) if names.len() == 2));
    assert!(matches!(parsed.stmt(1).kind, StmtKind::Delete(ref targets) if targets.len() == 3));
}

#[test]
fn unsupported_statements_are_kept() {
    let source = "import os.path as p\nfrom . import (a, b,)\nclass C(object):\n    pass\ntry:\n    x = 1\nexcept ValueError as e:\n    pass\nfinally:\n    pass\nraise\nassert x, 'msg'\nwith open(f) as (a, b):\n    pass\n";
    let parsed = parse_ok(source);
    let constructs: Vec<_> = (0..parsed.program.body.len())
        .map(|i| match parsed.stmt(i).kind {
            StmtKind::Unsupported { construct } => construct,
            ref other => panic!("expected unsupported, got {other:?}"),
        })
        .collect();
    assert_eq!(
        constructs,
        vec!["import", "import", "class", "try", "raise", "assert", "with"]
    );
}

#[test]
fn call_argument_kinds() {
    let parsed = parse_ok("f(1, *rest, key=2, **extra)");
    let ExprKind::Call { args, .. } = &parsed.expr_stmt(0).kind else {
        panic!("expected call");
    };
    let kinds: Vec<_> = args
        .iter()
        .map(|arg| match arg.kind {
            ArgKind::Keyword(_) => "keyword",
            ArgKind::Positional => "positional",
            ArgKind::Starred => "starred",
            ArgKind::DoubleStarred => "double",
        })
        .collect();
    assert_eq!(kinds, vec!["positional", "starred", "keyword", "double"]);
}

#[test]
fn statement_spans_cover_source() {
    let parsed = parse_ok("x = 1\ny = x + 22\n");
    let span = parsed.stmt(1).span;
    assert_eq!(&parsed.program.source[span.to_range()], "y = x + 22");
}
