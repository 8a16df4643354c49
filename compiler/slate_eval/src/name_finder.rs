//! Static name reference analysis.
//!
//! Collects the identifiers a piece of script reads before it is run, so
//! a host can check what an untrusted formula will need. Purely
//! structural: the symbol table is never consulted.

use rustc_hash::FxHashSet;
use slate_ir::visitor::{walk_expr, walk_stmt};
use slate_ir::{ExprArena, ExprId, ExprKind, Name, Program, StmtId, StmtKind, StringInterner, Visitor};

/// Visitor collecting identifiers in load context, in first-seen order.
///
/// Names bound by assignment, `for`, comprehension and `del` targets are
/// skipped; names inside index expressions, attribute bases, call
/// arguments and default values are collected. The target of an augmented
/// assignment is read before it is written, so it counts as a load.
#[derive(Default)]
pub struct NameFinder {
    names: Vec<Name>,
    seen: FxHashSet<Name>,
}

impl NameFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every referenced name of a whole program.
    pub fn in_program(program: &Program) -> Vec<Name> {
        let mut finder = NameFinder::new();
        finder.visit_program(program);
        finder.names
    }

    /// Referenced names of a single expression subtree.
    pub fn in_expr(id: ExprId, arena: &ExprArena) -> Vec<Name> {
        let mut finder = NameFinder::new();
        finder.visit_expr(id, arena);
        finder.names
    }

    /// Referenced names of a single statement subtree.
    pub fn in_stmt(id: StmtId, arena: &ExprArena) -> Vec<Name> {
        let mut finder = NameFinder::new();
        finder.visit_stmt(id, arena);
        finder.names
    }

    /// Names collected so far.
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    fn record(&mut self, name: Name) {
        if self.seen.insert(name) {
            self.names.push(name);
        }
    }
}

impl<'ast> Visitor<'ast> for NameFinder {
    fn visit_stmt(&mut self, id: StmtId, arena: &'ast ExprArena) {
        if let StmtKind::AugAssign { target, .. } = &arena.stmt(id).kind {
            if let ExprKind::Ident(name) = arena.expr(*target).kind {
                self.record(name);
            }
        }
        walk_stmt(self, id, arena);
    }

    fn visit_expr(&mut self, id: ExprId, arena: &'ast ExprArena) {
        if let ExprKind::Ident(name) = arena.expr(id).kind {
            self.record(name);
        }
        walk_expr(self, id, arena);
    }
}

/// Resolve `names` to text.
pub fn resolve_names(names: &[Name], interner: &StringInterner) -> Vec<String> {
    names
        .iter()
        .map(|&name| interner.lookup(name).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn referenced(source: &str) -> Vec<String> {
        let interner = StringInterner::new();
        let program = slate_parse::parse(source, &interner).unwrap();
        resolve_names(&NameFinder::in_program(&program), &interner)
    }

    #[test]
    fn assignment_targets_are_not_loads() {
        assert_eq!(referenced("x = y + z"), ["y", "z"]);
        assert_eq!(referenced("a, b = b, c"), ["b", "c"]);
    }

    #[test]
    fn subscript_and_attribute_targets_load_their_parts() {
        assert_eq!(referenced("d[k] = v"), ["v", "d", "k"]);
        assert_eq!(referenced("obj.shape = s"), ["s", "obj"]);
    }

    #[test]
    fn augmented_target_is_read() {
        assert_eq!(referenced("n += step"), ["n", "step"]);
    }

    #[test]
    fn names_are_unique_and_ordered() {
        assert_eq!(referenced("f(a, b, a, key=c)\nprint(b)"), ["f", "a", "b", "c"]);
    }

    #[test]
    fn definitions_collect_defaults_and_bodies() {
        let names = referenced("def f(x, scale=k):\n    return sqrt(x) * scale\n");
        assert_eq!(names, ["k", "sqrt", "x", "scale"]);
    }

    #[test]
    fn loops_and_comprehensions() {
        assert_eq!(referenced("for i in items:\n    total += i\n"), ["items", "total", "i"]);
        assert_eq!(referenced("[x * w for x in xs if x > lo]"), ["xs", "x", "lo", "w"]);
    }

    #[test]
    fn single_expression_subtree() {
        let interner = StringInterner::new();
        let program = slate_parse::parse("a = b[c]", &interner).unwrap();
        let StmtKind::Assign { value, .. } = &program.arena.stmt(program.body[0]).kind else {
            panic!("expected an assignment");
        };
        let names = NameFinder::in_expr(*value, &program.arena);
        assert_eq!(resolve_names(&names, &interner), ["b", "c"]);
    }
}
