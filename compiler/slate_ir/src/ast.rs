//! Syntax tree for the supported script grammar.
//!
//! Nodes live in an [`ExprArena`] and refer to each other through
//! [`ExprId`] / [`StmtId`] indices. A parsed [`Program`] owns its arena via
//! [`SharedArena`], so procedures defined by a program can keep their body
//! alive after the program value itself is gone.

use std::fmt;
use std::sync::Arc;

use super::{Name, Span};

/// Index of an expression in its arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

/// Index of a statement in its arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct StmtId(u32);

impl ExprId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl StmtId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

impl fmt::Debug for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StmtId({})", self.0)
    }
}

// Operators

/// Binary arithmetic and bitwise operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    /// Source spelling of the operator.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `not x`
    Not,
    /// `~x`
    Invert,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not => "not",
            UnaryOp::Invert => "~",
        }
    }
}

/// Short-circuiting boolean operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

/// Comparison operators, usable in chains (`a < b <= c`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
        }
    }
}

// Expressions

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal (adjacent literals already concatenated).
    Str(String),
    /// Identifier in load, store or delete position.
    Ident(Name),
    /// `[a, b]`
    List(Vec<ExprId>),
    /// `(a, b)` or a bare `a, b`.
    Tuple(Vec<ExprId>),
    /// `{k: v}`
    Dict(Vec<(ExprId, ExprId)>),
    /// `left op right`
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// `op operand`
    Unary { op: UnaryOp, operand: ExprId },
    /// `a and b and c` / `a or b`
    BoolOp { op: BoolOp, values: Vec<ExprId> },
    /// `left op0 c0 op1 c1 ...`
    Compare {
        left: ExprId,
        comparisons: Vec<(CmpOp, ExprId)>,
    },
    /// `body if test else orelse`
    IfExp {
        test: ExprId,
        body: ExprId,
        orelse: ExprId,
    },
    /// `value.attr`
    Attribute { value: ExprId, attr: Name },
    /// `value[index]`; a multi-axis index is a `Tuple`.
    Subscript { value: ExprId, index: ExprId },
    /// `lower:upper:step`, only valid inside a subscript.
    Slice {
        lower: Option<ExprId>,
        upper: Option<ExprId>,
        step: Option<ExprId>,
    },
    /// `func(args)`
    Call { func: ExprId, args: Vec<CallArg> },
    /// `lambda params: body`
    Lambda { params: Params, body: ExprId },
    /// `[elt for target in iter if cond ...]`
    ListComp {
        elt: ExprId,
        generators: Vec<Comprehension>,
    },
    /// Syntax the evaluator deliberately does not execute (set displays,
    /// dict and set comprehensions).
    Unsupported { construct: &'static str },
}

/// How an argument is passed at a call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// `f(x)`
    Positional,
    /// `f(*xs)`
    Starred,
    /// `f(name=x)`
    Keyword(Name),
    /// `f(**kw)`
    DoubleStarred,
}

/// One argument at a call site.
#[derive(Clone, Debug, PartialEq)]
pub struct CallArg {
    pub kind: ArgKind,
    pub value: ExprId,
    pub span: Span,
}

/// A formal parameter with an optional default expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub default: Option<ExprId>,
    pub span: Span,
}

/// Formal parameter list of a `def` or `lambda`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    pub positional: Vec<Param>,
    /// `*args` collector.
    pub vararg: Option<Name>,
    /// `**kwargs` collector.
    pub kwarg: Option<Name>,
}

/// One `for ... in ... if ...` clause of a comprehension.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub target: ExprId,
    pub iter: ExprId,
    pub ifs: Vec<ExprId>,
}

// Statements

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// Expression statement.
    Expr(ExprId),
    /// `t1 = t2 = value`
    Assign { targets: Vec<ExprId>, value: ExprId },
    /// `target op= value`
    AugAssign {
        target: ExprId,
        op: BinaryOp,
        value: ExprId,
    },
    /// `del a, b[0]`
    Delete(Vec<ExprId>),
    Pass,
    Break,
    Continue,
    Return(Option<ExprId>),
    /// `global a, b`
    Global(Vec<Name>),
    /// `print a, b` / `print(a, b)`; `newline` is false after a trailing comma.
    Print { values: Vec<ExprId>, newline: bool },
    If {
        test: ExprId,
        body: Vec<StmtId>,
        orelse: Vec<StmtId>,
    },
    While {
        test: ExprId,
        body: Vec<StmtId>,
        orelse: Vec<StmtId>,
    },
    For {
        target: ExprId,
        iter: ExprId,
        body: Vec<StmtId>,
        orelse: Vec<StmtId>,
    },
    FunctionDef(FunctionDef),
    /// A statement whose syntax was validated but which the evaluator does
    /// not execute (`class`, `try`, `import`, `raise`, ...).
    Unsupported { construct: &'static str },
}

/// `def name(params): body`
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Params,
    pub body: Vec<StmtId>,
    /// Leading string literal of the body, if any.
    pub doc: Option<String>,
}

// Arena

/// Arena for expression and statement nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its id.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    /// Allocate a statement, returning its id.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(u32::try_from(self.stmts.len()).unwrap_or(u32::MAX));
        self.stmts.push(stmt);
        id
    }

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` was allocated by a different arena.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get a statement by id.
    ///
    /// # Panics
    /// Panics if `id` was allocated by a different arena.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// Arena shared between a program and the procedures it defines.
pub type SharedArena = Arc<ExprArena>;

/// A parsed source text.
#[derive(Clone, Debug)]
pub struct Program {
    /// Arena holding every node of the program.
    pub arena: SharedArena,
    /// Top-level statements in source order.
    pub body: Vec<StmtId>,
    /// Original source text, kept for error locations.
    pub source: Arc<str>,
}

impl Program {
    /// Top-level statements paired with their nodes.
    pub fn statements(&self) -> impl Iterator<Item = (StmtId, &Stmt)> {
        self.body.iter().map(|&id| (id, self.arena.stmt(id)))
    }

    /// The single expression of a one-expression program, if that is what
    /// this program is.
    pub fn as_expression(&self) -> Option<ExprId> {
        match self.body.as_slice() {
            [only] => match self.arena.stmt(*only).kind {
                StmtKind::Expr(expr) => Some(expr),
                _ => None,
            },
            _ => None,
        }
    }
}
