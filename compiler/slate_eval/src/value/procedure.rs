//! User-defined procedures and bound methods.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use slate_ir::{ExprId, Name, SharedArena, StmtId};

use super::Value;
use crate::environment::Closure;

/// One positional parameter of a procedure.
#[derive(Clone, Debug)]
pub struct ProcedureParam {
    pub name: Name,
    /// Parameter name as written, for keyword matching and display.
    pub label: Rc<str>,
    /// Default value, evaluated once when the procedure was defined.
    pub default: Option<Value>,
}

/// What a procedure runs when called.
#[derive(Clone, Debug)]
pub enum ProcedureBody {
    /// `def` body; the result comes from `return`.
    Block(Vec<StmtId>),
    /// `lambda` body; the result is the expression's value.
    Lambda(ExprId),
}

/// A user-defined function value.
///
/// The closure holds a frame of the session's scope arena by handle, so a
/// procedure stored in the scope it closes over is a cycle only the arena
/// sees.
pub struct Procedure {
    pub name: Rc<str>,
    pub params: Vec<ProcedureParam>,
    /// `*args` collector.
    pub vararg: Option<(Name, Rc<str>)>,
    /// `**kwargs` collector.
    pub kwarg: Option<(Name, Rc<str>)>,
    pub body: ProcedureBody,
    /// Arena holding the body's nodes.
    pub arena: SharedArena,
    /// Source the body was parsed from, for error positions.
    pub source: Arc<str>,
    /// Scope active at definition time.
    pub closure: Closure,
    pub doc: Option<Rc<str>>,
}

impl Procedure {
    /// `<Procedure name(x, scale=2, *args, **kws)>`
    pub fn signature(&self) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|param| match &param.default {
                Some(default) => format!("{}={}", param.label, default.repr()),
                None => param.label.to_string(),
            })
            .collect();
        if let Some((_, label)) = &self.vararg {
            parts.push(format!("*{label}"));
        }
        if let Some((_, label)) = &self.kwarg {
            parts.push(format!("**{label}"));
        }
        format!("<Procedure {}({})>", self.name, parts.join(", "))
    }
}

/// Signature, followed by the docstring on its own indented line.
impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())?;
        if let Some(doc) = &self.doc {
            write!(f, "\n  {doc}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// A method looked up on a value, waiting to be called.
#[derive(Debug)]
pub struct BoundMethod {
    pub receiver: Value,
    pub name: &'static str,
}
