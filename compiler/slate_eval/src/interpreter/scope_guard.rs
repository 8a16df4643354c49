//! RAII scope guards for symbol table frames.
//!
//! [`ScopedInterpreter`] pops its frame when dropped, whether the code run
//! inside it returned normally, failed with `?`, or unwound. It holds
//! `&mut Interpreter` and implements `Deref`/`DerefMut`, so the guarded
//! code calls interpreter methods on the guard directly.
//!
//! ```text
//! let mut scoped = interpreter.call_frame(&procedure);
//! scoped.env.define(name, value);
//! scoped.exec_block(body)?;
//! // frame popped and caller's code restored here
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use slate_ir::SharedArena;

use super::Interpreter;
use crate::value::Procedure;

/// Guard over one pushed frame.
pub struct ScopedInterpreter<'i> {
    interpreter: &'i mut Interpreter,
    /// Arena and source of the caller, for procedure call frames.
    caller_code: Option<(SharedArena, Arc<str>)>,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_frame();
        if let Some(code) = self.caller_code.take() {
            self.interpreter.leave_code(code);
            self.interpreter.call_depth = self.interpreter.call_depth.saturating_sub(1);
        }
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push a frame nested in the current one (comprehensions).
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        let parent = self.env.current();
        self.env.push_frame(parent);
        ScopedInterpreter {
            interpreter: self,
            caller_code: None,
        }
    }

    /// Push a call frame for `procedure`: its parent is the procedure's
    /// closure, and the procedure's code replaces the caller's until the
    /// guard drops.
    pub fn call_frame(&mut self, procedure: &Procedure) -> ScopedInterpreter<'_> {
        self.env.push_call_frame(&procedure.closure);
        self.call_depth += 1;
        let caller = self.enter_code(Arc::clone(&procedure.arena), Arc::clone(&procedure.source));
        ScopedInterpreter {
            interpreter: self,
            caller_code: Some(caller),
        }
    }
}
