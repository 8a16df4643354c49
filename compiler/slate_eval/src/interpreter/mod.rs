//! Tree-walking interpreter and the host-facing session.
//!
//! An [`Interpreter`] owns everything one embedding needs: the interner,
//! the symbol table, the error stack of the last call, and the output
//! sink. Sessions share nothing, so several can coexist in one process.
//!
//! # Code threading
//!
//! `ExprId`s are only meaningful in the arena that allocated them. The
//! interpreter keeps the arena and source text of the code it is running
//! in `arena`/`source`; a procedure call swaps in the procedure's own
//! arena for the duration of the call (see [`ScopedInterpreter`]), so a
//! procedure defined by one `interp` call can be called from a later one.
//!
//! # Evaluation
//!
//! - `expr`: expression dispatch, calls, comprehensions
//! - `stmt`: statement dispatch, loops, `print`, `def`
//! - `call`: argument binding and procedure invocation
//! - `assign`: assignment, augmented assignment and `del` targets

mod assign;
mod builder;
mod call;
mod expr;
mod scope_guard;
mod stmt;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use std::sync::Arc;

use slate_ir::{ExprArena, ExprId, Program, SharedArena, StringInterner};
use slate_parse::ParseError;
use tracing::debug;

use crate::environment::Environment;
use crate::error_stack::{ErrorRecord, ErrorStack, InterpError};
use crate::errors::{ControlAction, ErrorKind, EvalError};
use crate::name_finder::{resolve_names, NameFinder};
use crate::print_handler::SharedPrintHandler;
use crate::symtable::{SymbolTable, SymbolTableMut};
use crate::value::Value;

/// Host callback run on every loop iteration with the session's running
/// step count. Returning `Err(reason)` stops the current `interp` call.
pub type StepHook = Box<dyn FnMut(u64) -> Result<(), String>>;

/// What `interp` does with recorded errors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorDisplay {
    /// Write each record's report to the output sink and return `None`.
    #[default]
    Show,
    /// Write nothing; return the first record as an [`InterpError`].
    Suppress,
}

/// Resource limits enforced during evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Deepest allowed nesting of procedure calls.
    pub max_recursion_depth: usize,
    /// Iterations allowed per loop; `None` is unbounded.
    pub max_loop_iterations: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_recursion_depth: 256,
            max_loop_iterations: None,
        }
    }
}

/// An interpreter session.
pub struct Interpreter {
    pub(crate) interner: StringInterner,
    pub(crate) env: Environment,
    errors: ErrorStack,
    pub(crate) print_handler: SharedPrintHandler,
    error_display: ErrorDisplay,
    /// Arena of the code being evaluated.
    pub(crate) arena: SharedArena,
    /// Source text `arena` was parsed from.
    pub(crate) source: Arc<str>,
    /// Active procedure calls.
    pub(crate) call_depth: usize,
    pub(crate) limits: Limits,
    pub(crate) step_hook: Option<StepHook>,
    /// Loop iterations run by this session so far.
    pub(crate) steps: u64,
}

impl Interpreter {
    /// A session with the default builtins, printing to stdout.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Parse and run `source`, handling errors per the session's
    /// [`ErrorDisplay`].
    pub fn interp(&mut self, source: &str) -> Result<Value, InterpError> {
        self.interp_with(source, self.error_display)
    }

    /// Parse and run `source`.
    ///
    /// Clears the error stack first. A parse failure records a
    /// `SyntaxError` and runs nothing. A runtime failure abandons only the
    /// statement it happened in; later statements still run. A host abort
    /// (step hook or loop limit) ends the call.
    ///
    /// Returns the value of the last statement when nothing failed. When
    /// something did, `ErrorDisplay::Show` reports every record to the
    /// sink and returns `Ok(Value::None)`, while `ErrorDisplay::Suppress`
    /// returns the first record as `Err`. Aborts are always `Err`.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn interp_with(&mut self, source: &str, display: ErrorDisplay) -> Result<Value, InterpError> {
        self.errors.clear();
        let program = match self.parse(source) {
            Ok(program) => program,
            Err(err) => {
                let err = EvalError::new(ErrorKind::SyntaxError, err.message).at(err.span, source);
                return Err(self.abort(err, display));
            }
        };
        match self.execute(&program) {
            Err(err) => Err(self.abort(err, display)),
            Ok(value) => {
                let Some(first) = self.errors.first() else {
                    return Ok(value);
                };
                match display {
                    ErrorDisplay::Show => {
                        self.show_errors();
                        Ok(Value::None)
                    }
                    ErrorDisplay::Suppress => Err(InterpError::Failed {
                        kind: first.kind(),
                        message: first.message().to_string(),
                    }),
                }
            }
        }
    }

    /// Parse `source` with this session's interner.
    pub fn parse(&self, source: &str) -> Result<Program, ParseError> {
        slate_parse::parse(source, &self.interner)
    }

    /// Run a parsed program, recording failures without clearing earlier
    /// records. Returns the value of the last statement, or `None` if the
    /// run was aborted.
    pub fn run(&mut self, program: &Program) -> Value {
        match self.execute(program) {
            Ok(value) => value,
            Err(err) => {
                self.errors.push(err.into());
                Value::None
            }
        }
    }

    /// Evaluate one expression of `program` in the global scope.
    pub fn evaluate_expr(&mut self, program: &Program, expr: ExprId) -> Result<Value, EvalError> {
        let caller = self.enter_code(Arc::clone(&program.arena), Arc::clone(&program.source));
        let result = self.eval(expr).map_err(ControlAction::into_error);
        self.leave_code(caller);
        result
    }

    /// Read-only view of the global scope.
    pub fn symtable(&self) -> SymbolTable<'_> {
        SymbolTable::new(&self.env, &self.interner)
    }

    /// Writable view of the global scope.
    pub fn symtable_mut(&mut self) -> SymbolTableMut<'_> {
        SymbolTableMut::new(&mut self.env, &self.interner)
    }

    /// Errors recorded by the last `interp` call, oldest first.
    pub fn error(&self) -> &ErrorStack {
        &self.errors
    }

    /// The most recent error record.
    pub fn last_error(&self) -> Option<&ErrorRecord> {
        self.errors.last()
    }

    /// Text captured by a buffer sink; empty for other sinks.
    pub fn output(&self) -> String {
        self.print_handler.get_output()
    }

    /// Discard text captured by a buffer sink.
    pub fn clear_output(&self) {
        self.print_handler.clear();
    }

    /// Names `source` reads, in first-use order, without running it.
    pub fn referenced_names(&self, source: &str) -> Result<Vec<String>, ParseError> {
        let program = self.parse(source)?;
        Ok(resolve_names(&NameFinder::in_program(&program), &self.interner))
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Run every top-level statement. `Err` is a host abort.
    fn execute(&mut self, program: &Program) -> Result<Value, EvalError> {
        let caller = self.enter_code(Arc::clone(&program.arena), Arc::clone(&program.source));
        let mut last = Value::None;
        let mut outcome = Ok(());
        for &stmt in &program.body {
            match self.exec(stmt) {
                Ok(value) => last = value,
                Err(ControlAction::Abort(err)) => {
                    debug!(%err, "evaluation aborted");
                    outcome = Err(err);
                    break;
                }
                Err(action) => {
                    let err = action.into_error();
                    debug!(%err, "statement failed");
                    self.errors.push(err.into());
                    last = Value::None;
                }
            }
        }
        self.leave_code(caller);
        outcome.map(|()| last)
    }

    /// Record an aborting error and build the host-level signal for it.
    fn abort(&mut self, err: EvalError, display: ErrorDisplay) -> InterpError {
        let signal = InterpError::Aborted {
            kind: err.kind,
            message: err.message.clone(),
        };
        self.errors.push(err.into());
        if display == ErrorDisplay::Show {
            self.show_errors();
        }
        signal
    }

    fn show_errors(&self) {
        for record in &self.errors {
            self.print_handler.println(&record.report());
        }
    }

    /// Make `arena`/`source` the code being evaluated, returning the
    /// previous pair.
    pub(crate) fn enter_code(&mut self, arena: SharedArena, source: Arc<str>) -> (SharedArena, Arc<str>) {
        (
            std::mem::replace(&mut self.arena, arena),
            std::mem::replace(&mut self.source, source),
        )
    }

    pub(crate) fn leave_code(&mut self, (arena, source): (SharedArena, Arc<str>)) {
        self.arena = arena;
        self.source = source;
    }

    fn empty_code() -> (SharedArena, Arc<str>) {
        (Arc::new(ExprArena::new()), Arc::from(""))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
