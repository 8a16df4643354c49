//! `InterpreterBuilder` for creating sessions with various configurations.

use slate_ir::StringInterner;

use super::{ErrorDisplay, Interpreter, Limits, StepHook};
use crate::builtins::{core_builtins, numeric_builtins};
use crate::environment::Environment;
use crate::error_stack::ErrorStack;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::value::Value;

/// Builder for [`Interpreter`] sessions.
///
/// The default session prints to stdout, shows errors, installs every
/// builtin and allows 256 nested calls with unbounded loops.
pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    error_display: ErrorDisplay,
    limits: Limits,
    step_hook: Option<StepHook>,
    core_builtins: bool,
    numeric_builtins: bool,
    symbols: Vec<(String, Value)>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            print_handler: None,
            error_display: ErrorDisplay::default(),
            limits: Limits::default(),
            step_hook: None,
            core_builtins: true,
            numeric_builtins: true,
            symbols: Vec::new(),
        }
    }

    /// Set the sink for `print` output and error reports.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Set how `interp` handles recorded errors.
    #[must_use]
    pub fn error_display(mut self, display: ErrorDisplay) -> Self {
        self.error_display = display;
        self
    }

    #[must_use]
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.limits.max_recursion_depth = depth;
        self
    }

    /// Bound every `while`, `for` and comprehension loop to `limit`
    /// iterations. Exceeding it aborts the `interp` call.
    #[must_use]
    pub fn max_loop_iterations(mut self, limit: u64) -> Self {
        self.limits.max_loop_iterations = Some(limit);
        self
    }

    /// Install a hook called on every loop iteration.
    #[must_use]
    pub fn step_hook(mut self, hook: impl FnMut(u64) -> Result<(), String> + 'static) -> Self {
        self.step_hook = Some(Box::new(hook));
        self
    }

    /// Leave out the general and math builtins and constants.
    #[must_use]
    pub fn without_builtins(mut self) -> Self {
        self.core_builtins = false;
        self
    }

    /// Leave out the array constructors.
    #[must_use]
    pub fn without_numeric(mut self) -> Self {
        self.numeric_builtins = false;
        self
    }

    /// Bind `name` in the global scope of the new session.
    #[must_use]
    pub fn symbol(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.symbols.push((name.into(), value.into()));
        self
    }

    /// Build the session.
    pub fn build(self) -> Interpreter {
        let interner = StringInterner::new();
        let mut env = Environment::new();
        let core = self.core_builtins.then(core_builtins).into_iter().flatten();
        let numeric = self.numeric_builtins.then(numeric_builtins).into_iter().flatten();
        for (name, value) in core.chain(numeric) {
            env.set_global(interner.intern(name), value);
        }
        for (name, value) in self.symbols {
            env.set_global(interner.intern(&name), value);
        }
        let (arena, source) = Interpreter::empty_code();
        Interpreter {
            interner,
            env,
            errors: ErrorStack::new(),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            error_display: self.error_display,
            arena,
            source,
            call_depth: 0,
            limits: self.limits,
            step_hook: self.step_hook,
            steps: 0,
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
