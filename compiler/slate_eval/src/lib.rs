//! Slate Eval - sandboxed evaluator for untrusted Slate scripts.
//!
//! A host embeds an [`Interpreter`] session, seeds inputs through
//! [`Interpreter::symtable_mut`], runs end-user formulas with
//! [`Interpreter::interp`], and reads results and the [`ErrorStack`] back.
//! Scripts can only reach what the session hands them: the builtin table,
//! the methods of the value kinds, and the fixed [`ArrayCapability`]
//! interface. There is no reflection, import or native code path.
//!
//! # Architecture
//!
//! - `Value`: closed set of value kinds; containers are shared by reference
//! - `Environment`: frame arena with closure handles, global frame at 0
//! - `evaluate_binary` / `evaluate_unary` / `evaluate_compare`: operator
//!   dispatch over value kinds
//! - `index` / `methods`: subscripts and attribute capabilities
//! - `numeric`: the bundled dense array adapter
//! - `NameFinder`: static load-name analysis
//! - `interpreter`: statement and expression evaluation plus the session

mod array;
mod builtins;
mod environment;
mod error_stack;
pub mod errors;
mod index;
pub mod interpreter;
mod methods;
mod name_finder;
mod numeric;
mod operators;
mod print_handler;
mod symtable;
mod unary_operators;
mod value;

#[cfg(test)]
mod tests;

pub use array::{ArrayCapability, ArrayData, DType, IndexSpec, ResolvedSlice, SliceSpec};
pub use builtins::{core_builtins, numeric_builtins};
pub use environment::{Closure, Environment, Scope, ScopeId};
pub use error_stack::{ErrorRecord, ErrorStack, InterpError};
pub use errors::{ControlAction, ErrorKind, EvalError, EvalResult};
pub use index::{del_item, get_item, set_item, Selector, Subscript};
pub use interpreter::{ErrorDisplay, Interpreter, InterpreterBuilder, Limits, StepHook};
pub use methods::{call_method, get_attribute, set_attribute};
pub use name_finder::{resolve_names, NameFinder};
pub use numeric::DenseArray;
pub use operators::{contains, evaluate_binary, evaluate_compare, order, sort_values};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, writer_handler, BufferPrintHandler,
    PrintHandlerImpl, SharedPrintHandler, StdoutPrintHandler, WriterPrintHandler,
};
pub use symtable::{SymbolTable, SymbolTableMut};
pub use unary_operators::evaluate_unary;
pub use value::{
    check_len, iterate, BoundMethod, Builtin, BuiltinFn, Dict, HashKey, Kwargs, Procedure,
    ProcedureBody, ProcedureParam, Value, MAX_SEQUENCE_LEN,
};
