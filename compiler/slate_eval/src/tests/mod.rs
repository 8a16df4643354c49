//! Test modules relocated from implementation files.
//!
//! End-to-end tests drive a whole session through `interp`; unit tests for
//! single modules stay next to the code they cover.

mod property_tests;
mod script_tests;
mod session_tests;

use crate::interpreter::{ErrorDisplay, Interpreter};
use crate::print_handler::buffer_handler;
use crate::value::Value;

/// A session that captures output and returns the first error as `Err`.
pub(crate) fn quiet_session() -> Interpreter {
    Interpreter::builder()
        .print_handler(buffer_handler())
        .error_display(ErrorDisplay::Suppress)
        .build()
}

/// Global `name` after the last `interp` call.
pub(crate) fn global(session: &Interpreter, name: &str) -> Value {
    session
        .symtable()
        .get(name)
        .unwrap_or_else(|| panic!("`{name}` is not bound"))
}
