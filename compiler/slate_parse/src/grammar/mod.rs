//! Grammar productions, split by construct.
//!
//! - `stmt.rs`: programs, blocks, simple and compound statements
//! - `unsupported.rs`: statements that are validated but never executed
//! - `params.rs`: `def` and `lambda` parameter lists
//! - `targets.rs`: assignment, `for` and `del` target validation
//! - `expr/`: expressions

mod expr;
mod params;
mod stmt;
mod targets;
mod unsupported;
