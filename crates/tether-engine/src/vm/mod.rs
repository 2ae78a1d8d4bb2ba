//! Tree-walking evaluator.
//!
//! Statements execute directly against [`ScopeRef`](crate::runtime::ScopeRef)
//! chains; there is no intermediate bytecode.

mod interpreter;

pub use interpreter::MAX_CALL_DEPTH;
