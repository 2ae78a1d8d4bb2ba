//! JavaScript runtime types: values, objects, functions and scopes.

pub mod function;
pub mod object;
pub mod scope;
pub mod value;

pub use function::{Callable, FunctionValue, NativeFn};
pub use object::{Object, ObjectRef, Property, ReadOnly};
pub use scope::{AssignError, ScopeRef};
pub use value::Value;
