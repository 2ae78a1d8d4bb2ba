//! Function values: script closures and host-provided natives.

use super::scope::ScopeRef;
use super::value::Value;
use crate::ast::Statement;
use crate::{Engine, Error};
use std::fmt;
use std::rc::Rc;

/// Signature of a host function: `(engine, this, arguments)`.
pub type NativeFn = Rc<dyn Fn(&mut Engine, &Value, &[Value]) -> Result<Value, Error>>;

/// A callable value.
pub enum Callable {
    /// A function defined in script.
    Script(FunctionValue),
    /// A function implemented by the host.
    Native {
        /// Name reported by `Display`
        name: String,
        /// The implementation
        func: NativeFn,
    },
}

/// A script function closed over its defining scope.
#[derive(Clone)]
pub struct FunctionValue {
    /// Function name, if any
    pub name: Option<String>,
    /// Parameter names
    pub params: Vec<String>,
    /// Function body
    pub body: Rc<[Statement]>,
    /// Scope captured at creation
    pub closure: ScopeRef,
    /// Whether the body runs in strict mode
    pub strict: bool,
}

impl Callable {
    /// Wraps a host closure as a callable.
    pub fn native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&mut Engine, &Value, &[Value]) -> Result<Value, Error> + 'static,
    {
        Callable::Native {
            name: name.to_string(),
            func: Rc::new(func),
        }
    }

    /// The function's name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Callable::Script(f) => f.name.as_deref(),
            Callable::Native { name, .. } => Some(name),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Script(func) => f
                .debug_struct("Function")
                .field("name", &func.name)
                .field("params", &func.params)
                .field("strict", &func.strict)
                .finish(),
            Callable::Native { name, .. } => f.debug_struct("Native").field("name", name).finish(),
        }
    }
}
