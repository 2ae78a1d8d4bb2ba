//! Lexical scopes.
//!
//! A scope is an insertion-ordered binding object plus an optional outer
//! scope. The global scope's binding object is the global object itself, so
//! `enumerate_own_properties` on it sees everything a script defined at top
//! level.

use super::object::{ObjectRef, ReadOnly};
use super::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

struct Scope {
    bindings: ObjectRef,
    outer: Option<ScopeRef>,
}

/// A shared handle to a scope.
#[derive(Clone)]
pub struct ScopeRef(Rc<RefCell<Scope>>);

/// Why an assignment could not be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    /// No scope in the chain declares the name.
    Undeclared,
    /// The binding exists but is read-only.
    ReadOnly,
}

impl ScopeRef {
    /// Creates the global scope, backed by a fresh global object.
    pub fn new_global() -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: ObjectRef::new(),
            outer: None,
        })))
    }

    /// Creates an empty declarative scope nested in `outer`.
    pub fn new_declarative(outer: &ScopeRef) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: ObjectRef::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// The object holding this scope's own bindings.
    pub fn bindings(&self) -> ObjectRef {
        self.0.borrow().bindings.clone()
    }

    /// The enclosing scope.
    pub fn outer(&self) -> Option<ScopeRef> {
        self.0.borrow().outer.clone()
    }

    /// Returns true if this is the outermost scope.
    pub fn is_global(&self) -> bool {
        self.0.borrow().outer.is_none()
    }

    /// Creates or overwrites a binding in this scope.
    pub fn define(&self, name: &str, value: Value, writable: bool) {
        self.bindings().define(name, value, writable);
    }

    /// Returns true if this scope itself binds `name`.
    pub fn has_own(&self, name: &str) -> bool {
        self.bindings().has(name)
    }

    /// Resolves `name` through the scope chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if let Some(value) = scope.bindings().get(name) {
                return Some(value);
            }
            current = scope.outer();
        }
        None
    }

    /// Assigns to the nearest binding of `name`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            let bindings = scope.bindings();
            if bindings.has(name) {
                return bindings
                    .set(name, value)
                    .map_err(|ReadOnly| AssignError::ReadOnly);
            }
            current = scope.outer();
        }
        Err(AssignError::Undeclared)
    }

    /// `(name, value)` pairs this scope defines, in insertion order.
    pub fn enumerate_own_properties(&self) -> Vec<(String, Value)> {
        self.bindings().entries()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ScopeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("bindings", &self.bindings().keys())
            .field("global", &self.is_global())
            .finish()
    }
}
