//! JavaScript object representation.

use super::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A JavaScript object: an insertion-ordered list of own data properties.
#[derive(Debug, Clone, Default)]
pub struct Object {
    properties: Vec<Property>,
    index: FxHashMap<String, usize>,
}

/// An own data property.
#[derive(Debug, Clone)]
pub struct Property {
    /// The property name
    pub name: String,
    /// The property value
    pub value: Value,
    /// Whether the property is writable
    pub writable: bool,
}

/// Returned when a write hits a read-only property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOnly;

impl Object {
    /// Creates a new empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a property value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.property(key).map(|p| &p.value)
    }

    /// Gets a property record.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.index.get(key).map(|&slot| &self.properties[slot])
    }

    /// Checks if an own property exists.
    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Assigns a property, creating a writable one if it does not exist.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ReadOnly> {
        match self.index.get(key) {
            Some(&slot) => {
                let property = &mut self.properties[slot];
                if !property.writable {
                    return Err(ReadOnly);
                }
                property.value = value;
                Ok(())
            }
            None => {
                self.define(key, value, true);
                Ok(())
            }
        }
    }

    /// Defines (or redefines) a data property, keeping its original position.
    pub fn define(&mut self, key: &str, value: Value, writable: bool) {
        match self.index.get(key) {
            Some(&slot) => {
                let property = &mut self.properties[slot];
                property.value = value;
                property.writable = writable;
            }
            None => {
                self.index.insert(key.to_string(), self.properties.len());
                self.properties.push(Property {
                    name: key.to_string(),
                    value,
                    writable,
                });
            }
        }
    }

    /// Own properties in insertion order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Number of own properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if the object has no own properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A shared handle to a heap object.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Allocates a new empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a property value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    /// Checks if an own property exists.
    pub fn has(&self, key: &str) -> bool {
        self.0.borrow().has(key)
    }

    /// Assigns a property.
    pub fn set(&self, key: &str, value: Value) -> Result<(), ReadOnly> {
        self.0.borrow_mut().set(key, value)
    }

    /// Defines a data property.
    pub fn define(&self, key: &str, value: Value, writable: bool) {
        self.0.borrow_mut().define(key, value, writable);
    }

    /// Snapshot of the own properties as `(name, value)` pairs, in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .properties()
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }

    /// Snapshot of the own property names, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0
            .borrow()
            .properties()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Returns true if the property exists and is read-only.
    pub fn is_read_only(&self, key: &str) -> bool {
        self.0.borrow().property(key).is_some_and(|p| !p.writable)
    }

    /// Number of own properties.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns true if the object has no own properties.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) => f
                .debug_map()
                .entries(obj.properties().iter().map(|p| (&p.name, &p.value)))
                .finish(),
            Err(_) => write!(f, "Object(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut obj = Object::new();
        obj.define("b", Value::Number(1.0), true);
        obj.define("a", Value::Number(2.0), true);
        obj.define("b", Value::Number(3.0), true);
        let names: Vec<_> = obj.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(obj.get("b"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_read_only_property_rejects_set() {
        let obj = ObjectRef::new();
        obj.define("x", Value::Number(1.0), false);
        assert_eq!(obj.set("x", Value::Number(2.0)), Err(ReadOnly));
        assert_eq!(obj.get("x"), Some(Value::Number(1.0)));
        assert!(obj.is_read_only("x"));
    }

    #[test]
    fn test_set_creates_missing_property() {
        let obj = ObjectRef::new();
        assert!(obj.set("fresh", Value::Boolean(true)).is_ok());
        assert!(obj.has("fresh"));
        assert!(!obj.is_read_only("fresh"));
    }
}
