//! Global functions.

use crate::runtime::Value;
use crate::{Engine, Error};

/// eval(source) when not called directly by name: evaluates in the global scope.
///
/// Calls written as `eval(...)` are intercepted by the evaluator and run in
/// the caller's scope instead.
pub fn eval(engine: &mut Engine, _this: &Value, args: &[Value]) -> Result<Value, Error> {
    match args.first() {
        Some(Value::String(source)) => engine.global_eval(source),
        Some(other) => Ok(other.clone()),
        None => Ok(Value::Undefined),
    }
}
