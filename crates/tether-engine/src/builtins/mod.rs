//! Built-in globals installed into every engine.

mod console;
mod global;

use crate::runtime::{Callable, ObjectRef, Value};
use crate::Engine;
use std::rc::Rc;

/// Defines the global constants, `eval` and `console`.
pub(crate) fn install(engine: &mut Engine) {
    let scope = engine.global().clone();
    scope.define("undefined", Value::Undefined, false);
    scope.define("NaN", Value::Number(f64::NAN), false);
    scope.define("Infinity", Value::Number(f64::INFINITY), false);

    let eval = Rc::new(Callable::native("eval", global::eval));
    engine.eval_function = Some(eval.clone());
    scope.define("eval", Value::Function(eval), true);

    let console_object = ObjectRef::new();
    console_object.define("log", native("log", console::console_log), true);
    console_object.define("error", native("error", console::console_error), true);
    scope.define("console", Value::Object(console_object), true);
    scope.define("print", native("print", console::console_log), true);
}

fn native(
    name: &str,
    func: fn(&mut Engine, &Value, &[Value]) -> Result<Value, crate::Error>,
) -> Value {
    Value::Function(Rc::new(Callable::native(name, func)))
}
