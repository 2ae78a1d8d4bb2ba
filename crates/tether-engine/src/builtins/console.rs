//! Console output.

use crate::runtime::Value;
use crate::{Engine, Error};

fn join(args: &[Value]) -> String {
    args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// console.log / print - prints to stdout
pub fn console_log(_engine: &mut Engine, _this: &Value, args: &[Value]) -> Result<Value, Error> {
    println!("{}", join(args));
    Ok(Value::Undefined)
}

/// console.error - prints to stderr
pub fn console_error(_engine: &mut Engine, _this: &Value, args: &[Value]) -> Result<Value, Error> {
    eprintln!("{}", join(args));
    Ok(Value::Undefined)
}
