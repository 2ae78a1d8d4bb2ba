//! Statement and expression evaluation.

use crate::ast::*;
use crate::module::DEFAULT_BINDING;
use crate::parser::{ParseOptions, Parser};
use crate::runtime::{AssignError, Callable, FunctionValue, ObjectRef, ScopeRef, Value};
use crate::{Engine, Error};
use std::rc::Rc;

/// Deepest allowed nesting of function calls.
pub const MAX_CALL_DEPTH: usize = 128;

/// How a statement list finished.
enum Completion {
    Normal(Value),
    Return(Value),
}

impl Engine {
    /// Runs a top-level body and yields the value of its last expression statement.
    pub(crate) fn run_body(
        &mut self,
        body: &[Statement],
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Value, Error> {
        hoist_declarations(body, scope, strict);
        match self.exec_statements(body, scope, strict)? {
            Completion::Normal(value) | Completion::Return(value) => Ok(value),
        }
    }

    /// Calls a function value.
    pub fn call(&mut self, function: &Value, this: &Value, args: &[Value]) -> Result<Value, Error> {
        let Value::Function(callable) = function else {
            return Err(Error::Type(format!("{} is not a function", function)));
        };
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Error::Range("Maximum call stack size exceeded".into()));
        }

        self.call_depth += 1;
        let result = match callable.as_ref() {
            Callable::Native { func, .. } => {
                let func = func.clone();
                func(self, this, args)
            }
            Callable::Script(func) => self.call_script(func, args),
        };
        self.call_depth -= 1;
        result
    }

    fn call_script(&mut self, func: &FunctionValue, args: &[Value]) -> Result<Value, Error> {
        let scope = ScopeRef::new_declarative(&func.closure);
        for (index, param) in func.params.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or_default();
            scope.define(param, value, true);
        }
        hoist_declarations(&func.body, &scope, func.strict);
        match self.exec_statements(&func.body, &scope, func.strict)? {
            Completion::Return(value) => Ok(value),
            Completion::Normal(_) => Ok(Value::Undefined),
        }
    }

    fn exec_statements(
        &mut self,
        body: &[Statement],
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Completion, Error> {
        let mut last = Value::Undefined;
        for statement in body {
            match self.exec_statement(statement, scope, strict)? {
                Completion::Normal(value) => {
                    if !matches!(statement, Statement::Empty) {
                        last = value;
                    }
                }
                ret @ Completion::Return(_) => return Ok(ret),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_statement(
        &mut self,
        statement: &Statement,
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Completion, Error> {
        match statement {
            Statement::VariableDeclaration(declaration) => {
                for declarator in &declaration.declarations {
                    match &declarator.init {
                        Some(init) => {
                            let value = self.eval_expression(init, scope, strict)?;
                            let writable = declaration.kind != VariableKind::Const;
                            scope.define(&declarator.name, value, writable);
                        }
                        None if !scope.has_own(&declarator.name) => {
                            scope.define(&declarator.name, Value::Undefined, true);
                        }
                        None => {}
                    }
                }
                Ok(Completion::Normal(Value::Undefined))
            }
            // bound by hoisting
            Statement::FunctionDeclaration(_) => Ok(Completion::Normal(Value::Undefined)),
            Statement::Expression(expression) => {
                let value = self.eval_expression(expression, scope, strict)?;
                Ok(Completion::Normal(value))
            }
            Statement::Block(body) => self.exec_statements(body, scope, strict),
            Statement::If(stmt) => {
                if self.eval_expression(&stmt.test, scope, strict)?.to_boolean() {
                    self.exec_statement(&stmt.consequent, scope, strict)
                } else if let Some(alternate) = &stmt.alternate {
                    self.exec_statement(alternate, scope, strict)
                } else {
                    Ok(Completion::Normal(Value::Undefined))
                }
            }
            Statement::Return(argument) => {
                let value = match argument {
                    Some(expr) => self.eval_expression(expr, scope, strict)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::Throw(argument) => {
                let value = self.eval_expression(argument, scope, strict)?;
                Err(Error::Thrown(value))
            }
            Statement::ExportDefault(expression) => {
                let value = self.eval_expression(expression, scope, strict)?;
                scope.define(DEFAULT_BINDING, value, false);
                Ok(Completion::Normal(Value::Undefined))
            }
            Statement::Empty => Ok(Completion::Normal(Value::Undefined)),
        }
    }

    fn eval_expression(
        &mut self,
        expression: &Expression,
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Value, Error> {
        match expression {
            Expression::Number(n) => Ok(Value::Number(*n)),
            Expression::String(s) => Ok(Value::String(s.clone())),
            Expression::Boolean(b) => Ok(Value::Boolean(*b)),
            Expression::Null => Ok(Value::Null),
            Expression::Identifier(name) => scope
                .lookup(name)
                .ok_or_else(|| Error::Reference(format!("{} is not defined", name))),
            Expression::Object(properties) => {
                let object = ObjectRef::new();
                for (key, value) in properties {
                    let value = self.eval_expression(value, scope, strict)?;
                    object.define(key, value, true);
                }
                Ok(Value::Object(object))
            }
            Expression::Member(object, property) => {
                let target = self.eval_expression(object, scope, strict)?;
                get_property(&target, property)
            }
            Expression::Call(callee, arguments) => self.eval_call(callee, arguments, scope, strict),
            Expression::Assign(target, value) => {
                let value = self.eval_expression(value, scope, strict)?;
                self.assign(target, value, scope, strict)
            }
            Expression::Binary(operator, left, right) => {
                let left = self.eval_expression(left, scope, strict)?;
                match operator {
                    BinaryOperator::LogicalAnd if !left.to_boolean() => return Ok(left),
                    BinaryOperator::LogicalOr if left.to_boolean() => return Ok(left),
                    BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
                        return self.eval_expression(right, scope, strict);
                    }
                    _ => {}
                }
                let right = self.eval_expression(right, scope, strict)?;
                Ok(binary_operation(*operator, &left, &right))
            }
            Expression::Unary(operator, argument) => match operator {
                UnaryOperator::Typeof => {
                    if let Expression::Identifier(name) = argument.as_ref() {
                        if scope.lookup(name).is_none() {
                            return Ok(Value::String("undefined".into()));
                        }
                    }
                    let value = self.eval_expression(argument, scope, strict)?;
                    Ok(Value::String(value.type_of().into()))
                }
                UnaryOperator::LogicalNot => {
                    let value = self.eval_expression(argument, scope, strict)?;
                    Ok(Value::Boolean(!value.to_boolean()))
                }
                UnaryOperator::Minus => {
                    let value = self.eval_expression(argument, scope, strict)?;
                    Ok(Value::Number(-value.to_number()))
                }
            },
            Expression::Function(declaration) => Ok(make_function(declaration, scope, strict)),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Value, Error> {
        let (function, this) = match callee {
            Expression::Member(object, property) => {
                let target = self.eval_expression(object, scope, strict)?;
                let function = get_property(&target, property)?;
                (function, target)
            }
            _ => (self.eval_expression(callee, scope, strict)?, Value::Undefined),
        };

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval_expression(argument, scope, strict)?);
        }

        if matches!(callee, Expression::Identifier(name) if name == "eval") && self.is_eval(&function) {
            return self.direct_eval(args.first(), scope, strict);
        }

        if !function.is_function() {
            return Err(Error::Type(format!("{} is not a function", describe_callee(callee))));
        }
        self.call(&function, &this, &args)
    }

    fn is_eval(&self, function: &Value) -> bool {
        match (function, &self.eval_function) {
            (Value::Function(f), Some(eval)) => Rc::ptr_eq(f, eval),
            _ => false,
        }
    }

    /// `eval(source)` called by name: runs in the caller's scope.
    fn direct_eval(
        &mut self,
        source: Option<&Value>,
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Value, Error> {
        let Some(Value::String(source)) = source else {
            return Ok(source.cloned().unwrap_or_default());
        };
        let options = ParseOptions {
            strict,
            direct_eval: true,
            ..ParseOptions::default()
        };
        let mut parser = Parser::with_options(source, options);
        let program = parser.parse_program()?;
        let strict = parser.is_strict();
        // strict eval code gets its own variable environment
        let eval_scope = if strict {
            ScopeRef::new_declarative(scope)
        } else {
            scope.clone()
        };
        self.run_body(&program.body, &eval_scope, strict)
    }

    /// Indirect eval: global code that still may not declare modules.
    pub(crate) fn global_eval(&mut self, source: &str) -> Result<Value, Error> {
        let global = self.global().clone();
        let options = ParseOptions {
            direct_eval: true,
            ..ParseOptions::default()
        };
        let mut parser = Parser::with_options(source, options);
        let program = parser.parse_program()?;
        let strict = parser.is_strict();
        self.run_body(&program.body, &global, strict)
    }

    fn assign(
        &mut self,
        target: &Expression,
        value: Value,
        scope: &ScopeRef,
        strict: bool,
    ) -> Result<Value, Error> {
        match target {
            Expression::Identifier(name) => match scope.assign(name, value.clone()) {
                Ok(()) => Ok(value),
                Err(AssignError::Undeclared) if strict => {
                    Err(Error::Reference(format!("{} is not defined", name)))
                }
                Err(AssignError::Undeclared) => {
                    self.global().define(name, value.clone(), true);
                    Ok(value)
                }
                Err(AssignError::ReadOnly) if strict => Err(Error::Type(format!(
                    "Cannot assign to read only binding '{}'",
                    name
                ))),
                Err(AssignError::ReadOnly) => Ok(value),
            },
            Expression::Member(object, property) => {
                let target = self.eval_expression(object, scope, strict)?;
                let Value::Object(object) = target else {
                    return Err(Error::Type(format!(
                        "Cannot set property '{}' of {}",
                        property, target
                    )));
                };
                if object.set(property, value.clone()).is_err() && strict {
                    return Err(Error::Type(format!(
                        "Cannot assign to read only property '{}'",
                        property
                    )));
                }
                Ok(value)
            }
            _ => Err(Error::Syntax("Invalid assignment target".into())),
        }
    }
}

/// Binds function declarations and `var` names before a body runs.
fn hoist_declarations(body: &[Statement], scope: &ScopeRef, strict: bool) {
    for statement in body {
        match statement {
            Statement::FunctionDeclaration(declaration) => {
                if let Some(name) = &declaration.name {
                    scope.define(name, make_function(declaration, scope, strict), true);
                }
            }
            Statement::VariableDeclaration(declaration) if declaration.kind == VariableKind::Var => {
                for declarator in &declaration.declarations {
                    if !scope.has_own(&declarator.name) {
                        scope.define(&declarator.name, Value::Undefined, true);
                    }
                }
            }
            Statement::Block(inner) => hoist_declarations(inner, scope, strict),
            Statement::If(stmt) => {
                hoist_declarations(std::slice::from_ref(&*stmt.consequent), scope, strict);
                if let Some(alternate) = &stmt.alternate {
                    hoist_declarations(std::slice::from_ref(&**alternate), scope, strict);
                }
            }
            _ => {}
        }
    }
}

/// Closes a function over `scope`; strict code only creates strict functions.
fn make_function(declaration: &FunctionDeclaration, scope: &ScopeRef, strict: bool) -> Value {
    Value::Function(Rc::new(Callable::Script(FunctionValue {
        name: declaration.name.clone(),
        params: declaration.params.clone(),
        body: declaration.body.clone(),
        closure: scope.clone(),
        strict: declaration.strict || strict,
    })))
}

fn get_property(target: &Value, property: &str) -> Result<Value, Error> {
    match target {
        Value::Object(object) => Ok(object.get(property).unwrap_or_default()),
        Value::String(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        Value::Function(callable) if property == "name" => Ok(Value::String(
            callable.name().unwrap_or_default().to_string(),
        )),
        Value::Undefined | Value::Null => Err(Error::Type(format!(
            "Cannot read properties of {} (reading '{}')",
            target, property
        ))),
        _ => Ok(Value::Undefined),
    }
}

fn describe_callee(callee: &Expression) -> String {
    match callee {
        Expression::Identifier(name) => name.clone(),
        Expression::Member(object, property) => format!("{}.{}", describe_callee(object), property),
        _ => "expression".into(),
    }
}

fn binary_operation(operator: BinaryOperator, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOperator::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", left, right))
            }
            _ => Value::Number(left.to_number() + right.to_number()),
        },
        BinaryOperator::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinaryOperator::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOperator::Modulo => Value::Number(left.to_number() % right.to_number()),
        BinaryOperator::Equal => Value::Boolean(left.loose_equals(right)),
        BinaryOperator::NotEqual => Value::Boolean(!left.loose_equals(right)),
        BinaryOperator::StrictEqual => Value::Boolean(left == right),
        BinaryOperator::StrictNotEqual => Value::Boolean(left != right),
        BinaryOperator::LessThan => compare(left, right, |o| o.is_lt()),
        BinaryOperator::LessThanEqual => compare(left, right, |o| o.is_le()),
        BinaryOperator::GreaterThan => compare(left, right, |o| o.is_gt()),
        BinaryOperator::GreaterThanEqual => compare(left, right, |o| o.is_ge()),
        // short-circuited by the caller
        BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => Value::Undefined,
    }
}

fn compare(left: &Value, right: &Value, test: fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    };
    Value::Boolean(ordering.is_some_and(test))
}
