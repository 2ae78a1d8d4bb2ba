// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tether-engine
//!
//! An embeddable JavaScript engine with static `import`/`export` linking.
//!
//! ## Overview
//!
//! This crate provides:
//! - A lexer and recursive descent parser for a compact JavaScript subset
//! - A tree-walking evaluator over an insertion-ordered object model
//! - The module subsystem: import/export recording, dependency loading and
//!   binding linkage (see [`module`])
//!
//! ## Quick Start
//!
//! ```rust
//! use tether_engine::{Engine, MemorySourceReader, Value};
//!
//! let reader = MemorySourceReader::new()
//!     .with_file("math.js", "export function double(x) { return x * 2; }");
//! let mut engine = Engine::new().with_source_reader(reader);
//!
//! engine
//!     .run_module("main.js", r#"import { double } from "math.js"; var out = double(21);"#)
//!     .unwrap();
//! assert_eq!(engine.global().lookup("out"), Some(Value::Number(42.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
mod builtins;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod runtime;
pub mod vm;

use ast::Program;
use module::{LinkStack, ModuleLinkContext};
use std::rc::Rc;

// Re-exports for convenience
pub use module::{FsSourceReader, MemorySourceReader, ModuleError, ModuleErrorKind, SourceReader};
pub use parser::ParseOptions;
pub use runtime::{Callable, ObjectRef, ScopeRef, Value};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Run dependency files, and any entry with module declarations, as strict mode code.
    pub strict_modules: bool,
    /// Deepest allowed chain of nested dependency loads.
    pub max_link_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict_modules: true,
            max_link_depth: 256,
        }
    }
}

/// A parsed source text, ready to execute.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Name used in diagnostics (usually the path)
    pub name: String,
    /// The parsed statements
    pub program: Program,
    /// Module declarations, if the unit had any
    pub modules: Option<ModuleLinkContext>,
    /// Whether the unit runs as strict mode code
    pub strict: bool,
}

/// The main JavaScript engine instance.
///
/// Owns the global scope, the host source reader and the link stack used
/// while dependencies are loaded.
pub struct Engine {
    global: ScopeRef,
    options: EngineOptions,
    reader: Box<dyn SourceReader>,
    pub(crate) link_stack: LinkStack,
    pub(crate) eval_function: Option<Rc<Callable>>,
    pub(crate) call_depth: usize,
}

impl Engine {
    /// Creates a new engine with default options, reading modules from the file system.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Creates a new engine with explicit options.
    pub fn with_options(options: EngineOptions) -> Self {
        let mut engine = Self {
            global: ScopeRef::new_global(),
            link_stack: LinkStack::new(options.max_link_depth),
            options,
            reader: Box::new(FsSourceReader::new()),
            eval_function: None,
            call_depth: 0,
        };
        builtins::install(&mut engine);
        engine
    }

    /// Replaces the host source reader.
    pub fn with_source_reader(mut self, reader: impl SourceReader + 'static) -> Self {
        self.set_source_reader(reader);
        self
    }

    /// Replaces the host source reader.
    pub fn set_source_reader(&mut self, reader: impl SourceReader + 'static) {
        self.reader = Box::new(reader);
    }

    /// The engine configuration.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The global scope.
    pub fn global(&self) -> &ScopeRef {
        &self.global
    }

    /// The link stack; empty whenever no dependency is being loaded.
    pub fn link_stack(&self) -> &LinkStack {
        &self.link_stack
    }

    /// Defines a writable global binding.
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.global.define(name, value, true);
    }

    /// Defines a global host function.
    pub fn define_native<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Engine, &Value, &[Value]) -> Result<Value, Error> + 'static,
    {
        let function = Value::Function(Rc::new(Callable::native(name, func)));
        self.define_global(name, function);
    }

    /// Parses `source` into a unit. Module declarations are recorded, not linked.
    pub fn parse(
        &self,
        unit_name: &str,
        source: &str,
        options: ParseOptions,
    ) -> Result<CompiledUnit, Error> {
        let mut parser = parser::Parser::with_options(source, options);
        let program = parser.parse_program()?;
        let strict = parser.is_strict();
        let modules = parser.into_module_context();
        let strict = strict || (modules.is_some() && self.options.strict_modules);
        tracing::debug!(
            unit = unit_name,
            strict,
            module = modules.is_some(),
            "parsed unit"
        );
        Ok(CompiledUnit {
            name: unit_name.to_string(),
            program,
            modules,
            strict,
        })
    }

    /// Executes a parsed unit against `scope`. Module declarations are not linked.
    pub fn execute(&mut self, unit: &CompiledUnit, scope: &ScopeRef) -> Result<Value, Error> {
        self.run_body(&unit.program.body, scope, unit.strict)
    }

    /// Evaluates sloppy mode code in the global scope, linking any imports it declares.
    pub fn eval(&mut self, source: &str) -> Result<Value, Error> {
        let unit = self.parse("<eval>", source, ParseOptions::default())?;
        self.run_unit(unit)
    }

    /// Runs `source` as the entry module named `name`.
    pub fn run_module(&mut self, name: &str, source: &str) -> Result<Value, Error> {
        let options = ParseOptions {
            strict: self.options.strict_modules,
            ..ParseOptions::default()
        };
        let unit = self.parse(name, source, options)?;
        self.run_unit(unit)
    }

    /// Reads `path` through the source reader and runs it as the entry module.
    pub fn run_module_file(&mut self, path: &str) -> Result<Value, Error> {
        let source = self.read_module_source(path)?;
        self.run_module(path, &source)
    }

    pub(crate) fn read_module_source(&self, path: &str) -> Result<String, Error> {
        let bytes = self
            .reader
            .read_source(path)
            .map_err(|_| ModuleError::FileNotFound {
                path: path.to_string(),
            })?;
        String::from_utf8(bytes).map_err(|err| Error::Io(format!("{path}: {err}")))
    }

    fn run_unit(&mut self, mut unit: CompiledUnit) -> Result<Value, Error> {
        let global = self.global.clone();
        if let Some(mut context) = unit.modules.take() {
            let linked = self.load_modules(&mut context, &global);
            context.teardown(linked.is_err());
            linked?;
        }
        self.execute(&unit, &global)
    }

    /// Compiles `body` as a function with the given parameter names, closed over the global scope.
    pub fn parse_function(&self, name: &str, params: &[&str], body: &str) -> Result<Value, Error> {
        let options = ParseOptions {
            function_body: true,
            ..ParseOptions::default()
        };
        let mut parser = parser::Parser::with_options(body, options);
        let (statements, strict) = parser.parse_function_body()?;
        Ok(Value::Function(Rc::new(Callable::Script(
            runtime::FunctionValue {
                name: Some(name.to_string()),
                params: params.iter().map(|p| p.to_string()).collect(),
                body: Rc::from(statements),
                closure: self.global.clone(),
                strict,
            },
        ))))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur while parsing, linking or running JavaScript.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Syntax error during parsing
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// Type error during execution
    #[error("TypeError: {0}")]
    Type(String),

    /// Reference error (undeclared variable)
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// Range error (call stack exhausted)
    #[error("RangeError: {0}")]
    Range(String),

    /// A value thrown by script and not caught
    #[error("Uncaught {0}")]
    Thrown(Value),

    /// Module recording, loading or linking failed
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// I/O error
    #[error("IOError: {0}")]
    Io(String),
}

impl Error {
    /// The module status code, if this is a module error.
    pub fn module_kind(&self) -> Option<ModuleErrorKind> {
        match self {
            Error::Module(err) => Some(err.kind()),
            _ => None,
        }
    }
}
