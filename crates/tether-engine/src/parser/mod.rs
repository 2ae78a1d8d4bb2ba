//! Parser for JavaScript source code.
//!
//! Transforms a stream of tokens into an Abstract Syntax Tree (AST).
//!
//! ## Structure
//!
//! - `parser` - Recursive descent parser for statements and expressions
//! - `modules` - `import`/`export` declarations, recorded into the file's
//!   [`ModuleLinkContext`](crate::module::ModuleLinkContext)
//!
//! ## Usage
//!
//! ```rust
//! use tether_engine::parser::Parser;
//!
//! let mut parser = Parser::new("let x = 1 + 2;");
//! let program = parser.parse_program().expect("Should parse");
//! assert_eq!(program.body.len(), 1);
//! ```

mod modules;
#[allow(clippy::module_inception)]
mod parser;

pub use parser::{ParseOptions, Parser};
