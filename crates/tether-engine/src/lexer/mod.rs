//! Lexical analysis (tokenization) for JavaScript source code.
//!
//! The lexer transforms source text into a stream of tokens consumed by the
//! parser. Only the token set the engine understands is produced; anything
//! else becomes [`TokenKind::Invalid`] and is reported by the parser.
//!
//! ## Usage
//!
//! ```rust
//! use tether_engine::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("import { a } from \"dep.js\";");
//!
//! loop {
//!     let token = scanner.next_token();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};
