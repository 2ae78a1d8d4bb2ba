// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tether-ext
//!
//! Host extensions for the tether engine.
//!
//! The main piece is a CommonJS style `require()` built from an ordered
//! chain of resolvers. Each resolver canonicalizes a specifier and, if it
//! claims it, loads the module's value.
//!
//! ```rust,no_run
//! use tether_engine::Engine;
//! use tether_ext::{install_require, JsFileResolver, RequireChain};
//!
//! let mut engine = Engine::new();
//! let chain = RequireChain::new().with_resolver(JsFileResolver::new());
//! install_require(&mut engine, chain).unwrap();
//! engine.eval("var greet = require('greet');").unwrap();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod require;

pub use error::{ExtError, Result};
pub use require::{install_require, JsFileResolver, ModuleResolver, RequireChain};
