// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! ECMAScript module resolution and binding linkage.
//!
//! ## Recording
//! While a file is parsed, every `import`/`export` declaration is recorded
//! into that file's [`ModuleLinkContext`]: one [`RequestNode`] per imported
//! path (statements naming the same path are merged) and a single node
//! holding the file's exports.
//!
//! ## Linking
//! Once a unit has parsed, each requested path is loaded depth first:
//! its source is read through the host [`SourceReader`], parsed, its own
//! dependencies linked, and it is executed in a fresh scope. The
//! properties of that scope are matched against the dependency's export
//! table and the requested subset (named, default or namespace) is bound
//! read-only into the importer's scope.
//!
//! A [`LinkStack`] tracks the dependencies currently being loaded, which
//! rejects import cycles and bounds nesting.

mod binding;
mod context;
mod error;
mod link;
mod loader;
mod node;
mod port;

pub use binding::{DEFAULT_BINDING, DEFAULT_EXPORT, NameBinding, Ownership};
pub use context::ModuleLinkContext;
pub use error::{ModuleError, ModuleErrorKind};
pub use link::{LinkFrame, LinkStack, LoadState};
pub use node::{MAX_REQUEST_COUNT, RequestNode};
pub use port::{FsSourceReader, MemorySourceReader, SourceReader};
