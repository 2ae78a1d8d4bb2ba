// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module subsystem errors.

use std::fmt;
use thiserror::Error;

/// Errors raised while recording, loading or linking modules.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The host could not read a dependency's source.
    #[error("cannot read module '{path}'")]
    FileNotFound {
        /// Requested path
        path: String,
    },

    /// A dependency failed to parse, validate or execute.
    #[error("module '{path}' could not be loaded")]
    ModuleNotFound {
        /// Requested path
        path: String,
        /// What went wrong inside the dependency
        #[source]
        source: Option<Box<crate::Error>>,
    },

    /// The importer asked for names the dependency does not export.
    #[error("module '{path}' does not export: {}", .names.join(", "))]
    UnresolvedImport {
        /// Requested path
        path: String,
        /// Every requested name without a matching export
        names: Vec<String>,
    },

    /// More than 65535 bindings accumulated for one path or export table.
    #[error("too many module requests (limit is {limit})")]
    RequestLimitExceeded {
        /// The cap that was hit
        limit: usize,
    },

    /// A local name was imported twice in one file.
    #[error("duplicate import binding '{name}'")]
    DuplicateBinding {
        /// The repeated name
        name: String,
    },

    /// A file declared more than one default export.
    #[error("duplicate default export")]
    DuplicateDefaultExport,

    /// A whole-module import without an alias.
    #[error("whole-module import requires an alias")]
    InvalidAlias,

    /// `import`/`export` outside the top level of a file.
    #[error("import and export declarations may only appear at the top level")]
    ModuleStatementMisplaced,

    /// A grammar violation inside a module declaration.
    #[error("malformed module declaration: {reason}")]
    MalformedSpecifierSyntax {
        /// What was expected
        reason: String,
    },

    /// A recognised but unsupported form.
    #[error("{what} is not implemented")]
    NotImplemented {
        /// The unsupported form
        what: &'static str,
    },

    /// A dependency is already being linked further up the stack.
    #[error("circular import: {}", .chain.join(" -> "))]
    CircularImport {
        /// Paths from the outermost frame to the repeated one
        chain: Vec<String>,
    },

    /// Dependencies nest deeper than the configured limit.
    #[error("module nesting exceeds {limit} levels")]
    LinkDepthExceeded {
        /// The configured limit
        limit: usize,
    },
}

/// Coarse error code, one per failure kind a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleErrorKind {
    /// See [`ModuleError::FileNotFound`]
    FileNotFound,
    /// Parse, execution or resolution failure of a dependency
    ModuleNotFound,
    /// See [`ModuleError::RequestLimitExceeded`]
    RequestLimitExceeded,
    /// See [`ModuleError::DuplicateBinding`]
    DuplicateBinding,
    /// See [`ModuleError::DuplicateDefaultExport`]
    DuplicateDefaultExport,
    /// See [`ModuleError::InvalidAlias`]
    InvalidAlias,
    /// See [`ModuleError::ModuleStatementMisplaced`]
    ModuleStatementMisplaced,
    /// See [`ModuleError::MalformedSpecifierSyntax`]
    MalformedSpecifierSyntax,
    /// See [`ModuleError::NotImplemented`]
    NotImplemented,
    /// See [`ModuleError::CircularImport`]
    CircularImport,
    /// See [`ModuleError::LinkDepthExceeded`]
    LinkDepthExceeded,
}

impl ModuleError {
    /// Shorthand for a grammar error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ModuleError::MalformedSpecifierSyntax {
            reason: reason.into(),
        }
    }

    /// Wraps a dependency failure.
    pub fn not_found(path: &str, source: crate::Error) -> Self {
        ModuleError::ModuleNotFound {
            path: path.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// The status code of this error.
    pub fn kind(&self) -> ModuleErrorKind {
        match self {
            ModuleError::FileNotFound { .. } => ModuleErrorKind::FileNotFound,
            ModuleError::ModuleNotFound { .. } | ModuleError::UnresolvedImport { .. } => {
                ModuleErrorKind::ModuleNotFound
            }
            ModuleError::RequestLimitExceeded { .. } => ModuleErrorKind::RequestLimitExceeded,
            ModuleError::DuplicateBinding { .. } => ModuleErrorKind::DuplicateBinding,
            ModuleError::DuplicateDefaultExport => ModuleErrorKind::DuplicateDefaultExport,
            ModuleError::InvalidAlias => ModuleErrorKind::InvalidAlias,
            ModuleError::ModuleStatementMisplaced => ModuleErrorKind::ModuleStatementMisplaced,
            ModuleError::MalformedSpecifierSyntax { .. } => {
                ModuleErrorKind::MalformedSpecifierSyntax
            }
            ModuleError::NotImplemented { .. } => ModuleErrorKind::NotImplemented,
            ModuleError::CircularImport { .. } => ModuleErrorKind::CircularImport,
            ModuleError::LinkDepthExceeded { .. } => ModuleErrorKind::LinkDepthExceeded,
        }
    }
}

impl fmt::Display for ModuleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
