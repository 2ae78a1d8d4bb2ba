// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for host extensions

use tether_engine::ModuleError;
use thiserror::Error;

/// Result type for extension operations
pub type Result<T> = std::result::Result<T, ExtError>;

/// Errors that can occur while resolving or loading `require()` modules
#[derive(Debug, Error)]
pub enum ExtError {
    /// JavaScript engine error
    #[error("{0}")]
    Engine(#[from] tether_engine::Error),

    /// No resolver claimed the specifier
    #[error("Cannot find module '{specifier}'")]
    ModuleNotFound {
        /// The specifier passed to `require()`
        specifier: String,
    },

    /// A resolver claimed the specifier but could not load it
    #[error("Error loading module '{path}': {reason}")]
    Load {
        /// Canonical path of the module
        path: String,
        /// Reason for failure
        reason: String,
    },

    /// `require` is already defined on the global object
    #[error("require() is already installed")]
    AlreadyInstalled,

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),
}

impl ExtError {
    /// Create a module not found error
    pub fn module_not_found(specifier: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.into(),
        }
    }

    /// Create a load error
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised from inside the `require` native surface as engine errors.
impl From<ExtError> for tether_engine::Error {
    fn from(err: ExtError) -> Self {
        match err {
            ExtError::Engine(err) => err,
            ExtError::ModuleNotFound { specifier } => ModuleError::ModuleNotFound {
                path: specifier,
                source: None,
            }
            .into(),
            ExtError::AlreadyInstalled => {
                tether_engine::Error::Type("require is already defined".into())
            }
            other => tether_engine::Error::Io(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_engine::ModuleErrorKind;

    #[test]
    fn test_not_found_maps_to_module_kind() {
        let err: tether_engine::Error = ExtError::module_not_found("left-pad").into();
        assert_eq!(err.module_kind(), Some(ModuleErrorKind::ModuleNotFound));
        assert!(err.to_string().contains("left-pad"));
    }

    #[test]
    fn test_engine_error_passes_through() {
        let err: tether_engine::Error =
            ExtError::from(tether_engine::Error::Syntax("bad".into())).into();
        assert!(matches!(err, tether_engine::Error::Syntax(_)));
    }

    #[test]
    fn test_load_message() {
        let err = ExtError::load("/tmp/a.js", "empty file");
        assert_eq!(err.to_string(), "Error loading module '/tmp/a.js': empty file");
    }
}
