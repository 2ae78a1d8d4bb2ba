// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Default file system resolver for `require()`

use super::ModuleResolver;
use crate::error::{ExtError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tether_engine::{Engine, ObjectRef, Value};

/// Directory searched for bare module names
pub const DEFAULT_MODULES_DIR: &str = "jerry_modules";

/// Resolves `require()` specifiers to JavaScript files.
///
/// Specifiers starting with `/` or `.` are used verbatim. Bare names are
/// looked up as `<cwd>/<modules_dir>/<name>.js`, then
/// `<home>/<modules_dir>/<name>.js`; the first readable file wins.
///
/// A module file is the body of a function taking one parameter,
/// `exports`. Loading calls it with a fresh object and returns that object.
#[derive(Debug, Clone)]
pub struct JsFileResolver {
    modules_dir: String,
    cwd: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl JsFileResolver {
    /// Create a resolver using the process working directory and the user's home directory
    pub fn new() -> Self {
        Self {
            modules_dir: DEFAULT_MODULES_DIR.to_string(),
            cwd: std::env::current_dir().ok(),
            home: dirs::home_dir(),
        }
    }

    /// Set the directory name searched under the working and home directories
    pub fn with_modules_dir(mut self, name: impl Into<String>) -> Self {
        self.modules_dir = name.into();
        self
    }

    /// Set the working directory searched first
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set (or clear) the home directory searched second
    pub fn with_home(mut self, dir: Option<PathBuf>) -> Self {
        self.home = dir;
        self
    }

    /// The module directory name
    pub fn modules_dir(&self) -> &str {
        &self.modules_dir
    }

    fn search_roots(&self) -> impl Iterator<Item = &Path> {
        self.cwd.iter().chain(self.home.iter()).map(PathBuf::as_path)
    }
}

impl Default for JsFileResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleResolver for JsFileResolver {
    fn name(&self) -> &str {
        "js-file"
    }

    fn canonicalize(&self, specifier: &str) -> Option<String> {
        if specifier.is_empty() {
            return None;
        }
        if specifier.starts_with('/') || specifier.starts_with('.') {
            return Some(specifier.to_string());
        }

        let file_name = format!("{specifier}.js");
        self.search_roots()
            .map(|root| root.join(&self.modules_dir).join(&file_name))
            .find(|candidate| {
                let readable = candidate.is_file() && File::open(candidate).is_ok();
                tracing::trace!(candidate = %candidate.display(), readable, "probing module path");
                readable
            })
            .map(|found| found.to_string_lossy().into_owned())
    }

    fn load(&self, engine: &mut Engine, path: &str) -> Result<Value> {
        let source = fs::read_to_string(path).map_err(|err| {
            tracing::error!(path, error = %err, "failed to read module");
            ExtError::load(path, err.to_string())
        })?;

        let name = Path::new(path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("module");
        let function = engine.parse_function(name, &["exports"], &source)?;

        let exports = ObjectRef::new();
        engine.call(&function, &Value::Undefined, &[Value::Object(exports.clone())])?;
        tracing::debug!(path, properties = exports.len(), "module loaded");
        Ok(Value::Object(exports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_taken_verbatim() {
        let resolver = JsFileResolver::new().with_home(None);
        assert_eq!(
            resolver.canonicalize("/abs/lib.js").as_deref(),
            Some("/abs/lib.js")
        );
        assert_eq!(
            resolver.canonicalize("./rel.js").as_deref(),
            Some("./rel.js")
        );
        assert_eq!(
            resolver.canonicalize("../up.js").as_deref(),
            Some("../up.js")
        );
    }

    #[test]
    fn test_missing_bare_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = JsFileResolver::new().with_cwd(dir.path()).with_home(None);
        assert_eq!(resolver.canonicalize("ghost"), None);
        assert_eq!(resolver.canonicalize(""), None);
    }

    #[test]
    fn test_default_modules_dir() {
        assert_eq!(JsFileResolver::default().modules_dir(), "jerry_modules");
    }
}
