// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Dependency loading and binding linkage.

use super::binding::NameBinding;
use super::context::ModuleLinkContext;
use super::error::ModuleError;
use super::link::{LinkStack, LoadState};
use super::node::RequestNode;
use crate::parser::ParseOptions;
use crate::runtime::{ObjectRef, ScopeRef, Value};
use crate::{Engine, Error};
use rustc_hash::FxHashSet;

impl Engine {
    /// Loads every dependency recorded in `context`, binding what it requests into `scope`.
    ///
    /// Dependencies load in first-import order; the first failure stops the walk.
    pub(crate) fn load_modules(
        &mut self,
        context: &mut ModuleLinkContext,
        scope: &ScopeRef,
    ) -> Result<(), Error> {
        for index in 0..context.imports().len() {
            let request = context.imports()[index].clone();
            LinkStack::with_frame(
                self,
                |engine| &mut engine.link_stack,
                request.script_path(),
                |engine| engine.link_dependency(&request, context, scope),
            )?;
        }
        Ok(())
    }

    fn link_dependency(
        &mut self,
        request: &RequestNode,
        importer: &mut ModuleLinkContext,
        scope: &ScopeRef,
    ) -> Result<(), Error> {
        let path = request.script_path();

        self.link_stack.advance(LoadState::Loading);
        let source = self.read_module_source(path).map_err(|err| match err {
            Error::Module(_) => err,
            other => surface(path, other),
        })?;

        let options = ParseOptions {
            strict: self.options().strict_modules,
            ..ParseOptions::default()
        };
        let mut unit = self
            .parse(path, &source, options)
            .map_err(|err| surface(path, err))?;
        drop(source);
        self.link_stack.advance(LoadState::Parsed);

        let module_scope = ScopeRef::new_declarative(self.global());
        let mut context = unit.modules.take().unwrap_or_default();
        if let Err(err) = self.load_modules(&mut context, &module_scope) {
            context.teardown(true);
            return Err(surface(path, err));
        }
        let mut exports = context.take_exports();
        context.teardown(false);

        let unresolved: Vec<String> = request
            .bindings()
            .iter()
            .filter(|binding| !binding.is_whole_module() && !exports.satisfies(binding))
            .map(|binding| binding.local().to_string())
            .collect();
        if !unresolved.is_empty() {
            exports.release(true);
            return Err(ModuleError::UnresolvedImport {
                path: path.to_string(),
                names: unresolved,
            }
            .into());
        }

        self.execute(&unit, &module_scope)
            .map_err(|err| surface(path, err))?;
        self.link_stack.advance(LoadState::Executed);

        connect_properties(request, &exports, &module_scope, importer, scope)?;
        self.link_stack.advance(LoadState::Linked);

        let released = exports.release(false);
        tracing::debug!(path, released, kept = exports.request_count(), "export table released");
        self.link_stack.advance(LoadState::Released);
        Ok(())
    }
}

/// Binds the executed dependency's exports into the importer.
///
/// Whole-module requests collect every non-default export, either into a
/// namespace object (aliased) or straight into the importer's scope
/// (`export * from`, which also extends the importer's export table).
/// Named and default requests are bound under the importer's alias.
fn connect_properties(
    request: &RequestNode,
    exports: &RequestNode,
    module_scope: &ScopeRef,
    importer: &mut ModuleLinkContext,
    scope: &ScopeRef,
) -> Result<(), Error> {
    let path = request.script_path();
    if request.is_side_effect_only() {
        tracing::debug!(path, "side-effect import, nothing to bind");
        return Ok(());
    }

    let whole_module = request.whole_module_request();
    let namespace = whole_module
        .filter(|binding| binding.import_name.is_some())
        .map(|_| ObjectRef::new());
    let properties = module_scope.enumerate_own_properties();
    let mut reexported = Vec::new();

    for (name, value) in &properties {
        let mut visible = false;
        for export in exports.exports_for(name) {
            visible = true;

            if let Some(whole) = whole_module {
                if !export.is_default {
                    match &namespace {
                        Some(object) => object.define(export.alias(), value.clone(), false),
                        None => {
                            scope.define(export.alias(), value.clone(), false);
                            if whole.is_moved() {
                                reexported.push(
                                    NameBinding::named(export.alias(), export.alias()).moved(),
                                );
                            }
                        }
                    }
                }
            }

            for import in request.matching_imports(export) {
                tracing::debug!(path, export = export.alias(), alias = import.alias(), "import bound");
                scope.define(import.alias(), value.clone(), false);
            }
        }
        if !visible {
            tracing::trace!(path, property = %name, "property not exported");
        }
    }

    if let (Some(whole), Some(object)) = (whole_module, namespace) {
        tracing::debug!(path, alias = whole.alias(), "namespace bound");
        scope.define(whole.alias(), Value::Object(object), false);
    }

    let defined: FxHashSet<&str> = properties.iter().map(|(name, _)| name.as_str()).collect();
    for export in exports.bindings() {
        if !defined.contains(export.local()) {
            tracing::warn!(path, export = export.alias(), "declared export has no binding");
        }
    }

    for binding in reexported {
        importer.add_reexport(binding)?;
    }
    Ok(())
}

/// Reports a dependency failure to its importer as `ModuleNotFound`.
///
/// Cycle and depth errors describe the whole graph and pass through.
fn surface(path: &str, err: Error) -> Error {
    match err {
        Error::Module(ModuleError::CircularImport { .. } | ModuleError::LinkDepthExceeded { .. }) => err,
        other => ModuleError::not_found(path, other).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{MemorySourceReader, ModuleErrorKind};

    fn engine(files: &[(&str, &str)]) -> Engine {
        let mut reader = MemorySourceReader::new();
        for (path, source) in files {
            reader.insert(*path, *source);
        }
        Engine::new().with_source_reader(reader)
    }

    #[test]
    fn test_link_stack_is_empty_after_success_and_failure() {
        let mut ok = engine(&[("b.js", "export var b = 1;")]);
        ok.run_module("a.js", r#"import { b } from "b.js";"#).unwrap();
        assert!(ok.link_stack().is_empty());

        let mut failing = engine(&[("b.js", "export var b = ;")]);
        assert!(failing.run_module("a.js", r#"import { b } from "b.js";"#).is_err());
        assert!(failing.link_stack().is_empty());
    }

    #[test]
    fn test_parse_failure_keeps_source() {
        let mut engine = engine(&[("b.js", "export var b = ;")]);
        let err = engine
            .run_module("a.js", r#"import { b } from "b.js";"#)
            .unwrap_err();
        match err {
            Error::Module(ModuleError::ModuleNotFound { path, source }) => {
                assert_eq!(path, "b.js");
                assert!(matches!(source.as_deref(), Some(Error::Syntax(_))));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_execution_failure_is_module_not_found() {
        let mut engine = engine(&[("b.js", "throw 'nope'; export var b = 1;")]);
        let err = engine
            .run_module("a.js", r#"import { b } from "b.js";"#)
            .unwrap_err();
        assert_eq!(err.module_kind(), Some(ModuleErrorKind::ModuleNotFound));
    }

    #[test]
    fn test_nested_file_not_found_is_wrapped() {
        let mut engine = engine(&[("b.js", r#"import { c } from "c.js"; export var b = c;"#)]);
        let err = engine
            .run_module("a.js", r#"import { b } from "b.js";"#)
            .unwrap_err();
        match err {
            Error::Module(ModuleError::ModuleNotFound { path, source }) => {
                assert_eq!(path, "b.js");
                assert_eq!(
                    source.and_then(|s| s.module_kind()),
                    Some(ModuleErrorKind::FileNotFound)
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dependency_runs_strict() {
        let mut engine = engine(&[("b.js", "leaked = 1; export var b = 1;")]);
        let err = engine
            .run_module("a.js", r#"import { b } from "b.js";"#)
            .unwrap_err();
        match err {
            Error::Module(ModuleError::ModuleNotFound { source, .. }) => {
                assert!(matches!(source.as_deref(), Some(Error::Reference(_))));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
