// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-file module declaration state.

use super::binding::NameBinding;
use super::error::ModuleError;
use super::node::RequestNode;

/// Import and export declarations accumulated while parsing one file.
#[derive(Debug, Clone, Default)]
pub struct ModuleLinkContext {
    imports: Vec<RequestNode>,
    exports: Option<RequestNode>,
    processing_default: bool,
}

impl ModuleLinkContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Import nodes, one per distinct path, in first-seen order.
    pub fn imports(&self) -> &[RequestNode] {
        &self.imports
    }

    /// The file's export table.
    pub fn exports(&self) -> Option<&RequestNode> {
        self.exports.as_ref()
    }

    /// Returns true if no declaration was recorded.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.exports.is_none()
    }

    /// Whether a `default` clause is being parsed.
    pub fn processing_default(&self) -> bool {
        self.processing_default
    }

    /// Sets the `default` clause flag.
    pub fn set_processing_default(&mut self, value: bool) {
        self.processing_default = value;
    }

    /// Records one binding on the node of the statement being parsed.
    ///
    /// Imports must not reuse an alias already bound by this statement or an
    /// earlier one. Exports may declare at most one default per file.
    pub fn add_binding(
        &self,
        node: &mut RequestNode,
        binding: NameBinding,
        is_import: bool,
    ) -> Result<(), ModuleError> {
        if is_import {
            if let Some(alias) = binding.import_name.as_deref() {
                if node.has_alias(alias) || self.imports.iter().any(|n| n.has_alias(alias)) {
                    return Err(ModuleError::DuplicateBinding {
                        name: alias.to_string(),
                    });
                }
            }
        } else if binding.is_default && (node.has_default() || self.has_default_export()) {
            return Err(ModuleError::DuplicateDefaultExport);
        }
        node.push(binding)
    }

    /// Returns true if the export table already holds a default export.
    pub fn has_default_export(&self) -> bool {
        self.exports.as_ref().is_some_and(RequestNode::has_default)
    }

    /// Adds a finished import node, merging it into an existing node for the same path.
    pub fn add_import_node(&mut self, node: RequestNode) -> Result<(), ModuleError> {
        match self
            .imports
            .iter_mut()
            .find(|existing| existing.script_path() == node.script_path())
        {
            Some(existing) => existing.append(node),
            None => {
                self.imports.push(node);
                Ok(())
            }
        }
    }

    /// Adds a finished export node to the file's single export table.
    pub fn add_export_node(&mut self, node: RequestNode) -> Result<(), ModuleError> {
        match &mut self.exports {
            Some(exports) => exports.append(node),
            None => {
                self.exports = Some(node);
                Ok(())
            }
        }
    }

    /// Rejects a whole-module import that has neither an alias nor the
    /// re-export marking.
    pub fn check_valid_aliases(&self) -> Result<(), ModuleError> {
        let unaliased = self.imports.iter().any(|node| {
            node.whole_module_request()
                .is_some_and(|b| b.import_name.is_none() && !b.is_moved())
        });
        if unaliased {
            Err(ModuleError::InvalidAlias)
        } else {
            Ok(())
        }
    }

    /// Appends a binding merged in by `export * from`.
    pub fn add_reexport(&mut self, binding: NameBinding) -> Result<(), ModuleError> {
        self.exports
            .get_or_insert_with(|| RequestNode::new(""))
            .push(binding)
    }

    /// Removes the export table.
    pub fn take_exports(&mut self) -> RequestNode {
        self.exports.take().unwrap_or_default()
    }

    /// Releases every binding the context owns. Returns how many were dropped.
    ///
    /// Import nodes are always released in full. The export table keeps its
    /// moved bindings unless the file itself `failed`.
    pub fn teardown(&mut self, failed: bool) -> usize {
        let mut released: usize = self.imports.iter_mut().map(|n| n.release(true)).sum();
        self.imports.clear();
        if let Some(exports) = &mut self.exports {
            released += exports.release(failed);
        }
        self.processing_default = false;
        tracing::trace!(released, failed, "module context torn down");
        released
    }
}
