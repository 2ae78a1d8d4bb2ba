// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module request nodes.

use super::binding::{NameBinding, Ownership};
use super::error::ModuleError;

/// Most bindings one request node may accumulate.
pub const MAX_REQUEST_COUNT: usize = u16::MAX as usize;

/// The bindings a file requests from one path, or the file's own export table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestNode {
    script_path: String,
    bindings: Vec<NameBinding>,
    request_count: u16,
    is_side_effect_only: bool,
}

impl RequestNode {
    /// An empty node for `path`. Export tables use an empty path.
    pub fn new(path: &str) -> Self {
        Self {
            script_path: path.to_string(),
            ..Self::default()
        }
    }

    /// The dependency path.
    pub fn script_path(&self) -> &str {
        &self.script_path
    }

    /// Sets the path once the `from` clause has been read.
    pub fn set_script_path(&mut self, path: String) {
        self.script_path = path;
    }

    /// Recorded bindings, in declaration order.
    pub fn bindings(&self) -> &[NameBinding] {
        &self.bindings
    }

    /// Number of recorded bindings.
    pub fn request_count(&self) -> usize {
        usize::from(self.request_count)
    }

    /// Returns true if no binding has been recorded.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns true for `import "path"`: the dependency runs only for its effects.
    pub fn is_side_effect_only(&self) -> bool {
        self.is_side_effect_only
    }

    /// Marks the node as a side-effect-only request.
    pub fn mark_side_effect_only(&mut self) {
        self.is_side_effect_only = true;
    }

    /// Appends one binding.
    pub fn push(&mut self, binding: NameBinding) -> Result<(), ModuleError> {
        self.request_count = Self::checked_count(self.request_count(), 1)?;
        self.bindings.push(binding);
        Ok(())
    }

    /// Splices another node's bindings onto this one.
    ///
    /// The merged node is side-effect-only only if both halves were.
    pub fn append(&mut self, other: RequestNode) -> Result<(), ModuleError> {
        self.request_count = Self::checked_count(self.request_count(), other.request_count())?;
        self.bindings.extend(other.bindings);
        self.is_side_effect_only = self.is_side_effect_only && other.is_side_effect_only;
        Ok(())
    }

    fn checked_count(current: usize, added: usize) -> Result<u16, ModuleError> {
        let total = current + added;
        u16::try_from(total).map_err(|_| ModuleError::RequestLimitExceeded {
            limit: MAX_REQUEST_COUNT,
        })
    }

    /// Marks every binding as moved to (or reclaimed from) a re-export table.
    pub fn set_redirection(&mut self, redirected: bool) {
        let ownership = if redirected {
            Ownership::Moved
        } else {
            Ownership::Owned
        };
        for binding in &mut self.bindings {
            binding.ownership = ownership;
        }
    }

    /// Drops owned bindings, or every binding when `forced`. Returns how many were dropped.
    pub fn release(&mut self, forced: bool) -> usize {
        let before = self.bindings.len();
        if forced {
            self.bindings.clear();
        } else {
            self.bindings.retain(NameBinding::is_moved);
        }
        // the remaining length is at most the old count, which fit
        self.request_count = self.bindings.len() as u16;
        before - self.bindings.len()
    }

    /// The whole-module request of an import node, if any.
    pub fn whole_module_request(&self) -> Option<&NameBinding> {
        self.bindings.iter().find(|b| b.is_whole_module())
    }

    /// Returns true if a default binding was recorded.
    pub fn has_default(&self) -> bool {
        self.bindings.iter().any(|b| b.is_default)
    }

    /// Returns true if a binding already uses `alias`, re-exported ones included.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.import_name.as_deref() == Some(alias))
    }

    /// Export entries for a module-scope property, matched on `local_name`.
    pub fn exports_for<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a NameBinding> + 'a {
        self.bindings
            .iter()
            .filter(move |b| b.local_name.as_deref() == Some(property))
    }

    /// Returns true if an export entry satisfies the import `request`.
    pub fn satisfies(&self, request: &NameBinding) -> bool {
        self.bindings.iter().any(|export| import_matches(request, export))
    }

    /// The import entries an export satisfies.
    pub fn matching_imports<'a>(
        &'a self,
        export: &'a NameBinding,
    ) -> impl Iterator<Item = &'a NameBinding> + 'a {
        self.bindings
            .iter()
            .filter(move |request| import_matches(request, export))
    }
}

/// A named import matches an export by external name; defaults match each other.
fn import_matches(request: &NameBinding, export: &NameBinding) -> bool {
    if request.is_whole_module() {
        return false;
    }
    (request.is_default && export.is_default)
        || (request.local_name.is_some() && request.local_name == export.import_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_allows_exactly_max() {
        let mut node = RequestNode::new("p");
        for i in 0..MAX_REQUEST_COUNT {
            node.push(NameBinding::named(&format!("n{i}"), &format!("n{i}")))
                .unwrap();
        }
        assert_eq!(node.request_count(), MAX_REQUEST_COUNT);
        let err = node.push(NameBinding::named("over", "over")).unwrap_err();
        assert!(matches!(err, ModuleError::RequestLimitExceeded { .. }));
        assert_eq!(node.request_count(), MAX_REQUEST_COUNT);
    }

    #[test]
    fn test_append_sums_counts() {
        let mut first = RequestNode::new("p");
        first.push(NameBinding::named("a", "a")).unwrap();
        let mut second = RequestNode::new("p");
        second.push(NameBinding::named("b", "b")).unwrap();
        first.append(second).unwrap();
        assert_eq!(first.request_count(), 2);
        assert_eq!(first.bindings()[1].local(), "b");
    }

    #[test]
    fn test_append_clears_side_effect_flag() {
        let mut bare = RequestNode::new("p");
        bare.mark_side_effect_only();
        let mut named = RequestNode::new("p");
        named.push(NameBinding::named("a", "a")).unwrap();
        bare.append(named).unwrap();
        assert!(!bare.is_side_effect_only());
    }

    #[test]
    fn test_release_keeps_moved_bindings_unless_forced() {
        let mut node = RequestNode::new("");
        node.push(NameBinding::named("a", "a")).unwrap();
        node.push(NameBinding::named("b", "b").moved()).unwrap();
        assert_eq!(node.release(false), 1);
        assert_eq!(node.request_count(), 1);
        assert_eq!(node.bindings()[0].local(), "b");
        assert_eq!(node.release(true), 1);
        assert!(node.is_empty());
    }

    #[test]
    fn test_set_redirection_toggles_every_binding() {
        let mut node = RequestNode::new("p");
        node.push(NameBinding::named("a", "a")).unwrap();
        node.push(NameBinding::named("b", "c")).unwrap();
        node.set_redirection(true);
        assert!(node.bindings().iter().all(NameBinding::is_moved));
        node.set_redirection(false);
        assert!(!node.bindings().iter().any(NameBinding::is_moved));
    }

    #[test]
    fn test_import_matching() {
        let mut exports = RequestNode::new("");
        exports.push(NameBinding::named("internal", "foo")).unwrap();
        exports
            .push(NameBinding::named("*default*", "default").with_default())
            .unwrap();

        assert!(exports.satisfies(&NameBinding::named("foo", "bar")));
        assert!(!exports.satisfies(&NameBinding::named("internal", "internal")));
        assert!(exports.satisfies(&NameBinding::named("default", "d").with_default()));
        let aliases: Vec<_> = exports.exports_for("internal").map(NameBinding::alias).collect();
        assert_eq!(aliases, vec!["foo"]);
    }
}
