// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Name bindings recorded by import and export declarations.

/// Name a module uses for its default export.
pub const DEFAULT_EXPORT: &str = "default";

/// Scope binding that holds the value of `export default <expression>`.
pub const DEFAULT_BINDING: &str = "*default*";

/// Who releases a binding when its table is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Released together with the table that holds it.
    #[default]
    Owned,
    /// Handed to a re-export table; only a forced release drops it.
    Moved,
}

/// One requested or declared name.
///
/// The two names swap roles between tables:
///
/// | table  | `local_name`                          | `import_name`                       |
/// |--------|---------------------------------------|-------------------------------------|
/// | import | name requested from the dependency    | alias bound in the importing scope  |
/// | export | name of the binding in module scope   | name consumers ask for              |
///
/// A binding without `local_name` stands for the whole module; its
/// `import_name` is then the namespace alias, if one was given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameBinding {
    /// External or alias name
    pub import_name: Option<String>,
    /// Name on the owning side
    pub local_name: Option<String>,
    /// Whether this is a default import or export
    pub is_default: bool,
    /// Release policy
    pub ownership: Ownership,
}

impl NameBinding {
    /// A named binding; `import { local as alias }` or `export { local as alias }`.
    pub fn named(local_name: &str, import_name: &str) -> Self {
        Self {
            import_name: Some(import_name.to_string()),
            local_name: Some(local_name.to_string()),
            ..Self::default()
        }
    }

    /// A whole-module binding, optionally aliased (`* as alias`).
    pub fn whole_module(alias: Option<&str>) -> Self {
        Self {
            import_name: alias.map(str::to_string),
            local_name: None,
            ..Self::default()
        }
    }

    /// Marks the binding as a default import or export.
    pub fn with_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Marks the binding as moved to a re-export table.
    pub fn moved(mut self) -> Self {
        self.ownership = Ownership::Moved;
        self
    }

    /// Returns true if this binding requests or represents the whole module.
    pub fn is_whole_module(&self) -> bool {
        self.local_name.is_none()
    }

    /// Returns true if ownership was transferred to a re-export table.
    pub fn is_moved(&self) -> bool {
        self.ownership == Ownership::Moved
    }

    /// The local side, or `""` for whole-module bindings.
    pub fn local(&self) -> &str {
        self.local_name.as_deref().unwrap_or("")
    }

    /// The alias or external side, or `""` when absent.
    pub fn alias(&self) -> &str {
        self.import_name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_module_binding() {
        let ns = NameBinding::whole_module(Some("ns"));
        assert!(ns.is_whole_module());
        assert_eq!(ns.alias(), "ns");
        assert_eq!(ns.local(), "");

        let bare = NameBinding::whole_module(None);
        assert!(bare.is_whole_module());
        assert!(bare.import_name.is_none());
    }

    #[test]
    fn test_builder_flags() {
        let binding = NameBinding::named("x", "y").with_default().moved();
        assert!(binding.is_default);
        assert!(binding.is_moved());
        assert!(!binding.is_whole_module());
    }
}
