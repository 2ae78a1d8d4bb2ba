// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS style `require()` over an ordered resolver chain

mod file_resolver;

pub use file_resolver::{DEFAULT_MODULES_DIR, JsFileResolver};

use crate::error::{ExtError, Result};
use tether_engine::{Engine, Value};

/// One link of the require chain.
pub trait ModuleResolver {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Maps a specifier to a canonical path, or `None` if this resolver does not handle it.
    fn canonicalize(&self, specifier: &str) -> Option<String>;

    /// Loads the module at a path previously returned by [`canonicalize`](Self::canonicalize).
    fn load(&self, engine: &mut Engine, path: &str) -> Result<Value>;
}

/// Resolvers tried in registration order.
#[derive(Default)]
pub struct RequireChain {
    resolvers: Vec<Box<dyn ModuleResolver>>,
}

impl RequireChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver, builder style.
    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.push(resolver);
        self
    }

    /// Appends a resolver.
    pub fn push(&mut self, resolver: impl ModuleResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Number of registered resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no resolver is registered
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolves and loads `specifier`.
    ///
    /// The first resolver that canonicalizes the specifier owns it: if its
    /// load fails, the call fails without trying later resolvers.
    pub fn require(&self, engine: &mut Engine, specifier: &str) -> Result<Value> {
        for resolver in &self.resolvers {
            let Some(path) = resolver.canonicalize(specifier) else {
                tracing::trace!(resolver = resolver.name(), specifier, "not claimed");
                continue;
            };
            tracing::debug!(resolver = resolver.name(), specifier, %path, "require resolved");
            return resolver.load(engine, &path);
        }
        Err(ExtError::module_not_found(specifier))
    }
}

/// Defines the global `require` function backed by `chain`.
///
/// Installation happens once per engine.
pub fn install_require(engine: &mut Engine, chain: RequireChain) -> Result<()> {
    if engine.global().has_own("require") {
        return Err(ExtError::AlreadyInstalled);
    }
    tracing::debug!(resolvers = chain.len(), "installing require()");
    engine.define_native("require", move |engine, _this, args| {
        let specifier = match args.first() {
            Some(Value::String(specifier)) => specifier.clone(),
            Some(other) => other.to_string(),
            None => {
                return Err(tether_engine::Error::Type(
                    "require() expects a module specifier".into(),
                ));
            }
        };
        chain.require(engine, &specifier).map_err(Into::into)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixed {
        name: &'static str,
        claims: Option<&'static str>,
        value: Option<f64>,
        loads: Rc<RefCell<Vec<String>>>,
    }

    impl ModuleResolver for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn canonicalize(&self, specifier: &str) -> Option<String> {
            match self.claims {
                Some(claimed) if claimed == specifier => Some(format!("{}:{specifier}", self.name)),
                _ => None,
            }
        }

        fn load(&self, _engine: &mut Engine, path: &str) -> Result<Value> {
            self.loads.borrow_mut().push(path.to_string());
            self.value
                .map(Value::Number)
                .ok_or_else(|| ExtError::load(path, "refused"))
        }
    }

    fn fixed(
        name: &'static str,
        claims: Option<&'static str>,
        value: Option<f64>,
        loads: &Rc<RefCell<Vec<String>>>,
    ) -> Fixed {
        Fixed {
            name,
            claims,
            value,
            loads: loads.clone(),
        }
    }

    #[test]
    fn test_first_claiming_resolver_wins() {
        let loads = Rc::new(RefCell::new(Vec::new()));
        let chain = RequireChain::new()
            .with_resolver(fixed("none", None, Some(0.0), &loads))
            .with_resolver(fixed("first", Some("m"), Some(1.0), &loads))
            .with_resolver(fixed("second", Some("m"), Some(2.0), &loads));

        let mut engine = Engine::new();
        assert_eq!(chain.require(&mut engine, "m").unwrap(), Value::Number(1.0));
        assert_eq!(*loads.borrow(), vec!["first:m".to_string()]);
    }

    #[test]
    fn test_load_failure_does_not_fall_through() {
        let loads = Rc::new(RefCell::new(Vec::new()));
        let chain = RequireChain::new()
            .with_resolver(fixed("broken", Some("m"), None, &loads))
            .with_resolver(fixed("backup", Some("m"), Some(2.0), &loads));

        let mut engine = Engine::new();
        let err = chain.require(&mut engine, "m").unwrap_err();
        assert!(matches!(err, ExtError::Load { .. }));
        assert_eq!(loads.borrow().len(), 1);
    }

    #[test]
    fn test_unclaimed_specifier() {
        let mut engine = Engine::new();
        let err = RequireChain::new().require(&mut engine, "m").unwrap_err();
        assert!(matches!(err, ExtError::ModuleNotFound { specifier } if specifier == "m"));
    }

    #[test]
    fn test_install_once() {
        let loads = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();
        let chain = RequireChain::new().with_resolver(fixed("one", Some("m"), Some(5.0), &loads));
        install_require(&mut engine, chain).unwrap();

        assert_eq!(engine.eval("require('m') + 1;").unwrap(), Value::Number(6.0));
        assert!(matches!(
            install_require(&mut engine, RequireChain::new()),
            Err(ExtError::AlreadyInstalled)
        ));
    }

    #[test]
    fn test_script_sees_module_not_found() {
        let mut engine = Engine::new();
        install_require(&mut engine, RequireChain::new()).unwrap();
        let err = engine.eval("require('nothing');").unwrap_err();
        assert_eq!(
            err.module_kind(),
            Some(tether_engine::ModuleErrorKind::ModuleNotFound)
        );
    }
}
