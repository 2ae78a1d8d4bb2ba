//! `import` and `export` declarations.
//!
//! Declarations are recorded into the parser's module context; only their
//! executable part is returned as a statement.

use super::parser::Parser;
use crate::Error;
use crate::ast::{Expression, Statement};
use crate::lexer::TokenKind;
use crate::module::{DEFAULT_BINDING, DEFAULT_EXPORT, ModuleError, NameBinding, RequestNode};

impl<'a> Parser<'a> {
    /// Parses an `import` declaration.
    pub(super) fn parse_import_declaration(&mut self) -> Result<Statement, Error> {
        self.advance(); // consume 'import'
        if self.check(&TokenKind::LeftParen) {
            return Err(ModuleError::NotImplemented {
                what: "dynamic import()",
            }
            .into());
        }
        self.check_request_place()?;

        let mut node = RequestNode::new("");

        if let TokenKind::String(_) = &self.current.kind {
            let path = self.parse_module_specifier()?;
            self.expect_module_terminator()?;
            node.set_script_path(path);
            node.mark_side_effect_only();
            self.modules.add_import_node(node)?;
            return Ok(Statement::Empty);
        }

        if let TokenKind::Identifier(name) = &self.current.kind {
            let alias = name.clone();
            self.advance();
            self.add_import_binding(
                &mut node,
                NameBinding::named(DEFAULT_EXPORT, &alias).with_default(),
            )?;
            if self.check(&TokenKind::Comma) {
                self.advance();
                self.parse_import_clause(&mut node)?;
            }
        } else {
            self.parse_import_clause(&mut node)?;
        }

        let path = self.parse_from_clause()?;
        self.expect_module_terminator()?;
        node.set_script_path(path);
        if node.is_empty() {
            node.mark_side_effect_only();
        }
        self.modules.add_import_node(node)?;
        Ok(Statement::Empty)
    }

    fn parse_import_clause(&mut self, node: &mut RequestNode) -> Result<(), Error> {
        match &self.current.kind {
            TokenKind::Star => {
                self.advance();
                let alias = if self.current.kind.is_word("as") {
                    self.advance();
                    Some(self.expect_binding_name()?)
                } else {
                    None
                };
                self.add_import_binding(node, NameBinding::whole_module(alias.as_deref()))
            }
            TokenKind::LeftBrace => self.parse_import_item_list(node),
            kind => Err(ModuleError::malformed(format!("expected import specifier, found {:?}", kind)).into()),
        }
    }

    fn parse_import_item_list(&mut self, node: &mut RequestNode) -> Result<(), Error> {
        self.advance(); // consume '{'

        while !self.check(&TokenKind::RightBrace) {
            let (name, is_default) = self.parse_module_export_name()?;
            let alias = if self.current.kind.is_word("as") {
                self.advance();
                self.expect_binding_name()?
            } else if is_default {
                return Err(ModuleError::malformed("'default' must be imported under an alias").into());
            } else {
                name.clone()
            };

            let binding = NameBinding::named(&name, &alias);
            let binding = if is_default { binding.with_default() } else { binding };
            self.add_import_binding(node, binding)?;
            self.expect_list_separator()?;
        }

        self.advance(); // consume '}'
        Ok(())
    }

    fn add_import_binding(&mut self, node: &mut RequestNode, binding: NameBinding) -> Result<(), Error> {
        self.modules.add_binding(node, binding, true)?;
        Ok(())
    }

    /// Parses an `export` declaration.
    pub(super) fn parse_export_declaration(&mut self) -> Result<Statement, Error> {
        self.advance(); // consume 'export'
        self.check_request_place()?;

        match &self.current.kind {
            TokenKind::Default => {
                self.advance();
                self.modules.set_processing_default(true);
                let result = self.parse_export_default();
                self.modules.set_processing_default(false);
                result
            }
            TokenKind::Star => {
                self.parse_star_reexport()?;
                Ok(Statement::Empty)
            }
            TokenKind::LeftBrace => {
                self.parse_export_list()?;
                Ok(Statement::Empty)
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let statement = self.parse_variable_declaration()?;
                if let Statement::VariableDeclaration(declaration) = &statement {
                    let bindings: Vec<_> = declaration
                        .declarations
                        .iter()
                        .map(|d| NameBinding::named(&d.name, &d.name))
                        .collect();
                    self.record_local_exports(bindings)?;
                }
                Ok(statement)
            }
            TokenKind::Function => {
                let function = self.parse_function(true)?;
                let name = function.name.clone().unwrap_or_default();
                self.record_local_exports([NameBinding::named(&name, &name)])?;
                Ok(Statement::FunctionDeclaration(function))
            }
            kind => Err(ModuleError::malformed(format!(
                "expected declaration after 'export', found {:?}",
                kind
            ))
            .into()),
        }
    }

    fn parse_export_default(&mut self) -> Result<Statement, Error> {
        if self.check(&TokenKind::Function) {
            let function = self.parse_function(false)?;
            if let Some(name) = function.name.clone() {
                self.record_local_exports([NameBinding::named(&name, DEFAULT_EXPORT).with_default()])?;
                return Ok(Statement::FunctionDeclaration(function));
            }
            self.consume_semicolon()?;
            self.record_local_exports([default_export_binding()])?;
            return Ok(Statement::ExportDefault(Expression::Function(function)));
        }

        let value = self.parse_expression()?;
        self.consume_semicolon()?;
        self.record_local_exports([default_export_binding()])?;
        Ok(Statement::ExportDefault(value))
    }

    fn parse_export_list(&mut self) -> Result<(), Error> {
        self.advance(); // consume '{'

        let mut items = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let (local, _) = self.parse_module_export_name()?;
            let exported = if self.current.kind.is_word("as") {
                self.advance();
                self.parse_module_export_name()?.0
            } else {
                local.clone()
            };
            items.push((local, exported));
            self.expect_list_separator()?;
        }
        self.advance(); // consume '}'

        if self.current.kind.is_word("from") {
            let path = self.parse_from_clause()?;
            self.expect_module_terminator()?;
            return self.record_reexports(&path, &items);
        }
        self.expect_module_terminator()?;

        let mut bindings = Vec::with_capacity(items.len());
        for (local, exported) in &items {
            if local == DEFAULT_EXPORT {
                return Err(ModuleError::malformed("'default' is not a local binding").into());
            }
            let binding = NameBinding::named(local, exported);
            bindings.push(if exported == DEFAULT_EXPORT {
                binding.with_default()
            } else {
                binding
            });
        }
        self.record_local_exports(bindings)
    }

    /// `export { a as b } from "p"`: an import from `p` and an export entry,
    /// both moved to the re-export.
    fn record_reexports(&mut self, path: &str, items: &[(String, String)]) -> Result<(), Error> {
        if items
            .iter()
            .any(|(local, exported)| local == DEFAULT_EXPORT || exported == DEFAULT_EXPORT)
        {
            return Err(ModuleError::NotImplemented {
                what: "re-exporting a default export",
            }
            .into());
        }

        let mut import = RequestNode::new(path);
        let mut exports = RequestNode::new("");
        for (local, exported) in items {
            self.modules
                .add_binding(&mut import, NameBinding::named(local, exported), true)?;
            self.modules
                .add_binding(&mut exports, NameBinding::named(exported, exported), false)?;
        }
        import.set_redirection(true);
        exports.set_redirection(true);
        if import.is_empty() {
            import.mark_side_effect_only();
        }

        self.modules.add_import_node(import)?;
        if !exports.is_empty() {
            self.modules.add_export_node(exports)?;
        }
        Ok(())
    }

    /// `export * from "p"`: an unaliased whole-module import moved to the re-export.
    fn parse_star_reexport(&mut self) -> Result<(), Error> {
        self.advance(); // consume '*'
        if self.current.kind.is_word("as") {
            return Err(ModuleError::NotImplemented {
                what: "export * as namespace",
            }
            .into());
        }
        let path = self.parse_from_clause()?;
        self.expect_module_terminator()?;

        let mut node = RequestNode::new(&path);
        node.push(NameBinding::whole_module(None).moved())?;
        self.modules.add_import_node(node)?;
        Ok(())
    }

    fn record_local_exports(
        &mut self,
        bindings: impl IntoIterator<Item = NameBinding>,
    ) -> Result<(), Error> {
        let mut node = RequestNode::new("");
        for binding in bindings {
            self.modules.add_binding(&mut node, binding, false)?;
        }
        self.modules.add_export_node(node)?;
        Ok(())
    }

    fn check_request_place(&self) -> Result<(), Error> {
        if self.depth > 0 || self.options.direct_eval || self.options.function_body {
            return Err(ModuleError::ModuleStatementMisplaced.into());
        }
        Ok(())
    }

    fn parse_from_clause(&mut self) -> Result<String, Error> {
        if !self.current.kind.is_word("from") {
            return Err(ModuleError::malformed(format!(
                "expected 'from', found {:?}",
                self.current.kind
            ))
            .into());
        }
        self.advance();
        self.parse_module_specifier()
    }

    fn parse_module_specifier(&mut self) -> Result<String, Error> {
        match &self.current.kind {
            TokenKind::String(path) if path.is_empty() => {
                Err(ModuleError::malformed("empty module specifier").into())
            }
            TokenKind::String(path) => {
                let path = path.clone();
                self.advance();
                Ok(path)
            }
            kind => Err(ModuleError::malformed(format!(
                "expected module specifier string, found {:?}",
                kind
            ))
            .into()),
        }
    }

    /// An identifier, or `default`.
    fn parse_module_export_name(&mut self) -> Result<(String, bool), Error> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => (name.clone(), false),
            TokenKind::Default => (DEFAULT_EXPORT.to_string(), true),
            kind => {
                return Err(ModuleError::malformed(format!("expected identifier, found {:?}", kind)).into());
            }
        };
        self.advance();
        Ok(name)
    }

    fn expect_binding_name(&mut self) -> Result<String, Error> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            kind => Err(ModuleError::malformed(format!("expected identifier, found {:?}", kind)).into()),
        }
    }

    fn expect_list_separator(&mut self) -> Result<(), Error> {
        if self.check(&TokenKind::Comma) {
            self.advance();
            Ok(())
        } else if self.check(&TokenKind::RightBrace) {
            Ok(())
        } else {
            Err(ModuleError::malformed(format!(
                "expected ',' or '}}', found {:?}",
                self.current.kind
            ))
            .into())
        }
    }

    fn expect_module_terminator(&mut self) -> Result<(), Error> {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
            Ok(())
        } else if self.at_statement_end() {
            Ok(())
        } else {
            Err(ModuleError::malformed(format!(
                "unexpected {:?} after module declaration",
                self.current.kind
            ))
            .into())
        }
    }
}

fn default_export_binding() -> NameBinding {
    NameBinding::named(DEFAULT_BINDING, DEFAULT_EXPORT).with_default()
}
