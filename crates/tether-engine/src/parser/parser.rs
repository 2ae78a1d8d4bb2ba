//! The main parser implementation.

use crate::Error;
use crate::ast::*;
use crate::lexer::{Scanner, Token, TokenKind};
use crate::module::ModuleLinkContext;
use std::rc::Rc;

/// How a source text is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse as strict mode code regardless of directives.
    pub strict: bool,
    /// The source is the argument of a direct `eval` call.
    pub direct_eval: bool,
    /// The source is a function body.
    pub function_body: bool,
}

impl ParseOptions {
    /// Strict mode top-level code, as used for dependency files.
    pub fn module() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// A recursive descent parser for JavaScript.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    pub(super) current: Token,
    newline_before: bool,
    pub(super) options: ParseOptions,
    strict: bool,
    pub(super) depth: usize,
    pub(super) modules: ModuleLinkContext,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for sloppy mode top-level code.
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    /// Creates a new parser with explicit options.
    pub fn with_options(source: &'a str, options: ParseOptions) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        let newline_before = scanner.newline_before();
        Self {
            scanner,
            current,
            newline_before,
            options,
            strict: options.strict,
            depth: 0,
            modules: ModuleLinkContext::new(),
        }
    }

    /// Parses the source code into a Program AST node.
    ///
    /// On failure every module binding recorded so far is released.
    pub fn parse_program(&mut self) -> Result<Program, Error> {
        let result = self.parse_top_level();
        if result.is_err() {
            self.modules.teardown(true);
        }
        result
    }

    fn parse_top_level(&mut self) -> Result<Program, Error> {
        self.check_directive();
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        if !self.modules.is_empty() {
            self.modules.check_valid_aliases()?;
        }
        Ok(Program { body })
    }

    /// Whether the code parsed so far is strict mode code.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The module declarations recorded while parsing, if there were any.
    pub fn into_module_context(self) -> Option<ModuleLinkContext> {
        if self.modules.is_empty() {
            None
        } else {
            Some(self.modules)
        }
    }

    fn check_directive(&mut self) {
        if matches!(&self.current.kind, TokenKind::String(s) if s == "use strict") {
            self.strict = true;
        }
    }

    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> Result<Statement, Error> {
        match &self.current.kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                self.parse_variable_declaration()
            }
            TokenKind::Function => {
                let function = self.parse_function(true)?;
                Ok(Statement::FunctionDeclaration(function))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Throw => {
                self.advance();
                let argument = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Throw(argument))
            }
            TokenKind::Import => self.parse_import_declaration(),
            TokenKind::Export => self.parse_export_declaration(),
            TokenKind::LeftBrace => {
                self.advance();
                self.depth += 1;
                let body = self.parse_block_body();
                self.depth -= 1;
                Ok(Statement::Block(body?))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            _ => {
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn parse_block_body(&mut self) -> Result<Vec<Statement>, Error> {
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RightBrace)?;
        Ok(body)
    }

    pub(super) fn parse_variable_declaration(&mut self) -> Result<Statement, Error> {
        let kind = match &self.current.kind {
            TokenKind::Var => VariableKind::Var,
            TokenKind::Let => VariableKind::Let,
            TokenKind::Const => VariableKind::Const,
            _ => return Err(Error::Syntax("Expected variable keyword".into())),
        };
        self.advance();

        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.check(&TokenKind::Equal) {
                self.advance();
                Some(self.parse_expression()?)
            } else if kind == VariableKind::Const {
                return Err(Error::Syntax(format!(
                    "Missing initializer in const declaration '{}'",
                    name
                )));
            } else {
                None
            };
            declarations.push(VariableDeclarator { name, init });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            kind,
            declarations,
        }))
    }

    /// Parses `function name?(params) { body }`.
    pub(super) fn parse_function(&mut self, require_name: bool) -> Result<FunctionDeclaration, Error> {
        self.expect(&TokenKind::Function)?;

        let name = if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else if require_name {
            return Err(Error::Syntax(format!(
                "Expected function name, found {:?}",
                self.current.kind
            )));
        } else {
            None
        };

        self.expect(&TokenKind::LeftParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(&TokenKind::RightParen)?;
        self.expect(&TokenKind::LeftBrace)?;

        let outer_strict = self.strict;
        self.depth += 1;
        self.check_directive();
        let body = self.parse_block_body();
        let strict = self.strict;
        self.depth -= 1;
        self.strict = outer_strict;

        Ok(FunctionDeclaration {
            name,
            params,
            body: Rc::from(body?),
            strict,
        })
    }

    /// Parses a standalone function body, as handed to `parse_function`.
    pub(crate) fn parse_function_body(&mut self) -> Result<(Vec<Statement>, bool), Error> {
        let program = self.parse_program()?;
        Ok((program.body, self.strict))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, Error> {
        self.advance(); // consume 'if'
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        let consequent = Box::new(self.parse_nested_statement()?);
        let alternate = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_nested_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_nested_statement(&mut self) -> Result<Statement, Error> {
        self.depth += 1;
        let statement = self.parse_statement();
        self.depth -= 1;
        statement
    }

    fn parse_return_statement(&mut self) -> Result<Statement, Error> {
        self.advance(); // consume 'return'
        if self.at_statement_end() {
            self.consume_semicolon()?;
            return Ok(Statement::Return(None));
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Return(Some(argument)))
    }

    /// Parses an expression.
    pub fn parse_expression(&mut self) -> Result<Expression, Error> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression, Error> {
        let target = self.parse_logical_or()?;

        if self.check(&TokenKind::Equal) {
            if !matches!(target, Expression::Identifier(_) | Expression::Member(..)) {
                return Err(Error::Syntax("Invalid assignment target".into()));
            }
            self.advance();
            let value = self.parse_assignment()?;
            return Ok(Expression::Assign(Box::new(target), Box::new(value)));
        }

        Ok(target)
    }

    fn parse_logical_or(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_logical_and()?;
        while self.check(&TokenKind::PipePipe) {
            self.advance();
            let right = self.parse_logical_and()?;
            left = Expression::Binary(BinaryOperator::LogicalOr, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AmpersandAmpersand) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expression::Binary(BinaryOperator::LogicalAnd, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_comparison()?;
        loop {
            let operator = match &self.current.kind {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::NotEqual => BinaryOperator::NotEqual,
                TokenKind::StrictEqual => BinaryOperator::StrictEqual,
                TokenKind::StrictNotEqual => BinaryOperator::StrictNotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expression::Binary(operator, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_additive()?;
        loop {
            let operator = match &self.current.kind {
                TokenKind::LessThan => BinaryOperator::LessThan,
                TokenKind::LessThanEqual => BinaryOperator::LessThanEqual,
                TokenKind::GreaterThan => BinaryOperator::GreaterThan,
                TokenKind::GreaterThanEqual => BinaryOperator::GreaterThanEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expression::Binary(operator, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let operator = match &self.current.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::Binary(operator, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let operator = match &self.current.kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::Binary(operator, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, Error> {
        let operator = match &self.current.kind {
            TokenKind::Bang => Some(UnaryOperator::LogicalNot),
            TokenKind::Minus => Some(UnaryOperator::Minus),
            TokenKind::Typeof => Some(UnaryOperator::Typeof),
            _ => None,
        };

        if let Some(op) = operator {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Unary(op, Box::new(argument)));
        }

        self.parse_call()
    }

    fn parse_call(&mut self) -> Result<Expression, Error> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::LeftParen) {
                self.advance();
                let mut arguments = Vec::new();
                if !self.check(&TokenKind::RightParen) {
                    loop {
                        arguments.push(self.parse_expression()?);
                        if !self.check(&TokenKind::Comma) {
                            break;
                        }
                        self.advance();
                    }
                }
                self.expect(&TokenKind::RightParen)?;
                expr = Expression::Call(Box::new(expr), arguments);
            } else if self.check(&TokenKind::Dot) {
                self.advance();
                let property = self.expect_property_name()?;
                expr = Expression::Member(Box::new(expr), property);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, Error> {
        match &self.current.kind {
            TokenKind::Number(n) => {
                let value = *n;
                self.advance();
                Ok(Expression::Number(value))
            }
            TokenKind::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expression::String(value))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Boolean(false))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Null)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(Expression::Identifier(name))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::Function => Ok(Expression::Function(self.parse_function(false)?)),
            _ => Err(Error::Syntax(format!(
                "Unexpected token: {:?}",
                self.current.kind
            ))),
        }
    }

    fn parse_object_literal(&mut self) -> Result<Expression, Error> {
        self.advance(); // consume '{'
        let mut properties = Vec::new();

        while !self.check(&TokenKind::RightBrace) {
            let key = match &self.current.kind {
                TokenKind::Number(n) => {
                    let key = n.to_string();
                    self.advance();
                    key
                }
                _ => self.expect_property_name()?,
            };
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            properties.push((key, value));

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&TokenKind::RightBrace)?;
        Ok(Expression::Object(properties))
    }

    /// Identifiers, keywords and string literals are all valid property names.
    fn expect_property_name(&mut self) -> Result<String, Error> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::String(name) => name.clone(),
            kind => match keyword_text(kind) {
                Some(text) => text.to_string(),
                None => {
                    return Err(Error::Syntax(format!(
                        "Expected property name, found {:?}",
                        kind
                    )));
                }
            },
        };
        self.advance();
        Ok(name)
    }

    // Helper methods

    pub(super) fn advance(&mut self) {
        self.current = self.scanner.next_token();
        self.newline_before = self.scanner.newline_before();
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<(), Error> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(Error::Syntax(format!(
                "Expected {:?}, found {:?}",
                kind, self.current.kind
            )))
        }
    }

    pub(super) fn expect_identifier(&mut self) -> Result<String, Error> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(Error::Syntax(format!(
                "Expected identifier, found {:?}",
                self.current.kind
            )))
        }
    }

    /// Returns true if the current token may end a statement without `;`.
    pub(super) fn at_statement_end(&self) -> bool {
        self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RightBrace)
            || self.is_at_end()
            || self.newline_before
    }

    pub(super) fn consume_semicolon(&mut self) -> Result<(), Error> {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
            Ok(())
        } else if self.at_statement_end() {
            Ok(())
        } else {
            Err(Error::Syntax(format!(
                "Expected ';', found {:?}",
                self.current.kind
            )))
        }
    }

    pub(super) fn is_at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }
}

/// Source text of a keyword token.
pub(super) fn keyword_text(kind: &TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::Const => "const",
        TokenKind::Default => "default",
        TokenKind::Else => "else",
        TokenKind::Export => "export",
        TokenKind::Function => "function",
        TokenKind::If => "if",
        TokenKind::Import => "import",
        TokenKind::Let => "let",
        TokenKind::Return => "return",
        TokenKind::Throw => "throw",
        TokenKind::Typeof => "typeof",
        TokenKind::Var => "var",
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_stmt(src: &str) -> Statement {
        let mut parser = Parser::new(src);
        let program = parser.parse_program().unwrap();
        program.body.into_iter().next().unwrap()
    }

    fn parse_expr(src: &str) -> Expression {
        match parse_stmt(src) {
            Statement::Expression(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_var_declaration() {
        match parse_stmt("var x = 1, y;") {
            Statement::VariableDeclaration(decl) => {
                assert_eq!(decl.kind, VariableKind::Var);
                assert_eq!(decl.declarations.len(), 2);
                assert_eq!(decl.declarations[0].name, "x");
                assert!(decl.declarations[1].init.is_none());
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_const_requires_initializer() {
        assert!(Parser::new("const x;").parse_program().is_err());
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse_expr("1 + 2 * 3;");
        match expr {
            Expression::Binary(BinaryOperator::Add, _, right) => {
                assert!(matches!(*right, Expression::Binary(BinaryOperator::Multiply, ..)));
            }
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn test_parse_member_call() {
        let expr = parse_expr("a.b(1, 2);");
        match expr {
            Expression::Call(callee, args) => {
                assert_eq!(args.len(), 2);
                assert!(matches!(*callee, Expression::Member(_, ref name) if name == "b"));
            }
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn test_parse_keyword_property_names() {
        let expr = parse_expr("({ default: 1, 'x y': 2 }).default;");
        assert!(matches!(expr, Expression::Member(_, ref name) if name == "default"));
    }

    #[test]
    fn test_parse_function_declaration() {
        match parse_stmt("function add(a, b) { return a + b; }") {
            Statement::FunctionDeclaration(func) => {
                assert_eq!(func.name.as_deref(), Some("add"));
                assert_eq!(func.params, vec!["a", "b"]);
                assert_eq!(func.body.len(), 1);
                assert!(!func.strict);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_use_strict_directive() {
        let mut parser = Parser::new("'use strict'; var x = 1;");
        parser.parse_program().unwrap();
        assert!(parser.is_strict());

        match parse_stmt("function f() { 'use strict'; }") {
            Statement::FunctionDeclaration(func) => assert!(func.strict),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_newline_ends_statement() {
        let mut parser = Parser::new("var a = 1\nvar b = 2\na = b");
        assert_eq!(parser.parse_program().unwrap().body.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_one_line() {
        assert!(Parser::new("var a = 1 var b = 2;").parse_program().is_err());
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(Parser::new("1 = 2;").parse_program().is_err());
    }

    #[test]
    fn test_if_else() {
        match parse_stmt("if (a) { b; } else c;") {
            Statement::If(stmt) => {
                assert!(matches!(*stmt.consequent, Statement::Block(_)));
                assert!(stmt.alternate.is_some());
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }
}
