//! Abstract Syntax Tree (AST) definitions.
//!
//! Module declarations do not appear here: the parser records them in the
//! file's [`ModuleLinkContext`](crate::module::ModuleLinkContext) and only the
//! executable part (the declaration behind `export var`, the value behind
//! `export default`) becomes a statement.

use std::rc::Rc;

/// A complete program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The statements in the program
    pub body: Vec<Statement>,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration (var, let, const)
    VariableDeclaration(VariableDeclaration),
    /// Function declaration
    FunctionDeclaration(FunctionDeclaration),
    /// Expression statement
    Expression(Expression),
    /// Block statement `{ ... }`
    Block(Vec<Statement>),
    /// If statement
    If(IfStatement),
    /// Return statement
    Return(Option<Expression>),
    /// Throw statement
    Throw(Expression),
    /// `export default <expression>`; binds the value under the hidden default name
    ExportDefault(Expression),
    /// Empty statement (;)
    Empty,
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// var declaration
    Var,
    /// let declaration
    Let,
    /// const declaration
    Const,
}

/// A variable declaration statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The kind of declaration
    pub kind: VariableKind,
    /// The declarators
    pub declarations: Vec<VariableDeclarator>,
}

/// A single variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// The name being declared
    pub name: String,
    /// Optional initializer expression
    pub init: Option<Expression>,
}

/// A function declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    /// The function name
    pub name: Option<String>,
    /// The parameter names
    pub params: Vec<String>,
    /// The function body
    pub body: Rc<[Statement]>,
    /// Whether the body is strict mode code
    pub strict: bool,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition
    pub test: Expression,
    /// Executed when the condition is truthy
    pub consequent: Box<Statement>,
    /// Executed otherwise
    pub alternate: Option<Box<Statement>>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Number literal
    Number(f64),
    /// String literal
    String(String),
    /// Boolean literal
    Boolean(bool),
    /// `null`
    Null,
    /// Identifier reference
    Identifier(String),
    /// Object literal `{ key: value, ... }`
    Object(Vec<(String, Expression)>),
    /// Property access `object.property`
    Member(Box<Expression>, String),
    /// Call `callee(arguments)`
    Call(Box<Expression>, Vec<Expression>),
    /// Assignment `target = value`
    Assign(Box<Expression>, Box<Expression>),
    /// Binary operation
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    /// Unary operation
    Unary(UnaryOperator, Box<Expression>),
    /// Function expression
    Function(FunctionDeclaration),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// %
    Modulo,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// ===
    StrictEqual,
    /// !==
    StrictNotEqual,
    /// <
    LessThan,
    /// <=
    LessThanEqual,
    /// >
    GreaterThan,
    /// >=
    GreaterThanEqual,
    /// &&
    LogicalAnd,
    /// ||
    LogicalOr,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// !
    LogicalNot,
    /// -
    Minus,
    /// typeof
    Typeof,
}
