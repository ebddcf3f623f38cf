//! faxc-par — the IR and the recursive-descent parser that builds it.
//!
//! There is no separate untyped AST: each node type-checks itself at
//! construction time and knows how to generate its own three-address code.
//! Expressions follow the value/jumping dual protocol (`gen`/`reduce`/
//! `jumping`/`render`); statements follow the `gen(ctx, b, a)` protocol
//! where `b` labels the statement's own start and `a` is where control
//! falls through once it finishes.

mod context;
mod expr;
mod parser;
mod stmt;

pub use context::GenCtx;
pub use expr::{
    AccessExpr, ArithmeticExpr, ConstantExpr, ConstantValue, Expr, IdentifierExpr, LogicalExpr,
    RelationalExpr, TemporaryExpr, UnaryExpr,
};
pub use parser::{compile, Parser};
pub use stmt::{DoStmt, ElseStmt, IfStmt, SetElemStmt, SetStmt, Stmt, WhileStmt};
