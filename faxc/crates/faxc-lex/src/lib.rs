//! faxc-lex — lexical analysis.
//!
//! Scans a source string into a stream of [`Token`]s, interning
//! identifiers and reserved words through a single shared table owned by
//! the [`Lexer`]. Also hosts the [`Type`] value objects, since the four
//! primitive type names are entries in that same reserved-word table.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{ArrayType, BasicType, NumericLiteral, OrdF64, Primitive, Tag, Token, Type, Word};
