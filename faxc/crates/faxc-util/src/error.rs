//! Core error types for faxc-util crate
//!
//! The front end reports exactly one kind of semantic failure: a fatal
//! error tied to a source line, with no recovery. Everything downstream
//! (lexer, IR constructors, parser) raises a [`CompileError`] and the
//! driver propagates it with `?` to the top.

use thiserror::Error;

/// The single error surface for the whole front end.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A type check, redeclaration, or grammar rule failed during
    /// compilation. Carries the source line the failure was attributed to.
    #[error("Near line {line}: {message}")]
    Fatal { line: u32, message: String },

    /// Reading the source program itself failed.
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn fatal(line: u32, message: impl Into<String>) -> Self {
        CompileError::Fatal {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias used throughout the front end.
pub type Result<T> = std::result::Result<T, CompileError>;
