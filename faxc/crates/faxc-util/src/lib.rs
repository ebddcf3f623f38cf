//! faxc-util - Core Utilities and Foundation Types
//!
//! Shared building blocks used by every compilation phase: the fatal-error
//! type, a per-compilation [`Symbol`] interner, a typed-index [`IndexVec`],
//! and the [`Counter`] used for label and temporary numbering. Nothing in
//! this crate has any knowledge of the language being compiled.

mod counter;
mod error;
mod index_vec;
mod symbol;

pub use counter::Counter;
pub use error::{CompileError, Result};
pub use index_vec::{Idx, IndexVec};
pub use symbol::{Interner, Symbol};
