//! faxc-sem — the symbol environment.
//!
//! A lexically scoped mapping from identifier name to declaration,
//! consulted by the parser while it builds IR and while it resolves
//! references.

mod environment;
mod identifier;

pub use environment::{EnvId, Environment};
pub use identifier::IdentifierEntry;
