//! A stack of lexical scope frames with parent-chain lookup.
//!
//! Modeled as an arena of frames indexed by [`EnvId`] rather than a linked
//! list of owned parents, so popping a scope is an O(1) pointer move and
//! nothing needs to be dropped or reference-counted: once a frame is
//! pushed it stays in the arena for the rest of the compilation, simply
//! unreachable from `current` once its scope closes.

use crate::identifier::IdentifierEntry;
use faxc_util::{define_idx, IndexVec, Symbol};
use std::collections::HashMap;

define_idx!(EnvId);

struct Frame {
    bindings: HashMap<Symbol, IdentifierEntry>,
    parent: Option<EnvId>,
}

pub struct Environment {
    frames: IndexVec<EnvId, Frame>,
    current: EnvId,
}

impl Environment {
    /// Creates the environment with one root frame already open.
    pub fn new() -> Self {
        let mut frames = IndexVec::new();
        let root = frames.push(Frame {
            bindings: HashMap::new(),
            parent: None,
        });
        Environment {
            frames,
            current: root,
        }
    }

    /// Pushes a new frame whose parent is the current top. Corresponds to
    /// a `{`.
    pub fn push_scope(&mut self) {
        let new_frame = self.frames.push(Frame {
            bindings: HashMap::new(),
            parent: Some(self.current),
        });
        self.current = new_frame;
    }

    /// Pops the current frame, restoring its parent. Corresponds to a `}`.
    ///
    /// Panics if called on the root frame; the parser never closes a scope
    /// it did not open.
    pub fn pop_scope(&mut self) {
        self.current = self.frames[self.current]
            .parent
            .expect("pop_scope called with no open child scope");
    }

    /// Inserts into the current frame only. Shadowing an outer binding of
    /// the same name is allowed by construction.
    pub fn put(&mut self, name: Symbol, entry: IdentifierEntry) {
        self.frames[self.current].bindings.insert(name, entry);
    }

    /// Walks parent-ward from the current frame to the root.
    pub fn get(&self, name: Symbol) -> Option<&IdentifierEntry> {
        let mut frame_id = self.current;
        loop {
            let frame = &self.frames[frame_id];
            if let Some(entry) = frame.bindings.get(&name) {
                return Some(entry);
            }
            frame_id = frame.parent?;
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_lex::{Tag, Type};
    use faxc_util::Interner;

    fn entry(sym: Symbol, ty: Type) -> IdentifierEntry {
        IdentifierEntry::new(faxc_lex::Word::new(Tag::Ident, sym), ty, 0)
    }

    #[test]
    fn lookup_finds_binding_in_current_frame() {
        let mut interner = Interner::new();
        let name = interner.intern("i");
        let mut env = Environment::new();
        env.put(name, entry(name, Type::int()));
        assert!(env.get(name).is_some());
    }

    #[test]
    fn lookup_walks_into_parent_frame() {
        let mut interner = Interner::new();
        let name = interner.intern("i");
        let mut env = Environment::new();
        env.put(name, entry(name, Type::int()));
        env.push_scope();
        assert!(env.get(name).is_some());
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut interner = Interner::new();
        let name = interner.intern("i");
        let mut env = Environment::new();
        env.put(name, entry(name, Type::int()));
        env.push_scope();
        env.put(name, entry(name, Type::float()));
        assert_eq!(env.get(name).unwrap().ty, Type::float());
    }

    #[test]
    fn popping_scope_drops_inner_binding() {
        let mut interner = Interner::new();
        let name = interner.intern("i");
        let mut env = Environment::new();
        env.push_scope();
        env.put(name, entry(name, Type::int()));
        env.pop_scope();
        assert!(env.get(name).is_none());
    }

    #[test]
    fn undeclared_name_is_not_found() {
        let mut interner = Interner::new();
        let name = interner.intern("unbound");
        let env = Environment::new();
        assert!(env.get(name).is_none());
    }
}
