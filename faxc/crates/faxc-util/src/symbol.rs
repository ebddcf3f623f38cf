//! Symbol interning.
//!
//! Identifiers are interned so that two occurrences of the same name in a
//! source program compare equal by a cheap integer rather than a string
//! compare, and so the [`Environment`](crate) lookup chain can key its maps
//! on `Copy` values. Unlike a process-global interner, the table here is
//! owned by a single [`Interner`] instance: a compilation creates one, uses
//! it for the whole run, and drops it when the run ends. Nothing about a
//! symbol survives past the `Interner` that minted it.

use rustc_hash::FxHashMap;
use std::fmt;

static_assertions::assert_eq_size!(Symbol, u32);

/// A cheaply-copyable handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Per-compilation string interner.
///
/// Strings are leaked into the interner's own arena (a `Vec<String>`) and
/// indexed by position; the reverse map lets repeated lookups of the same
/// text return the same `Symbol`.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing symbol if already known.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(sym) = self.lookup.get(text) {
            return *sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    /// Resolve a symbol back to its text.
    ///
    /// Panics if `sym` was not produced by this interner; that can only
    /// happen by mixing symbols across compilations, which the driver
    /// never does.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("count");
        let b = interner.intern("count");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_interns_to_distinct_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("count");
        let b = interner.intern("total");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("elements");
        assert_eq!(interner.resolve(sym), "elements");
    }

    #[test]
    fn independent_interners_do_not_share_state() {
        let mut one = Interner::new();
        let mut two = Interner::new();
        let a = one.intern("x");
        let b = two.intern("x");
        assert_eq!(one.resolve(a), two.resolve(b));
    }

    quickcheck::quickcheck! {
        fn interning_any_string_round_trips(text: String) -> bool {
            let mut interner = Interner::new();
            let sym = interner.intern(&text);
            interner.resolve(sym) == text.as_str()
        }
    }
}
