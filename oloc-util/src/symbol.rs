//! String interning for the grammar's small, closed vocabulary: operator
//! keys, canonical function names, and the native irrationals `π`/`𝑒`.
//!
//! The teacher's own interner is built for an open-ended identifier space
//! (thousands of user-chosen names) and backs it with a `DashMap` + `ahash`
//! table; that concurrency story is kept here even though this grammar's
//! vocabulary is tiny, since aliasing happens from multiple pipeline stages
//! and a lock-free map is the simplest way to share it without plumbing a
//! `&mut` interner through every function signature.

use ahash::RandomState;
use dashmap::DashMap;
use std::fmt;
use std::sync::OnceLock;

/// The prefix that marks a compiler-internal placeholder name. A user-written
/// long-custom-irrational (`<...>`) whose body starts with this is rejected
/// with `RESERVED_WORD_CONFLICT`.
pub const RESERVED_PREFIX: &str = "<__reserved";

/// A compact, cheaply-comparable handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

struct Interner {
    map: DashMap<Box<str>, u32, RandomState>,
    strings: DashMap<u32, Box<str>, RandomState>,
    next: std::sync::atomic::AtomicU32,
}

impl Interner {
    fn new() -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
            strings: DashMap::with_hasher(RandomState::new()),
            next: std::sync::atomic::AtomicU32::new(0),
        }
    }

    fn intern(&self, s: &str) -> u32 {
        if let Some(existing) = self.map.get(s) {
            return *existing;
        }
        use std::sync::atomic::Ordering;
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.map.insert(s.into(), id);
        self.strings.insert(id, s.into());
        id
    }

    fn resolve(&self, id: u32) -> Box<str> {
        self.strings
            .get(&id)
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

fn interner() -> &'static Interner {
    static INTERNER: OnceLock<Interner> = OnceLock::new();
    INTERNER.get_or_init(Interner::new)
}

impl Symbol {
    pub fn intern(s: &str) -> Self {
        Symbol(interner().intern(s))
    }

    pub fn as_string(&self) -> Box<str> {
        interner().resolve(self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_symbol() {
        let a = Symbol::intern("sqrt");
        let b = Symbol::intern("sqrt");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_different_symbols() {
        let a = Symbol::intern("gcd");
        let b = Symbol::intern("lcm");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_as_string() {
        let s = Symbol::intern("fact");
        assert_eq!(&*s.as_string(), "fact");
    }
}
