//! String interner for identifier storage.
//!
//! Owned by one interpreter session. Strings live as long as the interner,
//! so a long-running host that creates a session per script releases every
//! interned identifier when the session is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Name;

#[derive(Default)]
struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<Rc<str>, Name>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<Rc<str>>,
}

/// Single-threaded string interner.
///
/// Interior mutability lets the parser intern through a shared reference
/// while the evaluator holds the same interner for name lookups.
pub struct StringInterner {
    table: RefCell<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let interner = StringInterner {
            table: RefCell::new(InternTable::default()),
        };
        interner.intern("");
        interner
    }

    /// Intern a string, returning its Name.
    pub fn intern(&self, s: &str) -> Name {
        let mut table = self.table.borrow_mut();
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        let name = Name::from_raw(u32::try_from(table.strings.len()).unwrap_or(u32::MAX));
        let shared: Rc<str> = Rc::from(s);
        table.strings.push(Rc::clone(&shared));
        table.map.insert(shared, name);
        name
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.borrow().map.get(s).copied()
    }

    /// Resolve a Name back to its string.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> Rc<str> {
        self.table
            .borrow()
            .strings
            .get(name.index())
            .cloned()
            .unwrap_or_else(|| Rc::from(""))
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.borrow().strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        self.table.borrow().strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("alpha");
        let b = interner.intern("alpha");
        assert_eq!(a, b);
        assert_eq!(&*interner.lookup(a), "alpha");
    }

    #[test]
    fn empty_string_is_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn get_does_not_insert() {
        let interner = StringInterner::new();
        assert_eq!(interner.get("missing"), None);
        assert_eq!(interner.len(), 1);
        let name = interner.intern("missing");
        assert_eq!(interner.get("missing"), Some(name));
    }

    #[test]
    fn foreign_name_resolves_empty() {
        let interner = StringInterner::new();
        assert_eq!(&*interner.lookup(Name::from_raw(99)), "");
    }
}
