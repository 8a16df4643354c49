//! Host views of the global scope, keyed by `&str`.
//!
//! The host never sees interned `Name`s. Reads go through the interner's
//! `get`, so asking about a name no script has used never allocates.

use slate_ir::StringInterner;

use crate::environment::Environment;
use crate::value::Value;

/// Read-only view of the global scope.
pub struct SymbolTable<'a> {
    env: &'a Environment,
    interner: &'a StringInterner,
}

impl<'a> SymbolTable<'a> {
    pub(crate) fn new(env: &'a Environment, interner: &'a StringInterner) -> Self {
        SymbolTable { env, interner }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let name = self.interner.get(name)?;
        self.env.global_scope().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interner
            .get(name)
            .is_some_and(|name| self.env.global_scope().contains(name))
    }

    pub fn len(&self) -> usize {
        self.env.global_scope().len()
    }

    pub fn is_empty(&self) -> bool {
        self.env.global_scope().is_empty()
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .env
            .global_scope()
            .iter()
            .map(|(name, _)| self.interner.lookup(name).to_string())
            .collect();
        names.sort_unstable();
        names
    }

    /// Bindings sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .env
            .global_scope()
            .iter()
            .map(|(name, value)| (self.interner.lookup(name).to_string(), value.clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter()
    }
}

/// Writable view of the global scope, for seeding inputs and clearing
/// results between calls.
pub struct SymbolTableMut<'a> {
    env: &'a mut Environment,
    interner: &'a StringInterner,
}

impl<'a> SymbolTableMut<'a> {
    pub(crate) fn new(env: &'a mut Environment, interner: &'a StringInterner) -> Self {
        SymbolTableMut { env, interner }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let name = self.interner.get(name)?;
        self.env.global_scope().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interner
            .get(name)
            .is_some_and(|name| self.env.global_scope().contains(name))
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let name = self.interner.intern(name);
        self.env.set_global(name, value.into());
    }

    /// Remove a binding, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let name = self.interner.get(name)?;
        self.env.remove_global(name)
    }
}
