use super::storage::SlotKey;
use serde::Deserialize;
use smol_str::SmolStr;

/// Declaration of an identifier that is currently visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    /// Loop nesting level of the declaration. 0 is the outermost level.
    pub depth: u32,
    /// Source line of the declaration.
    pub line: u32,
    pub name: SmolStr,
    /// Storage slot that the declared name refers to.
    pub slot: SlotKey,
}

/// How [`ScopeTable::declare`] treats a name that is already declared
/// at the same depth.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// Re-declaring in the same scope is a no-op.
    #[default]
    Idempotent,
    /// Every declaration appends a fresh entry, which shadows
    /// any earlier entry of the same name, even at the same depth.
    AlwaysFresh,
}

/// Visible identifiers in declaration order.
///
/// Lookups scan from the most recent declaration to the oldest,
/// so inner declarations shadow outer ones.
#[derive(Debug, Default)]
pub struct ScopeTable {
    entries: Vec<ScopeEntry>,
    policy: ScopePolicy,
}

impl ScopeTable {
    pub fn new(policy: ScopePolicy) -> Self {
        Self {
            entries: vec![],
            policy,
        }
    }

    #[inline]
    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    #[inline]
    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// Declare `name` at `depth`.
    ///
    /// Returns `true` when a new entry was appended.
    pub fn declare(&mut self, name: &str, depth: u32, line: u32, slot: SlotKey) -> bool {
        if self.policy == ScopePolicy::Idempotent && self.contains(name, depth) {
            log::trace!("'{name}' already declared at depth {depth}");
            return false;
        }

        log::trace!("declare '{name}' at depth {depth}, line {line}");
        self.entries.push(ScopeEntry {
            depth,
            line,
            name: SmolStr::from(name),
            slot,
        });
        true
    }

    /// Find the innermost visible declaration of `name`.
    pub fn resolve(&self, name: &str) -> Option<&ScopeEntry> {
        self.entries.iter().rev().find(|entry| entry.name == name)
    }

    /// Check whether `name` is declared at exactly `depth`.
    pub fn contains(&self, name: &str, depth: u32) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.depth == depth && entry.name == name)
    }

    /// Remove every declaration made at `depth`.
    pub fn close_scope(&mut self, depth: u32) {
        self.entries.retain(|entry| entry.depth != depth);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn slot(name: &str, depth: u32) -> SlotKey {
        SlotKey::new(name, depth)
    }

    #[test]
    fn test_declare_is_idempotent() {
        let mut scopes = ScopeTable::default();
        assert!(scopes.declare("x", 0, 1, slot("x", 0)));
        assert!(!scopes.declare("x", 0, 4, slot("x", 0)));
        assert_eq!(scopes.entries().len(), 1);
        assert_eq!(scopes.resolve("x").map(|e| e.line), Some(1));
    }

    #[test]
    fn test_always_fresh_policy() {
        let mut scopes = ScopeTable::new(ScopePolicy::AlwaysFresh);
        assert!(scopes.declare("x", 0, 1, slot("x", 0)));
        assert!(scopes.declare("x", 0, 4, slot("x", 0)));
        assert_eq!(scopes.entries().len(), 2);
        // The later declaration shadows the first one.
        assert_eq!(scopes.resolve("x").map(|e| e.line), Some(4));
    }

    #[test]
    fn test_shadowing_and_close() {
        let mut scopes = ScopeTable::default();
        scopes.declare("i", 1, 2, slot("i", 1));
        scopes.declare("i", 2, 3, slot("i", 2));

        let inner = scopes.resolve("i").unwrap();
        assert_eq!((inner.depth, inner.line), (2, 3));

        scopes.close_scope(2);
        let outer = scopes.resolve("i").unwrap();
        assert_eq!((outer.depth, outer.line), (1, 2));

        scopes.close_scope(1);
        assert!(scopes.resolve("i").is_none());
    }

    #[test]
    fn test_close_leaves_other_depths() {
        let mut scopes = ScopeTable::default();
        scopes.declare("a", 0, 1, slot("a", 0));
        scopes.declare("b", 1, 2, slot("b", 1));
        scopes.declare("c", 0, 3, slot("c", 0));

        scopes.close_scope(1);
        let names = scopes.entries().iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c"]);
    }
}
