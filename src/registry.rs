//! Mapping between external string identifiers and dense integer handles.
//!
//! Users and items live in separate handle spaces. Both start at 0 and grow
//! by one per previously unseen identifier; a handle is never reused or
//! renumbered once assigned. `UserHandle(3)` and `ItemHandle(3)` are distinct
//! entities, and the newtypes keep them from being mixed up.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

macro_rules! define_handle {
    ($name:ident, $kind:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Position of this handle in dense per-kind storage.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub const KIND: EntityKind = $kind;
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u32 {
            fn from(h: $name) -> u32 {
                h.0
            }
        }
    };
}

define_handle!(UserHandle, EntityKind::User, "Dense handle in the user space.");
define_handle!(ItemHandle, EntityKind::Item, "Dense handle in the item space.");

/// Which handle space an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Item,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => f.write_str("user"),
            EntityKind::Item => f.write_str("item"),
        }
    }
}

/// One append-only handle space.
///
/// `forward` and `reverse` are exact inverses: `reverse[forward[s]] == s`
/// for every recorded string.
#[derive(Debug, Clone, Default)]
struct HandleTable {
    forward: HashMap<Box<str>, u32>,
    reverse: Vec<Box<str>>,
}

impl HandleTable {
    fn resolve(&mut self, external: &str) -> u32 {
        if let Some(&handle) = self.forward.get(external) {
            return handle;
        }
        assert!(
            self.reverse.len() < u32::MAX as usize,
            "handle space exhausted"
        );
        let handle = self.reverse.len() as u32;
        let key: Box<str> = external.into();
        self.forward.insert(key.clone(), handle);
        self.reverse.push(key);
        handle
    }

    fn lookup(&self, external: &str) -> Option<u32> {
        self.forward.get(external).copied()
    }

    fn external_of(&self, handle: u32) -> Option<&str> {
        self.reverse.get(handle as usize).map(|s| &**s)
    }

    fn len(&self) -> usize {
        self.reverse.len()
    }
}

/// Bidirectional registry for both entity kinds.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    users: HandleTable,
    items: HandleTable,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: EntityKind) -> &HandleTable {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Item => &self.items,
        }
    }

    /// Return the handle for `external`, allocating the next one on first sight.
    pub fn resolve(&mut self, kind: EntityKind, external: &str) -> u32 {
        match kind {
            EntityKind::User => self.users.resolve(external),
            EntityKind::Item => self.items.resolve(external),
        }
    }

    pub fn resolve_user(&mut self, external: &str) -> UserHandle {
        UserHandle(self.users.resolve(external))
    }

    pub fn resolve_item(&mut self, external: &str) -> ItemHandle {
        ItemHandle(self.items.resolve(external))
    }

    /// Look up without allocating.
    pub fn lookup(&self, kind: EntityKind, external: &str) -> Option<u32> {
        self.table(kind).lookup(external)
    }

    pub fn lookup_user(&self, external: &str) -> Option<UserHandle> {
        self.lookup(EntityKind::User, external).map(UserHandle)
    }

    pub fn lookup_item(&self, external: &str) -> Option<ItemHandle> {
        self.lookup(EntityKind::Item, external).map(ItemHandle)
    }

    /// External identifier for a handle.
    ///
    /// # Errors
    ///
    /// [`RecommendError::UnknownHandle`] if `handle` was never allocated for `kind`.
    pub fn external_of(&self, kind: EntityKind, handle: u32) -> Result<&str> {
        self.table(kind)
            .external_of(handle)
            .ok_or(RecommendError::UnknownHandle { kind, handle })
    }

    pub fn user_external(&self, user: UserHandle) -> Result<&str> {
        self.external_of(EntityKind::User, user.0)
    }

    pub fn item_external(&self, item: ItemHandle) -> Result<&str> {
        self.external_of(EntityKind::Item, item.0)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocation() {
        let mut reg = IdentifierRegistry::new();
        assert_eq!(reg.resolve_user("alice"), UserHandle(0));
        assert_eq!(reg.resolve_user("bob"), UserHandle(1));
        assert_eq!(reg.resolve_user("alice"), UserHandle(0));
        assert_eq!(reg.user_count(), 2);
    }

    #[test]
    fn test_independent_spaces() {
        let mut reg = IdentifierRegistry::new();
        // Same string, different kinds: both get handle 0.
        assert_eq!(reg.resolve(EntityKind::User, "x"), 0);
        assert_eq!(reg.resolve(EntityKind::Item, "x"), 0);
        assert_eq!(reg.resolve(EntityKind::Item, "y"), 1);
        assert_eq!(reg.user_count(), 1);
        assert_eq!(reg.item_count(), 2);
    }

    #[test]
    fn test_round_trip() {
        let mut reg = IdentifierRegistry::new();
        let names = ["i-9", "i-1", "i-5", "i-1"];
        for name in names {
            let h = reg.resolve_item(name);
            assert_eq!(reg.item_external(h).unwrap(), name);
            assert_eq!(reg.lookup_item(name), Some(h));
        }
        assert_eq!(reg.item_count(), 3);
    }

    #[test]
    fn test_unknown_handle() {
        let mut reg = IdentifierRegistry::new();
        reg.resolve_user("only");
        let err = reg.external_of(EntityKind::User, 1).unwrap_err();
        assert_eq!(
            err,
            RecommendError::UnknownHandle {
                kind: EntityKind::User,
                handle: 1
            }
        );
        assert!(reg.item_external(ItemHandle(0)).is_err());
    }

    #[test]
    fn test_lookup_does_not_allocate() {
        let reg = IdentifierRegistry::new();
        assert_eq!(reg.lookup_user("ghost"), None);
        assert_eq!(reg.lookup(EntityKind::Item, "ghost"), None);
        assert_eq!(reg.user_count(), 0);
        assert_eq!(reg.item_count(), 0);
    }

    #[test]
    fn test_lookup_by_kind() {
        let mut reg = IdentifierRegistry::new();
        reg.resolve(EntityKind::User, "u");
        let item = reg.resolve(EntityKind::Item, "i");
        assert_eq!(reg.lookup(EntityKind::User, "u"), Some(0));
        assert_eq!(reg.lookup(EntityKind::Item, "i"), Some(item));
        // Kinds do not leak into each other.
        assert_eq!(reg.lookup(EntityKind::Item, "u"), None);
        assert_eq!(reg.lookup_item("i"), Some(ItemHandle(item)));
    }
}
