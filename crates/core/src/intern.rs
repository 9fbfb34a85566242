// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! String interning for sender and event names

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Interned string id
pub type Id = u32;

/// Marker for "no id"; never handed out by an interner
pub const INVALID_ID: Id = u32::MAX;

/// Maps names to small integer ids and back
pub trait Interner: Send + Sync {
    /// Return the id for `name`, assigning a new one on first use
    fn intern(&self, name: &str) -> Id;

    /// Return the id for `name` if it has been interned before
    fn lookup(&self, name: &str) -> Option<Id>;

    /// Return the name behind `id`
    fn resolve(&self, id: Id) -> Option<Arc<str>>;
}

#[derive(Debug, Default)]
struct Table {
    names: Vec<Arc<str>>,
    ids: HashMap<Arc<str>, Id>,
}

/// Thread-safe interner assigning dense ids in first-use order
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    inner: Arc<RwLock<Table>>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned names
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .names
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All names, indexed by id
    pub fn names(&self) -> Vec<Arc<str>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .names
            .clone()
    }

    /// A table whose ids follow the order of `names`
    ///
    /// Repeated names keep their first id, so later names shift down.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = Self::new();
        for name in names {
            table.intern(name.as_ref());
        }
        table
    }
}

impl Interner for StringTable {
    fn intern(&self, name: &str) -> Id {
        if let Some(id) = self.lookup(name) {
            return id;
        }

        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have won the race between the read and write lock
        if let Some(&id) = table.ids.get(name) {
            return id;
        }
        let id = table.names.len() as Id;
        let name: Arc<str> = Arc::from(name);
        table.names.push(Arc::clone(&name));
        table.ids.insert(name, id);
        id
    }

    fn lookup(&self, name: &str) -> Option<Id> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .ids
            .get(name)
            .copied()
    }

    fn resolve(&self, id: Id) -> Option<Arc<str>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .names
            .get(id as usize)
            .cloned()
    }
}
