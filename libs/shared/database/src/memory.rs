//! In-process table primitive backing the reference store implementations.
//! Each table owns its rows and assigns monotonically increasing positive
//! ids. Writers hold the write lock for the whole assign-and-insert window,
//! so readers never observe a half-committed row.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;

pub struct MemoryTable<T> {
    rows: RwLock<HashMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Clone + Send + Sync> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a row built from its freshly assigned id.
    pub async fn insert_with<F>(&self, build: F) -> T
    where
        F: FnOnce(i64) -> T,
    {
        let mut rows = self.rows.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = build(id);
        rows.insert(id, row.clone());
        row
    }

    pub async fn get(&self, id: i64) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn filter<P>(&self, keep: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| keep(row))
            .cloned()
            .collect()
    }

    /// Apply a mutation to the row, returning the updated copy.
    pub async fn update<F>(&self, id: i64, apply: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id)?;
        apply(row);
        Some(row.clone())
    }

    pub async fn remove(&self, id: i64) -> Option<T> {
        self.rows.write().await.remove(&id)
    }
}

impl<T: Clone + Send + Sync> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
