//! Persistence for recipes, favorites and recents over a PostgREST backend.

mod supabase;

pub use supabase::SupabaseStore;

use std::sync::Mutex;

/// A single-slot cache with explicit invalidation.
///
/// Owned by the store rather than living in module globals; every mutation
/// of the backing table invalidates the slot. The single-user client context
/// expects at most one writer at a time, the mutex just keeps the slot sane
/// if that assumption breaks.
pub struct Cache<T> {
    inner: Mutex<Option<T>>,
}

impl<T: Clone> Cache<T> {
    pub fn new() -> Self {
        Cache {
            inner: Mutex::new(None),
        }
    }

    /// Return the cached value, if any.
    pub fn get(&self) -> Option<T> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the cached value.
    pub fn put(&self, value: T) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(value);
    }

    /// Drop the cached value; the next read goes to the backend.
    pub fn invalidate(&self) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl<T: Clone> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}
