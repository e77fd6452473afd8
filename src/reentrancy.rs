//! Debug-only reentrancy detection for table entry points.
//!
//! `ChainedHashTable` runs user code (`K: Hash`, `K: Eq`) while its chains
//! are being searched or rewritten. If that code reaches back into the same
//! table, debug builds panic naming both operations. Release builds compile
//! the check away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Records which table operation, if any, is currently running.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Single-threaded: keeps the owning table !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Marks `op` as running until the returned guard drops. Panics in debug
    /// builds if another operation on the same table is still running.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> OpGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!(
                    "reentrant call into ChainedHashTable::{op} \
                     while ChainedHashTable::{outer} is running"
                );
            }
            self.active.set(Some(op));
            return OpGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return OpGuard { _z: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

// A copied table starts with nothing in progress.
impl Clone for DebugReentrancy {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII marker returned by [`DebugReentrancy::enter`].
pub(crate) struct OpGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
