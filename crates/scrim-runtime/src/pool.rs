#![forbid(unsafe_code)]

//! Transient object pool.
//!
//! Short-lived, high-churn UI elements (toasts, floating damage text)
//! reuse instances instead of reallocating, since each carries a
//! content surface whose allocation is the expensive part. The pool holds only
//! released instances; live ones belong to their manager.
//!
//! # Invariants
//!
//! 1. A pooled instance is never part of the live visible tree.
//! 2. `release` runs the caller's reset before admitting the instance,
//!    so no per-use field (in particular no callback) survives into
//!    the next acquire.

use tracing::debug;

/// Implemented by poolable types: a reuse-state flag distinguishing
/// pooled from live instances.
pub trait Reusable {
    /// Flip the reuse-state flag.
    fn set_pooled(&mut self, pooled: bool);

    /// True while the instance sits in a pool.
    fn is_pooled(&self) -> bool;
}

/// A reuse cache for transient instances.
#[derive(Debug)]
pub struct TransientPool<T: Reusable> {
    free: Vec<T>,
    max_free: usize,
}

impl<T: Reusable> Default for TransientPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reusable> TransientPool<T> {
    /// Create a pool retaining up to 8 released instances.
    pub fn new() -> Self {
        Self::with_max_free(8)
    }

    /// Create a pool retaining up to `max_free` released instances;
    /// further releases drop the instance instead.
    pub fn with_max_free(max_free: usize) -> Self {
        Self {
            free: Vec::new(),
            max_free,
        }
    }

    /// Take a released instance, or build a new one with `factory`.
    /// Either way the instance comes back flagged live.
    pub fn acquire(&mut self, factory: impl FnOnce() -> T) -> T {
        match self.free.pop() {
            Some(mut instance) => {
                debug_assert!(instance.is_pooled());
                instance.set_pooled(false);
                instance
            }
            None => {
                let mut instance = factory();
                instance.set_pooled(false);
                instance
            }
        }
    }

    /// Like [`TransientPool::acquire`], for fallible factories.
    pub fn try_acquire<E>(&mut self, factory: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        match self.free.pop() {
            Some(mut instance) => {
                debug_assert!(instance.is_pooled());
                instance.set_pooled(false);
                Ok(instance)
            }
            None => {
                let mut instance = factory()?;
                instance.set_pooled(false);
                Ok(instance)
            }
        }
    }

    /// Reset and return an instance to the pool.
    ///
    /// `reset` must null out every per-use field; the pool flags the
    /// instance pooled afterwards. Past `max_free` the instance is
    /// dropped instead of retained.
    pub fn release(&mut self, mut instance: T, reset: impl FnOnce(&mut T)) {
        reset(&mut instance);
        instance.set_pooled(true);
        if self.free.len() < self.max_free {
            self.free.push(instance);
        } else {
            debug!(max_free = self.max_free, "pool full; dropping release");
        }
    }

    /// Number of instances waiting for reuse.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}
