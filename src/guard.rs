//! One-time initialization under a scoped lock
//!
//! [`InitGuard`] runs a fallible setup routine at most once successfully.
//! The lock is only ever taken through a scoped guard, so it is released on
//! every exit from the routine: normal return, `Err` propagated with `?`,
//! or a panic unwinding through it. A failed routine leaves the guard
//! uninitialized and the next caller retries.
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::guard::InitGuard;
//!
//! let guard: InitGuard<Vec<&str>> = InitGuard::new();
//! let failed: Result<&Vec<&str>, String> = guard.get_or_try_init(|| Err("boom".into()));
//! assert!(failed.is_err());
//! assert!(!guard.is_held());
//!
//! let chain = guard.get_or_try_init(|| Ok::<_, String>(vec!["common"])).unwrap();
//! assert_eq!(chain, &vec!["common"]);
//! assert!(guard.is_initialized());
//! ```

use parking_lot::Mutex;
use std::sync::OnceLock;

/// Lock-protected, retry-on-failure lazy value
pub struct InitGuard<T> {
    lock: Mutex<()>,
    value: OnceLock<T>,
}

impl<T> InitGuard<T> {
    /// Create an empty, unlocked guard
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            value: OnceLock::new(),
        }
    }

    /// Return the initialized value, running `init` under the lock if needed
    ///
    /// Concurrent callers block until the running initializer finishes; if
    /// it succeeded they observe its value, otherwise the next one in line
    /// runs its own `init`.
    ///
    /// # Errors
    ///
    /// Returns whatever `init` returns. The lock is already released when
    /// the error reaches the caller.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let _held = self.lock.lock();
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let value = init()?;
        Ok(self.value.get_or_init(|| value))
    }

    /// The initialized value, if setup has succeeded
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Whether an initializer is currently running
    pub fn is_held(&self) -> bool {
        self.lock.is_locked()
    }

    /// Whether setup has completed successfully
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> Default for InitGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for InitGuard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitGuard")
            .field("held", &self.is_held())
            .field("value", &self.value.get())
            .finish()
    }
}
