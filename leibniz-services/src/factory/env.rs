//! Environment Signal Sources
//!
//! The factory reads its simulation signals through [`EnvSource`] so tests can
//! flip them without touching the process environment.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Sandboxed-execution indicator
pub const CODEX_ENVIRONMENT_ENV: &str = "CODEX_ENVIRONMENT";

/// Explicit simulation override
pub const LEIBNIZ_USE_MOCKS_ENV: &str = "LEIBNIZ_USE_MOCKS";

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync + std::fmt::Debug {
    /// Current value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory environment for tests.
///
/// # Example
///
/// ```rust
/// use leibniz_services::factory::{EnvSource, StaticEnv, LEIBNIZ_USE_MOCKS_ENV};
///
/// let env = StaticEnv::new();
/// env.set(LEIBNIZ_USE_MOCKS_ENV, "true");
/// assert_eq!(env.var(LEIBNIZ_USE_MOCKS_ENV).as_deref(), Some("true"));
/// env.reset();
/// assert!(env.var(LEIBNIZ_USE_MOCKS_ENV).is_none());
/// ```
#[derive(Debug, Default)]
pub struct StaticEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl StaticEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Unset a variable.
    pub fn remove(&self, key: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Unset every variable.
    pub fn reset(&self) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// True when either simulation signal equals `"true"`, ignoring case.
#[must_use]
pub fn simulation_requested(env: &dyn EnvSource) -> bool {
    [CODEX_ENVIRONMENT_ENV, LEIBNIZ_USE_MOCKS_ENV]
        .iter()
        .any(|key| env.var(key).is_some_and(|v| v.eq_ignore_ascii_case("true")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_is_false() {
        assert!(!simulation_requested(&StaticEnv::new()));
    }

    #[test]
    fn test_either_signal_enables() {
        let env = StaticEnv::new();
        env.set(CODEX_ENVIRONMENT_ENV, "true");
        assert!(simulation_requested(&env));

        env.reset();
        env.set(LEIBNIZ_USE_MOCKS_ENV, "TRUE");
        assert!(simulation_requested(&env));

        env.set(LEIBNIZ_USE_MOCKS_ENV, "TrUe");
        assert!(simulation_requested(&env));
    }

    #[test]
    fn test_other_values_do_not_enable() {
        let env = StaticEnv::new();
        for value in ["1", "yes", "false", "", " true", "truee"] {
            env.set(LEIBNIZ_USE_MOCKS_ENV, value);
            env.set(CODEX_ENVIRONMENT_ENV, value);
            assert!(!simulation_requested(&env), "value {value:?} enabled simulation");
        }
    }

    #[test]
    fn test_remove() {
        let env = StaticEnv::new();
        env.set(CODEX_ENVIRONMENT_ENV, "true");
        env.remove(CODEX_ENVIRONMENT_ENV);
        assert!(!simulation_requested(&env));
    }
}
