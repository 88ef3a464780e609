//! Editor session configuration.

use std::time::Duration;

/// Default quiet period before a typed name counts as settled.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Environment variable overriding the debounce period, in milliseconds.
pub const DEBOUNCE_ENV: &str = "FLOWGUARD_DEBOUNCE_MS";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Quiet period the input must stay unchanged before it is processed.
    pub debounce: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl EditorConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Build a config from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(DEBOUNCE_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.debounce = Duration::from_millis(ms),
                Err(err) => tracing::warn!(
                    key = DEBOUNCE_ENV,
                    value = %raw,
                    error = %err,
                    "invalid debounce setting; using default"
                ),
            }
        }

        config
    }
}
