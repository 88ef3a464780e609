//! Latency profile of the simulated services.

use std::time::Duration;

pub const CHECK_ENV: &str = "FLOWGUARD_CHECK_MS";
pub const SAVE_ENV: &str = "FLOWGUARD_SAVE_MS";
pub const SLOW_SAVE_ENV: &str = "FLOWGUARD_SLOW_SAVE_MS";

/// How long the simulated registry and store take to answer.
///
/// Saves of names containing `slow_marker` take `slow_save`; everything else
/// takes `save`. That asymmetry is what lets an older edit finish after a
/// newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedLatency {
    pub check: Duration,
    pub save: Duration,
    pub slow_save: Duration,
    pub slow_marker: String,
    pub taken_marker: String,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self {
            check: Duration::from_millis(100),
            save: Duration::from_millis(500),
            slow_save: Duration::from_millis(5000),
            slow_marker: "stale".to_string(),
            taken_marker: "taken".to_string(),
        }
    }
}

impl SimulatedLatency {
    /// No delays at all; handy for tests that only care about answers.
    pub fn instant() -> Self {
        Self {
            check: Duration::ZERO,
            save: Duration::ZERO,
            slow_save: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_check(mut self, check: Duration) -> Self {
        self.check = check;
        self
    }

    pub fn with_save(mut self, save: Duration, slow_save: Duration) -> Self {
        self.save = save;
        self.slow_save = slow_save;
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut latency = Self::default();
        for (key, slot) in [
            (CHECK_ENV, &mut latency.check),
            (SAVE_ENV, &mut latency.save),
            (SLOW_SAVE_ENV, &mut latency.slow_save),
        ] {
            let Some(raw) = lookup(key) else { continue };
            match raw.trim().parse::<u64>() {
                Ok(ms) => *slot = Duration::from_millis(ms),
                Err(err) => tracing::warn!(
                    key,
                    value = %raw,
                    error = %err,
                    "invalid latency setting; using default"
                ),
            }
        }
        latency
    }

    /// Delay for saving a flow called `name`.
    pub fn save_delay(&self, name: &str) -> Duration {
        if name.to_lowercase().contains(&self.slow_marker) {
            self.slow_save
        } else {
            self.save
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_marker_is_case_insensitive() {
        let latency = SimulatedLatency::default();
        assert_eq!(latency.save_delay("My STALE flow"), Duration::from_millis(5000));
        assert_eq!(latency.save_delay("fresh"), Duration::from_millis(500));
    }

    #[test]
    fn lookup_overrides_individual_delays() {
        let latency = SimulatedLatency::from_lookup(|key| match key {
            CHECK_ENV => Some("5".into()),
            SLOW_SAVE_ENV => Some("oops".into()),
            _ => None,
        });
        assert_eq!(latency.check, Duration::from_millis(5));
        assert_eq!(latency.save, Duration::from_millis(500));
        assert_eq!(latency.slow_save, Duration::from_millis(5000));
    }
}
