//! Timing configuration for the mailbox controller.

use serde::Deserialize;
use std::time::Duration;

/// How long a message must stay on screen before it is reported as seen.
pub const MARK_SEEN_DELAY: Duration = Duration::from_millis(1500);

/// Period of the probe that checks the seen deadline.
pub const SEEN_PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Period of the clock tick used for relative dates.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(30);

/// Timer settings, deserializable from a config file with millisecond values.
///
/// Zero is rejected on load: tokio intervals need a non-zero period.
///
/// ```
/// # use mailbox_view::Settings;
/// let settings: Settings = serde_json::from_str(r#"{"mark_seen_delay": 3000}"#).unwrap();
/// assert_eq!(settings.mark_seen_delay.as_millis(), 3000);
/// assert_eq!(settings.seen_probe_interval.as_millis(), 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(with = "millis")]
    pub mark_seen_delay: Duration,
    #[serde(with = "millis")]
    pub seen_probe_interval: Duration,
    #[serde(with = "millis")]
    pub clock_interval: Duration,
}

impl Settings {
    /// Override how long a message must stay open before it is marked seen.
    pub fn mark_seen_delay(mut self, delay: Duration) -> Self {
        self.mark_seen_delay = delay;
        self
    }

    /// Override the seen probe period. Zero is raised to one millisecond when the dispatcher starts.
    pub fn seen_probe_interval(mut self, interval: Duration) -> Self {
        self.seen_probe_interval = interval;
        self
    }

    /// Override the clock tick period. Zero is raised to one millisecond when the dispatcher starts.
    pub fn clock_interval(mut self, interval: Duration) -> Self {
        self.clock_interval = interval;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mark_seen_delay: MARK_SEEN_DELAY,
            seen_probe_interval: SEEN_PROBE_INTERVAL,
            clock_interval: CLOCK_INTERVAL,
        }
    }
}

mod millis {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match u64::deserialize(deserializer)? {
            0 => Err(D::Error::custom("duration must be at least 1 millisecond")),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}
