//! Tuning profile.
//!
//! Read-only knobs for the event-to-report pipeline. Every field has a
//! default matching the shipped behavior, so a profile only needs to name
//! what it changes:
//!
//! ```toml
//! sensitivity = 0.08
//! interval_ms = 20
//! ```
//!
//! The bridge never writes profiles back.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

/// Pipeline tuning parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Raw stick units ignored around zero.
    pub deadzone: i32,
    /// Scale from millisecond-normalized accumulated motion to report counts.
    pub sensitivity: f64,
    /// Weight of the right (secondary) stick when folded into the motion
    /// channel.
    pub right_stick_weight: f64,
    /// Correction factor for the lower-precision Nunchuk stick.
    pub nunchuk_scale: f64,
    /// Report interval in milliseconds; bounds both the poll timeout and the
    /// heartbeat.
    pub interval_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            deadzone: 20,
            sensitivity: 5e-2,
            right_stick_weight: 3.0,
            nunchuk_scale: 3e-1,
            interval_ms: 30,
        }
    }
}

impl Tuning {
    /// Load a TOML profile; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(Error::ProfileRead)?;
        Ok(toml::from_str(&text)?)
    }

    /// The report interval as a [`Duration`].
    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tuning = Tuning::default();
        assert_eq!(tuning.deadzone, 20);
        assert_eq!(tuning.interval_ms, 30);
        assert_eq!(tuning.interval(), Duration::from_millis(30));
    }

    #[test]
    fn test_partial_profile_keeps_defaults() {
        let tuning: Tuning = toml::from_str("sensitivity = 0.1\ninterval_ms = 20").unwrap();
        assert_eq!(tuning.sensitivity, 0.1);
        assert_eq!(tuning.interval_ms, 20);
        assert_eq!(tuning.deadzone, 20);
        assert_eq!(tuning.right_stick_weight, 3.0);
        assert_eq!(tuning.nunchuk_scale, 0.3);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(toml::from_str::<Tuning>("acceleration = 2.0").is_err());
    }
}
