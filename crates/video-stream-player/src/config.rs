use std::time::Duration;

use anyhow::{Result, bail};

/// Adapter tuning parameters.
#[derive(Clone, Debug)]
pub struct AdapterConfig {
    /// Interval between playback attempts while waiting for an active stream.
    pub polling_interval: Duration,
}

impl Default for AdapterConfig {
    /// Matches the stock polling cadence of the stream player.
    fn default() -> Self {
        Self {
            polling_interval: Duration::from_secs(5),
        }
    }
}

impl AdapterConfig {
    /// Reject configurations that would spin the polling loop.
    pub fn validate(&self) -> Result<()> {
        if self.polling_interval.is_zero() {
            bail!("polling interval must be greater than zero");
        }
        Ok(())
    }
}
