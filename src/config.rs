use chrono::Duration;

use crate::types::CompoundingFrequency;

/// engine defaults
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// frequency used when an investment does not configure one
    pub default_compounding: CompoundingFrequency,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_compounding: CompoundingFrequency::Monthly,
        }
    }
}

/// scheduler sweep settings. cadence is a deployment knob: the host
/// process drives the loop and `interval` only says how often it should.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// time between sweeps, default one day
    pub interval: Duration,
    /// cap on investments processed per sweep, unlimited when none
    pub batch_limit: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::days(1),
            batch_limit: None,
        }
    }
}
