// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Pipeline configuration defaults.

use serde::{Deserialize, Serialize};

/// Default transfer size used when a producer offers no buffer-size hint.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Pump tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpConfig {
    /// Maximum number of buckets the brigade holds before pushes block.
    pub brigade_capacity: usize,
    /// Bucket size used when the producer offers no hint.
    pub default_bucket_size: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            brigade_capacity: 16,
            default_bucket_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Sizing policy for the write-side buffering adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Smallest retained capacity; the buffer shrinks back toward this
    /// after a flush.
    pub minimum: usize,
    /// Doubling growth stops at this capacity.
    pub ceiling: usize,
    /// Fixed growth step once the ceiling has been reached.
    pub increment: usize,
    /// Number of zero-progress growth steps beyond the ceiling tolerated
    /// before the pipeline is declared stalled.
    pub max_stalls: u32,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            minimum: 8 * 1024,
            ceiling: 256 * 1024,
            increment: 8 * 1024,
            max_stalls: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Defaults are internally consistent: growth has room to operate.
    #[test]
    fn default_buffer_config_is_sane() {
        let cfg = BufferConfig::default();
        assert!(cfg.minimum > 0);
        assert!(cfg.ceiling >= cfg.minimum);
        assert!(cfg.increment > 0);
        assert!(cfg.max_stalls > 0);
    }

    /// Config round-trips through the serde surface.
    #[test]
    fn pump_config_serde_round_trip() {
        let cfg = PumpConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: PumpConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.brigade_capacity, cfg.brigade_capacity);
        assert_eq!(back.default_bucket_size, cfg.default_bucket_size);
    }
}
