//! Label setup options.
//!
//! Passed explicitly to every call that emits setup lines; there is no
//! process-wide default.

use serde::{Deserialize, Serialize};

/// Dots per millimetre assumed when none is configured (203 dpi heads).
pub const DEFAULT_DOTS_PER_UNIT: u32 = 8;

/// Configuration for the label setup block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsplOptions {
    /// Enable the peeler (`SET PEEL ON`).
    pub peel: bool,

    /// Printer dots per physical unit, used to express the label size in mm.
    /// Zero falls back to [`DEFAULT_DOTS_PER_UNIT`].
    pub dots_per_unit: u32,
}

impl Default for TsplOptions {
    fn default() -> Self {
        Self {
            peel: false,
            dots_per_unit: DEFAULT_DOTS_PER_UNIT,
        }
    }
}

impl TsplOptions {
    /// Create options with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set peel mode.
    pub fn with_peel(mut self, val: bool) -> Self {
        self.peel = val;
        self
    }

    /// Builder: set dots per unit (0 means the default).
    pub fn with_dots_per_unit(mut self, val: u32) -> Self {
        self.dots_per_unit = val;
        self
    }

    /// Dots per unit with the zero fallback applied.
    pub fn effective_dots_per_unit(&self) -> u32 {
        if self.dots_per_unit == 0 {
            DEFAULT_DOTS_PER_UNIT
        } else {
            self.dots_per_unit
        }
    }
}
