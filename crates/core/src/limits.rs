//! Upper bounds on calculator inputs that size loops and allocations.

use serde::{Deserialize, Serialize};

/// Highest universe number, the 15-bit Art-Net port-address space.
pub const MAX_UNIVERSE: u32 = 32_768;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolLimits {
    /// Universe numbers above this are clamped, and the patch sheet stops
    /// rather than rolling past it.
    pub max_universe: u32,
    /// Rows generated for one patch sheet.
    pub max_patch_rows: u32,
    /// Units counted by one power estimate, summed over all fixture lines.
    pub max_power_units: u32,
    pub max_circuits: u32,
    pub max_phases: u32,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            max_universe: MAX_UNIVERSE,
            max_patch_rows: 10_000,
            max_power_units: 10_000,
            max_circuits: 96,
            max_phases: 3,
        }
    }
}
