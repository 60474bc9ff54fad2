//! Ten-way DIP switch address encoding, switch 1 is the least significant.

use serde::{Deserialize, Serialize};

pub const SWITCH_COUNT: usize = 10;
pub const SWITCH_WEIGHTS: [u16; SWITCH_COUNT] = [1, 2, 4, 8, 16, 32, 64, 128, 256, 512];
pub const MAX_DIP_ADDRESS: u16 = 1023;

/// Addresses offered as one-click shortcuts.
pub const PRESETS: [u16; 8] = [1, 17, 33, 65, 129, 257, 385, 511];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DipSwitches {
    pub address: u16,
    /// On/off per switch, index 0 is switch 1.
    pub switches: [bool; SWITCH_COUNT],
    pub binary: String,
}

impl DipSwitches {
    /// Switch states for `address`, clamped to 0..=1023.
    pub fn from_address(address: i64) -> Self {
        let address = address.clamp(0, i64::from(MAX_DIP_ADDRESS)) as u16;
        let mut switches = [false; SWITCH_COUNT];
        for (switch, weight) in switches.iter_mut().zip(SWITCH_WEIGHTS) {
            *switch = address & weight == weight;
        }
        DipSwitches {
            address,
            switches,
            binary: format!("{:010b}", address),
        }
    }

    pub fn from_switches(switches: [bool; SWITCH_COUNT]) -> Self {
        let address = switches
            .iter()
            .zip(SWITCH_WEIGHTS)
            .filter(|(on, _)| **on)
            .map(|(_, weight)| weight)
            .sum();
        DipSwitches {
            address,
            switches,
            binary: format!("{:010b}", address),
        }
    }

    /// Flip one switch (0-based). Out of range indices leave the state as is.
    pub fn toggle(&self, index: usize) -> Self {
        let mut switches = self.switches;
        if let Some(switch) = switches.get_mut(index) {
            *switch = !*switch;
        }
        Self::from_switches(switches)
    }
}
