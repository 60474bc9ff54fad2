use serde::{Deserialize, Serialize};

mod color_layout;

pub use color_layout::{ColorChannel, ColorLayout};

/// Channels in one DMX512 universe.
pub const CHANNELS_PER_UNIVERSE: u16 = 512;

/// A fixture as entered in one of the planning tools. Lives for the duration
/// of a request and is never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub name: String,
    pub channels: u16,
    #[serde(default)]
    pub category: FixtureCategory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureCategory {
    Wash,
    Spot,
    Beam,
    Fx,
    #[default]
    Other,
}

/// Where a fixture sits on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub fixture_id: String,
    pub universe: u32,
    pub start_address: u32,
}

impl FixtureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureCategory::Wash => "wash",
            FixtureCategory::Spot => "spot",
            FixtureCategory::Beam => "beam",
            FixtureCategory::Fx => "fx",
            FixtureCategory::Other => "other",
        }
    }

    /// Display order used when listing fixtures by category.
    pub fn all() -> Vec<FixtureCategory> {
        vec![
            FixtureCategory::Wash,
            FixtureCategory::Spot,
            FixtureCategory::Beam,
            FixtureCategory::Fx,
            FixtureCategory::Other,
        ]
    }
}

impl std::fmt::Display for FixtureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Fixture {
    pub fn new(id: &str, name: &str, channels: u16, category: FixtureCategory) -> Self {
        Fixture {
            id: id.to_string(),
            name: name.to_string(),
            channels,
            category,
        }
    }

    /// Last channel used when patched at `start_address`. Saturates at `u32::MAX`.
    pub fn end_address(&self, start_address: u32) -> u32 {
        start_address.saturating_add(u32::from(self.channels).max(1) - 1)
    }

    /// Highest start address that keeps the whole footprint inside one universe.
    /// Zero when the fixture is larger than a universe.
    pub fn max_start_address(&self) -> u32 {
        (u32::from(CHANNELS_PER_UNIVERSE) + 1).saturating_sub(u32::from(self.channels).max(1))
    }
}

impl Placement {
    pub fn new(fixture_id: &str, universe: u32, start_address: u32) -> Self {
        Placement {
            fixture_id: fixture_id.to_string(),
            universe,
            start_address,
        }
    }

    /// Whether the footprint stays inside the universe.
    pub fn fits(&self, fixture: &Fixture) -> bool {
        self.start_address >= 1
            && fixture.end_address(self.start_address) <= u32::from(CHANNELS_PER_UNIVERSE)
    }
}

#[macro_export]
macro_rules! color_channels {
    ($($channel:expr),* $(,)?) => {
        vec![$($channel,)*]
    };
}
