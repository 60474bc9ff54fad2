//! How many fixtures fit in a universe, and how many universes a rig needs.

use serde::{Deserialize, Serialize};

use crate::address::clamp_int;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub channels_per_fixture: u32,
    pub channels_per_universe: u32,
    pub fixtures_per_universe: u32,
    pub leftover_channels: u32,
    /// Only known when a fixture count was given and at least one fixture fits.
    pub universes_required: Option<u32>,
    /// A single fixture is larger than a universe.
    pub not_possible: bool,
    /// The requested count does not fit in one universe.
    pub exceeds_single_universe: bool,
}

/// Inputs are raw form values; each is floored and raised to at least 1.
pub fn capacity(
    channels_per_fixture: f64,
    fixture_count: Option<f64>,
    channels_per_universe: f64,
) -> CapacityReport {
    let per_fixture = clamp_int(channels_per_fixture, 1);
    let per_universe = clamp_int(channels_per_universe, 1);
    let fixtures_per_universe = per_universe / per_fixture;
    let leftover_channels = per_universe - fixtures_per_universe * per_fixture;
    let count = fixture_count.map(|count| clamp_int(count, 1));

    let universes_required = match count {
        Some(count) if fixtures_per_universe > 0 => Some(count.div_ceil(fixtures_per_universe)),
        _ => None,
    };
    let exceeds_single_universe =
        matches!(count, Some(count) if fixtures_per_universe > 0 && count > fixtures_per_universe);

    CapacityReport {
        channels_per_fixture: per_fixture,
        channels_per_universe: per_universe,
        fixtures_per_universe,
        leftover_channels,
        universes_required,
        not_possible: per_fixture > per_universe,
        exceeds_single_universe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_channel_fixtures() {
        let report = capacity(13.0, Some(24.0), 512.0);
        assert_eq!(report.fixtures_per_universe, 39);
        assert_eq!(report.leftover_channels, 5);
        assert_eq!(report.universes_required, Some(1));
        assert!(!report.exceeds_single_universe);
        assert!(!report.not_possible);
    }

    #[test]
    fn test_count_spills_into_more_universes() {
        let report = capacity(16.0, Some(100.0), 512.0);
        assert_eq!(report.fixtures_per_universe, 32);
        assert_eq!(report.leftover_channels, 0);
        assert_eq!(report.universes_required, Some(4));
        assert!(report.exceeds_single_universe);
    }

    #[test]
    fn test_without_count() {
        let report = capacity(13.0, None, 512.0);
        assert_eq!(report.universes_required, None);
        assert!(!report.exceeds_single_universe);
    }

    #[test]
    fn test_fixture_larger_than_universe() {
        let report = capacity(600.0, Some(2.0), 512.0);
        assert!(report.not_possible);
        assert_eq!(report.fixtures_per_universe, 0);
        assert_eq!(report.leftover_channels, 512);
        assert_eq!(report.universes_required, None);
        assert!(!report.exceeds_single_universe);
    }

    #[test]
    fn test_raw_inputs_are_clamped() {
        let report = capacity(0.0, Some(-3.0), f64::NAN);
        assert_eq!(report.channels_per_fixture, 1);
        assert_eq!(report.channels_per_universe, 1);
        assert_eq!(report.universes_required, Some(1));
    }
}
