//! Single-universe address planner.
//!
//! Holds the fixtures a user is laying out and where each one is patched,
//! and derives the channel grid, utilisation and overlap report from them.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use ylink_fixtures::{Fixture, Placement, CHANNELS_PER_UNIVERSE};

use super::overlap::{check_overlap, next_free_address, OverlapRange, PlacementRange};
use crate::patch::ImportedPatchRow;

/// Non-fatal outcome of a planner action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlannerWarning {
    #[error("fixture does not fit at that address")]
    #[serde(rename_all = "camelCase")]
    OutOfRange { fixture_id: String, max_address: u32 },
    #[error("no free run of channels is large enough")]
    #[serde(rename_all = "camelCase")]
    NoSpace { fixture_id: String },
    #[error("unknown fixture {fixture_id}")]
    #[serde(rename_all = "camelCase")]
    UnknownFixture { fixture_id: String },
    #[error("a fixture with id {fixture_id} already exists")]
    #[serde(rename_all = "camelCase")]
    DuplicateFixture { fixture_id: String },
}

/// Overlap between two patched fixtures, with names resolved for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedOverlap {
    pub a_name: String,
    pub b_name: String,
    #[serde(flatten)]
    pub range: OverlapRange,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerLayout {
    /// Fixture ids occupying each channel, index 0 is address 1.
    pub cells: Vec<Vec<String>>,
    pub occupancy: Vec<bool>,
    pub used_channels: u32,
    /// Rounded percentage of the universe in use.
    pub utilization: u32,
    pub overlaps: Vec<NamedOverlap>,
}

#[derive(Clone, Debug, Default)]
pub struct AddressPlanner {
    fixtures: Vec<Fixture>,
    placements: HashMap<String, Placement>,
    fallback_name: String,
}

impl AddressPlanner {
    pub fn new(fallback_name: &str) -> Self {
        AddressPlanner {
            fixtures: Vec::new(),
            placements: HashMap::new(),
            fallback_name: fallback_name.to_string(),
        }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn fixture(&self, fixture_id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == fixture_id)
    }

    pub fn placement(&self, fixture_id: &str) -> Option<&Placement> {
        self.placements.get(fixture_id)
    }

    pub fn add_fixture(&mut self, fixture: Fixture) -> Result<(), PlannerWarning> {
        if self.fixture(&fixture.id).is_some() {
            return Err(PlannerWarning::DuplicateFixture {
                fixture_id: fixture.id,
            });
        }
        self.fixtures.push(fixture);
        Ok(())
    }

    /// Replace a fixture's name, footprint and category. Its placement is kept.
    pub fn update_fixture(&mut self, fixture: Fixture) -> Result<(), PlannerWarning> {
        let existing = self
            .fixtures
            .iter_mut()
            .find(|f| f.id == fixture.id)
            .ok_or_else(|| PlannerWarning::UnknownFixture {
                fixture_id: fixture.id.clone(),
            })?;
        *existing = fixture;
        Ok(())
    }

    pub fn remove_fixture(&mut self, fixture_id: &str) -> Option<Fixture> {
        let index = self.fixtures.iter().position(|f| f.id == fixture_id)?;
        self.placements.remove(fixture_id);
        Some(self.fixtures.remove(index))
    }

    pub fn clear_placement(&mut self, fixture_id: &str) {
        self.placements.remove(fixture_id);
    }

    /// Patch a fixture at `start_address` in universe 1. Overlaps are allowed
    /// and reported by [`AddressPlanner::layout`]; running off the end is not.
    pub fn place_fixture(
        &mut self,
        fixture_id: &str,
        start_address: u32,
    ) -> Result<(), PlannerWarning> {
        let fixture = self
            .fixture(fixture_id)
            .ok_or_else(|| PlannerWarning::UnknownFixture {
                fixture_id: fixture_id.to_string(),
            })?;

        let placement = Placement::new(fixture_id, 1, start_address.max(1));
        if !placement.fits(fixture) {
            return Err(PlannerWarning::OutOfRange {
                fixture_id: fixture_id.to_string(),
                max_address: fixture.max_start_address(),
            });
        }

        self.placements.insert(fixture_id.to_string(), placement);
        Ok(())
    }

    /// Patch a fixture at the first free run large enough for it.
    pub fn place_next_free(&mut self, fixture_id: &str) -> Result<u32, PlannerWarning> {
        let channels = self
            .fixture(fixture_id)
            .map(|f| u32::from(f.channels))
            .ok_or_else(|| PlannerWarning::UnknownFixture {
                fixture_id: fixture_id.to_string(),
            })?;

        // The fixture's own footprint does not block it from moving.
        let previous = self.placements.remove(fixture_id);
        let occupancy = self.layout().occupancy;

        match next_free_address(&occupancy, channels, 1) {
            Some(address) => {
                self.place_fixture(fixture_id, address)?;
                Ok(address)
            }
            None => {
                if let Some(previous) = previous {
                    self.placements.insert(fixture_id.to_string(), previous);
                }
                Err(PlannerWarning::NoSpace {
                    fixture_id: fixture_id.to_string(),
                })
            }
        }
    }

    /// Patched fixtures as inclusive ranges, in fixture order.
    pub fn ranges(&self) -> Vec<PlacementRange> {
        self.fixtures
            .iter()
            .filter_map(|fixture| {
                let placement = self.placements.get(&fixture.id)?;
                Some(PlacementRange::new(
                    &fixture.id,
                    placement.start_address,
                    fixture.end_address(placement.start_address),
                ))
            })
            .collect()
    }

    pub fn layout(&self) -> PlannerLayout {
        let universe = usize::from(CHANNELS_PER_UNIVERSE);
        let mut grid: Vec<BTreeSet<String>> = vec![BTreeSet::new(); universe];
        let ranges = self.ranges();

        for range in &ranges {
            for channel in range.start..=range.end {
                if (1..=universe as u32).contains(&channel) {
                    grid[channel as usize - 1].insert(range.id.clone());
                }
            }
        }

        let overlaps = check_overlap(&ranges)
            .into_iter()
            .map(|range| NamedOverlap {
                a_name: self.display_name(&range.a_id),
                b_name: self.display_name(&range.b_id),
                range,
            })
            .collect();

        let occupancy: Vec<bool> = grid.iter().map(|cell| !cell.is_empty()).collect();
        let used_channels = occupancy.iter().filter(|used| **used).count() as u32;
        let utilization =
            (f64::from(used_channels) / f64::from(CHANNELS_PER_UNIVERSE) * 100.0).round() as u32;

        PlannerLayout {
            cells: grid.into_iter().map(|cell| cell.into_iter().collect()).collect(),
            occupancy,
            used_channels,
            utilization,
            overlaps,
        }
    }

    /// Patched fixtures as patch-sheet import rows, ordered by address.
    pub fn handoff_rows(&self) -> Vec<ImportedPatchRow> {
        let mut rows: Vec<ImportedPatchRow> = self
            .fixtures
            .iter()
            .filter_map(|fixture| {
                let placement = self.placements.get(&fixture.id)?;
                Some(ImportedPatchRow {
                    name: self.display_name(&fixture.id),
                    channels: u32::from(fixture.channels),
                    universe: placement.universe,
                    address: placement.start_address,
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.universe, row.address));
        rows
    }

    fn display_name(&self, fixture_id: &str) -> String {
        self.fixture(fixture_id)
            .map(|f| f.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(self.fallback_name.as_str())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use ylink_fixtures::FixtureCategory;

    use super::*;

    fn planner_with(fixtures: &[(&str, &str, u16)]) -> AddressPlanner {
        let mut planner = AddressPlanner::new("Fixture");
        for (id, name, channels) in fixtures {
            planner
                .add_fixture(Fixture::new(id, name, *channels, FixtureCategory::Wash))
                .unwrap();
        }
        planner
    }

    #[test]
    fn test_place_and_next_free() {
        let mut planner = planner_with(&[("a", "Wash L", 13), ("b", "Wash R", 13)]);
        assert_eq!(planner.place_next_free("a"), Ok(1));
        assert_eq!(planner.place_next_free("b"), Ok(14));

        let layout = planner.layout();
        assert_eq!(layout.used_channels, 26);
        assert_eq!(layout.utilization, 5);
        assert!(layout.overlaps.is_empty());
        assert_eq!(layout.cells[13], vec!["b".to_string()]);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut planner = planner_with(&[("a", "Spot", 13)]);
        assert_eq!(
            planner.place_fixture("a", 501),
            Err(PlannerWarning::OutOfRange {
                fixture_id: "a".to_string(),
                max_address: 500
            })
        );
        assert!(planner.placement("a").is_none());
        assert!(planner.place_fixture("a", 500).is_ok());
    }

    #[test]
    fn test_huge_start_address_is_out_of_range() {
        let mut planner = planner_with(&[("a", "Spot", 13)]);
        for start in [u32::MAX, u32::MAX - 11, 1 << 31] {
            assert_eq!(
                planner.place_fixture("a", start),
                Err(PlannerWarning::OutOfRange {
                    fixture_id: "a".to_string(),
                    max_address: 500
                })
            );
        }
        assert!(planner.placement("a").is_none());
        assert_eq!(planner.layout().used_channels, 0);
    }

    #[test]
    fn test_overlaps_are_flagged_not_prevented() {
        let mut planner = planner_with(&[("a", "Left", 10), ("b", "", 11)]);
        planner.place_fixture("a", 1).unwrap();
        planner.place_fixture("b", 5).unwrap();

        let layout = planner.layout();
        assert_eq!(layout.overlaps.len(), 1);
        let overlap = &layout.overlaps[0];
        assert_eq!(overlap.a_name, "Left");
        assert_eq!(overlap.b_name, "Fixture");
        assert_eq!((overlap.range.start, overlap.range.end), (5, 10));
        assert_eq!(layout.cells[5].len(), 2);
        assert_eq!(layout.used_channels, 15);
    }

    #[test]
    fn test_no_space_keeps_existing_placement() {
        let mut planner = planner_with(&[("full", "Pixel wall", 500), ("b", "Spot", 20)]);
        planner.place_fixture("full", 1).unwrap();
        planner.place_fixture("b", 490).unwrap();
        assert_eq!(
            planner.place_next_free("b"),
            Err(PlannerWarning::NoSpace {
                fixture_id: "b".to_string()
            })
        );
        assert_eq!(planner.placement("b").map(|p| p.start_address), Some(490));
    }

    #[test]
    fn test_remove_fixture_drops_placement() {
        let mut planner = planner_with(&[("a", "Wash", 8)]);
        planner.place_fixture("a", 1).unwrap();
        assert!(planner.remove_fixture("a").is_some());
        assert!(planner.placement("a").is_none());
        assert_eq!(planner.layout().used_channels, 0);
    }

    #[test]
    fn test_duplicate_and_unknown_ids() {
        let mut planner = planner_with(&[("a", "Wash", 8)]);
        assert!(matches!(
            planner.add_fixture(Fixture::new("a", "Again", 4, FixtureCategory::Fx)),
            Err(PlannerWarning::DuplicateFixture { .. })
        ));
        assert!(matches!(
            planner.place_fixture("missing", 1),
            Err(PlannerWarning::UnknownFixture { .. })
        ));
    }

    #[test]
    fn test_handoff_rows_sorted_by_address() {
        let mut planner = planner_with(&[("a", "Spot", 16), ("b", "Wash", 12)]);
        planner.place_fixture("a", 100).unwrap();
        planner.place_fixture("b", 1).unwrap();

        let rows = planner.handoff_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Wash");
        assert_eq!(rows[0].address, 1);
        assert_eq!(rows[1].name, "Spot");
        assert_eq!(rows[1].channels, 16);
    }
}
