use serde::{Deserialize, Serialize};

/// Inclusive channel range occupied by one fixture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRange {
    pub id: String,
    pub start: u32,
    pub end: u32,
}

/// Two ranges that share channels, with the shared span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapRange {
    pub a_id: String,
    pub b_id: String,
    pub start: u32,
    pub end: u32,
}

impl PlacementRange {
    pub fn new(id: &str, start: u32, end: u32) -> Self {
        PlacementRange {
            id: id.to_string(),
            start,
            end,
        }
    }
}

/// Floors a user supplied number and raises it to at least `min`.
/// NaN and infinities collapse to `min`.
pub fn clamp_int(value: f64, min: u32) -> u32 {
    if !value.is_finite() {
        return min;
    }
    let floored = value.floor();
    if floored <= f64::from(min) {
        min
    } else if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}

/// Lowest 1-based address at or after `start_address` where `channels_needed`
/// consecutive cells of `occupied` are free.
pub fn next_free_address(
    occupied: &[bool],
    channels_needed: u32,
    start_address: u32,
) -> Option<u32> {
    if channels_needed == 0 {
        return None;
    }
    let required = channels_needed as usize;
    let start = start_address.max(1) as usize;
    if required > occupied.len() {
        return None;
    }
    let max_start = occupied.len() - required + 1;

    let mut address = start;
    while address <= max_start {
        let run = &occupied[address - 1..address - 1 + required];
        match run.iter().rposition(|cell| *cell) {
            // Jump past the last occupied cell in the window
            Some(offset) => address += offset + 1,
            None => return Some(address as u32),
        }
    }

    None
}

/// Every pair of ranges that share at least one channel.
pub fn check_overlap(ranges: &[PlacementRange]) -> Vec<OverlapRange> {
    let mut overlaps = Vec::new();
    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start <= end {
                overlaps.push(OverlapRange {
                    a_id: a.id.clone(),
                    b_id: b.id.clone(),
                    start,
                    end,
                });
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIVERSE: usize = 512;

    #[test]
    fn test_single_overlap_bounds() {
        let overlaps = check_overlap(&[
            PlacementRange::new("a", 1, 10),
            PlacementRange::new("b", 5, 15),
        ]);
        assert_eq!(
            overlaps,
            vec![OverlapRange {
                a_id: "a".to_string(),
                b_id: "b".to_string(),
                start: 5,
                end: 10,
            }]
        );
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let overlaps = check_overlap(&[
            PlacementRange::new("a", 1, 12),
            PlacementRange::new("b", 13, 24),
            PlacementRange::new("c", 25, 25),
        ]);
        assert!(overlaps.is_empty());
    }

    #[test]
    fn test_touching_endpoint_is_inclusive() {
        let overlaps = check_overlap(&[
            PlacementRange::new("a", 1, 13),
            PlacementRange::new("b", 13, 20),
        ]);
        assert_eq!(overlaps.len(), 1);
        assert_eq!((overlaps[0].start, overlaps[0].end), (13, 13));
    }

    #[test]
    fn test_each_pair_reported_once() {
        let overlaps = check_overlap(&[
            PlacementRange::new("a", 1, 20),
            PlacementRange::new("b", 5, 8),
            PlacementRange::new("c", 7, 30),
        ]);
        let pairs: Vec<_> = overlaps
            .iter()
            .map(|o| (o.a_id.as_str(), o.b_id.as_str(), o.start, o.end))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", "b", 5, 8), ("a", "c", 7, 20), ("b", "c", 7, 8)]
        );
        assert!(overlaps.iter().all(|o| o.a_id != o.b_id));
    }

    #[test]
    fn test_next_free_on_empty_universe() {
        let occupied = vec![false; UNIVERSE];
        assert_eq!(next_free_address(&occupied, 13, 1), Some(1));
    }

    #[test]
    fn test_next_free_after_placement() {
        let mut occupied = vec![false; UNIVERSE];
        occupied[..13].iter_mut().for_each(|cell| *cell = true);
        assert_eq!(next_free_address(&occupied, 13, 1), Some(14));
    }

    #[test]
    fn test_next_free_skips_small_gaps() {
        let mut occupied = vec![false; 40];
        occupied[..10].iter_mut().for_each(|cell| *cell = true);
        // 5 channel gap at 11..=15, then occupied again
        occupied[15..20].iter_mut().for_each(|cell| *cell = true);
        assert_eq!(next_free_address(&occupied, 5, 1), Some(11));
        assert_eq!(next_free_address(&occupied, 6, 1), Some(21));
    }

    #[test]
    fn test_next_free_respects_floor() {
        let occupied = vec![false; UNIVERSE];
        assert_eq!(next_free_address(&occupied, 4, 100), Some(100));
        assert_eq!(next_free_address(&occupied, 4, 0), Some(1));
    }

    #[test]
    fn test_next_free_never_runs_past_the_end() {
        let occupied = vec![false; UNIVERSE];
        assert_eq!(next_free_address(&occupied, 13, 500), Some(500));
        assert_eq!(next_free_address(&occupied, 13, 501), None);
        assert_eq!(next_free_address(&occupied, 513, 1), None);

        let mut occupied = vec![false; UNIVERSE];
        occupied[UNIVERSE - 1] = true;
        assert_eq!(next_free_address(&occupied, 13, 500), None);
    }

    #[test]
    fn test_zero_length_request_is_not_found() {
        let occupied = vec![false; UNIVERSE];
        assert_eq!(next_free_address(&occupied, 0, 1), None);
    }

    #[test]
    fn test_returned_run_is_free() {
        let mut occupied = vec![false; UNIVERSE];
        for (i, cell) in occupied.iter_mut().enumerate() {
            *cell = i % 7 == 0 || i % 11 == 0;
        }
        for needed in 1..8u32 {
            if let Some(address) = next_free_address(&occupied, needed, 1) {
                let start = address as usize - 1;
                let end = start + needed as usize;
                assert!(end <= occupied.len());
                assert!(occupied[start..end].iter().all(|cell| !cell));
            }
        }
    }

    #[test]
    fn test_clamp_int() {
        assert_eq!(clamp_int(12.9, 1), 12);
        assert_eq!(clamp_int(-4.0, 1), 1);
        assert_eq!(clamp_int(0.0, 0), 0);
        assert_eq!(clamp_int(f64::NAN, 1), 1);
        assert_eq!(clamp_int(f64::INFINITY, 1), 1);
    }
}
