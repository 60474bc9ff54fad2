//! Sequential patch allocation across universes.

use serde::{Deserialize, Serialize};
use ylink_fixtures::CHANNELS_PER_UNIVERSE;

use crate::address::clamp_int;
use crate::limits::ToolLimits;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSettings {
    pub start_universe: u32,
    pub start_address: u32,
    pub channels_per_universe: u32,
}

/// One line of the fixture list: `quantity` identical units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSpec {
    pub name: String,
    pub channel_count: u32,
    pub quantity: u32,
}

/// One physical unit with its assigned universe and address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRow {
    pub fixture_label: String,
    pub fixture_name: String,
    pub index_label: String,
    pub universe: u32,
    pub address: u32,
    pub address_label: String,
    pub channels: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PatchWarning {
    StartAddressTooHigh,
    #[serde(rename_all = "camelCase")]
    FixtureTooLarge {
        name: String,
        channels_per_universe: u32,
    },
    MissingName,
    #[serde(rename_all = "camelCase")]
    RowLimitReached {
        max_rows: u32,
    },
    #[serde(rename_all = "camelCase")]
    UniverseLimitReached {
        max_universe: u32,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSheet {
    pub rows: Vec<PatchRow>,
    pub warnings: Vec<PatchWarning>,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            start_universe: 1,
            start_address: 1,
            channels_per_universe: 512,
        }
    }
}

impl PatchSettings {
    /// Settings from raw form values, floored and raised to at least 1.
    /// A universe never holds more than 512 channels.
    pub fn from_raw(start_universe: f64, start_address: f64, channels_per_universe: f64) -> Self {
        Self {
            start_universe: clamp_int(start_universe, 1),
            start_address: clamp_int(start_address, 1),
            channels_per_universe: clamp_int(channels_per_universe, 1),
        }
        .sanitized()
    }

    fn sanitized(&self) -> Self {
        Self {
            start_universe: self.start_universe.max(1),
            start_address: self.start_address.max(1),
            channels_per_universe: self
                .channels_per_universe
                .clamp(1, u32::from(CHANNELS_PER_UNIVERSE)),
        }
    }
}

impl FixtureSpec {
    pub fn new(name: &str, channel_count: u32, quantity: u32) -> Self {
        Self {
            name: name.to_string(),
            channel_count,
            quantity,
        }
    }

    fn display_name<'a>(&'a self, fallback_name: &'a str) -> &'a str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            fallback_name
        } else {
            trimmed
        }
    }
}

impl std::fmt::Display for PatchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchWarning::StartAddressTooHigh => write!(
                f,
                "Start address is higher than the universe size, starting at address 1"
            ),
            PatchWarning::FixtureTooLarge {
                name,
                channels_per_universe,
            } => write!(
                f,
                "{} needs more than {} channels and cannot fit in one universe",
                name, channels_per_universe
            ),
            PatchWarning::MissingName => write!(f, "Every fixture needs a name"),
            PatchWarning::RowLimitReached { max_rows } => {
                write!(f, "The sheet stops at {} rows", max_rows)
            }
            PatchWarning::UniverseLimitReached { max_universe } => {
                write!(f, "The sheet stops at universe {}", max_universe)
            }
        }
    }
}

pub(crate) fn pad_number(value: u32, width: usize) -> String {
    format!("{:0width$}", value, width = width)
}

/// Zero-pad width for unit indices: at least two digits.
pub(crate) fn index_width(count: u32) -> usize {
    count.max(1).to_string().len().max(2)
}

/// Problems with the form as entered, without allocating anything.
pub fn validate(settings: &PatchSettings, fixtures: &[FixtureSpec], fallback_name: &str) -> Vec<PatchWarning> {
    let settings = settings.sanitized();
    let mut warnings = Vec::new();

    if settings.start_address > settings.channels_per_universe {
        warnings.push(PatchWarning::StartAddressTooHigh);
    }

    for fixture in fixtures {
        if fixture.channel_count.max(1) > settings.channels_per_universe {
            push_unique(
                &mut warnings,
                PatchWarning::FixtureTooLarge {
                    name: fixture.display_name(fallback_name).to_string(),
                    channels_per_universe: settings.channels_per_universe,
                },
            );
        }
        if fixture.name.trim().is_empty() {
            push_unique(&mut warnings, PatchWarning::MissingName);
        }
    }

    warnings
}

/// Assign every unit a universe and start address, in list order.
///
/// Units are packed one after another; a unit that would run past
/// `channels_per_universe` starts the next universe at address 1. Fixtures
/// larger than a universe are reported and left out of the sheet. Generation
/// stops with a warning once `limits` caps the row count or the universe number.
pub fn generate(
    settings: &PatchSettings,
    fixtures: &[FixtureSpec],
    fallback_name: &str,
    limits: &ToolLimits,
) -> PatchSheet {
    let mut settings = settings.sanitized();
    let mut warnings = Vec::new();
    let max_universe = limits.max_universe.max(1);
    let max_rows = limits.max_patch_rows as usize;

    if settings.start_address > settings.channels_per_universe {
        warnings.push(PatchWarning::StartAddressTooHigh);
        settings.start_address = 1;
    }

    let mut universe = settings.start_universe.min(max_universe);
    let mut address = settings.start_address;
    let mut rows = Vec::new();

    'fixtures: for fixture in fixtures {
        let channels = fixture.channel_count.max(1);
        let quantity = fixture.quantity.max(1);
        let name = fixture.display_name(fallback_name);

        if channels > settings.channels_per_universe {
            log::warn!(
                "Skipping {} x {}: {} channels exceed universe size {}",
                quantity,
                name,
                channels,
                settings.channels_per_universe
            );
            push_unique(
                &mut warnings,
                PatchWarning::FixtureTooLarge {
                    name: name.to_string(),
                    channels_per_universe: settings.channels_per_universe,
                },
            );
            continue;
        }

        let width = index_width(quantity);
        for index in 1..=quantity {
            if rows.len() >= max_rows {
                log::warn!("Patch sheet truncated at {} rows", max_rows);
                warnings.push(PatchWarning::RowLimitReached {
                    max_rows: limits.max_patch_rows,
                });
                break 'fixtures;
            }
            if address + channels - 1 > settings.channels_per_universe {
                if universe >= max_universe {
                    log::warn!("Patch sheet truncated at universe {}", max_universe);
                    warnings.push(PatchWarning::UniverseLimitReached { max_universe });
                    break 'fixtures;
                }
                universe += 1;
                address = 1;
            }

            let index_label = pad_number(index, width);
            rows.push(PatchRow {
                fixture_label: format!("{} {}", name, index_label),
                fixture_name: name.to_string(),
                index_label,
                universe,
                address,
                address_label: pad_number(address, 3),
                channels,
            });

            address += channels;
        }
    }

    PatchSheet { rows, warnings }
}

fn push_unique(warnings: &mut Vec<PatchWarning>, warning: PatchWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::MAX_UNIVERSE;

    const FALLBACK: &str = "Fixture";

    #[test]
    fn test_sequential_allocation() {
        let sheet = generate(
            &PatchSettings::default(),
            &[FixtureSpec::new("Wash", 13, 2), FixtureSpec::new("Spot", 16, 1)],
            FALLBACK,
            &ToolLimits::default(),
        );
        assert!(sheet.warnings.is_empty());
        let addresses: Vec<_> = sheet.rows.iter().map(|r| (r.universe, r.address)).collect();
        assert_eq!(addresses, vec![(1, 1), (1, 14), (1, 27)]);
        assert_eq!(sheet.rows[0].fixture_label, "Wash 01");
        assert_eq!(sheet.rows[1].address_label, "014");
        assert_eq!(sheet.rows[2].index_label, "01");
    }

    #[test]
    fn test_rolls_over_to_next_universe() {
        let sheet = generate(
            &PatchSettings {
                start_universe: 1,
                start_address: 500,
                channels_per_universe: 512,
            },
            &[FixtureSpec::new("Par", 20, 30)],
            FALLBACK,
            &ToolLimits::default(),
        );
        // 500 is a valid start, but 500..519 would cross the boundary
        assert!(sheet.warnings.is_empty());
        assert_eq!(sheet.rows.len(), 30);
        assert_eq!((sheet.rows[0].universe, sheet.rows[0].address), (2, 1));
        // 512 / 20 = 25 units per universe
        assert_eq!((sheet.rows[24].universe, sheet.rows[24].address), (2, 481));
        assert_eq!((sheet.rows[25].universe, sheet.rows[25].address), (3, 1));
        assert_eq!((sheet.rows[29].universe, sheet.rows[29].address), (3, 81));
    }

    #[test]
    fn test_start_address_above_universe_falls_back() {
        let sheet = generate(
            &PatchSettings {
                start_universe: 3,
                start_address: 600,
                channels_per_universe: 512,
            },
            &[FixtureSpec::new("Par", 20, 2)],
            FALLBACK,
            &ToolLimits::default(),
        );
        assert_eq!(sheet.warnings, vec![PatchWarning::StartAddressTooHigh]);
        assert_eq!((sheet.rows[0].universe, sheet.rows[0].address), (3, 1));
        assert_eq!(sheet.rows[1].address, 21);
    }

    #[test]
    fn test_oversized_fixture_is_warned_and_skipped() {
        let sheet = generate(
            &PatchSettings {
                channels_per_universe: 64,
                ..PatchSettings::default()
            },
            &[
                FixtureSpec::new("Pixel bar", 100, 2),
                FixtureSpec::new("Par", 8, 1),
            ],
            FALLBACK,
            &ToolLimits::default(),
        );
        assert_eq!(
            sheet.warnings,
            vec![PatchWarning::FixtureTooLarge {
                name: "Pixel bar".to_string(),
                channels_per_universe: 64
            }]
        );
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!((sheet.rows[0].universe, sheet.rows[0].address), (1, 1));
    }

    #[test]
    fn test_rows_never_cross_a_universe() {
        let settings = PatchSettings {
            start_universe: 1,
            start_address: 37,
            channels_per_universe: 100,
        };
        let fixtures = [
            FixtureSpec::new("A", 7, 11),
            FixtureSpec::new("B", 33, 5),
            FixtureSpec::new("C", 1, 9),
            FixtureSpec::new("D", 100, 2),
        ];
        let sheet = generate(&settings, &fixtures, FALLBACK, &ToolLimits::default());
        assert_eq!(sheet.rows.len(), 27);
        for row in &sheet.rows {
            assert!(row.address >= 1);
            assert!(row.address + row.channels - 1 <= settings.channels_per_universe);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let settings = PatchSettings::default();
        let fixtures = [FixtureSpec::new("Wash", 13, 40), FixtureSpec::new("", 3, 7)];
        assert_eq!(
            generate(&settings, &fixtures, FALLBACK, &ToolLimits::default()),
            generate(&settings, &fixtures, FALLBACK, &ToolLimits::default())
        );
    }

    #[test]
    fn test_blank_name_and_wide_index() {
        let sheet = generate(
            &PatchSettings::default(),
            &[FixtureSpec::new("  ", 1, 120)],
            FALLBACK,
            &ToolLimits::default(),
        );
        assert_eq!(sheet.rows[0].fixture_label, "Fixture 001");
        assert_eq!(sheet.rows[119].index_label, "120");
    }

    #[test]
    fn test_validate_deduplicates() {
        let warnings = validate(
            &PatchSettings {
                start_universe: 1,
                start_address: 40,
                channels_per_universe: 32,
            },
            &[
                FixtureSpec::new("", 4, 1),
                FixtureSpec::new("", 4, 1),
                FixtureSpec::new("Big", 64, 1),
                FixtureSpec::new("Big", 64, 1),
            ],
            FALLBACK,
        );
        assert_eq!(
            warnings,
            vec![
                PatchWarning::StartAddressTooHigh,
                PatchWarning::MissingName,
                PatchWarning::FixtureTooLarge {
                    name: "Big".to_string(),
                    channels_per_universe: 32
                },
            ]
        );
    }

    #[test]
    fn test_settings_from_raw() {
        let settings = PatchSettings::from_raw(0.0, -3.0, 511.7);
        assert_eq!(settings.start_universe, 1);
        assert_eq!(settings.start_address, 1);
        assert_eq!(settings.channels_per_universe, 511);

        let settings = PatchSettings::from_raw(1e12, 1e12, 1e12);
        assert_eq!(settings.start_universe, u32::MAX);
        assert_eq!(settings.start_address, u32::MAX);
        assert_eq!(settings.channels_per_universe, 512);
    }

    #[test]
    fn test_huge_inputs_stay_bounded() {
        let limits = ToolLimits::default();
        let sheet = generate(
            &PatchSettings::from_raw(1e12, 1e12, 1e12),
            &[
                FixtureSpec::new("Huge", u32::MAX, 2),
                FixtureSpec::new("Par", 7, 3),
            ],
            FALLBACK,
            &limits,
        );
        assert_eq!(
            sheet.warnings,
            vec![
                PatchWarning::StartAddressTooHigh,
                PatchWarning::FixtureTooLarge {
                    name: "Huge".to_string(),
                    channels_per_universe: 512
                },
            ]
        );
        let placed: Vec<_> = sheet.rows.iter().map(|r| (r.universe, r.address)).collect();
        assert_eq!(
            placed,
            vec![(MAX_UNIVERSE, 1), (MAX_UNIVERSE, 8), (MAX_UNIVERSE, 15)]
        );
    }

    #[test]
    fn test_stops_at_last_universe() {
        let sheet = generate(
            &PatchSettings {
                start_universe: u32::MAX,
                start_address: 510,
                channels_per_universe: 512,
            },
            &[FixtureSpec::new("Par", 7, 4)],
            FALLBACK,
            &ToolLimits::default(),
        );
        assert!(sheet.rows.is_empty());
        assert_eq!(
            sheet.warnings,
            vec![PatchWarning::UniverseLimitReached {
                max_universe: MAX_UNIVERSE
            }]
        );
    }

    #[test]
    fn test_row_limit_truncates_the_sheet() {
        let limits = ToolLimits {
            max_patch_rows: 50,
            ..ToolLimits::default()
        };
        let sheet = generate(
            &PatchSettings::default(),
            &[FixtureSpec::new("Pixel", 1, u32::MAX), FixtureSpec::new("Par", 7, 2)],
            FALLBACK,
            &limits,
        );
        assert_eq!(sheet.rows.len(), 50);
        assert_eq!(sheet.rows[49].fixture_label, "Pixel 0000000050");
        assert_eq!(sheet.warnings, vec![PatchWarning::RowLimitReached { max_rows: 50 }]);
    }
}
