//! Lighting power draw and circuit / phase load estimate.

use serde::{Deserialize, Serialize};

use crate::address::clamp_int;
use crate::limits::ToolLimits;

/// Share of the breaker rating treated as the continuous safe load.
pub const SAFE_LOAD_FACTOR: f64 = 0.8;
/// Load ratio above which a circuit is reported as near its limit.
pub const NEAR_LIMIT_RATIO: f64 = 0.8;
/// Phase imbalance above which a warning is raised.
pub const IMBALANCE_WARNING: f64 = 0.2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerFixture {
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    pub watts: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PowerSettings {
    pub voltage: f64,
    pub breaker_amps: f64,
    pub circuits: f64,
    pub phases: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Ok,
    Near,
    Over,
}

/// An input was cut down to a configured maximum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PowerWarning {
    #[serde(rename_all = "camelCase")]
    UnitLimitReached { max_units: u32 },
    #[serde(rename_all = "camelCase")]
    CircuitLimitReached { max_circuits: u32 },
    #[serde(rename_all = "camelCase")]
    PhaseLimitReached { max_phases: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitLoad {
    pub circuit: u32,
    pub phase: u32,
    pub amps: f64,
    pub load_ratio: f64,
    pub status: LoadStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerReport {
    pub voltage: f64,
    pub breaker_amps: f64,
    pub circuit_count: u32,
    pub phase_count: u32,
    pub unit_count: u32,
    pub total_watts: f64,
    pub total_amps: f64,
    pub safe_limit_amps: f64,
    pub circuits: Vec<CircuitLoad>,
    pub phase_amps: Vec<f64>,
    /// `(max - min) / max` across phases, 0 when nothing draws power.
    pub imbalance: f64,
    pub imbalance_warning: bool,
    pub warnings: Vec<PowerWarning>,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            voltage: 230.0,
            breaker_amps: 16.0,
            circuits: 6.0,
            phases: 3.0,
        }
    }
}

impl PowerFixture {
    pub fn new(name: &str, quantity: f64, watts: f64) -> Self {
        PowerFixture {
            name: name.to_string(),
            quantity,
            watts,
        }
    }
}

impl LoadStatus {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            LoadStatus::Over
        } else if ratio > NEAR_LIMIT_RATIO {
            LoadStatus::Near
        } else {
            LoadStatus::Ok
        }
    }
}

fn at_least(value: f64, min: f64) -> f64 {
    if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

/// Spread every unit round-robin over the circuits, and the circuits
/// round-robin over the phases. Counts above `limits` are cut down and
/// reported in `warnings`.
pub fn power_report(
    fixtures: &[PowerFixture],
    settings: &PowerSettings,
    limits: &ToolLimits,
) -> PowerReport {
    let mut warnings = Vec::new();
    let voltage = at_least(settings.voltage, 1.0);
    let breaker_amps = at_least(settings.breaker_amps, 1.0);

    let max_circuits = limits.max_circuits.max(1);
    let mut circuit_count = clamp_int(settings.circuits, 1);
    if circuit_count > max_circuits {
        warnings.push(PowerWarning::CircuitLimitReached { max_circuits });
        circuit_count = max_circuits;
    }
    let max_phases = limits.max_phases.max(1);
    let mut phase_count = clamp_int(settings.phases, 1);
    if phase_count > max_phases {
        warnings.push(PowerWarning::PhaseLimitReached { max_phases });
        phase_count = max_phases;
    }
    let phase_count = phase_count.min(circuit_count);

    let max_units = limits.max_power_units as usize;
    let mut units: Vec<f64> = Vec::new();
    for fixture in fixtures {
        let quantity = clamp_int(fixture.quantity, 0) as usize;
        let room = max_units - units.len();
        if quantity > room {
            log::warn!("Power estimate truncated at {} units", max_units);
            units.extend(std::iter::repeat(at_least(fixture.watts, 0.0)).take(room));
            warnings.push(PowerWarning::UnitLimitReached {
                max_units: limits.max_power_units,
            });
            break;
        }
        units.extend(std::iter::repeat(at_least(fixture.watts, 0.0)).take(quantity));
    }

    let total_watts: f64 = units.iter().sum();
    let total_amps = total_watts / voltage;

    let mut circuit_amps = vec![0.0; circuit_count as usize];
    for (index, watts) in units.iter().enumerate() {
        circuit_amps[index % circuit_count as usize] += watts / voltage;
    }

    let mut phase_amps = vec![0.0; phase_count as usize];
    for (index, amps) in circuit_amps.iter().enumerate() {
        phase_amps[index % phase_count as usize] += amps;
    }

    let safe_limit_amps = breaker_amps * SAFE_LOAD_FACTOR;
    let circuits = circuit_amps
        .iter()
        .enumerate()
        .map(|(index, amps)| {
            let load_ratio = amps / safe_limit_amps;
            CircuitLoad {
                circuit: index as u32 + 1,
                phase: (index % phase_count as usize) as u32 + 1,
                amps: *amps,
                load_ratio,
                status: LoadStatus::from_ratio(load_ratio),
            }
        })
        .collect();

    let max_phase = phase_amps.iter().copied().fold(0.0, f64::max);
    let min_phase = phase_amps.iter().copied().fold(f64::INFINITY, f64::min);
    let imbalance = if max_phase > 0.0 {
        (max_phase - min_phase) / max_phase
    } else {
        0.0
    };

    PowerReport {
        voltage,
        breaker_amps,
        circuit_count,
        phase_count,
        unit_count: units.len() as u32,
        total_watts,
        total_amps,
        safe_limit_amps,
        circuits,
        phase_amps,
        imbalance,
        imbalance_warning: imbalance > IMBALANCE_WARNING,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_even_spread() {
        let report = power_report(
            &[PowerFixture::new("LED Par", 6.0, 230.0)],
            &PowerSettings::default(),
            &ToolLimits::default(),
        );
        assert_eq!(report.unit_count, 6);
        assert_relative_eq!(report.total_watts, 1380.0);
        assert_relative_eq!(report.total_amps, 6.0);
        assert_relative_eq!(report.safe_limit_amps, 12.8);
        assert!(report.circuits.iter().all(|c| c.amps == 1.0));
        assert_eq!(report.phase_amps, vec![2.0, 2.0, 2.0]);
        assert_eq!(report.imbalance, 0.0);
        assert!(!report.imbalance_warning);
        assert_eq!(report.circuits[4].phase, 2);
    }

    #[test]
    fn test_circuit_status() {
        let report = power_report(
            &[
                PowerFixture::new("Profile", 1.0, 2415.0),
                PowerFixture::new("Fresnel", 1.0, 3450.0),
                PowerFixture::new("Par", 1.0, 230.0),
            ],
            &PowerSettings {
                circuits: 3.0,
                ..PowerSettings::default()
            },
            &ToolLimits::default(),
        );
        let statuses: Vec<_> = report.circuits.iter().map(|c| c.status).collect();
        // 10.5 A and 15 A against a 12.8 A safe limit
        assert_eq!(statuses, vec![LoadStatus::Near, LoadStatus::Over, LoadStatus::Ok]);
        assert!(report.imbalance_warning);
    }

    #[test]
    fn test_phases_never_exceed_circuits() {
        let report = power_report(
            &[PowerFixture::new("Par", 3.0, 100.0)],
            &PowerSettings {
                circuits: 2.0,
                phases: 3.0,
                ..PowerSettings::default()
            },
            &ToolLimits::default(),
        );
        assert_eq!(report.phase_count, 2);
        assert_eq!(report.phase_amps.len(), 2);
    }

    #[test]
    fn test_unbalanced_phases_warn() {
        let report = power_report(
            &[PowerFixture::new("Par", 4.0, 460.0)],
            &PowerSettings::default(),
            &ToolLimits::default(),
        );
        // circuits 5 and 6 stay empty
        assert_eq!(report.phase_amps, vec![4.0, 2.0, 2.0]);
        assert_relative_eq!(report.imbalance, 0.5);
        assert!(report.imbalance_warning);
    }

    #[test]
    fn test_bad_inputs_are_clamped() {
        let report = power_report(
            &[
                PowerFixture::new("Ghost", -2.0, 500.0),
                PowerFixture::new("Broken", 2.5, -100.0),
            ],
            &PowerSettings {
                voltage: 0.0,
                breaker_amps: f64::NAN,
                circuits: 0.0,
                phases: 0.0,
            },
            &ToolLimits::default(),
        );
        assert_eq!(report.unit_count, 2);
        assert_eq!(report.total_watts, 0.0);
        assert_eq!(report.voltage, 1.0);
        assert_eq!(report.breaker_amps, 1.0);
        assert_eq!((report.circuit_count, report.phase_count), (1, 1));
        assert_eq!(report.imbalance, 0.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_huge_inputs_hit_the_limits() {
        let limits = ToolLimits::default();
        let report = power_report(
            &[
                PowerFixture::new("Par", 1e12, 100.0),
                PowerFixture::new("Spot", 4.0, 500.0),
            ],
            &PowerSettings {
                circuits: 1e12,
                phases: 1e12,
                ..PowerSettings::default()
            },
            &limits,
        );
        assert_eq!(report.unit_count, limits.max_power_units);
        assert_eq!(report.circuit_count, limits.max_circuits);
        assert_eq!(report.circuits.len(), limits.max_circuits as usize);
        assert_eq!(report.phase_count, 3);
        assert_relative_eq!(report.total_watts, 1_000_000.0);
        assert_eq!(
            report.warnings,
            vec![
                PowerWarning::CircuitLimitReached { max_circuits: 96 },
                PowerWarning::PhaseLimitReached { max_phases: 3 },
                PowerWarning::UnitLimitReached { max_units: 10_000 },
            ]
        );
    }

    #[test]
    fn test_unit_limit_spans_fixture_lines() {
        let limits = ToolLimits {
            max_power_units: 5,
            ..ToolLimits::default()
        };
        let report = power_report(
            &[
                PowerFixture::new("Par", 3.0, 100.0),
                PowerFixture::new("Spot", 3.0, 200.0),
                PowerFixture::new("Blinder", 2.0, 650.0),
            ],
            &PowerSettings::default(),
            &limits,
        );
        assert_eq!(report.unit_count, 5);
        assert_relative_eq!(report.total_watts, 700.0);
        assert_eq!(
            report.warnings,
            vec![PowerWarning::UnitLimitReached { max_units: 5 }]
        );
    }
}
