use serde::{Deserialize, Serialize};

/// Lower bound of the minimum-coverage slider (percent).
pub const MIN_COVERAGE_FLOOR: f64 = 0.1;
/// Upper bound of the minimum-coverage slider (percent).
pub const MIN_COVERAGE_CEIL: f64 = 60.0;
/// Lower bound of the minimum-buildings-per-cell slider.
pub const MIN_BUILDINGS_FLOOR: u32 = 0;
/// Upper bound of the minimum-buildings-per-cell slider.
pub const MIN_BUILDINGS_CEIL: u32 = 50;

/// Snapshot of the client's current filter / view state, sent with every
/// turn. Read-only for the duration of the turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    /// Currently selected settlement (neighborhood). Empty = none.
    #[serde(default)]
    pub settlement: String,
    #[serde(default)]
    pub size_eligible_only: bool,
    /// Building-type filter. Empty = all types.
    #[serde(default)]
    pub building_type: String,
    /// Storey-tier filter (`low` / `mid` / `high`). Empty = all tiers.
    #[serde(default)]
    pub storey_tier: String,
    #[serde(default = "d_min_coverage")]
    pub min_coverage: f64,
    #[serde(default)]
    pub min_buildings: u32,
    /// Whether the building points layer is visible.
    #[serde(default)]
    pub show_buildings: bool,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            settlement: String::new(),
            size_eligible_only: false,
            building_type: String::new(),
            storey_tier: String::new(),
            min_coverage: MIN_COVERAGE_FLOOR,
            min_buildings: MIN_BUILDINGS_FLOOR,
            show_buildings: false,
        }
    }
}

fn d_min_coverage() -> f64 {
    MIN_COVERAGE_FLOOR
}

/// Clamp a coverage percentage into the slider's domain.
pub fn clamp_coverage(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_COVERAGE_FLOOR;
    }
    value.clamp(MIN_COVERAGE_FLOOR, MIN_COVERAGE_CEIL)
}

/// Clamp a buildings-per-cell count into the slider's domain.
pub fn clamp_buildings(value: u64) -> u32 {
    value.min(u64::from(MIN_BUILDINGS_CEIL)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_slider_defaults() {
        let ms: MapState = serde_json::from_str("{}").unwrap();
        assert_eq!(ms, MapState::default());
        assert!((ms.min_coverage - 0.1).abs() < f64::EPSILON);
        assert_eq!(ms.min_buildings, 0);
    }

    #[test]
    fn coverage_clamps_both_ends() {
        assert!((clamp_coverage(0.0) - 0.1).abs() < f64::EPSILON);
        assert!((clamp_coverage(75.0) - 60.0).abs() < f64::EPSILON);
        assert!((clamp_coverage(25.0) - 25.0).abs() < f64::EPSILON);
        assert!((clamp_coverage(f64::NAN) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn buildings_clamp_to_ceiling() {
        assert_eq!(clamp_buildings(7), 7);
        assert_eq!(clamp_buildings(51), 50);
        assert_eq!(clamp_buildings(u64::MAX), 50);
    }
}
