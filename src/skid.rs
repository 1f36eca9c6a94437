//! Skid sizing
//!
//! Skid cross-section, spacing and count are chosen from weight tiers. The
//! tiers are ordered `{bound, value}` tables searched for the first bound that
//! admits the input. Each bound states whether it is inclusive, so every tier
//! boundary can be tested on its own.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::Dimensions;

/// Minimum actual skid height (nominal 4x lumber)
pub const MIN_SKID_HEIGHT: f64 = 3.5;

/// Minimum number of skids under any crate
pub const MIN_SKID_COUNT: usize = 3;

/// Crates longer than this need rub strips under the skids
pub const RUB_STRIP_LENGTH_THRESHOLD: f64 = 96.0;

/// Spacing used when a cross-section has no entry in the spacing table
pub const DEFAULT_SKID_SPACING: f64 = 24.0;

const DIMENSION_TOLERANCE: f64 = 1e-6;

/// Actual cross-section of a skid, in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkidDimensions {
    /// Width across the crate (world X)
    pub width: f64,
    /// Height (world Z)
    pub height: f64,
}

impl SkidDimensions {
    /// Create a cross-section
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn matches(&self, other: &SkidDimensions) -> bool {
        (self.width - other.width).abs() < DIMENSION_TOLERANCE
            && (self.height - other.height).abs() < DIMENSION_TOLERANCE
    }
}

/// Upper bound of a step-table tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Applies to inputs up to and including the value
    Inclusive(f64),
    /// Applies to inputs strictly below the value
    Exclusive(f64),
    /// Applies to every remaining input
    Unbounded,
}

impl Bound {
    fn admits(&self, input: f64) -> bool {
        match *self {
            Bound::Inclusive(limit) => input <= limit,
            Bound::Exclusive(limit) => input < limit,
            Bound::Unbounded => true,
        }
    }
}

/// One row of a step table
#[derive(Debug, Clone, Copy)]
pub struct Tier<T> {
    /// Upper bound of the inputs this tier covers
    pub bound: Bound,
    /// Value for inputs in this tier
    pub value: T,
}

/// Look up the first tier whose bound admits `input`
///
/// Inputs past every bound (including NaN) fall into the last tier.
pub fn step_lookup<T: Copy>(tiers: &[Tier<T>], input: f64) -> Option<T> {
    tiers
        .iter()
        .find(|tier| tier.bound.admits(input))
        .or_else(|| tiers.last())
        .map(|tier| tier.value)
}

/// Lumber size with its nominal name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkidLumber {
    /// Nominal name (e.g. "4x4")
    pub nominal: &'static str,
    /// Actual cross-section
    pub dimensions: SkidDimensions,
}

const fn lumber(nominal: &'static str, width: f64, height: f64) -> SkidLumber {
    SkidLumber {
        nominal,
        dimensions: SkidDimensions { width, height },
    }
}

/// Skid lumber by gross weight in pounds
pub const SKID_SIZE_TIERS: [Tier<SkidLumber>; 4] = [
    Tier {
        bound: Bound::Inclusive(4_500.0),
        value: lumber("4x4", 3.5, 3.5),
    },
    Tier {
        bound: Bound::Inclusive(20_000.0),
        value: lumber("4x6", 5.5, 3.5),
    },
    Tier {
        bound: Bound::Inclusive(40_000.0),
        value: lumber("6x6", 5.5, 5.5),
    },
    Tier {
        bound: Bound::Unbounded,
        value: lumber("8x8", 7.25, 7.25),
    },
];

/// Spacing tiers for one cross-section, by gross weight in pounds
struct SpacingRule {
    dimensions: SkidDimensions,
    tiers: &'static [Tier<f64>],
}

const SPACING_RULES: [SpacingRule; 4] = [
    SpacingRule {
        dimensions: SkidDimensions {
            width: 3.5,
            height: 3.5,
        },
        tiers: &[Tier {
            bound: Bound::Unbounded,
            value: 30.0,
        }],
    },
    SpacingRule {
        dimensions: SkidDimensions {
            width: 5.5,
            height: 3.5,
        },
        tiers: &[
            Tier {
                bound: Bound::Exclusive(6_000.0),
                value: 41.0,
            },
            Tier {
                bound: Bound::Inclusive(12_000.0),
                value: 28.0,
            },
            Tier {
                bound: Bound::Unbounded,
                value: 24.0,
            },
        ],
    },
    SpacingRule {
        dimensions: SkidDimensions {
            width: 5.5,
            height: 5.5,
        },
        tiers: &[
            Tier {
                bound: Bound::Inclusive(30_000.0),
                value: 24.0,
            },
            Tier {
                bound: Bound::Unbounded,
                value: 20.0,
            },
        ],
    },
    SpacingRule {
        dimensions: SkidDimensions {
            width: 7.25,
            height: 7.25,
        },
        tiers: &[Tier {
            bound: Bound::Unbounded,
            value: 24.0,
        }],
    },
];

/// Computed skid arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkidConfiguration {
    /// Number of skids, at least 3
    pub count: usize,
    /// Maximum center-to-center spacing from the spacing table
    pub spacing: f64,
    /// Actual center-to-center distance with the edge skids flush to the crate sides
    pub pitch: f64,
    /// Actual cross-section
    pub dimensions: SkidDimensions,
    /// Nominal lumber name
    pub nominal: String,
    /// Whether rub strips are required under the skids
    pub requires_rub_strips: bool,
    /// Skid length (the crate length)
    pub length: f64,
}

impl SkidConfiguration {
    /// X offsets of the skid centers from the crate's left edge
    pub fn center_offsets(&self) -> Vec<f64> {
        let half = self.dimensions.width / 2.0;
        (0..self.count)
            .map(|i| half + i as f64 * self.pitch)
            .collect()
    }
}

/// Pick the skid lumber for a gross weight in pounds
///
/// # Example
///
/// ```
/// use autocrate::skid::get_skid_lumber;
///
/// assert_eq!(get_skid_lumber(500.0).nominal, "4x4");
/// assert_eq!(get_skid_lumber(4_500.0).nominal, "4x4");
/// assert_eq!(get_skid_lumber(4_500.5).nominal, "4x6");
/// ```
pub fn get_skid_lumber(weight_lb: f64) -> SkidLumber {
    let mut lumber =
        step_lookup(&SKID_SIZE_TIERS, weight_lb).unwrap_or(SKID_SIZE_TIERS[0].value);
    lumber.dimensions.height = lumber.dimensions.height.max(MIN_SKID_HEIGHT);
    lumber
}

/// Skid cross-section for a gross weight in pounds
pub fn get_skid_size(weight_lb: f64) -> SkidDimensions {
    get_skid_lumber(weight_lb).dimensions
}

/// Maximum center-to-center skid spacing
///
/// Cross-sections without a table entry get [`DEFAULT_SKID_SPACING`].
pub fn get_skid_spacing(dimensions: &SkidDimensions, weight_lb: f64) -> f64 {
    SPACING_RULES
        .iter()
        .find(|rule| rule.dimensions.matches(dimensions))
        .and_then(|rule| step_lookup(rule.tiers, weight_lb))
        .unwrap_or(DEFAULT_SKID_SPACING)
}

/// Skid count and actual pitch for a crate width
///
/// The count is `max(3, ceil(width / spacing) + 1)`; the pitch then spreads
/// the skids evenly so the outer skids sit flush with the crate sides.
///
/// # Returns
/// A tuple of (count, pitch)
pub fn calculate_skid_count(crate_width: f64, spacing: f64, skid_width: f64) -> (usize, f64) {
    let needed = ((crate_width / spacing).ceil() as usize).saturating_add(1);
    let count = needed.max(MIN_SKID_COUNT);
    let pitch = (crate_width - skid_width).max(0.0) / (count - 1) as f64;
    (count, pitch)
}

/// Whether a crate needs rub strips (length strictly over 96")
pub fn requires_rub_strips(dimensions: &Dimensions) -> bool {
    dimensions.length > RUB_STRIP_LENGTH_THRESHOLD
}

/// Size and arrange the skids for a crate
///
/// # Arguments
/// * `dimensions` - Overall crate dimensions
/// * `weight_lb` - Gross weight in pounds
#[instrument(level = "debug")]
pub fn calculate_skid_configuration(dimensions: &Dimensions, weight_lb: f64) -> SkidConfiguration {
    let lumber = get_skid_lumber(weight_lb);
    let spacing = get_skid_spacing(&lumber.dimensions, weight_lb);
    let (count, pitch) = calculate_skid_count(dimensions.width, spacing, lumber.dimensions.width);
    let config = SkidConfiguration {
        count,
        spacing,
        pitch,
        dimensions: lumber.dimensions,
        nominal: lumber.nominal.to_string(),
        requires_rub_strips: requires_rub_strips(dimensions),
        length: dimensions.length,
    };
    debug!(
        nominal = lumber.nominal,
        count,
        spacing,
        pitch,
        rub_strips = config.requires_rub_strips,
        "sized skids"
    );
    config
}

/// Check a skid configuration against the structural minimums
///
/// Returns human-readable violations; an empty list means the configuration
/// is acceptable.
pub fn validate_skid_configuration(config: &SkidConfiguration) -> Vec<String> {
    let mut errors = Vec::new();
    if config.count < MIN_SKID_COUNT {
        errors.push("At least 3 skids are required".to_string());
    }
    if !(config.dimensions.height >= MIN_SKID_HEIGHT) {
        errors.push("Skid height must be at least 3.5 inches".to_string());
    }
    if !(config.spacing > 0.0) {
        errors.push("Skid spacing must be positive".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skid_size_tiers() {
        assert_eq!(get_skid_size(500.0), SkidDimensions::new(3.5, 3.5));
        assert_eq!(get_skid_size(4_500.0), SkidDimensions::new(3.5, 3.5));
        assert_eq!(get_skid_size(4_501.0), SkidDimensions::new(5.5, 3.5));
        assert_eq!(get_skid_size(20_000.0), SkidDimensions::new(5.5, 3.5));
        assert_eq!(get_skid_size(20_001.0), SkidDimensions::new(5.5, 5.5));
        assert_eq!(get_skid_size(40_000.0), SkidDimensions::new(5.5, 5.5));
        assert_eq!(get_skid_size(40_001.0), SkidDimensions::new(7.25, 7.25));
        assert_eq!(get_skid_size(250_000.0), SkidDimensions::new(7.25, 7.25));
    }

    #[test]
    fn test_skid_spacing_table() {
        let s4x4 = SkidDimensions::new(3.5, 3.5);
        let s4x6 = SkidDimensions::new(5.5, 3.5);
        let s6x6 = SkidDimensions::new(5.5, 5.5);
        let s8x8 = SkidDimensions::new(7.25, 7.25);

        assert_eq!(get_skid_spacing(&s4x4, 1_000.0), 30.0);
        assert_eq!(get_skid_spacing(&s4x6, 5_999.0), 41.0);
        assert_eq!(get_skid_spacing(&s4x6, 6_000.0), 28.0);
        assert_eq!(get_skid_spacing(&s4x6, 12_000.0), 28.0);
        assert_eq!(get_skid_spacing(&s4x6, 12_001.0), 24.0);
        assert_eq!(get_skid_spacing(&s6x6, 30_000.0), 24.0);
        assert_eq!(get_skid_spacing(&s6x6, 30_001.0), 20.0);
        assert_eq!(get_skid_spacing(&s8x8, 50_000.0), 24.0);
    }

    #[test]
    fn test_unrecognized_cross_section_uses_default() {
        let odd = SkidDimensions::new(4.0, 4.5);
        assert_eq!(get_skid_spacing(&odd, 1_000.0), DEFAULT_SKID_SPACING);
    }

    #[test]
    fn test_skid_count_minimum() {
        let (count, pitch) = calculate_skid_count(20.0, 30.0, 3.5);
        assert_eq!(count, 3);
        assert!((pitch - 8.25).abs() < 1e-12);
    }

    #[test]
    fn test_skid_count_wide_crate() {
        // ceil(100 / 24) + 1 = 6
        let (count, pitch) = calculate_skid_count(100.0, 24.0, 5.5);
        assert_eq!(count, 6);
        assert!((pitch - 94.5 / 5.0).abs() < 1e-12);
        assert!(pitch <= 24.0);
    }

    #[test]
    fn test_skid_count_saturates_on_huge_width() {
        let (count, pitch) = calculate_skid_count(1e300, 24.0, 3.5);
        assert_eq!(count, usize::MAX);
        assert!(pitch.is_finite() && pitch > 0.0);
    }

    #[test]
    fn test_rub_strip_threshold() {
        assert!(!requires_rub_strips(&Dimensions::new(96.0, 40.0, 40.0)));
        assert!(requires_rub_strips(&Dimensions::new(96.01, 40.0, 40.0)));
        assert!(requires_rub_strips(&Dimensions::new(120.0, 40.0, 40.0)));
    }

    #[test]
    fn test_standard_crate_configuration() {
        let config = calculate_skid_configuration(&Dimensions::new(48.0, 40.0, 36.0), 500.0);
        assert_eq!(config.dimensions, SkidDimensions::new(3.5, 3.5));
        assert_eq!(config.nominal, "4x4");
        assert_eq!(config.spacing, 30.0);
        assert!(config.count >= 3);
        assert!(!config.requires_rub_strips);

        let offsets = config.center_offsets();
        assert_eq!(offsets.len(), config.count);
        assert!((offsets[0] - 1.75).abs() < 1e-12);
        assert!((offsets[config.count - 1] - (40.0 - 1.75)).abs() < 1e-9);
    }

    #[test]
    fn test_validate_skid_configuration() {
        let mut config = calculate_skid_configuration(&Dimensions::new(48.0, 40.0, 36.0), 500.0);
        assert!(validate_skid_configuration(&config).is_empty());

        config.count = 2;
        config.dimensions.height = 3.0;
        let errors = validate_skid_configuration(&config);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"At least 3 skids are required".to_string()));
        assert!(errors.contains(&"Skid height must be at least 3.5 inches".to_string()));
    }
}
