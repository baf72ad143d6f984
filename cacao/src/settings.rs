use std::f32::consts::PI;

use log::warn;

use crate::gpu;

/// Discrete quality level; controls sample counts, whether the importance
/// map drives adaptive sampling, and minor radius adjustments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityLevel {
    Lowest,
    Low,
    Medium,
    High,
    #[default]
    Highest,
}

impl QualityLevel {
    pub const ALL: [Self; 5] = [
        Self::Lowest,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::Highest,
    ];

    /// Whether this level generates the importance map and varies the sample
    /// count per pixel.
    pub fn is_adaptive(self) -> bool {
        self == Self::Highest
    }

    /// Whether the lowest level's two-quadrant shortcut applies (quadrants 1
    /// and 2 are neither generated nor blurred).
    pub fn skips_quadrant(self, pass: u32) -> bool {
        self == Self::Lowest && (pass == 1 || pass == 2)
    }
}

/// User-tunable parameters of the effect.
///
/// Any value is accepted; [`Settings::validated()`] clamps every field into
/// its range and is applied before the settings are used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// `[0, inf)` Viewspace size of the occlusion sphere.
    pub radius: f32,

    /// `[0, 5]` Linear effect strength multiplier.
    pub shadow_multiplier: f32,

    /// `[0.5, 5]` Effect strength pow modifier.
    pub shadow_power: f32,

    /// `[0, 1]` Effect max limit, applied after the multiplier but before
    /// blur.
    pub shadow_clamp: f32,

    /// `[0, 0.2]` Limits self-shadowing on slopes and low tessellation.
    pub horizon_angle_threshold: f32,

    /// `[0, inf)` Distance at which the effect starts fading out.
    pub fade_out_from: f32,

    /// `[fade_out_from + 0.001, inf)` Distance at which the effect is gone.
    pub fade_out_to: f32,

    pub quality_level: QualityLevel,

    /// `[0, 1]` Adaptive quality only: limits the effect's sample count.
    pub adaptive_quality_limit: f32,

    /// `[0, 8]` Number of edge-sensitive blur passes.
    pub blur_pass_count: u32,

    /// `[0, 1]` How much to bleed over edges; 1 means not at all, 0 means
    /// ignore edges.
    pub sharpness: f32,

    /// `[0, pi]` Extra rotation of the sampling kernel, for temporal
    /// supersampling.
    pub temporal_supersampling_angle_offset: f32,

    /// `[0, 2]` Extra scale of the sampling kernel, for temporal
    /// supersampling.
    pub temporal_supersampling_radius_offset: f32,

    /// `[0, 5]` High-res detail AO using neighbouring depth pixels.
    pub detail_shadow_strength: f32,

    /// Reconstruct normals from depth instead of reading the normal input.
    pub generate_normals: bool,

    /// `[0, inf)` Gaussian term of the bilateral upsampler.
    pub bilateral_sigma_squared: f32,

    /// `[0, inf)` Similarity weighting term of the bilateral upsampler.
    pub bilateral_similarity_distance_sigma: f32,
}

impl Settings {
    /// Smallest allowed distance between `fade_out_from` and `fade_out_to`;
    /// for large distances it's one ulp of `fade_out_from` instead.
    pub const MIN_FADE_OUT_RANGE: f32 = 0.001;

    /// Largest `fade_out_from` that leaves room for a finite fade range.
    pub const MAX_FADE_OUT_FROM: f32 = f32::MAX / 2.0;

    /// Returns a copy with every field clamped into its range; NaNs are
    /// replaced with defaults.
    pub fn validated(self) -> Self {
        let defaults = Self::default();

        let fade_out_from = clamp(
            "fade_out_from",
            self.fade_out_from,
            0.0,
            Self::MAX_FADE_OUT_FROM,
            defaults.fade_out_from,
        );

        // Past a few thousand units the fixed range rounds away
        let min_fade_out_to = (fade_out_from + Self::MIN_FADE_OUT_RANGE)
            .max(next_up(fade_out_from));

        Self {
            radius: clamp(
                "radius",
                self.radius,
                0.0,
                f32::MAX,
                defaults.radius,
            ),
            shadow_multiplier: clamp(
                "shadow_multiplier",
                self.shadow_multiplier,
                0.0,
                5.0,
                defaults.shadow_multiplier,
            ),
            shadow_power: clamp(
                "shadow_power",
                self.shadow_power,
                0.5,
                5.0,
                defaults.shadow_power,
            ),
            shadow_clamp: clamp(
                "shadow_clamp",
                self.shadow_clamp,
                0.0,
                1.0,
                defaults.shadow_clamp,
            ),
            horizon_angle_threshold: clamp(
                "horizon_angle_threshold",
                self.horizon_angle_threshold,
                0.0,
                0.2,
                defaults.horizon_angle_threshold,
            ),
            fade_out_from,
            fade_out_to: clamp(
                "fade_out_to",
                self.fade_out_to,
                min_fade_out_to,
                f32::MAX,
                defaults.fade_out_to,
            ),
            quality_level: self.quality_level,
            adaptive_quality_limit: clamp(
                "adaptive_quality_limit",
                self.adaptive_quality_limit,
                0.0,
                1.0,
                defaults.adaptive_quality_limit,
            ),
            blur_pass_count: {
                if self.blur_pass_count > gpu::MAX_BLUR_PASSES {
                    warn!(
                        "Clamping `blur_pass_count`: {} -> {}",
                        self.blur_pass_count,
                        gpu::MAX_BLUR_PASSES
                    );
                }

                self.blur_pass_count.min(gpu::MAX_BLUR_PASSES)
            },
            sharpness: clamp(
                "sharpness",
                self.sharpness,
                0.0,
                1.0,
                defaults.sharpness,
            ),
            temporal_supersampling_angle_offset: clamp(
                "temporal_supersampling_angle_offset",
                self.temporal_supersampling_angle_offset,
                0.0,
                PI,
                defaults.temporal_supersampling_angle_offset,
            ),
            temporal_supersampling_radius_offset: clamp(
                "temporal_supersampling_radius_offset",
                self.temporal_supersampling_radius_offset,
                0.0,
                2.0,
                defaults.temporal_supersampling_radius_offset,
            ),
            detail_shadow_strength: clamp(
                "detail_shadow_strength",
                self.detail_shadow_strength,
                0.0,
                5.0,
                defaults.detail_shadow_strength,
            ),
            generate_normals: self.generate_normals,
            bilateral_sigma_squared: clamp(
                "bilateral_sigma_squared",
                self.bilateral_sigma_squared,
                0.0,
                f32::MAX,
                defaults.bilateral_sigma_squared,
            ),
            bilateral_similarity_distance_sigma: clamp(
                "bilateral_similarity_distance_sigma",
                self.bilateral_similarity_distance_sigma,
                0.0,
                f32::MAX,
                defaults.bilateral_similarity_distance_sigma,
            ),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radius: 1.2,
            shadow_multiplier: 1.0,
            shadow_power: 1.5,
            shadow_clamp: 0.98,
            horizon_angle_threshold: 0.06,
            fade_out_from: 50.0,
            fade_out_to: 300.0,
            quality_level: QualityLevel::Highest,
            adaptive_quality_limit: 0.45,
            blur_pass_count: 2,
            sharpness: 0.98,
            temporal_supersampling_angle_offset: 0.0,
            temporal_supersampling_radius_offset: 0.0,
            detail_shadow_strength: 0.5,
            generate_normals: false,
            bilateral_sigma_squared: 5.0,
            bilateral_similarity_distance_sigma: 0.01,
        }
    }
}

fn clamp(name: &str, value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_nan() {
        warn!("Replacing NaN `{name}` with {default}");

        return default;
    }

    let clamped = value.max(min).min(max);

    if clamped != value {
        warn!("Clamping `{name}`: {value} -> {clamped}");
    }

    clamped
}

/// Smallest float greater than `value`, for finite non-negative values.
fn next_up(value: f32) -> f32 {
    if value == 0.0 {
        f32::from_bits(1)
    } else {
        f32::from_bits(value.to_bits() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let target = Settings::default();

        assert_eq!(target, target.validated());
    }

    #[test]
    fn clamping() {
        let target = Settings {
            radius: -1.0,
            shadow_multiplier: 7.0,
            shadow_power: 10.0,
            shadow_clamp: 1.5,
            horizon_angle_threshold: 0.5,
            fade_out_from: -10.0,
            fade_out_to: -20.0,
            adaptive_quality_limit: 2.0,
            blur_pass_count: 20,
            sharpness: -0.5,
            temporal_supersampling_angle_offset: 10.0,
            temporal_supersampling_radius_offset: -1.0,
            detail_shadow_strength: 6.0,
            bilateral_sigma_squared: -5.0,
            bilateral_similarity_distance_sigma: -0.01,
            ..Default::default()
        }
        .validated();

        assert_eq!(0.0, target.radius);
        assert_eq!(5.0, target.shadow_multiplier);
        assert_eq!(5.0, target.shadow_power);
        assert_eq!(1.0, target.shadow_clamp);
        assert_eq!(0.2, target.horizon_angle_threshold);
        assert_eq!(0.0, target.fade_out_from);
        assert_eq!(Settings::MIN_FADE_OUT_RANGE, target.fade_out_to);
        assert_eq!(1.0, target.adaptive_quality_limit);
        assert_eq!(8, target.blur_pass_count);
        assert_eq!(0.0, target.sharpness);
        assert_eq!(PI, target.temporal_supersampling_angle_offset);
        assert_eq!(0.0, target.temporal_supersampling_radius_offset);
        assert_eq!(5.0, target.detail_shadow_strength);
        assert_eq!(0.0, target.bilateral_sigma_squared);
        assert_eq!(0.0, target.bilateral_similarity_distance_sigma);
    }

    #[test]
    fn shadow_power_lower_bound() {
        let target = Settings {
            shadow_power: 0.1,
            ..Default::default()
        };

        assert_eq!(0.5, target.validated().shadow_power);
    }

    #[test]
    fn nans_are_replaced_with_defaults() {
        let target = Settings {
            radius: f32::NAN,
            sharpness: f32::NAN,
            fade_out_to: f32::NAN,
            ..Default::default()
        }
        .validated();

        assert_eq!(Settings::default(), target);
    }

    #[test]
    fn infinities_are_clamped() {
        let target = Settings {
            radius: f32::INFINITY,
            bilateral_sigma_squared: f32::NEG_INFINITY,
            ..Default::default()
        }
        .validated();

        assert_eq!(f32::MAX, target.radius);
        assert_eq!(0.0, target.bilateral_sigma_squared);
    }

    #[test]
    fn validation_is_idempotent() {
        let inputs = [
            Settings::default(),
            Settings {
                radius: 1e9,
                shadow_power: 10.0,
                blur_pass_count: 20,
                fade_out_from: 400.0,
                fade_out_to: 100.0,
                quality_level: QualityLevel::Lowest,
                ..Default::default()
            },
            Settings {
                radius: f32::NAN,
                shadow_multiplier: -3.0,
                horizon_angle_threshold: f32::INFINITY,
                temporal_supersampling_angle_offset: -1.0,
                generate_normals: true,
                ..Default::default()
            },
        ];

        for input in inputs {
            let once = input.validated();
            let twice = once.validated();

            assert_eq!(once, twice);
        }
    }

    #[test]
    fn fade_out_to_follows_fade_out_from() {
        let target = Settings {
            fade_out_from: 400.0,
            fade_out_to: 100.0,
            ..Default::default()
        }
        .validated();

        assert_eq!(400.0, target.fade_out_from);
        assert_eq!(400.0 + Settings::MIN_FADE_OUT_RANGE, target.fade_out_to);
    }

    #[test]
    fn far_fade_out_keeps_a_range() {
        for fade_out_from in [1e4, 1e8, f32::MAX, f32::INFINITY] {
            let target = Settings {
                fade_out_from,
                fade_out_to: 0.0,
                ..Default::default()
            }
            .validated();

            assert!(target.fade_out_from <= Settings::MAX_FADE_OUT_FROM);
            assert!(target.fade_out_to > target.fade_out_from);
            assert!((target.fade_out_to - target.fade_out_from).is_finite());
            assert_eq!(target, target.validated());
        }
    }

    #[test]
    fn quality_levels() {
        assert!(QualityLevel::Lowest < QualityLevel::Low);
        assert!(QualityLevel::High < QualityLevel::Highest);

        for quality in QualityLevel::ALL {
            assert_eq!(quality == QualityLevel::Highest, quality.is_adaptive());
        }

        assert!(QualityLevel::Lowest.skips_quadrant(1));
        assert!(QualityLevel::Lowest.skips_quadrant(2));
        assert!(!QualityLevel::Lowest.skips_quadrant(0));
        assert!(!QualityLevel::Lowest.skips_quadrant(3));
        assert!(!QualityLevel::Low.skips_quadrant(1));
    }
}
