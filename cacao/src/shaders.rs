use crate::{gpu, QualityLevel};

/// Compute shader variant; one per entry point.
///
/// Backends look shaders up by [`ComputeShader::entry_point()`], which follows
/// the `cs_<name>` convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComputeShader {
    ClearLoadCounter,

    PrepareDownsampledDepths,
    PrepareNativeDepths,
    PrepareDownsampledDepthsAndMips,
    PrepareNativeDepthsAndMips,
    PrepareDownsampledNormals,
    PrepareNativeNormals,
    PrepareDownsampledNormalsFromInputNormals,
    PrepareNativeNormalsFromInputNormals,
    PrepareDownsampledDepthsHalf,
    PrepareNativeDepthsHalf,

    GenerateQ0,
    GenerateQ1,
    GenerateQ2,
    GenerateQ3,
    GenerateQ3Base,

    GenerateImportanceMap,
    PostprocessImportanceMapA,
    PostprocessImportanceMapB,

    EdgeSensitiveBlur1,
    EdgeSensitiveBlur2,
    EdgeSensitiveBlur3,
    EdgeSensitiveBlur4,
    EdgeSensitiveBlur5,
    EdgeSensitiveBlur6,
    EdgeSensitiveBlur7,
    EdgeSensitiveBlur8,

    Apply,
    NonSmartApply,
    NonSmartHalfApply,

    UpscaleBilateral5x5Smart,
    UpscaleBilateral5x5NonSmart,
    UpscaleBilateral5x5Half,
}

impl ComputeShader {
    pub const ALL: [Self; 33] = [
        Self::ClearLoadCounter,
        Self::PrepareDownsampledDepths,
        Self::PrepareNativeDepths,
        Self::PrepareDownsampledDepthsAndMips,
        Self::PrepareNativeDepthsAndMips,
        Self::PrepareDownsampledNormals,
        Self::PrepareNativeNormals,
        Self::PrepareDownsampledNormalsFromInputNormals,
        Self::PrepareNativeNormalsFromInputNormals,
        Self::PrepareDownsampledDepthsHalf,
        Self::PrepareNativeDepthsHalf,
        Self::GenerateQ0,
        Self::GenerateQ1,
        Self::GenerateQ2,
        Self::GenerateQ3,
        Self::GenerateQ3Base,
        Self::GenerateImportanceMap,
        Self::PostprocessImportanceMapA,
        Self::PostprocessImportanceMapB,
        Self::EdgeSensitiveBlur1,
        Self::EdgeSensitiveBlur2,
        Self::EdgeSensitiveBlur3,
        Self::EdgeSensitiveBlur4,
        Self::EdgeSensitiveBlur5,
        Self::EdgeSensitiveBlur6,
        Self::EdgeSensitiveBlur7,
        Self::EdgeSensitiveBlur8,
        Self::Apply,
        Self::NonSmartApply,
        Self::NonSmartHalfApply,
        Self::UpscaleBilateral5x5Smart,
        Self::UpscaleBilateral5x5NonSmart,
        Self::UpscaleBilateral5x5Half,
    ];

    pub fn entry_point(self) -> &'static str {
        match self {
            Self::ClearLoadCounter => "cs_clear_load_counter",

            Self::PrepareDownsampledDepths => "cs_prepare_downsampled_depths",
            Self::PrepareNativeDepths => "cs_prepare_native_depths",
            Self::PrepareDownsampledDepthsAndMips => {
                "cs_prepare_downsampled_depths_and_mips"
            }
            Self::PrepareNativeDepthsAndMips => {
                "cs_prepare_native_depths_and_mips"
            }
            Self::PrepareDownsampledNormals => "cs_prepare_downsampled_normals",
            Self::PrepareNativeNormals => "cs_prepare_native_normals",
            Self::PrepareDownsampledNormalsFromInputNormals => {
                "cs_prepare_downsampled_normals_from_input_normals"
            }
            Self::PrepareNativeNormalsFromInputNormals => {
                "cs_prepare_native_normals_from_input_normals"
            }
            Self::PrepareDownsampledDepthsHalf => {
                "cs_prepare_downsampled_depths_half"
            }
            Self::PrepareNativeDepthsHalf => "cs_prepare_native_depths_half",

            Self::GenerateQ0 => "cs_generate_q0",
            Self::GenerateQ1 => "cs_generate_q1",
            Self::GenerateQ2 => "cs_generate_q2",
            Self::GenerateQ3 => "cs_generate_q3",
            Self::GenerateQ3Base => "cs_generate_q3_base",

            Self::GenerateImportanceMap => "cs_generate_importance_map",
            Self::PostprocessImportanceMapA => {
                "cs_postprocess_importance_map_a"
            }
            Self::PostprocessImportanceMapB => {
                "cs_postprocess_importance_map_b"
            }

            Self::EdgeSensitiveBlur1 => "cs_edge_sensitive_blur_1",
            Self::EdgeSensitiveBlur2 => "cs_edge_sensitive_blur_2",
            Self::EdgeSensitiveBlur3 => "cs_edge_sensitive_blur_3",
            Self::EdgeSensitiveBlur4 => "cs_edge_sensitive_blur_4",
            Self::EdgeSensitiveBlur5 => "cs_edge_sensitive_blur_5",
            Self::EdgeSensitiveBlur6 => "cs_edge_sensitive_blur_6",
            Self::EdgeSensitiveBlur7 => "cs_edge_sensitive_blur_7",
            Self::EdgeSensitiveBlur8 => "cs_edge_sensitive_blur_8",

            Self::Apply => "cs_apply",
            Self::NonSmartApply => "cs_non_smart_apply",
            Self::NonSmartHalfApply => "cs_non_smart_half_apply",

            Self::UpscaleBilateral5x5Smart => "cs_upscale_bilateral_5x5_smart",
            Self::UpscaleBilateral5x5NonSmart => {
                "cs_upscale_bilateral_5x5_non_smart"
            }
            Self::UpscaleBilateral5x5Half => "cs_upscale_bilateral_5x5_half",
        }
    }

    /// Entry point without the `cs_` prefix; used for labels.
    pub fn name(self) -> &'static str {
        &self.entry_point()[3..]
    }

    pub fn prepare_depths(
        quality_level: QualityLevel,
        downsampled: bool,
    ) -> Self {
        match (quality_level, downsampled) {
            (QualityLevel::Lowest, false) => Self::PrepareNativeDepthsHalf,
            (QualityLevel::Lowest, true) => Self::PrepareDownsampledDepthsHalf,
            (QualityLevel::Low, false) => Self::PrepareNativeDepths,
            (QualityLevel::Low, true) => Self::PrepareDownsampledDepths,
            (_, false) => Self::PrepareNativeDepthsAndMips,
            (_, true) => Self::PrepareDownsampledDepthsAndMips,
        }
    }

    pub fn prepare_normals(generate_normals: bool, downsampled: bool) -> Self {
        match (generate_normals, downsampled) {
            (true, false) => Self::PrepareNativeNormals,
            (true, true) => Self::PrepareDownsampledNormals,
            (false, false) => Self::PrepareNativeNormalsFromInputNormals,
            (false, true) => Self::PrepareDownsampledNormalsFromInputNormals,
        }
    }

    /// Returns the variant generating given quality level's final occlusion;
    /// at [`QualityLevel::Highest`] that's the adaptive pass, preceded by
    /// [`ComputeShader::GenerateQ3Base`].
    pub fn generate(quality_level: QualityLevel) -> Self {
        match quality_level {
            QualityLevel::Lowest | QualityLevel::Low => Self::GenerateQ0,
            QualityLevel::Medium => Self::GenerateQ1,
            QualityLevel::High => Self::GenerateQ2,
            QualityLevel::Highest => Self::GenerateQ3,
        }
    }

    /// Whether this variant spreads its sub-passes over the dispatch's z axis.
    pub fn is_sparse_generate(self) -> bool {
        matches!(self, Self::GenerateQ0 | Self::GenerateQ1)
    }

    /// Returns the blur variant performing `pass_count` passes at once, or
    /// `None` if blurring is disabled.
    pub fn edge_sensitive_blur(pass_count: u32) -> Option<Self> {
        Some(match pass_count.min(gpu::MAX_BLUR_PASSES) {
            0 => return None,
            1 => Self::EdgeSensitiveBlur1,
            2 => Self::EdgeSensitiveBlur2,
            3 => Self::EdgeSensitiveBlur3,
            4 => Self::EdgeSensitiveBlur4,
            5 => Self::EdgeSensitiveBlur5,
            6 => Self::EdgeSensitiveBlur6,
            7 => Self::EdgeSensitiveBlur7,
            _ => Self::EdgeSensitiveBlur8,
        })
    }

    pub fn apply(quality_level: QualityLevel) -> Self {
        match quality_level {
            QualityLevel::Lowest => Self::NonSmartHalfApply,
            QualityLevel::Low => Self::NonSmartApply,
            _ => Self::Apply,
        }
    }

    pub fn upscale(quality_level: QualityLevel) -> Self {
        match quality_level {
            QualityLevel::Lowest => Self::UpscaleBilateral5x5Half,
            QualityLevel::Low | QualityLevel::Medium => {
                Self::UpscaleBilateral5x5NonSmart
            }
            QualityLevel::High | QualityLevel::Highest => {
                Self::UpscaleBilateral5x5Smart
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn entry_points_are_unique() {
        let entry_points: HashSet<_> =
            ComputeShader::ALL.iter().map(|s| s.entry_point()).collect();

        assert_eq!(ComputeShader::ALL.len(), entry_points.len());

        for shader in ComputeShader::ALL {
            assert!(shader.entry_point().starts_with("cs_"));
            assert!(!shader.name().starts_with("cs_"));
        }
    }

    #[test]
    fn prepare_depths() {
        use ComputeShader::*;
        use QualityLevel::*;

        let cases = [
            (Lowest, PrepareNativeDepthsHalf, PrepareDownsampledDepthsHalf),
            (Low, PrepareNativeDepths, PrepareDownsampledDepths),
            (
                Medium,
                PrepareNativeDepthsAndMips,
                PrepareDownsampledDepthsAndMips,
            ),
            (High, PrepareNativeDepthsAndMips, PrepareDownsampledDepthsAndMips),
            (
                Highest,
                PrepareNativeDepthsAndMips,
                PrepareDownsampledDepthsAndMips,
            ),
        ];

        for (quality_level, native, downsampled) in cases {
            assert_eq!(
                native,
                ComputeShader::prepare_depths(quality_level, false)
            );

            assert_eq!(
                downsampled,
                ComputeShader::prepare_depths(quality_level, true)
            );
        }
    }

    #[test]
    fn generate() {
        use ComputeShader::*;
        use QualityLevel::*;

        let actual = QualityLevel::ALL.map(ComputeShader::generate);

        assert_eq!(
            [GenerateQ0, GenerateQ0, GenerateQ1, GenerateQ2, GenerateQ3],
            actual
        );

        assert!(ComputeShader::generate(Medium).is_sparse_generate());
        assert!(!ComputeShader::generate(High).is_sparse_generate());
        assert!(!GenerateQ3Base.is_sparse_generate());
    }

    #[test]
    fn edge_sensitive_blur() {
        assert_eq!(None, ComputeShader::edge_sensitive_blur(0));

        assert_eq!(
            Some(ComputeShader::EdgeSensitiveBlur1),
            ComputeShader::edge_sensitive_blur(1)
        );

        assert_eq!(
            Some(ComputeShader::EdgeSensitiveBlur8),
            ComputeShader::edge_sensitive_blur(8)
        );

        assert_eq!(
            Some(ComputeShader::EdgeSensitiveBlur8),
            ComputeShader::edge_sensitive_blur(100)
        );
    }

    #[test]
    fn apply_and_upscale() {
        use ComputeShader::*;

        assert_eq!(
            [NonSmartHalfApply, NonSmartApply, Apply, Apply, Apply],
            QualityLevel::ALL.map(ComputeShader::apply)
        );

        assert_eq!(
            [
                UpscaleBilateral5x5Half,
                UpscaleBilateral5x5NonSmart,
                UpscaleBilateral5x5NonSmart,
                UpscaleBilateral5x5Smart,
                UpscaleBilateral5x5Smart,
            ],
            QualityLevel::ALL.map(ComputeShader::upscale)
        );
    }
}
