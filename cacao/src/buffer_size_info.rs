use glam::{uvec2, UVec2};

use crate::{gpu, Error, Result};

/// Dimensions of every buffer used by the pipeline, derived from the output
/// resolution.
///
/// The SSAO buffer is stored deinterleaved: each of its 4 layers holds one
/// quadrant (2x2 interleave) of the working-resolution depth buffer, so its
/// dimensions equal the deinterleaved depth buffer's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSizeInfo {
    pub downsampled: bool,

    pub input_output_buffer_size: UVec2,
    pub ssao_buffer_size: UVec2,

    pub depth_buffer_offset: UVec2,
    pub depth_buffer_size: UVec2,

    pub deinterleaved_depth_buffer_offset: UVec2,
    pub deinterleaved_depth_buffer_size: UVec2,

    pub importance_map_size: UVec2,

    /// Half-resolution SSAO buffer used by downsampled mode; `1x1` otherwise.
    pub downsampled_ssao_buffer_size: UVec2,
}

impl BufferSizeInfo {
    /// Smallest allowed deinterleaved buffer side, so that every level of
    /// the depth mip chain stays at least one texel wide.
    pub const MIN_DEINTERLEAVED_SIZE: u32 = 1 << (gpu::DEPTH_MIP_COUNT - 1);

    pub fn new(size: UVec2, downsampled: bool) -> Result<Self> {
        if size.x == 0 || size.y == 0 {
            return Err(Error::InvalidArgument(format!(
                "output size must be non-zero, got {}x{}",
                size.x, size.y
            )));
        }

        let half = halve(size);
        let quarter = halve(half);
        let eighth = halve(quarter);

        let (ssao_buffer_size, importance_map_size, downsampled_size) =
            if downsampled {
                (quarter, eighth, half)
            } else {
                (half, quarter, UVec2::ONE)
            };

        if ssao_buffer_size.min_element() < Self::MIN_DEINTERLEAVED_SIZE {
            return Err(Error::InvalidArgument(format!(
                "output size {}x{} is too small (downsampled: {downsampled})",
                size.x, size.y
            )));
        }

        Ok(Self {
            downsampled,
            input_output_buffer_size: size,
            ssao_buffer_size,
            depth_buffer_offset: UVec2::ZERO,
            depth_buffer_size: size,
            deinterleaved_depth_buffer_offset: UVec2::ZERO,
            deinterleaved_depth_buffer_size: ssao_buffer_size,
            importance_map_size,
            downsampled_ssao_buffer_size: downsampled_size,
        })
    }

    /// Resolution the effect is computed at before deinterleaving: the output
    /// resolution, or half of it when downsampled.
    pub fn working_size(&self) -> UVec2 {
        if self.downsampled {
            self.downsampled_ssao_buffer_size
        } else {
            self.depth_buffer_size
        }
    }
}

fn halve(size: UVec2) -> UVec2 {
    uvec2(size.x.div_ceil(2), size.y.div_ceil(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native() {
        let target = BufferSizeInfo::new(uvec2(1920, 1080), false).unwrap();

        assert_eq!(uvec2(1920, 1080), target.input_output_buffer_size);
        assert_eq!(uvec2(1920, 1080), target.depth_buffer_size);
        assert_eq!(uvec2(960, 540), target.ssao_buffer_size);
        assert_eq!(uvec2(960, 540), target.deinterleaved_depth_buffer_size);
        assert_eq!(uvec2(480, 270), target.importance_map_size);
        assert_eq!(UVec2::ONE, target.downsampled_ssao_buffer_size);
        assert_eq!(uvec2(1920, 1080), target.working_size());
    }

    #[test]
    fn downsampled() {
        let target = BufferSizeInfo::new(uvec2(1920, 1080), true).unwrap();

        assert_eq!(uvec2(1920, 1080), target.input_output_buffer_size);
        assert_eq!(uvec2(480, 270), target.ssao_buffer_size);
        assert_eq!(uvec2(480, 270), target.deinterleaved_depth_buffer_size);
        assert_eq!(uvec2(240, 135), target.importance_map_size);
        assert_eq!(uvec2(960, 540), target.downsampled_ssao_buffer_size);
        assert_eq!(uvec2(960, 540), target.working_size());
    }

    #[test]
    fn odd_sizes_round_up() {
        let target = BufferSizeInfo::new(uvec2(1281, 721), false).unwrap();

        assert_eq!(uvec2(641, 361), target.ssao_buffer_size);
        assert_eq!(uvec2(321, 181), target.importance_map_size);

        let target = BufferSizeInfo::new(uvec2(1281, 721), true).unwrap();

        assert_eq!(uvec2(321, 181), target.ssao_buffer_size);
        assert_eq!(uvec2(161, 91), target.importance_map_size);
        assert_eq!(uvec2(641, 361), target.downsampled_ssao_buffer_size);
    }

    #[test]
    fn huge_sizes() {
        let target =
            BufferSizeInfo::new(uvec2(u32::MAX, 1080), false).unwrap();

        assert_eq!(uvec2(1 << 31, 540), target.ssao_buffer_size);
        assert_eq!(uvec2(1 << 30, 270), target.importance_map_size);

        let target =
            BufferSizeInfo::new(uvec2(u32::MAX, u32::MAX), true).unwrap();

        assert_eq!(uvec2(1 << 30, 1 << 30), target.ssao_buffer_size);
        assert_eq!(
            uvec2(1 << 31, 1 << 31),
            target.downsampled_ssao_buffer_size
        );
    }

    #[test]
    fn deinterleaving_is_a_2x2_split_of_working_size() {
        for (size, downsampled) in [
            (uvec2(640, 480), false),
            (uvec2(640, 480), true),
            (uvec2(1001, 333), false),
            (uvec2(1001, 333), true),
        ] {
            let target = BufferSizeInfo::new(size, downsampled).unwrap();

            assert_eq!(
                halve(target.working_size()),
                target.deinterleaved_depth_buffer_size
            );
        }
    }

    #[test]
    fn downsampling_halves_working_resolution() {
        for size in [uvec2(640, 480), uvec2(1920, 1080), uvec2(1283, 777)] {
            let native = BufferSizeInfo::new(size, false).unwrap();
            let downsampled = BufferSizeInfo::new(size, true).unwrap();

            assert_eq!(
                halve(native.ssao_buffer_size),
                downsampled.ssao_buffer_size
            );

            assert!(
                native.ssao_buffer_size.x / 2
                    <= downsampled.ssao_buffer_size.x
            );

            assert!(
                downsampled.ssao_buffer_size.x
                    <= native.ssao_buffer_size.x / 2 + 1
            );
        }
    }

    #[test]
    fn is_deterministic() {
        let a = BufferSizeInfo::new(uvec2(640, 480), false).unwrap();
        let b = BufferSizeInfo::new(uvec2(640, 480), false).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_and_tiny_sizes() {
        assert!(matches!(
            BufferSizeInfo::new(uvec2(0, 480), false),
            Err(Error::InvalidArgument(_))
        ));

        assert!(matches!(
            BufferSizeInfo::new(uvec2(640, 0), true),
            Err(Error::InvalidArgument(_))
        ));

        assert!(BufferSizeInfo::new(uvec2(16, 16), false).is_ok());

        assert!(matches!(
            BufferSizeInfo::new(uvec2(16, 16), true),
            Err(Error::InvalidArgument(_))
        ));
    }
}
