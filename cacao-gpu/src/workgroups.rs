//! Workgroup (tile) sizes of the compute shaders; the host uses them to turn
//! buffer dimensions into dispatch sizes.

pub const CLEAR_LOAD_COUNTER_SIZE: u32 = 1;

pub const PREPARE_DEPTHS_AND_MIPS_WIDTH: u32 = 8;
pub const PREPARE_DEPTHS_AND_MIPS_HEIGHT: u32 = 8;

pub const PREPARE_DEPTHS_WIDTH: u32 = 8;
pub const PREPARE_DEPTHS_HEIGHT: u32 = 8;

pub const PREPARE_DEPTHS_HALF_WIDTH: u32 = 8;
pub const PREPARE_DEPTHS_HALF_HEIGHT: u32 = 8;

pub const PREPARE_NORMALS_WIDTH: u32 = 8;
pub const PREPARE_NORMALS_HEIGHT: u32 = 8;

pub const PREPARE_NORMALS_FROM_INPUT_NORMALS_WIDTH: u32 = 8;
pub const PREPARE_NORMALS_FROM_INPUT_NORMALS_HEIGHT: u32 = 8;

/// Sparse generation (quality levels up to medium) spreads the 5 sub-passes
/// over the z axis of the dispatch.
pub const GENERATE_SPARSE_WIDTH: u32 = 4;
pub const GENERATE_SPARSE_HEIGHT: u32 = 16;

pub const GENERATE_WIDTH: u32 = 8;
pub const GENERATE_HEIGHT: u32 = 8;

pub const IMPORTANCE_MAP_WIDTH: u32 = 8;
pub const IMPORTANCE_MAP_HEIGHT: u32 = 8;

pub const IMPORTANCE_MAP_A_WIDTH: u32 = 8;
pub const IMPORTANCE_MAP_A_HEIGHT: u32 = 8;

pub const IMPORTANCE_MAP_B_WIDTH: u32 = 8;
pub const IMPORTANCE_MAP_B_HEIGHT: u32 = 8;

pub const BLUR_WIDTH: u32 = 16;
pub const BLUR_HEIGHT: u32 = 16;

pub const APPLY_WIDTH: u32 = 8;
pub const APPLY_HEIGHT: u32 = 8;

pub const BILATERAL_UPSCALE_WIDTH: u32 = 8;
pub const BILATERAL_UPSCALE_HEIGHT: u32 = 8;

/// Returns how many tiles of `tile_size` are needed to cover `total_size`.
pub const fn dispatch_size(tile_size: u32, total_size: u32) -> u32 {
    total_size.div_ceil(tile_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_size_rounds_up() {
        assert_eq!(0, dispatch_size(8, 0));
        assert_eq!(1, dispatch_size(8, 1));
        assert_eq!(1, dispatch_size(8, 8));
        assert_eq!(2, dispatch_size(8, 9));
        assert_eq!(120, dispatch_size(8, 960));
        assert_eq!(1 << 29, dispatch_size(8, u32::MAX));
    }
}
