use bytemuck::{Pod, Zeroable};
use glam::{Mat2, Vec2, Vec4};

use crate::SUB_PASS_COUNT;

/// Constants specific to a single deinterleaved quadrant.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct PassConstants {
    /// Rotation-and-scale of the sampling kernel for each sub-pass, stored as
    /// `(x_axis.x, x_axis.y, y_axis.x, y_axis.y)`.
    pub pattern_rot_scale_matrices: [Vec4; SUB_PASS_COUNT],
    pub per_pass_full_res_uv_offset: Vec2,
    pub pass_index: u32,
    pub _padding0: u32,
}

impl PassConstants {
    pub fn pattern_rot_scale(&self, sub_pass: usize) -> Mat2 {
        Mat2::from_cols_array(&self.pattern_rot_scale_matrices[sub_pass].into())
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec2, vec4};

    use super::*;

    #[test]
    fn layout() {
        assert_eq!(96, core::mem::size_of::<PassConstants>());
    }

    #[test]
    fn pattern_rot_scale() {
        let mut target = PassConstants::default();

        target.pattern_rot_scale_matrices[3] = vec4(1.0, 2.0, 3.0, 4.0);

        let mat = target.pattern_rot_scale(3);

        assert_eq!(vec2(1.0, 2.0), mat.x_axis);
        assert_eq!(vec2(3.0, 4.0), mat.y_axis);
        assert_eq!(Mat2::ZERO, target.pattern_rot_scale(0));
    }
}
