use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Mat4, Vec2, Vec3};

/// Constants shared by every pass of a single frame.
///
/// Rebuilt once per draw from the camera projection, the settings and the
/// current buffer sizes.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct FrameConstants {
    /// Transforms input normals into viewspace; identity when normals are
    /// reconstructed from depth.
    pub normals_world_to_view: Mat4,

    /// `(mul, add)` such that `view_depth = mul / (add - screen_depth)`.
    pub depth_unpack_consts: Vec2,
    pub camera_tan_half_fov: Vec2,
    pub ndc_to_view_mul: Vec2,
    pub ndc_to_view_add: Vec2,
    pub depth_buffer_uv_to_view_mul: Vec2,
    pub depth_buffer_uv_to_view_add: Vec2,

    pub effect_radius: f32,
    pub effect_shadow_strength: f32,
    pub effect_shadow_pow: f32,
    pub effect_shadow_clamp: f32,

    pub effect_fade_out_mul: f32,
    pub effect_fade_out_add: f32,
    pub effect_horizon_angle_threshold: f32,
    pub effect_sampling_radius_near_limit_rec: f32,

    pub depth_precision_offset_mod: f32,
    pub neg_rec_effect_radius: f32,
    pub load_counter_avg_div: f32,
    pub adaptive_sample_count_limit: f32,

    pub inv_sharpness: f32,
    pub blur_pass_count: u32,
    pub bilateral_sigma_squared: f32,
    pub bilateral_similarity_distance_sigma: f32,

    pub normals_unpack_mul: f32,
    pub normals_unpack_add: f32,
    pub detail_ao_strength: f32,
    pub _padding0: f32,

    pub ssao_buffer_dimensions: Vec2,
    pub ssao_buffer_inverse_dimensions: Vec2,

    pub depth_buffer_dimensions: Vec2,
    pub depth_buffer_inverse_dimensions: Vec2,

    pub depth_buffer_offset: IVec2,
    pub input_output_buffer_dimensions: Vec2,

    pub input_output_buffer_inverse_dimensions: Vec2,
    pub importance_map_dimensions: Vec2,

    pub importance_map_inverse_dimensions: Vec2,
    pub deinterleaved_depth_buffer_dimensions: Vec2,

    pub deinterleaved_depth_buffer_inverse_dimensions: Vec2,
    pub deinterleaved_depth_buffer_offset: Vec2,

    pub deinterleaved_depth_buffer_normalised_offset: Vec2,
    pub _padding1: Vec2,
}

impl FrameConstants {
    /// Converts a value read from the (non-linear) depth buffer into a
    /// viewspace depth.
    pub fn screen_to_view_depth(&self, screen_depth: f32) -> f32 {
        let mul = self.depth_unpack_consts.x;
        let add = self.depth_unpack_consts.y;

        mul / (add - screen_depth)
    }

    /// Reconstructs viewspace position of a depth-buffer texel.
    ///
    /// `uv` is in the `[0, 1]` range with origin at the top-left corner.
    pub fn depth_buffer_uv_to_view(&self, uv: Vec2, view_depth: f32) -> Vec3 {
        let xy = (self.depth_buffer_uv_to_view_mul * uv
            + self.depth_buffer_uv_to_view_add)
            * view_depth;

        xy.extend(view_depth)
    }

    /// Returns how much of the effect survives at given viewspace depth; `1.0`
    /// up to the fade-out start, `0.0` past its end.
    pub fn fade_out(&self, view_depth: f32) -> f32 {
        (view_depth * self.effect_fade_out_mul + self.effect_fade_out_add)
            .clamp(0.0, 1.0)
    }
}
