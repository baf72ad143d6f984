use std::f32::consts::PI;

use glam::{vec2, vec4, IVec2, Mat4, UVec2, Vec2};

use crate::{gpu, BufferSizeInfo, QualityLevel, Settings};

/// Order in which sub-passes walk the kernel rotations.
const SUB_PASS_PERMUTATION: [u32; gpu::SUB_PASS_COUNT] = [0, 1, 4, 3, 2];

/// Derives the per-frame constant block.
///
/// `projection` is the camera's projection matrix (depth in `[0, 1]`) and
/// `normals_to_view` transforms the normal input into viewspace; it's ignored
/// when normals get reconstructed from depth. `settings` are expected to be
/// validated already.
pub fn frame_constants(
    settings: &Settings,
    projection: Mat4,
    normals_to_view: Mat4,
    bsi: &BufferSizeInfo,
) -> gpu::FrameConstants {
    let depth_linearize_mul = -projection.w_axis.z;
    let mut depth_linearize_add = projection.z_axis.z;

    // Handedness correction
    if depth_linearize_mul * depth_linearize_add < 0.0 {
        depth_linearize_add = -depth_linearize_add;
    }

    let tan_half_fov =
        vec2(1.0 / projection.x_axis.x, 1.0 / projection.y_axis.y);

    let ndc_to_view_mul = tan_half_fov * vec2(2.0, -2.0);
    let ndc_to_view_add = tan_half_fov * vec2(-1.0, 1.0);

    let ratio = bsi.input_output_buffer_size.as_vec2()
        / bsi.depth_buffer_size.as_vec2();

    let border = (Vec2::ONE - ratio) / 2.0;

    let depth_buffer_uv_to_view_mul = ndc_to_view_mul / ratio;
    let depth_buffer_uv_to_view_add =
        ndc_to_view_add - ndc_to_view_mul * border / ratio;

    let mut effect_radius = settings.radius.clamp(0.0, 100000.0);
    let fade_out_range = settings.fade_out_to - settings.fade_out_from;

    // An empty range would turn every fade term into NaN; don't fade at all
    let (effect_fade_out_mul, effect_fade_out_add) =
        if fade_out_range > 0.0 && fade_out_range.is_finite() {
            (
                -1.0 / fade_out_range,
                settings.fade_out_from / fade_out_range + 1.0,
            )
        } else {
            (0.0, 1.0)
        };

    // 1.2 keeps the on-screen radius from growing once the camera gets
    // closer than about one unit
    let mut effect_sampling_radius_near_limit = settings.radius * 1.2;

    if settings.quality_level <= QualityLevel::Low {
        effect_sampling_radius_near_limit *= 1.5;

        if settings.quality_level == QualityLevel::Lowest {
            effect_radius *= 0.8;
        }
    }

    effect_sampling_radius_near_limit /= tan_half_fov.y;

    let normals_world_to_view = if settings.generate_normals {
        Mat4::IDENTITY
    } else {
        normals_to_view
    };

    let importance_map_area = bsi.importance_map_size.x as f32
        * bsi.importance_map_size.y as f32;

    let deinterleaved_depth_buffer_offset =
        bsi.deinterleaved_depth_buffer_offset.as_vec2();

    let deinterleaved_depth_buffer_size =
        bsi.deinterleaved_depth_buffer_size.as_vec2();

    gpu::FrameConstants {
        normals_world_to_view,
        depth_unpack_consts: vec2(depth_linearize_mul, depth_linearize_add),
        camera_tan_half_fov: tan_half_fov,
        ndc_to_view_mul,
        ndc_to_view_add,
        depth_buffer_uv_to_view_mul,
        depth_buffer_uv_to_view_add,
        effect_radius,
        effect_shadow_strength: (settings.shadow_multiplier * 4.3)
            .clamp(0.0, 10.0),
        effect_shadow_pow: settings.shadow_power.clamp(0.0, 10.0),
        effect_shadow_clamp: settings.shadow_clamp.clamp(0.0, 1.0),
        effect_fade_out_mul,
        effect_fade_out_add,
        effect_horizon_angle_threshold: settings
            .horizon_angle_threshold
            .clamp(0.0, 1.0),
        effect_sampling_radius_near_limit_rec: 1.0
            / effect_sampling_radius_near_limit,
        depth_precision_offset_mod: 0.9992,
        neg_rec_effect_radius: -1.0 / effect_radius,
        // 9.0 compensates for the importance map's postprocess counting only
        // every 9th pixel
        load_counter_avg_div: 9.0 / (importance_map_area * 255.0),
        adaptive_sample_count_limit: settings.adaptive_quality_limit,
        inv_sharpness: (1.0 - settings.sharpness).clamp(0.0, 1.0),
        blur_pass_count: settings.blur_pass_count,
        bilateral_sigma_squared: settings.bilateral_sigma_squared,
        bilateral_similarity_distance_sigma: settings
            .bilateral_similarity_distance_sigma,
        normals_unpack_mul: 2.0,
        normals_unpack_add: -1.0,
        detail_ao_strength: settings.detail_shadow_strength,
        _padding0: 0.0,
        ssao_buffer_dimensions: bsi.ssao_buffer_size.as_vec2(),
        ssao_buffer_inverse_dimensions: inverse(bsi.ssao_buffer_size),
        depth_buffer_dimensions: bsi.depth_buffer_size.as_vec2(),
        depth_buffer_inverse_dimensions: inverse(bsi.depth_buffer_size),
        depth_buffer_offset: IVec2::new(
            bsi.depth_buffer_offset.x as i32,
            bsi.depth_buffer_offset.y as i32,
        ),
        input_output_buffer_dimensions: bsi.input_output_buffer_size.as_vec2(),
        input_output_buffer_inverse_dimensions: inverse(
            bsi.input_output_buffer_size,
        ),
        importance_map_dimensions: bsi.importance_map_size.as_vec2(),
        importance_map_inverse_dimensions: inverse(bsi.importance_map_size),
        deinterleaved_depth_buffer_dimensions: deinterleaved_depth_buffer_size,
        deinterleaved_depth_buffer_inverse_dimensions: inverse(
            bsi.deinterleaved_depth_buffer_size,
        ),
        deinterleaved_depth_buffer_offset,
        deinterleaved_depth_buffer_normalised_offset:
            deinterleaved_depth_buffer_offset / deinterleaved_depth_buffer_size,
        _padding1: Vec2::ZERO,
    }
}

/// Derives the constant block of given quadrant (`0..4`).
///
/// The kernel jitter is a fixed function of `(pass, sub_pass)`, so the result
/// is reproducible frame to frame.
pub fn pass_constants(
    settings: &Settings,
    bsi: &BufferSizeInfo,
    pass: u32,
) -> gpu::PassConstants {
    debug_assert!(pass < gpu::QUADRANT_COUNT as u32);

    let sub_pass_count = gpu::SUB_PASS_COUNT as f32;
    let a = pass as f32;

    let pattern_rot_scale_matrices = SUB_PASS_PERMUTATION.map(|b| {
        let b = b as f32;

        let angle = (a + b / sub_pass_count) * PI * 0.5
            + settings.temporal_supersampling_angle_offset;

        let scale = (1.0
            + (a - 1.5 + (b - (sub_pass_count - 1.0) * 0.5) / sub_pass_count)
                * 0.07)
            * (1.0 + settings.temporal_supersampling_radius_offset);

        let (sa, ca) = angle.sin_cos();

        vec4(scale * ca, scale * -sa, -scale * sa, -scale * ca)
    });

    let per_pass_full_res_uv_offset =
        vec2((pass % 2) as f32, (pass / 2) as f32)
            / bsi.ssao_buffer_size.as_vec2();

    gpu::PassConstants {
        pattern_rot_scale_matrices,
        per_pass_full_res_uv_offset,
        pass_index: pass,
        _padding0: 0,
    }
}

fn inverse(size: UVec2) -> Vec2 {
    Vec2::ONE / size.as_vec2()
}
