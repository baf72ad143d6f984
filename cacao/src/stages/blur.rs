use glam::uvec3;

use super::passes;
use crate::gpu::{self, dispatch_size};
use crate::{
    BindingSetId, BufferSizeInfo, ComputeShader, Dispatch, Settings, Stage,
};

/// Plans one dispatch per quadrant, each running all of the blur passes.
///
/// Every pass eats into the tile's apron, so tiles shrink by two texels per
/// pass.
pub fn plan(
    settings: &Settings,
    bsi: &BufferSizeInfo,
    dispatches: &mut Vec<Dispatch>,
) {
    let Some(shader) =
        ComputeShader::edge_sensitive_blur(settings.blur_pass_count)
    else {
        return;
    };

    let pass_count = settings.blur_pass_count.min(gpu::MAX_BLUR_PASSES);
    let tile_width = 4 * gpu::BLUR_WIDTH - 2 * pass_count;
    let tile_height = 3 * gpu::BLUR_HEIGHT - 2 * pass_count;
    let size = bsi.ssao_buffer_size;

    let groups = uvec3(
        dispatch_size(tile_width, size.x),
        dispatch_size(tile_height, size.y),
        1,
    );

    for pass in passes(settings) {
        dispatches.push(Dispatch {
            stage: Stage::EdgeSensitiveBlur,
            shader,
            binding_set: BindingSetId::edge_sensitive_blur(pass),
            groups,
        });
    }
}
