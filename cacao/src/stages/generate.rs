use glam::{uvec3, UVec3};

use super::passes;
use crate::gpu::{self, dispatch_size};
use crate::{
    BindingSetId, BufferSizeInfo, ComputeShader, Dispatch, Settings, Stage,
};

/// Plans the non-adaptive pass whose output (written into the pong buffer)
/// drives the importance map.
pub fn plan_base(bsi: &BufferSizeInfo, dispatches: &mut Vec<Dispatch>) {
    let groups = groups(ComputeShader::GenerateQ3Base, bsi);

    for pass in 0..gpu::QUADRANT_COUNT as u32 {
        dispatches.push(Dispatch {
            stage: Stage::GenerateBase,
            shader: ComputeShader::GenerateQ3Base,
            binding_set: BindingSetId::generate_adaptive_base(pass),
            groups,
        });
    }
}

/// Plans the final occlusion, written into the ping buffer.
pub fn plan(
    settings: &Settings,
    bsi: &BufferSizeInfo,
    dispatches: &mut Vec<Dispatch>,
) {
    let shader = ComputeShader::generate(settings.quality_level);
    let groups = groups(shader, bsi);

    for pass in passes(settings) {
        let binding_set = if settings.quality_level.is_adaptive() {
            BindingSetId::generate_adaptive(pass)
        } else {
            BindingSetId::generate(pass)
        };

        dispatches.push(Dispatch {
            stage: Stage::Generate,
            shader,
            binding_set,
            groups,
        });
    }
}

fn groups(shader: ComputeShader, bsi: &BufferSizeInfo) -> UVec3 {
    let size = bsi.ssao_buffer_size;

    if shader.is_sparse_generate() {
        let width = dispatch_size(gpu::GENERATE_SPARSE_WIDTH, size.x);
        let width = width.div_ceil(5);
        let height = dispatch_size(gpu::GENERATE_SPARSE_HEIGHT, size.y);

        uvec3(width, height, gpu::SUB_PASS_COUNT as u32)
    } else {
        uvec3(
            dispatch_size(gpu::GENERATE_WIDTH, size.x),
            dispatch_size(gpu::GENERATE_HEIGHT, size.y),
            1,
        )
    }
}
