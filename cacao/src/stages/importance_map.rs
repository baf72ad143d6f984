use glam::uvec3;

use crate::gpu::{self, dispatch_size};
use crate::{BindingSetId, BufferSizeInfo, ComputeShader, Dispatch, Stage};

pub fn plan(bsi: &BufferSizeInfo, dispatches: &mut Vec<Dispatch>) {
    let size = bsi.importance_map_size;

    let passes = [
        (
            Stage::ImportanceMap,
            ComputeShader::GenerateImportanceMap,
            BindingSetId::GenerateImportanceMap,
            (gpu::IMPORTANCE_MAP_WIDTH, gpu::IMPORTANCE_MAP_HEIGHT),
        ),
        (
            Stage::PostprocessImportanceMapA,
            ComputeShader::PostprocessImportanceMapA,
            BindingSetId::PostprocessImportanceMapA,
            (gpu::IMPORTANCE_MAP_A_WIDTH, gpu::IMPORTANCE_MAP_A_HEIGHT),
        ),
        (
            Stage::PostprocessImportanceMapB,
            ComputeShader::PostprocessImportanceMapB,
            BindingSetId::PostprocessImportanceMapB,
            (gpu::IMPORTANCE_MAP_B_WIDTH, gpu::IMPORTANCE_MAP_B_HEIGHT),
        ),
    ];

    for (stage, shader, binding_set, (width, height)) in passes {
        dispatches.push(Dispatch {
            stage,
            shader,
            binding_set,
            groups: uvec3(
                dispatch_size(width, size.x),
                dispatch_size(height, size.y),
                1,
            ),
        });
    }
}
