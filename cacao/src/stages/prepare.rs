use glam::{uvec3, UVec2};

use crate::gpu::{self, dispatch_size};
use crate::{
    BindingSetId, BufferSizeInfo, ComputeShader, Dispatch, Settings, Stage,
};

/// Deinterleaves the depth buffer (with its mip chain, when the quality level
/// samples it) and brings normals into viewspace.
pub fn plan(
    settings: &Settings,
    bsi: &BufferSizeInfo,
    dispatches: &mut Vec<Dispatch>,
) {
    let depths =
        ComputeShader::prepare_depths(settings.quality_level, bsi.downsampled);

    let (binding_set, tile) = match depths {
        ComputeShader::PrepareNativeDepthsAndMips
        | ComputeShader::PrepareDownsampledDepthsAndMips => (
            BindingSetId::PrepareDepthsMips,
            UVec2::new(
                gpu::PREPARE_DEPTHS_AND_MIPS_WIDTH,
                gpu::PREPARE_DEPTHS_AND_MIPS_HEIGHT,
            ),
        ),
        ComputeShader::PrepareNativeDepthsHalf
        | ComputeShader::PrepareDownsampledDepthsHalf => (
            BindingSetId::PrepareDepths,
            UVec2::new(
                gpu::PREPARE_DEPTHS_HALF_WIDTH,
                gpu::PREPARE_DEPTHS_HALF_HEIGHT,
            ),
        ),
        _ => (
            BindingSetId::PrepareDepths,
            UVec2::new(gpu::PREPARE_DEPTHS_WIDTH, gpu::PREPARE_DEPTHS_HEIGHT),
        ),
    };

    let size = bsi.deinterleaved_depth_buffer_size;

    dispatches.push(Dispatch {
        stage: Stage::Prepare,
        shader: depths,
        binding_set,
        groups: uvec3(
            dispatch_size(tile.x, size.x),
            dispatch_size(tile.y, size.y),
            1,
        ),
    });

    let (binding_set, tile) = if settings.generate_normals {
        (
            BindingSetId::PrepareNormals,
            UVec2::new(gpu::PREPARE_NORMALS_WIDTH, gpu::PREPARE_NORMALS_HEIGHT),
        )
    } else {
        (
            BindingSetId::PrepareNormalsFromInputNormals,
            UVec2::new(
                gpu::PREPARE_NORMALS_FROM_INPUT_NORMALS_WIDTH,
                gpu::PREPARE_NORMALS_FROM_INPUT_NORMALS_HEIGHT,
            ),
        )
    };

    let size = bsi.ssao_buffer_size;

    dispatches.push(Dispatch {
        stage: Stage::Prepare,
        shader: ComputeShader::prepare_normals(
            settings.generate_normals,
            bsi.downsampled,
        ),
        binding_set,
        groups: uvec3(
            dispatch_size(tile.x, size.x),
            dispatch_size(tile.y, size.y),
            1,
        ),
    });
}
