use glam::uvec3;

use crate::gpu::{self, dispatch_size};
use crate::{
    BindingSetId, BufferSizeInfo, ComputeShader, Dispatch, Settings, Stage,
};

/// Plans the final composite: either a plain apply at output resolution or,
/// when the effect was computed downsampled, a bilateral upsample.
///
/// Reads whichever buffer was written last: pong after blurring, ping
/// otherwise.
pub fn plan(
    settings: &Settings,
    bsi: &BufferSizeInfo,
    dispatches: &mut Vec<Dispatch>,
) {
    let blurred = settings.blur_pass_count > 0;
    let size = bsi.input_output_buffer_size;

    let dispatch = if bsi.downsampled {
        let binding_set = if blurred {
            BindingSetId::BilateralUpsamplePong
        } else {
            BindingSetId::BilateralUpsamplePing
        };

        let tile_width = 2 * gpu::BILATERAL_UPSCALE_WIDTH;
        let tile_height = 2 * gpu::BILATERAL_UPSCALE_HEIGHT;

        Dispatch {
            stage: Stage::Apply,
            shader: ComputeShader::upscale(settings.quality_level),
            binding_set,
            groups: uvec3(
                dispatch_size(tile_width, size.x),
                dispatch_size(tile_height, size.y),
                1,
            ),
        }
    } else {
        let binding_set = if blurred {
            BindingSetId::ApplyPong
        } else {
            BindingSetId::ApplyPing
        };

        Dispatch {
            stage: Stage::Apply,
            shader: ComputeShader::apply(settings.quality_level),
            binding_set,
            groups: uvec3(
                dispatch_size(gpu::APPLY_WIDTH, size.x),
                dispatch_size(gpu::APPLY_HEIGHT, size.y),
                1,
            ),
        }
    };

    dispatches.push(dispatch);
}
