//! Binding slots used by every CACAO descriptor set.
//!
//! Samplers occupy the lowest slots, constant blocks follow, then sampled
//! inputs and storage outputs in the order they are listed for given pass.

/// Point sampler, clamp-to-edge.
pub const POINT_CLAMP_SAMPLER_SLOT: u32 = 0;

/// Point sampler, mirrored addressing.
pub const POINT_MIRROR_SAMPLER_SLOT: u32 = 1;

/// Bilinear sampler, clamp-to-edge.
pub const LINEAR_CLAMP_SAMPLER_SLOT: u32 = 2;

/// Point sampler with mip selection, used to tap the viewspace depth chain.
pub const VIEWSPACE_DEPTH_TAP_SAMPLER_SLOT: u32 = 3;

pub const SAMPLER_COUNT: u32 = 4;

pub const FRAME_CONSTANTS_SLOT: u32 = 10;
pub const PASS_CONSTANTS_SLOT: u32 = 11;

pub const INPUT_SLOT_BASE: u32 = 20;
pub const OUTPUT_SLOT_BASE: u32 = 30;

/// Maximum number of sampled inputs a single pass may bind.
pub const MAX_INPUTS: u32 = OUTPUT_SLOT_BASE - INPUT_SLOT_BASE;
