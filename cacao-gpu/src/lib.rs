//! Constant blocks, binding slots and workgroup sizes shared between the
//! CACAO host code and its compute shaders.

#![cfg_attr(target_arch = "spirv", no_std)]

mod bindings;
mod frame_constants;
mod pass_constants;
mod workgroups;

pub use self::bindings::*;
pub use self::frame_constants::*;
pub use self::pass_constants::*;
pub use self::workgroups::*;

/// Number of deinterleaved quadrants (2x2) the SSAO buffer is split into.
pub const QUADRANT_COUNT: usize = 4;

/// Number of sub-passes (rotated/scaled copies of the sampling kernel) per
/// quadrant.
pub const SUB_PASS_COUNT: usize = 5;

/// Number of mips kept for the deinterleaved depth buffer.
pub const DEPTH_MIP_COUNT: u32 = 4;

/// Maximum number of edge-sensitive blur passes.
pub const MAX_BLUR_PASSES: u32 = 8;
