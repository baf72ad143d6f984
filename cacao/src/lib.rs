//! Interleaved-depth adaptive screen-space ambient occlusion.
//!
//! [`Ssao`] owns the intermediate GPU resources and records the whole compute
//! pipeline (clear, prepare, generate, importance map, blur, apply/upsample)
//! through a [`Backend`], which abstracts over the graphics API.

mod backend;
mod barriers;
mod bindings;
mod buffer_size_info;
mod constants;
mod error;
mod metrics;
mod pipeline;
mod resources;
mod settings;
mod shaders;
mod stages;

pub use cacao_gpu as gpu;

pub use self::backend::*;
pub use self::barriers::*;
pub use self::bindings::*;
pub use self::buffer_size_info::*;
pub use self::constants::*;
pub use self::error::*;
pub use self::pipeline::*;
pub use self::resources::*;
pub use self::settings::*;
pub use self::shaders::*;
pub use self::stages::*;
