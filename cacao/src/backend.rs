//! Abstraction over the graphics API.
//!
//! The pipeline talks to the GPU only through [`Backend`]: it creates
//! textures, views, constant buffers and bind groups, then records buffer
//! writes, barriers and dispatches into a backend-specific command context.

mod recording;

#[cfg(feature = "wgpu")]
mod wgpu;

use glam::UVec3;

pub use self::recording::*;
#[cfg(feature = "wgpu")]
pub use self::wgpu::*;
use crate::{
    Barrier, BindingSetDesc, ComputeShader, Result, TextureDesc, ViewDesc,
};

pub trait Backend: Sized {
    type Texture;
    type View;
    type Buffer;
    type BindGroup;

    /// Where commands get recorded, e.g. a command encoder.
    type CommandContext;

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Self::Texture>;

    fn destroy_texture(&mut self, texture: Self::Texture);

    fn create_view(
        &mut self,
        texture: &Self::Texture,
        label: &str,
        desc: &ViewDesc,
    ) -> Result<Self::View>;

    fn destroy_view(&mut self, view: Self::View);

    /// Creates a uniform buffer of at least `size` bytes.
    fn create_buffer(&mut self, label: &str, size: usize)
        -> Result<Self::Buffer>;

    fn destroy_buffer(&mut self, buffer: Self::Buffer);

    /// Schedules an upload that becomes visible to dispatches recorded
    /// afterwards.
    fn write_buffer(
        &mut self,
        ctx: &mut Self::CommandContext,
        buffer: &Self::Buffer,
        data: &[u8],
    );

    fn create_bind_group(
        &mut self,
        desc: &BindGroupDesc<'_, Self>,
    ) -> Result<Self::BindGroup>;

    fn destroy_bind_group(&mut self, bind_group: Self::BindGroup);

    fn dispatch(
        &mut self,
        ctx: &mut Self::CommandContext,
        shader: ComputeShader,
        bind_group: &Self::BindGroup,
        groups: UVec3,
    ) -> Result<()>;

    fn barrier(&mut self, ctx: &mut Self::CommandContext, barriers: &[Barrier]);
}

/// Everything a bind group for one [`BindingSetDesc`] consists of.
///
/// Samplers are not listed; backends bind their own at
/// [`crate::gpu::POINT_CLAMP_SAMPLER_SLOT`] and the following slots.
pub struct BindGroupDesc<'a, B>
where
    B: Backend,
{
    pub set: &'static BindingSetDesc,
    pub frame_constants: &'a B::Buffer,
    pub pass_constants: &'a B::Buffer,
    pub inputs: Vec<BoundView<'a, B>>,
    pub outputs: Vec<BoundView<'a, B>>,
}

pub struct BoundView<'a, B>
where
    B: Backend,
{
    pub slot: u32,
    pub view: &'a B::View,
    pub desc: ViewDesc,
}
