mod bind_group;
mod shader_library;
mod texture;

use std::sync::Arc;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::UVec3;
use log::{debug, info, trace};

pub use self::shader_library::*;
use self::bind_group::{BindGroupBuilder, LayoutCache};
use crate::{
    gpu, Access, Backend, Barrier, BindGroupDesc, ComputeShader, Error,
    Result, TextureDesc, ViewDesc,
};

/// [`Backend`] recording into a [`wgpu::CommandEncoder`].
///
/// Every dispatch gets its own compute pass, which makes wgpu synchronize
/// storage writes between dispatches on its own; [`Backend::barrier()`] is a
/// no-op here.
///
/// The pipeline writes into `R8Unorm`, `Rg8Unorm` and `R16Float` storage
/// textures and accumulates the load counter with texture atomics, so the
/// device must be created with
/// [`wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES`] and
/// [`wgpu::Features::TEXTURE_ATOMIC`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    shaders: ShaderLibrary,
    samplers: Vec<wgpu::Sampler>,
    layouts: LayoutCache,

    #[derivative(Debug = "ignore")]
    pipelines: FxHashMap<(ComputeShader, usize), wgpu::ComputePipeline>,
}

#[derive(Debug)]
pub struct WgpuBindGroup {
    bind_group: wgpu::BindGroup,
    layout: usize,
}

impl WgpuBackend {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        shaders: ShaderLibrary,
    ) -> Result<Self> {
        let required = wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
            | wgpu::Features::TEXTURE_ATOMIC;

        if !device.features().contains(required) {
            return Err(Error::Failed(format!(
                "device is missing required features: {required:?}"
            )));
        }

        for shader in ComputeShader::ALL {
            if !shaders.contains(shader) {
                debug!("Shader library is missing `{}`", shader.name());
            }
        }

        let samplers = vec![
            sampler(
                &device,
                "cacao_point_clamp_sampler",
                wgpu::FilterMode::Nearest,
                wgpu::AddressMode::ClampToEdge,
            ),
            sampler(
                &device,
                "cacao_point_mirror_sampler",
                wgpu::FilterMode::Nearest,
                wgpu::AddressMode::MirrorRepeat,
            ),
            sampler(
                &device,
                "cacao_linear_clamp_sampler",
                wgpu::FilterMode::Linear,
                wgpu::AddressMode::ClampToEdge,
            ),
            sampler(
                &device,
                "cacao_viewspace_depth_tap_sampler",
                wgpu::FilterMode::Nearest,
                wgpu::AddressMode::ClampToEdge,
            ),
        ];

        debug_assert_eq!(gpu::SAMPLER_COUNT as usize, samplers.len());

        Ok(Self {
            device,
            queue,
            shaders,
            samplers,
            layouts: Default::default(),
            pipelines: Default::default(),
        })
    }

    fn pipeline(
        &mut self,
        shader: ComputeShader,
        layout: usize,
    ) -> Result<&wgpu::ComputePipeline> {
        if !self.pipelines.contains_key(&(shader, layout)) {
            let pipeline = self.build_pipeline(shader, layout)?;

            self.pipelines.insert((shader, layout), pipeline);
        }

        self.pipelines.get(&(shader, layout)).ok_or_else(|| {
            Error::Failed(format!("pipeline `{}` vanished", shader.name()))
        })
    }

    fn build_pipeline(
        &self,
        shader: ComputeShader,
        layout: usize,
    ) -> Result<wgpu::ComputePipeline> {
        let (module, entry_point) = self.shaders.get(shader).ok_or_else(|| {
            Error::Failed(format!(
                "shader library has no `{}`",
                shader.entry_point()
            ))
        })?;

        debug!("Initializing pass: {}:{}", shader.name(), entry_point);

        let pipeline_layout_label =
            format!("cacao_{}_pipeline_layout", shader.name());

        let pipeline_layout = self.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some(&pipeline_layout_label),
                bind_group_layouts: &[self.layouts.get(layout)],
                push_constant_ranges: &[],
            },
        );

        let pipeline_label = format!("cacao_{}_pipeline", shader.name());

        Ok(self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&pipeline_label),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            }))
    }
}

impl Backend for WgpuBackend {
    type Texture = wgpu::Texture;
    type View = wgpu::TextureView;
    type Buffer = wgpu::Buffer;
    type BindGroup = WgpuBindGroup;
    type CommandContext = wgpu::CommandEncoder;

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Self::Texture> {
        let limits = self.device.limits();

        if desc.size.max_element() > limits.max_texture_dimension_2d
            || desc.layers > limits.max_texture_array_layers
        {
            return Err(Error::InvalidArgument(format!(
                "texture `{}` exceeds device limits; size={}, layers={}",
                desc.label, desc.size, desc.layers
            )));
        }

        Ok(texture::create_texture(&self.device, desc))
    }

    fn destroy_texture(&mut self, texture: Self::Texture) {
        texture.destroy();
    }

    fn create_view(
        &mut self,
        texture: &Self::Texture,
        label: &str,
        desc: &ViewDesc,
    ) -> Result<Self::View> {
        let required_usage = match desc.access {
            Access::Sampled => wgpu::TextureUsages::TEXTURE_BINDING,
            Access::Storage => wgpu::TextureUsages::STORAGE_BINDING,
        };

        if !texture.usage().contains(required_usage) {
            return Err(Error::InvalidArgument(format!(
                "view `{label}` needs {required_usage:?}"
            )));
        }

        if desc.base_mip + desc.mip_count > texture.mip_level_count()
            || desc.base_layer + desc.layer_count
                > texture.depth_or_array_layers()
        {
            return Err(Error::InvalidArgument(format!(
                "view `{label}` is out of its texture's bounds"
            )));
        }

        Ok(texture::create_view(texture, label, desc))
    }

    fn destroy_view(&mut self, view: Self::View) {
        drop(view);
    }

    fn create_buffer(
        &mut self,
        label: &str,
        size: usize,
    ) -> Result<Self::Buffer> {
        let padded_size = (size + 31) & !31;

        if padded_size as u64
            > self.device.limits().max_uniform_buffer_binding_size as u64
        {
            return Err(Error::OutOfMemory(format!(
                "uniform buffer `{label}` is too large; size={padded_size}"
            )));
        }

        info!(
            "Allocating uniform buffer `{label}`; size={padded_size} (padded \
             from {size})"
        );

        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            size: padded_size as _,
            mapped_at_creation: false,
        }))
    }

    fn destroy_buffer(&mut self, buffer: Self::Buffer) {
        buffer.destroy();
    }

    fn write_buffer(
        &mut self,
        _: &mut Self::CommandContext,
        buffer: &Self::Buffer,
        data: &[u8],
    ) {
        self.queue.write_buffer(buffer, 0, data);
    }

    fn create_bind_group(
        &mut self,
        desc: &BindGroupDesc<'_, Self>,
    ) -> Result<Self::BindGroup> {
        let mut builder = BindGroupBuilder::new(desc.set.name)
            .samplers(&self.samplers)
            .uniform(gpu::FRAME_CONSTANTS_SLOT, desc.frame_constants)
            .uniform(gpu::PASS_CONSTANTS_SLOT, desc.pass_constants);

        for view in desc.inputs.iter().chain(&desc.outputs) {
            builder = builder.texture(view.slot, view.view, &view.desc);
        }

        let layout = self
            .layouts
            .get_or_create(&self.device, builder.layout_entries());

        let bind_group = builder.build(&self.device, self.layouts.get(layout));

        Ok(WgpuBindGroup { bind_group, layout })
    }

    fn destroy_bind_group(&mut self, bind_group: Self::BindGroup) {
        drop(bind_group);
    }

    fn dispatch(
        &mut self,
        encoder: &mut Self::CommandContext,
        shader: ComputeShader,
        bind_group: &Self::BindGroup,
        groups: UVec3,
    ) -> Result<()> {
        let limit = self.device.limits().max_compute_workgroups_per_dimension;

        if groups.max_element() > limit {
            return Err(Error::InvalidArgument(format!(
                "dispatch of `{}` exceeds device limits; groups={groups}",
                shader.name()
            )));
        }

        let pipeline = self.pipeline(shader, bind_group.layout)?;
        let label = format!("cacao_{}_pass", shader.name());

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&label),
                timestamp_writes: None,
            });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group.bind_group, &[]);
        pass.dispatch_workgroups(groups.x, groups.y, groups.z);

        Ok(())
    }

    fn barrier(&mut self, _: &mut Self::CommandContext, barriers: &[Barrier]) {
        trace!("Skipping {} barrier(s)", barriers.len());
    }
}

fn sampler(
    device: &wgpu::Device,
    label: &str,
    filter: wgpu::FilterMode,
    address_mode: wgpu::AddressMode,
) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
