use fxhash::FxHashMap;
use log::debug;

use super::texture;
use crate::{gpu, ViewDesc};

/// Collects a bind group's layout together with the resources bound to it;
/// the layout itself gets created (and deduplicated) by the caller.
pub struct BindGroupBuilder<'a> {
    label: String,
    layouts: Vec<wgpu::BindGroupLayoutEntry>,
    resources: Vec<wgpu::BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(label: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            layouts: Default::default(),
            resources: Default::default(),
        }
    }

    pub fn samplers(mut self, samplers: &'a [wgpu::Sampler]) -> Self {
        let bindings = gpu::POINT_CLAMP_SAMPLER_SLOT..;

        for (binding, sampler) in bindings.zip(samplers) {
            let ty = if binding == gpu::LINEAR_CLAMP_SAMPLER_SLOT {
                wgpu::SamplerBindingType::Filtering
            } else {
                wgpu::SamplerBindingType::NonFiltering
            };

            self.layouts.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Sampler(ty),
                count: None,
            });

            self.resources.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        self
    }

    pub fn uniform(mut self, binding: u32, buffer: &'a wgpu::Buffer) -> Self {
        self.layouts.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });

        self.resources.push(wgpu::BindGroupEntry {
            binding,
            resource: buffer.as_entire_binding(),
        });

        self
    }

    pub fn texture(
        mut self,
        binding: u32,
        view: &'a wgpu::TextureView,
        desc: &ViewDesc,
    ) -> Self {
        self.layouts.push(texture::layout_entry(binding, desc));

        self.resources.push(wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::TextureView(view),
        });

        self
    }

    pub fn layout_entries(&self) -> &[wgpu::BindGroupLayoutEntry] {
        &self.layouts
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        let label = format!("cacao_{}", self.label);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout,
            entries: &self.resources,
        })
    }
}

/// Bind group layouts created so far, deduplicated by their entries.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: Vec<wgpu::BindGroupLayout>,
    ids: FxHashMap<Vec<wgpu::BindGroupLayoutEntry>, usize>,
}

impl LayoutCache {
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> usize {
        if let Some(id) = self.ids.get(entries) {
            return *id;
        }

        let id = self.layouts.len();
        let label = format!("cacao_bind_group_layout_{id}");

        debug!("Initializing bind group layout: {label}");

        self.layouts.push(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some(&label),
                entries,
            },
        ));

        self.ids.insert(entries.to_vec(), id);

        id
    }

    pub fn get(&self, id: usize) -> &wgpu::BindGroupLayout {
        &self.layouts[id]
    }
}
