use crate::{Access, Format, TextureDesc, ViewDesc, ViewDimension};

pub fn format(format: Format) -> wgpu::TextureFormat {
    match format {
        Format::R8Unorm => wgpu::TextureFormat::R8Unorm,
        Format::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,
        Format::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        Format::Rgba8Snorm => wgpu::TextureFormat::Rgba8Snorm,
        Format::R16Float => wgpu::TextureFormat::R16Float,
        Format::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        Format::R32Float => wgpu::TextureFormat::R32Float,
        Format::R32Uint => wgpu::TextureFormat::R32Uint,
        Format::Depth32Float => wgpu::TextureFormat::Depth32Float,
    }
}

pub fn sample_type(format: Format) -> wgpu::TextureSampleType {
    match format {
        Format::R32Uint => wgpu::TextureSampleType::Uint,
        Format::Depth32Float => wgpu::TextureSampleType::Depth,
        Format::R32Float => {
            wgpu::TextureSampleType::Float { filterable: false }
        }
        _ => wgpu::TextureSampleType::Float { filterable: true },
    }
}

/// The load counter gets incremented concurrently by many invocations;
/// everything else is only written.
pub fn storage_access(format: Format) -> wgpu::StorageTextureAccess {
    match format {
        Format::R32Uint => wgpu::StorageTextureAccess::Atomic,
        _ => wgpu::StorageTextureAccess::WriteOnly,
    }
}

pub fn usage(format: Format) -> wgpu::TextureUsages {
    let usage = wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::STORAGE_BINDING
        | wgpu::TextureUsages::COPY_SRC;

    match format {
        Format::R32Uint => usage | wgpu::TextureUsages::STORAGE_ATOMIC,
        _ => usage,
    }
}

pub fn view_dimension(dimension: ViewDimension) -> wgpu::TextureViewDimension {
    match dimension {
        ViewDimension::D2 => wgpu::TextureViewDimension::D2,
        ViewDimension::D2Array => wgpu::TextureViewDimension::D2Array,
    }
}

pub fn layout_entry(
    binding: u32,
    desc: &ViewDesc,
) -> wgpu::BindGroupLayoutEntry {
    let view_dimension = view_dimension(desc.dimension);

    let ty = match desc.access {
        Access::Sampled => wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension,
            sample_type: sample_type(desc.format),
        },
        Access::Storage => wgpu::BindingType::StorageTexture {
            access: storage_access(desc.format),
            format: format(desc.format),
            view_dimension,
        },
    };

    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty,
        count: None,
    }
}

pub fn create_texture(
    device: &wgpu::Device,
    desc: &TextureDesc,
) -> wgpu::Texture {
    log::info!(
        "Allocating texture `{}`; size={}, layers={}, mips={}, format={:?}",
        desc.label,
        desc.size,
        desc.layers,
        desc.mips,
        desc.format,
    );

    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(desc.label),
        size: wgpu::Extent3d {
            width: desc.size.x,
            height: desc.size.y,
            depth_or_array_layers: desc.layers,
        },
        mip_level_count: desc.mips,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: format(desc.format),
        usage: usage(desc.format),
        view_formats: &[],
    })
}

pub fn create_view(
    texture: &wgpu::Texture,
    label: &str,
    desc: &ViewDesc,
) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        format: Some(format(desc.format)),
        dimension: Some(view_dimension(desc.dimension)),
        aspect: wgpu::TextureAspect::All,
        base_mip_level: desc.base_mip,
        mip_level_count: Some(desc.mip_count),
        base_array_layer: desc.base_layer,
        array_layer_count: Some(desc.layer_count),
        ..Default::default()
    })
}
