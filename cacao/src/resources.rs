use glam::{uvec2, UVec2};

use crate::{gpu, Access, BufferSizeInfo, Resource, Subresource, ViewKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Rgba8Snorm,
    R16Float,
    Rgba16Float,
    R32Float,
    R32Uint,
    Depth32Float,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    pub label: &'static str,
    pub size: UVec2,
    pub layers: u32,
    pub mips: u32,
    pub format: Format,
}

impl TextureDesc {
    /// The load counter doesn't depend on the screen; it's allocated together
    /// with the pipeline.
    pub fn load_counter() -> Self {
        Self {
            label: Resource::LoadCounter.label(),
            size: uvec2(1, 1),
            layers: 1,
            mips: 1,
            format: Format::R32Uint,
        }
    }

    /// Whether the texture is a 2D array (one layer per quadrant).
    pub fn is_layered(&self) -> bool {
        self.layers > 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewDimension {
    D2,
    D2Array,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewDesc {
    pub access: Access,
    pub dimension: ViewDimension,
    pub format: Format,
    pub base_mip: u32,
    pub mip_count: u32,
    pub base_layer: u32,
    pub layer_count: u32,
}

impl Resource {
    /// Returns the texture backing this resource, or `None` for textures
    /// supplied by the host.
    pub fn texture_desc(self, bsi: &BufferSizeInfo) -> Option<TextureDesc> {
        let quadrants = gpu::QUADRANT_COUNT as u32;

        let (size, layers, mips, format) = match self {
            Self::DeinterleavedDepths => (
                bsi.deinterleaved_depth_buffer_size,
                quadrants,
                gpu::DEPTH_MIP_COUNT,
                Format::R16Float,
            ),
            Self::DeinterleavedNormals => {
                (bsi.ssao_buffer_size, quadrants, 1, Format::Rgba8Snorm)
            }
            Self::SsaoBufferPing | Self::SsaoBufferPong => {
                (bsi.ssao_buffer_size, quadrants, 1, Format::Rg8Unorm)
            }
            Self::ImportanceMap | Self::ImportanceMapPong => {
                (bsi.importance_map_size, 1, 1, Format::R8Unorm)
            }
            Self::LoadCounter => return Some(TextureDesc::load_counter()),
            Self::Output => {
                (bsi.input_output_buffer_size, 1, 1, Format::R8Unorm)
            }
            Self::DepthInput | Self::NormalInput => return None,
        };

        Some(TextureDesc {
            label: self.label(),
            size,
            layers,
            mips,
            format,
        })
    }
}

impl ViewKey {
    /// Builds the view this key stands for, given the viewed texture.
    pub fn view_desc(self, texture: &TextureDesc) -> ViewDesc {
        let whole_dimension = if texture.is_layered() {
            ViewDimension::D2Array
        } else {
            ViewDimension::D2
        };

        // Storage views can only address a single mip
        let mip_count = match self.access {
            Access::Sampled => texture.mips,
            Access::Storage => 1,
        };

        let (dimension, base_mip, mip_count, base_layer, layer_count) =
            match self.subresource {
                Subresource::Whole => {
                    (whole_dimension, 0, mip_count, 0, texture.layers)
                }
                Subresource::Layer(layer) => {
                    (ViewDimension::D2, 0, mip_count, layer, 1)
                }
                Subresource::Mip(mip) => {
                    (whole_dimension, mip, 1, 0, texture.layers)
                }
            };

        ViewDesc {
            access: self.access,
            dimension,
            format: texture.format,
            base_mip,
            mip_count,
            base_layer,
            layer_count,
        }
    }
}

/// Texture supplied by the host; borrowed only while views of it are being
/// created.
#[derive(Debug)]
pub struct ExternalTexture<'a, T> {
    pub texture: &'a T,
    pub size: UVec2,
    pub format: Format,
}

impl<T> ExternalTexture<'_, T> {
    pub(crate) fn desc(&self, resource: Resource) -> TextureDesc {
        TextureDesc {
            label: resource.label(),
            size: self.size,
            layers: 1,
            mips: 1,
            format: self.format,
        }
    }
}

/// Host textures the pipeline reads.
#[derive(Debug)]
pub struct ScreenInputs<'a, T> {
    pub depth: ExternalTexture<'a, T>,

    /// Required unless normals are reconstructed from depth.
    pub normals: Option<ExternalTexture<'a, T>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bsi() -> BufferSizeInfo {
        BufferSizeInfo::new(uvec2(1920, 1080), false).unwrap()
    }

    #[test]
    fn texture_descs() {
        let bsi = bsi();

        let depths = Resource::DeinterleavedDepths.texture_desc(&bsi).unwrap();

        assert_eq!(uvec2(960, 540), depths.size);
        assert_eq!(4, depths.layers);
        assert_eq!(4, depths.mips);
        assert_eq!(Format::R16Float, depths.format);

        let ping = Resource::SsaoBufferPing.texture_desc(&bsi).unwrap();

        assert_eq!(uvec2(960, 540), ping.size);
        assert_eq!(4, ping.layers);
        assert_eq!(Format::Rg8Unorm, ping.format);

        let importance_map =
            Resource::ImportanceMap.texture_desc(&bsi).unwrap();

        assert_eq!(uvec2(480, 270), importance_map.size);
        assert!(!importance_map.is_layered());

        let output = Resource::Output.texture_desc(&bsi).unwrap();

        assert_eq!(uvec2(1920, 1080), output.size);
        assert_eq!(Format::R8Unorm, output.format);

        assert!(Resource::DepthInput.texture_desc(&bsi).is_none());
        assert!(Resource::NormalInput.texture_desc(&bsi).is_none());
    }

    #[test]
    fn screen_resources_are_owned() {
        for resource in Resource::SCREEN {
            assert!(!resource.is_external());
            assert!(resource.texture_desc(&bsi()).is_some());
        }

        assert!(!Resource::SCREEN.contains(&Resource::LoadCounter));
    }

    #[test]
    fn view_descs() {
        let depths =
            Resource::DeinterleavedDepths.texture_desc(&bsi()).unwrap();

        let actual = ViewKey::sampled(Resource::DeinterleavedDepths)
            .view_desc(&depths);

        assert_eq!(ViewDimension::D2Array, actual.dimension);
        assert_eq!((0, 4), (actual.base_mip, actual.mip_count));
        assert_eq!((0, 4), (actual.base_layer, actual.layer_count));

        let actual = ViewKey::sampled(Resource::DeinterleavedDepths)
            .layer(2)
            .view_desc(&depths);

        assert_eq!(ViewDimension::D2, actual.dimension);
        assert_eq!((0, 4), (actual.base_mip, actual.mip_count));
        assert_eq!((2, 1), (actual.base_layer, actual.layer_count));

        let actual = ViewKey::storage(Resource::DeinterleavedDepths)
            .mip(3)
            .view_desc(&depths);

        assert_eq!(ViewDimension::D2Array, actual.dimension);
        assert_eq!((3, 1), (actual.base_mip, actual.mip_count));
        assert_eq!((0, 4), (actual.base_layer, actual.layer_count));

        let output = Resource::Output.texture_desc(&bsi()).unwrap();
        let actual = ViewKey::storage(Resource::Output).view_desc(&output);

        assert_eq!(ViewDimension::D2, actual.dimension);
        assert_eq!(Access::Storage, actual.access);
        assert_eq!(Format::R8Unorm, actual.format);
    }
}
