//! Static table describing which views every dispatch binds.
//!
//! Each [`BindingSetId`] names one concrete bind group; its [`BindingSetDesc`]
//! lists the sampled inputs (bound from [`gpu::INPUT_SLOT_BASE`] onwards) and
//! storage outputs (bound from [`gpu::OUTPUT_SLOT_BASE`] onwards), in order.

use self::Resource::*;
use crate::gpu;

/// Logical texture the pipeline reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    DeinterleavedDepths,
    DeinterleavedNormals,
    SsaoBufferPing,
    SsaoBufferPong,
    ImportanceMap,
    ImportanceMapPong,
    LoadCounter,
    Output,

    /// Host's depth buffer.
    DepthInput,

    /// Host's normal buffer; not needed when normals are reconstructed from
    /// depth.
    NormalInput,
}

impl Resource {
    /// Textures owned by the pipeline and sized by the screen.
    pub const SCREEN: [Self; 7] = [
        Self::DeinterleavedDepths,
        Self::DeinterleavedNormals,
        Self::SsaoBufferPing,
        Self::SsaoBufferPong,
        Self::ImportanceMap,
        Self::ImportanceMapPong,
        Self::Output,
    ];

    pub fn is_external(self) -> bool {
        matches!(self, Self::DepthInput | Self::NormalInput)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DeinterleavedDepths => "cacao_deinterleaved_depths",
            Self::DeinterleavedNormals => "cacao_deinterleaved_normals",
            Self::SsaoBufferPing => "cacao_ssao_buffer_ping",
            Self::SsaoBufferPong => "cacao_ssao_buffer_pong",
            Self::ImportanceMap => "cacao_importance_map",
            Self::ImportanceMapPong => "cacao_importance_map_pong",
            Self::LoadCounter => "cacao_load_counter",
            Self::Output => "cacao_output",
            Self::DepthInput => "cacao_depth_input",
            Self::NormalInput => "cacao_normal_input",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    Sampled,
    Storage,
}

/// Part of a texture a view covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subresource {
    /// Every layer and (for sampled views) every mip.
    Whole,

    /// Single layer (quadrant), every mip.
    Layer(u32),

    /// Single mip, every layer.
    Mip(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub resource: Resource,
    pub access: Access,
    pub subresource: Subresource,
}

impl ViewKey {
    pub const fn sampled(resource: Resource) -> Self {
        Self {
            resource,
            access: Access::Sampled,
            subresource: Subresource::Whole,
        }
    }

    pub const fn storage(resource: Resource) -> Self {
        Self {
            resource,
            access: Access::Storage,
            subresource: Subresource::Whole,
        }
    }

    pub const fn layer(self, layer: u32) -> Self {
        Self {
            subresource: Subresource::Layer(layer),
            ..self
        }
    }

    pub const fn mip(self, mip: u32) -> Self {
        Self {
            subresource: Subresource::Mip(mip),
            ..self
        }
    }
}

/// Shape of a bind group: which kinds of views it holds, in which slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutId {
    ClearLoadCounter,
    PrepareDepths,
    PrepareDepthsMips,
    PrepareNormals,
    PrepareNormalsFromInputNormals,
    Generate,
    GenerateAdaptive,
    GenerateImportanceMap,
    PostprocessImportanceMapA,
    PostprocessImportanceMapB,
    EdgeSensitiveBlur,
    Apply,
    BilateralUpsample,
}

impl LayoutId {
    /// Returns `(input_count, output_count)`.
    pub fn view_counts(self) -> (usize, usize) {
        match self {
            Self::ClearLoadCounter => (0, 1),
            Self::PrepareDepths => (1, 1),
            Self::PrepareDepthsMips => (1, gpu::DEPTH_MIP_COUNT as usize),
            Self::PrepareNormals => (1, 1),
            Self::PrepareNormalsFromInputNormals => (1, 1),
            Self::Generate => (2, 1),
            Self::GenerateAdaptive => (5, 1),
            Self::GenerateImportanceMap => (1, 1),
            Self::PostprocessImportanceMapA => (1, 1),
            Self::PostprocessImportanceMapB => (1, 2),
            Self::EdgeSensitiveBlur => (1, 1),
            Self::Apply => (1, 1),
            Self::BilateralUpsample => (3, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingSetId {
    ClearLoadCounter,
    PrepareDepths,
    PrepareDepthsMips,
    PrepareNormals,
    PrepareNormalsFromInputNormals,
    GenerateAdaptiveBase0,
    GenerateAdaptiveBase1,
    GenerateAdaptiveBase2,
    GenerateAdaptiveBase3,
    Generate0,
    Generate1,
    Generate2,
    Generate3,
    GenerateAdaptive0,
    GenerateAdaptive1,
    GenerateAdaptive2,
    GenerateAdaptive3,
    GenerateImportanceMap,
    PostprocessImportanceMapA,
    PostprocessImportanceMapB,
    EdgeSensitiveBlur0,
    EdgeSensitiveBlur1,
    EdgeSensitiveBlur2,
    EdgeSensitiveBlur3,
    ApplyPing,
    ApplyPong,
    BilateralUpsamplePing,
    BilateralUpsamplePong,
}

impl BindingSetId {
    pub const COUNT: usize = 28;

    pub fn all() -> impl Iterator<Item = Self> {
        BINDING_SETS.iter().map(|set| set.id)
    }

    pub fn desc(self) -> &'static BindingSetDesc {
        &BINDING_SETS[self as usize]
    }

    pub fn generate_adaptive_base(pass: u32) -> Self {
        [
            Self::GenerateAdaptiveBase0,
            Self::GenerateAdaptiveBase1,
            Self::GenerateAdaptiveBase2,
            Self::GenerateAdaptiveBase3,
        ][pass as usize]
    }

    pub fn generate(pass: u32) -> Self {
        [
            Self::Generate0,
            Self::Generate1,
            Self::Generate2,
            Self::Generate3,
        ][pass as usize]
    }

    pub fn generate_adaptive(pass: u32) -> Self {
        [
            Self::GenerateAdaptive0,
            Self::GenerateAdaptive1,
            Self::GenerateAdaptive2,
            Self::GenerateAdaptive3,
        ][pass as usize]
    }

    pub fn edge_sensitive_blur(pass: u32) -> Self {
        [
            Self::EdgeSensitiveBlur0,
            Self::EdgeSensitiveBlur1,
            Self::EdgeSensitiveBlur2,
            Self::EdgeSensitiveBlur3,
        ][pass as usize]
    }
}

#[derive(Debug)]
pub struct BindingSetDesc {
    pub id: BindingSetId,
    pub name: &'static str,
    pub layout: LayoutId,

    /// Quadrant whose pass constants get bound; quadrant-independent sets
    /// bind quadrant 0's.
    pub pass: Option<u32>,

    pub inputs: &'static [ViewKey],
    pub outputs: &'static [ViewKey],
}

impl BindingSetDesc {
    pub fn pass_constants_index(&self) -> usize {
        self.pass.unwrap_or(0) as usize
    }

    /// Returns `(slot, view)` of every sampled input.
    pub fn input_slots(&self) -> impl Iterator<Item = (u32, ViewKey)> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .map(|(idx, view)| (gpu::INPUT_SLOT_BASE + idx as u32, *view))
    }

    /// Returns `(slot, view)` of every storage output.
    pub fn output_slots(&self) -> impl Iterator<Item = (u32, ViewKey)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .map(|(idx, view)| (gpu::OUTPUT_SLOT_BASE + idx as u32, *view))
    }

    pub fn views(&self) -> impl Iterator<Item = ViewKey> + '_ {
        self.inputs.iter().chain(self.outputs).copied()
    }

    pub fn uses(&self, resource: Resource) -> bool {
        self.views().any(|view| view.resource == resource)
    }
}

const DEPTH_INPUT: ViewKey = ViewKey::sampled(DepthInput);
const NORMAL_INPUT: ViewKey = ViewKey::sampled(NormalInput);
const DEPTHS: ViewKey = ViewKey::sampled(DeinterleavedDepths);
const DEPTHS_OUT: ViewKey = ViewKey::storage(DeinterleavedDepths);
const NORMALS: ViewKey = ViewKey::sampled(DeinterleavedNormals);
const NORMALS_OUT: ViewKey = ViewKey::storage(DeinterleavedNormals);
const PING: ViewKey = ViewKey::sampled(SsaoBufferPing);
const PING_OUT: ViewKey = ViewKey::storage(SsaoBufferPing);
const PONG: ViewKey = ViewKey::sampled(SsaoBufferPong);
const PONG_OUT: ViewKey = ViewKey::storage(SsaoBufferPong);
const IMPORTANCE_MAP: ViewKey = ViewKey::sampled(ImportanceMap);
const IMPORTANCE_MAP_OUT: ViewKey = ViewKey::storage(ImportanceMap);
const IMPORTANCE_MAP_PONG: ViewKey = ViewKey::sampled(ImportanceMapPong);
const IMPORTANCE_MAP_PONG_OUT: ViewKey = ViewKey::storage(ImportanceMapPong);
const LOAD_COUNTER: ViewKey = ViewKey::sampled(LoadCounter);
const LOAD_COUNTER_OUT: ViewKey = ViewKey::storage(LoadCounter);
const OUTPUT_OUT: ViewKey = ViewKey::storage(Output);

macro_rules! generate_set {
    ($id:ident, $name:literal, $pass:literal, $out:expr $(,)?) => {
        BindingSetDesc {
            id: BindingSetId::$id,
            name: $name,
            layout: LayoutId::Generate,
            pass: Some($pass),
            inputs: &[DEPTHS.layer($pass), NORMALS],
            outputs: &[$out.layer($pass)],
        }
    };
}

macro_rules! generate_adaptive_set {
    ($id:ident, $name:literal, $pass:literal $(,)?) => {
        BindingSetDesc {
            id: BindingSetId::$id,
            name: $name,
            layout: LayoutId::GenerateAdaptive,
            pass: Some($pass),
            inputs: &[
                DEPTHS.layer($pass),
                NORMALS,
                LOAD_COUNTER,
                IMPORTANCE_MAP,
                PONG,
            ],
            outputs: &[PING_OUT.layer($pass)],
        }
    };
}

macro_rules! edge_sensitive_blur_set {
    ($id:ident, $name:literal, $pass:literal $(,)?) => {
        BindingSetDesc {
            id: BindingSetId::$id,
            name: $name,
            layout: LayoutId::EdgeSensitiveBlur,
            pass: Some($pass),
            inputs: &[PING.layer($pass)],
            outputs: &[PONG_OUT.layer($pass)],
        }
    };
}

/// Indexed by [`BindingSetId`].
pub static BINDING_SETS: [BindingSetDesc; BindingSetId::COUNT] = [
    BindingSetDesc {
        id: BindingSetId::ClearLoadCounter,
        name: "clear_load_counter",
        layout: LayoutId::ClearLoadCounter,
        pass: None,
        inputs: &[],
        outputs: &[LOAD_COUNTER_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::PrepareDepths,
        name: "prepare_depths",
        layout: LayoutId::PrepareDepths,
        pass: None,
        inputs: &[DEPTH_INPUT],
        outputs: &[DEPTHS_OUT.mip(0)],
    },
    BindingSetDesc {
        id: BindingSetId::PrepareDepthsMips,
        name: "prepare_depths_mips",
        layout: LayoutId::PrepareDepthsMips,
        pass: None,
        inputs: &[DEPTH_INPUT],
        outputs: &[
            DEPTHS_OUT.mip(0),
            DEPTHS_OUT.mip(1),
            DEPTHS_OUT.mip(2),
            DEPTHS_OUT.mip(3),
        ],
    },
    BindingSetDesc {
        id: BindingSetId::PrepareNormals,
        name: "prepare_normals",
        layout: LayoutId::PrepareNormals,
        pass: None,
        inputs: &[DEPTH_INPUT],
        outputs: &[NORMALS_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::PrepareNormalsFromInputNormals,
        name: "prepare_normals_from_input_normals",
        layout: LayoutId::PrepareNormalsFromInputNormals,
        pass: None,
        inputs: &[NORMAL_INPUT],
        outputs: &[NORMALS_OUT],
    },
    generate_set!(
        GenerateAdaptiveBase0,
        "generate_adaptive_base_0",
        0,
        PONG_OUT,
    ),
    generate_set!(
        GenerateAdaptiveBase1,
        "generate_adaptive_base_1",
        1,
        PONG_OUT,
    ),
    generate_set!(
        GenerateAdaptiveBase2,
        "generate_adaptive_base_2",
        2,
        PONG_OUT,
    ),
    generate_set!(
        GenerateAdaptiveBase3,
        "generate_adaptive_base_3",
        3,
        PONG_OUT,
    ),
    generate_set!(Generate0, "generate_0", 0, PING_OUT),
    generate_set!(Generate1, "generate_1", 1, PING_OUT),
    generate_set!(Generate2, "generate_2", 2, PING_OUT),
    generate_set!(Generate3, "generate_3", 3, PING_OUT),
    generate_adaptive_set!(GenerateAdaptive0, "generate_adaptive_0", 0),
    generate_adaptive_set!(GenerateAdaptive1, "generate_adaptive_1", 1),
    generate_adaptive_set!(GenerateAdaptive2, "generate_adaptive_2", 2),
    generate_adaptive_set!(GenerateAdaptive3, "generate_adaptive_3", 3),
    BindingSetDesc {
        id: BindingSetId::GenerateImportanceMap,
        name: "generate_importance_map",
        layout: LayoutId::GenerateImportanceMap,
        pass: None,
        inputs: &[PONG],
        outputs: &[IMPORTANCE_MAP_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::PostprocessImportanceMapA,
        name: "postprocess_importance_map_a",
        layout: LayoutId::PostprocessImportanceMapA,
        pass: None,
        inputs: &[IMPORTANCE_MAP],
        outputs: &[IMPORTANCE_MAP_PONG_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::PostprocessImportanceMapB,
        name: "postprocess_importance_map_b",
        layout: LayoutId::PostprocessImportanceMapB,
        pass: None,
        inputs: &[IMPORTANCE_MAP_PONG],
        outputs: &[IMPORTANCE_MAP_OUT, LOAD_COUNTER_OUT],
    },
    edge_sensitive_blur_set!(EdgeSensitiveBlur0, "edge_sensitive_blur_0", 0),
    edge_sensitive_blur_set!(EdgeSensitiveBlur1, "edge_sensitive_blur_1", 1),
    edge_sensitive_blur_set!(EdgeSensitiveBlur2, "edge_sensitive_blur_2", 2),
    edge_sensitive_blur_set!(EdgeSensitiveBlur3, "edge_sensitive_blur_3", 3),
    BindingSetDesc {
        id: BindingSetId::ApplyPing,
        name: "apply_ping",
        layout: LayoutId::Apply,
        pass: None,
        inputs: &[PING],
        outputs: &[OUTPUT_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::ApplyPong,
        name: "apply_pong",
        layout: LayoutId::Apply,
        pass: None,
        inputs: &[PONG],
        outputs: &[OUTPUT_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::BilateralUpsamplePing,
        name: "bilateral_upsample_ping",
        layout: LayoutId::BilateralUpsample,
        pass: None,
        inputs: &[PING, DEPTH_INPUT, DEPTHS],
        outputs: &[OUTPUT_OUT],
    },
    BindingSetDesc {
        id: BindingSetId::BilateralUpsamplePong,
        name: "bilateral_upsample_pong",
        layout: LayoutId::BilateralUpsample,
        pass: None,
        inputs: &[PONG, DEPTH_INPUT, DEPTHS],
        outputs: &[OUTPUT_OUT],
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_index_their_own_entries() {
        for (idx, set) in BINDING_SETS.iter().enumerate() {
            assert_eq!(idx, set.id as usize, "{}", set.name);
            assert!(std::ptr::eq(set, set.id.desc()));
        }

        assert_eq!(BindingSetId::COUNT, BindingSetId::all().count());
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = BINDING_SETS.iter().map(|s| s.name).collect();

        assert_eq!(BINDING_SETS.len(), names.len());
    }

    #[test]
    fn layouts_match_view_counts() {
        for set in &BINDING_SETS {
            let (inputs, outputs) = set.layout.view_counts();

            assert_eq!(inputs, set.inputs.len(), "{}", set.name);
            assert_eq!(outputs, set.outputs.len(), "{}", set.name);
            assert!(inputs as u32 <= gpu::MAX_INPUTS, "{}", set.name);
        }
    }

    #[test]
    fn accesses_match_directions() {
        for set in &BINDING_SETS {
            for view in set.inputs {
                assert_eq!(Access::Sampled, view.access, "{}", set.name);
            }

            for view in set.outputs {
                assert_eq!(Access::Storage, view.access, "{}", set.name);
                assert!(!view.resource.is_external(), "{}", set.name);
            }
        }
    }

    #[test]
    fn no_set_reads_what_it_writes() {
        for set in &BINDING_SETS {
            for input in set.inputs {
                assert!(
                    set.outputs.iter().all(|o| o.resource != input.resource),
                    "{}",
                    set.name
                );
            }
        }
    }

    #[test]
    fn quadrant_sets_bind_their_own_layers() {
        for pass in 0..gpu::QUADRANT_COUNT as u32 {
            for id in [
                BindingSetId::generate_adaptive_base(pass),
                BindingSetId::generate(pass),
                BindingSetId::generate_adaptive(pass),
                BindingSetId::edge_sensitive_blur(pass),
            ] {
                let set = id.desc();

                assert_eq!(Some(pass), set.pass, "{}", set.name);
                assert_eq!(pass as usize, set.pass_constants_index());

                assert_eq!(
                    Subresource::Layer(pass),
                    set.outputs[0].subresource,
                    "{}",
                    set.name
                );
            }
        }
    }

    #[test]
    fn slots() {
        let set = BindingSetId::PostprocessImportanceMapB.desc();

        assert_eq!(
            vec![(20, IMPORTANCE_MAP_PONG)],
            set.input_slots().collect::<Vec<_>>()
        );

        assert_eq!(
            vec![(30, IMPORTANCE_MAP_OUT), (31, LOAD_COUNTER_OUT)],
            set.output_slots().collect::<Vec<_>>()
        );

        assert!(set.uses(Resource::LoadCounter));
        assert!(!set.uses(Resource::SsaoBufferPing));
    }

    #[test]
    fn adaptive_generate_reads_base_output() {
        for pass in 0..4 {
            let base = BindingSetId::generate_adaptive_base(pass).desc();
            let adaptive = BindingSetId::generate_adaptive(pass).desc();

            assert_eq!(Resource::SsaoBufferPong, base.outputs[0].resource);
            assert_eq!(Resource::SsaoBufferPing, adaptive.outputs[0].resource);
            assert!(adaptive.inputs.contains(&PONG));
            assert!(adaptive.inputs.contains(&IMPORTANCE_MAP));
            assert!(adaptive.inputs.contains(&LOAD_COUNTER));
        }
    }
}
