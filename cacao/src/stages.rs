//! Per-frame dispatch plan.
//!
//! Stages run in a fixed order; each submodule appends its dispatches for
//! given settings and buffer sizes.

mod apply;
mod blur;
mod clear;
mod generate;
mod importance_map;
mod prepare;

use glam::UVec3;
use log::debug;

use crate::{gpu, BindingSetId, BufferSizeInfo, ComputeShader, Settings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Clear,
    Prepare,

    /// Non-adaptive occlusion feeding the importance map; adaptive quality
    /// only.
    GenerateBase,

    ImportanceMap,
    PostprocessImportanceMapA,
    PostprocessImportanceMapB,
    Generate,
    EdgeSensitiveBlur,
    Apply,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub stage: Stage,
    pub shader: ComputeShader,
    pub binding_set: BindingSetId,
    pub groups: UVec3,
}

impl Dispatch {
    /// Quadrant this dispatch works on, if any.
    pub fn pass(&self) -> Option<u32> {
        self.binding_set.desc().pass
    }
}

/// Ordered list of dispatches making up a single frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FramePlan {
    dispatches: Vec<Dispatch>,
}

impl FramePlan {
    pub fn new(settings: &Settings, bsi: &BufferSizeInfo) -> Self {
        let mut dispatches = Vec::new();

        clear::plan(&mut dispatches);
        prepare::plan(settings, bsi, &mut dispatches);

        if settings.quality_level.is_adaptive() {
            generate::plan_base(bsi, &mut dispatches);
            importance_map::plan(bsi, &mut dispatches);
        }

        generate::plan(settings, bsi, &mut dispatches);
        blur::plan(settings, bsi, &mut dispatches);
        apply::plan(settings, bsi, &mut dispatches);

        debug!(
            "Planned frame: quality={:?}, blur_passes={}, downsampled={}, \
             dispatches={}",
            settings.quality_level,
            settings.blur_pass_count,
            bsi.downsampled,
            dispatches.len()
        );

        Self { dispatches }
    }

    pub fn dispatches(&self) -> &[Dispatch] {
        &self.dispatches
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.dispatches
            .iter()
            .filter(|dispatch| dispatch.stage == stage)
            .count()
    }

    pub fn binding_sets(&self) -> impl Iterator<Item = BindingSetId> + '_ {
        self.dispatches.iter().map(|dispatch| dispatch.binding_set)
    }
}

/// Quadrants processed at given settings.
fn passes(settings: &Settings) -> impl Iterator<Item = u32> + '_ {
    (0..gpu::QUADRANT_COUNT as u32)
        .filter(|&pass| !settings.quality_level.skips_quadrant(pass))
}
