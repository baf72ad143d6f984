use glam::UVec3;

use crate::{BindingSetId, ComputeShader, Dispatch, Stage};

pub fn plan(dispatches: &mut Vec<Dispatch>) {
    dispatches.push(Dispatch {
        stage: Stage::Clear,
        shader: ComputeShader::ClearLoadCounter,
        binding_set: BindingSetId::ClearLoadCounter,
        groups: UVec3::ONE,
    });
}
