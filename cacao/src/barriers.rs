use fxhash::FxHashMap;
use log::trace;

use crate::{BindingSetDesc, Resource, Stage};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceState {
    #[default]
    Undefined,
    Read,
    Write,
}

/// Transition of a pipeline-owned texture between two states.
///
/// `Write -> Write` stands for an unordered-access barrier: both accesses are
/// writes, but the later one must observe the earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barrier {
    pub resource: Resource,
    pub before: ResourceState,
    pub after: ResourceState,
}

#[derive(Clone, Copy, Debug, Default)]
struct Tracked {
    state: ResourceState,
    writer: Option<Stage>,
}

/// Remembers the last access of each pipeline-owned texture and derives the
/// barriers needed before the next one.
///
/// Host-supplied textures are not tracked; their transitions are up to the
/// host.
#[derive(Clone, Debug, Default)]
pub struct BarrierTracker {
    resources: FxHashMap<Resource, Tracked>,
}

impl BarrierTracker {
    pub fn state(&self, resource: Resource) -> ResourceState {
        self.resources
            .get(&resource)
            .map(|tracked| tracked.state)
            .unwrap_or_default()
    }

    /// Forgets given resources; used after their textures get recreated.
    pub fn forget(&mut self, resources: impl IntoIterator<Item = Resource>) {
        for resource in resources {
            self.resources.remove(&resource);
        }
    }

    /// Returns barriers required before `stage` dispatches `set` and marks
    /// the set's resources as read or written.
    pub fn transition(
        &mut self,
        stage: Stage,
        set: &BindingSetDesc,
    ) -> Vec<Barrier> {
        let mut barriers = Vec::new();

        for view in set.inputs {
            self.access(
                stage,
                view.resource,
                ResourceState::Read,
                &mut barriers,
            );
        }

        for view in set.outputs {
            self.access(
                stage,
                view.resource,
                ResourceState::Write,
                &mut barriers,
            );
        }

        if !barriers.is_empty() {
            trace!("Barriers before `{}`: {:?}", set.name, barriers);
        }

        barriers
    }

    /// Returns barriers making the output readable by the host.
    pub fn finish(&mut self) -> Vec<Barrier> {
        let mut barriers = Vec::new();

        let tracked = self.resources.entry(Resource::Output).or_default();

        if tracked.state != ResourceState::Read {
            barriers.push(Barrier {
                resource: Resource::Output,
                before: tracked.state,
                after: ResourceState::Read,
            });

            tracked.state = ResourceState::Read;
            tracked.writer = None;
        }

        barriers
    }

    fn access(
        &mut self,
        stage: Stage,
        resource: Resource,
        state: ResourceState,
        barriers: &mut Vec<Barrier>,
    ) {
        if resource.is_external()
            || barriers.iter().any(|barrier| barrier.resource == resource)
        {
            return;
        }

        let tracked = self.resources.entry(resource).or_default();

        let needs_barrier = match (tracked.state, state) {
            (ResourceState::Write, ResourceState::Write) => {
                tracked.writer != Some(stage)
            }
            (before, after) => before != after,
        };

        if needs_barrier {
            barriers.push(Barrier {
                resource,
                before: tracked.state,
                after: state,
            });
        }

        tracked.state = state;

        if state == ResourceState::Write {
            tracked.writer = Some(stage);
        } else {
            tracked.writer = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BindingSetId;

    fn barrier(
        resource: Resource,
        before: ResourceState,
        after: ResourceState,
    ) -> Barrier {
        Barrier {
            resource,
            before,
            after,
        }
    }

    #[test]
    fn first_write() {
        let mut target = BarrierTracker::default();

        let actual = target
            .transition(Stage::Clear, BindingSetId::ClearLoadCounter.desc());

        assert_eq!(
            vec![barrier(
                Resource::LoadCounter,
                ResourceState::Undefined,
                ResourceState::Write
            )],
            actual
        );

        assert_eq!(ResourceState::Write, target.state(Resource::LoadCounter));
    }

    #[test]
    fn written_then_read() {
        let mut target = BarrierTracker::default();

        target.transition(Stage::Generate, BindingSetId::generate(0).desc());

        let actual = target.transition(
            Stage::EdgeSensitiveBlur,
            BindingSetId::edge_sensitive_blur(0).desc(),
        );

        assert_eq!(
            vec![
                barrier(
                    Resource::SsaoBufferPing,
                    ResourceState::Write,
                    ResourceState::Read
                ),
                barrier(
                    Resource::SsaoBufferPong,
                    ResourceState::Undefined,
                    ResourceState::Write
                ),
            ],
            actual
        );
    }

    #[test]
    fn writes_within_a_stage_need_no_barrier() {
        let mut target = BarrierTracker::default();

        target.transition(Stage::Prepare, BindingSetId::PrepareDepths.desc());
        target.transition(Stage::Prepare, BindingSetId::PrepareNormals.desc());

        for pass in 0..4 {
            let set = BindingSetId::generate(pass).desc();
            let actual = target.transition(Stage::Generate, set);

            let ping_barriers = actual
                .iter()
                .filter(|b| b.resource == Resource::SsaoBufferPing)
                .count();

            assert_eq!(if pass == 0 { 1 } else { 0 }, ping_barriers);
        }
    }

    #[test]
    fn writes_across_stages_get_unordered_access_barrier() {
        let mut target = BarrierTracker::default();

        target.transition(Stage::Clear, BindingSetId::ClearLoadCounter.desc());

        target.transition(
            Stage::ImportanceMap,
            BindingSetId::GenerateImportanceMap.desc(),
        );

        target.transition(
            Stage::PostprocessImportanceMapA,
            BindingSetId::PostprocessImportanceMapA.desc(),
        );

        let actual = target.transition(
            Stage::PostprocessImportanceMapB,
            BindingSetId::PostprocessImportanceMapB.desc(),
        );

        assert!(actual.contains(&barrier(
            Resource::LoadCounter,
            ResourceState::Write,
            ResourceState::Write
        )));

        assert!(actual.contains(&barrier(
            Resource::ImportanceMap,
            ResourceState::Read,
            ResourceState::Write
        )));

        assert!(actual.contains(&barrier(
            Resource::ImportanceMapPong,
            ResourceState::Write,
            ResourceState::Read
        )));
    }

    #[test]
    fn reads_after_reads_need_no_barrier() {
        let mut target = BarrierTracker::default();

        target.transition(Stage::Apply, BindingSetId::ApplyPing.desc());

        let actual =
            target.transition(Stage::Apply, BindingSetId::ApplyPing.desc());

        // Output is written twice by the same stage, ping is read twice
        assert!(actual.is_empty());
    }

    #[test]
    fn external_resources_are_skipped() {
        let mut target = BarrierTracker::default();

        let set = BindingSetId::PrepareDepths.desc();
        let actual = target.transition(Stage::Prepare, set);

        assert!(actual.iter().all(|b| !b.resource.is_external()));
        assert_eq!(1, actual.len());
        assert_eq!(
            ResourceState::Undefined,
            target.state(Resource::DepthInput)
        );
    }

    #[test]
    fn repeated_views_get_one_barrier() {
        let mut target = BarrierTracker::default();

        let actual = target.transition(
            Stage::Prepare,
            BindingSetId::PrepareDepthsMips.desc(),
        );

        assert_eq!(
            vec![barrier(
                Resource::DeinterleavedDepths,
                ResourceState::Undefined,
                ResourceState::Write
            )],
            actual
        );
    }

    #[test]
    fn finish() {
        let mut target = BarrierTracker::default();

        target.transition(Stage::Apply, BindingSetId::ApplyPing.desc());

        assert_eq!(
            vec![barrier(
                Resource::Output,
                ResourceState::Write,
                ResourceState::Read
            )],
            target.finish()
        );

        assert!(target.finish().is_empty());

        let actual =
            target.transition(Stage::Apply, BindingSetId::ApplyPing.desc());

        assert_eq!(
            vec![barrier(
                Resource::Output,
                ResourceState::Read,
                ResourceState::Write
            )],
            actual
        );
    }

    #[test]
    fn forget() {
        let mut target = BarrierTracker::default();

        target.transition(Stage::Clear, BindingSetId::ClearLoadCounter.desc());
        target.transition(Stage::Apply, BindingSetId::ApplyPing.desc());
        target.forget(Resource::SCREEN);

        assert_eq!(ResourceState::Undefined, target.state(Resource::Output));

        assert_eq!(
            ResourceState::Undefined,
            target.state(Resource::SsaoBufferPing)
        );

        assert_eq!(
            ResourceState::Write,
            target.state(Resource::LoadCounter)
        );
    }
}
