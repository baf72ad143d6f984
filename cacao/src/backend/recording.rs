use fxhash::FxHashMap;
use glam::UVec3;

use crate::{
    Backend, Barrier, BindGroupDesc, BindingSetId, ComputeShader, Error,
    Result, TextureDesc, ViewDesc,
};

/// Backend that doesn't talk to any GPU; it records every command and keeps
/// track of live objects instead.
///
/// Useful for testing and for inspecting what a frame consists of.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u64,
    objects: FxHashMap<u64, Object>,
    allocations_left: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Texture(TextureDesc),
    View { texture: u64, desc: ViewDesc },
    Buffer { size: usize },
    BindGroup(BindingSetId),
}

#[derive(Debug)]
pub struct RecordedTexture(u64);

#[derive(Debug)]
pub struct RecordedView(u64);

#[derive(Debug)]
pub struct RecordedBuffer(u64);

#[derive(Debug)]
pub struct RecordedBindGroup {
    id: u64,
    binding_set: BindingSetId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    WriteBuffer {
        buffer: u64,
        data: Vec<u8>,
    },
    Barrier(Vec<Barrier>),
    Dispatch {
        shader: ComputeShader,
        binding_set: BindingSetId,
        groups: UVec3,
    },
}

/// Commands recorded into a single context, in order.
#[derive(Clone, Debug, Default)]
pub struct CommandLog {
    pub commands: Vec<Command>,
}

impl CommandLog {
    pub fn dispatches(
        &self,
    ) -> impl Iterator<Item = (ComputeShader, BindingSetId, UVec3)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            Command::Dispatch {
                shader,
                binding_set,
                groups,
            } => Some((*shader, *binding_set, *groups)),
            _ => None,
        })
    }

    pub fn barriers(&self) -> impl Iterator<Item = &Barrier> + '_ {
        self.commands.iter().flat_map(|command| match command {
            Command::Barrier(barriers) => barriers.as_slice(),
            _ => &[][..],
        })
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RecordingBackend {
    /// Makes every allocation after the next `n` ones fail with
    /// [`Error::OutOfMemory`].
    pub fn fail_allocations_after(&mut self, n: usize) {
        self.allocations_left = Some(n);
    }

    pub fn stop_failing_allocations(&mut self) {
        self.allocations_left = None;
    }

    /// Number of objects created and not destroyed yet.
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn texture_desc(
        &self,
        texture: &RecordedTexture,
    ) -> Option<&TextureDesc> {
        match self.objects.get(&texture.0) {
            Some(Object::Texture(desc)) => Some(desc),
            _ => None,
        }
    }

    pub fn buffer_id(&self, buffer: &RecordedBuffer) -> u64 {
        buffer.0
    }

    fn allocate(&mut self, object: Object) -> Result<u64> {
        if let Some(allocations_left) = &mut self.allocations_left {
            if *allocations_left == 0 {
                return Err(Error::OutOfMemory(format!(
                    "injected allocation failure: {object:?}"
                )));
            }

            *allocations_left -= 1;
        }

        let id = self.next_id;

        self.next_id += 1;
        self.objects.insert(id, object);

        Ok(id)
    }

    fn release(&mut self, id: u64) {
        let object = self.objects.remove(&id);

        debug_assert!(object.is_some(), "object #{id} released twice");
    }

    fn ensure_live(&self, id: u64, what: &'static str) -> Result<()> {
        if self.objects.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::InvalidPointer(what))
        }
    }
}

impl Backend for RecordingBackend {
    type Texture = RecordedTexture;
    type View = RecordedView;
    type Buffer = RecordedBuffer;
    type BindGroup = RecordedBindGroup;
    type CommandContext = CommandLog;

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Self::Texture> {
        if desc.size.x == 0 || desc.size.y == 0 || desc.layers == 0 {
            return Err(Error::InvalidArgument(format!(
                "texture `{}` has zero size",
                desc.label
            )));
        }

        self.allocate(Object::Texture(desc.clone()))
            .map(RecordedTexture)
    }

    fn destroy_texture(&mut self, texture: Self::Texture) {
        self.release(texture.0);
    }

    fn create_view(
        &mut self,
        texture: &Self::Texture,
        label: &str,
        desc: &ViewDesc,
    ) -> Result<Self::View> {
        let Some(texture_desc) = self.texture_desc(texture) else {
            return Err(Error::InvalidPointer("view's texture"));
        };

        if desc.base_mip + desc.mip_count > texture_desc.mips
            || desc.base_layer + desc.layer_count > texture_desc.layers
        {
            return Err(Error::InvalidArgument(format!(
                "view `{label}` is out of its texture's bounds"
            )));
        }

        self.allocate(Object::View {
            texture: texture.0,
            desc: *desc,
        })
        .map(RecordedView)
    }

    fn destroy_view(&mut self, view: Self::View) {
        self.release(view.0);
    }

    fn create_buffer(
        &mut self,
        _label: &str,
        size: usize,
    ) -> Result<Self::Buffer> {
        self.allocate(Object::Buffer { size }).map(RecordedBuffer)
    }

    fn destroy_buffer(&mut self, buffer: Self::Buffer) {
        self.release(buffer.0);
    }

    fn write_buffer(
        &mut self,
        ctx: &mut Self::CommandContext,
        buffer: &Self::Buffer,
        data: &[u8],
    ) {
        debug_assert!(matches!(
            self.objects.get(&buffer.0),
            Some(Object::Buffer { size }) if *size >= data.len()
        ));

        ctx.commands.push(Command::WriteBuffer {
            buffer: buffer.0,
            data: data.to_vec(),
        });
    }

    fn create_bind_group(
        &mut self,
        desc: &BindGroupDesc<'_, Self>,
    ) -> Result<Self::BindGroup> {
        self.ensure_live(desc.frame_constants.0, "frame constants")?;
        self.ensure_live(desc.pass_constants.0, "pass constants")?;

        for view in desc.inputs.iter().chain(&desc.outputs) {
            self.ensure_live(view.view.0, "bound view")?;
        }

        let binding_set = desc.set.id;

        self.allocate(Object::BindGroup(binding_set))
            .map(|id| RecordedBindGroup { id, binding_set })
    }

    fn destroy_bind_group(&mut self, bind_group: Self::BindGroup) {
        self.release(bind_group.id);
    }

    fn dispatch(
        &mut self,
        ctx: &mut Self::CommandContext,
        shader: ComputeShader,
        bind_group: &Self::BindGroup,
        groups: UVec3,
    ) -> Result<()> {
        self.ensure_live(bind_group.id, "bind group")?;

        ctx.commands.push(Command::Dispatch {
            shader,
            binding_set: bind_group.binding_set,
            groups,
        });

        Ok(())
    }

    fn barrier(
        &mut self,
        ctx: &mut Self::CommandContext,
        barriers: &[Barrier],
    ) {
        ctx.commands.push(Command::Barrier(barriers.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;
    use crate::{Access, Format, ViewDimension};

    fn texture_desc() -> TextureDesc {
        TextureDesc {
            label: "test",
            size: uvec2(16, 16),
            layers: 4,
            mips: 2,
            format: Format::R16Float,
        }
    }

    fn view_desc(base_mip: u32) -> ViewDesc {
        ViewDesc {
            access: Access::Sampled,
            dimension: ViewDimension::D2Array,
            format: Format::R16Float,
            base_mip,
            mip_count: 1,
            base_layer: 0,
            layer_count: 4,
        }
    }

    #[test]
    fn tracks_live_objects() {
        let mut target = RecordingBackend::default();

        let texture = target.create_texture(&texture_desc()).unwrap();
        let view = target.create_view(&texture, "view", &view_desc(1)).unwrap();
        let buffer = target.create_buffer("buffer", 64).unwrap();

        assert_eq!(3, target.live_objects());
        assert_eq!(Some(&texture_desc()), target.texture_desc(&texture));

        target.destroy_view(view);
        target.destroy_texture(texture);
        target.destroy_buffer(buffer);

        assert_eq!(0, target.live_objects());
    }

    #[test]
    fn rejects_out_of_bounds_views() {
        let mut target = RecordingBackend::default();
        let texture = target.create_texture(&texture_desc()).unwrap();

        let actual = target.create_view(&texture, "view", &view_desc(2));

        assert!(matches!(actual, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn injected_allocation_failures() {
        let mut target = RecordingBackend::default();

        target.fail_allocations_after(1);

        assert!(target.create_buffer("a", 16).is_ok());

        assert!(matches!(
            target.create_buffer("b", 16),
            Err(Error::OutOfMemory(_))
        ));

        target.stop_failing_allocations();

        assert!(target.create_buffer("c", 16).is_ok());
        assert_eq!(2, target.live_objects());
    }

    #[test]
    fn records_commands() {
        let mut target = RecordingBackend::default();
        let mut log = CommandLog::default();
        let buffer = target.create_buffer("buffer", 4).unwrap();

        target.write_buffer(&mut log, &buffer, &[1, 2, 3, 4]);
        target.barrier(&mut log, &[]);

        assert_eq!(
            vec![
                Command::WriteBuffer {
                    buffer: target.buffer_id(&buffer),
                    data: vec![1, 2, 3, 4],
                },
                Command::Barrier(vec![]),
            ],
            log.commands
        );

        assert_eq!(0, log.dispatches().count());
        assert_eq!(0, log.barriers().count());
    }
}
