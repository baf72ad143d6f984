use std::mem;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::{Mat4, UVec2};
use log::{debug, info, trace};

use crate::{
    frame_constants, gpu, metrics, pass_constants, Backend, BarrierTracker,
    BindGroupDesc, BindingSetId, BoundView, BufferSizeInfo, Error,
    ExternalTexture, FramePlan, Resource, Result, ScreenInputs, Settings,
    TextureDesc, ViewDesc, ViewKey, BINDING_SETS,
};

/// Screen-space ambient occlusion pipeline.
///
/// Owns every intermediate texture and records the per-frame dispatches
/// through `B`. Lifecycle:
///
/// - [`Ssao::new()`] allocates the size-independent objects,
/// - [`Ssao::resize()`] (re)creates everything that depends on the output
///   resolution; it must succeed before the first [`Ssao::draw()`],
/// - [`Ssao::draw()`] records a single frame,
/// - [`Ssao::destroy()`] releases everything.
///
/// Destroying or resizing doesn't wait for the GPU; the caller must make sure
/// no in-flight work still references the old objects.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Ssao<B>
where
    B: Backend,
{
    settings: Settings,
    pending_settings: Option<Settings>,

    #[derivative(Debug = "ignore")]
    frame_constants: B::Buffer,

    #[derivative(Debug = "ignore")]
    pass_constants: Vec<B::Buffer>,

    #[derivative(Debug = "ignore")]
    load_counter: B::Texture,

    screen: Option<Screen<B>>,
    plan: Option<FramePlan>,
    barriers: BarrierTracker,
}

impl<B> Ssao<B>
where
    B: Backend,
{
    pub fn new(backend: &mut B) -> Result<Self> {
        info!("Initializing");

        let frame_constants = backend.create_buffer(
            "cacao_frame_constants",
            mem::size_of::<gpu::FrameConstants>(),
        )?;

        let mut pass_constants = Vec::new();

        for pass in 0..gpu::QUADRANT_COUNT {
            let buffer = backend.create_buffer(
                &format!("cacao_pass_constants_{pass}"),
                mem::size_of::<gpu::PassConstants>(),
            );

            match buffer {
                Ok(buffer) => {
                    pass_constants.push(buffer);
                }

                Err(err) => {
                    backend.destroy_buffer(frame_constants);

                    for buffer in pass_constants {
                        backend.destroy_buffer(buffer);
                    }

                    return Err(err);
                }
            }
        }

        let load_counter =
            match backend.create_texture(&TextureDesc::load_counter()) {
                Ok(load_counter) => load_counter,

                Err(err) => {
                    backend.destroy_buffer(frame_constants);

                    for buffer in pass_constants {
                        backend.destroy_buffer(buffer);
                    }

                    return Err(err);
                }
            };

        Ok(Self {
            settings: Default::default(),
            pending_settings: None,
            frame_constants,
            pass_constants,
            load_counter,
            screen: None,
            plan: None,
            barriers: Default::default(),
        })
    }

    /// (Re)creates the intermediate textures, views and bind groups for given
    /// output resolution.
    ///
    /// `inputs` are the host's depth (and normal) buffers, of the output
    /// resolution; the pipeline keeps views of them until the next resize, so
    /// they must outlive those.
    ///
    /// On failure the pipeline is left without a screen and [`Ssao::draw()`]
    /// refuses to run until a resize succeeds.
    pub fn resize(
        &mut self,
        backend: &mut B,
        size: UVec2,
        downsampled: bool,
        inputs: ScreenInputs<'_, B::Texture>,
    ) -> Result<()> {
        info!("Resizing; size={size}, downsampled={downsampled}");

        if let Some(screen) = self.screen.take() {
            screen.destroy(backend);
        }

        // The load counter outlives screens, so its state stays valid
        self.barriers.forget(Resource::SCREEN);
        self.plan = None;

        let bsi = BufferSizeInfo::new(size, downsampled)?;

        let sized_inputs = [
            ("depth", Some(&inputs.depth)),
            ("normal", inputs.normals.as_ref()),
        ];

        for (name, input) in sized_inputs {
            if let Some(input) = input {
                if input.size != size {
                    return Err(Error::InvalidArgument(format!(
                        "{name} input is {}, expected {size}",
                        input.size
                    )));
                }
            }
        }

        self.screen = Some(Screen::new(
            backend,
            bsi,
            &inputs,
            &self.frame_constants,
            &self.pass_constants,
            &self.load_counter,
        )?);

        Ok(())
    }

    /// Schedules new settings; they get validated now and take effect on the
    /// next [`Ssao::draw()`].
    ///
    /// Out-of-range fields are clamped rather than rejected, so this always
    /// succeeds.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        let settings = settings.validated();

        if settings != self.settings || self.pending_settings.is_some() {
            debug!("Scheduling settings update: {settings:?}");

            self.pending_settings = Some(settings);
        }

        Ok(())
    }

    /// Settings used by the most recent (or next, if none was pending)
    /// [`Ssao::draw()`].
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn buffer_size_info(&self) -> Option<&BufferSizeInfo> {
        self.screen.as_ref().map(|screen| &screen.bsi)
    }

    /// Returns the occlusion texture; available after a successful resize.
    ///
    /// Its contents are valid only after a successful [`Ssao::draw()`].
    pub fn output(&self) -> Option<&B::Texture> {
        self.screen.as_ref()?.texture(Resource::Output)
    }

    /// Records a single frame into `ctx`.
    ///
    /// `projection` is the camera's projection matrix (depth in `[0, 1]`) and
    /// `normals_to_view` transforms the host's normals into viewspace.
    ///
    /// On error, the remaining dispatches are skipped and the output is left
    /// undefined for this frame.
    pub fn draw(
        &mut self,
        backend: &mut B,
        ctx: &mut B::CommandContext,
        projection: Mat4,
        normals_to_view: Mat4,
    ) -> Result<()> {
        metrics::measure("draw", || {
            self.try_draw(backend, ctx, projection, normals_to_view)
        })
    }

    fn try_draw(
        &mut self,
        backend: &mut B,
        ctx: &mut B::CommandContext,
        projection: Mat4,
        normals_to_view: Mat4,
    ) -> Result<()> {
        let Some(screen) = &self.screen else {
            return Err(Error::InvalidArgument(
                "draw() called before a successful resize()".into(),
            ));
        };

        if !projection.is_finite()
            || projection.x_axis.x == 0.0
            || projection.y_axis.y == 0.0
        {
            return Err(Error::InvalidArgument(format!(
                "invalid projection: {projection}"
            )));
        }

        if let Some(settings) = self.pending_settings.take() {
            debug!("Applying settings");

            self.settings = settings;
            self.plan = None;
        }

        if !self.settings.generate_normals && !screen.has_normals {
            return Err(Error::InvalidPointer("normal input"));
        }

        let plan = self
            .plan
            .get_or_insert_with(|| FramePlan::new(&self.settings, &screen.bsi));

        let frame_constants = frame_constants(
            &self.settings,
            projection,
            normals_to_view,
            &screen.bsi,
        );

        backend.write_buffer(
            ctx,
            &self.frame_constants,
            bytemuck::bytes_of(&frame_constants),
        );

        let mut pass_constants_written = [false; gpu::QUADRANT_COUNT];

        for dispatch in plan.dispatches() {
            let set = dispatch.binding_set.desc();

            if let Some(pass) = set.pass {
                let written = &mut pass_constants_written[pass as usize];

                if !mem::replace(written, true) {
                    let pass_constants =
                        pass_constants(&self.settings, &screen.bsi, pass);

                    backend.write_buffer(
                        ctx,
                        &self.pass_constants[pass as usize],
                        bytemuck::bytes_of(&pass_constants),
                    );
                }
            }

            let barriers = self.barriers.transition(dispatch.stage, set);

            if !barriers.is_empty() {
                backend.barrier(ctx, &barriers);
            }

            let bind_group =
                screen.bind_groups.get(&dispatch.binding_set).ok_or_else(
                    || {
                        Error::Failed(format!(
                            "bind group `{}` is missing",
                            set.name
                        ))
                    },
                )?;

            trace!(
                "Dispatching `{}` with `{}`; groups={}",
                dispatch.shader.name(),
                set.name,
                dispatch.groups
            );

            backend.dispatch(
                ctx,
                dispatch.shader,
                bind_group,
                dispatch.groups,
            )?;
        }

        let barriers = self.barriers.finish();

        if !barriers.is_empty() {
            backend.barrier(ctx, &barriers);
        }

        Ok(())
    }

    /// Releases every object owned by the pipeline.
    pub fn destroy(self, backend: &mut B) {
        info!("Destroying");

        if let Some(screen) = self.screen {
            screen.destroy(backend);
        }

        backend.destroy_texture(self.load_counter);
        backend.destroy_buffer(self.frame_constants);

        for buffer in self.pass_constants {
            backend.destroy_buffer(buffer);
        }
    }
}

/// Objects tied to a particular output resolution.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
struct Screen<B>
where
    B: Backend,
{
    bsi: BufferSizeInfo,
    has_normals: bool,

    #[derivative(Debug = "ignore")]
    textures: Vec<(Resource, B::Texture)>,

    #[derivative(Debug = "ignore")]
    views: FxHashMap<ViewKey, (B::View, ViewDesc)>,

    #[derivative(Debug = "ignore")]
    bind_groups: FxHashMap<BindingSetId, B::BindGroup>,
}

impl<B> Screen<B>
where
    B: Backend,
{
    fn new(
        backend: &mut B,
        bsi: BufferSizeInfo,
        inputs: &ScreenInputs<'_, B::Texture>,
        frame_constants: &B::Buffer,
        pass_constants: &[B::Buffer],
        load_counter: &B::Texture,
    ) -> Result<Self> {
        let mut this = Self {
            bsi,
            has_normals: inputs.normals.is_some(),
            textures: Default::default(),
            views: Default::default(),
            bind_groups: Default::default(),
        };

        let result = this.build(
            backend,
            inputs,
            frame_constants,
            pass_constants,
            load_counter,
        );

        match result {
            Ok(()) => {
                debug!(
                    "Screen ready; textures={}, views={}, bind_groups={}",
                    this.textures.len(),
                    this.views.len(),
                    this.bind_groups.len()
                );

                Ok(this)
            }

            Err(err) => {
                this.destroy(backend);

                Err(err)
            }
        }
    }

    fn build(
        &mut self,
        backend: &mut B,
        inputs: &ScreenInputs<'_, B::Texture>,
        frame_constants: &B::Buffer,
        pass_constants: &[B::Buffer],
        load_counter: &B::Texture,
    ) -> Result<()> {
        for resource in Resource::SCREEN {
            let Some(desc) = resource.texture_desc(&self.bsi) else {
                continue;
            };

            let texture = backend.create_texture(&desc)?;

            self.textures.push((resource, texture));
        }

        for set in &BINDING_SETS {
            if set.uses(Resource::NormalInput) && inputs.normals.is_none() {
                continue;
            }

            for key in set.views() {
                if self.views.contains_key(&key) {
                    continue;
                }

                let (texture, texture_desc) = match key.resource {
                    Resource::DepthInput => external(&inputs.depth, key),
                    Resource::NormalInput => match &inputs.normals {
                        Some(normals) => external(normals, key),
                        None => return Err(Error::InvalidPointer("normals")),
                    },
                    Resource::LoadCounter => {
                        (load_counter, TextureDesc::load_counter())
                    }
                    resource => {
                        let texture = self
                            .textures
                            .iter()
                            .find(|(r, _)| *r == resource)
                            .map(|(_, texture)| texture)
                            .ok_or_else(|| {
                                Error::Failed(format!(
                                    "texture `{}` is missing",
                                    resource.label()
                                ))
                            })?;

                        (texture, owned_desc(resource, &self.bsi)?)
                    }
                };

                let desc = key.view_desc(&texture_desc);
                let label = view_label(key);
                let view = backend.create_view(texture, &label, &desc)?;

                self.views.insert(key, (view, desc));
            }

            let desc = BindGroupDesc::<B> {
                set,
                frame_constants,
                pass_constants: &pass_constants[set.pass_constants_index()],
                inputs: bound_views::<B>(&self.views, set.input_slots())?,
                outputs: bound_views::<B>(&self.views, set.output_slots())?,
            };

            let bind_group = backend.create_bind_group(&desc)?;

            self.bind_groups.insert(set.id, bind_group);
        }

        Ok(())
    }

    fn texture(&self, resource: Resource) -> Option<&B::Texture> {
        self.textures
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, texture)| texture)
    }

    fn destroy(self, backend: &mut B) {
        for (_, bind_group) in self.bind_groups {
            backend.destroy_bind_group(bind_group);
        }

        for (_, (view, _)) in self.views {
            backend.destroy_view(view);
        }

        for (_, texture) in self.textures {
            backend.destroy_texture(texture);
        }
    }
}

fn external<'a, T>(
    input: &ExternalTexture<'a, T>,
    key: ViewKey,
) -> (&'a T, TextureDesc) {
    (input.texture, input.desc(key.resource))
}

fn bound_views<B>(
    views: &FxHashMap<ViewKey, (B::View, ViewDesc)>,
    slots: impl Iterator<Item = (u32, ViewKey)>,
) -> Result<Vec<BoundView<'_, B>>>
where
    B: Backend,
{
    slots
        .map(|(slot, key)| {
            let (view, desc) = views.get(&key).ok_or_else(|| {
                Error::Failed(format!("view `{}` is missing", view_label(key)))
            })?;

            Ok(BoundView {
                slot,
                view,
                desc: *desc,
            })
        })
        .collect()
}

fn owned_desc(resource: Resource, bsi: &BufferSizeInfo) -> Result<TextureDesc> {
    resource.texture_desc(bsi).ok_or_else(|| {
        Error::Failed(format!("`{}` has no texture", resource.label()))
    })
}

fn view_label(key: ViewKey) -> String {
    format!(
        "{}_{:?}_{:?}",
        key.resource.label(),
        key.access,
        key.subresource
    )
    .to_lowercase()
}
