use std::path::Path;

use glam::Mat4;
use winit::window::Window;

use crate::assets::{AssetError, ModelRegistry, ObjImporter, SceneImporter, TextureAtlas};
use crate::buffers::{BufferAccess, BufferRole, BufferSet, BufferSpec, ParamsUniform};
use crate::camera::{FreeCamera, GridPlayer, Movement, ViewController, ViewInput};
use crate::device::{DeviceContext, DeviceError, DeviceInit, SurfaceTarget};
use crate::mode::{RenderMode, Resolution};
use crate::program::{CompiledProgram, KernelId, ProgramLoader};
use crate::sprite::{SpriteData, SpriteOrder};

use super::{
    AccumulationState, Accumulator, FrameError, FrameStatus, Presenter, Readback, RendererConfig,
};

/// Per-mode host state.
enum ModeState {
    Rasterizer {
        camera: FreeCamera,
        models: ModelRegistry,
    },
    Raycaster {
        player: GridPlayer,
        atlas: TextureAtlas,
        sprites: Vec<SpriteData>,
        order: SpriteOrder,
    },
    Raytracer {
        camera: FreeCamera,
        models: ModelRegistry,
        accumulator: Accumulator,
    },
}

impl ModeState {
    fn new(config: &RendererConfig, resolution: Resolution) -> Self {
        match config.mode {
            RenderMode::Rasterizer => ModeState::Rasterizer {
                camera: FreeCamera::new(config.camera, resolution.aspect()),
                models: ModelRegistry::new(),
            },
            RenderMode::Raycaster => ModeState::Raycaster {
                player: GridPlayer::new(config.player, config.grid_map.clone())
                    .with_animation(config.ui_animation.clone()),
                atlas: TextureAtlas::new(),
                sprites: Vec::new(),
                order: SpriteOrder::with_capacity(config.sprite_capacity),
            },
            RenderMode::Raytracer => ModeState::Raytracer {
                camera: FreeCamera::new(config.camera, resolution.aspect()),
                models: ModelRegistry::new(),
                accumulator: Accumulator::new(),
            },
        }
    }

    fn mode(&self) -> RenderMode {
        match self {
            ModeState::Rasterizer { .. } => RenderMode::Rasterizer,
            ModeState::Raycaster { .. } => RenderMode::Raycaster,
            ModeState::Raytracer { .. } => RenderMode::Raytracer,
        }
    }

    fn controller(&self) -> &dyn ViewController {
        match self {
            ModeState::Rasterizer { camera, .. } | ModeState::Raytracer { camera, .. } => camera,
            ModeState::Raycaster { player, .. } => player,
        }
    }

    fn controller_mut(&mut self) -> &mut dyn ViewController {
        match self {
            ModeState::Rasterizer { camera, .. } | ModeState::Raytracer { camera, .. } => camera,
            ModeState::Raycaster { player, .. } => player,
        }
    }

    fn models(&self) -> Option<&ModelRegistry> {
        match self {
            ModeState::Rasterizer { models, .. } | ModeState::Raytracer { models, .. } => Some(models),
            ModeState::Raycaster { .. } => None,
        }
    }

    fn models_mut(&mut self) -> Option<&mut ModelRegistry> {
        match self {
            ModeState::Rasterizer { models, .. } | ModeState::Raytracer { models, .. } => Some(models),
            ModeState::Raycaster { .. } => None,
        }
    }
}

/// Owns every GPU resource of the session and runs the per-frame sequence.
///
/// Fields drop top to bottom: program, buffers, readback and presenter are
/// released before the device context.
pub struct Renderer<'w> {
    state: ModeState,
    params: ParamsUniform,
    resolution: Resolution,

    program: CompiledProgram,
    buffers: BufferSet,
    readback: Readback,
    presenter: Presenter<'w>,
    ctx: DeviceContext,
}

impl<'w> Renderer<'w> {
    /// Opens the device, builds the mode's program and allocates its buffers.
    ///
    /// The render resolution is the window's size at this point and stays
    /// fixed for the session.
    pub fn new(window: &'w Window, init: &DeviceInit, config: RendererConfig) -> Result<Self, FrameError> {
        let size = window.inner_size();
        let resolution = Resolution::new(size.width, size.height);

        let instance = DeviceContext::create_instance(init);
        let surface = instance.create_surface(window).map_err(DeviceError::from)?;
        let ctx = pollster::block_on(DeviceContext::init(instance, init, Some(&surface)))?;
        let target = SurfaceTarget::new(&ctx, surface, init, size.width, size.height)?;

        let mode = config.mode;
        let program = ProgramLoader::load(&ctx, mode, &config.kernel_path())?;

        let mut renderer = Self {
            state: ModeState::new(&config, resolution),
            params: ParamsUniform {
                width: resolution.width,
                height: resolution.height,
                background: config.background,
                ..Default::default()
            },
            resolution,
            program,
            buffers: BufferSet::new(),
            readback: Readback::new(ctx.device(), resolution.pixel_count()),
            presenter: Presenter::new(&ctx, target, resolution),
            ctx,
        };
        renderer.allocate()?;

        log::info!(
            "{mode} renderer ready at {}x{} ({} bytes of buffers)",
            resolution.width,
            resolution.height,
            renderer.buffers.total_bytes()
        );
        Ok(renderer)
    }

    /// Allocates the mode's buffers, uploads placeholders for asset-backed
    /// roles and binds every kernel, so the first draw is always valid.
    fn allocate(&mut self) -> Result<(), FrameError> {
        let device = self.ctx.device();
        let rasterizer = self.state.mode() == RenderMode::Rasterizer;
        for spec in self.state.mode().allocation_plan(self.resolution) {
            self.buffers.allocate(device, spec);
        }

        match &self.state {
            ModeState::Rasterizer { camera, models } | ModeState::Raytracer { camera, models, .. } => {
                upload_models(device, &mut self.buffers, models, rasterizer);
                self.buffers
                    .write_value(self.ctx.queue(), BufferRole::Camera, &camera.uniform())?;
            }
            ModeState::Raycaster {
                player,
                atlas,
                order,
                ..
            } => {
                let map = player.map();
                self.params.map_size = map.side() as u32;
                self.params.ui_frame = player.ui_frame();
                self.buffers.upload_slice(device, BufferRole::Grid, BufferAccess::ReadOnly, &map.gpu_cells());
                self.buffers
                    .upload_slice(device, BufferRole::Atlas, BufferAccess::ReadOnly, atlas.pixels());
                self.buffers
                    .upload_slice(device, BufferRole::Sprites, BufferAccess::ReadOnly, atlas.sprites());
                self.buffers.allocate(
                    device,
                    BufferSpec::array::<SpriteData>(
                        BufferRole::SpriteInstances,
                        BufferAccess::ReadOnly,
                        order.capacity(),
                    ),
                );
                self.buffers.allocate(
                    device,
                    BufferSpec::array::<u32>(BufferRole::SpriteOrder, BufferAccess::ReadOnly, order.capacity()),
                );
                self.buffers
                    .write_value(self.ctx.queue(), BufferRole::Player, &player.uniform())?;
            }
        }

        self.buffers
            .write_value(self.ctx.queue(), BufferRole::Params, &self.params)?;
        self.program.rebind_stale(device, &self.buffers)?;
        Ok(())
    }

    pub fn mode(&self) -> RenderMode {
        self.state.mode()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    pub fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    /// Host copy of the most recent frame, row 0 at the top.
    pub fn pixels(&self) -> &[u32] {
        self.readback.pixels()
    }

    // ── view ──────────────────────────────────────────────────────────────

    pub fn controller(&self) -> &dyn ViewController {
        self.state.controller()
    }

    pub fn move_view(&mut self, movement: Movement, dt: f32) {
        self.state.controller_mut().move_toward(movement, dt);
    }

    pub fn update_view(&mut self, input: &ViewInput) {
        self.state.controller_mut().update(input);
    }

    /// ASCII map with the player marked (raycaster only).
    pub fn map_overlay(&self) -> Option<String> {
        match &self.state {
            ModeState::Raycaster { player, .. } => Some(player.map().render_ascii(Some(player.position()))),
            _ => None,
        }
    }

    /// Clear colour of the rasterizer.
    pub fn set_background(&mut self, color: [f32; 4]) {
        self.params.background = color;
    }

    // ── scene assets ──────────────────────────────────────────────────────

    /// Loads an OBJ model; see [`load_model_with`](Self::load_model_with).
    pub fn load_model(
        &mut self,
        path: &Path,
        texture: Option<&Path>,
        transform: Mat4,
    ) -> Result<usize, FrameError> {
        self.load_model_with(&ObjImporter, path, texture, transform)
    }

    /// Appends a model to the registry. Takes effect after
    /// [`upload_models_data`](Self::upload_models_data).
    pub fn load_model_with(
        &mut self,
        importer: &dyn SceneImporter,
        path: &Path,
        texture: Option<&Path>,
        transform: Mat4,
    ) -> Result<usize, FrameError> {
        let mode = self.state.mode();
        let models = self.state.models_mut().ok_or(AssetError::Unsupported { mode, what: "models" })?;
        Ok(models.load_model(importer, path, texture, transform)?)
    }

    /// Replaces the geometry buffers with the registry contents and rebinds
    /// the kernels that read them.
    pub fn upload_models_data(&mut self) -> Result<(), FrameError> {
        let mode = self.state.mode();
        let device = self.ctx.device();
        let rasterizer = mode == RenderMode::Rasterizer;

        let models = match &mut self.state {
            ModeState::Rasterizer { models, .. } => models,
            ModeState::Raytracer {
                models, accumulator, ..
            } => {
                accumulator.invalidate();
                models
            }
            ModeState::Raycaster { .. } => {
                return Err(AssetError::Unsupported { mode, what: "models" }.into());
            }
        };

        upload_models(device, &mut self.buffers, models, rasterizer);
        models.mark_uploaded();
        self.params.vertex_count = models.vertex_count() as u32;
        self.params.model_count = models.model_count() as u32;

        let rebound = self.program.rebind_stale(device, &self.buffers)?;
        log::info!(
            "uploaded {} models ({} triangles), rebound {rebound} kernels",
            models.model_count(),
            models.triangle_count()
        );
        Ok(())
    }

    pub fn print_model_data(&self) {
        match &self.state {
            ModeState::Raycaster { atlas, sprites, .. } => {
                log::info!("{} atlas entries, {} texels, {} sprites", atlas.len(), atlas.pixels().len(), sprites.len());
            }
            state => {
                if let Some(models) = state.models() {
                    models.print_model_data();
                }
            }
        }
    }

    /// Drops every loaded model and uploads the empty registry.
    pub fn free_all_models(&mut self) -> Result<(), FrameError> {
        if let Some(models) = self.state.models_mut() {
            models.free_all();
        }
        self.upload_models_data()
    }

    // ── raycaster assets ──────────────────────────────────────────────────

    /// Builds the atlas from wall textures followed by sprite textures and
    /// installs the sprite instances.
    ///
    /// Map cell `c` uses atlas entry `c - 1`; sprite instances index the atlas
    /// directly, so sprite textures start at `wall_textures.len()`.
    pub fn load_raycaster_assets<P: AsRef<Path>>(
        &mut self,
        wall_textures: &[P],
        sprite_textures: &[P],
        instances: Vec<SpriteData>,
    ) -> Result<(), FrameError> {
        let mode = self.state.mode();
        let ModeState::Raycaster { atlas, order, .. } = &mut self.state else {
            return Err(AssetError::Unsupported { mode, what: "raycaster assets" }.into());
        };
        order.check(instances.len())?;

        let mut loaded = TextureAtlas::new();
        loaded.load(wall_textures)?;
        loaded.load(sprite_textures)?;
        *atlas = loaded;

        let device = self.ctx.device();
        self.buffers
            .upload_slice(device, BufferRole::Atlas, BufferAccess::ReadOnly, atlas.pixels());
        self.buffers
            .upload_slice(device, BufferRole::Sprites, BufferAccess::ReadOnly, atlas.sprites());
        log::info!("atlas: {} entries, {} texels", atlas.len(), atlas.pixels().len());

        self.set_sprites(instances)?;
        self.program.rebind_stale(self.ctx.device(), &self.buffers)?;
        Ok(())
    }

    /// Replaces the live sprite instances (raycaster).
    pub fn set_sprites(&mut self, instances: Vec<SpriteData>) -> Result<(), FrameError> {
        let mode = self.state.mode();
        let ModeState::Raycaster { sprites, order, .. } = &mut self.state else {
            return Err(AssetError::Unsupported { mode, what: "sprites" }.into());
        };
        order.check(instances.len())?;
        self.buffers
            .write(self.ctx.queue(), BufferRole::SpriteInstances, &instances)?;
        *sprites = instances;
        Ok(())
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Encodes the mode's dispatches, blocks on the color readback and
    /// presents the result.
    pub fn draw_frame(&mut self) -> Result<FrameStatus, FrameError> {
        let queue = self.ctx.queue();
        let moved = self.state.controller_mut().take_moved();
        let mut clear_accumulation = false;

        match &mut self.state {
            ModeState::Rasterizer { camera, models } => {
                warn_if_stale(models);
                if moved {
                    self.buffers.write_value(queue, BufferRole::Camera, &camera.uniform())?;
                }
            }
            ModeState::Raytracer {
                camera,
                models,
                accumulator,
            } => {
                warn_if_stale(models);
                if moved {
                    self.buffers.write_value(queue, BufferRole::Camera, &camera.uniform())?;
                }
                clear_accumulation = accumulator.advance(moved) == AccumulationState::Reset;
                self.params.frame_index = accumulator.frame_index();
            }
            ModeState::Raycaster {
                player,
                sprites,
                order,
                ..
            } => {
                if moved {
                    self.buffers.write_value(queue, BufferRole::Player, &player.uniform())?;
                }
                let indices = order.sort(player.position(), sprites)?;
                self.buffers.write(queue, BufferRole::SpriteOrder, indices)?;
                self.params.sprite_count = sprites.len() as u32;
                self.params.ui_frame = player.ui_frame();
            }
        }
        self.buffers.write_value(queue, BufferRole::Params, &self.params)?;

        let mut encoder = self
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen frame"),
            });

        let pixels = [self.resolution.width, self.resolution.height, 1];
        let columns = [self.resolution.width, 1, 1];
        match self.state.mode() {
            RenderMode::Rasterizer => {
                let vertices = [self.params.vertex_count, 1, 1];
                self.dispatch(&mut encoder, KernelId::ClearBuffers, pixels)?;
                self.dispatch(&mut encoder, KernelId::Vertex, vertices)?;
                self.dispatch(&mut encoder, KernelId::Fragment, pixels)?;
            }
            RenderMode::Raycaster => {
                self.dispatch(&mut encoder, KernelId::Surface, columns)?;
                self.dispatch(&mut encoder, KernelId::Sprites, columns)?;
            }
            RenderMode::Raytracer => {
                if clear_accumulation {
                    let accumulation = self.buffers.get(BufferRole::Accumulation)?;
                    encoder.clear_buffer(accumulation.raw(), 0, None);
                }
                self.dispatch(&mut encoder, KernelId::Fragment, pixels)?;
            }
        }

        let frame = self.buffers.get(BufferRole::Frame)?;
        self.readback.encode_copy(&mut encoder, frame.raw());
        queue.submit(std::iter::once(encoder.finish()));

        let pixels = self.readback.resolve(self.ctx.device())?;
        self.presenter.upload(queue, pixels);
        let status = self.presenter.present(&self.ctx)?;

        log::trace!("{} frame {} {status:?}", self.state.mode(), self.params.frame_index);
        Ok(status)
    }

    fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        id: KernelId,
        extent: [u32; 3],
    ) -> Result<(), FrameError> {
        let kernel = self.program.kernel(id)?;
        let bind_group = kernel.current_bind_group(&self.buffers)?;
        let [x, y, z] = kernel.layout().workgroups_for(extent);
        if x == 0 || y == 0 || z == 0 {
            return Ok(());
        }

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(id.entry_point()),
            timestamp_writes: None,
        });
        pass.set_pipeline(kernel.pipeline());
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(x, y, z);
        Ok(())
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.presenter.resize(&self.ctx, width, height);
    }

    /// Waits for the queue, then releases buffers, staging memory, the output
    /// texture and host-side assets. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Err(err) = self.ctx.wait_idle() {
            log::warn!("device did not drain before shutdown: {err}");
        }
        self.buffers.release_all();
        self.readback.destroy();
        self.presenter.destroy();
        if let Some(models) = self.state.models_mut() {
            models.free_all();
        }
        log::info!("{} renderer shut down", self.state.mode());
    }

    /// Shuts down and closes the device last.
    pub fn close(mut self) {
        self.shutdown();
        let Self {
            program,
            buffers,
            readback,
            presenter,
            ctx,
            ..
        } = self;
        drop(program);
        drop(buffers);
        drop(readback);
        drop(presenter);
        ctx.close();
    }
}

/// Uploads the registry arrays; the rasterizer also gets a projected-vertex
/// scratch buffer sized for every vertex.
fn upload_models(device: &wgpu::Device, buffers: &mut BufferSet, models: &ModelRegistry, rasterizer: bool) {
    buffers.upload_slice(device, BufferRole::Triangles, BufferAccess::ReadOnly, models.triangles());
    buffers.upload_slice(device, BufferRole::Models, BufferAccess::ReadOnly, models.models());
    buffers.upload_slice(device, BufferRole::TexturePixels, BufferAccess::ReadOnly, models.pixels());
    if rasterizer {
        buffers.allocate(
            device,
            BufferSpec::array::<[f32; 4]>(
                BufferRole::ProjectedVertices,
                BufferAccess::ReadWrite,
                models.vertex_count(),
            ),
        );
    }
}

fn warn_if_stale(models: &mut ModelRegistry) {
    if models.take_stale_notice() {
        log::warn!("drawing with models that were loaded but not uploaded");
    }
}
