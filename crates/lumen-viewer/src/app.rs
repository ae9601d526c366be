use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use lumen_engine::camera::Movement;
use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::frame::Renderer;
use lumen_engine::input::Key;
use lumen_engine::math::{Mat4, Transform};
use lumen_engine::sprite::{parse_sprite_instances, SpriteData};

use crate::Cli;

const WALL_TEXTURES: [&str; 8] = [
    "greystone",
    "wood",
    "mossy",
    "purplestone",
    "redbrick",
    "colorstone",
    "bluestone",
    "eagle",
];

const SPRITE_TEXTURES: [&str; 17] = [
    "barrel",
    "pillar",
    "greenlight",
    "demon",
    "bullet",
    "enemy1",
    "enemy2",
    "enemy3",
    "enemy4",
    "shotgun1",
    "shotgun2",
    "shotgun3",
    "shotgun4",
    "shotgun5",
    "shotgun6",
    "shotgun7",
    "shotgun8",
];

const MOVE_KEYS: [(Key, Movement); 4] = [
    (Key::W, Movement::Forward),
    (Key::S, Movement::Backward),
    (Key::A, Movement::Left),
    (Key::D, Movement::Right),
];

/// Distance in front of the camera at which models are laid out.
const MODEL_DEPTH: f32 = 3.0;
const MODEL_SPACING: f32 = 2.5;

pub struct ViewerApp {
    cli: Cli,
}

impl ViewerApp {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    fn load_scene(&self, renderer: &mut Renderer<'_>) -> anyhow::Result<()> {
        let loaded = load_models(&self.cli.models, &self.cli.textures, |path, texture, transform| {
            renderer.load_model(path, texture, transform)
        });
        log::info!("{loaded} of {} models loaded", self.cli.models.len());
        renderer.upload_models_data().context("failed to upload models")?;
        renderer.print_model_data();
        Ok(())
    }

    fn load_raycaster(&self, renderer: &mut Renderer<'_>) -> anyhow::Result<()> {
        let dir = &self.cli.asset_dir;
        let texture = |name: &str| dir.join(format!("{name}.png"));
        let walls: Vec<PathBuf> = WALL_TEXTURES.iter().map(|n| texture(n)).collect();
        let sprites: Vec<PathBuf> = SPRITE_TEXTURES.iter().map(|n| texture(n)).collect();

        let instances = match &self.cli.sprites {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read sprites {}", path.display()))?;
                parse_sprite_instances(&text)
            }
            None => default_sprites(),
        };

        renderer
            .load_raycaster_assets(&walls, &sprites, instances)
            .context("failed to load raycaster assets")?;
        renderer.print_model_data();
        Ok(())
    }
}

/// Loads each model in a row in front of the camera. A model that fails to
/// import is logged and skipped; returns how many loaded.
fn load_models<E: fmt::Display>(
    models: &[PathBuf],
    textures: &[PathBuf],
    mut load: impl FnMut(&Path, Option<&Path>, Mat4) -> Result<usize, E>,
) -> usize {
    let count = models.len();
    let mut loaded = 0;
    for (i, path) in models.iter().enumerate() {
        let offset = (i as f32 - (count as f32 - 1.0) * 0.5) * MODEL_SPACING;
        let transform = Transform::new().at(offset, 0.0, MODEL_DEPTH).to_matrix();
        let texture = textures.get(i).map(PathBuf::as_path);
        match load(path, texture, transform) {
            Ok(_) => loaded += 1,
            Err(err) => log::warn!("skipping {}: {err}", path.display()),
        }
    }
    loaded
}

/// A few props around the start position plus the weapon overlay. Textures
/// index the atlas, whose sprite entries follow the eight wall textures.
fn default_sprites() -> Vec<SpriteData> {
    vec![
        SpriteData::at(3.5, 7.5, 8),
        SpriteData::at(3.5, 5.5, 11),
        SpriteData::at(3.5, 3.5, 9),
        SpriteData::at(7.5, 3.5, 8),
        SpriteData::at(5.5, 5.5, 10),
        SpriteData {
            is_ui: 1,
            ..SpriteData::at(0.0, 0.0, 17)
        },
    ]
}

impl App for ViewerApp {
    fn on_ready(&mut self, renderer: &mut Renderer<'_>) -> anyhow::Result<()> {
        if renderer.mode().is_scene_mode() {
            self.load_scene(renderer)
        } else {
            self.load_raycaster(renderer)
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        if ctx.input_frame.key_pressed(Key::M) {
            match ctx.renderer.map_overlay() {
                Some(map) => log::info!("map:\n{map}"),
                None => log::info!("no map in {} mode", ctx.renderer.mode()),
            }
        }

        let dt = ctx.time.dt;
        for (key, movement) in MOVE_KEYS {
            if ctx.input.key_down(key) {
                ctx.renderer.move_view(movement, dt);
            }
        }

        let input = ctx.view_input();
        ctx.renderer.update_view(&input);

        ctx.present()
    }
}

#[cfg(test)]
mod tests {
    use lumen_engine::assets::AssetError;
    use lumen_engine::frame::FrameError;

    use super::*;

    #[test]
    fn failed_import_is_skipped_and_the_rest_load() {
        let models: Vec<PathBuf> = ["a.obj", "missing.obj", "c.obj"].iter().map(PathBuf::from).collect();
        let mut seen = Vec::new();

        let loaded = load_models(&models, &[], |path, _, transform| {
            seen.push((path.to_path_buf(), transform.w_axis.x));
            if path.ends_with("missing.obj") {
                return Err(FrameError::Asset(AssetError::EmptyScene { path: path.to_path_buf() }));
            }
            Ok(seen.len() - 1)
        });

        assert_eq!(loaded, 2);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].1, -MODEL_SPACING);
        assert_eq!(seen[1].1, 0.0);
        assert_eq!(seen[2].1, MODEL_SPACING);
    }

    #[test]
    fn textures_pair_with_models_by_position() {
        let models = vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")];
        let textures = vec![PathBuf::from("a.png")];
        let mut paired = Vec::new();

        load_models(&models, &textures, |_, texture, _| {
            paired.push(texture.map(Path::to_path_buf));
            Ok::<_, FrameError>(0)
        });

        assert_eq!(paired, vec![Some(PathBuf::from("a.png")), None]);
    }

    #[test]
    fn default_sprites_fit_the_atlas() {
        let entries = (WALL_TEXTURES.len() + SPRITE_TEXTURES.len()) as u32;
        assert!(default_sprites().iter().all(|s| s.texture < entries));
        assert_eq!(default_sprites().iter().filter(|s| s.is_ui()).count(), 1);
    }
}
