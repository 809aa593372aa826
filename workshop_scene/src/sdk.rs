//! SDK entry points and builder for composing the workshop app.

use bevy::prelude::*;

use crate::camera::{camera_plugin, orbit_plugin, ZoomController};
use crate::config::{self, WorkshopConfig};
use crate::configure_sets;
use crate::flicker::{flicker_plugin, FlickerSeed, HumClip};
use crate::interaction::{interaction_plugin, ClickSound};
use crate::scene::{scene_plugin, ScenePath, ScreenTexture};
use crate::ui::hud_plugin;

/// Audio and image paths resolved at startup, once the asset server exists.
#[derive(Resource, Clone, Debug)]
struct WorkshopAssets {
    click_sound: String,
    hum_sound: Option<String>,
    screen_texture: Option<String>,
}

/// Builder for constructing the workshop app with customizable plugins.
pub struct WorkshopBuilder {
    config: WorkshopConfig,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_scene: bool,
    enable_orbit: bool,
    enable_flicker: bool,
    enable_hud: bool,
}

impl Default for WorkshopBuilder {
    fn default() -> Self {
        Self {
            config: WorkshopConfig::default(),
            window_title: "Kova Workshop".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb(0.02, 0.015, 0.01),
            enable_scene: true,
            enable_orbit: true,
            enable_flicker: true,
            enable_hud: true,
        }
    }
}

impl WorkshopBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration.
    pub fn config(mut self, config: WorkshopConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from environment variables.
    pub fn env_config(mut self) -> Self {
        self.config = config::workshop_config();
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Skip mounting the configured scene at startup.
    pub fn disable_scene(mut self) -> Self {
        self.enable_scene = false;
        self
    }

    pub fn disable_orbit(mut self) -> Self {
        self.enable_orbit = false;
        self
    }

    pub fn disable_flicker(mut self) -> Self {
        self.enable_flicker = false;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title.clone(),
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color));

        self.install(&mut app);
        app
    }

    /// Adds the workshop resources and plugins to an existing app.
    /// Without an asset server, assets are skipped and the logic still runs.
    pub fn install(self, app: &mut App) {
        let WorkshopConfig {
            scene_path,
            screen_texture,
            click_sound,
            hum_sound,
            seed,
            settings,
        } = self.config;

        configure_sets(app);
        app.insert_resource(ZoomController::new(&settings.camera))
            .insert_resource(FlickerSeed(seed))
            .insert_resource(settings)
            .insert_resource(WorkshopAssets {
                click_sound,
                hum_sound: self.enable_flicker.then_some(hum_sound),
                screen_texture,
            })
            .add_systems(Startup, load_workshop_assets);

        if self.enable_scene {
            app.insert_resource(ScenePath(scene_path));
        }

        app.add_plugins((camera_plugin, scene_plugin, interaction_plugin));

        if self.enable_orbit {
            app.add_plugins(orbit_plugin);
        }
        if self.enable_flicker {
            app.add_plugins(flicker_plugin);
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }
    }
}

fn load_workshop_assets(
    mut commands: Commands,
    assets: Res<WorkshopAssets>,
    asset_server: Option<Res<AssetServer>>,
) {
    let Some(asset_server) = asset_server else {
        warn!("no asset server, running without audio and screen texture");
        return;
    };

    commands.insert_resource(ClickSound::new(
        assets.click_sound.clone(),
        asset_server.load(assets.click_sound.clone()),
    ));
    if let Some(path) = &assets.hum_sound {
        commands.insert_resource(HumClip::new(path.clone(), asset_server.load(path.clone())));
    }
    if let Some(path) = &assets.screen_texture {
        info!("loading screen texture {path}");
        commands.insert_resource(ScreenTexture::load(&asset_server, path));
    }
}
