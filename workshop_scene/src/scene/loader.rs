use std::collections::{HashMap, HashSet};

use bevy::image::{ImageLoaderSettings, ImageSampler};
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

use super::{ScreenSurface, ScreenTextured, SceneReady, WorkshopRoot};
use crate::error::{load_failure, AssetError};

/// Scene handles keyed by asset path. Every mount reuses the handle,
/// so the glTF is parsed once and each mount gets its own instance.
#[derive(Resource, Default, Debug)]
pub struct SceneCache {
    scenes: HashMap<String, Handle<Scene>>,
    reported: HashSet<String>,
}

impl SceneCache {
    pub fn get_or_load(&mut self, asset_server: &AssetServer, path: &str) -> Handle<Scene> {
        if let Some(handle) = self.scenes.get(path) {
            return handle.clone();
        }
        let handle = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.to_string()));
        self.scenes.insert(path.to_string(), handle.clone());
        handle
    }

    pub fn get(&self, path: &str) -> Option<&Handle<Scene>> {
        self.scenes.get(path)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Scene mounted at startup.
#[derive(Resource, Clone, Debug)]
pub struct ScenePath(pub String);

/// Mounts an instance of the scene at `path`.
pub fn spawn_workshop(
    commands: &mut Commands,
    cache: &mut SceneCache,
    asset_server: &AssetServer,
    path: &str,
    transform: Transform,
) -> Entity {
    let handle = cache.get_or_load(asset_server, path);
    commands
        .spawn((
            WorkshopRoot {
                path: path.to_string(),
            },
            SceneRoot(handle),
            transform,
        ))
        .observe(mark_scene_ready)
        .id()
}

/// Unmounts an instance together with its lights, zones and outlines.
pub fn despawn_workshop(commands: &mut Commands, root: Entity) {
    commands.entity(root).despawn_recursive();
}

fn mark_scene_ready(trigger: Trigger<SceneInstanceReady>, mut commands: Commands) {
    debug!("scene instance {} ready", trigger.entity());
    commands.entity(trigger.entity()).insert(SceneReady);
}

pub fn spawn_configured_scene(
    mut commands: Commands,
    path: Option<Res<ScenePath>>,
    mut cache: ResMut<SceneCache>,
    asset_server: Option<Res<AssetServer>>,
) {
    let Some(path) = path else {
        return;
    };
    let Some(asset_server) = asset_server else {
        warn!("no asset server, scene {} not loaded", path.0);
        return;
    };
    info!("loading workshop scene {}", path.0);
    spawn_workshop(
        &mut commands,
        &mut cache,
        &asset_server,
        &path.0,
        Transform::default(),
    );
}

/// Logs each failed scene path once. Whatever already loaded stays up.
pub fn report_scene_failures(
    mut cache: ResMut<SceneCache>,
    asset_server: Option<Res<AssetServer>>,
) {
    let Some(asset_server) = asset_server else {
        return;
    };
    let SceneCache { scenes, reported } = &mut *cache;
    for (path, handle) in scenes.iter() {
        if reported.contains(path) {
            continue;
        }
        if let Some(reason) = load_failure(&asset_server, handle.id()) {
            let err = AssetError::Scene {
                path: path.clone(),
                reason,
            };
            warn!("{err}");
            reported.insert(path.clone());
        }
    }
}

/// Optional image shown on the monitor.
#[derive(Resource, Clone, Debug)]
pub struct ScreenTexture {
    pub path: String,
    pub handle: Handle<Image>,
    failure_reported: bool,
}

impl ScreenTexture {
    pub fn new(path: impl Into<String>, handle: Handle<Image>) -> Self {
        Self {
            path: path.into(),
            handle,
            failure_reported: false,
        }
    }

    /// Starts loading `path` with linear filtering.
    pub fn load(asset_server: &AssetServer, path: &str) -> Self {
        let handle = asset_server.load_with_settings(
            path.to_string(),
            |settings: &mut ImageLoaderSettings| {
                settings.sampler = ImageSampler::linear();
            },
        );
        Self::new(path, handle)
    }
}

/// Puts the screen texture on every screen surface once the image is loaded.
pub fn apply_screen_texture(
    mut commands: Commands,
    texture: Option<ResMut<ScreenTexture>>,
    images: Res<Assets<Image>>,
    asset_server: Option<Res<AssetServer>>,
    surfaces: Query<
        (Entity, &MeshMaterial3d<StandardMaterial>),
        (With<ScreenSurface>, Without<ScreenTextured>),
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(mut texture) = texture else {
        return;
    };

    if images.get(&texture.handle).is_none() {
        if texture.failure_reported {
            return;
        }
        if let Some(reason) = asset_server.and_then(|s| load_failure(&s, texture.handle.id())) {
            let err = AssetError::Texture {
                path: texture.path.clone(),
                reason,
            };
            error!("{err}; keeping the original screen material");
            texture.failure_reported = true;
        }
        return;
    }

    for (entity, material) in &surfaces {
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color_texture = Some(texture.handle.clone());
            material.emissive_texture = Some(texture.handle.clone());
        }
        commands.entity(entity).insert(ScreenTextured);
        debug!("screen texture {} applied to {entity}", texture.path);
    }
}
