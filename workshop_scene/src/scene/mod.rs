//! Workshop scene: glTF loading, node tagging, lighting rigs and interaction zones.

mod bounds;
mod loader;
pub(crate) mod materials;
mod post_process;
mod tags;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::WorkshopSet;

pub use bounds::{ray_aabb_intersect, WorldBounds};
pub use loader::{
    apply_screen_texture, despawn_workshop, report_scene_failures, spawn_configured_scene,
    spawn_workshop, SceneCache, ScenePath, ScreenTexture,
};
pub use materials::{accent_material, outline_material, AccentSettings};
pub use post_process::{build_pending_rigs, post_process_scene, PendingNode, PendingRig};
pub use tags::{NodeTagger, NodeTags, SceneIdentifiers};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenLightSettings {
    pub emissive: [u8; 3],
    pub emissive_strength: f32,
    /// Distance the lights sit in front of the screen along +z.
    pub forward_offset: f32,
    pub main_intensity: f32,
    pub main_range: f32,
    pub area_count: usize,
    pub area_intensity: f32,
    pub area_range: f32,
    pub area_spacing: f32,
    pub area_lift: f32,
}

impl Default for ScreenLightSettings {
    fn default() -> Self {
        Self {
            emissive: [0xCC, 0xCC, 0xCC],
            emissive_strength: 3.5,
            forward_offset: 0.3,
            main_intensity: 250_000.0,
            main_range: 15.0,
            area_count: 3,
            area_intensity: 120_000.0,
            area_range: 8.0,
            area_spacing: 0.2,
            area_lift: 0.1,
        }
    }
}

/// Tube light geometry and colors. Intensities live in the flicker baselines.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeLightSettings {
    pub base_color: [u8; 3],
    pub emissive: [u8; 3],
    pub emissive_strength: f32,
    pub light_color: [u8; 3],
    pub main_range: f32,
    pub area_count: usize,
    pub area_range: f32,
    pub area_spacing: f32,
    pub area_lift: f32,
    pub fill_height: f32,
    pub fill_drop: f32,
}

impl Default for TubeLightSettings {
    fn default() -> Self {
        Self {
            base_color: [0xFF, 0xAA, 0x33],
            emissive: [0xFF, 0x88, 0x33],
            emissive_strength: 0.8,
            light_color: [0xFF, 0xAA, 0x33],
            main_range: 50.0,
            area_count: 5,
            area_range: 25.0,
            area_spacing: 0.4,
            area_lift: 0.1,
            fill_height: 2.0,
            fill_drop: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Interaction zones are the tagged node's bounds scaled by this, 1.5 to 2.0.
    pub zone_scale: f32,
    pub outline_scale: f32,
    pub screen: ScreenLightSettings,
    pub tube: TubeLightSettings,
    pub accent: AccentSettings,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            zone_scale: 1.5,
            outline_scale: 1.02,
            screen: ScreenLightSettings::default(),
            tube: TubeLightSettings::default(),
            accent: AccentSettings::default(),
        }
    }
}

/// Root of a mounted workshop scene instance.
#[derive(Component, Clone, Debug)]
pub struct WorkshopRoot {
    pub path: String,
}

/// Set once the scene spawner has populated the instance.
#[derive(Component)]
pub struct SceneReady;

/// Set once materials, tags and outlines have been applied.
#[derive(Component)]
pub struct PostProcessed;

/// A mesh primitive that belongs to a tagged node.
#[derive(Component, Clone, Copy, Debug)]
pub struct InteractiveMesh {
    pub node: Entity,
}

/// Orange back-face shell shown while the hover group is active.
#[derive(Component, Clone, Copy, Debug)]
pub struct OutlineMesh {
    pub source: Entity,
}

/// Enlarged, invisible pick volume around a tagged node.
#[derive(Component, Clone, Copy, Debug)]
pub struct InteractionZone {
    pub source: Entity,
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl InteractionZone {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds {
            min: self.center - self.half_extents,
            max: self.center + self.half_extents,
        }
    }
}

/// Monitor surface mesh; receives the screen texture.
#[derive(Component)]
pub struct ScreenSurface;

#[derive(Component)]
pub struct ScreenTextured;

/// World position of the first computer node, once known.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct ComputerAnchor(pub Option<Vec3>);

pub fn scene_plugin(app: &mut App) {
    app.init_resource::<SceneCache>()
        .init_resource::<ComputerAnchor>()
        .add_systems(Startup, spawn_configured_scene)
        .add_systems(
            Update,
            (
                report_scene_failures,
                (post_process_scene, build_pending_rigs).chain(),
                apply_screen_texture,
            )
                .in_set(WorkshopSet::Prepare),
        );
}
