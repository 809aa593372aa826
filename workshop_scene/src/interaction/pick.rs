//! Cursor picking against interaction zones and tagged meshes.
//!
//! Manual ray-AABB tests rather than Bevy's mesh picking, so egui keeps
//! ownership of pointer input over its panels.

use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContext;

use crate::camera::WorkshopCamera;
use crate::scene::{ray_aabb_intersect, InteractionZone, InteractiveMesh, NodeTags, WorldBounds};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub node: Entity,
    pub tags: NodeTags,
    pub distance: f32,
}

/// What the cursor points at this frame.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct PointerTarget {
    pub hit: Option<PickHit>,
    /// The cursor is over an egui panel; the scene ignores it.
    pub over_ui: bool,
}

/// Nearest candidate hit along the ray.
pub fn nearest_hit(
    origin: Vec3,
    dir: Vec3,
    candidates: impl IntoIterator<Item = (Entity, WorldBounds)>,
) -> Option<(Entity, f32)> {
    let mut best: Option<(Entity, f32)> = None;
    for (entity, bounds) in candidates {
        if let Some(dist) = ray_aabb_intersect(origin, dir, bounds.min, bounds.max) {
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((entity, dist));
            }
        }
    }
    best
}

pub fn pointer_pick_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<WorkshopCamera>>,
    mut egui: Query<&mut EguiContext>,
    zones: Query<&InteractionZone>,
    meshes: Query<(&InteractiveMesh, &GlobalTransform, &Aabb)>,
    tags: Query<&NodeTags>,
    mut target: ResMut<PointerTarget>,
) {
    // Headless apps have no pointer; whoever drives them sets the target.
    let Ok(window) = windows.get_single() else {
        return;
    };
    let over_ui = egui
        .iter_mut()
        .any(|mut ctx| ctx.get_mut().is_pointer_over_area());

    let ray = window
        .cursor_position()
        .zip(cameras.get_single().ok())
        .and_then(|(cursor, (camera, transform))| camera.viewport_to_world(transform, cursor).ok());

    let hit = match ray {
        Some(ray) if !over_ui => {
            let candidates = zones
                .iter()
                .map(|zone| (zone.source, zone.bounds()))
                .chain(meshes.iter().map(|(mesh, transform, aabb)| {
                    (mesh.node, WorldBounds::from_aabb(transform, aabb))
                }));
            nearest_hit(ray.origin, *ray.direction, candidates).and_then(|(node, distance)| {
                tags.get(node).ok().map(|tags| PickHit {
                    node,
                    tags: *tags,
                    distance,
                })
            })
        }
        _ => None,
    };

    let next = PointerTarget { hit, over_ui };
    if target.hit != next.hit || target.over_ui != next.over_ui {
        *target = next;
    }
}
