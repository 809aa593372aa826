//! Orbit controls: left-drag orbits around a target, the wheel dollies.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Pixels per "line" when a touchpad reports pixel scroll deltas.
const PIXELS_PER_LINE: f32 = 100.0;
/// Keeps the camera off the poles so `looking_at` stays well defined.
const MAX_POLAR_DOT: f32 = 0.99;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 0.1,
            max_distance: 2000.0,
        }
    }
}

/// Camera controls the zoom controller disables during fly-to animations.
#[derive(Component, Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Vec3,
    pub settings: OrbitSettings,
}

impl OrbitControls {
    pub fn new(target: Vec3, settings: OrbitSettings) -> Self {
        Self {
            enabled: true,
            target,
            settings,
        }
    }
}

pub fn orbit_controls_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut cameras: Query<(&mut Transform, &OrbitControls)>,
) {
    let drag: Vec2 = if mouse.pressed(MouseButton::Left) {
        motion.read().map(|m| m.delta).sum()
    } else {
        motion.clear();
        Vec2::ZERO
    };
    let scroll: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / PIXELS_PER_LINE,
        })
        .sum();

    if drag == Vec2::ZERO && scroll == 0.0 {
        return;
    }

    for (mut transform, orbit) in &mut cameras {
        if orbit.enabled {
            *transform = orbit_transform(&transform, orbit, drag, scroll);
        }
    }
}

/// Applies a drag (pixels) and scroll (lines) to a camera orbiting `orbit.target`.
pub fn orbit_transform(
    current: &Transform,
    orbit: &OrbitControls,
    drag: Vec2,
    scroll: f32,
) -> Transform {
    let settings = &orbit.settings;
    let offset = current.translation - orbit.target;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return *current;
    }

    let yaw = Quat::from_rotation_y(-drag.x * settings.rotate_speed);
    let pitch = Quat::from_axis_angle(*current.right(), -drag.y * settings.rotate_speed);
    let mut direction = (yaw * pitch * offset).normalize();
    if direction.dot(Vec3::Y).abs() > MAX_POLAR_DOT {
        direction = (yaw * offset).normalize();
    }

    let zoom = (1.0 - scroll * settings.zoom_speed).max(0.1);
    let distance = (distance * zoom).clamp(settings.min_distance, settings.max_distance);

    Transform::from_translation(orbit.target + direction * distance)
        .looking_at(orbit.target, Vec3::Y)
}
