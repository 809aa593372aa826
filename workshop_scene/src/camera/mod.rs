//! Workshop camera: poses, fly-to controller, orbit controls.

mod orbit;
mod pose;
mod zoom;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::WorkshopSettings;
use crate::WorkshopSet;

pub use orbit::{orbit_controls_system, orbit_transform, OrbitControls, OrbitSettings};
pub use pose::{ease_in_out_cubic, CameraPose, PoseSettings, FOCUSED_POSE, OVERVIEW_POSE};
pub use zoom::{
    advance_zoom_system, ReturnMode, ScreenZoomComplete, ZoomController, ZoomEvent, ZoomPhase,
    ZoomStateChanged,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub overview: PoseSettings,
    pub focused: PoseSettings,
    /// Transition progress per second; 0.5 gives a two second fly-to.
    pub transition_rate: f32,
    pub return_mode: ReturnMode,
    pub fov_degrees: f32,
    pub orbit: OrbitSettings,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            overview: OVERVIEW_POSE,
            focused: FOCUSED_POSE,
            transition_rate: 0.5,
            return_mode: ReturnMode::Snap,
            fov_degrees: 75.0,
            orbit: OrbitSettings::default(),
        }
    }
}

/// Marker for the camera driven by the zoom controller.
#[derive(Component)]
pub struct WorkshopCamera;

/// Registers the zoom events and the camera systems.
pub fn camera_plugin(app: &mut App) {
    app.add_event::<ZoomStateChanged>()
        .add_event::<ScreenZoomComplete>()
        .add_systems(Startup, spawn_camera)
        .add_systems(Update, advance_zoom_system.in_set(WorkshopSet::Animate));
}

/// Mouse orbit and dolly around the controller's target.
pub fn orbit_plugin(app: &mut App) {
    app.add_systems(Update, orbit_controls_system.in_set(WorkshopSet::Input));
}

/// Spawns the camera at the controller's current pose.
pub fn spawn_camera(
    mut commands: Commands,
    settings: Res<WorkshopSettings>,
    controller: Res<ZoomController>,
) {
    let pose = controller.pose();
    commands.spawn((
        WorkshopCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.camera.fov_degrees.to_radians(),
            near: 0.1,
            far: 5000.0,
            ..default()
        }),
        pose.transform(),
        OrbitControls::new(pose.look_at, settings.camera.orbit),
    ));
}
