//! Kova workshop: an interactive 3D workshop scene.
//!
//! Library root: scene loading, camera fly-to, hover interaction, neon flicker,
//! HUD overlay and the SDK builder that composes them.

use bevy::prelude::*;

mod audio;
mod camera;
pub mod config;
pub mod error;
mod flicker;
mod interaction;
mod scene;
mod ui;

pub mod prelude;
pub mod sdk;

pub use camera::{
    ease_in_out_cubic, CameraPose, CameraSettings, OrbitControls, ReturnMode, ScreenZoomComplete,
    WorkshopCamera, ZoomController, ZoomEvent, ZoomPhase, ZoomStateChanged,
};
pub use config::{WorkshopConfig, WorkshopSettings};
pub use error::{AssetError, ConfigError};
pub use flicker::{
    FlickerAnimator, FlickerCue, FlickerFrame, FlickerMode, FlickerSeed, HumClip, HumVoice,
    NeonFlicker, TubeLightRig,
};
pub use interaction::{ClickSound, ClickVoice, HoverState, PickHit, PointerTarget};
pub use scene::{
    despawn_workshop, spawn_workshop, ComputerAnchor, InteractionZone, NodeTags, OutlineMesh,
    SceneCache, ScenePath, SceneReady, ScreenTexture, WorkshopRoot,
};
pub use ui::HudState;

/// Per-frame ordering: scene preparation, then input handlers, then the
/// camera and flicker animations, then presentation.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkshopSet {
    Prepare,
    Input,
    Animate,
    Present,
}

pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            WorkshopSet::Prepare,
            WorkshopSet::Input,
            WorkshopSet::Animate,
            WorkshopSet::Present,
        )
            .chain(),
    );
}
