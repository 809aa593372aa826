//! Pointer interaction: picking, the hover group, clicks and zoom-back input.

mod click;
mod hover;
mod pick;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::WorkshopSet;

pub use click::{
    click_system, play_click, verify_click_sound, zoom_back_input_system, ClickSound, ClickVoice,
    DoubleClickDetector,
};
pub use hover::{
    apply_cursor_system, hover_system, outline_visibility_system, CursorStyle, HoverChange,
    HoverState,
};
pub use pick::{nearest_hit, pointer_pick_system, PickHit, PointerTarget};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Seconds between the two presses of a double click.
    pub double_click_window: f32,
    pub click_volume: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            double_click_window: 0.3,
            click_volume: 0.7,
        }
    }
}

pub fn interaction_plugin(app: &mut App) {
    app.init_resource::<PointerTarget>()
        .init_resource::<HoverState>()
        .init_resource::<CursorStyle>()
        .add_systems(
            Update,
            (
                pointer_pick_system,
                hover_system,
                click_system,
                zoom_back_input_system,
            )
                .chain()
                .in_set(WorkshopSet::Input),
        )
        .add_systems(
            Update,
            (outline_visibility_system, apply_cursor_system).in_set(WorkshopSet::Present),
        )
        .add_systems(Update, verify_click_sound.in_set(WorkshopSet::Prepare));
}
