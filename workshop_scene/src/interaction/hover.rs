use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon};
use bevy::winit::cursor::CursorIcon;

use super::PointerTarget;
use crate::camera::{ZoomController, ZoomStateChanged};
use crate::scene::OutlineMesh;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverChange {
    Enter,
    Leave,
}

/// Hover state of the interactive group. One flag for the whole group:
/// hovering any member outlines all of them.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    pub group_hovered: bool,
    pub hovered: Option<Entity>,
}

impl HoverState {
    /// Feeds the node under the cursor. Ignored while the camera is focused.
    pub fn update(&mut self, target: Option<Entity>, focused: bool) -> Option<HoverChange> {
        if focused {
            return None;
        }
        self.hovered = target;
        match (target.is_some(), self.group_hovered) {
            (true, false) => {
                self.group_hovered = true;
                Some(HoverChange::Enter)
            }
            (false, true) => {
                self.group_hovered = false;
                Some(HoverChange::Leave)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

pub fn hover_system(
    target: Res<PointerTarget>,
    controller: Res<ZoomController>,
    mut zoom_events: EventReader<ZoomStateChanged>,
    mut hover: ResMut<HoverState>,
    mut cursor: ResMut<CursorStyle>,
) {
    // Arriving at the screen drops the hover and the pointer cursor.
    let arrived = zoom_events
        .read()
        .fold(false, |arrived, ZoomStateChanged(zoomed)| arrived || *zoomed);
    if arrived {
        hover.reset();
        cursor.set_if_neq(CursorStyle::Default);
    }

    let node = target
        .hit
        .filter(|hit| hit.tags.interactive)
        .map(|hit| hit.node);
    match hover.update(node, controller.is_focused()) {
        Some(HoverChange::Enter) => {
            debug!("hover enter {node:?}");
            cursor.set_if_neq(CursorStyle::Pointer);
        }
        Some(HoverChange::Leave) => {
            debug!("hover leave");
            cursor.set_if_neq(CursorStyle::Default);
        }
        None => {}
    }
}

/// Outlines follow the group hover, and stay hidden away from the overview.
pub fn outline_visibility_system(
    hover: Res<HoverState>,
    controller: Res<ZoomController>,
    mut outlines: Query<&mut Visibility, With<OutlineMesh>>,
) {
    let visible = hover.group_hovered && controller.outlines_allowed();
    let wanted = if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut outlines {
        visibility.set_if_neq(wanted);
    }
}

pub fn apply_cursor_system(
    mut commands: Commands,
    cursor: Res<CursorStyle>,
    windows: Query<Entity, With<PrimaryWindow>>,
) {
    if !cursor.is_changed() {
        return;
    }
    let icon = match *cursor {
        CursorStyle::Default => SystemCursorIcon::Default,
        CursorStyle::Pointer => SystemCursorIcon::Pointer,
    };
    for window in &windows {
        commands.entity(window).insert(CursorIcon::System(icon));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_leave_toggle_the_group() {
        let mut hover = HoverState::default();
        let node = Entity::from_raw(3);

        assert_eq!(hover.update(Some(node), false), Some(HoverChange::Enter));
        assert!(hover.group_hovered);
        assert_eq!(hover.update(Some(node), false), None);
        assert_eq!(hover.update(None, false), Some(HoverChange::Leave));
        assert!(!hover.group_hovered);
    }

    #[test]
    fn moving_between_members_keeps_the_group_lit() {
        let mut hover = HoverState::default();
        hover.update(Some(Entity::from_raw(1)), false);
        assert_eq!(hover.update(Some(Entity::from_raw(2)), false), None);
        assert!(hover.group_hovered);
        assert_eq!(hover.hovered, Some(Entity::from_raw(2)));
    }

    #[test]
    fn focused_camera_ignores_hover() {
        let mut hover = HoverState::default();
        assert_eq!(hover.update(Some(Entity::from_raw(1)), true), None);
        assert!(!hover.group_hovered);

        hover.update(Some(Entity::from_raw(1)), false);
        assert_eq!(hover.update(None, true), None);
        assert!(hover.group_hovered);
    }
}
