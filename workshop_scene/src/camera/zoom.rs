//! Fly-to state machine: overview -> focused on the computer screen, and back.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::orbit::OrbitControls;
use super::pose::CameraPose;
use super::{CameraSettings, WorkshopCamera};

/// How the camera returns from the focused pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnMode {
    /// Jump straight back to the overview pose.
    #[default]
    Snap,
    /// Animate back with the same easing as the way in.
    Eased,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomPhase {
    Overview,
    TransitioningToFocused { progress: f32, from: CameraPose },
    Focused,
    TransitioningToOverview { progress: f32, from: CameraPose },
}

/// Notifications for whoever hosts the scene, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomEvent {
    StateChanged(bool),
    FocusComplete,
}

/// Fired on every zoom state change with the new "zoomed in" flag.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomStateChanged(pub bool);

/// Fired once each time the camera settles on the focused pose.
#[derive(Event, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenZoomComplete;

#[derive(Resource, Clone, Debug)]
pub struct ZoomController {
    phase: ZoomPhase,
    overview: CameraPose,
    focused: CameraPose,
    rate: f32,
    return_mode: ReturnMode,
    pose: CameraPose,
    pose_dirty: bool,
    pending: Vec<ZoomEvent>,
}

impl ZoomController {
    pub fn new(settings: &CameraSettings) -> Self {
        let overview = settings.overview.pose();
        Self {
            phase: ZoomPhase::Overview,
            overview,
            focused: settings.focused.pose(),
            rate: settings.transition_rate.max(f32::EPSILON),
            return_mode: settings.return_mode,
            pose: overview,
            pose_dirty: true,
            pending: Vec::new(),
        }
    }

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    /// Pose the camera should currently hold.
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn overview(&self) -> CameraPose {
        self.overview
    }

    pub fn focused(&self) -> CameraPose {
        self.focused
    }

    pub fn is_focused(&self) -> bool {
        matches!(self.phase, ZoomPhase::Focused)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.phase,
            ZoomPhase::TransitioningToFocused { .. } | ZoomPhase::TransitioningToOverview { .. }
        )
    }

    /// Orbit controls may only drive the camera while it is at rest.
    pub fn controls_enabled(&self) -> bool {
        matches!(self.phase, ZoomPhase::Overview | ZoomPhase::Focused)
    }

    /// Orbit target locked to the resting pose's look-at point.
    pub fn controls_target(&self) -> Option<Vec3> {
        match self.phase {
            ZoomPhase::Overview => Some(self.overview.look_at),
            ZoomPhase::Focused => Some(self.focused.look_at),
            _ => None,
        }
    }

    /// Hover outlines are only shown in the overview.
    pub fn outlines_allowed(&self) -> bool {
        matches!(self.phase, ZoomPhase::Overview)
    }

    /// Starts the fly-to. Ignored unless the camera rests in the overview.
    pub fn request_focus(&mut self) -> bool {
        if !matches!(self.phase, ZoomPhase::Overview) {
            return false;
        }
        self.phase = ZoomPhase::TransitioningToFocused {
            progress: 0.0,
            from: self.overview,
        };
        true
    }

    /// Returns to the overview. Also cancels a fly-to that is still running.
    /// No-op when already in, or heading to, the overview.
    pub fn zoom_back(&mut self) -> bool {
        match self.phase {
            ZoomPhase::Overview | ZoomPhase::TransitioningToOverview { .. } => false,
            ZoomPhase::TransitioningToFocused { .. } | ZoomPhase::Focused => {
                let from = self.pose;
                self.phase = ZoomPhase::TransitioningToOverview {
                    progress: 0.0,
                    from,
                };
                if self.return_mode == ReturnMode::Snap {
                    self.finish_overview();
                }
                true
            }
        }
    }

    /// Advances a running transition by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let advance = dt.max(0.0) * self.rate;
        match self.phase {
            ZoomPhase::TransitioningToFocused { progress, from } => {
                let progress = progress + advance;
                if progress >= 1.0 {
                    self.finish_focus();
                } else {
                    self.phase = ZoomPhase::TransitioningToFocused { progress, from };
                    self.set_pose(from.lerp(&self.focused, progress));
                }
            }
            ZoomPhase::TransitioningToOverview { progress, from } => {
                let progress = progress + advance;
                if progress >= 1.0 {
                    self.finish_overview();
                } else {
                    self.phase = ZoomPhase::TransitioningToOverview { progress, from };
                    self.set_pose(from.lerp(&self.overview, progress));
                }
            }
            ZoomPhase::Overview | ZoomPhase::Focused => {}
        }
    }

    /// Events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<ZoomEvent> {
        std::mem::take(&mut self.pending)
    }

    /// The pose, if it changed since the last call.
    pub fn take_pose_update(&mut self) -> Option<CameraPose> {
        std::mem::take(&mut self.pose_dirty).then_some(self.pose)
    }

    fn finish_focus(&mut self) {
        self.phase = ZoomPhase::Focused;
        self.set_pose(self.focused);
        self.pending.push(ZoomEvent::StateChanged(true));
        self.pending.push(ZoomEvent::FocusComplete);
    }

    fn finish_overview(&mut self) {
        self.phase = ZoomPhase::Overview;
        self.set_pose(self.overview);
        self.pending.push(ZoomEvent::StateChanged(false));
    }

    fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.pose_dirty = true;
    }
}

/// Steps the controller, moves the camera and forwards controller events.
pub fn advance_zoom_system(
    time: Res<Time>,
    mut controller: ResMut<ZoomController>,
    mut cameras: Query<(&mut Transform, Option<&mut OrbitControls>), With<WorkshopCamera>>,
    mut state_changed: EventWriter<ZoomStateChanged>,
    mut zoom_complete: EventWriter<ScreenZoomComplete>,
) {
    controller.step(time.delta_secs());

    if let Some(pose) = controller.take_pose_update() {
        let target = controller.controls_target();
        for (mut transform, orbit) in &mut cameras {
            *transform = pose.transform();
            if let (Some(mut orbit), Some(target)) = (orbit, target) {
                orbit.target = target;
            }
        }
    }

    let enabled = controller.controls_enabled();
    for (_, orbit) in &mut cameras {
        if let Some(mut orbit) = orbit {
            if orbit.enabled != enabled {
                orbit.enabled = enabled;
            }
        }
    }

    for event in controller.drain_events() {
        match event {
            ZoomEvent::StateChanged(zoomed) => {
                info!("zoom state changed: zoomed={zoomed}");
                state_changed.send(ZoomStateChanged(zoomed));
            }
            ZoomEvent::FocusComplete => {
                zoom_complete.send(ScreenZoomComplete);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::pose::{FOCUSED_POSE, OVERVIEW_POSE};

    fn controller(return_mode: ReturnMode) -> ZoomController {
        ZoomController::new(&CameraSettings {
            return_mode,
            ..CameraSettings::default()
        })
    }

    fn run(controller: &mut ZoomController, seconds: f32) {
        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0;
        while elapsed < seconds {
            controller.step(dt);
            elapsed += dt;
        }
    }

    #[test]
    fn starts_at_rest_in_overview() {
        let mut zoom = controller(ReturnMode::Snap);
        assert_eq!(zoom.phase(), ZoomPhase::Overview);
        assert!(zoom.controls_enabled());
        assert_eq!(zoom.take_pose_update(), Some(OVERVIEW_POSE.pose()));
        assert_eq!(zoom.take_pose_update(), None);
    }

    #[test]
    fn focus_lands_exactly_on_focused_pose() {
        let mut zoom = controller(ReturnMode::Snap);
        assert!(zoom.request_focus());
        assert!(!zoom.controls_enabled());
        assert!(!zoom.outlines_allowed());

        run(&mut zoom, 1.0);
        assert!(zoom.is_transitioning());
        let midway = zoom.pose();
        assert_ne!(midway, OVERVIEW_POSE.pose());
        assert_ne!(midway, FOCUSED_POSE.pose());

        run(&mut zoom, 1.1);
        assert!(zoom.is_focused());
        assert_eq!(zoom.pose(), FOCUSED_POSE.pose());
        assert_eq!(zoom.controls_target(), Some(FOCUSED_POSE.pose().look_at));
        assert_eq!(
            zoom.drain_events(),
            vec![ZoomEvent::StateChanged(true), ZoomEvent::FocusComplete]
        );
    }

    #[test]
    fn transition_takes_about_two_seconds() {
        let mut zoom = controller(ReturnMode::Snap);
        zoom.request_focus();
        zoom.step(1.99);
        assert!(zoom.is_transitioning());
        zoom.step(0.02);
        assert!(zoom.is_focused());
    }

    #[test]
    fn repeated_focus_requests_are_ignored() {
        let mut zoom = controller(ReturnMode::Snap);
        assert!(zoom.request_focus());
        zoom.step(0.5);
        assert!(!zoom.request_focus());
        run(&mut zoom, 3.0);
        assert!(!zoom.request_focus());
        assert!(zoom.is_focused());
    }

    #[test]
    fn snap_back_restores_overview_and_notifies_once() {
        let mut zoom = controller(ReturnMode::Snap);
        zoom.request_focus();
        run(&mut zoom, 3.0);
        zoom.drain_events();

        assert!(zoom.zoom_back());
        assert_eq!(zoom.phase(), ZoomPhase::Overview);
        assert_eq!(zoom.pose(), OVERVIEW_POSE.pose());
        assert_eq!(zoom.controls_target(), Some(OVERVIEW_POSE.pose().look_at));
        assert_eq!(zoom.drain_events(), vec![ZoomEvent::StateChanged(false)]);

        assert!(!zoom.zoom_back());
        assert!(zoom.drain_events().is_empty());
    }

    #[test]
    fn zoom_back_mid_flight_cancels_the_fly_to() {
        let mut zoom = controller(ReturnMode::Snap);
        zoom.request_focus();
        zoom.step(0.8);

        assert!(zoom.zoom_back());
        assert_eq!(zoom.phase(), ZoomPhase::Overview);
        assert_eq!(zoom.pose(), OVERVIEW_POSE.pose());
        assert_eq!(zoom.drain_events(), vec![ZoomEvent::StateChanged(false)]);

        run(&mut zoom, 3.0);
        assert_eq!(zoom.phase(), ZoomPhase::Overview);
        assert!(zoom.drain_events().is_empty());
    }

    #[test]
    fn eased_return_animates_back_from_current_pose() {
        let mut zoom = controller(ReturnMode::Eased);
        zoom.request_focus();
        run(&mut zoom, 3.0);
        zoom.drain_events();

        assert!(zoom.zoom_back());
        assert!(zoom.is_transitioning());
        assert!(!zoom.controls_enabled());
        assert!(zoom.drain_events().is_empty());
        assert!(!zoom.zoom_back());

        run(&mut zoom, 3.0);
        assert_eq!(zoom.phase(), ZoomPhase::Overview);
        assert_eq!(zoom.pose(), OVERVIEW_POSE.pose());
        assert_eq!(zoom.drain_events(), vec![ZoomEvent::StateChanged(false)]);
    }

    #[test]
    fn zoom_back_in_overview_is_a_no_op() {
        let mut zoom = controller(ReturnMode::Snap);
        assert!(!zoom.zoom_back());
        assert!(zoom.drain_events().is_empty());
    }
}
