//! Camera poses and the cubic ease used by the fly-to animation.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub const fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Interpolates position and look-at independently with the eased factor.
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        let eased = ease_in_out_cubic(t);
        // Endpoints are returned verbatim so no float residue leaks into a snap.
        if eased <= 0.0 {
            return *self;
        }
        if eased >= 1.0 {
            return *other;
        }
        CameraPose {
            position: self.position.lerp(other.position, eased),
            look_at: self.look_at.lerp(other.look_at, eased),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.look_at, Vec3::Y)
    }
}

/// Cubic ease-in-out on `t` clamped to `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Serializable form of a pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSettings {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
}

impl PoseSettings {
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(Vec3::from_array(self.position), Vec3::from_array(self.look_at))
    }
}

/// Wide shot of the whole workshop.
pub const OVERVIEW_POSE: PoseSettings = PoseSettings {
    position: [436.107, 803.230, -2.268],
    look_at: [350.323, 783.240, 45.076],
};

/// Close-up on the computer screen.
pub const FOCUSED_POSE: PoseSettings = PoseSettings {
    position: [-458.672, 446.169, 912.762],
    look_at: [-458.732, 446.169, 913.022],
};
