//! World-space bounding boxes of scene meshes.

use bevy::prelude::*;
use bevy::render::primitives::Aabb;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBounds {
    /// Transforms all eight corners of a local `Aabb`, so rotation and scale are honored.
    pub fn from_aabb(transform: &GlobalTransform, aabb: &Aabb) -> Self {
        let center: Vec3 = aabb.center.into();
        let half: Vec3 = aabb.half_extents.into();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { -half.x } else { half.x },
                if i & 2 == 0 { -half.y } else { half.y },
                if i & 4 == 0 { -half.z } else { half.z },
            );
            let world = transform.transform_point(center + corner);
            min = min.min(world);
            max = max.max(world);
        }
        Self { min, max }
    }

    pub fn union(self, other: WorldBounds) -> WorldBounds {
        WorldBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Same center, every axis scaled by `factor`.
    pub fn scaled(&self, factor: f32) -> WorldBounds {
        let center = self.center();
        let half = self.half_extents() * factor;
        WorldBounds {
            min: center - half,
            max: center + half,
        }
    }
}

/// Slab test. Returns the entry distance along `dir`, or `None` on a miss.
pub fn ray_aabb_intersect(origin: Vec3, dir: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Option<f32> {
    let inv_dir = 1.0 / dir;
    let t1 = (aabb_min - origin) * inv_dir;
    let t2 = (aabb_max - origin) * inv_dir;
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);
    let t_enter = t_min.x.max(t_min.y).max(t_min.z);
    let t_exit = t_max.x.min(t_max.y).min(t_max.z);
    if t_enter <= t_exit && t_exit > 0.0 {
        Some(t_enter.max(0.0))
    } else {
        None
    }
}
