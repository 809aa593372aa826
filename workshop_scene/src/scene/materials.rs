//! Material tweaks: the orange accent pass, screen glow, tube neon, outline.

use bevy::prelude::*;
use bevy::render::render_resource::Face;
use serde::{Deserialize, Serialize};

/// Accent applied once to every material of a scene instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccentSettings {
    pub tint: [u8; 3],
    pub tint_amount: f32,
    /// Tint used when converting an unlit material to a lit one.
    pub unlit_tint_amount: f32,
    pub brightness: f32,
    pub metalness_boost: f32,
    pub metalness_max: f32,
    pub roughness_cut: f32,
    pub roughness_min: f32,
}

impl Default for AccentSettings {
    fn default() -> Self {
        Self {
            tint: [0x75, 0x2B, 0x0C],
            tint_amount: 0.15,
            unlit_tint_amount: 0.2,
            brightness: 1.2,
            metalness_boost: 0.3,
            metalness_max: 0.9,
            roughness_cut: 0.2,
            roughness_min: 0.05,
        }
    }
}

/// Pushes a material toward the workshop's orange palette.
pub fn accent_material(material: &mut StandardMaterial, accent: &AccentSettings) {
    let tint = Color::srgb_u8(accent.tint[0], accent.tint[1], accent.tint[2]).to_srgba();
    let base = material.base_color.to_srgba();

    if material.unlit {
        // Unlit materials ignore the room lights; make them respond.
        material.unlit = false;
        material.base_color = mix(base, tint, accent.unlit_tint_amount).into();
        return;
    }

    material.metallic = (material.metallic + accent.metalness_boost).min(accent.metalness_max);
    material.perceptual_roughness =
        (material.perceptual_roughness - accent.roughness_cut).max(accent.roughness_min);
    let tinted = mix(base, tint, accent.tint_amount);
    material.base_color = Srgba::new(
        tinted.red * accent.brightness,
        tinted.green * accent.brightness,
        tinted.blue * accent.brightness,
        tinted.alpha,
    )
    .into();
}

fn mix(from: Srgba, to: Srgba, t: f32) -> Srgba {
    Srgba::new(
        from.red + (to.red - from.red) * t,
        from.green + (to.green - from.green) * t,
        from.blue + (to.blue - from.blue) * t,
        from.alpha,
    )
}

/// Bright white glow on the monitor surface.
pub fn screen_glow(material: &mut StandardMaterial, emissive: [u8; 3], strength: f32) {
    let color = Color::srgb_u8(emissive[0], emissive[1], emissive[2]).to_linear();
    material.emissive = LinearRgba::rgb(
        color.red * strength,
        color.green * strength,
        color.blue * strength,
    );
}

/// Light-orange neon for the tube. Returns the unscaled emissive color.
pub fn neon_tube(
    material: &mut StandardMaterial,
    base: [u8; 3],
    emissive: [u8; 3],
    strength: f32,
) -> LinearRgba {
    material.base_color = Color::srgb_u8(base[0], base[1], base[2]);
    let color = Color::srgb_u8(emissive[0], emissive[1], emissive[2]).to_linear();
    material.emissive = LinearRgba::rgb(
        color.red * strength,
        color.green * strength,
        color.blue * strength,
    );
    color
}

/// Back-face shell drawn slightly larger than the mesh it outlines.
pub fn outline_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgba_u8(0xFF, 0xAA, 0x00, 230),
        emissive: LinearRgba::from(Color::srgb_u8(0xFF, 0x88, 0x00)) * 0.3,
        alpha_mode: AlphaMode::Blend,
        cull_mode: Some(Face::Front),
        ..default()
    }
}
