//! Env parsing, tuning settings, and asset path defaults.

use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::camera::CameraSettings;
use crate::error::ConfigError;
use crate::flicker::{FlickerMode, FlickerSettings};
use crate::interaction::InteractionSettings;
use crate::scene::{LightingSettings, SceneIdentifiers};

const SCENE_ENV: &str = "WORKSHOP_SCENE";
const SCREEN_TEXTURE_ENV: &str = "WORKSHOP_SCREEN_TEXTURE";
const CLICK_SOUND_ENV: &str = "WORKSHOP_CLICK_SOUND";
const HUM_SOUND_ENV: &str = "WORKSHOP_HUM_SOUND";
const FLICKER_ENV: &str = "WORKSHOP_FLICKER";
const SEED_ENV: &str = "WORKSHOP_SEED";
const SETTINGS_ENV: &str = "WORKSHOP_SETTINGS";

const DEFAULT_SCENE: &str = "models/workshop/scene.gltf";
const DEFAULT_CLICK_SOUND: &str = "sound/click.ogg";
const DEFAULT_HUM_SOUND: &str = "sound/neon.ogg";

/// Every tuning constant of the scene. Missing JSON fields keep their defaults.
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopSettings {
    pub camera: CameraSettings,
    pub identifiers: SceneIdentifiers,
    pub lighting: LightingSettings,
    pub flicker: FlickerSettings,
    pub interaction: InteractionSettings,
}

/// Asset paths plus settings, resolved from the environment.
#[derive(Clone, Debug)]
pub struct WorkshopConfig {
    pub scene_path: String,
    pub screen_texture: Option<String>,
    pub click_sound: String,
    pub hum_sound: String,
    pub seed: Option<u64>,
    pub settings: WorkshopSettings,
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            scene_path: DEFAULT_SCENE.to_string(),
            screen_texture: None,
            click_sound: DEFAULT_CLICK_SOUND.to_string(),
            hum_sound: DEFAULT_HUM_SOUND.to_string(),
            seed: None,
            settings: WorkshopSettings::default(),
        }
    }
}

/// Reads the workshop configuration from the environment.
/// Invalid values are reported and replaced by their defaults.
pub fn workshop_config() -> WorkshopConfig {
    let mut config = WorkshopConfig::default();

    if let Some(raw) = non_empty_env(SETTINGS_ENV) {
        match load_settings(Path::new(&raw)) {
            Ok(settings) => config.settings = settings,
            Err(err) => eprintln!("workshop: {err}, using default settings"),
        }
    }

    if let Some(path) = non_empty_env(SCENE_ENV) {
        config.scene_path = path;
    }
    config.screen_texture = non_empty_env(SCREEN_TEXTURE_ENV);
    if let Some(path) = non_empty_env(CLICK_SOUND_ENV) {
        config.click_sound = path;
    }
    if let Some(path) = non_empty_env(HUM_SOUND_ENV) {
        config.hum_sound = path;
    }

    if let Some(raw) = non_empty_env(FLICKER_ENV) {
        match parse_flicker_mode(&raw) {
            Ok(mode) => config.settings.flicker.mode = mode,
            Err(err) => eprintln!("workshop: {err}"),
        }
    }

    if let Some(raw) = non_empty_env(SEED_ENV) {
        match parse_seed(&raw) {
            Ok(seed) => config.seed = Some(seed),
            Err(err) => eprintln!("workshop: {err}"),
        }
    }

    config
}

/// Loads a JSON settings file.
pub fn load_settings(path: &Path) -> Result<WorkshopSettings, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ConfigError::Json {
        path: PathBuf::from(path),
        source,
    })
}

pub fn parse_flicker_mode(raw: &str) -> Result<FlickerMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "simple" => Ok(FlickerMode::Simple),
        "audio" | "audio-synced" => Ok(FlickerMode::AudioSynced),
        _ => Err(ConfigError::InvalidEnv {
            var: FLICKER_ENV,
            value: raw.to_string(),
            expected: "`simple` or `audio`",
        }),
    }
}

fn parse_seed(raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: SEED_ENV,
        value: raw.to_string(),
        expected: "an unsigned integer",
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
