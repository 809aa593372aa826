//! Error taxonomy. Nothing here is fatal: callers log and skip the effect.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {var}: expected {expected}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Asset failures surfaced by the scene, texture and audio loaders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("scene {path} failed to load: {reason}")]
    Scene { path: String, reason: String },
    #[error("screen texture {path} failed to load: {reason}")]
    Texture { path: String, reason: String },
    #[error("audio clip {path} failed to load: {reason}")]
    Audio { path: String, reason: String },
}

/// Reason string for an asset that failed to load, `None` while loading or loaded.
pub fn load_failure(
    server: &bevy::asset::AssetServer,
    id: impl Into<bevy::asset::UntypedAssetId>,
) -> Option<String> {
    match server.get_load_state(id) {
        Some(bevy::asset::LoadState::Failed(err)) => Some(err.to_string()),
        _ => None,
    }
}
