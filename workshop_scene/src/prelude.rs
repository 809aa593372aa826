//! Minimal prelude for SDK consumers.

pub use crate::config::{load_settings, workshop_config, WorkshopConfig, WorkshopSettings};
pub use crate::sdk::WorkshopBuilder;
pub use crate::{ScreenZoomComplete, ZoomController, ZoomStateChanged};
