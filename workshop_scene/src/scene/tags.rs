//! Node-name classification, computed once per scene instance.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Load-bearing node names in the workshop asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneIdentifiers {
    /// Substring marking the monitor surface.
    pub screen: String,
    /// Exact name of the neon tube mesh.
    pub tube_light: String,
    /// Substrings of the hover group (all outlined together).
    pub interactive: Vec<String>,
    /// Substrings that start the fly-to when clicked.
    pub zoom_targets: Vec<String>,
    /// Substring of the node whose bounds center is recorded as the anchor.
    pub anchor: String,
}

impl Default for SceneIdentifiers {
    fn default() -> Self {
        Self {
            screen: "Screen".to_string(),
            tube_light: "Cylinder047_TubeLight_0".to_string(),
            interactive: vec![
                "Computer".to_string(),
                "Mouse2".to_string(),
                "Screen".to_string(),
            ],
            zoom_targets: vec!["Computer".to_string(), "Screen".to_string()],
            anchor: "Computer".to_string(),
        }
    }
}

/// Capabilities of a scene node, derived from its name.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeTags {
    pub screen: bool,
    pub tube_light: bool,
    pub interactive: bool,
    pub zoom_target: bool,
    pub anchor: bool,
}

impl NodeTags {
    pub fn any(&self) -> bool {
        self.screen || self.tube_light || self.interactive || self.zoom_target
    }
}

#[derive(Clone, Debug, Default)]
pub struct NodeTagger {
    identifiers: SceneIdentifiers,
}

impl NodeTagger {
    pub fn new(identifiers: SceneIdentifiers) -> Self {
        Self { identifiers }
    }

    pub fn classify(&self, name: &str) -> NodeTags {
        let ids = &self.identifiers;
        let contains_any =
            |needles: &[String]| needles.iter().any(|n| !n.is_empty() && name.contains(n.as_str()));
        NodeTags {
            screen: !ids.screen.is_empty() && name.contains(ids.screen.as_str()),
            tube_light: name == ids.tube_light,
            interactive: contains_any(&ids.interactive),
            zoom_target: contains_any(&ids.zoom_targets),
            anchor: !ids.anchor.is_empty() && name.contains(ids.anchor.as_str()),
        }
    }
}
