//! Threshold configuration loading.
//!
//! The agent is configured with a JSON document of the form:
//!
//! ```json
//! {
//!     "alert": {
//!         "cpu":    { "low": 2,  "design": 60.0, "engineered": 80.0 },
//!         "anycpu": { "low": 0,  "design": 85.0, "engineered": 95.0 },
//!         "/":      { "low": 0,  "design": 80.0, "engineered": 90.0 }
//!     }
//! }
//! ```
//!
//! Loading is lenient by design: a config problem must never take the agent
//! down. An unreadable or malformed file degrades to an empty map (every
//! measurement classifies as clean), and a malformed entry is skipped while
//! the well-formed rest survives. All failures are logged.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Three-tier alert bounds for one monitored entity.
///
/// No sanity ordering is enforced between the bounds; a degenerate
/// configuration still classifies deterministically (see `alert::evaluate`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub design: f64,
    pub engineered: f64,
}

/// Entity id → thresholds, sorted by entity id.
pub type ThresholdMap = BTreeMap<String, Thresholds>;

/// Alert configuration for the agent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlertConfig {
    pub thresholds: ThresholdMap,
}

impl AlertConfig {
    /// Parse from a JSON string, keeping whatever subset is well-formed.
    pub fn from_json_str(input: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "failed to parse alert config, continuing without thresholds");
                return Self::default();
            }
        };

        let Some(alert) = value.get("alert") else {
            debug!("alert config has no \"alert\" section");
            return Self::default();
        };
        let Some(entries) = alert.as_object() else {
            error!("\"alert\" section is not an object, continuing without thresholds");
            return Self::default();
        };

        let mut thresholds = ThresholdMap::new();
        for (entity, raw) in entries {
            match serde_json::from_value::<Thresholds>(raw.clone()) {
                Ok(t) => {
                    thresholds.insert(entity.clone(), t);
                }
                Err(e) => {
                    warn!(entity = %entity, error = %e, "skipping malformed threshold entry");
                }
            }
        }

        Self { thresholds }
    }

    /// Load from a file. An unreadable file degrades to an empty config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content),
            Err(e) => {
                error!(path = %path.display(), error = %e,
                    "failed to read alert config, continuing without thresholds");
                Self::default()
            }
        }
    }
}
