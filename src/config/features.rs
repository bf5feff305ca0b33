//! Feature flags

use serde::Deserialize;

/// Feature flags for optional behaviour
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureFlags {
    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json_logs: bool,
}
