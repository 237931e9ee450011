use serde::{Deserialize, Serialize};

/// Named set of ignore rules for quick reuse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreProfile {
    /// Profile name
    pub name: String,
    /// Keys dropped wherever they occur
    #[serde(default)]
    pub ignore_keys: Vec<String>,
    /// Glob patterns over dotted key paths (e.g. "meta.updatedAt", "*.etag")
    #[serde(default)]
    pub ignore_paths: Vec<String>,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keys ignored by every comparison
    #[serde(default)]
    pub ignore_keys: Vec<String>,

    /// Path patterns ignored by every comparison
    #[serde(default)]
    pub ignore_paths: Vec<String>,

    /// Saved ignore profiles
    #[serde(default)]
    pub profiles: Vec<IgnoreProfile>,
}

impl AppConfig {
    pub fn profile(&self, name: &str) -> Option<&IgnoreProfile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }
}
