use crate::omit::OmitOptions;
use glob::Pattern;
use rdeep_common::{AppConfig, Key, KeyPath, RDeepError};
use tracing::debug;

/// Ignore rules built from configuration: plain key names plus glob
/// patterns matched against the dotted path of each key
/// (e.g. `meta.updatedAt`, `items.*.id`, `*.etag`).
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    keys: Vec<String>,
    paths: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn new(keys: &[String], path_patterns: &[String]) -> Result<Self, RDeepError> {
        let mut rules = Self::default();
        rules.extend(keys, path_patterns)?;
        Ok(rules)
    }

    /// Global rules from `config`, plus the named profile when given
    pub fn from_config(config: &AppConfig, profile: Option<&str>) -> Result<Self, RDeepError> {
        let mut rules = Self::new(&config.ignore_keys, &config.ignore_paths)?;

        if let Some(name) = profile {
            let profile = config
                .profile(name)
                .ok_or_else(|| RDeepError::Config(format!("Unknown profile: {}", name)))?;
            rules.extend(&profile.ignore_keys, &profile.ignore_paths)?;
            debug!("Applied ignore profile '{}'", name);
        }

        Ok(rules)
    }

    pub fn extend(&mut self, keys: &[String], path_patterns: &[String]) -> Result<(), RDeepError> {
        self.keys.extend(keys.iter().cloned());
        for pattern in path_patterns {
            let compiled = Pattern::new(pattern).map_err(|e| {
                RDeepError::Config(format!("Invalid ignore path '{}': {}", pattern, e))
            })?;
            debug!("Added ignore path pattern: {}", pattern);
            self.paths.push(compiled);
        }
        Ok(())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn path_patterns(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(Pattern::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.paths.is_empty()
    }

    /// True when `key` under `parent` matches one of the path patterns
    pub fn matches_path(&self, key: &Key, parent: &KeyPath) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        let full = parent.display_with(key);
        self.paths.iter().any(|pattern| pattern.matches(&full))
    }

    /// Omission options equivalent to these rules
    pub fn to_options(&self) -> OmitOptions<'_> {
        let options = OmitOptions::new().ignore_keys(self.keys.iter().map(String::as_str));
        if self.paths.is_empty() {
            options
        } else {
            options.ignore_key_predicate(move |key, parent| self.matches_path(key, parent))
        }
    }
}
