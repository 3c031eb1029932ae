use serde::{Deserialize, Serialize};

/// Tunables for the build tool, loadable from the host's config file.
/// Missing keys fall back to defaults; zero limits are clamped to 1 so a bad
/// config can't wedge every edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Upper bound on cells touched by a single edit (or copied to the
    /// clipboard). Bounds worst-case simulation-tick latency.
    pub max_edit_volume: u64,
    /// Undo entries kept per player before the oldest is evicted.
    pub history_depth: usize,
    /// Editable height range, intersected with the world's own bounds when
    /// validating selections.
    pub min_height: i32,
    pub max_height: i32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            max_edit_volume: 262_144, // 64^3
            history_depth: 32,
            min_height: 0,
            max_height: 255,
        }
    }
}

impl BuildConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        Ok(toml::from_str::<BuildConfig>(text)?.sanitized())
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(serde_json::from_str::<BuildConfig>(text)?.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if self.max_edit_volume == 0 {
            log::warn!("max_edit_volume of 0 clamped to 1");
            self.max_edit_volume = 1;
        }
        if self.history_depth == 0 {
            log::warn!("history_depth of 0 clamped to 1");
            self.history_depth = 1;
        }
        if self.max_height < self.min_height {
            log::warn!(
                "max_height {} below min_height {}; swapping",
                self.max_height,
                self.min_height
            );
            std::mem::swap(&mut self.min_height, &mut self.max_height);
        }
        self
    }
}
