use serde::Deserialize;

/// Largest atlas edge accepted at acquire time. Matches the texture size
/// limit guaranteed by the GPU backends this cache feeds.
pub const MAX_ATLAS_DIM: u32 = 8192;

const DEFAULT_ATLAS_SIZE: u32 = 1024;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    #[serde(default = "default_dim")]
    pub atlas_width: u32,
    #[serde(default = "default_dim")]
    pub atlas_height: u32,
}

fn default_dim() -> u32 {
    DEFAULT_ATLAS_SIZE
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            atlas_width: DEFAULT_ATLAS_SIZE,
            atlas_height: DEFAULT_ATLAS_SIZE,
        }
    }
}

impl CacheSettings {
    pub fn new(atlas_width: u32, atlas_height: u32) -> Self {
        Self {
            atlas_width,
            atlas_height,
        }
    }

    /// Parses settings from a TOML snippet, falling back to defaults when
    /// the snippet does not parse.
    pub fn from_toml(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to parse cache settings: {}", e);
                CacheSettings::default()
            }
        }
    }

    /// Whether the configured dimensions describe a surface the cache is
    /// willing to allocate.
    pub fn is_valid(&self) -> bool {
        self.atlas_width > 0
            && self.atlas_height > 0
            && self.atlas_width <= MAX_ATLAS_DIM
            && self.atlas_height <= MAX_ATLAS_DIM
    }
}
