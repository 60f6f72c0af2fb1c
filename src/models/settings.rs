use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub compression: CompressionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            compression: CompressionSettings::default(),
        }
    }
}

/// Bounds applied to every stored image. Overridable per run through
/// `settings.json`, never mutated globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionSettings {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    #[serde(default = "default_quality")]
    pub quality: f32,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 1200,
            quality: 0.8,
        }
    }
}

fn default_max_width() -> u32 {
    1200
}

fn default_max_height() -> u32 {
    1200
}

fn default_quality() -> f32 {
    0.8
}
