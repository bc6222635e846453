use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Defaults carried over from the mobile viewer the pipeline feeds.
pub mod defaults {
    /// World-unit width of the full [0, 1] normalized range
    pub const SCALE: f32 = 10.0;
    /// Single-attempt budget for decoding the snapshot texture
    pub const TEXTURE_TIMEOUT_MS: u64 = 5000;
    /// Extra wait after the map surface reports ready, for tiles to finish.
    /// Map surfaces that stream tiles typically need around 3000.
    pub const SETTLE_DELAY_MS: u64 = 0;
    /// Upper bound on waiting for the map surface's ready signal
    pub const READY_TIMEOUT_MS: u64 = 10_000;
    /// Untextured polygon color (0xRRGGBB)
    pub const FALLBACK_COLOR: u32 = 0xff6b6b;
    /// Placeholder plane color when there is no usable polygon
    pub const PLACEHOLDER_COLOR: u32 = 0x44aa88;
    /// Side length of the placeholder plane
    pub const PLACEHOLDER_SIZE: f32 = 10.0;
}

fn default_scale() -> f32 {
    defaults::SCALE
}
fn default_texture_timeout_ms() -> u64 {
    defaults::TEXTURE_TIMEOUT_MS
}
fn default_settle_delay_ms() -> u64 {
    defaults::SETTLE_DELAY_MS
}
fn default_ready_timeout_ms() -> u64 {
    defaults::READY_TIMEOUT_MS
}
fn default_fallback_color() -> u32 {
    defaults::FALLBACK_COLOR
}
fn default_placeholder_color() -> u32 {
    defaults::PLACEHOLDER_COLOR
}
fn default_placeholder_size() -> f32 {
    defaults::PLACEHOLDER_SIZE
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_texture_timeout_ms")]
    pub texture_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    #[serde(default = "default_fallback_color")]
    pub fallback_color: u32,
    #[serde(default = "default_placeholder_color")]
    pub placeholder_color: u32,
    #[serde(default = "default_placeholder_size")]
    pub placeholder_size: f32,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            texture_timeout_ms: default_texture_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
            fallback_color: default_fallback_color(),
            placeholder_color: default_placeholder_color(),
            placeholder_size: default_placeholder_size(),
            verbose: default_verbose(),
            output: None,
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to parse config file");
                    }
                }
            }
        }
        None
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            scale: self.scale,
            texture_timeout: Duration::from_millis(self.texture_timeout_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            ready_timeout: Duration::from_millis(self.ready_timeout_ms),
            fallback_color: self.fallback_color,
            placeholder_color: self.placeholder_color,
            placeholder_size: self.placeholder_size,
        }
    }
}

/// Resolved settings the pipeline runs with
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub scale: f32,
    pub texture_timeout: Duration,
    pub settle_delay: Duration,
    pub ready_timeout: Duration,
    pub fallback_color: u32,
    pub placeholder_color: u32,
    pub placeholder_size: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        FileConfig::default().pipeline()
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("mapclip3d.toml"));
    paths.push(PathBuf::from(".mapclip3d.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mapclip3d").join("config.toml"));
        paths.push(config_dir.join("mapclip3d.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".mapclip3d.toml"));
    }

    paths
}
