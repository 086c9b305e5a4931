//! Site configuration loading
//!
//! Runtime configuration is a TOML file with compiled defaults. A missing
//! file logs a warning and falls back to the defaults; only a present but
//! unparseable file is an error. This mirrors the graceful-degradation
//! policy used elsewhere in the workspace: configuration problems must not
//! keep the page from coming up.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Well-known section ids
pub const SECTION_LIVE_STREAMS: &str = "live-streams";
pub const SECTION_AUDIO_ARCHIVES: &str = "audio-archives";
pub const SECTION_VIDEO_ARCHIVES: &str = "video-archives";

/// Full site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Section ids in navigation order; the first entry is the default
    pub sections: Vec<String>,
    /// Section shown when neither the DOM nor the URL hash names one
    pub default_section: String,
    /// Timing knobs for transitions and deferred DOM work
    pub timing: TimingConfig,
    /// Live-stream platform settings
    pub stream: StreamConfig,
    /// Embed construction settings
    pub embed: EmbedConfig,
}

/// Delays used to sequence animation and DOM replacement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Section opacity transition duration (ms)
    pub transition_ms: u64,
    /// Delay between attaching a replacement iframe and assigning its source (ms)
    pub reload_delay_ms: u64,
    /// Delay before scrolling to a deep-linked item, allowing materialization (ms)
    pub scroll_delay_ms: u64,
}

/// Live-stream platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Platform selected on first load ("kick" or "twitch")
    pub primary: String,
    /// Default channel name per platform, used when no source was captured
    pub kick_channel: String,
    pub twitch_channel: String,
    /// Parent host required by the twitch embed endpoint
    pub twitch_parent: String,
}

/// Embed construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Margin (px) at which a year group pre-materializes its placeholders
    pub load_margin_px: u32,
    /// Margin (px) at which an individual item mounts its embed
    pub item_margin_px: u32,
    /// Distance, in viewport heights, past which a materialized group is freed
    pub unload_distance_viewports: f32,
    /// Language forced onto vk embed URLs (exactly once, never duplicated)
    pub vk_language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                SECTION_LIVE_STREAMS.to_string(),
                SECTION_AUDIO_ARCHIVES.to_string(),
                SECTION_VIDEO_ARCHIVES.to_string(),
                "events".to_string(),
                "about".to_string(),
            ],
            default_section: SECTION_LIVE_STREAMS.to_string(),
            timing: TimingConfig::default(),
            stream: StreamConfig::default(),
            embed: EmbedConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transition_ms: 300,
            reload_delay_ms: 50,
            scroll_delay_ms: 150,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            primary: "kick".to_string(),
            kick_channel: "showdeck".to_string(),
            twitch_channel: "showdeck".to_string(),
            twitch_parent: "localhost".to_string(),
        }
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            load_margin_px: 800,
            item_margin_px: 200,
            unload_distance_viewports: 2.0,
            vk_language: "en".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a TOML file.
    ///
    /// `None` or a nonexistent path yields the compiled defaults with a
    /// warning; a file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            warn!("Config file not found: {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config: SiteConfig = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity checks on loaded values
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(Error::Config("sections list is empty".to_string()));
        }
        if !self.sections.contains(&self.default_section) {
            return Err(Error::Config(format!(
                "default_section `{}` is not in the sections list",
                self.default_section
            )));
        }
        match self.stream.primary.as_str() {
            "kick" | "twitch" => {}
            other => {
                return Err(Error::Config(format!(
                    "stream.primary must be `kick` or `twitch`, got `{}`",
                    other
                )));
            }
        }
        if self.embed.unload_distance_viewports <= 0.0 {
            return Err(Error::Config(
                "embed.unload_distance_viewports must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// True if `id` names a configured section
    pub fn is_known_section(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s == id)
    }
}
