//! Tunables for the scene and the terminal.
//!
//! Defaults reproduce the live site. With the `serde` feature both structs can be
//! overridden from a JSON object handed over by the page (see
//! `start_site_with_config`); missing keys fall back to the defaults.

#[cfg(feature = "serde")]
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SiteConfig {
    pub engine: EngineConfig,
    pub console: ConsoleConfig,
}

/// Canvas scene settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub canvas_height: f64,
    /// Viewport pixels per circle; the count never drops below `min_circles`.
    pub circle_density: f64,
    pub min_circles: usize,
    pub link_distance: f64,
    /// Minimum gap between executed frames (~60Hz).
    pub frame_interval_ms: f64,
    pub particle_cap: usize,
    pub particle_spawn_chance: f64,
    pub rain_spawn_chance: f64,
    pub glyph_spacing: f64,
    pub hue_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_height: 130.0,
            circle_density: 38.4,
            min_circles: 8,
            link_distance: 150.0,
            frame_interval_ms: 16.0,
            particle_cap: 50,
            particle_spawn_chance: 0.1,
            rain_spawn_chance: 0.1,
            glyph_spacing: 14.0,
            hue_step: 0.3,
        }
    }
}

/// Terminal timing and easter-egg settings (all durations in ms).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsoleConfig {
    pub command_delay_ms: f64,
    pub type_echo: bool,
    pub type_interval_ms: f64,
    pub idle_timeout_ms: f64,
    pub secret_phrase: String,
    pub image_clicks_for_admin: u32,
    pub footer_hovers_for_alert: u32,
    pub footer_alert_ms: f64,
    pub arg_interval_ms: f64,
    pub arg_status_interval_ms: f64,
    pub chatter_interval_ms: f64,
    pub chatter_chance: f64,
    /// Chance per interval of logging the pointer position.
    pub tracking_interval_ms: f64,
    pub tracking_chance: f64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            command_delay_ms: 500.0,
            type_echo: true,
            type_interval_ms: 50.0,
            idle_timeout_ms: 60_000.0,
            secret_phrase: "follow the white rabbit".to_string(),
            image_clicks_for_admin: 6,
            footer_hovers_for_alert: 3,
            footer_alert_ms: 2_000.0,
            arg_interval_ms: 1_500.0,
            arg_status_interval_ms: 8_000.0,
            chatter_interval_ms: 8_000.0,
            chatter_chance: 0.3,
            tracking_interval_ms: 5_000.0,
            tracking_chance: 0.1,
        }
    }
}

#[cfg(feature = "serde_json")]
impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, crate::error::SiteError> {
        serde_json::from_str(json).map_err(|e| crate::error::SiteError::Config(e.to_string()))
    }
}
