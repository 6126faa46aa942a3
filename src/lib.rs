//! Neon Deck: the animated header and toy terminal of a cyberpunk personal site.
//!
//! The scene (`engine`) and the terminal (`console`) are plain Rust state machines
//! that run natively under test; `web` binds them to the page. JS calls
//! `start_site()` once the DOM is ready.

use wasm_bindgen::prelude::*;

pub mod audio;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod hud;
pub mod modes;
pub mod prefs;
pub mod scheduler;
pub mod sysinfo;
pub mod web;

pub use config::{ConsoleConfig, EngineConfig, SiteConfig};
pub use console::{Console, Effect, Key, KeyInput};
pub use engine::{Engine, Surface};
pub use error::{CalcError, SiteError};
pub use modes::{Mode, ModeFlags};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// Start the site with the built-in settings.
#[wasm_bindgen]
pub fn start_site() -> Result<(), JsValue> {
    web::start(SiteConfig::default()).map_err(JsValue::from)
}

/// Start the site with a JSON settings override, e.g.
/// `{"console": {"command_delay_ms": 250}}`. Unknown keys are ignored.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_site_with_config(json: &str) -> Result<(), JsValue> {
    let config = SiteConfig::from_json(json)?;
    web::start(config).map_err(JsValue::from)
}
