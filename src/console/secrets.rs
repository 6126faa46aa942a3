//! Easter eggs and the admin / ARG sequence.
//!
//! All triggers funnel into `Console::enable_admin_mode`, which only does
//! anything the first time it is called.

use std::collections::VecDeque;

use rand::Rng;

use super::{Console, Effect, Task};
use crate::audio::AudioCue;
use crate::prefs::KEY_SECRETS_FOUND;

/// up up down down left right left right b a, as legacy `keyCode`s.
pub const KONAMI: [u32; 10] = [38, 38, 40, 40, 37, 39, 37, 39, 66, 65];

pub const ARG_SCRIPT: &[&str] = &[
    "user detected",
    "session initialized",
    "rot13: gnpxvat guvf zrffntr",
    "base64: dHJlYmthLnNpdGVuYyBleHBlcmllbmNl",
    "scan complete",
    "alert: unknown process",
    "decrypting... 23%",
    "decrypting... 47%",
    "decrypting... 78%",
    "decrypting... 100%",
    "access granted: level 2",
    "loading neural interface...",
    "connection established",
    "monitoring active",
    "threat level: minimal",
    "system integrity: 98.7%",
    "backup protocols engaged",
    "data stream active",
];

pub const ARG_STATUS: &[&str] = &[
    "ping: 127.0.0.1 - success",
    "firewall: active",
    "antivirus: scanning...",
    "memory: stable",
    "network: secure",
    "cpu: optimal",
    "temperature: normal",
];

pub const SYSTEM_MESSAGES: &[&str] = &[
    "ping test successful",
    "memory scan complete",
    "network probe detected",
    "firewall check passed",
    "data integrity verified",
    "background process started",
    "cache cleared",
    "system optimization complete",
];

/// Trailing window over the last ten key codes.
#[derive(Default, Debug)]
pub struct KonamiDetector {
    recent: VecDeque<u32>,
}

impl KonamiDetector {
    /// Returns true when the code completes the sequence. The window is emptied
    /// on a match so the same keys cannot fire twice.
    pub fn feed(&mut self, code: u32) -> bool {
        if self.recent.len() == KONAMI.len() {
            self.recent.pop_front();
        }
        self.recent.push_back(code);
        if self.recent.iter().eq(KONAMI.iter()) {
            self.recent.clear();
            return true;
        }
        false
    }
}

/// Matches a phrase typed anywhere in the keystroke stream.
#[derive(Debug)]
pub struct PhraseWindow {
    phrase: Vec<char>,
    recent: VecDeque<char>,
}

impl PhraseWindow {
    pub fn new(phrase: &str) -> Self {
        let phrase: Vec<char> = phrase.to_lowercase().chars().collect();
        Self { recent: VecDeque::with_capacity(phrase.len()), phrase }
    }

    pub fn feed(&mut self, c: char) -> bool {
        if self.phrase.is_empty() {
            return false;
        }
        if self.recent.len() == self.phrase.len() {
            self.recent.pop_front();
        }
        self.recent.extend(c.to_lowercase());
        while self.recent.len() > self.phrase.len() {
            self.recent.pop_front();
        }
        if self.recent.iter().eq(self.phrase.iter()) {
            self.recent.clear();
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub(super) struct ArgFeed {
    pub(super) next: usize,
    pub(super) handle: crate::scheduler::TaskHandle,
}

impl Console {
    /// Unlock admin mode. Only the first call has side effects; returns whether
    /// this call was that first one.
    pub fn enable_admin_mode(&mut self) -> bool {
        if self.admin {
            log::debug!("admin mode already active");
            return false;
        }
        self.admin = true;
        log::info!("admin mode enabled");
        self.log("ADMIN MODE ENABLED");
        self.effects.push(Effect::ShowSecretOverlay);
        self.effects.push(Effect::PlayCue(AudioCue::Secret));
        self.store.increment(KEY_SECRETS_FOUND);
        let handle = self.scheduler.schedule_repeating(self.config.arg_interval_ms, Task::ArgStep);
        self.arg = Some(ArgFeed { next: 0, handle });
        true
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Click on the profile image.
    pub fn image_click(&mut self) {
        self.image_clicks += 1;
        let clicks = self.image_clicks;
        self.log(format!("image ping {clicks}"));
        if clicks == self.config.image_clicks_for_admin && !self.admin {
            self.enable_admin_mode();
        }
    }

    /// Pointer entered the footer.
    pub fn footer_hover(&mut self) {
        self.footer_hovers += 1;
        if self.footer_hovers == self.config.footer_hovers_for_alert {
            self.log("footer anomaly detected");
            self.effects.push(Effect::FooterAlert(true));
            self.scheduler.schedule_once(self.config.footer_alert_ms, Task::FooterReset);
        }
    }

    pub(super) fn konami_activated(&mut self) {
        log::info!("konami code entered");
        self.log("KONAMI CODE ACTIVATED");
        self.effects.push(Effect::Rainbow);
        self.enable_admin_mode();
    }

    pub(super) fn phrase_recognized(&mut self) {
        self.log("passphrase accepted");
        self.enable_admin_mode();
    }

    pub(super) fn arg_step(&mut self) {
        let Some(feed) = self.arg.as_mut() else { return };
        if let Some(msg) = ARG_SCRIPT.get(feed.next) {
            feed.next += 1;
            self.log(*msg);
            return;
        }
        let finished = feed.handle;
        self.scheduler.cancel(finished);
        self.arg = None;
        self.scheduler.schedule_repeating(self.config.arg_status_interval_ms, Task::ArgStatus);
    }

    pub(super) fn arg_status(&mut self) {
        let msg = ARG_STATUS[self.rng.gen_range(0..ARG_STATUS.len())];
        self.log(msg);
    }

    pub(super) fn chatter(&mut self) {
        if self.rng.gen_bool(self.config.chatter_chance.clamp(0.0, 1.0)) {
            let msg = SYSTEM_MESSAGES[self.rng.gen_range(0..SYSTEM_MESSAGES.len())];
            self.log(msg);
        }
    }

    /// Remember the pointer for the occasional `tracking` line.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x as i32, y as i32);
    }

    pub(super) fn tracking(&mut self) {
        if self.rng.gen_bool(self.config.tracking_chance.clamp(0.0, 1.0)) {
            let (x, y) = self.pointer;
            self.log(format!("tracking: {x}, {y}"));
        }
    }

    pub(super) fn footer_reset(&mut self) {
        self.footer_hovers = 0;
        self.effects.push(Effect::FooterAlert(false));
    }
}
