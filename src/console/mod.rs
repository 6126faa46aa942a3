//! The fake terminal.
//!
//! `Console` owns the scrollback, the line being typed and the command history.
//! Key events come in through `key_down`; anything that takes "time" (the typed-out
//! echo, command latency, multi-step output, the ARG feed) is queued on a
//! virtual-time `Scheduler` and played back by `tick`. Side effects that belong to
//! the page rather than the terminal are handed out through `drain_effects`.

use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::audio::AudioCue;
use crate::config::ConsoleConfig;
use crate::hud;
use crate::modes::{Mode, ModeFlags};
use crate::prefs::{KEY_COMMAND_COUNT, PreferenceStore};
use crate::scheduler::Scheduler;

pub mod calc;
pub mod commands;
mod secrets;

pub use secrets::{ARG_SCRIPT, ARG_STATUS, KONAMI, KonamiDetector, PhraseWindow, SYSTEM_MESSAGES};

use commands::Registry;
use secrets::ArgFeed;

pub const BANNER: [&str; 3] = ["> system boot", "> integrity check ok", "> monitoring enabled"];
pub const CLEARED: [&str; 2] = ["> terminal cleared", "> ready for input"];
pub const PROMPT: &str = "> ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    ArrowUp,
    ArrowDown,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn parse(key: &str) -> Self {
        match key {
            "Backspace" => Key::Backspace,
            "Enter" => Key::Enter,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

/// One keydown, reduced to what the terminal cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    /// Legacy `keyCode`, used for the konami sequence.
    pub code: u32,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl KeyInput {
    pub fn new(key: &str, code: u32) -> Self {
        Self { key: Key::parse(key), code, ctrl: false, meta: false, alt: false }
    }

    /// Build an event from the `key` value alone, deriving the legacy code.
    pub fn from_key(key: &str) -> Self {
        let code = match key {
            "Backspace" => 8,
            "Enter" => 13,
            "ArrowLeft" => 37,
            "ArrowUp" => 38,
            "ArrowRight" => 39,
            "ArrowDown" => 40,
            " " => 32,
            _ => match key.chars().next() {
                Some(c) if key.len() == 1 && c.is_ascii_alphanumeric() => c.to_ascii_uppercase() as u32,
                _ => 0,
            },
        };
        Self::new(key, code)
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    fn shortcut(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Requests for the page, collected until the glue drains them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    ToggleHud,
    ResetCanvas,
    ShowSecretOverlay,
    Rainbow,
    PlayCue(AudioCue),
    /// Footer glitch styling on / off.
    FooterAlert(bool),
}

#[derive(Clone, Debug)]
enum Task {
    /// Append one echoed character to `line`, unless the scrollback was cleared
    /// since (`epoch` no longer current).
    TypeChar { line: usize, epoch: u64, ch: char },
    Dispatch(String),
    Line(String),
    ArgStep,
    ArgStatus,
    Chatter,
    Tracking,
    FooterReset,
}

pub struct Console {
    config: ConsoleConfig,
    modes: Rc<ModeFlags>,
    store: Box<dyn PreferenceStore>,
    registry: Registry,
    scheduler: Scheduler<Task>,
    rng: SmallRng,

    lines: Vec<String>,
    pending: String,
    history: Vec<String>,
    history_cursor: usize,
    effects: Vec<Effect>,
    status: String,
    clock: String,

    admin: bool,
    konami: KonamiDetector,
    phrase: PhraseWindow,
    image_clicks: u32,
    footer_hovers: u32,
    arg: Option<ArgFeed>,
    pointer: (i32, i32),

    epoch: u64,
    typing: usize,
    last_input_ms: f64,
    idle: bool,
    dirty: bool,
}

impl Console {
    pub fn new(config: ConsoleConfig, modes: Rc<ModeFlags>, store: Box<dyn PreferenceStore>) -> Self {
        Self::with_rng(config, modes, store, SmallRng::from_entropy())
    }

    pub fn with_rng(
        config: ConsoleConfig,
        modes: Rc<ModeFlags>,
        store: Box<dyn PreferenceStore>,
        mut rng: SmallRng,
    ) -> Self {
        let status = hud::random_status(&mut rng);
        let phrase = PhraseWindow::new(&config.secret_phrase);
        let mut scheduler = Scheduler::new();
        if config.chatter_chance > 0.0 {
            scheduler.schedule_repeating(config.chatter_interval_ms, Task::Chatter);
        }
        if config.tracking_chance > 0.0 {
            scheduler.schedule_repeating(config.tracking_interval_ms, Task::Tracking);
        }
        Self {
            config,
            modes,
            store,
            registry: Registry::builtin(),
            scheduler,
            rng,
            lines: BANNER.iter().map(|s| s.to_string()).collect(),
            pending: String::new(),
            history: Vec::new(),
            history_cursor: 0,
            effects: Vec::new(),
            status,
            clock: "--:--:--".to_string(),
            admin: false,
            konami: KonamiDetector::default(),
            phrase,
            image_clicks: 0,
            footer_hovers: 0,
            arg: None,
            pointer: (0, 0),
            epoch: 0,
            typing: 0,
            last_input_ms: 0.0,
            idle: false,
            dirty: true,
        }
    }

    /// Feed one keydown. Returns true when the terminal used the key, in which
    /// case the page should suppress the browser default.
    pub fn key_down(&mut self, input: KeyInput) -> bool {
        self.note_activity();
        if self.konami.feed(input.code) {
            self.konami_activated();
        }

        if input.shortcut() {
            return match input.key {
                Key::Char(c) => self.shortcut(c.to_ascii_lowercase()),
                _ => false,
            };
        }

        match input.key {
            Key::Char(c) if !input.alt => {
                self.pending.push(c);
                self.dirty = true;
                if self.phrase.feed(c) {
                    self.phrase_recognized();
                }
                true
            }
            Key::Backspace => {
                if self.pending.pop().is_some() {
                    self.dirty = true;
                }
                true
            }
            Key::ArrowUp => {
                if !self.history.is_empty() && self.history_cursor > 0 {
                    self.history_cursor -= 1;
                    self.pending = self.history[self.history_cursor].clone();
                    self.dirty = true;
                }
                true
            }
            Key::ArrowDown => {
                if self.history_cursor + 1 < self.history.len() {
                    self.history_cursor += 1;
                    self.pending = self.history[self.history_cursor].clone();
                } else {
                    self.history_cursor = self.history.len();
                    self.pending.clear();
                }
                self.dirty = true;
                true
            }
            Key::Enter => {
                self.submit();
                true
            }
            Key::Char(_) | Key::Other => false,
        }
    }

    fn shortcut(&mut self, c: char) -> bool {
        match c {
            'k' => {
                self.reset_scrollback();
                self.log("terminal reset");
            }
            'm' => {
                self.effects.push(Effect::ToggleHud);
                self.log("HUD toggled");
            }
            'r' => self.toggle_mode(Mode::Matrix),
            'c' => {
                self.effects.push(Effect::ResetCanvas);
                self.log("canvas reset");
            }
            'p' => self.toggle_mode(Mode::Particles),
            _ => return false,
        }
        true
    }

    /// Submit the pending line.
    pub fn submit(&mut self) {
        if self.pending.trim().is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.pending);
        let command = raw.trim().to_lowercase();
        log::debug!("submit {command:?}");

        self.history.push(command.clone());
        self.history_cursor = self.history.len();
        self.store.increment(KEY_COMMAND_COUNT);

        let echo = format!("{PROMPT}{raw}");
        let typed_for = self.echo(echo);
        self.scheduler.schedule_once(typed_for + self.config.command_delay_ms, Task::Dispatch(command));
        self.dirty = true;
    }

    /// Run a command from one of the page's shortcut buttons.
    pub fn run_button(&mut self, command: &str) {
        let command = command.trim().to_lowercase();
        if command.is_empty() {
            return;
        }
        self.log(format!("executing: {command}"));
        self.scheduler.schedule_once(self.config.command_delay_ms, Task::Dispatch(command));
    }

    /// Append the echo line, typed out if configured. Returns how long the
    /// typing takes.
    fn echo(&mut self, echo: String) -> f64 {
        if !self.config.type_echo {
            self.lines.push(echo);
            return 0.0;
        }
        let line = self.lines.len();
        self.lines.push(String::new());
        let step = self.config.type_interval_ms;
        let mut at = 0.0;
        for ch in echo.chars() {
            at += step;
            self.typing += 1;
            self.scheduler.schedule_once(at, Task::TypeChar { line, epoch: self.epoch, ch });
        }
        at
    }

    /// Play every task due up to `now_ms`, then check for idleness.
    pub fn tick(&mut self, now_ms: f64) {
        while let Some((_, task)) = self.scheduler.pop_due(now_ms) {
            self.run(task);
        }
        self.scheduler.advance_to(now_ms);
        self.check_idle();
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::TypeChar { line, epoch, ch } => {
                self.typing = self.typing.saturating_sub(1);
                if epoch != self.epoch {
                    return;
                }
                if let Some(l) = self.lines.get_mut(line) {
                    l.push(ch);
                    self.dirty = true;
                }
            }
            Task::Dispatch(command) => self.dispatch(&command),
            Task::Line(text) => self.log(text),
            Task::ArgStep => self.arg_step(),
            Task::ArgStatus => self.arg_status(),
            Task::Chatter => self.chatter(),
            Task::Tracking => self.tracking(),
            Task::FooterReset => self.footer_reset(),
        }
    }

    fn dispatch(&mut self, command: &str) {
        match self.registry.resolve(command) {
            Some((handler, invocation)) => handler(self, invocation),
            None => self.log(format!("command not found: {command}")),
        }
    }

    fn note_activity(&mut self) {
        self.last_input_ms = self.scheduler.now();
        if self.idle {
            self.idle = false;
            self.log("activity resumed");
        }
    }

    fn check_idle(&mut self) {
        let timeout = self.config.idle_timeout_ms;
        if timeout <= 0.0 || self.idle {
            return;
        }
        if self.scheduler.now() - self.last_input_ms >= timeout {
            self.idle = true;
            self.log("user idle detected");
        }
    }

    /// Append a line to the scrollback now.
    pub fn log(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.dirty = true;
    }

    /// Append a line after `delay_ms`. Not cancelled by `clear`.
    pub fn log_after(&mut self, delay_ms: f64, line: impl Into<String>) {
        self.scheduler.schedule_once(delay_ms, Task::Line(line.into()));
    }

    /// Reset the scrollback to the cleared banner.
    pub fn reset_scrollback(&mut self) {
        self.lines = CLEARED.iter().map(|s| s.to_string()).collect();
        self.epoch += 1;
        self.dirty = true;
    }

    pub fn set_mode(&mut self, mode: Mode, on: bool) {
        self.modes.set_mode(mode, on);
        let msg = match (mode, on) {
            (Mode::Matrix, true) => "matrix rain activated",
            (Mode::Matrix, false) => "matrix rain deactivated",
            (Mode::Particles, true) => "particles enabled",
            (Mode::Particles, false) => "particles disabled",
        };
        log::info!("{msg}");
        self.log(msg);
    }

    pub fn toggle_mode(&mut self, mode: Mode) {
        let on = !self.modes.get_mode(mode);
        self.set_mode(mode, on);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn prompt_line(&self) -> String {
        format!("{PROMPT}{}", self.pending)
    }

    /// Scrollback plus the live prompt, newline separated.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out.push_str(&self.prompt_line());
        out
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// True once after anything visible changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_clock(&mut self, clock: impl Into<String>) {
        self.clock = clock.into();
    }

    /// An echo is still being typed out.
    pub fn is_typing(&self) -> bool {
        self.typing > 0
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn PreferenceStore {
        self.store.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;

    fn quiet() -> ConsoleConfig {
        ConsoleConfig {
            type_echo: false,
            idle_timeout_ms: 0.0,
            chatter_chance: 0.0,
            tracking_chance: 0.0,
            ..ConsoleConfig::default()
        }
    }

    fn console(config: ConsoleConfig) -> Console {
        Console::with_rng(config, ModeFlags::shared(), Box::new(MemoryStore::new()), SmallRng::seed_from_u64(7))
    }

    fn type_line(con: &mut Console, text: &str) {
        for c in text.chars() {
            con.key_down(KeyInput::from_key(&c.to_string()));
        }
    }

    #[test]
    fn key_parsing() {
        assert_eq!(Key::parse("a"), Key::Char('a'));
        assert_eq!(Key::parse(" "), Key::Char(' '));
        assert_eq!(Key::parse("Shift"), Key::Other);
        assert_eq!(KeyInput::from_key("b").code, 66);
        assert_eq!(KeyInput::from_key("ArrowLeft").code, 37);
    }

    #[test]
    fn editing_and_prompt() {
        let mut con = console(quiet());
        type_line(&mut con, "pinh");
        con.key_down(KeyInput::from_key("Backspace"));
        con.key_down(KeyInput::from_key("g"));
        assert_eq!(con.prompt_line(), "> ping");
        assert!(con.render().ends_with("> monitoring enabled\n> ping"));
    }

    #[test]
    fn whitespace_submit_is_ignored() {
        let mut con = console(quiet());
        type_line(&mut con, "   ");
        con.key_down(KeyInput::from_key("Enter"));
        assert!(con.history().is_empty());
        assert_eq!(con.lines().len(), BANNER.len());
    }

    #[test]
    fn typed_echo_then_delayed_output() {
        let mut con = console(ConsoleConfig { type_echo: true, ..quiet() });
        type_line(&mut con, "Ping");
        con.key_down(KeyInput::from_key("Enter"));
        assert!(con.is_typing());
        // "> Ping" is 6 chars at 50ms.
        con.tick(150.0);
        assert_eq!(con.lines().last().map(String::as_str), Some("> P"));
        con.tick(300.0);
        assert!(!con.is_typing());
        assert_eq!(con.lines().last().map(String::as_str), Some("> Ping"));
        con.tick(799.0);
        assert_eq!(con.lines().last().map(String::as_str), Some("> Ping"));
        con.tick(800.0);
        assert_eq!(con.lines().last().map(String::as_str), Some("pong"));
    }

    #[test]
    fn clear_drops_unfinished_echo() {
        let mut con = console(ConsoleConfig { type_echo: true, ..quiet() });
        type_line(&mut con, "ls");
        con.key_down(KeyInput::from_key("Enter"));
        con.tick(50.0);
        con.key_down(KeyInput::from_key("k").with_ctrl());
        con.tick(1_000.0);
        assert_eq!(con.lines()[..3], ["> terminal cleared", "> ready for input", "terminal reset"]);
        assert!(con.lines().iter().all(|l| !l.starts_with("> l")));
    }

    #[test]
    fn shortcuts() {
        let modes = ModeFlags::shared();
        let mut con = Console::with_rng(quiet(), modes.clone(), Box::new(MemoryStore::new()), SmallRng::seed_from_u64(1));
        assert!(con.key_down(KeyInput::from_key("r").with_ctrl()));
        assert!(modes.get_mode(Mode::Matrix));
        assert!(con.key_down(KeyInput::from_key("P").with_meta()));
        assert!(!modes.get_mode(Mode::Particles));
        con.key_down(KeyInput::from_key("m").with_ctrl());
        con.key_down(KeyInput::from_key("c").with_ctrl());
        assert_eq!(con.drain_effects(), vec![Effect::ToggleHud, Effect::ResetCanvas]);
        assert!(!con.key_down(KeyInput::from_key("v").with_ctrl()));
        assert_eq!(con.pending(), "");
    }

    #[test]
    fn idle_and_resume() {
        let mut con = console(ConsoleConfig { idle_timeout_ms: 1_000.0, ..quiet() });
        con.tick(999.0);
        assert!(!con.lines().iter().any(|l| l == "user idle detected"));
        con.tick(1_000.0);
        con.tick(5_000.0);
        assert_eq!(con.lines().iter().filter(|l| *l == "user idle detected").count(), 1);
        con.key_down(KeyInput::from_key("x"));
        assert_eq!(con.lines().last().map(String::as_str), Some("activity resumed"));
        con.tick(5_500.0);
        assert_eq!(con.lines().last().map(String::as_str), Some("activity resumed"));
    }

    #[test]
    fn chatter_respects_chance() {
        let mut con = console(ConsoleConfig { chatter_chance: 1.0, ..quiet() });
        con.tick(8_000.0);
        let last = con.lines().last().cloned().unwrap_or_default();
        assert!(SYSTEM_MESSAGES.contains(&last.as_str()));
    }

    #[test]
    fn tracking_reports_last_pointer_position() {
        let mut con = console(ConsoleConfig { tracking_chance: 1.0, ..quiet() });
        con.pointer_moved(10.0, 20.0);
        con.pointer_moved(312.6, 48.2);
        con.tick(4_999.0);
        assert!(!con.lines().iter().any(|l| l.starts_with("tracking")));
        con.tick(5_000.0);
        assert_eq!(con.lines().last().map(String::as_str), Some("tracking: 312, 48"));
    }

    #[test]
    fn backspace_on_empty_line_is_a_no_op() {
        let mut con = console(quiet());
        let before = con.lines().to_vec();
        con.key_down(KeyInput::from_key("Backspace"));
        assert_eq!(con.pending(), "");
        assert_eq!(con.lines(), before.as_slice());
        type_line(&mut con, "ab");
        for _ in 0..4 {
            con.key_down(KeyInput::from_key("Backspace"));
        }
        assert_eq!(con.pending(), "");
        type_line(&mut con, "c");
        assert_eq!(con.pending(), "c");
    }

    #[test]
    fn commands_are_counted() {
        let mut con = console(quiet());
        type_line(&mut con, "ping");
        con.key_down(KeyInput::from_key("Enter"));
        type_line(&mut con, "whoami");
        con.key_down(KeyInput::from_key("Enter"));
        con.tick(1_000.0);
        assert_eq!(con.store().get_count(KEY_COMMAND_COUNT), 2);
        assert!(con.lines().iter().any(|l| l == "commands run: 2"));
    }
}
