//! Browser glue: finds the page elements, owns the live `Engine` / `Console`, and
//! drives both from one `requestAnimationFrame` loop.
//!
//! Page-level timers (status text, HUD, clock, uptime) ride on a second
//! `Scheduler` ticked from the same loop instead of `setInterval`.
//! Every element except `window` / `document` is optional: a missing one is logged
//! once and that feature is skipped.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, Window, window};

use crate::audio::{AudioCue, AudioSink, HtmlAudioSink};
use crate::config::SiteConfig;
use crate::console::{Console, Effect, KeyInput};
use crate::engine::{Engine, Surface};
use crate::error::SiteError;
use crate::hud::{self, HudStats};
use crate::modes::ModeFlags;
use crate::prefs::{LocalStorageStore, MemoryStore, PreferenceStore, Theme};
use crate::scheduler::Scheduler;
use crate::sysinfo;

const STATUS_INTERVAL_MS: f64 = 2_500.0;
const HUD_INTERVAL_MS: f64 = 2_000.0;
const CLOCK_INTERVAL_MS: f64 = 1_000.0;
const RAINBOW_MS: f64 = 10_000.0;
const RAINBOW_KEYFRAMES: &str =
    "@keyframes rainbow { 0% { filter: hue-rotate(0deg); } 100% { filter: hue-rotate(360deg); } }";

/// `Surface` over the page's 2D canvas.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn find(doc: &Document, id: &'static str) -> Result<Self, SiteError> {
        let canvas: HtmlCanvasElement = doc
            .get_element_by_id(id)
            .ok_or(SiteError::MissingElement(id))?
            .dyn_into()
            .map_err(|_| SiteError::Js(format!("#{id} is not a canvas")))?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(SiteError::Js("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| SiteError::Js("unexpected context type".into()))?;
        Ok(Self { canvas, ctx })
    }

    fn fit(&self, width: f64, height: f64) {
        if self.canvas.width() != width as u32 {
            self.canvas.set_width(width as u32);
        }
        if self.canvas.height() != height as u32 {
            self.canvas.set_height(height as u32);
        }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &str) {
        self.ctx.set_fill_style_str(style);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, style: &str, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(style);
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, radius, 0.0, TAU);
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, style: &str) {
        self.ctx.set_stroke_style_str(style);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(x1, y1);
        self.ctx.line_to(x2, y2);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &str, font: &str) {
        self.ctx.set_fill_style_str(style);
        self.ctx.set_font(font);
        let _ = self.ctx.fill_text(text, x, y);
    }
}

#[derive(Clone, Copy, Debug)]
enum PageTimer {
    Status,
    Hud,
    Clock,
    RainbowOff,
}

struct Site {
    win: Window,
    doc: Document,
    engine: Engine,
    surface: Option<CanvasSurface>,
    console: Console,
    audio: HtmlAudioSink,
    theme: Theme,
    hud: HudStats,
    rng: SmallRng,
    timers: Scheduler<PageTimer>,
    started_ms: f64,
    ambient_started: bool,
}

thread_local! {
    static SITE: RefCell<Option<Site>> = const { RefCell::new(None) };
}

fn with_site(f: impl FnOnce(&mut Site)) {
    SITE.with(|cell| {
        if let Some(site) = cell.borrow_mut().as_mut() {
            f(site);
        }
    });
}

fn now_ms(win: &Window) -> f64 {
    win.performance().map(|p| p.now()).unwrap_or(0.0)
}

fn inner_size(win: &Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

fn html(doc: &Document, id: &'static str) -> Option<HtmlElement> {
    let el = doc.get_element_by_id(id).and_then(|e| e.dyn_into::<HtmlElement>().ok());
    if el.is_none() {
        log::debug!("#{id} not on this page");
    }
    el
}

fn set_text(doc: &Document, id: &'static str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::warn!("style {property}: {}", SiteError::from(e));
    }
}

/// Wire everything up and start the frame loop.
pub fn start(config: SiteConfig) -> Result<(), SiteError> {
    let win = window().ok_or(SiteError::MissingElement("window"))?;
    let doc = win.document().ok_or(SiteError::MissingElement("document"))?;

    let store: Box<dyn PreferenceStore> = match LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("preferences will not persist: {e}");
            Box::new(MemoryStore::new())
        }
    };
    let theme = Theme::load(store.as_ref());
    apply_theme(&doc, theme);

    let (width, _) = inner_size(&win);
    let modes = ModeFlags::shared();
    let engine = Engine::new(config.engine, modes.clone(), width);
    let surface = match CanvasSurface::find(&doc, "animationCanvas") {
        Ok(s) => {
            s.fit(engine.width(), engine.height());
            Some(s)
        }
        Err(e) => {
            log::warn!("animation disabled: {e}");
            None
        }
    };
    let console = Console::new(config.console, modes, store);

    let mut rng = SmallRng::from_entropy();
    let hud = HudStats::random(&mut rng);
    let mut timers = Scheduler::new();
    let started_ms = now_ms(&win);
    timers.advance_to(started_ms);
    timers.schedule_repeating(STATUS_INTERVAL_MS, PageTimer::Status);
    timers.schedule_repeating(HUD_INTERVAL_MS, PageTimer::Hud);
    timers.schedule_repeating(CLOCK_INTERVAL_MS, PageTimer::Clock);

    let mut site = Site {
        audio: HtmlAudioSink::new(doc.clone()),
        win: win.clone(),
        doc: doc.clone(),
        engine,
        surface,
        console,
        theme,
        hud,
        rng,
        timers,
        started_ms,
        ambient_started: false,
    };
    site.show_status();
    site.show_hud();
    site.show_clock();
    site.show_system_info();
    site.render_terminal();
    SITE.with(|cell| *cell.borrow_mut() = Some(site));

    install_listeners(&win, &doc)?;
    start_loop();
    log::info!("site started ({width}px wide)");
    Ok(())
}

fn apply_theme(doc: &Document, theme: Theme) {
    if let Some(body) = doc.body() {
        let _ = body.class_list().toggle_with_force("dark-mode", theme == Theme::Dark);
    }
    match doc.query_selector(Theme::ICON_SELECTOR).ok().flatten() {
        Some(icon) => {
            let (stale, fresh) = theme.icon_swap();
            let list = icon.class_list();
            let _ = list.remove_1(stale);
            let _ = list.add_1(fresh);
        }
        None => log::debug!("no theme icon on this page"),
    }
}

impl Site {
    fn frame(&mut self, ts: f64) {
        let (width, _) = inner_size(&self.win);
        self.engine.resize(width);
        if let Some(s) = &self.surface {
            s.fit(self.engine.width(), self.engine.height());
        }
        self.engine.frame(ts, self.surface.as_mut().map(|s| s as &mut dyn Surface));

        while let Some((_, timer)) = self.timers.pop_due(ts) {
            self.on_timer(timer);
        }
        self.timers.advance_to(ts);
        self.console.tick(ts);
        self.flush();
    }

    fn on_timer(&mut self, timer: PageTimer) {
        match timer {
            PageTimer::Status => self.show_status(),
            PageTimer::Hud => {
                self.hud.step(&mut self.rng);
                self.show_hud();
            }
            PageTimer::Clock => self.show_clock(),
            PageTimer::RainbowOff => {
                if let Some(body) = self.doc.body() {
                    set_style(&body, "animation", "");
                }
            }
        }
    }

    /// Apply queued console effects and repaint the terminal if needed.
    fn flush(&mut self) {
        for effect in self.console.drain_effects() {
            self.apply(effect);
        }
        if self.console.take_dirty() {
            self.render_terminal();
        }
    }

    fn apply(&mut self, effect: Effect) {
        log::debug!("effect {effect:?}");
        match effect {
            Effect::ToggleHud => {
                if let Some(hud) = html(&self.doc, "hudOverlay") {
                    let hidden = hud.style().get_property_value("display").is_ok_and(|d| d == "none");
                    set_style(&hud, "display", if hidden { "block" } else { "none" });
                }
            }
            Effect::ResetCanvas => self.engine.reset(),
            Effect::ShowSecretOverlay => {
                if let Some(overlay) = html(&self.doc, "secretOverlay") {
                    set_style(&overlay, "display", "flex");
                }
            }
            Effect::Rainbow => {
                self.ensure_rainbow_keyframes();
                if let Some(body) = self.doc.body() {
                    set_style(&body, "animation", "rainbow 2s infinite");
                }
                self.timers.schedule_once(RAINBOW_MS, PageTimer::RainbowOff);
            }
            Effect::PlayCue(cue) => self.audio.cue(cue),
            Effect::FooterAlert(on) => {
                let footer = self.doc.query_selector("footer").ok().flatten();
                if let Some(footer) = footer.and_then(|f| f.dyn_into::<HtmlElement>().ok()) {
                    set_style(&footer, "color", if on { "#ff6b6b" } else { "" });
                }
            }
        }
    }

    fn ensure_rainbow_keyframes(&self) {
        if self.doc.get_element_by_id("konami-style").is_some() {
            return;
        }
        let Some(head) = self.doc.head() else { return };
        match self.doc.create_element("style") {
            Ok(style) => {
                style.set_id("konami-style");
                style.set_text_content(Some(RAINBOW_KEYFRAMES));
                let _ = head.append_child(&style);
            }
            Err(e) => log::warn!("rainbow style: {}", SiteError::from(e)),
        }
    }

    fn render_terminal(&self) {
        if let Some(term) = html(&self.doc, "terminal") {
            term.set_text_content(Some(&self.console.render()));
            term.set_scroll_top(term.scroll_height());
        }
    }

    fn show_status(&mut self) {
        let status = hud::random_status(&mut self.rng);
        set_text(&self.doc, "statusText", &status);
        self.console.set_status(status);
    }

    fn show_hud(&self) {
        let Some(el) = html(&self.doc, "hudOverlay") else { return };
        let body: String = self.hud.lines().iter().map(|l| format!("<div>{l}</div>")).collect();
        el.set_inner_html(&body);
        set_style(&el, "color", self.hud.alert_level().color());
    }

    fn show_clock(&mut self) {
        let d = js_sys::Date::new_0();
        let clock = sysinfo::format_clock(
            d.get_full_year(),
            d.get_month(),
            d.get_date(),
            d.get_hours(),
            d.get_minutes(),
            d.get_seconds(),
        );
        set_text(&self.doc, "clockText", &clock);
        self.console.set_clock(clock);
        let uptime = sysinfo::format_uptime(now_ms(&self.win) - self.started_ms);
        set_text(&self.doc, "uptime-info", &uptime);
    }

    fn show_system_info(&self) {
        let agent = self.win.navigator().user_agent().unwrap_or_default();
        set_text(&self.doc, "os-info", sysinfo::detect_os(&agent));
        set_text(&self.doc, "browser-info", sysinfo::detect_browser(&agent));
        let (w, h) = inner_size(&self.win);
        set_text(&self.doc, "resolution-info", &sysinfo::format_resolution(w, h));
    }

    fn key_down(&mut self, evt: &web_sys::KeyboardEvent) {
        // Typing only goes to the terminal while nothing else has focus.
        let body_focused = match (self.doc.active_element(), self.doc.body()) {
            (Some(active), Some(body)) => active == Element::from(body),
            _ => true,
        };
        self.console.tick(now_ms(&self.win));
        let mut input = KeyInput::new(&evt.key(), evt.key_code());
        input.ctrl = evt.ctrl_key();
        input.meta = evt.meta_key();
        input.alt = evt.alt_key();
        if !body_focused && !(input.ctrl || input.meta) {
            // Still feeds the konami detector and idle tracking.
            input.key = crate::console::Key::Other;
        }
        if self.console.key_down(input) {
            evt.prevent_default();
        }
        self.flush();
    }
}

/// Attach a listener whose closure lives for the rest of the page.
fn listen<E: JsCast + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    mut f: impl FnMut(E) + 'static,
) -> Result<(), SiteError> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        if let Ok(evt) = evt.dyn_into::<E>() {
            f(evt);
        }
    }) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen_all(doc: &Document, selector: &str, event: &str, f: impl Fn(&Element) + Clone + 'static) {
    let nodes = match doc.query_selector_all(selector) {
        Ok(nodes) => nodes,
        Err(e) => {
            log::warn!("{selector}: {}", SiteError::from(e));
            return;
        }
    };
    for i in 0..nodes.length() {
        let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else { continue };
        let f = f.clone();
        let target = el.clone();
        if let Err(e) = listen(&el, event, move |_: web_sys::Event| f(&target)) {
            log::warn!("{selector} {event}: {e}");
        }
    }
}

fn listen_id(doc: &Document, id: &'static str, event: &str, f: impl FnMut(web_sys::Event) + 'static) {
    match doc.get_element_by_id(id) {
        Some(el) => {
            if let Err(e) = listen(&el, event, f) {
                log::warn!("#{id} {event}: {e}");
            }
        }
        None => log::debug!("#{id} not on this page"),
    }
}

fn install_listeners(win: &Window, doc: &Document) -> Result<(), SiteError> {
    listen(doc, "keydown", |evt: web_sys::KeyboardEvent| with_site(|s| s.key_down(&evt)))?;

    listen(win, "resize", |_: web_sys::Event| {
        with_site(|s| {
            let (width, _) = inner_size(&s.win);
            s.engine.resize(width);
            s.show_system_info();
        })
    })?;

    for cue in AudioCue::ALL {
        listen_id(doc, cue.element_id(), "error", |evt| {
            let src = evt
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlMediaElement>().ok())
                .map(|el| el.src())
                .unwrap_or_default();
            log::warn!("audio failed to load: {src}");
        });
    }

    listen(doc, "mousemove", |evt: web_sys::MouseEvent| {
        with_site(|s| s.console.pointer_moved(evt.client_x() as f64, evt.client_y() as f64))
    })?;

    // Browsers only allow audio after a user gesture.
    listen(doc, "click", |_: web_sys::MouseEvent| {
        with_site(|s| {
            if !s.ambient_started {
                s.ambient_started = true;
                s.audio.cue(AudioCue::Ambient);
            }
        })
    })?;

    listen_id(doc, "imageSecret", "click", |_| {
        with_site(|s| {
            s.console.image_click();
            s.flush();
        })
    });
    listen_id(doc, "secretOverlay", "click", |_| {
        with_site(|s| {
            if let Some(overlay) = html(&s.doc, "secretOverlay") {
                set_style(&overlay, "display", "none");
            }
        })
    });
    listen_id(doc, "theme-toggle", "click", |_| {
        with_site(|s| {
            s.theme = s.theme.toggle(s.console.store_mut());
            apply_theme(&s.doc, s.theme);
            log::info!("theme {}", s.theme.as_str());
        })
    });

    match doc.query_selector("footer").ok().flatten() {
        Some(footer) => listen(&footer, "mouseenter", |_: web_sys::MouseEvent| {
            with_site(|s| {
                s.console.footer_hover();
                s.flush();
            })
        })?,
        None => log::debug!("no footer on this page"),
    }

    listen_all(doc, ".cmd-btn", "click", |btn| {
        let Some(cmd) = btn.get_attribute("data-cmd") else { return };
        with_site(|s| {
            s.console.run_button(&cmd);
            s.flush();
        })
    });
    listen_all(doc, "button, .image-card", "mouseenter", |_| with_site(|s| s.audio.cue(AudioCue::Hover)));
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(win: &Window, f: &FrameCallback) {
    if let Some(cb) = f.borrow().as_ref() {
        let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_site(|s| s.frame(ts));
        if let Some(w) = window() {
            request_frame(&w, &f);
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        request_frame(&w, &g);
    }
}
