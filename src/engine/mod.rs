//! Canvas scene: drifting constellation, particle overlay and matrix rain.
//!
//! The engine owns all scene state and is driven one frame at a time by the
//! browser's animation callback (see `web::start`). It never touches
//! the DOM itself; drawing goes through the `Surface` trait so the whole update
//! runs natively in tests. When no surface is available (missing canvas) the
//! physics keeps running against a `NullSurface` that drops every call.
//!
//! Frame order:
//! - throttle to ~60Hz
//! - clear
//! - particles (overlay on, matrix off)
//! - circles + proximity links (matrix off)
//! - matrix rain (matrix on)

mod circle;
mod particle;
mod rain;
mod surface;

use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub use circle::{Bounce, Circle};
pub use particle::Particle;
pub use rain::{MATRIX_CHARS, RainDrop};
pub use surface::{DrawOp, NullSurface, RecordingSurface, Surface};

use crate::config::EngineConfig;
use crate::modes::{Mode, ModeFlags};

const PARTICLE_STYLE: &str = "rgba(255, 255, 255, 0.3)";
const RAIN_WASH: &str = "rgba(0, 0, 0, 0.05)";
const RAIN_STYLE: &str = "#0f0";
const RAIN_FONT: &str = "14px monospace";

/// Line between two circles closer than the link distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub width: f64,
}

pub struct Engine {
    config: EngineConfig,
    modes: Rc<ModeFlags>,
    rng: SmallRng,
    width: f64,
    height: f64,
    circles: Vec<Circle>,
    particles: Vec<Particle>,
    rain: Vec<RainDrop>,
    hue: f64,
    last_frame_ms: Option<f64>,
    // Matrix flag as of the previous executed frame, to detect toggles.
    matrix_seen: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, modes: Rc<ModeFlags>, width: f64) -> Self {
        Self::with_rng(config, modes, width, SmallRng::from_entropy())
    }

    pub fn with_rng(config: EngineConfig, modes: Rc<ModeFlags>, width: f64, rng: SmallRng) -> Self {
        let matrix_seen = modes.get_mode(Mode::Matrix);
        let mut engine = Self {
            height: config.canvas_height,
            config,
            modes,
            rng,
            width: width.max(0.0),
            circles: Vec::new(),
            particles: Vec::new(),
            rain: Vec::new(),
            hue: 0.0,
            last_frame_ms: None,
            matrix_seen,
        };
        engine.load_circles();
        engine
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn rain(&self) -> &[RainDrop] {
        &self.rain
    }

    /// Mutable access for scripted scenes and tests.
    pub fn circles_mut(&mut self) -> &mut Vec<Circle> {
        &mut self.circles
    }

    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    pub fn rain_mut(&mut self) -> &mut Vec<RainDrop> {
        &mut self.rain
    }

    /// Number of circles for a viewport width.
    pub fn circle_count_for(&self, width: f64) -> usize {
        let by_density = (width / self.config.circle_density).floor().max(0.0) as usize;
        by_density.max(self.config.min_circles)
    }

    fn load_circles(&mut self) {
        let count = self.circle_count_for(self.width);
        let (w, h) = (self.width, self.height);
        self.circles = (0..count).map(|_| Circle::random(&mut self.rng, w, h)).collect();
    }

    /// Follow the viewport width. The constellation is rebuilt at the new density;
    /// particles and rain carry on inside the new bounds.
    pub fn resize(&mut self, width: f64) {
        let width = width.max(0.0);
        if width == self.width {
            return;
        }
        log::debug!("canvas resized {} -> {}", self.width, width);
        self.width = width;
        self.load_circles();
    }

    /// Canvas reset: fresh constellation, no rain.
    pub fn reset(&mut self) {
        self.rain.clear();
        self.load_circles();
    }

    /// Run one animation callback. Returns false when the frame was throttled.
    pub fn frame(&mut self, now_ms: f64, surface: Option<&mut dyn Surface>) -> bool {
        if let Some(last) = self.last_frame_ms {
            if now_ms - last < self.config.frame_interval_ms {
                return false;
            }
        }
        self.last_frame_ms = Some(now_ms);

        let matrix = self.modes.get_mode(Mode::Matrix);
        let particles_on = self.modes.get_mode(Mode::Particles);
        if matrix != self.matrix_seen {
            self.rain.clear();
            self.matrix_seen = matrix;
        }
        if !particles_on {
            self.particles.clear();
        }

        let mut detached = NullSurface;
        let s: &mut dyn Surface = match surface {
            Some(s) => s,
            None => &mut detached,
        };
        s.clear(self.width, self.height);

        if particles_on && !matrix {
            self.update_particles();
            self.draw_particles(s);
        }

        if matrix {
            self.rain_frame(s);
        } else {
            self.circle_frame(s);
        }
        true
    }

    fn update_particles(&mut self) {
        if self.particles.len() < self.config.particle_cap
            && self.rng.gen_bool(self.config.particle_spawn_chance.clamp(0.0, 1.0))
        {
            let p = Particle::random(&mut self.rng, self.width, self.height);
            self.particles.push(p);
        }
        let (w, h) = (self.width, self.height);
        self.particles.retain_mut(|p| p.step(w, h));
    }

    fn draw_particles(&self, s: &mut dyn Surface) {
        for p in &self.particles {
            s.fill_circle(p.x, p.y, p.size, PARTICLE_STYLE, p.alpha());
        }
    }

    fn circle_frame(&mut self, s: &mut dyn Surface) {
        self.hue = (self.hue + self.config.hue_step) % 360.0;
        let color = format!("hsl({},30%,75%)", self.hue);
        let (w, h) = (self.width, self.height);
        for c in &mut self.circles {
            c.step(w, h);
            s.fill_circle(c.x, c.y, c.radius, &color, 1.0);
        }
        if s.is_detached() {
            return;
        }
        for link in self.links() {
            let (a, b) = (&self.circles[link.a], &self.circles[link.b]);
            s.stroke_line(a.x, a.y, b.x, b.y, link.width, &color);
        }
    }

    /// Every unordered pair closer than the link distance, with its stroke width.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for i in 0..self.circles.len() {
            for j in i + 1..self.circles.len() {
                let (a, b) = (&self.circles[i], &self.circles[j]);
                let distance = (b.x - a.x).hypot(b.y - a.y);
                if distance < self.config.link_distance {
                    links.push(Link { a: i, b: j, distance, width: link_width(distance) });
                }
            }
        }
        links
    }

    fn rain_frame(&mut self, s: &mut dyn Surface) {
        let spacing = self.config.glyph_spacing;
        let (w, h) = (self.width, self.height);
        s.fill_rect(0.0, 0.0, w, h, RAIN_WASH);
        let mut buf = [0u8; 4];
        for drop in &mut self.rain {
            for (j, glyph) in drop.glyphs.iter().enumerate() {
                let y = drop.glyph_y(j, spacing);
                if y > 0.0 && y < h {
                    s.fill_text(glyph.encode_utf8(&mut buf), drop.x, y, RAIN_STYLE, RAIN_FONT);
                }
            }
            drop.y += drop.speed;
        }
        self.rain.retain(|d| !d.is_gone(h, spacing));
        if self.rng.gen_bool(self.config.rain_spawn_chance.clamp(0.0, 1.0)) {
            let drop = RainDrop::random(&mut self.rng, w, spacing);
            self.rain.push(drop);
        }
    }
}

/// Closer pairs get heavier strokes; never thinner than 1.
pub fn link_width(distance: f64) -> f64 {
    (5.0 - distance / 30.0).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(width: f64) -> Engine {
        Engine::with_rng(EngineConfig::default(), ModeFlags::shared(), width, SmallRng::seed_from_u64(42))
    }

    #[test]
    fn circle_count_follows_width_with_floor() {
        assert_eq!(engine(1920.0).circles().len(), 50);
        assert_eq!(engine(100.0).circles().len(), 8);
        assert_eq!(engine(0.0).circles().len(), 8);
    }

    #[test]
    fn throttle_skips_fast_refresh() {
        let mut e = engine(800.0);
        assert!(e.frame(0.0, None));
        let before = e.circles().to_vec();
        assert!(!e.frame(10.0, None));
        assert_eq!(e.circles(), &before[..]);
        assert!(e.frame(16.0, None));
        assert_ne!(e.circles(), &before[..]);
    }

    #[test]
    fn link_width_scales_down_to_one() {
        assert_eq!(link_width(0.0), 5.0);
        assert_eq!(link_width(60.0), 3.0);
        assert_eq!(link_width(120.0), 1.0);
        assert_eq!(link_width(149.0), 1.0);
    }

    #[test]
    fn links_use_strict_threshold() {
        let mut e = engine(800.0);
        *e.circles_mut() = vec![
            Circle { x: 0.0, y: 10.0, radius: 3.0, vx: 0.0, vy: 0.0 },
            Circle { x: 150.0, y: 10.0, radius: 3.0, vx: 0.0, vy: 0.0 },
            Circle { x: 30.0, y: 50.0, radius: 3.0, vx: 0.0, vy: 0.0 },
        ];
        let links = e.links();
        // (0,1) sits exactly on the threshold and is excluded.
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| !(l.a == 0 && l.b == 1)));
        let l02 = links.iter().find(|l| l.a == 0 && l.b == 2).unwrap();
        assert!((l02.distance - 50.0).abs() < 1e-9);
        assert!((l02.width - (5.0 - 50.0 / 30.0)).abs() < 1e-9);
    }

    #[test]
    fn draws_circles_and_links_when_surface_present() {
        let mut e = engine(400.0);
        let mut s = RecordingSurface::default();
        assert!(e.frame(0.0, Some(&mut s)));
        assert_eq!(s.ops.first(), Some(&DrawOp::Clear));
        // Particles are smaller than 3px, circles never are.
        let circles = s.count(|op| matches!(op, DrawOp::Circle { radius, .. } if *radius >= 3.0));
        assert_eq!(circles, e.circles().len());
        assert_eq!(s.count(|op| matches!(op, DrawOp::Line { .. })), e.links().len());
    }

    #[test]
    fn matrix_toggle_resets_rain() {
        let modes = ModeFlags::shared();
        let mut e = Engine::with_rng(EngineConfig::default(), modes.clone(), 400.0, SmallRng::seed_from_u64(1));
        modes.set_mode(Mode::Matrix, true);
        e.rain_mut().push(RainDrop { x: 0.0, y: 10.0, speed: 1.0, glyphs: vec!['A'] });
        // First matrix frame sees the toggle and starts from an empty rain set.
        e.frame(0.0, None);
        assert!(e.rain().iter().all(|d| d.y == 0.0));
        assert!(e.particles().is_empty());
    }

    #[test]
    fn rain_glyphs_only_drawn_inside_canvas() {
        let modes = ModeFlags::shared();
        modes.set_mode(Mode::Matrix, true);
        let mut cfg = EngineConfig::default();
        cfg.rain_spawn_chance = 0.0;
        let mut e = Engine::with_rng(cfg, modes, 400.0, SmallRng::seed_from_u64(1));
        e.rain_mut().push(RainDrop { x: 28.0, y: 20.0, speed: 2.0, glyphs: vec!['ア', 'B', 'C'] });
        let mut s = RecordingSurface::default();
        e.frame(0.0, Some(&mut s));
        // Heads at 20 and 6 are visible, the third glyph at -8 is not.
        assert_eq!(s.count(|op| matches!(op, DrawOp::Text { .. })), 2);
        assert!(s.ops.contains(&DrawOp::Text { text: "ア".into(), x: 28.0, y: 20.0 }));
        assert_eq!(e.rain()[0].y, 22.0);
    }

    #[test]
    fn missing_surface_still_runs_physics() {
        let mut e = engine(600.0);
        let before = e.circles().to_vec();
        for i in 0..10 {
            e.frame(i as f64 * 20.0, None);
        }
        assert_ne!(e.circles(), &before[..]);
    }

    #[test]
    fn resize_rebuilds_constellation() {
        let mut e = engine(400.0);
        e.resize(1920.0);
        assert_eq!(e.width(), 1920.0);
        assert_eq!(e.circles().len(), 50);
        assert_eq!(e.height(), 130.0);
    }

    #[test]
    fn resize_to_same_width_keeps_constellation() {
        let mut e = engine(800.0);
        e.frame(0.0, None);
        let before = e.circles().to_vec();
        e.resize(800.0);
        assert_eq!(e.circles(), before.as_slice());
    }
}
