use rand::Rng;

/// Drifting point of the constellation.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Per-axis outcome of one `Circle::step`, used by the bounds tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Circle {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        let radius = rng.gen_range(3.0..6.0);
        let x = spawn_coord(rng, width, radius);
        let y = spawn_coord(rng, height, radius);
        let mut vx = rng.gen_range(-1.0..1.0) * 0.15;
        let mut vy = rng.gen_range(-1.0..1.0) * 0.15;
        // One in five drifts noticeably faster.
        if rng.gen_bool(0.2) {
            vx *= 1.5;
            vy *= 1.5;
        }
        Self { x, y, radius, vx, vy }
    }

    /// Integrate one frame and reflect off the walls. A component only flips when
    /// it is still heading out, so a circle caught outside after a resize turns
    /// around once instead of flickering.
    pub fn step(&mut self, width: f64, height: f64) -> Bounce {
        self.x += self.vx;
        self.y += self.vy;
        let bounce = Bounce {
            x: reflect(self.x, self.radius, width, &mut self.vx),
            y: reflect(self.y, self.radius, height, &mut self.vy),
        };
        self.x = self.x.clamp(0.0, width.max(0.0));
        self.y = self.y.clamp(0.0, height.max(0.0));
        bounce
    }
}

fn spawn_coord<R: Rng + ?Sized>(rng: &mut R, extent: f64, radius: f64) -> f64 {
    let span = extent - radius * 2.0;
    if span > 0.0 {
        rng.gen_range(0.0..span) + radius
    } else {
        extent.max(0.0) / 2.0
    }
}

fn reflect(pos: f64, radius: f64, extent: f64, v: &mut f64) -> bool {
    let out_high = pos + radius > extent && *v > 0.0;
    let out_low = pos - radius < 0.0 && *v < 0.0;
    if out_high || out_low {
        *v = -*v;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn spawn_respects_radius_margin() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let c = Circle::random(&mut rng, 400.0, 130.0);
            assert!((3.0..6.0).contains(&c.radius));
            assert!(c.x >= c.radius && c.x <= 400.0 - c.radius);
            assert!(c.y >= c.radius && c.y <= 130.0 - c.radius);
            assert!(c.vx.abs() <= 0.225 && c.vy.abs() <= 0.225);
        }
    }

    #[test]
    fn reflects_on_right_wall_once() {
        let mut c = Circle { x: 97.0, y: 50.0, radius: 4.0, vx: 0.2, vy: 0.0 };
        let b = c.step(100.0, 130.0);
        assert!(b.x && !b.y);
        assert!(c.vx < 0.0);
        // Still touching the wall but already heading back: no second flip.
        let b = c.step(100.0, 130.0);
        assert!(!b.x);
        assert!(c.vx < 0.0);
    }

    #[test]
    fn shrunk_canvas_clamps_position() {
        let mut c = Circle { x: 300.0, y: 20.0, radius: 3.0, vx: 0.1, vy: -0.1 };
        c.step(200.0, 130.0);
        assert!(c.x <= 200.0);
        assert!(c.vx < 0.0);
    }
}
