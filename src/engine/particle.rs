use rand::Rng;

/// Short-lived mote of the overlay. Wraps at the edges instead of bouncing.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub max_life: f64,
    pub size: f64,
}

impl Particle {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            y: rng.gen_range(0.0..height.max(1.0)),
            vx: rng.gen_range(-1.0..1.0),
            vy: rng.gen_range(-1.0..1.0),
            // Drawn independently, so a fresh particle may start above full opacity.
            life: rng.gen_range(50.0..150.0),
            max_life: rng.gen_range(50.0..150.0),
            size: rng.gen_range(1.0..3.0),
        }
    }

    /// Advance one frame. Returns false once the particle has burnt out.
    pub fn step(&mut self, width: f64, height: f64) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.life -= 1.0;

        if self.x < 0.0 {
            self.x = width;
        } else if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        } else if self.y > height {
            self.y = 0.0;
        }

        self.life > 0.0
    }

    pub fn alpha(&self) -> f64 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f64, y: f64, vx: f64, vy: f64, life: f64) -> Particle {
        Particle { x, y, vx, vy, life, max_life: 100.0, size: 2.0 }
    }

    #[test]
    fn wraps_on_every_edge() {
        let mut p = particle(0.5, 10.0, -1.0, 0.0, 10.0);
        p.step(200.0, 130.0);
        assert_eq!(p.x, 200.0);

        let mut p = particle(199.5, 10.0, 1.0, 0.0, 10.0);
        p.step(200.0, 130.0);
        assert_eq!(p.x, 0.0);

        let mut p = particle(10.0, 0.2, 0.0, -0.5, 10.0);
        p.step(200.0, 130.0);
        assert_eq!(p.y, 130.0);

        let mut p = particle(10.0, 129.9, 0.0, 0.5, 10.0);
        p.step(200.0, 130.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn dies_on_the_step_life_hits_zero() {
        let mut p = particle(10.0, 10.0, 0.0, 0.0, 2.0);
        assert!(p.step(100.0, 100.0));
        assert!(!p.step(100.0, 100.0));
        assert_eq!(p.life, 0.0);
    }

    #[test]
    fn alpha_is_capped() {
        let mut p = particle(0.0, 0.0, 0.0, 0.0, 140.0);
        p.max_life = 60.0;
        assert_eq!(p.alpha(), 1.0);
        p.life = 30.0;
        assert!((p.alpha() - 0.5).abs() < 1e-9);
    }
}
