use rand::Rng;

/// Katakana, digits and capitals, the classic falling-code alphabet.
pub const MATRIX_CHARS: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One falling column. `y` is the head; the tail trails upward.
#[derive(Clone, Debug, PartialEq)]
pub struct RainDrop {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub glyphs: Vec<char>,
}

impl RainDrop {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, spacing: f64) -> Self {
        let alphabet: Vec<char> = MATRIX_CHARS.chars().collect();
        let len = rng.gen_range(5..20);
        let glyphs = (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect();
        // Snap to the glyph grid so columns line up.
        let columns = (width / spacing).floor().max(1.0) as usize;
        let x = rng.gen_range(0..columns) as f64 * spacing;
        Self { x, y: 0.0, speed: rng.gen_range(1.0..4.0), glyphs }
    }

    /// Vertical position of glyph `j` (0 is the head).
    pub fn glyph_y(&self, j: usize, spacing: f64) -> f64 {
        self.y - j as f64 * spacing
    }

    /// The whole tail has left the bottom of the canvas.
    pub fn is_gone(&self, height: f64, spacing: f64) -> bool {
        self.y - self.glyphs.len() as f64 * spacing > height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn random_drop_uses_matrix_alphabet() {
        let mut rng = SmallRng::seed_from_u64(3);
        let drop = RainDrop::random(&mut rng, 300.0, 14.0);
        assert!(drop.glyphs.len() >= 5 && drop.glyphs.len() < 20);
        assert!(drop.glyphs.iter().all(|c| MATRIX_CHARS.contains(*c)));
        assert_eq!(drop.x % 14.0, 0.0);
        assert!(drop.x < 300.0);
    }

    #[test]
    fn gone_only_after_tail_passes_bottom() {
        let mut drop = RainDrop { x: 0.0, y: 130.0, speed: 2.0, glyphs: vec!['A'; 3] };
        assert!(!drop.is_gone(130.0, 14.0));
        drop.y = 130.0 + 42.0;
        assert!(!drop.is_gone(130.0, 14.0));
        drop.y += 0.5;
        assert!(drop.is_gone(130.0, 14.0));
    }
}
