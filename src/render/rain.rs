//! Raindrop field
//!
//! Placement is random per drop but seeded, so a given session and
//! explosion always produce the same field.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// A single falling streak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raindrop {
    /// Horizontal position as a fraction of viewport width
    pub x_frac: f32,
    /// Starting offset above the top edge (px)
    pub start_offset: f32,
    /// Streak length (px)
    pub length: f32,
    pub delay_s: f32,
    /// Time to fall one viewport height
    pub duration_s: f32,
}

impl Raindrop {
    /// Vertical position of the streak top at `t_s` seconds after spawn
    pub fn y(&self, t_s: f32, viewport_height: f32) -> f32 {
        if t_s < self.delay_s {
            return -self.start_offset;
        }
        let phase = ((t_s - self.delay_s) / self.duration_s).fract();
        -self.start_offset + (-10.0 + (viewport_height + 10.0) * phase)
    }
}

/// All drops for one explosion
#[derive(Debug, Clone, Default)]
pub struct RainField {
    pub drops: Vec<Raindrop>,
}

impl RainField {
    pub fn generate(seed: u64, explosion: u32, count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ (explosion as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let drops = (0..count)
            .map(|_| Raindrop {
                x_frac: rng.random::<f32>(),
                start_offset: rng.random::<f32>() * 20.0,
                length: rng.random::<f32>() * 20.0 + 10.0,
                delay_s: rng.random::<f32>() * 2.0,
                duration_s: rng.random::<f32>() * 0.5 + 0.5,
            })
            .collect();
        Self { drops }
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        let field = RainField::generate(42, 1, 100);
        assert_eq!(field.len(), 100);
        for d in &field.drops {
            assert!((0.0..1.0).contains(&d.x_frac));
            assert!((0.0..20.0).contains(&d.start_offset));
            assert!((10.0..=30.0).contains(&d.length));
            assert!((0.0..2.0).contains(&d.delay_s));
            assert!((0.5..=1.0).contains(&d.duration_s));
        }
    }

    #[test]
    fn test_seeded_and_distinct_per_explosion() {
        let a = RainField::generate(42, 1, 50);
        let b = RainField::generate(42, 1, 50);
        let c = RainField::generate(42, 2, 50);
        assert_eq!(a.drops, b.drops);
        assert_ne!(a.drops, c.drops);
    }

    #[test]
    fn test_drop_falls_after_delay() {
        let drop = Raindrop {
            x_frac: 0.5,
            start_offset: 5.0,
            length: 20.0,
            delay_s: 1.0,
            duration_s: 0.5,
        };
        assert_eq!(drop.y(0.5, 800.0), -5.0);
        assert_eq!(drop.y(1.0, 800.0), -15.0);
        assert!((drop.y(1.25, 800.0) - 390.0).abs() < 1e-3);
        // Wraps back to the top
        assert_eq!(drop.y(1.5, 800.0), -15.0);
    }
}
