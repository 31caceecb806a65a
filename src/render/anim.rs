//! Keyframe tracks for the page animations
//!
//! Offsets are fractions of the animation duration and must be sorted.

/// Per-segment timing function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Smoothstep, close enough to CSS `ease`/`ease-in-out`
    Smooth,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A single animated property
#[derive(Debug, Clone, Copy)]
pub struct Track {
    pub frames: &'static [(f32, f32)],
    pub easing: Easing,
}

impl Track {
    /// Value at progress `t` in [0, 1]; clamps outside
    pub fn sample(&self, t: f32) -> f32 {
        let frames = self.frames;
        let Some(&(first_at, first)) = frames.first() else {
            return 0.0;
        };
        if t <= first_at {
            return first;
        }
        for pair in frames.windows(2) {
            let (a_at, a) = pair[0];
            let (b_at, b) = pair[1];
            if t <= b_at {
                let span = (b_at - a_at).max(f32::EPSILON);
                let u = self.easing.apply((t - a_at) / span);
                return a * (1.0 - u) + b * u;
            }
        }
        frames[frames.len() - 1].1
    }
}

/// Progress of a one-shot animation with `fill-mode: forwards`
#[inline]
pub fn once(elapsed_ms: f64, delay_ms: f64, duration_ms: f64) -> f32 {
    ((elapsed_ms - delay_ms) / duration_ms).clamp(0.0, 1.0) as f32
}

/// Progress of an infinitely repeating animation
#[inline]
pub fn looped(elapsed_ms: f64, duration_ms: f64) -> f32 {
    (elapsed_ms.max(0.0) / duration_ms).fract() as f32
}

/// Ring blast: 2s, forwards
pub const NUCLEAR_DURATION_MS: f64 = 2000.0;
pub const NUCLEAR_SCALE: Track = Track {
    frames: &[(0.0, 1.0), (0.5, 15.0), (1.0, 20.0)],
    easing: Easing::Smooth,
};
pub const NUCLEAR_OPACITY: Track = Track {
    frames: &[(0.0, 1.0), (0.5, 0.8), (1.0, 0.0)],
    easing: Easing::Smooth,
};

/// Double flash looping every 2s
pub const LIGHTNING_DURATION_MS: f64 = 2000.0;
pub const LIGHTNING_OPACITY: Track = Track {
    frames: &[
        (0.0, 0.0),
        (0.05, 0.95),
        (0.10, 0.6),
        (0.25, 0.95),
        (0.30, 0.6),
        (1.0, 0.0),
    ],
    easing: Easing::Smooth,
};

/// Jumpscare pop-in: 0.5s ease-in-out
pub const JUMPSCARE_DURATION_MS: f64 = 500.0;
pub const JUMPSCARE_SCALE: Track = Track {
    frames: &[(0.0, 0.0), (0.5, 1.2), (1.0, 1.0)],
    easing: Easing::Smooth,
};
pub const JUMPSCARE_OPACITY: Track = Track {
    frames: &[(0.0, 0.0), (0.5, 1.0), (1.0, 1.0)],
    easing: Easing::Smooth,
};

/// Balloon pulse: 2s loop, dims to half
pub const PULSE_DURATION_MS: f64 = 2000.0;
pub const PULSE_OPACITY: Track = Track {
    frames: &[(0.0, 1.0), (0.5, 0.5), (1.0, 1.0)],
    easing: Easing::Smooth,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_hits_keyframes() {
        assert_eq!(NUCLEAR_SCALE.sample(0.0), 1.0);
        assert_eq!(NUCLEAR_SCALE.sample(0.5), 15.0);
        assert_eq!(NUCLEAR_SCALE.sample(1.0), 20.0);
        assert_eq!(NUCLEAR_SCALE.sample(2.0), 20.0);
        assert_eq!(NUCLEAR_OPACITY.sample(-1.0), 1.0);
    }

    #[test]
    fn test_linear_midpoint() {
        let track = Track {
            frames: &[(0.0, 0.0), (1.0, 10.0)],
            easing: Easing::Linear,
        };
        assert!((track.sample(0.25) - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_lightning_double_flash() {
        assert_eq!(LIGHTNING_OPACITY.sample(0.05), 0.95);
        assert_eq!(LIGHTNING_OPACITY.sample(0.10), 0.6);
        assert_eq!(LIGHTNING_OPACITY.sample(0.25), 0.95);
        assert!(LIGHTNING_OPACITY.sample(0.9) < 0.2);
    }

    #[test]
    fn test_progress_helpers() {
        assert_eq!(once(100.0, 150.0, 2000.0), 0.0);
        assert_eq!(once(1150.0, 150.0, 2000.0), 0.5);
        assert_eq!(once(9000.0, 0.0, 2000.0), 1.0);
        assert!((looped(2500.0, 2000.0) - 0.25).abs() < 1e-6);
    }
}
