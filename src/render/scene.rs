//! Scene model: what the canvas shows for a session at a given time
//!
//! Everything here is in CSS pixels with the origin at the top-left of the
//! viewport. The GPU renderer only uploads what `Scene::frame` returns.

use glam::Vec2;

use super::anim::{self, LIGHTNING_OPACITY, NUCLEAR_OPACITY, NUCLEAR_SCALE, PULSE_OPACITY};
use super::rain::RainField;
use crate::consts::{BALLOON_UNIT_PX, EXPLODE_THRESHOLD};
use crate::sim::Session;

/// Breakpoint for the two-column layout
pub const WIDE_LAYOUT_MIN_WIDTH: f32 = 768.0;

/// Colors for scene elements
pub mod colors {
    pub const BALLOON: [f32; 4] = [0.937, 0.267, 0.267, 1.0];
    pub const RING_YELLOW: [f32; 4] = [0.918, 0.702, 0.031, 1.0];
    pub const RING_ORANGE: [f32; 4] = [0.976, 0.451, 0.086, 1.0];
    pub const RING_RED: [f32; 4] = [0.937, 0.267, 0.267, 1.0];
    pub const RAIN: [f32; 4] = [0.749, 0.859, 0.996, 0.4];
    pub const BACKGROUND_TOP: [f32; 4] = [0.122, 0.161, 0.216, 1.0];
    pub const BACKGROUND_BOTTOM: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
}

/// One explosion ring. Its opacity comes from the blast keyframes alone.
#[derive(Debug, Clone, Copy)]
pub struct RingSpec {
    /// Diameter before scaling (px)
    pub size: f32,
    pub color: [f32; 4],
    pub delay_ms: f64,
}

/// Inner to outer
pub const RINGS: [RingSpec; 3] = [
    RingSpec {
        size: 160.0,
        color: colors::RING_YELLOW,
        delay_ms: 0.0,
    },
    RingSpec {
        size: 240.0,
        color: colors::RING_ORANGE,
        delay_ms: 75.0,
    },
    RingSpec {
        size: 320.0,
        color: colors::RING_RED,
        delay_ms: 150.0,
    },
];

/// Viewport size in CSS px
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Where things sit on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Balloon and explosion share this anchor
    pub balloon_center: Vec2,
    pub wide: bool,
}

impl Layout {
    pub fn new(viewport: Viewport) -> Self {
        let wide = viewport.width >= WIDE_LAYOUT_MIN_WIDTH;
        let balloon_center = if wide {
            // Left column of two
            Vec2::new(viewport.width * 0.25, viewport.height * 0.5)
        } else {
            // Top of a stacked column
            Vec2::new(viewport.width * 0.5, viewport.height * 0.33)
        };
        Self {
            balloon_center,
            wide,
        }
    }
}

/// Balloon diameter for an intensity
#[inline]
pub fn balloon_diameter(intensity: f32) -> f32 {
    intensity * BALLOON_UNIT_PX
}

/// Whether the pulse cue is on
#[inline]
pub fn pulse_active(intensity: f32) -> bool {
    intensity > EXPLODE_THRESHOLD
}

/// Whether a click at `point` lands on the balloon
pub fn balloon_hit(center: Vec2, intensity: f32, point: Vec2) -> bool {
    point.distance(center) <= balloon_diameter(intensity) / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalloonView {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingView {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropView {
    pub x: f32,
    pub y: f32,
    pub length: f32,
}

/// Scale/opacity applied to the jumpscare image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTransform {
    pub scale: f32,
    pub opacity: f32,
}

/// Everything drawn for one frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub balloon: Option<BalloonView>,
    pub rings: Vec<RingView>,
    pub drops: Vec<DropView>,
    /// White flash opacity
    pub flash: f32,
    pub jumpscare: Option<OverlayTransform>,
}

/// Presentation state that outlives a single frame
pub struct Scene {
    rain: RainField,
    /// Explosion count the rain was generated for
    rain_for: u32,
    drop_count: usize,
    lightning: bool,
    pulse: bool,
}

impl Scene {
    pub fn new(drop_count: usize, reduced_motion: bool) -> Self {
        Self {
            rain: RainField::default(),
            rain_for: 0,
            drop_count,
            lightning: !reduced_motion,
            pulse: !reduced_motion,
        }
    }

    pub fn rain(&self) -> &RainField {
        &self.rain
    }

    /// Regenerate rain when a new explosion happened
    pub fn sync(&mut self, session: &Session) {
        if session.explosions != self.rain_for {
            self.rain = RainField::generate(session.seed, session.explosions, self.drop_count);
            self.rain_for = session.explosions;
            log::debug!("Generated {} raindrops", self.rain.len());
        }
    }

    /// Build the frame for `session` at `now_ms`
    pub fn frame(&self, session: &Session, viewport: Viewport, now_ms: f64) -> Frame {
        let layout = Layout::new(viewport);
        let mut frame = Frame::default();

        if !session.started() {
            return frame;
        }

        let Some(since) = session.since_explosion_ms(now_ms) else {
            let mut color = colors::BALLOON;
            if self.pulse && pulse_active(session.intensity) {
                color[3] = PULSE_OPACITY.sample(anim::looped(now_ms, anim::PULSE_DURATION_MS));
            }
            frame.balloon = Some(BalloonView {
                center: layout.balloon_center,
                radius: balloon_diameter(session.intensity) / 2.0,
                color,
            });
            return frame;
        };

        for ring in RINGS {
            let t = anim::once(since, ring.delay_ms, anim::NUCLEAR_DURATION_MS);
            let mut color = ring.color;
            color[3] = NUCLEAR_OPACITY.sample(t);
            frame.rings.push(RingView {
                center: layout.balloon_center,
                radius: ring.size / 2.0 * NUCLEAR_SCALE.sample(t),
                color,
            });
        }

        let t_s = (since / 1000.0) as f32;
        frame.drops = self
            .rain
            .drops
            .iter()
            .map(|d| DropView {
                x: d.x_frac * viewport.width,
                y: d.y(t_s, viewport.height),
                length: d.length,
            })
            .collect();

        if self.lightning {
            frame.flash = LIGHTNING_OPACITY.sample(anim::looped(since, anim::LIGHTNING_DURATION_MS));
        }

        if let Some(since) = session.since_jumpscare_ms(now_ms) {
            let t = anim::once(since, 0.0, anim::JUMPSCARE_DURATION_MS);
            frame.jumpscare = Some(OverlayTransform {
                scale: anim::JUMPSCARE_SCALE.sample(t),
                opacity: anim::JUMPSCARE_OPACITY.sample(t),
            });
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetId, AssetLoad};
    use crate::sim::{Action, reduce};

    const VIEW: Viewport = Viewport {
        width: 1200.0,
        height: 800.0,
    };

    fn session_with_pumps(pumps: usize) -> Session {
        let mut s = Session::new(99);
        for id in AssetId::ALL {
            reduce(&mut s, Action::AssetLoaded(AssetLoad::loaded(id)), 0.0);
        }
        reduce(&mut s, Action::Start, 0.0);
        for _ in 0..pumps {
            reduce(&mut s, Action::Pump, 0.0);
        }
        s
    }

    #[test]
    fn test_layout_breakpoint() {
        assert!(Layout::new(VIEW).wide);
        let narrow = Layout::new(Viewport {
            width: 400.0,
            height: 800.0,
        });
        assert!(!narrow.wide);
        assert_eq!(narrow.balloon_center.x, 200.0);
    }

    #[test]
    fn test_nothing_drawn_before_start() {
        let s = Session::new(1);
        let frame = Scene::new(100, false).frame(&s, VIEW, 0.0);
        assert!(frame.balloon.is_none());
        assert!(frame.drops.is_empty());
    }

    #[test]
    fn test_balloon_scales_with_intensity() {
        let s = session_with_pumps(2);
        let frame = Scene::new(100, false).frame(&s, VIEW, 0.0);
        let balloon = frame.balloon.unwrap();
        assert!((balloon.radius - 70.0).abs() < 1e-3);
        assert_eq!(balloon.color[3], 1.0);
    }

    #[test]
    fn test_pulse_only_above_threshold() {
        assert!(!pulse_active(1.5));
        assert!(pulse_active(1.6));

        let s = session_with_pumps(3);
        let frame = Scene::new(100, false).frame(&s, VIEW, 1000.0);
        // Half way through the pulse the balloon is dimmed
        assert!((frame.balloon.unwrap().color[3] - 0.5).abs() < 1e-3);

        let still = Scene::new(100, true).frame(&s, VIEW, 1000.0);
        assert_eq!(still.balloon.unwrap().color[3], 1.0);
    }

    #[test]
    fn test_hit_test() {
        let c = Vec2::new(300.0, 400.0);
        assert!(balloon_hit(c, 1.6, Vec2::new(300.0 + 79.0, 400.0)));
        assert!(!balloon_hit(c, 1.6, Vec2::new(300.0 + 81.0, 400.0)));
    }

    #[test]
    fn test_explosion_frame() {
        let mut s = session_with_pumps(3);
        reduce(&mut s, Action::BalloonTap, 1000.0);

        let mut scene = Scene::new(100, false);
        scene.sync(&s);
        assert_eq!(scene.rain().len(), 100);

        let frame = scene.frame(&s, VIEW, 1000.0);
        assert!(frame.balloon.is_none());
        assert_eq!(frame.rings.len(), 3);
        assert_eq!(frame.rings[0].radius, 80.0);
        assert!(frame.rings.iter().all(|r| r.color[3] == 1.0));
        assert_eq!(frame.drops.len(), 100);
        assert!(frame.jumpscare.is_none());

        // Rings expand and fade out
        let later = scene.frame(&s, VIEW, 1000.0 + 2150.0);
        assert!(later.rings.iter().all(|r| r.color[3] == 0.0));
        assert_eq!(later.rings[1].radius, 120.0 * 20.0);
    }

    #[test]
    fn test_rain_regenerated_once_per_explosion() {
        let mut s = session_with_pumps(3);
        let mut scene = Scene::new(10, false);
        scene.sync(&s);
        assert!(scene.rain().is_empty());

        reduce(&mut s, Action::BalloonTap, 0.0);
        scene.sync(&s);
        let first = scene.rain().drops.clone();
        scene.sync(&s);
        assert_eq!(scene.rain().drops, first);
    }

    #[test]
    fn test_jumpscare_overlay_pops_in() {
        let mut s = session_with_pumps(3);
        reduce(&mut s, Action::BalloonTap, 0.0);
        crate::sim::advance(&mut s, 5000.0);
        reduce(&mut s, Action::Confirm, 6000.0);

        let scene = Scene::new(10, true);
        let start = scene.frame(&s, VIEW, 6000.0).jumpscare.unwrap();
        assert_eq!(start.scale, 0.0);
        let peak = scene.frame(&s, VIEW, 6250.0).jumpscare.unwrap();
        assert_eq!(peak.scale, 1.2);
        let end = scene.frame(&s, VIEW, 7000.0).jumpscare.unwrap();
        assert_eq!(end, OverlayTransform { scale: 1.0, opacity: 1.0 });
        assert_eq!(scene.frame(&s, VIEW, 7000.0).flash, 0.0);
    }
}
