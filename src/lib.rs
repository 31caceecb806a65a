//! Balloon Boom - pump a balloon until it goes nuclear
//!
//! Core modules:
//! - `sim`: Session state machine (phases, reducer, cancellable timers)
//! - `assets`: Fixed media manifest and preload progress
//! - `audio`: Playback controller over four audio channels
//! - `render`: Pure presentation model (layout, animations, rain)
//! - `renderer`: WebGPU SDF pipeline
//! - `platform`: Browser glue for preloading and media playback (wasm only)
//! - `ui`: DOM control visibility derived from the session
//! - `settings`: Quality/volume/motion preferences

pub mod assets;
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod render;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use assets::{AssetId, AssetKind, LoadError, LoadProgress};
pub use audio::{AudioSink, Channel, PlaybackController};
pub use settings::{QualityPreset, Settings};
pub use sim::{Action, Phase, Session, SessionEvent};

/// Interaction constants
pub mod consts {
    /// Pump level at page load
    pub const INITIAL_INTENSITY: f32 = 1.0;
    /// Intensity added per pump click
    pub const PUMP_STEP: f32 = 0.2;
    /// Intensity never goes above this
    pub const MAX_INTENSITY: f32 = 2.0;
    /// Intensity never goes below this
    pub const MIN_INTENSITY: f32 = 0.0;
    /// Balloon only pops when intensity is strictly above this
    pub const EXPLODE_THRESHOLD: f32 = 1.5;

    /// Delay between explosion and the confirm button (ms)
    pub const CONFIRM_DELAY_MS: f64 = 5000.0;
    /// Delay between jumpscare and page reload (ms)
    pub const RELOAD_DELAY_MS: f64 = 1500.0;

    /// Balloon diameter per unit of intensity (CSS px)
    pub const BALLOON_UNIT_PX: f32 = 100.0;

    /// Background loop volume per unit of intensity
    pub const BACKGROUND_VOLUME_FACTOR: f32 = 0.5;
    pub const EXPLOSION_VOLUME: f32 = 1.0;
    pub const RAIN_VOLUME: f32 = 0.7;
    pub const JUMPSCARE_VOLUME: f32 = 1.0;
}

/// Clamp an intensity value into its legal range
#[inline]
pub fn clamp_intensity(value: f32) -> f32 {
    value.clamp(consts::MIN_INTENSITY, consts::MAX_INTENSITY)
}
