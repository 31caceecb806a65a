//! Presentation model
//!
//! Pure functions of session state and time. No GPU or DOM types here, so
//! everything can be tested natively.

pub mod anim;
pub mod rain;
pub mod scene;

pub use rain::{RainField, Raindrop};
pub use scene::{Frame, Layout, Scene, Viewport, balloon_diameter, balloon_hit};
