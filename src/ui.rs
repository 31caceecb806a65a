//! DOM controls derived from the session
//!
//! The page keeps its buttons and overlays as plain HTML; the shell applies
//! a `HudView` to them every frame.

use crate::sim::{Phase, Session};

/// Text of the button that leads to the jumpscare
pub const CONFIRM_LABEL: &str = "Alright, I'm Done!";
/// Shown when the canvas cannot draw
pub const NO_WEBGPU_NOTICE: &str =
    "Your browser has no WebGPU, so the balloon cannot be drawn. Try a recent Chrome, Edge or Safari.";

/// Visibility of every DOM control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudView {
    pub loading_visible: bool,
    pub loading_percent: u8,
    pub play_visible: bool,
    pub pump_visible: bool,
    pub pump_disabled: bool,
    pub confirm_visible: bool,
    pub jumpscare_visible: bool,
    /// Canvas has no renderer; explain why the scene is empty
    pub renderer_notice_visible: bool,
}

impl HudView {
    pub fn from_session(session: &Session) -> Self {
        let phase = session.phase;
        Self {
            loading_visible: phase == Phase::Loading,
            loading_percent: session.progress.percent(),
            play_visible: phase == Phase::Idle,
            pump_visible: session.started(),
            pump_disabled: session.exploded(),
            confirm_visible: phase == Phase::Confirmable,
            jumpscare_visible: session.jumpscare_active(),
            renderer_notice_visible: false,
        }
    }

    /// Account for whether the canvas can draw at all
    pub fn with_renderer(mut self, available: bool) -> Self {
        self.renderer_notice_visible = !available && !self.loading_visible && !self.jumpscare_visible;
        self
    }

    /// Loading label text
    pub fn percent_label(&self) -> String {
        format!("{}%", self.loading_percent)
    }
}
