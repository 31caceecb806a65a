//! Session state and the events it queues for the shell
//!
//! One `Session` exists per page load. A reload throws it away.

use serde::{Deserialize, Serialize};

use super::timer::{TimerId, TimerKind, Timers};
use crate::assets::LoadProgress;
use crate::consts::INITIAL_INTENSITY;

/// Where the session is in the experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Media still preloading, progress bar shown
    Loading,
    /// Assets ready, Play button shown
    Idle,
    /// Pumping the balloon
    Started,
    /// Balloon popped, rain falling
    Exploded,
    /// Confirm button available
    Confirmable,
    /// Jumpscare overlay up, reload pending
    Jumpscare,
}

/// Side effects the reducer asks the shell to perform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Loading bar moved
    ProgressChanged { percent: u8 },
    /// Every asset settled (or the deadline passed)
    AssetsReady { failed: usize },
    /// Start the background loop
    BackgroundStarted { intensity: f32 },
    /// Pump changed the intensity
    IntensityChanged { intensity: f32 },
    /// Balloon popped - play explosion and rain
    Exploded { explosion: u32 },
    /// Confirm delay elapsed
    ConfirmReady,
    /// Show the jumpscare and scream
    JumpscareStarted,
    /// Reload the page
    Reload,
}

/// Complete session state (deterministic given actions and timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub phase: Phase,
    /// Pump level, always within [MIN_INTENSITY, MAX_INTENSITY]
    pub intensity: f32,
    pub progress: LoadProgress,
    /// Seed for presentation randomness
    pub seed: u64,
    /// Number of explosions so far
    pub explosions: u32,
    /// When the current phase was entered (ms)
    pub phase_entered_ms: f64,
    pub exploded_at_ms: Option<f64>,
    pub jumpscare_at_ms: Option<f64>,
    /// Preload deadline used for timeout errors
    pub preload_timeout_ms: u32,
    pub timers: Timers,
    /// Pending side effects, drained by the shell each frame
    #[serde(skip)]
    pub events: Vec<SessionEvent>,
    /// Bumped on every phase entry
    epoch: u32,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Loading,
            intensity: INITIAL_INTENSITY,
            progress: LoadProgress::new(),
            seed,
            explosions: 0,
            phase_entered_ms: 0.0,
            exploded_at_ms: None,
            jumpscare_at_ms: None,
            preload_timeout_ms: 0,
            timers: Timers::new(),
            events: Vec::new(),
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Stop waiting on slow assets after `timeout_ms`
    pub fn arm_preload_deadline(&mut self, now_ms: f64, timeout_ms: u32) {
        if self.phase != Phase::Loading {
            return;
        }
        self.preload_timeout_ms = timeout_ms;
        self.arm(TimerKind::PreloadDeadline, now_ms + timeout_ms as f64);
    }

    /// Arm a timer owned by the current phase
    pub(crate) fn arm(&mut self, kind: TimerKind, due_ms: f64) {
        let id = TimerId {
            kind,
            epoch: self.epoch,
        };
        self.timers.arm(id, due_ms);
    }

    /// Leave the current phase (cancelling its timers) and enter `phase`
    pub(crate) fn enter(&mut self, phase: Phase, now_ms: f64) {
        let cancelled = self.timers.cancel_epoch(self.epoch);
        if cancelled > 0 {
            log::debug!("Cancelled {} timer(s) leaving {:?}", cancelled, self.phase);
        }
        log::info!(
            "Phase {:?} -> {:?} after {:.0} ms",
            self.phase,
            phase,
            now_ms - self.phase_entered_ms
        );
        self.phase = phase;
        self.phase_entered_ms = now_ms;
        self.epoch += 1;
    }

    /// Drain side effects for the shell
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn assets_ready(&self) -> bool {
        self.phase > Phase::Loading
    }

    pub fn started(&self) -> bool {
        self.phase >= Phase::Started
    }

    pub fn exploded(&self) -> bool {
        self.phase >= Phase::Exploded
    }

    pub fn confirm_ready(&self) -> bool {
        self.phase >= Phase::Confirmable
    }

    pub fn jumpscare_active(&self) -> bool {
        self.phase == Phase::Jumpscare
    }

    /// Milliseconds since the balloon popped
    pub fn since_explosion_ms(&self, now_ms: f64) -> Option<f64> {
        self.exploded_at_ms.map(|t| (now_ms - t).max(0.0))
    }

    /// Milliseconds since the jumpscare started
    pub fn since_jumpscare_ms(&self, now_ms: f64) -> Option<f64> {
        self.jumpscare_at_ms.map(|t| (now_ms - t).max(0.0))
    }
}
