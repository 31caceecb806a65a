//! Session reducer
//!
//! Every state change goes through `reduce`. Timers are polled by `advance`
//! once per frame and come back in as `Action::TimerFired`.

use super::state::{Phase, Session, SessionEvent};
use super::timer::{TimerId, TimerKind};
use crate::assets::AssetLoad;
use crate::clamp_intensity;
use crate::consts::*;

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Play button
    Start,
    /// Pump button
    Pump,
    /// Click on the balloon
    BalloonTap,
    /// "I'm Done" button
    Confirm,
    /// One asset settled
    AssetLoaded(AssetLoad),
    /// A polled timer came due
    TimerFired(TimerId),
}

/// Apply one action at wall-clock time `now_ms`
pub fn reduce(state: &mut Session, action: Action, now_ms: f64) {
    match (state.phase, action) {
        (_, Action::AssetLoaded(load)) => asset_loaded(state, load, now_ms),

        (_, Action::TimerFired(id)) if id.epoch != state.epoch() => {
            log::debug!("Ignoring stale {:?} timer (epoch {})", id.kind, id.epoch);
        }
        (Phase::Loading, Action::TimerFired(TimerId { kind: TimerKind::PreloadDeadline, .. })) => {
            let expired = state.progress.expire_pending(state.preload_timeout_ms);
            log::warn!(
                "Preload deadline passed, continuing without {} asset(s)",
                expired
            );
            state.events.push(SessionEvent::ProgressChanged {
                percent: state.progress.percent(),
            });
            finish_loading(state, now_ms);
        }
        (Phase::Exploded, Action::TimerFired(TimerId { kind: TimerKind::ConfirmDelay, .. })) => {
            state.enter(Phase::Confirmable, now_ms);
            state.events.push(SessionEvent::ConfirmReady);
        }
        (Phase::Jumpscare, Action::TimerFired(TimerId { kind: TimerKind::Reload, .. })) => {
            state.events.push(SessionEvent::Reload);
        }

        (Phase::Idle, Action::Start) => {
            state.enter(Phase::Started, now_ms);
            state.events.push(SessionEvent::BackgroundStarted {
                intensity: state.intensity,
            });
        }

        (Phase::Started, Action::Pump) => {
            let next = clamp_intensity(state.intensity + PUMP_STEP);
            if next != state.intensity {
                state.intensity = next;
                state.events.push(SessionEvent::IntensityChanged { intensity: next });
            }
        }

        (Phase::Started, Action::BalloonTap) if state.intensity > EXPLODE_THRESHOLD => {
            state.enter(Phase::Exploded, now_ms);
            state.explosions += 1;
            state.exploded_at_ms = Some(now_ms);
            state.arm(TimerKind::ConfirmDelay, now_ms + CONFIRM_DELAY_MS);
            state.events.push(SessionEvent::Exploded {
                explosion: state.explosions,
            });
        }

        (Phase::Confirmable, Action::Confirm) => {
            state.enter(Phase::Jumpscare, now_ms);
            state.jumpscare_at_ms = Some(now_ms);
            state.arm(TimerKind::Reload, now_ms + RELOAD_DELAY_MS);
            state.events.push(SessionEvent::JumpscareStarted);
        }

        (phase, action) => {
            log::debug!("{:?} ignored in {:?}", action, phase);
        }
    }
}

/// Fire every timer due at `now_ms`
pub fn advance(state: &mut Session, now_ms: f64) {
    for id in state.timers.take_due(now_ms) {
        reduce(state, Action::TimerFired(id), now_ms);
    }
}

/// Cancel all pending timers (page is going away)
pub fn teardown(state: &mut Session) {
    let cancelled = state.timers.cancel_all();
    if cancelled > 0 {
        log::info!("Teardown cancelled {} pending timer(s)", cancelled);
    }
}

/// Page hidden. A page kept in the back/forward cache resumes with the
/// same session, so its timers must survive.
pub fn page_hidden(state: &mut Session, persisted: bool) {
    if persisted {
        log::debug!("Page cached, keeping {} timer(s)", state.timers.len());
    } else {
        teardown(state);
    }
}

fn asset_loaded(state: &mut Session, load: AssetLoad, now_ms: f64) {
    if let Err(e) = &load.result {
        log::warn!("Asset load failed: {}", e);
    }
    if !state.progress.record(&load) {
        log::debug!("{:?} already settled, ignoring", load.id);
        return;
    }
    state.events.push(SessionEvent::ProgressChanged {
        percent: state.progress.percent(),
    });
    if state.phase == Phase::Loading && state.progress.is_complete() {
        finish_loading(state, now_ms);
    }
}

fn finish_loading(state: &mut Session, now_ms: f64) {
    state.enter(Phase::Idle, now_ms);
    state.events.push(SessionEvent::AssetsReady {
        failed: state.progress.failed(),
    });
}
