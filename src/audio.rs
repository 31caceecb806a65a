//! Playback controller
//!
//! Four independent channels backed by preloaded media files. The
//! controller decides what to play and how loud; an `AudioSink` does the
//! actual playing (HTML media elements on the web, a logger natively).

use crate::assets::AssetId;
use crate::consts::*;
use crate::sim::SessionEvent;

/// Audio channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Explosion,
    Rain,
    Background,
    Jumpscare,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Explosion,
        Channel::Rain,
        Channel::Background,
        Channel::Jumpscare,
    ];

    /// Media file backing this channel
    pub fn asset(self) -> AssetId {
        match self {
            Channel::Explosion => AssetId::Explosion,
            Channel::Rain => AssetId::Rain,
            Channel::Background => AssetId::Background,
            Channel::Jumpscare => AssetId::JumpscareScream,
        }
    }
}

/// How to start a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRequest {
    pub volume: f32,
    pub looped: bool,
    /// Seek to zero before playing
    pub restart: bool,
}

/// Something that can play the channels. Calls are fire-and-forget.
pub trait AudioSink {
    fn play(&mut self, channel: Channel, request: PlayRequest);
    fn set_volume(&mut self, channel: Channel, volume: f32);
}

/// Background loop volume for a given intensity
#[inline]
pub fn background_volume(intensity: f32) -> f32 {
    (intensity * BACKGROUND_VOLUME_FACTOR).min(1.0)
}

/// Audio controller for the session
pub struct PlaybackController<S: AudioSink> {
    sink: S,
    master_volume: f32,
    muted: bool,
    background_playing: bool,
}

impl<S: AudioSink> PlaybackController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 1.0,
            muted: false,
            background_playing: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Scale a channel volume by master/mute
    fn effective(&self, volume: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            (volume * self.master_volume).clamp(0.0, 1.0)
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Start the background loop. Repeat calls only adjust the volume.
    pub fn play_background_loop(&mut self, intensity: f32) {
        let volume = self.effective(background_volume(intensity));
        if self.background_playing {
            self.sink.set_volume(Channel::Background, volume);
            return;
        }
        self.sink.play(
            Channel::Background,
            PlayRequest {
                volume,
                looped: true,
                restart: false,
            },
        );
        self.background_playing = true;
    }

    /// Follow intensity changes once the loop is running
    pub fn set_background_intensity(&mut self, intensity: f32) {
        if self.background_playing {
            let volume = self.effective(background_volume(intensity));
            self.sink.set_volume(Channel::Background, volume);
        }
    }

    pub fn play_explosion(&mut self) {
        self.restart(Channel::Explosion, EXPLOSION_VOLUME, false);
    }

    pub fn play_rain(&mut self) {
        self.restart(Channel::Rain, RAIN_VOLUME, true);
    }

    pub fn play_jumpscare(&mut self) {
        self.restart(Channel::Jumpscare, JUMPSCARE_VOLUME, false);
    }

    fn restart(&mut self, channel: Channel, volume: f32, looped: bool) {
        let volume = self.effective(volume);
        self.sink.play(
            channel,
            PlayRequest {
                volume,
                looped,
                restart: true,
            },
        );
    }

    /// Play whatever a session event calls for
    pub fn handle(&mut self, event: &SessionEvent) {
        match *event {
            SessionEvent::BackgroundStarted { intensity } => self.play_background_loop(intensity),
            SessionEvent::IntensityChanged { intensity } => self.set_background_intensity(intensity),
            SessionEvent::Exploded { .. } => {
                self.play_explosion();
                self.play_rain();
            }
            SessionEvent::JumpscareStarted => self.play_jumpscare(),
            SessionEvent::ProgressChanged { .. }
            | SessionEvent::AssetsReady { .. }
            | SessionEvent::ConfirmReady
            | SessionEvent::Reload => {}
        }
    }
}

/// Sink that only logs, for native runs
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, channel: Channel, request: PlayRequest) {
        log::info!(
            "play {:?} ({}) vol={:.2} loop={} restart={}",
            channel,
            channel.asset().path(),
            request.volume,
            request.looped,
            request.restart
        );
    }

    fn set_volume(&mut self, channel: Channel, volume: f32) {
        log::info!("volume {:?} -> {:.2}", channel, volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Play(Channel, PlayRequest),
        Volume(Channel, f32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, channel: Channel, request: PlayRequest) {
            self.calls.push(Call::Play(channel, request));
        }

        fn set_volume(&mut self, channel: Channel, volume: f32) {
            self.calls.push(Call::Volume(channel, volume));
        }
    }

    fn plays(ctl: &PlaybackController<Recorder>, channel: Channel) -> usize {
        ctl.sink()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Play(ch, _) if *ch == channel))
            .count()
    }

    #[test]
    fn test_background_volume_formula() {
        assert_eq!(background_volume(1.0), 0.5);
        assert_eq!(background_volume(1.6), 0.8);
        assert_eq!(background_volume(2.0), 1.0);
        assert_eq!(background_volume(0.0), 0.0);
    }

    #[test]
    fn test_background_loops_and_follows_intensity() {
        let mut ctl = PlaybackController::new(Recorder::default());
        ctl.set_background_intensity(1.2); // not started yet
        assert!(ctl.sink().calls.is_empty());

        ctl.play_background_loop(1.0);
        ctl.set_background_intensity(2.0);
        ctl.play_background_loop(1.4);

        assert_eq!(
            ctl.sink().calls,
            vec![
                Call::Play(
                    Channel::Background,
                    PlayRequest {
                        volume: 0.5,
                        looped: true,
                        restart: false
                    }
                ),
                Call::Volume(Channel::Background, 1.0),
                Call::Volume(Channel::Background, 0.7),
            ]
        );
    }

    #[test]
    fn test_explosion_event_plays_explosion_and_rain_once() {
        let mut ctl = PlaybackController::new(Recorder::default());
        ctl.handle(&SessionEvent::Exploded { explosion: 1 });
        assert_eq!(plays(&ctl, Channel::Explosion), 1);
        assert_eq!(plays(&ctl, Channel::Rain), 1);

        let rain = ctl.sink().calls.iter().find_map(|c| match c {
            Call::Play(Channel::Rain, r) => Some(*r),
            _ => None,
        });
        assert_eq!(
            rain,
            Some(PlayRequest {
                volume: RAIN_VOLUME,
                looped: true,
                restart: true
            })
        );
    }

    #[test]
    fn test_jumpscare_restarts_from_zero() {
        let mut ctl = PlaybackController::new(Recorder::default());
        ctl.handle(&SessionEvent::JumpscareStarted);
        ctl.handle(&SessionEvent::JumpscareStarted);
        assert_eq!(plays(&ctl, Channel::Jumpscare), 2);
        assert!(ctl.sink().calls.iter().all(|c| matches!(c, Call::Play(_, r) if r.restart)));
    }

    #[test]
    fn test_mute_and_master_volume() {
        let mut ctl = PlaybackController::new(Recorder::default());
        ctl.set_master_volume(0.5);
        ctl.play_explosion();
        ctl.set_muted(true);
        ctl.play_rain();

        let volumes: Vec<f32> = ctl
            .sink()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Play(_, r) => Some(r.volume),
                _ => None,
            })
            .collect();
        assert_eq!(volumes, vec![0.5, 0.0]);
    }

    #[test]
    fn test_bookkeeping_events_are_silent() {
        let mut ctl = PlaybackController::new(Recorder::default());
        ctl.handle(&SessionEvent::ProgressChanged { percent: 40 });
        ctl.handle(&SessionEvent::ConfirmReady);
        ctl.handle(&SessionEvent::Reload);
        assert!(ctl.sink().calls.is_empty());
    }
}
