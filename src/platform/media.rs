//! Audio channels backed by HTML media elements

use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

use crate::audio::{AudioSink, Channel, PlayRequest};

/// One `<audio>` element per channel
pub struct MediaChannels {
    elements: [Option<HtmlAudioElement>; 4],
    /// Swallows `play()` rejections (autoplay policy, missing file)
    on_rejected: Closure<dyn FnMut(JsValue)>,
}

impl Default for MediaChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaChannels {
    pub fn new() -> Self {
        let elements = Channel::ALL.map(|channel| {
            let path = channel.asset().path();
            match HtmlAudioElement::new_with_src(path) {
                Ok(el) => {
                    el.set_preload("auto");
                    Some(el)
                }
                Err(e) => {
                    log::warn!("Failed to create audio element for {}: {:?}", path, e);
                    None
                }
            }
        });
        let on_rejected = Closure::<dyn FnMut(JsValue)>::new(|reason: JsValue| {
            log::debug!("play() rejected: {:?}", reason);
        });
        Self {
            elements,
            on_rejected,
        }
    }

    fn element(&self, channel: Channel) -> Option<&HtmlAudioElement> {
        let slot = match channel {
            Channel::Explosion => 0,
            Channel::Rain => 1,
            Channel::Background => 2,
            Channel::Jumpscare => 3,
        };
        self.elements[slot].as_ref()
    }
}

impl AudioSink for MediaChannels {
    fn play(&mut self, channel: Channel, request: PlayRequest) {
        let Some(el) = self.element(channel) else { return };
        if request.restart {
            el.set_current_time(0.0);
        }
        el.set_volume(request.volume as f64);
        el.set_loop(request.looped);
        if let Ok(promise) = el.play() {
            let _ = promise.catch(&self.on_rejected);
        }
    }

    fn set_volume(&mut self, channel: Channel, volume: f32) {
        if let Some(el) = self.element(channel) {
            el.set_volume(volume as f64);
        }
    }
}
