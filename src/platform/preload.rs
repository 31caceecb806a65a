//! Parallel media preloading
//!
//! One promise per asset. Each settlement is reported as it happens (for
//! the progress bar) and the whole set is joined with `Promise.allSettled`.

use std::rc::Rc;

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{AddEventListenerOptions, EventTarget, HtmlAudioElement, HtmlImageElement};

use crate::assets::{AssetId, AssetKind, AssetLoad, LoadError, LoadReport};

/// Load every asset in the manifest, calling `on_settled` as each one
/// finishes. Resolves once all of them have settled.
pub async fn preload(on_settled: impl Fn(AssetLoad) + 'static) -> LoadReport {
    let on_settled = Rc::new(on_settled);
    let promises = Array::new();
    // Elements must stay alive until their events fire
    let mut keep_alive: Vec<EventTarget> = Vec::new();

    for id in AssetId::ALL {
        let promise = match id.kind() {
            AssetKind::Audio => audio_promise(id, &mut keep_alive),
            AssetKind::Image => image_promise(id, &mut keep_alive),
        };
        promises.push(&promise);

        let on_settled = on_settled.clone();
        spawn_local(async move {
            let load = match JsFuture::from(promise).await {
                Ok(_) => AssetLoad::loaded(id),
                Err(reason) => AssetLoad::failed(id, describe(&reason)),
            };
            on_settled(load);
        });
    }

    log::info!("Preloading {} assets", promises.length());

    let settled = match JsFuture::from(Promise::all_settled(&promises)).await {
        Ok(v) => Array::from(&v),
        Err(e) => {
            log::error!("allSettled failed: {:?}", e);
            Array::new()
        }
    };
    drop(keep_alive);

    let results: Vec<Result<(), LoadError>> = AssetId::ALL
        .iter()
        .zip(settled.iter())
        .map(|(id, entry)| {
            let status = Reflect::get(&entry, &"status".into())
                .ok()
                .and_then(|s| s.as_string());
            if status.as_deref() == Some("fulfilled") {
                Ok(())
            } else {
                let reason = Reflect::get(&entry, &"reason".into()).unwrap_or(JsValue::UNDEFINED);
                Err(LoadError::Media {
                    path: id.path().to_string(),
                    reason: describe(&reason),
                })
            }
        })
        .collect();

    LoadReport::from_results(&results)
}

/// Resolve on `canplaythrough`, reject on `error`
fn audio_promise(id: AssetId, keep_alive: &mut Vec<EventTarget>) -> Promise {
    let audio = match HtmlAudioElement::new() {
        Ok(a) => a,
        Err(e) => return Promise::reject(&e),
    };
    keep_alive.push(audio.clone().into());

    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        once(&audio, "canplaythrough", resolve);
        once(&audio, "error", reject);
    });
    audio.set_preload("auto");
    audio.set_src(id.path());
    audio.load();
    promise
}

/// Resolve on `load`, reject on `error`
fn image_promise(id: AssetId, keep_alive: &mut Vec<EventTarget>) -> Promise {
    let img = match HtmlImageElement::new() {
        Ok(i) => i,
        Err(e) => return Promise::reject(&e),
    };
    keep_alive.push(img.clone().into());

    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        once(&img, "load", resolve);
        once(&img, "error", reject);
    });
    img.set_src(id.path());
    promise
}

/// Attach a one-shot listener that forwards the event to `callback`
fn once(target: &EventTarget, event: &str, callback: Function) {
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let closure = Closure::once_into_js(move |ev: JsValue| {
        let _ = callback.call1(&JsValue::NULL, &ev);
    });
    let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.unchecked_ref(),
        &options,
    );
}

/// Best-effort text for a rejection reason
fn describe(reason: &JsValue) -> String {
    if let Some(s) = reason.as_string() {
        return s;
    }
    if let Some(ev) = reason.dyn_ref::<web_sys::Event>() {
        return format!("{} event", ev.type_());
    }
    format!("{:?}", reason)
}
