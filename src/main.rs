//! Balloon Boom entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlButtonElement, HtmlCanvasElement, MouseEvent};

    use balloon_boom::audio::PlaybackController;
    use balloon_boom::platform::{self, MediaChannels, now_ms};
    use balloon_boom::render::{Layout, Scene, Viewport, balloon_hit};
    use balloon_boom::renderer::SdfRenderState;
    use balloon_boom::sim::{Action, Session, SessionEvent, advance, page_hidden, reduce};
    use balloon_boom::ui::{self, HudView};
    use balloon_boom::Settings;

    /// App instance holding all state
    struct App {
        session: Session,
        scene: Scene,
        audio: PlaybackController<MediaChannels>,
        render_state: Option<SdfRenderState>,
        viewport: Viewport,
        last_hud: Option<HudView>,
        reloading: bool,
    }

    impl App {
        fn new(seed: u64, settings: &Settings, viewport: Viewport) -> Self {
            let mut audio = PlaybackController::new(MediaChannels::new());
            audio.set_master_volume(settings.master_volume);
            audio.set_muted(settings.muted);
            Self {
                session: Session::new(seed),
                scene: Scene::new(settings.raindrops(), settings.reduced_motion),
                audio,
                render_state: None,
                viewport,
                last_hud: None,
                reloading: false,
            }
        }

        /// Reduce a user/preload action right now
        fn dispatch(&mut self, action: Action) {
            reduce(&mut self.session, action, now_ms());
            self.flush_events();
        }

        /// Forward queued session events to audio and the page
        fn flush_events(&mut self) {
            for event in self.session.drain_events() {
                self.audio.handle(&event);
                match event {
                    SessionEvent::AssetsReady { failed } => {
                        if failed > 0 {
                            log::warn!("Ready with {} missing asset(s)", failed);
                            for error in self.session.progress.errors() {
                                log::warn!("  {}", error);
                            }
                        } else {
                            log::info!("All assets ready");
                        }
                    }
                    SessionEvent::Reload if !self.reloading => {
                        self.reloading = true;
                        platform::reload_page();
                    }
                    _ => {}
                }
            }
        }

        /// Fire due timers and sync presentation state
        fn update(&mut self, time: f64) {
            advance(&mut self.session, time);
            self.flush_events();
            self.scene.sync(&self.session);
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let frame = self.scene.frame(&self.session, self.viewport, time);

            if let Some(overlay) = frame.jumpscare {
                let document = web_sys::window().and_then(|w| w.document());
                if let Some(img) = document.and_then(|d| platform::html_element(&d, "jumpscare-img")) {
                    let style = img.style();
                    let _ = style.set_property("transform", &format!("scale({})", overlay.scale));
                    let _ = style.set_property("opacity", &overlay.opacity.to_string());
                }
            }

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let scale = render_state.scale;
                        render_state.resize(render_state.size.0, render_state.size.1, scale);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update DOM controls (only when something changed)
        fn update_hud(&mut self) {
            let hud = HudView::from_session(&self.session).with_renderer(self.render_state.is_some());
            if self.last_hud == Some(hud) {
                return;
            }
            self.last_hud = Some(hud);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            platform::set_hidden(&document, "loading", !hud.loading_visible);
            if let Some(bar) = platform::html_element(&document, "loading-bar") {
                let _ = bar
                    .style()
                    .set_property("width", &hud.percent_label());
            }
            if let Some(el) = document.get_element_by_id("loading-percent") {
                el.set_text_content(Some(&hud.percent_label()));
            }

            platform::set_hidden(&document, "play-btn", !hud.play_visible);
            platform::set_hidden(&document, "pump-btn", !hud.pump_visible);
            if let Some(btn) = document
                .get_element_by_id("pump-btn")
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
            {
                btn.set_disabled(hud.pump_disabled);
            }
            platform::set_hidden(&document, "confirm-btn", !hud.confirm_visible);
            platform::set_hidden(&document, "jumpscare", !hud.jumpscare_visible);
            platform::set_hidden(&document, "gpu-notice", !hud.renderer_notice_visible);
        }

        fn balloon_under(&self, x: f32, y: f32) -> bool {
            let layout = Layout::new(self.viewport);
            self.session.started()
                && !self.session.exploded()
                && balloon_hit(layout.balloon_center, self.session.intensity, glam::Vec2::new(x, y))
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Balloon Boom starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        log::info!(
            "Settings: quality={} volume={:.2} muted={} reduced_motion={}",
            settings.quality.as_str(),
            settings.master_volume,
            settings.muted,
            settings.reduced_motion
        );

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (viewport, width, height, dpr) = measure(&window, &canvas);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, &settings, viewport)));
        if let Some(timeout_ms) = settings.preload_timeout_ms {
            app.borrow_mut()
                .session
                .arm_preload_deadline(now_ms(), timeout_ms);
        }

        // Preload media; progress flows through the session
        {
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let sink = app.clone();
                let report = platform::preload(move |load| {
                    sink.borrow_mut().dispatch(Action::AssetLoaded(load));
                })
                .await;
                log::info!(
                    "Preload settled: {}/{} loaded, {} failed",
                    report.loaded,
                    report.total(),
                    report.failed
                );
            });
        }

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match SdfRenderState::new(surface, &adapter, width, height, dpr as f32).await {
                            Ok(rs) => app.borrow_mut().render_state = Some(rs),
                            Err(e) => log::error!("Failed to set up renderer: {}", e),
                        }
                    }
                    Err(e) => log::error!("No WebGPU adapter, canvas disabled: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        setup_buttons(app.clone());
        setup_balloon_input(&canvas, app.clone());
        setup_resize(&canvas, app.clone());
        setup_teardown(app.clone());

        request_animation_frame(app);

        log::info!("Balloon Boom running!");
    }

    /// CSS viewport plus backing-store size of the canvas
    fn measure(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (Viewport, u32, u32, f64) {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let viewport = Viewport {
            width: client_w as f32,
            height: client_h as f32,
        };
        (viewport, width, height, dpr)
    }

    fn on_click(id: &str, app: Rc<RefCell<App>>, action: Action) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            app.borrow_mut().dispatch(action.clone());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            if let Some(btn) = document.get_element_by_id("confirm-btn") {
                btn.set_text_content(Some(ui::CONFIRM_LABEL));
            }
            if let Some(notice) = document.get_element_by_id("gpu-notice") {
                notice.set_text_content(Some(ui::NO_WEBGPU_NOTICE));
            }
        }

        on_click("play-btn", app.clone(), Action::Start);
        on_click("pump-btn", app.clone(), Action::Pump);
        on_click("confirm-btn", app, Action::Confirm);
    }

    fn setup_balloon_input(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Click on the balloon
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.balloon_under(event.offset_x() as f32, event.offset_y() as f32) {
                    a.dispatch(Action::BalloonTap);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer cursor while hovering the balloon
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let hover = app
                    .borrow()
                    .balloon_under(event.offset_x() as f32, event.offset_y() as f32);
                let cursor = if hover { "pointer" } else { "default" };
                let _ = canvas_clone.style().set_property("cursor", cursor);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let (viewport, width, height, dpr) = measure(&window, &canvas);
            let mut a = app.borrow_mut();
            a.viewport = viewport;
            if let Some(ref mut rs) = a.render_state {
                rs.resize(width, height, dpr as f32);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Cancel pending timers when the page goes away for good
    fn setup_teardown(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PageTransitionEvent| {
            page_hidden(&mut app.borrow_mut().session, event.persisted());
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.update(time);
            a.render(time);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balloon Boom (native) starting...");
    log::info!("The interactive page needs a browser - run with `trunk serve`");

    headless_walkthrough();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive one scripted session with a logging audio sink
#[cfg(not(target_arch = "wasm32"))]
fn headless_walkthrough() {
    use balloon_boom::assets::{AssetId, AssetLoad};
    use balloon_boom::audio::{LogSink, PlaybackController};
    use balloon_boom::render::{Scene, Viewport};
    use balloon_boom::sim::{Action, Session, SessionEvent, advance, reduce};
    use balloon_boom::ui::HudView;

    let settings = balloon_boom::Settings::load();
    let mut session = Session::new(0x5EED);
    let mut scene = Scene::new(settings.raindrops(), settings.reduced_motion);
    let mut audio = PlaybackController::new(LogSink);
    if let Some(timeout_ms) = settings.preload_timeout_ms {
        session.arm_preload_deadline(0.0, timeout_ms);
    }

    let script: Vec<(f64, Action)> = AssetId::ALL
        .into_iter()
        .enumerate()
        .map(|(i, id)| (i as f64 * 100.0, Action::AssetLoaded(AssetLoad::loaded(id))))
        .chain([
            (1000.0, Action::Start),
            (1200.0, Action::Pump),
            (1400.0, Action::Pump),
            (1600.0, Action::BalloonTap),
            (1800.0, Action::Pump),
            (2000.0, Action::BalloonTap),
            (7500.0, Action::Confirm),
        ])
        .collect();

    let mut reloaded = false;
    for (at, action) in script {
        advance(&mut session, at);
        reduce(&mut session, action, at);
        scene.sync(&session);
        for event in session.drain_events() {
            audio.handle(&event);
        }
    }
    for t in [8000.0, 9000.0, 9100.0] {
        advance(&mut session, t);
        for event in session.drain_events() {
            audio.handle(&event);
            reloaded |= event == SessionEvent::Reload;
        }
    }

    let frame = scene.frame(
        &session,
        Viewport {
            width: 1280.0,
            height: 720.0,
        },
        9100.0,
    );
    log::info!(
        "Final: {:?}, intensity {:.1}, {} rings, {} drops, hud {:?}",
        session.phase,
        session.intensity,
        frame.rings.len(),
        frame.drops.len(),
        HudView::from_session(&session)
    );
    for error in session.progress.errors() {
        log::warn!("Asset error: {}", error);
    }
    match serde_json::to_string_pretty(&session) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Snapshot failed: {}", e),
    }
    println!("Reload requested: {}", reloaded);
}
