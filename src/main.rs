//! Geo Tank entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, HtmlElement};

    use geo_tank::audio::{AudioManager, SoundEffect};
    use geo_tank::consts::TICK_DT;
    use geo_tank::highscore::HighScore;
    use geo_tank::hud::{HudSnapshot, UPGRADE_ORDER};
    use geo_tank::renderer::{RenderState, build_scene};
    use geo_tank::settings::Settings;
    use geo_tank::sim::{
        GameEvent, GamePhase, GameState, TickInput, UpgradeKind, tick,
    };

    /// Continuously sampled input flags. Listeners write them
    /// asynchronously; the frame reads them exactly once per tick.
    /// `pause`/`upgrade` are one-shots consumed when the tick input is built.
    #[derive(Default)]
    struct InputState {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        fire: bool,
        pointer: Vec2,
        pause: bool,
        upgrade: Option<UpgradeKind>,
    }

    /// A registered DOM listener that can be detached at teardown
    struct ListenerHandle {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl ListenerHandle {
        fn attach(
            target: &EventTarget,
            kind: &'static str,
            closure: Closure<dyn FnMut(web_sys::Event)>,
        ) -> Self {
            let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            Self {
                target: target.clone(),
                kind,
                closure,
            }
        }

        fn detach(&self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    /// Game session: all loop state lives here and is torn down together.
    /// Unmounting must deregister every listener and cancel the pending
    /// frame callback, or a remounted game would double-handle input.
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        input: InputState,
        audio: AudioManager,
        settings: Settings,
        high_score: HighScore,
        /// Viewport in CSS pixels
        viewport: Vec2,
        listeners: Vec<ListenerHandle>,
        raf_id: Option<i32>,
        running: bool,
        shutdown_requested: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, high_score: HighScore) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);

            Self {
                state: GameState::new(seed),
                render_state: None,
                input: InputState::default(),
                audio,
                settings,
                high_score,
                viewport: Vec2::ZERO,
                listeners: Vec::new(),
                raf_id: None,
                running: true,
                shutdown_requested: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Snapshot the sampled input and consume the one-shots
        fn build_tick_input(&mut self) -> TickInput {
            let input = TickInput {
                up: self.input.up,
                down: self.input.down,
                left: self.input.left,
                right: self.input.right,
                fire: self.input.fire,
                pointer: self.input.pointer,
                viewport: self.viewport,
                pause: self.input.pause,
                upgrade: self.input.upgrade.take(),
            };
            self.input.pause = false;
            input
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::Shot => self.audio.play(SoundEffect::Shoot),
                GameEvent::BulletHit => self.audio.play(SoundEffect::Hit),
                GameEvent::EnemyDestroyed { .. } => self.audio.play(SoundEffect::Explosion),
                GameEvent::LevelUp { level } => {
                    self.audio.play(SoundEffect::LevelUp);
                    log::info!("Level up: {level}");
                }
                GameEvent::BossSpawned => self.audio.play(SoundEffect::BossSpawn),
                GameEvent::RunEnded { score } => {
                    if self.state.phase == GamePhase::GameOver {
                        self.audio.play(SoundEffect::GameOver);
                    }
                    if self.high_score.record(score) {
                        self.audio.play(SoundEffect::HighScore);
                        log::info!("New high score: {score}");
                    }
                }
            }
        }

        /// Sample this frame's shake jitter; the wgpu scene and the DOM
        /// text overlay share the same offset
        fn sample_jitter(&self) -> Vec2 {
            if !self.settings.effective_screen_shake() {
                return Vec2::ZERO;
            }
            let shake = self.state.camera.shake;
            if shake <= 0.0 {
                return Vec2::ZERO;
            }
            let hash = (self.state.time_ticks as u32).wrapping_mul(2654435761);
            let rx = (hash % 1000) as f32 / 1000.0 - 0.5;
            let ry = ((hash >> 10) % 1000) as f32 / 1000.0 - 0.5;
            Vec2::new(rx, ry) * shake
        }

        /// Render the current frame
        fn render(&mut self) {
            let jitter = self.sample_jitter();
            let vertices = build_scene(&self.state, self.viewport);
            if let Some(ref mut render_state) = self.render_state {
                render_state.set_view_center(self.state.camera.pos + jitter);
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
            self.update_floating_texts(jitter);
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// World-anchored announcements as a DOM overlay, projected with
        /// the same camera + jitter the renderer used
        fn update_floating_texts(&self, jitter: Vec2) {
            let Some(container) = document().and_then(|d| d.get_element_by_id("floating-texts"))
            else {
                return;
            };
            let view = self.state.camera.pos + jitter;

            let mut html = String::new();
            for t in &self.state.texts {
                let screen = t.pos - view + self.viewport * 0.5;
                html.push_str(&format!(
                    "<div class=\"floating-text\" style=\"left:{:.0}px;top:{:.0}px;opacity:{:.2};font-size:{:.0}px\">{}</div>",
                    screen.x,
                    screen.y,
                    t.alpha(),
                    t.size,
                    t.text
                ));
            }
            container.set_inner_html(&html);
        }

        /// Update HUD elements in the DOM from the published snapshot
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let snapshot = HudSnapshot::capture(&self.state);

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&snapshot.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&snapshot.level.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.high_score.best.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten()
                    {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            set_bar_width(&document, "#hp-bar .bar-fill", snapshot.hp_fraction());
            set_bar_width(&document, "#xp-bar .bar-fill", snapshot.xp_fraction());
            if let Some(el) = document.query_selector("#xp-bar .bar-label").ok().flatten() {
                el.set_text_content(Some(&format!("Lvl {} Tank", snapshot.level)));
            }

            // Upgrade stack
            if let Some(el) = document.get_element_by_id("hud-points") {
                if snapshot.upgrade_points > 0 {
                    let _ = el.set_attribute("class", "points");
                    el.set_text_content(Some(&format!(
                        "x{} Upgrades Available",
                        snapshot.upgrade_points
                    )));
                } else {
                    let _ = el.set_attribute("class", "points hidden");
                }
            }
            for (kind, id) in UPGRADE_ORDER.iter().zip([
                "upg-bullet-speed",
                "upg-reload",
                "upg-move-speed",
                "upg-damage",
            ]) {
                let tier = snapshot.upgrades.tier(*kind);
                let fraction = f32::from(tier) / f32::from(geo_tank::consts::MAX_UPGRADE_TIER);
                set_bar_width(&document, &format!("#{id} .bar-fill"), fraction);
                if let Some(el) = document
                    .query_selector(&format!("#{id} .bar-value"))
                    .ok()
                    .flatten()
                {
                    el.set_text_content(Some(&tier.to_string()));
                }
            }

            // Overlays
            if let Some(el) = document.get_element_by_id("pause-overlay") {
                let _ = el.set_attribute(
                    "class",
                    if snapshot.phase == GamePhase::Paused {
                        "overlay"
                    } else {
                        "overlay hidden"
                    },
                );
            }
            if let Some(el) = document.get_element_by_id("game-over") {
                if snapshot.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "overlay");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&snapshot.score.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "overlay hidden");
                }
            }
        }

        /// Deregister every listener and cancel the pending frame. Runs
        /// from the frame callback, never from inside a listener.
        fn teardown(&mut self) {
            self.running = false;
            if let Some(id) = self.raf_id.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
            for listener in self.listeners.drain(..) {
                listener.detach();
            }
            log::info!("Session torn down");
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn set_bar_width(document: &web_sys::Document, selector: &str, fraction: f32) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if let Some(html) = el.dyn_ref::<HtmlElement>() {
                let _ = html
                    .style()
                    .set_property("width", &format!("{:.1}%", fraction.clamp(0.0, 1.0) * 100.0));
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Geo Tank starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Size the canvas to the viewport, device-pixel-ratio aware
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let high_score = HighScore::load();
        let game = Rc::new(RefCell::new(Game::new(seed, settings, high_score)));
        game.borrow_mut().viewport = Vec2::new(client_w as f32, client_h as f32);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, dpr as f32).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_listeners(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Geo Tank running!");
    }

    /// Register all input and lifecycle listeners, keeping the handles on
    /// the session so teardown can detach them
    fn setup_listeners(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let window_target: EventTarget = window.clone().unchecked_into();
        let document_target: EventTarget = document.clone().unchecked_into();

        let mut handles = Vec::new();

        // Keyboard: WASD/arrows are level-triggered; hotkeys and pause are
        // edge-triggered with auto-repeat suppressed
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(key_event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                match key_event.key().to_lowercase().as_str() {
                    "w" | "arrowup" => g.input.up = true,
                    "s" | "arrowdown" => g.input.down = true,
                    "a" | "arrowleft" => g.input.left = true,
                    "d" | "arrowright" => g.input.right = true,
                    "1" if !key_event.repeat() => {
                        g.input.upgrade = Some(UpgradeKind::BulletSpeed)
                    }
                    "2" if !key_event.repeat() => g.input.upgrade = Some(UpgradeKind::Reload),
                    "3" if !key_event.repeat() => g.input.upgrade = Some(UpgradeKind::MoveSpeed),
                    "4" if !key_event.repeat() => g.input.upgrade = Some(UpgradeKind::Damage),
                    "escape" | "p" if !key_event.repeat() => g.input.pause = true,
                    _ => {}
                }
            });
            handles.push(ListenerHandle::attach(&window_target, "keydown", closure));
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(key_event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                match key_event.key().to_lowercase().as_str() {
                    "w" | "arrowup" => g.input.up = false,
                    "s" | "arrowdown" => g.input.down = false,
                    "a" | "arrowleft" => g.input.left = false,
                    "d" | "arrowright" => g.input.right = false,
                    _ => {}
                }
            });
            handles.push(ListenerHandle::attach(&window_target, "keyup", closure));
        }

        // Mouse: pointer position plus level-triggered trigger state
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                g.input.pointer = Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32);
            });
            handles.push(ListenerHandle::attach(&window_target, "mousemove", closure));
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.input.fire = true;
                // First gesture also unlocks the audio context
                g.audio.resume();
            });
            handles.push(ListenerHandle::attach(&window_target, "mousedown", closure));
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.fire = false;
            });
            handles.push(ListenerHandle::attach(&window_target, "mouseup", closure));
        }

        // Auto-pause when the tab hides or the window loses focus
        {
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Running {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            handles.push(ListenerHandle::attach(
                &document_target,
                "visibilitychange",
                closure,
            ));
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Running {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            handles.push(ListenerHandle::attach(&window_target, "blur", closure));
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().audio.set_muted(false);
            });
            handles.push(ListenerHandle::attach(&window_target, "focus", closure));
        }

        // Keep the canvas and surface sized to the viewport
        {
            let game = game.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else { return };
                let dpr = window.device_pixel_ratio();
                let client_w = canvas.client_width();
                let client_h = canvas.client_height();
                let width = (client_w as f64 * dpr) as u32;
                let height = (client_h as f64 * dpr) as u32;
                canvas.set_width(width);
                canvas.set_height(height);

                let mut g = game.borrow_mut();
                g.viewport = Vec2::new(client_w as f32, client_h as f32);
                if let Some(ref mut render_state) = g.render_state {
                    render_state.resize(width, height);
                }
            });
            handles.push(ListenerHandle::attach(&window_target, "resize", closure));
        }

        // HUD upgrade bars issue spend commands through the same one-shot
        // path as the hotkeys
        for (kind, id) in UPGRADE_ORDER.iter().zip([
            "upg-bullet-speed",
            "upg-reload",
            "upg-move-speed",
            "upg-damage",
        ]) {
            if let Some(el) = document.get_element_by_id(id) {
                let game = game.clone();
                let kind = *kind;
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    game.borrow_mut().input.upgrade = Some(kind);
                });
                handles.push(ListenerHandle::attach(
                    &el.unchecked_into(),
                    "click",
                    closure,
                ));
            }
        }

        // Restart (terminal variant) and exit affordances
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let seed = js_sys::Date::now() as u64;
                let mut g = game.borrow_mut();
                let policy = g.state.death_policy;
                g.state = GameState::with_death_policy(seed, policy);
                g.input = InputState::default();
                log::info!("Game restarted with seed: {}", seed);
            });
            handles.push(ListenerHandle::attach(&btn.unchecked_into(), "click", closure));
        }
        if let Some(btn) = document.get_element_by_id("exit-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                // Actual teardown happens at the top of the next frame,
                // outside this listener's own call stack
                game.borrow_mut().shutdown_requested = true;
            });
            handles.push(ListenerHandle::attach(&btn.unchecked_into(), "click", closure));
        }

        game.borrow_mut().listeners = handles;
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let loop_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(loop_game, time);
        });
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .unwrap_or(0);
        game.borrow_mut().raf_id = Some(id);
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if g.shutdown_requested {
                g.teardown();
                return;
            }
            if !g.running {
                return;
            }

            // One tick per display refresh; simulation speed is
            // intentionally coupled to the paint rate
            let input = g.build_tick_input();
            tick(&mut g.state, &input, TICK_DT);

            for event in g.state.take_events() {
                g.handle_event(event);
            }

            g.track_fps(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Geo Tank (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    println!("\nRunning simulation smoke test...");
    smoke_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive the sim for a few hundred ticks without a display, the quickest
/// sanity check that the pipeline holds together
#[cfg(not(target_arch = "wasm32"))]
fn smoke_run() {
    use geo_tank::consts::{TICK_DT, WORLD_HEIGHT, WORLD_WIDTH};
    use geo_tank::sim::{GameState, TickInput, tick};
    use glam::Vec2;

    let mut state = GameState::new(42);
    let input = TickInput {
        fire: true,
        right: true,
        pointer: Vec2::new(640.0, 360.0),
        viewport: Vec2::new(1280.0, 720.0),
        ..Default::default()
    };

    for _ in 0..600 {
        tick(&mut state, &input, TICK_DT);
    }

    assert!(state.player.pos.x > 0.0 && state.player.pos.x < WORLD_WIDTH);
    assert!(state.player.pos.y > 0.0 && state.player.pos.y < WORLD_HEIGHT);
    println!(
        "✓ 600 ticks: score={} level={} entities={}",
        state.player.score,
        state.player.level,
        state.entities.len()
    );
}
