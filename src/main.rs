//! Arcade Sim entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use arcade_sim::consts::FRAME_MS;
    use arcade_sim::highscores::{HighScore, INVADERS_KEY, SNAKE_KEY};
    use arcade_sim::persistence::{KeyValueStore, LocalStore};
    use arcade_sim::platform::{Action, FixedInterval, InputSampler, LoopHandle, LoopToken};
    use arcade_sim::renderer::{Frame, RenderState, invaders_frame, snake_frame};
    use arcade_sim::settings::Settings;
    use arcade_sim::sim::{
        Direction, GameEvent, GamePhase, GameState, SnakeState, autopilot_input, tick,
    };

    /// Which game receives keyboard input
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Focus {
        Invaders,
        Snake,
    }

    /// Snake board on its own canvas and timer
    struct SnakeGame {
        state: SnakeState,
        render_state: Option<RenderState>,
        timer: FixedInterval,
        high: HighScore,
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        input: InputSampler,
        frame_clock: FixedInterval,
        last_time: f64,
        loop_handle: LoopHandle,
        store: Option<LocalStore>,
        settings: Settings,
        high: HighScore,
        snake: Option<SnakeGame>,
        focus: Focus,
        /// Computer plays the invaders round
        idle_mode: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store = match LocalStore::open() {
                Ok(store) => Some(store),
                Err(err) => {
                    log::warn!("High scores will not persist: {}", err);
                    None
                }
            };
            let (settings, high) = match &store {
                Some(store) => (
                    Settings::load(store),
                    HighScore::load(store, INVADERS_KEY),
                ),
                None => (Settings::default(), HighScore::new(INVADERS_KEY)),
            };

            Self {
                state: GameState::with_seed(seed),
                render_state: None,
                input: InputSampler::new(settings.bindings.clone()),
                frame_clock: FixedInterval::new(FRAME_MS),
                last_time: 0.0,
                loop_handle: LoopHandle::new(),
                store,
                settings,
                high,
                snake: None,
                focus: Focus::Invaders,
                idle_mode: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn attach_snake(&mut self, seed: u64, render_state: Option<RenderState>) {
            let state = SnakeState::new(seed);
            let high = match &self.store {
                Some(store) => HighScore::load(store, SNAKE_KEY),
                None => HighScore::new(SNAKE_KEY),
            };
            self.snake = Some(SnakeGame {
                timer: FixedInterval::new(f64::from(state.tick_interval_ms())),
                state,
                render_state,
                high,
            });
        }

        /// Run due simulation ticks for both boards
        fn update(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                FRAME_MS
            };
            self.last_time = time;

            let due = self.frame_clock.advance(elapsed);
            for _ in 0..due {
                let sampled = self.input.sample(time);
                let input = if self.idle_mode {
                    let mut auto = autopilot_input(&self.state, time);
                    auto.pause = sampled.pause;
                    auto
                } else {
                    sampled
                };
                tick(&mut self.state, &input);

                for event in &self.state.events {
                    match event {
                        GameEvent::InvaderDestroyed { kind, points } => {
                            log::debug!("{:?} invader destroyed (+{})", kind, points)
                        }
                        GameEvent::FormationReversed => log::debug!("Formation reversed"),
                        _ => {}
                    }
                }

                if self.high.observe(self.state.score) {
                    save_high(&self.high, self.store.as_mut());
                }
            }

            if let Some(snake) = &mut self.snake {
                snake
                    .timer
                    .set_period(f64::from(snake.state.tick_interval_ms()));
                for _ in 0..snake.timer.advance(elapsed) {
                    snake.state.tick();
                    if snake.high.observe(snake.state.score) {
                        save_high(&snake.high, self.store.as_mut());
                    }
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let span = time - oldest_time;
                if span > 0.0 {
                    self.fps = (60000.0 / span).round() as u32;
                }
            }
        }

        /// Render both boards; a missing surface is a no-op
        fn render(&mut self) {
            if let Some(render_state) = &mut self.render_state {
                draw(render_state, &invaders_frame(&self.state));
            }
            if let Some(snake) = &mut self.snake {
                if let Some(render_state) = &mut snake.render_state {
                    draw(render_state, &snake_frame(&snake.state));
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set("#hud-score .hud-value", &self.state.score.to_string());
            set("#hud-lives .hud-value", &self.state.lives.to_string());
            set("#hud-high .hud-value", &self.high.best().to_string());
            if self.settings.show_fps {
                set("#hud-fps .hud-value", &self.fps.to_string());
            }

            let status = match self.state.phase {
                GamePhase::Running if self.idle_mode => "DEMO",
                GamePhase::Running => "",
                GamePhase::Paused => "PAUSED",
                GamePhase::GameOver => "GAME OVER",
                GamePhase::Victory => "VICTORY",
            };
            set("#hud-status", status);

            if let Some(snake) = &self.snake {
                set("#snake-score .hud-value", &snake.state.score.to_string());
                set("#snake-high .hud-value", &snake.high.best().to_string());
            }
        }

        /// Start a fresh invaders round
        fn restart(&mut self, seed: u64) {
            self.state.restart_with_seed(seed);
            self.frame_clock.reset();
            self.input.release_all();
        }

        fn handle_key_down(&mut self, event: &KeyboardEvent) {
            let code = event.code();

            if code == "KeyI" && !event.repeat() {
                self.idle_mode = !self.idle_mode;
                log::info!("Idle mode: {}", self.idle_mode);
                return;
            }

            match self.focus {
                Focus::Invaders => match self.input.key_down(&code) {
                    Some(Action::Confirm) if self.state.phase.is_terminal() => {
                        self.restart(js_sys::Date::now() as u64);
                    }
                    _ => {}
                },
                Focus::Snake => {
                    let Some(snake) = &mut self.snake else {
                        return;
                    };
                    if event.repeat() {
                        return;
                    }
                    match self.settings.bindings.action_for(&code) {
                        Some(Action::Up) => snake.state.steer(Direction::Up),
                        Some(Action::Down) => snake.state.steer(Direction::Down),
                        Some(Action::Left) => snake.state.steer(Direction::Left),
                        Some(Action::Right) => snake.state.steer(Direction::Right),
                        Some(Action::Fire | Action::Pause) => {
                            snake.state.toggle_pause();
                            snake.timer.reset();
                        }
                        Some(Action::Confirm) => {
                            snake.state.confirm();
                            snake.timer.reset();
                        }
                        None => {}
                    }
                }
            }
        }

        fn auto_pause(&mut self) {
            if !self.settings.pause_on_blur {
                return;
            }
            self.input.release_all();
            if self.state.phase == GamePhase::Running {
                self.input.request_pause();
                log::info!("Auto-paused (window blur)");
            }
            if let Some(snake) = &mut self.snake {
                if snake.state.phase == GamePhase::Running {
                    snake.state.toggle_pause();
                }
            }
        }
    }

    fn save_high(high: &HighScore, store: Option<&mut LocalStore>) {
        if let Some(store) = store {
            let store: &mut dyn KeyValueStore = store;
            if let Err(err) = high.save(store) {
                log::warn!("Could not save high score: {}", err);
            }
        }
    }

    fn draw(render_state: &mut RenderState, frame: &Frame) {
        match render_state.render(frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                render_state.resize(render_state.size.0, render_state.size.1);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    fn js_err(msg: &str) -> JsValue {
        JsValue::from_str(msg)
    }

    /// Size the canvas backing store to its CSS box
    fn fit_canvas(canvas: &HtmlCanvasElement, dpr: f64) -> (u32, u32) {
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    /// WebGPU setup for one canvas; `None` leaves the board undrawn
    async fn create_renderer(
        instance: &wgpu::Instance,
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Option<RenderState> {
        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(err) => {
                log::warn!("No drawing surface: {}", err);
                return None;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(err) => {
                log::warn!("No GPU adapter: {}", err);
                return None;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => Some(render_state),
            Err(err) => {
                log::warn!("No GPU device: {}", err);
                None
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| js_err(&e.to_string()))?;

        log::info!("Arcade Sim starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // A missing canvas only costs that board its drawing
        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok());
        let snake_canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("snake-canvas")
            .and_then(|el| el.dyn_into().ok());

        let dpr = window.device_pixel_ratio();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match &canvas {
            Some(canvas) => {
                let (width, height) = fit_canvas(canvas, dpr);
                let render_state = create_renderer(&instance, canvas, width, height).await;
                game.borrow_mut().render_state = render_state;
                setup_focus(canvas, game.clone(), Focus::Invaders);
            }
            None => log::warn!("No #canvas element; invaders will not be drawn"),
        }

        if let Some(snake_canvas) = &snake_canvas {
            let (w, h) = fit_canvas(snake_canvas, dpr);
            let render_state = create_renderer(&instance, snake_canvas, w, h).await;
            game.borrow_mut().attach_snake(seed ^ 0x5eed, render_state);
            setup_focus(snake_canvas, game.clone(), Focus::Snake);
        }

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());
        setup_page_lifecycle(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        start_loop(game);

        log::info!("Arcade Sim running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if matches!(
                    code.as_str(),
                    "Space" | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight"
                ) {
                    event.prevent_default();
                }
                game.borrow_mut().handle_key_down(&event);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>, focus: Focus) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            if g.focus != focus {
                g.input.release_all();
                g.focus = focus;
                log::info!("Keyboard focus: {:?}", focus);
            }
        });
        let _ =
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Begin a new frame loop; any callback from a previous loop becomes a no-op
    fn start_loop(game: Rc<RefCell<Game>>) {
        let token = {
            let mut g = game.borrow_mut();
            g.last_time = 0.0;
            g.loop_handle.start()
        };
        request_animation_frame(game, token);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, token: LoopToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, token, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: LoopToken, time: f64) {
        {
            let mut g = game.borrow_mut();
            if !g.loop_handle.is_live(token) {
                return;
            }

            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game, token);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("restart-btn"))
        else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let seed = js_sys::Date::now() as u64;
            {
                let mut g = game.borrow_mut();
                match g.focus {
                    Focus::Invaders => g.restart(seed),
                    Focus::Snake => {
                        if let Some(snake) = &mut g.snake {
                            snake.state.restart();
                            snake.timer.reset();
                        }
                    }
                }
            }
            start_loop(game.clone());
            log::info!("Started new game with seed: {}", seed);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Stop the loop when the page is hidden for navigation; resume it on return
    fn setup_page_lifecycle(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.input.release_all();
                g.loop_handle.cancel();
                log::info!("Loop stopped (page hidden)");
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let stopped = !game.borrow().loop_handle.is_running();
                if stopped {
                    log::info!("Loop resumed (page shown)");
                    start_loop(game.clone());
                }
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            game.borrow_mut().auto_pause();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(err) = wasm_game::run().await {
        web_sys::console::error_1(&err);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arcade Sim (native) starting...");
    log::info!("Native mode runs headless demos - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x00C0_FFEE);
    let tuning = args.next().map(|path| native::load_tuning(&path)).unwrap_or_default();

    let mut store = native::open_store();
    native::invaders_demo(seed, tuning, store.as_mut());
    native::snake_demo(seed, store.as_mut());
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use arcade_sim::Tuning;
    use arcade_sim::consts::FRAME_MS;
    use arcade_sim::highscores::{HighScore, INVADERS_KEY, SNAKE_KEY};
    use arcade_sim::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
    use arcade_sim::platform::FixedInterval;
    use arcade_sim::sim::{Direction, GameEvent, GameState, SnakeState, autopilot_input, tick};

    /// Five simulated minutes at 60 Hz
    const INVADERS_TICK_LIMIT: u64 = 60 * 60 * 5;
    const SNAKE_TICK_LIMIT: u32 = 5_000;

    pub fn load_tuning(path: &str) -> Tuning {
        match std::fs::read_to_string(path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(err) => {
                log::warn!("Cannot read tuning {}: {}", path, err);
                Tuning::default()
            }
        }
    }

    /// High scores live next to the system temp files unless overridden
    pub fn open_store() -> Box<dyn KeyValueStore> {
        let path = std::env::var_os("ARCADE_SIM_STORE")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("arcade-sim-scores.json"));

        match JsonFileStore::open(&path) {
            Ok(store) => {
                log::info!("High scores stored in {}", store.path().display());
                Box::new(store)
            }
            Err(err) => {
                log::warn!("High scores will not persist ({}): {}", path.display(), err);
                Box::new(MemoryStore::new())
            }
        }
    }

    fn record(high: &mut HighScore, score: u64, store: &mut dyn KeyValueStore) {
        match high.submit(score, store) {
            Ok(true) => log::info!("New high score: {}", score),
            Ok(false) => {}
            Err(err) => log::warn!("Could not save high score: {}", err),
        }
    }

    /// Autopilot plays one invaders round with a simulated 60 Hz clock
    pub fn invaders_demo(seed: u64, tuning: Tuning, store: &mut dyn KeyValueStore) {
        let mut state = GameState::new(seed, tuning);
        let mut high = HighScore::load(store, INVADERS_KEY);
        log::info!("Invaders demo: seed {}, best so far {}", seed, high.best());

        let (mut fired, mut kills, mut hits) = (0u32, 0u32, 0u32);
        for frame in 0..INVADERS_TICK_LIMIT {
            let now_ms = frame as f64 * FRAME_MS;
            let input = autopilot_input(&state, now_ms);
            tick(&mut state, &input);

            for event in &state.events {
                match event {
                    GameEvent::PlayerFired => fired += 1,
                    GameEvent::InvaderDestroyed { .. } => kills += 1,
                    GameEvent::PlayerHit { .. } => hits += 1,
                    _ => {}
                }
            }

            if state.phase.is_terminal() {
                break;
            }
        }

        log::info!(
            "Invaders demo finished: {:?} after {} ticks, score {}, lives {}, \
             {} shots, {} kills, {} hits taken",
            state.phase,
            state.time_ticks,
            state.score,
            state.lives,
            fired,
            kills,
            hits
        );
        record(&mut high, state.score, store);
    }

    /// Pick a non-reversing heading that does not crash, closest to the food
    ///
    /// The tail still blocks its cell on the tick it would move away.
    fn snake_heading(state: &SnakeState) -> Direction {
        let head = state.head();
        let target = state.food.unwrap_or(head);

        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .into_iter()
        .filter(|dir| *dir != state.heading.opposite())
        .map(|dir| (dir, head + dir.delta()))
        .filter(|(_, next)| {
            next.x >= 0
                && next.y >= 0
                && next.x < state.size.x
                && next.y < state.size.y
                && !state.body.contains(next)
        })
        .min_by_key(|(_, next)| (*next - target).abs().element_sum())
        .map(|(dir, _)| dir)
        .unwrap_or(state.heading)
    }

    /// Greedy snake round, driven the way the browser host drives it
    pub fn snake_demo(seed: u64, store: &mut dyn KeyValueStore) {
        let mut state = SnakeState::new(seed);
        let mut high = HighScore::load(store, SNAKE_KEY);
        let mut timer = FixedInterval::new(f64::from(state.tick_interval_ms()));
        state.confirm();

        let mut ticks = 0;
        'frames: while ticks < SNAKE_TICK_LIMIT {
            timer.set_period(f64::from(state.tick_interval_ms()));
            for _ in 0..timer.advance(FRAME_MS) {
                state.steer(snake_heading(&state));
                state.tick();
                ticks += 1;
                if state.phase.is_terminal() {
                    break 'frames;
                }
            }
        }

        log::info!(
            "Snake demo finished: {:?} after {} ticks, score {}, length {}, period {} ms",
            state.phase,
            ticks,
            state.score,
            state.body.len(),
            state.tick_interval_ms()
        );
        record(&mut high, state.score, store);
    }
}
