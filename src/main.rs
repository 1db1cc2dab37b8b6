//! Square Chase entry point
//!
//! On the web this wires browser events into the controller's command queue
//! and drives it from `requestAnimationFrame`. Natively it runs a headless
//! demo with a scripted pointer.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use glam::Vec2;
    use square_chase::sim::{Command, Direction, GamePhase, Viewport};
    use square_chase::{CommandSender, Controller, FrameSnapshot, Settings};

    /// Maximum particle elements kept in the DOM
    const PARTICLE_POOL: usize = 64;
    /// How far a particle travels over its lifetime (px)
    const PARTICLE_TRAVEL: f32 = 60.0;

    struct Game {
        controller: Controller,
        player: HtmlElement,
        target: HtmlElement,
        score: HtmlElement,
        title: HtmlElement,
        particles: Vec<HtmlElement>,
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn viewport_size() -> (f32, f32) {
        let window = web_sys::window().unwrap();
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (w as f32, h as f32)
    }

    fn square(document: &Document, id: &str, size: f32, color: &str) -> HtmlElement {
        let el: HtmlElement = document
            .create_element("div")
            .expect("create element")
            .dyn_into()
            .expect("div is an HtmlElement");
        el.set_id(id);
        let style = el.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("width", &format!("{size}px"));
        let _ = style.set_property("height", &format!("{size}px"));
        let _ = style.set_property("background", color);
        el
    }

    fn place(el: &HtmlElement, pos: Vec2) {
        let style = el.style();
        let _ = style.set_property("left", &format!("{}px", pos.x));
        let _ = style.set_property("top", &format!("{}px", pos.y));
    }

    impl Game {
        fn render(&self, snap: &FrameSnapshot) {
            place(&self.player, snap.player);
            place(&self.target, snap.target);
            self.score.set_text_content(Some(&format!("Score: {}", snap.score)));

            let title_display = if snap.phase == GamePhase::Title { "block" } else { "none" };
            let _ = self.title.style().set_property("display", title_display);

            for (i, el) in self.particles.iter().enumerate() {
                match snap.particles.get(i) {
                    Some(p) => {
                        let offset = Vec2::new(p.angle.cos(), p.angle.sin()) * PARTICLE_TRAVEL * p.age;
                        place(el, p.pos + offset);
                        let style = el.style();
                        let _ = style.set_property("opacity", &format!("{}", 1.0 - p.age));
                        let _ = style.set_property("display", "block");
                    }
                    None => {
                        let _ = el.style().set_property("display", "none");
                    }
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Square Chase starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let body = document.body().expect("no body");

        let settings = Settings::default();
        let (w, h) = viewport_size();
        let viewport = Viewport::new(w, h).unwrap_or_else(|e| {
            log::warn!("{e}, using default viewport");
            Viewport::new(
                square_chase::consts::DEFAULT_VIEWPORT_WIDTH,
                square_chase::consts::DEFAULT_VIEWPORT_HEIGHT,
            )
            .expect("default viewport is valid")
        });

        let player = square(&document, "player", settings.player_size, "#3fa9f5");
        let target = square(&document, "target", settings.target_size, "#f5563f");
        let score = square(&document, "score", 0.0, "transparent");
        let _ = score.style().set_property("width", "auto");
        let title = square(&document, "title", 0.0, "transparent");
        let _ = title.style().set_property("width", "100%");
        let _ = title.style().set_property("top", "40%");
        title.set_text_content(Some("Square Chase - click or tap to start"));

        let mut particles = Vec::with_capacity(PARTICLE_POOL);
        for i in 0..PARTICLE_POOL {
            let el = square(&document, &format!("particle-{i}"), 4.0, "#ffd23f");
            let _ = el.style().set_property("display", "none");
            particles.push(el);
        }

        for el in [&player, &target, &score, &title] {
            let _ = body.append_child(el);
        }
        for el in &particles {
            let _ = body.append_child(el);
        }

        let seed = js_sys::Date::now() as u64;
        let controller = Controller::new(settings, viewport, seed);
        let sender = controller.sender();
        let game = Rc::new(RefCell::new(Game {
            controller,
            player,
            target,
            score,
            title,
            particles,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&sender);
        setup_auto_pause(game.clone());
        request_animation_frame(game);
    }

    fn setup_input_handlers(sender: &CommandSender) {
        let window = web_sys::window().unwrap();

        // Mouse move
        {
            let sender = sender.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                sender.send(Command::PointerMoved(Vec2::new(
                    event.client_x() as f32,
                    event.client_y() as f32,
                )));
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click - leaves the title screen
        {
            let sender = sender.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                sender.send(Command::Start);
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start/move
        for name in ["touchstart", "touchmove"] {
            let sender = sender.clone();
            let is_start = name == "touchstart";
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if is_start {
                    sender.send(Command::Start);
                }
                if let Some(touch) = event.touches().get(0) {
                    sender.send(Command::PointerMoved(Vec2::new(
                        touch.client_x() as f32,
                        touch.client_y() as f32,
                    )));
                }
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let sender = sender.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match Direction::from_key(event.key().as_str()) {
                    Some(dir) => {
                        sender.send(Command::Start);
                        sender.send(Command::Arrow(dir));
                    }
                    None if matches!(event.key().as_str(), " " | "Enter") => {
                        sender.send(Command::Start);
                    }
                    None => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let sender = sender.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (width, height) = viewport_size();
                sender.send(Command::Resized { width, height });
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                g.controller.suspend(now_ms());
            } else {
                g.controller.resume(now_ms());
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            let snap = g.controller.frame(now_ms());
            g.render(&snap);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Square Chase (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in a browser");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match square_chase::Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => square_chase::Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    headless_demo(settings, seed);
}

/// Chase the target with a scripted pointer on a simulated 60 Hz clock
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(settings: square_chase::Settings, seed: u64) {
    use square_chase::Controller;
    use square_chase::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
    use square_chase::sim::{Command, GameEvent, Viewport};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const DEMO_SECONDS: f64 = 120.0;
    /// Pointer speed of the scripted player (px/frame)
    const CHASE_STEP: f32 = 6.0;

    let viewport = match Viewport::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT) {
        Ok(viewport) => viewport,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let mut controller = Controller::new(settings, viewport, seed);
    let sender = controller.sender();
    sender.send(Command::Start);

    let mut pointer = controller.state().player.center();
    let mut now = 0.0;
    let mut orbit_at = None;
    while now < DEMO_SECONDS * 1000.0 {
        let to_target = controller.state().target.center() - pointer;
        pointer += to_target.clamp_length_max(CHASE_STEP);
        sender.send(Command::PointerMoved(pointer));

        let snap = controller.frame(now);
        for event in &snap.events {
            match event {
                GameEvent::Scored { score } if score % 10 == 0 => {
                    log::info!("[{:>6.1}s] score {}", now / 1000.0, score);
                }
                GameEvent::OrbitEngaged => orbit_at = Some(now),
                _ => {}
            }
        }
        now += FRAME_MS;
    }

    let state = controller.state();
    println!("Seed:      {seed}");
    println!("Score:     {}", state.score);
    match orbit_at {
        Some(t) => println!("Orbiting:  since {:.1}s", t / 1000.0),
        None => println!("Orbiting:  no"),
    }
    println!("Particles: {} live", state.particles.len());
}
