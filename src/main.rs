//! Playroom entry point
//!
//! Browser: wires the DOM screens, canvas input and the frame loop to the
//! [`playroom::Host`]. Native: plays a short scripted session headless.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent,
        TouchEvent,
    };

    use playroom::draw::CanvasSurface;
    use playroom::gate::{GateEvent, GateState};
    use playroom::input::{Key, Pointer};
    use playroom::{GameKind, Host, Screen, Settings, TonePlayer};

    /// Everything the callbacks share
    struct App {
        host: Host,
        surface: CanvasSurface,
        /// Screen element currently shown
        shown: Option<&'static str>,
        /// Question and candidates currently rendered as buttons
        puzzle_key: Option<String>,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0.0, |p| p.now())
    }

    fn by_id(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Attach a click handler to the element with this id
    fn on_click(id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        if let Some(el) = by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// DOM screen for the host state
    fn screen_id(screen: Screen, gate: GateState) -> &'static str {
        match screen {
            Screen::Gate => match gate {
                GateState::Locked | GateState::TimeExpired => "pin-screen",
                GateState::PuzzleChallenge => "puzzle-screen",
                _ => "parent-screen",
            },
            Screen::Menu => "menu",
            Screen::Playing(_) => "game-screen",
            Screen::Success(_) => "success-screen",
            Screen::Timeout => "timeout-screen",
        }
    }

    impl App {
        /// Mirror host state into the page
        fn sync_dom(&mut self) {
            let Some(document) = document() else {
                return;
            };
            let gate = self.host.gate();
            let id = screen_id(self.host.screen(), gate.state());
            if self.shown != Some(id) {
                if let Ok(list) = document.query_selector_all(".screen") {
                    for i in 0..list.length() {
                        if let Some(el) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                            let _ = el.class_list().remove_1("active");
                        }
                    }
                }
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.class_list().add_1("active");
                }
                self.shown = Some(id);
            }

            set_text("time-remaining-value", &gate.display());
            if let Some(el) = by_id("time-remaining-value") {
                let _ = el.class_list().toggle_with_force("warning", gate.is_warning());
            }
            if let GateState::TimeSelected { minutes } = gate.state() {
                set_text("selected-time-text", &format!("✅ {minutes} minutes selected"));
            }
            if let Some(el) = by_id("start-play-button") {
                let ready = matches!(gate.state(), GateState::TimeSelected { .. });
                let _ = el.class_list().toggle_with_force("disabled", !ready);
            }
            set_text("mute-button", if self.host.settings().muted { "🔇" } else { "🔊" });
            if let Screen::Playing(kind) = self.host.screen() {
                set_text("game-title", &format!("{} {}", kind.icon(), kind.title()));
                set_text("score", &self.host.score().to_string());
            }

            self.sync_puzzle(&document);
        }

        fn sync_puzzle(&mut self, document: &Document) {
            let gate = self.host.gate();
            let Some(puzzle) = gate.puzzle() else {
                self.puzzle_key = None;
                return;
            };
            let key = format!("{}{:?}", puzzle.question, puzzle.candidates);
            if self.puzzle_key.as_deref() != Some(key.as_str()) {
                set_text("puzzle-question", &puzzle.question);
                if let Some(answers) = document.get_element_by_id("puzzle-answers") {
                    answers.set_inner_html("");
                    for value in &puzzle.candidates {
                        if let Ok(btn) = document.create_element("button") {
                            btn.set_class_name("puzzle-answer-button");
                            let _ = btn.set_attribute("data-value", &value.to_string());
                            btn.set_text_content(Some(&value.to_string()));
                            let _ = answers.append_child(&btn);
                        }
                    }
                }
                self.puzzle_key = Some(key);
            }
            if let Some(answers) = by_id("puzzle-answers") {
                let _ = answers
                    .class_list()
                    .toggle_with_force("disabled", !gate.answers_enabled());
            }
            let status = match gate.pending_verdict() {
                Some(true) => "✅ Right!",
                Some(false) => "❌ Not quite, here comes a new one...",
                None => "",
            };
            set_text("puzzle-status", status);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Playroom starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let (width, height) = fit_canvas(&window, &canvas);

        let settings = Settings::load();
        let audio = Rc::new(TonePlayer::web());
        let seed = js_sys::Date::now() as u64;
        let host = Host::new(audio, settings, Vec2::new(width as f32, height as f32), seed);
        let surface = CanvasSurface::new(&canvas)?;
        let app = Rc::new(RefCell::new(App {
            host,
            surface,
            shown: None,
            puzzle_key: None,
        }));

        log::info!("Host initialized with seed: {}", seed);

        setup_gate(app.clone());
        setup_menu(app.clone());
        setup_input_handlers(&canvas, app.clone());
        setup_resize(canvas, app.clone());
        setup_clock(app.clone())?;

        app.borrow_mut().sync_dom();
        request_animation_frame(app);

        log::info!("Playroom running!");
        Ok(())
    }

    /// Match the canvas backing store to the window
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0) as u32;
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn input_value(id: &str) -> Option<HtmlInputElement> {
        by_id(id)?.dyn_into::<HtmlInputElement>().ok()
    }

    fn submit_pin(app: &Rc<RefCell<App>>, input_id: &str) {
        let Some(input) = input_value(input_id) else {
            return;
        };
        let pin = input.value();
        input.set_value("");
        let result = app.borrow_mut().host.submit_pin(&pin);
        match result {
            Ok(()) => set_text("pin-error", ""),
            Err(e) => {
                log::info!("PIN rejected: {e}");
                set_text("pin-error", "❌ Wrong code! Try again.");
                let _ = input.class_list().add_1("shake");
                if let Some(window) = web_sys::window() {
                    let input = input.clone();
                    let closure = Closure::once(move || {
                        let _ = input.class_list().remove_1("shake");
                    });
                    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                        closure.as_ref().unchecked_ref(),
                        500,
                    );
                    closure.forget();
                }
            }
        }
        app.borrow_mut().sync_dom();
    }

    fn setup_gate(app: Rc<RefCell<App>>) {
        for (input_id, button_id) in [("pin-input", "pin-submit"), ("timeout-pin-input", "timeout-pin-submit")] {
            {
                let app = app.clone();
                on_click(button_id, move |_| submit_pin(&app, input_id));
            }
            if let Some(input) = by_id(input_id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                    if event.key() == "Enter" {
                        submit_pin(&app, input_id);
                    }
                });
                let _ = input.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(list) = document().and_then(|d| d.query_selector_all(".time-button").ok()) {
            for i in 0..list.length() {
                let Some(btn) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                    continue;
                };
                let Some(minutes) = btn.get_attribute("data-minutes").and_then(|m| m.parse::<u32>().ok()) else {
                    continue;
                };
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let mut a = app.borrow_mut();
                    if let Err(e) = a.host.select_minutes(minutes) {
                        log::warn!("{e}");
                    }
                    a.sync_dom();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        {
            let app = app.clone();
            on_click("start-play-button", move |_| {
                let mut a = app.borrow_mut();
                if let Err(e) = a.host.start_play() {
                    log::warn!("{e}");
                }
                a.sync_dom();
            });
        }
        {
            let app = app.clone();
            on_click("mute-button", move |_| {
                let mut a = app.borrow_mut();
                a.host.toggle_mute();
                a.sync_dom();
            });
        }
        {
            let app = app.clone();
            on_click("lock-button", move |_| {
                let mut a = app.borrow_mut();
                let _ = a.host.lock();
                a.sync_dom();
            });
        }
        {
            let app = app.clone();
            on_click("ask-parent-button", move |_| {
                let mut a = app.borrow_mut();
                if let Err(e) = a.host.ask_grown_up() {
                    log::warn!("{e}");
                }
                a.sync_dom();
            });
        }
        {
            let app = app.clone();
            on_click("puzzle-cancel", move |_| {
                let mut a = app.borrow_mut();
                let _ = a.host.cancel_puzzle();
                a.sync_dom();
            });
        }
        // Answer buttons are rebuilt per puzzle, so listen on the container
        on_click("puzzle-answers", move |event| {
            let value = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.get_attribute("data-value"))
                .and_then(|v| v.parse::<u32>().ok());
            if let Some(value) = value {
                let mut a = app.borrow_mut();
                if let Err(e) = a.host.answer_puzzle(value, now()) {
                    log::debug!("answer ignored: {e}");
                }
                a.sync_dom();
            }
        });
    }

    fn setup_menu(app: Rc<RefCell<App>>) {
        if let Some(list) = document().and_then(|d| d.query_selector_all(".game-button").ok()) {
            for i in 0..list.length() {
                let Some(btn) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                    continue;
                };
                let Some(kind) = btn.get_attribute("data-game").and_then(|g| GameKind::from_str(&g)) else {
                    log::warn!("menu button without a known game");
                    continue;
                };
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let mut a = app.borrow_mut();
                    if let Err(e) = a.host.choose_game(kind, now()) {
                        log::warn!("cannot start {}: {e}", kind.title());
                    }
                    a.sync_dom();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        for id in ["back-button", "menu-button"] {
            let app = app.clone();
            on_click(id, move |_| {
                let mut a = app.borrow_mut();
                a.host.exit_game();
                a.sync_dom();
            });
        }
        on_click("replay-button", move |_| {
            let mut a = app.borrow_mut();
            if let Err(e) = a.host.replay(now()) {
                log::warn!("{e}");
            }
            a.sync_dom();
        });
    }

    fn touch_point(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
        let touch = event.touches().get(0).or_else(|| event.changed_touches().get(0))?;
        let rect = canvas.get_bounding_client_rect();
        Some((
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let mouse: [(&str, fn(f32, f32) -> Pointer); 3] = [
            ("mousedown", Pointer::down),
            ("mousemove", Pointer::moved),
            ("mouseup", Pointer::up),
        ];
        for (name, make) in mouse {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let ev = make(event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut().host.pointer(now(), ev);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let touch: [(&str, fn(f32, f32) -> Pointer); 3] = [
            ("touchstart", Pointer::down),
            ("touchmove", Pointer::moved),
            ("touchend", Pointer::up),
        ];
        for (name, make) in touch {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_point(&canvas_clone, &event) {
                    app.borrow_mut().host.pointer(now(), make(x, y));
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_code(&event.code()) else {
                    return;
                };
                let mut a = app.borrow_mut();
                if !matches!(a.host.screen(), Screen::Playing(_)) {
                    return;
                }
                event.prevent_default();
                a.host.key(now(), key);
                a.sync_dom();
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (w, h) = fit_canvas(&window, &canvas);
            let mut a = app.borrow_mut();
            a.surface.resize(w, h);
            a.host.resize(Vec2::new(w as f32, h as f32));
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One gate tick per second, independent of the frame rate
    fn setup_clock(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut a = app.borrow_mut();
            if a.host.tick_second() == Some(GateEvent::Warning) {
                if let Some(el) = by_id("time-remaining-value") {
                    let _ = el.class_list().add_1("pulse");
                }
            }
            a.sync_dom();
        });
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1000,
        )?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let App { host, surface, .. } = &mut *a;
            host.frame(time, surface);
            a.sync_dom();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Playroom (native) starting...");
    log::info!("The browser build is the real app - run with `trunk serve`");

    println!("\nRunning a headless session...");
    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Unlock the gate, play a few seconds of every game and let the time run out
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use glam::Vec2;
    use playroom::consts::{GATE_PIN, SIM_DT_MS};
    use playroom::draw::Recorder;
    use playroom::input::Pointer;
    use playroom::{GameKind, Host, Screen, Settings, TonePlayer};
    use std::rc::Rc;

    let size = Vec2::new(800.0, 600.0);
    let mut host = Host::new(Rc::new(TonePlayer::default()), Settings::load(), size, 42);
    let mut surface = Recorder::new(size.x, size.y);
    let mut now = 0.0;

    let unlocked = host
        .submit_pin(GATE_PIN)
        .and_then(|()| host.select_minutes(5))
        .and_then(|()| host.start_play());
    if let Err(e) = unlocked {
        eprintln!("gate refused: {e}");
        return;
    }

    for kind in GameKind::ALL {
        if let Err(e) = host.choose_game(kind, now) {
            eprintln!("{}: {e}", kind.title());
            continue;
        }
        for tick in 0..180 {
            now += SIM_DT_MS;
            if tick % 30 == 0 {
                let p = Vec2::new((tick * 13 % 800) as f32, (tick * 7 % 600) as f32);
                host.pointer(now, Pointer::down(p.x, p.y));
                host.pointer(now, Pointer::up(p.x, p.y));
            }
            surface.reset();
            host.frame(now, &mut surface);
        }
        println!(
            "  {} {:<10} score {:>3}, {} draw calls in the last frame",
            kind.icon(),
            kind.title(),
            host.score(),
            surface.ops.len()
        );
        host.exit_game();
    }

    for _ in 0..5 * 60 {
        host.tick_second();
    }
    if host.screen() == Screen::Timeout {
        println!("✓ Play time ran out, gate shows {}", host.gate().display());
    } else {
        eprintln!("play time did not run out ({})", host.gate().display());
    }
}
