//! Game session lifecycle
//!
//! Every mini-game implements [`Game`]. [`Session`] wraps a game with the
//! shared lifecycle the host drives through [`GameSession`]:
//!
//! - `start` resets score, level, particles and pending events, lays the game
//!   out for the surface size and arms input
//! - `frame` runs fixed 60 Hz ticks, fires due events, paints, and reports
//!   whether the session is still running
//! - `stop` disarms input and cancels everything still pending
//!
//! Games request completion with [`Core::finish_after`]; once the delay has
//! elapsed the session stops itself and calls `on_complete` exactly once.

mod timers;

pub use timers::{TimerId, Timers};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::rc::Rc;

use crate::audio::{Instrument, SoundEffect, TonePlayer};
use crate::consts::{MAX_SUBSTEPS, PARTICLE_GRAVITY, SIM_DT_MS};
use crate::draw::Surface;
use crate::games::GameKind;
use crate::input::{Key, Pointer};
use crate::particles::{Burst, ParticlePool};
use crate::settings::Settings;

/// Longest frame gap fed into the simulation (ms)
const MAX_FRAME_GAP_MS: f64 = 100.0;
/// Float slack when comparing the accumulator against one step
const STEP_EPSILON_MS: f64 = 0.01;

/// Callback invoked when a game is won
pub type OnComplete = Box<dyn FnOnce()>;

/// Shared per-session state handed to every [`Game`] hook
pub struct Core<E> {
    pub score: u32,
    pub level: u32,
    pub particles: ParticlePool,
    pub rng: Pcg32,
    /// Surface size fixed at `start`
    pub size: Vec2,
    /// Timestamp (ms) of the current frame or input event
    pub now: f64,
    /// Fixed ticks since `start`
    pub ticks: u64,
    /// Skip shake and wobble animations
    pub reduced_motion: bool,
    audio: Rc<TonePlayer>,
    timers: Timers<E>,
    finish_at: Option<f64>,
}

impl<E> Core<E> {
    fn new(audio: Rc<TonePlayer>, seed: u64, gravity: f32) -> Self {
        Self {
            score: 0,
            level: 1,
            particles: ParticlePool::new(gravity, 500),
            rng: Pcg32::seed_from_u64(seed),
            size: Vec2::ZERO,
            now: 0.0,
            ticks: 0,
            reduced_motion: false,
            audio,
            timers: Timers::new(),
            finish_at: None,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn play(&self, effect: SoundEffect) {
        self.audio.play(effect);
    }

    pub fn play_note(&self, frequency: f32, instrument: Instrument) {
        self.audio.play_note(frequency, instrument);
    }

    /// Deliver `event` to [`Game::on_timer`] after `delay_ms`
    pub fn after(&mut self, delay_ms: f64, event: E) -> TimerId {
        self.timers.schedule(self.now + delay_ms.max(0.0), event)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// Drop every pending event (used by games that restart in place)
    pub fn cancel_timers(&mut self) {
        self.timers.cancel_all();
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Request completion after a celebratory delay. Only the first request
    /// counts; input is ignored from here on.
    pub fn finish_after(&mut self, delay_ms: f64) {
        if self.finish_at.is_none() {
            self.finish_at = Some(self.now + delay_ms.max(0.0));
        }
    }

    pub fn is_finishing(&self) -> bool {
        self.finish_at.is_some()
    }

    pub fn burst(&mut self, origin: Vec2, burst: &Burst) {
        self.particles.spawn_burst(&mut self.rng, origin, burst);
    }

    fn reset(&mut self, size: Vec2, now: f64, level: u32) {
        self.score = 0;
        self.level = level;
        self.particles.clear();
        self.size = size;
        self.now = now;
        self.ticks = 0;
        self.timers.cancel_all();
        self.finish_at = None;
    }
}

/// A concrete mini-game
pub trait Game {
    /// Deferred event payload
    type Event;

    /// Downward pull on this game's particles
    const PARTICLE_GRAVITY: f32 = PARTICLE_GRAVITY;

    fn kind(&self) -> GameKind;

    fn initial_level(&self) -> u32 {
        1
    }

    /// Rebuild all game state for a fresh run. Score and level are already
    /// reset and `core.size` holds the surface size.
    fn reset(&mut self, core: &mut Core<Self::Event>);

    fn pointer(&mut self, _core: &mut Core<Self::Event>, _ev: Pointer) {}

    fn key(&mut self, _core: &mut Core<Self::Event>, _key: Key) {}

    /// One fixed 60 Hz step
    fn update(&mut self, _core: &mut Core<Self::Event>) {}

    fn on_timer(&mut self, _core: &mut Core<Self::Event>, _event: Self::Event) {}

    /// Paint background, entities and overlay. Particles are drawn on top
    /// by the session.
    fn render(&self, core: &Core<Self::Event>, surface: &mut dyn Surface);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Halted,
}

/// Object-safe lifecycle the host drives
pub trait GameSession {
    fn kind(&self) -> GameKind;
    fn start(&mut self, size: Vec2, now: f64, on_complete: OnComplete);
    fn stop(&mut self);
    fn frame(&mut self, now: f64, surface: &mut dyn Surface) -> FrameStatus;
    fn pointer(&mut self, now: f64, ev: Pointer);
    fn key(&mut self, now: f64, key: Key);
    fn is_running(&self) -> bool;
    fn score(&self) -> u32;
    fn level(&self) -> u32;
}

/// A [`Game`] plus its lifecycle state
pub struct Session<G: Game> {
    game: G,
    core: Core<G::Event>,
    running: bool,
    on_complete: Option<OnComplete>,
    last_frame: Option<f64>,
    accumulator: f64,
}

impl<G: Game> Session<G> {
    pub fn new(game: G, audio: Rc<TonePlayer>, seed: u64) -> Self {
        Self {
            game,
            core: Core::new(audio, seed, G::PARTICLE_GRAVITY),
            running: false,
            on_complete: None,
            last_frame: None,
            accumulator: 0.0,
        }
    }

    /// Apply particle and motion preferences
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.core.particles.set_capacity(settings.max_particles());
        self.core.reduced_motion = settings.reduced_motion;
        self
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn core(&self) -> &Core<G::Event> {
        &self.core
    }

    fn accepts_input(&self) -> bool {
        self.running && !self.core.is_finishing()
    }

    fn step(&mut self) {
        self.game.update(&mut self.core);
        self.core.particles.update();
        self.core.ticks += 1;
    }

    fn fire_due_timers(&mut self, now: f64) {
        while self.running {
            let Some(event) = self.core.timers.pop_due(now) else {
                break;
            };
            self.game.on_timer(&mut self.core, event);
        }
    }

    fn complete(&mut self) {
        let callback = self.on_complete.take();
        self.stop();
        log::info!("{} complete (score {})", self.game.kind().title(), self.core.score);
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl<G: Game> GameSession for Session<G> {
    fn kind(&self) -> GameKind {
        self.game.kind()
    }

    fn start(&mut self, size: Vec2, now: f64, on_complete: OnComplete) {
        if self.running {
            self.stop();
        }
        let level = self.game.initial_level();
        self.core.reset(size, now, level);
        self.game.reset(&mut self.core);
        self.on_complete = Some(on_complete);
        self.last_frame = None;
        self.accumulator = 0.0;
        self.running = true;
        log::info!("{} started ({}x{})", self.game.kind().title(), size.x, size.y);
    }

    fn stop(&mut self) {
        if !self.running && self.on_complete.is_none() {
            return;
        }
        self.running = false;
        self.on_complete = None;
        self.core.timers.cancel_all();
        self.core.finish_at = None;
        self.core.particles.clear();
        log::info!("{} stopped", self.game.kind().title());
    }

    fn frame(&mut self, now: f64, surface: &mut dyn Surface) -> FrameStatus {
        if !self.running {
            return FrameStatus::Halted;
        }
        self.core.now = now;

        let elapsed = match self.last_frame {
            Some(last) => (now - last).clamp(0.0, MAX_FRAME_GAP_MS),
            None => SIM_DT_MS,
        };
        self.last_frame = Some(now);
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator + STEP_EPSILON_MS >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator = (self.accumulator - SIM_DT_MS).max(0.0);
            substeps += 1;
        }

        self.fire_due_timers(now);
        if !self.running {
            return FrameStatus::Halted;
        }

        self.game.render(&self.core, surface);
        self.core.particles.render(surface);

        if self.core.finish_at.is_some_and(|at| now >= at) {
            self.complete();
            return FrameStatus::Halted;
        }
        FrameStatus::Continue
    }

    fn pointer(&mut self, now: f64, ev: Pointer) {
        if !self.accepts_input() {
            return;
        }
        self.core.now = now;
        self.game.pointer(&mut self.core, ev);
    }

    fn key(&mut self, now: f64, key: Key) {
        if !self.accepts_input() {
            return;
        }
        self.core.now = now;
        self.game.key(&mut self.core, key);
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn score(&self) -> u32 {
        self.core.score
    }

    fn level(&self) -> u32 {
        self.core.level
    }
}

/// Test helpers shared by the game modules
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::audio::RecordingSink;
    use crate::draw::Recorder;
    use std::cell::Cell;

    pub const W: f32 = 800.0;
    pub const H: f32 = 600.0;

    /// A session on a recording surface with a virtual clock
    pub struct Harness<G: Game> {
        pub session: Session<G>,
        pub surface: Recorder,
        pub sink: RecordingSink,
        pub now: f64,
        pub completions: Rc<Cell<u32>>,
    }

    impl<G: Game> Harness<G> {
        pub fn new(game: G, seed: u64) -> Self {
            Self::sized(game, seed, W, H)
        }

        pub fn sized(game: G, seed: u64, w: f32, h: f32) -> Self {
            let sink = RecordingSink::new();
            let audio = Rc::new(TonePlayer::new(Box::new(sink.clone())));
            let mut harness = Self {
                session: Session::new(game, audio, seed),
                surface: Recorder::new(w, h),
                sink,
                now: 1000.0,
                completions: Rc::new(Cell::new(0)),
            };
            harness.start();
            harness
        }

        pub fn start(&mut self) {
            let done = self.completions.clone();
            let size = self.surface.size();
            self.session
                .start(size, self.now, Box::new(move || done.set(done.get() + 1)));
        }

        pub fn game(&self) -> &G {
            &self.session.game
        }

        pub fn game_mut(&mut self) -> &mut G {
            &mut self.session.game
        }

        pub fn core(&self) -> &Core<G::Event> {
            &self.session.core
        }

        pub fn core_mut(&mut self) -> &mut Core<G::Event> {
            &mut self.session.core
        }

        pub fn frame(&mut self) -> FrameStatus {
            self.now += SIM_DT_MS;
            self.surface.reset();
            self.session.frame(self.now, &mut self.surface)
        }

        pub fn frames(&mut self, n: usize) {
            for _ in 0..n {
                self.frame();
            }
        }

        /// Advance the clock by at least `ms`, one frame per tick
        pub fn run_ms(&mut self, ms: f64) {
            let n = (ms / SIM_DT_MS).ceil() as usize;
            self.frames(n);
        }

        pub fn tap(&mut self, p: Vec2) {
            self.session.pointer(self.now, Pointer::down(p.x, p.y));
            self.session.pointer(self.now, Pointer::up(p.x, p.y));
        }

        pub fn press(&mut self, p: Vec2) {
            self.session.pointer(self.now, Pointer::down(p.x, p.y));
        }

        pub fn drag_to(&mut self, p: Vec2) {
            self.session.pointer(self.now, Pointer::moved(p.x, p.y));
        }

        pub fn release(&mut self, p: Vec2) {
            self.session.pointer(self.now, Pointer::up(p.x, p.y));
        }

        pub fn key(&mut self, key: Key) {
            self.session.key(self.now, key);
        }

        pub fn completions(&self) -> u32 {
            self.completions.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use crate::draw::{Color, Recorder};
    use crate::input::PointerPhase;

    const PALETTE: &[Color] = &[Color::WHITE];

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Ev {
        Bump,
    }

    /// Scores on every tap; wins at 3 points after 500 ms
    #[derive(Default)]
    struct Tapper {
        resets: u32,
        ticks: u32,
        bumps: u32,
    }

    impl Game for Tapper {
        type Event = Ev;

        fn kind(&self) -> GameKind {
            GameKind::Colors
        }

        fn initial_level(&self) -> u32 {
            2
        }

        fn reset(&mut self, _core: &mut Core<Ev>) {
            self.resets += 1;
            self.ticks = 0;
        }

        fn pointer(&mut self, core: &mut Core<Ev>, ev: Pointer) {
            if ev.phase != PointerPhase::Down {
                return;
            }
            core.score += 1;
            core.burst(ev.pos, &Burst::ring(10, PALETTE));
            core.after(200.0, Ev::Bump);
            if core.score >= 3 {
                core.finish_after(500.0);
            }
        }

        fn update(&mut self, _core: &mut Core<Ev>) {
            self.ticks += 1;
        }

        fn on_timer(&mut self, core: &mut Core<Ev>, _event: Ev) {
            self.bumps += 1;
            core.level += 1;
        }

        fn render(&self, _core: &Core<Ev>, surface: &mut dyn Surface) {
            surface.text("tapper", Vec2::ZERO, &crate::draw::TextStyle::new(10.0, Color::BLACK));
        }
    }

    #[test]
    fn test_start_resets_score_and_level() {
        let mut h = Harness::new(Tapper::default(), 1);
        assert!(h.session.is_running());
        assert_eq!(h.session.level(), 2);
        h.tap(Vec2::new(10.0, 10.0));
        h.tap(Vec2::new(10.0, 10.0));
        assert_eq!(h.session.score(), 2);

        h.session.stop();
        h.start();
        assert_eq!(h.session.score(), 0);
        assert_eq!(h.session.level(), 2);
        assert!(h.core().particles.is_empty());
        assert_eq!(h.game().resets, 2);
    }

    #[test]
    fn test_one_frame_one_tick() {
        let mut h = Harness::new(Tapper::default(), 1);
        h.frames(30);
        assert_eq!(h.game().ticks, 30);
        assert_eq!(h.core().ticks, 30);
        assert!(h.surface.has_text("tapper"));
    }

    #[test]
    fn test_long_gap_is_bounded() {
        let mut h = Harness::new(Tapper::default(), 1);
        h.frame();
        h.now += 5000.0;
        let mut surface = Recorder::new(800.0, 600.0);
        h.session.frame(h.now, &mut surface);
        assert!(h.game().ticks <= 1 + MAX_SUBSTEPS);
    }

    #[test]
    fn test_stop_is_idempotent_and_safe_before_start() {
        let audio = Rc::new(TonePlayer::default());
        let mut s = Session::new(Tapper::default(), audio, 1);
        s.stop();
        s.stop();
        assert!(!s.is_running());
        let mut surface = Recorder::new(10.0, 10.0);
        assert_eq!(s.frame(16.0, &mut surface), FrameStatus::Halted);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn test_stop_drops_particles_and_timers() {
        let mut h = Harness::new(Tapper::default(), 1);
        h.tap(Vec2::new(50.0, 50.0));
        assert_eq!(h.core().particles.len(), 10);
        assert_eq!(h.core().pending_timers(), 1);

        h.session.stop();
        assert!(h.core().particles.is_empty());
        assert_eq!(h.core().pending_timers(), 0);

        // Input after stop is ignored
        h.tap(Vec2::new(50.0, 50.0));
        assert_eq!(h.session.score(), 1);
    }

    #[test]
    fn test_stale_timer_never_fires_after_restart() {
        let mut h = Harness::new(Tapper::default(), 1);
        h.tap(Vec2::new(50.0, 50.0));
        h.session.stop();
        h.start();
        h.run_ms(500.0);
        assert_eq!(h.game().bumps, 0);
        assert_eq!(h.session.level(), 2);
    }

    #[test]
    fn test_single_dispatch_after_restart() {
        let mut h = Harness::new(Tapper::default(), 1);
        for _ in 0..3 {
            h.session.stop();
            h.start();
        }
        h.tap(Vec2::new(50.0, 50.0));
        assert_eq!(h.session.score(), 1);
    }

    #[test]
    fn test_completion_after_delay_exactly_once() {
        let mut h = Harness::new(Tapper::default(), 1);
        for _ in 0..3 {
            h.tap(Vec2::new(50.0, 50.0));
        }
        assert!(h.core().is_finishing());

        // Input is frozen while celebrating
        h.tap(Vec2::new(50.0, 50.0));
        assert_eq!(h.session.score(), 3);

        h.run_ms(400.0);
        assert_eq!(h.completions(), 0);
        assert!(h.session.is_running());

        h.run_ms(200.0);
        assert_eq!(h.completions(), 1);
        assert!(!h.session.is_running());

        h.run_ms(1000.0);
        assert_eq!(h.completions(), 1);
    }

    #[test]
    fn test_stop_before_celebration_ends_skips_callback() {
        let mut h = Harness::new(Tapper::default(), 1);
        for _ in 0..3 {
            h.tap(Vec2::new(50.0, 50.0));
        }
        h.session.stop();
        h.run_ms(1000.0);
        assert_eq!(h.completions(), 0);
    }

    #[test]
    fn test_start_while_running_restarts() {
        let mut h = Harness::new(Tapper::default(), 1);
        h.tap(Vec2::new(50.0, 50.0));
        h.start();
        assert_eq!(h.session.score(), 0);
        assert_eq!(h.core().pending_timers(), 0);
    }

    #[test]
    fn test_settings_cap_particles() {
        let mut settings = Settings::default();
        settings.particles = false;
        let audio = Rc::new(TonePlayer::default());
        let mut s = Session::new(Tapper::default(), audio, 1).with_settings(&settings);
        s.start(Vec2::new(100.0, 100.0), 0.0, Box::new(|| {}));
        s.pointer(0.0, Pointer::down(5.0, 5.0));
        assert!(s.core().particles.is_empty());
        assert_eq!(s.score(), 1);
    }
}
