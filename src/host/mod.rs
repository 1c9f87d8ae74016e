//! Session host
//!
//! Owns the parental gate, the shared [`TonePlayer`], the settings and at
//! most one running game. The browser entry point forwards DOM events here
//! and mirrors [`Host::screen`] into the page; everything else happens on
//! the canvas through [`Host::frame`].

pub mod backdrop;

pub use backdrop::Backdrop;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::cell::Cell;
use std::rc::Rc;

use crate::audio::{SoundEffect, TonePlayer};
use crate::draw::{Color, Paint, Surface, TextStyle};
use crate::games::{self, GameKind};
use crate::gate::{GateError, GateEvent, GateState, Puzzle, SessionGate};
use crate::input::{Key, Pointer};
use crate::particles::{Burst, ParticlePool, Spread};
use crate::session::GameSession;
use crate::settings::Settings;
use backdrop::PASTELS;

/// Confetti pieces on the success screen
const CONFETTI_PIECES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// PIN prompt, dashboard or puzzle, depending on the gate state
    Gate,
    Menu,
    Playing(GameKind),
    Success(GameKind),
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("play time is not running")]
    PlayTimeInactive,
    #[error("nothing to replay")]
    NothingToReplay,
    #[error(transparent)]
    Gate(#[from] GateError),
}

pub struct Host {
    audio: Rc<TonePlayer>,
    settings: Settings,
    gate: SessionGate,
    screen: Screen,
    session: Option<Box<dyn GameSession>>,
    completed: Rc<Cell<bool>>,
    last_kind: Option<GameKind>,
    size: Vec2,
    backdrop: Backdrop,
    confetti: ParticlePool,
    rng: Pcg32,
}

impl Host {
    pub fn new(audio: Rc<TonePlayer>, settings: Settings, size: Vec2, seed: u64) -> Self {
        settings.apply_audio(&audio);
        let mut rng = Pcg32::seed_from_u64(seed);
        let gate = SessionGate::new(rng.random());
        let backdrop = Backdrop::new(&mut rng, size);
        let confetti = ParticlePool::new(0.15, settings.max_particles());
        Self {
            audio,
            settings,
            gate,
            screen: Screen::Gate,
            session: None,
            completed: Rc::new(Cell::new(false)),
            last_kind: None,
            size,
            backdrop,
            confetti,
            rng,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn audio(&self) -> &Rc<TonePlayer> {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Takes effect for the next game started
    pub fn set_settings(&mut self, settings: Settings) {
        settings.apply_audio(&self.audio);
        self.confetti.set_capacity(settings.max_particles());
        settings.save();
        self.settings = settings;
    }

    /// Flip the sound switch and persist it; returns the new muted state
    pub fn toggle_mute(&mut self) -> bool {
        let settings = Settings {
            muted: !self.settings.muted,
            ..self.settings.clone()
        };
        self.set_settings(settings);
        log::info!("sound {}", if self.settings.muted { "off" } else { "on" });
        self.settings.muted
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
        self.backdrop.resize(size);
    }

    fn show(&mut self, screen: Screen) {
        if self.screen != screen {
            log::info!("screen: {:?} -> {:?}", self.screen, screen);
        }
        self.screen = screen;
    }

    /// Stop and drop the running game, if any
    fn stop_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.completed.set(false);
    }

    // === Gate ===

    pub fn submit_pin(&mut self, pin: &str) -> Result<(), HostError> {
        self.audio.unlock();
        match self.gate.submit_pin(pin) {
            Ok(()) => {
                self.show(Screen::Gate);
                Ok(())
            }
            Err(e) => {
                self.audio.play(SoundEffect::Error);
                Err(e.into())
            }
        }
    }

    pub fn select_minutes(&mut self, minutes: u32) -> Result<(), HostError> {
        self.gate.select_minutes(minutes)?;
        self.audio.play(SoundEffect::Click);
        Ok(())
    }

    pub fn start_play(&mut self) -> Result<(), HostError> {
        self.gate.start_play()?;
        self.show(Screen::Menu);
        Ok(())
    }

    pub fn lock(&mut self) -> Result<(), HostError> {
        self.gate.lock()?;
        self.show(Screen::Gate);
        Ok(())
    }

    /// The child asks for a grown-up; any running game ends
    pub fn ask_grown_up(&mut self) -> Result<&Puzzle, HostError> {
        if self.gate.state() != GateState::PlaySessionActive {
            return Err(HostError::PlayTimeInactive);
        }
        self.stop_session();
        self.show(Screen::Gate);
        Ok(self.gate.ask_grown_up()?)
    }

    pub fn answer_puzzle(&mut self, value: u32, now: f64) -> Result<bool, HostError> {
        let correct = self.gate.answer(value, now)?;
        self.audio.play(if correct {
            SoundEffect::Success
        } else {
            SoundEffect::Error
        });
        Ok(correct)
    }

    pub fn cancel_puzzle(&mut self) -> Result<(), HostError> {
        self.gate.cancel_puzzle()?;
        self.show(Screen::Menu);
        Ok(())
    }

    /// Once per second while the page is open
    pub fn tick_second(&mut self) -> Option<GateEvent> {
        let event = self.gate.tick_second();
        if event == Some(GateEvent::Expired) {
            self.expire();
        }
        event
    }

    fn expire(&mut self) {
        if self.session.is_some() {
            log::info!("play time over, stopping the running game");
        }
        self.stop_session();
        self.confetti.clear();
        self.show(Screen::Timeout);
    }

    // === Games ===

    /// Start a fresh game from the menu or the success screen
    pub fn choose_game(&mut self, kind: GameKind, now: f64) -> Result<(), HostError> {
        let seed = self.rng.random();
        let session = games::create(kind, self.audio.clone(), seed, &self.settings);
        self.launch(session, now)
    }

    /// Start an already built session
    pub fn launch(&mut self, mut session: Box<dyn GameSession>, now: f64) -> Result<(), HostError> {
        if self.gate.state() != GateState::PlaySessionActive || !self.gate.is_play_time_active() {
            return Err(HostError::PlayTimeInactive);
        }
        self.audio.unlock();
        self.stop_session();
        self.confetti.clear();

        let kind = session.kind();
        let done = self.completed.clone();
        session.start(self.size, now, Box::new(move || done.set(true)));
        self.session = Some(session);
        self.last_kind = Some(kind);
        self.show(Screen::Playing(kind));
        Ok(())
    }

    /// Fresh instance of the last game
    pub fn replay(&mut self, now: f64) -> Result<(), HostError> {
        let kind = self.last_kind.ok_or(HostError::NothingToReplay)?;
        self.choose_game(kind, now)
    }

    /// Back to the menu, abandoning the running game
    pub fn exit_game(&mut self) {
        self.stop_session();
        self.confetti.clear();
        if matches!(self.screen, Screen::Playing(_) | Screen::Success(_)) {
            self.show(Screen::Menu);
        }
    }

    pub fn session(&self) -> Option<&dyn GameSession> {
        self.session.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.score())
    }

    pub fn pointer(&mut self, now: f64, ev: Pointer) {
        self.audio.unlock();
        if let Some(session) = self.session.as_mut() {
            session.pointer(now, ev);
        }
    }

    pub fn key(&mut self, now: f64, key: Key) {
        if key == Key::Escape && matches!(self.screen, Screen::Playing(_)) {
            self.exit_game();
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.key(now, key);
        }
    }

    fn celebrate(&mut self) {
        let w = self.size.x;
        for _ in 0..5 {
            let origin = Vec2::new(self.rng.random::<f32>() * w, -10.0);
            let burst = Burst {
                spread: Spread::Fountain { drift: 3.0 },
                ..Burst::scatter(CONFETTI_PIECES / 5, PASTELS, 0.5..2.0).with_size(4.0..7.0)
            };
            self.confetti.spawn_burst(&mut self.rng, origin, &burst);
        }
    }

    /// Advance and paint one animation frame
    pub fn frame(&mut self, now: f64, surface: &mut dyn Surface) {
        if self.gate.poll(now) && self.gate.state() == GateState::ParentDashboard {
            self.show(Screen::Gate);
        }

        match self.screen {
            Screen::Playing(kind) => {
                if let Some(session) = self.session.as_mut() {
                    session.frame(now, surface);
                }
                if self.completed.replace(false) {
                    self.session = None;
                    self.celebrate();
                    self.show(Screen::Success(kind));
                }
            }
            Screen::Success(kind) => {
                surface.fill(&Paint::Solid(Color::rgb(0xfe, 0xf3, 0xc7)));
                self.confetti.update();
                self.confetti.render(surface);
                let center = surface.size() / 2.0;
                surface.text(kind.icon(), center - Vec2::new(0.0, 60.0), &TextStyle::new(64.0, Color::BLACK));
                surface.text(
                    "Well done!",
                    center + Vec2::new(0.0, 20.0),
                    &TextStyle::new(40.0, Color::rgb(0x1e, 0x29, 0x3b)).bold(),
                );
            }
            Screen::Menu | Screen::Gate | Screen::Timeout => {
                surface.fill(&Paint::vertical(
                    crate::Rect::new(0.0, 0.0, self.size.x, self.size.y),
                    Color::rgb(0xe0, 0xf2, 0xfe),
                    Color::rgb(0xfc, 0xe7, 0xf3),
                ));
                if self.settings.quality.menu_backdrop() {
                    self.backdrop.update(&mut self.rng);
                    self.backdrop.render(surface);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingSink;
    use crate::consts::GATE_PIN;
    use crate::draw::Recorder;
    use crate::session::{FrameStatus, OnComplete};
    use std::cell::RefCell;

    const SIZE: Vec2 = Vec2::new(800.0, 600.0);

    fn host() -> (Host, RecordingSink) {
        let sink = RecordingSink::new();
        let audio = Rc::new(TonePlayer::new(Box::new(sink.clone())));
        (Host::new(audio, Settings::default(), SIZE, 11), sink)
    }

    fn playing(minutes: u32) -> Host {
        let (mut host, _) = host();
        host.submit_pin(GATE_PIN).unwrap();
        host.select_minutes(minutes).unwrap();
        host.start_play().unwrap();
        host
    }

    /// Session double that counts lifecycle calls
    #[derive(Default)]
    struct Spy {
        stops: Rc<Cell<u32>>,
        on_complete: Rc<RefCell<Option<OnComplete>>>,
        running: bool,
    }

    impl GameSession for Spy {
        fn kind(&self) -> GameKind {
            GameKind::Balloons
        }
        fn start(&mut self, _size: Vec2, _now: f64, on_complete: OnComplete) {
            self.running = true;
            *self.on_complete.borrow_mut() = Some(on_complete);
        }
        fn stop(&mut self) {
            self.running = false;
            self.stops.set(self.stops.get() + 1);
        }
        fn frame(&mut self, _now: f64, _surface: &mut dyn Surface) -> FrameStatus {
            FrameStatus::Continue
        }
        fn pointer(&mut self, _now: f64, _ev: Pointer) {}
        fn key(&mut self, _now: f64, _key: Key) {}
        fn is_running(&self) -> bool {
            self.running
        }
        fn score(&self) -> u32 {
            3
        }
        fn level(&self) -> u32 {
            1
        }
    }

    #[test]
    fn test_gate_flow_to_menu() {
        let (mut host, sink) = host();
        assert_eq!(host.screen(), Screen::Gate);
        assert!(matches!(host.choose_game(GameKind::Colors, 0.0), Err(HostError::PlayTimeInactive)));

        assert_eq!(host.submit_pin("1234"), Err(HostError::Gate(GateError::WrongPin)));
        assert!(sink.heard(SoundEffect::Error));
        assert_eq!(sink.resume_count(), 1);

        host.submit_pin(GATE_PIN).unwrap();
        assert_eq!(host.gate().state(), GateState::ParentDashboard);
        host.select_minutes(5).unwrap();
        host.start_play().unwrap();
        assert_eq!(host.screen(), Screen::Menu);
    }

    #[test]
    fn test_choose_and_exit_game() {
        let mut host = playing(10);
        host.choose_game(GameKind::Memory, 0.0).unwrap();
        assert_eq!(host.screen(), Screen::Playing(GameKind::Memory));
        assert!(host.session().is_some_and(|s| s.is_running()));

        let mut surface = Recorder::new(SIZE.x, SIZE.y);
        host.frame(16.0, &mut surface);
        assert!(surface.fill_count() > 0);

        host.key(20.0, Key::Escape);
        assert_eq!(host.screen(), Screen::Menu);
        assert!(host.session().is_none());
    }

    #[test]
    fn test_completion_shows_success_and_replay_is_fresh() {
        let mut host = playing(10);
        let spy = Spy::default();
        let on_complete = spy.on_complete.clone();
        host.launch(Box::new(spy), 0.0).unwrap();
        assert_eq!(host.score(), 3);

        let callback = on_complete.borrow_mut().take().unwrap();
        callback();
        let mut surface = Recorder::new(SIZE.x, SIZE.y);
        host.frame(16.0, &mut surface);
        assert_eq!(host.screen(), Screen::Success(GameKind::Balloons));
        assert!(host.session().is_none());

        host.frame(32.0, &mut surface);
        assert!(surface.has_text("Well done"));

        host.replay(40.0).unwrap();
        assert_eq!(host.screen(), Screen::Playing(GameKind::Balloons));
        assert_eq!(host.score(), 0);
    }

    #[test]
    fn test_expiry_stops_game_exactly_once() {
        let mut host = playing(5);
        let spy = Spy::default();
        let stops = spy.stops.clone();
        host.launch(Box::new(spy), 0.0).unwrap();

        for _ in 0..(5 * 60 - 1) {
            assert_ne!(host.tick_second(), Some(GateEvent::Expired));
        }
        assert_eq!(stops.get(), 0);
        assert_eq!(host.tick_second(), Some(GateEvent::Expired));
        assert_eq!(host.screen(), Screen::Timeout);
        assert_eq!(stops.get(), 1);

        for _ in 0..10 {
            assert_eq!(host.tick_second(), None);
        }
        host.exit_game();
        assert_eq!(stops.get(), 1);
        assert_eq!(host.screen(), Screen::Timeout);
        assert!(host.choose_game(GameKind::Colors, 0.0).is_err());

        host.submit_pin(GATE_PIN).unwrap();
        assert_eq!(host.screen(), Screen::Gate);
    }

    #[test]
    fn test_puzzle_round_trip() {
        let mut host = playing(10);
        host.choose_game(GameKind::Jumping, 0.0).unwrap();
        let answer = host.ask_grown_up().unwrap().answer;
        assert_eq!(host.screen(), Screen::Gate);
        assert!(host.session().is_none());
        assert!(host.choose_game(GameKind::Colors, 0.0).is_err());

        assert_eq!(host.answer_puzzle(answer, 100.0), Ok(true));
        assert_eq!(
            host.answer_puzzle(answer, 150.0),
            Err(HostError::Gate(GateError::AnswerPending))
        );
        let mut surface = Recorder::new(SIZE.x, SIZE.y);
        host.frame(1100.0, &mut surface);
        assert_eq!(host.gate().state(), GateState::ParentDashboard);
        assert_eq!(host.screen(), Screen::Gate);
    }

    #[test]
    fn test_cancel_puzzle_returns_to_menu() {
        let mut host = playing(10);
        host.ask_grown_up().unwrap();
        host.cancel_puzzle().unwrap();
        assert_eq!(host.screen(), Screen::Menu);
        host.choose_game(GameKind::Music, 0.0).unwrap();
    }

    #[test]
    fn test_menu_frame_draws_backdrop() {
        let mut host = playing(5);
        let mut surface = Recorder::new(SIZE.x, SIZE.y);
        host.frame(16.0, &mut surface);
        assert!(surface.fill_count() > 10);
        assert!(surface.is_balanced());

        host.set_settings(Settings::from_preset(crate::settings::QualityPreset::Low));
        let mut surface = Recorder::new(SIZE.x, SIZE.y);
        host.frame(32.0, &mut surface);
        assert_eq!(surface.fill_count(), 1);
    }

    #[test]
    fn test_toggle_mute_silences_games() {
        let (mut host, sink) = host();
        host.submit_pin(GATE_PIN).unwrap();
        sink.clear();

        assert!(host.toggle_mute());
        assert!(host.settings().muted);
        assert!(host.audio().is_muted());
        host.select_minutes(5).unwrap();
        assert!(sink.played().is_empty());

        assert!(!host.toggle_mute());
        host.select_minutes(10).unwrap();
        assert!(sink.heard(SoundEffect::Click));
    }
}
