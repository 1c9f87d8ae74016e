//! Free-play music toy with four instruments

use glam::Vec2;
use std::slice;

use super::GameKind;
use crate::audio::{Instrument, SoundEffect};
use crate::draw::{Color, Paint, Surface, TextStyle, shapes};
use crate::input::{Pointer, PointerPhase};
use crate::particles::Burst;
use crate::session::{Core, Game};
use crate::{Rect, hit_rect};

const HOLD_MS: f64 = 200.0;
const BUTTON_SIZE: f32 = 80.0;
const BUTTON_SPACING: f32 = 20.0;
const BUTTON_Y: f32 = 60.0;

const RED: Color = Color::rgb(0xef, 0x44, 0x44);
const AMBER: Color = Color::rgb(0xf5, 0x9e, 0x0b);
const YELLOW: Color = Color::rgb(0xfb, 0xbf, 0x24);
const LIME: Color = Color::rgb(0x84, 0xcc, 0x16);
const GREEN: Color = Color::rgb(0x10, 0xb9, 0x81);
const BLUE: Color = Color::rgb(0x3b, 0x82, 0xf6);
const VIOLET: Color = Color::rgb(0x8b, 0x5c, 0xf6);
const PINK: Color = Color::rgb(0xec, 0x48, 0x99);

/// (label, frequency, color)
type NoteSpec = (&'static str, f32, Color);

const PIANO: [NoteSpec; 8] = [
    ("C", 261.63, RED),
    ("D", 293.66, AMBER),
    ("E", 329.63, YELLOW),
    ("F", 349.23, LIME),
    ("G", 392.00, GREEN),
    ("A", 440.00, BLUE),
    ("B", 493.88, VIOLET),
    ("C", 523.25, PINK),
];

const GUITAR: [NoteSpec; 6] = [
    ("E", 329.63, RED),
    ("A", 220.00, AMBER),
    ("D", 146.83, YELLOW),
    ("G", 196.00, GREEN),
    ("B", 246.94, BLUE),
    ("E", 82.41, VIOLET),
];

const DRUMS: [NoteSpec; 6] = [
    ("🥁", 60.0, RED),
    ("🥁", 200.0, AMBER),
    ("🥁", 150.0, YELLOW),
    ("🎵", 800.0, GREEN),
    ("💥", 1000.0, BLUE),
    ("✨", 900.0, VIOLET),
];

/// Xylophone bars carry a relative height
const XYLOPHONE: [(NoteSpec, f32); 8] = [
    (("C", 523.25, RED), 1.0),
    (("D", 587.33, AMBER), 0.9),
    (("E", 659.25, YELLOW), 0.8),
    (("F", 698.46, LIME), 0.7),
    (("G", 783.99, GREEN), 0.6),
    (("A", 880.00, BLUE), 0.7),
    (("B", 987.77, VIOLET), 0.8),
    (("C", 1046.50, PINK), 0.9),
];

fn instrument_look(instrument: Instrument) -> (&'static str, Color) {
    match instrument {
        Instrument::Piano => ("🎹", BLUE),
        Instrument::Guitar => ("🎸", PINK),
        Instrument::Drums => ("🥁", AMBER),
        Instrument::Xylophone => ("🎵", GREEN),
    }
}

#[derive(Debug, Clone)]
pub struct Pad {
    pub label: &'static str,
    pub frequency: f32,
    pub color: Color,
    pub rect: Rect,
    /// Sounding; can't retrigger until released
    pub held: bool,
}

impl Pad {
    fn new((label, frequency, color): NoteSpec, rect: Rect) -> Self {
        Self {
            label,
            frequency,
            color,
            rect,
            held: false,
        }
    }
}

/// Pads for `instrument` on a `size` surface
pub fn layout(instrument: Instrument, size: Vec2) -> Vec<Pad> {
    match instrument {
        Instrument::Piano => {
            let key_w = 80.0_f32.min(size.x / 9.0);
            let key_h = 180.0;
            let x0 = (size.x - key_w * 8.0) / 2.0;
            let y = size.y - key_h - 40.0;
            PIANO
                .iter()
                .enumerate()
                .map(|(i, &n)| Pad::new(n, Rect::new(x0 + i as f32 * key_w, y, key_w - 4.0, key_h)))
                .collect()
        }
        Instrument::Guitar => {
            let pitch = 50.0;
            GUITAR
                .iter()
                .enumerate()
                .map(|(i, &n)| {
                    Pad::new(n, Rect::new(50.0, 200.0 + i as f32 * pitch, size.x - 100.0, pitch - 10.0))
                })
                .collect()
        }
        Instrument::Drums => {
            let drum = 120.0_f32.min((size.x - 60.0) / 3.0);
            let x0 = (size.x - drum * 3.0 - 40.0) / 2.0;
            DRUMS
                .iter()
                .enumerate()
                .map(|(i, &n)| {
                    let (col, row) = ((i % 3) as f32, (i / 3) as f32);
                    Pad::new(
                        n,
                        Rect::new(x0 + col * (drum + 20.0), 200.0 + row * (drum + 20.0), drum, drum),
                    )
                })
                .collect()
        }
        Instrument::Xylophone => {
            let bar_w = 60.0_f32.min(size.x / 9.0);
            let bar_h = 150.0;
            let x0 = (size.x - bar_w * 8.0) / 2.0;
            let base = size.y - 200.0;
            XYLOPHONE
                .iter()
                .enumerate()
                .map(|(i, &(n, rel))| {
                    let h = rel * bar_h;
                    Pad::new(n, Rect::new(x0 + i as f32 * bar_w, base - (h - bar_h * 0.6), bar_w - 4.0, h))
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone)]
struct FlyingNote {
    pos: Vec2,
    text: &'static str,
    life: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicEvent {
    Release(usize),
}

#[derive(Debug)]
pub struct Music {
    pub instrument: Instrument,
    pub pads: Vec<Pad>,
    buttons: Vec<(Instrument, Rect)>,
    notes: Vec<FlyingNote>,
    pointer_down: bool,
}

impl Default for Music {
    fn default() -> Self {
        Self {
            instrument: Instrument::Piano,
            pads: Vec::new(),
            buttons: Vec::new(),
            notes: Vec::new(),
            pointer_down: false,
        }
    }
}

impl Music {
    fn switch_to(&mut self, core: &mut Core<MusicEvent>, instrument: Instrument, at: Vec2) {
        if instrument == self.instrument {
            return;
        }
        // Pending releases point at the old pads
        core.cancel_timers();
        self.instrument = instrument;
        self.pads = layout(instrument, core.size);
        let color = instrument_look(instrument).1;
        core.burst(
            at,
            &Burst {
                speed: 3.0..7.0,
                ..Burst::ring(20, slice::from_ref(&color)).with_size(4.0..9.0)
            },
        );
        core.play(SoundEffect::Click);
        log::debug!("instrument: {}", instrument.as_str());
    }

    /// Exact hit first, so neighbouring pads never steal a tap; the slop
    /// only catches touches in the gaps and along the outer edges
    fn pad_at(&self, at: Vec2) -> Option<usize> {
        self.pads
            .iter()
            .position(|p| p.rect.contains(at))
            .or_else(|| self.pads.iter().position(|p| hit_rect(at, &p.rect)))
    }

    fn strike(&mut self, core: &mut Core<MusicEvent>, at: Vec2) {
        if let Some(&(instrument, rect)) = self.buttons.iter().find(|(_, r)| hit_rect(at, r)) {
            self.switch_to(core, instrument, rect.center());
            return;
        }
        let Some(index) = self.pad_at(at) else {
            return;
        };
        let pad = &mut self.pads[index];
        if pad.held {
            return;
        }
        pad.held = true;
        let (freq, color, label) = (pad.frequency, pad.color, pad.label);
        core.play_note(freq, self.instrument);
        core.burst(at, &Burst::ring(15, slice::from_ref(&color)).with_size(3.0..7.0));
        self.notes.push(FlyingNote {
            pos: at,
            text: label,
            life: 1.0,
        });
        core.after(HOLD_MS, MusicEvent::Release(index));
    }
}

impl Game for Music {
    type Event = MusicEvent;

    /// Sparks drift instead of falling
    const PARTICLE_GRAVITY: f32 = 0.0;

    fn kind(&self) -> GameKind {
        GameKind::Music
    }

    fn reset(&mut self, core: &mut Core<MusicEvent>) {
        self.instrument = Instrument::Piano;
        self.pads = layout(self.instrument, core.size);
        self.notes.clear();
        self.pointer_down = false;

        let n = Instrument::ALL.len() as f32;
        let total = (BUTTON_SIZE + BUTTON_SPACING) * n - BUTTON_SPACING;
        let x0 = (core.size.x - total) / 2.0;
        self.buttons = Instrument::ALL
            .iter()
            .enumerate()
            .map(|(i, &inst)| {
                let x = x0 + i as f32 * (BUTTON_SIZE + BUTTON_SPACING);
                (inst, Rect::new(x, BUTTON_Y, BUTTON_SIZE, BUTTON_SIZE))
            })
            .collect();
    }

    fn pointer(&mut self, core: &mut Core<MusicEvent>, ev: Pointer) {
        match ev.phase {
            PointerPhase::Down => {
                self.pointer_down = true;
                self.strike(core, ev.pos);
            }
            // Sliding across pads plays each one it enters
            PointerPhase::Move if self.pointer_down => {
                if self.pad_at(ev.pos).is_some() {
                    self.strike(core, ev.pos);
                }
            }
            PointerPhase::Move => {}
            PointerPhase::Up => {
                self.pointer_down = false;
                for pad in &mut self.pads {
                    pad.held = false;
                }
            }
        }
    }

    fn update(&mut self, _core: &mut Core<MusicEvent>) {
        for n in &mut self.notes {
            n.pos.y -= 2.0;
            n.life -= 0.01;
        }
        self.notes.retain(|n| n.life > 0.0);
    }

    fn on_timer(&mut self, _core: &mut Core<MusicEvent>, event: MusicEvent) {
        match event {
            MusicEvent::Release(i) => {
                if let Some(pad) = self.pads.get_mut(i) {
                    pad.held = false;
                }
            }
        }
    }

    fn render(&self, core: &Core<MusicEvent>, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.fill(&Paint::vertical(
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::rgb(0xf0, 0xf9, 0xff),
            Color::rgb(0xe0, 0xe7, 0xff),
        ));
        let ink = Color::rgb(0x1e, 0x29, 0x3b);
        let secs = (core.now / 1000.0) as f32;
        let faint = TextStyle::new(60.0, ink.with_alpha(0.1));
        for i in 0..8 {
            let x = 50.0 + i as f32 * 100.0;
            surface.text("♪", Vec2::new(x, 150.0 + (secs + i as f32).sin() * 20.0), &faint);
            surface.text("♫", Vec2::new(x + 30.0, 180.0 + (secs + i as f32).cos() * 20.0), &faint);
        }

        surface.text("🎵 Make music 🎵", Vec2::new(size.x / 2.0, 30.0), &TextStyle::new(32.0, ink).bold());

        for &(inst, rect) in &self.buttons {
            let (emoji, color) = instrument_look(inst);
            let active = inst == self.instrument;
            let fill = if active { color } else { Color::WHITE };
            surface.fill_path(&shapes::round_rect(rect, 15.0), &Paint::Solid(fill));
            surface.stroke_path(&shapes::round_rect(rect, 15.0), color, if active { 5.0 } else { 3.0 });
            surface.text(emoji, rect.center(), &TextStyle::new(40.0, Color::BLACK));
        }

        let (emoji, _) = instrument_look(self.instrument);
        surface.text(
            &format!("Now playing: {} {}", self.instrument.as_str(), emoji),
            Vec2::new(size.x / 2.0, 165.0),
            &TextStyle::new(24.0, Color::rgb(0x64, 0x74, 0x8b)).bold(),
        );

        for pad in &self.pads {
            let color = if pad.held { pad.color.darken(15.0) } else { pad.color };
            let rect = if pad.held { pad.rect.inflate(-2.0) } else { pad.rect };
            match self.instrument {
                Instrument::Guitar => {
                    let y = rect.center().y;
                    surface.line(Vec2::new(rect.x, y), Vec2::new(rect.right(), y), color, if pad.held { 8.0 } else { 5.0 });
                    surface.text(pad.label, Vec2::new(rect.x - 25.0, y), &TextStyle::new(20.0, color).bold());
                }
                Instrument::Drums => {
                    let r = rect.w.min(rect.h) / 2.0;
                    surface.fill_circle(rect.center(), r, &Paint::Solid(color));
                    surface.stroke_circle(rect.center(), r - 6.0, Color::WHITE.with_alpha(0.5), 4.0);
                    surface.text(pad.label, rect.center(), &TextStyle::new(40.0, Color::BLACK));
                }
                Instrument::Piano | Instrument::Xylophone => {
                    surface.fill_path(
                        &shapes::round_rect(rect, 8.0),
                        &Paint::vertical(rect, color.lighten(20.0), color),
                    );
                    surface.text(
                        pad.label,
                        Vec2::new(rect.center().x, rect.bottom() - 25.0),
                        &TextStyle::new(24.0, Color::WHITE).bold(),
                    );
                }
            }
        }

        for n in &self.notes {
            surface.text(n.text, n.pos, &TextStyle::new(32.0, ink.with_alpha(n.life)).bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;
    use crate::session::GameSession;
    use crate::session::testing::Harness;

    fn button(h: &Harness<Music>, inst: Instrument) -> Vec2 {
        h.game().buttons.iter().find(|(i, _)| *i == inst).unwrap().1.center()
    }

    #[test]
    fn test_layout_sizes() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(layout(Instrument::Piano, size).len(), 8);
        assert_eq!(layout(Instrument::Guitar, size).len(), 6);
        assert_eq!(layout(Instrument::Drums, size).len(), 6);
        assert_eq!(layout(Instrument::Xylophone, size).len(), 8);
    }

    #[test]
    fn test_tap_plays_note_once_until_released() {
        let mut h = Harness::new(Music::default(), 1);
        let pad = h.game().pads[0].rect.center();
        h.press(pad);
        h.press(pad);
        let played = h.sink.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].frequency, 261.63);
        assert_eq!(played[0].waveform, Waveform::Sine);
        assert!(h.game().pads[0].held);

        h.run_ms(HOLD_MS + 20.0);
        assert!(!h.game().pads[0].held);
        h.press(pad);
        assert_eq!(h.sink.played().len(), 2);
    }

    #[test]
    fn test_slide_plays_each_key() {
        let mut h = Harness::new(Music::default(), 1);
        let first = h.game().pads[0].rect.center();
        let last = h.game().pads[7].rect.center();
        h.press(first);
        for i in 1..=40 {
            h.drag_to(first.lerp(last, i as f32 / 40.0));
        }
        h.release(last);
        assert_eq!(h.sink.played().len(), 8);
        assert!(h.game().pads.iter().all(|p| !p.held));
    }

    #[test]
    fn test_tap_just_below_a_key_plays_it() {
        let mut h = Harness::new(Music::default(), 1);
        let rect = h.game().pads[2].rect;
        h.press(Vec2::new(rect.center().x, rect.bottom() + 5.0));
        let played = h.sink.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].frequency, h.game().pads[2].frequency);
        assert!(h.game().pads[2].held);
    }

    #[test]
    fn test_move_without_press_is_silent() {
        let mut h = Harness::new(Music::default(), 1);
        let pad = h.game().pads[3].rect.center();
        h.drag_to(pad);
        assert!(h.sink.played().is_empty());
    }

    #[test]
    fn test_switch_instrument() {
        let mut h = Harness::new(Music::default(), 1);
        let b = button(&h, Instrument::Drums);
        h.tap(b);
        assert_eq!(h.game().instrument, Instrument::Drums);
        assert_eq!(h.game().pads.len(), 6);
        assert!(h.sink.heard(SoundEffect::Click));

        // Re-selecting the same instrument is a no-op
        h.sink.clear();
        h.tap(b);
        assert!(h.sink.played().is_empty());

        let kick = h.game().pads[0].rect.center();
        h.tap(kick);
        let played = h.sink.played();
        assert_eq!(played[0].frequency, 60.0);
        assert_eq!(played[0].waveform, Waveform::Triangle);
    }

    #[test]
    fn test_switch_drops_pending_release() {
        let mut h = Harness::new(Music::default(), 1);
        let pad = h.game().pads[0].rect.center();
        h.tap(pad);
        assert_eq!(h.core().pending_timers(), 1);
        let b = button(&h, Instrument::Guitar);
        h.tap(b);
        assert_eq!(h.core().pending_timers(), 0);
    }

    #[test]
    fn test_never_completes() {
        let mut h = Harness::new(Music::default(), 1);
        let pad = h.game().pads[2].rect.center();
        for _ in 0..20 {
            h.tap(pad);
            h.run_ms(HOLD_MS + 20.0);
        }
        assert_eq!(h.completions(), 0);
        assert!(h.session.is_running());
    }
}
