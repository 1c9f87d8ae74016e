//! Play-time countdown with one-second resolution

use crate::consts::WARNING_SECONDS;

/// Emitted by [`Countdown::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Exactly [`WARNING_SECONDS`] left
    Warning,
    /// Time is up
    Expired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn start(&mut self, minutes: u32) {
        self.remaining = minutes * 60;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one second. Stops itself on expiry.
    pub fn tick(&mut self) -> Option<GateEvent> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Some(GateEvent::Expired)
        } else if self.remaining == WARNING_SECONDS {
            Some(GateEvent::Warning)
        } else {
            None
        }
    }

    pub fn is_warning(&self) -> bool {
        self.remaining <= WARNING_SECONDS
    }

    /// `m:ss`
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let mut c = Countdown::default();
        c.start(5);
        assert_eq!(c.display(), "5:00");
        c.tick();
        assert_eq!(c.display(), "4:59");
        for _ in 0..(4 * 60 + 50) {
            c.tick();
        }
        assert_eq!(c.display(), "0:09");
    }

    #[test]
    fn test_five_minutes_warn_at_one_minute_left() {
        let mut c = Countdown::default();
        c.start(5);
        for _ in 0..239 {
            assert_eq!(c.tick(), None);
        }
        assert!(!c.is_warning());
        assert_eq!(c.tick(), Some(GateEvent::Warning));
        assert_eq!(c.display(), "1:00");
        assert!(c.is_warning());
    }

    #[test]
    fn test_expires_at_exactly_n_minutes() {
        let mut c = Countdown::default();
        c.start(10);
        let mut warnings = 0;
        for second in 1..600 {
            match c.tick() {
                Some(GateEvent::Warning) => {
                    warnings += 1;
                    assert_eq!(second, 540);
                }
                Some(GateEvent::Expired) => panic!("expired early at {second}s"),
                None => {}
            }
        }
        assert_eq!(warnings, 1);
        assert!(c.is_warning());
        assert_eq!(c.tick(), Some(GateEvent::Expired));
        assert_eq!(c.remaining(), 0);
        assert!(!c.is_running());
        assert_eq!(c.tick(), None);
    }

    #[test]
    fn test_stopped_countdown_holds() {
        let mut c = Countdown::default();
        c.start(5);
        c.stop();
        assert_eq!(c.tick(), None);
        assert_eq!(c.remaining(), 300);
        assert!(!c.is_warning());
    }
}
