//! Character-by-character reveal of an already-available string.
//!
//! Purely a presentation effect: the session always holds the full text;
//! this type decides how much of it is visible right now. Even text that
//! arrived in one shot is replayed one character per `speed` interval.

use std::time::Duration;

const DEFAULT_SPEED: Duration = Duration::from_millis(50);

/// Typewriter state for one rendered text block.
#[derive(Debug, Clone)]
pub struct Reveal {
    source: String,
    revealed: usize, // chars, not bytes
    speed: Duration,
    carry: Duration,
}

impl Default for Reveal {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl Reveal {
    /// `speed` is the interval per revealed character.
    pub fn new(speed: Duration) -> Self {
        Self {
            source: String::new(),
            revealed: 0,
            speed,
            carry: Duration::ZERO,
        }
    }

    /// Hand the presenter the latest full text.
    ///
    /// Growth (the previous text is a prefix of the new one) keeps the
    /// reveal position; anything else is treated as a brand-new text and
    /// restarts from zero.
    pub fn observe(&mut self, content: &str) {
        if content == self.source {
            return;
        }
        if !content.starts_with(&self.source) {
            self.revealed = 0;
            self.carry = Duration::ZERO;
        }
        self.source.clear();
        self.source.push_str(content);
    }

    /// Advance by elapsed wall time. One character becomes visible per
    /// `speed` of accumulated elapsed time; the remainder carries over so
    /// a coarser caller tick still averages the configured rate. Returns
    /// true if anything new became visible.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let total = self.source.chars().count();
        if self.revealed >= total {
            // Caught up: drop any accumulated credit so newly appended
            // text does not burst out in one frame.
            self.carry = Duration::ZERO;
            return false;
        }

        if self.speed.is_zero() {
            self.revealed = total;
            return true;
        }

        self.carry += elapsed;
        let steps = (self.carry.as_micros() / self.speed.as_micros()) as usize;
        if steps == 0 {
            return false;
        }
        self.carry -= self.speed * steps as u32;
        self.revealed = (self.revealed + steps).min(total);
        true
    }

    /// The currently visible prefix of the source text.
    pub fn visible(&self) -> &str {
        let byte_end = self
            .source
            .char_indices()
            .nth(self.revealed)
            .map(|(i, _)| i)
            .unwrap_or(self.source.len());
        &self.source[..byte_end]
    }

    /// Whether the whole source text is on screen.
    pub fn caught_up(&self) -> bool {
        self.revealed >= self.source.chars().count()
    }

    /// The trailing cursor blinks while data may still arrive or the
    /// animation is still catching up; hidden otherwise.
    pub fn cursor_visible(&self, loading: bool) -> bool {
        loading || !self.caught_up()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEED: Duration = Duration::from_millis(50);

    #[test]
    fn nothing_visible_before_time_passes() {
        let mut r = Reveal::new(SPEED);
        r.observe("Hello");
        assert_eq!(r.visible(), "");
        assert!(r.cursor_visible(false));
    }

    #[test]
    fn one_shot_text_is_replayed_at_speed() {
        let mut r = Reveal::new(SPEED);
        r.observe("Hello");

        // After 5 x speed the whole word is out and the cursor is gone.
        r.advance(SPEED * 5);
        assert_eq!(r.visible(), "Hello");
        assert!(!r.cursor_visible(false));
        // ...but while loading, the cursor stays.
        assert!(r.cursor_visible(true));
    }

    #[test]
    fn advances_one_character_per_interval() {
        let mut r = Reveal::new(SPEED);
        r.observe("Hello");
        assert!(r.advance(SPEED));
        assert_eq!(r.visible(), "H");
        assert!(r.advance(SPEED));
        assert_eq!(r.visible(), "He");
    }

    #[test]
    fn coarse_ticks_carry_the_remainder() {
        // 80ms ticks against a 50ms speed: 1 char, then 2, then 1...
        let mut r = Reveal::new(SPEED);
        let tick = Duration::from_millis(80);
        r.observe("abcdef");
        r.advance(tick);
        assert_eq!(r.visible(), "a");
        r.advance(tick);
        assert_eq!(r.visible(), "abc");
    }

    #[test]
    fn growth_keeps_the_reveal_position() {
        let mut r = Reveal::new(SPEED);
        r.observe("Hel");
        r.advance(SPEED * 3);
        assert_eq!(r.visible(), "Hel");

        r.observe("Hello");
        // Still showing the old prefix, never less.
        assert_eq!(r.visible(), "Hel");
        r.advance(SPEED * 2);
        assert_eq!(r.visible(), "Hello");
    }

    #[test]
    fn replacement_restarts_from_zero() {
        let mut r = Reveal::new(SPEED);
        r.observe("Hello");
        r.advance(SPEED * 5);
        assert_eq!(r.visible(), "Hello");

        r.observe("Goodbye");
        assert_eq!(r.visible(), "");
        r.advance(SPEED);
        assert_eq!(r.visible(), "G");
    }

    #[test]
    fn shrinking_counts_as_replacement() {
        let mut r = Reveal::new(SPEED);
        r.observe("Hello there");
        r.advance(SPEED * 8);
        r.observe("Hello");
        assert_eq!(r.visible(), "");
    }

    #[test]
    fn no_burst_after_idle_catch_up() {
        let mut r = Reveal::new(SPEED);
        r.observe("ab");
        r.advance(SPEED * 2);
        assert_eq!(r.visible(), "ab");

        // A long idle stretch while caught up must not bank credit.
        r.advance(SPEED * 100);
        r.observe("abcdefgh");
        assert!(!r.advance(Duration::from_millis(10)));
        assert_eq!(r.visible(), "ab");
    }

    #[test]
    fn multibyte_text_reveals_on_char_boundaries() {
        let mut r = Reveal::new(SPEED);
        r.observe("héllo");
        r.advance(SPEED * 2);
        assert_eq!(r.visible(), "hé");
    }

    #[test]
    fn zero_speed_reveals_everything() {
        let mut r = Reveal::new(Duration::ZERO);
        r.observe("instant");
        r.advance(Duration::from_millis(1));
        assert_eq!(r.visible(), "instant");
    }
}
