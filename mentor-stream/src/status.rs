//! Output-length based phase stepping.
//!
//! The backend gives no real progress signal, so the status line is moved
//! by a crude proxy: every ~100 characters of accumulated output advances
//! one step through the caller-supplied label sequence, saturating at the
//! last label. Callers must not read accuracy into this; it exists only
//! to keep a human-facing status line moving.

/// An ordered sequence of phase labels mapped onto the `[0, 100]`
/// progress range by even division.
#[derive(Debug, Clone, Default)]
pub struct StatusTrack {
    messages: Vec<String>,
}

impl StatusTrack {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn first(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    pub fn label(&self, step: usize) -> Option<&str> {
        self.messages.get(step).map(String::as_str)
    }

    /// Coarse step index for an output of `len` characters:
    /// `floor(len / 100 * n)` clamped to the last index.
    ///
    /// Long outputs saturate at the final label well before any true
    /// completion signal; that imprecision is accepted.
    pub fn step_for_len(&self, len: usize) -> usize {
        let n = self.messages.len();
        if n == 0 {
            return 0;
        }
        ((len * n) / 100).min(n - 1)
    }

    /// Percent assigned to `step`: `step / (n - 1) * 100`.
    ///
    /// A single-label track never advances past step 0, so the division
    /// is only meaningful for `n >= 2`; shorter tracks report 100.
    pub fn progress_for_step(&self, step: usize) -> f64 {
        let n = self.messages.len();
        if n <= 1 {
            return 100.0;
        }
        (step.min(n - 1) as f64 / (n - 1) as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: usize) -> StatusTrack {
        StatusTrack::new((0..n).map(|i| format!("phase {i}")).collect())
    }

    #[test]
    fn long_output_saturates_at_last_label() {
        // 250 chars across 4 labels: floor(250/100*4) = 10, clamped to 3.
        assert_eq!(track(4).step_for_len(250), 3);
    }

    #[test]
    fn steps_advance_every_hundred_over_n_chars() {
        let t = track(4);
        assert_eq!(t.step_for_len(0), 0);
        assert_eq!(t.step_for_len(24), 0);
        assert_eq!(t.step_for_len(25), 1);
        assert_eq!(t.step_for_len(50), 2);
        assert_eq!(t.step_for_len(75), 3);
        assert_eq!(t.step_for_len(99), 3);
    }

    #[test]
    fn progress_divides_range_evenly() {
        let t = track(4);
        assert_eq!(t.progress_for_step(0), 0.0);
        assert!((t.progress_for_step(1) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(t.progress_for_step(3), 100.0);
    }

    #[test]
    fn empty_and_single_label_tracks_are_inert() {
        assert_eq!(track(0).step_for_len(1000), 0);
        // A one-label track can never leave step 0.
        assert_eq!(track(1).step_for_len(1000), 0);
        assert_eq!(track(1).progress_for_step(0), 100.0);
    }
}
