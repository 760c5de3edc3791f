//! Possession segmentation.
//!
//! Splits a per-frame possession signal into the intervals in which a team
//! held the ball, in play, without interruption for at least a minimum number
//! of frames. Shorter possessions are dropped: they are too brief for a team
//! to settle into its attacking or defensive shape.
//!
//! # Algorithm
//!
//! A centered window of `min_frames` frames is slid over the raw indicator
//! `possession[i] && live[i]`, keeping a running count of qualifying frames.
//! For window length `m` the window around `i` covers
//! `[i - m / 2, i + (m - 1 - m / 2)]`. A frame is *sustained* when every frame
//! in its window qualifies.
//!
//! ```text
//! raw        . . # # # # # # . .      (m = 4, behind = 2, ahead = 1)
//! sustained  . . . . # # # . . .
//!                    ^     ^
//!                    |     falling edge at 7 -> end = 7 + ahead = 8
//!                    rising edge at 4 -> start = 4 - behind = 2
//! ```
//!
//! Shifting the edges back by the window offsets recovers the exact raw run.
//! Frames outside the signal count as not in possession, so a run touching
//! either end of the signal is closed at the signal boundary.

use std::ops::Range;

use serde::Serialize;

/// Half-open range of frame indices `[start, end)` of one possession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PossessionInterval {
    pub start: usize,
    pub end: usize,
}

impl PossessionInterval {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[must_use]
    pub fn frames(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The same interval shifted by `offset` frames.
    #[must_use]
    pub fn offset(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PossessionSegmenter {
    min_frames: usize,
}

impl PossessionSegmenter {
    /// A zero-length minimum is treated as one frame.
    #[must_use]
    pub fn new(min_frames: usize) -> Self {
        Self {
            min_frames: min_frames.max(1),
        }
    }

    /// Segmenter whose minimum is `min_secs` at `fps`, truncated to whole frames.
    ///
    /// Returns `None` unless `fps` is finite and positive and `min_secs` is
    /// finite and non-negative.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn from_duration(min_secs: f64, fps: f64) -> Option<Self> {
        let valid = fps.is_finite() && fps > 0.0 && min_secs.is_finite() && min_secs >= 0.0;
        let min_frames = min_secs * fps;
        (valid && min_frames.is_finite()).then(|| Self::new(min_frames as usize))
    }

    #[must_use]
    pub fn min_frames(&self) -> usize {
        self.min_frames
    }

    /// Returns the possession intervals in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `possession` and `live` differ in length.
    #[must_use]
    pub fn segment(&self, possession: &[bool], live: &[bool]) -> Vec<PossessionInterval> {
        assert_eq!(
            possession.len(),
            live.len(),
            "possession and live signals must cover the same frames"
        );
        let raw = possession
            .iter()
            .zip(live)
            .map(|(&p, &l)| p && l)
            .collect::<Vec<_>>();
        let len = raw.len();
        let window = self.min_frames;
        let behind = window / 2;
        let ahead = window - 1 - behind;

        // window of frame 0 is [-behind, ahead]
        let mut count = raw.iter().take(ahead + 1).filter(|&&r| r).count();
        let mut open = None;
        let mut intervals = vec![];

        for i in 0..len {
            if i > 0 {
                if raw.get(i + ahead).copied().unwrap_or(false) {
                    count += 1;
                }
                if i > behind && raw[i - 1 - behind] {
                    count -= 1;
                }
            }
            let sustained = count == window;
            match (open, sustained) {
                (None, true) => open = Some(i - behind),
                (Some(start), false) => {
                    intervals.push(PossessionInterval {
                        start,
                        end: i + ahead,
                    });
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            intervals.push(PossessionInterval { start, end: len });
        }

        intervals
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn signal(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '#').collect()
    }

    fn segment(pattern: &str, min_frames: usize) -> Vec<PossessionInterval> {
        let possession = signal(pattern);
        let live = vec![true; possession.len()];
        PossessionSegmenter::new(min_frames).segment(&possession, &live)
    }

    fn interval(start: usize, end: usize) -> PossessionInterval {
        PossessionInterval { start, end }
    }

    #[test]
    fn test_single_run_recovered_exactly() {
        for len in 1..12 {
            for min_frames in 1..14 {
                let pattern = format!("...{}....", "#".repeat(len));
                let intervals = segment(&pattern, min_frames);
                if min_frames <= len {
                    assert_eq!(
                        intervals,
                        vec![interval(3, 3 + len)],
                        "len={len} min_frames={min_frames}"
                    );
                } else {
                    assert!(intervals.is_empty(), "len={len} min_frames={min_frames}");
                }
            }
        }
    }

    #[test]
    fn test_short_runs_are_dropped() {
        let intervals = segment("##..#####.###..######", 5);
        assert_eq!(intervals, vec![interval(4, 9), interval(15, 21)]);
    }

    #[test]
    fn test_dead_ball_splits_possession() {
        let possession = signal("##########");
        let live = signal("#####.####");
        let intervals = PossessionSegmenter::new(4).segment(&possession, &live);
        assert_eq!(intervals, vec![interval(0, 5), interval(6, 10)]);
    }

    #[test]
    fn test_runs_touching_signal_boundaries_are_closed() {
        for min_frames in 1..=6 {
            assert_eq!(
                segment("######..######", min_frames),
                vec![interval(0, 6), interval(8, 14)],
                "min_frames={min_frames}"
            );
        }
        assert_eq!(segment("#####", 5), vec![interval(0, 5)]);
    }

    #[test]
    fn test_zero_min_frames_behaves_as_one() {
        let segmenter = PossessionSegmenter::new(0);
        assert_eq!(segmenter.min_frames(), 1);
        assert_eq!(
            segmenter.segment(&signal("#.#"), &signal("###")),
            vec![interval(0, 1), interval(2, 3)]
        );
    }

    #[test]
    fn test_empty_signal() {
        assert!(segment("", 3).is_empty());
    }

    #[test]
    fn test_from_duration_truncates() {
        let min_frames = |secs, fps| PossessionSegmenter::from_duration(secs, fps).unwrap().min_frames();
        assert_eq!(min_frames(5.0, 25.0), 125);
        assert_eq!(min_frames(2.0, 1.5), 3);
        assert_eq!(min_frames(0.01, 25.0), 1);
        assert_eq!(min_frames(0.0, 25.0), 1);
    }

    #[test]
    fn test_from_duration_rejects_invalid_timing() {
        for fps in [0.0, -25.0, f64::NAN, f64::INFINITY] {
            assert!(PossessionSegmenter::from_duration(5.0, fps).is_none(), "fps={fps}");
        }
        for secs in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(PossessionSegmenter::from_duration(secs, 25.0).is_none(), "secs={secs}");
        }
        assert!(PossessionSegmenter::from_duration(1e300, 1e300).is_none());
    }

    #[test]
    fn test_random_signals_respect_minimum_duration() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let len = rng.random_range(0..300);
            let min_frames = rng.random_range(1..20);
            let stickiness = rng.random_range(0.5..0.98);
            let mut state = rng.random_bool(0.5);
            let possession = (0..len)
                .map(|_| {
                    if !rng.random_bool(stickiness) {
                        state = !state;
                    }
                    state
                })
                .collect::<Vec<_>>();
            let live = (0..len).map(|_| rng.random_bool(0.97)).collect::<Vec<_>>();

            let intervals = PossessionSegmenter::new(min_frames).segment(&possession, &live);

            for w in intervals.windows(2) {
                assert!(w[0].end < w[1].start, "{w:?} overlap or touch");
            }
            for iv in &intervals {
                assert!(iv.len() >= min_frames, "{iv:?} shorter than {min_frames}");
                assert!(iv.end <= len);
                assert!(iv.frames().all(|i| possession[i] && live[i]));
            }

            // every qualifying raw run is reported
            let mut expected = vec![];
            let mut run_start = None;
            for i in 0..=len {
                let on = i < len && possession[i] && live[i];
                match (run_start, on) {
                    (None, true) => run_start = Some(i),
                    (Some(s), false) => {
                        if i - s >= min_frames {
                            expected.push(interval(s, i));
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
            assert_eq!(intervals, expected);
        }
    }
}
