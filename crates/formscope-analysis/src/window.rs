//! Selection of the match period a formation is measured over.

use std::{ops::RangeInclusive, str::FromStr};

use formscope_tracking::Frame;
use serde::{Deserialize, Serialize};

/// A point in the match given as period and minute within that period.
///
/// `(2, 15.0)` is fifteen minutes into the second half. Parsed from and
/// displayed as `period:minute`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[display("{period}:{minute}")]
pub struct WindowMarker {
    pub period: u8,
    pub minute: f64,
}

impl WindowMarker {
    #[must_use]
    pub const fn new(period: u8, minute: f64) -> Self {
        Self { period, minute }
    }

    fn clock(self) -> f64 {
        self.minute * 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseWindowMarkerError {
    #[display("expected `period:minute`, got '{input}'")]
    MissingSeparator { input: String },
    #[display("invalid period in '{input}'")]
    InvalidPeriod { input: String },
    #[display("invalid minute in '{input}'")]
    InvalidMinute { input: String },
}

impl FromStr for WindowMarker {
    type Err = ParseWindowMarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = || s.to_owned();
        let (period, minute) = s
            .split_once(':')
            .ok_or_else(|| ParseWindowMarkerError::MissingSeparator { input: input() })?;
        let period = period
            .trim()
            .parse()
            .map_err(|_| ParseWindowMarkerError::InvalidPeriod { input: input() })?;
        let minute = minute
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite() && *m >= 0.0)
            .ok_or_else(|| ParseWindowMarkerError::InvalidMinute { input: input() })?;
        Ok(Self { period, minute })
    }
}

/// Inclusive range of frame indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("{first}..={last}")]
pub struct FrameWindow {
    pub first: usize,
    pub last: usize,
}

impl FrameWindow {
    #[must_use]
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn range(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("window {start} to {end} does not cover any frames")]
pub struct DegenerateWindowError {
    pub start: WindowMarker,
    pub end: WindowMarker,
}

/// Resolves window markers to frame indices.
///
/// The window starts at the first frame of `start.period` whose clock has
/// reached `start.minute`, and ends at the last frame of `end.period` whose
/// clock has not passed `end.minute`.
pub fn resolve_window(
    frames: &[Frame],
    start: WindowMarker,
    end: WindowMarker,
) -> Result<FrameWindow, DegenerateWindowError> {
    let first = frames
        .iter()
        .position(|f| f.period == start.period && f.game_clock >= start.clock());
    let last = frames
        .iter()
        .rposition(|f| f.period == end.period && f.game_clock <= end.clock());
    match (first, last) {
        (Some(first), Some(last)) if first <= last => Ok(FrameWindow { first, last }),
        _ => Err(DegenerateWindowError { start, end }),
    }
}
