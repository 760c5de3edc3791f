//! Detection of personnel changes.
//!
//! Formations are measured over a fixed set of players, so any change in a
//! team's on-field roster ends the window in which a formation can be
//! measured. Changes are reported as [`SubstitutionEvent`] values; deciding
//! whether and how to log them is left to the caller.

use std::collections::BTreeSet;

use formscope_tracking::{Frame, TeamSide};
use serde::Serialize;

/// A change in one team's on-field roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionEvent {
    pub team: TeamSide,
    /// Index of the first frame with the new roster, relative to the frames searched.
    pub frame_index: usize,
    pub period: u8,
    pub game_clock: f64,
    pub players_off: BTreeSet<u32>,
    pub players_on: BTreeSet<u32>,
}

impl SubstitutionEvent {
    fn between(
        team: TeamSide,
        frame_index: usize,
        before: &BTreeSet<u32>,
        frame: &Frame,
    ) -> Option<Self> {
        let after = frame.roster(team);
        if after == *before {
            return None;
        }
        Some(Self {
            team,
            frame_index,
            period: frame.period,
            game_clock: frame.game_clock,
            players_off: before.difference(&after).copied().collect(),
            players_on: after.difference(before).copied().collect(),
        })
    }

    /// Match minute of the change, counting 45 minutes per period.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn match_minute(&self) -> u32 {
        u32::from(self.period.saturating_sub(1)) * 45 + (self.game_clock / 60.0).floor() as u32
    }

    /// Seconds past [`match_minute`](Self::match_minute).
    #[must_use]
    pub fn second(&self) -> f64 {
        self.game_clock - (self.game_clock / 60.0).floor() * 60.0
    }

    /// The same event with its frame index shifted by `offset`.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.frame_index += offset;
        self
    }
}

/// Finds the first frame in which `team` fields a different set of players
/// than in `frames[0]`.
#[must_use]
pub fn find_substitution(frames: &[Frame], team: TeamSide) -> Option<SubstitutionEvent> {
    let (first, rest) = frames.split_first()?;
    let starting = first.roster(team);
    rest.iter()
        .enumerate()
        .find_map(|(i, frame)| SubstitutionEvent::between(team, i + 1, &starting, frame))
}

/// Lists every roster change of `team` over a whole match.
///
/// Only every `stride`-th frame is inspected, so the reported frame index may
/// lag the actual change by up to `stride - 1` frames. After each change the
/// new roster becomes the reference for the next one.
#[must_use]
pub fn scan_substitutions(frames: &[Frame], team: TeamSide, stride: usize) -> Vec<SubstitutionEvent> {
    let Some(first) = frames.first() else {
        return vec![];
    };
    let mut on_field = first.roster(team);
    let mut events = vec![];
    for (i, frame) in frames.iter().enumerate().step_by(stride.max(1)) {
        if let Some(event) = SubstitutionEvent::between(team, i, &on_field, frame) {
            on_field = frame.roster(team);
            events.push(event);
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use formscope_tracking::PlayerRecord;

    use super::*;

    fn frame(period: u8, game_clock: f64, home: &[u32], away: &[u32]) -> Frame {
        let players = |numbers: &[u32]| -> Vec<PlayerRecord> {
            numbers
                .iter()
                .map(|&n| PlayerRecord::new(n, 0.0, 0.0))
                .collect()
        };
        Frame {
            frame_idx: None,
            period,
            game_clock,
            live: false,
            last_touch: None,
            home_players: players(home),
            away_players: players(away),
        }
    }

    #[test]
    fn test_no_substitution() {
        let frames = vec![frame(1, 0.0, &[1, 2, 3], &[1, 5]); 10];
        assert_eq!(find_substitution(&frames, TeamSide::Home), None);
        assert_eq!(find_substitution(&[], TeamSide::Home), None);
    }

    #[test]
    fn test_first_change_in_window() {
        let mut frames = vec![frame(2, 1390.0, &[1, 2, 3], &[1, 5]); 20];
        for f in &mut frames[12..] {
            *f = frame(2, 1391.0, &[1, 2, 18], &[1, 5]);
        }
        frames[16] = frame(2, 1392.0, &[1, 4, 18], &[1, 5]);

        let event = find_substitution(&frames, TeamSide::Home).unwrap();
        assert_eq!(event.frame_index, 12);
        assert_eq!(event.players_off, BTreeSet::from([3]));
        assert_eq!(event.players_on, BTreeSet::from([18]));
        assert_eq!(event.match_minute(), 68);
        assert_eq!(event.second(), 11.0);

        assert_eq!(find_substitution(&frames, TeamSide::Away), None);
    }

    #[test]
    fn test_roster_order_does_not_matter() {
        let frames = vec![frame(1, 0.0, &[3, 2, 1], &[]), frame(1, 0.1, &[1, 2, 3], &[])];
        assert_eq!(find_substitution(&frames, TeamSide::Home), None);
    }

    #[test]
    fn test_scan_reports_every_change() {
        let mut frames = vec![frame(1, 10.0, &[1], &[1, 27, 66]); 100];
        for f in &mut frames[40..] {
            *f = frame(2, 1489.0, &[1], &[1, 3, 66]);
        }
        for f in &mut frames[70..] {
            *f = frame(2, 1918.0, &[1], &[1, 3, 8]);
        }

        let events = scan_substitutions(&frames, TeamSide::Away, 25);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].frame_index, 50);
        assert_eq!(events[0].players_off, BTreeSet::from([27]));
        assert_eq!(events[0].players_on, BTreeSet::from([3]));
        assert_eq!(events[1].frame_index, 75);
        assert_eq!(events[1].players_off, BTreeSet::from([66]));
        assert_eq!(events[1].players_on, BTreeSet::from([8]));

        assert!(scan_substitutions(&frames, TeamSide::Home, 1).is_empty());
        assert_eq!(scan_substitutions(&frames, TeamSide::Away, 1)[0].frame_index, 40);
    }

    #[test]
    fn test_offset() {
        let frames = vec![frame(1, 0.0, &[1, 2], &[]), frame(1, 0.1, &[1, 4], &[])];
        let event = find_substitution(&frames, TeamSide::Home).unwrap().offset(300);
        assert_eq!(event.frame_index, 301);
    }
}
