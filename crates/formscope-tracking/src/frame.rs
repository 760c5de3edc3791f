use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// One of the two teams in a match.
///
/// Parsed case-insensitively from `home` or `away`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    #[display("home")]
    Home,
    #[display("away")]
    Away,
}

impl TeamSide {
    pub const ALL: [Self; 2] = [Self::Home, Self::Away];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

/// A single player's sample within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Jersey number, the identity key used throughout the analysis.
    pub number: u32,
    /// Position in pitch coordinates; the third component (height) is unused.
    pub xyz: [f64; 3],
}

impl PlayerRecord {
    #[must_use]
    pub const fn new(number: u32, x: f64, y: f64) -> Self {
        Self {
            number,
            xyz: [x, y, 0.0],
        }
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.xyz[0], self.xyz[1])
    }
}

/// One sampled instant of a match.
///
/// Field names follow the Second Spectrum JSON Lines layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Index of the frame within the feed, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_idx: Option<u64>,
    /// Match period (1 = first half, 2 = second half, ...).
    pub period: u8,
    /// Seconds elapsed on the game clock within the period.
    pub game_clock: f64,
    /// Whether the ball is in play.
    pub live: bool,
    /// Team that last touched the ball, if known.
    #[serde(default, deserialize_with = "deserialize_last_touch")]
    pub last_touch: Option<TeamSide>,
    pub home_players: Vec<PlayerRecord>,
    pub away_players: Vec<PlayerRecord>,
}

impl Frame {
    #[must_use]
    pub fn players(&self, side: TeamSide) -> &[PlayerRecord] {
        match side {
            TeamSide::Home => &self.home_players,
            TeamSide::Away => &self.away_players,
        }
    }

    pub fn players_mut(&mut self, side: TeamSide) -> &mut [PlayerRecord] {
        match side {
            TeamSide::Home => &mut self.home_players,
            TeamSide::Away => &mut self.away_players,
        }
    }

    /// Jersey numbers of everyone on the field for `side`.
    #[must_use]
    pub fn roster(&self, side: TeamSide) -> BTreeSet<u32> {
        self.players(side).iter().map(|p| p.number).collect()
    }

    /// Whether `side` was the last team to touch the ball.
    #[must_use]
    pub fn touched_last_by(&self, side: TeamSide) -> bool {
        self.last_touch == Some(side)
    }
}

/// Feed-level description of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    /// Tracking sample rate in frames per second.
    pub fps: f64,
    pub pitch_length: Option<f64>,
    pub pitch_width: Option<f64>,
    pub description: Option<String>,
}

impl MatchMetadata {
    #[must_use]
    pub fn with_fps(fps: f64) -> Self {
        Self {
            fps,
            pitch_length: None,
            pitch_width: None,
            description: None,
        }
    }
}

// The feed marks unknown possession with values other than the two sides.
fn deserialize_last_touch<'de, D>(deserializer: D) -> Result<Option<TeamSide>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(match value.as_deref() {
        Some("home") => Some(TeamSide::Home),
        Some("away") => Some(TeamSide::Away),
        _ => None,
    })
}
