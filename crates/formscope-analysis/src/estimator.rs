//! End-to-end estimation of a team's attacking and defending formations.

use std::{
    panic,
    thread::{self, ScopedJoinHandle},
};

use formscope_tracking::{DirectionFlip, Frame, MatchMetadata, TeamSide};
use serde::{Deserialize, Serialize};

use crate::{
    formation::{
        DEFAULT_NEIGHBOURS, Formation, FormationBuilder, FormationError, FormationLabel, Phase,
    },
    lattice::{Lattice, LatticeError},
    possession::{PossessionInterval, PossessionSegmenter},
    roster::{ExcludedRoles, Roster},
    substitution::{SubstitutionEvent, find_substitution},
    window::{DegenerateWindowError, FrameWindow, WindowMarker, resolve_window},
};

/// Jersey number conventionally worn by the goalkeeper.
pub const GOALKEEPER_NUMBER: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatorConfig {
    /// Players left out of every lattice.
    pub excluded: ExcludedRoles,
    /// Shortest possession, in seconds, that contributes to a formation.
    pub min_possession_secs: f64,
    /// Every `sample_stride`-th frame of a possession is sampled.
    pub sample_stride: usize,
    /// Neighbour rank used for local density.
    pub neighbours: usize,
    pub direction_flip: DirectionFlip,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            excluded: ExcludedRoles::new([GOALKEEPER_NUMBER]),
            min_possession_secs: 5.0,
            sample_stride: 5,
            neighbours: DEFAULT_NEIGHBOURS,
            direction_flip: DirectionFlip::Forward,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EstimateError {
    #[display("cannot resolve analysis window: {_0}")]
    DegenerateWindow(#[error(ignore)] DegenerateWindowError),
    #[display("invalid timing: minimum possession of {min_possession_secs}s at {fps} fps")]
    InvalidTiming { fps: f64, min_possession_secs: f64 },
    #[display(
        "{label}: lattice at t={timestamp:.2}s has players {found} but frames {window} are measured over {expected}"
    )]
    InputConsistency {
        label: FormationLabel,
        window: FrameWindow,
        expected: Roster,
        found: Roster,
        timestamp: f64,
    },
    #[display("{label}: no possession of at least {min_frames} frames in frames {window}")]
    EmptyAggregation {
        label: FormationLabel,
        window: FrameWindow,
        min_frames: usize,
    },
    #[display("{label}: cannot build lattice from frame {frame_index}")]
    Lattice {
        label: FormationLabel,
        frame_index: usize,
        source: LatticeError,
    },
}

impl EstimateError {
    fn from_formation(error: FormationError, window: FrameWindow, min_frames: usize) -> Self {
        match error {
            FormationError::InputConsistency {
                label,
                expected,
                found,
                timestamp,
            } => Self::InputConsistency {
                label,
                window,
                expected,
                found,
                timestamp,
            },
            FormationError::EmptyAggregation { label } => Self::EmptyAggregation {
                label,
                window,
                min_frames,
            },
        }
    }

    /// The formation being built when the error occurred, if any.
    #[must_use]
    pub fn label(&self) -> Option<FormationLabel> {
        match self {
            Self::DegenerateWindow(_) | Self::InvalidTiming { .. } => None,
            Self::InputConsistency { label, .. }
            | Self::EmptyAggregation { label, .. }
            | Self::Lattice { label, .. } => Some(*label),
        }
    }
}

/// One phase's formation together with the possessions it was sampled from.
#[derive(Debug, Clone)]
pub struct PhaseEstimate {
    /// Possession intervals, as absolute frame indices.
    pub possessions: Vec<PossessionInterval>,
    pub formation: Formation,
}

#[derive(Debug, Clone)]
pub struct FormationEstimate {
    pub team: TeamSide,
    /// Frames selected by the window markers.
    pub requested_window: FrameWindow,
    /// Frames actually analysed, after cutting at the first substitution.
    pub window: FrameWindow,
    /// First roster change inside the requested window, with an absolute frame index.
    pub substitution: Option<SubstitutionEvent>,
    pub min_possession_frames: usize,
    pub attack: PhaseEstimate,
    pub defence: PhaseEstimate,
}

impl FormationEstimate {
    #[must_use]
    pub fn phase(&self, phase: Phase) -> &PhaseEstimate {
        match phase {
            Phase::Attack => &self.attack,
            Phase::Defence => &self.defence,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormationEstimator {
    config: EstimatorConfig,
}

impl FormationEstimator {
    #[must_use]
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimates `team`'s attacking and defending formations between two
    /// points of the match.
    ///
    /// The window is cut at the team's first roster change, inclusive of the
    /// frame in which the change shows. Substitutions happen while the ball is
    /// dead, so that frame is normally not part of any possession. If it is,
    /// the new roster is reported as [`EstimateError::InputConsistency`].
    ///
    /// Attack uses the team's own possessions and defence the opponent's;
    /// both are aggregated on separate threads.
    pub fn estimate(
        &self,
        team: TeamSide,
        frames: &[Frame],
        metadata: &MatchMetadata,
        start: WindowMarker,
        end: WindowMarker,
    ) -> Result<FormationEstimate, EstimateError> {
        let segmenter =
            PossessionSegmenter::from_duration(self.config.min_possession_secs, metadata.fps)
                .ok_or(EstimateError::InvalidTiming {
                    fps: metadata.fps,
                    min_possession_secs: self.config.min_possession_secs,
                })?;
        let requested_window =
            resolve_window(frames, start, end).map_err(EstimateError::DegenerateWindow)?;
        let substitution = find_substitution(&frames[requested_window.range()], team);
        let window = match &substitution {
            Some(event) => FrameWindow {
                first: requested_window.first,
                last: requested_window.first + event.frame_index,
            },
            None => requested_window,
        };
        let substitution = substitution.map(|event| event.offset(requested_window.first));

        let frames = &frames[window.range()];
        let live = frames.iter().map(|f| f.live).collect::<Vec<_>>();
        let live = live.as_slice();

        let (attack, defence) = thread::scope(|s| {
            let attack = s.spawn(move || {
                let label = FormationLabel::new(team, Phase::Attack);
                self.aggregate(label, frames, window, live, segmenter)
            });
            let defence = s.spawn(move || {
                let label = FormationLabel::new(team, Phase::Defence);
                self.aggregate(label, frames, window, live, segmenter)
            });
            (join(attack), join(defence))
        });

        Ok(FormationEstimate {
            team,
            requested_window,
            window,
            substitution,
            min_possession_frames: segmenter.min_frames(),
            attack: attack?,
            defence: defence?,
        })
    }

    fn aggregate(
        &self,
        label: FormationLabel,
        frames: &[Frame],
        window: FrameWindow,
        live: &[bool],
        segmenter: PossessionSegmenter,
    ) -> Result<PhaseEstimate, EstimateError> {
        let in_possession = match label.phase {
            Phase::Attack => label.team,
            Phase::Defence => label.team.opponent(),
        };
        let possession = frames
            .iter()
            .map(|f| f.touched_last_by(in_possession))
            .collect::<Vec<_>>();
        let intervals = segmenter.segment(&possession, live);

        let mut builder = FormationBuilder::new(label, self.config.excluded.clone())
            .with_neighbours(self.config.neighbours);
        let stride = self.config.sample_stride.max(1);
        for interval in &intervals {
            for index in interval.frames().step_by(stride) {
                let frame = &frames[index];
                let lattice = Lattice::build(
                    frame.players(label.team),
                    &self.config.excluded,
                    frame.game_clock,
                    self.config.direction_flip,
                )
                .map_err(|source| EstimateError::Lattice {
                    label,
                    frame_index: window.first + index,
                    source,
                })?;
                builder
                    .add(&lattice)
                    .map_err(|e| EstimateError::from_formation(e, window, segmenter.min_frames()))?;
            }
        }
        let formation = builder
            .finalize()
            .map_err(|e| EstimateError::from_formation(e, window, segmenter.min_frames()))?;

        Ok(PhaseEstimate {
            possessions: intervals
                .into_iter()
                .map(|interval| interval.offset(window.first))
                .collect(),
            formation,
        })
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}
