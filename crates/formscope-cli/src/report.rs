//! JSON report of a formation estimate.

use chrono::{DateTime, Utc};
use formscope_analysis::{
    estimator::{EstimatorConfig, FormationEstimate, PhaseEstimate},
    formation::FormationLabel,
    possession::PossessionInterval,
    substitution::SubstitutionEvent,
    window::{FrameWindow, WindowMarker},
};
use formscope_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
use formscope_tracking::{TeamSide, Vec2};
use serde::Serialize;

const PERCENTILE_POINTS: [f64; 3] = [25.0, 50.0, 75.0];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateReport {
    pub generated_at: DateTime<Utc>,
    pub description: Option<String>,
    pub team: TeamSide,
    pub start: WindowMarker,
    pub end: WindowMarker,
    pub config: EstimatorConfig,
    pub requested_window: FrameWindow,
    pub window: FrameWindow,
    pub substitution: Option<SubstitutionEvent>,
    pub min_possession_frames: usize,
    pub attack: PhaseReport,
    pub defence: PhaseReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    pub label: FormationLabel,
    pub possession_count: usize,
    /// Possession lengths in seconds.
    pub possession_secs: Option<PossessionSummary>,
    pub lattice_count: usize,
    pub reference: u32,
    pub density_ranking: Vec<u32>,
    pub players: Vec<PlayerPosition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PossessionSummary {
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Vec<PercentileValue>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPosition {
    pub number: u32,
    pub position: Vec2,
    pub local_density: f64,
}

impl EstimateReport {
    pub fn new(
        estimate: &FormationEstimate,
        config: &EstimatorConfig,
        (start, end): (WindowMarker, WindowMarker),
        fps: f64,
        description: Option<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            description,
            team: estimate.team,
            start,
            end,
            config: config.clone(),
            requested_window: estimate.requested_window,
            window: estimate.window,
            substitution: estimate.substitution.clone(),
            min_possession_frames: estimate.min_possession_frames,
            attack: PhaseReport::new(&estimate.attack, fps),
            defence: PhaseReport::new(&estimate.defence, fps),
        }
    }
}

impl PhaseReport {
    fn new(phase: &PhaseEstimate, fps: f64) -> Self {
        let formation = &phase.formation;
        let players = formation
            .positions()
            .map(|(number, position)| PlayerPosition {
                number,
                position,
                local_density: formation.local_density(number).unwrap_or_default(),
            })
            .collect();
        Self {
            label: formation.label(),
            possession_count: phase.possessions.len(),
            possession_secs: PossessionSummary::new(&phase.possessions, fps),
            lattice_count: formation.lattice_count(),
            reference: formation.reference(),
            density_ranking: formation.density_ranking(),
            players,
        }
    }
}

impl PossessionSummary {
    /// Summarizes interval lengths in seconds; `None` without intervals.
    #[expect(clippy::cast_precision_loss)]
    pub fn new(possessions: &[PossessionInterval], fps: f64) -> Option<Self> {
        let mut secs = possessions
            .iter()
            .map(|p| p.len() as f64 / fps)
            .collect::<Vec<_>>();
        secs.sort_by(f64::total_cmp);
        let stats = DescriptiveStats::from_sorted(&secs)?;
        let percentiles = Percentiles::new(secs.iter().copied())?
            .at_each(&PERCENTILE_POINTS)
            .map(|(percentile, value)| PercentileValue { percentile, value })
            .collect();
        Some(Self {
            total: secs.iter().sum(),
            mean: stats.mean,
            median: stats.median,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
            percentiles,
        })
    }
}
