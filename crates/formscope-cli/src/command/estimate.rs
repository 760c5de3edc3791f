use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use formscope_analysis::{
    estimator::{EstimatorConfig, FormationEstimator},
    formation::{DEFAULT_NEIGHBOURS, Phase},
    roster::ExcludedRoles,
    window::WindowMarker,
};
use formscope_tracking::{DirectionFlip, TeamSide};
use tracing::{info, warn};

use crate::{
    command::MatchInputArg,
    report::{EstimateReport, PhaseReport},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EstimateArg {
    #[clap(flatten)]
    input: MatchInputArg,
    /// Team to analyse (home or away)
    #[arg(long)]
    team: TeamSide,
    /// Start of the window as `period:minute`, e.g. `1:0`
    #[arg(long)]
    start: WindowMarker,
    /// End of the window as `period:minute`, e.g. `2:23`
    #[arg(long)]
    end: WindowMarker,
    /// Comma-separated jersey numbers left out of the formation
    #[arg(long, value_delimiter = ',', default_value = "1")]
    goalkeeper: Vec<u32>,
    /// Shortest possession, in seconds, used for the formation
    #[arg(long, default_value_t = 5.0)]
    min_possession_secs: f64,
    /// Sample every N-th frame of each possession
    #[arg(long, default_value_t = 5)]
    stride: usize,
    /// Neighbour rank used to pick the reference player
    #[arg(long, default_value_t = DEFAULT_NEIGHBOURS)]
    neighbours: usize,
    /// Output file path; the report goes to stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

impl EstimateArg {
    fn config(&self) -> EstimatorConfig {
        EstimatorConfig {
            excluded: ExcludedRoles::new(self.goalkeeper.iter().copied()),
            min_possession_secs: self.min_possession_secs,
            sample_stride: self.stride,
            neighbours: self.neighbours,
            direction_flip: DirectionFlip::Forward,
        }
    }
}

pub(crate) fn run(arg: &EstimateArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.stride > 0, "--stride must be at least 1");
    anyhow::ensure!(arg.neighbours > 0, "--neighbours must be at least 1");
    let data = util::load_match(&arg.input)?;

    let estimator = FormationEstimator::new(arg.config());
    info!(team = %arg.team, start = %arg.start, end = %arg.end, "estimating formations");
    let estimate = estimator
        .estimate(arg.team, &data.frames, &data.metadata, arg.start, arg.end)
        .with_context(|| format!("Failed to estimate {} formations", arg.team))?;

    info!(frames = %estimate.window, "analysis window");
    if let Some(event) = &estimate.substitution {
        warn!(
            frame = event.frame_index,
            minute = event.match_minute(),
            off = ?event.players_off,
            on = ?event.players_on,
            "substitution cuts the window short"
        );
    }
    for phase in [Phase::Attack, Phase::Defence] {
        let phase_estimate = estimate.phase(phase);
        info!(
            %phase,
            possessions = phase_estimate.possessions.len(),
            lattices = phase_estimate.formation.lattice_count(),
            reference = phase_estimate.formation.reference(),
            "formation estimated"
        );
    }

    let report = EstimateReport::new(
        &estimate,
        estimator.config(),
        (arg.start, arg.end),
        data.metadata.fps,
        data.metadata.description.clone(),
        Utc::now(),
    );
    if arg.output.is_some() {
        print_table(&report.attack);
        print_table(&report.defence);
    }
    Output::save_json(&report, arg.output.as_deref())
}

fn print_table(phase: &PhaseReport) {
    println!(
        "{} ({} possessions, {} lattices, reference #{})",
        phase.label, phase.possession_count, phase.lattice_count, phase.reference
    );
    println!("  {:>3}  {:>7}  {:>7}", "#", "x", "y");
    for player in &phase.players {
        let marker = if player.number == phase.reference { "*" } else { "" };
        println!(
            "  {:>3}  {:>7.2}  {:>7.2} {marker}",
            player.number, player.position.x, player.position.y
        );
    }
}
