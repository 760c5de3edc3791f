use std::path::PathBuf;

use formscope_analysis::substitution::{SubstitutionEvent, scan_substitutions};
use formscope_tracking::TeamSide;
use serde::Serialize;
use tracing::info;

use crate::{
    command::MatchInputArg,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SubstitutionsArg {
    #[clap(flatten)]
    input: MatchInputArg,
    /// Inspect every N-th frame
    #[arg(long, default_value_t = 25)]
    stride: usize,
    /// Also write the events as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TeamSubstitutions {
    team: TeamSide,
    events: Vec<SubstitutionEvent>,
}

pub(crate) fn run(arg: &SubstitutionsArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.stride > 0, "--stride must be at least 1");
    let data = util::load_match(&arg.input)?;

    let teams = TeamSide::ALL.map(|team| TeamSubstitutions {
        team,
        events: scan_substitutions(&data.frames, team, arg.stride),
    });

    for TeamSubstitutions { team, events } in &teams {
        info!(%team, count = events.len(), "substitutions found");
        for event in events {
            println!(
                "{team} {:>3}' {:>4.1}s  frame {:>7}  off {:?}  on {:?}",
                event.match_minute(),
                event.second(),
                event.frame_index,
                event.players_off,
                event.players_on,
            );
        }
    }

    if let Some(path) = arg.output.as_deref() {
        Output::save_json(&teams, Some(path))?;
    }
    Ok(())
}
