use std::path::PathBuf;

use clap::{Parser, Subcommand};

use self::{estimate::EstimateArg, substitutions::SubstitutionsArg};

mod estimate;
mod substitutions;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// List every substitution of both teams
    Substitutions(#[clap(flatten)] SubstitutionsArg),
    /// Estimate a team's attacking and defending formations
    Estimate(#[clap(flatten)] EstimateArg),
}

/// Tracking files of one match.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MatchInputArg {
    /// Match metadata JSON file
    pub metadata: PathBuf,
    /// Tracking data JSON Lines file, one frame per line
    pub tracking: PathBuf,
    /// Keep second-half coordinates as recorded instead of mirroring them
    #[arg(long)]
    pub no_flip: bool,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Substitutions(arg) => substitutions::run(&arg)?,
        Mode::Estimate(arg) => estimate::run(&arg)?,
    }
    Ok(())
}
