use blockfall_engine::PieceSeed;
use clap::Parser;

use crate::play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Seed for a deterministic piece sequence (32 hex characters)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Frame rate of the render/tick loop
    #[clap(long, default_value_t = 60)]
    fps: u32,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    play::run(args.seed, args.fps)
}
