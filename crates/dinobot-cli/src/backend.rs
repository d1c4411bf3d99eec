use std::path::PathBuf;

use anyhow::Context as _;
use dinobot_engine::sim::{SimConfig, SimulatedBoard};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::util;

pub(crate) type Board = SimulatedBoard<Pcg32>;

/// Where games are played and where randomness comes from.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct BoardArg {
    /// Simulated board configuration (JSON, missing fields take their defaults)
    #[arg(long)]
    sim_config: Option<PathBuf>,
    /// Seed for every random choice; a fresh seed is drawn when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl BoardArg {
    /// Returns the RNG for policy initialization and optimization.
    pub(crate) fn rng(&self) -> Pcg32 {
        match self.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        }
    }

    /// Builds the board, seeding it from `rng`.
    pub(crate) fn board(&self, rng: &mut Pcg32) -> anyhow::Result<Board> {
        let config = match &self.sim_config {
            Some(path) => util::read_json_file("simulated board config", path)?,
            None => SimConfig::default(),
        };
        log::debug!("simulated board config: {config:?}");
        let board = SimulatedBoard::new(config, Pcg32::from_rng(rng))
            .context("invalid simulated board config")?;
        Ok(board)
    }
}
