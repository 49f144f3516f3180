use anyhow::Context;
use clap::Parser;
use gymnasium::*;
use serde_json::to_value;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tabular_vi::algos::model_based::mdp::{vi::ValueIterationAgent, MdpSolver};
use tabular_vi::environments::{gym_adapter::GymAdapter, MdpSimulator};
use tabular_vi::scalars::{JsonLinesWriter, NullWriter, ScalarWriter};
use tabular_vi::training::{train, TrainingConfig};
use tracing::info;

/// Learns a FrozenLake-like environment served by gymnasium-http-api with value iteration.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:40004")]
    server_url: String,

    #[arg(long, default_value = "FrozenLake-v1")]
    env_id: String,

    #[arg(long, default_value = "4x4")]
    map_name: String,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    slippery: bool,

    #[arg(long, default_value_t = 0.9)]
    gamma: Continous,

    #[arg(long, default_value_t = 100)]
    random_steps: usize,

    #[arg(long, default_value_t = 20)]
    test_episodes: usize,

    #[arg(long, default_value_t = 0.8)]
    reward_threshold: Continous,

    #[arg(long)]
    max_iterations: Option<usize>,

    /// Seeds the random exploration policy.
    #[arg(long)]
    seed: Option<u64>,

    /// Appends the reward curve as JSON lines to this file.
    #[arg(long)]
    scalars: Option<PathBuf>,

    #[arg(long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,
}

impl Args {
    fn make_env(&self) -> anyhow::Result<GymAdapter> {
        let env = Environment::new(
            &self.server_url,
            &self.env_id,
            None,
            None,
            None,
            &[
                ("map_name", to_value(&self.map_name)?),
                ("is_slippery", to_value(self.slippery)?),
            ],
        )
        .with_context(|| format!("creating '{}' on {}", self.env_id, self.server_url))?;

        Ok(GymAdapter::new(env)?)
    }

    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            random_steps: self.random_steps,
            test_episodes: self.test_episodes,
            reward_threshold: self.reward_threshold,
            max_iterations: self.max_iterations,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    let mut env = args.make_env()?;
    if let Some(seed) = args.seed {
        env = env.with_seed(seed);
    }
    let mut test_env = args.make_env()?;
    info!(
        env = %env.name(),
        explore = env.env().instance_id(),
        test = test_env.env().instance_id(),
        "created environments"
    );

    let mut writer: Box<dyn ScalarWriter> = match &args.scalars {
        Some(path) => Box::new(JsonLinesWriter::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ))),
        None => Box::new(NullWriter),
    };

    let mut agent = ValueIterationAgent::new(env, args.gamma)?;
    let summary = train(
        &mut agent,
        &mut test_env,
        &args.training_config(),
        writer.as_mut(),
    )?;
    info!(?summary, "training finished");

    let n_s = agent.env().n_s() as Discrete;
    let v_star = (0..n_s).map(|s| agent.v_star(s)).collect::<Vec<_>>();
    println!("{v_star:?}");
    let pi_star = (0..n_s).map(|s| agent.pi_star(s)).collect::<Vec<_>>();
    println!("{pi_star:?}");

    agent.env().env().close()?;
    test_env.env().close()?;

    Ok(())
}
