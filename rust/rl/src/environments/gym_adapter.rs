use super::{MdpSimulator, Step};
use crate::{Error, Result};
use gymnasium::*;
use rand::prelude::*;

/// Exposes a remote gymnasium environment with `Discrete` observation and action spaces.
pub struct GymAdapter {
    name: String,
    env: Environment,
    n_s: usize,
    n_a: usize,
    rng: StdRng,
}

impl GymAdapter {
    pub fn new(env: Environment) -> Result<Self> {
        let name = env.name()?;
        let n_s = discrete_n(&name, env.observation_space(), "observation")?;
        let n_a = discrete_n(&name, env.action_space(), "action")?;

        Ok(Self {
            name,
            env,
            n_s,
            n_a,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    fn observed_state(&self, observation: &[ObsActSpaceItem]) -> Result<Discrete> {
        observation
            .first()
            .and_then(ObsActSpaceItem::discrete_value)
            .ok_or_else(|| {
                gymnasium::Error::Malformed(format!(
                    "'{}' returned a non Discrete observation: {observation:?}",
                    self.name
                ))
                .into()
            })
    }
}

fn discrete_n(name: &str, space: &ObsActSpace, which: &'static str) -> Result<usize> {
    match space.n() {
        Some(n) if n >= 0 => Ok(n as usize),
        _ => Err(Error::NotAnMdp {
            name: name.to_string(),
            space: which,
        }),
    }
}

impl MdpSimulator for GymAdapter {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn action_space_sample(&mut self) -> Discrete {
        self.rng.gen_range(0..self.n_a as Discrete)
    }

    fn reset(&mut self) -> Result<Discrete> {
        let observation = self.env.reset(None)?;
        self.observed_state(&observation)
    }

    fn step(&mut self, action: Discrete) -> Result<Step> {
        let si = self.env.step(action)?;

        Ok(Step {
            next_state: self.observed_state(&si.observation)?,
            reward: si.reward,
            terminated: si.terminated,
            truncated: si.truncated,
        })
    }
}
