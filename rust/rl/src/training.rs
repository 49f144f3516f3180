//! Explore, sweep and evaluate until the greedy policy is good enough.

use crate::algos::model_based::mdp::vi::ValueIterationAgent;
use crate::environments::MdpSimulator;
use crate::scalars::ScalarWriter;
use crate::Result;
use gymnasium::Continous;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Random exploration steps taken before each sweep.
    pub random_steps: usize,
    /// Greedy episodes averaged to score each iteration.
    pub test_episodes: usize,
    /// Training stops once the average test reward exceeds this.
    pub reward_threshold: Continous,
    pub max_iterations: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            random_steps: 100,
            test_episodes: 20,
            reward_threshold: 0.8,
            max_iterations: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub iterations: usize,
    pub best_reward: Continous,
    pub last_reward: Continous,
    pub solved: bool,
}

/// Runs training iterations until the average reward of `config.test_episodes`
/// greedy episodes on `test_env` exceeds `config.reward_threshold`, or until
/// `config.max_iterations` have run. The average of every iteration is written
/// to `writer` under the `reward` tag.
pub fn train<E, T, W>(
    agent: &mut ValueIterationAgent<E>,
    test_env: &mut T,
    config: &TrainingConfig,
    writer: &mut W,
) -> Result<TrainingSummary>
where
    E: MdpSimulator,
    T: MdpSimulator + ?Sized,
    W: ScalarWriter + ?Sized,
{
    let mut iter_no = 0;
    let mut best_reward = 0.;

    loop {
        iter_no += 1;
        agent.play_n_random_steps(config.random_steps)?;
        let delta = agent.value_iteration();

        let mut reward = 0.;
        for _ in 0..config.test_episodes {
            reward += agent.play_episode(test_env)?;
        }
        reward /= config.test_episodes.max(1) as Continous;
        debug!(iter_no, reward, delta, "evaluated greedy policy");

        writer.add_scalar("reward", reward, iter_no)?;
        if reward > best_reward {
            info!("Best reward updated {best_reward:.3} -> {reward:.3}");
            best_reward = reward;
        }

        if reward > config.reward_threshold {
            info!("Solved in {iter_no} iterations!");
            writer.flush()?;
            return Ok(TrainingSummary {
                iterations: iter_no,
                best_reward,
                last_reward: reward,
                solved: true,
            });
        }

        if config.max_iterations.is_some_and(|n| iter_no >= n) {
            info!("Stopping unsolved after {iter_no} iterations");
            writer.flush()?;
            return Ok(TrainingSummary {
                iterations: iter_no,
                best_reward,
                last_reward: reward,
                solved: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::{simple_golf::SimpleGolf, two_state::TwoState};
    use float_eq::*;

    #[derive(Default)]
    struct Recorder {
        scalars: Vec<(String, Continous, usize)>,
        flushes: usize,
    }

    impl ScalarWriter for Recorder {
        fn add_scalar(&mut self, tag: &str, value: Continous, step: usize) -> Result<()> {
            self.scalars.push((tag.to_string(), value, step));
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn solves_two_state_mdp() {
        let mut agent = ValueIterationAgent::new(TwoState::simulator().with_seed(2718), 0.9).unwrap();
        let mut test_env = TwoState::simulator();
        let mut recorder = Recorder::default();

        let summary = train(
            &mut agent,
            &mut test_env,
            &TrainingConfig::default(),
            &mut recorder,
        )
        .unwrap();

        assert!(summary.solved);
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.best_reward, 1.);
        assert_eq!(recorder.scalars, vec![("reward".to_string(), 1., 1)]);
        assert_eq!(recorder.flushes, 1);
    }

    #[test]
    fn stops_after_max_iterations() {
        let mut agent = ValueIterationAgent::new(TwoState::simulator().with_seed(1), 0.9).unwrap();
        let mut test_env = TwoState::simulator();
        let mut recorder = Recorder::default();
        let config = TrainingConfig {
            random_steps: 10,
            test_episodes: 3,
            reward_threshold: 2.,
            max_iterations: Some(4),
        };

        let summary = train(&mut agent, &mut test_env, &config, &mut recorder).unwrap();

        assert!(!summary.solved);
        assert_eq!(summary.iterations, 4);
        let steps = recorder.scalars.iter().map(|s| s.2).collect::<Vec<_>>();
        assert_eq!(steps, vec![1, 2, 3, 4]);
        assert!(recorder.scalars.iter().all(|s| s.0 == "reward"));
    }

    #[test]
    fn evaluation_keeps_feeding_the_model() {
        let mut agent = ValueIterationAgent::new(SimpleGolf::simulator().with_seed(8), 0.9).unwrap();
        let mut test_env = SimpleGolf::simulator().with_seed(9).with_max_episode_steps(50);
        let config = TrainingConfig {
            random_steps: 100,
            test_episodes: 5,
            reward_threshold: 100.,
            max_iterations: Some(2),
        };

        train(&mut agent, &mut test_env, &config, &mut Recorder::default()).unwrap();

        assert!(agent.transits().grand_total() > 2 * config.random_steps);
    }

    #[test]
    fn learns_to_putt() {
        let mut agent = ValueIterationAgent::new(SimpleGolf::simulator().with_seed(2718), 0.9).unwrap();
        let mut test_env = SimpleGolf::simulator().with_seed(31).with_max_episode_steps(100);
        let config = TrainingConfig {
            random_steps: 500,
            test_episodes: 20,
            reward_threshold: 9.,
            max_iterations: Some(200),
        };

        let summary = train(&mut agent, &mut test_env, &config, &mut Recorder::default()).unwrap();

        assert!(summary.solved);
        assert_float_eq!(summary.last_reward, 10., abs <= 1.);
    }
}
