use super::tables::*;
use super::MdpSolver;
use crate::environments::{MdpSimulator, Step};
use crate::{Error, Result};
use gymnasium::{Continous, Discrete};
use itertools::iproduct;
use tracing::debug;

/// Value iteration over a model learnt from experience.
///
/// Rewards and transition counts are gathered by stepping through an
/// environment, first with random actions and later also while evaluating
/// the greedy policy. State values are then computed from that empirical
/// model with the Bellman optimality backup.
pub struct ValueIterationAgent<E: MdpSimulator> {
    env: E,
    gamma: Continous,
    state: Discrete,
    rewards: RewardTable,
    transits: TransitionCounts,
    values: ValueTable,
}

impl<E: MdpSimulator> ValueIterationAgent<E> {
    /// `env` is the agent's own exploration environment. It is reset once here.
    pub fn new(mut env: E, gamma: Continous) -> Result<Self> {
        if !(gamma > 0. && gamma < 1.) {
            return Err(Error::InvalidDiscount(gamma));
        }
        if env.n_a() == 0 {
            return Err(Error::EmptyActionSpace);
        }

        let state = env.reset()?;

        Ok(Self {
            env,
            gamma,
            state,
            rewards: Default::default(),
            transits: Default::default(),
            values: Default::default(),
        })
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn gamma(&self) -> Continous {
        self.gamma
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    pub fn transits(&self) -> &TransitionCounts {
        &self.transits
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Takes `count` uniformly random actions in the exploration environment,
    /// recording every transition. Finished episodes are reset and exploration
    /// carries on from the new initial state.
    pub fn play_n_random_steps(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let action = self.env.action_space_sample();
            let step = self.env.step(action)?;
            self.record(self.state, action, &step);

            self.state = if step.done() {
                self.env.reset()?
            } else {
                step.next_state
            };
        }

        Ok(())
    }

    /// Expected return of taking `action` in `state` under the empirical model:
    /// sum over observed next states of `count / total * (reward + gamma * value)`.
    /// Pairs that were never tried are worth 0.
    pub fn action_value(&self, state: Discrete, action: Discrete) -> Continous {
        let total = self.transits.total(state, action);
        if total == 0 {
            return 0.;
        }

        self.transits
            .targets(state, action)
            .map(|(s_next, count)| {
                let reward = self.rewards.get(state, action, s_next);
                (count as Continous / total as Continous)
                    * (reward + self.gamma * self.values.get(s_next))
            })
            .sum()
    }

    /// Greedy action for `state`. The lowest action wins among equal values.
    pub fn select_action(&self, state: Discrete) -> Discrete {
        let mut best_action = 0;
        let mut best_value = self.action_value(state, best_action);
        for action in 1..self.n_a() {
            let value = self.action_value(state, action);
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }

        best_action
    }

    /// Plays one episode on `env` with the greedy policy and returns the
    /// undiscounted sum of rewards. Transitions seen along the way feed the
    /// model just like exploration does.
    ///
    /// Only the environment decides when the episode ends: an environment
    /// that never reports `done` keeps this looping.
    pub fn play_episode<T>(&mut self, env: &mut T) -> Result<Continous>
    where
        T: MdpSimulator + ?Sized,
    {
        let mut total_reward = 0.;
        let mut state = env.reset()?;
        loop {
            let action = self.select_action(state);
            let step = env.step(action)?;
            self.record(state, action, &step);
            total_reward += step.reward;
            if step.done() {
                break;
            }

            state = step.next_state;
        }

        Ok(total_reward)
    }

    /// One synchronous sweep of value iteration: every state gets the best
    /// action value computed against the values from before the sweep.
    /// Returns the largest change of any state value.
    pub fn value_iteration(&mut self) -> Continous {
        let n_s = self.env.n_s() as Discrete;
        let updated = (0..n_s)
            .map(|s| {
                let best = (0..self.n_a())
                    .map(|a| self.action_value(s, a))
                    .fold(Continous::NEG_INFINITY, Continous::max);
                (s, best)
            })
            .collect::<Vec<_>>();

        let mut delta: Continous = 0.;
        for (s, v) in updated {
            delta = delta.max((v - self.values.get(s)).abs());
            self.values.set(s, v);
        }
        debug!(delta, "value iteration sweep");

        delta
    }

    /// Action values of every `(state, action)` pair, state major.
    pub fn q_values(&self) -> Vec<((Discrete, Discrete), Continous)> {
        iproduct!(0..self.env.n_s() as Discrete, 0..self.n_a())
            .map(|(s, a)| ((s, a), self.action_value(s, a)))
            .collect()
    }

    fn n_a(&self) -> Discrete {
        self.env.n_a() as Discrete
    }

    fn record(&mut self, state: Discrete, action: Discrete, step: &Step) {
        self.rewards
            .record(state, action, step.next_state, step.reward);
        self.transits.record(state, action, step.next_state);
    }
}

impl<E: MdpSimulator> MdpSolver for ValueIterationAgent<E> {
    fn v_star(&self, s: Discrete) -> Continous {
        self.values.get(s)
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Continous {
        self.action_value(s, a)
    }

    fn pi_star(&self, s: Discrete) -> Discrete {
        self.select_action(s)
    }
}
