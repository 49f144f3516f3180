use super::{MdpSimulator, Step};
use crate::{Error, Result};
use gymnasium::{Continous, Discrete};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: Discrete,
    pub probability: Continous,
    pub reward: Continous,
    pub done: bool,
}

pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

impl Weighted<Transition> for Transition {
    fn s(&self) -> Transition {
        *self
    }

    fn p(&self) -> Continous {
        self.probability
    }
}

/// Draws one item proportionally to its weight. `None` when the weights
/// are empty, negative or all zero.
pub fn pick_next<T, S>(rng: &mut StdRng, ts: &[T]) -> Option<S>
where
    T: Weighted<S>,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p())).ok()?;
    Some(ts[dist.sample(rng)].s())
}

/// Samples episodes from a fixed transition table.
pub struct TabularSimulator {
    name: String,
    n_s: usize,
    n_a: usize,
    initial_state: Discrete,
    transitions: Rc<Transitions>,
    max_episode_steps: Option<usize>,
    rng: StdRng,
    state: Discrete,
    elapsed_steps: usize,
}

impl TabularSimulator {
    pub fn new(
        name: &str,
        n_s: usize,
        n_a: usize,
        initial_state: Discrete,
        transitions: Rc<Transitions>,
    ) -> Self {
        Self {
            name: name.to_string(),
            n_s,
            n_a,
            initial_state,
            transitions,
            max_episode_steps: None,
            rng: StdRng::from_entropy(),
            state: initial_state,
            elapsed_steps: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Truncates every episode after `n` steps, like gymnasium's `TimeLimit`.
    pub fn with_max_episode_steps(mut self, n: usize) -> Self {
        self.max_episode_steps = Some(n);
        self
    }

    pub fn state(&self) -> Discrete {
        self.state
    }

    pub fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }
}

impl MdpSimulator for TabularSimulator {
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
        self.state = self.initial_state;
        self.elapsed_steps = 0;

        Ok(self.state)
    }

    fn step(&mut self, action: Discrete) -> Result<Step> {
        let state = self.state;
        let undefined = || Error::UndefinedTransition { state, action };
        let ts = self.transitions.get(&(state, action)).ok_or_else(undefined)?;
        let next: Transition = pick_next(&mut self.rng, ts).ok_or_else(undefined)?;

        self.state = next.next_state;
        self.elapsed_steps += 1;

        Ok(Step {
            next_state: next.next_state,
            reward: next.reward,
            terminated: next.done,
            truncated: self
                .max_episode_steps
                .is_some_and(|n| self.elapsed_steps >= n),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::SimpleGolf;
    use float_eq::*;

    struct TX {
        pub s: usize,
        pub p: Continous,
        pub count: i32,
    }

    impl Weighted<usize> for TX {
        fn p(&self) -> Continous {
            self.p
        }

        fn s(&self) -> usize {
            self.s
        }
    }

    #[test]
    fn test_pick_next_follows_weights() {
        let items = &mut vec![
            TX {
                s: 0,
                p: 0.2,
                count: 0,
            },
            TX {
                s: 1,
                p: 0.8,
                count: 0,
            },
        ];

        let rng = &mut StdRng::seed_from_u64(2718);
        let n = 10000;
        for _ in 0..n {
            let i = pick_next(rng, items).unwrap();
            items[i].count += 1;
        }

        assert_float_eq!(items[0].count as f64 / n as f64, 0.2, abs <= 2e-2);
        assert_float_eq!(items[1].count as f64 / n as f64, 0.8, abs <= 2e-2);
    }

    #[test]
    fn test_pick_next_without_weight() {
        let rng = &mut StdRng::seed_from_u64(2718);

        assert_eq!(pick_next::<TX, usize>(rng, &[]), None);
        assert_eq!(
            pick_next::<TX, usize>(
                rng,
                &[TX {
                    s: 3,
                    p: 0.,
                    count: 0
                }]
            ),
            None
        );
    }

    #[test]
    fn undefined_transitions_are_errors() {
        let mut sim = TabularSimulator::new("empty", 2, 2, 0, Rc::new(Transitions::new()));
        sim.reset().unwrap();

        let err = sim.step(1).unwrap_err();
        assert!(matches!(
            err,
            Error::UndefinedTransition {
                state: 0,
                action: 1
            }
        ));
    }

    #[test]
    fn episodes_are_truncated_after_max_steps() {
        // Chipping from the fairway never finishes the hole.
        let mut sim = SimpleGolf::simulator().with_seed(7).with_max_episode_steps(3);
        sim.reset().unwrap();

        let steps = (0..3).map(|_| sim.step(1).unwrap()).collect::<Vec<_>>();
        assert!(steps[..2].iter().all(|s| !s.done()));
        assert!(steps[2].truncated);
        assert!(!steps[2].terminated);

        assert_eq!(sim.reset().unwrap(), 0);
        assert!(!sim.step(1).unwrap().done());
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut sim = SimpleGolf::simulator().with_seed(11);
        sim.reset().unwrap();
        while sim.step(0).unwrap().next_state == 0 {}
        assert_eq!(sim.state(), 1);

        assert_eq!(sim.reset().unwrap(), 0);
        assert_eq!(sim.state(), 0);
    }

    #[test]
    fn action_samples_stay_in_range() {
        let mut sim = SimpleGolf::simulator().with_seed(3);

        assert!((0..1000)
            .map(|_| sim.action_space_sample())
            .all(|a| (0..3).contains(&a)));
    }
}
