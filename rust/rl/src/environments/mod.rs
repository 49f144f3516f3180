pub mod gym_adapter;
pub mod tabular;

use crate::Result;
use gymnasium::{Continous, Discrete};

/// Outcome of a single environment transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub next_state: Discrete,
    pub reward: Continous,
    pub terminated: bool,
    pub truncated: bool,
}

impl Step {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// An episodic environment with finite, enumerable state and action spaces.
/// The dynamics are hidden: agents only learn them by calling `reset` and `step`.
pub trait MdpSimulator {
    fn name(&self) -> String;

    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    /// Uniformly random action in `0..n_a`.
    fn action_space_sample(&mut self) -> Discrete;

    fn reset(&mut self) -> Result<Discrete>;

    fn step(&mut self, action: Discrete) -> Result<Step>;
}
