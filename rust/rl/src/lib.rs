//! Value iteration on a tabular MDP whose dynamics are learnt by sampling.

pub mod algos;
pub mod environments;
mod error;
pub mod scalars;
pub mod training;

#[cfg(test)]
mod envs;

pub use error::{Error, Result};
