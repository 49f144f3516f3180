pub mod tables;
pub mod vi;

use gymnasium::{Continous, Discrete};

/// Optimal value, action-value and policy estimates of a solved MDP - Sutton & Barto 2018.
pub trait MdpSolver {
    fn v_star(&self, s: Discrete) -> Continous;

    fn q_star(&self, s: Discrete, a: Discrete) -> Continous;

    fn pi_star(&self, s: Discrete) -> Discrete;
}
