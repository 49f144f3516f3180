use crate::environments::tabular::*;
use std::rc::Rc;

/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
///
/// States: 0 fairway, 1 green, 2 in the hole (terminal).
/// Actions: 0 hit towards the green, 1 chip back, 2 putt.
pub struct SimpleGolf;

impl SimpleGolf {
    pub const N_S: usize = 3;
    pub const N_A: usize = 3;

    pub fn transitions() -> Transitions {
        let t = |next_state, probability, reward, done| Transition {
            next_state,
            probability,
            reward,
            done,
        };

        Transitions::from([
            ((0, 0), vec![t(1, 0.9, 0., false), t(0, 0.1, 0., false)]),
            ((0, 1), vec![t(0, 1.0, 0., false)]),
            ((0, 2), vec![t(0, 1.0, 0., false)]),
            ((1, 0), vec![t(1, 1.0, 0., false)]),
            ((1, 1), vec![t(0, 0.9, 0., false), t(1, 0.1, 0., false)]),
            ((1, 2), vec![t(2, 0.9, 10., true), t(1, 0.1, 0., false)]),
            ((2, 0), vec![t(2, 1.0, 0., true)]),
            ((2, 1), vec![t(2, 1.0, 0., true)]),
            ((2, 2), vec![t(2, 1.0, 0., true)]),
        ])
    }

    pub fn simulator() -> TabularSimulator {
        TabularSimulator::new(
            "SimpleGolf",
            Self::N_S,
            Self::N_A,
            0,
            Rc::new(Self::transitions()),
        )
    }
}
