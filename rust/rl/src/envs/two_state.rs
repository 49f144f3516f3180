use crate::environments::tabular::*;
use std::rc::Rc;

/// Deterministic two state MDP. From state 0, action 0 moves to state 1 with
/// reward 1 and action 1 moves there with reward 0. Any action in state 1
/// ends the episode with reward 0.
pub struct TwoState;

impl TwoState {
    pub fn transitions() -> Transitions {
        let t = |next_state, reward, done| Transition {
            next_state,
            probability: 1.0,
            reward,
            done,
        };

        Transitions::from([
            ((0, 0), vec![t(1, 1., false)]),
            ((0, 1), vec![t(1, 0., false)]),
            ((1, 0), vec![t(1, 0., true)]),
            ((1, 1), vec![t(1, 0., true)]),
        ])
    }

    pub fn simulator() -> TabularSimulator {
        TabularSimulator::new("TwoState", 2, 2, 0, Rc::new(Self::transitions()))
    }
}
