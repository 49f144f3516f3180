//! Small fixed MDPs used as test fixtures.

pub mod simple_golf;
pub mod two_state;
