use gymnasium::{Continous, Discrete};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Gym(#[from] gymnasium::Error),

    #[error("'{name}' is not an MDP: its {space} space is not Discrete")]
    NotAnMdp { name: String, space: &'static str },

    #[error("discount factor must lie in (0, 1), got {0}")]
    InvalidDiscount(Continous),

    #[error("action space is empty")]
    EmptyActionSpace,

    #[error("no transition defined out of state {state} under action {action}")]
    UndefinedTransition { state: Discrete, action: Discrete },

    #[error("failed to write scalars: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
