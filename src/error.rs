//! Errors surfaced to the host
//!
//! The simulation itself never fails mid-tick: lethal damage and bad geometry
//! are handled as game rules. These cover the host-facing calls that can be
//! given bad input.

use thiserror::Error;

use crate::sim::GamePhase;

#[derive(Debug, Error)]
pub enum SimError {
    /// An upgrade was selected while no offer was open
    #[error("no upgrade offer is open (phase is {phase:?})")]
    NotChoosingUpgrade { phase: GamePhase },

    /// Selected offer index is outside the current offer set
    #[error("upgrade offer {index} does not exist ({len} offered)")]
    InvalidOffer { index: usize, len: usize },

    /// Start level must be at least 1
    #[error("start level must be >= 1, got {0}")]
    InvalidStartLevel(u32),

    /// Config or tuning JSON failed to parse
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
