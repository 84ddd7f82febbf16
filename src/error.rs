//! Errors returned by lifecycle calls made in the wrong state
//!
//! Nothing inside a tick can fail; these only come from the outer API.

use thiserror::Error;

use crate::sim::UpgradeId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no upgrade choice is pending")]
    NotAwaitingUpgrade,

    #[error("upgrade {0:?} is not among the offered choices")]
    UpgradeNotOffered(UpgradeId),

    #[error("ultimate not charged ({charge:.0}/{max:.0})")]
    UltimateNotReady { charge: f32, max: f32 },

    #[error("run is not in progress")]
    NotPlaying,

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
