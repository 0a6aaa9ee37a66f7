use serenity::all::{GuildId, UserId};
use thiserror::Error;

use super::giveaway::GiveawayId;

/// Failure reported by one of the outside systems the engine talks to.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("discord request failed: {0}")]
    Discord(#[from] serenity::Error),
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RewardStep {
    Role,
    Revocation,
    Direct,
    Broadcast,
}

#[derive(Debug, Error)]
pub enum GiveawayError {
    #[error("giveaway {0} could not be found")]
    NotFound(GiveawayId),
    #[error("giveaway {0} has already ended")]
    AlreadyEnded(GiveawayId),
    #[error("giveaway {0} has not ended yet")]
    NotYetEnded(GiveawayId),
    #[error("user {user} does not hold the role required to enter giveaway {id}")]
    PermissionDenied { id: GiveawayId, user: UserId },
    #[error("guild {0} is not entitled to run giveaways")]
    CapabilityDenied(GuildId),
    #[error("invalid giveaway: {0}")]
    Invalid(&'static str),
    #[error("could not persist giveaway: {0}")]
    Persistence(#[source] CollaboratorError),
    #[error("could not render giveaway message: {0}")]
    Presentation(#[source] CollaboratorError),
    #[error("reward step {step} failed for giveaway {id}: {reason}")]
    Reward {
        id: GiveawayId,
        step: RewardStep,
        reason: String,
    },
}
