use serenity::all::UserId;
use tracing::{debug, error};

use crate::models::{
    error::RewardStep,
    giveaway::Giveaway,
    presentation::mention_all,
};

use super::ports::{Collaborators, RoleRevocation};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Skipped,
    Done,
    Failed(String),
}

impl StepOutcome {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => StepOutcome::Done,
            Err(err) => StepOutcome::Failed(err.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinnerReport {
    pub user_id: UserId,
    pub role: StepOutcome,
    pub revocation: StepOutcome,
    pub direct: StepOutcome,
}

/// Per-step results of one reward run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardReport {
    pub winners: Vec<WinnerReport>,
    pub broadcast: Option<StepOutcome>,
}

impl RewardReport {
    /// Every failed step, keyed by the winner it concerned (none for the
    /// channel broadcast).
    pub fn failures(&self) -> Vec<(Option<UserId>, RewardStep, &str)> {
        let mut failures = Vec::new();
        for winner in &self.winners {
            for (step, outcome) in [
                (RewardStep::Role, &winner.role),
                (RewardStep::Revocation, &winner.revocation),
                (RewardStep::Direct, &winner.direct),
            ] {
                if let StepOutcome::Failed(reason) = outcome {
                    failures.push((Some(winner.user_id), step, reason.as_str()));
                }
            }
        }
        if let Some(StepOutcome::Failed(reason)) = &self.broadcast {
            failures.push((None, RewardStep::Broadcast, reason.as_str()));
        }
        failures
    }
}

/// Substitutes `{winners}`, `{prize}` and `{guild}` in a broadcast template.
pub fn render_template(template: &str, winners: &str, prize: &str, guild: &str) -> String {
    template
        .replace("{winners}", winners)
        .replace("{prize}", prize)
        .replace("{guild}", guild)
}

/// Applies the configured rewards to winners. Never fails as a whole: every
/// step is attempted on its own and its outcome recorded in the report.
#[derive(Clone)]
pub struct RewardDispatcher {
    collaborators: Collaborators,
}

impl RewardDispatcher {
    pub fn new(collaborators: Collaborators) -> Self {
        RewardDispatcher { collaborators }
    }

    pub async fn apply(&self, giveaway: &Giveaway, winners: &[UserId]) -> RewardReport {
        let mut report = RewardReport::default();

        for winner in winners {
            let (role, revocation) = self.grant_role(giveaway, *winner).await;
            let direct = self.notify_winner(giveaway, *winner).await;
            report.winners.push(WinnerReport {
                user_id: *winner,
                role,
                revocation,
                direct,
            });
        }

        report.broadcast = self.broadcast(giveaway, winners).await;
        report
    }

    async fn grant_role(&self, giveaway: &Giveaway, winner: UserId) -> (StepOutcome, StepOutcome) {
        let Some(role_id) = giveaway.reward.role_id else {
            return (StepOutcome::Skipped, StepOutcome::Skipped);
        };

        let granted = self
            .collaborators
            .roles
            .add_role(
                giveaway.guild_id,
                winner,
                role_id,
                &format!("Won giveaway {}", giveaway.id),
            )
            .await;
        if let Err(err) = granted {
            return (StepOutcome::Failed(err.to_string()), StepOutcome::Skipped);
        }

        let Some(minutes) = giveaway.reward.revoke_after() else {
            return (StepOutcome::Done, StepOutcome::Skipped);
        };

        let revocation = RoleRevocation {
            giveaway_id: giveaway.id.clone(),
            guild_id: giveaway.guild_id,
            user_id: winner,
            role_id,
            due_at: self.collaborators.clock.now() + time::Duration::minutes(i64::from(minutes)),
        };
        let scheduled = self.collaborators.revocations.schedule(&revocation).await;
        (StepOutcome::Done, StepOutcome::from_result(scheduled))
    }

    async fn notify_winner(&self, giveaway: &Giveaway, winner: UserId) -> StepOutcome {
        let Some(message) = &giveaway.reward.dm_message else {
            return StepOutcome::Skipped;
        };

        let content = format!(
            "{message}\n\nPrize: **{}**\n{}",
            giveaway.prize,
            giveaway.jump_link()
        );
        StepOutcome::from_result(
            self.collaborators
                .notifications
                .send_direct(winner, &content)
                .await,
        )
    }

    async fn broadcast(&self, giveaway: &Giveaway, winners: &[UserId]) -> Option<StepOutcome> {
        let (Some(channel_id), Some(template)) = (
            giveaway.reward.channel_id,
            &giveaway.reward.channel_message_template,
        ) else {
            return None;
        };
        if winners.is_empty() {
            return Some(StepOutcome::Skipped);
        }

        let guild = match self.collaborators.messaging.guild_name(giveaway.guild_id).await {
            Ok(Some(name)) => name,
            Ok(None) => giveaway.guild_id.to_string(),
            Err(err) => {
                debug!(
                    "Could not get name of guild {}, using its id. Failed with error: {}",
                    giveaway.guild_id, err
                );
                giveaway.guild_id.to_string()
            }
        };

        let content = render_template(template, &mention_all(winners), &giveaway.prize, &guild);
        Some(StepOutcome::from_result(
            self.collaborators
                .notifications
                .send_to_channel(channel_id, &content)
                .await,
        ))
    }

    /// Takes back reward roles whose time is up. Returns how many were
    /// removed successfully.
    pub async fn revoke_due(&self, limit: u32) -> usize {
        let now = self.collaborators.clock.now();
        let due = match self.collaborators.revocations.take_due(now, limit).await {
            Ok(due) => due,
            Err(err) => {
                error!("Failed to fetch due role revocations: {}", err);
                return 0;
            }
        };

        let mut revoked = 0;
        for revocation in due {
            debug!(
                "Revoking reward role {} from user {} for giveaway {}",
                revocation.role_id, revocation.user_id, revocation.giveaway_id
            );
            match self
                .collaborators
                .roles
                .remove_role(
                    revocation.guild_id,
                    revocation.user_id,
                    revocation.role_id,
                    &format!("Reward for giveaway {} expired", revocation.giveaway_id),
                )
                .await
            {
                Ok(()) => revoked += 1,
                Err(err) => error!(
                    "Failed to revoke reward role {} from user {} for giveaway {}: {}",
                    revocation.role_id, revocation.user_id, revocation.giveaway_id, err
                ),
            }
        }
        revoked
    }
}
