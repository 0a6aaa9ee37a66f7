use serenity::all::{GuildId, UserId};
use tracing::{debug, error, info};

use crate::{
    common::logging::log_reward_report,
    models::{
        error::GiveawayError,
        giveaway::{Giveaway, GiveawayId, NewGiveaway},
        presentation::Presentation,
    },
};

use super::{
    entries::{EntryRegistry, EntryToggle},
    ports::{Capability, Collaborators},
    rewards::{RewardDispatcher, RewardReport},
    selector::select_winners,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndResult {
    pub winners: Vec<UserId>,
    pub rewards: RewardReport,
}

/// What the scheduler did with a due giveaway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expiry {
    Ended(EndResult),
    /// The guild lost the giveaways capability: closed without winners,
    /// message update or rewards.
    SilentlyClosed,
    /// The entitlement lookup failed; the giveaway is left for a later tick.
    Deferred,
}

/// Drives giveaways through `Active -> Ended` and the reroll loop on `Ended`.
#[derive(Clone)]
pub struct LifecycleController {
    collaborators: Collaborators,
    entries: EntryRegistry,
    rewards: RewardDispatcher,
}

impl LifecycleController {
    pub fn new(collaborators: Collaborators) -> Self {
        LifecycleController {
            entries: EntryRegistry::new(collaborators.clone()),
            rewards: RewardDispatcher::new(collaborators.clone()),
            collaborators,
        }
    }

    pub fn rewards(&self) -> &RewardDispatcher {
        &self.rewards
    }

    pub async fn create(&self, request: NewGiveaway) -> Result<Giveaway, GiveawayError> {
        if request.winner_count < 1 {
            return Err(GiveawayError::Invalid("a giveaway needs at least one winner"));
        }
        if request.duration_minutes < 1 {
            return Err(GiveawayError::Invalid("a giveaway must run for at least a minute"));
        }
        if request.prize.trim().is_empty() {
            return Err(GiveawayError::Invalid("a giveaway needs a prize"));
        }
        if i32::try_from(request.winner_count).is_err() {
            return Err(GiveawayError::Invalid("too many winners"));
        }
        if request
            .reward
            .role_remove_after_minutes
            .is_some_and(|minutes| i32::try_from(minutes).is_err())
        {
            return Err(GiveawayError::Invalid("the reward role duration is too long"));
        }

        match self
            .collaborators
            .entitlements
            .has_capability(request.guild_id, Capability::Giveaways)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(GiveawayError::CapabilityDenied(request.guild_id)),
            Err(err) => {
                error!(
                    "Could not check giveaway entitlement for guild {}. Failed with error: {}",
                    request.guild_id, err
                );
                return Err(GiveawayError::CapabilityDenied(request.guild_id));
            }
        }

        let id = GiveawayId::generate()?;
        let ends_at = self.collaborators.clock.now()
            + time::Duration::minutes(i64::from(request.duration_minutes));

        let message_id = self
            .collaborators
            .messaging
            .send_announcement(request.channel_id, &Presentation::pending(&request, ends_at))
            .await
            .map_err(|err| {
                error!(
                    "Could not send giveaway announcement in channel {}. Failed with error: {}",
                    request.channel_id, err
                );
                GiveawayError::Presentation(err)
            })?;

        let giveaway = Giveaway {
            id,
            guild_id: request.guild_id,
            channel_id: request.channel_id,
            message_id,
            prize: request.prize,
            winner_count: request.winner_count,
            host_id: request.host_id,
            host_name: request.host_name,
            required_role_id: request.required_role_id,
            ends_at,
            style: request.style,
            reward: request.reward,
            entries: Default::default(),
            ended: false,
            winners: Vec::new(),
            version: 0,
        };

        if let Err(err) = self.collaborators.repository.create(&giveaway).await {
            error!(
                "Could not insert giveaway {} into database, message {} in channel {} is orphaned. Failed with error: {}",
                giveaway.id, giveaway.message_id, giveaway.channel_id, err
            );
            return Err(GiveawayError::Persistence(err));
        }

        // Second phase: the message now exists and the record references it,
        // so the join control can carry the giveaway id.
        self.sync_message(&giveaway, &Presentation::active(&giveaway))
            .await;

        info!(
            "Giveaway {} for {} started in guild {}, ends at {}",
            giveaway.id, giveaway.prize, giveaway.guild_id, giveaway.ends_at
        );
        Ok(giveaway)
    }

    pub async fn toggle_entry(
        &self,
        id: &GiveawayId,
        user_id: UserId,
    ) -> Result<EntryToggle, GiveawayError> {
        self.entries.toggle_entry(id, user_id).await
    }

    /// Ends a giveaway of `guild_id`. Giveaways of other guilds are reported
    /// as not found.
    pub async fn end(
        &self,
        guild_id: GuildId,
        id: &GiveawayId,
        force: bool,
    ) -> Result<EndResult, GiveawayError> {
        let giveaway = self.load(guild_id, id).await?;
        if giveaway.ended && !force {
            return Err(GiveawayError::AlreadyEnded(id.clone()));
        }
        self.draw(giveaway).await
    }

    /// Draws a fresh set of winners for an ended giveaway. Rewards already
    /// handed to earlier winners are kept.
    pub async fn reroll(
        &self,
        guild_id: GuildId,
        id: &GiveawayId,
    ) -> Result<EndResult, GiveawayError> {
        let giveaway = self.load(guild_id, id).await?;
        if !giveaway.ended {
            return Err(GiveawayError::NotYetEnded(id.clone()));
        }
        self.draw(giveaway).await
    }

    /// Scheduler path for a giveaway whose time is up.
    pub async fn expire(&self, giveaway: &Giveaway) -> Result<Expiry, GiveawayError> {
        match self
            .collaborators
            .entitlements
            .has_capability(giveaway.guild_id, Capability::Giveaways)
            .await
        {
            Ok(true) => Ok(Expiry::Ended(
                self.end(giveaway.guild_id, &giveaway.id, false).await?,
            )),
            Ok(false) => self.close_silently(&giveaway.id).await,
            Err(err) => {
                error!(
                    "Could not check giveaway entitlement for guild {}, leaving giveaway {} for later. Failed with error: {}",
                    giveaway.guild_id, giveaway.id, err
                );
                Ok(Expiry::Deferred)
            }
        }
    }

    async fn close_silently(&self, id: &GiveawayId) -> Result<Expiry, GiveawayError> {
        match self.collaborators.repository.mark_ended(id, &[]).await {
            Ok(true) => {
                info!(
                    "Closed giveaway {} without winners, its guild lost the giveaways capability",
                    id
                );
                Ok(Expiry::SilentlyClosed)
            }
            Ok(false) => Err(GiveawayError::AlreadyEnded(id.clone())),
            Err(err) => {
                error!(
                    "Could not close giveaway {}. Failed with error: {}",
                    id, err
                );
                Err(GiveawayError::Persistence(err))
            }
        }
    }

    async fn draw(&self, mut giveaway: Giveaway) -> Result<EndResult, GiveawayError> {
        let winners = select_winners(
            giveaway.entries.iter().copied(),
            giveaway.winner_count as usize,
            &mut rand::thread_rng(),
        );

        let rerolling = giveaway.ended;
        let committed = if rerolling {
            self.collaborators
                .repository
                .replace_winners(&giveaway.id, &winners)
                .await
        } else {
            self.collaborators
                .repository
                .mark_ended(&giveaway.id, &winners)
                .await
        };

        match committed {
            Ok(true) => {}
            // Another caller ended it between our read and write.
            Ok(false) if !rerolling => return Err(GiveawayError::AlreadyEnded(giveaway.id)),
            Ok(false) => return Err(GiveawayError::NotFound(giveaway.id)),
            Err(err) => {
                error!(
                    "Could not store winners for giveaway {}. Failed with error: {}",
                    giveaway.id, err
                );
                return Err(GiveawayError::Persistence(err));
            }
        }

        giveaway.ended = true;
        giveaway.winners.clone_from(&winners);
        debug!(
            "Giveaway {} {} with {} winner(s) out of {} entries",
            giveaway.id,
            if rerolling { "rerolled" } else { "ended" },
            winners.len(),
            giveaway.entries.len()
        );

        self.sync_message(&giveaway, &Presentation::ended(&giveaway))
            .await;

        let rewards = self.rewards.apply(&giveaway, &winners).await;
        log_reward_report(&giveaway.id, &rewards);

        Ok(EndResult { winners, rewards })
    }

    async fn load(&self, guild_id: GuildId, id: &GiveawayId) -> Result<Giveaway, GiveawayError> {
        match self.collaborators.repository.get(id).await {
            Ok(Some(giveaway)) if giveaway.guild_id == guild_id => Ok(giveaway),
            Ok(Some(giveaway)) => {
                debug!(
                    "Guild {} asked for giveaway {} which belongs to guild {}",
                    guild_id, id, giveaway.guild_id
                );
                Err(GiveawayError::NotFound(id.clone()))
            }
            Ok(None) => Err(GiveawayError::NotFound(id.clone())),
            Err(err) => {
                error!(
                    "Could not get giveaway {} from database. Failed with error: {}",
                    id, err
                );
                Err(GiveawayError::Persistence(err))
            }
        }
    }

    async fn sync_message(&self, giveaway: &Giveaway, presentation: &Presentation) {
        if let Err(err) = self
            .collaborators
            .messaging
            .update_announcement(giveaway.channel_id, giveaway.message_id, presentation)
            .await
        {
            error!(
                "Could not update giveaway message for giveaway {}. {}",
                giveaway.id,
                GiveawayError::Presentation(err)
            );
        }
    }
}
