use std::{collections::BTreeSet, sync::Arc};

use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};
use tracing::debug;

use crate::models::{
    error::CollaboratorError,
    giveaway::{Giveaway, GiveawayId},
    presentation::Presentation,
};

pub type PortResult<T> = Result<T, CollaboratorError>;

/// Storage for giveaway records. Writes that change lifecycle state are
/// conditional and report whether they applied.
#[async_trait::async_trait]
pub trait GiveawayRepository: Send + Sync {
    async fn create(&self, giveaway: &Giveaway) -> PortResult<()>;
    async fn get(&self, id: &GiveawayId) -> PortResult<Option<Giveaway>>;
    async fn list_due_active(
        &self,
        now: time::OffsetDateTime,
        limit: u32,
    ) -> PortResult<Vec<Giveaway>>;
    /// Only applies while the giveaway is active and still at `expected_version`.
    async fn update_entries(
        &self,
        id: &GiveawayId,
        entries: &BTreeSet<UserId>,
        expected_version: i64,
    ) -> PortResult<bool>;
    /// Sets `ended = true` and the winners, only if the giveaway has not ended.
    async fn mark_ended(&self, id: &GiveawayId, winners: &[UserId]) -> PortResult<bool>;
    /// Overwrites the winners of an ended giveaway.
    async fn replace_winners(&self, id: &GiveawayId, winners: &[UserId]) -> PortResult<bool>;
}

#[async_trait::async_trait]
pub trait Messaging: Send + Sync {
    async fn send_announcement(
        &self,
        channel_id: ChannelId,
        presentation: &Presentation,
    ) -> PortResult<MessageId>;
    async fn update_announcement(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        presentation: &Presentation,
    ) -> PortResult<()>;
    async fn guild_name(&self, guild_id: GuildId) -> PortResult<Option<String>>;
}

#[async_trait::async_trait]
pub trait Notifications: Send + Sync {
    async fn send_direct(&self, user_id: UserId, content: &str) -> PortResult<()>;
    async fn send_to_channel(&self, channel_id: ChannelId, content: &str) -> PortResult<()>;
}

#[async_trait::async_trait]
pub trait Eligibility: Send + Sync {
    async fn member_has_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PortResult<bool>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Giveaways,
}

#[async_trait::async_trait]
pub trait Entitlements: Send + Sync {
    async fn has_capability(&self, guild_id: GuildId, capability: Capability) -> PortResult<bool>;
}

#[async_trait::async_trait]
pub trait RoleManager: Send + Sync {
    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> PortResult<()>;
    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> PortResult<()>;
}

/// Progress tracking invoked when someone joins a giveaway.
#[async_trait::async_trait]
pub trait EntryHook: Send + Sync {
    async fn on_join(&self, giveaway: &Giveaway, user_id: UserId) -> PortResult<()>;
}

pub struct NoopEntryHook;

#[async_trait::async_trait]
impl EntryHook for NoopEntryHook {
    async fn on_join(&self, giveaway: &Giveaway, user_id: UserId) -> PortResult<()> {
        debug!("User {} joined giveaway {}", user_id, giveaway.id);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleRevocation {
    pub giveaway_id: GiveawayId,
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub due_at: time::OffsetDateTime,
}

/// Delayed jobs that take reward roles back once they are due.
#[async_trait::async_trait]
pub trait RevocationQueue: Send + Sync {
    async fn schedule(&self, revocation: &RoleRevocation) -> PortResult<()>;
    /// Claims up to `limit` revocations due at `now`. Claimed jobs are removed.
    async fn take_due(
        &self,
        now: time::OffsetDateTime,
        limit: u32,
    ) -> PortResult<Vec<RoleRevocation>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> time::OffsetDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> time::OffsetDateTime {
        time::OffsetDateTime::now_utc()
    }
}

/// The outside systems the giveaway engine is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub repository: Arc<dyn GiveawayRepository>,
    pub messaging: Arc<dyn Messaging>,
    pub notifications: Arc<dyn Notifications>,
    pub eligibility: Arc<dyn Eligibility>,
    pub entitlements: Arc<dyn Entitlements>,
    pub roles: Arc<dyn RoleManager>,
    pub entry_hook: Arc<dyn EntryHook>,
    pub revocations: Arc<dyn RevocationQueue>,
    pub clock: Arc<dyn Clock>,
}
