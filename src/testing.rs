//! In-memory collaborators for exercising the giveaway engine without Discord
//! or Postgres.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};

use crate::{
    giveaway::{
        entries::EntryRegistry,
        lifecycle::LifecycleController,
        ports::{
            Capability, Clock, Collaborators, Eligibility, Entitlements, EntryHook,
            GiveawayRepository, Messaging, Notifications, PortResult, RevocationQueue,
            RoleManager, RoleRevocation,
        },
    },
    models::{
        error::CollaboratorError,
        giveaway::{Giveaway, GiveawayId, GiveawayStyle, NewGiveaway, RewardConfig},
        presentation::Presentation,
    },
};

pub const GUILD: u64 = 10;
pub const CHANNEL: u64 = 20;
pub const MESSAGE: u64 = 30;
pub const HOST: u64 = 40;

pub fn guild() -> GuildId {
    GuildId::new(GUILD)
}

pub fn start() -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp(1_767_268_800).unwrap()
}

fn unavailable(what: &str) -> CollaboratorError {
    CollaboratorError::Unavailable(format!("{what} is unavailable"))
}

pub fn giveaway(id: &str, entries: &[u64]) -> Giveaway {
    Giveaway {
        id: GiveawayId::from(id),
        guild_id: GuildId::new(GUILD),
        channel_id: ChannelId::new(CHANNEL),
        message_id: MessageId::new(MESSAGE),
        prize: "Nitro".to_string(),
        winner_count: 1,
        host_id: UserId::new(HOST),
        host_name: "host".to_string(),
        required_role_id: None,
        ends_at: start(),
        style: GiveawayStyle::default(),
        reward: RewardConfig::default(),
        entries: entries.iter().map(|id| UserId::new(*id)).collect(),
        ended: false,
        winners: Vec::new(),
        version: 0,
    }
}

pub fn new_request() -> NewGiveaway {
    NewGiveaway {
        guild_id: GuildId::new(GUILD),
        channel_id: ChannelId::new(CHANNEL),
        prize: "Nitro".to_string(),
        duration_minutes: 60,
        winner_count: 1,
        host_id: UserId::new(HOST),
        host_name: "host".to_string(),
        required_role_id: None,
        style: GiveawayStyle::default(),
        reward: RewardConfig::default(),
    }
}

pub fn users(ids: &[u64]) -> BTreeSet<UserId> {
    ids.iter().map(|id| UserId::new(*id)).collect()
}

#[derive(Default)]
pub struct MemoryRepository {
    pub records: Mutex<HashMap<GiveawayId, Giveaway>>,
    pub fail_writes: AtomicBool,
    /// Bumps the version right before the next entry write, simulating a
    /// concurrent toggle from another caller.
    pub interfere_once: AtomicBool,
    /// Ends the record with these winners right after the next entry write
    /// lands, as if an end committed in between.
    pub end_after_entry_write: Mutex<Option<Vec<UserId>>>,
    /// Ends the record right before the next `mark_ended`, so that caller
    /// loses the race.
    pub end_before_mark: AtomicBool,
}

impl MemoryRepository {
    pub fn insert(&self, giveaway: Giveaway) {
        self.records
            .lock()
            .unwrap()
            .insert(giveaway.id.clone(), giveaway);
    }

    pub fn stored(&self, id: &str) -> Giveaway {
        self.records
            .lock()
            .unwrap()
            .get(&GiveawayId::from(id))
            .cloned()
            .unwrap()
    }

    fn check_writable(&self) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("database"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GiveawayRepository for MemoryRepository {
    async fn create(&self, giveaway: &Giveaway) -> PortResult<()> {
        self.check_writable()?;
        self.insert(giveaway.clone());
        Ok(())
    }

    async fn get(&self, id: &GiveawayId) -> PortResult<Option<Giveaway>> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn list_due_active(
        &self,
        now: time::OffsetDateTime,
        limit: u32,
    ) -> PortResult<Vec<Giveaway>> {
        let mut due = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|giveaway| !giveaway.ended && giveaway.ends_at <= now)
            .cloned()
            .collect::<Vec<_>>();
        due.sort_by_key(|giveaway| giveaway.ends_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn update_entries(
        &self,
        id: &GiveawayId,
        entries: &BTreeSet<UserId>,
        expected_version: i64,
    ) -> PortResult<bool> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(id) else {
            return Ok(false);
        };
        if self.interfere_once.swap(false, Ordering::SeqCst) {
            record.version += 1;
        }
        if record.ended || record.version != expected_version {
            return Ok(false);
        }
        record.entries = entries.clone();
        record.version += 1;
        if let Some(winners) = self.end_after_entry_write.lock().unwrap().take() {
            record.ended = true;
            record.winners = winners;
            record.version += 1;
        }
        Ok(true)
    }

    async fn mark_ended(&self, id: &GiveawayId, winners: &[UserId]) -> PortResult<bool> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        if self.end_before_mark.swap(false, Ordering::SeqCst) {
            if let Some(record) = records.get_mut(id) {
                record.ended = true;
                record.version += 1;
            }
        }
        match records.get_mut(id) {
            Some(record) if !record.ended => {
                record.ended = true;
                record.winners = winners.to_vec();
                record.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace_winners(&self, id: &GiveawayId, winners: &[UserId]) -> PortResult<bool> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        match records.get_mut(id) {
            Some(record) if record.ended => {
                record.winners = winners.to_vec();
                record.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Stands in for every Discord-facing port and records what was asked of it.
pub struct FakeDiscord {
    next_message: AtomicU64,
    pub sent: Mutex<Vec<(ChannelId, Presentation)>>,
    pub updates: Mutex<Vec<(ChannelId, MessageId, Presentation)>>,
    pub directs: Mutex<Vec<(UserId, String)>>,
    pub channel_posts: Mutex<Vec<(ChannelId, String)>>,
    pub roles_added: Mutex<Vec<(UserId, RoleId)>>,
    pub roles_removed: Mutex<Vec<(UserId, RoleId)>>,
    pub member_roles: Mutex<HashMap<UserId, Vec<RoleId>>>,
    pub fail_send: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_direct: Mutex<HashSet<UserId>>,
    pub fail_role: Mutex<HashSet<UserId>>,
    pub unreachable_channels: Mutex<HashSet<ChannelId>>,
}

impl Default for FakeDiscord {
    fn default() -> Self {
        FakeDiscord {
            next_message: AtomicU64::new(MESSAGE),
            sent: Mutex::default(),
            updates: Mutex::default(),
            directs: Mutex::default(),
            channel_posts: Mutex::default(),
            roles_added: Mutex::default(),
            roles_removed: Mutex::default(),
            member_roles: Mutex::default(),
            fail_send: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_direct: Mutex::default(),
            fail_role: Mutex::default(),
            unreachable_channels: Mutex::default(),
        }
    }
}

impl FakeDiscord {
    pub fn give_role(&self, user: u64, role: u64) {
        self.member_roles
            .lock()
            .unwrap()
            .entry(UserId::new(user))
            .or_default()
            .push(RoleId::new(role));
    }

    pub fn notification_count(&self) -> usize {
        self.directs.lock().unwrap().len() + self.channel_posts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Messaging for FakeDiscord {
    async fn send_announcement(
        &self,
        channel_id: ChannelId,
        presentation: &Presentation,
    ) -> PortResult<MessageId> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(unavailable("channel"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id, presentation.clone()));
        Ok(MessageId::new(self.next_message.fetch_add(1, Ordering::SeqCst)))
    }

    async fn update_announcement(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        presentation: &Presentation,
    ) -> PortResult<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(unavailable("message"));
        }
        self.updates
            .lock()
            .unwrap()
            .push((channel_id, message_id, presentation.clone()));
        Ok(())
    }

    async fn guild_name(&self, _guild_id: GuildId) -> PortResult<Option<String>> {
        Ok(Some("Test Guild".to_string()))
    }
}

#[async_trait::async_trait]
impl Notifications for FakeDiscord {
    async fn send_direct(&self, user_id: UserId, content: &str) -> PortResult<()> {
        if self.fail_direct.lock().unwrap().contains(&user_id) {
            return Err(unavailable("direct messages"));
        }
        self.directs
            .lock()
            .unwrap()
            .push((user_id, content.to_string()));
        Ok(())
    }

    async fn send_to_channel(&self, channel_id: ChannelId, content: &str) -> PortResult<()> {
        if self.unreachable_channels.lock().unwrap().contains(&channel_id) {
            return Err(unavailable("channel"));
        }
        self.channel_posts
            .lock()
            .unwrap()
            .push((channel_id, content.to_string()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl Eligibility for FakeDiscord {
    async fn member_has_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PortResult<bool> {
        Ok(self
            .member_roles
            .lock()
            .unwrap()
            .get(&user_id)
            .is_some_and(|roles| roles.contains(&role_id)))
    }
}

#[async_trait::async_trait]
impl RoleManager for FakeDiscord {
    async fn add_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        _reason: &str,
    ) -> PortResult<()> {
        if self.fail_role.lock().unwrap().contains(&user_id) {
            return Err(unavailable("member"));
        }
        self.roles_added.lock().unwrap().push((user_id, role_id));
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        _reason: &str,
    ) -> PortResult<()> {
        self.roles_removed.lock().unwrap().push((user_id, role_id));
        Ok(())
    }
}

pub struct FakeEntitlements {
    pub allowed: AtomicBool,
    pub fail: AtomicBool,
}

impl Default for FakeEntitlements {
    fn default() -> Self {
        FakeEntitlements {
            allowed: AtomicBool::new(true),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl Entitlements for FakeEntitlements {
    async fn has_capability(
        &self,
        _guild_id: GuildId,
        _capability: Capability,
    ) -> PortResult<bool> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("entitlements"));
        }
        Ok(self.allowed.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct RecordingHook {
    pub joins: Mutex<Vec<UserId>>,
    pub fail: AtomicBool,
}

#[async_trait::async_trait]
impl EntryHook for RecordingHook {
    async fn on_join(&self, _giveaway: &Giveaway, user_id: UserId) -> PortResult<()> {
        self.joins.lock().unwrap().push(user_id);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("progress tracker"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRevocations {
    pub jobs: Mutex<Vec<RoleRevocation>>,
}

#[async_trait::async_trait]
impl RevocationQueue for MemoryRevocations {
    async fn schedule(&self, revocation: &RoleRevocation) -> PortResult<()> {
        self.jobs.lock().unwrap().push(revocation.clone());
        Ok(())
    }

    async fn take_due(
        &self,
        now: time::OffsetDateTime,
        limit: u32,
    ) -> PortResult<Vec<RoleRevocation>> {
        let mut jobs = self.jobs.lock().unwrap();
        let mut due = Vec::new();
        let mut index = 0;
        while index < jobs.len() && due.len() < limit as usize {
            if jobs[index].due_at <= now {
                due.push(jobs.remove(index));
            } else {
                index += 1;
            }
        }
        Ok(due)
    }
}

pub struct ManualClock {
    now: Mutex<time::OffsetDateTime>,
}

impl ManualClock {
    pub fn advance(&self, by: time::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock {
            now: Mutex::new(start()),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> time::OffsetDateTime {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct Harness {
    pub repository: Arc<MemoryRepository>,
    pub discord: Arc<FakeDiscord>,
    pub entitlements: Arc<FakeEntitlements>,
    pub hook: Arc<RecordingHook>,
    pub revocations: Arc<MemoryRevocations>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            repository: self.repository.clone(),
            messaging: self.discord.clone(),
            notifications: self.discord.clone(),
            eligibility: self.discord.clone(),
            entitlements: self.entitlements.clone(),
            roles: self.discord.clone(),
            entry_hook: self.hook.clone(),
            revocations: self.revocations.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn controller(&self) -> LifecycleController {
        LifecycleController::new(self.collaborators())
    }

    pub fn registry(&self) -> EntryRegistry {
        EntryRegistry::new(self.collaborators())
    }
}
