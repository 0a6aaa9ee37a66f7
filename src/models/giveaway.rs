use std::{collections::BTreeSet, fmt};

use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};

use super::error::{CollaboratorError, GiveawayError};

/// Opaque, stable identifier of a giveaway record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GiveawayId(String);

impl GiveawayId {
    pub fn generate() -> Result<Self, GiveawayError> {
        match objectid::ObjectId::new() {
            Ok(oid) => Ok(GiveawayId(oid.to_string())),
            Err(_) => Err(GiveawayError::Persistence(CollaboratorError::Unavailable(
                "could not generate a giveaway id".to_string(),
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GiveawayId {
    fn from(value: String) -> Self {
        GiveawayId(value)
    }
}

impl From<&str> for GiveawayId {
    fn from(value: &str) -> Self {
        GiveawayId(value.to_string())
    }
}

impl fmt::Display for GiveawayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Embed presentation passed through to the rendered announcement untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GiveawayStyle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub footer: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub button_label: Option<String>,
    pub ended_button_label: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardConfig {
    pub role_id: Option<RoleId>,
    pub role_remove_after_minutes: Option<u32>,
    pub dm_message: Option<String>,
    pub channel_id: Option<ChannelId>,
    pub channel_message_template: Option<String>,
}

impl RewardConfig {
    /// Minutes after which a granted reward role is taken back, if any.
    pub fn revoke_after(&self) -> Option<u32> {
        self.role_remove_after_minutes.filter(|minutes| *minutes > 0)
    }
}

/// Everything needed to start a giveaway.
#[derive(Clone, Debug)]
pub struct NewGiveaway {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub prize: String,
    pub duration_minutes: u32,
    pub winner_count: u32,
    pub host_id: UserId,
    pub host_name: String,
    pub required_role_id: Option<RoleId>,
    pub style: GiveawayStyle,
    pub reward: RewardConfig,
}

#[derive(Clone, Debug)]
pub struct Giveaway {
    pub id: GiveawayId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub prize: String,
    pub winner_count: u32,
    pub host_id: UserId,
    pub host_name: String,
    pub required_role_id: Option<RoleId>,
    pub ends_at: time::OffsetDateTime,
    pub style: GiveawayStyle,
    pub reward: RewardConfig,
    pub entries: BTreeSet<UserId>,
    pub ended: bool,
    pub winners: Vec<UserId>,
    pub version: i64,
}

impl Giveaway {
    pub fn jump_link(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}/{}",
            self.guild_id, self.channel_id, self.message_id
        )
    }
}

#[derive(sqlx::FromRow)]
pub struct DatabaseGiveaway {
    pub id: String,
    pub guild_id: i64,
    pub channel_id: i64,
    pub message_id: i64,
    pub prize: String,
    pub winner_count: i32,
    pub host_id: i64,
    pub host_name: String,
    pub required_role_id: Option<i64>,
    pub ends_at: time::OffsetDateTime,
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<i64>,
    pub footer: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub button_label: Option<String>,
    pub ended_button_label: Option<String>,
    pub reward_role_id: Option<i64>,
    pub reward_role_remove_after_minutes: Option<i32>,
    pub reward_dm_message: Option<String>,
    pub reward_channel_id: Option<i64>,
    pub reward_channel_message_template: Option<String>,
    pub entries: Vec<i64>,
    pub ended: bool,
    pub winners: Vec<i64>,
    pub version: i64,
}

impl From<DatabaseGiveaway> for Giveaway {
    fn from(value: DatabaseGiveaway) -> Self {
        Giveaway {
            id: GiveawayId(value.id),
            guild_id: GuildId::new(value.guild_id as u64),
            channel_id: ChannelId::new(value.channel_id as u64),
            message_id: MessageId::new(value.message_id as u64),
            prize: value.prize,
            winner_count: u32::try_from(value.winner_count).unwrap_or(1).max(1),
            host_id: UserId::new(value.host_id as u64),
            host_name: value.host_name,
            required_role_id: value.required_role_id.map(|id| RoleId::new(id as u64)),
            ends_at: value.ends_at,
            style: GiveawayStyle {
                title: value.title,
                description: value.description,
                color: value.color.and_then(|color| u32::try_from(color).ok()),
                footer: value.footer,
                image_url: value.image_url,
                thumbnail_url: value.thumbnail_url,
                button_label: value.button_label,
                ended_button_label: value.ended_button_label,
            },
            reward: RewardConfig {
                role_id: value.reward_role_id.map(|id| RoleId::new(id as u64)),
                role_remove_after_minutes: value
                    .reward_role_remove_after_minutes
                    .and_then(|minutes| u32::try_from(minutes).ok()),
                dm_message: value.reward_dm_message,
                channel_id: value.reward_channel_id.map(|id| ChannelId::new(id as u64)),
                channel_message_template: value.reward_channel_message_template,
            },
            entries: value
                .entries
                .into_iter()
                .map(|id| UserId::new(id as u64))
                .collect(),
            ended: value.ended,
            winners: value
                .winners
                .into_iter()
                .map(|id| UserId::new(id as u64))
                .collect(),
            version: value.version,
        }
    }
}

impl From<Giveaway> for DatabaseGiveaway {
    fn from(value: Giveaway) -> Self {
        DatabaseGiveaway {
            id: value.id.0,
            guild_id: value.guild_id.get() as i64,
            channel_id: value.channel_id.get() as i64,
            message_id: value.message_id.get() as i64,
            prize: value.prize,
            winner_count: i32::try_from(value.winner_count).unwrap_or(i32::MAX),
            host_id: value.host_id.get() as i64,
            host_name: value.host_name,
            required_role_id: value.required_role_id.map(|id| id.get() as i64),
            ends_at: value.ends_at,
            title: value.style.title,
            description: value.style.description,
            color: value.style.color.map(i64::from),
            footer: value.style.footer,
            image_url: value.style.image_url,
            thumbnail_url: value.style.thumbnail_url,
            button_label: value.style.button_label,
            ended_button_label: value.style.ended_button_label,
            reward_role_id: value.reward.role_id.map(|id| id.get() as i64),
            reward_role_remove_after_minutes: value
                .reward
                .role_remove_after_minutes
                .map(|minutes| i32::try_from(minutes).unwrap_or(i32::MAX)),
            reward_dm_message: value.reward.dm_message,
            reward_channel_id: value.reward.channel_id.map(|id| id.get() as i64),
            reward_channel_message_template: value.reward.channel_message_template,
            entries: user_ids_to_database(value.entries.iter()),
            ended: value.ended,
            winners: user_ids_to_database(value.winners.iter()),
            version: value.version,
        }
    }
}

pub fn user_ids_to_database<'a>(ids: impl Iterator<Item = &'a UserId>) -> Vec<i64> {
    ids.map(|id| id.get() as i64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_revocation_ignores_zero_minutes() {
        let mut reward = RewardConfig::default();
        assert_eq!(reward.revoke_after(), None);

        reward.role_remove_after_minutes = Some(0);
        assert_eq!(reward.revoke_after(), None);

        reward.role_remove_after_minutes = Some(60);
        assert_eq!(reward.revoke_after(), Some(60));
    }

    #[test]
    fn database_row_keeps_entries_and_winners() {
        let giveaway = crate::testing::giveaway("row", &[1, 2, 3]);
        let mut row = DatabaseGiveaway::from(giveaway.clone());
        row.winners = vec![2];
        row.ended = true;

        let restored = Giveaway::from(row);
        assert_eq!(restored.entries, giveaway.entries);
        assert_eq!(restored.winners, vec![UserId::new(2)]);
        assert!(restored.ended);
        assert_eq!(restored.message_id, giveaway.message_id);
    }
}
