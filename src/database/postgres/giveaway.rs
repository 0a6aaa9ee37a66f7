use std::collections::BTreeSet;

use serenity::all::UserId;
use sqlx::PgPool;
use tracing::debug;

use crate::{
    giveaway::ports::{GiveawayRepository, PortResult},
    models::giveaway::{user_ids_to_database, DatabaseGiveaway, Giveaway, GiveawayId},
};

pub struct PostgresGiveaways {
    pub main_database: PgPool,
}

impl PostgresGiveaways {
    pub fn new(main_database: PgPool) -> Self {
        PostgresGiveaways { main_database }
    }
}

#[async_trait::async_trait]
impl GiveawayRepository for PostgresGiveaways {
    async fn create(&self, giveaway: &Giveaway) -> PortResult<()> {
        let row = DatabaseGiveaway::from(giveaway.clone());
        sqlx::query(
            "INSERT INTO giveaways (id, guild_id, channel_id, message_id, prize, winner_count, host_id, host_name, required_role_id, ends_at, title, description, color, footer, image_url, thumbnail_url, button_label, ended_button_label, reward_role_id, reward_role_remove_after_minutes, reward_dm_message, reward_channel_id, reward_channel_message_template, entries, ended, winners, version) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)",
        )
        .bind(row.id)
        .bind(row.guild_id)
        .bind(row.channel_id)
        .bind(row.message_id)
        .bind(row.prize)
        .bind(row.winner_count)
        .bind(row.host_id)
        .bind(row.host_name)
        .bind(row.required_role_id)
        .bind(row.ends_at)
        .bind(row.title)
        .bind(row.description)
        .bind(row.color)
        .bind(row.footer)
        .bind(row.image_url)
        .bind(row.thumbnail_url)
        .bind(row.button_label)
        .bind(row.ended_button_label)
        .bind(row.reward_role_id)
        .bind(row.reward_role_remove_after_minutes)
        .bind(row.reward_dm_message)
        .bind(row.reward_channel_id)
        .bind(row.reward_channel_message_template)
        .bind(row.entries)
        .bind(row.ended)
        .bind(row.winners)
        .bind(row.version)
        .execute(&self.main_database)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &GiveawayId) -> PortResult<Option<Giveaway>> {
        debug!("Querying main database for giveaway {id}");
        let row = sqlx::query_as::<_, DatabaseGiveaway>("SELECT * FROM giveaways WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.main_database)
            .await?;
        Ok(row.map(Giveaway::from))
    }

    async fn list_due_active(
        &self,
        now: time::OffsetDateTime,
        limit: u32,
    ) -> PortResult<Vec<Giveaway>> {
        let rows = sqlx::query_as::<_, DatabaseGiveaway>(
            "SELECT * FROM giveaways WHERE ended = false AND ends_at <= $1 ORDER BY ends_at LIMIT $2",
        )
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.main_database)
        .await?;
        Ok(rows.into_iter().map(Giveaway::from).collect())
    }

    async fn update_entries(
        &self,
        id: &GiveawayId,
        entries: &BTreeSet<UserId>,
        expected_version: i64,
    ) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE giveaways SET entries = $2, version = version + 1 WHERE id = $1 AND ended = false AND version = $3",
        )
        .bind(id.as_str())
        .bind(user_ids_to_database(entries.iter()))
        .bind(expected_version)
        .execute(&self.main_database)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_ended(&self, id: &GiveawayId, winners: &[UserId]) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE giveaways SET ended = true, winners = $2, version = version + 1 WHERE id = $1 AND ended = false",
        )
        .bind(id.as_str())
        .bind(user_ids_to_database(winners.iter()))
        .execute(&self.main_database)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn replace_winners(&self, id: &GiveawayId, winners: &[UserId]) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE giveaways SET winners = $2, version = version + 1 WHERE id = $1 AND ended = true",
        )
        .bind(id.as_str())
        .bind(user_ids_to_database(winners.iter()))
        .execute(&self.main_database)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
