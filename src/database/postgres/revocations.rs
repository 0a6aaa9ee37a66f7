use serenity::all::{GuildId, RoleId, UserId};
use sqlx::PgPool;

use crate::{
    giveaway::ports::{PortResult, RevocationQueue, RoleRevocation},
    models::giveaway::GiveawayId,
};

#[derive(sqlx::FromRow)]
struct DatabaseRevocation {
    giveaway_id: String,
    guild_id: i64,
    user_id: i64,
    role_id: i64,
    due_at: time::OffsetDateTime,
}

impl From<DatabaseRevocation> for RoleRevocation {
    fn from(value: DatabaseRevocation) -> Self {
        RoleRevocation {
            giveaway_id: GiveawayId::from(value.giveaway_id),
            guild_id: GuildId::new(value.guild_id as u64),
            user_id: UserId::new(value.user_id as u64),
            role_id: RoleId::new(value.role_id as u64),
            due_at: value.due_at,
        }
    }
}

/// Reward role revocations kept in Postgres so they survive restarts.
pub struct PostgresRevocations {
    pub main_database: PgPool,
}

impl PostgresRevocations {
    pub fn new(main_database: PgPool) -> Self {
        PostgresRevocations { main_database }
    }
}

#[async_trait::async_trait]
impl RevocationQueue for PostgresRevocations {
    async fn schedule(&self, revocation: &RoleRevocation) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO role_revocations (giveaway_id, guild_id, user_id, role_id, due_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(revocation.giveaway_id.as_str())
        .bind(revocation.guild_id.get() as i64)
        .bind(revocation.user_id.get() as i64)
        .bind(revocation.role_id.get() as i64)
        .bind(revocation.due_at)
        .execute(&self.main_database)
        .await?;
        Ok(())
    }

    async fn take_due(
        &self,
        now: time::OffsetDateTime,
        limit: u32,
    ) -> PortResult<Vec<RoleRevocation>> {
        let rows = sqlx::query_as::<_, DatabaseRevocation>(
            "DELETE FROM role_revocations WHERE id IN (SELECT id FROM role_revocations WHERE due_at <= $1 ORDER BY due_at LIMIT $2 FOR UPDATE SKIP LOCKED) RETURNING giveaway_id, guild_id, user_id, role_id, due_at",
        )
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.main_database)
        .await?;
        Ok(rows.into_iter().map(RoleRevocation::from).collect())
    }
}
