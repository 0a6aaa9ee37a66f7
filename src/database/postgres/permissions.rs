use tracing::error;

use crate::models::{handler::Handler, permissions::Permission};

async fn fetch_permissions(handler: &Handler, query: &str, guild_id: i64, id: i64) -> Vec<Permission> {
    let permissions = match sqlx::query_scalar::<_, String>(query)
        .bind(guild_id)
        .bind(id)
        .fetch_all(&handler.main_database)
        .await
    {
        Ok(permissions) => permissions,
        Err(err) => {
            error!(
                "Attempted to query main database for guild {guild_id} permissions of {id}, failed with error: {err}",
            );
            return vec![];
        }
    };
    permissions
        .into_iter()
        .filter_map(|permission| permission.parse::<Permission>().ok())
        .collect()
}

pub async fn get_user_permissions(handler: &Handler, guild_id: i64, user_id: i64) -> Vec<Permission> {
    fetch_permissions(
        handler,
        "SELECT permission FROM users WHERE guild_id = $1 AND id = $2",
        guild_id,
        user_id,
    )
    .await
}

pub async fn get_role_permissions(handler: &Handler, guild_id: i64, role_id: i64) -> Vec<Permission> {
    fetch_permissions(
        handler,
        "SELECT permission FROM roles WHERE guild_id = $1 AND id = $2",
        guild_id,
        role_id,
    )
    .await
}
