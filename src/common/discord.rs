use std::sync::Arc;

use serenity::{
    all::{ButtonStyle, ChannelId, GuildId, MessageId, RoleId, UserId},
    builder::{
        CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage,
        EditMessage,
    },
    http::Http,
};
use tracing::debug;

use crate::{
    giveaway::ports::{Eligibility, Messaging, Notifications, PortResult, RoleManager},
    models::presentation::Presentation,
};

fn generate_embed(presentation: &Presentation) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&presentation.title)
        .description(&presentation.description)
        .color(presentation.color);
    if let Some(footer) = &presentation.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(image_url) = &presentation.image_url {
        embed = embed.image(image_url);
    }
    if let Some(thumbnail_url) = &presentation.thumbnail_url {
        embed = embed.thumbnail(thumbnail_url);
    }
    embed
}

fn generate_components(presentation: &Presentation) -> Vec<CreateActionRow> {
    match &presentation.button {
        Some(button) => vec![CreateActionRow::Buttons(vec![CreateButton::new(
            &button.custom_id,
        )
        .label(&button.label)
        .style(ButtonStyle::Primary)
        .disabled(button.disabled)])],
        None => vec![],
    }
}

/// Serves the engine's Discord-facing ports over the REST API.
#[derive(Clone)]
pub struct DiscordGateway {
    pub http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordGateway { http }
    }
}

#[async_trait::async_trait]
impl Messaging for DiscordGateway {
    async fn send_announcement(
        &self,
        channel_id: ChannelId,
        presentation: &Presentation,
    ) -> PortResult<MessageId> {
        let message = channel_id
            .send_message(
                &self.http,
                CreateMessage::new()
                    .embed(generate_embed(presentation))
                    .components(generate_components(presentation)),
            )
            .await?;
        Ok(message.id)
    }

    async fn update_announcement(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        presentation: &Presentation,
    ) -> PortResult<()> {
        channel_id
            .edit_message(
                &self.http,
                message_id,
                EditMessage::new()
                    .embed(generate_embed(presentation))
                    .components(generate_components(presentation)),
            )
            .await?;
        Ok(())
    }

    async fn guild_name(&self, guild_id: GuildId) -> PortResult<Option<String>> {
        let guild = guild_id.to_partial_guild(&self.http).await?;
        Ok(Some(guild.name))
    }
}

#[async_trait::async_trait]
impl Notifications for DiscordGateway {
    async fn send_direct(&self, user_id: UserId, content: &str) -> PortResult<()> {
        user_id
            .direct_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn send_to_channel(&self, channel_id: ChannelId, content: &str) -> PortResult<()> {
        channel_id
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Eligibility for DiscordGateway {
    async fn member_has_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PortResult<bool> {
        let member = guild_id.member(&self.http, user_id).await?;
        debug!(
            "Member {} of guild {} holds {} role(s)",
            user_id,
            guild_id,
            member.roles.len()
        );
        Ok(member.roles.contains(&role_id))
    }
}

#[async_trait::async_trait]
impl RoleManager for DiscordGateway {
    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> PortResult<()> {
        self.http
            .add_member_role(guild_id, user_id, role_id, Some(reason))
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> PortResult<()> {
        self.http
            .remove_member_role(guild_id, user_id, role_id, Some(reason))
            .await?;
        Ok(())
    }
}
