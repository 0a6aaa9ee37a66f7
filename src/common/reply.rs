use std::sync::atomic::Ordering;

use serenity::{
    all::{CommandInteraction, ComponentInteraction},
    builder::{
        CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
        EditInteractionResponse,
    },
    http::Http,
};
use tracing::{debug, error};

use crate::models::{
    command::{CommandContext, CommandContextReply, FailedCommandContext},
    response::{Response, ResponseError, ResponseResult},
};

fn create_message(response: Response) -> CreateInteractionResponseMessage {
    let mut reply = CreateInteractionResponseMessage::new();
    if let Some(content) = response.content {
        reply = reply.content(content);
    }
    if let Some(embeds) = response.embeds {
        reply = reply.embeds(embeds);
    }
    if let Some(components) = response.components {
        reply = reply.components(components);
    }
    if response.ephemeral {
        reply = reply.ephemeral(true);
    }
    reply
}

fn edit_message(response: Response) -> EditInteractionResponse {
    let mut edit = EditInteractionResponse::new();
    if let Some(content) = response.content {
        edit = edit.content(content);
    }
    if let Some(embeds) = response.embeds {
        edit = edit.embeds(embeds);
    }
    if let Some(components) = response.components {
        edit = edit.components(components);
    }
    edit
}

/// Red embed shown to users whose request was rejected.
pub fn error_response(err: &ResponseError) -> Response {
    let embed = match err {
        ResponseError::Execution(title, description) => {
            let embed = CreateEmbed::new().title(*title).color(0xff0000);
            match description {
                Some(description) => embed.description(description),
                None => embed,
            }
        }
        ResponseError::Serenity(_) => CreateEmbed::new()
            .title("Discord could not complete this request")
            .description("Please try again later")
            .color(0xff0000),
    };
    Response::new().embed(embed).ephemeral(true)
}

#[async_trait::async_trait]
impl CommandContextReply for CommandContext {
    async fn reply(&self, cmd: &CommandInteraction, response: Response) -> ResponseResult {
        let start = std::time::Instant::now();
        if self.has_responsed.load(Ordering::Relaxed) {
            if let Err(err) = cmd.edit_response(&self.ctx.http, edit_message(response)).await {
                error!("Attempted to edit a response to a command, failed with error: {err}");
                return Err(ResponseError::Serenity(err));
            }
        } else {
            if let Err(err) = cmd
                .create_response(
                    &self.ctx.http,
                    CreateInteractionResponse::Message(create_message(response)),
                )
                .await
            {
                error!("Attempted to create a response to a command, failed with error: {err}");
                return Err(ResponseError::Serenity(err));
            }
            self.has_responsed.store(true, Ordering::Relaxed);
        }
        debug!("Took {:?} to reply to a command", start.elapsed());
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommandContextReply for FailedCommandContext {
    async fn reply(&self, cmd: &CommandInteraction, response: Response) -> ResponseResult {
        if let Err(err) = cmd
            .create_response(
                &self.ctx.http,
                CreateInteractionResponse::Message(create_message(response)),
            )
            .await
        {
            error!("Attempted to create a response to a command, failed with error: {err}");
            return Err(ResponseError::Serenity(err));
        }
        Ok(())
    }
}

pub async fn reply_to_component(
    http: &Http,
    interaction: &ComponentInteraction,
    response: Response,
) -> ResponseResult {
    if let Err(err) = interaction
        .create_response(
            http,
            CreateInteractionResponse::Message(create_message(response)),
        )
        .await
    {
        error!("Attempted to respond to a button press, failed with error: {err}");
        return Err(ResponseError::Serenity(err));
    }
    Ok(())
}
