use serenity::{all::CommandInteraction, builder::CreateEmbed};

use crate::{
    common::options::Options,
    models::{
        command::{CommandContext, CommandContextReply},
        handler::Handler,
        presentation::mention_all,
        response::{Response, ResponseResult},
    },
};

use super::parse_id;

pub async fn end(
    handler: &Handler,
    ctx: &CommandContext,
    cmd: &CommandInteraction,
) -> ResponseResult {
    let options = Options {
        options: cmd.data.options(),
    };
    let id = parse_id(options.get_string("id"))?;

    let result = handler.giveaways.end(ctx.guild_id, &id, false).await?;

    ctx.reply(
        cmd,
        Response::new()
            .embed(
                CreateEmbed::new()
                    .title("Successfully ended giveaway")
                    .description(if result.winners.is_empty() {
                        "No one entered, so there are no winners.".to_string()
                    } else {
                        format!("Winners: {}", mention_all(&result.winners))
                    })
                    .color(0x4752c4),
            )
            .ephemeral(true),
    )
    .await
}
