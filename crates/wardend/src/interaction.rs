use anyhow::{Context as _, Result};
use serenity::all::{
    ChannelId, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse, GuildId,
};
use tracing::{error, info, warn};
use warden_core::{best_effort, BotCommand, Reply};

pub async fn handle_command(ctx: &Context, command: &CommandInteraction) {
    let Some(cmd) = BotCommand::parse(&command.data.name) else {
        warn!(name = %command.data.name, "unknown command");
        return;
    };
    info!(command = cmd.name(), user = %command.user.id, "command received");

    let reply = match execute(ctx, command, cmd).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(command = cmd.name(), "command failed: {err:#}");
            Reply::failed()
        }
    };

    if let Err(err) = respond(ctx, command, &reply).await {
        error!(command = cmd.name(), %err, "interaction response failed");
        let edit = EditInteractionResponse::new().content(Reply::failed().text);
        best_effort("edit interaction response", command.edit_response(&ctx.http, edit)).await;
    }
}

async fn execute(ctx: &Context, command: &CommandInteraction, cmd: BotCommand) -> Result<Reply> {
    match cmd {
        BotCommand::Ping => Ok(Reply::pong()),
        BotCommand::Join => {
            let Some(guild_id) = command.guild_id else {
                return Ok(Reply::not_in_voice());
            };
            let Some(channel_id) = voice_channel_of(ctx, guild_id, command) else {
                return Ok(Reply::not_in_voice());
            };
            let manager = songbird::get(ctx).await.context("voice manager not registered")?;
            manager
                .join_gateway(guild_id, channel_id)
                .await
                .context("join voice channel")?;
            info!(guild = %guild_id, channel = %channel_id, "joined voice channel");
            Ok(Reply::joined())
        }
        BotCommand::Leave => {
            let Some(guild_id) = command.guild_id else {
                return Ok(Reply::not_connected());
            };
            let manager = songbird::get(ctx).await.context("voice manager not registered")?;
            if manager.get(guild_id).is_none() {
                return Ok(Reply::not_connected());
            }
            manager.remove(guild_id).await.context("leave voice channel")?;
            info!(guild = %guild_id, "left voice channel");
            Ok(Reply::left())
        }
    }
}

fn voice_channel_of(ctx: &Context, guild_id: GuildId, command: &CommandInteraction) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&command.user.id)
        .and_then(|state| state.channel_id)
}

async fn respond(ctx: &Context, command: &CommandInteraction, reply: &Reply) -> serenity::Result<()> {
    let message = CreateInteractionResponseMessage::new()
        .content(reply.text.clone())
        .ephemeral(reply.ephemeral);
    command
        .create_response(ctx, CreateInteractionResponse::Message(message))
        .await
}
