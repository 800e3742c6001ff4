use serenity::all::{
    ActivityData, Context, CreateCommand, CreateMessage, EventHandler, GuildId, Interaction,
    Member, Message, OnlineStatus, Ready, UserId,
};
use serenity::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warden_core::util::mention;
use warden_core::{best_effort, BotCommand, Mentioned, Screening};

use crate::interaction;
use crate::state::BotState;

pub struct Handler {
    pub state: Arc<BotState>,
}

impl Handler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }

    async fn register_commands(&self, ctx: &Context, guild_id: GuildId) {
        let commands = BotCommand::ALL
            .into_iter()
            .map(|cmd| CreateCommand::new(cmd.name()).description(cmd.description()))
            .collect::<Vec<_>>();
        match guild_id.set_commands(&ctx.http, commands).await {
            Ok(registered) => {
                info!(guild = %guild_id, count = registered.len(), "slash commands registered")
            }
            Err(err) => error!(guild = %guild_id, %err, "command registration failed"),
        }
    }

    async fn is_admin(&self, ctx: &Context, msg: &Message) -> bool {
        let Some(guild_id) = msg.guild_id else {
            return false;
        };
        let member = match msg.member(ctx).await {
            Ok(member) => member,
            Err(err) => {
                warn!(user = %msg.author.id, %err, "member lookup failed");
                return false;
            }
        };
        ctx.cache
            .guild(guild_id)
            .map(|guild| guild.member_permissions(&member).administrator())
            .unwrap_or(false)
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "connected to gateway");

        ctx.set_presence(
            Some(ActivityData::playing(self.state.config.presence.clone())),
            OnlineStatus::Online,
        );

        if let Some(guild_id) = self.state.config.guild_id {
            self.register_commands(&ctx, GuildId::new(guild_id)).await;
        }
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let guild_id = new_member.guild_id;
        let templates = self.state.moderator.templates();
        info!(guild = %guild_id, user = %new_member.user.id, "member joined");

        let role_name = &self.state.config.auto_role;
        if let Some(roles) = best_effort("fetch guild roles", guild_id.roles(&ctx.http)).await {
            match roles.values().find(|role| &role.name == role_name) {
                Some(role) => {
                    best_effort("assign auto role", new_member.add_role(&ctx.http, role.id)).await;
                }
                None => debug!(guild = %guild_id, role = %role_name, "auto role not found"),
            }
        }

        if let Some(guild) = best_effort("fetch guild", guild_id.to_partial_guild(&ctx)).await {
            if let Some(channel) = guild.system_channel_id {
                let text = templates.welcome(&mention(new_member.user.id.get()));
                best_effort("post welcome", channel.say(&ctx.http, text)).await;
            }
        }

        let dm = CreateMessage::new().content(templates.welcome_dm());
        best_effort("send welcome dm", new_member.user.direct_message(&ctx, dm)).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let moderator = &self.state.moderator;
        let author = msg.author.id.get();

        match moderator.screen(author, msg.author.bot, self.state.now_ms()) {
            Screening::Ignore => return,
            Screening::Flood { verdict, warning } => {
                warn!(user = author, count = verdict.count, "spam detected, deleting message");
                // Deletion failure does not hold back the warning.
                best_effort("delete spam message", msg.delete(&ctx)).await;
                best_effort("post spam warning", msg.channel_id.say(&ctx.http, warning)).await;
                return;
            }
            Screening::Pass { .. } => {}
        }

        let mentions = msg
            .mentions
            .iter()
            .map(|user| Mentioned {
                id: user.id.get(),
                bot: user.bot,
            })
            .collect::<Vec<_>>();
        if mentions.iter().any(|m| !m.bot) {
            let channel = best_effort("resolve channel name", msg.channel_id.name(&ctx))
                .await
                .unwrap_or_default();
            for notice in moderator.mention_notices(&mentions, &channel, &msg.content) {
                let dm = CreateMessage::new().content(notice.text);
                best_effort(
                    "send mention dm",
                    UserId::new(notice.user_id).direct_message(&ctx, dm),
                )
                .await;
            }
        }

        if moderator.is_dangerous(&msg.content) && self.is_admin(&ctx, &msg).await {
            info!(user = author, "dangerous admin message");
            best_effort(
                "post admin warning",
                msg.channel_id.say(&ctx.http, moderator.admin_warning()),
            )
            .await;
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            interaction::handle_command(&ctx, &command).await;
        }
    }
}
