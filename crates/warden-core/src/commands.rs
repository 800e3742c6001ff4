#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Ping,
    Join,
    Leave,
}

impl BotCommand {
    pub const ALL: [BotCommand; 3] = [BotCommand::Ping, BotCommand::Join, BotCommand::Leave];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            BotCommand::Ping => "ping",
            BotCommand::Join => "join",
            BotCommand::Leave => "leave",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BotCommand::Ping => "Check if bot is alive",
            BotCommand::Join => "Join your voice channel",
            BotCommand::Leave => "Leave voice channel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub ephemeral: bool,
}

impl Reply {
    fn public(text: &str) -> Self {
        Self {
            text: text.into(),
            ephemeral: false,
        }
    }

    fn private(text: &str) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }

    pub fn pong() -> Self {
        Self::public("🏓 Pong! I am online.")
    }

    pub fn joined() -> Self {
        Self::public("🔊 Joined your voice channel!")
    }

    pub fn not_in_voice() -> Self {
        Self::private("❌ Join a voice channel first.")
    }

    pub fn left() -> Self {
        Self::public("👋 Left the voice channel.")
    }

    pub fn not_connected() -> Self {
        Self::private("❌ I am not in a voice channel.")
    }

    pub fn failed() -> Self {
        Self::public("❌ Error occurred.")
    }
}
