pub mod commands;
pub mod config;
pub mod effect;
pub mod error;
pub mod moderation;
pub mod templates;
pub mod util;
pub mod window;

pub use commands::{BotCommand, Reply};
pub use config::{AntiSpamConfig, BotConfig, DEFAULT_CONFIG_PATH};
pub use effect::best_effort;
pub use error::ConfigError;
pub use moderation::{MentionNotice, Mentioned, Moderator, Screening};
pub use templates::Templates;
pub use util::Clock;
pub use window::{SlidingWindowCounter, Verdict, WindowConfig};
