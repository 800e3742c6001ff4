use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use warden_core::{BotConfig, Clock, Moderator};

/// Everything the gateway handlers share, built once at startup.
#[derive(Debug)]
pub struct BotState {
    pub config: BotConfig,
    pub moderator: Moderator,
    pub clock: Clock,
}

impl BotState {
    pub fn new(config: BotConfig) -> Result<Self> {
        let moderator = Moderator::new(&config).context("build moderator")?;
        Ok(Self {
            config,
            moderator,
            clock: Clock::new(),
        })
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

/// Periodically drops users with no live message history.
pub fn spawn_sweeper(state: Arc<BotState>) -> Option<tokio::task::JoinHandle<()>> {
    let secs = state.config.anti_spam.sweep_interval_secs;
    if secs == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(secs));
        loop {
            tick.tick().await;
            let removed = state.moderator.sweep(state.now_ms());
            if removed > 0 {
                debug!(removed, tracked = state.moderator.counter().subjects(), "swept idle users");
            }
        }
    }))
}
