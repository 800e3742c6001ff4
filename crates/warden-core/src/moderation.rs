use crate::config::BotConfig;
use crate::error::ConfigError;
use crate::templates::Templates;
use crate::util::mention;
use crate::window::{SlidingWindowCounter, Verdict};
use std::collections::HashSet;
use tracing::debug;

pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    /// Bot authors are never counted.
    Ignore,
    Pass { verdict: Verdict },
    Flood { verdict: Verdict, warning: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mentioned {
    pub id: UserId,
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionNotice {
    pub user_id: UserId,
    pub text: String,
}

/// Message-level policy shared by all gateway handlers.
#[derive(Debug)]
pub struct Moderator {
    counter: SlidingWindowCounter<UserId>,
    templates: Templates,
    danger_keywords: Vec<String>,
    reset_after_action: bool,
}

impl Moderator {
    pub fn new(config: &BotConfig) -> Result<Self, ConfigError> {
        let window = config.validate()?;
        Ok(Self {
            counter: SlidingWindowCounter::new(window),
            templates: config.messages.clone(),
            danger_keywords: config
                .danger_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            reset_after_action: config.anti_spam.reset_after_action,
        })
    }

    pub fn counter(&self) -> &SlidingWindowCounter<UserId> {
        &self.counter
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn screen(&self, author: UserId, author_is_bot: bool, now_ms: u64) -> Screening {
        if author_is_bot {
            return Screening::Ignore;
        }
        let verdict = self.counter.record(&author, now_ms);
        if !verdict.exceeded {
            return Screening::Pass { verdict };
        }
        debug!(user = author, count = verdict.count, "message rate exceeded");
        if self.reset_after_action {
            self.counter.reset(&author);
        }
        Screening::Flood {
            verdict,
            warning: self.templates.spam_warning(&mention(author)),
        }
    }

    pub fn mention_notices(
        &self,
        mentions: &[Mentioned],
        channel: &str,
        content: &str,
    ) -> Vec<MentionNotice> {
        let mut seen = HashSet::new();
        mentions
            .iter()
            .filter(|m| !m.bot && seen.insert(m.id))
            .map(|m| MentionNotice {
                user_id: m.id,
                text: self.templates.mention_dm(channel, content),
            })
            .collect()
    }

    pub fn is_dangerous(&self, content: &str) -> bool {
        let lowered = content.to_lowercase();
        self.danger_keywords.iter().any(|k| lowered.contains(k))
    }

    pub fn admin_warning(&self) -> String {
        self.templates.admin_warning()
    }

    pub fn sweep(&self, now_ms: u64) -> usize {
        self.counter.sweep(now_ms)
    }
}
