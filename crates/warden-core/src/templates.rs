use serde::{Deserialize, Serialize};

/// Longest message body the platform accepts.
pub const MAX_MESSAGE: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub welcome: String,
    pub welcome_dm: String,
    pub spam_warning: String,
    pub mention_dm: String,
    pub admin_warning: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            welcome: "🌸 Welcome {member}!".into(),
            welcome_dm: "💕 Welcome to the server! Please read the rules.".into(),
            spam_warning: "{user}, stop spamming!".into(),
            mention_dm: "🔔 You were mentioned in #{channel}\n\n{content}".into(),
            admin_warning: "⚠️ Dangerous action detected.".into(),
        }
    }
}

impl Templates {
    pub fn welcome(&self, member: &str) -> String {
        render(&self.welcome, &[("member", member)])
    }

    pub fn welcome_dm(&self) -> String {
        render(&self.welcome_dm, &[])
    }

    pub fn spam_warning(&self, user: &str) -> String {
        render(&self.spam_warning, &[("user", user)])
    }

    pub fn mention_dm(&self, channel: &str, content: &str) -> String {
        render(&self.mention_dm, &[("channel", channel), ("content", content)])
    }

    pub fn admin_warning(&self) -> String {
        render(&self.admin_warning, &[])
    }
}

/// Substitutes `{key}` placeholders in one pass, so substituted values are
/// never themselves expanded. Unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let key = &tail[1..close];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    out.push_str(rest);
    truncate(out, MAX_MESSAGE)
}

fn truncate(mut s: String, max_chars: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max_chars) {
        s.truncate(idx);
    }
    s
}
