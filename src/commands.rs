use regex::Regex;

use crate::message::Message;

/// Reply-producing function invoked for every message a command matches.
pub type Action = Box<dyn Fn(&Message) -> Message + Send + Sync>;

/// One entry in a bot's command table: a pattern, a mention requirement and
/// the action that produces the reply. Immutable once registered.
pub struct Command {
    pattern: Regex,
    requires_mention: bool,
    action: Action,
}

impl Command {
    /// `pattern` is matched with unanchored substring search
    /// ([`Regex::is_match`]): it fires when the expression matches anywhere
    /// in the message text. Supply your own `^`/`$` anchors if you want
    /// full-string matching.
    pub fn new(
        pattern: Regex,
        requires_mention: bool,
        action: impl Fn(&Message) -> Message + Send + Sync + 'static,
    ) -> Self {
        Self {
            pattern,
            requires_mention,
            action: Box::new(action),
        }
    }

    pub fn requires_mention(&self) -> bool {
        self.requires_mention
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn invoke(&self, message: &Message) -> Message {
        (self.action)(message)
    }
}

/// Whether `text` mentions the bot, i.e. contains the literal `<@self_id>`
/// token Slack embeds for a mention.
///
/// This is substring containment, not tokenized parsing. An empty self id
/// never counts as mentioned, so mention-gated commands simply stay silent
/// when the session reported no identity.
pub fn is_mentioned(self_id: &str, text: &str) -> bool {
    !self_id.is_empty() && text.contains(&format!("<@{self_id}>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(text: &str) -> Message {
        Message {
            id: 1,
            kind: "message".into(),
            channel: "C1".into(),
            text: text.into(),
        }
    }

    #[test]
    fn test_match_is_unanchored() {
        let command = Command::new(Regex::new("ping").unwrap(), false, |m| m.reply("pong"));
        assert!(command.matches("ping"));
        assert!(command.matches("well ping pong"));
        assert!(!command.matches("pong"));
    }

    #[test]
    fn test_caller_supplied_anchors_are_honored() {
        let command = Command::new(Regex::new("^deploy$").unwrap(), false, |m| m.reply("ok"));
        assert!(command.matches("deploy"));
        assert!(!command.matches("please deploy"));
    }

    #[test]
    fn test_invoke_runs_the_action() {
        let command = Command::new(Regex::new("ping").unwrap(), false, |m| m.reply("pong"));
        let reply = command.invoke(&inbound("ping"));
        assert_eq!(reply.text, "pong");
        assert_eq!(reply.channel, "C1");
    }

    #[test]
    fn test_mention_is_substring_containment() {
        assert!(is_mentioned("U1", "hey <@U1> ping"));
        assert!(is_mentioned("U1", "<@U1>"));
        assert!(!is_mentioned("U1", "ping"));
        assert!(!is_mentioned("U1", "<@U2> ping"));
    }

    #[test]
    fn test_empty_self_id_never_mentions() {
        assert!(!is_mentioned("", "ping"));
        assert!(!is_mentioned("", "<@> ping"));
    }
}
