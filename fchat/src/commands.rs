//! Reserved commands handled without calling a model.
//!
//! ```rust
//! use fchat::ReservedCommand;
//!
//! assert_eq!(ReservedCommand::parse("  reset conversation "), Some(ReservedCommand::ResetConversation));
//! assert_eq!(ReservedCommand::parse("重置人格"), Some(ReservedCommand::ResetPersona));
//! assert_eq!(
//!     ReservedCommand::parse("设置人格你是一只猫"),
//!     Some(ReservedCommand::SetPersona("你是一只猫".to_string()))
//! );
//! assert_eq!(ReservedCommand::parse("reset conversations please"), None);
//! ```

pub const RESET_CONVERSATION_REPLY: &str = "Conversation has been reset.";
pub const RESET_PERSONA_REPLY: &str = "Persona has been reset.";
pub const SET_PERSONA_REPLY: &str = "Persona updated.";
pub const HELP_REPLY: &str = "Available commands:\n\
    reset conversation (重置会话): forget this conversation's history\n\
    reset persona (重置人格): restore the default persona and forget history\n\
    set persona <text> (设置人格<text>): use <text> as the persona and forget history\n\
    help (指令说明): show this list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservedCommand {
    ResetConversation,
    ResetPersona,
    SetPersona(String),
    Help,
}

impl ReservedCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.eq_ignore_ascii_case("reset conversation") || text == "重置会话" {
            return Some(Self::ResetConversation);
        }

        if text.eq_ignore_ascii_case("reset persona") || text == "重置人格" {
            return Some(Self::ResetPersona);
        }

        if text.eq_ignore_ascii_case("help") || text == "指令说明" {
            return Some(Self::Help);
        }

        if let Some(persona) = text.strip_prefix("设置人格") {
            return Some(Self::SetPersona(persona.trim().to_string()));
        }

        strip_prefix_ignore_ascii_case(text, "set persona")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .map(|rest| Self::SetPersona(rest.trim().to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ResetConversation => "reset_conversation",
            Self::ResetPersona => "reset_persona",
            Self::SetPersona(_) => "set_persona",
            Self::Help => "help",
        }
    }
}

fn strip_prefix_ignore_ascii_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
