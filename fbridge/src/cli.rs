//! Command-line surface of the `fbridge` binary.

use std::path::PathBuf;

use clap::Parser;
use fcommon::ConversationId;

use crate::BridgeError;

pub const CLI_USER: &str = "cli";

/// Reads messages from stdin, one per line, and prints each reply.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "fbridge", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "fbridge.toml")]
    pub config: PathBuf,

    /// Explicit conversation key, used verbatim.
    #[arg(long, conflicts_with_all = ["user", "group"])]
    pub conversation: Option<String>,

    /// User id; yields `P{user}`, or `G{group}_{user}` with --group.
    #[arg(long)]
    pub user: Option<String>,

    /// Group id; requires --user.
    #[arg(long, requires = "user")]
    pub group: Option<String>,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn conversation_id(&self) -> Result<ConversationId, BridgeError> {
        let id = match (&self.conversation, &self.group, &self.user) {
            (Some(conversation), _, _) => ConversationId::new(conversation.clone()),
            (None, Some(group), Some(user)) => ConversationId::group(group, user),
            (None, None, Some(user)) => ConversationId::private(user),
            (None, Some(_), None) => {
                return Err(BridgeError::validation("--group requires --user"));
            }
            (None, None, None) => ConversationId::private(CLI_USER),
        };

        if id.is_blank() {
            return Err(BridgeError::validation("conversation id must not be empty"));
        }
        Ok(id)
    }
}
