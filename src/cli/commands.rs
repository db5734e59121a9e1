//! CLI subcommand definitions

use clap::Subcommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub(crate) enum Commands {
    /// Show the active session window (default)
    Current,
    /// Show all session windows reconstructed for today
    Windows,
    /// Output a single line for statusline/tmux integration
    Statusline,
}

impl Commands {
    /// Statusline output must stay clean of progress chatter
    pub(crate) fn is_statusline(self) -> bool {
        matches!(self, Commands::Statusline)
    }
}
