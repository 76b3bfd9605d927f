use crate::domain::models::{CommandAction, CommandSpec, ResultItem};

/// The static command catalog shown in general mode. Order here is display
/// order when the query is empty.
const GENERAL_COMMANDS: [CommandSpec; 5] = [
    CommandSpec {
        id: "new-tab",
        title: "Open New Tab",
        icon: "+",
        action: CommandAction::OpenNewTab,
    },
    CommandSpec {
        id: "history",
        title: "Show History",
        icon: "H",
        action: CommandAction::ShowHistory,
    },
    CommandSpec {
        id: "bookmarks",
        title: "Show Bookmarks",
        icon: "B",
        action: CommandAction::ShowBookmarks,
    },
    CommandSpec {
        id: "settings",
        title: "Open Settings",
        icon: "S",
        action: CommandAction::OpenSettings,
    },
    CommandSpec {
        id: "devtools",
        title: "Open DevTools",
        icon: "D",
        action: CommandAction::OpenDevTools,
    },
];

pub fn general_commands() -> Vec<ResultItem> {
    GENERAL_COMMANDS.iter().copied().map(ResultItem::Command).collect()
}
