use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab as the browser reports it to the privileged context.
#[derive(Debug, Clone, PartialEq)]
pub struct TabInfo {
    pub id: TabId,
    pub window: WindowId,
    pub title: String,
    pub url: String,
    pub fav_icon_url: Option<String>,
}

/// Which result set and placeholder the palette shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteMode {
    #[default]
    General,
    TabSwitcher,
}

impl PaletteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteMode::General => "general",
            PaletteMode::TabSwitcher => "tab-switcher",
        }
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tab entry as it travels back from a `QueryTabs` request, favicon
/// fallback already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TabHit {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub fav_icon_url: Option<String>,
}

/// Side effect a general-palette command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    OpenNewTab,
    ShowHistory,
    ShowBookmarks,
    OpenSettings,
    /// No platform primitive can trigger this; selecting it only explains why.
    OpenDevTools,
}

/// One entry of the static general-command catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub action: CommandAction,
}

/// A selectable palette row, polymorphic over where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    Tab(TabHit),
    Command(CommandSpec),
}

impl ResultItem {
    pub fn title(&self) -> &str {
        match self {
            ResultItem::Tab(hit) => &hit.title,
            ResultItem::Command(cmd) => cmd.title,
        }
    }

    /// Case-insensitive substring match; tab items also match on the derived
    /// site label so "github" finds a tab titled "Pull Requests".
    pub fn matches(&self, lower_query: &str) -> bool {
        if lower_query.is_empty() {
            return true;
        }
        match self {
            ResultItem::Tab(hit) => {
                hit.title.to_lowercase().contains(lower_query)
                    || crate::domain::site::site_label(&hit.url)
                        .to_lowercase()
                        .contains(lower_query)
            }
            ResultItem::Command(cmd) => cmd.title.to_lowercase().contains(lower_query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(title: &str, url: &str) -> ResultItem {
        ResultItem::Tab(TabHit {
            id: TabId(1),
            title: title.to_string(),
            url: url.to_string(),
            fav_icon_url: None,
        })
    }

    #[test]
    fn matches_title_case_insensitive() {
        let item = tab("Docs - Google Docs", "https://docs.google.com/");
        assert!(item.matches("doc"));
        assert!(item.matches("google"));
        assert!(!item.matches("github"));
    }

    #[test]
    fn matches_site_label() {
        let item = tab("Pull Requests", "https://www.github.com/pulls");
        assert!(item.matches("github"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let item = tab("Anything", "https://example.com/");
        assert!(item.matches(""));
    }
}
