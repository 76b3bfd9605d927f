use url::Url;

/// Schemes the platform refuses to run injected scripts on.
const RESTRICTED_PREFIXES: [&str; 2] = ["browser://", "file://"];

/// Friendly labels for well-known internal pages.
const INTERNAL_LABELS: [(&str, &str); 6] = [
    ("browser://newtab", "New Tab"),
    ("browser://extensions", "Extensions"),
    ("browser://history", "History"),
    ("browser://bookmarks", "Bookmarks"),
    ("browser://settings", "Settings"),
    ("browser://downloads", "Downloads"),
];

pub fn is_restricted(url: &str) -> bool {
    RESTRICTED_PREFIXES.iter().any(|p| url.starts_with(p))
}

/// Derives the short display name shown under a tab title and used as an
/// extra filter target: the hostname with a leading "www." stripped,
/// friendly labels for internal pages, and a scheme fallback for anything
/// that does not parse.
pub fn site_label(url: &str) -> String {
    if let Some((_, label)) = INTERNAL_LABELS.iter().find(|(prefix, _)| url.starts_with(prefix)) {
        return (*label).to_string();
    }
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "browser" => parsed
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| "Browser Page".to_string()),
        Ok(parsed) => {
            let hostname = parsed.host_str().unwrap_or("");
            let hostname = hostname.strip_prefix("www.").unwrap_or(hostname);
            if hostname.is_empty() {
                "Unknown Website".to_string()
            } else {
                hostname.to_string()
            }
        }
        Err(_) => match url.split_once("://") {
            Some((scheme, _)) => scheme.to_string(),
            None => "Invalid URL".to_string(),
        },
    }
}

/// Synthesizes a favicon URL from the tab's origin when the browser supplied
/// none. Only http(s) pages get one; internal pages render a placeholder.
pub fn fallback_favicon(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !parsed.scheme().starts_with("http") {
        return None;
    }
    Some(format!(
        "https://www.google.com/s2/favicons?sz=32&domain_url={}",
        parsed.origin().ascii_serialization()
    ))
}
