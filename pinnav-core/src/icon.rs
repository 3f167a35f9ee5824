// Icon heuristics for links exported without one

use crate::config::RemoteIcons;

pub const DEFAULT_ICON: &str = "🔗";

/// Keyword -> icon, checked in order against the lowercased URL.
///
/// Site names come first so that e.g. `github.com/blog` is not caught by the
/// broader "blog" entry further down.
pub const KEYWORD_ICONS: &[(&str, &str)] = &[
    // Sites
    ("github", "💻"),
    ("youtube", "🎬"),
    ("bilibili", "📺"),
    ("baidu", "🔍"),
    ("google", "🔍"),
    ("microsoft", "🪟"),
    ("apple", "🍎"),
    ("amazon", "🛒"),
    // Academic
    ("scholar", "🎓"),
    ("arxiv", "📄"),
    ("cnki", "📚"),
    ("ieee", "📝"),
    // Media and tools
    ("pdf", "📄"),
    ("image", "🖼️"),
    ("photo", "📸"),
    ("music", "🎵"),
    ("video", "🎬"),
    // Programming
    ("python", "🐍"),
    ("java", "☕"),
    ("javascript", "⚡"),
    ("html", "🌐"),
    // Office
    ("word", "📝"),
    ("excel", "📊"),
    ("ppt", "📑"),
    ("office", "🖋️"),
    // Generic terms
    ("mail", "📧"),
    ("email", "📧"),
    ("@", "📧"),
    ("news", "📰"),
    ("article", "📰"),
    ("blog", "📰"),
    ("book", "📚"),
    ("read", "📚"),
    ("novel", "📚"),
    ("map", "🗺️"),
    ("location", "🗺️"),
    ("place", "🗺️"),
    ("weather", "🌤️"),
    ("forecast", "🌤️"),
    ("game", "🎮"),
    ("play", "🎮"),
    ("fun", "🎮"),
    ("ai", "🤖"),
    ("chat", "🤖"),
    ("bot", "🤖"),
    ("智能", "🤖"),
    ("cloud", "☁️"),
    ("drive", "☁️"),
    ("storage", "☁️"),
];

/// Looks the URL up in [`KEYWORD_ICONS`], first match wins.
pub fn icon_for_url(url: &str) -> Option<&'static str> {
    let url_lower = url.to_lowercase();
    KEYWORD_ICONS
        .iter()
        .find(|(keyword, _)| url_lower.contains(keyword))
        .map(|(_, icon)| *icon)
}

fn is_remote(icon: &str) -> bool {
    let lower = icon.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Picks the display icon for a link.
pub fn resolve_icon(
    icon: Option<&str>,
    url: &str,
    remote_icons: RemoteIcons,
    default_icon: &str,
) -> String {
    let explicit = icon
        .filter(|icon| !icon.trim().is_empty())
        .filter(|icon| remote_icons == RemoteIcons::Keep || !is_remote(icon.trim()));

    match explicit {
        Some(icon) => icon.to_string(),
        None => icon_for_url(url).unwrap_or(default_icon).to_string(),
    }
}
