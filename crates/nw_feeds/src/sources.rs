use url::Url;

pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A news provider recognized by its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub domain: &'static str,
    pub emoji: &'static str,
}

const KNOWN_SOURCES: &[SourceMetadata] = &[
    SourceMetadata { name: "Yahoo Finance", domain: "yahoo", emoji: "🟣" },
    SourceMetadata { name: "CNBC", domain: "cnbc", emoji: "📺" },
    SourceMetadata { name: "MarketWatch", domain: "marketwatch", emoji: "⌚" },
    SourceMetadata { name: "Reuters", domain: "reuters", emoji: "🟠" },
    SourceMetadata { name: "Bloomberg", domain: "bloomberg", emoji: "💹" },
];

pub fn known_sources() -> &'static [SourceMetadata] {
    KNOWN_SOURCES
}

impl SourceMetadata {
    pub fn can_handle(&self, endpoint: &str) -> bool {
        // Match on the host when the endpoint parses, so a provider name
        // buried in a path or query string does not count.
        match Url::parse(endpoint) {
            Ok(url) => url
                .host_str()
                .map(|host| host.to_lowercase().contains(self.domain))
                .unwrap_or(false),
            Err(_) => endpoint.to_lowercase().contains(self.domain),
        }
    }
}

/// Provider metadata for a feed endpoint, if it is one we know.
pub fn lookup(endpoint: &str) -> Option<&'static SourceMetadata> {
    KNOWN_SOURCES.iter().find(|source| source.can_handle(endpoint))
}

/// Human-readable label for a feed endpoint. Never fails.
pub fn resolve(endpoint: &str) -> &'static str {
    lookup(endpoint).map(|source| source.name).unwrap_or(UNKNOWN_SOURCE)
}

/// Emoji used to tag log lines for a feed.
pub fn emoji(endpoint: &str) -> &'static str {
    lookup(endpoint).map(|source| source.emoji).unwrap_or("📰")
}
