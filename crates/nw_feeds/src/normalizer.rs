use chrono::{DateTime, Utc};
use nw_core::{fingerprint, Article, RawEntry};
use thiserror::Error;
use url::Url;

use crate::{entities, sources};

pub const MAX_SUMMARY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("entry has no title (link: {})", .link.as_deref().unwrap_or("none"))]
    MissingTitle { link: Option<String> },
}

/// Turns one raw feed entry into an [`Article`].
///
/// `now` stands in for the publish time when the entry carries neither a
/// published nor an updated instant.
pub fn normalize(
    entry: RawEntry,
    endpoint: &str,
    now: DateTime<Utc>,
) -> Result<Article, NormalizeError> {
    let link = entry
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| resolve_link(endpoint, l));

    let title = match entry.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => return Err(NormalizeError::MissingTitle { link }),
    };

    let summary = entry
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(truncate_summary);

    let id = fingerprint(link.as_deref().unwrap_or(&title));
    let entities = entities::extract(&format!("{} {}", title, summary.as_deref().unwrap_or("")));

    Ok(Article {
        id,
        title,
        summary,
        url: link.unwrap_or_default(),
        source: sources::resolve(endpoint).to_string(),
        published_at: entry.published.or(entry.updated).unwrap_or(now),
        entities,
        sentiment: None,
        sentiment_score: None,
    })
}

fn truncate_summary(summary: &str) -> String {
    match summary.char_indices().nth(MAX_SUMMARY_CHARS) {
        Some((idx, _)) => format!("{}...", &summary[..idx]),
        None => summary.to_string(),
    }
}

/// Absolute links are kept as they are. Relative ones are joined onto the
/// feed endpoint; if that fails too the link is kept verbatim.
fn resolve_link(endpoint: &str, link: &str) -> String {
    match Url::parse(link) {
        Ok(_) => link.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(endpoint)
            .and_then(|base| base.join(link))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| link.to_string()),
        Err(_) => link.to_string(),
    }
}
