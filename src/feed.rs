use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{catalog::null_as_empty, Result};

/// Source label given to social entries when shown as articles
pub const SOCIAL_SOURCE: &str = "Mastodon";

/// The cached feed written to `feeds/{slug}.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub items: Vec<ArticleEntry>,
    #[serde(default)]
    pub social: Vec<SocialEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_human: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_human: String,
}

impl SocialEntry {
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.published.as_deref().and_then(parse_timestamp)
    }

    pub fn to_article(&self) -> ArticleEntry {
        ArticleEntry {
            title: self.title.clone(),
            link: self.link.clone(),
            published_human: self.published_human.clone(),
            summary: self.summary.clone(),
            source: SOCIAL_SOURCE.to_string(),
        }
    }
}

impl FeedSnapshot {
    pub fn updated(&self) -> Option<DateTime<FixedOffset>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    pub fn social_articles(&self) -> Vec<ArticleEntry> {
        self.social.iter().map(SocialEntry::to_article).collect()
    }
}

/// Parse the timestamps the ingestion job writes: ISO 8601 from parsed
/// entries, raw RFC 2822 `pubDate`s otherwise
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
}

/// What the feed panel of a publisher page shows
#[derive(Debug, Clone)]
pub enum FeedView {
    /// The snapshot could not be fetched or parsed
    NotYetAvailable,
    Loaded(FeedSnapshot),
}

pub fn feed_url(data_root: &Url, slug: &str) -> Result<Url> {
    crate::data_url(data_root, &["feeds", &format!("{slug}.json")])
}

pub async fn fetch_snapshot(data_root: &Url, slug: &str) -> Result<FeedSnapshot> {
    let url = feed_url(data_root, slug)?;
    log::debug!("fetching feed snapshot {url}");
    crate::fetch_json(url).await
}

/// Fetch a snapshot, treating any failure as "not generated yet"
pub async fn load_feed(data_root: &Url, slug: &str) -> FeedView {
    match fetch_snapshot(data_root, slug).await {
        Ok(snapshot) => FeedView::Loaded(snapshot),
        Err(e) => {
            log::warn!("feed for `{slug}` unavailable: {e}");
            FeedView::NotYetAvailable
        }
    }
}
