use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::Result;

/// Label used for publishers without a category
pub const DEFAULT_CATEGORY: &str = "Diverse";

/// Characters `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(crate) fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// The publisher list published as `sites.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub sites: Vec<Publisher>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rss: String,
    #[serde(default)]
    pub mastodon: Option<String>,
    #[serde(default)]
    pub mastodon_rss: Option<String>,
    /// Localized descriptions (`description_small`, `description_en_short`, ...)
    /// and anything else the ingestion job adds
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Treat an explicit `null` the same as a missing string
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Publisher {
    pub fn has_social(&self) -> bool {
        self.mastodon.as_deref().is_some_and(|m| !m.is_empty())
    }

    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.slug
        } else {
            &self.name
        }
    }

    /// The site url without its scheme or trailing slash
    pub fn display_host(&self) -> &str {
        let url = self.url.as_str();
        let url = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        url.strip_suffix('/').unwrap_or(url)
    }

    fn description(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
    }

    /// The description shown on a publisher card
    pub fn card_description(&self) -> Option<&str> {
        self.description("description_short")
            .or_else(|| self.description("description_small"))
    }

    /// Every string valued `description*` field, in key order
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.extra
            .iter()
            .filter(|(k, _)| k.starts_with("description"))
            .filter_map(|(_, v)| v.as_str())
    }

    /// Site relative path of this publisher's page
    pub fn page_path(&self) -> String {
        format!("/publisher/{}/", encode_component(&self.slug))
    }
}

/// Counts shown above the publisher list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub with_social: usize,
    /// Publisher count per category label, alphabetical
    pub categories: BTreeMap<String, usize>,
}

impl CatalogStats {
    /// The `n` biggest categories, largest first, ties alphabetical
    pub fn top_categories(&self, n: usize) -> Vec<(&str, usize)> {
        let mut cats: Vec<(&str, usize)> = self
            .categories
            .iter()
            .map(|(c, count)| (c.as_str(), *count))
            .collect();
        cats.sort_by(|a, b| b.1.cmp(&a.1));
        cats.truncate(n);
        cats
    }
}

impl Catalog {
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            total: self.sites.len(),
            ..Default::default()
        };
        for site in &self.sites {
            *stats
                .categories
                .entry(site.category_label().to_string())
                .or_default() += 1;
            if site.has_social() {
                stats.with_social += 1;
            }
        }
        stats
    }

    pub fn find(&self, slug: &str) -> Option<&Publisher> {
        self.sites.iter().find(|s| s.slug == slug)
    }

    /// Publishers sharing `slug`'s category, in catalog order
    pub fn related(&self, slug: &str) -> Vec<&Publisher> {
        let Some(publisher) = self.find(slug) else {
            return Vec::new();
        };
        let category = publisher.category_label();
        self.sites
            .iter()
            .filter(|s| s.slug != slug && s.category_label() == category)
            .collect()
    }
}

pub async fn load_catalog(data_root: &Url) -> Result<Catalog> {
    let url = crate::data_url(data_root, &["sites.json"])?;
    log::debug!("loading catalog from {url}");
    crate::fetch_json(url).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn catalog() -> Catalog {
        serde_json::from_value(serde_json::json!({
            "base_url": "https://example.org",
            "sites": [
                {
                    "slug": "alpha",
                    "name": "Alpha News",
                    "url": "https://alpha.example/",
                    "category": "Health",
                    "rss": "https://alpha.example/feed/",
                    "mastodon": "https://social.example/@alpha",
                    "mastodon_rss": "https://social.example/@alpha.rss",
                    "description_short": "Medical press releases"
                },
                {
                    "slug": "beta",
                    "name": "Beta Daily",
                    "url": "http://beta.example",
                    "category": "Tehnologie",
                    "rss": "http://beta.example/feed/",
                    "description_small": "Gadgets and software"
                },
                {
                    "slug": "gamma",
                    "name": null,
                    "url": "https://gamma.example/",
                    "rss": "https://gamma.example/feed/",
                    "mastodon": ""
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn missing_sites_is_empty() {
        let catalog: Catalog = serde_json::from_str(r#"{"base_url": "x"}"#).unwrap();
        assert!(catalog.sites.is_empty());
    }

    #[test]
    fn publisher_helpers() {
        let catalog = catalog();
        let alpha = &catalog.sites[0];
        let gamma = &catalog.sites[2];
        assert!(alpha.has_social());
        assert!(!gamma.has_social());
        assert_eq!(gamma.display_name(), "gamma");
        assert_eq!(gamma.category_label(), DEFAULT_CATEGORY);
        assert_eq!(alpha.display_host(), "alpha.example");
        assert_eq!(catalog.sites[1].display_host(), "beta.example");
        assert_eq!(alpha.card_description(), Some("Medical press releases"));
        assert_eq!(
            catalog.sites[1].card_description(),
            Some("Gadgets and software")
        );
        assert_eq!(gamma.card_description(), None);
    }

    #[test]
    fn page_path_encodes_slug() {
        let publisher = Publisher {
            slug: "a b/c".into(),
            ..Default::default()
        };
        assert_eq!(publisher.page_path(), "/publisher/a%20b%2Fc/");
        assert_eq!(catalog().sites[0].page_path(), "/publisher/alpha/");
    }

    #[test]
    fn stats_count_categories() {
        let stats = catalog().stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.with_social, 1);
        assert_eq!(stats.categories.len(), 3);
        assert_eq!(stats.categories.get(DEFAULT_CATEGORY), Some(&1));
    }

    #[test]
    fn top_categories_prefers_larger() {
        let mut catalog = catalog();
        catalog.sites[2].category = Some("Tehnologie".into());
        let stats = catalog.stats();
        let top = stats.top_categories(5);
        assert_eq!(top, vec![("Tehnologie", 2), ("Health", 1)]);
        assert_eq!(stats.top_categories(1).len(), 1);
    }

    #[test]
    fn related_shares_category() {
        let mut catalog = catalog();
        catalog.sites[2].category = Some("Health".into());
        let related = catalog.related("alpha");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].slug, "gamma");
        assert!(catalog.related("missing").is_empty());
    }
}
