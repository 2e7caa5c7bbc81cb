use std::{cmp::Ordering, time::Duration};

use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    catalog::Publisher,
    feed::{fetch_snapshot, SocialEntry},
};

#[derive(Debug, Clone, TypedBuilder)]
pub struct DigestOptions {
    /// How many publishers with a social profile to sample
    #[builder(default = 8)]
    pub sample: usize,
    /// How many posts to keep
    #[builder(default = 1)]
    pub top: usize,
    /// Pause between consecutive feed requests
    #[builder(default = Duration::from_millis(150))]
    pub delay: Duration,
}

/// A social post together with the publisher it came from
#[derive(Debug, Clone, PartialEq)]
pub struct DigestEntry {
    pub slug: String,
    pub name: String,
    pub entry: SocialEntry,
}

/// The first `n` publishers that have a social profile
pub fn sample_publishers(sites: &[Publisher], n: usize) -> Vec<&Publisher> {
    sites.iter().filter(|s| s.has_social()).take(n).collect()
}

/// Newest first; entries without a parseable timestamp go last, in
/// their original order
pub fn sort_latest(entries: &mut [DigestEntry]) {
    entries.sort_by(|a, b| {
        match (a.entry.published_at(), b.entry.published_at()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

pub async fn collect_digest(
    data_root: &Url,
    sites: &[Publisher],
    options: &DigestOptions,
) -> Vec<DigestEntry> {
    let sampled = sample_publishers(sites, options.sample);
    log::info!("sampling {} publishers for the digest", sampled.len());
    let mut entries = Vec::new();
    for (i, publisher) in sampled.into_iter().enumerate() {
        if i > 0 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
        let snapshot = match fetch_snapshot(data_root, &publisher.slug).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("skipping `{}` in digest: {e}", publisher.slug);
                continue;
            }
        };
        entries.extend(snapshot.social.into_iter().map(|entry| DigestEntry {
            slug: publisher.slug.clone(),
            name: publisher.display_name().to_string(),
            entry,
        }));
    }
    sort_latest(&mut entries);
    entries.truncate(options.top);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;
    use tempfile::TempDir;

    fn entry(slug: &str, published: Option<&str>) -> DigestEntry {
        DigestEntry {
            slug: slug.into(),
            name: slug.into(),
            entry: SocialEntry {
                published: published.map(String::from),
                ..Default::default()
            },
        }
    }

    #[test]
    fn sorts_newest_first_invalid_last() {
        let mut entries = vec![
            entry("none", None),
            entry("old", Some("2024-01-01T00:00:00+00:00")),
            entry("bad", Some("not a date")),
            entry("new", Some("Wed, 05 Mar 2025 09:00:00 +0000")),
            entry("mid", Some("2024-06-01T00:00:00Z")),
        ];
        sort_latest(&mut entries);
        let order: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(order, ["new", "mid", "old", "none", "bad"]);
    }

    #[test]
    fn samples_only_social_publishers() {
        let catalog = catalog();
        let sampled = sample_publishers(&catalog.sites, 10);
        assert_eq!(sampled.len(), 1);
        assert_eq!(sampled[0].slug, "alpha");
        assert!(sample_publishers(&catalog.sites, 0).is_empty());
    }

    #[tokio::test]
    async fn collects_across_feeds_skipping_failures() {
        let mut catalog = catalog();
        for site in &mut catalog.sites {
            site.mastodon = Some(format!("https://social.example/@{}", site.slug));
        }
        let dir = TempDir::new().unwrap();
        let feeds = dir.path().join("feeds");
        std::fs::create_dir(&feeds).unwrap();
        std::fs::write(
            feeds.join("alpha.json"),
            r#"{"social": [{"title": "a1", "published": "2025-01-01T00:00:00+00:00"}]}"#,
        )
        .unwrap();
        std::fs::write(
            feeds.join("beta.json"),
            r#"{"social": [{"title": "b1", "published": "2025-02-01T00:00:00+00:00"}, {"title": "b2"}]}"#,
        )
        .unwrap();
        let root = Url::from_directory_path(dir.path()).unwrap();
        let options = DigestOptions::builder()
            .top(5)
            .delay(Duration::ZERO)
            .build();
        let digest = collect_digest(&root, &catalog.sites, &options).await;
        let titles: Vec<_> = digest.iter().map(|e| e.entry.title.as_str()).collect();
        assert_eq!(titles, ["b1", "a1", "b2"]);
        assert_eq!(digest[0].name, "Beta Daily");

        let single = DigestOptions::builder().delay(Duration::ZERO).build();
        let digest = collect_digest(&root, &catalog.sites, &single).await;
        assert_eq!(digest.len(), 1);
        assert_eq!(digest[0].entry.title, "b1");
    }

    #[tokio::test]
    async fn no_feeds_is_empty() {
        let dir = TempDir::new().unwrap();
        let root = Url::from_directory_path(dir.path()).unwrap();
        let options = DigestOptions::builder().delay(Duration::ZERO).build();
        assert!(collect_digest(&root, &catalog().sites, &options)
            .await
            .is_empty());
    }
}
