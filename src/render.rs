//! HTML fragments for the directory pages.
//!
//! Every value coming from the catalog or a feed snapshot is escaped
//! before it lands in markup.

use std::fmt::Write;

use html_escape::encode_quoted_attribute as esc;

use crate::{
    catalog::{CatalogStats, Publisher},
    digest::DigestEntry,
    feed::{ArticleEntry, FeedView},
    paginate::{PageSize, Paginator},
    Result,
};

pub const FEED_MISSING: &str = "Feed file not found yet for this publisher. \
    Run the <b>Update feeds</b> job and reload the page.";
pub const FEED_EMPTY: &str =
    "No articles in cache yet. They should appear a few minutes after the first update.";
pub const DIGEST_EMPTY: &str = "No social posts available yet.";
pub const CATALOG_MISSING: &str = "Publisher list unavailable. Reload the page in a few minutes.";

/// Summaries longer than this are cut and get an ellipsis
pub const SUMMARY_LIMIT: usize = 340;
/// How many categories get a chip
pub const CHIP_COUNT: usize = 5;

/// How rendered fragments are written to the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Output {
    #[default]
    Html,
    Markdown,
}

impl Output {
    pub fn format(self, html: &str) -> Result<String> {
        match self {
            Output::Html => Ok(html.to_string()),
            Output::Markdown => Ok(htmd::convert(html)
                .inspect_err(|e| log::warn!("failed to convert html to markdown: {e}"))?),
        }
    }

    pub fn emit(self, html: &str) -> Result {
        println!("{}", self.format(html)?);
        Ok(())
    }
}

pub fn notice(message: &str) -> String {
    format!(r#"<div class="notice">{message}</div>"#)
}

pub fn publisher_card(publisher: &Publisher) -> String {
    let social = if publisher.has_social() {
        r#"<span class="tag social">Mastodon</span>"#
    } else {
        ""
    };
    let desc = publisher
        .card_description()
        .map(|d| format!(r#"<p class="site-desc">{}</p>"#, esc(d)))
        .unwrap_or_default();
    format!(
        r#"<a class="site" href="{href}"><div class="site-top"><div><p class="site-name">{name}</p>{desc}<div class="site-meta"><span class="tag rss">RSS</span>{social}<span class="tag">{category}</span></div></div><small>{host}</small></div></a>"#,
        href = esc(&publisher.page_path()),
        name = esc(publisher.display_name()),
        category = esc(publisher.category_label()),
        host = esc(publisher.display_host()),
    )
}

/// Site, RSS and Mastodon links shown above a publisher's feeds
pub fn publisher_header(publisher: &Publisher) -> String {
    let mut out = format!(
        r#"<div class="publisher-links"><a id="siteLink" href="{url}" target="_blank" rel="noopener">{host}</a><a id="rssLink" href="{rss}" target="_blank" rel="nofollow noopener">{rss}</a>"#,
        url = esc(&publisher.url),
        host = esc(publisher.display_host()),
        rss = esc(&publisher.rss),
    );
    if let Some(mastodon) = publisher.mastodon.as_deref().filter(|m| !m.is_empty()) {
        let profile = mastodon
            .strip_prefix("https://")
            .or_else(|| mastodon.strip_prefix("http://"))
            .unwrap_or(mastodon);
        out.push_str(&format!(
            r#"<div class="mastodon-links"><a id="mastodonLink" href="{}" target="_blank" rel="nofollow noopener">{}</a>"#,
            esc(mastodon),
            esc(profile)
        ));
        if let Some(rss) = publisher.mastodon_rss.as_deref().filter(|r| !r.is_empty()) {
            out.push_str(&format!(
                r#"<a id="mastodonRss" href="{}" target="_blank" rel="nofollow noopener">RSS</a>"#,
                esc(rss)
            ));
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

pub fn load_more_button(noun: &str, remaining: usize) -> String {
    if remaining == 0 {
        return String::new();
    }
    format!(r#"<button class="btn load-more">Load more {noun} ({remaining} remaining)</button>"#)
}

pub fn result_count(count: usize) -> String {
    format!(r#"<p class="result-count"><span id="count">{count}</span> results</p>"#)
}

/// The visible part of a filtered publisher list plus its load-more control
pub fn publisher_list(publishers: &[&Publisher], pager: &Paginator) -> String {
    let mut out = result_count(publishers.len());
    out.push_str(r#"<div id="list" class="list">"#);
    for publisher in &publishers[pager.visible()] {
        out.push_str(&publisher_card(publisher));
    }
    out.push_str("</div>");
    out.push_str(&load_more_button("publishers", pager.remaining()));
    out
}

pub fn related_list(publishers: &[&Publisher], pager: &Paginator) -> String {
    let mut out = String::from(r#"<section class="card"><div class="list">"#);
    for publisher in &publishers[pager.visible()] {
        out.push_str(&publisher_card(publisher));
    }
    out.push_str("</div>");
    out.push_str(&load_more_button(
        "publishers from this category",
        pager.remaining(),
    ));
    out.push_str("</section>");
    out
}

pub fn kpis(stats: &CatalogStats) -> String {
    format!(
        r#"<div class="kpis"><div><b id="kpiTotal">{}</b> publishers</div><div><b id="kpiSocial">{}</b> with Mastodon</div><div><b id="kpiCats">{}</b> categories</div></div>"#,
        stats.total,
        stats.with_social,
        stats.categories.len()
    )
}

/// `<option>`s for the category select, alphabetical
pub fn category_options(stats: &CatalogStats) -> Result<String> {
    let mut out = String::from(r#"<option value="">All categories</option>"#);
    for (category, count) in &stats.categories {
        let category = esc(category);
        write!(
            out,
            r#"<option value="{category}">{category} ({count})</option>"#
        )?;
    }
    Ok(out)
}

pub fn category_chips(stats: &CatalogStats) -> Result<String> {
    let mut out = String::new();
    for (category, count) in stats.top_categories(CHIP_COUNT) {
        let class = if category.contains("Tehnologie") {
            "pill green"
        } else {
            "pill"
        };
        write!(
            out,
            r#"<span class="{class}"><i></i>{} <small>· {count}</small></span>"#,
            esc(category)
        )?;
    }
    Ok(out)
}

fn summary(text: &str) -> String {
    let mut chars = text.chars();
    let cut: String = chars.by_ref().take(SUMMARY_LIMIT).collect();
    let mut out = esc(&cut).into_owned();
    if chars.next().is_some() {
        out.push('…');
    }
    out
}

pub fn feed_item(item: &ArticleEntry) -> String {
    let title = if item.title.is_empty() {
        "Articol"
    } else {
        item.title.as_str()
    };
    let link = if item.link.is_empty() {
        "#"
    } else {
        item.link.as_str()
    };
    let mut meta = String::new();
    if !item.published_human.is_empty() {
        meta.push_str(&format!("<span>🗓️ {}</span>", esc(&item.published_human)));
    }
    if !item.source.is_empty() {
        meta.push_str(&format!("<span>🔗 {}</span>", esc(&item.source)));
    }
    let sum = if item.summary.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="sum">{}</div>"#, summary(&item.summary))
    };
    format!(
        r#"<div class="feed-item"><a href="{}" target="_blank" rel="noopener" class="feed-title-text">{}</a><div class="meta">{meta}</div>{sum}</div>"#,
        esc(link),
        esc(title),
    )
}

/// One paginated panel of feed entries, or the empty-cache notice
pub fn feed_panel(id: &str, items: &[ArticleEntry], pager: &Paginator) -> String {
    let mut out = format!(r#"<div id="{id}">"#);
    if items.is_empty() {
        out.push_str(&notice(FEED_EMPTY));
    } else {
        for item in &items[pager.visible()] {
            out.push_str(&feed_item(item));
        }
    }
    out.push_str("</div>");
    out.push_str(&load_more_button("articles", pager.remaining()));
    out
}

pub fn updated_line(view: &FeedView) -> String {
    let updated = match view {
        FeedView::Loaded(snapshot) => snapshot.updated(),
        FeedView::NotYetAvailable => None,
    };
    let text = match updated {
        Some(at) => format!("Last update: {}", at.format("%b %d, %Y")),
        None => "Last update: pending".to_string(),
    };
    format!(r#"<p id="updatedAt">{text}</p>"#)
}

/// The feed section of a publisher page. `more` load-more actions are
/// applied to each panel.
pub fn feed_view(view: &FeedView, publisher: &Publisher, page: PageSize, more: usize) -> String {
    let snapshot = match view {
        FeedView::NotYetAvailable => {
            return format!(r#"<div id="status">{}</div>"#, notice(FEED_MISSING));
        }
        FeedView::Loaded(snapshot) => snapshot,
    };
    let mut out = updated_line(view);
    let articles = page.pager(snapshot.items.len(), more);
    out.push_str(&feed_panel("siteFeed", &snapshot.items, &articles));
    if publisher.has_social() {
        let social = snapshot.social_articles();
        let pager = page.pager(social.len(), more);
        out.push_str(r#"<div id="mastodonBlock">"#);
        out.push_str(&feed_panel("mastodonFeed", &social, &pager));
        out.push_str("</div>");
    }
    out
}

pub fn digest_widget(entries: &[DigestEntry]) -> String {
    if entries.is_empty() {
        return notice(DIGEST_EMPTY);
    }
    let mut out = String::from(r#"<div class="digest">"#);
    for DigestEntry { slug, name, entry } in entries {
        let publisher_path = format!("/publisher/{}/", crate::catalog::encode_component(slug));
        let when = if entry.published_human.is_empty() {
            String::new()
        } else {
            format!(" · {}", esc(&entry.published_human))
        };
        let sum = if entry.summary.is_empty() {
            String::new()
        } else {
            format!(r#"<div class="sum">{}</div>"#, summary(&entry.summary))
        };
        out.push_str(&format!(
            r#"<div class="digest-item"><a href="{link}" target="_blank" rel="noopener">{title}</a><div class="meta"><a href="{path}">{name}</a>{when}</div>{sum}</div>"#,
            link = esc(if entry.link.is_empty() { "#" } else { entry.link.as_str() }),
            title = esc(if entry.title.is_empty() { "Update" } else { entry.title.as_str() }),
            path = esc(&publisher_path),
            name = esc(name),
        ));
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::tests::catalog,
        feed::{FeedSnapshot, SocialEntry},
        filter::Filter,
    };

    fn articles(n: usize) -> Vec<ArticleEntry> {
        (0..n)
            .map(|i| ArticleEntry {
                title: format!("Story {i}"),
                link: format!("https://example.org/{i}"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn card_escapes_fields() {
        let mut publisher = catalog().sites[0].clone();
        publisher.name = "<b>Alpha</b> & co".into();
        let card = publisher_card(&publisher);
        assert!(card.contains("&lt;b&gt;Alpha&lt;/b&gt; &amp; co"));
        assert!(card.contains(r#"href="/publisher/alpha/""#));
        assert!(card.contains("tag social"));
        assert!(card.contains("Medical press releases"));
        assert!(card.contains("<small>alpha.example</small>"));
    }

    #[test]
    fn list_shows_page_and_remaining() {
        let catalog = catalog();
        let found = Filter::default().apply(&catalog.sites);
        let pager = PageSize::new(2, 2).pager(found.len(), 0);
        let html = publisher_list(&found, &pager);
        assert!(html.contains(r#"<span id="count">3</span>"#));
        assert_eq!(html.matches(r#"class="site""#).count(), 2);
        assert!(html.contains("(1 remaining)"));

        let pager = PageSize::new(2, 2).pager(found.len(), 1);
        let html = publisher_list(&found, &pager);
        assert_eq!(html.matches(r#"class="site""#).count(), 3);
        assert!(!html.contains("load-more"));
    }

    #[test]
    fn zero_results_is_a_count() {
        let html = publisher_list(&[], &Paginator::new(0, 24, 12));
        assert!(html.contains(r#"<span id="count">0</span>"#));
    }

    #[test]
    fn chips_and_options() {
        let stats = catalog().stats();
        let options = category_options(&stats).unwrap();
        assert!(options.starts_with(r#"<option value="">"#));
        assert!(options.contains(r#"<option value="Health">Health (1)</option>"#));
        let chips = category_chips(&stats).unwrap();
        assert_eq!(chips.matches("pill").count(), 3);
        assert!(chips.contains("pill green"));
    }

    #[test]
    fn long_summary_is_cut() {
        let item = ArticleEntry {
            summary: "x".repeat(SUMMARY_LIMIT + 10),
            ..Default::default()
        };
        let html = feed_item(&item);
        assert!(html.contains(&format!("{}…", "x".repeat(SUMMARY_LIMIT))));
        assert!(html.contains(">Articol</a>"));
        assert!(html.contains(r##"href="#""##));

        let exact = ArticleEntry {
            summary: "y".repeat(SUMMARY_LIMIT),
            ..Default::default()
        };
        assert!(!feed_item(&exact).contains('…'));
    }

    #[test]
    fn empty_items_show_notice() {
        let view = FeedView::Loaded(FeedSnapshot::default());
        let html = feed_view(&view, &catalog().sites[1], PageSize::new(5, 5), 0);
        assert!(html.contains(FEED_EMPTY));
        assert!(html.contains("Last update: pending"));
        assert!(!html.contains("mastodonFeed"));
    }

    #[test]
    fn missing_feed_shows_only_notice() {
        let html = feed_view(
            &FeedView::NotYetAvailable,
            &catalog().sites[0],
            PageSize::new(5, 5),
            0,
        );
        assert!(html.contains(FEED_MISSING));
        assert!(!html.contains("updatedAt"));
    }

    #[test]
    fn feed_panels_paginate_separately() {
        let snapshot = FeedSnapshot {
            updated_at: Some("2025-03-04T10:00:00+00:00".into()),
            items: articles(7),
            social: vec![SocialEntry {
                title: "toot".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let view = FeedView::Loaded(snapshot);
        let html = feed_view(&view, &catalog().sites[0], PageSize::new(5, 5), 0);
        assert!(html.contains("Last update: Mar 04, 2025"));
        assert_eq!(html.matches("feed-item").count(), 6);
        assert!(html.contains("Load more articles (2 remaining)"));
        assert!(html.contains("🔗 Mastodon"));

        let html = feed_view(&view, &catalog().sites[0], PageSize::new(5, 5), 1);
        assert_eq!(html.matches("feed-item").count(), 8);
        assert!(!html.contains("remaining"));
    }

    #[test]
    fn digest_renders_entries_or_notice() {
        assert_eq!(digest_widget(&[]), notice(DIGEST_EMPTY));
        let entry = DigestEntry {
            slug: "alpha".into(),
            name: "Alpha News".into(),
            entry: SocialEntry {
                title: "Hello".into(),
                link: "https://social.example/1".into(),
                published_human: "2025-03-04".into(),
                ..Default::default()
            },
        };
        let html = digest_widget(&[entry]);
        assert!(html.contains(">Hello</a>"));
        assert!(html.contains(r#"<a href="/publisher/alpha/">Alpha News</a> · 2025-03-04"#));
    }

    #[test]
    fn html_output_is_passthrough() {
        assert_eq!(Output::Html.format("<p>x</p>").unwrap(), "<p>x</p>");
    }

    #[test]
    fn markdown_output_converts() {
        assert_eq!(Output::Markdown.format("<b>x</b>").unwrap(), "**x**");
    }

    #[test]
    fn header_links_with_social() {
        let html = publisher_header(&catalog().sites[0]);
        assert!(html.contains(
            r#"<a id="siteLink" href="https://alpha.example/" target="_blank" rel="noopener">alpha.example</a>"#
        ));
        assert!(html.contains(r#"id="rssLink" href="https://alpha.example/feed/" target="_blank" rel="nofollow noopener""#));
        assert!(html.contains(r#"rel="nofollow noopener">social.example/@alpha</a>"#));
        assert!(html.contains(r#"<a id="mastodonRss" href="https://social.example/@alpha.rss""#));
    }

    #[test]
    fn header_links_without_social() {
        let html = publisher_header(&catalog().sites[1]);
        assert!(html.contains(r#"id="siteLink" href="http://beta.example""#));
        assert!(html.contains(r#"id="rssLink""#));
        assert!(!html.contains("mastodonLink"));
        assert!(!html.contains("mastodonRss"));
    }
}
