use std::path::{Path, PathBuf};

use reqwest::header::CACHE_CONTROL;
use serde::de::DeserializeOwned;
use url::Url;

mod catalog;
mod config;
mod digest;
mod error;
mod feed;
mod filter;
mod paginate;
mod render;

pub use catalog::{load_catalog, Catalog, CatalogStats, Publisher, DEFAULT_CATEGORY};
pub use config::Config;
pub use digest::{collect_digest, sort_latest, DigestEntry, DigestOptions};
pub use error::Error;
pub use feed::{
    fetch_snapshot, load_feed, parse_timestamp, ArticleEntry, FeedSnapshot, FeedView, SocialEntry,
};
pub use filter::Filter;
pub use paginate::{PageSize, Paginator};
pub use render::Output;

pub(crate) type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Fetch and parse a JSON document from an `http(s)` or `file` url
pub async fn fetch_json<T: DeserializeOwned>(url: Url) -> Result<T> {
    let raw = match url.scheme() {
        "http" | "https" => fetch_text_reqwest(url.clone()).await?,
        "file" => fetch_text_fs(url.clone()).await?,
        scheme => {
            log::warn!("bad scheme in url: {url}");
            return Err(Error::UnknownScheme(scheme.to_string()));
        }
    };
    Ok(serde_json::from_str(&raw).inspect_err(|e| {
        log::warn!("Failed to deserialize {url}: {e}");
    })?)
}

async fn fetch_text_reqwest(url: Url) -> Result<String> {
    let client = reqwest::Client::new();
    Ok(client
        .get(url.clone())
        .header(CACHE_CONTROL, "no-store")
        .send()
        .await
        .inspect_err(|e| log::warn!("Error fetching {url}: {e}"))?
        .error_for_status()
        .inspect_err(|e| {
            log::warn!("Error fetching url: {e}");
        })?
        .text()
        .await
        .inspect_err(|e| log::warn!("Response from {url} failed to read as text: {e}"))?)
}

async fn fetch_text_fs(url: Url) -> Result<String> {
    let path = url.to_file_path().map_err(|_| {
        log::warn!("cannot convert url to file path: {url}");
        Error::InvalidFileUrl(url.clone())
    })?;
    Ok(tokio::fs::read_to_string(&path)
        .await
        .inspect_err(|e| log::warn!("Error reading path `{}`: {e}", path.display()))?)
}

/// Append percent-encoded path segments to the data root
pub(crate) fn data_url(data_root: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = data_root.clone();
    url.path_segments_mut()
        .map_err(|_| Error::CannotBeBase(data_root.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Accept either a url or a local directory as the data root
pub fn parse_data_root(value: &str) -> Result<Url> {
    match Url::parse(value) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = std::path::absolute(Path::new(value))?;
            Url::from_directory_path(&path).map_err(|_| {
                Error::InvalidArgument(format!("`{}` is not a usable directory", path.display()))
            })
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn get_config() -> Result<Config> {
    let path = get_config_path(None);
    if !path.exists() {
        log::debug!("no config at `{}`, using defaults", path.display());
        return Ok(Config::default());
    }
    let toml_str = tokio::fs::read_to_string(&path).await.inspect_err(|e| {
        log::warn!("failed to read config at path `{}`: {e}", path.display());
    })?;
    Ok(toml::from_str(&toml_str).inspect_err(|e| {
        log::warn!("Bad toml in config: {e} \n`{toml_str}`");
    })?)
}

pub async fn save_config(config: &Config, path: impl Into<Option<PathBuf>>) -> Result {
    let path = path.into().unwrap_or_else(|| get_config_path(None));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let toml_str = toml::to_string_pretty(config)
        .inspect_err(|e| log::warn!("Error serializing toml: {e}\n{config:#?}"))?;
    tokio::fs::write(&path, toml_str).await.inspect_err(|e| {
        log::warn!("Error writing toml to `{}`: {e}", path.display());
    })?;
    Ok(())
}

pub fn get_config_path(base_path: impl Into<Option<PathBuf>>) -> PathBuf {
    base_path
        .into()
        .unwrap_or_else(get_project_dir)
        .join("config.toml")
}

pub fn get_project_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "release-press", "pressdir")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".pressdir"))
}

/// Load the catalog, logging rather than returning a failure
async fn try_load_catalog(config: &Config) -> Option<Catalog> {
    load_catalog(&config.data_root)
        .await
        .inspect_err(|e| log::warn!("catalog unavailable: {e}"))
        .ok()
}

/// The filtered publisher list after `more` load-more actions
pub async fn render_list(config: &Config, filter: &Filter, more: usize) -> String {
    let Some(catalog) = try_load_catalog(config).await else {
        return render::notice(render::CATALOG_MISSING);
    };
    let found = filter.apply(&catalog.sites);
    log::debug!("{} of {} publishers match {filter:?}", found.len(), catalog.sites.len());
    let pager = config.list_pages().pager(found.len(), more);
    render::publisher_list(&found, &pager)
}

pub async fn run_list(config: &Config, output: Output, filter: Filter, more: usize) -> Result {
    output.emit(&render_list(config, &filter, more).await)
}

pub async fn render_categories(config: &Config) -> Result<String> {
    let Some(catalog) = try_load_catalog(config).await else {
        return Ok(render::notice(render::CATALOG_MISSING));
    };
    let stats = catalog.stats();
    let mut html = render::kpis(&stats);
    html.push_str(r#"<select id="category">"#);
    html.push_str(&render::category_options(&stats)?);
    html.push_str(r#"</select><div id="chips">"#);
    html.push_str(&render::category_chips(&stats)?);
    html.push_str("</div>");
    Ok(html)
}

pub async fn run_categories(config: &Config, output: Output) -> Result {
    output.emit(&render_categories(config).await?)
}

/// A publisher's page: header links when the catalog knows the slug, then
/// its feeds. Without a catalog only the articles are shown.
pub async fn render_feed(config: &Config, slug: &str, more: usize) -> String {
    let catalog = try_load_catalog(config).await;
    let known = catalog.as_ref().and_then(|c| c.find(slug));
    if known.is_none() {
        log::debug!("`{slug}` not in catalog, showing feed only");
    }
    let fallback = Publisher {
        slug: slug.to_string(),
        ..Default::default()
    };
    let publisher = known.unwrap_or(&fallback);
    let view = load_feed(&config.data_root, slug).await;
    let mut html = known.map(render::publisher_header).unwrap_or_default();
    html.push_str(&render::feed_view(&view, publisher, config.feed_pages(), more));
    html
}

pub async fn run_feed(config: &Config, output: Output, slug: &str, more: usize) -> Result {
    output.emit(&render_feed(config, slug, more).await)
}

pub async fn render_related(config: &Config, slug: &str, more: usize) -> String {
    let Some(catalog) = try_load_catalog(config).await else {
        return render::notice(render::CATALOG_MISSING);
    };
    let related = catalog.related(slug);
    let pager = config.related_pages().pager(related.len(), more);
    render::related_list(&related, &pager)
}

pub async fn run_related(config: &Config, output: Output, slug: &str, more: usize) -> Result {
    output.emit(&render_related(config, slug, more).await)
}

pub async fn run_digest(config: &Config, output: Output, options: DigestOptions) -> Result {
    let entries = match try_load_catalog(config).await {
        Some(catalog) => collect_digest(&config.data_root, &catalog.sites, &options).await,
        None => Vec::new(),
    };
    output.emit(&render::digest_widget(&entries))
}

pub async fn run_setup(force: bool) -> Result {
    let path = get_config_path(None);
    if path.exists() && !force {
        return Err(Error::PreviouslySetup);
    }
    save_config(&Config::default(), path.clone()).await?;
    println!("Wrote default config to `{}`", path.display());
    Ok(())
}

pub async fn run_config(delete: bool, key: Option<String>, value: Option<String>) -> Result {
    let mut config = get_config().await?;
    let Some(key) = key else {
        print!("{config}");
        return Ok(());
    };
    if delete {
        config.delete_key(&key)?;
    } else if let Some(value) = value {
        config.update_key(&key, value)?;
    } else {
        print!("{}", config.report_key(&key)?);
        return Ok(());
    }
    save_config(&config, None).await
}
