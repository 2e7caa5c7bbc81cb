use core::fmt;
use std::{fmt::Write, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{digest::DigestOptions, paginate::PageSize, Error, Result};

const DEFAULT_DATA_ROOT: &str = "https://release-press-releases-romania.github.io/data/";

const KEYS: &[&str] = &[
    "data_root",
    "list_page_size",
    "list_batch",
    "feed_page_size",
    "feed_batch",
    "related_page_size",
    "digest_sample",
    "digest_top",
    "digest_delay_ms",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where `sites.json` and `feeds/` live, `http(s)` or `file`
    pub data_root: Url,
    pub list_page_size: usize,
    pub list_batch: usize,
    pub feed_page_size: usize,
    pub feed_batch: usize,
    /// Related publishers are revealed this many at a time
    pub related_page_size: usize,
    pub digest_sample: usize,
    pub digest_top: usize,
    pub digest_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: Url::parse(DEFAULT_DATA_ROOT).expect("default data root is a valid url"),
            list_page_size: 24,
            list_batch: 12,
            feed_page_size: 5,
            feed_batch: 5,
            related_page_size: 3,
            digest_sample: 8,
            digest_top: 1,
            digest_delay_ms: 150,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in KEYS {
            self.report(key, f)?;
        }
        Ok(())
    }
}

impl Config {
    pub fn list_pages(&self) -> PageSize {
        PageSize::new(self.list_page_size, self.list_batch)
    }

    pub fn feed_pages(&self) -> PageSize {
        PageSize::new(self.feed_page_size, self.feed_batch)
    }

    pub fn related_pages(&self) -> PageSize {
        PageSize::new(self.related_page_size, self.related_page_size)
    }

    pub fn digest_options(&self) -> DigestOptions {
        DigestOptions::builder()
            .sample(self.digest_sample)
            .top(self.digest_top)
            .delay(Duration::from_millis(self.digest_delay_ms))
            .build()
    }

    pub fn report_key(&self, key: &str) -> Result<String> {
        if !KEYS.contains(&key) {
            return Err(Error::UnknownKey(key.to_string()));
        }
        let mut s = String::new();
        self.report(key, &mut s)?;
        Ok(s)
    }

    fn report(&self, key: &str, f: &mut impl Write) -> fmt::Result {
        match key {
            "data_root" => writeln!(f, "data_root = {}", self.data_root),
            "list_page_size" => writeln!(f, "list_page_size = {}", self.list_page_size),
            "list_batch" => writeln!(f, "list_batch = {}", self.list_batch),
            "feed_page_size" => writeln!(f, "feed_page_size = {}", self.feed_page_size),
            "feed_batch" => writeln!(f, "feed_batch = {}", self.feed_batch),
            "related_page_size" => writeln!(f, "related_page_size = {}", self.related_page_size),
            "digest_sample" => writeln!(f, "digest_sample = {}", self.digest_sample),
            "digest_top" => writeln!(f, "digest_top = {}", self.digest_top),
            "digest_delay_ms" => writeln!(f, "digest_delay_ms = {}", self.digest_delay_ms),
            _ => Ok(()),
        }
    }

    /// Reset a key to its default value
    pub fn delete_key(&mut self, key: &str) -> Result {
        let defaults = Config::default();
        match key {
            "data_root" => self.data_root = defaults.data_root,
            "list_page_size" => self.list_page_size = defaults.list_page_size,
            "list_batch" => self.list_batch = defaults.list_batch,
            "feed_page_size" => self.feed_page_size = defaults.feed_page_size,
            "feed_batch" => self.feed_batch = defaults.feed_batch,
            "related_page_size" => self.related_page_size = defaults.related_page_size,
            "digest_sample" => self.digest_sample = defaults.digest_sample,
            "digest_top" => self.digest_top = defaults.digest_top,
            "digest_delay_ms" => self.digest_delay_ms = defaults.digest_delay_ms,
            _ => return Err(Error::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn update_key(&mut self, key: &str, value: String) -> Result {
        match key {
            "data_root" => self.data_root = crate::parse_data_root(&value)?,
            "list_page_size" => self.list_page_size = parse_value(key, &value)?,
            "list_batch" => self.list_batch = parse_value(key, &value)?,
            "feed_page_size" => self.feed_page_size = parse_value(key, &value)?,
            "feed_batch" => self.feed_batch = parse_value(key, &value)?,
            "related_page_size" => self.related_page_size = parse_value(key, &value)?,
            "digest_sample" => self.digest_sample = parse_value(key, &value)?,
            "digest_top" => self.digest_top = parse_value(key, &value)?,
            "digest_delay_ms" => self.digest_delay_ms = parse_value(key, &value)?,
            _ => return Err(Error::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e| {
        log::warn!("bad value for `{key}`: {value}");
        Error::InvalidArgument(format!("`{key}` expects a number: {e}"))
    })
}
