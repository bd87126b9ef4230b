#![deny(missing_docs)]

//! # Sidecar Metadata
//!
//! Reads the crawler's `info.md`, a short list of `- key: value` lines:
//!
//! ```text
//! # 爬虫信息
//! - 禅道版本: 18.0
//! - 爬取时间: 2024-01-01 10:00:00
//! - API文档URL: http://host/zentao/dev-api-restapi.html
//! - 账号: admin
//! ```
//!
//! Both ASCII and full-width colons are accepted. Missing keys stay empty.

use crate::error::AppResult;
use log::warn;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// File name of the sidecar inside an input directory.
pub const SIDECAR_FILE_NAME: &str = "info.md";

const VERSION_KEY: &str = "禅道版本";
const CRAWLED_AT_KEY: &str = "爬取时间";
const SOURCE_URL_KEY: &str = "API文档URL";
const ACCOUNT_KEY: &str = "账号";

/// Crawl provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidecarMetadata {
    /// Product version.
    pub version: String,
    /// Crawl timestamp, verbatim.
    pub crawled_at: String,
    /// URL of the crawled documentation.
    pub source_url: String,
    /// Account used by the crawler.
    pub account: String,
}

impl SidecarMetadata {
    /// Extracts the four known keys from sidecar text. Unknown lines are ignored;
    /// for repeated keys the first occurrence wins.
    pub fn parse(text: &str) -> Self {
        let mut meta = Self::default();
        for line in text.lines() {
            let Some((key, value)) = split_entry(line) else {
                continue;
            };
            let slot = match key {
                VERSION_KEY => &mut meta.version,
                CRAWLED_AT_KEY => &mut meta.crawled_at,
                SOURCE_URL_KEY => &mut meta.source_url,
                ACCOUNT_KEY => &mut meta.account,
                _ => continue,
            };
            if slot.is_empty() {
                *slot = value.to_string();
            }
        }
        meta
    }

    /// Reads and parses a sidecar file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Like [`SidecarMetadata::load`], but an unreadable file yields empty metadata.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Could not read sidecar {:?}: {}; using empty metadata", path, e);
                Self::default()
            }
        }
    }

    /// The four-line `info.description` text.
    pub fn description(&self) -> String {
        format!(
            "{}: {}\n{}: {}\n{}: {}\n{}: {}",
            VERSION_KEY,
            self.version,
            CRAWLED_AT_KEY,
            self.crawled_at,
            SOURCE_URL_KEY,
            self.source_url,
            ACCOUNT_KEY,
            self.account
        )
    }
}

/// Splits `- key: value` at the first ASCII or full-width colon.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let line = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .unwrap_or(line)
        .trim_start();
    let (key, value) = line.split_once([':', '：'])?;
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "# 爬虫信息\n\n- 禅道版本: 18.0\n- 爬取时间: 2024-01-01 10:00:00\n- API文档URL: http://host/zentao/dev-api.html\n- 账号: admin\n";

    #[test]
    fn test_parse_all_keys() {
        let meta = SidecarMetadata::parse(SAMPLE);
        assert_eq!(meta.version, "18.0");
        // Only the first colon separates key from value.
        assert_eq!(meta.crawled_at, "2024-01-01 10:00:00");
        assert_eq!(meta.source_url, "http://host/zentao/dev-api.html");
        assert_eq!(meta.account, "admin");
    }

    #[test]
    fn test_full_width_colon_and_missing_keys() {
        let meta = SidecarMetadata::parse("禅道版本： 20.1\n");
        assert_eq!(meta.version, "20.1");
        assert!(meta.source_url.is_empty());
        assert!(meta.account.is_empty());
    }

    #[test]
    fn test_description_format() {
        let meta = SidecarMetadata {
            version: "18.0".into(),
            ..Default::default()
        };
        assert_eq!(
            meta.description(),
            "禅道版本: 18.0\n爬取时间: \nAPI文档URL: \n账号: "
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let meta = SidecarMetadata::load(file.path()).unwrap();
        assert_eq!(meta.account, "admin");
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let meta = SidecarMetadata::load_or_default(Path::new("/definitely/not/here/info.md"));
        assert_eq!(meta, SidecarMetadata::default());
    }
}
