//! 路径计数合并与按内容条目汇总
//!
//! 路径以转义后截断的形式存储，哈希基于存储形式计算；
//! 查询时对别名做同样的处理，保证两边一致。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_128;

use super::catalog::ContentCatalog;
use super::format::format_number;
use crate::errors::Result;
use crate::storage::{
    ItemTotalRepository, MirrorField, MirrorKey, PathCountRow, PathCounterRepository,
};

/// 存储路径的最大字符数
pub const MAX_PATH_CHARS: usize = 2047;

/// 首页只统计根路径
pub const FRONT_PAGE_PATH: &str = "/";

/// 规范为以单个 `/` 开头、无尾部斜杠的形式
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches(|c| c == ' ' || c == '/'))
}

/// 路径的存储形式：HTML 转义（`& < > " '`）后截断到 2047 个字符
pub fn storage_form(path: &str) -> String {
    html_escape::encode_quoted_attribute(path)
        .chars()
        .take(MAX_PATH_CHARS)
        .collect()
}

/// 存储形式的哈希
pub fn path_hash(stored: &str) -> String {
    format!("{:032x}", xxh3_128(stored.as_bytes()))
}

/// 原始路径 → 哈希
pub fn hash_for_path(path: &str) -> String {
    path_hash(&storage_form(path))
}

/// 计算一个条目的全部已知路径（去重，保持首次出现顺序）
///
/// 包含 `/node/{nid}`、各语言别名、带语言前缀的变体，以及以上所有路径的尾斜杠版本。
pub async fn build_alias_set(catalog: &dyn ContentCatalog, nid: i64) -> Result<Vec<String>> {
    let system_path = format!("/node/{}", nid);
    let mut aliases = vec![system_path.clone()];

    for language in catalog.languages() {
        let alias = catalog
            .alias_for_path(&system_path, &language.code)
            .await?
            .unwrap_or_else(|| system_path.clone());
        aliases.push(alias.clone());

        let prefix = language.prefix.trim_matches('/');
        if !prefix.is_empty() {
            aliases.push(format!("/{}{}", prefix, system_path));
            aliases.push(format!("/{}{}", prefix, alias));
        }
    }

    let with_slash: Vec<String> = aliases.iter().map(|a| format!("{}/", a)).collect();
    aliases.extend(with_slash);

    let mut seen = HashSet::new();
    aliases.retain(|a| seen.insert(a.clone()));
    Ok(aliases)
}

pub struct PathAggregator {
    paths: PathCounterRepository,
    totals: ItemTotalRepository,
    mirror: MirrorField,
    catalog: Arc<dyn ContentCatalog>,
}

impl PathAggregator {
    pub fn new(
        paths: PathCounterRepository,
        totals: ItemTotalRepository,
        mirror: MirrorField,
        catalog: Arc<dyn ContentCatalog>,
    ) -> Self {
        Self {
            paths,
            totals,
            mirror,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ContentCatalog> {
        &self.catalog
    }

    /// 将一页 `(path, pageviews)` 写入原始计数表
    pub async fn merge_raw_counts(&self, rows: &[(String, i64)]) -> Result<usize> {
        let rows: Vec<PathCountRow> = rows
            .iter()
            .map(|(path, pageviews)| {
                let stored = storage_form(path);
                PathCountRow {
                    path_hash: path_hash(&stored),
                    path: stored,
                    pageviews: *pageviews,
                }
            })
            .collect();

        let saved = self.paths.upsert_many(&rows).await?;
        info!("Saved {} paths from analytics into the database", rows.len());
        Ok(saved)
    }

    /// 一组路径的浏览量之和，重复路径只计一次
    pub async fn sum_pageviews<S: AsRef<str>>(&self, paths: &[S]) -> Result<i64> {
        let hashes: Vec<String> = paths.iter().map(|p| hash_for_path(p.as_ref())).collect();
        self.paths.sum_by_hashes(&hashes).await
    }

    /// 重新计算条目的汇总值并写入汇总表（及镜像字段）
    pub async fn aggregate_item(&self, nid: i64, bundle: &str, revision_id: i64) -> Result<i64> {
        let total = if self.catalog.is_front_page(nid) {
            self.sum_pageviews(&[FRONT_PAGE_PATH]).await?
        } else {
            let aliases = build_alias_set(self.catalog.as_ref(), nid).await?;
            self.sum_pageviews(&aliases).await?
        };

        self.totals.upsert(nid, total).await?;

        let key = MirrorKey {
            entity_id: nid,
            revision_id,
            bundle: bundle.to_string(),
            langcode: self.catalog.default_language().to_string(),
        };
        if self.mirror.upsert(&key, total).await? {
            debug!("Mirrored total {} for item {}", total, nid);
        }

        Ok(total)
    }

    /// 某个路径的浏览量（带千分位）
    pub async fn display_count(&self, path: &str) -> Result<String> {
        let path = normalize_path(path);

        let total = if self.is_front_page_path(&path).await? {
            self.sum_pageviews(&[FRONT_PAGE_PATH]).await?
        } else {
            let system_path = self
                .catalog
                .path_for_alias(&path)
                .await?
                .unwrap_or_else(|| path.clone());
            let alias = self
                .catalog
                .alias_for_path(&system_path, self.catalog.default_language())
                .await?
                .unwrap_or_else(|| system_path.clone());
            let candidates = [
                alias,
                format!("{}/", path),
                path,
                format!("{}/", system_path),
                system_path,
            ];
            self.sum_pageviews(&candidates).await?
        };

        Ok(format_number(total))
    }

    async fn is_front_page_path(&self, path: &str) -> Result<bool> {
        if path == FRONT_PAGE_PATH {
            return Ok(true);
        }
        let system_path = self
            .catalog
            .path_for_alias(path)
            .await?
            .unwrap_or_else(|| path.to_string());
        Ok(system_path
            .strip_prefix("/node/")
            .and_then(|id| id.parse::<i64>().ok())
            .is_some_and(|nid| self.catalog.is_front_page(nid)))
    }

    /// 已存储的条目汇总值
    pub async fn stored_item_total(&self, nid: i64) -> Result<Option<i64>> {
        self.totals.get(nid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LanguageConfig, SiteConfig};
    use crate::counter::catalog::MemoryContentCatalog;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path(" /about/ "), "/about");
        assert_eq!(normalize_path("node/1"), "/node/1");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_storage_form_escapes_then_truncates() {
        assert_eq!(storage_form("/a?b=1&c=<x>"), "/a?b=1&amp;c=&lt;x&gt;");
        assert_eq!(storage_form("/it's"), "/it&#x27;s");
        assert_eq!(storage_form("/q\"x\""), "/q&quot;x&quot;");

        let long = format!("/{}", "a".repeat(3000));
        assert_eq!(storage_form(&long).chars().count(), MAX_PATH_CHARS);

        let amps = "&".repeat(1000);
        let stored = storage_form(&amps);
        assert_eq!(stored.chars().count(), MAX_PATH_CHARS);
        assert!(stored.starts_with("&amp;&amp;"));
    }

    #[test]
    fn test_hash_is_stable_and_hex() {
        let h = hash_for_path("/node/1");
        assert_eq!(h.len(), 32);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, hash_for_path("/node/1"));
        assert_ne!(h, hash_for_path("/node/1/"));
    }

    #[tokio::test]
    async fn test_alias_set_with_language_prefixes() {
        let site = SiteConfig {
            front_page_item: None,
            default_language: "en".into(),
            languages: vec![
                LanguageConfig {
                    code: "en".into(),
                    prefix: String::new(),
                },
                LanguageConfig {
                    code: "fr".into(),
                    prefix: "fr".into(),
                },
            ],
        };
        let catalog = MemoryContentCatalog::new(site);
        catalog.add_alias("/node/7", "/about", "en");
        catalog.add_alias("/node/7", "/a-propos", "fr");

        let aliases = build_alias_set(&catalog, 7).await.unwrap();
        let expected = [
            "/node/7",
            "/about",
            "/a-propos",
            "/fr/node/7",
            "/fr/a-propos",
            "/node/7/",
            "/about/",
            "/a-propos/",
            "/fr/node/7/",
            "/fr/a-propos/",
        ];
        assert_eq!(aliases, expected);
    }

    #[tokio::test]
    async fn test_alias_set_without_aliases_dedupes() {
        let catalog = MemoryContentCatalog::new(SiteConfig::default());
        let aliases = build_alias_set(&catalog, 3).await.unwrap();
        assert_eq!(aliases, vec!["/node/3", "/node/3/"]);
    }
}
