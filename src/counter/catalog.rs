//! Content catalog abstraction
//!
//! The counter never owns content data. Items, path aliases, languages and
//! the front page come from the host through this trait.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{LanguageConfig, SiteConfig};
use crate::errors::Result;

/// A content item known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub nid: i64,
    pub bundle: String,
    #[serde(default)]
    pub revision_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

/// A language-specific alias of a system path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAlias {
    /// System path, e.g. `/node/1`
    pub path: String,
    pub alias: String,
    pub langcode: String,
}

#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Whether the item is the site's front page
    fn is_front_page(&self, nid: i64) -> bool;

    fn languages(&self) -> &[LanguageConfig];

    fn default_language(&self) -> &str;

    async fn get_item(&self, nid: i64) -> Result<Option<ContentItem>>;

    /// Published items ordered by nid
    async fn published_items(&self) -> Result<Vec<ContentItem>>;

    async fn count_published(&self) -> Result<u64>;

    /// Alias of a system path in the given language
    async fn alias_for_path(&self, path: &str, langcode: &str) -> Result<Option<String>>;

    /// System path an alias points to, in any language
    async fn path_for_alias(&self, alias: &str) -> Result<Option<String>>;
}

/// In-memory catalog for tests and embedding
pub struct MemoryContentCatalog {
    site: SiteConfig,
    items: RwLock<BTreeMap<i64, ContentItem>>,
    // (path, langcode) -> alias
    aliases: RwLock<HashMap<(String, String), String>>,
}

impl MemoryContentCatalog {
    pub fn new(site: SiteConfig) -> Self {
        Self {
            site,
            items: RwLock::new(BTreeMap::new()),
            aliases: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_item(&self, item: ContentItem) {
        self.items.write().insert(item.nid, item);
    }

    pub fn add_alias(&self, path: &str, alias: &str, langcode: &str) {
        self.aliases
            .write()
            .insert((path.to_string(), langcode.to_string()), alias.to_string());
    }
}

#[async_trait]
impl ContentCatalog for MemoryContentCatalog {
    fn is_front_page(&self, nid: i64) -> bool {
        self.site.front_page_item == Some(nid)
    }

    fn languages(&self) -> &[LanguageConfig] {
        &self.site.languages
    }

    fn default_language(&self) -> &str {
        &self.site.default_language
    }

    async fn get_item(&self, nid: i64) -> Result<Option<ContentItem>> {
        Ok(self.items.read().get(&nid).cloned())
    }

    async fn published_items(&self) -> Result<Vec<ContentItem>> {
        Ok(self
            .items
            .read()
            .values()
            .filter(|item| item.published)
            .cloned()
            .collect())
    }

    async fn count_published(&self) -> Result<u64> {
        Ok(self.items.read().values().filter(|i| i.published).count() as u64)
    }

    async fn alias_for_path(&self, path: &str, langcode: &str) -> Result<Option<String>> {
        Ok(self
            .aliases
            .read()
            .get(&(path.to_string(), langcode.to_string()))
            .cloned())
    }

    async fn path_for_alias(&self, alias: &str) -> Result<Option<String>> {
        let aliases = self.aliases.read();
        let mut matches: Vec<&(String, String)> = aliases
            .iter()
            .filter(|(_, a)| a.as_str() == alias)
            .map(|(key, _)| key)
            .collect();
        // 多语言命中时优先默认语言
        matches.sort_by_key(|(_, lang)| lang != &self.site.default_language);
        Ok(matches.first().map(|(path, _)| path.clone()))
    }
}

/// Registration side of the catalog, fed by the admin API
#[async_trait]
pub trait ContentRegistry: Send + Sync {
    async fn register_items(&self, items: &[ContentItem]) -> Result<usize>;

    async fn register_aliases(&self, aliases: &[PathAlias]) -> Result<usize>;
}

#[async_trait]
impl ContentRegistry for MemoryContentCatalog {
    async fn register_items(&self, items: &[ContentItem]) -> Result<usize> {
        for item in items {
            self.add_item(item.clone());
        }
        Ok(items.len())
    }

    async fn register_aliases(&self, aliases: &[PathAlias]) -> Result<usize> {
        for alias in aliases {
            self.add_alias(&alias.path, &alias.alias, &alias.langcode);
        }
        Ok(aliases.len())
    }
}
