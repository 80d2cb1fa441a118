//! Shared test setup: temporary SQLite storage and a scripted analytics API

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use gacounter::analytics::{
    AnalyticsApi, ClientCredentials, Profile, ReportQuery, ResultPage, TokenGrant, WebProperty,
};
use gacounter::config::{DatabaseConfig, SiteConfig, keys};
use gacounter::counter::{ContentItem, CounterService, MemoryContentCatalog};
use gacounter::errors::{CounterError, Result};
use gacounter::storage::SeaOrmStorage;

pub const AUTH_URL: &str = "https://accounts.example.com/o/oauth2/auth";

/// Analytics API double
///
/// Report pages are keyed by `start_index`; unknown indices return an empty
/// page. Every call is counted.
#[derive(Default)]
pub struct MockAnalyticsApi {
    pages: Mutex<HashMap<u64, ResultPage>>,
    pub queries: Mutex<Vec<ReportQuery>>,
    pub report_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub fail_tokens: Mutex<bool>,
    /// 覆盖令牌有效期，默认 3600 秒
    pub grant_expires_in: Mutex<Option<i64>>,
}

impl MockAnalyticsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, start_index: u64, page: ResultPage) {
        self.pages.lock().insert(start_index, page);
    }

    pub fn fail_token_requests(&self) {
        *self.fail_tokens.lock() = true;
    }

    pub fn set_grant_expires_in(&self, secs: i64) {
        *self.grant_expires_in.lock() = Some(secs);
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn grant(&self, access_token: &str) -> Result<TokenGrant> {
        if *self.fail_tokens.lock() {
            return Err(CounterError::authentication("invalid_grant: Bad Request"));
        }
        Ok(TokenGrant {
            access_token: access_token.to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_in: self.grant_expires_in.lock().unwrap_or(3600),
        })
    }
}

#[async_trait]
impl AnalyticsApi for MockAnalyticsApi {
    async fn query_report(&self, _access_token: &str, query: &ReportQuery) -> Result<ResultPage> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());
        Ok(self
            .pages
            .lock()
            .get(&query.start_index)
            .cloned()
            .unwrap_or_default())
    }

    async fn exchange_code(&self, _creds: &ClientCredentials, code: &str) -> Result<TokenGrant> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.grant(&format!("access-for-{}", code))
    }

    async fn refresh_token(
        &self,
        _creds: &ClientCredentials,
        _refresh_token: &str,
    ) -> Result<TokenGrant> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.grant("access-refreshed")
    }

    async fn web_properties(&self, _access_token: &str) -> Result<Vec<WebProperty>> {
        Ok(vec![WebProperty {
            id: "UA-1-1".to_string(),
            name: "Example site".to_string(),
        }])
    }

    async fn profiles(&self, _access_token: &str) -> Result<Vec<Profile>> {
        Ok(vec![Profile {
            id: "12345".to_string(),
            name: "All Web Site Data".to_string(),
            web_property_id: "UA-1-1".to_string(),
        }])
    }
}

pub struct TestEnv {
    pub storage: SeaOrmStorage,
    pub service: Arc<CounterService>,
    pub catalog: Arc<MemoryContentCatalog>,
    pub api: Arc<MockAnalyticsApi>,
    _dir: TempDir,
}

/// 创建临时 SQLite 数据库与计数服务
pub async fn setup(site: SiteConfig) -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("gac_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::connect(&config)
        .await
        .expect("Failed to create storage");
    let api = Arc::new(MockAnalyticsApi::new());
    let catalog = Arc::new(MemoryContentCatalog::new(site));

    let service = CounterService::new(
        &storage,
        api.clone(),
        Arc::new(storage.state_store()),
        catalog.clone(),
        AUTH_URL,
    );
    service
        .settings()
        .init_defaults()
        .await
        .expect("Failed to init settings");

    TestEnv {
        storage,
        service: Arc::new(service),
        catalog,
        api,
        _dir: dir,
    }
}

pub async fn setup_default() -> TestEnv {
    setup(SiteConfig::default()).await
}

impl TestEnv {
    /// 写入有效令牌和视图 ID
    pub async fn authenticate(&self, now: i64) {
        self.service
            .state()
            .save_tokens("access-0", Some("refresh-0"), now + 3600)
            .await
            .unwrap();
        self.service
            .settings()
            .set(keys::AUTH_PROFILE_ID, "12345")
            .await
            .unwrap();
    }

    pub async fn set_setting(&self, key: &str, value: &str) {
        self.service.settings().set(key, value).await.unwrap();
    }

    pub fn add_item(&self, nid: i64, bundle: &str) {
        self.catalog.add_item(ContentItem {
            nid,
            bundle: bundle.to_string(),
            revision_id: nid,
            title: format!("Item {}", nid),
            published: true,
        });
    }
}

pub fn page(rows: &[(&str, i64)], total_results: u64, total_pageviews: i64) -> ResultPage {
    ResultPage {
        rows: rows.iter().map(|(p, v)| (p.to_string(), *v)).collect(),
        total_results,
        total_pageviews,
        data_last_refreshed: Some(1_792_240_000),
        self_link: "https://www.googleapis.com/analytics/v3/data/ga?ids=ga:12345".to_string(),
        error: None,
    }
}
