//! Counter service
//!
//! Composes the auth manager, report fetcher and path aggregator with the
//! settings, state and storage they share. HTTP handlers, CLI commands and
//! the queue driver all go through this type.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use url::Url;

use super::aggregator::PathAggregator;
use super::auth::{AuthManager, PropertyOption};
use super::catalog::ContentCatalog;
use super::dashboard::{DashboardData, DashboardSummary, TOP_LIMIT};
use super::fetcher::{FetchOutcome, ReportFetcher};
use super::filter::{format_item_total, render_tokens, scan_tokens};
use super::notices::Notices;
use super::state::CounterState;
use crate::analytics::{AnalyticsApi, DateRange};
use crate::config::{
    AuthSettingsUpdate, CounterSettings, GeneralSettingsUpdate, SettingsManager, StaticConfig,
    keys,
};
use crate::errors::{CounterError, Result};
use crate::storage::{
    ItemTotalRepository, JobQueue, MirrorField, PathCounterRepository, SeaOrmStorage, StateStore,
};

pub struct CounterService {
    settings: SettingsManager,
    state: CounterState,
    notices: Arc<Notices>,
    auth: AuthManager,
    fetcher: ReportFetcher,
    aggregator: PathAggregator,
    paths: PathCounterRepository,
    totals: ItemTotalRepository,
    mirror: MirrorField,
    queue: JobQueue,
}

impl CounterService {
    pub fn new(
        storage: &SeaOrmStorage,
        api: Arc<dyn AnalyticsApi>,
        state_store: Arc<dyn StateStore>,
        catalog: Arc<dyn ContentCatalog>,
        auth_url: &str,
    ) -> Self {
        let state = CounterState::new(state_store);
        let notices = Arc::new(Notices::new());

        Self {
            settings: SettingsManager::new(storage.get_db().clone()),
            auth: AuthManager::new(api.clone(), state.clone(), notices.clone(), auth_url),
            fetcher: ReportFetcher::new(api, state.clone(), storage.query_cache()),
            aggregator: PathAggregator::new(
                storage.path_counters(),
                storage.item_totals(),
                storage.mirror_field(),
                catalog,
            ),
            paths: storage.path_counters(),
            totals: storage.item_totals(),
            mirror: storage.mirror_field(),
            queue: storage.job_queue(),
            state,
            notices,
        }
    }

    /// Production wiring: database-backed state store and content catalog
    pub fn from_storage(
        storage: &SeaOrmStorage,
        api: Arc<dyn AnalyticsApi>,
        config: &StaticConfig,
    ) -> Self {
        Self::new(
            storage,
            api,
            Arc::new(storage.state_store()),
            Arc::new(storage.content_catalog(&config.site)),
            &config.api.auth_url,
        )
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn state(&self) -> &CounterState {
        &self.state
    }

    pub fn notices(&self) -> &Arc<Notices> {
        &self.notices
    }

    pub fn catalog(&self) -> &Arc<dyn ContentCatalog> {
        self.aggregator.catalog()
    }

    pub fn job_queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn aggregator(&self) -> &PathAggregator {
        &self.aggregator
    }

    pub async fn load_settings(&self) -> Result<CounterSettings> {
        self.settings.load().await
    }

    // ============================================================
    // Jobs
    // ============================================================

    /// Fetch one page at `index` and merge its rows into the raw table
    pub async fn fetch(&self, index: u64, now: DateTime<Utc>) -> Result<FetchOutcome> {
        let settings = self.settings.load().await?;
        let feed = self
            .auth
            .obtain_feed(&settings, None, now.timestamp())
            .await?
            .ok_or_else(|| {
                CounterError::authentication(
                    "The analytics feed could not be initialized, is it authenticated?",
                )
            })?;

        let outcome = self.fetcher.fetch_chunk(&settings, &feed, index, now).await?;
        self.aggregator.merge_raw_counts(&outcome.page().rows).await?;
        Ok(outcome)
    }

    pub async fn purge_expired_reports(&self, now: i64) -> Result<u64> {
        self.fetcher.purge_expired(now).await
    }

    /// Recompute the stored total of one content item
    pub async fn count(&self, nid: i64) -> Result<i64> {
        let item = self
            .catalog()
            .get_item(nid)
            .await?
            .ok_or_else(|| CounterError::not_found(format!("Content item {} not found", nid)))?;
        self.aggregator
            .aggregate_item(item.nid, &item.bundle, item.revision_id)
            .await
    }

    // ============================================================
    // Authentication
    // ============================================================

    pub async fn is_authenticated(&self) -> Result<bool> {
        self.auth.is_authenticated().await
    }

    /// Build the provider authorization URL
    ///
    /// A non-empty `profile_id_prefill` is copied into `profile_id` first.
    pub async fn begin_authentication(&self) -> Result<Url> {
        let settings = self.settings.load().await?;
        if !settings.has_client_credentials() {
            return Err(CounterError::configuration(
                "client_id, client_secret and redirect_uri must be set before authenticating",
            ));
        }
        let prefill = settings.profile_id_prefill.trim();
        if !prefill.is_empty() && prefill != settings.profile_id {
            self.settings.set(keys::AUTH_PROFILE_ID, prefill).await?;
            debug!("Copied profile_id_prefill into profile_id");
        }
        self.auth.authorization_url(&settings).await
    }

    /// Complete the OAuth redirect; returns whether a feed is now available
    pub async fn auth_callback(&self, code: &str, now: i64) -> Result<bool> {
        let settings = self.settings.load().await?;
        Ok(self
            .auth
            .obtain_feed(&settings, Some(code), now)
            .await?
            .is_some())
    }

    /// Complete the browser redirect of a flow started by `begin_authentication`
    pub async fn complete_redirect(&self, code: &str, state: &str, now: i64) -> Result<bool> {
        let settings = self.settings.load().await?;
        self.auth
            .complete_redirect(&settings, code, state, now)
            .await
    }

    pub async fn revoke(&self) -> Result<()> {
        self.auth.revoke().await?;
        self.settings.clear_credentials().await?;
        info!("Authentication revoked and credentials cleared");
        Ok(())
    }

    pub async fn web_property_options(&self, now: i64) -> Result<Vec<PropertyOption>> {
        let settings = self.settings.load().await?;
        self.auth.web_property_options(&settings, now).await
    }

    // ============================================================
    // Settings
    // ============================================================

    pub async fn update_auth_settings(&self, update: AuthSettingsUpdate) -> Result<CounterSettings> {
        let authenticated = self.is_authenticated().await?;
        self.settings.update_auth(update, authenticated).await
    }

    pub async fn update_general_settings(
        &self,
        update: GeneralSettingsUpdate,
    ) -> Result<CounterSettings> {
        self.settings.update_general(update).await
    }

    /// Toggle the mirror field for a bundle
    ///
    /// The mirror table is created with the first enabled bundle and dropped
    /// once none remain.
    pub async fn set_bundle_enabled(&self, bundle: &str, enabled: bool) -> Result<CounterSettings> {
        self.settings.set_bundle_enabled(bundle, enabled).await?;
        let settings = self.settings.load().await?;

        let exists = self.mirror.exists().await?;
        if !settings.enabled_bundles.is_empty() && !exists {
            self.mirror.install().await?;
            self.notices.status("The pageview count field has been created.");
        } else if settings.enabled_bundles.is_empty() && exists {
            self.mirror.uninstall().await?;
            self.notices.status("The pageview count field has been removed.");
        }

        Ok(settings)
    }

    // ============================================================
    // Display
    // ============================================================

    /// Block: pageviews of a path, formatted
    pub async fn display_count(&self, path: &str) -> Result<String> {
        self.aggregator.display_count(path).await
    }

    /// Field formatter output for an item
    pub async fn item_field(&self, nid: i64) -> Result<String> {
        Ok(format_item_total(
            self.aggregator.stored_item_total(nid).await?,
        ))
    }

    /// Resolve `[gac]` / `[gac|all]` tokens in `text` for the page at `current_path`
    pub async fn filter_text(&self, text: &str, current_path: &str) -> Result<String> {
        let usage = scan_tokens(text);
        if !usage.path && !usage.all {
            return Ok(text.to_string());
        }

        let path_count = if usage.path {
            self.display_count(current_path).await?
        } else {
            String::new()
        };
        let total = if usage.all {
            self.state.recorded_total_pageviews().await?
        } else {
            None
        };

        Ok(render_tokens(text, &path_count, total))
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let settings = self.settings.load().await?;
        let range = DateRange::resolve(&settings, now.date_naive());

        let data = DashboardData {
            authenticated: self.is_authenticated().await?,
            total_pageviews: self.state.total_pageviews().await?,
            total_paths: self.state.total_paths().await?,
            date_range: range.describe(),
            most_recent_query: self.state.most_recent_query().await?,
            data_last_refreshed: self.state.data_last_refreshed().await?,
            quota_url: settings.project_quota_url(),
            stored_paths: self.paths.count().await?,
            published_items: self.catalog().count_published().await?,
            items_with_pageviews: self.totals.count_positive().await?,
            items_stored: self.totals.count_all().await?,
            queued_jobs: self.queue.count().await?,
            top_paths: self.paths.top(TOP_LIMIT).await?,
            top_items: self.totals.top(TOP_LIMIT).await?,
            cron_next_execution: self.state.cron_next_execution().await?,
        };

        Ok(DashboardSummary::build(data, now.timestamp()))
    }
}
