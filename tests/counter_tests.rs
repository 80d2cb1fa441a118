//! Counter service tests
//!
//! Fetch paging, aggregation and authentication against a temporary SQLite
//! database and a scripted analytics API.

mod common;

use chrono::{TimeZone, Utc};

use common::{page, setup, setup_default};
use gacounter::config::{LanguageConfig, SiteConfig, keys};
use gacounter::counter::{FetchOutcome, REVOCABLE_KEYS, hash_for_path};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

fn multilingual_site(front_page_item: Option<i64>) -> SiteConfig {
    SiteConfig {
        front_page_item,
        default_language: "en".to_string(),
        languages: vec![
            LanguageConfig {
                code: "en".to_string(),
                prefix: String::new(),
            },
            LanguageConfig {
                code: "fr".to_string(),
                prefix: "fr".to_string(),
            },
        ],
    }
}

// =============================================================================
// Fetch paging
// =============================================================================

#[tokio::test]
async fn test_fetch_uses_pointer_and_advances_cursor() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.set_setting(keys::GENERAL_CHUNK_TO_FETCH, "100").await;
    env.api
        .set_page(1, page(&[("/node/1", 10), ("/about", 3)], 250, 900));

    let outcome = env.service.fetch(0, now()).await.unwrap();
    assert!(outcome.is_fresh());

    let queries = env.api.queries.lock().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].start_index, 1);
    assert_eq!(queries[0].max_results, 100);
    assert_eq!(queries[0].profile_id, "12345");

    let state = env.service.state();
    assert_eq!(state.data_step().await.unwrap(), 1);
    assert_eq!(state.total_paths().await.unwrap(), 250);
    assert_eq!(state.total_pageviews().await.unwrap(), 900);
}

#[tokio::test]
async fn test_fetch_chunk_hundred_at_cursor_two() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.set_setting(keys::GENERAL_CHUNK_TO_FETCH, "100").await;
    env.api.set_page(201, page(&[("/node/7", 1)], 250, 900));

    env.service.fetch(2, now()).await.unwrap();

    let queries = env.api.queries.lock().clone();
    assert_eq!(queries[0].start_index, 201);
    // 201..=250 已是最后一页，游标归零
    assert_eq!(env.service.state().data_step().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cached_fetch_does_not_touch_statistics() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.set_setting(keys::GENERAL_CHUNK_TO_FETCH, "100").await;
    env.api.set_page(1, page(&[("/node/1", 10)], 250, 900));

    env.service.fetch(0, now()).await.unwrap();

    // 服务端数据变化，但缓存仍然有效
    env.api.set_page(1, page(&[("/node/1", 99)], 9999, 99999));
    env.service.state().set_data_step(0).await.unwrap();

    let outcome = env.service.fetch(0, now()).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Cached(_)));
    assert_eq!(env.api.report_calls(), 1);

    let state = env.service.state();
    assert_eq!(state.total_pageviews().await.unwrap(), 900);
    assert_eq!(state.total_paths().await.unwrap(), 250);
    assert_eq!(state.api_calls_on(now().date_naive()).await.unwrap(), 1);
    // 游标照常推进
    assert_eq!(state.data_step().await.unwrap(), 1);
}

#[tokio::test]
async fn test_fetch_without_cache_always_queries() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.set_setting(keys::GENERAL_CACHE_LENGTH, "0").await;

    env.service.fetch(0, now()).await.unwrap();
    env.service.fetch(0, now()).await.unwrap();
    assert_eq!(env.api.report_calls(), 2);
}

#[tokio::test]
async fn test_fetch_api_error_is_reported() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    let mut bad = page(&[], 0, 0);
    bad.error = Some("Quota Error: User Rate Limit Exceeded (403)".to_string());
    env.api.set_page(1, bad);

    let err = env.service.fetch(0, now()).await.unwrap_err();
    assert!(err.message().contains("Rate Limit"));
    assert_eq!(env.service.state().data_step().await.unwrap(), 0);
}

#[tokio::test]
async fn test_fetch_requires_authentication() {
    let env = setup_default().await;
    let err = env.service.fetch(0, now()).await.unwrap_err();
    assert!(err.message().contains("is it authenticated"));
    assert_eq!(env.api.report_calls(), 0);
}

// =============================================================================
// Raw counts and aggregation
// =============================================================================

#[tokio::test]
async fn test_merge_raw_counts_is_idempotent_per_path() {
    let env = setup_default().await;
    let aggregator = env.service.aggregator();
    let paths = env.storage.path_counters();

    aggregator
        .merge_raw_counts(&[("/a".to_string(), 5), ("/b".to_string(), 2)])
        .await
        .unwrap();
    aggregator
        .merge_raw_counts(&[("/a".to_string(), 8)])
        .await
        .unwrap();

    assert_eq!(paths.count().await.unwrap(), 2);
    let row = paths.get(&hash_for_path("/a")).await.unwrap().unwrap();
    assert_eq!(row.pageviews, 8);
}

#[tokio::test]
async fn test_item_total_sums_aliases_once() {
    let env = setup(multilingual_site(None)).await;
    env.add_item(1, "article");
    env.catalog.add_alias("/node/1", "/about", "en");
    env.catalog.add_alias("/node/1", "/a-propos", "fr");
    env.add_item(2, "page");

    env.service
        .aggregator()
        .merge_raw_counts(&[
            ("/node/1".to_string(), 5),
            ("/about".to_string(), 7),
            ("/about/".to_string(), 1),
            ("/fr/a-propos".to_string(), 2),
            ("/node/2".to_string(), 4),
            ("/unrelated".to_string(), 100),
        ])
        .await
        .unwrap();

    assert_eq!(env.service.count(1).await.unwrap(), 15);
    // 无别名时别名等于系统路径，只计一次
    assert_eq!(env.service.count(2).await.unwrap(), 4);

    let totals = env.storage.item_totals();
    assert_eq!(totals.get(1).await.unwrap(), Some(15));
    assert_eq!(env.service.item_field(1).await.unwrap(), "<p>15</p>");
}

#[tokio::test]
async fn test_front_page_counts_root_only() {
    let env = setup(multilingual_site(Some(1))).await;
    env.add_item(1, "page");
    env.catalog.add_alias("/node/1", "/home", "en");

    env.service
        .aggregator()
        .merge_raw_counts(&[
            ("/".to_string(), 50),
            ("/node/1".to_string(), 10),
            ("/home".to_string(), 3),
        ])
        .await
        .unwrap();

    assert_eq!(env.service.count(1).await.unwrap(), 50);
    assert_eq!(env.service.display_count("/").await.unwrap(), "50");
    assert_eq!(env.service.display_count("/node/1").await.unwrap(), "50");
    assert_eq!(env.service.display_count("/home").await.unwrap(), "50");
}

#[tokio::test]
async fn test_display_count_resolves_alias() {
    let env = setup(multilingual_site(None)).await;
    env.add_item(3, "article");
    env.catalog.add_alias("/node/3", "/blog/post", "en");

    env.service
        .aggregator()
        .merge_raw_counts(&[
            ("/blog/post".to_string(), 1200),
            ("/node/3".to_string(), 34),
        ])
        .await
        .unwrap();

    assert_eq!(env.service.display_count("blog/post/").await.unwrap(), "1,234");
    assert_eq!(env.service.display_count("/node/3").await.unwrap(), "1,234");
    assert_eq!(env.service.display_count("/missing").await.unwrap(), "0");
}

#[tokio::test]
async fn test_display_count_includes_trailing_slash_of_alias() {
    let env = setup(multilingual_site(None)).await;
    env.add_item(3, "article");
    env.catalog.add_alias("/node/3", "/blog/post", "en");

    env.service
        .aggregator()
        .merge_raw_counts(&[("/blog/post/".to_string(), 10)])
        .await
        .unwrap();

    assert_eq!(env.service.display_count("/blog/post").await.unwrap(), "10");
    assert_eq!(env.service.display_count("/node/3").await.unwrap(), "0");
}

#[tokio::test]
async fn test_count_unknown_item_is_not_found() {
    let env = setup_default().await;
    let err = env.service.count(404).await.unwrap_err();
    assert_eq!(err.code(), "E010");
}

#[tokio::test]
async fn test_bundle_toggle_mirrors_totals() {
    let env = setup_default().await;
    env.add_item(5, "article");
    env.service
        .aggregator()
        .merge_raw_counts(&[("/node/5".to_string(), 9)])
        .await
        .unwrap();

    env.service.set_bundle_enabled("article", true).await.unwrap();
    let mirror = env.storage.mirror_field();
    assert!(mirror.exists().await.unwrap());

    env.service.count(5).await.unwrap();
    assert_eq!(mirror.get(5, 5, "article").await.unwrap(), Some(9));

    let settings = env.service.set_bundle_enabled("article", false).await.unwrap();
    assert!(settings.enabled_bundles.is_empty());
    assert!(!mirror.exists().await.unwrap());
}

// =============================================================================
// Filter tokens
// =============================================================================

#[tokio::test]
async fn test_filter_text_replaces_tokens() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.api.set_page(1, page(&[("/node/1", 1500)], 1, 2_000_000));
    env.service.fetch(0, now()).await.unwrap();

    let text = env
        .service
        .filter_text("Seen [gac] times, site total [gac|all].", "/node/1")
        .await
        .unwrap();
    assert_eq!(text, "Seen 1,500 times, site total 2,000,000.");

    let plain = env.service.filter_text("No tokens here", "/").await.unwrap();
    assert_eq!(plain, "No tokens here");
}

#[tokio::test]
async fn test_filter_total_before_first_fetch() {
    let env = setup_default().await;
    let text = env.service.filter_text("[gac|all]", "/").await.unwrap();
    assert_eq!(text, "N/A");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_valid_token_skips_token_requests() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;

    env.service.fetch(0, now()).await.unwrap();
    assert_eq!(env.api.refresh_calls(), 0);
    assert_eq!(env.api.exchange_calls(), 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.service
        .state()
        .save_tokens("stale", None, now().timestamp() - 10)
        .await
        .unwrap();

    env.service.fetch(0, now()).await.unwrap();
    assert_eq!(env.api.refresh_calls(), 1);

    let tokens = env.service.state().tokens().await.unwrap();
    assert_eq!(tokens.access_token.as_deref(), Some("access-refreshed"));
    assert_eq!(tokens.expires_at, Some(now().timestamp() + 3600));
}

#[tokio::test]
async fn test_auth_callback_exchanges_code() {
    let env = setup_default().await;
    let ok = env
        .service
        .auth_callback("4/code", now().timestamp())
        .await
        .unwrap();
    assert!(ok);
    assert_eq!(env.api.exchange_calls(), 1);
    assert!(env.service.is_authenticated().await.unwrap());

    let notices = env.service.notices().drain();
    assert!(notices
        .iter()
        .any(|n| n.message == "You have been successfully authenticated."));
}

#[tokio::test]
async fn test_oversized_token_lifetime_saturates() {
    let env = setup_default().await;
    env.api.set_grant_expires_in(i64::MAX);

    assert!(env
        .service
        .auth_callback("4/code", now().timestamp())
        .await
        .unwrap());
    let tokens = env.service.state().tokens().await.unwrap();
    assert_eq!(tokens.expires_at, Some(i64::MAX));
}

#[tokio::test]
async fn test_failed_exchange_leaves_notice() {
    let env = setup_default().await;
    env.api.fail_token_requests();

    let ok = env
        .service
        .auth_callback("4/bad", now().timestamp())
        .await
        .unwrap();
    assert!(!ok);
    assert!(!env.service.is_authenticated().await.unwrap());
    let notices = env.service.notices().drain();
    assert!(notices[0].message.starts_with("There was an authentication error."));
}

#[tokio::test]
async fn test_revoke_clears_state_and_credentials() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.set_setting(keys::AUTH_CLIENT_ID, "client").await;
    env.api.set_page(1, page(&[("/x", 1)], 5000, 10));
    env.service.fetch(0, now()).await.unwrap();
    env.service
        .state()
        .set_cron_next_execution(now().timestamp() + 60)
        .await
        .unwrap();

    env.service.revoke().await.unwrap();

    let store = env.service.state().store();
    for key in REVOCABLE_KEYS {
        assert_eq!(store.get(key).await.unwrap(), None, "{} not cleared", key);
    }
    assert!(!env.service.is_authenticated().await.unwrap());
    assert!(env.service.load_settings().await.unwrap().client_id.is_empty());
}

#[tokio::test]
async fn test_begin_authentication_copies_prefill() {
    let env = setup_default().await;
    env.set_setting(keys::AUTH_CLIENT_ID, "client-1").await;
    env.set_setting(keys::AUTH_CLIENT_SECRET, "secret").await;
    env.set_setting(keys::AUTH_REDIRECT_URI, "https://site.example.com/gac/callback")
        .await;
    env.set_setting(keys::AUTH_PROFILE_ID_PREFILL, "777").await;

    let url = env.service.begin_authentication().await.unwrap();
    assert!(url.as_str().starts_with(common::AUTH_URL));
    assert!(url.query_pairs().any(|(k, v)| k == "client_id" && v == "client-1"));
    assert_eq!(env.service.load_settings().await.unwrap().profile_id, "777");
}

#[tokio::test]
async fn test_begin_authentication_requires_credentials() {
    let env = setup_default().await;
    env.set_setting(keys::AUTH_PROFILE_ID_PREFILL, "777").await;

    assert!(env.service.begin_authentication().await.is_err());
    // 被拒绝的请求不改动设置
    assert_eq!(env.service.load_settings().await.unwrap().profile_id, "");
}

#[tokio::test]
async fn test_complete_redirect_checks_pending_state() {
    let env = setup_default().await;
    env.set_setting(keys::AUTH_CLIENT_ID, "client-1").await;
    env.set_setting(keys::AUTH_CLIENT_SECRET, "secret").await;
    env.set_setting(keys::AUTH_REDIRECT_URI, "https://site.example.com/auth/callback")
        .await;

    let url = env.service.begin_authentication().await.unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(state.len(), 32);

    let ts = now().timestamp();
    assert!(env.service.complete_redirect("4/code", "other", ts).await.is_err());
    // 校验失败也会消耗 state
    assert!(env.service.complete_redirect("4/code", &state, ts).await.is_err());
    assert_eq!(env.api.exchange_calls(), 0);

    let url = env.service.begin_authentication().await.unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(env.service.complete_redirect("4/code", &state, ts).await.unwrap());
    assert_eq!(env.api.exchange_calls(), 1);
}

#[tokio::test]
async fn test_property_options() {
    let env = setup_default().await;
    let options = env
        .service
        .web_property_options(now().timestamp())
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "unauthenticated");

    env.authenticate(now().timestamp()).await;
    let options = env
        .service
        .web_property_options(now().timestamp())
        .await
        .unwrap();
    assert_eq!(options[0].value, "12345");
    assert_eq!(options[0].group.as_deref(), Some("Example site"));
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_summary() {
    let env = setup_default().await;
    env.authenticate(now().timestamp()).await;
    env.add_item(1, "article");
    env.api
        .set_page(1, page(&[("/node/1", 1234), ("/other", 5)], 2, 1239));
    env.service.fetch(0, now()).await.unwrap();
    env.service.count(1).await.unwrap();

    let summary = env.service.dashboard(now()).await.unwrap();
    assert!(summary.authenticated);
    assert_eq!(summary.total_pageviews, "1,239");
    assert_eq!(summary.stored_paths, "2");
    assert_eq!(summary.published_items, "1");
    assert_eq!(summary.items_with_pageviews, "1");
    assert_eq!(summary.top_paths[0].path, "/node/1");
    assert_eq!(summary.top_items[0].nid, 1);
    assert_eq!(summary.cron.next_execution_display, "never");
}
