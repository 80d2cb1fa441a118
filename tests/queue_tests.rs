//! Queue driver tests: cron gate, quota planning and failure handling

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use common::{page, setup_default};
use gacounter::config::{GeneralSettingsUpdate, keys};
use gacounter::queue::{Job, QueueDriver};

#[tokio::test]
async fn test_cron_respects_interval_gate() {
    let env = setup_default().await;
    let driver = QueueDriver::new(env.service.clone());
    let now = Utc::now();

    env.service
        .state()
        .set_cron_next_execution(now.timestamp() + 600)
        .await
        .unwrap();

    let report = driver.run_cron(now, false).await.unwrap();
    assert!(!report.ran);
    assert_eq!(env.service.job_queue().count().await.unwrap(), 0);

    let report = driver.run_cron(now, true).await.unwrap();
    assert!(report.ran);
    // 下一次执行时间 = now + cron_interval(30) 分钟
    assert_eq!(
        env.service.state().cron_next_execution().await.unwrap(),
        now.timestamp() + 30 * 60
    );
}

#[tokio::test]
async fn test_cron_full_cycle() {
    let env = setup_default().await;
    let now = Utc::now();
    env.authenticate(now.timestamp()).await;
    env.add_item(1, "article");
    env.add_item(2, "page");
    env.api.set_page(
        1,
        page(&[("/node/1", 40), ("/node/2", 2), ("/node/2/", 1)], 3, 43),
    );

    let driver = QueueDriver::new(env.service.clone());
    let report = driver.run_cron(now, false).await.unwrap();

    assert!(report.ran);
    assert_eq!(report.fetch_jobs, 1);
    assert_eq!(report.count_jobs, 2);
    assert_eq!(report.processed, 3);
    assert_eq!(report.failed, 0);

    let totals = env.storage.item_totals();
    assert_eq!(totals.get(1).await.unwrap(), Some(40));
    assert_eq!(totals.get(2).await.unwrap(), Some(3));
    assert_eq!(env.service.job_queue().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cron_plans_all_pages_from_cursor() {
    let env = setup_default().await;
    let now = Utc::now();
    env.set_setting(keys::GENERAL_CHUNK_TO_FETCH, "100").await;
    // 未认证：fetch 任务全部失败并留在队列中
    let state = env.service.state();
    state
        .record_fresh_page(&page(&[], 450, 0), now.timestamp())
        .await
        .unwrap();
    state.set_data_step(2).await.unwrap();

    let driver = QueueDriver::new(env.service.clone());
    let report = driver.run_cron(now, true).await.unwrap();

    assert_eq!(report.fetch_jobs, 3);
    assert_eq!(report.failed, 3);
    assert_eq!(env.service.job_queue().count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_cron_stops_at_daily_quota() {
    let env = setup_default().await;
    let now = Utc::now();
    env.add_item(1, "article");
    env.service
        .update_general_settings(GeneralSettingsUpdate {
            api_dayquota: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    env.service
        .state()
        .record_api_call(now.date_naive())
        .await
        .unwrap();

    let driver = QueueDriver::new(env.service.clone());
    let report = driver.run_cron(now, true).await.unwrap();

    assert_eq!(report.fetch_jobs, 0);
    assert_eq!(report.count_jobs, 1);
    assert_eq!(report.processed, 1);
}

#[tokio::test]
async fn test_failed_job_keeps_lease() {
    let env = setup_default().await;
    let driver = QueueDriver::new(env.service.clone());

    driver
        .enqueue(Job::Fetch { index: 0 }, Utc::now().timestamp())
        .await
        .unwrap();

    let report = driver
        .process_queue(Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.failed, 1);

    // 租约未到期，不会被再次领取
    let queue = env.service.job_queue();
    assert_eq!(queue.count().await.unwrap(), 1);
    assert!(
        queue
            .claim_next(Utc::now().timestamp(), 60)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_malformed_payload_is_dropped() {
    let env = setup_default().await;
    let queue = env.service.job_queue();
    queue
        .push("{\"type\":\"reindex\"}", Utc::now().timestamp())
        .await
        .unwrap();

    let driver = Arc::new(QueueDriver::new(env.service.clone()));
    let report = driver.process_queue(Duration::from_secs(5)).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(queue.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_purge_queue() {
    let env = setup_default().await;
    let driver = QueueDriver::new(env.service.clone());
    let now = Utc::now().timestamp();
    for nid in 0..7 {
        driver.enqueue(Job::Count { nid }, now).await.unwrap();
    }

    assert_eq!(driver.purge_queue().await.unwrap(), 7);
    assert_eq!(env.service.job_queue().count().await.unwrap(), 0);
}
