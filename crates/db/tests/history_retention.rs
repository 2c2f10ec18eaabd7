//! History log: exclusion window and the 100-entry retention bound.

mod common;

use chrono::{Duration, Utc};
use framecast_db::models::history::{HISTORY_EXCLUDE, HISTORY_RETAIN};
use framecast_db::repositories::DeviceHistoryRepo;

use common::{seed_device, test_pool};

#[tokio::test]
async fn recent_ids_returns_newest_first() {
    let (pool, _dir) = test_pool().await;
    let device = seed_device(&pool, "frame-1.local").await;

    let base = Utc::now();
    for i in 0..10i64 {
        DeviceHistoryRepo::append(&pool, device.id, 100 + i, base + Duration::seconds(i))
            .await
            .unwrap();
    }

    let recent = DeviceHistoryRepo::recent_ids(&pool, device.id, 3).await.unwrap();
    assert_eq!(recent, vec![109, 108, 107]);
}

#[tokio::test]
async fn exclusion_window_is_bounded() {
    let (pool, _dir) = test_pool().await;
    let device = seed_device(&pool, "frame-1.local").await;

    let base = Utc::now();
    for i in 0..80i64 {
        DeviceHistoryRepo::append(&pool, device.id, i + 1, base + Duration::seconds(i))
            .await
            .unwrap();
    }

    let recent = DeviceHistoryRepo::recent_ids(&pool, device.id, HISTORY_EXCLUDE)
        .await
        .unwrap();
    assert_eq!(recent.len(), HISTORY_EXCLUDE as usize);
    // Oldest 30 entries fall outside the exclusion window.
    assert!(!recent.contains(&1));
    assert!(recent.contains(&80));
}

#[tokio::test]
async fn prune_keeps_most_recent_hundred() {
    let (pool, _dir) = test_pool().await;
    let device = seed_device(&pool, "frame-1.local").await;

    let base = Utc::now();
    for i in 0..120i64 {
        DeviceHistoryRepo::append(&pool, device.id, i + 1, base + Duration::seconds(i))
            .await
            .unwrap();
    }
    assert_eq!(DeviceHistoryRepo::count(&pool, device.id).await.unwrap(), 120);

    let removed = DeviceHistoryRepo::prune(&pool, device.id, HISTORY_RETAIN)
        .await
        .unwrap();
    assert_eq!(removed, 20);
    assert_eq!(
        DeviceHistoryRepo::count(&pool, device.id).await.unwrap(),
        HISTORY_RETAIN
    );

    // The survivors are the newest entries.
    let all = DeviceHistoryRepo::list(&pool, device.id).await.unwrap();
    assert_eq!(all.first().unwrap().image_id, 120);
    assert_eq!(all.last().unwrap().image_id, 21);
}

#[tokio::test]
async fn prune_scopes_to_one_device() {
    let (pool, _dir) = test_pool().await;
    let d1 = seed_device(&pool, "frame-1.local").await;
    let d2 = seed_device(&pool, "frame-2.local").await;

    let base = Utc::now();
    for i in 0..110i64 {
        DeviceHistoryRepo::append(&pool, d1.id, i + 1, base + Duration::seconds(i))
            .await
            .unwrap();
    }
    for i in 0..5i64 {
        DeviceHistoryRepo::append(&pool, d2.id, 500 + i, base + Duration::seconds(i))
            .await
            .unwrap();
    }

    DeviceHistoryRepo::prune(&pool, d1.id, HISTORY_RETAIN).await.unwrap();
    assert_eq!(DeviceHistoryRepo::count(&pool, d1.id).await.unwrap(), 100);
    assert_eq!(DeviceHistoryRepo::count(&pool, d2.id).await.unwrap(), 5);
}
