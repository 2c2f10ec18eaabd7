//! Randomized selection queries: source filter, exclusion set, and
//! the orientation constraint used by the collage assembler.

mod common;

use framecast_db::models::image::{SOURCE_GOOGLE_PHOTOS, SOURCE_SYNOLOGY};
use framecast_db::repositories::ImageRepo;

use common::{seed_image, test_pool};

#[tokio::test]
async fn random_by_source_respects_source_filter() {
    let (pool, _dir) = test_pool().await;
    seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "landscape").await;
    seed_image(&pool, SOURCE_SYNOLOGY, "landscape").await;

    for _ in 0..10 {
        let picked = ImageRepo::random_by_source(&pool, SOURCE_GOOGLE_PHOTOS, &[])
            .await
            .unwrap()
            .expect("a google_photos record exists");
        assert_eq!(picked.source, SOURCE_GOOGLE_PHOTOS);
    }
}

#[tokio::test]
async fn random_by_source_excludes_recent_ids() {
    let (pool, _dir) = test_pool().await;
    let a = seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "landscape").await;
    let b = seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "landscape").await;

    // With A excluded, only B can ever come back.
    for _ in 0..20 {
        let picked = ImageRepo::random_by_source(&pool, SOURCE_GOOGLE_PHOTOS, &[a.id])
            .await
            .unwrap()
            .expect("B remains selectable");
        assert_eq!(picked.id, b.id);
    }
}

#[tokio::test]
async fn random_by_source_empty_when_all_excluded() {
    let (pool, _dir) = test_pool().await;
    let a = seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "landscape").await;

    let picked = ImageRepo::random_by_source(&pool, SOURCE_GOOGLE_PHOTOS, &[a.id])
        .await
        .unwrap();
    assert!(picked.is_none());
}

#[tokio::test]
async fn random_by_source_empty_for_unpopulated_source() {
    let (pool, _dir) = test_pool().await;
    seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "landscape").await;

    let picked = ImageRepo::random_by_source(&pool, SOURCE_SYNOLOGY, &[])
        .await
        .unwrap();
    assert!(picked.is_none());
}

#[tokio::test]
async fn random_by_orientation_matches_target_or_auto() {
    let (pool, _dir) = test_pool().await;
    seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "landscape").await;
    seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "portrait").await;
    seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "auto").await;

    for _ in 0..20 {
        let picked =
            ImageRepo::random_by_orientation(&pool, "landscape", SOURCE_GOOGLE_PHOTOS, &[])
                .await
                .unwrap()
                .expect("landscape or auto exists");
        assert!(
            picked.orientation == "landscape" || picked.orientation == "auto",
            "unexpected orientation {}",
            picked.orientation
        );
    }
}

#[tokio::test]
async fn random_by_orientation_applies_exclusions() {
    let (pool, _dir) = test_pool().await;
    let a = seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "portrait").await;
    let b = seed_image(&pool, SOURCE_GOOGLE_PHOTOS, "portrait").await;

    for _ in 0..10 {
        let picked =
            ImageRepo::random_by_orientation(&pool, "portrait", SOURCE_GOOGLE_PHOTOS, &[a.id])
                .await
                .unwrap()
                .expect("B remains selectable");
        assert_eq!(picked.id, b.id);
    }
}
