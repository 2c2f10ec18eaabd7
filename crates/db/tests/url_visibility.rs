//! URL-source visibility: global when unbound, device-scoped when any
//! binding exists.

mod common;

use framecast_db::repositories::UrlSourceRepo;

use common::{seed_device, test_pool};

#[tokio::test]
async fn unbound_source_visible_to_every_device() {
    let (pool, _dir) = test_pool().await;
    let d1 = seed_device(&pool, "frame-1.local").await;
    let global = UrlSourceRepo::create(&pool, "https://example.com/a.jpg", &[])
        .await
        .unwrap();

    let picked = UrlSourceRepo::random_visible(&pool, Some(d1.id))
        .await
        .unwrap()
        .expect("global source visible");
    assert_eq!(picked.id, global.id);

    // Also visible without any device context.
    let picked = UrlSourceRepo::random_visible(&pool, None)
        .await
        .unwrap()
        .expect("global source visible without device");
    assert_eq!(picked.id, global.id);
}

#[tokio::test]
async fn bound_source_restricted_to_listed_devices() {
    let (pool, _dir) = test_pool().await;
    let d1 = seed_device(&pool, "frame-1.local").await;
    let d2 = seed_device(&pool, "frame-2.local").await;

    let global = UrlSourceRepo::create(&pool, "https://example.com/u1.jpg", &[])
        .await
        .unwrap();
    let bound = UrlSourceRepo::create(&pool, "https://example.com/u2.jpg", &[d2.id])
        .await
        .unwrap();

    // d1 only ever draws from the global source.
    for _ in 0..20 {
        let picked = UrlSourceRepo::random_visible(&pool, Some(d1.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.id, global.id);
    }

    // d2 draws from both; over enough tries both must appear.
    let mut seen_global = false;
    let mut seen_bound = false;
    for _ in 0..50 {
        let picked = UrlSourceRepo::random_visible(&pool, Some(d2.id))
            .await
            .unwrap()
            .unwrap();
        seen_global |= picked.id == global.id;
        seen_bound |= picked.id == bound.id;
        if seen_global && seen_bound {
            break;
        }
    }
    assert!(seen_global && seen_bound, "d2 should see both sources");
}

#[tokio::test]
async fn rewriting_bindings_changes_visibility() {
    let (pool, _dir) = test_pool().await;
    let d1 = seed_device(&pool, "frame-1.local").await;
    let source = UrlSourceRepo::create(&pool, "https://example.com/a.jpg", &[d1.id])
        .await
        .unwrap();
    assert_eq!(
        UrlSourceRepo::bindings(&pool, source.id).await.unwrap(),
        vec![d1.id]
    );

    // Unbind: the source becomes global again.
    UrlSourceRepo::update(&pool, source.id, "https://example.com/a.jpg", &[])
        .await
        .unwrap();
    assert!(UrlSourceRepo::bindings(&pool, source.id)
        .await
        .unwrap()
        .is_empty());
    assert!(UrlSourceRepo::random_visible(&pool, None)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn deleting_source_removes_bindings() {
    let (pool, _dir) = test_pool().await;
    let d1 = seed_device(&pool, "frame-1.local").await;
    let source = UrlSourceRepo::create(&pool, "https://example.com/a.jpg", &[d1.id])
        .await
        .unwrap();

    assert!(UrlSourceRepo::delete(&pool, source.id).await.unwrap());
    assert!(UrlSourceRepo::bindings(&pool, source.id)
        .await
        .unwrap()
        .is_empty());
}
