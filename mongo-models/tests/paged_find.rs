mod support;

use mongo_models::{bson::doc, prelude::*};

use support::{Dummy, Tag, recording_store, seed};

#[tokio::test]
async fn single_page_holds_everything() {
    let store = recording_store();
    seed(&store, &["Ren", "Stimpy", "Powdered Toast Man"]).await;

    let page = store
        .model::<Dummy>()
        .paged_find(doc! {}, "", "", 10, 1)
        .await
        .unwrap();

    assert_eq!(page.data.len(), 3);
    assert_eq!(
        page.pages,
        Pages { current: 1, prev: 0, has_prev: false, next: 2, has_next: false, total: 1 }
    );
    assert_eq!(page.items, Items { limit: 10, begin: 1, end: 3, total: 3 });
}

#[tokio::test]
async fn walks_pages_in_sort_order() {
    let store = recording_store();
    seed(&store, &["Ren", "Stimpy", "Powdered Toast Man"]).await;
    let dummies = store.model::<Dummy>();

    let first = dummies.paged_find(doc! {}, "name", "name", 2, 1).await.unwrap();
    let second = dummies.paged_find(doc! {}, "name", "name", 2, 2).await.unwrap();

    assert_eq!(
        first.data.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        vec!["Powdered Toast Man", "Ren"]
    );
    assert!(first.pages.has_next);
    assert!(!first.pages.has_prev);
    assert_eq!(first.pages.total, 2);
    assert_eq!((first.items.begin, first.items.end), (1, 2));

    assert_eq!(
        second.data.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        vec!["Stimpy"]
    );
    assert!(!second.pages.has_next);
    assert!(second.pages.has_prev);
    assert_eq!(second.pages.prev, 1);
    assert_eq!((second.items.begin, second.items.end), (3, 3));
}

#[tokio::test]
async fn projection_applies_to_page_data() {
    let store = recording_store();
    seed(&store, &["Ren"]).await;
    store
        .model::<Dummy>()
        .update_many(doc! {}, doc! { "$set": { "hasHat": true } }, UpdateOptions::default())
        .await
        .unwrap();

    let page = store
        .model::<Dummy>()
        .paged_find(doc! {}, "-hasHat", doc! { "name": 1 }, 5, 1)
        .await
        .unwrap();

    assert!(!page.data[0].has_hat);
    assert!(page.data[0].id.is_some());
}

#[tokio::test]
async fn projecting_away_a_required_field_fails() {
    let store = recording_store();
    store
        .model::<Tag>()
        .insert_one(&Tag { id: "rust".into(), label: "Rust".into() })
        .await
        .unwrap();

    let result = store
        .model::<Tag>()
        .paged_find(doc! {}, "-label", "", 10, 1)
        .await;

    assert!(matches!(result, Err(ModelError::Serialization(_))));
}

#[tokio::test]
async fn empty_collection_yields_an_empty_page() {
    let store = recording_store();

    let page = store
        .model::<Dummy>()
        .paged_find(doc! {}, "", "", 10, 1)
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.pages.total, 0);
    assert!(!page.pages.has_next);
    assert_eq!(page.items, Items { limit: 10, begin: 0, end: 0, total: 0 });
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let store = recording_store();
    seed(&store, &["Ren", "Stimpy"]).await;

    let page = store
        .model::<Dummy>()
        .paged_find(doc! {}, "", "", 2, 5)
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.items.total, 2);
    assert_eq!((page.items.begin, page.items.end), (2, 2));
}

#[tokio::test]
async fn count_failure_fails_the_page() {
    let store = recording_store();
    seed(&store, &["Ren"]).await;
    store.backend().fail_count();

    let result = store
        .model::<Dummy>()
        .paged_find(doc! {}, "", "", 10, 1)
        .await;

    assert_eq!(result, Err(ModelError::Backend("count failed".into())));
}

#[tokio::test]
async fn find_failure_fails_the_page() {
    let store = recording_store();
    store.backend().fail_find();

    let result = store
        .model::<Dummy>()
        .paged_find(doc! {}, "", "", 10, 1)
        .await;

    assert_eq!(result, Err(ModelError::Backend("find failed".into())));
}

#[tokio::test]
async fn zero_limit_is_rejected() {
    let store = recording_store();

    let result = store
        .model::<Dummy>()
        .paged_find(doc! {}, "", "", 0, 1)
        .await;

    assert!(matches!(result, Err(ModelError::InvalidArgument(_))));
    assert_eq!(store.backend().calls(), 0);
}
