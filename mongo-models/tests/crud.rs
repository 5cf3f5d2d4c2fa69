mod support;

use mongo_models::{
    bson::{Bson, doc, oid::ObjectId},
    prelude::*,
};

use support::{Dummy, Tag, recording_store, seed};

#[tokio::test]
async fn insert_one_returns_the_stored_instance() {
    let store = recording_store();
    let dummies = store.model::<Dummy>();

    let inserted = dummies.insert_one(&Dummy::new("Ren")).await.unwrap();

    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].name, "Ren");
    assert!(inserted[0].id.is_some());
    assert_eq!(dummies.count(doc! {}).await.unwrap(), 1);
}

#[tokio::test]
async fn insert_many_keeps_order() {
    let store = recording_store();
    let inserted = seed(&store, &["Ren", "Stimpy"]).await;

    assert_eq!(
        inserted.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        vec!["Ren", "Stimpy"]
    );
    assert!(inserted.iter().all(|d| d.id.is_some()));
}

#[tokio::test]
async fn insert_many_with_nothing_is_a_no_op() {
    let store = recording_store();

    assert!(store.model::<Dummy>().insert_many(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn find_returns_instances_in_sort_order() {
    let store = recording_store();
    seed(&store, &["Stimpy", "Ren", "Powdered Toast Man"]).await;

    let found = store
        .model::<Dummy>()
        .find(doc! {}, FindOptions::builder().sort("-name").build())
        .await
        .unwrap();

    assert_eq!(
        found.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        vec!["Stimpy", "Ren", "Powdered Toast Man"]
    );
}

#[tokio::test]
async fn find_with_no_matches_is_empty() {
    let store = recording_store();
    seed(&store, &["Ren"]).await;

    let found = store
        .model::<Dummy>()
        .find(doc! { "name": "Stimpy" }, FindOptions::default())
        .await
        .unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn find_one_misses_are_absent() {
    let store = recording_store();

    let found = store
        .model::<Dummy>()
        .find_one(doc! { "name": "Ren" }, FindOneOptions::default())
        .await
        .unwrap();

    assert!(found.is_absent());
}

#[tokio::test]
async fn find_one_without_id_stays_plain() {
    let store = recording_store();
    seed(&store, &["Ren"]).await;

    let found = store
        .model::<Dummy>()
        .find_one(doc! { "name": "Ren" }, FindOneOptions::fields("name -_id"))
        .await
        .unwrap();

    assert_eq!(found.plain(), Some(doc! { "name": "Ren" }));
}

#[tokio::test]
async fn find_by_id_accepts_hex_strings() {
    let store = recording_store();
    let inserted = seed(&store, &["Ren"]).await;
    let id = inserted[0].id.unwrap();

    let found = store
        .model::<Dummy>()
        .find_by_id(id.to_hex(), FindOneOptions::default())
        .await
        .unwrap()
        .instance();

    assert_eq!(found, Some(inserted[0].clone()));
}

#[tokio::test]
async fn malformed_ids_fail_before_reaching_the_store() {
    let store = recording_store();
    let dummies = store.model::<Dummy>();

    let find = dummies
        .find_by_id("not-an-object-id", FindOneOptions::default())
        .await;
    let update = dummies
        .find_by_id_and_update("zzz", doc! { "$set": { "name": "Ren" } }, FindOneAndModifyOptions::default())
        .await;
    let delete = dummies
        .find_by_id_and_delete(42, FindOneAndDeleteOptions::default())
        .await;

    assert!(matches!(find, Err(ModelError::InvalidId(_))));
    assert!(matches!(update, Err(ModelError::InvalidId(_))));
    assert!(matches!(delete, Err(ModelError::InvalidId(_))));
    assert_eq!(store.backend().calls(), 0);
}

#[tokio::test]
async fn custom_id_coercion_is_used_by_id_lookups() {
    let store = recording_store();
    let tags = store.model::<Tag>();
    tags.insert_one(&Tag { id: "rust".into(), label: "Rust".into() })
        .await
        .unwrap();

    let found = tags
        .find_by_id("rust", FindOneOptions::default())
        .await
        .unwrap()
        .instance();

    assert_eq!(found.map(|tag| tag.label), Some("Rust".to_string()));
    assert!(matches!(
        tags.find_by_id("", FindOneOptions::default()).await,
        Err(ModelError::InvalidId(_))
    ));
}

#[tokio::test]
async fn updates_report_modified_counts() {
    let store = recording_store();
    seed(&store, &["Ren", "Stimpy", "Stimpy"]).await;
    let dummies = store.model::<Dummy>();

    let one = dummies
        .update_one(doc! { "name": "Stimpy" }, doc! { "$set": { "hasHat": true } }, UpdateOptions::default())
        .await
        .unwrap();
    let many = dummies
        .update_many(doc! {}, doc! { "$set": { "hasHat": true } }, UpdateOptions::default())
        .await
        .unwrap();

    assert_eq!(one, 1);
    assert_eq!(many, 2);
    assert_eq!(dummies.count(doc! { "hasHat": true }).await.unwrap(), 3);
}

#[tokio::test]
async fn replace_one_keeps_the_id() {
    let store = recording_store();
    let inserted = seed(&store, &["Ren"]).await;
    let dummies = store.model::<Dummy>();

    let modified = dummies
        .replace_one(doc! { "name": "Ren" }, doc! { "name": "Stimpy", "hasHat": true }, UpdateOptions::default())
        .await
        .unwrap();

    assert_eq!(modified, 1);

    let found = dummies
        .find_by_id(inserted[0].id.unwrap(), FindOneOptions::default())
        .await
        .unwrap()
        .instance()
        .unwrap();

    assert_eq!(found.name, "Stimpy");
    assert!(found.has_hat);
}

#[tokio::test]
async fn replace_many_sums_modified_counts() {
    let store = recording_store();
    seed(&store, &["Stimpy", "Stimpy", "Ren"]).await;
    let dummies = store.model::<Dummy>();

    let modified = dummies
        .replace_many(doc! { "name": "Stimpy" }, doc! { "name": "Cat", "hasHat": true }, UpdateOptions::default())
        .await
        .unwrap();

    assert_eq!(modified, 2);
    assert_eq!(dummies.count(doc! { "name": "Cat" }).await.unwrap(), 2);
    assert_eq!(dummies.count(doc! { "name": "Ren" }).await.unwrap(), 1);
}

#[tokio::test]
async fn replace_many_upserts_once_when_nothing_matches() {
    let store = recording_store();
    let dummies = store.model::<Dummy>();

    let modified = dummies
        .replace_many(doc! { "name": "Stimpy" }, doc! { "name": "Cat" }, UpdateOptions::upsert())
        .await
        .unwrap();

    assert_eq!(modified, 0);
    assert_eq!(dummies.count(doc! { "name": "Cat" }).await.unwrap(), 1);
}

#[tokio::test]
async fn find_and_modify_returns_the_modified_document_by_default() {
    let store = recording_store();
    let inserted = seed(&store, &["Ren"]).await;
    let id = inserted[0].id.unwrap();
    let dummies = store.model::<Dummy>();

    let after = dummies
        .find_by_id_and_update(id, doc! { "$set": { "name": "Stimpy" } }, FindOneAndModifyOptions::default())
        .await
        .unwrap()
        .unwrap();

    let before = dummies
        .find_one_and_update(
            doc! { "_id": id },
            doc! { "$set": { "name": "Powdered Toast Man" } },
            FindOneAndModifyOptions::builder()
                .return_document(ReturnDocument::Before)
                .build(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.name, "Stimpy");
    assert_eq!(before.name, "Stimpy");
}

#[tokio::test]
async fn find_one_and_replace_returns_the_replacement() {
    let store = recording_store();
    seed(&store, &["Ren"]).await;

    let replaced = store
        .model::<Dummy>()
        .find_one_and_replace(
            doc! { "name": "Ren" },
            doc! { "name": "Stimpy", "hasHat": true },
            FindOneAndModifyOptions::default(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(replaced.name, "Stimpy");
    assert!(replaced.has_hat);
}

#[tokio::test]
async fn find_and_modify_without_a_match_is_none() {
    let store = recording_store();
    let dummies = store.model::<Dummy>();

    let updated = dummies
        .find_by_id_and_update(ObjectId::new(), doc! { "$set": { "name": "Ren" } }, FindOneAndModifyOptions::default())
        .await
        .unwrap();
    let deleted = dummies
        .find_one_and_delete(doc! { "name": "Ren" }, FindOneAndDeleteOptions::default())
        .await
        .unwrap();

    assert_eq!(updated, None);
    assert_eq!(deleted, None);
}

#[tokio::test]
async fn deletes_report_counts() {
    let store = recording_store();
    let inserted = seed(&store, &["Ren", "Stimpy", "Stimpy", "Powdered Toast Man"]).await;
    let dummies = store.model::<Dummy>();

    let removed = dummies
        .find_by_id_and_delete(inserted[0].id.unwrap(), FindOneAndDeleteOptions::default())
        .await
        .unwrap();

    assert_eq!(removed.map(|d| d.name), Some("Ren".to_string()));
    assert_eq!(dummies.delete_one(doc! { "name": "Stimpy" }).await.unwrap(), 1);
    assert_eq!(dummies.delete_many(doc! {}).await.unwrap(), 2);
    assert_eq!(dummies.count(doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn distinct_values() {
    let store = recording_store();
    seed(&store, &["Ren", "Stimpy", "Stimpy"]).await;

    let names = store
        .model::<Dummy>()
        .distinct("name", doc! {})
        .await
        .unwrap();

    assert_eq!(names, vec![Bson::String("Ren".into()), Bson::String("Stimpy".into())]);
}

#[tokio::test]
async fn backend_errors_pass_through_unchanged() {
    let store = recording_store();
    store.backend().fail_find();

    let result = store
        .model::<Dummy>()
        .find(doc! {}, FindOptions::default())
        .await;

    assert_eq!(result, Err(ModelError::Backend("find failed".into())));
}
