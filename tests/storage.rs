//! Repository behavior against an in-memory database.

use sea_orm::ActiveValue;

use tasksync::entities::todo::{self, Priority, SyncStatus};
use tasksync::repositories::{SyncMetaRepository, TodoRepository};
use tasksync::storage::LocalStorage;

fn make_todo(title: &str, priority: Priority, created_at: i64) -> todo::ActiveModel {
    todo::ActiveModel {
        id: ActiveValue::NotSet,
        remote_id: ActiveValue::Set(None),
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set(None),
        is_completed: ActiveValue::Set(false),
        priority: ActiveValue::Set(priority),
        category: ActiveValue::Set(None),
        due_date: ActiveValue::Set(None),
        created_at: ActiveValue::Set(created_at),
        updated_at: ActiveValue::Set(created_at),
        sync_status: ActiveValue::Set(SyncStatus::Local),
        pending_delete: ActiveValue::Set(false),
    }
}

#[tokio::test]
async fn get_all_orders_by_priority_then_recency() {
    let storage = LocalStorage::in_memory().await.unwrap();

    TodoRepository::insert(&storage.conn, make_todo("old normal", Priority::Normal, 100)).await.unwrap();
    TodoRepository::insert(&storage.conn, make_todo("urgent", Priority::Urgent, 50)).await.unwrap();
    TodoRepository::insert(&storage.conn, make_todo("new normal", Priority::Normal, 200)).await.unwrap();

    let all = TodoRepository::get_all(&storage.conn).await.unwrap();
    let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["urgent", "new normal", "old normal"]);
}

#[tokio::test]
async fn active_todos_sort_soonest_due_first_within_priority() {
    let storage = LocalStorage::in_memory().await.unwrap();

    let mut a = make_todo("later", Priority::High, 1);
    a.due_date = ActiveValue::Set(Some(5_000));
    let mut b = make_todo("sooner", Priority::High, 2);
    b.due_date = ActiveValue::Set(Some(1_000));
    TodoRepository::insert(&storage.conn, a).await.unwrap();
    TodoRepository::insert(&storage.conn, b).await.unwrap();

    let active = TodoRepository::get_active(&storage.conn).await.unwrap();
    let titles: Vec<_> = active.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["sooner", "later"]);
}

#[tokio::test]
async fn search_matches_title_and_description_case_insensitively() {
    let storage = LocalStorage::in_memory().await.unwrap();

    TodoRepository::insert(&storage.conn, make_todo("Call Client", Priority::Normal, 1)).await.unwrap();
    let mut with_desc = make_todo("Prepare slides", Priority::Normal, 2);
    with_desc.description = ActiveValue::Set(Some("notes for the client meeting".to_string()));
    TodoRepository::insert(&storage.conn, with_desc).await.unwrap();
    TodoRepository::insert(&storage.conn, make_todo("Water plants", Priority::Normal, 3)).await.unwrap();

    let hits = TodoRepository::search(&storage.conn, "client").await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn date_range_is_inclusive_and_sorted() {
    let storage = LocalStorage::in_memory().await.unwrap();

    for (title, due) in [("a", 1_000), ("b", 2_000), ("c", 3_000), ("d", 4_000)] {
        let mut t = make_todo(title, Priority::Normal, 1);
        t.due_date = ActiveValue::Set(Some(due));
        TodoRepository::insert(&storage.conn, t).await.unwrap();
    }

    let window = TodoRepository::get_by_date_range(&storage.conn, 2_000, 3_000).await.unwrap();
    let titles: Vec<_> = window.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c"]);
}

#[tokio::test]
async fn counts_track_completion_and_priority() {
    let storage = LocalStorage::in_memory().await.unwrap();

    TodoRepository::insert(&storage.conn, make_todo("open high", Priority::High, 1)).await.unwrap();
    TodoRepository::insert(&storage.conn, make_todo("open low", Priority::Low, 2)).await.unwrap();
    let done = TodoRepository::insert(&storage.conn, make_todo("done", Priority::High, 3)).await.unwrap();
    TodoRepository::set_completion(&storage.conn, done, true, 10).await.unwrap();

    assert_eq!(TodoRepository::active_count(&storage.conn).await.unwrap(), 2);
    assert_eq!(TodoRepository::completed_count(&storage.conn).await.unwrap(), 1);
    assert_eq!(TodoRepository::count_by_priority(&storage.conn, Priority::High).await.unwrap(), 1);
}

#[tokio::test]
async fn insert_many_returns_ids_in_order() {
    let storage = LocalStorage::in_memory().await.unwrap();

    let ids = TodoRepository::insert_many(
        &storage.conn,
        vec![
            make_todo("first", Priority::Normal, 1),
            make_todo("second", Priority::Normal, 2),
        ],
    )
    .await
    .unwrap();

    assert_eq!(ids.len(), 2);
    let first = TodoRepository::get_by_id(&storage.conn, ids[0]).await.unwrap().unwrap();
    let second = TodoRepository::get_by_id(&storage.conn, ids[1]).await.unwrap().unwrap();
    assert_eq!(first.title, "first");
    assert_eq!(second.title, "second");
}

#[tokio::test]
async fn deletion_marked_rows_hide_from_reads_but_stay_queued() {
    let storage = LocalStorage::in_memory().await.unwrap();

    let id = TodoRepository::insert(&storage.conn, make_todo("going away", Priority::Normal, 1)).await.unwrap();
    TodoRepository::set_remote_id(&storage.conn, id, "srv-1", SyncStatus::Synced).await.unwrap();
    TodoRepository::mark_pending_delete(&storage.conn, id, 99).await.unwrap();

    assert!(TodoRepository::get_all(&storage.conn).await.unwrap().is_empty());
    assert!(TodoRepository::search(&storage.conn, "going").await.unwrap().is_empty());

    let queued = TodoRepository::get_by_sync_status(&storage.conn, SyncStatus::Pending).await.unwrap();
    assert_eq!(queued.len(), 1);
    assert!(queued[0].pending_delete);
    assert_eq!(queued[0].updated_at, 99);
}

#[tokio::test]
async fn confirmed_deletions_are_only_synced_tombstones() {
    let storage = LocalStorage::in_memory().await.unwrap();

    let confirmed = TodoRepository::insert(&storage.conn, make_todo("confirmed", Priority::Normal, 1)).await.unwrap();
    TodoRepository::mark_pending_delete(&storage.conn, confirmed, 1).await.unwrap();
    TodoRepository::set_sync_status(&storage.conn, confirmed, SyncStatus::Synced).await.unwrap();

    let waiting = TodoRepository::insert(&storage.conn, make_todo("waiting", Priority::Normal, 2)).await.unwrap();
    TodoRepository::mark_pending_delete(&storage.conn, waiting, 2).await.unwrap();

    let purgeable = TodoRepository::get_confirmed_deletions(&storage.conn).await.unwrap();
    assert_eq!(purgeable.len(), 1);
    assert_eq!(purgeable[0].title, "confirmed");
}

#[tokio::test]
async fn delete_completed_leaves_open_todos() {
    let storage = LocalStorage::in_memory().await.unwrap();

    let done = TodoRepository::insert(&storage.conn, make_todo("done", Priority::Normal, 1)).await.unwrap();
    TodoRepository::set_completion(&storage.conn, done, true, 5).await.unwrap();
    TodoRepository::insert(&storage.conn, make_todo("open", Priority::Normal, 2)).await.unwrap();

    let removed = TodoRepository::delete_completed(&storage.conn).await.unwrap();
    assert_eq!(removed, 1);

    let remaining = TodoRepository::get_all(&storage.conn).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "open");
}

#[tokio::test]
async fn remote_id_lookup_and_uniqueness() {
    let storage = LocalStorage::in_memory().await.unwrap();

    let id = TodoRepository::insert(&storage.conn, make_todo("tracked", Priority::Normal, 1)).await.unwrap();
    TodoRepository::set_remote_id(&storage.conn, id, "srv-42", SyncStatus::Synced).await.unwrap();

    let found = TodoRepository::get_by_remote_id(&storage.conn, "srv-42").await.unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(TodoRepository::get_by_remote_id(&storage.conn, "srv-43").await.unwrap().is_none());
}

#[tokio::test]
async fn sync_meta_upserts_in_place() {
    let storage = LocalStorage::in_memory().await.unwrap();

    assert_eq!(SyncMetaRepository::get_millis(&storage.conn, "last_sync").await.unwrap(), None);

    SyncMetaRepository::set_millis(&storage.conn, "last_sync", 1_000).await.unwrap();
    SyncMetaRepository::set_millis(&storage.conn, "last_sync", 2_000).await.unwrap();

    assert_eq!(
        SyncMetaRepository::get_millis(&storage.conn, "last_sync").await.unwrap(),
        Some(2_000)
    );
}

#[tokio::test]
async fn change_feed_increments_per_mutation() {
    let storage = LocalStorage::in_memory().await.unwrap();
    let mut feed = storage.changes();
    let start = *feed.borrow_and_update();

    storage.mark_changed();
    storage.mark_changed();

    assert_eq!(*feed.borrow_and_update(), start + 2);
}

#[tokio::test]
async fn clear_all_data_empties_both_tables() {
    let storage = LocalStorage::in_memory().await.unwrap();
    TodoRepository::insert(&storage.conn, make_todo("x", Priority::Normal, 1)).await.unwrap();
    SyncMetaRepository::set_millis(&storage.conn, "last_sync", 1).await.unwrap();
    assert!(storage.has_data().await.unwrap());

    storage.clear_all_data().await.unwrap();

    assert!(!storage.has_data().await.unwrap());
    assert_eq!(SyncMetaRepository::get_millis(&storage.conn, "last_sync").await.unwrap(), None);
}
