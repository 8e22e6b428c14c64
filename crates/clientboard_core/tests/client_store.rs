use clientboard_core::{
    attach_dashboard, Client, ClientField, ClientRepository, ClientStatus, ClientStore,
    DashboardState, RepoError, Snapshot, SqliteClientRepository,
};
use parking_lot::Mutex;
use rusqlite::params;
use std::sync::Arc;
use uuid::Uuid;

type Deliveries = Arc<Mutex<Vec<Arc<Snapshot>>>>;

fn recording_subscriber(store: &ClientStore) -> (Deliveries, clientboard_core::Subscription) {
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deliveries);
    let subscription = store.subscribe(
        move |snapshot| sink.lock().push(snapshot),
        |err: &RepoError| panic!("unexpected store error: {err}"),
    );
    (deliveries, subscription)
}

#[test]
fn subscribe_delivers_current_snapshot_immediately() {
    let store = ClientStore::open_in_memory().unwrap();
    store
        .put_client(&Client::new("Acme", ClientStatus::Active))
        .unwrap();

    let (deliveries, _subscription) = recording_subscriber(&store);

    let deliveries = deliveries.lock();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].len(), 1);
    assert_eq!(deliveries[0].clients()[0].name, "Acme");
}

#[test]
fn every_write_publishes_a_newer_full_snapshot() {
    let store = ClientStore::open_in_memory().unwrap();
    let (deliveries, _subscription) = recording_subscriber(&store);

    let client = Client::new("Acme", ClientStatus::Onboarding);
    store.put_client(&client).unwrap();
    store
        .patch_client(client.id, &[ClientField::Status(ClientStatus::Active)])
        .unwrap();
    store.delete_client(client.id).unwrap();

    let deliveries = deliveries.lock();
    assert_eq!(deliveries.len(), 4);
    assert!(deliveries
        .windows(2)
        .all(|pair| pair[0].version() < pair[1].version()));
    assert_eq!(deliveries[1].clients()[0].status, ClientStatus::Onboarding);
    assert_eq!(deliveries[2].clients()[0].status, ClientStatus::Active);
    assert!(deliveries[3].is_empty());
}

#[test]
fn failed_write_publishes_nothing() {
    let store = ClientStore::open_in_memory().unwrap();
    let (deliveries, _subscription) = recording_subscriber(&store);

    let err = store
        .put_client(&Client::new("", ClientStatus::Active))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(deliveries.lock().len(), 1);
}

#[test]
fn dropping_subscription_stops_deliveries() {
    let store = ClientStore::open_in_memory().unwrap();
    let (deliveries, subscription) = recording_subscriber(&store);
    assert_eq!(store.subscriber_count(), 1);

    drop(subscription);
    assert_eq!(store.subscriber_count(), 0);

    store
        .put_client(&Client::new("Acme", ClientStatus::Active))
        .unwrap();
    assert_eq!(deliveries.lock().len(), 1);
}

#[test]
fn explicit_unsubscribe_only_affects_its_own_listener() {
    let store = ClientStore::open_in_memory().unwrap();
    let (first, first_subscription) = recording_subscriber(&store);
    let (second, _second_subscription) = recording_subscriber(&store);

    first_subscription.unsubscribe();
    store
        .put_client(&Client::new("Acme", ClientStatus::Active))
        .unwrap();

    assert_eq!(first.lock().len(), 1);
    assert_eq!(second.lock().len(), 2);
}

#[test]
fn subscription_outliving_store_drops_cleanly() {
    let store = ClientStore::open_in_memory().unwrap();
    let (_deliveries, subscription) = recording_subscriber(&store);

    drop(store);
    drop(subscription);
}

#[test]
fn dashboard_state_ignores_older_snapshots() {
    let mut state = DashboardState::new();
    assert!(state.is_loading());

    let newer = Arc::new(Snapshot::new(
        5,
        vec![Client::new("Acme", ClientStatus::Active)],
    ));
    let older = Arc::new(Snapshot::new(3, Vec::new()));

    assert!(state.apply_snapshot(newer));
    assert!(!state.is_loading());
    assert!(!state.apply_snapshot(older));
    assert_eq!(state.clients().len(), 1);
    assert_eq!(state.snapshot().version(), 5);
}

#[test]
fn attached_dashboard_follows_store_writes() {
    let store = ClientStore::open_in_memory().unwrap();
    let (dashboard, _subscription) = attach_dashboard(&store);
    assert!(!dashboard.lock().is_loading());
    assert!(dashboard.lock().clients().is_empty());

    let client = Client::new("Acme", ClientStatus::Active);
    store.put_client(&client).unwrap();

    let state = dashboard.lock();
    assert_eq!(state.clients().len(), 1);
    assert_eq!(state.clients()[0].id, client.id);
    assert!(state.sync_error().is_none());
}

#[test]
fn corrupt_document_does_not_hide_valid_clients() {
    let conn = clientboard_core::db::open_db_in_memory().unwrap();
    let valid = Client::new("Acme", ClientStatus::Active);
    SqliteClientRepository::new(&conn).put_client(&valid).unwrap();
    let bad_id = Uuid::new_v4();
    let document = format!(r#"{{"id": "{bad_id}", "name": "Hooli", "status": "archived"}}"#);
    conn.execute(
        "INSERT INTO clients (id, document) VALUES (?1, ?2);",
        params![bad_id.to_string(), document],
    )
    .unwrap();

    let store = ClientStore::new(conn);
    let (dashboard, _subscription) = attach_dashboard(&store);
    {
        let state = dashboard.lock();
        assert!(state.sync_error().is_none());
        assert_eq!(state.clients(), [valid.clone()]);
    }

    let added = Client::new("Globex", ClientStatus::Onboarding);
    store.put_client(&added).unwrap();

    let state = dashboard.lock();
    assert!(state.sync_error().is_none());
    assert_eq!(state.clients(), [valid, added]);
}

#[test]
fn file_backed_store_sees_documents_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clientboard.db");

    let client = Client::new("Acme", ClientStatus::Active);
    {
        let store = ClientStore::open(&path).unwrap();
        store.put_client(&client).unwrap();
    }

    let reopened = ClientStore::open(&path).unwrap();
    let snapshot = reopened.snapshot().unwrap();
    assert_eq!(snapshot.find_client(client.id), Some(&client));
}
