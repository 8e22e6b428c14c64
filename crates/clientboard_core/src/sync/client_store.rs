//! Client document store with change notifications.
//!
//! # Responsibility
//! - Own the SQLite connection behind the document-store contract.
//! - Publish a fresh full snapshot to every subscriber after each write.
//! - Hand out subscription handles that unsubscribe explicitly or on drop.
//!
//! # Invariants
//! - Snapshot versions are assigned under the connection lock, so a higher
//!   version always reflects a later committed state.
//! - Listeners are invoked outside every store lock.
//! - A failed write publishes nothing.

use super::snapshot::Snapshot;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::client::{Client, ClientField, ClientId};
use crate::repo::client_repo::{ClientRepository, RepoError, RepoResult, SqliteClientRepository};
use log::{debug, error, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type SnapshotListener = dyn Fn(Arc<Snapshot>) + Send + Sync;
type ErrorListener = dyn Fn(&RepoError) + Send + Sync;

#[derive(Clone)]
struct Listener {
    on_snapshot: Arc<SnapshotListener>,
    on_error: Arc<ErrorListener>,
}

#[derive(Default)]
struct ListenerRegistry {
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    fn register(&self, listener: Listener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.listeners.lock().insert(id, listener);
        id
    }

    fn remove(&self, id: u64) -> bool {
        self.listeners.lock().remove(&id).is_some()
    }

    fn current(&self) -> Vec<Listener> {
        self.listeners.lock().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Handle for one registered snapshot listener.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    /// Stops deliveries to this listener.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                debug!(
                    "event=store_unsubscribe module=sync status=ok subscription_id={}",
                    self.id
                );
            }
        }
    }
}

/// SQLite-backed client store that notifies subscribers on every change.
pub struct ClientStore {
    conn: Mutex<Connection>,
    registry: Arc<ListenerRegistry>,
    version: AtomicU64,
}

impl ClientStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            registry: Arc::new(ListenerRegistry::default()),
            version: AtomicU64::new(0),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Registers a listener and immediately delivers the current snapshot.
    ///
    /// When loading fails, `on_error` is called instead and the listener stays
    /// registered for later changes.
    pub fn subscribe<S, E>(&self, on_snapshot: S, on_error: E) -> Subscription
    where
        S: Fn(Arc<Snapshot>) + Send + Sync + 'static,
        E: Fn(&RepoError) + Send + Sync + 'static,
    {
        let listener = Listener {
            on_snapshot: Arc::new(on_snapshot),
            on_error: Arc::new(on_error),
        };
        let id = self.registry.register(listener.clone());
        info!("event=store_subscribe module=sync status=ok subscription_id={id}");

        match self.load_snapshot() {
            Ok(snapshot) => (listener.on_snapshot)(Arc::new(snapshot)),
            Err(err) => {
                error!(
                    "event=store_subscribe module=sync status=error subscription_id={id} error={err}"
                );
                (listener.on_error)(&err);
            }
        }

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Loads the current snapshot without notifying anyone.
    pub fn snapshot(&self) -> RepoResult<Snapshot> {
        self.load_snapshot()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    fn load_snapshot(&self) -> RepoResult<Snapshot> {
        let conn = self.conn.lock();
        let clients = SqliteClientRepository::new(&conn).list_clients()?;
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Snapshot::new(version, clients))
    }

    fn with_repo<T>(
        &self,
        op: &'static str,
        client_id: ClientId,
        action: impl FnOnce(&SqliteClientRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let result = {
            let conn = self.conn.lock();
            action(&SqliteClientRepository::new(&conn))
        };

        match &result {
            Ok(_) => {
                debug!("event=store_write module=sync status=ok op={op} client_id={client_id}");
            }
            Err(err) => {
                error!(
                    "event=store_write module=sync status=error op={op} client_id={client_id} error={err}"
                );
            }
        }
        result
    }

    fn publish(&self) {
        let listeners = self.registry.current();
        if listeners.is_empty() {
            return;
        }

        match self.load_snapshot() {
            Ok(snapshot) => {
                debug!(
                    "event=store_publish module=sync status=ok version={} clients={} subscribers={}",
                    snapshot.version(),
                    snapshot.len(),
                    listeners.len()
                );
                let snapshot = Arc::new(snapshot);
                for listener in listeners {
                    (listener.on_snapshot)(Arc::clone(&snapshot));
                }
            }
            Err(err) => {
                error!(
                    "event=store_publish module=sync status=error subscribers={} error={err}",
                    listeners.len()
                );
                for listener in listeners {
                    (listener.on_error)(&err);
                }
            }
        }
    }
}

impl ClientRepository for ClientStore {
    fn put_client(&self, client: &Client) -> RepoResult<ClientId> {
        let id = self.with_repo("put", client.id, |repo| repo.put_client(client))?;
        self.publish();
        Ok(id)
    }

    fn patch_client(&self, id: ClientId, fields: &[ClientField]) -> RepoResult<Client> {
        let patched = self.with_repo("patch", id, |repo| repo.patch_client(id, fields))?;
        self.publish();
        Ok(patched)
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let conn = self.conn.lock();
        SqliteClientRepository::new(&conn).get_client(id)
    }

    fn list_clients(&self) -> RepoResult<Vec<Client>> {
        let conn = self.conn.lock();
        SqliteClientRepository::new(&conn).list_clients()
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        self.with_repo("delete", id, |repo| repo.delete_client(id))?;
        self.publish();
        Ok(())
    }
}
