//! Immutable snapshot of all client documents.

use crate::model::client::{Client, ClientId};

/// Complete in-memory copy of the client collection as of one store change.
///
/// `version` increases with every published change, so a consumer can tell
/// a stale delivery from a newer one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    version: u64,
    clients: Vec<Client>,
}

impl Snapshot {
    pub fn new(version: u64, clients: Vec<Client>) -> Self {
        Self { version, clients }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn find_client(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
