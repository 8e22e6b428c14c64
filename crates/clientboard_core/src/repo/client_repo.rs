//! Client document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide whole-document put, named-field patch, get, list and delete over
//!   the `clients` table.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Client::validate()` before SQL mutations.
//! - Single-document reads reject invalid stored documents.
//! - Listing skips invalid stored documents with a warning so one bad row
//!   cannot hide every other client.
//! - Collection fields are replaced wholesale; there are no element patches.

use crate::db::DbError;
use crate::model::client::{Client, ClientField, ClientId, ClientValidationError};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const CLIENT_SELECT_SQL: &str = "SELECT id, document FROM clients";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for client persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ClientValidationError),
    Db(DbError),
    NotFound(ClientId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "client not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored client document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ClientValidationError> for RepoError {
    fn from(value: ClientValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document-store contract for client records.
pub trait ClientRepository {
    /// Creates the document, or replaces it wholesale when the id exists.
    fn put_client(&self, client: &Client) -> RepoResult<ClientId>;
    /// Overwrites the named fields and returns the resulting document.
    fn patch_client(&self, id: ClientId, fields: &[ClientField]) -> RepoResult<Client>;
    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>>;
    /// Lists all valid documents in insertion order.
    ///
    /// Stored documents that fail to decode or validate are skipped.
    fn list_clients(&self) -> RepoResult<Vec<Client>>;
    fn delete_client(&self, id: ClientId) -> RepoResult<()>;
}

impl<T: ClientRepository + ?Sized> ClientRepository for &T {
    fn put_client(&self, client: &Client) -> RepoResult<ClientId> {
        (**self).put_client(client)
    }

    fn patch_client(&self, id: ClientId, fields: &[ClientField]) -> RepoResult<Client> {
        (**self).patch_client(id, fields)
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        (**self).get_client(id)
    }

    fn list_clients(&self) -> RepoResult<Vec<Client>> {
        (**self).list_clients()
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        (**self).delete_client(id)
    }
}

/// SQLite-backed client repository.
pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn write_document(&self, client: &Client) -> RepoResult<()> {
        let document = encode_document(client)?;
        self.conn.execute(
            "INSERT INTO clients (id, document) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
            params![client.id.to_string(), document],
        )?;
        Ok(())
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn put_client(&self, client: &Client) -> RepoResult<ClientId> {
        client.validate()?;
        self.write_document(client)?;
        Ok(client.id)
    }

    fn patch_client(&self, id: ClientId, fields: &[ClientField]) -> RepoResult<Client> {
        let tx = self.conn.unchecked_transaction()?;
        let mut client = self.get_client(id)?.ok_or(RepoError::NotFound(id))?;
        for field in fields {
            field.apply(&mut client);
        }
        client.validate()?;
        self.write_document(&client)?;
        tx.commit()?;
        Ok(client)
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| {
                Ok((row.get::<_, String>("id")?, row.get::<_, String>("document")?))
            })
            .optional()?;

        row.map(|(id_text, document)| decode_document(&id_text, &document))
            .transpose()
    }

    fn list_clients(&self) -> RepoResult<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut clients = Vec::new();

        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            match parse_client_row(row) {
                Ok(client) => clients.push(client),
                Err(err) => warn!(
                    "event=client_decode module=repo status=error client_id={id_text} error={err}"
                ),
            }
        }

        Ok(clients)
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    let id_text: String = row.get("id")?;
    let document: String = row.get("document")?;
    decode_document(&id_text, &document)
}

fn encode_document(client: &Client) -> RepoResult<String> {
    serde_json::to_string(client).map_err(|err| {
        RepoError::InvalidData(format!("cannot encode client {}: {err}", client.id))
    })
}

fn decode_document(id_text: &str, document: &str) -> RepoResult<Client> {
    let id = Uuid::parse_str(id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in clients.id"))
    })?;

    let client: Client = serde_json::from_str(document)
        .map_err(|err| RepoError::InvalidData(format!("client {id}: {err}")))?;

    if client.id != id {
        return Err(RepoError::InvalidData(format!(
            "document id {} does not match row id {id}",
            client.id
        )));
    }

    client.validate()?;
    Ok(client)
}
