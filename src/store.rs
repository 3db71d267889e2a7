//! Store collaborators that receive committed batches.
//!
//! [`CredentialStore::insert_batch`] is all-or-nothing: either every record in
//! the slice is persisted or none is. Callers never retry a failed batch.
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::credential::PersistableRecord;
use crate::digest::is_sha512_hex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("not a SHA-512 hex digest: {0}")]
    InvalidDigest(String),
    #[error("store rejected batch: {0}")]
    Rejected(String),
}

pub trait CredentialStore {
    /// Persist `records` as one atomic unit.
    fn insert_batch(&mut self, records: &[PersistableRecord]) -> Result<(), StoreError>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS account_passwords (
    id INTEGER PRIMARY KEY,
    acct_name TEXT NOT NULL,
    password TEXT NOT NULL,
    passwd_hash TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS account_passwords_hash_idx
    ON account_passwords(passwd_hash);
";

const INSERT: &str =
    "INSERT INTO account_passwords (acct_name, password, passwd_hash) VALUES (?1, ?2, ?3)";

/// SQLite-backed lookup store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // parallel import units each hold their own connection
        conn.busy_timeout(Duration::from_secs(30))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Whether any stored password has this digest. Accepts upper- or
    /// lowercase hex.
    pub fn contains_digest(&self, digest: &str) -> Result<bool, StoreError> {
        if !is_sha512_hex(digest) {
            return Err(StoreError::InvalidDigest(digest.to_string()));
        }
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM account_passwords WHERE passwd_hash = ?1 LIMIT 1",
                [digest.to_ascii_lowercase()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn record_count(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM account_passwords", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

impl CredentialStore for SqliteStore {
    fn insert_batch(&mut self, records: &[PersistableRecord]) -> Result<(), StoreError> {
        // dropping the transaction on error rolls it back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT)?;
            for r in records {
                stmt.execute(params![r.account, r.password, r.password_digest])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Keeps committed records in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub records: Vec<PersistableRecord>,
    /// Size of every batch received, in commit order.
    pub commits: Vec<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn insert_batch(&mut self, records: &[PersistableRecord]) -> Result<(), StoreError> {
        self.records.extend_from_slice(records);
        self.commits.push(records.len());
        Ok(())
    }
}

/// Counts batches and records without keeping them. Backs `import --dry-run`.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub records: usize,
    pub commits: usize,
}

impl CredentialStore for CountingStore {
    fn insert_batch(&mut self, records: &[PersistableRecord]) -> Result<(), StoreError> {
        self.records += records.len();
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest;

    fn rec(account: &str, password: &str) -> PersistableRecord {
        PersistableRecord::from_pair(account.as_bytes(), password.as_bytes())
    }

    #[test]
    fn sqlite_inserts_and_finds_digests() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_batch(&[rec("a@b.c", "hunter2"), rec("d@e.f", "")])
            .unwrap();
        assert_eq!(store.record_count().unwrap(), 2);
        assert!(store.contains_digest(&digest("hunter2")).unwrap());
        assert!(store.contains_digest(&digest("hunter2").to_uppercase()).unwrap());
        assert!(store.contains_digest(&digest("")).unwrap());
        assert!(!store.contains_digest(&digest("hunter3")).unwrap());
    }

    #[test]
    fn sqlite_rejects_malformed_digest() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.contains_digest("abc"),
            Err(StoreError::InvalidDigest(_))
        ));
    }

    #[test]
    fn sqlite_empty_batch_is_a_no_op() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_batch(&[]).unwrap();
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn sqlite_failed_batch_leaves_nothing_behind() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON account_passwords
                 WHEN NEW.acct_name = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'bad account'); END;",
            )
            .unwrap();
        let err = store
            .insert_batch(&[rec("ok@b.c", "1"), rec("bad", "2")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert_eq!(store.record_count().unwrap(), 0);
        assert!(!store.contains_digest(&digest("1")).unwrap());

        store.insert_batch(&[rec("ok2@b.c", "3")]).unwrap();
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert_batch(&[rec("a@b.c", "pw")]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.record_count().unwrap(), 1);
        assert!(store.contains_digest(&digest("pw")).unwrap());
    }

    #[test]
    fn memory_store_tracks_commit_sizes() {
        let mut store = MemoryStore::new();
        store.insert_batch(&[rec("a", "1"), rec("b", "2")]).unwrap();
        store.insert_batch(&[]).unwrap();
        assert_eq!(store.commits, vec![2, 0]);
        assert_eq!(store.records.len(), 2);
    }

    #[test]
    fn counting_store_keeps_only_totals() {
        let mut store = CountingStore::default();
        store.insert_batch(&[rec("a", "1"), rec("b", "2")]).unwrap();
        store.insert_batch(&[rec("c", "3")]).unwrap();
        store.insert_batch(&[]).unwrap();
        assert_eq!((store.records, store.commits), (3, 3));
    }
}
