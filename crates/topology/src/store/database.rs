use std::fmt;
use std::path::Path;

use sqlite as sql;

use super::{Entry, Error, Store};
use crate::time::Timestamp;

const SCHEMA: &str = r#"
-- Announcements registered against each instance.
create table if not exists "announcements" (
  -- Instance the announcement was registered against.
  "instance"    text      not null,
  -- Owner of the announcement.
  "owner"       text      not null,
  -- Encoded announcement.
  "json"        text      not null,
  -- Time of the last write, in milliseconds.
  "timestamp"   integer   not null,
  primary key ("instance", "owner")
) strict;
"#;

/// How long to wait for a lock held by another connection, in milliseconds.
const BUSY_TIMEOUT: usize = 3_000;

/// SQLite-backed announcement store.
pub struct Database {
    db: sql::ConnectionThreadSafe,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish()
    }
}

impl Database {
    /// Open a database at the given path, creating it if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut db = sql::Connection::open_thread_safe(path)?;
        db.set_busy_timeout(BUSY_TIMEOUT)?;
        db.execute(SCHEMA)?;

        Ok(Self { db })
    }

    /// Create a new in-memory database.
    pub fn memory() -> Result<Self, Error> {
        Self::open(":memory:")
    }

    /// Abort the open transaction, so that the connection can begin a new one.
    fn rollback(&self) {
        if let Err(e) = self.db.execute("ROLLBACK") {
            log::error!(target: "store", "Failed to roll back transaction: {e}");
        }
    }
}

impl Store for Database {
    fn instances(&self) -> Result<Vec<String>, Error> {
        let stmt = self
            .db
            .prepare("SELECT DISTINCT instance FROM announcements ORDER BY instance")?;
        let mut instances = Vec::new();

        for row in stmt.into_iter() {
            let row = row?;
            instances.push(row.read::<&str, _>("instance").to_owned());
        }
        Ok(instances)
    }

    fn announcements(&self, instance: &str) -> Result<Vec<Entry>, Error> {
        let mut stmt = self.db.prepare(
            "SELECT owner, json, timestamp FROM announcements
             WHERE instance = ?1
             ORDER BY owner",
        )?;
        stmt.bind((1, instance))?;

        let mut entries = Vec::new();
        for row in stmt.into_iter() {
            entries.push(entry(&row?));
        }
        Ok(entries)
    }

    fn get(&self, instance: &str, owner: &str) -> Result<Option<Entry>, Error> {
        let mut stmt = self.db.prepare(
            "SELECT owner, json, timestamp FROM announcements
             WHERE instance = ?1 AND owner = ?2",
        )?;
        stmt.bind((1, instance))?;
        stmt.bind((2, owner))?;

        if let Some(row) = stmt.into_iter().next() {
            return Ok(Some(entry(&row?)));
        }
        Ok(None)
    }

    fn put(
        &mut self,
        instance: &str,
        owner: &str,
        json: &str,
        timestamp: Timestamp,
    ) -> Result<(), Error> {
        let mut stmt = self.db.prepare(
            "INSERT INTO announcements (instance, owner, json, timestamp)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (instance, owner) DO UPDATE
             SET json = ?3, timestamp = ?4",
        )?;
        stmt.bind((1, instance))?;
        stmt.bind((2, owner))?;
        stmt.bind((3, json))?;
        stmt.bind((4, i64::try_from(timestamp.as_millis()).unwrap_or(i64::MAX)))?;
        stmt.next()?;

        Ok(())
    }

    fn remove(&mut self, instance: &str, owner: &str) -> Result<bool, Error> {
        let mut stmt = self
            .db
            .prepare("DELETE FROM announcements WHERE instance = ?1 AND owner = ?2")?;
        stmt.bind((1, instance))?;
        stmt.bind((2, owner))?;
        stmt.next()?;

        Ok(self.db.change_count() > 0)
    }

    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<Error>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        self.db.execute("BEGIN").map_err(Error::from)?;

        match f(self) {
            Ok(result) => match self.db.execute("COMMIT") {
                Ok(()) => Ok(result),
                Err(e) => {
                    log::warn!(target: "store", "Failed to commit transaction: {e}");
                    self.rollback();
                    Err(Error::from(e).into())
                }
            },
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }
}

fn entry(row: &sql::Row) -> Entry {
    Entry {
        owner: row.read::<&str, _>("owner").to_owned(),
        json: row.read::<&str, _>("json").to_owned(),
        timestamp: Timestamp::from_millis(
            u64::try_from(row.read::<i64, _>("timestamp")).unwrap_or_default(),
        ),
    }
}
