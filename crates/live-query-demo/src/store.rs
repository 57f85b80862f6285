//! The database client stand-in: an in-memory SQLite store that publishes a
//! [`ChangeNotification`] after every committed write.
//!
//! Storage is delegated to rusqlite; this layer only wires mutations to the
//! notifier and packages reads as [`QuerySource`]s that report the tables
//! they touched.
//!
//! # Threading
//!
//! The connection lives behind a `parking_lot::Mutex` and is never held
//! while publishing, so notification callbacks can safely re-enter the
//! store.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Value};
use thiserror::Error;

use live_query::error::QueryError;
use live_query::live::QuerySource;
use live_query::notifier::{ChangeNotification, EventNotifier, Notifier};
use live_query::types::{LiveResult, QualifiedTablename};

use crate::domain::{Club, ClubMember, Person, TABLE_CLUB, TABLE_CLUBMEMBER, TABLE_PERSON};

/// Logical namespace all demo tables live under.
pub const DEFAULT_NAMESPACE: &str = "main";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn query_err(e: rusqlite::Error) -> QueryError {
    QueryError::new(e.to_string())
}

// ============================================================================
// Sort order
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// ============================================================================
// Database
// ============================================================================

pub struct Database {
    conn: Mutex<Connection>,
    notifier: Arc<EventNotifier>,
    dbname: String,
}

impl Database {
    /// Open an in-memory database with the demo schema.
    pub fn open_in_memory(notifier: Arc<EventNotifier>) -> StoreResult<Arc<Self>> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE person (
                id   TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age  INTEGER NOT NULL
            );
            CREATE TABLE club (
                id   TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age  INTEGER NOT NULL
            );
            CREATE TABLE clubmember (
                id        TEXT PRIMARY KEY,
                club_id   TEXT NOT NULL,
                person_id TEXT NOT NULL
            );",
        )?;
        Ok(Arc::new(Self {
            conn: Mutex::new(conn),
            notifier,
            dbname: DEFAULT_NAMESPACE.to_string(),
        }))
    }

    pub fn notifier(&self) -> Arc<EventNotifier> {
        Arc::clone(&self.notifier)
    }

    /// Publish a single-table change. Called after the connection lock is
    /// released.
    fn publish(&self, table: &str) {
        self.notifier
            .publish_data_changes(ChangeNotification::for_table(
                self.dbname.clone(),
                QualifiedTablename::new(self.dbname.clone(), table),
            ));
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn insert_person(&self, person: &Person) -> StoreResult<()> {
        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO person (id, name, age) VALUES (?1, ?2, ?3)",
                params![person.id, person.name, person.age],
            )?;
        }
        self.publish(TABLE_PERSON);
        Ok(())
    }

    pub fn insert_club(&self, club: &Club) -> StoreResult<()> {
        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO club (id, name, age) VALUES (?1, ?2, ?3)",
                params![club.id, club.name, club.age],
            )?;
        }
        self.publish(TABLE_CLUB);
        Ok(())
    }

    pub fn insert_member(&self, member: &ClubMember) -> StoreResult<()> {
        {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO clubmember (id, club_id, person_id) VALUES (?1, ?2, ?3)",
                params![member.id, member.club_id, member.person_id],
            )?;
        }
        self.publish(TABLE_CLUBMEMBER);
        Ok(())
    }

    pub fn update_person_age(&self, id: &str, age: i64) -> StoreResult<bool> {
        let n = {
            let conn = self.conn.lock();
            conn.execute("UPDATE person SET age = ?2 WHERE id = ?1", params![id, age])?
        };
        if n > 0 {
            self.publish(TABLE_PERSON);
        }
        Ok(n > 0)
    }

    pub fn update_club_age(&self, id: &str, age: i64) -> StoreResult<bool> {
        let n = {
            let conn = self.conn.lock();
            conn.execute("UPDATE club SET age = ?2 WHERE id = ?1", params![id, age])?
        };
        if n > 0 {
            self.publish(TABLE_CLUB);
        }
        Ok(n > 0)
    }

    pub fn delete_all_people(&self) -> StoreResult<usize> {
        let n = {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM person", [])?
        };
        if n > 0 {
            self.publish(TABLE_PERSON);
        }
        Ok(n)
    }

    pub fn delete_all_clubs(&self) -> StoreResult<usize> {
        let n = {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM club", [])?
        };
        if n > 0 {
            self.publish(TABLE_CLUB);
        }
        Ok(n)
    }

    pub fn delete_membership(&self, club_id: &str, person_id: &str) -> StoreResult<usize> {
        let n = {
            let conn = self.conn.lock();
            conn.execute(
                "DELETE FROM clubmember WHERE club_id = ?1 AND person_id = ?2",
                params![club_id, person_id],
            )?
        };
        if n > 0 {
            self.publish(TABLE_CLUBMEMBER);
        }
        Ok(n)
    }

    // -----------------------------------------------------------------------
    // Point reads
    // -----------------------------------------------------------------------

    pub fn first_person(&self) -> StoreResult<Option<Person>> {
        let conn = self.conn.lock();
        let person = conn
            .query_row(
                "SELECT id, name, age FROM person ORDER BY rowid LIMIT 1",
                [],
                |row| {
                    Ok(Person {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        age: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(person)
    }

    pub fn first_club(&self) -> StoreResult<Option<Club>> {
        let conn = self.conn.lock();
        let club = conn
            .query_row(
                "SELECT id, name, age FROM club ORDER BY rowid LIMIT 1",
                [],
                |row| {
                    Ok(Club {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        age: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(club)
    }

    // -----------------------------------------------------------------------
    // Reads backing the query sources
    // -----------------------------------------------------------------------

    fn select_people(&self, search: &str, order: SortOrder) -> rusqlite::Result<Vec<Value>> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT id, name, age FROM person WHERE name LIKE '%' || ?1 || '%' ORDER BY name {}",
            order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![search], |row| {
            Ok(json!({
                "id": row.get::<_, String>(0)?,
                "name": row.get::<_, String>(1)?,
                "age": row.get::<_, i64>(2)?,
            }))
        })?;
        rows.collect()
    }

    fn select_person(&self, id: &str) -> rusqlite::Result<Option<Value>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, age FROM person WHERE id = ?1",
            params![id],
            |row| {
                Ok(json!({
                    "id": row.get::<_, String>(0)?,
                    "name": row.get::<_, String>(1)?,
                    "age": row.get::<_, i64>(2)?,
                }))
            },
        )
        .optional()
    }

    fn select_clubs(&self) -> rusqlite::Result<Vec<Value>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, name, age FROM club ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(json!({
                "id": row.get::<_, String>(0)?,
                "name": row.get::<_, String>(1)?,
                "age": row.get::<_, i64>(2)?,
            }))
        })?;
        rows.collect()
    }

    fn select_memberships(&self, person_id: &str) -> rusqlite::Result<Vec<Value>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, club_id, person_id FROM clubmember WHERE person_id = ?1")?;
        let rows = stmt.query_map(params![person_id], |row| {
            Ok(json!({
                "id": row.get::<_, String>(0)?,
                "club_id": row.get::<_, String>(1)?,
                "person_id": row.get::<_, String>(2)?,
            }))
        })?;
        rows.collect()
    }
}

fn table(name: &str) -> QualifiedTablename {
    QualifiedTablename::new(DEFAULT_NAMESPACE, name)
}

// ============================================================================
// Query sources
// ============================================================================

/// All people matching a name-contains filter, in the given order.
pub struct PeopleQuery {
    db: Arc<Database>,
    search: String,
    order: SortOrder,
}

impl PeopleQuery {
    pub fn new(db: Arc<Database>, search: String, order: SortOrder) -> Self {
        Self { db, search, order }
    }
}

#[async_trait]
impl QuerySource<Vec<Value>> for PeopleQuery {
    async fn run(&self) -> Result<LiveResult<Vec<Value>>, QueryError> {
        let rows = self
            .db
            .select_people(&self.search, self.order)
            .map_err(query_err)?;
        Ok(LiveResult::new(rows, vec![table(TABLE_PERSON)]))
    }
}

/// One person by id, or `None`.
pub struct PersonByIdQuery {
    db: Arc<Database>,
    id: String,
}

impl PersonByIdQuery {
    pub fn new(db: Arc<Database>, id: String) -> Self {
        Self { db, id }
    }
}

#[async_trait]
impl QuerySource<Option<Value>> for PersonByIdQuery {
    async fn run(&self) -> Result<LiveResult<Option<Value>>, QueryError> {
        let row = self.db.select_person(&self.id).map_err(query_err)?;
        Ok(LiveResult::new(row, vec![table(TABLE_PERSON)]))
    }
}

/// All clubs, by name.
pub struct ClubsQuery {
    db: Arc<Database>,
}

impl ClubsQuery {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuerySource<Vec<Value>> for ClubsQuery {
    async fn run(&self) -> Result<LiveResult<Vec<Value>>, QueryError> {
        let rows = self.db.select_clubs().map_err(query_err)?;
        Ok(LiveResult::new(rows, vec![table(TABLE_CLUB)]))
    }
}

/// All memberships of one person.
pub struct MembershipsQuery {
    db: Arc<Database>,
    person_id: String,
}

impl MembershipsQuery {
    pub fn new(db: Arc<Database>, person_id: String) -> Self {
        Self { db, person_id }
    }
}

#[async_trait]
impl QuerySource<Vec<Value>> for MembershipsQuery {
    async fn run(&self) -> Result<LiveResult<Vec<Value>>, QueryError> {
        let rows = self
            .db
            .select_memberships(&self.person_id)
            .map_err(query_err)?;
        Ok(LiveResult::new(rows, vec![table(TABLE_CLUBMEMBER)]))
    }
}
