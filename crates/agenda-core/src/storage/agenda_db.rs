//! SQLite-based storage for projects and confirmed agendas.
//!
//! Every query is scoped to an owner id; the database performs no
//! authentication of its own.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::agenda::AgendaBlock;
use crate::error::{CoreError, DatabaseError};
use crate::project::Project;

/// Fixed-width RFC3339 so that stored timestamps sort as text
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored RFC3339 column, reporting corrupt values as conversion failures
fn parse_datetime(column: usize, dt_str: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

const PROJECT_COLUMNS: &str =
    "id, user_id, title, category, valence, estimated_hours, priority, due_date, created_at";

/// Build a Project from a database row
fn row_to_project(row: &rusqlite::Row) -> Result<Project, rusqlite::Error> {
    let due_date: String = row.get(7)?;
    let created_at: String = row.get(8)?;
    Ok(Project {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        valence: row.get(4)?,
        estimated_hours: row.get(5)?,
        priority: row.get(6)?,
        due_date: parse_datetime(7, &due_date)?,
        created_at: parse_datetime(8, &created_at)?,
    })
}

/// Build an AgendaBlock from a database row
fn row_to_block(row: &rusqlite::Row) -> Result<AgendaBlock, rusqlite::Error> {
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    Ok(AgendaBlock {
        id: row.get(0)?,
        user_id: row.get(1)?,
        project_id: row.get(2)?,
        start: parse_datetime(3, &start)?,
        end: parse_datetime(4, &end)?,
    })
}

/// SQLite database for backlog and agenda storage.
pub struct AgendaDb {
    conn: Connection,
}

impl AgendaDb {
    /// Open the database at `<data_dir>/agenda.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("agenda.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS projects (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                category        TEXT NOT NULL,
                valence         INTEGER NOT NULL CHECK (valence BETWEEN 1 AND 5),
                estimated_hours REAL NOT NULL CHECK (estimated_hours > 0),
                priority        INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
                due_date        TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS agenda (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                start_at   TEXT NOT NULL,
                end_at     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);
            CREATE INDEX IF NOT EXISTS idx_agenda_user_start ON agenda(user_id, start_at);",
        )?;
        Ok(())
    }

    // === Project CRUD ===

    /// Insert a project. Ratings are clamped before storing.
    pub fn create_project(&self, project: &Project) -> Result<(), CoreError> {
        let project = project.clone().normalized();
        self.conn.execute(
            "INSERT INTO projects (id, user_id, title, category, valence, estimated_hours, priority, due_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                project.id,
                project.user_id,
                project.title,
                project.category,
                project.valence,
                project.estimated_hours,
                project.priority,
                format_datetime(project.due_date),
                format_datetime(project.created_at),
            ],
        )?;
        Ok(())
    }

    /// Get a project by ID, only if `user_id` owns it.
    pub fn get_project(&self, id: &str, user_id: &str) -> Result<Option<Project>, CoreError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1 AND user_id = ?2");
        let project = self
            .conn
            .query_row(&sql, params![id, user_id], row_to_project)
            .optional()?;
        Ok(project)
    }

    /// List a user's projects, newest first.
    pub fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, CoreError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = ?1 ORDER BY created_at DESC, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let projects = stmt
            .query_map(params![user_id], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Overwrite a stored project. Returns `false` if `project.user_id`
    /// does not own a project with that id.
    pub fn update_project(&self, project: &Project) -> Result<bool, CoreError> {
        let project = project.clone().normalized();
        let changed = self.conn.execute(
            "UPDATE projects
             SET title = ?1, category = ?2, valence = ?3, estimated_hours = ?4,
                 priority = ?5, due_date = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                project.title,
                project.category,
                project.valence,
                project.estimated_hours,
                project.priority,
                format_datetime(project.due_date),
                project.id,
                project.user_id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a project and its agenda blocks. Returns `false` if nothing
    /// owned by `user_id` matched.
    pub fn delete_project(&self, id: &str, user_id: &str) -> Result<bool, CoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM projects WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    // === Agenda ===

    /// List a user's agenda in start order.
    pub fn list_agenda(&self, user_id: &str) -> Result<Vec<AgendaBlock>, CoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, project_id, start_at, end_at FROM agenda
             WHERE user_id = ?1 ORDER BY start_at ASC, id",
        )?;
        let blocks = stmt
            .query_map(params![user_id], row_to_block)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blocks)
    }

    /// Replace a user's agenda with `blocks` in a single transaction.
    ///
    /// Either the old agenda is fully replaced or nothing changes.
    ///
    /// # Errors
    /// Returns an error if any block belongs to another user or refers to a
    /// project the database does not know.
    pub fn replace_agenda(
        &self,
        user_id: &str,
        blocks: &[AgendaBlock],
    ) -> Result<Vec<AgendaBlock>, CoreError> {
        if let Some(foreign) = blocks.iter().find(|b| b.user_id != user_id) {
            return Err(DatabaseError::ForeignBlock {
                block_id: foreign.id.clone(),
                owner: foreign.user_id.clone(),
                user_id: user_id.to_string(),
            }
            .into());
        }

        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            self.conn
                .execute("DELETE FROM agenda WHERE user_id = ?1", params![user_id])?;
            let mut stmt = self.conn.prepare(
                "INSERT INTO agenda (id, user_id, project_id, start_at, end_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for block in blocks {
                stmt.execute(params![
                    block.id,
                    block.user_id,
                    block.project_id,
                    format_datetime(block.start),
                    format_datetime(block.end),
                ])?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                self.list_agenda(user_id)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err.into())
            }
        }
    }

    /// Remove a user's agenda. Returns the number of blocks removed.
    pub fn clear_agenda(&self, user_id: &str) -> Result<usize, CoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM agenda WHERE user_id = ?1", params![user_id])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn project(user: &str, title: &str) -> Project {
        Project::new(user, title, "work", 3, 2.0, 3, t0() + Duration::days(3)).unwrap()
    }

    fn block(user: &str, project_id: &str, offset_min: i64) -> AgendaBlock {
        let start = t0() + Duration::minutes(offset_min);
        AgendaBlock::new(user, project_id, start, start + Duration::minutes(30))
    }

    #[test]
    fn project_crud_is_owner_scoped() {
        let db = AgendaDb::open_memory().unwrap();
        let mut p = project("alice", "Thesis");
        db.create_project(&p).unwrap();

        assert!(db.get_project(&p.id, "alice").unwrap().is_some());
        assert!(db.get_project(&p.id, "bob").unwrap().is_none());
        assert_eq!(db.list_projects("alice").unwrap().len(), 1);
        assert!(db.list_projects("bob").unwrap().is_empty());

        p.title = "Thesis draft".into();
        assert!(db.update_project(&p).unwrap());
        let stored = db.get_project(&p.id, "alice").unwrap().unwrap();
        assert_eq!(stored.title, "Thesis draft");
        assert_eq!(stored.due_date, p.due_date);

        let mut stolen = p.clone();
        stolen.user_id = "bob".into();
        assert!(!db.update_project(&stolen).unwrap());

        assert!(!db.delete_project(&p.id, "bob").unwrap());
        assert!(db.delete_project(&p.id, "alice").unwrap());
        assert!(db.get_project(&p.id, "alice").unwrap().is_none());
    }

    #[test]
    fn create_project_clamps_ratings() {
        let db = AgendaDb::open_memory().unwrap();
        let mut p = project("alice", "Loud");
        p.valence = 11;
        p.priority = -4;
        db.create_project(&p).unwrap();
        let stored = db.get_project(&p.id, "alice").unwrap().unwrap();
        assert_eq!((stored.valence, stored.priority), (5, 1));
    }

    #[test]
    fn replace_agenda_swaps_whole_agenda() {
        let db = AgendaDb::open_memory().unwrap();
        let p = project("alice", "Thesis");
        db.create_project(&p).unwrap();

        db.replace_agenda("alice", &[block("alice", &p.id, 0), block("alice", &p.id, 30)])
            .unwrap();
        assert_eq!(db.list_agenda("alice").unwrap().len(), 2);

        let stored = db
            .replace_agenda("alice", &[block("alice", &p.id, 120)])
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].start, t0() + Duration::minutes(120));
    }

    #[test]
    fn replace_agenda_leaves_other_users_alone() {
        let db = AgendaDb::open_memory().unwrap();
        let pa = project("alice", "A");
        let pb = project("bob", "B");
        db.create_project(&pa).unwrap();
        db.create_project(&pb).unwrap();

        db.replace_agenda("bob", &[block("bob", &pb.id, 0)]).unwrap();
        db.replace_agenda("alice", &[block("alice", &pa.id, 0)]).unwrap();
        db.replace_agenda("alice", &[]).unwrap();

        assert!(db.list_agenda("alice").unwrap().is_empty());
        assert_eq!(db.list_agenda("bob").unwrap().len(), 1);
    }

    #[test]
    fn replace_agenda_rejects_foreign_blocks() {
        let db = AgendaDb::open_memory().unwrap();
        let p = project("alice", "A");
        db.create_project(&p).unwrap();
        let err = db
            .replace_agenda("alice", &[block("mallory", &p.id, 0)])
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::ForeignBlock { .. })
        ));
    }

    #[test]
    fn replace_agenda_rolls_back_on_unknown_project() {
        let db = AgendaDb::open_memory().unwrap();
        let p = project("alice", "A");
        db.create_project(&p).unwrap();
        db.replace_agenda("alice", &[block("alice", &p.id, 0)]).unwrap();

        let result = db.replace_agenda(
            "alice",
            &[block("alice", &p.id, 60), block("alice", "ghost", 90)],
        );
        assert!(result.is_err());

        let agenda = db.list_agenda("alice").unwrap();
        assert_eq!(agenda.len(), 1);
        assert_eq!(agenda[0].start, t0());
    }

    #[test]
    fn deleting_project_drops_its_blocks() {
        let db = AgendaDb::open_memory().unwrap();
        let p = project("alice", "A");
        db.create_project(&p).unwrap();
        db.replace_agenda("alice", &[block("alice", &p.id, 0)]).unwrap();
        db.delete_project(&p.id, "alice").unwrap();
        assert!(db.list_agenda("alice").unwrap().is_empty());
    }

    #[test]
    fn clear_agenda_counts_removed_blocks() {
        let db = AgendaDb::open_memory().unwrap();
        let p = project("alice", "A");
        db.create_project(&p).unwrap();
        db.replace_agenda("alice", &[block("alice", &p.id, 0), block("alice", &p.id, 30)])
            .unwrap();
        assert_eq!(db.clear_agenda("alice").unwrap(), 2);
        assert_eq!(db.clear_agenda("alice").unwrap(), 0);
    }

    #[test]
    fn corrupt_timestamps_are_reported_not_replaced() {
        let db = AgendaDb::open_memory().unwrap();
        let p = project("alice", "A");
        db.create_project(&p).unwrap();
        db.replace_agenda("alice", &[block("alice", &p.id, 0)]).unwrap();

        db.conn
            .execute("UPDATE agenda SET end_at = 'not a date' WHERE user_id = 'alice'", [])
            .unwrap();
        assert!(matches!(
            db.list_agenda("alice"),
            Err(CoreError::Database(DatabaseError::QueryFailed(_)))
        ));

        db.conn
            .execute("UPDATE projects SET due_date = '2026-13-45' WHERE id = ?1", [&p.id])
            .unwrap();
        assert!(db.get_project(&p.id, "alice").is_err());
        assert!(db.list_projects("alice").is_err());
    }
}
