//! # SQLite Ledger Store
//!
//! Implements [`LedgerStore`] on an embedded SQLite database. The schema is
//! created and the four house rows seeded at open time, so a fresh database
//! file is immediately usable.
//!
//! Every increment/decrement is a single SQL statement (`points = points + ?`,
//! `points = MAX(0, points - ?)`), never a read-then-write round trip, so
//! interleaved messages cannot lose updates.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;

use crate::domain::traits::{LedgerStore, StoreError, StudentUpdate};
use crate::domain::types::{House, Student};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS houses (
    house TEXT PRIMARY KEY,
    points INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS students (
    user_id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    house TEXT NOT NULL,
    points_earned INTEGER NOT NULL DEFAULT 0,
    points_taken INTEGER NOT NULL DEFAULT 0,
    points_given INTEGER NOT NULL DEFAULT 0,
    github_name TEXT UNIQUE
);
CREATE TABLE IF NOT EXISTS info (
    name TEXT PRIMARY KEY,
    val TEXT NOT NULL
);
";

pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        for house in House::ALL {
            let _ = conn.execute(
                "INSERT OR IGNORE INTO houses (house, points) VALUES (?1, 0)",
                params![house.key()],
            )?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    let house_key: String = row.get(2)?;
    let house = House::parse(&house_key).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown house '{house_key}'").into(),
        )
    })?;
    Ok(Student {
        user_id: row.get(0)?,
        username: row.get(1)?,
        house,
        points_earned: row.get(3)?,
        points_taken: row.get(4)?,
        points_given: row.get(5)?,
        github_name: row.get(6)?,
    })
}

const STUDENT_COLUMNS: &str =
    "user_id, username, house, points_earned, points_taken, points_given, github_name";

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn get_house_points(&self, house: House) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        let points = conn.query_row(
            "SELECT points FROM houses WHERE house = ?1",
            params![house.key()],
            |row| row.get(0),
        )?;
        Ok(points)
    }

    async fn add_house_points(&self, house: House, delta: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let _ = conn.execute(
            "UPDATE houses SET points = MAX(0, points + ?1) WHERE house = ?2",
            params![delta, house.key()],
        )?;
        Ok(())
    }

    async fn set_house_points(&self, house: House, value: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let _ = conn.execute(
            "UPDATE houses SET points = ?1 WHERE house = ?2",
            params![value, house.key()],
        )?;
        Ok(())
    }

    async fn get_student(&self, user_id: &str) -> Result<Option<Student>, StoreError> {
        let conn = self.conn.lock().await;
        let student = conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = ?1"),
                params![user_id],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    async fn get_student_by_github(
        &self,
        github_name: &str,
    ) -> Result<Option<Student>, StoreError> {
        let conn = self.conn.lock().await;
        let student = conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE github_name = ?1"),
                params![github_name],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    async fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let _ = conn.execute(
            "INSERT INTO students (user_id, username, house, points_earned, points_taken, \
             points_given, github_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                student.user_id,
                student.username,
                student.house.key(),
                student.points_earned,
                student.points_taken,
                student.points_given,
                student.github_name,
            ],
        )?;
        Ok(())
    }

    async fn update_student(
        &self,
        user_id: &str,
        update: &StudentUpdate,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let _ = conn.execute(
            "UPDATE students SET \
             points_earned = points_earned + ?1, \
             points_taken = points_taken + ?2, \
             points_given = points_given + ?3 \
             WHERE user_id = ?4",
            params![
                update.earned_delta,
                update.taken_delta,
                update.given_delta,
                user_id
            ],
        )?;
        if let Some(github_name) = &update.github_name {
            let _ = conn.execute(
                "UPDATE students SET github_name = ?1 WHERE user_id = ?2",
                params![github_name, user_id],
            )?;
        }
        Ok(())
    }

    async fn delete_student(&self, user_id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let _ = conn.execute("DELETE FROM students WHERE user_id = ?1", params![user_id])?;
        Ok(())
    }

    async fn list_students(&self, house: Option<House>) -> Result<Vec<Student>, StoreError> {
        let conn = self.conn.lock().await;
        let mut students = Vec::new();
        match house {
            Some(house) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {STUDENT_COLUMNS} FROM students WHERE house = ?1 ORDER BY user_id"
                ))?;
                let rows = stmt.query_map(params![house.key()], student_from_row)?;
                for row in rows {
                    students.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {STUDENT_COLUMNS} FROM students ORDER BY user_id"
                ))?;
                let rows = stmt.query_map([], student_from_row)?;
                for row in rows {
                    students.push(row?);
                }
            }
        }
        Ok(students)
    }

    async fn get_info(&self, name: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().await;
        let val = conn
            .query_row(
                "SELECT val FROM info WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(val)
    }

    async fn set_info(&self, name: &str, val: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let _ = conn.execute(
            "INSERT INTO info (name, val) VALUES (?1, ?2) \
             ON CONFLICT(name) DO UPDATE SET val = excluded.val",
            params![name, val],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteLedger {
        SqliteLedger::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn fresh_database_seeds_four_houses_at_zero() {
        let store = store();
        for house in House::ALL {
            assert_eq!(store.get_house_points(house).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn reopening_does_not_reset_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let store = SqliteLedger::open(&path).unwrap();
        store.add_house_points(House::Gryffindor, 25).await.unwrap();
        drop(store);

        let store = SqliteLedger::open(&path).unwrap();
        assert_eq!(store.get_house_points(House::Gryffindor).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn negative_delta_floors_at_zero_in_one_statement() {
        let store = store();
        store.add_house_points(House::Hufflepuff, 10).await.unwrap();
        store.add_house_points(House::Hufflepuff, -15).await.unwrap();
        assert_eq!(store.get_house_points(House::Hufflepuff).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn student_crud_round_trip() {
        let store = store();
        let student = Student::enrolled("U1", "harry", House::Gryffindor);
        store.insert_student(&student).await.unwrap();

        let found = store.get_student("U1").await.unwrap().unwrap();
        assert_eq!(found, student);

        store.delete_student("U1").await.unwrap();
        assert!(store.get_student("U1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_enrollment_insert_is_rejected() {
        let store = store();
        let student = Student::enrolled("U1", "harry", House::Gryffindor);
        store.insert_student(&student).await.unwrap();
        assert!(store.insert_student(&student).await.is_err());
    }

    #[tokio::test]
    async fn counter_updates_accumulate() {
        let store = store();
        store
            .insert_student(&Student::enrolled("U1", "harry", House::Gryffindor))
            .await
            .unwrap();

        store
            .update_student("U1", &StudentUpdate::earned(10))
            .await
            .unwrap();
        store
            .update_student("U1", &StudentUpdate::earned(7))
            .await
            .unwrap();
        store
            .update_student("U1", &StudentUpdate::taken(3))
            .await
            .unwrap();

        let s = store.get_student("U1").await.unwrap().unwrap();
        assert_eq!(s.points_earned, 17);
        assert_eq!(s.points_taken, 3);
        assert_eq!(s.points_given, 0);
    }

    #[tokio::test]
    async fn update_for_unknown_student_is_a_no_op() {
        let store = store();
        store
            .update_student("U404", &StudentUpdate::earned(10))
            .await
            .unwrap();
        assert!(store.get_student("U404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn github_names_are_unique() {
        let store = store();
        store
            .insert_student(&Student::enrolled("U1", "harry", House::Gryffindor))
            .await
            .unwrap();
        store
            .insert_student(&Student::enrolled("U2", "ron", House::Gryffindor))
            .await
            .unwrap();

        store
            .update_student("U1", &StudentUpdate::github("octocat"))
            .await
            .unwrap();
        assert!(
            store
                .update_student("U2", &StudentUpdate::github("octocat"))
                .await
                .is_err()
        );

        let linked = store.get_student_by_github("octocat").await.unwrap().unwrap();
        assert_eq!(linked.user_id, "U1");
    }

    #[tokio::test]
    async fn listing_filters_by_house_in_stable_order() {
        let store = store();
        store
            .insert_student(&Student::enrolled("U3", "cho", House::Ravenclaw))
            .await
            .unwrap();
        store
            .insert_student(&Student::enrolled("U1", "luna", House::Ravenclaw))
            .await
            .unwrap();
        store
            .insert_student(&Student::enrolled("U2", "draco", House::Slytherin))
            .await
            .unwrap();

        let ravenclaws = store.list_students(Some(House::Ravenclaw)).await.unwrap();
        let ids: Vec<&str> = ravenclaws.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(ids, vec!["U1", "U3"]);

        assert_eq!(store.list_students(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn info_round_trip_and_overwrite() {
        let store = store();
        assert!(store.get_info("lastrun").await.unwrap().is_none());

        store.set_info("lastrun", "2016-01-01T00:00:00Z").await.unwrap();
        store.set_info("lastrun", "2016-06-01T00:00:00Z").await.unwrap();

        assert_eq!(
            store.get_info("lastrun").await.unwrap().as_deref(),
            Some("2016-06-01T00:00:00Z")
        );
    }
}
