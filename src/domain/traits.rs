//! # Domain Traits
//!
//! Abstract interfaces for the bot's two external collaborators: the chat
//! platform and the persistent ledger store. Infrastructure supplies the
//! concrete implementations; the application layer only sees these.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{House, Student};

/// Abstract interface for a chat provider (e.g. Matrix, Slack, Console).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Post a message to the room this provider is bound to.
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// The current room ID.
    fn room_id(&self) -> String;
}

/// Backend failure while talking to the ledger store.
///
/// Never surfaced to chat; the router logs it and abandons the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Partial update for a student row.
///
/// The deltas are applied as single atomic `counter = counter + ?` statements
/// so concurrent messages never lose updates. `github_name` replaces the
/// stored value when set.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub earned_delta: i64,
    pub taken_delta: i64,
    pub given_delta: i64,
    pub github_name: Option<String>,
}

impl StudentUpdate {
    pub fn earned(delta: i64) -> Self {
        Self {
            earned_delta: delta,
            ..Default::default()
        }
    }

    pub fn taken(delta: i64) -> Self {
        Self {
            taken_delta: delta,
            ..Default::default()
        }
    }

    pub fn given(delta: i64) -> Self {
        Self {
            given_delta: delta,
            ..Default::default()
        }
    }

    pub fn github(name: &str) -> Self {
        Self {
            github_name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

/// Transactional key-value view of the ledger backend.
///
/// House totals never go below zero: `add_house_points` clamps at the
/// statement level, so a negative delta larger than the balance floors the
/// total at 0 in one atomic write.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_house_points(&self, house: House) -> Result<i64, StoreError>;

    async fn add_house_points(&self, house: House, delta: i64) -> Result<(), StoreError>;

    async fn set_house_points(&self, house: House, value: i64) -> Result<(), StoreError>;

    async fn get_student(&self, user_id: &str) -> Result<Option<Student>, StoreError>;

    async fn get_student_by_github(&self, github_name: &str)
    -> Result<Option<Student>, StoreError>;

    async fn insert_student(&self, student: &Student) -> Result<(), StoreError>;

    /// No-op when `user_id` has no row; callers treat that as resolution
    /// failure, not an error.
    async fn update_student(&self, user_id: &str, update: &StudentUpdate)
    -> Result<(), StoreError>;

    async fn delete_student(&self, user_id: &str) -> Result<(), StoreError>;

    /// Students, optionally filtered by house, in stable `user_id` order.
    async fn list_students(&self, house: Option<House>) -> Result<Vec<Student>, StoreError>;

    async fn get_info(&self, name: &str) -> Result<Option<String>, StoreError>;

    async fn set_info(&self, name: &str, val: &str) -> Result<(), StoreError>;
}
