//! # Ledger Engine
//!
//! Executes the mutation or query implied by a classified intent against the
//! ledger store, enforcing the numeric and enrollment invariants:
//!
//! - every award/deduct magnitude is clamped into [0, 100] before any write
//! - house totals never go below zero
//! - a student enrolls at most once, and only erases themself
//! - the per-student counters are lifetime tallies, not balances: a deduct
//!   still counts against the actor's `points_taken` even when the house
//!   total bottomed out at zero

use rand::Rng;

use crate::application::directory::UserDirectory;
use crate::domain::traits::{LedgerStore, StoreError, StudentUpdate};
use crate::domain::types::{House, Reply, Student};

/// Points credited for an approving review comment on the GitHub channel.
const GITHUB_REWARD: i64 = 5;

/// A single instruction moves at most this many points.
const MAX_POINTS_PER_INSTRUCTION: i64 = 100;

/// Clamp a requested magnitude into the allowed per-instruction range.
pub fn clamp_amount(raw: i64) -> i64 {
    raw.clamp(0, MAX_POINTS_PER_INSTRUCTION)
}

/// Stateless executor over a [`LedgerStore`]; one per routed message.
pub struct LedgerEngine<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> LedgerEngine<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    /// Award points to a house, crediting the actor's lifetime `points_given`.
    pub async fn award_house(
        &self,
        house: House,
        raw_amount: i64,
        actor_id: &str,
    ) -> Result<Reply, StoreError> {
        let amount = clamp_amount(raw_amount);
        self.store.add_house_points(house, amount).await?;
        self.store
            .update_student(actor_id, &StudentUpdate::given(amount))
            .await?;
        let total = self.store.get_house_points(house).await?;
        Ok(Reply::HouseAwarded { house, total })
    }

    /// Deduct points from a house, floored at zero, tallying the actor's
    /// lifetime `points_taken` by the full clamped amount regardless.
    pub async fn deduct_house(
        &self,
        house: House,
        raw_amount: i64,
        actor_id: &str,
    ) -> Result<Reply, StoreError> {
        let amount = clamp_amount(raw_amount);
        self.store.add_house_points(house, -amount).await?;
        self.store
            .update_student(actor_id, &StudentUpdate::taken(amount))
            .await?;
        let total = self.store.get_house_points(house).await?;
        Ok(Reply::HouseDeducted { house, total })
    }

    /// Award points to a student: their house gets the points, they get
    /// `points_earned`, the actor gets `points_given`. Unknown targets are a
    /// silent no-op.
    pub async fn award_student(
        &self,
        target_id: &str,
        raw_amount: i64,
        actor_id: &str,
    ) -> Result<Reply, StoreError> {
        let Some(target) = self.store.get_student(target_id).await? else {
            return Ok(Reply::Silent);
        };
        let amount = clamp_amount(raw_amount);
        let reply = self.award_house(target.house, amount, actor_id).await?;
        self.store
            .update_student(target_id, &StudentUpdate::earned(amount))
            .await?;
        Ok(reply)
    }

    /// Deduct points via a student: resolves their house then delegates.
    /// Unknown targets are a silent no-op.
    pub async fn deduct_student(
        &self,
        target_id: &str,
        raw_amount: i64,
        actor_id: &str,
    ) -> Result<Reply, StoreError> {
        let Some(target) = self.store.get_student(target_id).await? else {
            return Ok(Reply::Silent);
        };
        self.deduct_house(target.house, raw_amount, actor_id).await
    }

    /// Current totals for all four houses, in canonical order.
    pub async fn standings(&self) -> Result<Reply, StoreError> {
        let mut totals = Vec::with_capacity(House::ALL.len());
        for house in House::ALL {
            totals.push((house, self.store.get_house_points(house).await?));
        }
        Ok(Reply::Standings(totals))
    }

    /// Zero every house total. Student lifetime counters are untouched.
    pub async fn reset_scores(&self) -> Result<Reply, StoreError> {
        for house in House::ALL {
            self.store.set_house_points(house, 0).await?;
        }
        Ok(Reply::ScoresReset)
    }

    /// Enroll a user in their chosen house. Enrollment is permanent: a user
    /// who already has a record keeps their first house, silently. Passing no
    /// house is also a silent no-op (the caller could not name one).
    pub async fn enroll(
        &self,
        user_id: &str,
        username: &str,
        house: Option<House>,
    ) -> Result<Reply, StoreError> {
        let Some(house) = house else {
            return Ok(Reply::Silent);
        };
        if self.store.get_student(user_id).await?.is_some() {
            return Ok(Reply::Silent);
        }
        self.store
            .insert_student(&Student::enrolled(user_id, username, house))
            .await?;
        Ok(Reply::Enrolled {
            username: username.to_string(),
            house,
        })
    }

    /// Enroll a user in a house chosen uniformly at random.
    pub async fn random_sort(&self, user_id: &str, username: &str) -> Result<Reply, StoreError> {
        let house = House::ALL[rand::rng().random_range(0..House::ALL.len())];
        self.enroll(user_id, username, Some(house)).await
    }

    /// Randomly sort every directory member who is not yet enrolled.
    pub async fn force_sort_all(&self, directory: &UserDirectory) -> Result<Reply, StoreError> {
        let mut sorted = Vec::new();
        for user in directory.users() {
            if let Reply::Enrolled { username, house } =
                self.random_sort(&user.id, &user.name).await?
            {
                sorted.push((username, house));
            }
        }
        Ok(Reply::BulkSorted(sorted))
    }

    /// Erase a student record. Self-service only: any requester other than
    /// the target is a silent no-op.
    pub async fn erase(&self, target_id: &str, requester_id: &str) -> Result<Reply, StoreError> {
        if target_id != requester_id {
            return Ok(Reply::Silent);
        }
        self.store.delete_student(target_id).await?;
        Ok(Reply::Erased)
    }

    /// Per house, the student with the highest `points_earned`. Ties go to
    /// the earliest record in storage order (lowest `user_id`).
    pub async fn best_students(&self) -> Result<Reply, StoreError> {
        let mut best = Vec::new();
        for house in House::ALL {
            if let Some(top) = self.top_by(house, |s| s.points_earned).await? {
                best.push(top);
            }
        }
        Ok(Reply::BestStudents(best))
    }

    /// Per house, the student with the highest `points_taken`.
    pub async fn worst_students(&self) -> Result<Reply, StoreError> {
        let mut worst = Vec::new();
        for house in House::ALL {
            if let Some(top) = self.top_by(house, |s| s.points_taken).await? {
                worst.push(top);
            }
        }
        Ok(Reply::WorstStudents(worst))
    }

    async fn top_by(
        &self,
        house: House,
        counter: impl Fn(&Student) -> i64,
    ) -> Result<Option<Student>, StoreError> {
        let students = self.store.list_students(Some(house)).await?;
        let mut top: Option<Student> = None;
        for s in students {
            match &top {
                Some(t) if counter(&s) <= counter(t) => {}
                _ => top = Some(s),
            }
        }
        Ok(top)
    }

    /// A student's record card, or a polite shrug for anyone not on the books.
    pub async fn student_stats(&self, target_id: &str) -> Result<Reply, StoreError> {
        match self.store.get_student(target_id).await? {
            Some(s) => Ok(Reply::StudentStats(s)),
            None => Ok(Reply::UnknownStudent),
        }
    }

    pub async fn house_roster(&self, house: House) -> Result<Reply, StoreError> {
        let members = self.roster_names(house).await?;
        Ok(Reply::Roster { house, members })
    }

    pub async fn full_roster(&self) -> Result<Reply, StoreError> {
        let mut rosters = Vec::with_capacity(House::ALL.len());
        for house in House::ALL {
            rosters.push((house, self.roster_names(house).await?));
        }
        Ok(Reply::FullRoster(rosters))
    }

    async fn roster_names(&self, house: House) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .list_students(Some(house))
            .await?
            .into_iter()
            .map(|s| s.username)
            .collect())
    }

    /// Link a GitHub account name to a student record.
    pub async fn link_github(
        &self,
        user_id: &str,
        username: &str,
        github_name: &str,
    ) -> Result<Reply, StoreError> {
        self.store
            .update_student(user_id, &StudentUpdate::github(github_name))
            .await?;
        Ok(Reply::GithubLinked {
            username: username.to_string(),
            github_name: github_name.to_string(),
        })
    }

    /// Credit an inbound approval event to the linked student and their
    /// house. Unlinked account names are a silent no-op; so is a success,
    /// since the integration channel is not a conversation.
    pub async fn credit_github_approval(&self, github_name: &str) -> Result<Reply, StoreError> {
        let Some(student) = self.store.get_student_by_github(github_name).await? else {
            return Ok(Reply::Silent);
        };
        self.store
            .update_student(&student.user_id, &StudentUpdate::earned(GITHUB_REWARD))
            .await?;
        self.store
            .add_house_points(student.house, GITHUB_REWARD)
            .await?;
        Ok(Reply::Silent)
    }
}
