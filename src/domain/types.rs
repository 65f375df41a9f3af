//! # Domain Types
//!
//! Core data structures for the points ledger: houses, students, classified
//! intents, engine results, and the platform-neutral message shapes.

use serde::{Deserialize, Serialize};

/// The four houses, in canonical announcement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Gryffindor,
    Hufflepuff,
    Ravenclaw,
    Slytherin,
}

impl House {
    pub const ALL: [House; 4] = [
        House::Gryffindor,
        House::Hufflepuff,
        House::Ravenclaw,
        House::Slytherin,
    ];

    /// Lowercase storage/matching key.
    pub fn key(&self) -> &'static str {
        match self {
            House::Gryffindor => "gryffindor",
            House::Hufflepuff => "hufflepuff",
            House::Ravenclaw => "ravenclaw",
            House::Slytherin => "slytherin",
        }
    }

    /// Capitalized name for announcements.
    pub fn display(&self) -> &'static str {
        match self {
            House::Gryffindor => "Gryffindor",
            House::Hufflepuff => "Hufflepuff",
            House::Ravenclaw => "Ravenclaw",
            House::Slytherin => "Slytherin",
        }
    }

    pub fn parse(s: &str) -> Option<House> {
        House::ALL.into_iter().find(|h| h.key() == s)
    }

    /// First house named anywhere in `text`. `text` must already be lowercased.
    pub fn find_in(text: &str) -> Option<House> {
        House::ALL.into_iter().find(|h| text.contains(h.key()))
    }
}

/// An enrolled participant and their lifetime point counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub user_id: String,
    pub username: String,
    pub house: House,
    pub points_earned: i64,
    pub points_taken: i64,
    pub points_given: i64,
    pub github_name: Option<String>,
}

impl Student {
    /// A fresh enrollment record: zero on every counter.
    pub fn enrolled(user_id: &str, username: &str, house: House) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.to_string(),
            house,
            points_earned: 0,
            points_taken: 0,
            points_given: 0,
            github_name: None,
        }
    }
}

/// The classified meaning of one inbound message.
///
/// Variants carry only what classification itself extracts from the text;
/// amounts and house names for award/deduct are parsed on the engine path
/// because they share the message body with the target reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    GithubEvent,
    AwardPoints,
    DeductPoints,
    QueryStandings,
    ResetScores,
    Greet,
    RequestEnrollment(Option<House>),
    RandomSort,
    Erase(String),
    BestStudent,
    WorstStudent,
    DescribeStudent(String),
    DescribeHouse(House),
    ExplainSorting,
    ListRoster,
    LinkGithubName(String),
    ForceSortAll,
    Ignore,
}

/// What the engine did, for the composer to phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    HouseAwarded { house: House, total: i64 },
    HouseDeducted { house: House, total: i64 },
    Standings(Vec<(House, i64)>),
    ScoresReset,
    Welcome,
    Enrolled { username: String, house: House },
    BulkSorted(Vec<(String, House)>),
    Erased,
    BestStudents(Vec<Student>),
    WorstStudents(Vec<Student>),
    StudentStats(Student),
    UnknownStudent,
    HeadmasterBio,
    Roster { house: House, members: Vec<String> },
    FullRoster(Vec<(House, Vec<String>)>),
    SortingExplained,
    GithubLinked { username: String, github_name: String },
    /// Deliberate no-op; composes to zero messages.
    Silent,
}

/// A chat event as handed over by the platform adapter.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Platform event type; the core only acts on `"message"`.
    pub kind: String,
    pub text: String,
    pub channel: String,
    pub sender: String,
    pub attachments: Vec<Attachment>,
}

/// Rich-message payload attached by integrations (webhook bridges).
#[derive(Debug, Clone, Default)]
pub struct Attachment {
    pub pretext: Option<String>,
    pub text: Option<String>,
}

/// A message the bot wants posted back to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: String,
    pub as_user: bool,
}

impl OutgoingMessage {
    pub fn new(channel: &str, text: String) -> Self {
        Self {
            channel: channel.to_string(),
            text,
            as_user: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_canonical_order() {
        let keys: Vec<&str> = House::ALL.iter().map(|h| h.key()).collect();
        assert_eq!(
            keys,
            vec!["gryffindor", "hufflepuff", "ravenclaw", "slytherin"]
        );
    }

    #[test]
    fn house_find_in_picks_first_named() {
        assert_eq!(
            House::find_in("10 points to ravenclaw"),
            Some(House::Ravenclaw)
        );
        assert_eq!(House::find_in("no house here"), None);
        // Two houses in one message: canonical order decides.
        assert_eq!(
            House::find_in("slytherin or gryffindor"),
            Some(House::Gryffindor)
        );
    }

    #[test]
    fn house_parse_round_trip() {
        for h in House::ALL {
            assert_eq!(House::parse(h.key()), Some(h));
        }
        assert_eq!(House::parse("durmstrang"), None);
    }
}
