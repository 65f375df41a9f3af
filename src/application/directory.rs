//! # User Directory
//!
//! Read-only snapshot of the room's participants, refreshed by the platform
//! adapter. Resolves between display-name mentions and opaque user IDs in
//! both directions; a failed lookup is the caller's cue for a silent no-op.

/// One known participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: String,
    pub name: String,
}

/// Snapshot mapping of participant IDs to display names.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<DirectoryUser>,
}

impl UserDirectory {
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[DirectoryUser] {
        &self.users
    }

    /// Resolve a mention to a user ID. Upstream mention syntax may already
    /// carry the ID, so both forms match. Matrix IDs start with a sigil that
    /// mention extraction strips, so the sigil-less spelling matches too.
    pub fn resolve_mention_to_id(&self, mention: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| {
                u.id == mention || u.name == mention || u.id.trim_start_matches('@') == mention
            })
            .map(|u| u.id.as_str())
    }

    /// Resolve a user ID (or a name, for symmetry) to a display name.
    pub fn resolve_id_to_name(&self, user_id: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == user_id || u.name == user_id)
            .map(|u| u.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![
            DirectoryUser {
                id: "U100".to_string(),
                name: "harry".to_string(),
            },
            DirectoryUser {
                id: "U200".to_string(),
                name: "hermione".to_string(),
            },
        ])
    }

    #[test]
    fn resolves_by_name_and_by_id() {
        let dir = directory();
        assert_eq!(dir.resolve_mention_to_id("harry"), Some("U100"));
        assert_eq!(dir.resolve_mention_to_id("U200"), Some("U200"));
        assert_eq!(dir.resolve_id_to_name("U100"), Some("harry"));
        assert_eq!(dir.resolve_id_to_name("hermione"), Some("hermione"));
    }

    #[test]
    fn sigil_stripped_id_still_resolves() {
        let dir = UserDirectory::new(vec![DirectoryUser {
            id: "@harry:example.org".to_string(),
            name: "harry".to_string(),
        }]);
        assert_eq!(
            dir.resolve_mention_to_id("harry:example.org"),
            Some("@harry:example.org")
        );
    }

    #[test]
    fn unknown_lookups_yield_none() {
        let dir = directory();
        assert_eq!(dir.resolve_mention_to_id("voldemort"), None);
        assert_eq!(dir.resolve_id_to_name("U999"), None);
    }
}
