//! # Response Composer
//!
//! Pure translation of engine results into outgoing messages. Multi-part
//! results (standings, rosters, per-house superlatives) compose one message
//! per house in canonical order.

use crate::domain::types::{OutgoingMessage, Reply};
use crate::strings::messages;

/// Phrase a [`Reply`] for the channel it came from. `Silent` and the other
/// no-op outcomes compose to an empty list: no bot chatter for them.
pub fn compose(channel: &str, reply: &Reply) -> Vec<OutgoingMessage> {
    let msg = |text: String| OutgoingMessage::new(channel, text);

    match reply {
        Reply::HouseAwarded { house, total } => {
            vec![msg(messages::house_awarded(*house, *total))]
        }
        Reply::HouseDeducted { house, total } => {
            vec![msg(messages::house_deducted(*house, *total))]
        }
        Reply::Standings(totals) => {
            let mut out = vec![msg(messages::STANDINGS_HEADER.to_string())];
            out.extend(
                totals
                    .iter()
                    .map(|(house, points)| msg(messages::standings_line(*house, *points))),
            );
            out
        }
        Reply::ScoresReset => vec![msg(messages::SCORES_RESET.to_string())],
        Reply::Welcome => vec![msg(messages::WELCOME_BANNER.to_string())],
        Reply::Enrolled { username, house } => {
            vec![msg(messages::student_enrolled(username, *house))]
        }
        Reply::BulkSorted(sorted) => sorted
            .iter()
            .map(|(username, house)| msg(messages::student_enrolled(username, *house)))
            .collect(),
        Reply::Erased => vec![msg(messages::ERASED.to_string())],
        Reply::BestStudents(best) => {
            let mut out: Vec<OutgoingMessage> = best
                .iter()
                .map(|s| msg(messages::best_student_line(s)))
                .collect();
            if !out.is_empty() {
                out.push(msg(messages::BEST_STUDENT_CODA.to_string()));
            }
            out
        }
        Reply::WorstStudents(worst) => worst
            .iter()
            .map(|s| msg(messages::worst_student_line(s)))
            .collect(),
        Reply::StudentStats(student) => vec![msg(messages::student_stats(student))],
        Reply::UnknownStudent => vec![msg(messages::UNKNOWN_STUDENT.to_string())],
        Reply::HeadmasterBio => vec![msg(messages::HEADMASTER_BIO.to_string())],
        Reply::Roster { house, members } => {
            vec![msg(messages::house_roster(*house, members))]
        }
        Reply::FullRoster(rosters) => rosters
            .iter()
            .map(|(house, members)| msg(messages::house_roster(*house, members)))
            .collect(),
        Reply::SortingExplained => vec![msg(messages::SORTING_EXPLANATION.to_string())],
        Reply::GithubLinked {
            username,
            github_name,
        } => vec![msg(messages::github_linked(username, github_name))],
        Reply::Silent => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::House;

    #[test]
    fn silent_composes_to_nothing() {
        assert!(compose("!room:x", &Reply::Silent).is_empty());
    }

    #[test]
    fn standings_compose_header_plus_one_per_house_in_order() {
        let reply = Reply::Standings(
            House::ALL
                .into_iter()
                .map(|h| (h, 10))
                .collect(),
        );
        let out = compose("!room:x", &reply);
        assert_eq!(out.len(), 5);
        assert!(out[1].text.starts_with("Gryffindor"));
        assert!(out[2].text.starts_with("Hufflepuff"));
        assert!(out[3].text.starts_with("Ravenclaw"));
        assert!(out[4].text.starts_with("Slytherin"));
        assert!(out.iter().all(|m| m.channel == "!room:x" && m.as_user));
    }

    #[test]
    fn award_message_carries_house_and_total() {
        let out = compose(
            "!room:x",
            &Reply::HouseAwarded {
                house: House::Ravenclaw,
                total: 42,
            },
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("Ravenclaw"));
        assert!(out[0].text.contains("42"));
    }

    #[test]
    fn empty_best_list_gets_no_coda() {
        assert!(compose("!room:x", &Reply::BestStudents(Vec::new())).is_empty());
    }
}
