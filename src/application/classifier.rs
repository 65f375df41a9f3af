//! # Command Classifier
//!
//! Pure classification of inbound text into an [`Intent`]. Matching is
//! case-insensitive substring search, evaluated in a fixed priority order:
//! changing the order changes observable behavior, so the sequence below is
//! a contract, not an implementation detail.
//!
//! A hidden-payload decode runs once per message before classification: a
//! message carrying one of three known 8-bit patterns is decoded from binary
//! to ASCII first, so the more daring students can award points in binary.

use regex::Regex;

use crate::application::directory::UserDirectory;
use crate::domain::types::{House, Intent};

/// Binary spellings the decoder reacts to: the bot's name, "points to",
/// and "points from".
const HIDDEN_TRIGGERS: [&str; 3] = [
    "01100100 01110101 01101101 01100010 01101100 01100101 01100100 01101111 01110010 01100101",
    "01110000 01101111 01101001 01101110 01110100 01110011 00100000 01110100 01101111",
    "01110000 01101111 01101001 01101110 01110100 01110011 00100000 01100110 01110010 01101111 01101101",
];

/// Decode a binary-encoded message into plain text, substituting a decoded
/// `@name` mention with the `<@id>` form the rest of the pipeline expects.
///
/// Messages without a known trigger pattern pass through untouched.
pub fn decode_hidden_payload(text: &str, directory: &UserDirectory) -> String {
    if !HIDDEN_TRIGGERS.iter().any(|t| text.contains(t)) {
        return text.to_string();
    }

    let decoded: String = text
        .split_whitespace()
        .filter_map(|group| u8::from_str_radix(group, 2).ok())
        .map(char::from)
        .collect();

    if let Some(at) = decoded.find('@') {
        let name: String = decoded[at + 1..]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect();
        if let Some(id) = directory.resolve_mention_to_id(&name) {
            return decoded.replace(&format!("@{name}"), &format!("<@{id}>"));
        }
    }

    decoded
}

/// Classify one message. `text` is the (already decoded) message body.
///
/// Priority order, first match wins:
/// 1. designated integration channel
/// 2. "points to" / "points from"
/// 3. direct address (trigger word or bot name), then the phrase table
/// 4. silence
pub fn classify(text: &str, is_github_channel: bool, bot_name: &str, trigger_word: &str) -> Intent {
    if is_github_channel {
        return Intent::GithubEvent;
    }

    let lower = text.to_lowercase();

    if lower.contains("points to") {
        return Intent::AwardPoints;
    }
    if lower.contains("points from") {
        return Intent::DeductPoints;
    }

    let addressed =
        lower.contains(&trigger_word.to_lowercase()) || lower.contains(&bot_name.to_lowercase());
    if !addressed {
        return Intent::Ignore;
    }

    let mention = extract_mention(text);
    let house = House::find_in(&lower);

    if lower.contains("who is winning the house cup") {
        Intent::QueryStandings
    } else if lower.contains("reset the scores please") {
        Intent::ResetScores
    } else if lower.contains("say hello to the students") {
        Intent::Greet
    } else if lower.contains("can i please join") {
        Intent::RequestEnrollment(house)
    } else if lower.contains("i would like to put my fate in the hands of the sorting hat") {
        Intent::RandomSort
    } else if lower.contains("obliviate")
        && let Some(m) = &mention
    {
        Intent::Erase(m.clone())
    } else if lower.contains("best student") {
        Intent::BestStudent
    } else if lower.contains("meanest student") {
        Intent::WorstStudent
    } else if lower.contains("tell me about")
        && let Some(m) = &mention
    {
        Intent::DescribeStudent(m.clone())
    } else if lower.contains("tell me about")
        && let Some(h) = house
    {
        Intent::DescribeHouse(h)
    } else if lower.contains("start the sorting ceremony") {
        Intent::ExplainSorting
    } else if lower.contains("hogwarts roster") {
        Intent::ListRoster
    } else if lower.contains("link my github name=") {
        Intent::LinkGithubName(parse_github_name(text))
    } else if lower.contains("sort the rest") {
        Intent::ForceSortAll
    } else {
        Intent::Ignore
    }
}

/// The mention embedded in a message: the run after `@`, up to the closing
/// `>` of platform mention syntax or the next whitespace.
pub fn extract_mention(text: &str) -> Option<String> {
    let at = text.find('@')?;
    let mention: String = text[at + 1..]
        .chars()
        .take_while(|c| *c != '>' && !c.is_whitespace())
        .collect();
    if mention.is_empty() { None } else { Some(mention) }
}

/// Point magnitude from the leading token of an award/deduct message.
///
/// Non-digits are stripped first ("10pts" reads as 10); a token with no
/// digits reads as zero. Digit runs too long for i64 saturate high and are
/// left for the engine's [0,100] clamp.
pub fn parse_amount(text: &str) -> i64 {
    let first = text.split_whitespace().next().unwrap_or("");
    let digits: String = {
        let re = Regex::new(r"[^0-9]").unwrap();
        re.replace_all(first, "").to_string()
    };
    if digits.is_empty() {
        0
    } else {
        digits.parse::<i64>().unwrap_or(i64::MAX)
    }
}

/// The account name following `name=` in a link request.
fn parse_github_name(text: &str) -> String {
    text.split_once('=')
        .map(|(_, rest)| rest.split_whitespace().next().unwrap_or("").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::directory::DirectoryUser;

    const BOT: &str = "dumbledore";
    const TRIGGER: &str = "professor";

    fn classify_plain(text: &str) -> Intent {
        classify(text, false, BOT, TRIGGER)
    }

    #[test]
    fn github_channel_outranks_everything() {
        assert_eq!(
            classify("10 points to gryffindor", true, BOT, TRIGGER),
            Intent::GithubEvent
        );
    }

    #[test]
    fn award_and_deduct_detection() {
        assert_eq!(classify_plain("10 points to gryffindor"), Intent::AwardPoints);
        assert_eq!(classify_plain("10 Points To hufflepuff"), Intent::AwardPoints);
        assert_eq!(classify_plain("5 points from slytherin"), Intent::DeductPoints);
    }

    #[test]
    fn award_outranks_direct_address() {
        // "points to" wins even when the bot is named in the same message.
        assert_eq!(
            classify_plain("professor, 10 points to ravenclaw"),
            Intent::AwardPoints
        );
    }

    #[test]
    fn unaddressed_chatter_is_ignored() {
        assert_eq!(classify_plain("what a lovely morning"), Intent::Ignore);
        assert_eq!(classify_plain("who is winning the house cup"), Intent::Ignore);
    }

    #[test]
    fn direct_address_phrases() {
        assert_eq!(
            classify_plain("Professor who is winning the house cup?"),
            Intent::QueryStandings
        );
        assert_eq!(
            classify_plain("dumbledore reset the scores please"),
            Intent::ResetScores
        );
        assert_eq!(
            classify_plain("professor say hello to the students"),
            Intent::Greet
        );
        assert_eq!(
            classify_plain("professor start the sorting ceremony"),
            Intent::ExplainSorting
        );
        assert_eq!(classify_plain("professor hogwarts roster"), Intent::ListRoster);
        assert_eq!(classify_plain("professor sort the rest"), Intent::ForceSortAll);
    }

    #[test]
    fn enrollment_carries_chosen_house() {
        assert_eq!(
            classify_plain("Professor can I please join Gryffindor"),
            Intent::RequestEnrollment(Some(House::Gryffindor))
        );
        assert_eq!(
            classify_plain("professor can i please join"),
            Intent::RequestEnrollment(None)
        );
    }

    #[test]
    fn sorting_hat_phrase() {
        assert_eq!(
            classify_plain(
                "Professor I would like to put my fate in the hands of the Sorting Hat"
            ),
            Intent::RandomSort
        );
    }

    #[test]
    fn erase_requires_a_mention() {
        assert_eq!(
            classify_plain("professor obliviate <@U100>"),
            Intent::Erase("U100".to_string())
        );
        assert_eq!(classify_plain("professor obliviate"), Intent::Ignore);
    }

    #[test]
    fn describe_student_beats_describe_house() {
        assert_eq!(
            classify_plain("professor tell me about <@U100>"),
            Intent::DescribeStudent("U100".to_string())
        );
        assert_eq!(
            classify_plain("professor tell me about ravenclaw"),
            Intent::DescribeHouse(House::Ravenclaw)
        );
        assert_eq!(classify_plain("professor tell me about the weather"), Intent::Ignore);
    }

    #[test]
    fn best_and_worst_student() {
        assert_eq!(classify_plain("professor who is the best student"), Intent::BestStudent);
        assert_eq!(
            classify_plain("professor who is the meanest student"),
            Intent::WorstStudent
        );
    }

    #[test]
    fn github_link_parses_account_name() {
        assert_eq!(
            classify_plain("professor link my github name=octocat"),
            Intent::LinkGithubName("octocat".to_string())
        );
    }

    #[test]
    fn mention_extraction_supports_both_forms() {
        assert_eq!(extract_mention("obliviate <@U123>"), Some("U123".to_string()));
        assert_eq!(extract_mention("tell me about @harry please"), Some("harry".to_string()));
        assert_eq!(extract_mention("no mention here"), None);
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount("10 points to gryffindor"), 10);
        assert_eq!(parse_amount("150 points to gryffindor"), 150);
        assert_eq!(parse_amount("10pts points to gryffindor"), 10);
        assert_eq!(parse_amount("many points to gryffindor"), 0);
        assert_eq!(parse_amount(""), 0);
        // Absurd digit runs saturate; the engine clamp brings them to 100.
        assert!(parse_amount("99999999999999999999 points to gryffindor") > 100);
    }

    #[test]
    fn binary_payload_decodes_before_classification() {
        let dir = UserDirectory::default();
        // "10 points to gryffindor" in 8-bit groups, prefixed so the
        // "points to" trigger pattern is present.
        let encoded = "00110001 00110000 00100000 01110000 01101111 01101001 01101110 01110100 01110011 00100000 01110100 01101111 00100000 01100111 01110010 01111001 01100110 01100110 01101001 01101110 01100100 01101111 01110010";
        let decoded = decode_hidden_payload(encoded, &dir);
        assert_eq!(decoded, "10 points to gryffindor");
        assert_eq!(classify(&decoded, false, BOT, TRIGGER), Intent::AwardPoints);
    }

    #[test]
    fn binary_payload_substitutes_known_mentions() {
        let dir = UserDirectory::new(vec![DirectoryUser {
            id: "U100".to_string(),
            name: "harry".to_string(),
        }]);
        // "5 points to @harry"
        let encoded = "00110101 00100000 01110000 01101111 01101001 01101110 01110100 01110011 00100000 01110100 01101111 00100000 01000000 01101000 01100001 01110010 01110010 01111001";
        assert_eq!(decode_hidden_payload(encoded, &dir), "5 points to <@U100>");
    }

    #[test]
    fn plain_text_passes_through_decoder() {
        let dir = UserDirectory::default();
        assert_eq!(
            decode_hidden_payload("10 points to gryffindor", &dir),
            "10 points to gryffindor"
        );
    }
}
