//! Input streams: JSON Lines, chat transcript lines, and the scripted demo
//!
//! Readers never stop on a bad line; they yield a `StreamError` for it and
//! keep going.

use std::io::BufRead;
use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use crate::error::StreamError;
use crate::types::Message;

lazy_static! {
    // [2024-05-01T09:00:00Z] sara: text
    static ref RE_CHAT_LINE: Regex = Regex::new(
        r"^\[(?P<ts>[^\]]+)\]\s*(?P<user>[^:]+?)\s*:\s?(?P<text>.*)$"
    ).unwrap();
}

/// Supported input layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InputFormat {
    /// One JSON object per line: {"timestamp", "user", "text"}
    #[default]
    Jsonl,
    /// `[timestamp] user: text`
    Chat,
}

/// Parse one JSON Lines record. Blank lines yield None.
pub fn parse_json_line(line: &str, line_no: usize) -> Option<Result<Message, StreamError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<Message>(line).map_err(|e| StreamError::Malformed {
            line: line_no,
            reason: e.to_string(),
        }),
    )
}

/// Parse one chat transcript line. Blank lines and `#` comments yield None.
pub fn parse_chat_line(line: &str, line_no: usize) -> Option<Result<Message, StreamError>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return None;
    }
    let parsed = RE_CHAT_LINE
        .captures(line)
        .map(|caps| Message::new(caps["ts"].trim(), caps["user"].trim(), &caps["text"]))
        .ok_or_else(|| StreamError::Malformed {
            line: line_no,
            reason: "expected '[timestamp] user: text'".to_string(),
        });
    Some(parsed)
}

/// Lazily read messages from `reader` in the given format
pub fn read_messages<R: BufRead>(
    reader: R,
    format: InputFormat,
) -> impl Iterator<Item = Result<Message, StreamError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let line_no = i + 1;
            match line {
                Ok(line) => match format {
                    InputFormat::Jsonl => parse_json_line(&line, line_no),
                    InputFormat::Chat => parse_chat_line(&line, line_no),
                },
                Err(e) => Some(Err(StreamError::Io {
                    line: line_no,
                    message: e.to_string(),
                })),
            }
        })
}

// =============================================================================
// SCRIPTED CONVERSATION
// =============================================================================

/// Seconds between scripted messages
pub const SCRIPT_STEP_SECS: i64 = 2;

const SCRIPT: &[(&str, &str)] = &[
    ("ben", "Morning! Making progress on the API."),
    ("sara", "Sure, I can look at it."),
    ("alex", "Looks good to me."),
    ("ben", "I'm a bit swamped right now."),
    ("sara", "I thought we agreed on the earlier deadline."),
    ("alex", "I guess that works."),
    ("ben", "Maybe we can sync tomorrow?"),
    ("sara", "It's fine, I'll just redo it."),
    ("alex", "You know what, this isn't working."),
    ("sara", "Must be nice to leave at four."),
    ("ben", "Pushed the fix."),
    ("alex", "Let's pair on it after lunch."),
    ("sara", "Whatever, ship it."),
    ("ben", "Thanks for the review."),
    ("alex", "Deploy is green."),
    ("sara", "Actually, I found the bug."),
    ("ben", "Nice catch, thank you."),
    ("sara", "Glad it's sorted."),
];

fn script_start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Demo feed: three teammates, one drifting into sustained negativity
pub fn scripted_conversation() -> Vec<Message> {
    let start = script_start();
    SCRIPT
        .iter()
        .enumerate()
        .map(|(i, (user, text))| {
            let ts = start + Duration::seconds(SCRIPT_STEP_SECS * i as i64);
            Message::new(ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true), *user, *text)
        })
        .collect()
}

/// Distinct users of the scripted conversation, in first-seen order
pub fn scripted_users() -> Vec<String> {
    let mut users: Vec<String> = Vec::new();
    for (user, _) in SCRIPT {
        if !users.iter().any(|u| u == user) {
            users.push(user.to_string());
        }
    }
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_chat_line() {
        let m = parse_chat_line("[2024-05-01T09:00:00Z] sara: It's fine.", 1)
            .unwrap()
            .unwrap();
        assert_eq!(m, Message::new("2024-05-01T09:00:00Z", "sara", "It's fine."));
    }

    #[test]
    fn test_chat_line_text_keeps_colons() {
        let m = parse_chat_line("[t1] ben: note: ship at 5", 1).unwrap().unwrap();
        assert_eq!(m.user, "ben");
        assert_eq!(m.text, "note: ship at 5");
    }

    #[test]
    fn test_chat_line_empty_text() {
        let m = parse_chat_line("[t1] ben:", 1).unwrap().unwrap();
        assert_eq!(m.text, "");
    }

    #[test]
    fn test_chat_skips_blank_and_comments() {
        assert!(parse_chat_line("   ", 1).is_none());
        assert!(parse_chat_line("# transcript", 1).is_none());
    }

    #[test]
    fn test_chat_malformed() {
        let err = parse_chat_line("no brackets here", 7).unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Malformed { line: 7, .. }));
    }

    #[test]
    fn test_read_jsonl_continues_after_bad_line() {
        let input = "{\"timestamp\":\"t1\",\"user\":\"ben\",\"text\":\"hi\"}\n\
                     {oops\n\
                     \n\
                     {\"timestamp\":\"t2\",\"user\":\"sara\",\"text\":null}\n";
        let items: Vec<_> = read_messages(Cursor::new(input), InputFormat::Jsonl).collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(StreamError::Malformed { line: 2, .. })));
        assert_eq!(items[2].as_ref().unwrap().text, "");
    }

    #[test]
    fn test_scripted_conversation() {
        let messages = scripted_conversation();
        assert_eq!(messages.len(), SCRIPT.len());
        assert_eq!(messages[0].timestamp, "2024-05-01T09:00:00Z");
        assert_eq!(messages[1].timestamp, "2024-05-01T09:00:02Z");
        assert_eq!(scripted_users(), vec!["ben", "sara", "alex"]);
    }
}
