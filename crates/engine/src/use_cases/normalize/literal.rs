//! Literal keyword matching.

use minebot_domain::{Command, ItemToken};

/// Result of matching chat text against the literal phrase table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralMatch {
    Command(Command),
    /// `mine` or `give` without the argument it needs.
    MissingArgument(&'static str),
    Miss,
}

/// Match `text` against the fixed phrase set.
///
/// Matching is case-insensitive and ignores surrounding and repeated
/// whitespace. `mine`/`give` take exactly one argument token.
pub fn parse_literal(text: &str) -> LiteralMatch {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    match words.as_slice() {
        ["follow", "me"] => LiteralMatch::Command(Command::Follow),
        ["stop", "follow", "me"] => LiteralMatch::Command(Command::StopFollow),
        ["come"] | ["come", "here"] => LiteralMatch::Command(Command::Come),
        ["mine"] => LiteralMatch::MissingArgument("mine"),
        ["give"] => LiteralMatch::MissingArgument("give"),
        ["mine", arg] => token(arg).map_or(LiteralMatch::Miss, |t| {
            LiteralMatch::Command(Command::Mine(t))
        }),
        ["give", arg] => token(arg).map_or(LiteralMatch::Miss, |t| {
            LiteralMatch::Command(Command::Give(t))
        }),
        _ => LiteralMatch::Miss,
    }
}

fn token(raw: &str) -> Option<ItemToken> {
    ItemToken::new(raw).ok()
}
