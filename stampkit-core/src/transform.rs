//! Text transforms behind the chat slash commands, plus message helpers.
//!
//! Every function here is total: any input string produces an output.

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Suffix appended by [`append_lenny`].
pub const LENNY: &str = " ( ͡° ͜ʖ ͡°)";

/// Prefix that marks an attachment as a spoiler.
pub const SPOILER_PREFIX: &str = "SPOILER_";

pub fn append_lenny(s: &str) -> String {
    format!("{s}{LENNY}")
}

/// Alternate case by character index, lower first: `hello` → `hElLo`.
pub fn mock(s: &str) -> String {
    s.chars()
        .enumerate()
        .flat_map(|(i, c)| {
            let folded: Vec<char> = if i % 2 == 1 {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            };
            folded
        })
        .collect()
}

pub fn upper(s: &str) -> String {
    s.trim().to_uppercase()
}

pub fn lower(s: &str) -> String {
    s.trim().to_lowercase()
}

/// `l`/`r` become `w` and `o` becomes `u`, keeping case.
pub fn owoify(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'l' | 'r' => 'w',
            'L' | 'R' => 'W',
            'o' => 'u',
            'O' => 'U',
            other => other,
        })
        .collect()
}

pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// Mark an attachment file name as a spoiler.
pub fn spoiler_filename(name: &str) -> String {
    if name.starts_with(SPOILER_PREFIX) {
        name.to_string()
    } else {
        format!("{SPOILER_PREFIX}{name}")
    }
}

/// Replace custom emoji mentions (`<:name:id>`, `<a:name:id>`) with `:name:`.
pub fn strip_custom_emoji(content: &str) -> String {
    // Fast path
    if !content.contains('<') {
        return content.to_string();
    }
    lazy_static::lazy_static! {
        static ref CUSTOM_EMOJI_RE: Regex =
            Regex::new(r"<a?:([a-zA-Z0-9_]+):\d+>").unwrap();
    }
    CUSTOM_EMOJI_RE
        .replace_all(content, ":$1:")
        .into_owned()
}

/// A named text transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommand {
    Lenny,
    Mock,
    Upper,
    Lower,
    Owo,
    Reverse,
    Spoiler,
    Emoji,
}

impl TextCommand {
    pub const ALL: [TextCommand; 8] = [
        TextCommand::Lenny,
        TextCommand::Mock,
        TextCommand::Upper,
        TextCommand::Lower,
        TextCommand::Owo,
        TextCommand::Reverse,
        TextCommand::Spoiler,
        TextCommand::Emoji,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextCommand::Lenny => "lenny",
            TextCommand::Mock => "mock",
            TextCommand::Upper => "upper",
            TextCommand::Lower => "lower",
            TextCommand::Owo => "owo",
            TextCommand::Reverse => "reverse",
            TextCommand::Spoiler => "spoiler",
            TextCommand::Emoji => "emoji",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TextCommand::Lenny => "Appends ( ͡° ͜ʖ ͡°) to your message",
            TextCommand::Mock => "Mock a user",
            TextCommand::Upper => "Makes text uppercase",
            TextCommand::Lower => "Makes text lowercase",
            TextCommand::Owo => "Owoifies your text",
            TextCommand::Reverse => "Makes text reversed",
            TextCommand::Spoiler => "Marks a file name as a spoiler",
            TextCommand::Emoji => "Shows custom emoji as :name:",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            TextCommand::Lenny => append_lenny(input),
            TextCommand::Mock => mock(input),
            TextCommand::Upper => upper(input),
            TextCommand::Lower => lower(input),
            TextCommand::Owo => owoify(input.trim()),
            TextCommand::Reverse => reverse(input),
            TextCommand::Spoiler => spoiler_filename(input),
            TextCommand::Emoji => strip_custom_emoji(input),
        }
    }
}

impl FromStr for TextCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/').to_ascii_lowercase();
        TextCommand::ALL
            .into_iter()
            .find(|command| command.name() == name)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for TextCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
