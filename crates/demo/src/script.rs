//! Line-oriented input script for the demo.
//!
//! Each stdin line is the full content of the name field at that moment.
//! Piped input arrives all at once, so `:wait <ms>` lines insert pauses to
//! let the debounce settle between edits.

use std::time::Duration;

use anyhow::{Context, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Type(String),
    Wait(Duration),
    Quit,
}

pub fn parse_line(line: &str) -> anyhow::Result<Command> {
    let Some(directive) = line.strip_prefix(':') else {
        return Ok(Command::Type(line.to_string()));
    };

    let mut parts = directive.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("wait"), Some(ms)) => {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("invalid wait duration {ms:?}"))?;
            Ok(Command::Wait(Duration::from_millis(ms)))
        }
        (Some("quit"), None) => Ok(Command::Quit),
        _ => bail!("unknown directive {line:?}"),
    }
}
