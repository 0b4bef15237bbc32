use super::node::{ClockEntry, OutlineNode};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

/// Parses the given outline text into a tree of nodes.
///
/// Heading lines (`*`s followed by a space) open a new node at the level given by the number of
/// stars, closing any open nodes at the same or a deeper level. `CLOCK:` lines in a node's body
/// are parsed into clock entries; any other body text is ignored. A clock line that can't be
/// parsed is logged and skipped rather than failing the load, matching the per-record tolerance of
/// the later stages.
pub fn parse_outline(contents: &str) -> OutlineNode {
    // The stack holds every currently-open node, root first. Real headings are always level 1 or
    // deeper, so the root is never popped.
    let mut stack = vec![OutlineNode::root()];

    for line in contents.lines() {
        if let Some((level, text)) = parse_heading(line) {
            while stack.last().is_some_and(|node| node.level >= level) {
                let done = stack.pop().unwrap();
                stack.last_mut().unwrap().children.push(done);
            }
            let (heading, tags) = split_tags(text);
            stack.push(OutlineNode {
                heading,
                level,
                tags,
                clocks: Vec::new(),
                children: Vec::new(),
            });
        } else if let Some(rest) = line.trim_start().strip_prefix("CLOCK:") {
            match parse_clock_entry(rest) {
                Ok(entry) => stack.last_mut().unwrap().clocks.push(entry),
                Err(e) => warn!("ignoring unparseable clock line `{}`: {e:#}", line.trim()),
            }
        }
    }

    while stack.len() > 1 {
        let done = stack.pop().unwrap();
        stack.last_mut().unwrap().children.push(done);
    }
    stack.pop().unwrap()
}

/// Splits a heading line into its level and the text after the stars, if it is one.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let stars = line.bytes().take_while(|b| *b == b'*').count();
    if stars == 0 {
        return None;
    }
    let text = line[stars..].strip_prefix(' ')?;
    Some((stars.min(u8::MAX as usize) as u8, text))
}

/// Splits a trailing `:TAG1:TAG2:` group off the given heading text, returning the remaining
/// heading and the tags in source order.
fn split_tags(text: &str) -> (String, Vec<String>) {
    let trimmed = text.trim_end();
    if let Some(idx) = trimmed.rfind(char::is_whitespace) {
        let candidate = &trimmed[idx + 1..];
        let is_tag_group = candidate.len() > 2
            && candidate.starts_with(':')
            && candidate.ends_with(':')
            && candidate
                .chars()
                .all(|c| c == ':' || c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '%'));
        if is_tag_group {
            let tags = candidate
                .split(':')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            return (trimmed[..idx].trim_end().to_string(), tags);
        }
    }
    (trimmed.to_string(), Vec::new())
}

/// Parses the remainder of a `CLOCK:` line: `[<ts>]--[<ts>]`, optionally followed by an advisory
/// `=> H:MM` duration (recomputed later, so ignored here), or just `[<ts>]` for a running clock.
fn parse_clock_entry(rest: &str) -> Result<ClockEntry> {
    let (start, remainder) = take_bracketed(rest.trim_start())?;
    let start = parse_timestamp(start)?;

    let remainder = remainder.trim_start();
    let end = if let Some(after_dashes) = remainder.strip_prefix("--") {
        let (end, _) = take_bracketed(after_dashes.trim_start())?;
        Some(parse_timestamp(end)?)
    } else {
        None
    };

    Ok(ClockEntry { start, end })
}

/// Takes a leading `[...]` group off the given string, returning its contents and the rest.
fn take_bracketed(s: &str) -> Result<(&str, &str)> {
    let inner = s
        .strip_prefix('[')
        .ok_or_else(|| anyhow!("expected `[` at `{s}`"))?;
    let close = inner
        .find(']')
        .ok_or_else(|| anyhow!("unclosed `[` at `{s}`"))?;
    Ok((&inner[..close], &inner[close + 1..]))
}

/// Parses a timestamp of the form `YYYY-MM-DD[ Dow][ HH:MM]`. The day-of-week name is ignored, and
/// a missing time means midnight.
fn parse_timestamp(s: &str) -> Result<chrono::NaiveDateTime> {
    let mut parts = s.split_whitespace();
    let date = parts.next().ok_or_else(|| anyhow!("empty timestamp"))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date in timestamp `{s}`"))?;

    let mut time = None;
    for part in parts {
        if part.contains(':') {
            time = Some(
                NaiveTime::parse_from_str(part, "%H:%M")
                    .with_context(|| format!("invalid time in timestamp `{s}`"))?,
            );
        } else if !part.chars().all(char::is_alphabetic) {
            bail!("unexpected `{part}` in timestamp `{s}`");
        }
    }

    Ok(date.and_time(time.unwrap_or(NaiveTime::MIN)))
}
