use crate::parse::{ClockEntry, OutlineNode};
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, instrument, warn};

/// How many of an item's clock entries become records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockMode {
    /// Only the first clock entry counts; the rest are ignored. This matches the convention that
    /// an item is clocked once, with any later entries being corrections.
    FirstOnly,
    /// Every clock entry becomes its own record, for logs that split an item's time across
    /// several intervals.
    All,
}

/// A single clocked activity, flattened out of the outline tree.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FlatRecord {
    /// The item's heading text.
    pub name: String,
    /// The item's first tag. Any further tags are deliberately dropped.
    pub tag: String,
    /// When the clock on the item was started.
    pub start: NaiveDateTime,
    /// When the clock on the item was stopped. Never before `start`.
    pub end: NaiveDateTime,
    /// The elapsed time between `start` and `end`.
    pub duration: Duration,
}
impl FlatRecord {
    /// Converts the given item node into flat records, one per clock entry considered under the
    /// given mode. Each entry that is missing required data produces an error in its slot, for the
    /// caller to log and skip.
    pub fn from_node(node: &OutlineNode, mode: ClockMode) -> Vec<Result<Self>> {
        let Some(tag) = node.tags.first() else {
            return vec![Err(anyhow!("item has no tags"))];
        };
        if node.clocks.is_empty() {
            return vec![Err(anyhow!("item has no clock entries"))];
        }

        let entries = match mode {
            ClockMode::FirstOnly => &node.clocks[..1],
            ClockMode::All => &node.clocks[..],
        };
        entries
            .iter()
            .map(|entry| Self::from_entry(&node.heading, tag, entry))
            .collect()
    }

    /// Builds a record for one clock entry, validating that the entry is a completed, forward
    /// interval.
    fn from_entry(name: &str, tag: &str, entry: &ClockEntry) -> Result<Self> {
        let Some(end) = entry.end else {
            bail!("clock started {} is still running", entry.start);
        };
        if end < entry.start {
            bail!("clock interval {} -- {end} ends before it starts", entry.start);
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
            start: entry.start,
            end,
            duration: end - entry.start,
        })
    }
}

/// Flattens the outline tree into records, one per clocked item (or per clock entry under
/// [`ClockMode::All`]). Items missing a tag or a completed clock entry are logged to standard
/// error and skipped; the run always continues.
#[instrument(skip(root))]
pub fn flatten_outline(root: &OutlineNode, mode: ClockMode) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    for item in root.items() {
        for record in FlatRecord::from_node(item, mode) {
            match record {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping item `{}`: {e}", item.heading),
            }
        }
    }
    debug!("flattened outline into {} records", records.len());

    records
}
